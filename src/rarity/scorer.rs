use std::collections::BTreeMap;

use crate::{
    catalog::model::LayerCatalog,
    foundation::{
        error::{ForgeError, ForgeResult},
        math::round2,
    },
    generate::asset::GeneratedAsset,
};

/// Rarity weights: layer name → trait name → weight. Independent of selection weights.
pub type RarityWeights = BTreeMap<String, BTreeMap<String, f64>>;

/// Occurrence counts: layer name → trait name → assets carrying it.
pub type TraitCounts = BTreeMap<String, BTreeMap<String, usize>>;

/// Width of one rarity histogram bucket.
pub const HISTOGRAM_BUCKET_WIDTH: u64 = 10;

/// Scores in `[min, max)`.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct HistogramBucket {
    /// Inclusive lower bound.
    pub min: u64,
    /// Exclusive upper bound.
    pub max: u64,
    /// Assets whose score falls in the bucket.
    pub count: usize,
}

/// Batch-wide results of a generation run.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CollectionStatistics {
    /// Product of per-layer trait counts.
    pub total_combinations: u64,
    /// Assets produced.
    pub actual_generated: usize,
    /// Non-empty width-10 score buckets, ascending.
    pub rarity_histogram: Vec<HistogramBucket>,
    /// Occurrence counts per layer and trait.
    pub trait_counts: TraitCounts,
}

/// Reject rarity weights that are not finite and positive or that name unknown traits.
pub fn validate_rarity_weights(weights: &RarityWeights, catalog: &LayerCatalog) -> ForgeResult<()> {
    for (layer_name, traits) in weights {
        let layer = catalog
            .layers()
            .iter()
            .find(|l| &l.name == layer_name)
            .ok_or_else(|| {
                ForgeError::configuration(format!(
                    "rarity weights name unknown layer '{layer_name}'"
                ))
            })?;
        for (trait_name, w) in traits {
            if layer.trait_index(trait_name).is_none() {
                return Err(ForgeError::configuration(format!(
                    "rarity weights name unknown trait '{trait_name}' in layer '{layer_name}'"
                )));
            }
            if !w.is_finite() || *w <= 0.0 {
                return Err(ForgeError::configuration(format!(
                    "rarity weight for '{layer_name}:{trait_name}' must be finite and > 0"
                )));
            }
        }
    }
    Ok(())
}

/// Count how many assets carry each (layer, trait) pair.
pub fn count_traits(assets: &[GeneratedAsset]) -> TraitCounts {
    let mut counts = TraitCounts::new();
    for asset in assets {
        for attr in &asset.attributes {
            *counts
                .entry(attr.trait_type.clone())
                .or_default()
                .entry(attr.value.clone())
                .or_default() += 1;
        }
    }
    counts
}

/// `(1 + 1/w)` multiplied over the asset's attributes; unweighted attributes contribute 1.
pub fn yield_multiplier(asset: &GeneratedAsset, weights: &RarityWeights) -> f64 {
    let product = asset
        .attributes
        .iter()
        .filter_map(|a| weights.get(&a.trait_type)?.get(&a.value))
        .fold(1.0, |acc, w| acc * (1.0 + 1.0 / w));
    round2(product)
}

/// Fill in rarity score, rank and yield multiplier on every asset of a finished batch and
/// return the occurrence counts.
#[tracing::instrument(level = "debug", skip_all, fields(assets = assets.len()))]
pub fn score_assets(assets: &mut [GeneratedAsset], weights: &RarityWeights) -> TraitCounts {
    let counts = count_traits(assets);
    let n = assets.len() as f64;

    for asset in assets.iter_mut() {
        let score: f64 = asset
            .attributes
            .iter()
            .map(|a| {
                let c = counts
                    .get(&a.trait_type)
                    .and_then(|t| t.get(&a.value))
                    .copied()
                    .unwrap_or(1);
                n / c as f64
            })
            .sum();
        asset.rarity_score = round2(score);
        asset.yield_multiplier = yield_multiplier(asset, weights);
    }

    let mut order: Vec<usize> = (0..assets.len()).collect();
    order.sort_by(|&a, &b| {
        assets[b]
            .rarity_score
            .total_cmp(&assets[a].rarity_score)
            .then(assets[a].token_id.cmp(&assets[b].token_id))
    });
    for (rank, idx) in order.into_iter().enumerate() {
        assets[idx].rarity_rank = rank + 1;
    }
    counts
}

/// Bucket scores into `[10k, 10k + 10)` ranges, dropping empty buckets.
pub fn histogram(scores: impl IntoIterator<Item = f64>) -> Vec<HistogramBucket> {
    let mut buckets = BTreeMap::<u64, usize>::new();
    for s in scores {
        let k = (s.max(0.0) / HISTOGRAM_BUCKET_WIDTH as f64).floor() as u64;
        *buckets.entry(k).or_default() += 1;
    }
    buckets
        .into_iter()
        .map(|(k, count)| HistogramBucket {
            min: k * HISTOGRAM_BUCKET_WIDTH,
            max: (k + 1) * HISTOGRAM_BUCKET_WIDTH,
            count,
        })
        .collect()
}

/// Statistics for a scored batch.
pub fn collection_statistics(
    catalog: &LayerCatalog,
    assets: &[GeneratedAsset],
    trait_counts: TraitCounts,
) -> CollectionStatistics {
    CollectionStatistics {
        total_combinations: catalog.total_combinations(),
        actual_generated: assets.len(),
        rarity_histogram: histogram(assets.iter().map(|a| a.rarity_score)),
        trait_counts,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/rarity/scorer.rs"]
mod tests;
