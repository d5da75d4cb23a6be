use crate::{
    foundation::error::ForgeResult,
    generate::{
        asset::{AssetWarning, Attribute, GeneratedAsset},
        orchestrator::GenerationOutput,
    },
    rarity::scorer::CollectionStatistics,
};

/// Serializable description of one asset.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AssetMetadata {
    /// Token id.
    pub token_id: u64,
    /// Display name, `"<collection> #<token_id>"`.
    pub name: String,
    /// Hex fingerprint.
    pub dna: String,
    /// Attributes in layer order.
    pub attributes: Vec<Attribute>,
    /// Batch rarity score.
    pub rarity_score: f64,
    /// 1 = rarest.
    pub rarity_rank: usize,
    /// Descriptive allocation signal.
    pub yield_multiplier: f64,
    /// Backend that produced the composite.
    pub backend: String,
    /// Attributes dropped during resolution.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<AssetWarning>,
}

impl AssetMetadata {
    /// Metadata for `asset` within `collection`.
    pub fn from_asset(collection: &str, asset: &GeneratedAsset) -> Self {
        Self {
            token_id: asset.token_id,
            name: format!("{collection} #{}", asset.token_id),
            dna: asset.dna.to_string(),
            attributes: asset.attributes.clone(),
            rarity_score: asset.rarity_score,
            rarity_rank: asset.rarity_rank,
            yield_multiplier: asset.yield_multiplier,
            backend: asset.backend.to_string(),
            warnings: asset.warnings.clone(),
        }
    }

    /// Pretty JSON.
    pub fn to_json(&self) -> ForgeResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Serializable summary of a whole run.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CollectionManifest {
    /// Collection name.
    pub collection: String,
    /// Seed the run drew from.
    pub seed: u64,
    /// Draws consumed.
    pub attempts: usize,
    /// Whether the run was stopped early.
    pub stopped: bool,
    /// Batch statistics.
    pub statistics: CollectionStatistics,
    /// Per-asset metadata in token id order.
    pub assets: Vec<AssetMetadata>,
}

impl CollectionManifest {
    /// Manifest for a finished run.
    pub fn from_output(collection: &str, output: &GenerationOutput) -> Self {
        Self {
            collection: collection.to_string(),
            seed: output.seed,
            attempts: output.attempts,
            stopped: output.stopped,
            statistics: output.statistics.clone(),
            assets: output
                .assets
                .iter()
                .map(|a| AssetMetadata::from_asset(collection, a))
                .collect(),
        }
    }

    /// Pretty JSON.
    pub fn to_json(&self) -> ForgeResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/generate/metadata.rs"]
mod tests;
