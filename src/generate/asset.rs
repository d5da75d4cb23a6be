use crate::{
    foundation::core::Raster,
    render::compositor::{FALLBACK_BACKEND, ResolvedLayer},
    select::guard::Dna,
};

/// One `(layer, trait)` assignment of an asset.
#[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Attribute {
    /// Layer name.
    pub trait_type: String,
    /// Trait name.
    pub value: String,
}

/// A trait dropped from an asset under the lenient missing-resource policy.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AssetWarning {
    /// Layer the trait belongs to.
    pub layer: String,
    /// Trait name that was drawn.
    pub value: String,
    /// Source file that failed.
    pub file: String,
    /// Failure description.
    pub message: String,
}

/// One unique generated asset.
#[derive(Clone, Debug)]
pub struct GeneratedAsset {
    /// Sequential id in draw order, starting at 1.
    pub token_id: u64,
    /// Attributes in catalog layer order.
    pub attributes: Vec<Attribute>,
    /// Fingerprint of `attributes`.
    pub dna: Dna,
    /// Full-size flattened composite.
    pub raw_composite: Raster,
    /// Backend that produced `raw_composite`.
    pub backend: &'static str,
    /// Batch rarity score; filled once the whole batch is known.
    pub rarity_score: f64,
    /// 1 = rarest in the batch.
    pub rarity_rank: usize,
    /// Descriptive signal for downstream allocation.
    pub yield_multiplier: f64,
    /// Attributes dropped while resolving sources.
    pub warnings: Vec<AssetWarning>,
    pub(crate) layers: Vec<ResolvedLayer>,
}

impl GeneratedAsset {
    /// Decoded trait rasters in draw order, used to re-composite animated variants.
    pub fn layers(&self) -> &[ResolvedLayer] {
        &self.layers
    }

    /// Trait value drawn for `layer`, if the asset carries it.
    pub fn attribute(&self, layer: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.trait_type == layer)
            .map(|a| a.value.as_str())
    }

    /// Whether every compositor backend failed for this asset.
    pub fn is_degraded(&self) -> bool {
        self.backend == FALLBACK_BACKEND
    }
}
