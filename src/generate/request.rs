use crate::{
    catalog::{model::LayerCatalog, resolver::FileResolver},
    foundation::error::{ForgeError, ForgeResult},
    rarity::scorer::{RarityWeights, validate_rarity_weights},
    render::{backend::BackendKind, options::CompositeOptions},
    variant::animate::AnimationParams,
};

/// What to do when a located trait file cannot be read or decoded during generation.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum MissingResourcePolicy {
    /// Abort the run with [`ForgeError::ResourceNotFound`].
    Strict,
    /// Drop the attribute from that asset and record a warning on it.
    #[default]
    Lenient,
}

/// Parallelism for the compositing phase.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ThreadingOptions {
    /// Composite assets on a dedicated rayon pool.
    pub parallel: bool,
    /// Worker thread count. `None` uses rayon defaults.
    pub threads: Option<usize>,
}

impl ThreadingOptions {
    fn validate(&self) -> ForgeResult<()> {
        if self.threads == Some(0) {
            return Err(ForgeError::configuration("'threads' must be >= 1 when set"));
        }
        Ok(())
    }
}

/// Everything a generation run needs.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GenerationRequest {
    /// Layers and weighted traits.
    pub catalog: LayerCatalog,
    /// Unique assets to produce.
    pub batch_size: usize,
    /// Scoring weights, independent of selection weights.
    #[serde(default)]
    pub rarity_weights: RarityWeights,
    /// Canvas, placement, blend and effect options.
    #[serde(default)]
    pub composite: CompositeOptions,
    /// Fixed seed for reproducible draws. Drawn at random when unset.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Read/decode failure handling.
    #[serde(default)]
    pub missing_resources: MissingResourcePolicy,
    /// Compositing parallelism.
    #[serde(default)]
    pub threading: ThreadingOptions,
    /// Compositor backends in priority order.
    #[serde(default = "BackendKind::default_chain")]
    pub backends: Vec<BackendKind>,
    /// Perturbation amplitudes for animated variants.
    #[serde(default)]
    pub animation: AnimationParams,
}

impl GenerationRequest {
    /// Request with default options.
    pub fn new(catalog: LayerCatalog, batch_size: usize) -> Self {
        Self {
            catalog,
            batch_size,
            rarity_weights: RarityWeights::new(),
            composite: CompositeOptions::default(),
            seed: None,
            missing_resources: MissingResourcePolicy::default(),
            threading: ThreadingOptions::default(),
            backends: BackendKind::default_chain(),
            animation: AnimationParams::default(),
        }
    }

    /// Fail fast on anything that would make the run impossible. Every trait file must be
    /// locatable through `resolver`.
    pub fn validate(&self, resolver: &dyn FileResolver) -> ForgeResult<()> {
        self.catalog.validate()?;
        if self.batch_size == 0 {
            return Err(ForgeError::configuration("batch_size must be > 0"));
        }
        let total = self.catalog.total_combinations();
        if self.batch_size as u64 > total {
            return Err(ForgeError::configuration(format!(
                "batch_size {} exceeds the {total} possible combinations",
                self.batch_size
            )));
        }
        for layer in self.catalog.layers() {
            for t in &layer.traits {
                if !resolver.contains(&layer.path, &t.file) {
                    return Err(ForgeError::configuration(format!(
                        "trait '{}' in layer '{}' references missing file '{}'",
                        t.name, layer.name, t.file
                    )));
                }
            }
        }
        validate_rarity_weights(&self.rarity_weights, &self.catalog)?;
        self.composite.validate(&self.catalog)?;
        self.threading.validate()?;
        self.animation.validate()?;
        if self.backends.is_empty() {
            return Err(ForgeError::configuration(
                "at least one compositor backend is required",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/generate/request.rs"]
mod tests;
