use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Context as _;

use crate::{
    catalog::{loader::CatalogSpec, resolver::FsResolver},
    foundation::error::{ForgeError, ForgeResult},
    generate::request::{GenerationRequest, MissingResourcePolicy, ThreadingOptions},
    rarity::scorer::RarityWeights,
    render::{backend::BackendKind, options::CompositeOptions},
    variant::{
        animate::AnimationParams,
        spec::{PreviewSpec, VariantSpec},
    },
};

fn default_collection() -> String {
    "Collection".to_string()
}

/// On-disk run configuration (JSON).
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ForgeConfig {
    /// Collection name used in asset metadata names.
    #[serde(default = "default_collection")]
    pub collection: String,
    /// Layers, scanned or explicit.
    pub catalog: CatalogSpec,
    /// Unique assets to produce.
    pub batch_size: usize,
    /// Fixed seed for reproducible runs.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Scoring weights: layer → trait → weight.
    #[serde(default)]
    pub rarity_weights: RarityWeights,
    /// Compositing options.
    #[serde(default)]
    pub composite: CompositeOptions,
    /// Per-asset outputs.
    #[serde(default)]
    pub variants: Vec<VariantSpec>,
    /// Optional batch-level preview.
    #[serde(default)]
    pub preview: Option<PreviewSpec>,
    /// Read/decode failure handling.
    #[serde(default)]
    pub missing_resources: MissingResourcePolicy,
    /// Compositing parallelism.
    #[serde(default)]
    pub threading: ThreadingOptions,
    /// Compositor backends in priority order.
    #[serde(default = "BackendKind::default_chain")]
    pub backends: Vec<BackendKind>,
    /// Animated variant amplitudes.
    #[serde(default)]
    pub animation: AnimationParams,
    /// Directory relative paths resolve against.
    #[serde(skip)]
    pub base_dir: PathBuf,
}

impl ForgeConfig {
    /// Parse a config; relative paths resolve against `base_dir`.
    pub fn from_json_str(json: &str, base_dir: impl Into<PathBuf>) -> ForgeResult<Self> {
        let mut cfg: Self = serde_json::from_str(json)?;
        cfg.base_dir = base_dir.into();
        Ok(cfg)
    }

    /// Read and parse a config file; relative paths resolve against its directory.
    pub fn load(path: &Path) -> ForgeResult<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("read config '{}'", path.display()))?;
        let base = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Self::from_json_str(&json, base)
    }

    /// Absolute or base-relative catalog root directory.
    pub fn catalog_root(&self) -> PathBuf {
        self.base_dir.join(&self.catalog.root)
    }

    /// Check the output settings that are not part of a [`GenerationRequest`].
    pub fn validate_outputs(&self) -> ForgeResult<()> {
        for (i, v) in self.variants.iter().enumerate() {
            v.validate()?;
            if self.variants[..i].iter().any(|o| o.name == v.name) {
                return Err(ForgeError::configuration(format!(
                    "duplicate variant name '{}'",
                    v.name
                )));
            }
        }
        if let Some(p) = &self.preview {
            p.validate()?;
        }
        Ok(())
    }

    /// Load the catalog and build the request plus a filesystem resolver rooted at the
    /// catalog root.
    pub fn to_request(&self) -> ForgeResult<(GenerationRequest, Arc<FsResolver>)> {
        self.validate_outputs()?;
        let root = self.catalog_root();
        let catalog = self.catalog.load(&root)?;
        let request = GenerationRequest {
            catalog,
            batch_size: self.batch_size,
            rarity_weights: self.rarity_weights.clone(),
            composite: self.composite.clone(),
            seed: self.seed,
            missing_resources: self.missing_resources,
            threading: self.threading,
            backends: self.backends.clone(),
            animation: self.animation,
        };
        Ok((request, Arc::new(FsResolver::new(root))))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/generate/config.rs"]
mod tests;
