use std::path::Path;

use anyhow::Context;

use crate::{
    catalog::model::{Layer, LayerCatalog, Trait},
    catalog::resolver::normalize_rel_path,
    foundation::error::{ForgeError, ForgeResult},
};

/// File extensions recognized as trait sources when scanning a layer directory.
pub const TRAIT_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp", "gif", "bmp", "svg"];

/// Separator between a trait name and its weight in a scanned file stem (`Red Hat#20.png`).
pub const WEIGHT_DELIMITER: char = '#';

/// Declarative catalog description, usually embedded in a config file.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CatalogSpec {
    /// Directory holding layer folders, relative to the config file.
    #[serde(default)]
    pub root: String,
    /// Layers back-to-front.
    pub layers: Vec<LayerSpec>,
}

/// One layer entry of a [`CatalogSpec`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LayerSpec {
    /// Layer name.
    pub name: String,
    /// Layer folder below the catalog root. Defaults to the layer name.
    #[serde(default)]
    pub path: Option<String>,
    /// Explicit trait list. When absent, the layer folder is scanned.
    #[serde(default)]
    pub traits: Option<Vec<Trait>>,
}

impl LayerSpec {
    fn folder(&self) -> &str {
        self.path.as_deref().unwrap_or(&self.name)
    }
}

impl CatalogSpec {
    /// Materialize a [`LayerCatalog`], scanning `catalog_root` for layers without explicit traits.
    ///
    /// `catalog_root` is the directory the returned layer paths are relative to.
    #[tracing::instrument(skip(self))]
    pub fn load(&self, catalog_root: &Path) -> ForgeResult<LayerCatalog> {
        let mut layers = Vec::with_capacity(self.layers.len());
        for spec in &self.layers {
            let path = normalize_rel_path(spec.folder())?;
            let traits = match &spec.traits {
                Some(explicit) => explicit.clone(),
                None => scan_layer_dir(&catalog_root.join(&path))?,
            };
            if traits.is_empty() {
                return Err(ForgeError::EmptyLayer {
                    layer: spec.name.clone(),
                });
            }
            tracing::debug!(layer = %spec.name, traits = traits.len(), "loaded layer");
            layers.push(Layer {
                name: spec.name.clone(),
                path,
                traits,
            });
        }

        let catalog = LayerCatalog::new(layers);
        catalog.validate()?;
        Ok(catalog)
    }
}

/// Scan one layer folder into traits, sorted by file name.
pub fn scan_layer_dir(dir: &Path) -> ForgeResult<Vec<Trait>> {
    let rd = std::fs::read_dir(dir)
        .with_context(|| format!("read layer directory '{}'", dir.display()))?;

    let mut files = Vec::new();
    for entry in rd {
        let entry = entry.with_context(|| format!("list layer directory '{}'", dir.display()))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(ext) = path.extension().and_then(|s| s.to_str()) else {
            continue;
        };
        if !TRAIT_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()) {
            continue;
        }
        let Some(file_name) = path.file_name().and_then(|s| s.to_str()) else {
            continue;
        };
        files.push(file_name.to_string());
    }
    files.sort();

    files
        .into_iter()
        .map(|file| {
            let stem = Path::new(&file)
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or(&file)
                .to_string();
            let (name, weight) = parse_trait_stem(&stem)?;
            Ok(Trait { name, weight, file })
        })
        .collect()
}

/// Split `"Red Hat#20"` into `("Red Hat", 20.0)`. Stems without a weight get weight 1.
pub fn parse_trait_stem(stem: &str) -> ForgeResult<(String, f64)> {
    match stem.rsplit_once(WEIGHT_DELIMITER) {
        Some((name, raw)) => {
            let weight: f64 = raw.trim().parse().map_err(|_| {
                ForgeError::configuration(format!("invalid weight '{raw}' in trait file '{stem}'"))
            })?;
            if !weight.is_finite() || weight < 0.0 {
                return Err(ForgeError::configuration(format!(
                    "trait file '{stem}' has a negative or non-finite weight"
                )));
            }
            Ok((name.trim().to_string(), weight))
        }
        None => Ok((stem.trim().to_string(), 1.0)),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/catalog/loader.rs"]
mod tests;
