use std::{
    collections::HashMap,
    sync::{Arc, PoisonError, RwLock},
};

use crate::{
    assets::decode::decode_trait,
    catalog::{model::LayerCatalog, resolver::FileResolver},
    foundation::{
        core::{Canvas, Raster},
        error::{ForgeError, ForgeResult},
    },
};

/// Key of one trait within a catalog: `(layer index, trait index)`.
pub type TraitKey = (usize, usize);

/// Resolves and decodes trait sources once per run, remembering both successes and failures.
pub struct TraitStore {
    resolver: Arc<dyn FileResolver>,
    canvas: Canvas,
    cache: RwLock<HashMap<TraitKey, Result<Arc<Raster>, String>>>,
}

impl std::fmt::Debug for TraitStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let cached = self
            .cache
            .read()
            .map(|c| c.len())
            .unwrap_or_else(|e| e.into_inner().len());
        f.debug_struct("TraitStore")
            .field("canvas", &self.canvas)
            .field("cached", &cached)
            .finish()
    }
}

impl TraitStore {
    /// Store backed by `resolver`; SVG traits rasterize at `canvas` size.
    pub fn new(resolver: Arc<dyn FileResolver>, canvas: Canvas) -> Self {
        Self {
            resolver,
            canvas,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// The underlying resolver.
    pub fn resolver(&self) -> &dyn FileResolver {
        self.resolver.as_ref()
    }

    /// Decoded raster for `key`, reading and decoding on first use.
    ///
    /// Any read or decode failure is reported as [`ForgeError::ResourceNotFound`] and remembered,
    /// so a broken file is only touched once per run.
    pub fn get(&self, catalog: &LayerCatalog, key: TraitKey) -> ForgeResult<Arc<Raster>> {
        let (layer_idx, trait_idx) = key;
        let layer = catalog.layers().get(layer_idx).ok_or_else(|| {
            ForgeError::configuration(format!("layer index {layer_idx} out of range"))
        })?;
        let t = layer.traits.get(trait_idx).ok_or_else(|| {
            ForgeError::configuration(format!(
                "trait index {trait_idx} out of range for layer '{}'",
                layer.name
            ))
        })?;

        let cached = self
            .cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
            .cloned();
        let entry = match cached {
            Some(entry) => entry,
            None => {
                let loaded = self
                    .resolver
                    .resolve(&layer.path, &t.file)
                    .and_then(|bytes| decode_trait(&bytes, &t.file, self.canvas))
                    .map(Arc::new)
                    .map_err(|e| e.to_string());
                self.cache
                    .write()
                    .unwrap_or_else(PoisonError::into_inner)
                    .insert(key, loaded.clone());
                loaded
            }
        };

        entry.map_err(|reason| ForgeError::resource_not_found(&layer.name, &t.file, reason))
    }

    /// Number of cached entries (successes and failures).
    pub fn cached_len(&self) -> usize {
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/store.rs"]
mod tests;
