use std::collections::HashSet;

use crate::foundation::error::{ForgeError, ForgeResult};

/// One concrete option within a layer.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Trait {
    /// Trait value written into asset attributes.
    pub name: String,
    /// Relative selection weight (>= 0). All-zero layers fall back to uniform selection.
    #[serde(default = "default_weight")]
    pub weight: f64,
    /// Source file name, resolved relative to the owning layer's path.
    pub file: String,
}

fn default_weight() -> f64 {
    1.0
}

/// A named axis of visual variation, drawn back-to-front in catalog order.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Layer {
    /// Layer name, used as the attribute `trait_type`.
    pub name: String,
    /// Source directory (relative to the resolver root).
    pub path: String,
    /// Traits in stable order.
    pub traits: Vec<Trait>,
}

impl Layer {
    /// Sum of all trait weights.
    pub fn total_weight(&self) -> f64 {
        self.traits.iter().map(|t| t.weight).sum()
    }

    /// Normalized selection probability per trait, in trait order.
    ///
    /// When every weight is zero the distribution is uniform.
    pub fn selection_probabilities(&self) -> Vec<f64> {
        let n = self.traits.len();
        if n == 0 {
            return Vec::new();
        }
        let total = self.total_weight();
        if total <= 0.0 {
            return vec![1.0 / n as f64; n];
        }
        self.traits.iter().map(|t| t.weight / total).collect()
    }

    /// Look up a trait index by name.
    pub fn trait_index(&self, name: &str) -> Option<usize> {
        self.traits.iter().position(|t| t.name == name)
    }
}

/// Ordered, read-only set of layers for one run.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LayerCatalog {
    layers: Vec<Layer>,
}

impl LayerCatalog {
    /// Build a catalog from layers in back-to-front order.
    pub fn new(layers: Vec<Layer>) -> Self {
        Self { layers }
    }

    /// Layers in catalog order.
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Number of layers.
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Whether the catalog has no layers.
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Product of per-layer trait counts, saturating at `u64::MAX`.
    pub fn total_combinations(&self) -> u64 {
        self.layers
            .iter()
            .fold(1u64, |acc, l| acc.saturating_mul(l.traits.len() as u64))
    }

    /// Check the catalog shape: at least one layer, unique non-empty names, at least one trait
    /// per layer, unique trait names within a layer, and finite non-negative weights.
    pub fn validate(&self) -> ForgeResult<()> {
        if self.layers.is_empty() {
            return Err(ForgeError::configuration("catalog must have at least one layer"));
        }

        let mut seen = HashSet::new();
        for layer in &self.layers {
            if layer.name.trim().is_empty() {
                return Err(ForgeError::configuration("layer name must be non-empty"));
            }
            if !seen.insert(layer.name.as_str()) {
                return Err(ForgeError::configuration(format!(
                    "duplicate layer name '{}'",
                    layer.name
                )));
            }
            if layer.traits.is_empty() {
                return Err(ForgeError::configuration(format!(
                    "layer '{}' has no traits",
                    layer.name
                )));
            }

            let mut trait_names = HashSet::new();
            for t in &layer.traits {
                if t.name.is_empty() {
                    return Err(ForgeError::configuration(format!(
                        "layer '{}' has a trait with an empty name",
                        layer.name
                    )));
                }
                if !trait_names.insert(t.name.as_str()) {
                    return Err(ForgeError::configuration(format!(
                        "layer '{}' has duplicate trait '{}'",
                        layer.name, t.name
                    )));
                }
                if !t.weight.is_finite() || t.weight < 0.0 {
                    return Err(ForgeError::configuration(format!(
                        "trait '{}' in layer '{}' must have a finite weight >= 0",
                        t.name, layer.name
                    )));
                }
                if t.file.trim().is_empty() {
                    return Err(ForgeError::configuration(format!(
                        "trait '{}' in layer '{}' has no source file",
                        t.name, layer.name
                    )));
                }
            }
            if !layer.total_weight().is_finite() {
                return Err(ForgeError::configuration(format!(
                    "weights in layer '{}' overflow to a non-finite total",
                    layer.name
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/catalog/model.rs"]
mod tests;
