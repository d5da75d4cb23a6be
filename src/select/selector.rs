use rand::Rng;

use crate::{
    catalog::model::{Layer, LayerCatalog},
    foundation::error::{ForgeError, ForgeResult},
};

/// Draw one trait index from `layer`, with probability proportional to its weight.
///
/// A uniform value is drawn in `[0, total)` and the first positive-weight trait whose running
/// cumulative weight reaches it is returned. All-zero layers fall back to a uniform draw.
pub fn select_trait<R: Rng + ?Sized>(layer: &Layer, rng: &mut R) -> ForgeResult<usize> {
    let n = layer.traits.len();
    if n == 0 {
        return Err(ForgeError::EmptyLayer {
            layer: layer.name.clone(),
        });
    }

    let total = layer.total_weight();
    if !total.is_finite() {
        return Err(ForgeError::configuration(format!(
            "weights in layer '{}' overflow to a non-finite total",
            layer.name
        )));
    }
    if total <= 0.0 {
        return Ok(rng.random_range(0..n));
    }

    let draw = rng.random::<f64>() * total;
    let mut cumulative = 0.0;
    let mut last_positive = 0;
    for (i, t) in layer.traits.iter().enumerate() {
        if t.weight <= 0.0 {
            continue;
        }
        cumulative += t.weight;
        last_positive = i;
        if cumulative >= draw {
            return Ok(i);
        }
    }
    // Float rounding can leave `draw` a hair above the final cumulative sum.
    Ok(last_positive)
}

/// Draw one trait index per layer, in catalog order.
pub fn select_stack<R: Rng + ?Sized>(
    catalog: &LayerCatalog,
    rng: &mut R,
) -> ForgeResult<Vec<usize>> {
    catalog
        .layers()
        .iter()
        .map(|layer| select_trait(layer, rng))
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/select/selector.rs"]
mod tests;
