use super::*;

fn layer(name: &str, weights: &[f64]) -> Layer {
    Layer {
        name: name.to_string(),
        path: name.to_lowercase(),
        traits: weights
            .iter()
            .enumerate()
            .map(|(i, &w)| Trait {
                name: format!("{name}{i}"),
                weight: w,
                file: format!("{name}{i}.png"),
            })
            .collect(),
    }
}

#[test]
fn probabilities_sum_to_one() {
    for weights in [&[70.0, 30.0][..], &[1.0, 2.0, 3.0, 4.0], &[0.0, 0.0, 0.0], &[5.0]] {
        let l = layer("L", weights);
        let sum: f64 = l.selection_probabilities().iter().sum();
        assert!((sum - 1.0).abs() < 1e-12, "weights {weights:?} sum {sum}");
    }
}

#[test]
fn zero_weights_are_uniform() {
    let l = layer("L", &[0.0, 0.0, 0.0, 0.0]);
    assert_eq!(l.selection_probabilities(), vec![0.25; 4]);
}

#[test]
fn total_combinations_is_product() {
    let c = LayerCatalog::new(vec![layer("A", &[1.0, 1.0]), layer("B", &[1.0, 1.0, 1.0])]);
    assert_eq!(c.total_combinations(), 6);
}

#[test]
fn total_combinations_saturates() {
    let big = layer("A", &vec![1.0; 1 << 16]);
    let layers = (0..5)
        .map(|i| Layer {
            name: format!("L{i}"),
            ..big.clone()
        })
        .collect();
    assert_eq!(LayerCatalog::new(layers).total_combinations(), u64::MAX);
}

#[test]
fn validate_rejects_bad_shapes() {
    assert!(LayerCatalog::new(vec![]).validate().is_err());
    assert!(LayerCatalog::new(vec![layer("A", &[])]).validate().is_err());
    assert!(
        LayerCatalog::new(vec![layer("A", &[1.0]), layer("A", &[1.0])])
            .validate()
            .is_err()
    );
    assert!(LayerCatalog::new(vec![layer("A", &[-1.0])]).validate().is_err());
    assert!(
        LayerCatalog::new(vec![layer("A", &[f64::NAN])])
            .validate()
            .is_err()
    );
    LayerCatalog::new(vec![layer("A", &[0.0, 2.0])])
        .validate()
        .unwrap();
}

#[test]
fn validate_rejects_weights_overflowing_the_total() {
    let l = layer("A", &[1e308, 1e308]);
    assert!(l.total_weight().is_infinite());
    let err = LayerCatalog::new(vec![l]).validate().unwrap_err();
    assert!(matches!(err, ForgeError::Configuration(_)), "{err}");
}

#[test]
fn trait_weight_defaults_to_one_when_deserialized() {
    let t: Trait = serde_json::from_str(r#"{ "name": "Red", "file": "red.png" }"#).unwrap();
    assert_eq!(t.weight, 1.0);
}
