use super::*;

const JSON: &str = r#"{
    "collection": "Critters",
    "catalog": {
        "root": "layers",
        "layers": [
            { "name": "bg" },
            { "name": "hat", "traits": [ { "name": "cap", "weight": 3, "file": "cap.png" } ] }
        ]
    },
    "batch_size": 2,
    "seed": 7,
    "composite": { "canvas": { "width": 32, "height": 32 } },
    "variants": [ { "name": "thumb", "width": 16, "height": 16 } ],
    "preview": { "width": 24, "height": 24 },
    "missing_resources": "strict",
    "threading": { "parallel": true }
}"#;

#[test]
fn parses_with_defaults() {
    let cfg = ForgeConfig::from_json_str(JSON, "/tmp/run").unwrap();
    assert_eq!(cfg.collection, "Critters");
    assert_eq!(cfg.batch_size, 2);
    assert_eq!(cfg.seed, Some(7));
    assert_eq!(cfg.backends, BackendKind::default_chain());
    assert_eq!(cfg.missing_resources, MissingResourcePolicy::Strict);
    assert!(cfg.threading.parallel);
    assert_eq!(cfg.variants[0].quality, 90);
    assert_eq!(cfg.catalog_root(), PathBuf::from("/tmp/run/layers"));
    cfg.validate_outputs().unwrap();
}

#[test]
fn duplicate_variant_names_are_rejected() {
    let mut cfg = ForgeConfig::from_json_str(JSON, ".").unwrap();
    cfg.variants.push(cfg.variants[0].clone());
    assert!(cfg.validate_outputs().is_err());
}

#[test]
fn malformed_json_is_a_serde_error() {
    assert!(matches!(
        ForgeConfig::from_json_str("{", "."),
        Err(ForgeError::Serde(_))
    ));
}

#[test]
fn load_builds_request_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let bg = dir.path().join("layers").join("bg");
    let hat = dir.path().join("layers").join("hat");
    std::fs::create_dir_all(&bg).unwrap();
    std::fs::create_dir_all(&hat).unwrap();
    for (p, rgba) in [
        (bg.join("Red#3.png"), [255, 0, 0, 255]),
        (bg.join("Blue.png"), [0, 0, 255, 255]),
        (hat.join("cap.png"), [0, 255, 0, 255]),
    ] {
        image::RgbaImage::from_pixel(4, 4, image::Rgba(rgba))
            .save(&p)
            .unwrap();
    }
    let path = dir.path().join("forge.json");
    std::fs::write(&path, JSON).unwrap();

    let cfg = ForgeConfig::load(&path).unwrap();
    let (req, resolver) = cfg.to_request().unwrap();
    assert_eq!(req.catalog.len(), 2);
    let names: Vec<&str> = req.catalog.layers()[0]
        .traits
        .iter()
        .map(|t| t.name.as_str())
        .collect();
    assert_eq!(names, vec!["Blue", "Red"]);
    assert_eq!(req.catalog.layers()[0].traits[1].weight, 3.0);
    assert_eq!(req.seed, Some(7));
    req.validate(resolver.as_ref()).unwrap();
}

#[test]
fn missing_config_file_is_reported() {
    let err = ForgeConfig::load(Path::new("/definitely/not/here.json")).unwrap_err();
    assert!(matches!(err, ForgeError::Other(_)));
}
