use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        ForgeError::configuration("x")
            .to_string()
            .contains("configuration error:")
    );
    assert!(
        ForgeError::resource_not_found("Hats", "cap.png", "missing")
            .to_string()
            .contains("resource not found:")
    );
    assert!(
        ForgeError::backend("vello", "x")
            .to_string()
            .contains("render backend error (vello):")
    );
    assert!(ForgeError::decode("x").to_string().contains("decode error:"));
    assert!(ForgeError::encode("x").to_string().contains("encode error:"));
    assert!(
        ForgeError::Serde("x".to_string())
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn uniqueness_exhausted_reports_partial_count() {
    let err = ForgeError::UniquenessExhausted {
        produced: 3,
        requested: 5,
        attempts: 50,
    };
    let msg = err.to_string();
    assert!(msg.contains("produced 3 of 5"));
    assert!(msg.contains("50 attempts"));
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = ForgeError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
