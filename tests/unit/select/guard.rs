use sha2::Digest as _;

use super::*;

#[test]
fn dna_matches_sha256_of_preimage() {
    let dna = Dna::from_pairs([("Background", "Blue"), ("Eyes", "Open")]);
    let expected = hex::encode(sha2::Sha256::digest(b"Background:Blue;Eyes:Open;"));
    assert_eq!(dna.as_str(), expected);
    assert_eq!(dna.as_str().len(), 64);
}

#[test]
fn dna_depends_on_order_and_content() {
    let a = Dna::from_pairs([("A", "x"), ("B", "y")]);
    let b = Dna::from_pairs([("B", "y"), ("A", "x")]);
    let c = Dna::from_pairs([("A", "x")]);
    assert_ne!(a, b);
    assert_ne!(a, c);
    assert_eq!(a, Dna::from_pairs([("A", "x"), ("B", "y")]));
}

#[test]
fn guard_rejects_repeats() {
    let mut g = UniquenessGuard::new();
    let d = Dna::from_pairs([("A", "x")]);
    assert!(g.try_accept(&d));
    assert!(!g.try_accept(&d));
    assert!(g.contains(&d));
    assert_eq!(g.len(), 1);
}

#[test]
fn attempt_budget_is_ten_per_asset() {
    assert_eq!(max_attempts(4), 40);
    assert_eq!(max_attempts(0), 0);
}

#[test]
fn dna_serializes_as_plain_string() {
    let d = Dna::from_pairs([("A", "x")]);
    let json = serde_json::to_string(&d).unwrap();
    assert_eq!(json, format!("\"{}\"", d.as_str()));
}
