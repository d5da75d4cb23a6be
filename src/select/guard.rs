use std::collections::HashSet;

use sha2::Digest as _;

/// Deterministic fingerprint of one asset's ordered attribute assignment (hex SHA-256).
#[derive(
    Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct Dna(String);

impl Dna {
    /// Fingerprint `(layer name, trait name)` pairs in the given order.
    ///
    /// The preimage is `"<layer>:<trait>;"` repeated for every pair.
    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut hasher = sha2::Sha256::new();
        for (layer, value) in pairs {
            hasher.update(layer.as_bytes());
            hasher.update(b":");
            hasher.update(value.as_bytes());
            hasher.update(b";");
        }
        Self(hex::encode(hasher.finalize()))
    }

    /// Hex digest.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Dna {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Run-scoped set of accepted fingerprints. Single writer: owned by the generation session.
#[derive(Debug, Default)]
pub struct UniquenessGuard {
    seen: HashSet<Dna>,
}

impl UniquenessGuard {
    /// Empty guard.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `dna`. Returns `false` (and records nothing) when it was already accepted.
    pub fn try_accept(&mut self, dna: &Dna) -> bool {
        if self.seen.contains(dna) {
            return false;
        }
        self.seen.insert(dna.clone())
    }

    /// Whether `dna` was already accepted.
    pub fn contains(&self, dna: &Dna) -> bool {
        self.seen.contains(dna)
    }

    /// Number of accepted fingerprints.
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    /// Whether nothing was accepted yet.
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

/// Attempt budget for a batch: ten draws per requested asset.
pub fn max_attempts(batch_size: usize) -> usize {
    batch_size.saturating_mul(10)
}

#[cfg(test)]
#[path = "../../tests/unit/select/guard.rs"]
mod tests;
