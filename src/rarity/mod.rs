//! Batch-wide rarity scoring and collection statistics.

/// Occurrence counting, scores, ranks, yield multipliers and histograms.
pub mod scorer;
