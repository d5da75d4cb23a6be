//! Weighted trait selection and run-scoped duplicate avoidance.

/// DNA fingerprints and the uniqueness guard.
pub mod guard;
/// Weighted random trait draws.
pub mod selector;
