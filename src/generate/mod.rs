//! Generation: request validation, the draw session, orchestration, and metadata output.

/// Generated asset types.
pub mod asset;
/// JSON run configuration.
pub mod config;
/// Serializable asset metadata and collection manifest.
pub mod metadata;
/// The [`orchestrator::Generator`] driving a run.
pub mod orchestrator;
/// Generation request and its validation.
pub mod request;
/// Run-scoped draw state.
pub mod session;
