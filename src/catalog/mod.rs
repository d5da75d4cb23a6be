//! Layer catalog: the immutable set of layers and weighted traits a run draws from.

/// Directory scanning and declarative catalog specs.
pub mod loader;
/// Catalog data model.
pub mod model;
/// The file-resolution capability consumed by the generator.
pub mod resolver;
