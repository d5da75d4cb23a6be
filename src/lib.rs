//! Layerforge generates batches of unique composite images from layered trait libraries.
//!
//! A run goes through these steps:
//!
//! - Load a [`LayerCatalog`] (scanned folders with `name#weight` files, or explicit traits)
//! - Validate a [`GenerationRequest`] and create a [`Generator`]
//! - Draw weighted trait stacks inside a [`GenerationSession`], rejecting duplicate [`Dna`]
//! - Flatten each stack through the [`Compositor`] backend chain (`vello`, then `software`)
//! - Score the finished batch ([`CollectionStatistics`], rarity score/rank, yield multiplier)
//! - Render [`VariantSpec`] outputs and a collection preview on demand
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

/// Trait decoding and the per-run raster cache.
pub mod assets;
/// Layer catalog model, loader, and file resolvers.
pub mod catalog;
/// Blend modes, blur and tone effects.
pub mod effects;
/// Requests, sessions, orchestration and metadata.
pub mod generate;
/// Batch rarity scoring.
pub mod rarity;
/// Compositing backends and the fallback chain.
pub mod render;
/// Weighted selection and the uniqueness guard.
pub mod select;
/// Sized, encoded and animated outputs.
pub mod variant;

pub use crate::foundation::core::{
    Affine, Canvas, MAX_DIM, Point, Raster, Rect, Rgba8Premul, Vec2,
};
pub use crate::foundation::error::{ForgeError, ForgeResult};

pub use crate::assets::store::TraitStore;
pub use crate::catalog::loader::{CatalogSpec, LayerSpec};
pub use crate::catalog::model::{Layer, LayerCatalog, Trait};
pub use crate::catalog::resolver::{FileResolver, FsResolver, MemoryResolver};
pub use crate::effects::blend::BlendMode;
pub use crate::effects::fx::LayerEffects;
pub use crate::generate::asset::{AssetWarning, Attribute, GeneratedAsset};
pub use crate::generate::config::ForgeConfig;
pub use crate::generate::metadata::{AssetMetadata, CollectionManifest};
pub use crate::generate::orchestrator::{GenerationOutput, Generator};
pub use crate::generate::request::{GenerationRequest, MissingResourcePolicy, ThreadingOptions};
pub use crate::generate::session::GenerationSession;
pub use crate::rarity::scorer::{CollectionStatistics, HistogramBucket, RarityWeights};
pub use crate::render::backend::{BackendKind, CompositeJob, LayerDraw, RenderBackend};
pub use crate::render::compositor::{CompositeOutcome, Compositor, ResolvedLayer};
pub use crate::render::options::{CompositeOptions, LayerPlacement};
pub use crate::select::guard::{Dna, UniquenessGuard};
pub use crate::variant::animate::AnimationParams;
pub use crate::variant::renderer::VariantRenderer;
pub use crate::variant::sink::{FrameSink, GifSink, InMemorySink, SinkConfig};
pub use crate::variant::spec::{
    FormatCategory, OutputFormat, PreviewSpec, VariantBuffer, VariantSpec,
};
