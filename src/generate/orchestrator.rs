use std::sync::Arc;

use rayon::prelude::*;

use crate::{
    assets::store::TraitStore,
    catalog::resolver::FileResolver,
    foundation::{
        core::Raster,
        error::{ForgeError, ForgeResult},
    },
    generate::{
        asset::{AssetWarning, Attribute, GeneratedAsset},
        request::{GenerationRequest, MissingResourcePolicy},
        session::GenerationSession,
    },
    rarity::scorer::{CollectionStatistics, collection_statistics, score_assets},
    render::{
        backend::CompositeJob,
        compositor::{Compositor, ResolvedLayer, plan_job},
    },
    select::{guard::Dna, selector::select_stack},
    variant::{
        renderer::VariantRenderer,
        spec::{PreviewSpec, VariantBuffer, VariantSpec},
    },
};

/// Result of a generation run.
#[derive(Clone, Debug)]
pub struct GenerationOutput {
    /// Unique assets in token id order.
    pub assets: Vec<GeneratedAsset>,
    /// Batch statistics.
    pub statistics: CollectionStatistics,
    /// Seed the run drew from; pass it back to reproduce the run.
    pub seed: u64,
    /// Draws consumed, including rejected duplicates.
    pub attempts: usize,
    /// Whether a stop predicate ended the run early.
    pub stopped: bool,
}

/// An accepted draw waiting to be composited.
struct Draw {
    token_id: u64,
    attributes: Vec<Attribute>,
    dna: Dna,
    layers: Vec<ResolvedLayer>,
    warnings: Vec<AssetWarning>,
}

/// Drives select → guard → composite → score for one validated request.
#[derive(Debug)]
pub struct Generator {
    request: GenerationRequest,
    store: TraitStore,
    compositor: Arc<Compositor>,
    renderer: VariantRenderer,
    pool: Option<rayon::ThreadPool>,
}

impl Generator {
    /// Validate `request` and prepare the compositor chain.
    pub fn new(request: GenerationRequest, resolver: Arc<dyn FileResolver>) -> ForgeResult<Self> {
        Self::with_compositor(request, resolver, None)
    }

    /// Like [`Generator::new`] but with a caller-built compositor chain instead of
    /// `request.backends`.
    pub fn with_compositor(
        request: GenerationRequest,
        resolver: Arc<dyn FileResolver>,
        compositor: Option<Compositor>,
    ) -> ForgeResult<Self> {
        request.validate(resolver.as_ref())?;
        let compositor =
            Arc::new(compositor.unwrap_or_else(|| Compositor::from_kinds(&request.backends)));
        let renderer = VariantRenderer::new(Arc::clone(&compositor), request.composite.background)
            .with_animation(request.animation);
        let pool = if request.threading.parallel {
            Some(build_thread_pool(request.threading.threads)?)
        } else {
            None
        };
        Ok(Self {
            store: TraitStore::new(resolver, request.composite.canvas),
            request,
            compositor,
            renderer,
            pool,
        })
    }

    /// The validated request.
    pub fn request(&self) -> &GenerationRequest {
        &self.request
    }

    /// Produce the full batch.
    pub fn generate(&self) -> ForgeResult<GenerationOutput> {
        self.generate_with(&|| false)
    }

    /// Produce the batch, checking `stop` before every draw. A stopped run returns the
    /// assets accepted so far, scored over that partial set.
    #[tracing::instrument(skip_all, fields(batch = self.request.batch_size))]
    pub fn generate_with(&self, stop: &dyn Fn() -> bool) -> ForgeResult<GenerationOutput> {
        let seed = self.request.seed.unwrap_or_else(rand::random);
        tracing::info!(
            seed,
            layers = self.request.catalog.len(),
            combinations = self.request.catalog.total_combinations(),
            "generation started"
        );

        let mut session = GenerationSession::new(seed, self.request.batch_size);
        let (draws, stopped) = self.draw_phase(&mut session, stop)?;
        let mut assets = self.composite_phase(draws)?;

        let counts = score_assets(&mut assets, &self.request.rarity_weights);
        let statistics = collection_statistics(&self.request.catalog, &assets, counts);

        tracing::info!(
            generated = assets.len(),
            attempts = session.attempts(),
            degraded = assets.iter().filter(|a| a.is_degraded()).count(),
            stopped,
            "generation finished"
        );
        Ok(GenerationOutput {
            assets,
            statistics,
            seed,
            attempts: session.attempts(),
            stopped,
        })
    }

    fn draw_phase(
        &self,
        session: &mut GenerationSession,
        stop: &dyn Fn() -> bool,
    ) -> ForgeResult<(Vec<Draw>, bool)> {
        let requested = self.request.batch_size;
        let mut draws = Vec::with_capacity(requested);
        while draws.len() < requested {
            if stop() {
                tracing::info!(produced = draws.len(), "generation stopped by caller");
                return Ok((draws, true));
            }
            if !session.begin_attempt() {
                return Err(ForgeError::UniquenessExhausted {
                    produced: draws.len(),
                    requested,
                    attempts: session.attempts(),
                });
            }
            match self.draw_one(session)? {
                Some(draw) => draws.push(draw),
                None => tracing::debug!(attempt = session.attempts(), "duplicate draw rejected"),
            }
        }
        Ok((draws, false))
    }

    fn draw_one(&self, session: &mut GenerationSession) -> ForgeResult<Option<Draw>> {
        let catalog = &self.request.catalog;
        let stack = select_stack(catalog, session.rng())?;

        let mut attributes = Vec::with_capacity(stack.len());
        let mut layers = Vec::with_capacity(stack.len());
        let mut warnings = Vec::new();
        for (layer_idx, &trait_idx) in stack.iter().enumerate() {
            let layer = &catalog.layers()[layer_idx];
            let t = &layer.traits[trait_idx];
            match self.store.get(catalog, (layer_idx, trait_idx)) {
                Ok(raster) => {
                    attributes.push(Attribute {
                        trait_type: layer.name.clone(),
                        value: t.name.clone(),
                    });
                    layers.push(ResolvedLayer {
                        layer: layer.name.clone(),
                        raster,
                    });
                }
                Err(e) => match self.request.missing_resources {
                    MissingResourcePolicy::Strict => return Err(e),
                    MissingResourcePolicy::Lenient => {
                        tracing::warn!(layer = %layer.name, file = %t.file, error = %e, "skipping attribute");
                        warnings.push(AssetWarning {
                            layer: layer.name.clone(),
                            value: t.name.clone(),
                            file: t.file.clone(),
                            message: e.to_string(),
                        });
                    }
                },
            }
        }

        let dna = Dna::from_pairs(
            attributes
                .iter()
                .map(|a| (a.trait_type.as_str(), a.value.as_str())),
        );
        Ok(session.accept(&dna).map(|token_id| Draw {
            token_id,
            attributes,
            dna,
            layers,
            warnings,
        }))
    }

    fn composite_phase(&self, draws: Vec<Draw>) -> ForgeResult<Vec<GeneratedAsset>> {
        match &self.pool {
            Some(pool) => pool.install(|| {
                draws
                    .into_par_iter()
                    .map(|d| self.composite_draw(d))
                    .collect::<ForgeResult<Vec<_>>>()
            }),
            None => draws.into_iter().map(|d| self.composite_draw(d)).collect(),
        }
    }

    fn composite_draw(&self, draw: Draw) -> ForgeResult<GeneratedAsset> {
        let job = plan_job(&self.request.composite, &draw.layers)?;
        let outcome = self.compositor.composite(&job)?;
        if outcome.is_degraded() {
            tracing::warn!(token_id = draw.token_id, "asset composited with the degraded fallback");
        }
        Ok(GeneratedAsset {
            token_id: draw.token_id,
            attributes: draw.attributes,
            dna: draw.dna,
            raw_composite: outcome.raster,
            backend: outcome.backend,
            rarity_score: 0.0,
            rarity_rank: 0,
            yield_multiplier: 1.0,
            warnings: draw.warnings,
            layers: draw.layers,
        })
    }

    /// Composite job for `asset` under this run's options.
    pub fn job_for(&self, asset: &GeneratedAsset) -> ForgeResult<CompositeJob> {
        plan_job(&self.request.composite, asset.layers())
    }

    /// Render `specs` for one asset.
    pub fn render_variants(
        &self,
        asset: &GeneratedAsset,
        specs: &[VariantSpec],
    ) -> ForgeResult<Vec<VariantBuffer>> {
        let job = self.job_for(asset)?;
        self.renderer.render_all(&asset.raw_composite, &job, specs)
    }

    /// Batch-level looping preview, one frame per asset in token id order.
    pub fn render_preview(
        &self,
        assets: &[GeneratedAsset],
        spec: &PreviewSpec,
    ) -> ForgeResult<VariantBuffer> {
        let mut frames: Vec<(u64, &Raster)> = assets
            .iter()
            .map(|a| (a.token_id, &a.raw_composite))
            .collect();
        frames.sort_by_key(|(id, _)| *id);
        self.renderer.preview(&frames, spec)
    }
}

fn build_thread_pool(threads: Option<usize>) -> ForgeResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(ForgeError::configuration("'threads' must be >= 1 when set"));
    }
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| ForgeError::configuration(format!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/generate/orchestrator.rs"]
mod tests;
