use std::{cell::Cell, collections::HashSet};

use super::*;
use crate::{
    catalog::{
        model::{Layer, LayerCatalog, Trait},
        resolver::MemoryResolver,
    },
    foundation::core::Canvas,
    generate::request::ThreadingOptions,
    render::{backend::RenderBackend, compositor::FALLBACK_BACKEND},
    variant::spec::OutputFormat,
};

fn png(rgba: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(8, 8, image::Rgba(rgba));
    let mut out = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut std::io::Cursor::new(&mut out), image::ImageFormat::Png)
        .unwrap();
    out
}

fn layer(name: &str, traits: &[(&str, f64)]) -> Layer {
    Layer {
        name: name.to_string(),
        path: name.to_string(),
        traits: traits
            .iter()
            .map(|(t, w)| Trait {
                name: t.to_string(),
                weight: *w,
                file: format!("{t}.png"),
            })
            .collect(),
    }
}

fn resolver_for(catalog: &LayerCatalog) -> MemoryResolver {
    let mut r = MemoryResolver::new();
    for (li, l) in catalog.layers().iter().enumerate() {
        for (ti, t) in l.traits.iter().enumerate() {
            let alpha = if li == 0 { 255 } else { 160 };
            r.insert(
                &l.path,
                &t.file,
                png([(ti * 90) as u8, (li * 120) as u8, 40, alpha]),
            );
        }
    }
    r
}

fn two_by_two() -> LayerCatalog {
    LayerCatalog::new(vec![
        layer("bg", &[("red", 70.0), ("blue", 30.0)]),
        layer("hat", &[("cap", 50.0), ("crown", 50.0)]),
    ])
}

fn request(catalog: LayerCatalog, batch: usize, seed: u64) -> GenerationRequest {
    let mut req = GenerationRequest::new(catalog, batch);
    req.seed = Some(seed);
    req.composite.canvas = Canvas {
        width: 16,
        height: 16,
    };
    req
}

fn generator(req: GenerationRequest, resolver: MemoryResolver) -> Generator {
    Generator::new(req, Arc::new(resolver)).unwrap()
}

#[test]
fn full_space_batch_covers_every_combination() {
    let cat = two_by_two();
    let res = resolver_for(&cat);
    let out = generator(request(cat, 4, 11), res).generate().unwrap();

    assert_eq!(out.assets.len(), 4);
    assert!(out.attempts <= 40);
    let combos: HashSet<(String, String)> = out
        .assets
        .iter()
        .map(|a| {
            (
                a.attribute("bg").unwrap().to_string(),
                a.attribute("hat").unwrap().to_string(),
            )
        })
        .collect();
    assert_eq!(combos.len(), 4);
    let dnas: HashSet<&str> = out.assets.iter().map(|a| a.dna.as_str()).collect();
    assert_eq!(dnas.len(), 4);
    assert_eq!(out.statistics.total_combinations, 4);
    assert_eq!(out.statistics.actual_generated, 4);
}

#[test]
fn tokens_attributes_and_ranks_are_ordered() {
    let cat = two_by_two();
    let res = resolver_for(&cat);
    let out = generator(request(cat, 3, 5), res).generate().unwrap();

    let ids: Vec<u64> = out.assets.iter().map(|a| a.token_id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
    for a in &out.assets {
        let layers: Vec<&str> = a.attributes.iter().map(|x| x.trait_type.as_str()).collect();
        assert_eq!(layers, vec!["bg", "hat"]);
        assert_eq!((a.raw_composite.width, a.raw_composite.height), (16, 16));
        assert_eq!(a.backend, "vello");
    }
    let mut ranks: Vec<usize> = out.assets.iter().map(|a| a.rarity_rank).collect();
    ranks.sort_unstable();
    assert_eq!(ranks, vec![1, 2, 3]);
}

#[test]
fn oversized_batch_fails_before_generation() {
    let cat = two_by_two();
    let res = resolver_for(&cat);
    let err = Generator::new(request(cat, 10, 1), Arc::new(res)).unwrap_err();
    assert!(matches!(err, ForgeError::Configuration(_)));
}

#[test]
fn same_seed_reproduces_the_run() {
    let cat = two_by_two();
    let a = generator(request(cat.clone(), 3, 99), resolver_for(&cat))
        .generate()
        .unwrap();
    let b = generator(request(cat.clone(), 3, 99), resolver_for(&cat))
        .generate()
        .unwrap();
    let dna = |o: &GenerationOutput| o.assets.iter().map(|x| x.dna.clone()).collect::<Vec<_>>();
    assert_eq!(dna(&a), dna(&b));
    assert_eq!(a.seed, 99);
    assert_eq!(a.attempts, b.attempts);
}

#[test]
fn unseeded_runs_report_their_seed() {
    let cat = two_by_two();
    let mut req = request(cat.clone(), 2, 0);
    req.seed = None;
    let out = generator(req, resolver_for(&cat)).generate().unwrap();

    let replay = generator(request(cat.clone(), 2, out.seed), resolver_for(&cat))
        .generate()
        .unwrap();
    let dna = |o: &GenerationOutput| o.assets.iter().map(|x| x.dna.clone()).collect::<Vec<_>>();
    assert_eq!(dna(&out), dna(&replay));
}

#[test]
fn parallel_compositing_matches_sequential() {
    let cat = two_by_two();
    let seq = generator(request(cat.clone(), 4, 3), resolver_for(&cat))
        .generate()
        .unwrap();
    let mut req = request(cat.clone(), 4, 3);
    req.threading = ThreadingOptions {
        parallel: true,
        threads: Some(2),
    };
    let par = generator(req, resolver_for(&cat)).generate().unwrap();

    for (a, b) in seq.assets.iter().zip(&par.assets) {
        assert_eq!(a.token_id, b.token_id);
        assert_eq!(a.dna, b.dna);
        assert_eq!(a.raw_composite, b.raw_composite);
    }
}

fn broken_hat() -> (LayerCatalog, MemoryResolver) {
    let cat = LayerCatalog::new(vec![
        layer("bg", &[("red", 1.0), ("blue", 1.0)]),
        layer("hat", &[("cap", 1.0)]),
    ]);
    let mut res = resolver_for(&cat);
    res.insert("hat", "cap.png", b"not an image".to_vec());
    (cat, res)
}

#[test]
fn lenient_policy_skips_unreadable_attribute() {
    let (cat, res) = broken_hat();
    let out = generator(request(cat, 2, 8), res).generate().unwrap();

    assert_eq!(out.assets.len(), 2);
    for a in &out.assets {
        assert_eq!(a.attributes.len(), 1);
        assert!(a.attribute("hat").is_none());
        assert_eq!(a.warnings.len(), 1);
        assert_eq!(a.warnings[0].layer, "hat");
        assert_eq!(a.warnings[0].file, "cap.png");

        let bg = a.attribute("bg").unwrap();
        let full = Dna::from_pairs([("bg", bg), ("hat", "cap")]);
        assert_ne!(a.dna, full);
        assert_eq!(a.dna, Dna::from_pairs([("bg", bg)]));
    }
}

#[test]
fn strict_policy_aborts_on_unreadable_attribute() {
    let (cat, res) = broken_hat();
    let mut req = request(cat, 2, 8);
    req.missing_resources = MissingResourcePolicy::Strict;
    let err = generator(req, res).generate().unwrap_err();
    assert!(
        matches!(&err, ForgeError::ResourceNotFound { layer, file, .. } if layer == "hat" && file == "cap.png"),
        "{err}"
    );
}

#[test]
fn collapsing_fingerprints_exhaust_the_budget() {
    let cat = LayerCatalog::new(vec![
        layer("bg", &[("red", 1.0)]),
        layer("hat", &[("cap", 1.0), ("crown", 1.0)]),
    ]);
    let mut res = resolver_for(&cat);
    res.insert("hat", "cap.png", b"junk".to_vec());
    res.insert("hat", "crown.png", b"junk".to_vec());

    let err = generator(request(cat, 2, 1), res).generate().unwrap_err();
    match err {
        ForgeError::UniquenessExhausted {
            produced,
            requested,
            attempts,
        } => {
            assert_eq!(produced, 1);
            assert_eq!(requested, 2);
            assert_eq!(attempts, 20);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn stop_predicate_returns_partial_scored_batch() {
    let cat = two_by_two();
    let res = resolver_for(&cat);
    let gen_ = generator(request(cat, 4, 2), res);
    let checks = Cell::new(0usize);
    let out = gen_
        .generate_with(&|| {
            checks.set(checks.get() + 1);
            checks.get() > 2
        })
        .unwrap();

    assert!(out.stopped);
    assert_eq!(out.attempts, 2);
    assert!(!out.assets.is_empty() && out.assets.len() <= 2);
    assert_eq!(out.statistics.actual_generated, out.assets.len());
    assert!(out.assets.iter().all(|a| a.rarity_rank >= 1));
}

struct Broken;

impl RenderBackend for Broken {
    fn name(&self) -> &'static str {
        "broken"
    }

    fn composite(&self, _job: &CompositeJob) -> ForgeResult<Raster> {
        Err(ForgeError::backend("broken", "always fails"))
    }
}

#[test]
fn failing_backends_degrade_to_first_layer() {
    let cat = two_by_two();
    let res = resolver_for(&cat);
    let gen_ = Generator::with_compositor(
        request(cat, 2, 4),
        Arc::new(res),
        Some(Compositor::new(vec![Box::new(Broken)])),
    )
    .unwrap();
    let out = gen_.generate().unwrap();
    for a in &out.assets {
        assert_eq!(a.backend, FALLBACK_BACKEND);
        assert!(a.is_degraded());
        assert_eq!(&a.raw_composite, a.layers()[0].raster.as_ref());
    }
}

#[test]
fn variants_and_preview_render_on_demand() {
    let cat = two_by_two();
    let res = resolver_for(&cat);
    let gen_ = generator(request(cat, 2, 6), res);
    let out = gen_.generate().unwrap();

    let specs = [
        VariantSpec {
            name: "thumb".to_string(),
            width: 10,
            height: 6,
            ..VariantSpec::default()
        },
        VariantSpec {
            name: "loop".to_string(),
            width: 12,
            height: 12,
            format: OutputFormat::Gif,
            animated: true,
            frame_count: 3,
            delay_ms: 50,
            ..VariantSpec::default()
        },
    ];
    let bufs = gen_.render_variants(&out.assets[0], &specs).unwrap();
    assert_eq!(bufs.len(), 2);
    assert_eq!((bufs[0].width, bufs[0].height), (10, 6));
    assert_eq!(bufs[1].frame_count, 3);
    assert_eq!(bufs[1].duration_ms, 150);

    let mut reversed = out.assets.clone();
    reversed.reverse();
    let preview = gen_
        .render_preview(&reversed, &PreviewSpec::default())
        .unwrap();
    assert_eq!(preview.frame_count, 2);
}
