use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "layerforge", version)]
struct Cli {
    /// Log filter (overridden by `RUST_LOG`).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a collection: images, variants, metadata and a preview.
    Generate(GenerateArgs),
    /// Print layers, trait probabilities and the combination space.
    Inspect(InspectArgs),
}

#[derive(Parser, Debug)]
struct GenerateArgs {
    /// Run configuration JSON.
    #[arg(long)]
    config: PathBuf,

    /// Output directory.
    #[arg(long)]
    out: PathBuf,

    /// Override the configured seed.
    #[arg(long)]
    seed: Option<u64>,

    /// Override the configured batch size.
    #[arg(long)]
    count: Option<usize>,

    /// Composite on a dedicated thread pool.
    #[arg(long, default_value_t = false)]
    parallel: bool,

    /// Override rayon worker threads (parallel mode only).
    #[arg(long)]
    threads: Option<usize>,
}

#[derive(Parser, Debug)]
struct InspectArgs {
    /// Run configuration JSON.
    #[arg(long)]
    config: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level)?;
    match cli.cmd {
        Command::Generate(args) => cmd_generate(args),
        Command::Inspect(args) => cmd_inspect(args),
    }
}

fn init_tracing(level: &str) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .with_context(|| format!("invalid log filter '{level}'"))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

fn cmd_generate(args: GenerateArgs) -> anyhow::Result<()> {
    let mut cfg = layerforge::ForgeConfig::load(&args.config)?;
    if let Some(seed) = args.seed {
        cfg.seed = Some(seed);
    }
    if let Some(count) = args.count {
        cfg.batch_size = count;
    }
    if args.parallel {
        cfg.threading.parallel = true;
    }
    if args.threads.is_some() {
        cfg.threading.threads = args.threads;
    }

    let (request, resolver) = cfg.to_request()?;
    let generator = layerforge::Generator::new(request, resolver)?;
    let output = generator.generate()?;

    let composite = &generator.request().composite;
    for asset in &output.assets {
        let image_path = args
            .out
            .join("images")
            .join(format!("{}.{}", asset.token_id, composite.format.extension()));
        let bytes = layerforge::variant::encode::encode_still(
            &asset.raw_composite,
            composite.format,
            composite.quality,
            composite.background,
        )?;
        write_file(&image_path, &bytes)?;

        for buf in generator.render_variants(asset, &cfg.variants)? {
            let path = args
                .out
                .join("variants")
                .join(&buf.name)
                .join(format!("{}.{}", asset.token_id, buf.format.extension()));
            write_file(&path, &buf.bytes)?;
        }

        let meta = layerforge::AssetMetadata::from_asset(&cfg.collection, asset);
        write_file(
            &args
                .out
                .join("metadata")
                .join(format!("{}.json", asset.token_id)),
            meta.to_json()?.as_bytes(),
        )?;
    }

    if let Some(preview) = &cfg.preview
        && !output.assets.is_empty()
    {
        let buf = generator.render_preview(&output.assets, preview)?;
        write_file(&args.out.join("preview.gif"), &buf.bytes)?;
    }

    let manifest = layerforge::CollectionManifest::from_output(&cfg.collection, &output);
    write_file(&args.out.join("manifest.json"), manifest.to_json()?.as_bytes())?;

    eprintln!(
        "wrote {} assets to {} (seed {}, {} attempts)",
        output.assets.len(),
        args.out.display(),
        output.seed,
        output.attempts
    );
    Ok(())
}

fn cmd_inspect(args: InspectArgs) -> anyhow::Result<()> {
    let cfg = layerforge::ForgeConfig::load(&args.config)?;
    let catalog = cfg.catalog.load(&cfg.catalog_root())?;

    for layer in catalog.layers() {
        println!("{} ({} traits)", layer.name, layer.traits.len());
        for (t, p) in layer.traits.iter().zip(layer.selection_probabilities()) {
            println!("  {:<24} weight {:>8.2}  p {:>6.2}%", t.name, t.weight, p * 100.0);
        }
    }
    println!("combinations: {}", catalog.total_combinations());
    Ok(())
}

fn write_file(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(path, bytes).with_context(|| format!("write '{}'", path.display()))
}
