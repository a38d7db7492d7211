use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};

use livery::{
    BuildOpts, BuildThreading, CacheMode, DirTemplateLoader, LiveryBuilder, LiveryConfig,
    ResourcePaths, TemplateLoader as _,
};

#[derive(Parser, Debug)]
#[command(name = "livery", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build a livery from a JSON config.
    Build(BuildArgs),
    /// List the region names a template defines.
    Regions(RegionsArgs),
}

#[derive(Parser, Debug)]
struct BuildArgs {
    /// Livery config JSON.
    #[arg(long)]
    config: PathBuf,

    /// Resource root holding `templates/`, `decals/` and `textures/`
    /// [default: $LIVERY_RESOURCE_DIR or ./resources].
    #[arg(long)]
    resources: Option<PathBuf>,

    /// Reuse and record per-section snapshots.
    #[arg(long)]
    cache: bool,

    /// Snapshot directory [default: $LIVERY_CACHE_DIR or ./.layer_cache].
    #[arg(long, requires = "cache")]
    cache_dir: Option<PathBuf>,

    /// Build the layers of each section in parallel.
    #[arg(long)]
    parallel: bool,

    /// Worker threads for --parallel.
    #[arg(long, requires = "parallel")]
    threads: Option<usize>,

    /// Write the paint raster as PNG.
    #[arg(long)]
    out_paint: Option<PathBuf>,

    /// Write the spec raster as PNG.
    #[arg(long)]
    out_spec: Option<PathBuf>,

    /// Write car_<N>.tga and car_spec_<N>.tga to the config's output target.
    #[arg(long)]
    save: bool,
}

#[derive(Parser, Debug)]
struct RegionsArgs {
    /// Template name under `<resources>/templates`.
    template: String,

    /// Resource root [default: $LIVERY_RESOURCE_DIR or ./resources].
    #[arg(long)]
    resources: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Build(args) => cmd_build(args),
        Command::Regions(args) => cmd_regions(args),
    }
}

fn resources(root: Option<PathBuf>) -> ResourcePaths {
    root.map_or_else(ResourcePaths::from_env, ResourcePaths::from_root)
}

fn cmd_build(args: BuildArgs) -> anyhow::Result<()> {
    let config = LiveryConfig::from_path(&args.config)
        .with_context(|| format!("load config '{}'", args.config.display()))?;

    let cache = match (args.cache, args.cache_dir) {
        (false, _) => CacheMode::Disabled,
        (true, Some(dir)) => CacheMode::Enabled { dir },
        (true, None) => CacheMode::enabled_from_env(),
    };
    let opts = BuildOpts {
        resources: resources(args.resources),
        cache,
        threading: BuildThreading {
            parallel: args.parallel,
            threads: args.threads,
        },
    };

    let loader = DirTemplateLoader::new(opts.resources.templates.clone());
    let builder = LiveryBuilder::new(&config, &loader, opts).context("prepare build")?;
    let built = builder.build().context("build livery")?;

    if let Some(path) = &args.out_paint {
        livery::build::output::save_image(built.paint(), path, image::ImageFormat::Png)
            .with_context(|| format!("write paint '{}'", path.display()))?;
    }
    if let Some(path) = &args.out_spec {
        livery::build::output::save_image(built.spec(), path, image::ImageFormat::Png)
            .with_context(|| format!("write spec '{}'", path.display()))?;
    }
    if args.save {
        livery::save_livery(&built, config.output.as_ref()).context("save livery")?;
    }
    Ok(())
}

fn cmd_regions(args: RegionsArgs) -> anyhow::Result<()> {
    let loader = DirTemplateLoader::new(resources(args.resources).templates);
    let template = loader
        .load(&args.template)
        .with_context(|| format!("load template '{}'", args.template))?;
    println!(
        "{} ({}, sha256 {})",
        template.name, template.size, template.content_hash
    );
    for name in template.regions.names() {
        println!("  {name}");
    }
    Ok(())
}
