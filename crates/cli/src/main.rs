use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use config::HarnessConfig;
use patchmark_manifest::InstrumentMode;
use std::path::PathBuf;

mod commands;
mod config;

#[derive(Parser)]
#[command(name = "patchmark")]
#[command(about = "Annotation manifests and ground-truth patches for vulnerable C/C++ challenges", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors
    #[arg(long, global = true)]
    quiet: bool,

    /// TOML settings file (overrides PATCHMARK_CONFIG)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the listing of files that contain annotated blocks
    Manifest(ManifestArgs),

    /// Write the patch branches as JSON
    Patch(BranchArgs),

    /// Write the vulnerable branches as JSON
    Vuln(BranchArgs),

    /// Print the vulnerable hunks of every annotated file
    Hunks(RootArgs),

    /// Print line statistics
    Stats(StatsArgs),

    /// Rewrite sources so only the vulnerable code remains
    #[command(name = "remove-patches")]
    RemovePatches(RemovePatchesArgs),

    /// Write one fault-localization row per vulnerable line
    #[command(name = "fault-loc")]
    FaultLoc(FaultLocArgs),

    /// Map annotated sources to files produced by a repair tool
    #[command(name = "map-instrumented")]
    MapInstrumented(MapInstrumentedArgs),

    /// Delete generated artifacts from the source root
    Clean(RootArgs),
}

#[derive(Args)]
struct RootArgs {
    /// Challenge source root (defaults to current directory)
    #[arg(default_value = ".")]
    root: PathBuf,
}

#[derive(Args)]
struct ManifestArgs {
    #[command(flatten)]
    root: RootArgs,

    /// Output file (defaults to <root>/manifest)
    #[arg(long)]
    out: Option<PathBuf>,

    /// Append each file's vulnerable hunks (`path:start,end;`)
    #[arg(long)]
    hunks: bool,

    /// Print the manifest instead of its path
    #[arg(long)]
    show: bool,
}

#[derive(Args)]
struct BranchArgs {
    #[command(flatten)]
    root: RootArgs,

    /// Output file (defaults to <root>/patch or <root>/vuln)
    #[arg(long)]
    out: Option<PathBuf>,

    /// Regenerate even if the artifact already exists
    #[arg(long)]
    force: bool,

    /// Print `file line code` rows instead of the artifact path
    #[arg(long)]
    show: bool,
}

#[derive(Args)]
struct StatsArgs {
    #[command(flatten)]
    root: RootArgs,

    /// Output as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct RemovePatchesArgs {
    #[command(flatten)]
    root: RootArgs,

    /// Rewrite the files named in this manifest listing instead of walking
    #[arg(long)]
    from_manifest: Option<PathBuf>,
}

#[derive(Args)]
struct FaultLocArgs {
    #[command(flatten)]
    root: RootArgs,

    /// Directory the reported paths are joined onto (defaults to the root)
    #[arg(long)]
    base: Option<PathBuf>,

    /// Output file (defaults to <root>/fault_localization)
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Args)]
struct MapInstrumentedArgs {
    #[command(flatten)]
    root: RootArgs,

    /// Whether the files are preprocessor output
    #[arg(long, value_enum, default_value_t = ModeArg::Raw)]
    mode: ModeArg,

    /// Files produced by the repair tool
    #[arg(long = "file", required = true)]
    files: Vec<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    Raw,
    Preprocessed,
}

impl From<ModeArg> for InstrumentMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Raw => Self::Raw,
            ModeArg::Preprocessed => Self::Preprocessed,
        }
    }
}

fn main() -> Result<()> {
    let mut cli = Cli::parse();

    // Keep stdout machine-readable
    let json_output = matches!(
        &cli.command,
        Commands::Stats(StatsArgs { json: true, .. }) | Commands::MapInstrumented(_)
    );
    if json_output {
        cli.quiet = true;
    }

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    let config = HarnessConfig::load(cli.config.as_deref())?;
    let ctx = commands::Context::new(config)?;

    match cli.command {
        Commands::Manifest(args) => {
            commands::run_manifest(&ctx, &args.root.root, args.out, args.hunks, args.show)
        }
        Commands::Patch(args) => commands::run_branch(
            &ctx,
            commands::Branch::Patch,
            &args.root.root,
            args.out,
            args.force,
            args.show,
        ),
        Commands::Vuln(args) => commands::run_branch(
            &ctx,
            commands::Branch::Vuln,
            &args.root.root,
            args.out,
            args.force,
            args.show,
        ),
        Commands::Hunks(args) => commands::run_hunks(&ctx, &args.root),
        Commands::Stats(args) => commands::run_stats(&ctx, &args.root.root, args.json),
        Commands::RemovePatches(args) => {
            commands::run_remove_patches(&ctx, &args.root.root, args.from_manifest)
        }
        Commands::FaultLoc(args) => {
            commands::run_fault_loc(&ctx, &args.root.root, args.base, args.out)
        }
        Commands::MapInstrumented(args) => commands::run_map_instrumented(
            &ctx,
            &args.root.root,
            &args.files,
            args.mode.into(),
        ),
        Commands::Clean(args) => commands::run_clean(&ctx, &args.root),
    }
}
