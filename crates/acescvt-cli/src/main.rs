//! acescvt - batch ACES texture colorspace converter
//!
//! Groups texture files by series, guesses a map type per group and
//! converts them through an external colorspace tool.

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "acescvt")]
#[command(author, version, about = "Batch ACES texture colorspace converter")]
#[command(long_about = "
Scans a texture directory, folds UDIM tiles and frame series into groups,
guesses a map type per group and converts the selected groups through an
external colorspace tool (oiiotool by default). Converted files are copied
back next to their sources, overwriting files with the same name.

Map types:
  Raw       Utility - Raw            -> ACES - ACEScg  (.exr)
  Color     Utility - sRGB - Texture -> ACES - ACEScg  (.exr)
  HDR       Utility - Linear - sRGB  -> ACES - ACEScg  (.exr)
  Plate     Output - sRGB            -> ACES - ACEScg  (.exr)
  Out-sRGB  ACES - ACEScg            -> Output - sRGB  (.png)

Examples:
  acescvt scan ./textures                      # List groups and map types
  acescvt scan ./textures --filter srgb -v     # Only sRGB images, with files
  acescvt plan ./textures -t 'wood_normal.<UDIM>.png=raw'
  acescvt convert ./textures --only 'wood_diffuse.<UDIM>.png' --yes
  acescvt convert ./textures --all-type plate --dry-run
  acescvt config show
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output (repeat for more)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Settings file (default: platform config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Also write logs to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// List texture groups and their map types
    #[command(visible_alias = "s")]
    Scan(ScanArgs),

    /// Show what a conversion would do
    #[command(visible_alias = "p")]
    Plan(SelectArgs),

    /// Convert selected groups and copy results back
    #[command(visible_alias = "c")]
    Convert(ConvertArgs),

    /// Show settings
    Config(ConfigArgs),
}

/// Arguments for the `scan` command.
#[derive(Args)]
struct ScanArgs {
    /// Texture directory (default: host probe, then last directory)
    dir: Option<PathBuf>,

    /// Extension filter: srgb, hdr, all
    #[arg(short, long, default_value = "all")]
    filter: String,

    /// Sort by: name, type
    #[arg(short, long, default_value = "name")]
    sort: String,

    /// Machine-readable output (JSON)
    #[arg(long)]
    json: bool,
}

/// Group selection and map type overrides shared by `plan` and `convert`.
#[derive(Args)]
struct SelectArgs {
    /// Texture directory (default: host probe, then last directory)
    dir: Option<PathBuf>,

    /// Extension filter: srgb, hdr, all
    #[arg(short, long, default_value = "all")]
    filter: String,

    /// Override one group's map type (KEY=TYPE), repeatable
    #[arg(short = 't', long = "type", value_name = "KEY=TYPE")]
    types: Vec<String>,

    /// Select only these groups (default: every visible group)
    #[arg(long, value_name = "KEY")]
    only: Vec<String>,

    /// Select single files of a group (KEY:INDEX, 0-based), repeatable
    #[arg(long, value_name = "KEY:INDEX")]
    pick: Vec<String>,

    /// Set one map type on every selected group
    #[arg(long, value_name = "TYPE")]
    all_type: Option<String>,
}

/// Arguments for the `convert` command.
#[derive(Args)]
struct ConvertArgs {
    #[command(flatten)]
    select: SelectArgs,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    yes: bool,

    /// Print the plan and exit
    #[arg(short = 'n', long)]
    dry_run: bool,

    /// Converter executable (overrides settings)
    #[arg(long)]
    program: Option<String>,
}

/// Arguments for the `config` command.
#[derive(Args)]
struct ConfigArgs {
    /// What to print: show, path
    #[arg(default_value = "show")]
    action: String,
}

/// Installs the tracing subscriber; returns the appender guard to keep alive.
fn init_tracing(
    verbosity: u8,
    log_file: Option<&PathBuf>,
) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    use tracing_subscriber::fmt::writer::MakeWriterExt;

    let level = match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let env_filter = EnvFilter::from_default_env().add_directive(level.into());

    match log_file {
        Some(path) => {
            let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
            let dir = dir.map(PathBuf::from).unwrap_or_else(|| PathBuf::from("."));
            let name = path.file_name().context("Log file needs a file name")?;
            let appender = tracing_appender::rolling::never(dir, name);
            let (file_writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr.and(file_writer))
                .with_target(false)
                .with_ansi(false)
                .init();
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact()
                .init();
            Ok(None)
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let _guard = init_tracing(cli.verbose, cli.log_file.as_ref())?;

    let ctx = commands::Context::load(cli.config.clone(), cli.verbose)?;

    match cli.command {
        Commands::Scan(args) => commands::scan::run(args, &ctx),
        Commands::Plan(args) => commands::plan::run(args, &ctx),
        Commands::Convert(args) => commands::convert::run(args, &ctx),
        Commands::Config(args) => commands::config::run(args, &ctx),
    }
}
