mod cmd;
mod output;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::cmd::BuildArgs;
use crate::output::OutputFormat;

/// clocker - multi-platform image build frontend
#[derive(Parser)]
#[command(name = "clocker")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Increase log verbosity (-v info, -vv debug)
  #[arg(short, long, global = true, action = clap::ArgAction::Count)]
  verbose: u8,

  /// Output format
  #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Text)]
  output: OutputFormat,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Build a context directory for one or more platforms
  Build {
    /// Directory holding the build file
    #[arg(default_value = ".")]
    context: PathBuf,

    /// Build file name inside the context (default: clockerfile)
    #[arg(short, long)]
    file: Option<String>,

    /// Comma-separated target platforms (default: host)
    #[arg(short, long)]
    platform: Option<String>,

    /// Build argument as KEY=VALUE; `base` selects the base image
    #[arg(long = "build-arg", value_name = "KEY=VALUE")]
    build_args: Vec<String>,

    /// Registry reference to import build cache from
    #[arg(long = "cache-from", value_name = "REF")]
    cache_from: Vec<String>,

    /// JSON file mapping image references to image configs
    #[arg(long)]
    image_configs: Option<PathBuf>,

    /// Directory to write solved definitions to
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Start from options in the daemon's frontend environment
    #[arg(long)]
    from_env: bool,

    /// Cancel the build after this long (e.g. 30s, 5m)
    #[arg(long, value_parser = humantime::parse_duration)]
    timeout: Option<Duration>,
  },

  /// Resolve and print target platforms
  Platforms {
    /// Comma-separated platform list (default: host)
    spec: Option<String>,
  },
}

fn main() -> Result<()> {
  let cli = Cli::parse();

  let default_level = match cli.verbose {
    0 => "warn",
    1 => "info",
    _ => "debug",
  };
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  match cli.command {
    Commands::Build {
      context,
      file,
      platform,
      build_args,
      cache_from,
      image_configs,
      output_dir,
      from_env,
      timeout,
    } => cmd::cmd_build(
      BuildArgs {
        context,
        file,
        platform,
        build_args,
        cache_from,
        image_configs,
        output_dir,
        from_env,
        timeout,
      },
      cli.output,
    ),
    Commands::Platforms { spec } => cmd::cmd_platforms(spec.as_deref(), cli.output),
  }
}
