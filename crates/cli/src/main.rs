mod cmd;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use embuild_lib::consts::DEFAULT_TASK_FILE;

use cmd::BuildArgs;
use output::OutputFormat;

/// embuild - Build Emscripten targets declared in a task file
#[derive(Parser)]
#[command(name = "embuild")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Path to the task file
  #[arg(short, long, global = true, default_value = DEFAULT_TASK_FILE)]
  file: PathBuf,

  /// Enable verbose output
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Build targets (all of them, in file order, when none are named)
  Build(BuildArgs),

  /// Print the emcc command a target would run
  Show {
    /// Target to show
    target: String,

    /// Override the emcc executable
    #[arg(long)]
    emcc: Option<String>,

    #[arg(short, long, value_enum, default_value_t)]
    output: OutputFormat,
  },

  /// List the targets declared in the task file
  List {
    #[arg(short, long, value_enum, default_value_t)]
    output: OutputFormat,
  },
}

fn main() -> Result<()> {
  let cli = Cli::parse();

  init_logging(cli.verbose);

  match cli.command {
    Commands::Build(args) => cmd::cmd_build(&cli.file, &args),
    Commands::Show { target, emcc, output } => cmd::cmd_show(&cli.file, &target, emcc, output),
    Commands::List { output } => cmd::cmd_list(&cli.file, output),
  }
}

fn init_logging(verbose: bool) {
  let default_level = if verbose { "debug" } else { "info" };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .with_target(false)
    .without_time()
    .init();
}
