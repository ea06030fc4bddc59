use std::path::{Path, PathBuf};
use std::process::ExitCode;

use ccmark::config::Config;
use ccmark::{Error, commands, keywords, watch};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter.
const LOG_ENV: &str = "CCMARK_LOG";

/// Top-level arguments.
#[derive(Parser)]
#[command(name = "ccmark", about = "Classify C/C++ sources and render them as highlighted HTML")]
struct Cli {
    /// The command to run.
    #[command(subcommand)]
    command: Commands,
    /// Config file to use instead of ./.ccmark.toml
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Render sources to HTML
    Html(RenderArgs),
    /// Print how one source file was classified
    Index {
        /// Source file to classify
        file: PathBuf,
        /// Print the whole index as JSON
        #[arg(long)]
        json: bool,
    },
    /// Render sources, then re-render whenever they change
    Watch(RenderArgs),
}

/// Inputs and layout flags shared by `html` and `watch`.
#[derive(Args)]
struct RenderArgs {
    /// Stylesheet linked from each document
    #[arg(long, value_name = "PATH")]
    css: Option<String>,
    /// Source files or directories to walk
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
    /// Width of zero-padded line numbers
    #[arg(long, value_name = "N", value_parser = parse_positive)]
    line_numbers: Option<usize>,
    /// Emit bare HTML without the document header
    #[arg(long)]
    no_header: bool,
    /// Write every document into this existing or new directory
    #[arg(long, value_name = "DIR")]
    outdir: Option<PathBuf>,
    /// Columns per tab stop
    #[arg(long, value_name = "N", value_parser = parse_positive)]
    tab_size: Option<usize>,
}

impl RenderArgs {
    /// Let command-line flags override the config file.
    fn apply(&self, config: &mut Config) {
        if let Some(css) = &self.css {
            config.css.clone_from(css);
        }
        if let Some(width) = self.line_numbers {
            config.line_number_width = width;
        }
        if self.no_header {
            config.no_header = true;
        }
        if let Some(dir) = &self.outdir {
            config.output_dir = Some(dir.clone());
        }
        if let Some(size) = self.tab_size {
            config.tab_size = size;
        }
    }
}

/// Accept only integers greater than zero.
fn parse_positive(value: &str) -> Result<usize, String> {
    return match value.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(format!("expected a positive integer, got `{value}`")),
    };
}

/// Log to stderr, filtered by `CCMARK_LOG` (warnings only by default).
fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| return EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Parse arguments, set up logging and run the chosen command.
fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging();
    keywords::warm_up();

    return match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        },
    };
}

/// Load config and dispatch to the chosen command.
///
/// # Errors
///
/// Returns config errors and whatever the command returns.
fn run(cli: Cli) -> Result<ExitCode, Error> {
    let mut config = match cli.config.as_deref() {
        Some(path) => Config::load_from(path)?,
        None => Config::load(Path::new("."))?,
    };

    return match cli.command {
        Commands::Html(args) => {
            args.apply(&mut config);
            commands::html(&args.inputs, &config)
        },
        Commands::Index { file, json } => commands::index(&file, json, &config),
        Commands::Watch(args) => {
            args.apply(&mut config);
            watch::run(&args.inputs, &config)
        },
    };
}
