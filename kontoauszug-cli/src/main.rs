use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use kontoauszug_core::EngineConfig;
use kontoauszug_ingest::Engine;
use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

mod config;
mod convert;
mod inspect;
mod state;

use config::{load_config, Config, OutputFormat};
use convert::{discover_inputs, run_convert, ConvertOptions};

const LONG_VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("KONTOAUSZUG_BUILD_SHA"), ")");

#[derive(Parser, Debug)]
#[command(
    name = "kontoauszug",
    version,
    long_version = LONG_VERSION,
    about = "Convert bank statement PDFs into Buchungsdatum;Valutadatum;Buchungstext;Soll;Haben tables"
)]
struct Cli {
    /// More log output (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Config file (default: ~/.kontoauszug/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert statements to one CSV/JSON file each
    Convert(ConvertArgs),

    /// Show reconstructed rows and how each one is classified
    Inspect {
        /// Statement PDF or token dump
        file: PathBuf,

        /// Only this page (1-based)
        #[arg(long)]
        page: Option<usize>,

        #[command(flatten)]
        engine: EngineArgs,
    },

    /// Save the positioned words of a PDF as a JSON token dump
    DumpTokens {
        pdf: PathBuf,

        /// Output file (default: <pdf stem>.tokens.json next to the PDF)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Write a default config file if none exists
    InitConfig,
}

#[derive(Args, Debug)]
struct ConvertArgs {
    /// Statements to convert (default: every PDF / token dump in the input directory)
    files: Vec<PathBuf>,

    #[arg(long)]
    input_dir: Option<PathBuf>,

    #[arg(long)]
    output_dir: Option<PathBuf>,

    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    /// Statements converted in parallel
    #[arg(long)]
    jobs: Option<usize>,

    /// Give up on a statement after this many seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Abort on the first failing statement
    #[arg(long)]
    fail_fast: bool,

    #[command(flatten)]
    engine: EngineArgs,
}

#[derive(Args, Debug)]
struct EngineArgs {
    /// Vertical tolerance for grouping words into rows
    #[arg(long)]
    row_tolerance: Option<f64>,

    /// Year removed from descriptions when it stands alone (repeatable)
    #[arg(long = "noise-year")]
    noise_years: Vec<u16>,

    /// Keep all years in descriptions
    #[arg(long, conflicts_with = "noise_years")]
    no_noise_year: bool,
}

impl EngineArgs {
    fn apply(&self, cfg: &mut EngineConfig) {
        if let Some(tol) = self.row_tolerance {
            cfg.layout.row_tolerance = tol;
        }
        if self.no_noise_year {
            cfg.normalize.noise_years.clear();
        } else if !self.noise_years.is_empty() {
            cfg.normalize.noise_years = self.noise_years.clone();
        }
    }
}

impl ConvertArgs {
    fn apply(&self, cfg: &mut Config) {
        if let Some(dir) = &self.input_dir {
            cfg.input_dir = dir.clone();
        }
        if let Some(dir) = &self.output_dir {
            cfg.output_dir = dir.clone();
        }
        if let Some(format) = self.format {
            cfg.format = format;
        }
        if let Some(jobs) = self.jobs {
            cfg.jobs = jobs;
        }
        if let Some(secs) = self.timeout_secs {
            cfg.timeout_secs = Some(secs);
        }
        self.engine.apply(&mut cfg.engine);
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Drive `fut` to completion, then leave without waiting for the blocking pool.
///
/// Extractions abandoned after a timeout may still be running there.
fn block_on_detached<F: Future>(fut: F) -> Result<F::Output> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("start async runtime")?;
    let output = runtime.block_on(fut);
    runtime.shutdown_background();
    Ok(output)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    block_on_detached(run(cli))?
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Convert(args) => {
            let mut cfg = load_config(cli.config.as_deref())?;
            args.apply(&mut cfg);
            let engine = Engine::new(&cfg.engine)?;

            let inputs = if args.files.is_empty() {
                discover_inputs(&cfg.input_dir)?
            } else {
                args.files.clone()
            };

            run_convert(
                engine,
                ConvertOptions {
                    inputs,
                    output_dir: cfg.output_dir,
                    format: cfg.format.into(),
                    jobs: cfg.jobs,
                    timeout: cfg.timeout_secs.map(Duration::from_secs),
                    fail_fast: args.fail_fast,
                },
            )
            .await?;
        }

        Command::Inspect { file, page, engine } => {
            let mut cfg = load_config(cli.config.as_deref())?;
            engine.apply(&mut cfg.engine);
            let engine = Engine::new(&cfg.engine)?;
            inspect::run_inspect(&engine, &file, page)?;
        }

        Command::DumpTokens { pdf, out } => {
            inspect::run_dump_tokens(&pdf, out)?;
        }

        Command::InitConfig => {
            config::init_config(cli.config.as_deref())?;
        }
    }

    Ok(())
}
