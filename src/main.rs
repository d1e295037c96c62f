use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{error, info};

use inspection_cases::config::{Config, DEFAULT_CONFIG_PATH};
use inspection_cases::output::{self, OutputFormat};
use inspection_cases::{extract_from_html, source, ExtractionReport};

#[derive(Parser)]
#[command(name = "inspection_cases")]
#[command(about = "Extract inspection cases from the yearly case-list document")]
#[command(version = "0.1.0")]
struct Cli {
    /// Also write JSON logs to daily files in this directory
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct InputArgs {
    /// Case list document (.html, or anything the configured converter accepts)
    #[arg(long)]
    input: PathBuf,
    /// Configuration file; defaults apply when the default path is absent
    #[arg(long)]
    config: Option<PathBuf>,
    /// Number of most recent year-tables to parse (1-10)
    #[arg(long)]
    years: Option<i64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract case records
    Extract {
        #[command(flatten)]
        input: InputArgs,
        #[arg(long, value_enum, default_value = "tsv")]
        format: OutputFormat,
        /// Write records here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Print per-supervisor caseloads, marking probable misspellings
    Audit {
        #[command(flatten)]
        input: InputArgs,
    },
}

fn run_pipeline(args: &InputArgs) -> Result<ExtractionReport> {
    let mut config = match &args.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => Config::load_or_default(DEFAULT_CONFIG_PATH)?,
    };
    if let Some(years) = args.years {
        config.include_last_n_years = years;
    }

    let html = source::load_markup(&args.input, &config)
        .with_context(|| format!("reading case list {}", args.input.display()))?;
    let report = extract_from_html(&html, &config)?;

    report.log_diagnostics();
    info!(
        records = report.stats.records,
        skipped = report.stats.rows_skipped,
        warnings = report.diagnostics.len(),
        "extraction finished"
    );
    Ok(report)
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    let _guard = inspection_cases::logging::init_logging(cli.log_dir.as_deref())
        .context("setting up logging")?;

    let result = match cli.command {
        Commands::Extract {
            input,
            format,
            output: out_path,
        } => run_pipeline(&input).and_then(|report| {
            let mut out: Box<dyn Write> = match &out_path {
                Some(path) => Box::new(BufWriter::new(
                    File::create(path).with_context(|| format!("creating {}", path.display()))?,
                )),
                None => Box::new(io::stdout().lock()),
            };
            output::write_report(&report, format, &mut out)?;
            Ok(())
        }),
        Commands::Audit { input } => run_pipeline(&input).and_then(|report| {
            output::write_caseload(&report, &mut io::stdout().lock())?;
            Ok(())
        }),
    };

    if let Err(e) = &result {
        error!("{:#}", e);
    }
    result
}
