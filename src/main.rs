use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};

use sme_score::dossier::{load_dossier, load_partial, save_dossier, Period};
use sme_score::scoring::{evaluate, validate_scoring, Evaluation, ScoringConfig, ScoringOptions};
use sme_score::{config, output, telemetry, Dossier};

// Exit codes
const EXIT_SUCCESS: i32 = 0;
const EXIT_INPUT: i32 = 2;
const EXIT_CONFIG: i32 = 4;

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
enum Format {
    /// Human-readable report
    #[default]
    Text,
    /// Full result as pretty JSON
    Json,
    /// One tab-separated summary line
    Tsv,
}

#[derive(Args, Debug)]
struct EvalFlags {
    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Treat operating cash flow as monthly unless the dossier says otherwise
    #[arg(long)]
    monthly: bool,

    /// Evaluation date (YYYY-MM-DD), defaults to today
    #[arg(long, value_name = "DATE")]
    as_of: Option<NaiveDate>,
}

impl EvalFlags {
    fn overrides(&self) -> ScoringConfig {
        ScoringConfig {
            financial_period: self.monthly.then_some(Period::Monthly),
            as_of: self.as_of,
            ..Default::default()
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Score a dossier and print the decision
    Evaluate {
        /// Dossier JSON file
        dossier: PathBuf,
        #[command(flatten)]
        flags: EvalFlags,
    },
    /// Merge a legal/tax partial update into a dossier and save it
    Merge {
        /// Dossier JSON file
        dossier: PathBuf,
        /// Partial update JSON file
        partial: PathBuf,
        /// Write the merged dossier here instead of in place
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Evaluate the merged dossier afterwards
        #[arg(short, long)]
        evaluate: bool,
        #[command(flatten)]
        flags: EvalFlags,
    },
    /// Evaluate the built-in demo dossier
    Demo {
        /// Tax id to stamp on the demo dossier
        #[arg(long)]
        tax_id: Option<String>,
        #[command(flatten)]
        flags: EvalFlags,
    },
    /// Write a config file holding every default
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Parser, Debug)]
#[command(name = "sme-score")]
#[command(about = "SME credit-risk scoring and lending decision CLI", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/sme-score/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

fn fail(code: i32, what: &str, err: impl std::fmt::Display) -> ! {
    eprintln!("{}: {}", what, err);
    std::process::exit(code);
}

fn init_logging(verbose: bool, configured: Option<&str>) {
    let fallback = telemetry::fallback_filter(verbose, configured);
    if let Err(e) = telemetry::init(&fallback) {
        fail(EXIT_CONFIG, "Logging error", format!("{:#}", e));
    }
}

fn render(result: &Evaluation, format: Format) -> String {
    match format {
        Format::Text => output::format_report(result, output::should_use_colors()),
        Format::Tsv => output::format_tsv(result),
        Format::Json => match output::format_json(result) {
            Ok(json) => json,
            Err(e) => fail(EXIT_INPUT, "Failed to serialize result", format!("{:#}", e)),
        },
    }
}

fn read_dossier(path: &Path) -> Dossier {
    match load_dossier(path) {
        Ok(d) => d,
        Err(e) => fail(EXIT_INPUT, "Input error", format!("{:#}", e)),
    }
}

/// Layer the flags onto the config file, validate, resolve.
fn scoring_options(config: &config::Config, flags: &EvalFlags) -> ScoringOptions {
    let effective = config.scoring_config(&flags.overrides());
    if let Err(errors) = validate_scoring(&effective) {
        eprintln!("Scoring config errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        std::process::exit(EXIT_CONFIG);
    }
    effective.resolve()
}

/// Load the config file and start logging from it.
fn load_config(path: Option<PathBuf>, verbose: bool) -> config::Config {
    let config = match config::load_config(path) {
        Ok(c) => c,
        Err(e) => fail(EXIT_CONFIG, "Config error", format!("{:#}", e)),
    };
    init_logging(verbose, config.log_level.as_deref());
    config
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Evaluate { dossier, flags } => {
            let config = load_config(cli.config, cli.verbose);
            let options = scoring_options(&config, &flags);
            let dossier = read_dossier(&dossier);
            println!("{}", render(&evaluate(&dossier, &options), flags.format));
        }
        Commands::Merge {
            dossier: dossier_path,
            partial,
            output: output_path,
            evaluate: then_evaluate,
            flags,
        } => {
            let config = load_config(cli.config, cli.verbose);
            // Validate before touching any file
            let options = then_evaluate.then(|| scoring_options(&config, &flags));
            let dossier = read_dossier(&dossier_path);
            let partial = match load_partial(&partial) {
                Ok(p) => p,
                Err(e) => fail(EXIT_INPUT, "Input error", format!("{:#}", e)),
            };
            if partial.is_empty() {
                tracing::warn!("partial update has no recognised fields");
            }

            let merged = dossier.with_legal_partial(&partial);
            let target = output_path.unwrap_or(dossier_path);
            if let Err(e) = save_dossier(&target, &merged) {
                fail(EXIT_INPUT, "Failed to save dossier", format!("{:#}", e));
            }
            eprintln!(
                "Merged {} field(s) into {}",
                partial.present_fields().len(),
                target.display()
            );

            if let Some(options) = options {
                println!("{}", render(&evaluate(&merged, &options), flags.format));
            }
        }
        Commands::Demo { tax_id, flags } => {
            let config = load_config(cli.config, cli.verbose);
            let options = scoring_options(&config, &flags);
            let dossier = Dossier::demo(tax_id.as_deref());
            println!("{}", render(&evaluate(&dossier, &options), flags.format));
        }
        Commands::Init { force } => {
            // The file being written may not exist or parse yet
            init_logging(cli.verbose, None);
            match config::write_default_config(cli.config, force) {
                Ok(path) => println!("Config written to {}", path.display()),
                Err(e) => fail(EXIT_CONFIG, "Config error", format!("{:#}", e)),
            }
        }
    }

    std::process::exit(EXIT_SUCCESS);
}
