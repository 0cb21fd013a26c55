use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::fs;
use std::path::PathBuf;

use dlx_core::{normalize_fields, FieldRecord, ValidationReport, EXPECTED_FIELDS};
use dlx_runtime::RegexExtractor;

#[derive(Parser, Debug)]
#[command(name = "dlx", version, about = "Driver's license field extraction")]
struct Cli {
    #[arg(long, global = true, help = "Output machine-readable JSON")]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate and normalize a raw model reply from a file
    Validate { file: PathBuf },
    /// Extract fields straight from OCR text with the regex fallback
    Extract { file: PathBuf },
}

#[derive(Serialize)]
struct Output {
    record: FieldRecord,
    report: ValidationReport,
    /// Set when the model reply was rejected outright.
    rejected: Option<String>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let output = match &cli.command {
        Commands::Validate { file } => {
            let raw = fs::read_to_string(file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            match dlx_core::extract(&raw) {
                Ok(record) => {
                    let report = ValidationReport::for_record(&record);
                    Output {
                        record,
                        report,
                        rejected: None,
                    }
                }
                Err(err) => {
                    let record = FieldRecord::all_absent();
                    let report = ValidationReport::for_record(&record);
                    Output {
                        record,
                        report,
                        rejected: Some(err.to_string()),
                    }
                }
            }
        }
        Commands::Extract { file } => {
            let ocr_text = fs::read_to_string(file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            let record = normalize_fields(&RegexExtractor::new().extract(&ocr_text));
            let report = ValidationReport::for_record(&record);
            Output {
                record,
                report,
                rejected: None,
            }
        }
    };

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print_human(&output);
    }

    if output.rejected.is_some() {
        std::process::exit(1);
    }
    Ok(())
}

fn print_human(output: &Output) {
    if let Some(reason) = &output.rejected {
        println!("rejected: {reason}");
        return;
    }

    for key in EXPECTED_FIELDS {
        match output.record.get(key) {
            Some(value) => println!("{key:18} {value}"),
            None => println!("{key:18} -"),
        }
    }

    let report = &output.report;
    if report.is_clean() {
        println!("\nno findings");
        return;
    }
    for field in &report.missing_fields {
        println!("missing: {field}");
    }
    for issue in &report.format_errors {
        println!("format error: {} = {:?} ({})", issue.field, issue.value, issue.error);
    }
    for issue in &report.invalid_values {
        println!("invalid: {} = {:?} ({})", issue.field, issue.value, issue.error);
    }
    for warning in &report.warnings {
        println!("warning: {} ({})", warning.field, warning.warning);
    }
}
