//! releve - UBL invoice field extraction to XLSX

use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use releve::batch::run_batch;
use releve::core::{ExtractError, ExtractionMode, RunSummary};
use releve::intake::{DirectorySource, FileSetSource, ZipSource};
use releve::xlsx::write_xlsx;

#[derive(Parser)]
#[command(name = "releve")]
#[command(version, about = "Extract UBL invoice fields to an XLSX workbook", long_about = None)]
#[command(after_help = "EXAMPLES:
    releve invoices/                 One row per invoice line, whole directory
    releve invoices.zip -o out.xlsx  Same, from a ZIP archive
    releve --totals invoice.xml      One totals row per document")]
struct Cli {
    /// Input: a directory of XML files, a ZIP archive, or a single XML file
    #[arg(value_name = "INPUT")]
    input: String,

    /// Output workbook path
    #[arg(short, long, value_name = "PATH", default_value = "xml_out.xlsx")]
    output: String,

    /// One row of monetary totals per document instead of one row per line
    #[arg(long)]
    totals: bool,

    /// Suppress the run summary
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "releve=error".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), ExtractError> {
    let mode = if cli.totals {
        ExtractionMode::Totals
    } else {
        ExtractionMode::Lines
    };

    let path = Path::new(&cli.input);
    let result = if path.is_dir() {
        run_batch(&mut DirectorySource::new(path), mode)?
    } else if has_extension(path, "zip") {
        run_batch(&mut ZipSource::open(path)?, mode)?
    } else {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| cli.input.clone());
        let mut source = FileSetSource::new();
        source.push(name, std::fs::read(path)?);
        run_batch(&mut source, mode)?
    };

    write_xlsx(&result.table, &cli.output)?;

    if !cli.quiet {
        print_summary(&result.summary, result.table.len(), &cli.output);
    }
    Ok(())
}

fn has_extension(path: &Path, wanted: &str) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case(wanted))
}

fn print_summary(summary: &RunSummary, rows: usize, output: &str) {
    println!(
        "Documents: {} attempted, {} parsed, {} failed",
        summary.attempted(),
        summary.parsed(),
        summary.failed()
    );
    if summary.skipped_empty() > 0 {
        println!("Skipped {} empty file(s)", summary.skipped_empty());
    }
    for (file, message) in summary.failures() {
        println!("  failed: {file}: {message}");
    }

    if summary.attempted() == 0 {
        println!("No XML documents found; {output} contains headers only");
    } else if summary.all_failed() {
        println!(
            "All {} document(s) failed; {output} contains headers only",
            summary.attempted()
        );
    } else if rows == 0 {
        println!("Documents parsed but no rows extracted; {output} contains headers only");
    } else {
        println!("{rows} row(s) written to {output}");
    }
}
