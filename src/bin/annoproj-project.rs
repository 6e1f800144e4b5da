use annoproj::driver::{self, DriverArgs, Summary};
use annoproj::errors::Result;
use clap::Parser;
use clap_verbosity_flag::{InfoLevel, Verbosity};
use log::{error, info};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::{error, fs, io, process};

/// Project CoNLL-U annotations through word alignments
#[derive(Parser)]
#[command(author, version, about)]
struct Args {
    /// Source treebank (CoNLL-U)
    #[arg(long)]
    src: PathBuf,
    /// Aligner output file (3 lines per sentence pair)
    #[arg(long, alias = "A1-file")]
    alignments: PathBuf,
    /// Number of alignment records to skip
    #[arg(long, default_value_t = 0)]
    start: usize,
    /// Output treebank (CoNLL-U)
    #[arg(long)]
    output: PathBuf,
    /// Stop at the first sentence that cannot be projected
    #[arg(long)]
    strict: bool,
    /// Write a summary of the run as a JSON file
    #[arg(long)]
    report: Option<PathBuf>,
    /// Report errors as a JSON file
    #[arg(long)]
    error_file: Option<PathBuf>,
    /// Verbosity
    #[command(flatten)]
    verbose: Verbosity<InfoLevel>,
}

#[derive(Serialize)]
struct OError {
    error: String,
}

fn store_json<T: Serialize>(filename: &Path, value: &T) -> Result<()> {
    let file = fs::File::create(filename)?;
    let writer = io::BufWriter::new(file);
    serde_json::to_writer_pretty(writer, value)?;
    Ok(())
}

fn process(args: &Args) -> Result<()> {
    let driver_args = DriverArgs {
        start: args.start,
        strict: args.strict,
    };
    let summary: Summary =
        driver::project_files(&driver_args, &args.src, &args.alignments, &args.output)?;
    if let Some(report) = &args.report {
        store_json(report, &summary)?;
        info!(target: "annoproj", "report: {}", report.display());
    }
    Ok(())
}

fn store_error(error_file: &Path, e: &dyn error::Error) -> Result<()> {
    let error = OError {
        error: format!("{e}"),
    };
    store_json(error_file, &error)
}

fn main() {
    let args = Args::parse();
    pretty_env_logger::formatted_timed_builder()
        .filter_level(args.verbose.log_level_filter())
        .init();
    match process(&args) {
        Ok(()) => (),
        Err(e) => {
            match &args.error_file {
                Some(filename) => match store_error(filename, &*e) {
                    Ok(()) => {
                        info!(target: "annoproj", "error reported: {e}");
                    }
                    Err(e2) => {
                        error!(target: "annoproj", "{e}");
                        error!(target: "annoproj", "{e2}");
                    }
                },
                None => error!(target: "annoproj", "{e}"),
            }
            process::exit(1);
        }
    }
}
