use annoproj::aligner_input;
use annoproj::conllu;
use annoproj::errors::Result;
use annoproj::normalize::{Language, Normalizer};
use clap::Parser;
use clap_verbosity_flag::{InfoLevel, Verbosity};
use itertools::Itertools;
use log::{error, info};
use std::io::Write;
use std::path::PathBuf;
use std::{fs, io, process};

/// Tokenize source text for the word aligner
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Input text, one sentence per line; the extension names the language
    #[arg(long)]
    input: PathBuf,
    /// Treebank covering the first sentences of the input; its tokenization is kept
    #[arg(long)]
    conllu_file: Option<PathBuf>,
    /// Number of lines to read from the input (ignored with --conllu-file)
    #[arg(long)]
    limit: Option<usize>,
    /// Language of the input, if not given by the file extension
    #[arg(long, value_enum)]
    lang: Option<Language>,
    /// Output file, one tokenized sentence per line
    #[arg(short, long)]
    output: PathBuf,
    #[command(flatten)]
    verbose: Verbosity<InfoLevel>,
}

fn process(args: &Args) -> Result<()> {
    let lang = match args.lang {
        Some(lang) => lang,
        None => Language::from_path(&args.input)?,
    };
    let treebank = match &args.conllu_file {
        None => None,
        Some(path) => {
            info!(target: "annoproj", "read: {}", path.display());
            Some(conllu::parse(&fs::read_to_string(path)?)?)
        }
    };
    info!(target: "annoproj", "read: {} ({lang})", args.input.display());
    let text = fs::read_to_string(&args.input)?;
    let raw = text.lines().collect_vec();
    let normalizer = Normalizer::new();
    let lines =
        aligner_input::aligner_lines(&raw, treebank.as_deref(), args.limit, lang, &normalizer);
    let mut out = io::BufWriter::new(fs::File::create(&args.output)?);
    for line in &lines {
        writeln!(out, "{line}")?;
    }
    out.flush()?;
    info!(target: "annoproj", "wrote: {} ({} lines)", args.output.display(), lines.len());
    Ok(())
}

fn main() {
    let args = Args::parse();
    pretty_env_logger::formatted_timed_builder()
        .filter_level(args.verbose.log_level_filter())
        .init();
    if let Err(e) = process(&args) {
        error!(target: "annoproj", "{e}");
        process::exit(1);
    }
}
