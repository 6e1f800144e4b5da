use annoproj::bitext;
use annoproj::normalize::{Language, Normalizer};
use annoproj::vocab::Vocabulary;
use anyhow::{Context, Result};
use clap::Parser;
use clap_verbosity_flag::{InfoLevel, Verbosity};
use itertools::Itertools;
use log::info;
use std::path::{Path, PathBuf};
use std::{fs, io};

/// Generate the bitext file for the word aligner
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Source text, one sentence per line
    #[arg(long)]
    src: PathBuf,
    /// Target text, one sentence per line
    #[arg(long)]
    tgt: PathBuf,
    /// Language of the source text
    #[arg(long, value_enum, default_value_t = Language::En)]
    src_lang: Language,
    /// Language of the target text
    #[arg(long, value_enum, default_value_t = Language::Sv)]
    tgt_lang: Language,
    /// Vocabulary of the source text
    #[arg(long)]
    src_vocab: PathBuf,
    /// Vocabulary of the target text
    #[arg(long)]
    tgt_vocab: PathBuf,
    /// Output bitext
    #[arg(short, long)]
    output: PathBuf,
    #[command(flatten)]
    verbose: Verbosity<InfoLevel>,
}

fn read(path: &Path) -> Result<String> {
    info!(target: "annoproj", "read: {}", path.display());
    fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))
}

fn read_lines(path: &Path, lang: Language, normalizer: &Normalizer) -> Result<Vec<String>> {
    let text = read(path)?;
    Ok(text
        .lines()
        .map(|l| normalizer.normalize(l, lang))
        .collect_vec())
}

fn read_vocab(path: &Path) -> Result<Vocabulary> {
    let text = read(path)?;
    Vocabulary::parse(&text).with_context(|| format!("cannot parse {}", path.display()))
}

fn main() -> Result<()> {
    let args = Args::parse();
    pretty_env_logger::formatted_timed_builder()
        .filter_level(args.verbose.log_level_filter())
        .init();
    let normalizer = Normalizer::new();
    let src_vocab = read_vocab(&args.src_vocab)?;
    let tgt_vocab = read_vocab(&args.tgt_vocab)?;
    let src = read_lines(&args.src, args.src_lang, &normalizer)?;
    let tgt = read_lines(&args.tgt, args.tgt_lang, &normalizer)?;
    let entries = bitext::build(&src, &tgt, &src_vocab, &tgt_vocab)?;
    let file = fs::File::create(&args.output)
        .with_context(|| format!("cannot create {}", args.output.display()))?;
    bitext::write(&entries, io::BufWriter::new(file))?;
    info!(target: "annoproj", "wrote: {}", args.output.display());
    Ok(())
}
