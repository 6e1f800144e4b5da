use annoproj::normalize::{Language, Normalizer};
use annoproj::vocab::Vocabulary;
use anyhow::{Context, Result};
use clap::Parser;
use clap_verbosity_flag::{InfoLevel, Verbosity};
use log::info;
use std::path::PathBuf;
use std::{fs, io};

/// Make a vocabulary file from a text file
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Input text, one sentence per line
    #[arg(short, long)]
    input: PathBuf,
    /// Output vocabulary (id, token, count per line)
    #[arg(long)]
    output: PathBuf,
    /// Language of the input text
    #[arg(long, value_enum, default_value_t = Language::En)]
    lang: Language,
    #[command(flatten)]
    verbose: Verbosity<InfoLevel>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    pretty_env_logger::formatted_timed_builder()
        .filter_level(args.verbose.log_level_filter())
        .init();
    let normalizer = Normalizer::new();
    info!(target: "annoproj", "read: {}", args.input.display());
    let text = fs::read_to_string(&args.input)
        .with_context(|| format!("cannot read {}", args.input.display()))?;
    let vocab = Vocabulary::build(&text, &normalizer, args.lang);
    let file = fs::File::create(&args.output)
        .with_context(|| format!("cannot create {}", args.output.display()))?;
    vocab.write(io::BufWriter::new(file))?;
    info!(target: "annoproj", "wrote: {}", args.output.display());
    Ok(())
}
