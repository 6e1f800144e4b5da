//! Main entry point for projecting a whole corpus.

use crate::alignment::AlignmentReader;
use crate::conllu::{Sentence, SentenceReader};
use crate::errors::{ConsistencyError, Result, SerializeError};
use crate::projection;
use crate::reversal::{self, SentenceAlignment};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::io::{self, BufRead, Write};
use std::{error, fs};
use std::path::Path;

/// How to run the projection.
#[derive(Clone, Debug, Default)]
pub struct DriverArgs {
    /// Number of alignment records to skip before pairing records with sentences.
    /// Lets a run pick up the tail of an alignment file whose head belongs to
    /// sentences projected earlier.
    pub start: usize,

    /// Halt on the first sentence that cannot be projected or rendered.
    /// By default such sentences are left out of the output and listed in
    /// [Summary::failures].
    pub strict: bool,
}

/// A sentence that was left out of the output.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Failure {
    /// 0-based record number in the alignment file.
    pub record: usize,
    pub sent_id: Option<String>,
    pub error: String,
}

/// What happened during a run.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Summary {
    pub start: usize,
    /// Records actually skipped; smaller than `start` if the file is shorter.
    pub skipped_records: usize,
    pub projected: usize,
    pub failures: Vec<Failure>,
    /// Records left over after the treebank ran out.
    pub unused_records: usize,
    /// Sentences left over after the alignment file ran out.
    pub unused_sentences: usize,
}

impl Summary {
    /// The two inputs had different lengths, so one of them was cut short.
    pub fn truncated(&self) -> bool {
        self.unused_records > 0 || self.unused_sentences > 0
    }
}

/// The rendered block and the number of target tokens that received annotations.
fn project_one(alignment: &SentenceAlignment, sentence: &Sentence) -> Result<(String, usize)> {
    let projected = projection::project(alignment, sentence)?;
    let annotated = projected
        .tokens
        .iter()
        .filter(|t| !t.is_placeholder())
        .count();
    Ok((projected.to_conllu()?, annotated))
}

/// Prefix the message with `place`, keeping the error type.
fn locate(e: Box<dyn error::Error>, place: &str) -> Box<dyn error::Error> {
    if let Some(ConsistencyError(m)) = e.downcast_ref::<ConsistencyError>() {
        return ConsistencyError(format!("{place}: {m}")).into();
    }
    if let Some(SerializeError(m)) = e.downcast_ref::<SerializeError>() {
        return SerializeError(format!("{place}: {m}")).into();
    }
    e
}

/// Project every source sentence through its alignment record and write
/// the result as CoNLL-U.
///
/// Malformed input and conflicting alignments abort the run. Sentences that
/// cannot be projected or rendered are handled according to [DriverArgs::strict].
pub fn project<A, S, W>(args: &DriverArgs, alignments: A, source: S, mut out: W) -> Result<Summary>
where
    A: BufRead,
    S: BufRead,
    W: Write,
{
    let mut records = AlignmentReader::new(alignments);
    let mut sentences = SentenceReader::new(source);
    let mut summary = Summary {
        start: args.start,
        ..Default::default()
    };
    summary.skipped_records = records.skip_records(args.start)?;
    if summary.skipped_records < args.start {
        warn!(
            target: "annoproj",
            "start offset {} is past the end of the alignment file ({} records)",
            args.start,
            summary.skipped_records
        );
    }
    loop {
        let Some(record) = records.next().transpose()? else {
            break;
        };
        let Some(sentence) = sentences.next().transpose()? else {
            summary.unused_records = 1 + records.skip_records(usize::MAX)?;
            break;
        };
        let alignment = reversal::reverse(&record.links, &record.target_text)
            .map_err(|e| ConsistencyError(format!("record {}: {}", record.number, e.0)))?;
        match project_one(&alignment, &sentence) {
            Ok((block, annotated)) => {
                out.write_all(block.as_bytes())?;
                summary.projected += 1;
                debug!(
                    target: "annoproj",
                    "record {}: {} of {} target tokens aligned, {} annotated",
                    record.number,
                    alignment.len(),
                    alignment.target_tokens().len(),
                    annotated
                );
            }
            Err(e) => {
                let sent_id = sentence.meta("sent_id").map(str::to_owned);
                let place = match &sent_id {
                    Some(id) => format!("record {} (sent_id {})", record.number, id),
                    None => format!("record {}", record.number),
                };
                if args.strict {
                    return Err(locate(e, &place));
                }
                warn!(target: "annoproj", "{place}: skipped: {e}");
                summary.failures.push(Failure {
                    record: record.number,
                    sent_id,
                    error: e.to_string(),
                });
            }
        }
    }
    for sentence in sentences {
        sentence?;
        summary.unused_sentences += 1;
    }
    out.flush()?;
    if summary.unused_records > 0 {
        warn!(
            target: "annoproj",
            "treebank ran out first: {} alignment records not used",
            summary.unused_records
        );
    }
    if summary.unused_sentences > 0 {
        warn!(
            target: "annoproj",
            "alignment file ran out first: {} treebank sentences not used",
            summary.unused_sentences
        );
    }
    info!(
        target: "annoproj",
        "projected: {} sentences, skipped: {}",
        summary.projected,
        summary.failures.len()
    );
    Ok(summary)
}

/// [project] with file names.
pub fn project_files(
    args: &DriverArgs,
    src: &Path,
    alignments: &Path,
    output: &Path,
) -> Result<Summary> {
    info!(target: "annoproj", "read: {}", src.display());
    let source = io::BufReader::new(fs::File::open(src)?);
    info!(target: "annoproj", "read: {}", alignments.display());
    let alignments = io::BufReader::new(fs::File::open(alignments)?);
    let out = io::BufWriter::new(fs::File::create(output)?);
    let summary = project(args, alignments, source, out)?;
    info!(target: "annoproj", "wrote: {}", output.display());
    Ok(summary)
}
