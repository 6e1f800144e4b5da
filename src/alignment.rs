//! Reading the output of a GIZA++ style word aligner.
//!
//! The aligner writes one record per sentence pair, three lines each:
//!
//! ```text
//! # Sentence pair (1) source length 2 target length 3 alignment score : -12.3
//! the cat sat
//! NULL ({ 1 }) cat ({ 2 }) sat ({ 3 })
//! ```
//!
//! Indices on the alignment line are 1-based positions in the target line.

use crate::errors::{FormatError, Result};
use log::trace;
use std::io::{self, BufRead};
use std::iter::Peekable;
use std::str::SplitWhitespace;

const NULL_TOKEN: &str = "NULL";
const OPEN: &str = "({";
const CLOSE: &str = "})";
const SCORE_SEPARATOR: &str = " : ";

/// One source token and the target positions it is aligned to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AlignmentLink {
    pub source_token: String,
    /// 0-based position of the source token, not counting the NULL group.
    pub source_index: usize,
    /// 0-based target positions, in the order the aligner listed them.
    pub target_indices: Vec<usize>,
}

/// One parsed aligner record.
#[derive(Clone, Debug, PartialEq)]
pub struct AlignmentRecord {
    /// 0-based position of the record in the file.
    pub number: usize,
    pub score: f64,
    pub target_text: String,
    pub links: Vec<AlignmentLink>,
}

/// Extract the score from a record header line.
pub fn parse_header(line: &str) -> std::result::Result<f64, FormatError> {
    let line = line.trim();
    let (_, score) = line.rsplit_once(SCORE_SEPARATOR).ok_or_else(|| {
        FormatError::new(format!("header does not end in ' : <score>': '{line}'"))
    })?;
    score
        .trim()
        .parse()
        .map_err(|_| FormatError::new(format!("score is not a number: '{score}'")))
}

struct Group<'a> {
    token: &'a str,
    indices: Vec<usize>,
}

struct LineParser<'a> {
    tokens: Peekable<SplitWhitespace<'a>>,
}

impl<'a> LineParser<'a> {
    fn new(line: &'a str) -> Self {
        LineParser {
            tokens: line.split_whitespace().peekable(),
        }
    }

    fn expect(&mut self, expected: &str, token: &str) -> std::result::Result<(), FormatError> {
        match self.tokens.next() {
            Some(t) if t == expected => Ok(()),
            Some(t) => Err(FormatError::new(format!(
                "expected '{expected}' after '{token}', got '{t}'"
            ))),
            None => Err(FormatError::new(format!(
                "expected '{expected}' after '{token}', got end of line"
            ))),
        }
    }

    /// group := WORD "({" INDEX* "})"
    fn group(&mut self) -> std::result::Result<Option<Group<'a>>, FormatError> {
        let token = match self.tokens.next() {
            None => return Ok(None),
            Some(t) => t,
        };
        self.expect(OPEN, token)?;
        let mut indices = Vec::new();
        loop {
            match self.tokens.next() {
                None => {
                    return Err(FormatError::new(format!(
                        "group of '{token}' is not closed with '{CLOSE}'"
                    )));
                }
                Some(CLOSE) => break,
                Some(t) => indices.push(parse_index(token, t)?),
            }
        }
        Ok(Some(Group { token, indices }))
    }
}

fn parse_index(token: &str, raw: &str) -> std::result::Result<usize, FormatError> {
    match raw.parse::<usize>() {
        Ok(0) => Err(FormatError::new(format!(
            "target index 0 in group of '{token}', indices are 1-based"
        ))),
        Ok(i) => Ok(i - 1),
        Err(_) => Err(FormatError::new(format!(
            "target index '{raw}' in group of '{token}' is not a number"
        ))),
    }
}

/// Parse an alignment line such as `NULL ({ 2 }) cat ({ 1 }) sat ({ 2 })`.
///
/// A leading `NULL` group is dropped. Source indices count the remaining
/// groups from zero.
pub fn parse_alignment_line(line: &str) -> std::result::Result<Vec<AlignmentLink>, FormatError> {
    let mut parser = LineParser::new(line);
    let mut links = Vec::new();
    let mut first = true;
    while let Some(group) = parser.group()? {
        if first && group.token == NULL_TOKEN {
            first = false;
            continue;
        }
        first = false;
        links.push(AlignmentLink {
            source_token: group.token.to_owned(),
            source_index: links.len(),
            target_indices: group.indices,
        });
    }
    Ok(links)
}

/// Streams [AlignmentRecord]s out of an aligner output file.
pub struct AlignmentReader<R> {
    lines: io::Lines<R>,
    line: usize,
    record: usize,
}

impl<R: BufRead> AlignmentReader<R> {
    pub fn new(reader: R) -> Self {
        AlignmentReader {
            lines: reader.lines(),
            line: 0,
            record: 0,
        }
    }

    fn next_line(&mut self) -> Result<Option<String>> {
        match self.lines.next() {
            None => Ok(None),
            Some(line) => {
                self.line += 1;
                Ok(Some(line?))
            }
        }
    }

    /// Read the three raw lines of the next record.
    /// Returns `None` at a clean end of file.
    fn raw_record(&mut self) -> Result<Option<[String; 3]>> {
        let header = loop {
            match self.next_line()? {
                None => return Ok(None),
                // stray blank lines between records, typically at the end of the file
                Some(line) if line.trim().is_empty() => continue,
                Some(line) => break line,
            }
        };
        let mut rest = Vec::with_capacity(2);
        for _ in 0..2 {
            match self.next_line()? {
                Some(line) => rest.push(line),
                None => {
                    return Err(FormatError::new(format!(
                        "file ends in the middle of record {}",
                        self.record
                    ))
                    .at_line(self.line)
                    .into());
                }
            }
        }
        self.record += 1;
        let alignment = rest.pop().unwrap_or_default();
        let target = rest.pop().unwrap_or_default();
        Ok(Some([header, target, alignment]))
    }

    /// Skip up to `n` records without parsing them.
    /// Returns the number of records actually skipped.
    pub fn skip_records(&mut self, n: usize) -> Result<usize> {
        let mut skipped = 0;
        while skipped < n {
            match self.raw_record()? {
                None => break,
                Some(_) => skipped += 1,
            }
        }
        Ok(skipped)
    }

    fn read_record(&mut self) -> Result<Option<AlignmentRecord>> {
        let [header, target, alignment] = match self.raw_record()? {
            None => return Ok(None),
            Some(r) => r,
        };
        let number = self.record - 1;
        let header_line = self.line - 2;
        let score = parse_header(&header).map_err(|e| e.at_line(header_line))?;
        let links = parse_alignment_line(&alignment).map_err(|e| e.at_line(self.line))?;
        let target_text = target.trim().to_owned();
        trace!(target: "annoproj", "record {number}: score {score}, target '{target_text}'");
        for link in &links {
            trace!(
                target: "annoproj",
                "{} {} -> {:?}",
                link.source_index,
                link.source_token,
                link.target_indices
            );
        }
        Ok(Some(AlignmentRecord {
            number,
            score,
            target_text,
            links,
        }))
    }
}

impl<R: BufRead> Iterator for AlignmentReader<R> {
    type Item = Result<AlignmentRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_record().transpose()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn link(token: &str, source_index: usize, target_indices: &[usize]) -> AlignmentLink {
        AlignmentLink {
            source_token: token.to_owned(),
            source_index,
            target_indices: target_indices.to_vec(),
        }
    }

    #[test]
    fn header_score() {
        let h = "# Sentence pair (1) source length 2 target length 3 alignment score : -12.3";
        assert_eq!(parse_header(h).unwrap(), -12.3);
        assert_eq!(parse_header("x : 1e-5\n").unwrap(), 1e-5);
        assert!(parse_header("no score here").is_err());
        assert!(parse_header("x : abc").is_err());
    }

    #[test]
    fn source_indices_sequential() {
        let links = parse_alignment_line("a ({ 1 }) b ({ }) c ({ 2 3 })").unwrap();
        assert_eq!(
            links,
            vec![link("a", 0, &[0]), link("b", 1, &[]), link("c", 2, &[1, 2])]
        );
    }

    #[test]
    fn leading_null_dropped() {
        let links = parse_alignment_line("NULL ({ 2 }) cat ({ 1 }) sat ({ 3 })").unwrap();
        assert_eq!(links, vec![link("cat", 0, &[0]), link("sat", 1, &[2])]);
        let links = parse_alignment_line("NULL ({ }) x ({ 1 })").unwrap();
        assert_eq!(links, vec![link("x", 0, &[0])]);
    }

    #[test]
    fn later_null_is_a_token() {
        let links = parse_alignment_line("x ({ 1 }) NULL ({ 2 })").unwrap();
        assert_eq!(links, vec![link("x", 0, &[0]), link("NULL", 1, &[1])]);
    }

    #[test]
    fn empty_line() {
        assert_eq!(parse_alignment_line("").unwrap(), vec![]);
        assert_eq!(parse_alignment_line("NULL ({ })").unwrap(), vec![]);
    }

    #[test]
    fn malformed_groups() {
        assert!(parse_alignment_line("cat ({ 1").is_err());
        assert!(parse_alignment_line("cat 1 })").is_err());
        assert!(parse_alignment_line("cat").is_err());
        assert!(parse_alignment_line("cat ({ one })").is_err());
        assert!(parse_alignment_line("cat ({ 0 })").is_err());
        assert!(parse_alignment_line("cat ({ -1 })").is_err());
    }

    const RECORDS: &str = "\
# Sentence pair (1) source length 2 target length 3 alignment score : -12.3
the cat sat
NULL ({ 1 }) cat ({ 2 }) sat ({ 3 })
# Sentence pair (2) source length 1 target length 1 alignment score : 0.5
hej
NULL ({ }) hi ({ 1 })
";

    #[test]
    fn reader_records() {
        let records: Vec<_> = AlignmentReader::new(RECORDS.as_bytes())
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].number, 0);
        assert_eq!(records[0].score, -12.3);
        assert_eq!(records[0].target_text, "the cat sat");
        assert_eq!(
            records[0].links,
            vec![link("cat", 0, &[1]), link("sat", 1, &[2])]
        );
        assert_eq!(records[1].number, 1);
        assert_eq!(records[1].links, vec![link("hi", 0, &[0])]);
    }

    #[test]
    fn reader_skip() {
        let mut reader = AlignmentReader::new(RECORDS.as_bytes());
        assert_eq!(reader.skip_records(1).unwrap(), 1);
        let r = reader.next().unwrap().unwrap();
        assert_eq!(r.number, 1);
        assert_eq!(r.target_text, "hej");
        assert!(reader.next().is_none());
        assert_eq!(reader.skip_records(5).unwrap(), 0);
    }

    #[test]
    fn reader_trailing_blank_lines() {
        let data = format!("{RECORDS}\n\n");
        let n = AlignmentReader::new(data.as_bytes())
            .collect::<Result<Vec<_>>>()
            .unwrap()
            .len();
        assert_eq!(n, 2);
    }

    #[test]
    fn reader_truncated_record() {
        let data = "x : 1.0\nthe cat\n";
        let mut reader = AlignmentReader::new(data.as_bytes());
        let e = reader.next().unwrap().unwrap_err();
        let e = e.downcast_ref::<FormatError>().unwrap();
        assert_eq!(e.line, Some(2));
    }

    #[test]
    fn reader_reports_line_of_bad_alignment() {
        let data = "x : 1.0\nthe cat\nNULL ({ }) cat ({ 2\n";
        let mut reader = AlignmentReader::new(data.as_bytes());
        let e = reader.next().unwrap().unwrap_err();
        let e = e.downcast_ref::<FormatError>().unwrap();
        assert_eq!(e.line, Some(3));
    }
}
