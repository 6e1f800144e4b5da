//! Count-weighted parallel corpus for the word aligner.
//!
//! Each sentence pair becomes three lines: the number of times the source
//! line occurs in the corpus, the source token ids and the target token ids.

use crate::errors::InvalidInput;
use crate::vocab::Vocabulary;
use itertools::Itertools;
use log::{debug, info};
use std::collections::HashMap;
use std::io::{self, Write};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BitextEntry {
    pub occurrences: u64,
    pub source: String,
    pub target: String,
}

/// Build the bitext from normalized source and target lines.
///
/// Pairs with an empty side are dropped. A token missing from its
/// vocabulary or a different number of lines on the two sides is an error.
pub fn build(
    source: &[String],
    target: &[String],
    source_vocab: &Vocabulary,
    target_vocab: &Vocabulary,
) -> Result<Vec<BitextEntry>, InvalidInput> {
    if source.len() != target.len() {
        return Err(InvalidInput(format!(
            "source has {} lines but target has {}",
            source.len(),
            target.len()
        )));
    }
    let source: Vec<String> = source
        .iter()
        .map(|l| source_vocab.encode(l))
        .collect::<Result<_, _>>()?;
    let target: Vec<String> = target
        .iter()
        .map(|l| target_vocab.encode(l))
        .collect::<Result<_, _>>()?;
    let mut counter: HashMap<&str, u64> = HashMap::new();
    for line in &source {
        *counter.entry(line).or_default() += 1;
    }
    let entries = source
        .iter()
        .zip(&target)
        .filter(|(s, t)| !s.is_empty() && !t.is_empty())
        .map(|(s, t)| BitextEntry {
            occurrences: counter[s.as_str()],
            source: s.clone(),
            target: t.clone(),
        })
        .collect_vec();
    let dropped = source.len() - entries.len();
    if dropped > 0 {
        debug!(target: "annoproj", "bitext: dropped {dropped} pairs with an empty side");
    }
    info!(target: "annoproj", "bitext: {} pairs", entries.len());
    Ok(entries)
}

pub fn write<W: Write>(entries: &[BitextEntry], mut out: W) -> io::Result<()> {
    for e in entries {
        writeln!(out, "{}", e.occurrences)?;
        writeln!(out, "{}", e.source)?;
        writeln!(out, "{}", e.target)?;
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    fn lines(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect_vec()
    }

    #[test]
    fn weighted_pairs() {
        let src = lines(&["a b", "c", "a b", ""]);
        let tgt = lines(&["x", "y z", "z", "x"]);
        let sv = Vocabulary::from_tokens(src.iter().map(String::as_str));
        let tv = Vocabulary::from_tokens(tgt.iter().map(String::as_str));
        let entries = build(&src, &tgt, &sv, &tv).unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(
            entries[0],
            BitextEntry {
                occurrences: 2,
                source: "1 2".to_owned(),
                target: "1".to_owned(),
            }
        );
        assert_eq!(entries[1].occurrences, 1);
        assert_eq!(entries[1].target, "2 3");
        assert_eq!(entries[2].occurrences, 2);

        let mut out = Vec::new();
        write(&entries, &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "2\n1 2\n1\n1\n3\n2 3\n2\n1 2\n3\n"
        );
    }

    #[test]
    fn mismatched_lengths() {
        let v = Vocabulary::from_tokens(["a"]);
        assert!(build(&lines(&["a", "a"]), &lines(&["a"]), &v, &v).is_err());
    }

    #[test]
    fn unknown_token() {
        let v = Vocabulary::from_tokens(["a"]);
        let e = build(&lines(&["a b"]), &lines(&["a"]), &v, &v).unwrap_err();
        assert!(e.0.contains("'b'"));
    }
}
