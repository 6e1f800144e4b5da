//! Token vocabularies with counts.
//!
//! File format: one `id token count` line per entry, ids starting from 1,
//! entries sorted by token.

use crate::errors::InvalidInput;
use crate::normalize::{Language, Normalizer};
use itertools::Itertools;
use log::info;
use std::collections::{BTreeMap, HashMap};
use std::io::{self, Write};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VocabEntry {
    pub id: u64,
    pub token: String,
    pub count: u64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Vocabulary {
    entries: Vec<VocabEntry>,
    ids: HashMap<String, u64>,
}

impl Vocabulary {
    fn from_entries(entries: Vec<VocabEntry>) -> Vocabulary {
        let ids = entries.iter().map(|e| (e.token.clone(), e.id)).collect();
        Vocabulary { entries, ids }
    }

    /// Count the tokens of already normalized lines.
    pub fn from_tokens<'a, I>(lines: I) -> Vocabulary
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut counts: BTreeMap<&str, u64> = BTreeMap::new();
        for line in lines {
            for token in line.split_whitespace() {
                *counts.entry(token).or_default() += 1;
            }
        }
        let entries = counts
            .into_iter()
            .enumerate()
            .map(|(i, (token, count))| VocabEntry {
                id: i as u64 + 1,
                token: token.to_owned(),
                count,
            })
            .collect_vec();
        Vocabulary::from_entries(entries)
    }

    /// Normalize raw text lines and count their tokens. Blank lines are ignored.
    pub fn build(text: &str, normalizer: &Normalizer, lang: Language) -> Vocabulary {
        let lines = text
            .lines()
            .filter(|l| !l.trim().is_empty())
            .map(|l| normalizer.normalize(l, lang))
            .collect_vec();
        let vocab = Vocabulary::from_tokens(lines.iter().map(String::as_str));
        info!(target: "annoproj", "vocabulary: {} lines, {} types", lines.len(), vocab.len());
        vocab
    }

    pub fn parse(data: &str) -> Result<Vocabulary, InvalidInput> {
        let mut entries = Vec::new();
        for (i, line) in data.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let fields = line.split_whitespace().collect_vec();
            let bad = |what: &str| InvalidInput(format!("vocabulary line {}: {what}: '{line}'", i + 1));
            let &[id, token, count] = &fields[..] else {
                return Err(bad("expected 'id token count'"));
            };
            entries.push(VocabEntry {
                id: id.parse().map_err(|_| bad("id is not a number"))?,
                token: token.to_owned(),
                count: count.parse().map_err(|_| bad("count is not a number"))?,
            });
        }
        Ok(Vocabulary::from_entries(entries))
    }

    pub fn write<W: Write>(&self, mut out: W) -> io::Result<()> {
        for e in &self.entries {
            writeln!(out, "{} {} {}", e.id, e.token, e.count)?;
        }
        Ok(())
    }

    pub fn id(&self, token: &str) -> Option<u64> {
        self.ids.get(token).copied()
    }

    pub fn entries(&self) -> &[VocabEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Replace every token of a normalized line by its id.
    pub fn encode(&self, line: &str) -> Result<String, InvalidInput> {
        let ids: Vec<u64> = line
            .split_whitespace()
            .map(|t| {
                self.id(t)
                    .ok_or_else(|| InvalidInput(format!("token '{t}' is not in the vocabulary")))
            })
            .collect::<Result<_, _>>()?;
        Ok(ids.iter().join(" "))
    }
}
