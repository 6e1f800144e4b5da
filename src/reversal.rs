//! Turning source→target links into a target-indexed view.

use crate::alignment::AlignmentLink;
use crate::errors::ConsistencyError;
use itertools::Itertools;
use log::trace;
use std::collections::BTreeMap;
use std::collections::btree_map::Entry::{Occupied, Vacant};

/// The source token a target token is aligned to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AlignedSource {
    pub source_index: usize,
    pub source_token: String,
    pub target_token: String,
}

/// Alignment of one sentence, keyed by 0-based target position.
///
/// Every target position maps to at most one source token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SentenceAlignment {
    pub target_text: String,
    links: BTreeMap<usize, AlignedSource>,
}

impl SentenceAlignment {
    pub fn get(&self, target_index: usize) -> Option<&AlignedSource> {
        self.links.get(&target_index)
    }

    /// Number of aligned target tokens.
    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// The target text split the way the aligner saw it.
    pub fn target_tokens(&self) -> Vec<&str> {
        self.target_text.split_whitespace().collect_vec()
    }
}

/// Reverse the links of one sentence.
///
/// Fails if two source tokens claim the same target token, or if a link
/// points past the end of the target text.
pub fn reverse(
    links: &[AlignmentLink],
    target_text: &str,
) -> Result<SentenceAlignment, ConsistencyError> {
    let target_tokens = target_text.split_whitespace().collect_vec();
    let mut reversed = BTreeMap::new();
    for link in links {
        for &t in &link.target_indices {
            let target_token = target_tokens.get(t).ok_or_else(|| {
                ConsistencyError(format!(
                    "'{}' is aligned to target position {}, but the target has only {} tokens",
                    link.source_token,
                    t + 1,
                    target_tokens.len()
                ))
            })?;
            match reversed.entry(t) {
                Occupied(e) => {
                    let prev: &AlignedSource = e.get();
                    return Err(ConsistencyError(format!(
                        "target token '{}' at position {} is aligned to both '{}' and '{}'",
                        target_token,
                        t + 1,
                        prev.source_token,
                        link.source_token
                    )));
                }
                Vacant(e) => {
                    e.insert(AlignedSource {
                        source_index: link.source_index,
                        source_token: link.source_token.clone(),
                        target_token: (*target_token).to_owned(),
                    });
                }
            }
        }
    }
    for (t, a) in &reversed {
        trace!(target: "annoproj", "{} {} -> {}", t, a.target_token, a.source_token);
    }
    Ok(SentenceAlignment {
        target_text: target_text.to_owned(),
        links: reversed,
    })
}
