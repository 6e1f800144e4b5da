//! Projecting source annotations onto an aligned target sentence.
//!
//! Only lexical category and morphology travel across the alignment.
//! Lemmas and dependency structure are left empty.

use crate::conllu::{self, EMPTY, Features, Metadata, Sentence, Token};
use crate::errors::{ConsistencyError, SerializeError};
use crate::reversal::SentenceAlignment;
use itertools::Itertools;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProjectedToken {
    /// 1-based position in the target sentence.
    pub id: usize,
    pub form: String,
    pub lemma: String,
    pub upos: String,
    pub xpos: String,
    pub feats: String,
    pub head: String,
    pub deprel: String,
    pub deps: String,
    pub misc: String,
}

impl ProjectedToken {
    /// A target token without an aligned source token.
    pub fn placeholder(id: usize, form: &str) -> ProjectedToken {
        ProjectedToken {
            id,
            form: form.to_owned(),
            lemma: EMPTY.to_owned(),
            upos: EMPTY.to_owned(),
            xpos: EMPTY.to_owned(),
            feats: EMPTY.to_owned(),
            head: EMPTY.to_owned(),
            deprel: EMPTY.to_owned(),
            deps: EMPTY.to_owned(),
            misc: EMPTY.to_owned(),
        }
    }

    /// A target token that takes its category and features from `source`.
    pub fn projected(id: usize, form: &str, source: &Token) -> ProjectedToken {
        ProjectedToken {
            upos: source.upos.clone(),
            xpos: source.xpos.clone(),
            feats: normalize_features(&source.feats),
            ..ProjectedToken::placeholder(id, form)
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.upos == EMPTY && self.xpos == EMPTY && self.feats == EMPTY
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProjectedSentence {
    pub metadata: Metadata,
    pub tokens: Vec<ProjectedToken>,
}

impl ProjectedSentence {
    pub fn meta(&self, key: &str) -> Option<&str> {
        self.metadata
            .iter()
            .find(|(k, _)| k == key)
            .and_then(|(_, v)| v.as_deref())
    }

    /// Render as a CoNLL-U block.
    pub fn to_conllu(&self) -> Result<String, SerializeError> {
        let ids = self.tokens.iter().map(|t| t.id.to_string()).collect_vec();
        let rows = self
            .tokens
            .iter()
            .zip(&ids)
            .map(|(t, id)| {
                [
                    id.as_str(),
                    t.form.as_str(),
                    t.lemma.as_str(),
                    t.upos.as_str(),
                    t.xpos.as_str(),
                    t.feats.as_str(),
                    t.head.as_str(),
                    t.deprel.as_str(),
                    t.deps.as_str(),
                    t.misc.as_str(),
                ]
            })
            .collect_vec();
        conllu::render(&self.metadata, &rows)
    }
}

/// Render features as `Key=Value|...`.
///
/// Keys come out sorted and each key keeps its smallest candidate value,
/// so the result does not depend on how the treebank listed them.
/// A feature string that could not be parsed is passed through.
pub fn normalize_features(feats: &Features) -> String {
    match feats {
        Features::Raw(s) => s.clone(),
        Features::Candidates(map) if map.is_empty() => EMPTY.to_owned(),
        Features::Candidates(map) => map
            .iter()
            .filter_map(|(k, values)| values.first().map(|v| format!("{k}={v}")))
            .join("|"),
    }
}

/// Project `source` onto the target side of `alignment`.
///
/// Fails if the alignment refers to a source position the sentence does not have.
pub fn project(
    alignment: &SentenceAlignment,
    source: &Sentence,
) -> Result<ProjectedSentence, ConsistencyError> {
    let tokens = alignment
        .target_tokens()
        .into_iter()
        .enumerate()
        .map(|(t, form)| match alignment.get(t) {
            None => Ok(ProjectedToken::placeholder(t + 1, form)),
            Some(aligned) => {
                let s = aligned.source_index;
                source
                    .tokens
                    .get(s)
                    .map(|token| ProjectedToken::projected(t + 1, form, token))
                    .ok_or_else(|| {
                        ConsistencyError(format!(
                            "'{}' is aligned to source position {}, but the source sentence has only {} tokens",
                            form,
                            s + 1,
                            source.tokens.len()
                        ))
                    })
            }
        })
        .collect::<Result<Vec<_>, _>>()?;
    let mut metadata = source.metadata.clone();
    conllu::set_meta(&mut metadata, "text", &alignment.target_text);
    Ok(ProjectedSentence { metadata, tokens })
}
