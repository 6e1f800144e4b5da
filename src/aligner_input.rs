//! Source-side text for the word aligner.
//!
//! Sentences covered by the treebank keep the treebank tokenization, so
//! that aligner positions line up with token lines during projection. The
//! remaining sentences are tokenized by [Normalizer::tokenize].

use crate::conllu::Sentence;
use crate::normalize::{Language, Normalizer};
use itertools::Itertools;
use log::info;

/// Build the aligner input lines.
///
/// With a treebank, its sentences come first and the raw lines after the
/// treebank's sentence count follow; `limit` is ignored. Without one, the
/// first `limit` raw lines (all if `None`) are tokenized.
pub fn aligner_lines(
    raw: &[&str],
    treebank: Option<&[Sentence]>,
    limit: Option<usize>,
    lang: Language,
    normalizer: &Normalizer,
) -> Vec<String> {
    match treebank {
        Some(sentences) => {
            let mut lines = sentences.iter().map(Sentence::forms).collect_vec();
            info!(
                target: "annoproj",
                "{} lines from the treebank, {} lines tokenized",
                lines.len(),
                raw.len().saturating_sub(sentences.len())
            );
            lines.extend(
                raw.iter()
                    .skip(sentences.len())
                    .map(|l| normalizer.tokenize(l, lang)),
            );
            lines
        }
        None => {
            let limit = limit.unwrap_or(raw.len());
            raw.iter()
                .take(limit)
                .map(|l| normalizer.tokenize(l, lang))
                .collect_vec()
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::conllu;

    const TREEBANK: &str = "\
# text = Hi, you.
1\tHi\thi\tINTJ\tUH\t_\t0\troot\t_\tSpaceAfter=No
2\t,\t,\tPUNCT\t,\t_\t1\tpunct\t_\t_
3\tyou\tyou\tPRON\tPRP\t_\t1\tvocative\t_\tSpaceAfter=No
4\t.\t.\tPUNCT\t.\t_\t1\tpunct\t_\t_

";

    #[test]
    fn treebank_first() {
        let n = Normalizer::new();
        let tb = conllu::parse(TREEBANK).unwrap();
        let raw = ["Hi, you.", "Bye, you!", "Now."];
        let lines = aligner_lines(&raw, Some(tb.as_slice()), Some(1), Language::En, &n);
        assert_eq!(lines, vec!["Hi , you .", "Bye , you !", "Now ."]);
    }

    #[test]
    fn limited_raw() {
        let n = Normalizer::new();
        let raw = ["A, b.", "C!", "D?"];
        assert_eq!(
            aligner_lines(&raw, None, Some(2), Language::En, &n),
            vec!["A , b .", "C !"]
        );
        assert_eq!(aligner_lines(&raw, None, None, Language::En, &n).len(), 3);
        assert_eq!(aligner_lines(&raw, None, Some(10), Language::En, &n).len(), 3);
    }
}
