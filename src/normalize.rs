//! Text normalization for vocabularies, bitexts and aligner input.

use crate::errors::InvalidArgument;
use clap::ValueEnum;
use regex::Regex;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, ValueEnum)]
pub enum Language {
    En,
    Sv,
}

impl Language {
    /// Guess the language from a file extension, e.g. `corpus.sv`.
    pub fn from_path(path: &Path) -> Result<Language, InvalidArgument> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        ext.parse()
    }
}

impl FromStr for Language {
    type Err = InvalidArgument;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "en" => Ok(Language::En),
            "sv" => Ok(Language::Sv),
            _ => Err(InvalidArgument(format!(
                "unknown language '{s}', expected 'en' or 'sv'"
            ))),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Language::En => write!(f, "en"),
            Language::Sv => write!(f, "sv"),
        }
    }
}

/// Compiled rules for cleaning and tokenizing text.
///
/// Build one at startup and pass it to whoever needs it.
pub struct Normalizer {
    /// `(pattern, placeholder, restored)` for separators between digits.
    digit_separators: Vec<(Regex, &'static str, &'static str)>,
    punctuation: Regex,
    brackets: Regex,
    whitespace: Regex,
    ellipsis: Regex,
    padded: Regex,
    period: Regex,
    percent: Regex,
    spaced_ellipsis: Regex,
    possessive: Regex,
}

fn compile(pattern: &str) -> Regex {
    // patterns are literals in this file and covered by tests
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid built-in pattern {pattern}: {e}"))
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Normalizer {
    pub fn new() -> Normalizer {
        Normalizer {
            digit_separators: vec![
                (compile(r"(\d)\.(\d)"), "<dot>", "."),
                (compile(r"(\d),(\d)"), "<com>", ","),
                (compile(r"(\d):(\d)"), "<col>", ":"),
            ],
            punctuation: compile(r#"['\\/*#$^&()_+="`~….,:?!;\-\[\]]"#),
            brackets: compile(r"[<>]"),
            whitespace: compile(r"\s+"),
            ellipsis: compile(r"\.\.\."),
            padded: compile(r#"([()?:,"'!])"#),
            period: compile(r#"\.(\s|[|$"]|$)"#),
            percent: compile(r"(\d)%"),
            spaced_ellipsis: compile(r"\.\s*\.\s*\."),
            possessive: compile(r"' s(\s+|$)"),
        }
    }

    fn collapse(&self, text: &str) -> String {
        self.whitespace.replace_all(text.trim(), " ").into_owned()
    }

    fn clean(&self, text: &str) -> String {
        let mut text = text.to_lowercase();
        for (re, placeholder, _) in &self.digit_separators {
            // matches may overlap, as in "1.2.3"
            loop {
                let next = re
                    .replace_all(&text, format!("${{1}}{placeholder}${{2}}").as_str())
                    .into_owned();
                if next == text {
                    break;
                }
                text = next;
            }
        }
        let mut text = self.punctuation.replace_all(&text, "").into_owned();
        for (_, placeholder, restored) in &self.digit_separators {
            text = text.replace(placeholder, restored);
        }
        let text = self.brackets.replace_all(&text, "");
        text.replace('%', " % ")
    }

    /// Clean text for vocabulary and bitext construction:
    /// lowercase, strip punctuation except between digits, separate `%`.
    pub fn normalize(&self, text: &str, lang: Language) -> String {
        let cleaned = match lang {
            Language::En => self.clean(text),
            Language::Sv => text
                .split_whitespace()
                .map(|w| self.clean(w))
                .collect::<Vec<_>>()
                .join(" "),
        };
        self.collapse(&cleaned)
    }

    /// Split punctuation off words the way the aligner input expects.
    /// Case and punctuation are kept.
    pub fn tokenize(&self, text: &str, lang: Language) -> String {
        let text = self.ellipsis.replace_all(text, " ...");
        let text = self.padded.replace_all(&text, " $1 ");
        let text = self.collapse(&text);
        let text = self.period.replace_all(&text, " .$1");
        let text = self.percent.replace_all(&text, "$1 %");
        let text = self.spaced_ellipsis.replace_all(&text, " ...");
        let text = match lang {
            Language::En => self.possessive.replace_all(&text, " 's$1").into_owned(),
            Language::Sv => text.into_owned(),
        };
        self.collapse(&text)
    }
}
