//! Minimal CoNLL-U reading and writing.
//!
//! Only the column structure is interpreted. Dependency heads and relations
//! are kept as plain strings.

use crate::errors::{FormatError, Result, SerializeError};
use itertools::Itertools;
use log::debug;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::io::{self, BufRead};
use std::str::FromStr;

/// The canonical empty value of a CoNLL-U column.
pub const EMPTY: &str = "_";

const COLUMNS: usize = 10;

/// Sentence-level comments, in file order.
/// `# key = value` is stored as `(key, Some(value))`, any other comment as `(text, None)`.
pub type Metadata = Vec<(String, Option<String>)>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenId {
    /// A syntactic word.
    Word(usize),
    /// A multiword token spanning words `a..=b`.
    Range(usize, usize),
    /// An empty node `a.b`.
    Empty(usize, usize),
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TokenId::Word(a) => write!(f, "{a}"),
            TokenId::Range(a, b) => write!(f, "{a}-{b}"),
            TokenId::Empty(a, b) => write!(f, "{a}.{b}"),
        }
    }
}

impl FromStr for TokenId {
    type Err = FormatError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let bad = || FormatError::new(format!("invalid token id '{s}'"));
        let num = |x: &str| x.parse::<usize>().map_err(|_| bad());
        if let Some((a, b)) = s.split_once('-') {
            Ok(TokenId::Range(num(a)?, num(b)?))
        } else if let Some((a, b)) = s.split_once('.') {
            Ok(TokenId::Empty(num(a)?, num(b)?))
        } else {
            Ok(TokenId::Word(num(s)?))
        }
    }
}

/// Morphological features of a token.
///
/// Treebanks occasionally list several admissible values for a feature
/// (`Number=Plur,Sing`), so a parsed feature maps to a set of candidates.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Features {
    /// A column that is not a `Key=Value` list, kept verbatim.
    Raw(String),
    Candidates(BTreeMap<String, BTreeSet<String>>),
}

impl Features {
    pub fn parse(column: &str) -> Features {
        if column == EMPTY {
            return Features::Candidates(BTreeMap::new());
        }
        let mut map: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for pair in column.split('|') {
            match pair.split_once('=') {
                Some((k, v)) if !k.is_empty() && !v.is_empty() => {
                    map.entry(k.to_owned())
                        .or_default()
                        .extend(v.split(',').map(str::to_owned));
                }
                _ => return Features::Raw(column.to_owned()),
            }
        }
        Features::Candidates(map)
    }
}

/// One token line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub id: TokenId,
    pub form: String,
    pub lemma: String,
    pub upos: String,
    pub xpos: String,
    pub feats: Features,
    pub head: String,
    pub deprel: String,
    pub deps: String,
    pub misc: String,
}

impl Token {
    fn parse(line: &str) -> std::result::Result<Token, FormatError> {
        let cols = line.split('\t').collect_vec();
        if cols.len() != COLUMNS {
            return Err(FormatError::new(format!(
                "expected {COLUMNS} tab-separated columns, got {}",
                cols.len()
            )));
        }
        Ok(Token {
            id: cols[0].parse()?,
            form: cols[1].to_owned(),
            lemma: cols[2].to_owned(),
            upos: cols[3].to_owned(),
            xpos: cols[4].to_owned(),
            feats: Features::parse(cols[5]),
            head: cols[6].to_owned(),
            deprel: cols[7].to_owned(),
            deps: cols[8].to_owned(),
            misc: cols[9].to_owned(),
        })
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Sentence {
    pub metadata: Metadata,
    pub tokens: Vec<Token>,
}

impl Sentence {
    pub fn meta(&self, key: &str) -> Option<&str> {
        self.metadata
            .iter()
            .find(|(k, _)| k == key)
            .and_then(|(_, v)| v.as_deref())
    }

    /// The forms of all token lines, joined by spaces.
    pub fn forms(&self) -> String {
        self.tokens.iter().map(|t| t.form.as_str()).join(" ")
    }
}

/// Set `key` to `value`, keeping the position of an existing entry.
pub fn set_meta(metadata: &mut Metadata, key: &str, value: &str) {
    match metadata.iter_mut().find(|(k, _)| k == key) {
        Some(entry) => entry.1 = Some(value.to_owned()),
        None => metadata.push((key.to_owned(), Some(value.to_owned()))),
    }
}

fn parse_comment(line: &str) -> (String, Option<String>) {
    let body = line.trim_start_matches('#').trim();
    match body.split_once('=') {
        Some((k, v)) if !k.trim().is_empty() => (k.trim().to_owned(), Some(v.trim().to_owned())),
        _ => (body.to_owned(), None),
    }
}

/// Streams [Sentence]s out of a CoNLL-U file.
pub struct SentenceReader<R> {
    lines: io::Lines<R>,
    line: usize,
}

impl<R: BufRead> SentenceReader<R> {
    pub fn new(reader: R) -> Self {
        SentenceReader {
            lines: reader.lines(),
            line: 0,
        }
    }

    /// Comments in a block without token lines belong to the next block.
    fn read_sentence(&mut self) -> Result<Option<Sentence>> {
        let mut sentence = Sentence::default();
        for line in self.lines.by_ref() {
            let line = line?;
            self.line += 1;
            let line = line.trim_end_matches(['\r', '\n']);
            if line.trim().is_empty() {
                if !sentence.tokens.is_empty() {
                    return Ok(Some(sentence));
                }
                continue;
            }
            if line.starts_with('#') {
                sentence.metadata.push(parse_comment(line));
            } else {
                let token = Token::parse(line).map_err(|e| e.at_line(self.line))?;
                sentence.tokens.push(token);
            }
        }
        if sentence.tokens.is_empty() {
            if !sentence.metadata.is_empty() {
                debug!(
                    target: "annoproj",
                    "ignoring {} comment lines at the end of the treebank",
                    sentence.metadata.len()
                );
            }
            return Ok(None);
        }
        Ok(Some(sentence))
    }
}

impl<R: BufRead> Iterator for SentenceReader<R> {
    type Item = Result<Sentence>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_sentence().transpose()
    }
}

/// Parse a whole CoNLL-U document.
pub fn parse(data: &str) -> Result<Vec<Sentence>> {
    SentenceReader::new(data.as_bytes()).collect()
}

fn check_field(name: &str, value: &str) -> std::result::Result<(), SerializeError> {
    if value.is_empty() {
        return Err(SerializeError(format!("empty {name} column")));
    }
    if value.contains(['\t', '\n', '\r']) {
        return Err(SerializeError(format!(
            "{name} column '{}' contains a tab or line break",
            value.escape_debug()
        )));
    }
    Ok(())
}

const COLUMN_NAMES: [&str; COLUMNS] = [
    "ID", "FORM", "LEMMA", "UPOS", "XPOS", "FEATS", "HEAD", "DEPREL", "DEPS", "MISC",
];

/// Render one sentence block, including the terminating blank line.
pub fn render(
    metadata: &Metadata,
    rows: &[[&str; COLUMNS]],
) -> std::result::Result<String, SerializeError> {
    let mut out = String::new();
    for (k, v) in metadata {
        if k.contains(['\n', '\r']) || v.as_deref().is_some_and(|v| v.contains(['\n', '\r'])) {
            return Err(SerializeError(format!(
                "metadata '{}' contains a line break",
                k.escape_debug()
            )));
        }
        match v.as_deref() {
            Some("") => out.push_str(&format!("# {k} =\n")),
            Some(v) => out.push_str(&format!("# {k} = {v}\n")),
            None if k.is_empty() => out.push_str("#\n"),
            None => out.push_str(&format!("# {k}\n")),
        }
    }
    for row in rows {
        for (name, value) in COLUMN_NAMES.iter().zip(row) {
            check_field(name, value)?;
        }
        out.push_str(&row.join("\t"));
        out.push('\n');
    }
    out.push('\n');
    Ok(out)
}

#[cfg(test)]
mod test {
    use super::*;

    const DOC: &str = "\
# sent_id = 1
# text = The cats sat.
1\tThe\tthe\tDET\tDT\tDefinite=Def|PronType=Art\t2\tdet\t_\t_
2\tcats\tcat\tNOUN\tNNS\tNumber=Plur\t3\tnsubj\t_\t_
3\tsat\tsit\tVERB\tVBD\tMood=Ind|Tense=Past|VerbForm=Fin\t0\troot\t_\tSpaceAfter=No
4\t.\t.\tPUNCT\t.\t_\t3\tpunct\t_\t_


# sent_id = 2
# newpar
1-2\tdon't\t_\t_\t_\t_\t_\t_\t_\t_
1\tdo\tdo\tAUX\tVBP\tMood=Ind\t0\troot\t_\t_
2\tn't\tnot\tPART\tRB\tPolarity=Neg\t1\tadvmod\t_\t_";

    #[test]
    fn read_document() {
        let sentences = parse(DOC).unwrap();
        assert_eq!(sentences.len(), 2);
        let s = &sentences[0];
        assert_eq!(s.meta("sent_id"), Some("1"));
        assert_eq!(s.meta("text"), Some("The cats sat."));
        assert_eq!(s.tokens.len(), 4);
        assert_eq!(s.tokens[1].upos, "NOUN");
        assert_eq!(s.tokens[1].xpos, "NNS");
        assert_eq!(s.tokens[2].misc, "SpaceAfter=No");
        assert_eq!(s.forms(), "The cats sat .");
        let s = &sentences[1];
        assert_eq!(s.metadata[1], ("newpar".to_owned(), None));
        assert_eq!(s.tokens[0].id, TokenId::Range(1, 2));
        assert_eq!(s.tokens.len(), 3);
    }

    #[test]
    fn read_errors_have_line_numbers() {
        let e = parse("# x = y\n1\tonly\ttwo\n").unwrap_err();
        let e = e.downcast_ref::<FormatError>().unwrap();
        assert_eq!(e.line, Some(2));
        let e = parse("x\ta\tb\tc\td\te\tf\tg\th\ti\n").unwrap_err();
        assert!(e.downcast_ref::<FormatError>().is_some());
    }

    #[test]
    fn comments_without_tokens_join_next_block() {
        let doc = "# newdoc id = d1\n\n# sent_id = 1\n1\ta\t_\tX\t_\t_\t_\t_\t_\t_\n\n# end of file\n";
        let sentences = parse(doc).unwrap();
        assert_eq!(sentences.len(), 1);
        assert_eq!(sentences[0].meta("newdoc id"), Some("d1"));
        assert_eq!(sentences[0].meta("sent_id"), Some("1"));
        assert_eq!(sentences[0].tokens.len(), 1);

        let doc = "1\ta\t_\tX\t_\t_\t_\t_\t_\t_\n\n# stray\n\n\n1\tb\t_\tX\t_\t_\t_\t_\t_\t_\n";
        let sentences = parse(doc).unwrap();
        assert_eq!(sentences.len(), 2);
        assert_eq!(sentences[1].metadata, vec![("stray".to_owned(), None)]);
        assert_eq!(sentences[1].tokens[0].form, "b");

        assert!(parse("# only a comment\n\n").unwrap().is_empty());
    }

    #[test]
    fn token_ids() {
        assert_eq!("3".parse::<TokenId>().unwrap(), TokenId::Word(3));
        assert_eq!("3-4".parse::<TokenId>().unwrap(), TokenId::Range(3, 4));
        assert_eq!("3.1".parse::<TokenId>().unwrap(), TokenId::Empty(3, 1));
        assert!("x".parse::<TokenId>().is_err());
        assert_eq!(TokenId::Range(3, 4).to_string(), "3-4");
    }

    #[test]
    fn features() {
        assert_eq!(Features::parse("_"), Features::Candidates(BTreeMap::new()));
        let f = Features::parse("Number=Sing,Plur|Case=Nom");
        let Features::Candidates(map) = f else {
            panic!("expected candidates");
        };
        assert_eq!(map.len(), 2);
        assert_eq!(map["Number"].iter().collect_vec(), vec!["Plur", "Sing"]);
        assert_eq!(Features::parse("weird"), Features::Raw("weird".to_owned()));
        assert_eq!(Features::parse("A=|B=c"), Features::Raw("A=|B=c".to_owned()));
    }

    #[test]
    fn set_meta_keeps_position() {
        let mut md: Metadata = vec![
            ("sent_id".to_owned(), Some("1".to_owned())),
            ("text".to_owned(), Some("a".to_owned())),
            ("newdoc".to_owned(), None),
        ];
        set_meta(&mut md, "text", "b");
        assert_eq!(md[1], ("text".to_owned(), Some("b".to_owned())));
        set_meta(&mut md, "lang", "sv");
        assert_eq!(md[3], ("lang".to_owned(), Some("sv".to_owned())));
    }

    #[test]
    fn render_block() {
        let md: Metadata = vec![
            ("text".to_owned(), Some("hej".to_owned())),
            ("newpar".to_owned(), None),
        ];
        let rows = [["1", "hej", "_", "INTJ", "_", "_", "_", "_", "_", "_"]];
        assert_eq!(
            render(&md, &rows).unwrap(),
            "# text = hej\n# newpar\n1\thej\t_\tINTJ\t_\t_\t_\t_\t_\t_\n\n"
        );
    }

    #[test]
    fn render_empty_comments() {
        let md: Metadata = vec![
            ("text".to_owned(), Some(String::new())),
            (String::new(), None),
        ];
        let rows = [["1", "a", "_", "X", "_", "_", "_", "_", "_", "_"]];
        assert_eq!(
            render(&md, &rows).unwrap(),
            "# text =\n#\n1\ta\t_\tX\t_\t_\t_\t_\t_\t_\n\n"
        );
        let back = parse(&render(&md, &rows).unwrap()).unwrap();
        assert_eq!(back[0].meta("text"), Some(""));
    }

    #[test]
    fn render_rejects_broken_fields() {
        let md: Metadata = vec![];
        let rows = [["1", "", "_", "_", "_", "_", "_", "_", "_", "_"]];
        assert!(render(&md, &rows).is_err());
        let rows = [["1", "a\tb", "_", "_", "_", "_", "_", "_", "_", "_"]];
        assert!(render(&md, &rows).is_err());
        let md: Metadata = vec![("text".to_owned(), Some("a\nb".to_owned()))];
        assert!(render(&md, &[]).is_err());
    }
}
