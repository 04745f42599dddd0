use std::borrow::Cow;
use std::fmt;
use std::io as std_io;
use std::ops::Deref;

use crate::io as mod_io;
use crate::lang::{Phrasal, Sentence, Tokenized};

/// A CoNLL-U token: the ten tab-separated fields of one word line.
#[derive(Debug, Clone)]
pub struct Token<'a> {
    id: usize,
    form: Cow<'a, str>,
    lemma: Option<Cow<'a, str>>,
    upostag: Option<Cow<'a, str>>,
    xpostag: Option<Cow<'a, str>>,
    feats: Option<Cow<'a, str>>,
    head: Option<usize>,
    deprel: Option<Cow<'a, str>>,
    deps: Option<Cow<'a, str>>,
    misc: Option<Cow<'a, str>>,
}

impl<'a> Token<'a> {
    pub fn new<S: Into<Cow<'a, str>>>(
        id: usize,
        form: S,
        lemma: Option<S>,
        upostag: Option<S>,
        xpostag: Option<S>,
        feats: Option<S>,
        head: Option<usize>,
        deprel: Option<S>,
        deps: Option<S>,
        misc: Option<S>,
    ) -> Self {
        Token {
            id: id,
            form: form.into(),
            lemma: lemma.map(|s| s.into()),
            upostag: upostag.map(|s| s.into()),
            xpostag: xpostag.map(|s| s.into()),
            feats: feats.map(|s| s.into()),
            head: head,
            deprel: deprel.map(|s| s.into()),
            deps: deps.map(|s| s.into()),
            misc: misc.map(|s| s.into()),
        }
    }

    pub fn xpostag(&self) -> Option<&str> {
        self.xpostag.as_ref().map(|x| x.deref())
    }

    pub fn deps(&self) -> Option<&str> {
        self.deps.as_ref().map(|x| x.deref())
    }

    pub fn misc(&self) -> Option<&str> {
        self.misc.as_ref().map(|x| x.deref())
    }
}

impl<'a> Tokenized for Token<'a> {
    fn id(&self) -> usize {
        self.id
    }

    fn form(&self) -> &str {
        &self.form
    }

    fn lemma(&self) -> Option<&str> {
        self.lemma.as_ref().map(|x| x.deref())
    }

    fn postag(&self) -> Option<&str> {
        self.upostag.as_ref().map(|x| x.deref())
    }

    fn feats(&self) -> Option<&str> {
        self.feats.as_ref().map(|x| x.deref())
    }

    fn head(&self) -> Option<usize> {
        self.head
    }

    fn deprel(&self) -> Option<&str> {
        self.deprel.as_ref().map(|x| x.deref())
    }
}

impl<'a> fmt::Display for Token<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "id: {}, form: {}", self.id, self.form)
    }
}

static FIELD_DELIMITER: char = '\t';
static EMPTY_FIELD: &str = "_";

#[inline]
fn parse_required_usize_field(field: &str) -> Result<usize, std_io::Error> {
    field
        .parse::<usize>()
        .map_err(|e| std_io::Error::new(std_io::ErrorKind::InvalidData, e))
}

/// Unparsable values count as absent, like `_`.
#[inline]
fn parse_lenient_usize_field(field: &str) -> Option<usize> {
    if field == EMPTY_FIELD {
        None
    } else {
        field.parse::<usize>().ok()
    }
}

#[inline]
fn parse_optional_str_field(field: &str) -> Option<&str> {
    if field == EMPTY_FIELD {
        None
    } else {
        Some(field)
    }
}

fn require<'s>(field: Option<&'s str>) -> Result<&'s str, std_io::Error> {
    match field {
        Some(val) => Ok(val),
        None => Err(std_io::Error::new(
            std_io::ErrorKind::InvalidData,
            "line has fewer than 10 fields",
        )),
    }
}

impl<'a> mod_io::FromLine for Token<'a> {
    type Err = std_io::Error;

    fn from_line(line: &str) -> Result<Token<'a>, Self::Err> {
        let mut cols = line.split(FIELD_DELIMITER);
        let token = Token::new(
            require(cols.next()).and_then(parse_required_usize_field)?,
            require(cols.next())?.to_string(),
            require(cols.next()).map(parse_optional_str_field)?.map(|s| s.to_string()),
            require(cols.next()).map(parse_optional_str_field)?.map(|s| s.to_string()),
            require(cols.next()).map(parse_optional_str_field)?.map(|s| s.to_string()),
            require(cols.next()).map(parse_optional_str_field)?.map(|s| s.to_string()),
            require(cols.next()).map(parse_lenient_usize_field)?,
            require(cols.next()).map(parse_optional_str_field)?.map(|s| s.to_string()),
            require(cols.next()).map(parse_optional_str_field)?.map(|s| s.to_string()),
            require(cols.next()).map(parse_optional_str_field)?.map(|s| s.to_string()),
        );
        if cols.next() == None {
            Ok(token)
        } else {
            Err(std_io::Error::new(
                std_io::ErrorKind::InvalidData,
                "line has more than 10 fields",
            ))
        }
    }
}

/// Multiword ranges ("1-2") and empty nodes ("1.1") carry no basic-tree
/// annotation.
fn outside_basic_tree(line: &str) -> bool {
    let id = line.split(FIELD_DELIMITER).next().unwrap_or("");
    id.contains('-') || id.contains('.')
}

pub fn read_upto<R, S, T>(reader: &mut R, num: usize, buf: &mut Vec<S>) -> std_io::Result<usize>
where
    R: std_io::BufRead,
    S: Phrasal<Token = T>,
    T: Tokenized + mod_io::FromLine,
{
    let mut count = 0;
    let mut line = String::new();
    let mut tokens: Vec<T> = vec![];
    while count < num {
        match reader.read_line(&mut line) {
            Ok(0) => {
                if !tokens.is_empty() {
                    buf.push(S::from_tokens(tokens));
                    count += 1;
                }
                break;
            }
            Ok(_) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    if !tokens.is_empty() {
                        buf.push(S::from_tokens(tokens));
                        count += 1;
                        tokens = vec![];
                    }
                } else if !trimmed.starts_with('#') && !outside_basic_tree(trimmed) {
                    tokens.push(
                        T::from_line(trimmed).map_err(|e| {
                            std_io::Error::new(std_io::ErrorKind::InvalidData, e)
                        })?,
                    );
                }
            }
            Err(ref e) if e.kind() == std_io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
        line.clear();
    }
    Ok(count)
}

pub type Reader<'a, R> = mod_io::Reader<R, Sentence<Token<'a>>>;

impl<'a, R: std_io::BufRead> mod_io::Read for Reader<'a, R> {
    type Item = Sentence<Token<'a>>;

    fn read_upto(&mut self, num: usize, buf: &mut Vec<Self::Item>) -> std_io::Result<usize> {
        read_upto(self.inner_mut(), num, buf)
    }
}
