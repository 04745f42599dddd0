pub(crate) use self::rcstring::RcString;
pub use self::simple::*;

mod rcstring;
mod simple;

/// Interned word-form id.
pub type WordId = u32;
/// Interned morphological tag id.
pub type TagId = u16;
/// Interned dependency-relation id.
pub type RelId = u16;
/// Fixed-registry symbol id (POS names, feature names and values,
/// relation names and modifiers).
pub type SymbolId = u8;

/// A string-side token.
pub trait Tokenized {
    fn id(&self) -> usize;
    fn form(&self) -> &str;
    fn lemma(&self) -> Option<&str>;
    fn postag(&self) -> Option<&str>;
    fn feats(&self) -> Option<&str>;
    fn head(&self) -> Option<usize>;
    fn deprel(&self) -> Option<&str>;
}

pub trait Phrasal {
    type Token: Tokenized;

    fn from_tokens(tokens: Vec<Self::Token>) -> Self;
    fn raw(&self) -> &str;

    fn token(&self, index: usize) -> Option<&Self::Token>;
    fn tokens(&self) -> &[Self::Token];

    fn len(&self) -> usize {
        self.tokens().len()
    }

    fn is_empty(&self) -> bool {
        self.tokens().is_empty()
    }
}

/// A token reduced to the ids the statistical models consume.
///
/// `head` is a 1-based index into the sentence with `Some(0)` meaning the
/// virtual root and `None` meaning the annotation is absent or unusable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenIds {
    pub word: WordId,
    pub lemma: WordId,
    pub tag: TagId,
    pub head: Option<usize>,
    pub rel: RelId,
}

pub type IdSentence = Vec<TokenIds>;
