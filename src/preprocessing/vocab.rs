use std::borrow::Borrow;
use std::collections::{BTreeSet, HashMap};

use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

use crate::lang::{RcString, TagId, WordId};

const DEFAULT_CAPACITY: usize = 32;
static SERVICE_TOKEN: &str = "<>";
static UNKNOWN_TOKEN: &str = "<unk>";

/// Word-form interner with two reserved entries: the service form used
/// for sequence bracketing and the unknown form every missing lookup
/// resolves to.
///
/// Alongside the ids it accumulates raw frequencies and the set of tags
/// each form was seen with.
#[derive(Debug, Clone)]
pub struct Vocab {
    s2i: HashMap<RcString, WordId>,
    i2s: Vec<RcString>,
    freq: Vec<u32>,
    tagsets: HashMap<WordId, BTreeSet<TagId>>,
}

impl Vocab {
    pub const SERVICE: WordId = 0;
    pub const UNKNOWN: WordId = 1;

    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let mut v = Vocab {
            s2i: HashMap::with_capacity(capacity),
            i2s: Vec::with_capacity(capacity),
            freq: Vec::with_capacity(capacity),
            tagsets: HashMap::new(),
        };
        v.add(SERVICE_TOKEN.to_string());
        v.add(UNKNOWN_TOKEN.to_string());
        v
    }

    /// Interns `word`, counting a repeated occurrence towards its
    /// frequency. The reserved entries stay at frequency zero.
    pub fn add(&mut self, word: String) -> WordId {
        if let Some(&id) = self.s2i.get(&word[..]) {
            if id > Self::UNKNOWN {
                self.freq[id as usize] += 1;
            }
            return id;
        }
        let id = self.i2s.len() as WordId;
        let rc = RcString::new(word);
        self.i2s.push(rc.clone());
        self.s2i.insert(rc, id);
        self.freq.push(0);
        id
    }

    /// Looks a form up, resolving misses to [`Vocab::UNKNOWN`].
    pub fn get<Q: Borrow<str> + ?Sized>(&self, word: &Q) -> WordId {
        self.s2i
            .get(word.borrow())
            .copied()
            .unwrap_or(Self::UNKNOWN)
    }

    pub fn freq(&self, id: WordId) -> Option<u32> {
        self.freq.get(id as usize).copied()
    }

    pub fn lookup(&self, id: WordId) -> Option<&str> {
        self.i2s.get(id as usize).map(|v| v.as_str())
    }

    pub fn size(&self) -> usize {
        self.i2s.len()
    }

    /// Records that `word` was seen annotated with `tag`.
    pub fn record_tag(&mut self, word: WordId, tag: TagId) {
        self.tagsets.entry(word).or_insert_with(BTreeSet::new).insert(tag);
    }

    /// The tags `word` has been seen with, if any.
    pub fn tags(&self, word: WordId) -> Option<&BTreeSet<TagId>> {
        self.tagsets.get(&word)
    }
}

impl Default for Vocab {
    fn default() -> Self {
        Vocab::new()
    }
}

#[derive(Serialize, Deserialize)]
struct VocabData {
    words: Vec<RcString>,
    freq: Vec<u32>,
    tagsets: Vec<(WordId, Vec<TagId>)>,
}

impl Serialize for Vocab {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut tagsets: Vec<(WordId, Vec<TagId>)> = self
            .tagsets
            .iter()
            .map(|(&word, tags)| (word, tags.iter().copied().collect()))
            .collect();
        tagsets.sort_by_key(|&(word, _)| word);
        let data = VocabData {
            words: self.i2s.clone(),
            freq: self.freq.clone(),
            tagsets: tagsets,
        };
        data.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Vocab {
    fn deserialize<D>(deserializer: D) -> Result<Vocab, D::Error>
    where
        D: Deserializer<'de>,
    {
        let data = VocabData::deserialize(deserializer)?;
        let mut s2i = HashMap::with_capacity(data.words.len());
        for (i, word) in data.words.iter().enumerate() {
            s2i.insert(word.clone(), i as WordId);
        }
        let mut freq = data.freq;
        freq.resize(data.words.len(), 0);
        let tagsets = data
            .tagsets
            .into_iter()
            .map(|(word, tags)| (word, tags.into_iter().collect()))
            .collect();
        Ok(Vocab {
            s2i: s2i,
            i2s: data.words,
            freq: freq,
            tagsets: tagsets,
        })
    }
}
