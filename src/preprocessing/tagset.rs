use std::borrow::Borrow;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::hash::Hash;

use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

use crate::lang::{RelId, SymbolId, TagId};
use crate::models::RelationLookup;

/// Bidirectional map between items and dense indices.
#[derive(Debug, Clone, PartialEq)]
pub struct Indexer<T: Eq + Hash + Clone> {
    item2index: HashMap<T, usize>,
    index2item: Vec<T>,
}

impl<T: Eq + Hash + Clone> Indexer<T> {
    pub fn new() -> Self {
        Indexer {
            item2index: HashMap::new(),
            index2item: Vec::new(),
        }
    }

    /// Returns the item's index, inserting it first if necessary.
    pub fn intern(&mut self, item: T) -> usize {
        if let Some(&index) = self.item2index.get(&item) {
            return index;
        }
        let index = self.index2item.len();
        self.index2item.push(item.clone());
        self.item2index.insert(item, index);
        index
    }

    pub fn index_of<Q>(&self, item: &Q) -> Option<usize>
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.item2index.get(item).copied()
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.index2item.get(index)
    }

    pub fn len(&self) -> usize {
        self.index2item.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index2item.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<T> {
        self.index2item.iter()
    }
}

impl<T: Eq + Hash + Clone> Default for Indexer<T> {
    fn default() -> Self {
        Indexer::new()
    }
}

impl<T: Eq + Hash + Clone + Serialize> Serialize for Indexer<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.index2item.serialize(serializer)
    }
}

impl<'de, T: Eq + Hash + Clone + Deserialize<'de>> Deserialize<'de> for Indexer<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let items = Vec::<T>::deserialize(deserializer)?;
        let mut indexer = Indexer::new();
        for item in items {
            indexer.intern(item);
        }
        Ok(indexer)
    }
}

static SERVICE_POS: &str = "<>";
static UNKNOWN_POS: &str = "x";

static POS_NAMES: &[&str] = &[
    "<>", "x", "adj", "adp", "adv", "aux", "cconj", "det", "intj", "noun", "num", "part",
    "pron", "propn", "punct", "sconj", "sym", "verb",
];

static FEATURE_NAMES: &[&str] = &[
    "abbr", "adptype", "animacy", "aspect", "case", "clusivity", "conjtype", "definite",
    "degree", "deixis", "deixisref", "echo", "evident", "foreign", "gender", "gender[psor]",
    "hyph", "mood", "nametype", "nounclass", "number", "number[psor]", "numform", "numtype",
    "numvalue", "parttype", "person", "person[psor]", "polarity", "polite", "poss",
    "prepcase", "prontype", "punctside", "puncttype", "reflex", "style", "subcat", "tense",
    "typo", "variant", "verbform", "verbtype", "voice",
];

// Values are shared across features ("imp" serves Aspect, Mood and
// Tense alike); the feature id in the tag pair disambiguates.
static FEATURE_VALUES: &[&str] = &[
    "yes", "no",
    // animacy, gender, nounclass
    "anim", "hum", "inan", "nhum", "com", "fem", "masc", "neut",
    // aspect
    "hab", "imp", "iter", "perf", "prog", "prosp",
    // case
    "abe", "abl", "abs", "acc", "add", "ade", "all", "ben", "cau", "cmp", "cns", "dat",
    "del", "dis", "ela", "equ", "erg", "ess", "gen", "ill", "ine", "ins", "lat", "loc",
    "nom", "par", "per", "sbl", "sub", "sup", "tem", "ter", "tra", "voc",
    // clusivity
    "ex", "in",
    // definite
    "cons", "def", "ind", "spec",
    // degree
    "aug", "dim", "pos",
    // deixis
    "abv", "bel", "even", "med", "nvis", "prox", "remt",
    // evident
    "fh", "nfh",
    // mood
    "adm", "cnd", "des", "int", "irr", "jus", "nec", "opt", "pot", "prp", "qot",
    // number
    "coll", "count", "dual", "grpa", "grpl", "inv", "pauc", "plur", "ptan", "sing", "tri",
    // numform and numtype
    "word", "digit", "roman",
    "card", "dist", "frac", "mult", "ord", "range", "sets",
    // person
    "0", "1", "2", "3", "4",
    // polarity and polite
    "neg",
    "elev", "form", "humb", "infm",
    // prontype
    "art", "dem", "emp", "exc", "prs", "rcp", "rel", "tot",
    // puncttype and punctside
    "brck", "colo", "comm", "dash", "excl", "peri", "qest", "quot", "semi", "slsh", "ini",
    "fin",
    // tense
    "fut", "past", "pqp", "pres",
    // verbform
    "conv", "gdv", "ger", "inf", "part", "vnoun",
    // voice
    "act", "antip", "bfoc", "dir", "lfoc", "mid", "pass",
    // style and variant
    "arch", "expr", "rare", "slng", "vrnc", "short", "long", "uncontr", "contr",
];

static RELATION_NAMES: &[&str] = &[
    "root", "acl", "advcl", "advmod", "amod", "appos", "aux", "case", "cc", "ccomp", "clf",
    "compound", "conj", "cop", "csubj", "dep", "det", "discourse", "dislocated", "expl",
    "fixed", "flat", "goeswith", "iobj", "list", "mark", "nmod", "nsubj", "nummod", "obj",
    "obl", "orphan", "parataxis", "punct", "reparandum", "vocative", "xcomp",
];

static MODIFIER_NAMES: &[&str] = &[
    "", "agent", "appos", "arg", "emph", "foreign", "gobj", "gsubj", "lmod", "lvc", "name",
    "npmod", "numgov", "nummod", "outer", "pass", "poss", "preconj", "pred", "predet",
    "prt", "relcl", "svc", "tmod",
];

/// Read-only symbol tables for the universal tag inventory.
///
/// Built once at startup; collections and encoders borrow it and only
/// ever look symbols up.
#[derive(Debug, Clone)]
pub struct TagRegistry {
    pos: Indexer<String>,
    features: Indexer<String>,
    values: Indexer<String>,
    relations: Indexer<String>,
    modifiers: Indexer<String>,
}

impl TagRegistry {
    /// The Universal Dependencies inventory plus the reserved service
    /// symbol.
    pub fn universal() -> Self {
        TagRegistry {
            pos: intern_all(POS_NAMES),
            features: intern_all(FEATURE_NAMES),
            values: intern_all(FEATURE_VALUES),
            relations: intern_all(RELATION_NAMES),
            modifiers: intern_all(MODIFIER_NAMES),
        }
    }

    pub fn pos_id(&self, name: &str) -> Option<SymbolId> {
        self.pos.index_of(name).map(|i| i as SymbolId)
    }

    pub fn pos_name(&self, id: SymbolId) -> Option<&str> {
        self.pos.get(id as usize).map(|s| s.as_str())
    }

    pub fn feature_id(&self, name: &str) -> Option<SymbolId> {
        self.features.index_of(name).map(|i| i as SymbolId)
    }

    pub fn feature_name(&self, id: SymbolId) -> Option<&str> {
        self.features.get(id as usize).map(|s| s.as_str())
    }

    pub fn value_id(&self, name: &str) -> Option<SymbolId> {
        self.values.index_of(name).map(|i| i as SymbolId)
    }

    pub fn value_name(&self, id: SymbolId) -> Option<&str> {
        self.values.get(id as usize).map(|s| s.as_str())
    }

    pub fn relation_id(&self, name: &str) -> Option<SymbolId> {
        self.relations.index_of(name).map(|i| i as SymbolId)
    }

    pub fn relation_name(&self, id: SymbolId) -> Option<&str> {
        self.relations.get(id as usize).map(|s| s.as_str())
    }

    pub fn modifier_id(&self, name: &str) -> Option<SymbolId> {
        self.modifiers.index_of(name).map(|i| i as SymbolId)
    }

    pub fn modifier_name(&self, id: SymbolId) -> Option<&str> {
        self.modifiers.get(id as usize).map(|s| s.as_str())
    }

    pub fn service_pos(&self) -> SymbolId {
        self.pos_id(SERVICE_POS).unwrap_or(0)
    }

    pub fn unknown_pos(&self) -> SymbolId {
        self.pos_id(UNKNOWN_POS).unwrap_or(0)
    }

    pub fn empty_modifier(&self) -> SymbolId {
        self.modifier_id("").unwrap_or(0)
    }
}

fn intern_all(names: &[&str]) -> Indexer<String> {
    let mut indexer = Indexer::new();
    for name in names {
        indexer.intern(name.to_string());
    }
    indexer
}

/// A morphological tag: coarse POS plus (feature, value) pairs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MorphTag {
    pub pos: SymbolId,
    pub feats: BTreeMap<SymbolId, SymbolId>,
}

impl MorphTag {
    pub fn new(pos: SymbolId) -> Self {
        MorphTag {
            pos: pos,
            feats: BTreeMap::new(),
        }
    }

    pub fn set(&mut self, feature: SymbolId, value: SymbolId) {
        self.feats.insert(feature, value);
    }

    /// Dissimilarity to another tag: 100 for a POS mismatch, plus the
    /// larger feature count minus the number of matching pairs.
    pub fn distance(&self, other: &MorphTag) -> usize {
        let penalty = if self.pos == other.pos { 0 } else { 100 };
        let max_feats = self.feats.len().max(other.feats.len());
        let matching = self
            .feats
            .iter()
            .filter(|(name, value)| other.feats.get(name) == Some(value))
            .count();
        penalty + max_feats - matching
    }
}

/// Interned morphological tags with reserved service and unknown entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagCollection {
    tags: Indexer<MorphTag>,
}

impl TagCollection {
    pub const SERVICE: TagId = 0;
    pub const UNKNOWN: TagId = 1;

    pub fn new(registry: &TagRegistry) -> Self {
        let mut tags = Indexer::new();
        tags.intern(MorphTag::new(registry.service_pos()));
        tags.intern(MorphTag::new(registry.unknown_pos()));
        TagCollection { tags: tags }
    }

    pub fn intern(&mut self, tag: MorphTag) -> TagId {
        self.tags.intern(tag) as TagId
    }

    pub fn index_of(&self, tag: &MorphTag) -> Option<TagId> {
        self.tags.index_of(tag).map(|i| i as TagId)
    }

    pub fn get(&self, id: TagId) -> Option<&MorphTag> {
        self.tags.get(id as usize)
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// The candidate closest to `tag` under [`MorphTag::distance`]; the
    /// lowest id wins ties. `None` when `candidates` is empty.
    pub fn most_similar(&self, tag: &MorphTag, candidates: &BTreeSet<TagId>) -> Option<TagId> {
        let mut best: Option<(usize, TagId)> = None;
        for &candidate in candidates {
            let known = match self.tags.get(candidate as usize) {
                Some(known) => known,
                None => continue,
            };
            let distance = tag.distance(known);
            let better = match best {
                Some((b, _)) => distance < b,
                None => true,
            };
            if better {
                best = Some((distance, candidate));
            }
        }
        best.map(|(_, id)| id)
    }
}

/// A dependency relation as used for arc labeling: the base relation, an
/// optional subtype modifier and the attested head direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DepRel {
    pub relation: SymbolId,
    pub modifier: SymbolId,
    pub head_before: bool,
}

/// Interned dependency relations; the root-attachment relation is always
/// id 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepRelCollection {
    rels: Indexer<DepRel>,
}

impl DepRelCollection {
    pub const ROOT: RelId = 0;

    pub fn new(registry: &TagRegistry) -> Self {
        let mut rels = Indexer::new();
        rels.intern(DepRel {
            relation: registry.relation_id("root").unwrap_or(0),
            modifier: registry.modifier_id("").unwrap_or(0),
            head_before: false,
        });
        DepRelCollection { rels: rels }
    }

    pub fn intern(&mut self, rel: DepRel) -> RelId {
        self.rels.intern(rel) as RelId
    }

    pub fn index_of(&self, rel: &DepRel) -> Option<RelId> {
        self.rels.index_of(rel).map(|i| i as RelId)
    }

    pub fn get(&self, id: RelId) -> Option<&DepRel> {
        self.rels.get(id as usize)
    }

    pub fn len(&self) -> usize {
        self.rels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rels.is_empty()
    }
}

impl RelationLookup for DepRelCollection {
    fn root_relation(&self) -> RelId {
        Self::ROOT
    }

    fn head_before(&self, rel: RelId) -> Option<bool> {
        self.rels.get(rel as usize).map(|r| r.head_before)
    }
}
