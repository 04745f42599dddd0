use crate::lang::{IdSentence, Phrasal, RelId, TagId, TokenIds, Tokenized, WordId};

use super::{
    DepRel, DepRelCollection, MorphTag, Preprocess, TagCollection, TagRegistry, Vocab,
};

/// Turns string-side sentences into the id records the statistical models
/// consume.
///
/// `fit` interns unseen forms, tags and relations while encoding;
/// `transform` leaves the collections untouched and resolves unseen input
/// through the unknown entries.
#[derive(Debug, Clone)]
pub struct SentenceEncoder {
    registry: TagRegistry,
    vocab: Vocab,
    tags: TagCollection,
    rels: DepRelCollection,
}

impl SentenceEncoder {
    pub fn new(registry: TagRegistry) -> Self {
        let vocab = Vocab::new();
        let tags = TagCollection::new(&registry);
        let rels = DepRelCollection::new(&registry);
        SentenceEncoder {
            registry: registry,
            vocab: vocab,
            tags: tags,
            rels: rels,
        }
    }

    pub fn from_parts(
        registry: TagRegistry,
        vocab: Vocab,
        tags: TagCollection,
        rels: DepRelCollection,
    ) -> Self {
        SentenceEncoder {
            registry: registry,
            vocab: vocab,
            tags: tags,
            rels: rels,
        }
    }

    pub fn registry(&self) -> &TagRegistry {
        &self.registry
    }

    pub fn vocab(&self) -> &Vocab {
        &self.vocab
    }

    pub fn tags(&self) -> &TagCollection {
        &self.tags
    }

    pub fn relations(&self) -> &DepRelCollection {
        &self.rels
    }

    fn fit_token<T: Tokenized>(&mut self, index: usize, token: &T) -> TokenIds {
        let word = self.vocab.add(token.form().to_lowercase());
        let lemma = match token.lemma() {
            Some(lemma) => self.vocab.add(lemma.to_lowercase()),
            None => word,
        };
        let tag = match self.build_tag(token) {
            Some(tag) => self.tags.intern(tag),
            None => TagCollection::UNKNOWN,
        };
        self.vocab.record_tag(word, tag);
        let (head, rel) = self.fit_rel(index, token);
        TokenIds {
            word: word,
            lemma: lemma,
            tag: tag,
            head: head,
            rel: rel,
        }
    }

    fn transform_token<T: Tokenized>(&self, index: usize, token: &T) -> TokenIds {
        let word = self.vocab.get(&token.form().to_lowercase());
        let lemma = match token.lemma() {
            Some(lemma) => self.vocab.get(&lemma.to_lowercase()),
            None => word,
        };
        let tag = match self.build_tag(token) {
            Some(tag) => self.resolve_tag(word, &tag),
            None => TagCollection::UNKNOWN,
        };
        let (head, rel) = self.transform_rel(index, token);
        TokenIds {
            word: word,
            lemma: lemma,
            tag: tag,
            head: head,
            rel: rel,
        }
    }

    /// `None` when the POS annotation is absent or outside the registry.
    fn build_tag<T: Tokenized>(&self, token: &T) -> Option<MorphTag> {
        let pos = token
            .postag()
            .and_then(|name| self.registry.pos_id(&name.to_lowercase()))?;
        let mut tag = MorphTag::new(pos);
        if let Some(feats) = token.feats() {
            for pair in feats.split('|') {
                let mut parts = pair.splitn(2, '=');
                let name = parts
                    .next()
                    .and_then(|s| self.registry.feature_id(&s.to_lowercase()));
                let value = parts
                    .next()
                    .and_then(|s| self.registry.value_id(&s.to_lowercase()));
                // pairs outside the registry are dropped
                if let (Some(name), Some(value)) = (name, value) {
                    tag.set(name, value);
                }
            }
        }
        Some(tag)
    }

    /// Exact lookup first, then the nearest tag the word was seen with.
    fn resolve_tag(&self, word: WordId, tag: &MorphTag) -> TagId {
        if let Some(id) = self.tags.index_of(tag) {
            return id;
        }
        self.vocab
            .tags(word)
            .and_then(|candidates| self.tags.most_similar(tag, candidates))
            .unwrap_or(TagCollection::UNKNOWN)
    }

    fn build_rel<T: Tokenized>(&self, index: usize, head: usize, token: &T) -> Option<DepRel> {
        let deprel = token.deprel()?.to_lowercase();
        let mut parts = deprel.splitn(2, ':');
        let relation = parts
            .next()
            .and_then(|name| self.registry.relation_id(name))?;
        let modifier = parts
            .next()
            .and_then(|name| self.registry.modifier_id(name))
            .unwrap_or_else(|| self.registry.empty_modifier());
        Some(DepRel {
            relation: relation,
            modifier: modifier,
            head_before: head <= index,
        })
    }

    /// Non-root heads whose relation cannot be encoded are dropped so
    /// that a usable head always carries a meaningful relation id.
    fn fit_rel<T: Tokenized>(&mut self, index: usize, token: &T) -> (Option<usize>, RelId) {
        let head = match token.head() {
            Some(head) => head,
            None => return (None, DepRelCollection::ROOT),
        };
        if head == 0 {
            return (Some(0), DepRelCollection::ROOT);
        }
        match self.build_rel(index, head, token) {
            Some(rel) => (Some(head), self.rels.intern(rel)),
            None => (None, DepRelCollection::ROOT),
        }
    }

    fn transform_rel<T: Tokenized>(&self, index: usize, token: &T) -> (Option<usize>, RelId) {
        let head = match token.head() {
            Some(head) => head,
            None => return (None, DepRelCollection::ROOT),
        };
        if head == 0 {
            return (Some(0), DepRelCollection::ROOT);
        }
        match self
            .build_rel(index, head, token)
            .and_then(|rel| self.rels.index_of(&rel))
        {
            Some(id) => (Some(head), id),
            None => (None, DepRelCollection::ROOT),
        }
    }
}

impl Default for SentenceEncoder {
    fn default() -> Self {
        SentenceEncoder::new(TagRegistry::universal())
    }
}

impl<S: Phrasal> Preprocess<S> for SentenceEncoder {
    type Output = IdSentence;

    fn fit_each(&mut self, x: &S) -> Option<Self::Output> {
        let encoded = x
            .tokens()
            .iter()
            .enumerate()
            .map(|(i, token)| self.fit_token(i, token))
            .collect();
        Some(encoded)
    }

    fn transform_each(&self, x: S) -> Self::Output {
        x.tokens()
            .iter()
            .enumerate()
            .map(|(i, token)| self.transform_token(i, token))
            .collect()
    }
}
