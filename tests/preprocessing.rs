use std::collections::BTreeSet;

use arbor::lang::{Phrasal, Sentence, Token};
use arbor::models::RelationLookup;
use arbor::preprocessing::{
    DepRel, DepRelCollection, MorphTag, Preprocess, SentenceEncoder, TagCollection,
    TagRegistry, Vocab,
};

#[test]
fn test_vocab() {
    let mut vocab = Vocab::new();
    assert_eq!(vocab.size(), 2);
    assert_eq!(vocab.get("<>"), Vocab::SERVICE);
    assert_eq!(vocab.get("<unk>"), Vocab::UNKNOWN);
    assert_eq!(vocab.get("dog"), Vocab::UNKNOWN);

    let dog = vocab.add("dog".to_string());
    let cat = vocab.add("cat".to_string());
    assert_eq!(dog, 2);
    assert_eq!(cat, 3);
    assert_eq!(vocab.add("dog".to_string()), dog);
    assert_eq!(vocab.get("dog"), dog);
    assert_eq!(vocab.lookup(cat), Some("cat"));
    assert_eq!(vocab.lookup(99), None);
    assert_eq!(vocab.size(), 4);

    // a frequency counts the occurrences beyond the first one
    assert_eq!(vocab.freq(dog), Some(1));
    assert_eq!(vocab.freq(cat), Some(0));
    vocab.add("<>".to_string());
    vocab.add("<unk>".to_string());
    assert_eq!(vocab.freq(Vocab::SERVICE), Some(0));
    assert_eq!(vocab.freq(Vocab::UNKNOWN), Some(0));
}

#[test]
fn test_vocab_tags() {
    let mut vocab = Vocab::new();
    let dog = vocab.add("dog".to_string());
    assert!(vocab.tags(dog).is_none());
    vocab.record_tag(dog, 3);
    vocab.record_tag(dog, 5);
    vocab.record_tag(dog, 3);
    let tags = vocab.tags(dog).unwrap();
    assert_eq!(tags.len(), 2);
    assert!(tags.contains(&3));
    assert!(tags.contains(&5));
}

#[test]
fn test_vocab_serde() {
    let mut vocab = Vocab::new();
    let dog = vocab.add("dog".to_string());
    vocab.add("dog".to_string());
    vocab.record_tag(dog, 3);

    let json = serde_json::to_string(&vocab).unwrap();
    let restored: Vocab = serde_json::from_str(&json).unwrap();
    assert_eq!(restored.size(), vocab.size());
    assert_eq!(restored.get("dog"), dog);
    assert_eq!(restored.freq(dog), vocab.freq(dog));
    assert_eq!(restored.tags(dog), vocab.tags(dog));
    assert_eq!(restored.lookup(Vocab::UNKNOWN), Some("<unk>"));
}

#[test]
fn test_tag_registry() {
    let registry = TagRegistry::universal();
    assert_eq!(registry.pos_id("<>"), Some(0));
    assert_eq!(registry.pos_name(0), Some("<>"));
    let noun = registry.pos_id("noun").unwrap();
    assert_eq!(registry.pos_name(noun), Some("noun"));
    // lookups are exact; callers lowercase beforehand
    assert_eq!(registry.pos_id("NOUN"), None);
    assert_eq!(registry.pos_id("gerund"), None);

    let number = registry.feature_id("number").unwrap();
    assert_eq!(registry.feature_name(number), Some("number"));
    // one value id serves every feature that uses the name
    assert!(registry.value_id("imp").is_some());

    assert_eq!(registry.relation_id("root"), Some(0));
    let det = registry.relation_id("det").unwrap();
    assert_eq!(registry.relation_name(det), Some("det"));
    assert_eq!(registry.modifier_id(""), Some(0));
    assert!(registry.modifier_id("poss").is_some());

    assert_eq!(registry.service_pos(), 0);
    assert!(registry.unknown_pos() > 0);
    assert_eq!(registry.empty_modifier(), 0);
}

#[test]
fn test_morph_tag_distance() {
    let registry = TagRegistry::universal();
    let noun = registry.pos_id("noun").unwrap();
    let verb = registry.pos_id("verb").unwrap();
    let number = registry.feature_id("number").unwrap();
    let sing = registry.value_id("sing").unwrap();
    let plur = registry.value_id("plur").unwrap();

    let mut sing_noun = MorphTag::new(noun);
    sing_noun.set(number, sing);
    let mut plur_noun = MorphTag::new(noun);
    plur_noun.set(number, plur);

    assert_eq!(sing_noun.distance(&sing_noun), 0);
    assert_eq!(sing_noun.distance(&plur_noun), 1);
    assert_eq!(sing_noun.distance(&MorphTag::new(noun)), 1);
    assert_eq!(MorphTag::new(noun).distance(&MorphTag::new(verb)), 100);
    assert_eq!(sing_noun.distance(&MorphTag::new(verb)), 101);
}

#[test]
fn test_tag_collection() {
    let registry = TagRegistry::universal();
    let mut tags = TagCollection::new(&registry);
    assert_eq!(tags.len(), 2);
    assert_eq!(
        tags.get(TagCollection::SERVICE).unwrap().pos,
        registry.service_pos()
    );
    assert_eq!(
        tags.get(TagCollection::UNKNOWN).unwrap().pos,
        registry.unknown_pos()
    );

    let noun = registry.pos_id("noun").unwrap();
    let id = tags.intern(MorphTag::new(noun));
    assert_eq!(id, 2);
    assert_eq!(tags.intern(MorphTag::new(noun)), id);
    assert_eq!(tags.index_of(&MorphTag::new(noun)), Some(id));
    assert_eq!(tags.len(), 3);
}

#[test]
fn test_tag_collection_most_similar() {
    let registry = TagRegistry::universal();
    let mut tags = TagCollection::new(&registry);
    let noun = registry.pos_id("noun").unwrap();
    let verb = registry.pos_id("verb").unwrap();
    let number = registry.feature_id("number").unwrap();
    let sing = registry.value_id("sing").unwrap();

    let mut sing_noun = MorphTag::new(noun);
    sing_noun.set(number, sing);
    let bare_noun = tags.intern(MorphTag::new(noun));
    let bare_verb = tags.intern(MorphTag::new(verb));
    let exact = tags.intern(sing_noun.clone());

    let mut candidates = BTreeSet::new();
    assert_eq!(tags.most_similar(&sing_noun, &candidates), None);
    candidates.insert(bare_noun);
    candidates.insert(bare_verb);
    assert_eq!(tags.most_similar(&sing_noun, &candidates), Some(bare_noun));
    candidates.insert(exact);
    assert_eq!(tags.most_similar(&sing_noun, &candidates), Some(exact));
}

#[test]
fn test_dep_rel_collection() {
    let registry = TagRegistry::universal();
    let mut rels = DepRelCollection::new(&registry);
    assert_eq!(rels.len(), 1);
    assert_eq!(
        registry.relation_name(rels.get(DepRelCollection::ROOT).unwrap().relation),
        Some("root")
    );

    let det = DepRel {
        relation: registry.relation_id("det").unwrap(),
        modifier: registry.empty_modifier(),
        head_before: false,
    };
    let id = rels.intern(det);
    assert_eq!(id, 1);
    assert_eq!(rels.intern(det), id);
    assert_eq!(rels.index_of(&det), Some(id));

    // attachment direction is part of the identity
    let mut det_before = det;
    det_before.head_before = true;
    assert_ne!(rels.intern(det_before), id);

    assert_eq!(rels.root_relation(), DepRelCollection::ROOT);
    assert_eq!(rels.head_before(id), Some(false));
    assert_eq!(rels.head_before(99), None);
}

fn training_sentence() -> Sentence<Token<'static>> {
    Sentence::from_tokens(vec![
        Token::new(
            1,
            "The",
            Some("the"),
            Some("DET"),
            Some("Definite=Def|PronType=Art"),
            Some(2),
            Some("det"),
        ),
        Token::new(
            2,
            "dog",
            Some("dog"),
            Some("NOUN"),
            Some("Number=Sing"),
            Some(3),
            Some("nsubj"),
        ),
        Token::new(3, "barks", Some("bark"), Some("VERB"), None, Some(0), Some("root")),
    ])
}

#[test]
fn test_encoder_fit() {
    let mut encoder = SentenceEncoder::default();
    let encoded = encoder
        .fit_transform(vec![training_sentence()].into_iter())
        .collect::<Vec<_>>();
    assert_eq!(encoded.len(), 1);
    let ids = &encoded[0];

    assert_eq!(ids[0].word, 2);
    assert_eq!(ids[0].lemma, 2);
    assert_eq!(ids[0].tag, 2);
    assert_eq!(ids[0].head, Some(2));
    assert_eq!(ids[0].rel, 1);

    assert_eq!(ids[1].word, 3);
    assert_eq!(ids[1].lemma, 3);
    assert_eq!(ids[1].tag, 3);
    assert_eq!(ids[1].head, Some(3));
    assert_eq!(ids[1].rel, 2);

    assert_eq!(ids[2].word, 4);
    assert_eq!(ids[2].lemma, 5);
    assert_eq!(ids[2].tag, 4);
    assert_eq!(ids[2].head, Some(0));
    assert_eq!(ids[2].rel, DepRelCollection::ROOT);

    // forms are lowercased before interning
    assert_eq!(encoder.vocab().lookup(2), Some("the"));
    assert_eq!(encoder.vocab().lookup(5), Some("bark"));
    assert_eq!(encoder.tags().len(), 5);
    assert_eq!(encoder.relations().len(), 3);
    // both encoded relations attach the head on the right
    assert_eq!(encoder.relations().head_before(1), Some(false));
    assert_eq!(encoder.relations().head_before(2), Some(false));
}

#[test]
fn test_encoder_transform() {
    let mut encoder = SentenceEncoder::default();
    encoder.fit(vec![training_sentence()].into_iter());

    let unseen = Sentence::from_tokens(vec![
        Token::new(
            1,
            "THE",
            None,
            Some("DET"),
            Some("Definite=Def|PronType=Art"),
            Some(2),
            Some("det"),
        ),
        Token::new(
            2,
            "dog",
            None,
            Some("NOUN"),
            Some("Number=Plur"),
            Some(3),
            Some("nsubj"),
        ),
        Token::new(3, "naps", None, Some("VERB"), None, Some(2), Some("amod")),
    ]);
    let encoded = encoder
        .transform(vec![unseen].into_iter())
        .collect::<Vec<_>>();
    let ids = &encoded[0];

    // case folding finds the known form; a missing lemma falls back to it
    assert_eq!(ids[0].word, 2);
    assert_eq!(ids[0].lemma, 2);
    assert_eq!(ids[0].tag, 2);
    assert_eq!(ids[0].rel, 1);

    // the plural tag was never seen, the nearest tag of "dog" wins
    assert_eq!(ids[1].word, 3);
    assert_eq!(ids[1].tag, 3);

    // unknown form, and a relation that was never interned drops the head
    assert_eq!(ids[2].word, Vocab::UNKNOWN);
    assert_eq!(ids[2].tag, 4);
    assert_eq!(ids[2].head, None);
    assert_eq!(ids[2].rel, DepRelCollection::ROOT);

    // transform interns nothing
    assert_eq!(encoder.vocab().size(), 6);
    assert_eq!(encoder.relations().len(), 3);
}

#[test]
fn test_encoder_unusable_annotations() {
    let mut encoder = SentenceEncoder::default();
    let sentence = Sentence::from_tokens(vec![
        Token::new(1, "Hello", None, Some("INTJ"), None, None, None),
        Token::new(2, "blue", None, None, None, Some(1), Some("frobnicate")),
    ]);
    let encoded = encoder
        .fit_transform(vec![sentence].into_iter())
        .collect::<Vec<_>>();
    let ids = &encoded[0];

    // no head annotation at all
    assert_eq!(ids[0].head, None);
    assert_eq!(ids[0].rel, DepRelCollection::ROOT);
    assert_eq!(ids[0].tag, 2);

    // the relation name is outside the registry, so the head is unusable
    assert_eq!(ids[1].head, None);
    assert_eq!(ids[1].rel, DepRelCollection::ROOT);
    // absent POS maps to the unknown tag
    assert_eq!(ids[1].tag, TagCollection::UNKNOWN);
    assert_eq!(encoder.relations().len(), 1);
}
