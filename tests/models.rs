use std::io::Cursor;

use arbor::lang::{RelId, TagId, TokenIds};
use arbor::models::{DependencyModel, RelationLookup, HMM};

fn close(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-5
}

// states: 0 service, 1 unknown, 2 determiner, 3 noun, 4 verb
// words: 0 service, 1 unknown, 2 the, 3 dog, 4 barks, 5 cat
fn trained_hmm() -> HMM {
    let mut hmm = HMM::new(5, 6);
    hmm.train_sentence(0, 0, &[(2, 2), (3, 3), (4, 4)]);
    hmm.train_sentence(0, 0, &[(2, 2), (3, 5), (4, 4)]);
    hmm
}

#[test]
fn test_hmm_counts() {
    let hmm = trained_hmm();
    assert_eq!(hmm.num_states(), 5);
    assert_eq!(hmm.num_observations(), 6);
    assert_eq!(*hmm.transitions().at([0, 2]), 2.0);
    assert_eq!(*hmm.transitions().at([2, 3]), 2.0);
    assert_eq!(*hmm.transitions().at([3, 4]), 2.0);
    assert_eq!(*hmm.transitions().at([4, 0]), 2.0);
    assert_eq!(*hmm.transitions().at([0, 4]), 0.0);
    assert_eq!(*hmm.emissions().at([2, 2]), 2.0);
    assert_eq!(*hmm.emissions().at([3, 3]), 1.0);
    assert_eq!(*hmm.emissions().at([3, 5]), 1.0);
    assert_eq!(*hmm.emissions().at([4, 4]), 2.0);
    assert_eq!(*hmm.emissions().at([0, 0]), 2.0);
}

#[test]
fn test_hmm_train_sentence_empty() {
    let mut hmm = HMM::new(5, 6);
    hmm.train_sentence(0, 0, &[]);
    assert_eq!(hmm, HMM::new(5, 6));
}

#[test]
fn test_hmm_normalize() {
    let mut hmm = trained_hmm();
    hmm.normalize(0.1);
    // row sums: transitions 2 over 5 states, emissions 2 over 6 words
    assert!(close(
        *hmm.transitions().at([0, 2]),
        2.1f32.ln() - 2.5f32.ln()
    ));
    assert!(close(
        *hmm.transitions().at([0, 4]),
        0.1f32.ln() - 2.5f32.ln()
    ));
    assert!(close(
        *hmm.emissions().at([2, 2]),
        2.1f32.ln() - 2.6f32.ln()
    ));
}

#[test]
fn test_hmm_predict() {
    let mut hmm = trained_hmm();
    hmm.normalize(0.1);
    assert_eq!(hmm.predict(0, &[2, 3, 4]), vec![2, 3, 4]);
    assert_eq!(hmm.predict(0, &[2, 5, 4]), vec![2, 3, 4]);
    // an unseen word follows the transition structure
    assert_eq!(hmm.predict(0, &[2, 1, 4]), vec![2, 3, 4]);
    assert_eq!(hmm.predict(0, &[]), Vec::<u16>::new());
}

#[test]
fn test_hmm_binary_roundtrip() {
    let mut hmm = trained_hmm();
    hmm.normalize(0.1);
    let mut bytes = Vec::new();
    hmm.save_binary(&mut bytes).unwrap();
    let mut restored = HMM::default();
    restored.load_binary(&mut Cursor::new(&bytes)).unwrap();
    assert_eq!(restored, hmm);
}

// tags: 0 root, 1 determiner, 2 noun, 3 verb
// relations: 0 root, 1 det, 2 nsubj (head follows), 3 dobj (head precedes)
struct Rels;

impl RelationLookup for Rels {
    fn root_relation(&self) -> RelId {
        0
    }

    fn head_before(&self, rel: RelId) -> Option<bool> {
        match rel {
            0 | 1 | 2 => Some(false),
            3 => Some(true),
            _ => None,
        }
    }
}

fn token(tag: TagId, head: Option<usize>, rel: RelId) -> TokenIds {
    TokenIds {
        word: 0,
        lemma: 0,
        tag: tag,
        head: head,
        rel: rel,
    }
}

// "the dog barks", three times over
fn trained_parser() -> DependencyModel {
    let sentence = vec![
        token(1, Some(2), 1),
        token(2, Some(3), 2),
        token(3, Some(0), 0),
    ];
    let mut model = DependencyModel::new(4, 4);
    for _ in 0..3 {
        model.process_sentence(0, &sentence);
    }
    model
}

#[test]
fn test_parser_counts() {
    let model = trained_parser();
    assert_eq!(model.num_relations(), 4);
    assert_eq!(model.num_tags(), 4);
    assert_eq!(model.score(1, 2, 1), 3.0);
    assert_eq!(model.score(2, 3, 2), 3.0);
    assert_eq!(model.score(0, 0, 3), 3.0);
    assert_eq!(model.score(3, 1, 2), 0.0);

    let freq = model.frequencies();
    assert_eq!(freq[&1][&1], 3);
    assert_eq!(freq[&2][&2], 3);
    assert_eq!(freq[&3][&0], 3);
    assert!(!freq.contains_key(&0));
}

#[test]
fn test_parser_rejects_broken_annotations() {
    let empty = DependencyModel::new(4, 4);

    // three words on the root
    let mut model = DependencyModel::new(4, 4);
    model.process_sentence(
        0,
        &[
            token(3, Some(0), 0),
            token(3, Some(0), 0),
            token(3, Some(0), 0),
        ],
    );
    assert_eq!(model, empty);

    // absent heads and heads beyond the sentence are skipped
    let mut model = DependencyModel::new(4, 4);
    model.process_sentence(0, &[token(1, None, 1), token(2, Some(4), 2)]);
    assert_eq!(model, empty);
}

#[test]
fn test_parser_normalize() {
    let mut model = trained_parser();
    model.normalize(0.5);
    // 16 cells per child-tag group; seen groups sum to 3
    assert!(close(model.score(1, 2, 1), 3.5f32.ln() - 11.0f32.ln()));
    assert!(close(model.score(2, 3, 2), 3.5f32.ln() - 11.0f32.ln()));
    assert!(close(model.score(0, 0, 3), 3.5f32.ln() - 11.0f32.ln()));
    assert!(close(model.score(3, 1, 2), 0.5f32.ln() - 11.0f32.ln()));
    // the root tag is never a child
    assert!(close(model.score(0, 0, 0), 0.5f32.ln() - 8.0f32.ln()));
}

#[test]
fn test_parser_build_graph() {
    let mut model = trained_parser();
    model.normalize(0.5);
    let graph = model.build_graph(&Rels, 0, &[1, 2, 3]);
    assert_eq!(graph.num_vertices(), 4);
    assert_eq!(graph.num_labels(), 4);
    // root arc onto the verb, penalized by ln(len + position)
    assert!(close(
        graph.weight(0, 3, 0),
        model.score(0, 0, 3) - 5.0f32.ln()
    ));
    // arcs run only in each relation's direction
    assert!(graph.weight(3, 2, 2).is_finite());
    assert!(graph.weight(2, 3, 2).is_nan());
    assert!(graph.weight(2, 3, 3).is_finite());
    assert!(graph.weight(3, 2, 3).is_nan());
    // distance penalty is logarithmic
    assert!(close(
        graph.weight(3, 1, 1),
        model.score(1, 3, 1) - 2.0f32.ln()
    ));
}

#[test]
fn test_parser_extract_tree() {
    let mut model = trained_parser();
    model.normalize(0.5);
    let tree = model.extract_tree(&Rels, 0, &[1, 2, 3]).unwrap();
    assert_eq!(tree.len(), 3);
    let mut heads = vec![None; 4];
    for e in &tree {
        heads[e.dest] = Some((e.src, e.label));
    }
    assert_eq!(heads[1], Some((2, 1)));
    assert_eq!(heads[2], Some((3, 2)));
    assert_eq!(heads[3], Some((0, 0)));
}

#[test]
fn test_parser_extract_tree_degenerate() {
    let mut model = trained_parser();
    model.normalize(0.5);
    assert_eq!(model.extract_tree(&Rels, 0, &[]).unwrap().len(), 0);

    // without normalization every root arc onto a lone token scores
    // exactly zero and counts as absent
    let untrained = DependencyModel::new(4, 4);
    assert!(untrained.extract_tree(&Rels, 0, &[1]).is_none());
}

#[test]
fn test_parser_binary_roundtrip() {
    let mut model = trained_parser();
    model.normalize(0.5);
    let mut bytes = Vec::new();
    model.save_binary(&mut bytes).unwrap();
    let mut restored = DependencyModel::default();
    restored.load_binary(&mut Cursor::new(&bytes)).unwrap();
    assert_eq!(restored.num_relations(), 4);
    assert_eq!(restored.num_tags(), 4);
    for rel in 0..4 {
        for head in 0..4 {
            for child in 0..4 {
                assert!(close(
                    restored.score(rel, head, child),
                    model.score(rel, head, child)
                ));
            }
        }
    }
    assert!(restored.frequencies().is_empty());
}
