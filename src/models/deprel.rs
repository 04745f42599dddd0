use std::collections::BTreeMap;
use std::io;

use crate::lang::{RelId, TagId, TokenIds};
use crate::syntax::graph::{ChuLiuEdmonds, Edge, Graph};
use crate::tensor::Tensor;

/// Access to the dependency-relation table during counting and decoding.
pub trait RelationLookup {
    /// Id of the relation that attaches a token to the virtual root.
    fn root_relation(&self) -> RelId;

    /// Whether the head precedes the dependent for this relation, or
    /// `None` for an unknown relation id.
    fn head_before(&self, rel: RelId) -> Option<bool>;
}

/// Counting model over (relation, head tag, child tag) triples.
///
/// After [`normalize`] the tensor holds log probabilities grouped by child
/// tag. Decoding scores every candidate arc of a sentence, penalized by
/// log distance, and extracts the maximum spanning arborescence.
///
/// [`normalize`]: #method.normalize
#[derive(Debug, Clone, PartialEq)]
pub struct DependencyModel {
    stat: Tensor<f32, TagId, 3>,
    freq: BTreeMap<TagId, BTreeMap<RelId, u64>>,
}

impl Default for DependencyModel {
    fn default() -> Self {
        DependencyModel {
            stat: Tensor::new(0.0, [0, 0, 0]),
            freq: BTreeMap::new(),
        }
    }
}

impl DependencyModel {
    pub fn new(num_relations: RelId, num_tags: TagId) -> Self {
        DependencyModel {
            stat: Tensor::new(0.0, [num_relations, num_tags, num_tags]),
            freq: BTreeMap::new(),
        }
    }

    /// Reshapes the model and drops every count.
    pub fn resize(&mut self, num_relations: RelId, num_tags: TagId) {
        self.stat.resize(0.0, [num_relations, num_tags, num_tags]);
        self.freq.clear();
    }

    #[inline]
    pub fn num_relations(&self) -> RelId {
        self.stat.size_at(0)
    }

    #[inline]
    pub fn num_tags(&self) -> TagId {
        self.stat.size_at(1)
    }

    /// Cell value for (relation, head tag, child tag): a raw count before
    /// [`normalize`], a log probability after it.
    ///
    /// [`normalize`]: #method.normalize
    #[inline]
    pub fn score(&self, rel: RelId, head: TagId, child: TagId) -> f32 {
        *self.stat.at([rel, head, child])
    }

    /// Raw (child tag, relation) frequencies, kept for diagnostics only.
    pub fn frequencies(&self) -> &BTreeMap<TagId, BTreeMap<RelId, u64>> {
        &self.freq
    }

    /// Counts one annotated sentence.
    ///
    /// A sentence with more than two words attached directly to the root
    /// is taken as a broken annotation and contributes nothing. Words with
    /// an absent head, or a head index beyond the sentence, are skipped;
    /// a head index of 0 counts against `root_tag`.
    pub fn process_sentence(&mut self, root_tag: TagId, words: &[TokenIds]) {
        let mut roots = 0;
        for word in words {
            if word.head == Some(0) {
                roots += 1;
                if roots > 2 {
                    return;
                }
            }
        }
        for word in words {
            let head = match word.head {
                Some(head) => head,
                None => continue,
            };
            if head > words.len() {
                continue;
            }
            let src = if head == 0 {
                root_tag
            } else {
                words[head - 1].tag
            };
            *self.stat.at_mut([word.rel, src, word.tag]) += 1.0;
            *self
                .freq
                .entry(word.tag)
                .or_insert_with(BTreeMap::new)
                .entry(word.rel)
                .or_insert(0) += 1;
        }
    }

    /// Turns the counts into smoothed log probabilities grouped by child
    /// tag.
    pub fn normalize(&mut self, smoothing: f32) {
        self.stat.normalize_log(smoothing, 2);
    }

    /// Builds the candidate graph for a tagged sentence.
    ///
    /// Vertex 0 is the virtual root and token `i` sits at vertex `i + 1`.
    /// Every known relation contributes a root arc to each token, scored
    /// against `root_tag` with a `ln(len + i)` penalty, and an arc for
    /// each token pair whose order matches the relation's head-before
    /// flag, penalized by the log distance between the tokens.
    pub fn build_graph<R: RelationLookup>(
        &self,
        relations: &R,
        root_tag: TagId,
        tags: &[TagId],
    ) -> Graph {
        let len = tags.len();
        let num_relations = self.stat.size_at(0);
        let mut graph = Graph::new(len + 1, num_relations as usize);
        for rel in 0..num_relations {
            let head_before = match relations.head_before(rel) {
                Some(head_before) => head_before,
                None => continue,
            };
            for i1 in 0..len {
                let src = tags[i1];
                graph.add_edge(
                    0,
                    i1 + 1,
                    rel as usize,
                    *self.stat.at([rel, root_tag, src]) - ((len + i1) as f32).ln(),
                );
                for i2 in 0..len {
                    if i1 == i2 || head_before != (i1 < i2) {
                        continue;
                    }
                    let dest = tags[i2];
                    let distance = (i1 as f32 - i2 as f32).abs();
                    graph.add_edge(
                        i1 + 1,
                        i2 + 1,
                        rel as usize,
                        *self.stat.at([rel, src, dest]) - distance.ln(),
                    );
                }
            }
        }
        graph
    }

    /// Scores the sentence and extracts its dependency tree, or `None`
    /// when no spanning arborescence exists.
    pub fn extract_tree<R: RelationLookup>(
        &self,
        relations: &R,
        root_tag: TagId,
        tags: &[TagId],
    ) -> Option<Vec<Edge>> {
        let mut graph = self.build_graph(relations, root_tag, tags);
        let mut solver = ChuLiuEdmonds::new(&mut graph);
        solver.spanning_tree(0)
    }

    /// Writes the statistics tensor.
    pub fn save_binary<W: io::Write>(&self, writer: &mut W) -> io::Result<()> {
        self.stat.save_binary(writer)
    }

    /// Reads the statistics tensor, replacing the model; the diagnostic
    /// frequencies do not round-trip.
    pub fn load_binary<R: io::Read>(&mut self, reader: &mut R) -> io::Result<()> {
        self.stat.load_binary(reader)?;
        self.freq.clear();
        Ok(())
    }
}
