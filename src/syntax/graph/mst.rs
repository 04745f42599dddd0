use std::collections::HashSet;

use super::dsu::DisjointSet;
use super::{Edge, Graph, Vertex, Weight};

/// Chu-Liu/Edmonds maximum spanning arborescence over a borrowed graph.
///
/// Whenever an edge is chosen, its weight is subtracted from every edge
/// entering the same vertex, so the chosen edge itself drops to exactly
/// zero. Edge searches therefore skip zero-weight edges: a zero marks an
/// edge already accounted for, never a candidate.
#[derive(Debug)]
pub struct ChuLiuEdmonds<'a> {
    graph: &'a mut Graph,
}

struct Path {
    edges: Vec<Edge>,
    vertices: HashSet<Vertex>,
}

impl<'a> ChuLiuEdmonds<'a> {
    pub fn new(graph: &'a mut Graph) -> Self {
        ChuLiuEdmonds { graph: graph }
    }

    /// Finds the maximum spanning arborescence rooted at `root`.
    ///
    /// Returns `None` when some vertex is left without a usable incoming
    /// edge. On success the graph is cleared and refilled with exactly the
    /// chosen edges, carrying their reduced weights; after a failure the
    /// graph contents are unspecified and the caller should rebuild.
    pub fn spanning_tree(&mut self, root: Vertex) -> Option<Vec<Edge>> {
        let num_vertices = self.graph.num_vertices();
        let num_labels = self.graph.num_labels();
        for src in 0..num_vertices {
            for label in 0..num_labels {
                self.graph.remove_edge(src, root, label);
            }
        }
        for v in 0..num_vertices {
            for label in 0..num_labels {
                self.graph.remove_edge(v, v, label);
            }
        }

        let mut groups = DisjointSet::new(num_vertices);
        groups.singleton(root);
        let mut found: Vec<Edge> = Vec::with_capacity(num_vertices);
        let mut cycles: Vec<Path> = Vec::new();

        for dest in 0..num_vertices {
            if groups.find(dest).is_some() {
                continue;
            }
            let first = self.max_incoming(dest)?;
            found.push(first);
            self.subtract_incoming(dest, first.weight);
            let mut path = Path {
                edges: vec![first],
                vertices: HashSet::new(),
            };
            path.vertices.insert(dest);

            // climb the head chain until it hits a known group or bites
            // its own tail
            let mut src = first.src;
            while groups.find(src).is_none() && !path.vertices.contains(&src) {
                path.vertices.insert(src);
                let edge = self.max_incoming(src)?;
                found.push(edge);
                self.subtract_incoming(src, edge.weight);
                src = edge.src;
                path.edges.push(edge);
            }

            if groups.find(src) == groups.find(root) {
                for e in path.edges.iter() {
                    groups.union(e.dest, root);
                }
            } else if path.vertices.contains(&src) {
                for e in path.edges.iter() {
                    groups.union(e.dest, dest);
                }
                cycles.push(path);
            } else {
                if groups.find(src).is_none() {
                    groups.singleton(src);
                }
                for e in path.edges.iter() {
                    groups.union(e.dest, src);
                }
            }
        }

        for mut cycle in cycles {
            // the source of the last edge is the vertex the walk revisited;
            // everything before the edge entering it is a tail hanging off
            // the cycle, not part of it
            let repeated = cycle.edges.last()?.src;
            if let Some(pos) = cycle.edges.iter().position(|e| e.dest == repeated) {
                cycle.edges.drain(..pos);
            }
            let mut best: Option<Edge> = None;
            for e in cycle.edges.iter() {
                let candidate = self.max_incoming_restricted(e.dest, e.src)?;
                let better = match best {
                    Some(b) => candidate.weight > b.weight,
                    None => true,
                };
                if better {
                    best = Some(candidate);
                }
            }
            let mut replacement = best?;
            self.subtract_incoming(replacement.dest, replacement.weight);
            if let Some(i) = found.iter().position(|e| e.dest == replacement.dest) {
                replacement.weight += found[i].weight;
                found.remove(i);
            }
            found.push(replacement);
        }

        self.graph.clear_edges();
        for e in found.iter() {
            self.graph.add_edge(e.src, e.dest, e.label, e.weight);
        }
        Some(found)
    }

    fn max_incoming(&self, dest: Vertex) -> Option<Edge> {
        self.best_incoming(dest, None)
    }

    fn max_incoming_restricted(&self, dest: Vertex, excluded_src: Vertex) -> Option<Edge> {
        self.best_incoming(dest, Some(excluded_src))
    }

    fn best_incoming(&self, dest: Vertex, excluded_src: Option<Vertex>) -> Option<Edge> {
        let mut best: Option<Edge> = None;
        for src in 0..self.graph.num_vertices() {
            if excluded_src == Some(src) {
                continue;
            }
            for label in 0..self.graph.num_labels() {
                let weight = self.graph.weight(src, dest, label);
                if weight == 0.0 {
                    continue;
                }
                if !Graph::is_edge(weight) {
                    continue;
                }
                let floor = match best {
                    Some(ref b) => b.weight,
                    None => Weight::NEG_INFINITY,
                };
                if weight > floor {
                    best = Some(Edge {
                        src: src,
                        dest: dest,
                        label: label,
                        weight: weight,
                    });
                }
            }
        }
        best
    }

    fn subtract_incoming(&mut self, dest: Vertex, weight: Weight) {
        for src in 0..self.graph.num_vertices() {
            for label in 0..self.graph.num_labels() {
                *self.graph.weight_mut(src, dest, label) -= weight;
            }
        }
    }
}
