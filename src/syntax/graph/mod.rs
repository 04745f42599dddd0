use std::io;

use crate::tensor::Tensor;

pub use self::dsu::DisjointSet;
pub use self::mst::ChuLiuEdmonds;

mod dsu;
mod mst;

pub type Vertex = usize;
pub type Weight = f32;

/// A directed labeled edge with its score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub src: Vertex,
    pub dest: Vertex,
    pub label: usize,
    pub weight: Weight,
}

/// Dense digraph over (src, dest, label) cells.
///
/// A cell holds the edge weight; `NAN` means the edge is absent. Weights
/// of exactly zero are valid cells but the arborescence solver treats them
/// as absent, see [`ChuLiuEdmonds`].
#[derive(Debug, Clone)]
pub struct Graph {
    weights: Tensor<Weight, usize, 3>,
}

impl Graph {
    pub fn new(num_vertices: usize, num_labels: usize) -> Self {
        Graph {
            weights: Tensor::new(f32::NAN, [num_vertices, num_vertices, num_labels]),
        }
    }

    pub fn with_edges(num_vertices: usize, num_labels: usize, edges: &[Edge]) -> Self {
        let mut graph = Graph::new(num_vertices, num_labels);
        for e in edges {
            graph.add_edge(e.src, e.dest, e.label, e.weight);
        }
        graph
    }

    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.weights.size_at(0)
    }

    #[inline]
    pub fn num_labels(&self) -> usize {
        self.weights.size_at(2)
    }

    #[inline]
    pub fn is_edge(weight: Weight) -> bool {
        !weight.is_nan()
    }

    #[inline]
    pub fn weight(&self, src: Vertex, dest: Vertex, label: usize) -> Weight {
        *self.weights.at([src, dest, label])
    }

    #[inline]
    pub fn weight_mut(&mut self, src: Vertex, dest: Vertex, label: usize) -> &mut Weight {
        self.weights.at_mut([src, dest, label])
    }

    pub fn add_edge(&mut self, src: Vertex, dest: Vertex, label: usize, weight: Weight) {
        *self.weights.at_mut([src, dest, label]) = weight;
    }

    pub fn remove_edge(&mut self, src: Vertex, dest: Vertex, label: usize) {
        *self.weights.at_mut([src, dest, label]) = f32::NAN;
    }

    /// Removes every edge, keeping the shape.
    pub fn clear_edges(&mut self) {
        self.weights.fill(f32::NAN);
    }

    /// Snapshot of the present edges in (src, dest, label) order.
    pub fn edges(&self) -> Vec<Edge> {
        let mut edges = Vec::new();
        for src in 0..self.num_vertices() {
            for dest in 0..self.num_vertices() {
                for label in 0..self.num_labels() {
                    let weight = self.weight(src, dest, label);
                    if Self::is_edge(weight) {
                        edges.push(Edge {
                            src: src,
                            dest: dest,
                            label: label,
                            weight: weight,
                        });
                    }
                }
            }
        }
        edges
    }

    /// Renders the graph in Graphviz dot format.
    pub fn write_dot<W: io::Write>(&self, writer: &mut W) -> io::Result<()> {
        write_dot_edges(writer, &self.edges())
    }
}

/// Renders an edge list in Graphviz dot format.
///
/// Zero-weight edges come out `green4` with the label id alone; they are
/// solution edges whose weight was consumed by reduced-cost subtraction.
pub fn write_dot_edges<W: io::Write>(writer: &mut W, edges: &[Edge]) -> io::Result<()> {
    writeln!(writer, "digraph {{")?;
    for e in edges {
        if e.weight == 0.0 {
            writeln!(
                writer,
                "\"{}\" -> \"{}\" [color=green4, label=\"{}\"]",
                e.src, e.dest, e.label
            )?;
        } else {
            writeln!(
                writer,
                "\"{}\" -> \"{}\" [color=lightblue, label=\"{} ({})\"]",
                e.src, e.dest, e.label, e.weight
            )?;
        }
    }
    writeln!(writer, "}}")
}
