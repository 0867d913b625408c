//! Traversal orders over the composite graph.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;

use crate::config::TraversalOrder;
use crate::error::{BloqError, BloqResult};
use crate::soquet::{Binst, Connection};

/// The instance graph of a composite bloq.
pub type BinstGraph = DiGraph<Binst, Connection>;

/// Scheduling priority of a node; lower runs first.
///
/// Boundary nodes sit at the extremes so that inputs are bound before
/// anything else and outputs are collected after everything else.
fn priority(binst: &Binst, order: TraversalOrder) -> i64 {
    match binst {
        Binst::LeftDangle => i64::MIN,
        Binst::RightDangle => i64::MAX,
        Binst::Instance(_) if order == TraversalOrder::Insertion => 0,
        Binst::Instance(inst) => {
            let signature = inst.bloq().signature();
            signature.right_bits() as i64 - signature.left_bits() as i64
        }
    }
}

/// Topologically sort `graph`, breaking ties by priority and then by node
/// index.
///
/// With [`TraversalOrder::Greedy`], bloqs that release qubits run before
/// bloqs that acquire them whenever the dependencies allow it.
pub(crate) fn topological_sort(
    graph: &BinstGraph,
    order: TraversalOrder,
) -> BloqResult<Vec<NodeIndex>> {
    let mut in_degree: Vec<usize> = graph
        .node_indices()
        .map(|n| graph.edges_directed(n, Direction::Incoming).count())
        .collect();
    let mut ready: BinaryHeap<Reverse<(i64, usize)>> = graph
        .node_indices()
        .filter(|n| in_degree[n.index()] == 0)
        .map(|n| Reverse((priority(&graph[n], order), n.index())))
        .collect();

    let mut sorted = Vec::with_capacity(graph.node_count());
    while let Some(Reverse((_, index))) = ready.pop() {
        let node = NodeIndex::new(index);
        sorted.push(node);
        for edge in graph.edges_directed(node, Direction::Outgoing) {
            let target = edge.target();
            in_degree[target.index()] -= 1;
            if in_degree[target.index()] == 0 {
                ready.push(Reverse((priority(&graph[target], order), target.index())));
            }
        }
    }

    if sorted.len() != graph.node_count() {
        return Err(BloqError::Cycle);
    }
    Ok(sorted)
}

/// Group nodes into generations: every node lands in the generation after
/// its latest predecessor.
pub(crate) fn topological_generations(
    graph: &BinstGraph,
    sorted: &[NodeIndex],
) -> Vec<Vec<NodeIndex>> {
    let mut depth = vec![0usize; graph.node_count()];
    let mut generations: Vec<Vec<NodeIndex>> = Vec::new();
    for &node in sorted {
        let d = graph
            .edges_directed(node, Direction::Incoming)
            .map(|e| depth[e.source().index()] + 1)
            .max()
            .unwrap_or(0);
        depth[node.index()] = d;
        if generations.len() <= d {
            generations.resize_with(d + 1, Vec::new);
        }
        generations[d].push(node);
    }
    generations
}

/// Edges into (`Incoming`) or out of (`Outgoing`) `node`, in insertion order.
pub(crate) fn connections(
    graph: &BinstGraph,
    node: NodeIndex,
    direction: Direction,
) -> Vec<&Connection> {
    let mut edges: Vec<_> = graph.edges_directed(node, direction).collect();
    edges.sort_by_key(|e| e.id());
    edges.into_iter().map(|e| e.weight()).collect()
}
