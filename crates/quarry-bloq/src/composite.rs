//! Composite bloqs: explicit graphs of bloq instances.

use std::fmt;
use std::fmt::Write as _;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use ndarray::Array2;
use num_complex::Complex64;
use petgraph::Direction;
use petgraph::graph::NodeIndex;
use quarry_circuit::{Circuit, QubitManager, SimpleQubitManager};
use rustc_hash::FxHashMap;

use crate::bloq::{Bloq, BloqRef};
use crate::bloqs::adjoint_of;
use crate::config::TraversalOrder;
use crate::error::{BloqError, BloqResult};
use crate::graph::{self, BinstGraph};
use crate::interop::{self, InteropQubitManager, QuregMap};
use crate::signature::Signature;
use crate::soquet::{Binst, BloqInstance, Connection, Soquet};

/// A bloq instance together with its incoming and outgoing connections.
#[derive(Debug, Clone)]
pub struct Bloqnection<'a> {
    /// The instance.
    pub binst: &'a BloqInstance,
    /// Connections into the instance's inputs.
    pub preds: Vec<&'a Connection>,
    /// Connections out of the instance's outputs.
    pub succs: Vec<&'a Connection>,
}

/// A bloq defined by a graph of other bloqs.
///
/// Nodes are the two boundary dangles plus one node per [`BloqInstance`];
/// edges are [`Connection`]s. The graph is acyclic and every soquet is
/// connected exactly once.
#[derive(Debug, Clone)]
pub struct CompositeBloq {
    signature: Signature,
    bloq_instances: Vec<BloqInstance>,
    connections: Vec<Connection>,
    graph: BinstGraph,
    nodes: FxHashMap<Binst, NodeIndex>,
}

impl CompositeBloq {
    /// Assemble a composite from its parts.
    ///
    /// Usually called by [`BloqBuilder::finalize`]; fails if a connection
    /// names an unknown instance or the connections form a cycle.
    pub fn new(
        connections: Vec<Connection>,
        signature: Signature,
        bloq_instances: Vec<BloqInstance>,
    ) -> BloqResult<Self> {
        let mut graph = BinstGraph::new();
        let mut nodes = FxHashMap::default();
        nodes.insert(Binst::LeftDangle, graph.add_node(Binst::LeftDangle));
        for binst in &bloq_instances {
            let binst = Binst::Instance(binst.clone());
            nodes.insert(binst.clone(), graph.add_node(binst));
        }
        nodes.insert(Binst::RightDangle, graph.add_node(Binst::RightDangle));

        for cxn in &connections {
            let node_of = |soq: &Soquet| {
                nodes
                    .get(soq.binst())
                    .copied()
                    .ok_or_else(|| BloqError::MissingBinding(soq.to_string()))
            };
            let (a, b) = (node_of(cxn.left())?, node_of(cxn.right())?);
            graph.add_edge(a, b, cxn.clone());
        }
        if petgraph::algo::is_cyclic_directed(&graph) {
            return Err(BloqError::Cycle);
        }

        Ok(Self {
            signature,
            bloq_instances,
            connections,
            graph,
            nodes,
        })
    }

    /// The composite's registers.
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Instances in insertion order.
    pub fn bloq_instances(&self) -> &[BloqInstance] {
        &self.bloq_instances
    }

    /// Connections in insertion order.
    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    /// The underlying graph.
    pub fn graph(&self) -> &BinstGraph {
        &self.graph
    }

    /// Node order used when exporting.
    pub(crate) fn traversal(&self, order: TraversalOrder) -> BloqResult<Vec<NodeIndex>> {
        graph::topological_sort(&self.graph, order)
    }

    pub(crate) fn node(&self, node: NodeIndex) -> &Binst {
        &self.graph[node]
    }

    pub(crate) fn predecessors(&self, node: NodeIndex) -> Vec<&Connection> {
        graph::connections(&self.graph, node, Direction::Incoming)
    }

    pub(crate) fn successors(&self, node: NodeIndex) -> Vec<&Connection> {
        graph::connections(&self.graph, node, Direction::Outgoing)
    }

    /// Connections into the composite's outputs.
    pub fn final_connections(&self) -> Vec<&Connection> {
        self.nodes
            .get(&Binst::RightDangle)
            .map(|&n| self.predecessors(n))
            .unwrap_or_default()
    }

    /// Every instance with its connections, in greedy topological order.
    pub fn iter_bloqnections(&self) -> BloqResult<Vec<Bloqnection<'_>>> {
        Ok(self
            .traversal(TraversalOrder::Greedy)?
            .into_iter()
            .filter_map(|node| {
                self.node(node).instance().map(|binst| Bloqnection {
                    binst,
                    preds: self.predecessors(node),
                    succs: self.successors(node),
                })
            })
            .collect())
    }

    /// Emit the composite into a circuit, starting from `quregs`.
    ///
    /// Returns the circuit and the qubit arrays of the output registers.
    pub fn to_circuit_and_quregs(
        &self,
        qubit_manager: &mut dyn QubitManager,
        quregs: &QuregMap,
    ) -> BloqResult<(Circuit, QuregMap)> {
        interop::export(&self.signature, quregs, self, qubit_manager)
    }

    /// Emit the composite on named qubits, one per input bit.
    pub fn to_circuit(&self) -> BloqResult<Circuit> {
        let quregs = interop::named_qubits(self.signature.lefts());
        let mut base = SimpleQubitManager::new();
        let mut qm = InteropQubitManager::new(&mut base);
        qm.manage_qubits(interop::merge_qubits(self.signature.lefts(), &quregs)?);
        let (circuit, _) = self.to_circuit_and_quregs(&mut qm, &quregs)?;
        Ok(circuit)
    }

    /// The composite with every instance replaced by its adjoint and every
    /// connection reversed.
    pub fn adjoint(&self) -> BloqResult<CompositeBloq> {
        let adjoints: FxHashMap<usize, BloqInstance> = self
            .bloq_instances
            .iter()
            .map(|b| (b.i(), BloqInstance::new(b.i(), adjoint_of(b.bloq()))))
            .collect();
        let map_binst = |binst: &Binst| -> BloqResult<Binst> {
            Ok(match binst {
                Binst::LeftDangle => Binst::RightDangle,
                Binst::RightDangle => Binst::LeftDangle,
                Binst::Instance(b) => Binst::Instance(
                    adjoints
                        .get(&b.i())
                        .cloned()
                        .ok_or_else(|| BloqError::MissingBinding(b.to_string()))?,
                ),
            })
        };
        let map_soq = |soq: &Soquet| -> BloqResult<Soquet> {
            Ok(Soquet::new(
                map_binst(soq.binst())?,
                soq.reg().adjoint(),
                soq.idx().to_vec(),
            ))
        };

        let connections = self
            .connections
            .iter()
            .rev()
            .map(|cxn| Ok(Connection::new(map_soq(cxn.right())?, map_soq(cxn.left())?)))
            .collect::<BloqResult<Vec<_>>>()?;
        let bloq_instances = self
            .bloq_instances
            .iter()
            .rev()
            .filter_map(|b| adjoints.get(&b.i()).cloned())
            .collect();
        CompositeBloq::new(connections, self.signature.adjoint(), bloq_instances)
    }

    /// Human-readable listing of the wiring, grouped by topological
    /// generation.
    pub fn debug_text(&self) -> BloqResult<String> {
        let sorted = self.traversal(TraversalOrder::Greedy)?;
        let mut out = String::new();
        for (g, generation) in graph::topological_generations(&self.graph, &sorted)
            .into_iter()
            .enumerate()
        {
            let mut lines = Vec::new();
            for node in generation {
                let Binst::Instance(binst) = self.node(node) else { continue };
                lines.push(binst.to_string());
                for cxn in self.predecessors(node) {
                    lines.push(format!("  {} -> {}", cxn.left(), cxn.right().pretty()));
                }
                for cxn in self.successors(node) {
                    lines.push(format!("  {} -> {}", cxn.left().pretty(), cxn.right()));
                }
            }
            if lines.is_empty() {
                continue;
            }
            if g > 0 && !out.is_empty() {
                out.push_str("--------------------\n");
            }
            for line in lines {
                let _ = writeln!(out, "{line}");
            }
        }
        Ok(out.trim_end().to_string())
    }
}

impl PartialEq for CompositeBloq {
    fn eq(&self, other: &Self) -> bool {
        self.signature == other.signature
            && self.bloq_instances == other.bloq_instances
            && self.connections == other.connections
    }
}

impl Eq for CompositeBloq {}

impl Hash for CompositeBloq {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.signature.hash(state);
        self.bloq_instances.hash(state);
        self.connections.len().hash(state);
    }
}

impl fmt::Display for CompositeBloq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CompositeBloq([{} bloqs])", self.bloq_instances.len())
    }
}

impl Bloq for CompositeBloq {
    fn signature(&self) -> Signature {
        self.signature.clone()
    }

    fn decompose_bloq(&self) -> BloqResult<CompositeBloq> {
        Ok(self.clone())
    }

    fn tensor_contract(&self) -> BloqResult<Option<Array2<Complex64>>> {
        if let Some(reg) = self.signature.iter().find(|r| !r.dtype().is_quantum()) {
            return Err(BloqError::ClassicalRegister {
                name: reg.name().to_string(),
            });
        }
        let in_quregs = interop::named_qubits(self.signature.lefts());
        let inputs = interop::merge_qubits(self.signature.lefts(), &in_quregs)?;
        let mut base = SimpleQubitManager::new();
        let mut qm = InteropQubitManager::new(&mut base);
        qm.manage_qubits(inputs.iter().cloned());
        let (circuit, out_quregs) = self.to_circuit_and_quregs(&mut qm, &in_quregs)?;
        let outputs = interop::merge_qubits(self.signature.rights(), &out_quregs)?;
        Ok(Some(circuit.unitary_between(&inputs, &outputs)?))
    }

    fn adjoint(&self) -> Option<BloqRef> {
        CompositeBloq::adjoint(self)
            .ok()
            .map(|cbloq| Arc::new(cbloq) as BloqRef)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::BloqBuilder;
    use crate::bloqs::{Join, Split};
    use crate::dtype::DataType;
    use crate::register::{Register, Side};
    use crate::soquet::Soquets;

    fn split_join() -> CompositeBloq {
        let sig = Signature::build([("x", 2)]).unwrap();
        BloqBuilder::decompose(&sig, |bb, mut soqs| {
            let x = soqs.take("x").unwrap();
            let x = x.iter().next().unwrap().clone();
            let bits = bb.split(x)?;
            let x = bb.join(bits, None)?;
            Ok(Soquets::new().with("x", x))
        })
        .unwrap()
    }

    #[test]
    fn test_debug_text() {
        let expected = "\
Split<0>
  LeftDangle.x -> reg
  reg[0] -> Join<1>.reg[0]
  reg[1] -> Join<1>.reg[1]
--------------------
Join<1>
  Split<0>.reg[0] -> reg[0]
  Split<0>.reg[1] -> reg[1]
  reg -> RightDangle.x";
        assert_eq!(split_join().debug_text().unwrap(), expected);
    }

    #[test]
    fn test_adjoint_reverses() {
        let cbloq = split_join();
        let adj = cbloq.adjoint().unwrap();
        let names: Vec<String> = adj
            .bloq_instances()
            .iter()
            .map(|b| b.to_string())
            .collect();
        assert_eq!(names, vec!["Split<1>", "Join<0>"]);
        assert_eq!(adj.adjoint().unwrap(), cbloq);
    }

    #[test]
    fn test_final_connections() {
        let cbloq = split_join();
        let last = cbloq.final_connections();
        assert_eq!(last.len(), 1);
        assert_eq!(last[0].right().to_string(), "RightDangle.x");
    }

    #[test]
    fn test_greedy_frees_before_allocating() {
        let mut bb = BloqBuilder::new();
        let x = bb
            .add_register(Register::new("x", DataType::QBit).with_side(Side::Left))
            .unwrap()
            .unwrap();
        let y = bb.allocate(DataType::QBit).unwrap();
        bb.free(x.iter().next().unwrap().clone()).unwrap();
        let cbloq = bb.finalize(Soquets::new().with("y", y)).unwrap();

        let greedy: Vec<String> = cbloq
            .iter_bloqnections()
            .unwrap()
            .iter()
            .map(|b| b.binst.to_string())
            .collect();
        assert_eq!(greedy, vec!["Free<1>", "Allocate<0>"]);

        let insertion: Vec<String> = cbloq
            .traversal(TraversalOrder::Insertion)
            .unwrap()
            .into_iter()
            .filter_map(|n| cbloq.node(n).instance().map(ToString::to_string))
            .collect();
        assert_eq!(insertion, vec!["Allocate<0>", "Free<1>"]);
    }

    #[test]
    fn test_cycle_rejected() {
        let reg = Register::new("reg", DataType::QBit);
        let a = BloqInstance::new(0, Arc::new(Split::new(DataType::QBit)));
        let b = BloqInstance::new(1, Arc::new(Join::new(DataType::QBit)));
        let soq = |binst: &BloqInstance| {
            Soquet::new(Binst::Instance(binst.clone()), reg.clone(), Vec::new())
        };
        let cxns = vec![
            Connection::new(soq(&a), soq(&b)),
            Connection::new(soq(&b), soq(&a)),
        ];
        let err = CompositeBloq::new(cxns, Signature::default(), vec![a, b]).unwrap_err();
        assert!(matches!(err, BloqError::Cycle));
    }

    #[test]
    fn test_tensor_of_identity_wiring() {
        let u = split_join().tensor_contract().unwrap().unwrap();
        assert_eq!(u, Array2::eye(4));
    }
}
