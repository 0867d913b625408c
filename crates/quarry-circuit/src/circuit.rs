//! Flat operation sequences.

use std::fmt;
use std::sync::Arc;

use ndarray::Array2;
use num_complex::Complex64;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use crate::error::{CircuitError, CircuitResult};
use crate::operation::Operation;
use crate::qubit::Qubit;
use crate::standard::StandardGate;
use crate::unitary;

/// An ordered list of operations on individually addressed qubits.
///
/// There is no register structure: every operation names its qubits directly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Circuit {
    operations: Vec<Operation>,
}

impl Circuit {
    /// Create an empty circuit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a circuit from a list of operations.
    pub fn from_operations(operations: Vec<Operation>) -> Self {
        Self { operations }
    }

    /// Append an operation.
    pub fn push(&mut self, operation: Operation) -> &mut Self {
        self.operations.push(operation);
        self
    }

    /// Append several operations.
    pub fn extend(&mut self, operations: impl IntoIterator<Item = Operation>) -> &mut Self {
        self.operations.extend(operations);
        self
    }

    /// The operations in order.
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Consume the circuit, returning its operations.
    pub fn into_operations(self) -> Vec<Operation> {
        self.operations
    }

    /// Number of operations.
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Whether the circuit has no operations.
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Every qubit referenced by the circuit, in order of first use.
    pub fn all_qubits(&self) -> Vec<Qubit> {
        let mut seen = FxHashSet::default();
        self.operations
            .iter()
            .flat_map(Operation::qubits)
            .filter(|q| seen.insert(*q))
            .cloned()
            .collect()
    }

    /// Rename qubits; unmapped qubits are kept.
    #[must_use]
    pub fn transform_qubits(&self, mapping: &FxHashMap<Qubit, Qubit>) -> Circuit {
        Circuit {
            operations: self
                .operations
                .iter()
                .map(|op| op.transform_qubits(mapping))
                .collect(),
        }
    }

    /// Unitary of the circuit over `qubit_order` (first qubit most significant).
    pub fn unitary(&self, qubit_order: &[Qubit]) -> CircuitResult<Array2<Complex64>> {
        unitary::unitary_between(&self.operations, qubit_order, qubit_order)
    }

    /// Matrix from the `inputs` basis to the `outputs` basis.
    ///
    /// See [`unitary::unitary_between`] for how ancillas are treated.
    pub fn unitary_between(
        &self,
        inputs: &[Qubit],
        outputs: &[Qubit],
    ) -> CircuitResult<Array2<Complex64>> {
        unitary::unitary_between(&self.operations, inputs, outputs)
    }

    /// Serialize to JSON. Only [`StandardGate`] operations are supported.
    pub fn to_json(&self) -> CircuitResult<String> {
        let operations = self
            .operations
            .iter()
            .map(|op| -> CircuitResult<SerialOperation> {
                let gate = op
                    .gate()
                    .downcast_ref::<StandardGate>()
                    .ok_or_else(|| CircuitError::NotSerializable(op.gate().name()))?;
                Ok(SerialOperation {
                    gate: gate.clone(),
                    qubits: op.qubits().to_vec(),
                })
            })
            .collect::<CircuitResult<Vec<_>>>()?;
        Ok(serde_json::to_string_pretty(&SerialCircuit { operations })?)
    }

    /// Parse a circuit written by [`Circuit::to_json`].
    pub fn from_json(json: &str) -> CircuitResult<Self> {
        let serial: SerialCircuit = serde_json::from_str(json)?;
        let operations = serial
            .operations
            .into_iter()
            .map(|op| Operation::new(Arc::new(op.gate), op.qubits))
            .collect::<CircuitResult<Vec<_>>>()?;
        Ok(Self { operations })
    }
}

#[derive(Serialize, Deserialize)]
struct SerialCircuit {
    operations: Vec<SerialOperation>,
}

#[derive(Serialize, Deserialize)]
struct SerialOperation {
    gate: StandardGate,
    qubits: Vec<Qubit>,
}

impl FromIterator<Operation> for Circuit {
    fn from_iter<I: IntoIterator<Item = Operation>>(iter: I) -> Self {
        Self {
            operations: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Circuit {
    type Item = Operation;
    type IntoIter = std::vec::IntoIter<Operation>;

    fn into_iter(self) -> Self::IntoIter {
        self.operations.into_iter()
    }
}

impl<'a> IntoIterator for &'a Circuit {
    type Item = &'a Operation;
    type IntoIter = std::slice::Iter<'a, Operation>;

    fn into_iter(self) -> Self::IntoIter {
        self.operations.iter()
    }
}

impl fmt::Display for Circuit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for op in &self.operations {
            writeln!(f, "{op}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bell() -> Circuit {
        let q = Qubit::line_range(2);
        [
            StandardGate::H.on([q[0].clone()]).unwrap(),
            StandardGate::CX.on([q[0].clone(), q[1].clone()]).unwrap(),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_all_qubits_first_use() {
        let c: Circuit = [
            StandardGate::X.on([Qubit::line(3)]).unwrap(),
            StandardGate::CX.on([Qubit::line(1), Qubit::line(3)]).unwrap(),
            StandardGate::Z.on([Qubit::line(0)]).unwrap(),
        ]
        .into_iter()
        .collect();
        assert_eq!(
            c.all_qubits(),
            vec![Qubit::line(3), Qubit::line(1), Qubit::line(0)]
        );
    }

    #[test]
    fn test_bell_unitary_column() {
        let c = bell();
        let u = c.unitary(&Qubit::line_range(2)).unwrap();
        let amp = std::f64::consts::FRAC_1_SQRT_2;
        assert!((u[[0, 0]].re - amp).abs() < 1e-12);
        assert!((u[[3, 0]].re - amp).abs() < 1e-12);
        assert!(u[[1, 0]].norm() < 1e-12);
    }

    #[test]
    fn test_json_roundtrip() {
        let c = bell();
        let json = c.to_json().unwrap();
        assert_eq!(Circuit::from_json(&json).unwrap(), c);
    }

    #[test]
    fn test_display() {
        assert_eq!(bell().to_string(), "h(q(0))\ncx(q(0), q(1))\n");
    }
}
