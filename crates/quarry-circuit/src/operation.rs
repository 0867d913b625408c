//! A gate applied to specific qubits.

use std::fmt;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::error::{CircuitError, CircuitResult};
use crate::gate::GateRef;
use crate::qubit::Qubit;

/// A gate applied to an ordered list of qubits.
#[derive(Debug, Clone, Eq, Hash)]
pub struct Operation {
    gate: GateRef,
    qubits: Vec<Qubit>,
}

// Field-wise equality, equivalent to `#[derive(PartialEq)]` (which cannot
// compile against an `Arc<dyn Gate>` field, rust-lang/rust#31740).
impl PartialEq for Operation {
    fn eq(&self, other: &Self) -> bool {
        PartialEq::eq(&self.gate, &other.gate) && self.qubits == other.qubits
    }
}

impl Operation {
    /// Apply `gate` to `qubits`, checking arity and distinctness.
    pub fn new(gate: GateRef, qubits: impl IntoIterator<Item = Qubit>) -> CircuitResult<Self> {
        let qubits: Vec<Qubit> = qubits.into_iter().collect();
        if qubits.len() != gate.num_qubits() {
            return Err(CircuitError::QubitCountMismatch {
                gate_name: gate.name(),
                expected: gate.num_qubits(),
                got: qubits.len(),
            });
        }
        let mut seen = FxHashSet::default();
        for q in &qubits {
            if !seen.insert(q) {
                return Err(CircuitError::DuplicateQubit {
                    qubit: q.clone(),
                    gate_name: gate.name(),
                });
            }
        }
        Ok(Self { gate, qubits })
    }

    /// The gate.
    pub fn gate(&self) -> &GateRef {
        &self.gate
    }

    /// The operand qubits.
    pub fn qubits(&self) -> &[Qubit] {
        &self.qubits
    }

    /// Rename qubits according to `mapping`; unmapped qubits are kept.
    pub fn transform_qubits(&self, mapping: &FxHashMap<Qubit, Qubit>) -> Operation {
        Operation {
            gate: self.gate.clone(),
            qubits: self
                .qubits
                .iter()
                .map(|q| mapping.get(q).unwrap_or(q).clone())
                .collect(),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.gate)?;
        let qubits: Vec<String> = self.qubits.iter().map(ToString::to_string).collect();
        write!(f, "({})", qubits.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::standard::StandardGate;

    #[test]
    fn test_arity_checked() {
        let err = StandardGate::CX.on([Qubit::line(0)]).unwrap_err();
        assert!(matches!(
            err,
            CircuitError::QubitCountMismatch {
                expected: 2,
                got: 1,
                ..
            }
        ));
    }

    #[test]
    fn test_duplicate_qubit() {
        let err = StandardGate::CX
            .on([Qubit::line(0), Qubit::line(0)])
            .unwrap_err();
        assert!(matches!(err, CircuitError::DuplicateQubit { .. }));
    }

    #[test]
    fn test_transform_and_display() {
        let op = StandardGate::CX.on([Qubit::line(0), Qubit::line(1)]).unwrap();
        let mut mapping = FxHashMap::default();
        mapping.insert(Qubit::line(1), Qubit::named("t"));
        let moved = op.transform_qubits(&mapping);
        assert_eq!(moved.to_string(), "cx(q(0), t)");
        assert_ne!(op, moved);
    }
}
