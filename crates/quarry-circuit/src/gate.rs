//! The gate capability interface.
//!
//! A [`Gate`] exposes a fixed set of independently optional capabilities:
//! a decomposition into further operations, a unitary matrix, diagram
//! symbols and integer powers. Each capability reports "not implemented"
//! with `Ok(None)`, so callers can fall back to another strategy.

use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use ndarray::Array2;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::error::CircuitResult;
use crate::operation::Operation;
use crate::qubit::Qubit;
use crate::qubit_manager::DecompositionContext;

/// Shared handle to a gate.
pub type GateRef = Arc<dyn Gate>;

/// Text labels drawn on each wire a gate touches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagramInfo {
    /// One label per qubit, in operand order.
    pub wire_symbols: Vec<String>,
}

impl DiagramInfo {
    /// Labels given explicitly, one per qubit.
    pub fn new(wire_symbols: Vec<String>) -> Self {
        Self { wire_symbols }
    }

    /// The same label on every one of `num_qubits` wires.
    pub fn uniform(symbol: impl Into<String>, num_qubits: usize) -> Self {
        let symbol = symbol.into();
        Self {
            wire_symbols: vec![symbol; num_qubits],
        }
    }
}

/// A gate in the flat circuit model.
pub trait Gate: DynGate + fmt::Debug + fmt::Display + Send + Sync {
    /// Short name of the gate.
    fn name(&self) -> String;

    /// Number of qubits the gate acts on.
    fn num_qubits(&self) -> usize;

    /// Decompose the gate applied to `qubits` into other operations.
    ///
    /// Returns `Ok(None)` when the gate has no decomposition.
    fn decompose(
        &self,
        _qubits: &[Qubit],
        _context: &mut DecompositionContext<'_>,
    ) -> CircuitResult<Option<Vec<Operation>>> {
        Ok(None)
    }

    /// Whether [`Gate::unitary`] can be expected to produce a matrix.
    fn has_unitary(&self) -> bool {
        false
    }

    /// The gate's matrix in big-endian operand order, if it has a direct one.
    fn unitary(&self) -> CircuitResult<Option<Array2<Complex64>>> {
        Ok(None)
    }

    /// Wire labels for circuit diagrams.
    fn diagram_info(&self) -> CircuitResult<DiagramInfo> {
        Ok(DiagramInfo::uniform(self.name(), self.num_qubits()))
    }

    /// The gate raised to an integer power.
    fn pow(&self, _exponent: i32) -> CircuitResult<Option<GateRef>> {
        Ok(None)
    }
}

/// Object-safe equality and hashing for gates.
///
/// Implemented automatically for every gate that is `PartialEq + Hash`.
pub trait DynGate: Any {
    /// Upcast to [`Any`] for downcasting.
    fn as_any(&self) -> &dyn Any;
    /// Compare against another gate of unknown type.
    fn dyn_eq(&self, other: &dyn Any) -> bool;
    /// Feed the gate into a type-erased hasher.
    fn dyn_hash(&self, state: &mut dyn Hasher);
}

impl<T> DynGate for T
where
    T: Gate + PartialEq + Hash + 'static,
{
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn dyn_eq(&self, other: &dyn Any) -> bool {
        other.downcast_ref::<T>().is_some_and(|other| self == other)
    }

    fn dyn_hash(&self, mut state: &mut dyn Hasher) {
        TypeId::of::<T>().hash(&mut state);
        self.hash(&mut state);
    }
}

impl dyn Gate {
    /// Downcast to a concrete gate type.
    pub fn downcast_ref<T: Gate>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }
}

impl PartialEq for dyn Gate {
    fn eq(&self, other: &Self) -> bool {
        self.dyn_eq(other.as_any())
    }
}

impl Eq for dyn Gate {}

impl Hash for dyn Gate {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.dyn_hash(state);
    }
}
