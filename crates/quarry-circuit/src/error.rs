//! Error types for the circuit crate.

use crate::qubit::Qubit;
use thiserror::Error;

/// Errors that can occur while building or evaluating circuits.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CircuitError {
    /// Gate applied to the wrong number of qubits.
    #[error("Gate '{gate_name}' requires {expected} qubits, got {got}")]
    QubitCountMismatch {
        /// Name of the gate.
        gate_name: String,
        /// Expected number of qubits.
        expected: usize,
        /// Actual number of qubits provided.
        got: usize,
    },

    /// Duplicate qubit in operation.
    #[error("Duplicate qubit {qubit} in operation (gate: {gate_name})")]
    DuplicateQubit {
        /// The duplicate qubit.
        qubit: Qubit,
        /// Name of the gate.
        gate_name: String,
    },

    /// A qubit was freed that the allocator does not own.
    #[error("Qubit {qubit} is not allocated by this qubit manager")]
    QubitNotAllocated {
        /// The offending qubit.
        qubit: Qubit,
    },

    /// Gate has neither a matrix nor a decomposition.
    #[error("Gate '{0}' has no unitary and no decomposition")]
    NoUnitary(String),

    /// Dense evaluation was requested for too many qubits.
    #[error("Dense unitary over {got} qubits exceeds the limit of {max}")]
    TooManyQubits {
        /// Qubits required by the evaluation.
        got: usize,
        /// Maximum supported.
        max: usize,
    },

    /// Recursive decomposition did not bottom out.
    #[error("Decomposition of '{0}' exceeded the maximum depth")]
    DecompositionDepth(String),

    /// Circuit contains a gate without a serialized form.
    #[error("Gate '{0}' cannot be serialized")]
    NotSerializable(String),

    /// JSON (de)serialization failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error raised by a gate implementation defined outside this crate.
    #[error(transparent)]
    Gate(Box<dyn std::error::Error + Send + Sync>),
}

/// Result type for circuit operations.
pub type CircuitResult<T> = Result<T, CircuitError>;
