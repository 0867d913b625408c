//! Error types for the bloq crate.

use quarry_circuit::CircuitError;
use thiserror::Error;

use crate::dtype::DataType;

/// Broad classification of a [`BloqError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed input or an unsupported conversion request.
    Validation,
    /// A feature with no representation on the other side of the conversion.
    Unsupported,
    /// The bloq has no (compatible) decomposition; callers may fall back.
    DecompositionUnavailable,
    /// Internal invariant violation, e.g. a wire bound twice or never bound.
    Consistency,
    /// Error from the circuit model.
    Circuit,
}

/// Errors that can occur while building, decomposing or converting bloqs.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BloqError {
    /// A register name is repeated outside of a LEFT/RIGHT group.
    #[error("Register '{name}' is declared more than once with overlapping sides")]
    DuplicateRegister {
        /// The repeated name.
        name: String,
    },

    /// A bloq with same-named register groups was given to the gate shim.
    #[error(
        "Automated circuit conversion doesn't support multiple registers with same name \
         (bloq: {bloq}, register: '{name}')"
    )]
    RegisterGroup {
        /// Display form of the bloq.
        bloq: String,
        /// The grouped register name.
        name: String,
    },

    /// Soquets were supplied for a register the bloq does not have.
    #[error("{bloq} has no register named '{name}'")]
    UnknownRegister {
        /// Display form of the bloq.
        bloq: String,
        /// The unknown name.
        name: String,
    },

    /// A register was not supplied.
    #[error("No wires supplied for register '{name}' of {bloq}")]
    MissingRegister {
        /// Display form of the bloq.
        bloq: String,
        /// The missing register.
        name: String,
    },

    /// An array does not have the shape its register requires.
    #[error("Register '{name}' expects shape {expected:?}, got {got:?}")]
    ShapeMismatch {
        /// Register name.
        name: String,
        /// Required shape.
        expected: Vec<usize>,
        /// Supplied shape.
        got: Vec<usize>,
    },

    /// A soquet was wired to a register of an incompatible type.
    #[error("Register '{name}' expects {expected}, got a wire of {got}")]
    DtypeMismatch {
        /// Register name.
        name: String,
        /// Register type.
        expected: DataType,
        /// Wire type.
        got: DataType,
    },

    /// A soquet was consumed that is not currently live.
    #[error("Soquet {0} is not available: it was already consumed or never produced")]
    SoquetNotAvailable(String),

    /// Soquets were left unconsumed when finalizing.
    #[error("Finalizing left dangling soquets: {}", .0.join(", "))]
    DanglingSoquets(Vec<String>),

    /// Qubit arrays were not supplied for a register.
    #[error("No qubits supplied for register '{name}'")]
    MissingQuregs {
        /// Register name.
        name: String,
    },

    /// Registers were added to a builder created from a fixed signature.
    #[error("Cannot add register '{0}': the builder's signature is fixed")]
    RegistersFrozen(String),

    /// An explicit import signature came without boundary qubit arrays.
    #[error("An explicit signature requires both input and output qubit arrays")]
    MissingBoundaryQuregs,

    /// Configuration could not be parsed.
    #[error("Invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    /// A flat qubit list does not match the signature it is split by.
    #[error("Signature needs {expected} qubits, got {got}")]
    QubitCount {
        /// Qubits required.
        expected: usize,
        /// Qubits supplied.
        got: usize,
    },

    /// A tensor does not have the shape implied by the signature.
    #[error("Tensor of {bloq} has shape {got:?}, expected a {expected}x{expected} matrix")]
    InvalidTensor {
        /// Display form of the bloq.
        bloq: String,
        /// Required dimension.
        expected: usize,
        /// Actual shape.
        got: (usize, usize),
    },

    /// Power of a bloq that is not a pure transformation.
    #[error("Only bloqs with THRU registers can be raised to a power: {0}")]
    InvalidPower(String),

    /// Classical data would flow through a RIGHT-only wire.
    #[error("Output classical wires are not supported: register '{name}'")]
    ClassicalOutputWire {
        /// Register name.
        name: String,
    },

    /// Classical registers have no qubit representation.
    #[error("Classical register '{name}' cannot be represented on qubits")]
    ClassicalRegister {
        /// Register name.
        name: String,
    },

    /// A wire symbol has no text form.
    #[error("Unknown wire symbol {0}")]
    UnknownWireSymbol(String),

    /// The bloq declares no decomposition.
    #[error("{0} does not declare a decomposition")]
    DecomposeNotImplemented(String),

    /// The bloq's decomposition cannot be expressed for its types.
    #[error("{bloq} cannot be decomposed: {reason}")]
    DecomposeType {
        /// Display form of the bloq.
        bloq: String,
        /// Why.
        reason: String,
    },

    /// A soquet had no qubit binding during conversion.
    #[error("Soquet {0} has no qubit binding; the composite graph is malformed")]
    MissingBinding(String),

    /// The composite graph is not acyclic.
    #[error("Composite graph contains a cycle")]
    Cycle,

    /// Error from the circuit model.
    #[error(transparent)]
    Circuit(CircuitError),
}

impl BloqError {
    /// Classify the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            BloqError::DuplicateRegister { .. }
            | BloqError::RegisterGroup { .. }
            | BloqError::UnknownRegister { .. }
            | BloqError::MissingRegister { .. }
            | BloqError::ShapeMismatch { .. }
            | BloqError::DtypeMismatch { .. }
            | BloqError::SoquetNotAvailable(_)
            | BloqError::DanglingSoquets(_)
            | BloqError::MissingQuregs { .. }
            | BloqError::RegistersFrozen(_)
            | BloqError::MissingBoundaryQuregs
            | BloqError::Config(_)
            | BloqError::QubitCount { .. }
            | BloqError::InvalidTensor { .. }
            | BloqError::InvalidPower(_) => ErrorKind::Validation,
            BloqError::ClassicalOutputWire { .. }
            | BloqError::ClassicalRegister { .. }
            | BloqError::UnknownWireSymbol(_) => ErrorKind::Unsupported,
            BloqError::DecomposeNotImplemented(_) | BloqError::DecomposeType { .. } => {
                ErrorKind::DecompositionUnavailable
            }
            BloqError::MissingBinding(_) | BloqError::Cycle => ErrorKind::Consistency,
            BloqError::Circuit(_) => ErrorKind::Circuit,
        }
    }

    /// Whether the error only says that no decomposition is available.
    pub fn is_decompose_unavailable(&self) -> bool {
        self.kind() == ErrorKind::DecompositionUnavailable
    }
}

impl From<CircuitError> for BloqError {
    fn from(err: CircuitError) -> Self {
        match err {
            CircuitError::Gate(inner) => match inner.downcast::<BloqError>() {
                Ok(bloq_err) => *bloq_err,
                Err(other) => BloqError::Circuit(CircuitError::Gate(other)),
            },
            other => BloqError::Circuit(other),
        }
    }
}

impl From<BloqError> for CircuitError {
    fn from(err: BloqError) -> Self {
        match err {
            BloqError::Circuit(inner) => inner,
            other => CircuitError::Gate(Box::new(other)),
        }
    }
}

/// Result type for bloq operations.
pub type BloqResult<T> = Result<T, BloqError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip_through_circuit_error() {
        let err = BloqError::ClassicalOutputWire { name: "c".into() };
        let circ: CircuitError = err.into();
        assert!(matches!(circ, CircuitError::Gate(_)));
        let back: BloqError = circ.into();
        assert_eq!(back.kind(), ErrorKind::Unsupported);
    }

    #[test]
    fn test_decompose_unavailable() {
        assert!(BloqError::DecomposeNotImplemented("x".into()).is_decompose_unavailable());
        assert!(!BloqError::Cycle.is_decompose_unavailable());
    }

    #[test]
    fn test_group_message_mentions_name() {
        let err = BloqError::RegisterGroup {
            bloq: "Split".into(),
            name: "reg".into(),
        };
        assert!(err.to_string().contains("'reg'"));
        assert!(err.to_string().contains("multiple registers with same name"));
    }
}
