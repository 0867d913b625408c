//! Quarry flat circuit model
//!
//! This crate is the "external" side of Quarry's conversion layer: a circuit is
//! a flat list of [`Operation`]s, each applying a [`Gate`] to individually
//! addressed [`Qubit`]s. There are no registers, no wire structure and no
//! allocation bookkeeping beyond the [`QubitManager`] capability.
//!
//! # Core Components
//!
//! - **Qubits**: [`Qubit`] line, named, and allocator-issued ancilla identities
//! - **Gates**: the [`Gate`] capability trait (decomposition, unitary, diagram
//!   info, powers) and the built-in [`StandardGate`] set
//! - **Operations**: [`Operation`] pairs a shared [`GateRef`] with its qubits
//! - **Circuits**: [`Circuit`] is the flat operation sequence
//! - **Allocation**: [`QubitManager`], [`SimpleQubitManager`] and the
//!   [`DecompositionContext`] passed to decompositions
//!
//! # Example: Unitary of a Bell-state preparation
//!
//! ```rust
//! use quarry_circuit::{Circuit, Qubit, StandardGate};
//!
//! let q = Qubit::line_range(2);
//! let mut circuit = Circuit::new();
//! circuit.push(StandardGate::H.on([q[0].clone()]).unwrap());
//! circuit.push(StandardGate::CX.on([q[0].clone(), q[1].clone()]).unwrap());
//!
//! let u = circuit.unitary(&q).unwrap();
//! assert_eq!(u.dim(), (4, 4));
//! assert_eq!(circuit.all_qubits(), q);
//! ```
//!
//! # Example: JSON
//!
//! Circuits made of [`StandardGate`]s round-trip through JSON:
//!
//! ```rust
//! use quarry_circuit::{Circuit, Qubit, StandardGate};
//!
//! let q = Qubit::line_range(3);
//! let circuit: Circuit = [StandardGate::CSwap.on(q).unwrap()].into_iter().collect();
//! let json = circuit.to_json().unwrap();
//! assert_eq!(Circuit::from_json(&json).unwrap(), circuit);
//! ```

pub mod circuit;
pub mod error;
pub mod gate;
pub mod operation;
pub mod qubit;
pub mod qubit_manager;
pub mod standard;
pub mod unitary;

pub use circuit::Circuit;
pub use error::{CircuitError, CircuitResult};
pub use gate::{DiagramInfo, DynGate, Gate, GateRef};
pub use operation::Operation;
pub use qubit::Qubit;
pub use qubit_manager::{DecompositionContext, QubitManager, SimpleQubitManager};
pub use standard::StandardGate;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
