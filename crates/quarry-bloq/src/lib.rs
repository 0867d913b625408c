//! Quarry Bloq Intermediate Representation
//!
//! This crate holds Quarry's structured circuit representation and its
//! conversion to and from the flat circuits of [`quarry_circuit`].
//!
//! # Overview
//!
//! A [`Bloq`] is a quantum operation described by a [`Signature`] of named,
//! typed, possibly multi-dimensional [`Register`]s. A [`CompositeBloq`] is an
//! explicit acyclic graph of bloq instances whose [`Soquet`]s are wired by
//! [`Connection`]s. Composites are built incrementally with a
//! [`BloqBuilder`], which enforces that every soquet is consumed exactly once.
//!
//! # Core Components
//!
//! - **Registers**: [`DataType`], [`Register`], [`Side`] and [`Signature`]
//! - **Bloqs**: the [`Bloq`] trait and the bookkeeping, adjoint and power
//!   bloqs in [`bloqs`]
//! - **Wiring**: [`Soquet`], [`Connection`], [`Soquets`] and [`BloqBuilder`]
//! - **Composites**: [`CompositeBloq`] and its traversal helpers
//! - **Interop**: [`interop::export`], [`interop::import`], the gate shims
//!   [`interop::BloqAsGate`] and [`interop::CircuitGateAsBloq`], and the
//!   [`interop::InteropQubitManager`]
//!
//! # Example: Circuit Round Trip
//!
//! ```rust
//! use quarry_bloq::interop;
//! use quarry_circuit::{Circuit, Qubit, StandardGate};
//!
//! let q = Qubit::line_range(2);
//! let circuit: Circuit = [
//!     StandardGate::H.on([q[0].clone()]).unwrap(),
//!     StandardGate::CX.on([q[0].clone(), q[1].clone()]).unwrap(),
//! ]
//! .into_iter()
//! .collect();
//!
//! // One THRU register `qubits: QBit[2]` over the circuit's qubits
//! let cbloq = interop::import(&circuit, None, None, None).unwrap();
//! assert_eq!(cbloq.bloq_instances().len(), 2);
//!
//! let back = cbloq.to_circuit().unwrap();
//! assert_eq!(back.len(), 2);
//! ```
//!
//! # Example: Building a Composite
//!
//! ```rust
//! use quarry_bloq::{BloqBuilder, DataType, Soquets};
//!
//! let mut bb = BloqBuilder::new();
//! let a = bb.allocate(DataType::QAny(3)).unwrap();
//! let bits = bb.split(a).unwrap();
//! let a = bb.join(bits, Some(DataType::QUInt(3))).unwrap();
//! let cbloq = bb.finalize(Soquets::new().with("a", a)).unwrap();
//!
//! let out = cbloq.signature().get_right("a").unwrap();
//! assert_eq!(out.dtype(), DataType::QUInt(3));
//! ```

pub mod bloq;
pub mod bloqs;
pub mod builder;
pub mod composite;
pub mod config;
pub mod dtype;
pub mod error;
mod graph;
pub mod interop;
pub mod register;
pub mod signature;
pub mod soquet;

pub use bloq::{Bloq, BloqRef, DynBloq, WireSymbol, as_composite_bloq};
pub use builder::BloqBuilder;
pub use composite::{Bloqnection, CompositeBloq};
pub use config::{InteropConfig, TraversalOrder};
pub use dtype::DataType;
pub use error::{BloqError, BloqResult, ErrorKind};
pub use graph::BinstGraph;
pub use register::{Register, Side};
pub use signature::Signature;
pub use soquet::{Binst, BloqInstance, Connection, SoqArray, Soquet, Soquets};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
