//! Conversion between composite bloqs and flat circuits.
//!
//! - [`export`] walks a [`CompositeBloq`](crate::CompositeBloq) and emits each
//!   instance through its native call or the [`BloqAsGate`] shim.
//! - [`import`] replays a [`Circuit`](quarry_circuit::Circuit) into a
//!   [`BloqBuilder`](crate::BloqBuilder), inserting splits, joins,
//!   allocations and frees so that every operation sees the wire shapes it
//!   expects.
//! - [`wrap_as_gate`] and [`CircuitGateAsBloq`] adapt single operations in
//!   either direction.

mod export;
mod gate_bloq;
mod gate_shim;
mod import;
mod qreg;
mod qubit_manager;

pub use export::{export, export_with_config};
pub use gate_bloq::CircuitGateAsBloq;
pub use gate_shim::{BloqAsGate, wrap_as_gate};
pub use import::{import, import_with_config};
pub use qreg::{QReg, QuregMap, merge_qubits, named_qubits, qureg_shape, split_qubits};
pub use qubit_manager::InteropQubitManager;

pub(crate) use qreg::array_from_flat;
