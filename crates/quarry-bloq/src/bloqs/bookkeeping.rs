//! Bloqs that only reshape, create or destroy wires.

use std::fmt;
use std::sync::Arc;

use ndarray::Array2;
use num_complex::Complex64;
use quarry_circuit::{Operation, QubitManager};

use crate::bloq::{Bloq, BloqRef, WireSymbol};
use crate::composite::CompositeBloq;
use crate::dtype::DataType;
use crate::error::{BloqError, BloqResult};
use crate::interop::{QuregMap, array_from_flat, merge_qubits, qureg_shape};
use crate::register::{Register, Side};
use crate::signature::Signature;

const REG: &str = "reg";

fn bundle(dtype: DataType) -> Register {
    Register::new(REG, dtype)
}

fn bits(dtype: DataType) -> Register {
    Register::new(REG, DataType::QBit).with_shape([dtype.bitsize()])
}

fn identity(n: usize) -> BloqResult<Option<Array2<Complex64>>> {
    Ok(Some(Array2::eye(1 << n)))
}

/// Error for decomposing a bookkeeping bloq.
fn atomic(bloq: &dyn fmt::Display) -> BloqError {
    BloqError::DecomposeType {
        bloq: bloq.to_string(),
        reason: "bookkeeping bloqs are atomic".into(),
    }
}

/// The zero state `|0…0⟩` as a column (`column == true`) or a row.
fn zero_state(n: usize, column: bool) -> Array2<Complex64> {
    let dim = 1 << n;
    let mut m = if column {
        Array2::zeros((dim, 1))
    } else {
        Array2::zeros((1, dim))
    };
    m[[0, 0]] = Complex64::new(1.0, 0.0);
    m
}

/// Carry the qubits of `from` over to the shape of `to`, emitting nothing.
fn reshape(
    from: &Register,
    to: &Register,
    quregs: &QuregMap,
) -> BloqResult<(Option<Operation>, QuregMap)> {
    let qubits = merge_qubits([from], quregs)?;
    let mut out = QuregMap::new();
    out.insert(REG.to_string(), array_from_flat(&qureg_shape(to), &qubits));
    Ok((None, out))
}

/// Split a bundle into individual qubits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Split {
    dtype: DataType,
}

impl Split {
    /// Split a bundle of `dtype`.
    pub fn new(dtype: DataType) -> Self {
        Self { dtype }
    }

    /// Type of the bundle being split.
    pub fn dtype(&self) -> DataType {
        self.dtype
    }
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Split")
    }
}

impl Bloq for Split {
    fn signature(&self) -> Signature {
        Signature::from_valid(vec![
            bundle(self.dtype).with_side(Side::Left),
            bits(self.dtype).with_side(Side::Right),
        ])
    }

    fn decompose_bloq(&self) -> BloqResult<CompositeBloq> {
        Err(atomic(self))
    }

    fn as_circuit_op(
        &self,
        _qubit_manager: &mut dyn QubitManager,
        quregs: &QuregMap,
    ) -> Option<BloqResult<(Option<Operation>, QuregMap)>> {
        Some(reshape(&bundle(self.dtype), &bits(self.dtype), quregs))
    }

    fn tensor_contract(&self) -> BloqResult<Option<Array2<Complex64>>> {
        identity(self.dtype.bitsize())
    }

    fn adjoint(&self) -> Option<BloqRef> {
        Some(Arc::new(Join::new(self.dtype)))
    }

    fn wire_symbol(&self, reg: &Register, idx: &[usize]) -> WireSymbol {
        match (reg.side(), idx.first()) {
            (Side::Right, Some(i)) => WireSymbol::RarrowTextBox(i.to_string()),
            _ => WireSymbol::LarrowTextBox(self.dtype.to_string()),
        }
    }
}

/// Join individual qubits into a bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Join {
    dtype: DataType,
}

impl Join {
    /// Join into a bundle of `dtype`.
    pub fn new(dtype: DataType) -> Self {
        Self { dtype }
    }

    /// Type of the joined bundle.
    pub fn dtype(&self) -> DataType {
        self.dtype
    }
}

impl fmt::Display for Join {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Join")
    }
}

impl Bloq for Join {
    fn signature(&self) -> Signature {
        Signature::from_valid(vec![
            bits(self.dtype).with_side(Side::Left),
            bundle(self.dtype).with_side(Side::Right),
        ])
    }

    fn decompose_bloq(&self) -> BloqResult<CompositeBloq> {
        Err(atomic(self))
    }

    fn as_circuit_op(
        &self,
        _qubit_manager: &mut dyn QubitManager,
        quregs: &QuregMap,
    ) -> Option<BloqResult<(Option<Operation>, QuregMap)>> {
        Some(reshape(&bits(self.dtype), &bundle(self.dtype), quregs))
    }

    fn tensor_contract(&self) -> BloqResult<Option<Array2<Complex64>>> {
        identity(self.dtype.bitsize())
    }

    fn adjoint(&self) -> Option<BloqRef> {
        Some(Arc::new(Split::new(self.dtype)))
    }

    fn wire_symbol(&self, reg: &Register, idx: &[usize]) -> WireSymbol {
        match (reg.side(), idx.first()) {
            (Side::Left, Some(i)) => WireSymbol::LarrowTextBox(i.to_string()),
            _ => WireSymbol::RarrowTextBox(self.dtype.to_string()),
        }
    }
}

/// Allocate a bundle in the zero state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Allocate {
    dtype: DataType,
}

impl Allocate {
    /// Allocate a bundle of `dtype`.
    pub fn new(dtype: DataType) -> Self {
        Self { dtype }
    }

    /// Type of the allocated bundle.
    pub fn dtype(&self) -> DataType {
        self.dtype
    }
}

impl fmt::Display for Allocate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Allocate")
    }
}

impl Bloq for Allocate {
    fn signature(&self) -> Signature {
        Signature::from(bundle(self.dtype).with_side(Side::Right))
    }

    fn decompose_bloq(&self) -> BloqResult<CompositeBloq> {
        Err(atomic(self))
    }

    fn as_circuit_op(
        &self,
        qubit_manager: &mut dyn QubitManager,
        _quregs: &QuregMap,
    ) -> Option<BloqResult<(Option<Operation>, QuregMap)>> {
        let reg = bundle(self.dtype);
        let qubits = qubit_manager.qalloc(reg.total_bits());
        let mut out = QuregMap::new();
        out.insert(REG.to_string(), array_from_flat(&qureg_shape(&reg), &qubits));
        Some(Ok((None, out)))
    }

    fn tensor_contract(&self) -> BloqResult<Option<Array2<Complex64>>> {
        Ok(Some(zero_state(self.dtype.bitsize(), true)))
    }

    fn adjoint(&self) -> Option<BloqRef> {
        Some(Arc::new(Free::new(self.dtype)))
    }

    fn wire_symbol(&self, _reg: &Register, _idx: &[usize]) -> WireSymbol {
        WireSymbol::Text("alloc".into())
    }
}

/// Free a bundle, which must be in the zero state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Free {
    dtype: DataType,
}

impl Free {
    /// Free a bundle of `dtype`.
    pub fn new(dtype: DataType) -> Self {
        Self { dtype }
    }

    /// Type of the freed bundle.
    pub fn dtype(&self) -> DataType {
        self.dtype
    }
}

impl fmt::Display for Free {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Free")
    }
}

impl Bloq for Free {
    fn signature(&self) -> Signature {
        Signature::from(bundle(self.dtype).with_side(Side::Left))
    }

    fn decompose_bloq(&self) -> BloqResult<CompositeBloq> {
        Err(atomic(self))
    }

    fn as_circuit_op(
        &self,
        qubit_manager: &mut dyn QubitManager,
        quregs: &QuregMap,
    ) -> Option<BloqResult<(Option<Operation>, QuregMap)>> {
        let freed = merge_qubits([&bundle(self.dtype)], quregs).and_then(|qubits| {
            qubit_manager
                .qfree(&qubits)
                .map_err(BloqError::from)
        });
        Some(freed.map(|()| (None, QuregMap::new())))
    }

    fn tensor_contract(&self) -> BloqResult<Option<Array2<Complex64>>> {
        Ok(Some(zero_state(self.dtype.bitsize(), false)))
    }

    fn adjoint(&self) -> Option<BloqRef> {
        Some(Arc::new(Allocate::new(self.dtype)))
    }

    fn wire_symbol(&self, _reg: &Register, _idx: &[usize]) -> WireSymbol {
        WireSymbol::Text("free".into())
    }
}
