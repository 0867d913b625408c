//! Bloqs exposed through the circuit gate interface.

use std::fmt;
use std::sync::Arc;

use ndarray::Array2;
use num_complex::Complex64;
use quarry_circuit::{
    Circuit, CircuitResult, DecompositionContext, DiagramInfo, Gate, GateRef, Operation, Qubit,
    QubitManager,
};
use rustc_hash::FxHashMap;
use tracing::{debug, instrument};

use crate::bloq::{BloqRef, WireSymbol};
use crate::bloqs::{Power, adjoint_of};
use crate::error::{BloqError, BloqResult};
use crate::interop::export::export;
use crate::interop::qreg::{QuregMap, all_and_output_quregs, merge_qubits, split_qubits};
use crate::interop::qubit_manager::InteropQubitManager;
use crate::register::{Register, Side};

/// A bloq acting as a [`Gate`].
///
/// The gate's qubits are the bloq's registers flattened in signature order.
/// Bloqs with same-named register groups cannot be wrapped, since a flat
/// qubit list cannot tell the two sides of a group apart.
#[derive(Clone, Eq, Hash)]
pub struct BloqAsGate {
    bloq: BloqRef,
}

// Field-wise equality, equivalent to `#[derive(PartialEq)]` (which cannot
// compile against an `Arc<dyn _>` field, rust-lang/rust#31740).
impl PartialEq for BloqAsGate {
    fn eq(&self, other: &Self) -> bool {
        PartialEq::eq(&self.bloq, &other.bloq)
    }
}

impl BloqAsGate {
    /// Wrap `bloq`.
    pub fn new(bloq: BloqRef) -> BloqResult<Self> {
        let signature = bloq.signature();
        if let Some((name, _)) = signature
            .groups()
            .into_iter()
            .find(|(_, regs)| regs.len() > 1)
        {
            return Err(BloqError::RegisterGroup {
                bloq: bloq.to_string(),
                name: name.to_string(),
            });
        }
        Ok(Self { bloq })
    }

    /// The wrapped bloq.
    pub fn bloq(&self) -> &BloqRef {
        &self.bloq
    }

    /// Apply the gate to `qubits`.
    pub fn on(&self, qubits: impl IntoIterator<Item = Qubit>) -> BloqResult<Operation> {
        Ok(Operation::new(Arc::new(self.clone()), qubits)?)
    }

    /// Apply the gate to per-register qubit arrays.
    pub fn on_registers(&self, quregs: &QuregMap) -> BloqResult<Operation> {
        self.on(merge_qubits(&self.bloq.signature(), quregs)?)
    }

    /// Wrap `bloq` and apply it to `in_quregs`, allocating qubits for its
    /// RIGHT-only registers.
    ///
    /// Returns the operation and the qubit arrays of the bloq's outputs.
    pub fn bloq_on(
        bloq: BloqRef,
        in_quregs: &QuregMap,
        qubit_manager: &mut dyn QubitManager,
    ) -> BloqResult<(Operation, QuregMap)> {
        let gate = Self::new(bloq)?;
        let signature = gate.bloq.signature();
        let (all, out) = all_and_output_quregs(&signature, qubit_manager, in_quregs)?;
        Ok((gate.on_registers(&all)?, out))
    }
}

/// Wrap `bloq` as a shared gate.
pub fn wrap_as_gate(bloq: BloqRef) -> BloqResult<GateRef> {
    Ok(Arc::new(BloqAsGate::new(bloq)?))
}

/// Decompose `bloq` acting on `quregs` into a circuit on those same qubits.
///
/// The decomposition runs on an [`InteropQubitManager`] layered over the
/// context's manager. Qubits the decomposition produces for RIGHT-only
/// registers are freed again and renamed to the qubits the caller assigned.
#[instrument(skip_all, fields(bloq = %bloq))]
fn decompose_from_bloq(
    bloq: &BloqRef,
    quregs: &QuregMap,
    context: &mut DecompositionContext<'_>,
) -> BloqResult<Circuit> {
    let cbloq = bloq.decompose_bloq()?;
    let signature = cbloq.signature();

    let mut in_quregs = QuregMap::new();
    for reg in signature.lefts() {
        let arr = quregs.get(reg.name()).ok_or_else(|| BloqError::MissingQuregs {
            name: reg.name().to_string(),
        })?;
        in_quregs.insert(reg.name().to_string(), arr.clone());
    }

    let mut qm = InteropQubitManager::new(&mut *context.qubit_manager);
    qm.manage_qubits(merge_qubits(signature.lefts(), &in_quregs)?);
    let (circuit, out_quregs) = export(signature, &in_quregs, &cbloq, &mut qm)?;

    let mut mapping = FxHashMap::default();
    for reg in signature.rights().filter(|r| r.side() == Side::Right) {
        let missing = || BloqError::MissingQuregs {
            name: reg.name().to_string(),
        };
        let produced = out_quregs.get(reg.name()).ok_or_else(missing)?;
        let assigned = quregs.get(reg.name()).ok_or_else(missing)?;
        if produced.shape() != assigned.shape() {
            return Err(BloqError::ShapeMismatch {
                name: reg.name().to_string(),
                expected: assigned.shape().to_vec(),
                got: produced.shape().to_vec(),
            });
        }
        let produced: Vec<Qubit> = produced.iter().cloned().collect();
        qm.qfree(&produced)?;
        mapping.extend(produced.into_iter().zip(assigned.iter().cloned()));
    }
    debug!(operations = circuit.len(), "decomposed");
    Ok(circuit.transform_qubits(&mapping))
}

/// Diagram text for every qubit of `bloq`, in signature order.
fn wire_symbols(bloq: &BloqRef) -> BloqResult<Vec<String>> {
    let mut symbols = Vec::new();
    for reg in &bloq.signature() {
        for idx in reg.all_idxs() {
            let text = match bloq.wire_symbol(reg, &idx) {
                WireSymbol::Circle { filled: true } => "@".to_string(),
                WireSymbol::Circle { filled: false } => "(0)".to_string(),
                WireSymbol::TextBox(text)
                | WireSymbol::RarrowTextBox(text)
                | WireSymbol::LarrowTextBox(text) => text,
                WireSymbol::ModPlus => "X".to_string(),
                other => return Err(BloqError::UnknownWireSymbol(format!("{other:?}"))),
            };
            symbols.extend(std::iter::repeat_n(text, reg.bitsize()));
        }
    }
    Ok(symbols)
}

impl fmt::Debug for BloqAsGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BloqAsGate({:?})", self.bloq)
    }
}

impl fmt::Display for BloqAsGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bloq.{}", self.bloq)
    }
}

impl Gate for BloqAsGate {
    fn name(&self) -> String {
        self.bloq.to_string()
    }

    /// Every register takes up wires, classical ones included.
    fn num_qubits(&self) -> usize {
        self.bloq.signature().iter().map(Register::total_bits).sum()
    }

    fn decompose(
        &self,
        qubits: &[Qubit],
        context: &mut DecompositionContext<'_>,
    ) -> CircuitResult<Option<Vec<Operation>>> {
        let quregs = split_qubits(&self.bloq.signature(), qubits)?;
        match decompose_from_bloq(&self.bloq, &quregs, context) {
            Ok(circuit) => Ok(Some(circuit.into_operations())),
            Err(err) if err.is_decompose_unavailable() => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn has_unitary(&self) -> bool {
        self.bloq.signature().all_thru()
    }

    /// A matrix is only reported for all-THRU bloqs without a decomposition;
    /// bloqs that decompose are evaluated through their decomposition.
    fn unitary(&self) -> CircuitResult<Option<Array2<Complex64>>> {
        if !self.has_unitary() {
            return Ok(None);
        }
        match self.bloq.decompose_bloq() {
            Ok(_) => return Ok(None),
            Err(err) if err.is_decompose_unavailable() => {}
            Err(err) => return Err(err.into()),
        }
        let Some(tensor) = self.bloq.tensor_contract()? else {
            return Ok(None);
        };
        let dim = 1usize << self.num_qubits();
        if tensor.dim() != (dim, dim) {
            return Err(BloqError::InvalidTensor {
                bloq: self.bloq.to_string(),
                expected: dim,
                got: tensor.dim(),
            }
            .into());
        }
        Ok(Some(tensor))
    }

    fn diagram_info(&self) -> CircuitResult<DiagramInfo> {
        Ok(DiagramInfo::new(wire_symbols(&self.bloq)?))
    }

    fn pow(&self, exponent: i32) -> CircuitResult<Option<GateRef>> {
        let bloq = match exponent {
            0 => return Ok(None),
            1 => return Ok(Some(Arc::new(self.clone()))),
            -1 => adjoint_of(&self.bloq),
            n => {
                let base = if n > 0 {
                    self.bloq.clone()
                } else {
                    adjoint_of(&self.bloq)
                };
                Arc::new(Power::new(base, n.unsigned_abs() as usize)?)
            }
        };
        Ok(Some(wrap_as_gate(bloq)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bloq::Bloq;
    use crate::bloqs::Split;
    use crate::dtype::DataType;
    use crate::interop::CircuitGateAsBloq;
    use quarry_circuit::{SimpleQubitManager, StandardGate};

    fn cx() -> BloqRef {
        Arc::new(CircuitGateAsBloq::new(Arc::new(StandardGate::CX)))
    }

    #[test]
    fn test_group_rejected() {
        let err = BloqAsGate::new(Arc::new(Split::new(DataType::QAny(2)))).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Validation);
        assert!(err.to_string().contains("'reg'"));
    }

    #[test]
    fn test_pow_one_and_minus_one() {
        let gate = BloqAsGate::new(cx()).unwrap();
        let one = gate.pow(1).unwrap().unwrap();
        let expected: GateRef = Arc::new(gate.clone());
        assert_eq!(&one, &expected);

        let inv = gate.pow(-1).unwrap().unwrap();
        let inv = inv.downcast_ref::<BloqAsGate>().unwrap();
        assert_eq!(inv.bloq(), &adjoint_of(&cx()));
        assert!(gate.pow(0).unwrap().is_none());
    }

    #[test]
    fn test_pow_wraps_power() {
        let gate = BloqAsGate::new(cx()).unwrap();
        let sq = gate.pow(2).unwrap().unwrap();
        let sq = sq.downcast_ref::<BloqAsGate>().unwrap();
        let power = sq.bloq().downcast_ref::<Power>().unwrap();
        assert_eq!(power.exponent(), 2);
    }

    #[test]
    fn test_unitary_without_decomposition() {
        let gate = BloqAsGate::new(cx()).unwrap();
        let u = gate.unitary().unwrap().unwrap();
        assert_eq!(u, StandardGate::CX.matrix().unwrap());
        assert_eq!(gate.diagram_info().unwrap().wire_symbols, vec!["@", "X"]);
    }

    #[test]
    fn test_bloq_on_allocates_right_registers() {
        let alloc: BloqRef = Arc::new(crate::bloqs::Allocate::new(DataType::QAny(2)));
        let mut qm = SimpleQubitManager::new();
        let (op, out) = BloqAsGate::bloq_on(alloc.clone(), &QuregMap::new(), &mut qm).unwrap();
        assert_eq!(op.qubits().len(), 2);
        assert_eq!(out["reg"].shape(), &[2]);
        assert_eq!(qm.num_in_use(), 2);
        assert!(!BloqAsGate::new(alloc).unwrap().has_unitary());
        assert_eq!(cx().signature().n_qubits(), 2);
    }
}
