//! Circuit gates exposed as bloqs.

use std::fmt;
use std::sync::Arc;

use ndarray::Array2;
use num_complex::Complex64;
use quarry_circuit::{
    Circuit, DecompositionContext, GateRef, Operation, QubitManager, SimpleQubitManager,
};

use crate::bloq::{Bloq, BloqRef, WireSymbol};
use crate::composite::CompositeBloq;
use crate::dtype::DataType;
use crate::error::{BloqError, BloqResult};
use crate::interop::import::import;
use crate::interop::qreg::{QuregMap, merge_qubits, named_qubits};
use crate::register::Register;
use crate::signature::Signature;

const REG: &str = "q";

/// A circuit gate acting as a bloq with one THRU register `q`.
///
/// The register is a single `QBit` for one-qubit gates and a `QBit` array of
/// length `n` otherwise.
#[derive(Debug, Clone, Eq, Hash)]
pub struct CircuitGateAsBloq {
    gate: GateRef,
}

// Field-wise equality, equivalent to `#[derive(PartialEq)]` (which cannot
// compile against an `Arc<dyn _>` field, rust-lang/rust#31740).
impl PartialEq for CircuitGateAsBloq {
    fn eq(&self, other: &Self) -> bool {
        PartialEq::eq(&self.gate, &other.gate)
    }
}

impl CircuitGateAsBloq {
    /// Wrap `gate`.
    pub fn new(gate: GateRef) -> Self {
        Self { gate }
    }

    /// The wrapped gate.
    pub fn gate(&self) -> &GateRef {
        &self.gate
    }

    fn register(&self) -> Register {
        let n = self.gate.num_qubits();
        let reg = Register::new(REG, DataType::QBit);
        if n == 1 { reg } else { reg.with_shape([n]) }
    }

    fn emit(&self, quregs: &QuregMap) -> BloqResult<(Option<Operation>, QuregMap)> {
        let qubits = merge_qubits([&self.register()], quregs)?;
        let op = Operation::new(self.gate.clone(), qubits)?;
        Ok((Some(op), quregs.clone()))
    }
}

impl fmt::Display for CircuitGateAsBloq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.gate)
    }
}

impl Bloq for CircuitGateAsBloq {
    fn signature(&self) -> Signature {
        Signature::from(self.register())
    }

    /// Imports the gate's own circuit decomposition.
    fn decompose_bloq(&self) -> BloqResult<CompositeBloq> {
        let signature = self.signature();
        let quregs = named_qubits(signature.lefts());
        let qubits = merge_qubits(signature.lefts(), &quregs)?;
        let mut qm = SimpleQubitManager::new();
        let mut context = DecompositionContext::new(&mut qm);
        let Some(ops) = self.gate.decompose(&qubits, &mut context)? else {
            return Err(BloqError::DecomposeNotImplemented(self.to_string()));
        };
        let circuit = Circuit::from_operations(ops);
        import(&circuit, Some(&signature), Some(&quregs), Some(&quregs))
    }

    fn as_circuit_op(
        &self,
        _qubit_manager: &mut dyn QubitManager,
        quregs: &QuregMap,
    ) -> Option<BloqResult<(Option<Operation>, QuregMap)>> {
        Some(self.emit(quregs))
    }

    fn tensor_contract(&self) -> BloqResult<Option<Array2<Complex64>>> {
        Ok(self.gate.unitary()?)
    }

    fn adjoint(&self) -> Option<BloqRef> {
        let inverse = self.gate.pow(-1).ok().flatten()?;
        Some(Arc::new(CircuitGateAsBloq::new(inverse)))
    }

    fn wire_symbol(&self, reg: &Register, idx: &[usize]) -> WireSymbol {
        let position = idx.first().copied().unwrap_or(0);
        let symbol = self
            .gate
            .diagram_info()
            .ok()
            .and_then(|info| info.wire_symbols.get(position).cloned());
        match symbol.as_deref() {
            Some("@") => WireSymbol::Circle { filled: true },
            Some("(0)") => WireSymbol::Circle { filled: false },
            Some("X") => WireSymbol::ModPlus,
            Some(text) => WireSymbol::TextBox(text.to_string()),
            None => WireSymbol::TextBox(reg.name().to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quarry_circuit::{Qubit, StandardGate};

    fn wrap(gate: StandardGate) -> CircuitGateAsBloq {
        CircuitGateAsBloq::new(Arc::new(gate))
    }

    #[test]
    fn test_signature() {
        let h = wrap(StandardGate::H).signature();
        assert_eq!(h.get_left("q").unwrap().shape(), &[] as &[usize]);
        let ccx = wrap(StandardGate::CCX).signature();
        assert_eq!(ccx.get_left("q").unwrap().shape(), &[3]);
        assert!(ccx.all_thru());
    }

    #[test]
    fn test_native_call_emits_gate() {
        let cx = wrap(StandardGate::CX);
        let mut quregs = QuregMap::new();
        quregs.insert(
            "q".into(),
            ndarray::Array2::from_shape_vec((2, 1), Qubit::line_range(2))
                .unwrap()
                .into_dyn(),
        );
        let mut qm = SimpleQubitManager::new();
        let (op, out) = cx.as_circuit_op(&mut qm, &quregs).unwrap().unwrap();
        assert_eq!(op.unwrap(), StandardGate::CX.on(Qubit::line_range(2)).unwrap());
        assert_eq!(out, quregs);
    }

    #[test]
    fn test_decomposition_imported() {
        let swap = wrap(StandardGate::Swap);
        let cbloq = swap.decompose_bloq().unwrap();
        let gates: Vec<_> = cbloq
            .bloq_instances()
            .iter()
            .filter_map(|b| b.bloq().downcast_ref::<CircuitGateAsBloq>())
            .map(|b| b.gate().to_string())
            .collect();
        assert_eq!(gates, vec!["cx", "cx", "cx"]);
    }

    #[test]
    fn test_missing_decomposition() {
        let err = wrap(StandardGate::H).decompose_bloq().unwrap_err();
        assert!(err.is_decompose_unavailable());
        assert!(err.to_string().ends_with("does not declare a decomposition"));
    }

    #[test]
    fn test_adjoint_and_symbols() {
        let s = wrap(StandardGate::S);
        let adj = s.adjoint().unwrap();
        let adj = adj.downcast_ref::<CircuitGateAsBloq>().unwrap();
        assert_eq!(adj.gate().to_string(), "sdg");
        let cx = wrap(StandardGate::CX);
        let reg = cx.register();
        assert_eq!(cx.wire_symbol(&reg, &[0]), WireSymbol::Circle { filled: true });
        assert_eq!(cx.wire_symbol(&reg, &[1]), WireSymbol::ModPlus);
    }
}
