//! Flat circuit to composite bloq.

use std::sync::Arc;

use indexmap::IndexMap;
use ndarray::{ArrayD, IxDyn};
use quarry_circuit::{Circuit, Operation, Qubit};
use rustc_hash::FxHashSet;
use tracing::{debug, instrument, trace};

use crate::bloq::BloqRef;
use crate::builder::BloqBuilder;
use crate::composite::CompositeBloq;
use crate::config::InteropConfig;
use crate::dtype::DataType;
use crate::error::{BloqError, BloqResult};
use crate::interop::gate_bloq::CircuitGateAsBloq;
use crate::interop::gate_shim::BloqAsGate;
use crate::interop::qreg::{QReg, QuregMap, array_from_flat, check_qureg, lane, split_qubits};
use crate::register::{Register, Side};
use crate::signature::Signature;
use crate::soquet::{Soquet, Soquets};

/// Live qubit bundles and the soquets that carry them, in binding order.
type Bindings = IndexMap<QReg, Soquet>;

/// Build a composite bloq from a flat circuit.
///
/// Without a `signature`, the composite gets a single THRU register
/// `qubits: QBit[Q]` over the circuit's qubits in order of first use. With
/// one, `in_quregs` and `out_quregs` must give the qubits of its input and
/// output registers; qubits the circuit touches outside of them are
/// allocated and freed as needed.
pub fn import(
    circuit: &Circuit,
    signature: Option<&Signature>,
    in_quregs: Option<&QuregMap>,
    out_quregs: Option<&QuregMap>,
) -> BloqResult<CompositeBloq> {
    import_with_config(circuit, signature, in_quregs, out_quregs, &InteropConfig::default())
}

/// [`import`] with explicit settings.
#[instrument(skip_all, fields(operations = circuit.len()))]
pub fn import_with_config(
    circuit: &Circuit,
    signature: Option<&Signature>,
    in_quregs: Option<&QuregMap>,
    out_quregs: Option<&QuregMap>,
    config: &InteropConfig,
) -> BloqResult<CompositeBloq> {
    let (signature, in_quregs, out_quregs) = match signature {
        Some(signature) => {
            let (Some(in_quregs), Some(out_quregs)) = (in_quregs, out_quregs) else {
                return Err(BloqError::MissingBoundaryQuregs);
            };
            (signature.clone(), in_quregs.clone(), out_quregs.clone())
        }
        None => {
            let (signature, quregs) = default_signature(circuit, &config.default_register);
            (signature, quregs.clone(), quregs)
        }
    };

    let (mut bb, initial) = BloqBuilder::from_signature(&signature, false)?;
    let mut bindings = Bindings::new();
    for reg in signature.lefts() {
        let arr = boundary_quregs(reg, &in_quregs)?;
        let soqs = initial.get(reg.name()).ok_or_else(|| BloqError::MissingRegister {
            bloq: "CompositeBloq".into(),
            name: reg.name().to_string(),
        })?;
        for idx in reg.all_idxs() {
            let qreg = QReg::new(lane(arr, &idx, reg.bitsize()), reg.dtype());
            bindings.insert(qreg, soqs[IxDyn(&idx)].clone());
        }
    }

    for op in circuit.operations() {
        let bloq = bloq_of(op);
        debug!(bloq = %bloq, "importing");
        let op_signature = bloq.signature();
        let op_quregs = split_qubits(&op_signature, op.qubits())?;

        let mut in_soqs = Soquets::new();
        for reg in op_signature.lefts() {
            let arr = &op_quregs[reg.name()];
            let soqs = reg
                .all_idxs()
                .iter()
                .map(|idx| {
                    let qreg = QReg::new(lane(arr, idx, reg.bitsize()), reg.dtype());
                    ensure_in_reg_exists(&mut bb, &qreg, &mut bindings)
                })
                .collect::<BloqResult<Vec<_>>>()?;
            in_soqs.insert(reg.name(), array_from_flat(reg.shape(), &soqs));
        }

        let out_soqs = bb.add(bloq.clone(), in_soqs)?;

        for reg in &op_signature {
            let arr = &op_quregs[reg.name()];
            for idx in reg.all_idxs() {
                let qreg = QReg::new(lane(arr, &idx, reg.bitsize()), reg.dtype());
                if reg.side() == Side::Left {
                    bindings.shift_remove(&qreg);
                    continue;
                }
                let soq = out_soqs
                    .get(reg.name())
                    .map(|soqs| soqs[IxDyn(&idx)].clone())
                    .ok_or_else(|| BloqError::MissingRegister {
                        bloq: bloq.to_string(),
                        name: reg.name().to_string(),
                    })?;
                trace!(qreg = %qreg, soq = %soq, "bind");
                bindings.insert(qreg, soq);
            }
        }
    }

    let mut final_soqs = Soquets::new();
    let mut used = FxHashSet::default();
    for reg in signature.rights() {
        let arr = boundary_quregs(reg, &out_quregs)?;
        let soqs = reg
            .all_idxs()
            .iter()
            .map(|idx| {
                let qreg = QReg::new(lane(arr, idx, reg.bitsize()), reg.dtype());
                let soq = ensure_in_reg_exists(&mut bb, &qreg, &mut bindings)?;
                used.insert(qreg);
                Ok(soq)
            })
            .collect::<BloqResult<Vec<_>>>()?;
        final_soqs.insert(reg.name(), array_from_flat(reg.shape(), &soqs));
    }

    for (qreg, soq) in bindings {
        if !used.contains(&qreg) {
            debug!(qreg = %qreg, "freeing leftover");
            bb.free(soq)?;
        }
    }
    bb.finalize(final_soqs)
}

/// One THRU register over the circuit's qubits, in first-use order.
fn default_signature(circuit: &Circuit, name: &str) -> (Signature, QuregMap) {
    let qubits = circuit.all_qubits();
    let reg = Register::new(name, DataType::QBit).with_shape([qubits.len()]);
    let arr = ArrayD::from_shape_fn(IxDyn(&[qubits.len(), 1]), |idx| qubits[idx[0]].clone());
    let mut quregs = QuregMap::new();
    quregs.insert(name.to_string(), arr);
    (Signature::from(reg), quregs)
}

fn boundary_quregs<'a>(reg: &Register, quregs: &'a QuregMap) -> BloqResult<&'a ArrayD<Qubit>> {
    let arr = quregs.get(reg.name()).ok_or_else(|| BloqError::MissingQuregs {
        name: reg.name().to_string(),
    })?;
    check_qureg(reg, arr)?;
    Ok(arr)
}

/// The bloq an operation stands for.
fn bloq_of(op: &Operation) -> BloqRef {
    match op.gate().downcast_ref::<BloqAsGate>() {
        Some(shim) => shim.bloq().clone(),
        None => Arc::new(CircuitGateAsBloq::new(op.gate().clone())),
    }
}

/// A soquet carrying exactly the qubits of `in_reg`, reshaping the live
/// bindings as needed.
///
/// Qubits without a binding are allocated first. If the bundle is not bound
/// as a whole, every overlapping multi-qubit binding is split into single
/// qubits and the requested qubits are joined in order.
fn ensure_in_reg_exists(
    bb: &mut BloqBuilder,
    in_reg: &QReg,
    bindings: &mut Bindings,
) -> BloqResult<Soquet> {
    let to_alloc: Vec<Qubit> = {
        let mapped: FxHashSet<&Qubit> = bindings.keys().flat_map(QReg::qubits).collect();
        in_reg
            .qubits()
            .iter()
            .filter(|q| !mapped.contains(q))
            .cloned()
            .collect()
    };
    if !to_alloc.is_empty() {
        let dtype = DataType::qubits(to_alloc.len());
        let soq = bb.allocate(dtype)?;
        debug!(n = to_alloc.len(), "allocated unbound qubits");
        bindings.insert(QReg::new(to_alloc, dtype), soq);
    }

    if let Some(soq) = bindings.get(in_reg) {
        return Ok(soq.clone());
    }

    let wanted: FxHashSet<&Qubit> = in_reg.qubits().iter().collect();
    let previous = std::mem::take(bindings);
    for (qreg, soq) in previous {
        let overlaps = qreg.qubits().iter().any(|q| wanted.contains(q));
        if qreg.len() > 1 && overlaps {
            let parts = bb.split(soq)?;
            for (q, part) in qreg.qubits().iter().zip(parts.iter()) {
                bindings.insert(QReg::new(vec![q.clone()], DataType::QBit), part.clone());
            }
        } else {
            bindings.insert(qreg, soq);
        }
    }

    if in_reg.len() == 1 {
        return bindings
            .get(in_reg)
            .cloned()
            .ok_or_else(|| BloqError::MissingBinding(in_reg.to_string()));
    }

    let parts = in_reg
        .qubits()
        .iter()
        .map(|q| {
            bindings
                .shift_remove(&QReg::new(vec![q.clone()], DataType::QBit))
                .ok_or_else(|| BloqError::MissingBinding(q.to_string()))
        })
        .collect::<BloqResult<Vec<_>>>()?;
    let joined = bb.join_vec(parts, Some(in_reg.dtype()))?;
    bindings.insert(in_reg.clone(), joined.clone());
    Ok(joined)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bloq::Bloq;
    use quarry_circuit::StandardGate;

    #[test]
    fn test_default_signature() {
        let q = Qubit::line_range(6);
        let circuit: Circuit = [
            StandardGate::H.on([q[3].clone()]).unwrap(),
            StandardGate::CX.on([q[3].clone(), q[0].clone()]).unwrap(),
            StandardGate::X.on([q[5].clone()]).unwrap(),
            StandardGate::CZ.on([q[1].clone(), q[2].clone()]).unwrap(),
            StandardGate::T.on([q[4].clone()]).unwrap(),
            StandardGate::H.on([q[0].clone()]).unwrap(),
        ]
        .into_iter()
        .collect();
        let cbloq = import(&circuit, None, None, None).unwrap();
        let sig = Bloq::signature(&cbloq);
        assert_eq!(sig.len(), 1);
        let reg = sig.get_left("qubits").unwrap();
        assert_eq!(reg.shape(), &[6]);
        assert_eq!(reg.side(), Side::Thru);
        assert_eq!(cbloq.bloq_instances().len(), 6);
    }

    #[test]
    fn test_explicit_signature_requires_quregs() {
        let circuit = Circuit::new();
        let sig = Signature::build([("x", 1)]).unwrap();
        let err = import(&circuit, Some(&sig), None, None).unwrap_err();
        assert!(matches!(err, BloqError::MissingBoundaryQuregs));
    }

    #[test]
    fn test_unbound_qubit_allocated_and_freed() {
        let a = Qubit::named("a");
        let anc = Qubit::named("anc");
        let circuit: Circuit = [StandardGate::CX.on([a.clone(), anc]).unwrap()]
            .into_iter()
            .collect();
        let sig = Signature::build([("a", 1)]).unwrap();
        let mut quregs = QuregMap::new();
        quregs.insert(
            "a".into(),
            ArrayD::from_shape_vec(IxDyn(&[1]), vec![a]).unwrap(),
        );
        let cbloq = import(&circuit, Some(&sig), Some(&quregs), Some(&quregs)).unwrap();
        let names: Vec<String> = cbloq
            .bloq_instances()
            .iter()
            .map(|b| b.bloq().to_string())
            .collect();
        assert_eq!(names, vec!["Allocate", "cx", "Free"]);
    }
}
