//! Composite bloq to flat circuit.

use quarry_circuit::{Circuit, Operation, QubitManager};
use rustc_hash::FxHashMap;
use tracing::{debug, instrument, trace};

use crate::bloq::BloqRef;
use crate::composite::CompositeBloq;
use crate::config::InteropConfig;
use crate::error::{BloqError, BloqResult};
use crate::interop::gate_shim::BloqAsGate;
use crate::interop::qreg::{QReg, QuregMap, check_qureg, lane, qureg_from_lanes};
use crate::register::Side;
use crate::signature::Signature;
use crate::soquet::{Binst, BloqInstance, Connection, Soquet};

/// Live soquets and the qubits that currently carry them.
type Bindings = FxHashMap<Soquet, QReg>;

/// Emit `cbloq` as a flat circuit.
///
/// `quregs` holds one qubit array per input register of `signature`. Returns
/// the circuit and one qubit array per output register. Bookkeeping bloqs
/// only move qubits around; every other bloq is emitted through its native
/// call or, failing that, wrapped as a [`BloqAsGate`].
pub fn export(
    signature: &Signature,
    quregs: &QuregMap,
    cbloq: &CompositeBloq,
    qubit_manager: &mut dyn QubitManager,
) -> BloqResult<(Circuit, QuregMap)> {
    export_with_config(signature, quregs, cbloq, qubit_manager, &InteropConfig::default())
}

/// [`export`] with explicit settings.
#[instrument(skip_all, fields(instances = cbloq.bloq_instances().len()))]
pub fn export_with_config(
    signature: &Signature,
    quregs: &QuregMap,
    cbloq: &CompositeBloq,
    qubit_manager: &mut dyn QubitManager,
    config: &InteropConfig,
) -> BloqResult<(Circuit, QuregMap)> {
    let mut bindings = Bindings::default();
    for reg in signature.lefts() {
        let arr = quregs.get(reg.name()).ok_or_else(|| BloqError::MissingQuregs {
            name: reg.name().to_string(),
        })?;
        check_qureg(reg, arr)?;
        for idx in reg.all_idxs() {
            let qreg = QReg::new(lane(arr, &idx, reg.bitsize()), reg.dtype());
            bindings.insert(Soquet::new(Binst::LeftDangle, reg.clone(), idx), qreg);
        }
    }

    let mut circuit = Circuit::new();
    for node in cbloq.traversal(config.traversal)? {
        match cbloq.node(node) {
            Binst::LeftDangle => {}
            Binst::RightDangle => {
                for cxn in cbloq.predecessors(node) {
                    rename(&mut bindings, cxn)?;
                }
            }
            Binst::Instance(binst) => {
                debug!(binst = %binst, "exporting");
                let op = emit(
                    binst,
                    &cbloq.predecessors(node),
                    &cbloq.successors(node),
                    &mut bindings,
                    qubit_manager,
                )?;
                circuit.extend(op);
            }
        }
    }

    let mut out = QuregMap::new();
    for reg in signature.rights() {
        let lanes = reg
            .all_idxs()
            .into_iter()
            .map(|idx| {
                let soq = Soquet::new(Binst::RightDangle, reg.clone(), idx);
                bindings
                    .remove(&soq)
                    .map(QReg::into_qubits)
                    .ok_or_else(|| BloqError::MissingBinding(soq.to_string()))
            })
            .collect::<BloqResult<Vec<_>>>()?;
        out.insert(reg.name().to_string(), qureg_from_lanes(reg, lanes)?);
    }
    Ok((circuit, out))
}

/// Move the binding of a connection's producer to its consumer.
fn rename(bindings: &mut Bindings, cxn: &Connection) -> BloqResult<()> {
    let qreg = bindings
        .remove(cxn.left())
        .ok_or_else(|| BloqError::MissingBinding(cxn.left().to_string()))?;
    trace!(from = %cxn.left(), to = %cxn.right(), "rebind");
    bindings.insert(cxn.right().clone(), qreg);
    Ok(())
}

/// Emit one instance, updating `bindings` for its outputs.
fn emit(
    binst: &BloqInstance,
    preds: &[&Connection],
    succs: &[&Connection],
    bindings: &mut Bindings,
    qubit_manager: &mut dyn QubitManager,
) -> BloqResult<Option<Operation>> {
    for cxn in preds {
        rename(bindings, cxn)?;
    }

    let bloq = binst.bloq();
    let signature = bloq.signature();
    if let Some(reg) = signature
        .rights()
        .find(|r| r.side() == Side::Right && !r.dtype().is_quantum())
    {
        return Err(BloqError::ClassicalOutputWire {
            name: reg.name().to_string(),
        });
    }

    let mut in_quregs = QuregMap::new();
    for reg in signature.lefts() {
        let lanes = reg
            .all_idxs()
            .into_iter()
            .map(|idx| {
                let soq = Soquet::new(Binst::Instance(binst.clone()), reg.clone(), idx);
                let qreg = if reg.side() == Side::Left {
                    bindings.remove(&soq)
                } else {
                    bindings.get(&soq).cloned()
                };
                qreg.map(QReg::into_qubits)
                    .ok_or_else(|| BloqError::MissingBinding(soq.to_string()))
            })
            .collect::<BloqResult<Vec<_>>>()?;
        in_quregs.insert(reg.name().to_string(), qureg_from_lanes(reg, lanes)?);
    }

    let (op, out_quregs) = circuit_op(bloq, qubit_manager, &in_quregs)?;

    for cxn in succs {
        let soq = cxn.left();
        let reg = soq.reg();
        let arr = out_quregs.get(reg.name()).ok_or_else(|| BloqError::MissingQuregs {
            name: reg.name().to_string(),
        })?;
        check_qureg(reg, arr)?;
        let qreg = QReg::new(lane(arr, soq.idx(), reg.bitsize()), reg.dtype());
        bindings.insert(soq.clone(), qreg);
    }
    Ok(op)
}

/// The bloq's native call, or the gate shim when it has none.
fn circuit_op(
    bloq: &BloqRef,
    qubit_manager: &mut dyn QubitManager,
    quregs: &QuregMap,
) -> BloqResult<(Option<Operation>, QuregMap)> {
    match bloq.as_circuit_op(qubit_manager, quregs) {
        Some(result) => result,
        None => {
            let (op, out) = BloqAsGate::bloq_on(bloq.clone(), quregs, qubit_manager)?;
            Ok((Some(op), out))
        }
    }
}
