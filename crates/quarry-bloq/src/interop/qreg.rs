//! Qubit arrays for registers.
//!
//! A register of shape `s` and bitsize `b` is carried on a qubit array of
//! shape `s + [b]`; the qubits of register element `idx` form the lane
//! `array[idx, ..]`.

use std::fmt;
use std::hash::{Hash, Hasher};

use indexmap::IndexMap;
use ndarray::{ArrayD, Dimension, IxDyn};
use quarry_circuit::{Qubit, QubitManager};

use crate::dtype::DataType;
use crate::error::{BloqError, BloqResult};
use crate::register::{Register, Side};
use crate::signature::Signature;

/// Qubit arrays keyed by register name.
pub type QuregMap = IndexMap<String, ArrayD<Qubit>>;

/// An ordered bundle of qubits tagged with the type it carries.
///
/// Equality and hashing use the qubits alone.
#[derive(Debug, Clone)]
pub struct QReg {
    qubits: Vec<Qubit>,
    dtype: DataType,
}

impl QReg {
    /// Bundle `qubits` as one value of `dtype`.
    pub fn new(qubits: Vec<Qubit>, dtype: DataType) -> Self {
        Self { qubits, dtype }
    }

    /// The qubits, in order.
    pub fn qubits(&self) -> &[Qubit] {
        &self.qubits
    }

    /// Consume the bundle, returning its qubits.
    pub fn into_qubits(self) -> Vec<Qubit> {
        self.qubits
    }

    /// The carried type.
    pub fn dtype(&self) -> DataType {
        self.dtype
    }

    /// Number of qubits.
    pub fn len(&self) -> usize {
        self.qubits.len()
    }

    /// Whether the bundle is empty.
    pub fn is_empty(&self) -> bool {
        self.qubits.is_empty()
    }
}

impl PartialEq for QReg {
    fn eq(&self, other: &Self) -> bool {
        self.qubits == other.qubits
    }
}

impl Eq for QReg {}

impl Hash for QReg {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.qubits.hash(state);
    }
}

impl fmt::Display for QReg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let qubits: Vec<String> = self.qubits.iter().map(ToString::to_string).collect();
        write!(f, "QReg([{}], {})", qubits.join(", "), self.dtype)
    }
}

/// Shape of the qubit array carrying `reg`.
pub fn qureg_shape(reg: &Register) -> Vec<usize> {
    let mut shape = reg.shape().to_vec();
    shape.push(reg.bitsize());
    shape
}

/// Build an array of `shape` from elements listed in row-major order.
///
/// `flat` must hold exactly as many elements as `shape` describes.
pub(crate) fn array_from_flat<T: Clone>(shape: &[usize], flat: &[T]) -> ArrayD<T> {
    ArrayD::from_shape_fn(IxDyn(shape), |idx| {
        let offset = idx
            .slice()
            .iter()
            .zip(shape)
            .fold(0, |acc, (&i, &dim)| acc * dim + i);
        flat[offset].clone()
    })
}

/// Ensure `arr` has the shape `reg` needs.
pub(crate) fn check_qureg(reg: &Register, arr: &ArrayD<Qubit>) -> BloqResult<()> {
    let expected = qureg_shape(reg);
    if arr.shape() != expected.as_slice() {
        return Err(BloqError::ShapeMismatch {
            name: reg.name().to_string(),
            expected,
            got: arr.shape().to_vec(),
        });
    }
    Ok(())
}

/// The qubits of element `idx` of a register carried on `arr`.
pub(crate) fn lane(arr: &ArrayD<Qubit>, idx: &[usize], bitsize: usize) -> Vec<Qubit> {
    let mut full = idx.to_vec();
    full.push(0);
    (0..bitsize)
        .map(|b| {
            full[idx.len()] = b;
            arr[IxDyn(&full)].clone()
        })
        .collect()
}

/// Reassemble a register's qubit array from its lanes in row-major order.
pub(crate) fn qureg_from_lanes(reg: &Register, lanes: Vec<Vec<Qubit>>) -> BloqResult<ArrayD<Qubit>> {
    let flat: Vec<Qubit> = lanes.into_iter().flatten().collect();
    if flat.len() != reg.total_bits() {
        return Err(BloqError::QubitCount {
            expected: reg.total_bits(),
            got: flat.len(),
        });
    }
    Ok(array_from_flat(&qureg_shape(reg), &flat))
}

/// Concatenate the qubits of `registers`, each flattened in row-major order.
pub fn merge_qubits<'a>(
    registers: impl IntoIterator<Item = &'a Register>,
    quregs: &QuregMap,
) -> BloqResult<Vec<Qubit>> {
    let mut qubits = Vec::new();
    for reg in registers {
        let arr = quregs.get(reg.name()).ok_or_else(|| BloqError::MissingQuregs {
            name: reg.name().to_string(),
        })?;
        check_qureg(reg, arr)?;
        qubits.extend(arr.iter().cloned());
    }
    Ok(qubits)
}

/// Cut a flat qubit list into per-register arrays, in signature order.
pub fn split_qubits(signature: &Signature, qubits: &[Qubit]) -> BloqResult<QuregMap> {
    if let Some((name, _)) = signature.groups().into_iter().find(|(_, regs)| regs.len() > 1) {
        return Err(BloqError::DuplicateRegister {
            name: name.to_string(),
        });
    }
    let expected: usize = signature.iter().map(Register::total_bits).sum();
    if qubits.len() != expected {
        return Err(BloqError::QubitCount {
            expected,
            got: qubits.len(),
        });
    }
    let mut quregs = QuregMap::new();
    let mut start = 0;
    for reg in signature {
        let end = start + reg.total_bits();
        quregs.insert(
            reg.name().to_string(),
            array_from_flat(&qureg_shape(reg), &qubits[start..end]),
        );
        start = end;
    }
    Ok(quregs)
}

/// Named qubits for `registers`: `name` for a single bit, otherwise
/// `name[i, j, ...]` indexed by element and then by bit.
pub fn named_qubits<'a>(registers: impl IntoIterator<Item = &'a Register>) -> QuregMap {
    registers
        .into_iter()
        .map(|reg| {
            let single_bit = reg.bitsize() == 1;
            let arr = ArrayD::from_shape_fn(IxDyn(&qureg_shape(reg)), |idx| {
                let idx = idx.slice();
                let idx = if single_bit { &idx[..idx.len() - 1] } else { idx };
                if idx.is_empty() {
                    Qubit::named(reg.name())
                } else {
                    let parts: Vec<String> = idx.iter().map(ToString::to_string).collect();
                    Qubit::named(format!("{}[{}]", reg.name(), parts.join(", ")))
                }
            });
            (reg.name().to_string(), arr)
        })
        .collect()
}

/// Qubit arrays for every register of `signature` and for its outputs.
///
/// Inputs come from `in_quregs`; RIGHT-only registers get fresh qubits from
/// `qubit_manager`.
pub(crate) fn all_and_output_quregs(
    signature: &Signature,
    qubit_manager: &mut dyn QubitManager,
    in_quregs: &QuregMap,
) -> BloqResult<(QuregMap, QuregMap)> {
    let mut all = QuregMap::new();
    let mut out = QuregMap::new();
    for reg in signature {
        let arr = if reg.side() == Side::Right {
            let qubits = qubit_manager.qalloc(reg.total_bits());
            array_from_flat(&qureg_shape(reg), &qubits)
        } else {
            let arr = in_quregs.get(reg.name()).ok_or_else(|| BloqError::MissingQuregs {
                name: reg.name().to_string(),
            })?;
            check_qureg(reg, arr)?;
            arr.clone()
        };
        if reg.side().is_right() {
            out.insert(reg.name().to_string(), arr.clone());
        }
        all.insert(reg.name().to_string(), arr);
    }
    Ok((all, out))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reg(name: &str, dtype: DataType, shape: &[usize]) -> Register {
        Register::new(name, dtype).with_shape(shape.to_vec())
    }

    #[test]
    fn test_named_qubits() {
        let regs = [
            reg("a", DataType::QBit, &[]),
            reg("b", DataType::QAny(2), &[]),
            reg("c", DataType::QBit, &[2]),
        ];
        let quregs = named_qubits(&regs);
        assert_eq!(quregs["a"].shape(), &[1]);
        assert_eq!(quregs["a"].iter().next().unwrap(), &Qubit::named("a"));
        let b: Vec<_> = quregs["b"].iter().cloned().collect();
        assert_eq!(b, vec![Qubit::named("b[0]"), Qubit::named("b[1]")]);
        let c: Vec<_> = quregs["c"].iter().cloned().collect();
        assert_eq!(c, vec![Qubit::named("c[0]"), Qubit::named("c[1]")]);
    }

    #[test]
    fn test_split_merge() {
        let sig = Signature::new([
            reg("x", DataType::QAny(2), &[]),
            reg("y", DataType::QBit, &[3]),
        ])
        .unwrap();
        let qubits = Qubit::line_range(5);
        let quregs = split_qubits(&sig, &qubits).unwrap();
        assert_eq!(quregs["x"].shape(), &[2]);
        assert_eq!(quregs["y"].shape(), &[3, 1]);
        assert_eq!(lane(&quregs["y"], &[2], 1), vec![Qubit::line(4)]);
        assert_eq!(merge_qubits(&sig, &quregs).unwrap(), qubits);
    }

    #[test]
    fn test_split_wrong_count() {
        let sig = Signature::build([("x", 2)]).unwrap();
        let err = split_qubits(&sig, &Qubit::line_range(3)).unwrap_err();
        assert!(matches!(err, BloqError::QubitCount { expected: 2, got: 3 }));
    }

    #[test]
    fn test_qreg_identity_ignores_dtype() {
        let a = QReg::new(vec![Qubit::line(0), Qubit::line(1)], DataType::QAny(2));
        let b = QReg::new(vec![Qubit::line(0), Qubit::line(1)], DataType::QUInt(2));
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "QReg([q(0), q(1)], QAny(2))");
    }

    #[test]
    fn test_right_registers_allocated() {
        let sig = Signature::new([
            reg("x", DataType::QBit, &[]),
            reg("anc", DataType::QAny(2), &[]).with_side(Side::Right),
        ])
        .unwrap();
        let in_quregs = named_qubits(sig.lefts());
        let mut qm = quarry_circuit::SimpleQubitManager::new();
        let (all, out) = all_and_output_quregs(&sig, &mut qm, &in_quregs).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(out["anc"].shape(), &[2]);
        assert_eq!(qm.num_in_use(), 2);
    }
}
