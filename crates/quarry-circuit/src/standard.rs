//! Built-in gates.

use std::f64::consts::FRAC_1_SQRT_2;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use ndarray::Array2;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::error::CircuitResult;
use crate::gate::{DiagramInfo, Gate, GateRef};
use crate::operation::Operation;
use crate::qubit::Qubit;
use crate::qubit_manager::DecompositionContext;

/// Standard quantum gates.
///
/// Angles are in radians.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StandardGate {
    /// Identity.
    I,
    /// Pauli-X.
    X,
    /// Pauli-Y.
    Y,
    /// Pauli-Z.
    Z,
    /// Hadamard.
    H,
    /// S = sqrt(Z).
    S,
    /// S-dagger.
    Sdg,
    /// T = sqrt(S).
    T,
    /// T-dagger.
    Tdg,
    /// Rotation about X.
    Rx(f64),
    /// Rotation about Y.
    Ry(f64),
    /// Rotation about Z.
    Rz(f64),
    /// Controlled-X (CNOT).
    CX,
    /// Controlled-Z.
    CZ,
    /// Swap.
    Swap,
    /// Toffoli.
    CCX,
    /// Fredkin.
    CSwap,
    /// Reset to |0⟩. Not unitary.
    Reset,
    /// Zero-qubit global phase `e^{iθ}`.
    GlobalPhase(f64),
}

impl StandardGate {
    /// Get the gate name.
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            StandardGate::I => "id",
            StandardGate::X => "x",
            StandardGate::Y => "y",
            StandardGate::Z => "z",
            StandardGate::H => "h",
            StandardGate::S => "s",
            StandardGate::Sdg => "sdg",
            StandardGate::T => "t",
            StandardGate::Tdg => "tdg",
            StandardGate::Rx(_) => "rx",
            StandardGate::Ry(_) => "ry",
            StandardGate::Rz(_) => "rz",
            StandardGate::CX => "cx",
            StandardGate::CZ => "cz",
            StandardGate::Swap => "swap",
            StandardGate::CCX => "ccx",
            StandardGate::CSwap => "cswap",
            StandardGate::Reset => "reset",
            StandardGate::GlobalPhase(_) => "gphase",
        }
    }

    /// Get the number of qubits this gate acts on.
    #[inline]
    pub fn arity(&self) -> usize {
        match self {
            StandardGate::GlobalPhase(_) => 0,
            StandardGate::I
            | StandardGate::X
            | StandardGate::Y
            | StandardGate::Z
            | StandardGate::H
            | StandardGate::S
            | StandardGate::Sdg
            | StandardGate::T
            | StandardGate::Tdg
            | StandardGate::Rx(_)
            | StandardGate::Ry(_)
            | StandardGate::Rz(_)
            | StandardGate::Reset => 1,
            StandardGate::CX | StandardGate::CZ | StandardGate::Swap => 2,
            StandardGate::CCX | StandardGate::CSwap => 3,
        }
    }

    /// Whether the gate is its own inverse.
    pub fn is_self_inverse(&self) -> bool {
        matches!(
            self,
            StandardGate::I
                | StandardGate::X
                | StandardGate::Y
                | StandardGate::Z
                | StandardGate::H
                | StandardGate::CX
                | StandardGate::CZ
                | StandardGate::Swap
                | StandardGate::CCX
                | StandardGate::CSwap
        )
    }

    /// The inverse gate, if the gate is unitary.
    pub fn inverse(&self) -> Option<StandardGate> {
        let inv = match self {
            g if g.is_self_inverse() => g.clone(),
            StandardGate::S => StandardGate::Sdg,
            StandardGate::Sdg => StandardGate::S,
            StandardGate::T => StandardGate::Tdg,
            StandardGate::Tdg => StandardGate::T,
            StandardGate::Rx(t) => StandardGate::Rx(-t),
            StandardGate::Ry(t) => StandardGate::Ry(-t),
            StandardGate::Rz(t) => StandardGate::Rz(-t),
            StandardGate::GlobalPhase(t) => StandardGate::GlobalPhase(-t),
            _ => return None,
        };
        Some(inv)
    }

    /// The gate raised to `exponent`, when expressible as a standard gate.
    pub fn power(&self, exponent: i32) -> Option<StandardGate> {
        match (self, exponent) {
            (_, 1) => Some(self.clone()),
            (_, -1) => self.inverse(),
            (StandardGate::Rx(t), n) => Some(StandardGate::Rx(t * f64::from(n))),
            (StandardGate::Ry(t), n) => Some(StandardGate::Ry(t * f64::from(n))),
            (StandardGate::Rz(t), n) => Some(StandardGate::Rz(t * f64::from(n))),
            (StandardGate::GlobalPhase(t), n) => Some(StandardGate::GlobalPhase(t * f64::from(n))),
            (g, n) if g.is_self_inverse() && n % 2 != 0 => Some(g.clone()),
            _ => None,
        }
    }

    /// The gate's matrix. Qubit 0 of the operand list is the most significant bit.
    pub fn matrix(&self) -> Option<Array2<Complex64>> {
        let zero = Complex64::new(0.0, 0.0);
        let one = Complex64::new(1.0, 0.0);
        let i = Complex64::new(0.0, 1.0);
        let m = match self {
            StandardGate::Reset => return None,
            StandardGate::GlobalPhase(t) => square(1, &[Complex64::from_polar(1.0, *t)]),
            StandardGate::I => square(2, &[one, zero, zero, one]),
            StandardGate::X => square(2, &[zero, one, one, zero]),
            StandardGate::Y => square(2, &[zero, -i, i, zero]),
            StandardGate::Z => square(2, &[one, zero, zero, -one]),
            StandardGate::H => {
                let h = Complex64::new(FRAC_1_SQRT_2, 0.0);
                square(2, &[h, h, h, -h])
            }
            StandardGate::S => square(2, &[one, zero, zero, i]),
            StandardGate::Sdg => square(2, &[one, zero, zero, -i]),
            StandardGate::T => square(2, &[one, zero, zero, Complex64::from_polar(1.0, std::f64::consts::FRAC_PI_4)]),
            StandardGate::Tdg => square(2, &[one, zero, zero, Complex64::from_polar(1.0, -std::f64::consts::FRAC_PI_4)]),
            StandardGate::Rx(t) => {
                let c = Complex64::new((t / 2.0).cos(), 0.0);
                let s = Complex64::new(0.0, -(t / 2.0).sin());
                square(2, &[c, s, s, c])
            }
            StandardGate::Ry(t) => {
                let c = Complex64::new((t / 2.0).cos(), 0.0);
                let s = Complex64::new((t / 2.0).sin(), 0.0);
                square(2, &[c, -s, s, c])
            }
            StandardGate::Rz(t) => square(
                2,
                &[
                    Complex64::from_polar(1.0, -t / 2.0),
                    zero,
                    zero,
                    Complex64::from_polar(1.0, t / 2.0),
                ],
            ),
            StandardGate::CX => permutation(4, &[(2, 3)]),
            StandardGate::CZ => {
                let mut m = Array2::eye(4);
                m[[3, 3]] = -one;
                m
            }
            StandardGate::Swap => permutation(4, &[(1, 2)]),
            StandardGate::CCX => permutation(8, &[(6, 7)]),
            StandardGate::CSwap => permutation(8, &[(5, 6)]),
        };
        Some(m)
    }

    /// Apply the gate to `qubits`.
    pub fn on(&self, qubits: impl IntoIterator<Item = Qubit>) -> CircuitResult<Operation> {
        Operation::new(Arc::new(self.clone()), qubits)
    }

    fn symbols(&self) -> Vec<String> {
        let labels: &[&str] = match self {
            StandardGate::CX => &["@", "X"],
            StandardGate::CZ => &["@", "@"],
            StandardGate::Swap => &["×", "×"],
            StandardGate::CCX => &["@", "@", "X"],
            StandardGate::CSwap => &["@", "×", "×"],
            StandardGate::Reset => &["R"],
            StandardGate::GlobalPhase(_) => &[],
            StandardGate::Rx(t) | StandardGate::Ry(t) | StandardGate::Rz(t) => {
                let head = &self.name()[..1];
                return vec![format!("{}{}({t})", head.to_uppercase(), &self.name()[1..])];
            }
            StandardGate::Sdg => &["S^-1"],
            StandardGate::Tdg => &["T^-1"],
            g => return vec![g.name().to_uppercase()],
        };
        labels.iter().map(|s| (*s).to_string()).collect()
    }
}

fn square(n: usize, entries: &[Complex64]) -> Array2<Complex64> {
    Array2::from_shape_fn((n, n), |(r, c)| entries[r * n + c])
}

fn permutation(n: usize, swaps: &[(usize, usize)]) -> Array2<Complex64> {
    let mut m = Array2::eye(n);
    for &(a, b) in swaps {
        m[[a, a]] = Complex64::new(0.0, 0.0);
        m[[b, b]] = Complex64::new(0.0, 0.0);
        m[[a, b]] = Complex64::new(1.0, 0.0);
        m[[b, a]] = Complex64::new(1.0, 0.0);
    }
    m
}

impl Eq for StandardGate {}

impl Hash for StandardGate {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            StandardGate::Rx(t)
            | StandardGate::Ry(t)
            | StandardGate::Rz(t)
            | StandardGate::GlobalPhase(t) => t.to_bits().hash(state),
            _ => {}
        }
    }
}

impl fmt::Display for StandardGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StandardGate::Rx(t)
            | StandardGate::Ry(t)
            | StandardGate::Rz(t)
            | StandardGate::GlobalPhase(t) => write!(f, "{}({t})", self.name()),
            _ => write!(f, "{}", self.name()),
        }
    }
}

impl Gate for StandardGate {
    fn name(&self) -> String {
        StandardGate::name(self).to_string()
    }

    fn num_qubits(&self) -> usize {
        self.arity()
    }

    fn decompose(
        &self,
        qubits: &[Qubit],
        _context: &mut DecompositionContext<'_>,
    ) -> CircuitResult<Option<Vec<Operation>>> {
        let ops = match (self, qubits) {
            (StandardGate::Swap, [a, b]) => vec![
                StandardGate::CX.on([a.clone(), b.clone()])?,
                StandardGate::CX.on([b.clone(), a.clone()])?,
                StandardGate::CX.on([a.clone(), b.clone()])?,
            ],
            (StandardGate::CSwap, [c, a, b]) => vec![
                StandardGate::CX.on([b.clone(), a.clone()])?,
                StandardGate::CCX.on([c.clone(), a.clone(), b.clone()])?,
                StandardGate::CX.on([b.clone(), a.clone()])?,
            ],
            _ => return Ok(None),
        };
        Ok(Some(ops))
    }

    fn has_unitary(&self) -> bool {
        !matches!(self, StandardGate::Reset)
    }

    fn unitary(&self) -> CircuitResult<Option<Array2<Complex64>>> {
        Ok(self.matrix())
    }

    fn diagram_info(&self) -> CircuitResult<DiagramInfo> {
        Ok(DiagramInfo::new(self.symbols()))
    }

    fn pow(&self, exponent: i32) -> CircuitResult<Option<GateRef>> {
        Ok(self
            .power(exponent)
            .map(|g| Arc::new(g) as GateRef))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_unitary(m: &Array2<Complex64>) -> bool {
        let prod = m.t().mapv(|c| c.conj()).dot(m);
        let eye: Array2<Complex64> = Array2::eye(m.nrows());
        (prod - eye).iter().all(|c| c.norm() < 1e-12)
    }

    #[test]
    fn test_matrices_are_unitary() {
        let gates = [
            StandardGate::I,
            StandardGate::X,
            StandardGate::Y,
            StandardGate::Z,
            StandardGate::H,
            StandardGate::S,
            StandardGate::Sdg,
            StandardGate::T,
            StandardGate::Tdg,
            StandardGate::Rx(0.3),
            StandardGate::Ry(1.1),
            StandardGate::Rz(-0.7),
            StandardGate::CX,
            StandardGate::CZ,
            StandardGate::Swap,
            StandardGate::CCX,
            StandardGate::CSwap,
            StandardGate::GlobalPhase(0.25),
        ];
        for g in gates {
            let m = g.matrix().unwrap();
            assert_eq!(m.nrows(), 1 << g.arity(), "{g}");
            assert!(is_unitary(&m), "{g} is not unitary");
        }
    }

    #[test]
    fn test_inverse_matrix() {
        for g in [StandardGate::S, StandardGate::T, StandardGate::Rx(0.4), StandardGate::H] {
            let m = g.matrix().unwrap();
            let inv = g.inverse().unwrap().matrix().unwrap();
            let eye: Array2<Complex64> = Array2::eye(2);
            assert!((m.dot(&inv) - eye).iter().all(|c| c.norm() < 1e-12));
        }
        assert!(StandardGate::Reset.inverse().is_none());
    }

    #[test]
    fn test_power() {
        assert_eq!(StandardGate::X.power(3), Some(StandardGate::X));
        assert_eq!(StandardGate::X.power(2), None);
        assert_eq!(StandardGate::S.power(-1), Some(StandardGate::Sdg));
        assert_eq!(StandardGate::Rz(0.5).power(4), Some(StandardGate::Rz(2.0)));
    }

    #[test]
    fn test_cx_matrix_control_is_msb() {
        let m = StandardGate::CX.matrix().unwrap();
        // |10⟩ -> |11⟩
        assert_eq!(m[[3, 2]], Complex64::new(1.0, 0.0));
        assert_eq!(m[[1, 1]], Complex64::new(1.0, 0.0));
    }

    #[test]
    fn test_diagram_info() {
        assert_eq!(
            StandardGate::CX.diagram_info().unwrap().wire_symbols,
            vec!["@", "X"]
        );
        assert_eq!(StandardGate::H.diagram_info().unwrap().wire_symbols, vec!["H"]);
        assert_eq!(
            StandardGate::Rx(0.5).diagram_info().unwrap().wire_symbols,
            vec!["Rx(0.5)"]
        );
    }

    #[test]
    fn test_hash_distinguishes_angles() {
        use rustc_hash::FxHashSet;
        let set: FxHashSet<StandardGate> =
            [StandardGate::Rx(0.1), StandardGate::Rx(0.2), StandardGate::Rx(0.1)]
                .into_iter()
                .collect();
        assert_eq!(set.len(), 2);
    }
}
