//! Property-based tests for the flat circuit model.
//!
//! Random standard-gate circuits must survive JSON serialization and evaluate
//! to unitary matrices.

use ndarray::Array2;
use num_complex::Complex64;
use proptest::prelude::*;
use quarry_circuit::{Circuit, Gate, Operation, Qubit, StandardGate};

const NUM_QUBITS: u32 = 4;

/// Angles exactly representable in JSON.
const ANGLES: [f64; 4] = [0.25, 0.5, -1.5, 3.0];

fn arb_operation() -> impl Strategy<Value = Operation> {
    let gate = prop_oneof![
        Just(StandardGate::H),
        Just(StandardGate::Y),
        Just(StandardGate::Sdg),
        Just(StandardGate::Tdg),
        prop::sample::select(ANGLES.to_vec()).prop_map(StandardGate::Rx),
        prop::sample::select(ANGLES.to_vec()).prop_map(StandardGate::Ry),
        Just(StandardGate::CX),
        Just(StandardGate::CZ),
        Just(StandardGate::Swap),
        Just(StandardGate::CSwap),
    ];
    let order = Just((0..NUM_QUBITS).collect::<Vec<u32>>()).prop_shuffle();
    (gate, order).prop_map(|(gate, order)| {
        let qubits = order.into_iter().take(gate.arity()).map(Qubit::line);
        gate.on(qubits).unwrap()
    })
}

fn arb_circuit() -> impl Strategy<Value = Circuit> {
    prop::collection::vec(arb_operation(), 0..=15).prop_map(Circuit::from_operations)
}

fn is_identity(m: &Array2<Complex64>) -> bool {
    let eye = Array2::<Complex64>::eye(m.nrows());
    m.iter().zip(eye.iter()).all(|(a, b)| (a - b).norm() < 1e-8)
}

proptest! {
    /// JSON round trip preserves every operation.
    #[test]
    fn test_json_roundtrip(circuit in arb_circuit()) {
        let json = circuit.to_json().unwrap();
        let parsed = Circuit::from_json(&json).unwrap();
        prop_assert_eq!(parsed, circuit);
    }

    /// The evaluated matrix is unitary.
    #[test]
    fn test_unitary_is_unitary(circuit in arb_circuit()) {
        let q = Qubit::line_range(NUM_QUBITS);
        let u = circuit.unitary(&q).unwrap();
        let product = u.t().mapv(|z| z.conj()).dot(&u);
        prop_assert!(is_identity(&product));
    }

    /// A circuit followed by its reversed inverse is the identity.
    #[test]
    fn test_inverse_cancels(circuit in arb_circuit()) {
        let mut full = circuit.clone();
        for op in circuit.operations().iter().rev() {
            let inverse = op.gate().pow(-1).unwrap().unwrap();
            full.push(Operation::new(inverse, op.qubits().to_vec()).unwrap());
        }
        let u = full.unitary(&Qubit::line_range(NUM_QUBITS)).unwrap();
        prop_assert!(is_identity(&u));
    }
}

#[test]
fn test_decompositions_match_matrices() {
    for gate in [StandardGate::Swap, StandardGate::CSwap] {
        let q = Qubit::line_range(gate.arity() as u32);
        let direct = gate.matrix().unwrap();
        let mut qm = quarry_circuit::SimpleQubitManager::new();
        let mut context = quarry_circuit::DecompositionContext::new(&mut qm);
        let ops = gate.decompose(&q, &mut context).unwrap().unwrap();
        let via = Circuit::from_operations(ops).unitary(&q).unwrap();
        assert_eq!(direct.dim(), via.dim());
        assert!(direct.iter().zip(via.iter()).all(|(a, b)| (a - b).norm() < 1e-8));
    }
}
