//! Dense unitary evaluation of flat circuits.
//!
//! Operations without a direct matrix are decomposed recursively. Qubits that
//! appear only inside the circuit (ancillas, allocated outputs) start in |0⟩,
//! and qubits missing from the output list are projected onto ⟨0|.

use ndarray::Array2;
use num_complex::Complex64;
use rustc_hash::FxHashMap;
use tracing::trace;

use crate::error::{CircuitError, CircuitResult};
use crate::operation::Operation;
use crate::qubit::Qubit;
use crate::qubit_manager::{DecompositionContext, SimpleQubitManager};

/// Largest number of qubits evaluated densely.
pub const MAX_DENSE_QUBITS: usize = 14;

/// Recursion limit for decompositions.
pub const MAX_DECOMPOSITION_DEPTH: usize = 64;

type Applied = (Array2<Complex64>, Vec<Qubit>);

/// Matrix of `operations` mapping the `inputs` basis to the `outputs` basis.
///
/// The result has shape `(2^outputs, 2^inputs)`; the first qubit of each list
/// is the most significant bit.
pub fn unitary_between(
    operations: &[Operation],
    inputs: &[Qubit],
    outputs: &[Qubit],
) -> CircuitResult<Array2<Complex64>> {
    let mut qm = SimpleQubitManager::new();
    let mut context = DecompositionContext::new(&mut qm);
    let mut flat = Vec::new();
    for op in operations {
        flatten(op, &mut context, 0, &mut flat)?;
    }

    let mut order: Vec<Qubit> = Vec::new();
    let mut index: FxHashMap<Qubit, usize> = FxHashMap::default();
    let referenced = flat.iter().flat_map(|(_, qs)| qs.iter());
    for q in inputs.iter().chain(outputs).chain(referenced) {
        if !index.contains_key(q) {
            index.insert(q.clone(), order.len());
            order.push(q.clone());
        }
    }

    let n = order.len();
    if n > MAX_DENSE_QUBITS {
        return Err(CircuitError::TooManyQubits {
            got: n,
            max: MAX_DENSE_QUBITS,
        });
    }
    trace!(qubits = n, operations = flat.len(), "dense evaluation");

    let k = inputs.len();
    let m = outputs.len();
    let out_bits: Vec<usize> = outputs.iter().map(|q| 1usize << (n - 1 - index[q])).collect();
    let applied: Vec<(&Array2<Complex64>, Vec<usize>)> = flat
        .iter()
        .map(|(mat, qs)| (mat, qs.iter().map(|q| n - 1 - index[q]).collect()))
        .collect();

    let mut result = Array2::zeros((1 << m, 1 << k));
    for col in 0..(1usize << k) {
        let mut state = vec![Complex64::new(0.0, 0.0); 1 << n];
        state[col << (n - k)] = Complex64::new(1.0, 0.0);
        for (mat, bits) in &applied {
            apply(&mut state, mat, bits);
        }
        for row in 0..(1usize << m) {
            let idx = out_bits
                .iter()
                .enumerate()
                .filter(|(j, _)| (row >> (m - 1 - j)) & 1 == 1)
                .fold(0usize, |acc, (_, bit)| acc | bit);
            result[[row, col]] = state[idx];
        }
    }
    Ok(result)
}

fn flatten(
    op: &Operation,
    context: &mut DecompositionContext<'_>,
    depth: usize,
    out: &mut Vec<Applied>,
) -> CircuitResult<()> {
    let gate = op.gate();
    if depth > MAX_DECOMPOSITION_DEPTH {
        return Err(CircuitError::DecompositionDepth(gate.name()));
    }
    if let Some(matrix) = gate.unitary()? {
        let dim = 1usize << op.qubits().len();
        if matrix.dim() != (dim, dim) {
            return Err(CircuitError::QubitCountMismatch {
                gate_name: gate.name(),
                expected: matrix.nrows().trailing_zeros() as usize,
                got: op.qubits().len(),
            });
        }
        out.push((matrix, op.qubits().to_vec()));
        return Ok(());
    }
    match gate.decompose(op.qubits(), context)? {
        Some(ops) => {
            for sub in &ops {
                flatten(sub, context, depth + 1, out)?;
            }
            Ok(())
        }
        None => Err(CircuitError::NoUnitary(gate.name())),
    }
}

/// Apply `matrix` to the amplitudes selected by `bit_positions` (operand order).
fn apply(state: &mut [Complex64], matrix: &Array2<Complex64>, bit_positions: &[usize]) {
    let k = bit_positions.len();
    let sub = 1usize << k;
    let mask = bit_positions.iter().fold(0usize, |acc, p| acc | (1usize << p));
    let offsets: Vec<usize> = (0..sub)
        .map(|s| {
            bit_positions
                .iter()
                .enumerate()
                .filter(|(j, _)| (s >> (k - 1 - j)) & 1 == 1)
                .fold(0usize, |acc, (_, p)| acc | (1usize << p))
        })
        .collect();

    let mut amps = vec![Complex64::new(0.0, 0.0); sub];
    for base in 0..state.len() {
        if base & mask != 0 {
            continue;
        }
        for (s, off) in offsets.iter().enumerate() {
            amps[s] = state[base | off];
        }
        for (r, off) in offsets.iter().enumerate() {
            state[base | off] = (0..sub).map(|c| matrix[[r, c]] * amps[c]).sum();
        }
    }
}
