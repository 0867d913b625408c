//! Benchmarks for circuit import and composite export
//!
//! Run with: cargo bench -p quarry-bloq

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use ndarray::{ArrayD, IxDyn};
use quarry_bloq::interop::{self, QuregMap};
use quarry_circuit::{Circuit, Qubit, SimpleQubitManager, StandardGate};

/// A brickwork of H and CX layers on `n` line qubits.
fn brickwork(n: u32, layers: usize) -> Circuit {
    let q = Qubit::line_range(n);
    let mut circuit = Circuit::new();
    for layer in 0..layers {
        for qubit in &q {
            circuit.push(StandardGate::H.on([qubit.clone()]).unwrap());
        }
        let offset = layer % 2;
        for pair in q[offset..].chunks_exact(2) {
            circuit.push(StandardGate::CX.on(pair.to_vec()).unwrap());
        }
    }
    circuit
}

fn quregs_for(circuit: &Circuit) -> QuregMap {
    let qubits = circuit.all_qubits();
    let n = qubits.len();
    QuregMap::from([(
        "qubits".to_string(),
        ArrayD::from_shape_vec(IxDyn(&[n, 1]), qubits).unwrap(),
    )])
}

/// Benchmark importing flat circuits
fn bench_import(c: &mut Criterion) {
    let mut group = c.benchmark_group("import");

    for num_qubits in &[4, 8, 16, 32] {
        let circuit = brickwork(*num_qubits, 10);
        group.bench_with_input(
            BenchmarkId::new("brickwork", num_qubits),
            &circuit,
            |b, circuit| {
                b.iter(|| interop::import(black_box(circuit), None, None, None).unwrap());
            },
        );
    }

    group.finish();
}

/// Benchmark exporting composite bloqs
fn bench_export(c: &mut Criterion) {
    let mut group = c.benchmark_group("export");

    for num_qubits in &[4, 8, 16, 32] {
        let circuit = brickwork(*num_qubits, 10);
        let cbloq = interop::import(&circuit, None, None, None).unwrap();
        let quregs = quregs_for(&circuit);
        group.bench_with_input(
            BenchmarkId::new("brickwork", num_qubits),
            &(cbloq, quregs),
            |b, (cbloq, quregs)| {
                b.iter(|| {
                    let mut qm = SimpleQubitManager::new();
                    cbloq
                        .to_circuit_and_quregs(&mut qm, black_box(quregs))
                        .unwrap()
                });
            },
        );
    }

    group.finish();
}

/// Benchmark the full round trip
fn bench_roundtrip(c: &mut Criterion) {
    let circuit = brickwork(16, 20);
    let quregs = quregs_for(&circuit);

    c.bench_function("roundtrip_16x20", |b| {
        b.iter(|| {
            let cbloq = interop::import(black_box(&circuit), None, None, None).unwrap();
            let mut qm = SimpleQubitManager::new();
            cbloq.to_circuit_and_quregs(&mut qm, &quregs).unwrap()
        });
    });
}

criterion_group!(benches, bench_import, bench_export, bench_roundtrip);
criterion_main!(benches);
