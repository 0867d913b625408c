//! Qubit allocation.

use rustc_hash::FxHashSet;

use crate::error::{CircuitError, CircuitResult};
use crate::qubit::Qubit;

/// Capability for allocating and freeing qubits.
pub trait QubitManager {
    /// Allocate `n` fresh qubits.
    fn qalloc(&mut self, n: usize) -> Vec<Qubit>;

    /// Return qubits to the allocator.
    fn qfree(&mut self, qubits: &[Qubit]) -> CircuitResult<()>;
}

/// Allocator handing out [`Qubit::Clean`] ancillas with increasing indices.
///
/// Freed qubits are not reused, so every allocation yields qubits that were
/// never seen before.
#[derive(Debug, Default, Clone)]
pub struct SimpleQubitManager {
    next: u32,
    in_use: FxHashSet<Qubit>,
}

impl SimpleQubitManager {
    /// Create an empty allocator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of qubits currently allocated and not yet freed.
    pub fn num_in_use(&self) -> usize {
        self.in_use.len()
    }

    /// Whether `qubit` is currently allocated.
    pub fn is_in_use(&self, qubit: &Qubit) -> bool {
        self.in_use.contains(qubit)
    }
}

impl QubitManager for SimpleQubitManager {
    fn qalloc(&mut self, n: usize) -> Vec<Qubit> {
        let qubits: Vec<Qubit> = (0..n)
            .map(|k| Qubit::Clean(self.next + k as u32))
            .collect();
        self.next += n as u32;
        self.in_use.extend(qubits.iter().cloned());
        qubits
    }

    fn qfree(&mut self, qubits: &[Qubit]) -> CircuitResult<()> {
        if let Some(q) = qubits.iter().find(|q| !self.in_use.contains(*q)) {
            return Err(CircuitError::QubitNotAllocated { qubit: q.clone() });
        }
        for q in qubits {
            self.in_use.remove(q);
        }
        Ok(())
    }
}

/// State threaded through [`Gate::decompose`](crate::Gate::decompose).
pub struct DecompositionContext<'a> {
    /// Allocator for ancillas introduced by the decomposition.
    pub qubit_manager: &'a mut dyn QubitManager,
}

impl<'a> DecompositionContext<'a> {
    /// Create a context backed by `qubit_manager`.
    pub fn new(qubit_manager: &'a mut dyn QubitManager) -> Self {
        Self { qubit_manager }
    }
}

impl std::fmt::Debug for DecompositionContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecompositionContext").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alloc_is_fresh() {
        let mut qm = SimpleQubitManager::new();
        let a = qm.qalloc(2);
        qm.qfree(&a).unwrap();
        let b = qm.qalloc(2);
        assert_eq!(a, vec![Qubit::Clean(0), Qubit::Clean(1)]);
        assert_eq!(b, vec![Qubit::Clean(2), Qubit::Clean(3)]);
        assert_eq!(qm.num_in_use(), 2);
    }

    #[test]
    fn test_free_unknown_qubit() {
        let mut qm = SimpleQubitManager::new();
        let a = qm.qalloc(1);
        let err = qm.qfree(&[a[0].clone(), Qubit::line(0)]).unwrap_err();
        assert!(matches!(err, CircuitError::QubitNotAllocated { .. }));
        // Nothing was freed on failure.
        assert!(qm.is_in_use(&a[0]));
    }
}
