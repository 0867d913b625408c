//! Qubit manager adapter used while emitting bloqs into circuits.

use rustc_hash::FxHashSet;
use tracing::trace;

use quarry_circuit::{CircuitError, CircuitResult, Qubit, QubitManager};

/// Wraps another [`QubitManager`], tracking which qubits are live in the
/// conversion.
///
/// Qubits are managed either because they were allocated through the adapter
/// or because they were declared with [`manage_qubits`](Self::manage_qubits).
/// Freeing a managed qubit always succeeds; only allocated qubits are handed
/// back to the wrapped manager, declared ones are simply forgotten.
pub struct InteropQubitManager<'a> {
    inner: &'a mut dyn QubitManager,
    managed: FxHashSet<Qubit>,
    declared: FxHashSet<Qubit>,
}

impl<'a> InteropQubitManager<'a> {
    /// Wrap `inner`.
    pub fn new(inner: &'a mut dyn QubitManager) -> Self {
        Self {
            inner,
            managed: FxHashSet::default(),
            declared: FxHashSet::default(),
        }
    }

    /// Treat `qubits` as live without allocating them.
    pub fn manage_qubits(&mut self, qubits: impl IntoIterator<Item = Qubit>) {
        for q in qubits {
            self.managed.insert(q.clone());
            self.declared.insert(q);
        }
    }

    /// Qubits currently live in the conversion.
    pub fn managed_qubits(&self) -> &FxHashSet<Qubit> {
        &self.managed
    }
}

impl QubitManager for InteropQubitManager<'_> {
    fn qalloc(&mut self, n: usize) -> Vec<Qubit> {
        let qubits = self.inner.qalloc(n);
        trace!(n, "allocated");
        self.managed.extend(qubits.iter().cloned());
        qubits
    }

    fn qfree(&mut self, qubits: &[Qubit]) -> CircuitResult<()> {
        if let Some(q) = qubits.iter().find(|q| !self.managed.contains(*q)) {
            return Err(CircuitError::QubitNotAllocated { qubit: q.clone() });
        }
        let mut owned = Vec::new();
        for q in qubits {
            self.managed.remove(q);
            if !self.declared.remove(q) {
                owned.push(q.clone());
            }
        }
        if owned.is_empty() {
            return Ok(());
        }
        self.inner.qfree(&owned)
    }
}

impl std::fmt::Debug for InteropQubitManager<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InteropQubitManager")
            .field("managed", &self.managed.len())
            .field("declared", &self.declared.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quarry_circuit::SimpleQubitManager;

    #[test]
    fn test_alloc_and_free_forward() {
        let mut base = SimpleQubitManager::new();
        {
            let mut qm = InteropQubitManager::new(&mut base);
            let qs = qm.qalloc(3);
            assert_eq!(qm.managed_qubits().len(), 3);
            qm.qfree(&qs[..2]).unwrap();
            assert_eq!(qm.managed_qubits().len(), 1);
        }
        assert_eq!(base.num_in_use(), 1);
    }

    #[test]
    fn test_declared_qubits_not_forwarded() {
        let mut base = SimpleQubitManager::new();
        let mut qm = InteropQubitManager::new(&mut base);
        qm.manage_qubits([Qubit::named("x")]);
        qm.qfree(&[Qubit::named("x")]).unwrap();
        assert!(qm.managed_qubits().is_empty());
    }

    #[test]
    fn test_free_unmanaged_fails() {
        let mut base = SimpleQubitManager::new();
        let mut qm = InteropQubitManager::new(&mut base);
        let err = qm.qfree(&[Qubit::line(7)]).unwrap_err();
        assert!(matches!(err, CircuitError::QubitNotAllocated { .. }));
    }
}
