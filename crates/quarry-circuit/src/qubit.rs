//! Qubit identities.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of a single qubit.
///
/// Qubits are plain values: they carry no state, hash and compare by identity,
/// and are totally ordered so that qubit sets can be sorted deterministically.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Qubit {
    /// A qubit on a numbered line.
    Line(u32),
    /// A qubit identified by name.
    Named(String),
    /// A clean ancilla handed out by a [`SimpleQubitManager`](crate::SimpleQubitManager).
    Clean(u32),
}

impl Qubit {
    /// Create a line qubit.
    pub fn line(index: u32) -> Self {
        Qubit::Line(index)
    }

    /// Create a named qubit.
    pub fn named(name: impl Into<String>) -> Self {
        Qubit::Named(name.into())
    }

    /// `n` consecutive line qubits starting at zero.
    pub fn line_range(n: u32) -> Vec<Qubit> {
        (0..n).map(Qubit::Line).collect()
    }

    /// `n` named qubits `{prefix}0 .. {prefix}{n-1}`.
    pub fn named_range(prefix: &str, n: usize) -> Vec<Qubit> {
        (0..n).map(|i| Qubit::Named(format!("{prefix}{i}"))).collect()
    }
}

impl fmt::Display for Qubit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Qubit::Line(i) => write!(f, "q({i})"),
            Qubit::Named(name) => write!(f, "{name}"),
            Qubit::Clean(i) => write!(f, "_c({i})"),
        }
    }
}

impl From<u32> for Qubit {
    fn from(index: u32) -> Self {
        Qubit::Line(index)
    }
}

impl From<&str> for Qubit {
    fn from(name: &str) -> Self {
        Qubit::Named(name.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Qubit::line(3).to_string(), "q(3)");
        assert_eq!(Qubit::named("ctrl").to_string(), "ctrl");
        assert_eq!(Qubit::Clean(0).to_string(), "_c(0)");
    }

    #[test]
    fn test_ordering_is_total() {
        let mut qs = vec![Qubit::named("b"), Qubit::line(2), Qubit::named("a"), Qubit::line(0)];
        qs.sort();
        assert_eq!(
            qs,
            vec![Qubit::line(0), Qubit::line(2), Qubit::named("a"), Qubit::named("b")]
        );
    }

    #[test]
    fn test_serde() {
        let q = Qubit::named("anc");
        let json = serde_json::to_string(&q).unwrap();
        let back: Qubit = serde_json::from_str(&json).unwrap();
        assert_eq!(q, back);
    }
}
