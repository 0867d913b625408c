//! Register element types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The data type carried by one element of a register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    /// A single qubit.
    QBit,
    /// An unstructured bundle of qubits.
    QAny(usize),
    /// A signed integer in two's complement.
    QInt(usize),
    /// An unsigned integer.
    QUInt(usize),
    /// A single classical bit.
    CBit,
    /// An unstructured bundle of classical bits.
    CAny(usize),
}

impl DataType {
    /// `QBit` for one qubit, `QAny(n)` otherwise.
    pub fn qubits(n: usize) -> Self {
        if n == 1 {
            DataType::QBit
        } else {
            DataType::QAny(n)
        }
    }

    /// Number of bits in one element.
    #[inline]
    pub fn bitsize(&self) -> usize {
        match self {
            DataType::QBit | DataType::CBit => 1,
            DataType::QAny(n) | DataType::QInt(n) | DataType::QUInt(n) | DataType::CAny(n) => *n,
        }
    }

    /// Whether the type lives on qubits.
    #[inline]
    pub fn is_quantum(&self) -> bool {
        !matches!(self, DataType::CBit | DataType::CAny(_))
    }

    /// Whether a wire of this type may connect to a register of type `other`.
    ///
    /// Types are compatible when they agree on width and on being quantum;
    /// `QAny` does not constrain the interpretation of the bits.
    pub fn is_consistent_with(&self, other: &DataType) -> bool {
        self.bitsize() == other.bitsize() && self.is_quantum() == other.is_quantum()
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::QBit => write!(f, "QBit()"),
            DataType::QAny(n) => write!(f, "QAny({n})"),
            DataType::QInt(n) => write!(f, "QInt({n})"),
            DataType::QUInt(n) => write!(f, "QUInt({n})"),
            DataType::CBit => write!(f, "CBit()"),
            DataType::CAny(n) => write!(f, "CAny({n})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bitsize() {
        assert_eq!(DataType::QBit.bitsize(), 1);
        assert_eq!(DataType::QUInt(5).bitsize(), 5);
        assert_eq!(DataType::qubits(1), DataType::QBit);
        assert_eq!(DataType::qubits(3), DataType::QAny(3));
    }

    #[test]
    fn test_consistency() {
        assert!(DataType::QBit.is_consistent_with(&DataType::QAny(1)));
        assert!(DataType::QInt(4).is_consistent_with(&DataType::QUInt(4)));
        assert!(!DataType::QAny(2).is_consistent_with(&DataType::QAny(3)));
        assert!(!DataType::CBit.is_consistent_with(&DataType::QBit));
    }
}
