//! Registers: named, shaped, typed groups of wires.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::dtype::DataType;

/// Which boundary of a bloq a register sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// Input only; the wires end at the bloq.
    Left,
    /// Output only; the wires start at the bloq.
    Right,
    /// Both an input and an output of the same name.
    Thru,
}

impl Side {
    /// Whether the register is an input.
    #[inline]
    pub fn is_left(self) -> bool {
        matches!(self, Side::Left | Side::Thru)
    }

    /// Whether the register is an output.
    #[inline]
    pub fn is_right(self) -> bool {
        matches!(self, Side::Right | Side::Thru)
    }

    /// The side of the register in the adjoint bloq.
    pub fn adjoint(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
            Side::Thru => Side::Thru,
        }
    }
}

/// A named group of wires.
///
/// A register with shape `(a, b)` holds `a * b` elements, each of which is a
/// wire bundle of type [`DataType`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Register {
    name: String,
    dtype: DataType,
    shape: Vec<usize>,
    side: Side,
}

impl Register {
    /// A scalar THRU register.
    pub fn new(name: impl Into<String>, dtype: DataType) -> Self {
        Self {
            name: name.into(),
            dtype,
            shape: Vec::new(),
            side: Side::Thru,
        }
    }

    /// Set the shape.
    #[must_use]
    pub fn with_shape(mut self, shape: impl Into<Vec<usize>>) -> Self {
        self.shape = shape.into();
        self
    }

    /// Set the side.
    #[must_use]
    pub fn with_side(mut self, side: Side) -> Self {
        self.side = side;
        self
    }

    /// Register name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Element type.
    pub fn dtype(&self) -> DataType {
        self.dtype
    }

    /// Shape of the element array.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Side.
    pub fn side(&self) -> Side {
        self.side
    }

    /// Bits per element.
    pub fn bitsize(&self) -> usize {
        self.dtype.bitsize()
    }

    /// Number of elements.
    pub fn num_elements(&self) -> usize {
        self.shape.iter().product()
    }

    /// Bits across all elements.
    pub fn total_bits(&self) -> usize {
        self.bitsize() * self.num_elements()
    }

    /// Every index into the shape, in row-major order.
    ///
    /// A scalar register has exactly one index, the empty one.
    pub fn all_idxs(&self) -> Vec<Vec<usize>> {
        let mut idxs = vec![Vec::new()];
        for &dim in &self.shape {
            idxs = idxs
                .into_iter()
                .flat_map(|prefix| {
                    (0..dim).map(move |i| {
                        let mut idx = prefix.clone();
                        idx.push(i);
                        idx
                    })
                })
                .collect();
        }
        idxs
    }

    /// The register with its side swapped.
    #[must_use]
    pub fn adjoint(&self) -> Register {
        Register {
            side: self.side.adjoint(),
            ..self.clone()
        }
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.dtype)?;
        if !self.shape.is_empty() {
            write!(f, "{:?}", self.shape)?;
        }
        match self.side {
            Side::Thru => Ok(()),
            Side::Left => write!(f, " (left)"),
            Side::Right => write!(f, " (right)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_idxs() {
        let reg = Register::new("x", DataType::QBit).with_shape([2, 3]);
        let idxs = reg.all_idxs();
        assert_eq!(idxs.len(), 6);
        assert_eq!(idxs[0], vec![0, 0]);
        assert_eq!(idxs[1], vec![0, 1]);
        assert_eq!(idxs[5], vec![1, 2]);

        let scalar = Register::new("y", DataType::QAny(3));
        assert_eq!(scalar.all_idxs(), vec![Vec::<usize>::new()]);
        assert_eq!(scalar.total_bits(), 3);
    }

    #[test]
    fn test_zero_sized_dimension() {
        let reg = Register::new("x", DataType::QBit).with_shape([0]);
        assert!(reg.all_idxs().is_empty());
        assert_eq!(reg.total_bits(), 0);
    }

    #[test]
    fn test_sides() {
        assert!(Side::Thru.is_left() && Side::Thru.is_right());
        assert!(Side::Left.is_left() && !Side::Left.is_right());
        let reg = Register::new("a", DataType::QBit).with_side(Side::Left);
        assert_eq!(reg.adjoint().side(), Side::Right);
    }

    #[test]
    fn test_display() {
        let reg = Register::new("x", DataType::QAny(2))
            .with_shape([3])
            .with_side(Side::Right);
        assert_eq!(reg.to_string(), "x: QAny(2)[3] (right)");
    }
}
