//! Signatures: the ordered registers of a bloq.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::dtype::DataType;
use crate::error::{BloqError, BloqResult};
use crate::register::{Register, Side};

/// The ordered registers of a bloq.
///
/// A name may appear twice only as a LEFT-only register together with a
/// RIGHT-only register; such a pair is a register group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Signature {
    registers: Vec<Register>,
}

impl Signature {
    /// Create a signature, validating register names.
    pub fn new(registers: impl IntoIterator<Item = Register>) -> BloqResult<Self> {
        let registers: Vec<Register> = registers.into_iter().collect();
        let mut seen: IndexMap<&str, Vec<Side>> = IndexMap::new();
        for reg in &registers {
            let sides = seen.entry(reg.name()).or_default();
            let overlaps = sides.iter().any(|s| {
                (s.is_left() && reg.side().is_left()) || (s.is_right() && reg.side().is_right())
            });
            if overlaps {
                return Err(BloqError::DuplicateRegister {
                    name: reg.name().to_string(),
                });
            }
            sides.push(reg.side());
        }
        Ok(Self { registers })
    }

    /// A signature from registers already known to be valid.
    pub(crate) fn from_valid(registers: Vec<Register>) -> Self {
        Self { registers }
    }

    /// THRU registers of `QBit` (width 1) or `QAny(width)`.
    pub fn build<'a>(widths: impl IntoIterator<Item = (&'a str, usize)>) -> BloqResult<Self> {
        Self::build_from_dtypes(
            widths
                .into_iter()
                .map(|(name, n)| (name, DataType::qubits(n))),
        )
    }

    /// Scalar THRU registers of the given types.
    pub fn build_from_dtypes<'a>(
        dtypes: impl IntoIterator<Item = (&'a str, DataType)>,
    ) -> BloqResult<Self> {
        Self::new(
            dtypes
                .into_iter()
                .map(|(name, dtype)| Register::new(name, dtype)),
        )
    }

    /// Registers in declaration order.
    pub fn iter(&self) -> std::slice::Iter<'_, Register> {
        self.registers.iter()
    }

    /// Number of registers.
    pub fn len(&self) -> usize {
        self.registers.len()
    }

    /// Whether there are no registers.
    pub fn is_empty(&self) -> bool {
        self.registers.is_empty()
    }

    /// Input registers (LEFT and THRU).
    pub fn lefts(&self) -> impl Iterator<Item = &Register> + '_ {
        self.registers.iter().filter(|r| r.side().is_left())
    }

    /// Output registers (RIGHT and THRU).
    pub fn rights(&self) -> impl Iterator<Item = &Register> + '_ {
        self.registers.iter().filter(|r| r.side().is_right())
    }

    /// The input register called `name`.
    pub fn get_left(&self, name: &str) -> Option<&Register> {
        self.lefts().find(|r| r.name() == name)
    }

    /// The output register called `name`.
    pub fn get_right(&self, name: &str) -> Option<&Register> {
        self.rights().find(|r| r.name() == name)
    }

    /// Registers bucketed by name, in order of first appearance.
    pub fn groups(&self) -> IndexMap<&str, Vec<&Register>> {
        let mut groups: IndexMap<&str, Vec<&Register>> = IndexMap::new();
        for reg in &self.registers {
            groups.entry(reg.name()).or_default().push(reg);
        }
        groups
    }

    /// Total number of qubits across quantum registers.
    pub fn n_qubits(&self) -> usize {
        self.registers
            .iter()
            .filter(|r| r.dtype().is_quantum())
            .map(Register::total_bits)
            .sum()
    }

    /// Total bits of the input registers.
    pub fn left_bits(&self) -> usize {
        self.lefts().map(Register::total_bits).sum()
    }

    /// Total bits of the output registers.
    pub fn right_bits(&self) -> usize {
        self.rights().map(Register::total_bits).sum()
    }

    /// Whether every register is THRU.
    pub fn all_thru(&self) -> bool {
        self.registers.iter().all(|r| r.side() == Side::Thru)
    }

    /// The signature with LEFT and RIGHT swapped.
    #[must_use]
    pub fn adjoint(&self) -> Signature {
        Signature {
            registers: self.registers.iter().map(Register::adjoint).collect(),
        }
    }
}

impl From<Register> for Signature {
    fn from(reg: Register) -> Self {
        Self {
            registers: vec![reg],
        }
    }
}

impl<'a> IntoIterator for &'a Signature {
    type Item = &'a Register;
    type IntoIter = std::slice::Iter<'a, Register>;

    fn into_iter(self) -> Self::IntoIter {
        self.registers.iter()
    }
}
