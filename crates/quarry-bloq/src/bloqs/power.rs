//! Repeated application of a bloq.

use std::fmt;
use std::sync::Arc;

use ndarray::Array2;
use num_complex::Complex64;

use crate::bloq::{Bloq, BloqRef, WireSymbol};
use crate::bloqs::adjoint_of;
use crate::builder::BloqBuilder;
use crate::error::{BloqError, BloqResult};
use crate::register::Register;
use crate::signature::Signature;
use crate::soquet::Soquets;

/// Largest exponent whose decomposition is unrolled into a graph.
pub const MAX_UNROLLED_EXPONENT: usize = 1 << 12;

/// `bloq` applied `exponent` times in sequence.
///
/// The decomposition places `exponent` copies of `bloq` one after another and
/// is refused above [`MAX_UNROLLED_EXPONENT`]; the tensor is computed by
/// repeated squaring for any exponent.
#[derive(Debug, Clone, Eq, Hash)]
pub struct Power {
    bloq: BloqRef,
    exponent: usize,
}

// Field-wise equality, equivalent to `#[derive(PartialEq)]` (which cannot
// compile against an `Arc<dyn _>` field, rust-lang/rust#31740).
impl PartialEq for Power {
    fn eq(&self, other: &Self) -> bool {
        PartialEq::eq(&self.bloq, &other.bloq) && self.exponent == other.exponent
    }
}

impl Power {
    /// Raise `bloq` to `exponent`. Only bloqs whose registers are all THRU
    /// can be repeated.
    pub fn new(bloq: BloqRef, exponent: usize) -> BloqResult<Self> {
        if !bloq.signature().all_thru() {
            return Err(BloqError::InvalidPower(bloq.to_string()));
        }
        Ok(Self { bloq, exponent })
    }

    /// The repeated bloq.
    pub fn bloq(&self) -> &BloqRef {
        &self.bloq
    }

    /// Number of repetitions.
    pub fn exponent(&self) -> usize {
        self.exponent
    }
}

impl fmt::Display for Power {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}^{}", self.bloq, self.exponent)
    }
}

impl Bloq for Power {
    fn signature(&self) -> Signature {
        self.bloq.signature()
    }

    fn build_composite_bloq(&self, bb: &mut BloqBuilder, mut soqs: Soquets) -> BloqResult<Soquets> {
        if self.exponent > MAX_UNROLLED_EXPONENT {
            return Err(BloqError::DecomposeType {
                bloq: self.to_string(),
                reason: format!("exponent exceeds {MAX_UNROLLED_EXPONENT}"),
            });
        }
        for _ in 0..self.exponent {
            soqs = bb.add(self.bloq.clone(), soqs)?;
        }
        Ok(soqs)
    }

    fn tensor_contract(&self) -> BloqResult<Option<Array2<Complex64>>> {
        let Some(base) = self.bloq.tensor_contract()? else {
            return Ok(None);
        };
        let mut result = Array2::eye(base.nrows());
        let mut square = base;
        let mut exponent = self.exponent;
        while exponent > 0 {
            if exponent & 1 == 1 {
                result = result.dot(&square);
            }
            exponent >>= 1;
            if exponent > 0 {
                square = square.dot(&square);
            }
        }
        Ok(Some(result))
    }

    fn adjoint(&self) -> Option<BloqRef> {
        Some(Arc::new(Self {
            bloq: adjoint_of(&self.bloq),
            exponent: self.exponent,
        }))
    }

    fn wire_symbol(&self, reg: &Register, idx: &[usize]) -> WireSymbol {
        self.bloq.wire_symbol(reg, idx)
    }
}
