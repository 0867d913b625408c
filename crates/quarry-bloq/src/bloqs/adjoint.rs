//! The generic adjoint wrapper.

use std::fmt;
use std::sync::Arc;

use ndarray::Array2;
use num_complex::Complex64;

use crate::bloq::{Bloq, BloqRef, WireSymbol};
use crate::composite::CompositeBloq;
use crate::error::BloqResult;
use crate::register::Register;
use crate::signature::Signature;

/// The adjoint of a bloq that has no specialized adjoint of its own.
#[derive(Debug, Clone, Eq, Hash)]
pub struct Adjoint {
    subbloq: BloqRef,
}

// Field-wise equality, equivalent to `#[derive(PartialEq)]` (which cannot
// compile against an `Arc<dyn _>` field, rust-lang/rust#31740).
impl PartialEq for Adjoint {
    fn eq(&self, other: &Self) -> bool {
        PartialEq::eq(&self.subbloq, &other.subbloq)
    }
}

impl Adjoint {
    /// Wrap `subbloq`.
    pub fn new(subbloq: BloqRef) -> Self {
        Self { subbloq }
    }

    /// The wrapped bloq.
    pub fn subbloq(&self) -> &BloqRef {
        &self.subbloq
    }
}

/// The adjoint of `bloq`: its own adjoint if it declares one, otherwise an
/// [`Adjoint`] wrapper.
pub fn adjoint_of(bloq: &BloqRef) -> BloqRef {
    bloq.adjoint()
        .unwrap_or_else(|| Arc::new(Adjoint::new(bloq.clone())))
}

impl fmt::Display for Adjoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}†", self.subbloq)
    }
}

impl Bloq for Adjoint {
    fn signature(&self) -> Signature {
        self.subbloq.signature().adjoint()
    }

    fn decompose_bloq(&self) -> BloqResult<CompositeBloq> {
        self.subbloq.decompose_bloq()?.adjoint()
    }

    fn tensor_contract(&self) -> BloqResult<Option<Array2<Complex64>>> {
        Ok(self
            .subbloq
            .tensor_contract()?
            .map(|m| m.t().mapv(|z| z.conj())))
    }

    fn adjoint(&self) -> Option<BloqRef> {
        Some(self.subbloq.clone())
    }

    fn wire_symbol(&self, reg: &Register, idx: &[usize]) -> WireSymbol {
        self.subbloq.wire_symbol(&reg.adjoint(), idx)
    }
}
