//! The bloq interface.
//!
//! A [`Bloq`] is a quantum operation described by its [`Signature`]. Every
//! other capability is optional: a bloq may know how to build itself out of
//! smaller bloqs, emit itself directly into a circuit, report a dense tensor,
//! provide its own adjoint, or label its wires in diagrams.

use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use ndarray::Array2;
use num_complex::Complex64;
use quarry_circuit::{Operation, QubitManager};

use crate::builder::BloqBuilder;
use crate::composite::CompositeBloq;
use crate::error::{BloqError, BloqResult};
use crate::interop::QuregMap;
use crate::register::Register;
use crate::signature::Signature;
use crate::soquet::Soquets;

/// Shared handle to a bloq.
pub type BloqRef = Arc<dyn Bloq>;

/// How one register element is drawn in a diagram.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum WireSymbol {
    /// A control dot; filled for 1-controls, hollow for 0-controls.
    Circle {
        /// Whether the dot is filled.
        filled: bool,
    },
    /// A boxed label.
    TextBox(String),
    /// A boxed label with an arrow pointing out of the bloq.
    RarrowTextBox(String),
    /// A boxed label with an arrow pointing into the bloq.
    LarrowTextBox(String),
    /// The target of a controlled NOT.
    ModPlus,
    /// Free-floating text without a box.
    Text(String),
}

/// A quantum operation in the structured, register-based representation.
pub trait Bloq: DynBloq + fmt::Debug + fmt::Display + Send + Sync {
    /// The bloq's registers.
    fn signature(&self) -> Signature;

    /// Wire the bloq's decomposition into `bb`.
    ///
    /// `soqs` holds one soquet array per input register; the returned map
    /// must hold one per output register.
    fn build_composite_bloq(&self, _bb: &mut BloqBuilder, _soqs: Soquets) -> BloqResult<Soquets> {
        Err(BloqError::DecomposeNotImplemented(self.to_string()))
    }

    /// The bloq's decomposition as a composite bloq.
    fn decompose_bloq(&self) -> BloqResult<CompositeBloq> {
        BloqBuilder::decompose(&self.signature(), |bb, soqs| {
            self.build_composite_bloq(bb, soqs)
        })
    }

    /// Emit the bloq directly into a circuit.
    ///
    /// `quregs` holds a qubit array for every input register, shaped
    /// `register.shape + [bitsize]`. On success returns the operation to
    /// emit, if any, and qubit arrays for every output register.
    ///
    /// Returns `None` when the bloq has no native form and must be wrapped
    /// as a gate instead.
    fn as_circuit_op(
        &self,
        _qubit_manager: &mut dyn QubitManager,
        _quregs: &QuregMap,
    ) -> Option<BloqResult<(Option<Operation>, QuregMap)>> {
        None
    }

    /// Dense tensor in big-endian order over the flattened registers.
    ///
    /// Rows index the output qubits, columns the input qubits.
    fn tensor_contract(&self) -> BloqResult<Option<Array2<Complex64>>> {
        Ok(None)
    }

    /// The bloq's own adjoint, when it has a more specific one than
    /// [`Adjoint`](crate::bloqs::Adjoint).
    fn adjoint(&self) -> Option<BloqRef> {
        None
    }

    /// Diagram symbol for one element of `reg`.
    fn wire_symbol(&self, reg: &Register, _idx: &[usize]) -> WireSymbol {
        WireSymbol::TextBox(reg.name().to_string())
    }
}

/// Object-safe equality and hashing for bloqs.
///
/// Implemented automatically for every bloq that is `PartialEq + Hash`.
pub trait DynBloq: Any {
    /// Upcast to [`Any`] for downcasting.
    fn as_any(&self) -> &dyn Any;
    /// Compare against another bloq of unknown type.
    fn dyn_eq(&self, other: &dyn Any) -> bool;
    /// Feed the bloq into a type-erased hasher.
    fn dyn_hash(&self, state: &mut dyn Hasher);
}

impl<T> DynBloq for T
where
    T: Bloq + PartialEq + Hash + 'static,
{
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn dyn_eq(&self, other: &dyn Any) -> bool {
        other.downcast_ref::<T>().is_some_and(|other| self == other)
    }

    fn dyn_hash(&self, mut state: &mut dyn Hasher) {
        TypeId::of::<T>().hash(&mut state);
        self.hash(&mut state);
    }
}

impl dyn Bloq {
    /// Downcast to a concrete bloq type.
    pub fn downcast_ref<T: Bloq>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }
}

impl PartialEq for dyn Bloq {
    fn eq(&self, other: &Self) -> bool {
        self.dyn_eq(other.as_any())
    }
}

impl Eq for dyn Bloq {}

impl Hash for dyn Bloq {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.dyn_hash(state);
    }
}

/// A composite holding exactly one instance of `bloq`.
pub fn as_composite_bloq(bloq: BloqRef) -> BloqResult<CompositeBloq> {
    let signature = bloq.signature();
    let (mut bb, soqs) = BloqBuilder::from_signature(&signature, false)?;
    let out = bb.add(bloq, soqs)?;
    bb.finalize(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bloqs::{Join, Split};
    use crate::dtype::DataType;

    #[test]
    fn test_dyn_equality() {
        let a: BloqRef = Arc::new(Split::new(DataType::QAny(3)));
        let b: BloqRef = Arc::new(Split::new(DataType::QAny(3)));
        let c: BloqRef = Arc::new(Join::new(DataType::QAny(3)));
        assert_eq!(&a, &b);
        assert_ne!(&a, &c);
        assert_eq!(
            a.downcast_ref::<Split>().map(Split::dtype),
            Some(DataType::QAny(3))
        );
        assert!(a.downcast_ref::<Join>().is_none());
    }

    #[test]
    fn test_default_decomposition_unavailable() {
        #[derive(Debug, PartialEq, Eq, Hash)]
        struct Atom;

        impl fmt::Display for Atom {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "Atom")
            }
        }

        impl Bloq for Atom {
            fn signature(&self) -> Signature {
                Signature::build([("q", 1)]).unwrap()
            }
        }

        let err = Atom.decompose_bloq().unwrap_err();
        assert!(err.is_decompose_unavailable());
        assert_eq!(err.to_string(), "Atom does not declare a decomposition");
        assert!(Atom.tensor_contract().unwrap().is_none());
        assert!(Atom.adjoint().is_none());
    }

    #[test]
    fn test_as_composite_bloq() {
        let cbloq = as_composite_bloq(Arc::new(Split::new(DataType::QAny(2)))).unwrap();
        assert_eq!(cbloq.bloq_instances().len(), 1);
        assert_eq!(cbloq.signature(), &Split::new(DataType::QAny(2)).signature());
    }
}
