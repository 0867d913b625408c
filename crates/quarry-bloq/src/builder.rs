//! Incremental construction of composite bloqs.

use ndarray::{ArrayD, Dimension, IxDyn};
use rustc_hash::FxHashSet;
use std::sync::Arc;
use tracing::trace;

use crate::bloq::BloqRef;
use crate::bloqs::{Allocate, Free, Join, Split};
use crate::composite::CompositeBloq;
use crate::dtype::DataType;
use crate::error::{BloqError, BloqResult};
use crate::register::{Register, Side};
use crate::signature::Signature;
use crate::soquet::{Binst, BloqInstance, Connection, SoqArray, Soquet, Soquets, soq_vec};

const COMPOSITE: &str = "CompositeBloq";

/// Builds a [`CompositeBloq`] by adding bloqs and wiring soquets.
///
/// Every soquet is linear: it is produced once and must be consumed exactly
/// once, either by a later bloq or by [`BloqBuilder::finalize`].
///
/// # Example
///
/// ```rust
/// use quarry_bloq::{BloqBuilder, DataType, Soquets};
///
/// let mut bb = BloqBuilder::new();
/// let q = bb.allocate(DataType::QAny(2)).unwrap();
/// let bits = bb.split(q).unwrap();
/// let q = bb.join(bits, None).unwrap();
/// let cbloq = bb.finalize(Soquets::new().with("q", q)).unwrap();
/// assert_eq!(cbloq.bloq_instances().len(), 3);
/// ```
#[derive(Debug)]
pub struct BloqBuilder {
    next_i: usize,
    binsts: Vec<BloqInstance>,
    cxns: Vec<Connection>,
    available: FxHashSet<Soquet>,
    regs: Vec<Register>,
    add_registers_allowed: bool,
}

impl Default for BloqBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl BloqBuilder {
    /// An empty builder whose signature grows as registers are added.
    pub fn new() -> Self {
        Self {
            next_i: 0,
            binsts: Vec::new(),
            cxns: Vec::new(),
            available: FxHashSet::default(),
            regs: Vec::new(),
            add_registers_allowed: true,
        }
    }

    /// A builder with `signature`'s registers, plus the soquets of its inputs.
    pub fn from_signature(
        signature: &Signature,
        add_registers_allowed: bool,
    ) -> BloqResult<(Self, Soquets)> {
        let mut bb = Self::new();
        let mut soqs = Soquets::new();
        for reg in signature {
            if let Some(arr) = bb.add_register(reg.clone())? {
                soqs.insert(reg.name(), arr);
            }
        }
        bb.add_registers_allowed = add_registers_allowed;
        Ok((bb, soqs))
    }

    /// Build the decomposition of a bloq with `signature`.
    pub fn decompose<F>(signature: &Signature, build: F) -> BloqResult<CompositeBloq>
    where
        F: FnOnce(&mut BloqBuilder, Soquets) -> BloqResult<Soquets>,
    {
        let (mut bb, soqs) = Self::from_signature(signature, false)?;
        let out = build(&mut bb, soqs)?;
        bb.finalize(out)
    }

    /// Add a register to the composite's signature.
    ///
    /// Returns the soquets of the new input when the register is LEFT or THRU.
    pub fn add_register(&mut self, reg: Register) -> BloqResult<Option<SoqArray>> {
        if !self.add_registers_allowed {
            return Err(BloqError::RegistersFrozen(reg.name().to_string()));
        }
        Signature::new(self.regs.iter().cloned().chain([reg.clone()]))?;
        self.regs.push(reg.clone());
        if !reg.side().is_left() {
            return Ok(None);
        }
        let arr = ArrayD::from_shape_fn(IxDyn(reg.shape()), |idx| {
            Soquet::new(Binst::LeftDangle, reg.clone(), idx.slice().to_vec())
        });
        self.available.extend(arr.iter().cloned());
        Ok(Some(arr))
    }

    /// Add `bloq`, consuming `in_soqs` for its inputs and returning its outputs.
    pub fn add(&mut self, bloq: BloqRef, mut in_soqs: Soquets) -> BloqResult<Soquets> {
        let binst = BloqInstance::new(self.next_i, bloq.clone());
        let signature = bloq.signature();

        for reg in signature.lefts() {
            let arr = in_soqs
                .take(reg.name())
                .ok_or_else(|| BloqError::MissingRegister {
                    bloq: bloq.to_string(),
                    name: reg.name().to_string(),
                })?;
            let right =
                |idx: Vec<usize>| Soquet::new(Binst::Instance(binst.clone()), reg.clone(), idx);
            self.consume(reg, &arr, right)?;
        }
        if let Some(name) = in_soqs.names().next() {
            return Err(BloqError::UnknownRegister {
                bloq: bloq.to_string(),
                name: name.to_string(),
            });
        }

        let mut out = Soquets::new();
        for reg in signature.rights() {
            let arr = ArrayD::from_shape_fn(IxDyn(reg.shape()), |idx| {
                Soquet::new(
                    Binst::Instance(binst.clone()),
                    reg.clone(),
                    idx.slice().to_vec(),
                )
            });
            self.available.extend(arr.iter().cloned());
            out.insert(reg.name(), arr);
        }

        trace!(binst = %binst, "added");
        self.next_i += 1;
        self.binsts.push(binst);
        Ok(out)
    }

    /// Split a bundle into its individual qubits.
    pub fn split(&mut self, soq: Soquet) -> BloqResult<SoqArray> {
        let split = Split::new(soq.reg().dtype());
        let label = split.to_string();
        let mut out = self.add(Arc::new(split), Soquets::new().with("reg", soq))?;
        out.take("reg").ok_or(BloqError::MissingRegister {
            bloq: label,
            name: "reg".into(),
        })
    }

    /// Join individual qubits into one bundle of type `dtype`, `QAny(n)` by default.
    pub fn join(&mut self, soqs: SoqArray, dtype: Option<DataType>) -> BloqResult<Soquet> {
        let n = soqs.len();
        let dtype = dtype.unwrap_or(DataType::QAny(n));
        if dtype.bitsize() != n || soqs.ndim() != 1 {
            return Err(BloqError::ShapeMismatch {
                name: "reg".into(),
                expected: vec![dtype.bitsize()],
                got: soqs.shape().to_vec(),
            });
        }
        let out = self.add(Arc::new(Join::new(dtype)), Soquets::new().with_array("reg", soqs))?;
        out.single("reg")
    }

    /// Join a list of qubit soquets.
    pub fn join_vec(&mut self, soqs: Vec<Soquet>, dtype: Option<DataType>) -> BloqResult<Soquet> {
        self.join(soq_vec(soqs), dtype)
    }

    /// Allocate a fresh bundle in the zero state.
    pub fn allocate(&mut self, dtype: DataType) -> BloqResult<Soquet> {
        let out = self.add(Arc::new(Allocate::new(dtype)), Soquets::new())?;
        out.single("reg")
    }

    /// Free a bundle.
    pub fn free(&mut self, soq: Soquet) -> BloqResult<()> {
        let free = Free::new(soq.reg().dtype());
        self.add(Arc::new(free), Soquets::new().with("reg", soq))?;
        Ok(())
    }

    /// Close the composite, wiring `final_soqs` to its outputs.
    ///
    /// When registers may still be added, every name in `final_soqs` without
    /// a matching output register becomes a new RIGHT register.
    pub fn finalize(mut self, mut final_soqs: Soquets) -> BloqResult<CompositeBloq> {
        if self.add_registers_allowed {
            for (name, arr) in final_soqs.iter() {
                let exists = self
                    .regs
                    .iter()
                    .any(|r| r.name() == name && r.side().is_right());
                if !exists {
                    let dtype = arr
                        .iter()
                        .next()
                        .map_or(DataType::QBit, |soq| soq.reg().dtype());
                    self.regs.push(
                        Register::new(name, dtype)
                            .with_shape(arr.shape().to_vec())
                            .with_side(Side::Right),
                    );
                }
            }
        }
        let signature = Signature::new(self.regs.clone())?;

        for reg in signature.rights() {
            let arr = final_soqs
                .take(reg.name())
                .ok_or_else(|| BloqError::MissingRegister {
                    bloq: COMPOSITE.into(),
                    name: reg.name().to_string(),
                })?;
            let right = |idx: Vec<usize>| Soquet::new(Binst::RightDangle, reg.clone(), idx);
            self.consume(reg, &arr, right)?;
        }
        if let Some(name) = final_soqs.names().next() {
            return Err(BloqError::UnknownRegister {
                bloq: COMPOSITE.into(),
                name: name.to_string(),
            });
        }

        if !self.available.is_empty() {
            let mut dangling: Vec<String> = self.available.iter().map(ToString::to_string).collect();
            dangling.sort();
            return Err(BloqError::DanglingSoquets(dangling));
        }

        CompositeBloq::new(self.cxns, signature, self.binsts)
    }

    /// Connect every soquet of `arr` to the input `reg`, checking shape and type.
    fn consume<F>(&mut self, reg: &Register, arr: &SoqArray, right: F) -> BloqResult<()>
    where
        F: Fn(Vec<usize>) -> Soquet,
    {
        if arr.shape() != reg.shape() {
            return Err(BloqError::ShapeMismatch {
                name: reg.name().to_string(),
                expected: reg.shape().to_vec(),
                got: arr.shape().to_vec(),
            });
        }
        for idx in reg.all_idxs() {
            let soq = &arr[IxDyn(&idx)];
            if !soq.reg().dtype().is_consistent_with(&reg.dtype()) {
                return Err(BloqError::DtypeMismatch {
                    name: reg.name().to_string(),
                    expected: reg.dtype(),
                    got: soq.reg().dtype(),
                });
            }
            if !self.available.remove(soq) {
                return Err(BloqError::SoquetNotAvailable(soq.to_string()));
            }
            self.cxns.push(Connection::new(soq.clone(), right(idx)));
        }
        Ok(())
    }
}
