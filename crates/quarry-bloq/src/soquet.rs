//! Soquets: the wire endpoints of a composite bloq.
//!
//! A [`Soquet`] names one element of one register on one node of the graph.
//! Nodes are either a [`BloqInstance`] or one of the two dangling boundary
//! nodes that stand for the composite's own inputs and outputs.

use std::fmt;
use std::hash::{Hash, Hasher};

use indexmap::IndexMap;
use ndarray::{Array1, ArrayD, IxDyn};

use crate::bloq::BloqRef;
use crate::error::{BloqError, BloqResult};
use crate::register::Register;

/// A bloq placed in a composite, identified by its instance number.
#[derive(Debug, Clone)]
pub struct BloqInstance {
    i: usize,
    bloq: BloqRef,
}

impl BloqInstance {
    /// Place `bloq` as instance number `i`.
    pub fn new(i: usize, bloq: BloqRef) -> Self {
        Self { i, bloq }
    }

    /// Instance number, unique within one composite.
    pub fn i(&self) -> usize {
        self.i
    }

    /// The placed bloq.
    pub fn bloq(&self) -> &BloqRef {
        &self.bloq
    }
}

impl PartialEq for BloqInstance {
    fn eq(&self, other: &Self) -> bool {
        self.i == other.i && PartialEq::eq(&self.bloq, &other.bloq)
    }
}

impl Eq for BloqInstance {}

impl Hash for BloqInstance {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.i.hash(state);
    }
}

impl fmt::Display for BloqInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}<{}>", self.bloq, self.i)
    }
}

/// A node of the composite graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Binst {
    /// The composite's inputs.
    LeftDangle,
    /// The composite's outputs.
    RightDangle,
    /// A placed bloq.
    Instance(BloqInstance),
}

impl Binst {
    /// The bloq instance, unless this is a boundary node.
    pub fn instance(&self) -> Option<&BloqInstance> {
        match self {
            Binst::Instance(binst) => Some(binst),
            _ => None,
        }
    }
}

impl fmt::Display for Binst {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Binst::LeftDangle => write!(f, "LeftDangle"),
            Binst::RightDangle => write!(f, "RightDangle"),
            Binst::Instance(binst) => write!(f, "{binst}"),
        }
    }
}

/// One element of one register on one node.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Soquet {
    binst: Binst,
    reg: Register,
    idx: Vec<usize>,
}

impl Soquet {
    /// Create a soquet.
    pub fn new(binst: Binst, reg: Register, idx: Vec<usize>) -> Self {
        Self { binst, reg, idx }
    }

    /// The node.
    pub fn binst(&self) -> &Binst {
        &self.binst
    }

    /// The register.
    pub fn reg(&self) -> &Register {
        &self.reg
    }

    /// Index into the register's shape; empty for scalar registers.
    pub fn idx(&self) -> &[usize] {
        &self.idx
    }

    /// Register name with index, e.g. `x[0, 1]`.
    pub fn pretty(&self) -> String {
        if self.idx.is_empty() {
            self.reg.name().to_string()
        } else {
            let parts: Vec<String> = self.idx.iter().map(ToString::to_string).collect();
            format!("{}[{}]", self.reg.name(), parts.join(", "))
        }
    }
}

impl fmt::Display for Soquet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.binst, self.pretty())
    }
}

/// A directed wire from an output soquet to an input soquet.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Connection {
    left: Soquet,
    right: Soquet,
}

impl Connection {
    /// Wire `left` (producer) into `right` (consumer).
    pub fn new(left: Soquet, right: Soquet) -> Self {
        Self { left, right }
    }

    /// The producing end.
    pub fn left(&self) -> &Soquet {
        &self.left
    }

    /// The consuming end.
    pub fn right(&self) -> &Soquet {
        &self.right
    }
}

impl fmt::Display for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.left, self.right)
    }
}

/// Soquets of one register, shaped like the register.
pub type SoqArray = ArrayD<Soquet>;

/// A 0-dimensional array holding one soquet.
pub fn soq_scalar(soq: Soquet) -> SoqArray {
    ArrayD::from_elem(IxDyn(&[]), soq)
}

/// A 1-dimensional array of soquets.
pub fn soq_vec(soqs: Vec<Soquet>) -> SoqArray {
    Array1::from(soqs).into_dyn()
}

/// Soquet arrays keyed by register name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Soquets(IndexMap<String, SoqArray>);

impl Soquets {
    /// Empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a scalar soquet.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, soq: Soquet) -> Self {
        self.insert(name, soq_scalar(soq));
        self
    }

    /// Add a soquet array.
    #[must_use]
    pub fn with_array(mut self, name: impl Into<String>, soqs: SoqArray) -> Self {
        self.insert(name, soqs);
        self
    }

    /// Insert or replace the array for `name`.
    pub fn insert(&mut self, name: impl Into<String>, soqs: SoqArray) {
        self.0.insert(name.into(), soqs);
    }

    /// The array for `name`.
    pub fn get(&self, name: &str) -> Option<&SoqArray> {
        self.0.get(name)
    }

    /// Remove and return the array for `name`.
    pub fn take(&mut self, name: &str) -> Option<SoqArray> {
        self.0.shift_remove(name)
    }

    /// The single soquet of the scalar register `name`.
    pub fn single(&self, name: &str) -> BloqResult<Soquet> {
        let missing = || BloqError::MissingRegister {
            bloq: "soquet map".to_string(),
            name: name.to_string(),
        };
        let arr = self.get(name).ok_or_else(missing)?;
        if arr.ndim() != 0 {
            return Err(BloqError::ShapeMismatch {
                name: name.to_string(),
                expected: Vec::new(),
                got: arr.shape().to_vec(),
            });
        }
        arr.iter().next().cloned().ok_or_else(missing)
    }

    /// Register names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.0.keys().map(String::as_str)
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SoqArray)> + '_ {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of registers.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the map is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl IntoIterator for Soquets {
    type Item = (String, SoqArray);
    type IntoIter = indexmap::map::IntoIter<String, SoqArray>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
