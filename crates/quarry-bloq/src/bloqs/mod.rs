//! Built-in bloqs.
//!
//! - Bookkeeping: [`Split`], [`Join`], [`Allocate`], [`Free`]
//! - Meta: [`Adjoint`], [`Power`]

mod adjoint;
mod bookkeeping;
mod power;

pub use adjoint::{Adjoint, adjoint_of};
pub use bookkeeping::{Allocate, Free, Join, Split};
pub use power::{MAX_UNROLLED_EXPONENT, Power};
