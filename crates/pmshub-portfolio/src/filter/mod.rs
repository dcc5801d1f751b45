//! Filter specifications.
//!
//! A [`FilterSpec`] is an AND of [`Predicate`]s, each testing one
//! [`FilterField`] with equals, one-of or an inclusive range. Text compares
//! case-insensitively after trimming. Specs are validated and canonicalized
//! when built, so evaluation itself cannot fail.

mod field;
mod predicate;
mod spec;
mod value;

pub use field::FilterField;
pub use predicate::{FilterOp, Predicate};
pub use spec::FilterSpec;
pub use value::{FilterValue, ValueKind};
