//! Resolved midl AST and shared helpers consumed by the backend lowerings.
//!
//! The frontend resolves names, assigns ordinals, and computes every layout
//! fact (offsets, sizes, handle and out-of-line bounds) before handing its
//! output to a backend as JSON. This crate is the typed view of that output;
//! backends trust the numbers in it as already correct.

pub mod ast;
pub mod error;
pub mod names;

pub use error::{Error, Result};
