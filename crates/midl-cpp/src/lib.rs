//! C++ backend for midl.
//!
//! Lowers a resolved library into the IR walked by the template emitters.
//! The same IR feeds both binding flavors: the ordinary owning bindings and
//! the low-level (llcpp) bindings, which substitute non-owning view types
//! and decide stack-vs-heap allocation per method.

pub mod error;
pub mod ir;
pub mod lower;
pub mod names;

pub use error::{LowerError, Result};
pub use lower::{lower, Options};
