//! The resolved AST of one library, as decoded from the frontend's JSON
//! output.
//!
//! Every kind-tagged node is a closed enum, so a backend matching on it is
//! forced to handle each case; an unknown kind in the JSON is rejected at
//! decode time instead of reaching a lowering with a silent default.

mod decl;
mod ident;
mod root;
mod ty;

pub use decl::*;
pub use ident::*;
pub use root::*;
pub use ty::*;
