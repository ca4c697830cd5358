use midl_core::ast::EncodedCompoundIdentifier;
use thiserror::Error;

/// Fatal lowering failures.
///
/// Every variant signals an inconsistency between the frontend's output and
/// this backend, never a recoverable condition: the pass aborts on the first
/// one rather than emit IR carrying a wrong layout fact.
#[derive(Debug, Error)]
pub enum LowerError {
    #[error("unresolved identifier `{0}`")]
    UnresolvedIdentifier(EncodedCompoundIdentifier),
    #[error("declaration order names unknown declaration `{0}`")]
    UnknownDeclaration(EncodedCompoundIdentifier),
    #[error("table member at ordinal {0} is not reserved but carries no type or name")]
    MalformedTableMember(u32),
    #[error("{0}")]
    Generic(String),
}

pub type Result<T> = std::result::Result<T, LowerError>;

impl From<eyre::Report> for LowerError {
    fn from(err: eyre::Report) -> Self {
        LowerError::Generic(err.to_string())
    }
}
