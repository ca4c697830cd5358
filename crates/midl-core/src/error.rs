use std::result;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("failed to decode frontend output: {0}")]
    Json(#[from] serde_json::Error),
    #[error("malformed identifier: {0}")]
    MalformedIdentifier(String),
    #[error("generic error: {0}")]
    Generic(String),
}

pub type Result<T> = result::Result<T, Error>;

impl From<eyre::Report> for Error {
    fn from(err: eyre::Report) -> Self {
        Error::Generic(err.to_string())
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Generic(s)
    }
}
