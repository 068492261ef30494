//! Error types for `keeper-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unknown contact type: {0:?}")]
  UnknownContactType(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
