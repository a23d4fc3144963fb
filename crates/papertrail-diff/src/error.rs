//! Error types for `papertrail-diff`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("entity type already registered: {0}")]
  DuplicateEntityType(String),

  #[error("lookup resolution failed: {0}")]
  Lookup(#[source] Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
