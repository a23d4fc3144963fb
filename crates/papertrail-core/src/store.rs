//! The `HistoryStore` trait — the boundary to the external audit store.
//!
//! The trait is implemented by storage backends; this crate ships no backend
//! of its own. Writes are append-only: a record, once appended, is never
//! updated or deleted.

use std::future::Future;

use uuid::Uuid;

use crate::history::EntityHistory;

/// Abstraction over an append-only audit store.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes.
pub trait HistoryStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Append one audit record.
  fn append(
    &self,
    history: EntityHistory,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// All records for one entity, oldest first.
  fn for_entity(
    &self,
    guid: Uuid,
  ) -> impl Future<Output = Result<Vec<EntityHistory>, Self::Error>> + Send + '_;

  /// The most recent record for one entity, if any.
  fn latest(
    &self,
    guid: Uuid,
  ) -> impl Future<Output = Result<Option<EntityHistory>, Self::Error>> + Send + '_;
}

// ─── Tests ───────────────────────────────────────────────────────────────────
