//! Lookup-value resolution — id → human-readable description.
//!
//! The resolver is passed into the walker explicitly (no process-wide
//! cache), so concurrent units of work never share mutable state and tests
//! are deterministic.

use std::{collections::HashMap, convert::Infallible};

/// Resolves a lookup id to its description.
///
/// `Ok(None)` means the lookup row legitimately does not exist (e.g. it was
/// deleted since); the walker falls back to the raw id. `Err` is fatal and
/// aborts the walk. Implementations may query the underlying store; the
/// walk suspends at each call site, and emission order does not depend on
/// resolution latency.
pub trait LookupResolver: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  async fn describe(
    &self,
    lookup_type: &str,
    key: &str,
  ) -> Result<Option<String>, Self::Error>;
}

/// Map-backed resolver, suitable for small fixed lookup tables and for
/// tests.
#[derive(Debug, Clone, Default)]
pub struct StaticLookup {
  entries: HashMap<(String, String), String>,
}

impl StaticLookup {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with(
    mut self,
    lookup_type: &str,
    key: &str,
    description: &str,
  ) -> Self {
    self
      .entries
      .insert((lookup_type.into(), key.into()), description.into());
    self
  }
}

impl LookupResolver for StaticLookup {
  type Error = Infallible;

  async fn describe(
    &self,
    lookup_type: &str,
    key: &str,
  ) -> Result<Option<String>, Infallible> {
    Ok(
      self
        .entries
        .get(&(lookup_type.to_string(), key.to_string()))
        .cloned(),
    )
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn static_lookup_resolves_and_misses() {
    let lookup = StaticLookup::new().with("OrderStatus", "2", "Shipped");

    let hit = lookup.describe("OrderStatus", "2").await.unwrap();
    assert_eq!(hit.as_deref(), Some("Shipped"));

    let miss = lookup.describe("OrderStatus", "9").await.unwrap();
    assert_eq!(miss, None);

    let wrong_type = lookup.describe("Carrier", "2").await.unwrap();
    assert_eq!(wrong_type, None);
  }
}
