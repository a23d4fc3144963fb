//! History record types — the fundamental unit of the audit trail.
//!
//! An [`EntityHistory`] records one entity mutation. It is constructed once
//! per detected change, accumulates [`EntityPropertyChange`] rows until the
//! owning unit of work commits, and is never mutated afterwards. The store
//! persists it as a classic header/detail pair: one history row, many change
//! rows.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::events::UserCommandEvent;

// ─── Command type ────────────────────────────────────────────────────────────

/// The kind of mutation being audited.
///
/// A closed set: code that branches on this type matches exhaustively, so an
/// out-of-range value is unrepresentable rather than a runtime error.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum CommandType {
  Added,
  Updated,
  Deleted,
}

// ─── Property / change pair ──────────────────────────────────────────────────

/// Identifies one trackable field of an entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityProperty {
  /// Field identifier, unique within its entity type.
  pub name:          String,
  /// Declared scalar type label (e.g. `"string"`, `"int"`), or the target
  /// type name for references and collections.
  pub ty:            String,
  /// Display label; defaults to `name`.
  pub friendly_name: String,
}

impl EntityProperty {
  pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
    let name = name.into();
    Self {
      friendly_name: name.clone(),
      name,
      ty: ty.into(),
    }
  }

  pub fn with_friendly_name(mut self, friendly: impl Into<String>) -> Self {
    self.friendly_name = friendly.into();
    self
  }
}

/// One detected difference on a trackable field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityChange {
  /// Human-readable summary, e.g. `"Status changed from 'Open' to
  /// 'Closed'"`. For lookup fields this carries resolved labels; the raw
  /// ids stay in `old_value`/`new_value`.
  pub description: String,
  pub old_value:   Option<String>,
  pub new_value:   Option<String>,
}

impl EntityChange {
  /// Empty strings collapse to `None` so "no value" has a single spelling.
  pub fn new(
    description: impl Into<String>,
    old_value: Option<String>,
    new_value: Option<String>,
  ) -> Self {
    Self {
      description: description.into(),
      old_value:   old_value.filter(|v| !v.is_empty()),
      new_value:   new_value.filter(|v| !v.is_empty()),
    }
  }
}

/// A trackable field paired with the change detected on it. Both members are
/// required by construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityPropertyChange {
  pub property: EntityProperty,
  pub change:   EntityChange,
}

impl EntityPropertyChange {
  pub fn new(property: EntityProperty, change: EntityChange) -> Self {
    Self { property, change }
  }
}

// ─── Trackable info ──────────────────────────────────────────────────────────

/// A stable identifier plus a human label for one entity instance; used to
/// describe added and removed related entities in change text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackableInfo {
  pub value:       String,
  pub description: String,
}

impl TrackableInfo {
  pub fn new(
    value: impl Into<String>,
    description: impl Into<String>,
  ) -> Self {
    Self {
      value:       value.into(),
      description: description.into(),
    }
  }
}

// ─── EntityHistory ───────────────────────────────────────────────────────────

/// The audit record for one entity mutation.
///
/// Changes are appended via [`add_change`](Self::add_change) in detection
/// order and exposed read-only; once the record is persisted it is never
/// touched again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityHistory {
  /// Identifies the entity's type in the caller's type registry.
  pub entity_type_id: i32,
  /// Stable identity of the specific entity instance.
  pub entity_guid:    Uuid,
  pub command_type:   CommandType,
  /// Who performed the mutation, and when.
  pub event:          UserCommandEvent,
  changes:            Vec<EntityPropertyChange>,
}

impl EntityHistory {
  pub fn new(
    entity_type_id: i32,
    command_type: CommandType,
    entity_guid: Uuid,
    event: UserCommandEvent,
  ) -> Self {
    Self {
      entity_type_id,
      entity_guid,
      command_type,
      event,
      changes: Vec::new(),
    }
  }

  /// Append one property change. Input order is preserved.
  pub fn add_change(&mut self, property: EntityProperty, change: EntityChange) {
    self.changes.push(EntityPropertyChange::new(property, change));
  }

  pub fn changes(&self) -> &[EntityPropertyChange] {
    &self.changes
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
