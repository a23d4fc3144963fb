//! Change-set snapshot types.
//!
//! The external change-tracking collaborator materialises its pending
//! mutations into a [`ChangeSet`] of [`ChangeEntry`] values before the walk
//! starts. The walker reads the snapshot only; it never touches live
//! persistence handles.

use std::collections::BTreeMap;

use papertrail_core::TrackableInfo;
use uuid::Uuid;

// ─── State and identity ──────────────────────────────────────────────────────

/// Lifecycle state of one entry within its unit of work.
///
/// A closed set; walker code matches it exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum EntryState {
  Unchanged,
  Modified,
  Added,
  Deleted,
}

/// Index of an entry within its [`ChangeSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId(pub(crate) usize);

/// A key field value, used for removed-child detection and identifier
/// defaulting. Int keys are the common case; long keys cover high-volume
/// tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyValue {
  Int(i32),
  Long(i64),
}

impl std::fmt::Display for KeyValue {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Int(v) => write!(f, "{v}"),
      Self::Long(v) => write!(f, "{v}"),
    }
  }
}

// ─── Self-description ────────────────────────────────────────────────────────

/// Implemented by entities that can describe themselves for audit text.
///
/// Entities without this capability fall back to their string form plus
/// declared identifier field (see the walker's tracking-info resolution).
pub trait Describable {
  fn describe(&self) -> TrackableInfo;
}

// ─── ChangeEntry ─────────────────────────────────────────────────────────────

/// Before/after values of one scalar field, as strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScalarValues {
  pub original: Option<String>,
  pub current:  Option<String>,
}

/// One entity's snapshot within a unit of work.
///
/// Field maps are keyed by field name; which fields the walker actually
/// visits (and in what order) is decided by the entity type's
/// [`EntityDescriptor`](crate::registry::EntityDescriptor), not by the
/// snapshot.
#[derive(Debug, Clone)]
pub struct ChangeEntry {
  /// Registry type name.
  pub entity_type: String,
  pub guid:        Uuid,
  pub state:       EntryState,
  /// The entity's string form; the default description when the entity is
  /// not self-describing.
  pub display:     String,
  /// Output of the entity's [`Describable`] capability, when implemented.
  pub described:   Option<TrackableInfo>,
  scalars:     BTreeMap<String, ScalarValues>,
  references:  BTreeMap<String, Option<EntryId>>,
  collections: BTreeMap<String, Vec<EntryId>>,
  keys:        BTreeMap<String, KeyValue>,
}

impl ChangeEntry {
  pub fn new(entity_type: &str, guid: Uuid, state: EntryState) -> Self {
    Self {
      entity_type: entity_type.into(),
      guid,
      state,
      display: entity_type.into(),
      described: None,
      scalars: BTreeMap::new(),
      references: BTreeMap::new(),
      collections: BTreeMap::new(),
      keys: BTreeMap::new(),
    }
  }

  /// Set the entity's string form.
  pub fn display(mut self, display: &str) -> Self {
    self.display = display.into();
    self
  }

  /// Record the output of the entity's [`Describable`] capability.
  pub fn described_by(mut self, entity: &impl Describable) -> Self {
    self.described = Some(entity.describe());
    self
  }

  pub fn scalar(
    mut self,
    name: &str,
    original: Option<&str>,
    current: Option<&str>,
  ) -> Self {
    self.scalars.insert(name.into(), ScalarValues {
      original: original.map(Into::into),
      current:  current.map(Into::into),
    });
    self
  }

  /// Record a reference field; `None` means no related entry is loaded.
  pub fn reference(mut self, name: &str, target: Option<EntryId>) -> Self {
    self.references.insert(name.into(), target);
    self
  }

  pub fn collection(mut self, name: &str, items: Vec<EntryId>) -> Self {
    self.collections.insert(name.into(), items);
    self
  }

  pub fn key(mut self, name: &str, value: KeyValue) -> Self {
    self.keys.insert(name.into(), value);
    self
  }

  /// Re-point a reference after construction. Needed when two entries refer
  /// to each other, since ids are minted on push.
  pub fn set_reference(&mut self, name: &str, target: Option<EntryId>) {
    self.references.insert(name.into(), target);
  }

  // ── Read side (walker) ────────────────────────────────────────────────

  pub fn scalar_values(&self, name: &str) -> Option<&ScalarValues> {
    self.scalars.get(name)
  }

  /// The loaded target of a reference field. `None` covers both "field not
  /// in the snapshot" and "no related entry loaded".
  pub fn reference_target(&self, name: &str) -> Option<EntryId> {
    self.references.get(name).copied().flatten()
  }

  pub fn collection_items(&self, name: &str) -> &[EntryId] {
    self.collections.get(name).map(Vec::as_slice).unwrap_or(&[])
  }

  pub fn key_value(&self, name: &str) -> Option<KeyValue> {
    self.keys.get(name).copied()
  }
}

// ─── ChangeSet ───────────────────────────────────────────────────────────────

/// The full set of entries mutated in one unit of work.
///
/// Private to that unit of work; iteration order is insertion order, so walk
/// output is deterministic.
#[derive(Debug, Clone, Default)]
pub struct ChangeSet {
  entries: Vec<ChangeEntry>,
}

impl ChangeSet {
  pub fn new() -> Self {
    Self::default()
  }

  /// Add an entry, minting its id.
  pub fn push(&mut self, entry: ChangeEntry) -> EntryId {
    self.entries.push(entry);
    EntryId(self.entries.len() - 1)
  }

  pub fn entry(&self, id: EntryId) -> Option<&ChangeEntry> {
    self.entries.get(id.0)
  }

  pub fn entry_mut(&mut self, id: EntryId) -> Option<&mut ChangeEntry> {
    self.entries.get_mut(id.0)
  }

  pub fn iter(&self) -> impl Iterator<Item = (EntryId, &ChangeEntry)> {
    self.entries.iter().enumerate().map(|(i, e)| (EntryId(i), e))
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn push_mints_sequential_ids() {
    let mut set = ChangeSet::new();
    let a = set.push(ChangeEntry::new("Order", Uuid::new_v4(), EntryState::Added));
    let b = set.push(ChangeEntry::new("Item", Uuid::new_v4(), EntryState::Added));
    assert_ne!(a, b);
    assert_eq!(set.entry(a).unwrap().entity_type, "Order");
    assert_eq!(set.entry(b).unwrap().entity_type, "Item");
  }

  #[test]
  fn reference_target_flattens_unloaded() {
    let entry = ChangeEntry::new("Order", Uuid::new_v4(), EntryState::Modified)
      .reference("customer", None);
    assert_eq!(entry.reference_target("customer"), None);
    assert_eq!(entry.reference_target("missing"), None);
  }

  #[test]
  fn described_by_captures_trackable_info() {
    struct Status;
    impl Describable for Status {
      fn describe(&self) -> TrackableInfo {
        TrackableInfo::new("4", "Shipped")
      }
    }

    let entry = ChangeEntry::new("Status", Uuid::new_v4(), EntryState::Added)
      .described_by(&Status);
    assert_eq!(entry.described, Some(TrackableInfo::new("4", "Shipped")));
  }

  #[test]
  fn key_value_renders_int_and_long() {
    assert_eq!(KeyValue::Int(7).to_string(), "7");
    assert_eq!(KeyValue::Long(9_000_000_000).to_string(), "9000000000");
  }
}
