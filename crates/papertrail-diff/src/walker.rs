//! The change classification walker.
//!
//! Given one changed entry and the full change set of its unit of work, the
//! walker produces the complete, ordered list of property changes for that
//! entry. Traversal is depth-first over the entity's tracked fields in
//! declaration order; nested reference and collection changes flatten into
//! the same list.
//!
//! Reference cycles terminate via a per-walk visited set: an entry already
//! visited on the current walk is never re-entered.

use std::{collections::HashSet, future::Future, pin::Pin};

use papertrail_core::{
  EntityChange, EntityProperty, EntityPropertyChange, TrackableInfo,
};
use tracing::debug;

use crate::{
  Error, Result,
  entry::{ChangeEntry, ChangeSet, EntryId, EntryState},
  lookup::LookupResolver,
  registry::{FieldKind, TrackedField, TrackingRegistry},
};

/// Walks a change set, classifying every tracked change for one entry.
///
/// Borrows its registry and resolver; holds no state between walks, so two
/// walks over the same snapshot yield identical output.
pub struct ChangeWalker<'a, R: LookupResolver> {
  registry: &'a TrackingRegistry,
  resolver: &'a R,
}

impl<'a, R: LookupResolver> ChangeWalker<'a, R> {
  pub fn new(registry: &'a TrackingRegistry, resolver: &'a R) -> Self {
    Self { registry, resolver }
  }

  /// The complete, ordered list of property changes for `entry`.
  ///
  /// Entries whose type has no registered tracking metadata produce no
  /// changes. A resolver failure aborts the whole walk.
  pub async fn build_changes(
    &self,
    entry: EntryId,
    set: &ChangeSet,
  ) -> Result<Vec<EntityPropertyChange>> {
    let mut visited = HashSet::new();
    let mut changes = Vec::new();
    self.walk(entry, set, &mut visited, &mut changes).await?;
    Ok(changes)
  }

  /// Recursive step. Boxed because async recursion needs an indirection;
  /// the future is not `Send` (see the crate-level lint note).
  fn walk<'s>(
    &'s self,
    id: EntryId,
    set: &'s ChangeSet,
    visited: &'s mut HashSet<EntryId>,
    out: &'s mut Vec<EntityPropertyChange>,
  ) -> Pin<Box<dyn Future<Output = Result<()>> + 's>> {
    Box::pin(async move {
      if !visited.insert(id) {
        return Ok(());
      }
      let Some(entry) = set.entry(id) else {
        debug!(?id, "entry missing from change set, skipping");
        return Ok(());
      };
      let Some(descriptor) = self.registry.descriptor(&entry.entity_type)
      else {
        debug!(entity_type = %entry.entity_type, "no tracking metadata, skipping");
        return Ok(());
      };

      for field in descriptor.fields() {
        match &field.kind {
          FieldKind::Scalar { lookup } => {
            self
              .scalar_change(entry, field, lookup.as_deref(), out)
              .await?;
          }
          FieldKind::Reference { target_type } => {
            self
              .reference_change(
                entry,
                field,
                target_type,
                set,
                &mut *visited,
                &mut *out,
              )
              .await?;
          }
          FieldKind::Collection {
            target_type,
            foreign_key,
            parent_key,
          } => {
            self
              .collection_changes(
                entry,
                field,
                target_type,
                foreign_key.as_deref(),
                parent_key.as_deref(),
                set,
                &mut *visited,
                &mut *out,
              )
              .await?;
          }
        }
      }
      Ok(())
    })
  }

  // ── Scalars ───────────────────────────────────────────────────────────

  /// Emit a change when the value differs, or unconditionally for `Added`
  /// entries (a new entity has no prior state, so its initial values are
  /// the change).
  async fn scalar_change(
    &self,
    entry: &ChangeEntry,
    field: &TrackedField,
    lookup: Option<&str>,
    out: &mut Vec<EntityPropertyChange>,
  ) -> Result<()> {
    let Some(values) = entry.scalar_values(&field.name) else {
      return Ok(());
    };
    let original = values.original.as_deref().unwrap_or("");
    let current = values.current.as_deref().unwrap_or("");
    if original == current && entry.state != EntryState::Added {
      return Ok(());
    }

    // Audit text shows resolved labels for lookup fields; the emitted
    // values always carry the raw ids.
    let (old_label, new_label) = match lookup {
      Some(lookup_type) => (
        self.resolve(lookup_type, original).await?,
        self.resolve(lookup_type, current).await?,
      ),
      None => (original.to_string(), current.to_string()),
    };

    let description = match entry.state {
      EntryState::Added => {
        format!("{} set to '{new_label}'", field.friendly_name)
      }
      _ => format!(
        "{} changed from '{old_label}' to '{new_label}'",
        field.friendly_name
      ),
    };

    out.push(EntityPropertyChange::new(
      property_for(field),
      EntityChange::new(
        description,
        values.original.clone(),
        values.current.clone(),
      ),
    ));
    Ok(())
  }

  /// Resolve one lookup id, falling back to the raw id when no description
  /// exists.
  async fn resolve(&self, lookup_type: &str, key: &str) -> Result<String> {
    if key.is_empty() {
      return Ok(String::new());
    }
    let resolved = self
      .resolver
      .describe(lookup_type, key)
      .await
      .map_err(|e| Error::Lookup(Box::new(e)))?;
    Ok(resolved.unwrap_or_else(|| key.to_string()))
  }

  // ── References ────────────────────────────────────────────────────────

  #[allow(clippy::too_many_arguments)]
  async fn reference_change(
    &self,
    entry: &ChangeEntry,
    field: &TrackedField,
    target_type: &str,
    set: &ChangeSet,
    visited: &mut HashSet<EntryId>,
    out: &mut Vec<EntityPropertyChange>,
  ) -> Result<()> {
    match entry.reference_target(&field.name) {
      // Not loaded. The target may have been deleted out from under this
      // entity; scan the set for a deleted entry of the target type.
      None => {
        let deleted = set
          .iter()
          .any(|(_, e)| e.state == EntryState::Deleted && e.entity_type == target_type);
        if deleted {
          out.push(edge_change(field, "Removed"));
        }
      }
      Some(target_id) => {
        let Some(target) = set.entry(target_id) else {
          debug!(field = %field.name, "reference target missing, skipping");
          return Ok(());
        };
        match target.state {
          // The target is gone; there is nothing left to recurse into.
          EntryState::Deleted => out.push(edge_change(field, "Removed")),
          EntryState::Modified => {
            out.push(edge_change(field, "Modified"));
            self.walk(target_id, set, visited, out).await?;
          }
          EntryState::Added => {
            out.push(edge_change(field, "Added"));
            self.walk(target_id, set, visited, out).await?;
          }
          EntryState::Unchanged => {}
        }
      }
    }
    Ok(())
  }

  // ── Collections ───────────────────────────────────────────────────────

  #[allow(clippy::too_many_arguments)]
  async fn collection_changes(
    &self,
    entry: &ChangeEntry,
    field: &TrackedField,
    target_type: &str,
    foreign_key: Option<&str>,
    parent_key: Option<&str>,
    set: &ChangeSet,
    visited: &mut HashSet<EntryId>,
    out: &mut Vec<EntityPropertyChange>,
  ) -> Result<()> {
    for item_id in entry.collection_items(&field.name) {
      let Some(item) = set.entry(*item_id) else {
        debug!(field = %field.name, "collection item entry missing, skipping");
        continue;
      };
      match item.state {
        EntryState::Added => {
          let info = self.tracking_info(item);
          out.push(EntityPropertyChange::new(
            property_for(field),
            EntityChange::new(
              format!("Added {} - {}", field.friendly_name, info.description),
              None,
              Some(info.value),
            ),
          ));
          self.walk(*item_id, set, visited, out).await?;
        }
        // Nested field changes still surface; the collection edge itself
        // is not a change.
        EntryState::Modified | EntryState::Unchanged => {
          self.walk(*item_id, set, visited, out).await?;
        }
        // Deleted items are reported by the removed-child scan below, not
        // through the live collection.
        EntryState::Deleted => {}
      }
    }

    // Removed-child detection: a child taken out of the collection shows up
    // only as a deleted entry whose foreign key still points at this
    // entity.
    if let (Some(fk), Some(pk)) = (foreign_key, parent_key) {
      let Some(parent_key_value) = entry.key_value(pk) else {
        return Ok(());
      };
      for (_, candidate) in set.iter() {
        if candidate.state != EntryState::Deleted
          || candidate.entity_type != target_type
        {
          continue;
        }
        if candidate.key_value(fk) == Some(parent_key_value) {
          let info = self.tracking_info(candidate);
          out.push(EntityPropertyChange::new(
            property_for(field),
            EntityChange::new(
              format!("Removed {} - {}", field.friendly_name, info.description),
              Some(info.value),
              None,
            ),
          ));
        }
      }
    }
    Ok(())
  }

  // ── Tracking info ─────────────────────────────────────────────────────

  /// The (value, description) pair describing an entity instance: its own
  /// self-description when it has one, else its string form plus the
  /// declared identifier key, falling back to the description itself when
  /// no key is present.
  fn tracking_info(&self, entry: &ChangeEntry) -> TrackableInfo {
    if let Some(info) = &entry.described {
      return info.clone();
    }
    let description = entry.display.clone();
    let value = self
      .registry
      .descriptor(&entry.entity_type)
      .and_then(|d| entry.key_value(&d.id_field))
      .map(|k| k.to_string())
      .unwrap_or_else(|| description.clone());
    TrackableInfo { value, description }
  }
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn property_for(field: &TrackedField) -> EntityProperty {
  EntityProperty::new(&field.name, &field.ty)
    .with_friendly_name(&field.friendly_name)
}

/// A reference-edge change; the description alone communicates what
/// happened, so both values stay empty.
fn edge_change(field: &TrackedField, verb: &str) -> EntityPropertyChange {
  EntityPropertyChange::new(
    property_for(field),
    EntityChange::new(
      format!("{verb} {}", field.friendly_name),
      None,
      None,
    ),
  )
}
