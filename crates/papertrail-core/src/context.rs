//! The ephemeral command context — captures one mutation's intent and
//! converts it into a persistable [`EntityHistory`].

use uuid::Uuid;

use crate::{
  events::UserCommandEvent,
  history::{CommandType, EntityHistory, EntityPropertyChange},
};

/// Implemented by entities that expose a stable identity for auditing.
pub trait Identified {
  fn guid(&self) -> Uuid;
}

/// Input to one audit write. Never persisted; it lives only between change
/// detection and the unit-of-work commit.
#[derive(Debug, Clone)]
pub struct HistoryCommandContext {
  /// Identifies the entity's type in the caller's type registry.
  pub entity_type_id: i32,
  pub entity_guid:    Uuid,
  pub command_type:   CommandType,
  /// Explicit acting user; `None` falls back to the ambient current user at
  /// conversion time.
  pub user_id:        Option<i32>,
  /// Pre-computed property changes, in detection order.
  pub changes:        Vec<EntityPropertyChange>,
  /// `false` means "refresh the entity's created/updated stamps only; write
  /// no audit row".
  pub store_event_records: bool,
}

impl HistoryCommandContext {
  pub fn for_entity(
    entity_type_id: i32,
    entity: &impl Identified,
    command_type: CommandType,
  ) -> Self {
    Self {
      entity_type_id,
      entity_guid: entity.guid(),
      command_type,
      user_id: None,
      changes: Vec::new(),
      store_event_records: true,
    }
  }

  /// Attribute the command to an explicit user instead of the ambient one.
  pub fn acting_user(mut self, user_id: i32) -> Self {
    self.user_id = Some(user_id);
    self
  }

  pub fn with_changes(mut self, changes: Vec<EntityPropertyChange>) -> Self {
    self.changes = changes;
    self
  }

  /// Refresh stamps only; suppress the audit row.
  pub fn events_only(mut self) -> Self {
    self.store_event_records = false;
    self
  }

  /// Convert into a persistable record.
  ///
  /// The event is stamped with the current time; the acting user is
  /// `self.user_id` when set, else `current_user_id`. Pre-computed changes
  /// are appended in input order, so the output always carries a valid
  /// timestamp and a (possibly empty) change list.
  pub fn to_entity_history(&self, current_user_id: i32) -> EntityHistory {
    let user_id = self.user_id.unwrap_or(current_user_id);
    let mut history = EntityHistory::new(
      self.entity_type_id,
      self.command_type,
      self.entity_guid,
      UserCommandEvent::new(user_id),
    );
    for pc in &self.changes {
      history.add_change(pc.property.clone(), pc.change.clone());
    }
    history
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;
  use crate::history::{EntityChange, EntityProperty};

  struct Order {
    guid: Uuid,
  }

  impl Identified for Order {
    fn guid(&self) -> Uuid {
      self.guid
    }
  }

  fn change(description: &str) -> EntityPropertyChange {
    EntityPropertyChange::new(
      EntityProperty::new("status", "string"),
      EntityChange::new(description, None, None),
    )
  }

  #[test]
  fn explicit_user_wins_over_current() {
    let order = Order { guid: Uuid::new_v4() };
    let ctx =
      HistoryCommandContext::for_entity(3, &order, CommandType::Updated)
        .acting_user(12);

    let history = ctx.to_entity_history(99);
    assert_eq!(history.event.user_id, 12);
  }

  #[test]
  fn unset_user_falls_back_to_current() {
    let order = Order { guid: Uuid::new_v4() };
    let ctx = HistoryCommandContext::for_entity(3, &order, CommandType::Added);

    let history = ctx.to_entity_history(99);
    assert_eq!(history.event.user_id, 99);
  }

  #[test]
  fn history_carries_identity_and_ordered_changes() {
    let order = Order { guid: Uuid::new_v4() };
    let ctx =
      HistoryCommandContext::for_entity(3, &order, CommandType::Updated)
        .with_changes(vec![change("first"), change("second")]);

    let history = ctx.to_entity_history(1);
    assert_eq!(history.entity_type_id, 3);
    assert_eq!(history.entity_guid, order.guid);
    assert_eq!(history.command_type, CommandType::Updated);

    let descriptions: Vec<_> = history
      .changes()
      .iter()
      .map(|pc| pc.change.description.as_str())
      .collect();
    assert_eq!(descriptions, vec!["first", "second"]);
  }

  #[test]
  fn empty_context_yields_empty_change_list() {
    let order = Order { guid: Uuid::new_v4() };
    let ctx =
      HistoryCommandContext::for_entity(3, &order, CommandType::Deleted);

    let history = ctx.to_entity_history(1);
    assert!(history.changes().is_empty());
  }

  #[test]
  fn events_only_suppresses_audit_row() {
    let order = Order { guid: Uuid::new_v4() };
    let ctx = HistoryCommandContext::for_entity(3, &order, CommandType::Added)
      .events_only();
    assert!(!ctx.store_event_records);
  }
}
