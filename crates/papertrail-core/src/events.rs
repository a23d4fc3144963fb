//! Who-did-what-when stamps, derived from history records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::history::{CommandType, EntityHistory};

/// Reserved user id for commands performed outside a request context
/// (scheduled jobs, migrations, seed data).
pub const SYSTEM_USER_ID: i32 = 1;

// ─── CommandDate ─────────────────────────────────────────────────────────────

/// A user id paired with a UTC timestamp, generic over the key type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandDate<K = i32> {
  pub user_id: K,
  pub date:    DateTime<Utc>,
}

impl CommandDate<i32> {
  pub fn new(user_id: i32) -> Self {
    Self {
      user_id,
      date: Utc::now(),
    }
  }

  /// A stamp attributed to the system user.
  pub fn system() -> Self {
    Self::new(SYSTEM_USER_ID)
  }
}

// ─── UserCommandEvent ────────────────────────────────────────────────────────

/// Records who performed a command, and when.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserCommandEvent {
  pub user_id:   i32,
  pub date:      DateTime<Utc>,
  /// Display name, when the calling layer has resolved the user.
  pub user_name: Option<String>,
}

impl UserCommandEvent {
  /// An event stamped with the current time.
  pub fn new(user_id: i32) -> Self {
    Self::at(user_id, Utc::now())
  }

  pub fn at(user_id: i32, date: DateTime<Utc>) -> Self {
    Self {
      user_id,
      date,
      user_name: None,
    }
  }
}

impl From<CommandDate> for UserCommandEvent {
  fn from(stamp: CommandDate) -> Self {
    Self::at(stamp.user_id, stamp.date)
  }
}

// ─── ChangeEvents ────────────────────────────────────────────────────────────

/// An entity's created/updated stamps. `None` means the stamp has never been
/// set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEvents {
  pub created: Option<UserCommandEvent>,
  pub updated: Option<UserCommandEvent>,
}

impl ChangeEvents {
  /// Both stamps empty.
  pub fn empty() -> Self {
    Self::default()
  }

  /// The post-mutation stamps for the entity whose mutation `history`
  /// records.
  ///
  /// `created` is set only by an `Added` transition and survives every later
  /// `Updated`/`Deleted` transition unchanged. Pure: neither `self` nor
  /// `history` is touched.
  pub fn transition(&self, history: &EntityHistory) -> ChangeEvents {
    let fresh = UserCommandEvent::at(history.event.user_id, history.event.date);
    match history.command_type {
      CommandType::Added => ChangeEvents {
        created: Some(fresh.clone()),
        updated: Some(fresh),
      },
      CommandType::Updated | CommandType::Deleted => ChangeEvents {
        created: self.created.clone(),
        updated: Some(fresh),
      },
    }
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use chrono::TimeZone;
  use uuid::Uuid;

  use super::*;

  fn history_for(
    command_type: CommandType,
    user_id: i32,
    date: DateTime<Utc>,
  ) -> EntityHistory {
    EntityHistory::new(
      1,
      command_type,
      Uuid::new_v4(),
      UserCommandEvent::at(user_id, date),
    )
  }

  fn date(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
  }

  #[test]
  fn added_sets_both_stamps() {
    let prior = ChangeEvents {
      created: Some(UserCommandEvent::at(3, date(2020, 1, 1))),
      updated: Some(UserCommandEvent::at(3, date(2020, 1, 1))),
    };
    let history = history_for(CommandType::Added, 9, date(2025, 3, 1));

    let next = prior.transition(&history);
    let expected = Some(UserCommandEvent::at(9, date(2025, 3, 1)));
    assert_eq!(next.created, expected);
    assert_eq!(next.updated, expected);
  }

  #[test]
  fn updated_preserves_created() {
    let prior = ChangeEvents {
      created: Some(UserCommandEvent::at(5, date(2024, 1, 1))),
      updated: None,
    };
    let history = history_for(CommandType::Updated, 7, date(2024, 6, 1));

    let next = prior.transition(&history);
    assert_eq!(next.created, Some(UserCommandEvent::at(5, date(2024, 1, 1))));
    assert_eq!(next.updated, Some(UserCommandEvent::at(7, date(2024, 6, 1))));
  }

  #[test]
  fn deleted_preserves_created() {
    let prior = ChangeEvents {
      created: Some(UserCommandEvent::at(5, date(2024, 1, 1))),
      updated: Some(UserCommandEvent::at(5, date(2024, 1, 1))),
    };
    let history = history_for(CommandType::Deleted, 8, date(2024, 9, 9));

    let next = prior.transition(&history);
    assert_eq!(next.created, prior.created);
    assert_eq!(next.updated, Some(UserCommandEvent::at(8, date(2024, 9, 9))));
  }

  #[test]
  fn transition_from_empty_update_leaves_created_unset() {
    let history = history_for(CommandType::Updated, 2, date(2024, 2, 2));
    let next = ChangeEvents::empty().transition(&history);
    assert_eq!(next.created, None);
    assert!(next.updated.is_some());
  }

  #[test]
  fn transition_is_pure() {
    let prior = ChangeEvents {
      created: Some(UserCommandEvent::at(5, date(2024, 1, 1))),
      updated: None,
    };
    let history = history_for(CommandType::Updated, 7, date(2024, 6, 1));

    let a = prior.transition(&history);
    let b = prior.transition(&history);
    assert_eq!(a, b);
    // The input is untouched.
    assert_eq!(prior.updated, None);
  }

  #[test]
  fn system_stamp_uses_reserved_user() {
    let stamp = CommandDate::system();
    assert_eq!(stamp.user_id, SYSTEM_USER_ID);

    let event: UserCommandEvent = stamp.into();
    assert_eq!(event.user_id, SYSTEM_USER_ID);
    assert_eq!(event.date, stamp.date);
  }
}
