//! Core types for the papertrail audit-history engine.
//!
//! This crate is deliberately free of change-tracking and storage
//! dependencies. `papertrail-diff` and any audit-store backend depend on it;
//! it depends on nothing proprietary.

pub mod context;
pub mod events;
pub mod history;
pub mod store;

pub use context::{HistoryCommandContext, Identified};
pub use events::{ChangeEvents, CommandDate, SYSTEM_USER_ID, UserCommandEvent};
pub use history::{
  CommandType, EntityChange, EntityHistory, EntityProperty,
  EntityPropertyChange, TrackableInfo,
};
