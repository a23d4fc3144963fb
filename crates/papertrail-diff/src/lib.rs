//! Change classification — the graph-diffing half of papertrail.
//!
//! Consumes a unit of work's change-set snapshot and produces the complete,
//! ordered list of property changes for one entry: scalar diffs, nested
//! reference and collection changes, lookup-value resolution, and
//! removed-child detection.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod entry;
pub mod error;
pub mod lookup;
pub mod registry;
pub mod walker;

pub use entry::{ChangeEntry, ChangeSet, Describable, EntryId, EntryState, KeyValue};
pub use error::{Error, Result};
pub use lookup::{LookupResolver, StaticLookup};
pub use registry::{EntityDescriptor, FieldKind, TrackedField, TrackingRegistry};
pub use walker::ChangeWalker;
