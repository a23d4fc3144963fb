//! Statically-declared tracking metadata.
//!
//! Which fields of an entity type participate in auditing is declared once,
//! at startup, as an explicit table — there is no runtime type inspection.
//! Declaration order is traversal order, so registration order decides the
//! order of emitted changes.

use std::collections::HashMap;

use crate::{Error, Result};

// ─── Field descriptors ───────────────────────────────────────────────────────

/// How a tracked field participates in change classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
  /// Plain value compared original-vs-current. `lookup` names the lookup
  /// type when the raw value is an id whose description must be resolved
  /// for audit text.
  Scalar { lookup: Option<String> },

  /// Reference to a single related entity.
  Reference { target_type: String },

  /// Child collection. Removed-child detection runs only when both key
  /// names are declared: `foreign_key` is read from deleted candidates,
  /// `parent_key` from the owning entity.
  Collection {
    target_type: String,
    foreign_key: Option<String>,
    parent_key:  Option<String>,
  },
}

/// One field's audit metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedField {
  pub name:          String,
  /// Scalar type label, or the target type name for references and
  /// collections.
  pub ty:            String,
  pub friendly_name: String,
  pub kind:          FieldKind,
}

// ─── EntityDescriptor ────────────────────────────────────────────────────────

/// Tracking metadata for one entity type.
#[derive(Debug, Clone)]
pub struct EntityDescriptor {
  pub type_name: String,
  /// Key field consulted when defaulting an entity's tracking-info value.
  pub id_field:  String,
  fields:        Vec<TrackedField>,
}

impl EntityDescriptor {
  pub fn new(type_name: &str, id_field: &str) -> Self {
    Self {
      type_name: type_name.into(),
      id_field:  id_field.into(),
      fields:    Vec::new(),
    }
  }

  pub fn scalar(self, name: &str, ty: &str, friendly_name: &str) -> Self {
    self.field(name, ty, friendly_name, FieldKind::Scalar { lookup: None })
  }

  /// A scalar whose raw value is an id into `lookup_type`; audit text shows
  /// the resolved description instead of the id.
  pub fn lookup(
    self,
    name: &str,
    ty: &str,
    friendly_name: &str,
    lookup_type: &str,
  ) -> Self {
    self.field(name, ty, friendly_name, FieldKind::Scalar {
      lookup: Some(lookup_type.into()),
    })
  }

  pub fn reference(
    self,
    name: &str,
    friendly_name: &str,
    target_type: &str,
  ) -> Self {
    self.field(name, target_type, friendly_name, FieldKind::Reference {
      target_type: target_type.into(),
    })
  }

  /// A child collection without removed-child detection.
  pub fn collection(
    self,
    name: &str,
    friendly_name: &str,
    target_type: &str,
  ) -> Self {
    self.field(name, target_type, friendly_name, FieldKind::Collection {
      target_type: target_type.into(),
      foreign_key: None,
      parent_key:  None,
    })
  }

  /// A child collection with removed-child detection over the given key
  /// pair.
  pub fn keyed_collection(
    self,
    name: &str,
    friendly_name: &str,
    target_type: &str,
    foreign_key: &str,
    parent_key: &str,
  ) -> Self {
    self.field(name, target_type, friendly_name, FieldKind::Collection {
      target_type: target_type.into(),
      foreign_key: Some(foreign_key.into()),
      parent_key:  Some(parent_key.into()),
    })
  }

  fn field(
    mut self,
    name: &str,
    ty: &str,
    friendly_name: &str,
    kind: FieldKind,
  ) -> Self {
    self.fields.push(TrackedField {
      name: name.into(),
      ty: ty.into(),
      friendly_name: friendly_name.into(),
      kind,
    });
    self
  }

  pub fn fields(&self) -> &[TrackedField] {
    &self.fields
  }
}

// ─── TrackingRegistry ────────────────────────────────────────────────────────

/// `type name → EntityDescriptor`, built once at startup and shared
/// read-only with every walker.
#[derive(Debug, Clone, Default)]
pub struct TrackingRegistry {
  descriptors: HashMap<String, EntityDescriptor>,
}

impl TrackingRegistry {
  pub fn new() -> Self {
    Self::default()
  }

  /// Register one entity type. Registering the same type twice is a
  /// configuration error.
  pub fn register(&mut self, descriptor: EntityDescriptor) -> Result<()> {
    if self.descriptors.contains_key(&descriptor.type_name) {
      return Err(Error::DuplicateEntityType(descriptor.type_name));
    }
    self
      .descriptors
      .insert(descriptor.type_name.clone(), descriptor);
    Ok(())
  }

  /// `None` means the type is not tracked; the walker skips it silently.
  pub fn descriptor(&self, type_name: &str) -> Option<&EntityDescriptor> {
    self.descriptors.get(type_name)
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn declaration_order_is_preserved() {
    let d = EntityDescriptor::new("Order", "order_id")
      .scalar("number", "string", "Number")
      .lookup("status_id", "int", "Status", "OrderStatus")
      .reference("customer", "Customer", "Customer")
      .keyed_collection("lines", "Lines", "OrderLine", "order_id", "order_id");

    let names: Vec<_> = d.fields().iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["number", "status_id", "customer", "lines"]);
  }

  #[test]
  fn duplicate_registration_is_rejected() {
    let mut registry = TrackingRegistry::new();
    registry
      .register(EntityDescriptor::new("Order", "order_id"))
      .unwrap();

    let err = registry
      .register(EntityDescriptor::new("Order", "order_id"))
      .unwrap_err();
    assert!(matches!(err, Error::DuplicateEntityType(t) if t == "Order"));
  }

  #[test]
  fn unknown_type_is_untracked() {
    let registry = TrackingRegistry::new();
    assert!(registry.descriptor("Ghost").is_none());
  }
}
