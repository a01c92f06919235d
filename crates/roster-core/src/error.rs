//! Error types for `roster-core`.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::schema::Channel;

// ─── Violations ──────────────────────────────────────────────────────────────

/// Machine-readable classification of a single field violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ViolationKind {
  MissingField,
  LengthOutOfRange,
  ValueOutOfRange,
  InvalidEnumValue,
  InvalidFormat,
  DateNotInPast,
  TypeCoercionError,
}

impl ViolationKind {
  pub fn as_str(&self) -> &'static str {
    match self {
      ViolationKind::MissingField => "MissingField",
      ViolationKind::LengthOutOfRange => "LengthOutOfRange",
      ViolationKind::ValueOutOfRange => "ValueOutOfRange",
      ViolationKind::InvalidEnumValue => "InvalidEnumValue",
      ViolationKind::InvalidFormat => "InvalidFormat",
      ViolationKind::DateNotInPast => "DateNotInPast",
      ViolationKind::TypeCoercionError => "TypeCoercionError",
    }
  }
}

impl fmt::Display for ViolationKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// One field that failed binding.
///
/// `field` is the dotted path from the bound schema's root, e.g. `person.age`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
  pub field:          String,
  pub channel:        Channel,
  pub violation_kind: ViolationKind,
  pub message:        String,
}

/// Every violation found while binding one schema, in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(pub Vec<Violation>);

impl ValidationErrors {
  pub fn is_empty(&self) -> bool { self.0.is_empty() }

  pub fn len(&self) -> usize { self.0.len() }

  pub fn iter(&self) -> impl Iterator<Item = &Violation> { self.0.iter() }

  /// The first violation recorded against `field`, if any.
  pub fn for_field(&self, field: &str) -> Option<&Violation> {
    self.0.iter().find(|v| v.field == field)
  }
}

impl fmt::Display for ValidationErrors {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} validation error(s)", self.0.len())?;
    for v in &self.0 {
      write!(f, "; {}: {}", v.field, v.message)?;
    }
    Ok(())
  }
}

impl std::error::Error for ValidationErrors {}

// ─── Crate error ─────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum Error {
  #[error("{0}")]
  Validation(#[from] ValidationErrors),

  /// A bound record did not carry a field its model expects. Indicates a
  /// schema and `Model::from_record` out of step with each other.
  #[error("record for {schema} has no usable field {field:?}")]
  FieldMismatch { schema: &'static str, field: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
