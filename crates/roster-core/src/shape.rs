//! Outbound field exclusion.
//!
//! A [`Shaper`] holds a named set of field names to drop. Shaping borrows a
//! [`Record`] and produces a [`Shaped`] view with the remaining fields in
//! declaration order; the record itself is left untouched.

use std::collections::BTreeSet;

use serde::{Serialize, Serializer, ser::SerializeMap};
use tracing::trace;

use crate::value::{FieldValue, Record};

/// A named exclude set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shaper {
  name:    &'static str,
  exclude: BTreeSet<&'static str>,
}

impl Shaper {
  pub fn excluding(
    name: &'static str,
    fields: impl IntoIterator<Item = &'static str>,
  ) -> Self {
    Self { name, exclude: fields.into_iter().collect() }
  }

  pub fn excludes(&self, field: &str) -> bool { self.exclude.contains(field) }

  pub fn shape<'r>(&self, record: &'r Record) -> Shaped<'r> {
    let fields: Vec<_> = record
      .fields()
      .filter(|(name, _)| !self.excludes(name))
      .collect();
    trace!(
      shaper = self.name,
      schema = record.schema_name(),
      dropped = record.len() - fields.len(),
      "shaped record"
    );
    Shaped { fields }
  }
}

/// A record with some fields removed.
#[derive(Debug, Clone, PartialEq)]
pub struct Shaped<'r> {
  fields: Vec<(&'static str, Option<&'r FieldValue>)>,
}

impl Shaped<'_> {
  pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
    self.fields.iter().map(|(n, _)| *n)
  }

  pub fn get(&self, name: &str) -> Option<&FieldValue> {
    self
      .fields
      .iter()
      .find(|(n, _)| *n == name)
      .and_then(|(_, v)| *v)
  }

  pub fn contains(&self, name: &str) -> bool {
    self.fields.iter().any(|(n, _)| *n == name)
  }
}

impl Serialize for Shaped<'_> {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(self.fields.len()))?;
    for (name, value) in &self.fields {
      map.serialize_entry(name, value)?;
    }
    map.end()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn record() -> Record {
    Record::new("Account")
      .with("user", Some(FieldValue::Text("dan".to_string())))
      .with("password", Some(FieldValue::Text("hunter22".to_string())))
      .with("age", Some(FieldValue::Integer(19)))
      .with("note", None)
  }

  #[test]
  fn drops_excluded_and_keeps_order() {
    let r = record();
    let shaped = Shaper::excluding("no-secrets", ["password"]).shape(&r);
    assert_eq!(shaped.names().collect::<Vec<_>>(), vec!["user", "age", "note"]);
    assert!(!shaped.contains("password"));
    assert_eq!(
      serde_json::to_string(&shaped).unwrap(),
      r#"{"user":"dan","age":19,"note":null}"#
    );
  }

  #[test]
  fn source_record_is_untouched() {
    let r = record();
    let before = r.clone();
    let _ = Shaper::excluding("no-secrets", ["password", "age"]).shape(&r);
    assert_eq!(r, before);
  }

  #[test]
  fn unknown_names_drop_nothing() {
    let r = record();
    assert_eq!(Shaper::excluding("x", ["missing"]).shape(&r).names().count(), 4);
  }
}
