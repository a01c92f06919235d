//! Bound values: what the binder produces once coercion and constraints pass.

use chrono::NaiveDate;
use serde::{
  Serialize, Serializer,
  ser::{SerializeMap, SerializeStruct},
};

use crate::error::{Error, Result};

// ─── Uploaded file ───────────────────────────────────────────────────────────

/// Metadata for one uploaded file part. The content itself is never retained;
/// `size` is counted while the part is streamed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
  pub filename:     String,
  pub content_type: String,
  /// Length of the part body in bytes.
  pub size:         u64,
}

impl UploadedFile {
  /// Size in kibibytes rounded to two decimal places.
  pub fn size_kb(&self) -> f64 {
    (self.size as f64 / 1024.0 * 100.0).round() / 100.0
  }
}

impl Serialize for UploadedFile {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    let mut s = serializer.serialize_struct("UploadedFile", 3)?;
    s.serialize_field("filename", &self.filename)?;
    s.serialize_field("contentType", &self.content_type)?;
    s.serialize_field("sizeKB", &self.size_kb())?;
    s.end()
  }
}

// ─── Field value ─────────────────────────────────────────────────────────────

/// A typed value that passed every constraint on its field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
  Text(String),
  Integer(i64),
  Boolean(bool),
  Date(NaiveDate),
  Object(Record),
  Files(Vec<UploadedFile>),
}

impl FieldValue {
  pub fn as_text(&self) -> Option<&str> {
    match self {
      FieldValue::Text(s) => Some(s),
      _ => None,
    }
  }

  pub fn as_integer(&self) -> Option<i64> {
    match self {
      FieldValue::Integer(n) => Some(*n),
      _ => None,
    }
  }

  /// Short type name used in violation messages.
  pub fn type_name(&self) -> &'static str {
    match self {
      FieldValue::Text(_) => "text",
      FieldValue::Integer(_) => "integer",
      FieldValue::Boolean(_) => "boolean",
      FieldValue::Date(_) => "date",
      FieldValue::Object(_) => "object",
      FieldValue::Files(_) => "files",
    }
  }
}

impl Serialize for FieldValue {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    match self {
      FieldValue::Text(s) => serializer.serialize_str(s),
      FieldValue::Integer(n) => serializer.serialize_i64(*n),
      FieldValue::Boolean(b) => serializer.serialize_bool(*b),
      FieldValue::Date(d) => {
        serializer.collect_str(&d.format("%Y-%m-%d"))
      }
      FieldValue::Object(r) => r.serialize(serializer),
      FieldValue::Files(files) => files.serialize(serializer),
    }
  }
}

// ─── Record ──────────────────────────────────────────────────────────────────

/// An ordered set of bound fields for one schema instance.
///
/// Optional fields that were absent and had no default hold `None`, which
/// serializes as `null`.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
  schema: &'static str,
  fields: Vec<(&'static str, Option<FieldValue>)>,
}

impl Record {
  pub fn new(schema: &'static str) -> Self {
    Self { schema, fields: Vec::new() }
  }

  pub fn schema_name(&self) -> &'static str { self.schema }

  /// Append a field. Declaration order is preserved.
  pub fn push(&mut self, name: &'static str, value: Option<FieldValue>) {
    self.fields.push((name, value));
  }

  /// Builder-style [`Record::push`].
  pub fn with(mut self, name: &'static str, value: Option<FieldValue>) -> Self {
    self.push(name, value);
    self
  }

  pub fn get(&self, name: &str) -> Option<&FieldValue> {
    self
      .fields
      .iter()
      .find(|(n, _)| *n == name)
      .and_then(|(_, v)| v.as_ref())
  }

  pub fn contains(&self, name: &str) -> bool {
    self.fields.iter().any(|(n, _)| *n == name)
  }

  pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
    self.fields.iter().map(|(n, _)| *n)
  }

  pub fn fields(
    &self,
  ) -> impl Iterator<Item = (&'static str, Option<&FieldValue>)> + '_ {
    self.fields.iter().map(|(n, v)| (*n, v.as_ref()))
  }

  pub fn len(&self) -> usize { self.fields.len() }

  pub fn is_empty(&self) -> bool { self.fields.is_empty() }

  /// Fold `other`'s fields into this record. Fields already present take
  /// `other`'s value in place; new ones are appended in `other`'s order.
  pub fn merged(mut self, other: Record) -> Record {
    for (name, value) in other.fields {
      match self.fields.iter_mut().find(|(n, _)| *n == name) {
        Some(slot) => slot.1 = value,
        None => self.fields.push((name, value)),
      }
    }
    self
  }

  // ── Typed extraction ──────────────────────────────────────────────────

  /// Move the value out of `name`, leaving the slot empty.
  pub fn take(&mut self, name: &str) -> Option<FieldValue> {
    self
      .fields
      .iter_mut()
      .find(|(n, _)| *n == name)
      .and_then(|(_, v)| v.take())
  }

  fn mismatch(&self, name: &str) -> Error {
    Error::FieldMismatch { schema: self.schema, field: name.to_string() }
  }

  pub fn take_opt_text(&mut self, name: &str) -> Result<Option<String>> {
    match self.take(name) {
      None => Ok(None),
      Some(FieldValue::Text(s)) => Ok(Some(s)),
      Some(_) => Err(self.mismatch(name)),
    }
  }

  pub fn take_text(&mut self, name: &str) -> Result<String> {
    self.take_opt_text(name)?.ok_or_else(|| self.mismatch(name))
  }

  pub fn take_opt_integer(&mut self, name: &str) -> Result<Option<i64>> {
    match self.take(name) {
      None => Ok(None),
      Some(FieldValue::Integer(n)) => Ok(Some(n)),
      Some(_) => Err(self.mismatch(name)),
    }
  }

  pub fn take_integer(&mut self, name: &str) -> Result<i64> {
    self.take_opt_integer(name)?.ok_or_else(|| self.mismatch(name))
  }

  pub fn take_opt_boolean(&mut self, name: &str) -> Result<Option<bool>> {
    match self.take(name) {
      None => Ok(None),
      Some(FieldValue::Boolean(b)) => Ok(Some(b)),
      Some(_) => Err(self.mismatch(name)),
    }
  }

  pub fn take_date(&mut self, name: &str) -> Result<NaiveDate> {
    match self.take(name) {
      Some(FieldValue::Date(d)) => Ok(d),
      _ => Err(self.mismatch(name)),
    }
  }

  pub fn take_object(&mut self, name: &str) -> Result<Record> {
    match self.take(name) {
      Some(FieldValue::Object(r)) => Ok(r),
      _ => Err(self.mismatch(name)),
    }
  }

  pub fn take_files(&mut self, name: &str) -> Result<Vec<UploadedFile>> {
    match self.take(name) {
      Some(FieldValue::Files(f)) => Ok(f),
      _ => Err(self.mismatch(name)),
    }
  }
}

impl Serialize for Record {
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

  #[test]
  fn size_kb_rounds_to_two_places() {
    let f = UploadedFile {
      filename:     "a.png".to_string(),
      content_type: "image/png".to_string(),
      size:         1500,
    };
    // 1500 / 1024 = 1.46484375
    assert_eq!(f.size_kb(), 1.46);
  }

  #[test]
  fn record_serializes_in_push_order_with_nulls() {
    let r = Record::new("T")
      .with("b", Some(FieldValue::Integer(2)))
      .with("a", None)
      .with("c", Some(FieldValue::Text("x".to_string())));
    let json = serde_json::to_string(&r).unwrap();
    assert_eq!(json, r#"{"b":2,"a":null,"c":"x"}"#);
  }

  #[test]
  fn merged_appends_and_overrides() {
    let a = Record::new("A")
      .with("x", Some(FieldValue::Integer(1)))
      .with("y", Some(FieldValue::Integer(2)));
    let b = Record::new("B")
      .with("z", Some(FieldValue::Integer(3)))
      .with("x", Some(FieldValue::Integer(9)));
    let m = a.merged(b);
    assert_eq!(m.names().collect::<Vec<_>>(), vec!["x", "y", "z"]);
    assert_eq!(m.get("x"), Some(&FieldValue::Integer(9)));
    assert_eq!(m.schema_name(), "A");
  }

  #[test]
  fn take_reports_mismatch_for_wrong_type() {
    let mut r = Record::new("T").with("n", Some(FieldValue::Boolean(true)));
    assert!(matches!(
      r.take_integer("n"),
      Err(Error::FieldMismatch { schema: "T", .. })
    ));
  }
}
