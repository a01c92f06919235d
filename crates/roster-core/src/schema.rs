//! Schema descriptors: plain-data field declarations built once and reused.
//!
//! A [`Schema`] is a named, ordered list of [`Field`]s. Each field says where
//! its raw value comes from ([`Channel`]), what type it coerces to
//! ([`FieldType`]), which [`Constraint`]s it must satisfy, and what happens
//! when it is absent ([`Presence`]). Schemas nest through
//! [`FieldType::Object`].
//!
//! ```
//! use roster_core::{constraint::Constraint, schema::{Field, FieldType, Schema}};
//!
//! let schema = Schema::builder("Pet")
//!   .field(Field::body("name", FieldType::Text).constrain(Constraint::length(1, 20)))
//!   .field(Field::body("age", FieldType::Integer).optional())
//!   .build();
//! assert_eq!(schema.fields().len(), 2);
//! ```

use std::borrow::Cow;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::{constraint::Constraint, value::FieldValue};

// ─── Channels ────────────────────────────────────────────────────────────────

/// The part of an HTTP request a field is extracted from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
  Path,
  Query,
  Body,
  Form,
  Header,
  Cookie,
  File,
}

impl Channel {
  /// Channels whose values arrive in the request body.
  pub fn in_body(&self) -> bool {
    matches!(self, Channel::Body | Channel::Form | Channel::File)
  }
}

// ─── Types and presence ──────────────────────────────────────────────────────

/// What a raw value is coerced into before constraints run.
#[derive(Debug, Clone, Copy)]
pub enum FieldType {
  Text,
  Integer,
  Boolean,
  /// Calendar date in `YYYY-MM-DD` form.
  Date,
  /// A nested schema, bound from a structured (JSON) object.
  Object(&'static Schema),
  /// One or more uploaded file parts.
  Files,
}

/// What the binder does when a field is absent.
#[derive(Debug, Clone, PartialEq)]
pub enum Presence {
  Required,
  /// Absent values bind as `default`; `None` binds as an explicit null.
  Optional { default: Option<FieldValue> },
}

// ─── Field ───────────────────────────────────────────────────────────────────

/// One field declaration.
#[derive(Debug, Clone)]
pub struct Field {
  pub name:        &'static str,
  /// Name on the wire when it differs from `name`.
  pub alias:       Option<&'static str>,
  pub channel:     Channel,
  pub ty:          FieldType,
  pub constraints: Vec<Constraint>,
  pub presence:    Presence,
  // Documentation only; never consulted while binding.
  pub title:       Option<&'static str>,
  pub description: Option<&'static str>,
  pub example:     Option<Value>,
}

impl Field {
  /// A required field read from `channel`.
  pub fn new(name: &'static str, channel: Channel, ty: FieldType) -> Self {
    Self {
      name,
      alias: None,
      channel,
      ty,
      constraints: Vec::new(),
      presence: Presence::Required,
      title: None,
      description: None,
      example: None,
    }
  }

  pub fn path(name: &'static str, ty: FieldType) -> Self {
    Self::new(name, Channel::Path, ty)
  }

  /// Query parameters are optional unless marked [`Field::required`].
  pub fn query(name: &'static str, ty: FieldType) -> Self {
    Self::new(name, Channel::Query, ty).optional()
  }

  pub fn body(name: &'static str, ty: FieldType) -> Self {
    Self::new(name, Channel::Body, ty)
  }

  pub fn form(name: &'static str, ty: FieldType) -> Self {
    Self::new(name, Channel::Form, ty)
  }

  /// Headers are optional unless marked [`Field::required`].
  pub fn header(name: &'static str) -> Self {
    Self::new(name, Channel::Header, FieldType::Text).optional()
  }

  /// Cookies are optional unless marked [`Field::required`].
  pub fn cookie(name: &'static str) -> Self {
    Self::new(name, Channel::Cookie, FieldType::Text).optional()
  }

  pub fn files(name: &'static str) -> Self {
    Self::new(name, Channel::File, FieldType::Files)
  }

  pub fn required(mut self) -> Self {
    self.presence = Presence::Required;
    self
  }

  /// Mark the field optional with a null default. Path fields stay required.
  pub fn optional(mut self) -> Self {
    if self.channel != Channel::Path {
      self.presence = Presence::Optional { default: None };
    }
    self
  }

  /// Mark the field optional, binding `value` when absent.
  pub fn default_value(mut self, value: FieldValue) -> Self {
    if self.channel != Channel::Path {
      self.presence = Presence::Optional { default: Some(value) };
    }
    self
  }

  pub fn constrain(mut self, constraint: Constraint) -> Self {
    self.constraints.push(constraint);
    self
  }

  pub fn alias(mut self, alias: &'static str) -> Self {
    self.alias = Some(alias);
    self
  }

  pub fn title(mut self, title: &'static str) -> Self {
    self.title = Some(title);
    self
  }

  pub fn description(mut self, description: &'static str) -> Self {
    self.description = Some(description);
    self
  }

  pub fn example(mut self, example: impl Into<Value>) -> Self {
    self.example = Some(example.into());
    self
  }

  pub fn is_required(&self) -> bool { self.presence == Presence::Required }

  /// The key the binder looks up in the field's channel.
  ///
  /// Header fields without an alias map `_` to `-`, so `user_agent` reads
  /// the `user-agent` header.
  pub fn wire_name(&self) -> Cow<'static, str> {
    match (self.alias, self.channel) {
      (Some(alias), _) => Cow::Borrowed(alias),
      (None, Channel::Header) => Cow::Owned(self.name.replace('_', "-")),
      (None, _) => Cow::Borrowed(self.name),
    }
  }
}

// ─── Schema ──────────────────────────────────────────────────────────────────

/// A named, ordered set of field declarations.
#[derive(Debug, Clone)]
pub struct Schema {
  name:   &'static str,
  fields: Vec<Field>,
}

impl Schema {
  pub fn builder(name: &'static str) -> SchemaBuilder {
    SchemaBuilder { name, fields: Vec::new() }
  }

  pub fn name(&self) -> &'static str { self.name }

  pub fn fields(&self) -> &[Field] { &self.fields }

  pub fn field(&self, name: &str) -> Option<&Field> {
    self.fields.iter().find(|f| f.name == name)
  }

  /// Whether binding needs the request body at all.
  pub fn reads_body(&self) -> bool {
    self.fields.iter().any(|f| f.channel.in_body())
  }

  /// Whether any field resolves against keys of the structured body.
  pub fn reads_json_body(&self) -> bool {
    self.fields.iter().any(|f| f.channel == Channel::Body)
  }

  /// An example document assembled from per-field examples, recursing into
  /// nested schemas. Fields without an example are left out.
  pub fn example(&self) -> Value {
    let mut map = Map::new();
    for f in &self.fields {
      let example = match (&f.example, f.ty) {
        (Some(v), _) => Some(v.clone()),
        (None, FieldType::Object(nested)) => Some(nested.example()),
        (None, _) => None,
      };
      if let Some(v) = example {
        map.insert(f.wire_name().into_owned(), v);
      }
    }
    Value::Object(map)
  }
}

/// Accumulates field declarations; see [`Schema::builder`].
#[derive(Debug)]
pub struct SchemaBuilder {
  name:   &'static str,
  fields: Vec<Field>,
}

impl SchemaBuilder {
  pub fn field(mut self, field: Field) -> Self {
    debug_assert!(
      self.fields.iter().all(|f| f.name != field.name),
      "duplicate field {:?} in schema {}",
      field.name,
      self.name,
    );
    self.fields.push(field);
    self
  }

  pub fn build(self) -> Schema {
    Schema { name: self.name, fields: self.fields }
  }
}

#[cfg(test)]
mod tests {
  use std::sync::LazyLock;

  use serde_json::json;

  use super::*;

  static INNER: LazyLock<Schema> = LazyLock::new(|| {
    Schema::builder("Inner")
      .field(Field::body("x", FieldType::Integer).example(1))
      .build()
  });

  #[test]
  fn header_wire_name_uses_hyphens() {
    assert_eq!(Field::header("user_agent").wire_name(), "user-agent");
    assert_eq!(Field::header("x").alias("X-Trace").wire_name(), "X-Trace");
    assert_eq!(Field::form("first_name", FieldType::Text).wire_name(), "first_name");
  }

  #[test]
  fn channel_defaults_for_presence() {
    assert!(Field::path("id", FieldType::Integer).is_required());
    assert!(Field::path("id", FieldType::Integer).optional().is_required());
    assert!(!Field::query("q", FieldType::Text).is_required());
    assert!(Field::query("q", FieldType::Text).required().is_required());
    assert!(!Field::cookie("ads").is_required());
    assert!(Field::body("b", FieldType::Text).is_required());
  }

  #[test]
  fn body_reading_depends_on_channels() {
    let form = Schema::builder("Login")
      .field(Field::form("username", FieldType::Text))
      .build();
    assert!(form.reads_body());
    assert!(!form.reads_json_body());

    let two = Schema::builder("Two")
      .field(Field::path("id", FieldType::Integer))
      .field(Field::body("a", FieldType::Object(&INNER)))
      .build();
    assert!(two.reads_body());
    assert!(two.reads_json_body());

    let query = Schema::builder("Q").field(Field::query("q", FieldType::Text)).build();
    assert!(!query.reads_body());
  }

  #[test]
  fn example_recurses_into_nested_schemas() {
    let outer = Schema::builder("Outer")
      .field(Field::body("inner", FieldType::Object(&INNER)))
      .field(Field::body("name", FieldType::Text).example("n"))
      .field(Field::body("silent", FieldType::Text))
      .build();
    assert_eq!(outer.example(), json!({ "inner": { "x": 1 }, "name": "n" }));
  }
}
