//! The input binder: raw request channels in, a typed [`Record`] out.
//!
//! Binding walks a schema's fields in declaration order. Within a field the
//! first failing step (presence, coercion, then each constraint in order)
//! ends that field; across fields every violation is collected so one
//! response can report all of them.
//!
//! The binder knows nothing about HTTP. Callers hand it a [`Source`]; for
//! requests that is a [`RequestInput`] snapshot assembled by the transport.

use chrono::NaiveDate;
use serde_json::{Map, Value};
use tracing::debug;

use crate::{
  constraint::Failure,
  error::{ValidationErrors, Violation, ViolationKind},
  schema::{Channel, Field, FieldType, Presence, Schema},
  value::{FieldValue, Record, UploadedFile},
};

// ─── Raw input ───────────────────────────────────────────────────────────────

/// An uncoerced value as it arrived on its channel.
#[derive(Debug, Clone, PartialEq)]
pub enum Raw {
  /// Path segments, query parameters, form fields, headers, cookies.
  Text(String),
  /// A value taken from a structured body.
  Json(Value),
  Files(Vec<UploadedFile>),
}

/// Where the binder reads raw values from.
pub trait Source {
  /// The raw value for `key` on `channel`, if present.
  fn lookup(&self, channel: Channel, key: &str) -> Option<Raw>;

  /// The whole structured body, if one was sent.
  fn body(&self) -> Option<&Value>;
}

/// A per-request snapshot of every input channel.
///
/// Header names are matched case-insensitively; everything else is exact.
#[derive(Debug, Clone, Default)]
pub struct RequestInput {
  pub path:    Vec<(String, String)>,
  pub query:   Vec<(String, String)>,
  pub headers: Vec<(String, String)>,
  pub cookies: Vec<(String, String)>,
  pub body:    Option<Value>,
  pub form:    Vec<(String, String)>,
  pub files:   Vec<(String, UploadedFile)>,
}

impl RequestInput {
  pub fn new() -> Self { Self::default() }

  pub fn with_path(mut self, key: &str, value: &str) -> Self {
    self.path.push((key.to_string(), value.to_string()));
    self
  }

  pub fn with_query(mut self, key: &str, value: &str) -> Self {
    self.query.push((key.to_string(), value.to_string()));
    self
  }

  pub fn with_header(mut self, key: &str, value: &str) -> Self {
    self.headers.push((key.to_string(), value.to_string()));
    self
  }

  pub fn with_cookie(mut self, key: &str, value: &str) -> Self {
    self.cookies.push((key.to_string(), value.to_string()));
    self
  }

  pub fn with_json(mut self, body: Value) -> Self {
    self.body = Some(body);
    self
  }

  pub fn with_form(mut self, key: &str, value: &str) -> Self {
    self.form.push((key.to_string(), value.to_string()));
    self
  }

  pub fn with_file(mut self, key: &str, file: UploadedFile) -> Self {
    self.files.push((key.to_string(), file));
    self
  }
}

/// Last value wins for repeated keys.
fn last_text(pairs: &[(String, String)], key: &str) -> Option<Raw> {
  pairs
    .iter()
    .rev()
    .find(|(k, _)| k == key)
    .map(|(_, v)| Raw::Text(v.clone()))
}

impl Source for RequestInput {
  fn lookup(&self, channel: Channel, key: &str) -> Option<Raw> {
    match channel {
      Channel::Path => last_text(&self.path, key),
      Channel::Query => last_text(&self.query, key),
      Channel::Form => last_text(&self.form, key),
      Channel::Cookie => last_text(&self.cookies, key),
      Channel::Header => self
        .headers
        .iter()
        .rev()
        .find(|(k, _)| k.eq_ignore_ascii_case(key))
        .map(|(_, v)| Raw::Text(v.clone())),
      Channel::Body => self
        .body
        .as_ref()
        .and_then(Value::as_object)
        .and_then(|o| o.get(key))
        .cloned()
        .map(Raw::Json),
      Channel::File => {
        let files: Vec<UploadedFile> = self
          .files
          .iter()
          .filter(|(k, _)| k == key)
          .map(|(_, f)| f.clone())
          .collect();
        (!files.is_empty()).then_some(Raw::Files(files))
      }
    }
  }

  fn body(&self) -> Option<&Value> { self.body.as_ref() }
}

/// A nested JSON object; every lookup reads a key regardless of channel.
struct JsonObject<'a>(&'a Map<String, Value>);

impl Source for JsonObject<'_> {
  fn lookup(&self, _channel: Channel, key: &str) -> Option<Raw> {
    self.0.get(key).cloned().map(Raw::Json)
  }

  fn body(&self) -> Option<&Value> { None }
}

// ─── Entry point ─────────────────────────────────────────────────────────────

/// Bind `schema` against `source`.
///
/// `today` is the reference date for past-date constraints.
pub fn bind(
  schema: &Schema,
  source: &dyn Source,
  today: NaiveDate,
) -> Result<Record, ValidationErrors> {
  let mut binder = Binder { today, violations: Vec::new() };
  let record = binder.bind_schema(schema, source, "");
  if binder.violations.is_empty() {
    Ok(record)
  } else {
    debug!(
      schema = schema.name(),
      violations = binder.violations.len(),
      "binding failed"
    );
    Err(ValidationErrors(binder.violations))
  }
}

struct Binder {
  today:      NaiveDate,
  violations: Vec<Violation>,
}

impl Binder {
  fn violate(
    &mut self,
    path: &str,
    channel: Channel,
    (violation_kind, message): Failure,
  ) {
    self.violations.push(Violation {
      field: path.to_string(),
      channel,
      violation_kind,
      message,
    });
  }

  fn bind_schema(
    &mut self,
    schema: &Schema,
    source: &dyn Source,
    prefix: &str,
  ) -> Record {
    let skip_body = self.reject_non_object_body(schema, source);
    let mut record = Record::new(schema.name());
    for field in schema.fields() {
      if skip_body && field.channel == Channel::Body {
        record.push(field.name, None);
        continue;
      }
      let raw = source.lookup(field.channel, &field.wire_name());
      let path = if prefix.is_empty() {
        field.name.to_string()
      } else {
        format!("{prefix}.{}", field.name)
      };
      let value = self.bind_field(field, raw, &path);
      record.push(field.name, value);
    }
    record
  }

  /// A structured body that is not an object has no keys to resolve body
  /// fields against: one violation for the body, and those fields are
  /// skipped.
  fn reject_non_object_body(
    &mut self,
    schema: &Schema,
    source: &dyn Source,
  ) -> bool {
    match source.body() {
      Some(body)
        if schema.reads_json_body() && !body.is_object() && !body.is_null() =>
      {
        self.violate("body", Channel::Body, type_error("object"));
        true
      }
      _ => false,
    }
  }

  fn bind_field(
    &mut self,
    field: &Field,
    raw: Option<Raw>,
    path: &str,
  ) -> Option<FieldValue> {
    let Some(raw) = raw.filter(|r| *r != Raw::Json(Value::Null)) else {
      return match &field.presence {
        Presence::Required => {
          self.violate(
            path,
            field.channel,
            (ViolationKind::MissingField, "field required".to_string()),
          );
          None
        }
        Presence::Optional { default } => default.clone(),
      };
    };

    let value = match (field.ty, raw) {
      (FieldType::Object(nested), Raw::Json(Value::Object(map))) => {
        let before = self.violations.len();
        let record = self.bind_schema(nested, &JsonObject(&map), path);
        if self.violations.len() > before {
          return None;
        }
        FieldValue::Object(record)
      }
      (ty, raw) => match coerce(ty, raw) {
        Ok(v) => v,
        Err(failure) => {
          self.violate(path, field.channel, failure);
          return None;
        }
      },
    };

    for constraint in &field.constraints {
      if let Err(failure) = constraint.check(&value, self.today) {
        self.violate(path, field.channel, failure);
        return None;
      }
    }
    Some(value)
  }
}

// ─── Coercion ────────────────────────────────────────────────────────────────

fn type_error(expected: &str) -> Failure {
  (ViolationKind::TypeCoercionError, format!("value is not a valid {expected}"))
}

fn coerce(ty: FieldType, raw: Raw) -> Result<FieldValue, Failure> {
  match ty {
    FieldType::Text => match raw {
      Raw::Text(s) | Raw::Json(Value::String(s)) => Ok(FieldValue::Text(s)),
      Raw::Json(Value::Number(n)) => Ok(FieldValue::Text(n.to_string())),
      _ => Err(type_error("string")),
    },
    FieldType::Integer => match raw {
      Raw::Text(s) | Raw::Json(Value::String(s)) => s
        .trim()
        .parse::<i64>()
        .map(FieldValue::Integer)
        .map_err(|_| type_error("integer")),
      Raw::Json(Value::Number(n)) => n
        .as_i64()
        .or_else(|| {
          n.as_f64()
            .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
            .map(|f| f as i64)
        })
        .map(FieldValue::Integer)
        .ok_or_else(|| type_error("integer")),
      _ => Err(type_error("integer")),
    },
    FieldType::Boolean => match raw {
      Raw::Json(Value::Bool(b)) => Ok(FieldValue::Boolean(b)),
      Raw::Text(s) | Raw::Json(Value::String(s)) => parse_bool(&s)
        .map(FieldValue::Boolean)
        .ok_or_else(|| type_error("boolean")),
      Raw::Json(Value::Number(n)) => match n.as_i64() {
        Some(0) => Ok(FieldValue::Boolean(false)),
        Some(1) => Ok(FieldValue::Boolean(true)),
        _ => Err(type_error("boolean")),
      },
      _ => Err(type_error("boolean")),
    },
    FieldType::Date => match raw {
      Raw::Text(s) | Raw::Json(Value::String(s)) => {
        NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
          .map(FieldValue::Date)
          .map_err(|_| {
            (ViolationKind::InvalidFormat, "invalid date format".to_string())
          })
      }
      _ => Err((ViolationKind::InvalidFormat, "invalid date format".to_string())),
    },
    FieldType::Object(_) => Err(type_error("object")),
    FieldType::Files => match raw {
      Raw::Files(files) => Ok(FieldValue::Files(files)),
      _ => Err(type_error("file upload")),
    },
  }
}

fn parse_bool(s: &str) -> Option<bool> {
  match s.trim().to_ascii_lowercase().as_str() {
    "true" | "1" | "yes" | "on" => Some(true),
    "false" | "0" | "no" | "off" => Some(false),
    _ => None,
  }
}
