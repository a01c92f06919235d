//! Handlers for `/` and `/person` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/` | Greeting |
//! | `POST` | `/person/new` | Body: [`Person`]; returns 201 + person without `password` |
//! | `GET`  | `/person/detail` | `?age` required; optional `name` (1–50 chars) |
//! | `GET`  | `/person/detail/{person_id}` | 404 unless the id is registered |
//! | `PUT`  | `/person/{person_id}` | Body: `{"person": …, "location": …}`; returns merged fields |

use std::sync::{Arc, LazyLock};

use axum::{
  Json,
  extract::State,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use roster_core::{
  Result,
  constraint::Constraint,
  model::{Location, Model, Person},
  registry::Registry,
  schema::{Field, FieldType, Schema},
  value::Record,
};
use serde_json::{Map, Value, json};
use tracing::debug;

use crate::{error::ApiError, extract::Bound};

pub const PERSON_MISSING: &str = "This person does not exist :(";

/// The `person_id` path parameter shared by the detail and update routes.
fn person_id_field() -> Field {
  Field::path("person_id", FieldType::Integer)
    .constrain(Constraint::gt(0))
    .title("Person Id")
    .description("This is the person id.")
    .example(123)
}

// ─── Home ─────────────────────────────────────────────────────────────────────

/// `GET /`
pub async fn home() -> Json<Value> { Json(json!({ "Hello": "World!" })) }

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /person/new`. Responds 201 with the person minus `password`.
pub async fn create(Bound(person): Bound<Person>) -> Response {
  let record = person.to_record();
  (StatusCode::CREATED, Json(Person::public().shape(&record))).into_response()
}

// ─── Detail by query ──────────────────────────────────────────────────────────

static DETAIL_QUERY: LazyLock<Schema> = LazyLock::new(|| {
  Schema::builder("DetailQuery")
    .field(
      Field::query("name", FieldType::Text)
        .constrain(Constraint::length(1, 50))
        .title("Person Name")
        .description("This is the person name.")
        .example("Marcel"),
    )
    .field(
      Field::query("age", FieldType::Integer)
        .required()
        .title("Person Age")
        .description("This is the age of the person. Required")
        .example(21),
    )
    .build()
});

#[derive(Debug)]
pub struct DetailQuery {
  pub name: Option<String>,
  pub age:  i64,
}

impl Model for DetailQuery {
  fn schema() -> &'static Schema { &DETAIL_QUERY }

  fn from_record(mut r: Record) -> Result<Self> {
    Ok(Self { name: r.take_opt_text("name")?, age: r.take_integer("age")? })
  }
}

/// `GET /person/detail?age=<n>[&name=<s>]` returns `{<name>: <age>}`. The key is
/// `"null"` when no name is given.
pub async fn detail(Bound(q): Bound<DetailQuery>) -> Json<Map<String, Value>> {
  let mut out = Map::new();
  out.insert(q.name.unwrap_or_else(|| "null".to_string()), json!(q.age));
  Json(out)
}

// ─── Detail by id ─────────────────────────────────────────────────────────────

static PERSON_ID: LazyLock<Schema> = LazyLock::new(|| {
  Schema::builder("PersonIdPath").field(person_id_field()).build()
});

#[derive(Debug)]
pub struct PersonIdPath {
  pub person_id: i64,
}

impl Model for PersonIdPath {
  fn schema() -> &'static Schema { &PERSON_ID }

  fn from_record(mut r: Record) -> Result<Self> {
    Ok(Self { person_id: r.take_integer("person_id")? })
  }
}

/// `GET /person/detail/{person_id}`
pub async fn show<R>(
  State(registry): State<Arc<R>>,
  Bound(path): Bound<PersonIdPath>,
) -> Result<Json<Value>, ApiError>
where
  R: Registry,
{
  let id = path.person_id;
  if !registry.exists(id) {
    debug!(person_id = id, "person not in registry");
    return Err(ApiError::NotFound(PERSON_MISSING.to_string()));
  }
  let mut out = Map::new();
  out.insert(id.to_string(), json!("This person exists!"));
  Ok(Json(Value::Object(out)))
}

// ─── Update ───────────────────────────────────────────────────────────────────

static UPDATE: LazyLock<Schema> = LazyLock::new(|| {
  Schema::builder("UpdatePerson")
    .field(person_id_field())
    .field(Field::body("person", FieldType::Object(Person::schema())))
    .field(Field::body("location", FieldType::Object(Location::schema())))
    .build()
});

#[derive(Debug)]
pub struct UpdatePerson {
  pub person_id: i64,
  pub person:    Person,
  pub location:  Location,
}

impl Model for UpdatePerson {
  fn schema() -> &'static Schema { &UPDATE }

  fn from_record(mut r: Record) -> Result<Self> {
    Ok(Self {
      person_id: r.take_integer("person_id")?,
      person:    Person::from_record(r.take_object("person")?)?,
      location:  Location::from_record(r.take_object("location")?)?,
    })
  }
}

/// `PUT /person/{person_id}` returns every person field (password included)
/// followed by every location field.
pub async fn update(Bound(u): Bound<UpdatePerson>) -> Json<Record> {
  Json(u.person.to_record().merged(u.location.to_record()))
}
