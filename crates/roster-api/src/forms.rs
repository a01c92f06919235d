//! Handlers for form-encoded endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/login` | Form: `username` (≤ 20 chars), `password`; returns [`LoginOut`] |
//! | `POST` | `/contact` | Form fields plus optional `User-Agent` header and `ads` cookie |

use std::sync::LazyLock;

use axum::Json;
use roster_core::{
  Result,
  constraint::Constraint,
  model::{LoginOut, Model},
  schema::{Field, FieldType, Schema},
  value::Record,
};

use crate::extract::Bound;

// ─── Login ────────────────────────────────────────────────────────────────────

static LOGIN: LazyLock<Schema> = LazyLock::new(|| {
  Schema::builder("LoginForm")
    .field(
      Field::form("username", FieldType::Text)
        .constrain(Constraint::max_length(20))
        .example("miguel2021"),
    )
    .field(Field::form("password", FieldType::Text).example("12345678"))
    .build()
});

#[derive(Debug)]
pub struct LoginForm {
  pub username: String,
  pub password: String,
}

impl Model for LoginForm {
  fn schema() -> &'static Schema { &LOGIN }

  fn from_record(mut r: Record) -> Result<Self> {
    Ok(Self {
      username: r.take_text("username")?,
      password: r.take_text("password")?,
    })
  }
}

/// `POST /login` echoes the username. The password never leaves.
pub async fn login(Bound(form): Bound<LoginForm>) -> Json<LoginOut> {
  Json(LoginOut { username: form.username })
}

// ─── Contact ──────────────────────────────────────────────────────────────────

static CONTACT: LazyLock<Schema> = LazyLock::new(|| {
  Schema::builder("ContactForm")
    .field(
      Field::form("first_name", FieldType::Text)
        .constrain(Constraint::length(1, 20)),
    )
    .field(
      Field::form("last_name", FieldType::Text)
        .constrain(Constraint::length(1, 20)),
    )
    .field(Field::form("email", FieldType::Text).constrain(Constraint::Email))
    .field(
      Field::form("message", FieldType::Text)
        .constrain(Constraint::length(20, 400)),
    )
    .field(Field::header("user_agent"))
    .field(Field::cookie("ads"))
    .build()
});

#[derive(Debug)]
pub struct ContactForm {
  pub first_name: String,
  pub last_name:  String,
  pub email:      String,
  pub message:    String,
  pub user_agent: Option<String>,
  pub ads:        Option<String>,
}

impl Model for ContactForm {
  fn schema() -> &'static Schema { &CONTACT }

  fn from_record(mut r: Record) -> Result<Self> {
    Ok(Self {
      first_name: r.take_text("first_name")?,
      last_name:  r.take_text("last_name")?,
      email:      r.take_text("email")?,
      message:    r.take_text("message")?,
      user_agent: r.take_opt_text("user_agent")?,
      ads:        r.take_opt_text("ads")?,
    })
  }
}

/// `POST /contact` returns the caller's `User-Agent`, or `null`.
pub async fn contact(Bound(form): Bound<ContactForm>) -> Json<Option<String>> {
  Json(form.user_agent)
}
