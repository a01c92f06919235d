//! Domain models and their schemas.
//!
//! Each model pairs a typed struct with a [`Schema`] built once on first use.
//! The binder validates raw input against the schema; [`Model::from_record`]
//! then moves the checked values into the struct.

use std::{fmt, str::FromStr, sync::LazyLock};

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

use crate::{
  bind::{Source, bind},
  constraint::Constraint,
  error::{Error, Result},
  schema::{Field, FieldType, Schema},
  shape::Shaper,
  value::{FieldValue, Record},
};

/// A typed value with a schema that the binder can fill.
pub trait Model: Sized {
  fn schema() -> &'static Schema;

  /// Convert a record produced by binding [`Model::schema`].
  fn from_record(record: Record) -> Result<Self>;

  /// Bind against `source` and convert in one step.
  fn bind(source: &dyn Source, today: NaiveDate) -> Result<Self> {
    let record = bind(Self::schema(), source, today)?;
    Self::from_record(record)
  }
}

// ─── Hair colour ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HairColor {
  White,
  Brown,
  Black,
  Blonde,
  Redhead,
}

impl HairColor {
  /// Wire tags, in declaration order.
  pub const TAGS: &'static [&'static str] =
    &["white", "brown", "black", "blonde", "redhead"];

  pub fn as_str(&self) -> &'static str {
    match self {
      HairColor::White => "white",
      HairColor::Brown => "brown",
      HairColor::Black => "black",
      HairColor::Blonde => "blonde",
      HairColor::Redhead => "redhead",
    }
  }
}

impl fmt::Display for HairColor {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown hair colour {0:?}")]
pub struct UnknownHairColor(pub String);

impl FromStr for HairColor {
  type Err = UnknownHairColor;

  fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
    match s {
      "white" => Ok(HairColor::White),
      "brown" => Ok(HairColor::Brown),
      "black" => Ok(HairColor::Black),
      "blonde" => Ok(HairColor::Blonde),
      "redhead" => Ok(HairColor::Redhead),
      other => Err(UnknownHairColor(other.to_string())),
    }
  }
}

// ─── Location ────────────────────────────────────────────────────────────────

static LOCATION: LazyLock<Schema> = LazyLock::new(|| {
  Schema::builder("Location")
    .field(
      Field::body("city", FieldType::Text)
        .constrain(Constraint::length(1, 86))
        .example("Detroit"),
    )
    .field(
      Field::body("state", FieldType::Text)
        .constrain(Constraint::length(1, 86))
        .example("Michigan"),
    )
    .field(
      Field::body("country", FieldType::Text)
        .constrain(Constraint::length(4, 56))
        .example("United States"),
    )
    .build()
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
  pub city:    String,
  pub state:   String,
  pub country: String,
}

impl Model for Location {
  fn schema() -> &'static Schema { &LOCATION }

  fn from_record(mut r: Record) -> Result<Self> {
    Ok(Self {
      city:    r.take_text("city")?,
      state:   r.take_text("state")?,
      country: r.take_text("country")?,
    })
  }
}

impl Location {
  pub fn to_record(&self) -> Record {
    Record::new("Location")
      .with("city", Some(FieldValue::Text(self.city.clone())))
      .with("state", Some(FieldValue::Text(self.state.clone())))
      .with("country", Some(FieldValue::Text(self.country.clone())))
  }
}

// ─── Person ──────────────────────────────────────────────────────────────────

static PERSON: LazyLock<Schema> = LazyLock::new(|| {
  Schema::builder("Person")
    .field(
      Field::body("first_name", FieldType::Text)
        .constrain(Constraint::length(1, 50))
        .example("Daniel"),
    )
    .field(
      Field::body("last_name", FieldType::Text)
        .constrain(Constraint::length(1, 50))
        .example("Salmeron"),
    )
    .field(
      Field::body("age", FieldType::Integer)
        .constrain(Constraint::gt_le(0, 115))
        .example(19),
    )
    .field(
      Field::body("hair_color", FieldType::Text)
        .optional()
        .constrain(Constraint::OneOf(HairColor::TAGS))
        .example("black"),
    )
    .field(
      Field::body("is_married", FieldType::Boolean)
        .optional()
        .example(false),
    )
    .field(
      Field::body("personal_website", FieldType::Text)
        .optional()
        .constrain(Constraint::Url)
        .example("https://www.google.com/"),
    )
    .field(
      Field::body("date_of_birth", FieldType::Date)
        .constrain(Constraint::PastDate)
        .example("2000-01-01"),
    )
    .field(
      Field::body("email", FieldType::Text)
        .constrain(Constraint::Email)
        .example("mail@salmeron.com"),
    )
    .field(
      Field::body("password", FieldType::Text)
        .constrain(Constraint::min_length(8))
        .example("12345678"),
    )
    .build()
});

static PERSON_PUBLIC: LazyLock<Shaper> =
  LazyLock::new(|| Shaper::excluding("person-public", ["password"]));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Person {
  pub first_name:       String,
  pub last_name:        String,
  pub age:              i64,
  pub hair_color:       Option<HairColor>,
  pub is_married:       Option<bool>,
  pub personal_website: Option<String>,
  pub date_of_birth:    NaiveDate,
  pub email:            String,
  /// Inbound only. Shape through [`Person::public`] before sending a person
  /// anywhere.
  pub password:         String,
}

impl Person {
  /// The outbound shaper: every field except `password`.
  pub fn public() -> &'static Shaper { &PERSON_PUBLIC }

  pub fn to_record(&self) -> Record {
    let text = |s: &str| Some(FieldValue::Text(s.to_string()));
    Record::new("Person")
      .with("first_name", text(&self.first_name))
      .with("last_name", text(&self.last_name))
      .with("age", Some(FieldValue::Integer(self.age)))
      .with("hair_color", self.hair_color.map(|h| FieldValue::Text(h.as_str().to_string())))
      .with("is_married", self.is_married.map(FieldValue::Boolean))
      .with("personal_website", self.personal_website.as_deref().and_then(text))
      .with("date_of_birth", Some(FieldValue::Date(self.date_of_birth)))
      .with("email", text(&self.email))
      .with("password", text(&self.password))
  }
}

impl Model for Person {
  fn schema() -> &'static Schema { &PERSON }

  fn from_record(mut r: Record) -> Result<Self> {
    let hair_color = match r.take_opt_text("hair_color")? {
      Some(tag) => Some(tag.parse().map_err(|_| Error::FieldMismatch {
        schema: "Person",
        field:  "hair_color".to_string(),
      })?),
      None => None,
    };
    Ok(Self {
      first_name: r.take_text("first_name")?,
      last_name: r.take_text("last_name")?,
      age: r.take_integer("age")?,
      hair_color,
      is_married: r.take_opt_boolean("is_married")?,
      personal_website: r.take_opt_text("personal_website")?,
      date_of_birth: r.take_date("date_of_birth")?,
      email: r.take_text("email")?,
      password: r.take_text("password")?,
    })
  }
}

// ─── LoginOut ────────────────────────────────────────────────────────────────

/// Response to a successful login. Carries no secret; the 20 character
/// limit on `username` is enforced on the login form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginOut {
  pub username: String,
}

#[cfg(test)]
mod tests {
  use serde_json::{Value, json};

  use super::*;
  use crate::{bind::RequestInput, error::ViolationKind};

  fn today() -> NaiveDate { NaiveDate::from_ymd_opt(2024, 6, 1).unwrap() }

  fn valid_person() -> Value { Person::schema().example() }

  fn bind_person(body: Value) -> Result<Person> {
    Person::bind(&RequestInput::new().with_json(body), today())
  }

  fn violation_on(body: Value, field: &str) -> Option<ViolationKind> {
    match bind_person(body) {
      Err(Error::Validation(e)) => e.for_field(field).map(|v| v.violation_kind),
      _ => None,
    }
  }

  #[test]
  fn example_document_binds() {
    let p = bind_person(valid_person()).unwrap();
    assert_eq!(p.first_name, "Daniel");
    assert_eq!(p.age, 19);
    assert_eq!(p.hair_color, Some(HairColor::Black));
    assert_eq!(p.is_married, Some(false));
    assert_eq!(p.date_of_birth, NaiveDate::from_ymd_opt(2000, 1, 1).unwrap());
  }

  #[test]
  fn optional_fields_may_be_absent() {
    let mut body = valid_person();
    let obj = body.as_object_mut().unwrap();
    obj.remove("hair_color");
    obj.remove("is_married");
    obj.remove("personal_website");
    let p = bind_person(body).unwrap();
    assert_eq!(p.hair_color, None);
    assert_eq!(p.is_married, None);
    assert_eq!(p.personal_website, None);
  }

  #[test]
  fn shaped_person_never_contains_password() {
    let p = bind_person(valid_person()).unwrap();
    let record = p.to_record();
    let shaped = Person::public().shape(&record);
    let json = serde_json::to_value(&shaped).unwrap();
    assert!(json.get("password").is_none());
    assert_eq!(json["email"], "mail@salmeron.com");
  }

  #[test]
  fn shaping_preserves_declaration_order() {
    let record = bind_person(valid_person()).unwrap().to_record();
    let expected: Vec<&str> = Person::schema()
      .fields()
      .iter()
      .map(|f| f.name)
      .filter(|n| *n != "password")
      .collect();
    let shaped = Person::public().shape(&record);
    assert_eq!(shaped.names().collect::<Vec<_>>(), expected);
  }

  #[test]
  fn age_bounds_fail_regardless_of_other_fields() {
    for age in [-3, 0, 116, 500] {
      let mut body = valid_person();
      body["age"] = json!(age);
      assert_eq!(violation_on(body.clone(), "age"), Some(ViolationKind::ValueOutOfRange), "age {age}");

      body["email"] = json!("broken");
      body["first_name"] = json!("");
      assert_eq!(violation_on(body, "age"), Some(ViolationKind::ValueOutOfRange), "age {age}");
    }
    for age in [1, 115] {
      let mut body = valid_person();
      body["age"] = json!(age);
      assert!(bind_person(body).is_ok(), "age {age}");
    }
  }

  #[test]
  fn unknown_hair_color_is_rejected() {
    for tag in ["purple", "Black", "", "WHITE"] {
      let mut body = valid_person();
      body["hair_color"] = json!(tag);
      assert_eq!(
        violation_on(body, "hair_color"),
        Some(ViolationKind::InvalidEnumValue),
        "tag {tag:?}"
      );
    }
    for tag in HairColor::TAGS {
      let mut body = valid_person();
      body["hair_color"] = json!(tag);
      assert_eq!(bind_person(body).unwrap().hair_color.unwrap().as_str(), *tag);
    }
  }

  #[test]
  fn birth_date_must_be_in_the_past() {
    for date in ["2024-06-01", "2024-06-02", "2999-01-01"] {
      let mut body = valid_person();
      body["date_of_birth"] = json!(date);
      assert_eq!(
        violation_on(body, "date_of_birth"),
        Some(ViolationKind::DateNotInPast),
        "date {date}"
      );
    }
    let mut body = valid_person();
    body["date_of_birth"] = json!("01/01/2000");
    assert_eq!(violation_on(body, "date_of_birth"), Some(ViolationKind::InvalidFormat));
  }

  #[test]
  fn formats_and_lengths() {
    let mut body = valid_person();
    body["email"] = json!("mail@localhost");
    body["personal_website"] = json!("google");
    body["password"] = json!("short");
    body["last_name"] = json!("x".repeat(51));
    let Err(Error::Validation(e)) = bind_person(body) else {
      panic!("expected validation failure")
    };
    let fields: Vec<(&str, ViolationKind)> =
      e.iter().map(|v| (v.field.as_str(), v.violation_kind)).collect();
    assert_eq!(
      fields,
      vec![
        ("last_name", ViolationKind::LengthOutOfRange),
        ("personal_website", ViolationKind::InvalidFormat),
        ("email", ViolationKind::InvalidFormat),
        ("password", ViolationKind::LengthOutOfRange),
      ]
    );
  }

  #[test]
  fn location_lengths() {
    let ok = Location::bind(&RequestInput::new().with_json(Location::schema().example()), today());
    assert_eq!(ok.unwrap().city, "Detroit");

    let body = json!({ "city": "Detroit", "state": "Michigan", "country": "USA" });
    let Err(Error::Validation(e)) = Location::bind(&RequestInput::new().with_json(body), today())
    else {
      panic!("country shorter than 4 should fail")
    };
    assert_eq!(e.for_field("country").unwrap().violation_kind, ViolationKind::LengthOutOfRange);
  }

  #[test]
  fn person_record_round_trip() {
    let p = bind_person(valid_person()).unwrap();
    assert_eq!(Person::from_record(p.to_record()).unwrap(), p);
  }

  #[test]
  fn login_out_has_only_username() {
    let out = LoginOut { username: "miguel2021".to_string() };
    assert_eq!(serde_json::to_value(&out).unwrap(), json!({ "username": "miguel2021" }));
  }
}
