//! Scalar constraint primitives.
//!
//! A constraint is a pure check over an already-coerced [`FieldValue`]. Fields
//! declare an ordered list of constraints; the binder applies them left to
//! right and stops at the first failure for that field.

use chrono::NaiveDate;
use validator::ValidateEmail;

use crate::{error::ViolationKind, value::FieldValue};

/// A failed constraint: what kind, and a human-readable explanation.
pub type Failure = (ViolationKind, String);

/// A single validation rule attached to a field.
#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
  /// Inclusive bounds on the character count of a text value.
  Length { min: Option<usize>, max: Option<usize> },
  /// Numeric bounds; `gt`/`lt` are exclusive, `ge`/`le` inclusive.
  Range {
    gt: Option<i64>,
    ge: Option<i64>,
    lt: Option<i64>,
    le: Option<i64>,
  },
  /// Value must equal one of the tags (case-sensitive).
  OneOf(&'static [&'static str]),
  /// `local@host.tld`: a dot-atom local part and a dotted domain whose last
  /// label is not numeric.
  Email,
  /// Absolute URL with a scheme and a host.
  Url,
  /// Date strictly before the binder's notion of today.
  PastDate,
}

impl Constraint {
  pub fn length(min: usize, max: usize) -> Self {
    Constraint::Length { min: Some(min), max: Some(max) }
  }

  pub fn min_length(min: usize) -> Self {
    Constraint::Length { min: Some(min), max: None }
  }

  pub fn max_length(max: usize) -> Self {
    Constraint::Length { min: None, max: Some(max) }
  }

  pub fn gt(bound: i64) -> Self {
    Constraint::Range { gt: Some(bound), ge: None, lt: None, le: None }
  }

  /// Exclusive lower bound, inclusive upper bound.
  pub fn gt_le(gt: i64, le: i64) -> Self {
    Constraint::Range { gt: Some(gt), ge: None, lt: None, le: Some(le) }
  }

  /// Check `value` against this constraint. `today` is only consulted by
  /// [`Constraint::PastDate`].
  pub fn check(
    &self,
    value: &FieldValue,
    today: NaiveDate,
  ) -> Result<(), Failure> {
    match (self, value) {
      (Constraint::Length { min, max }, FieldValue::Text(s)) => {
        check_length(s, *min, *max)
      }
      (Constraint::Range { gt, ge, lt, le }, FieldValue::Integer(n)) => {
        check_range(*n, *gt, *ge, *lt, *le)
      }
      (Constraint::OneOf(tags), FieldValue::Text(s)) => {
        if tags.iter().any(|t| *t == s.as_str()) {
          Ok(())
        } else {
          Err((
            ViolationKind::InvalidEnumValue,
            format!("value is not a valid enumeration member; permitted: {}", tags.join(", ")),
          ))
        }
      }
      (Constraint::Email, FieldValue::Text(s)) => check_email(s),
      (Constraint::Url, FieldValue::Text(s)) => check_url(s),
      (Constraint::PastDate, FieldValue::Date(d)) => {
        if *d < today {
          Ok(())
        } else {
          Err((
            ViolationKind::DateNotInPast,
            format!("date {d} is not in the past"),
          ))
        }
      }
      (c, v) => Err((
        ViolationKind::TypeCoercionError,
        format!("{} constraint does not apply to {} value", c.name(), v.type_name()),
      )),
    }
  }

  fn name(&self) -> &'static str {
    match self {
      Constraint::Length { .. } => "length",
      Constraint::Range { .. } => "range",
      Constraint::OneOf(_) => "enumeration",
      Constraint::Email => "email",
      Constraint::Url => "url",
      Constraint::PastDate => "past-date",
    }
  }
}

fn check_length(
  s: &str,
  min: Option<usize>,
  max: Option<usize>,
) -> Result<(), Failure> {
  let len = s.chars().count();
  if let Some(min) = min
    && len < min
  {
    return Err((
      ViolationKind::LengthOutOfRange,
      format!("ensure this value has at least {min} characters"),
    ));
  }
  if let Some(max) = max
    && len > max
  {
    return Err((
      ViolationKind::LengthOutOfRange,
      format!("ensure this value has at most {max} characters"),
    ));
  }
  Ok(())
}

fn check_range(
  n: i64,
  gt: Option<i64>,
  ge: Option<i64>,
  lt: Option<i64>,
  le: Option<i64>,
) -> Result<(), Failure> {
  let out = |msg: String| -> Result<(), Failure> {
    Err((ViolationKind::ValueOutOfRange, msg))
  };
  if let Some(b) = gt
    && n <= b
  {
    return out(format!("ensure this value is greater than {b}"));
  }
  if let Some(b) = ge
    && n < b
  {
    return out(format!("ensure this value is greater than or equal to {b}"));
  }
  if let Some(b) = lt
    && n >= b
  {
    return out(format!("ensure this value is less than {b}"));
  }
  if let Some(b) = le
    && n > b
  {
    return out(format!("ensure this value is less than or equal to {b}"));
  }
  Ok(())
}

fn check_email<E>(email: &E) -> Result<(), Failure>
where
  E: ValidateEmail + AsRef<str>,
{
  let well_formed = email.validate_email()
    && email
      .as_ref()
      .rsplit_once('@').is_some_and(|(local, domain)| {
      dot_atom(local) && dotted_hostname(domain)
    });
  if well_formed {
    Ok(())
  } else {
    Err((
      ViolationKind::InvalidFormat,
      "value is not a valid email address".to_string(),
    ))
  }
}

fn dot_atom(local: &str) -> bool {
  !local.starts_with('.') && !local.ends_with('.') && !local.contains("..")
}

fn dotted_hostname(domain: &str) -> bool {
  match domain.rsplit_once('.') {
    Some((head, tld)) => {
      !head.is_empty()
        && !domain.starts_with('[')
        && !tld.is_empty()
        && !tld.chars().all(|c| c.is_ascii_digit())
    }
    None => false,
  }
}

fn check_url(s: &str) -> Result<(), Failure> {
  let invalid = |why: &str| -> Result<(), Failure> {
    Err((ViolationKind::InvalidFormat, format!("invalid or missing URL {why}")))
  };
  match url::Url::parse(s) {
    Ok(u) if u.cannot_be_a_base() => invalid("authority"),
    Ok(u) if !u.has_host() => invalid("host"),
    Ok(_) => Ok(()),
    Err(_) => invalid("scheme"),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn today() -> NaiveDate { NaiveDate::from_ymd_opt(2024, 6, 1).unwrap() }

  fn text(s: &str) -> FieldValue { FieldValue::Text(s.to_string()) }

  fn kind(c: &Constraint, v: &FieldValue) -> Option<ViolationKind> {
    c.check(v, today()).err().map(|(k, _)| k)
  }

  #[test]
  fn length_counts_characters_not_bytes() {
    let c = Constraint::length(1, 3);
    assert_eq!(kind(&c, &text("ñño")), None);
    assert_eq!(kind(&c, &text("")), Some(ViolationKind::LengthOutOfRange));
    assert_eq!(kind(&c, &text("abcd")), Some(ViolationKind::LengthOutOfRange));
  }

  #[test]
  fn min_length_only() {
    let c = Constraint::min_length(8);
    assert_eq!(kind(&c, &text("1234567")), Some(ViolationKind::LengthOutOfRange));
    assert_eq!(kind(&c, &text("12345678")), None);
  }

  #[test]
  fn exclusive_and_inclusive_bounds() {
    let c = Constraint::gt_le(0, 115);
    assert_eq!(kind(&c, &FieldValue::Integer(0)), Some(ViolationKind::ValueOutOfRange));
    assert_eq!(kind(&c, &FieldValue::Integer(1)), None);
    assert_eq!(kind(&c, &FieldValue::Integer(115)), None);
    assert_eq!(kind(&c, &FieldValue::Integer(116)), Some(ViolationKind::ValueOutOfRange));

    let c = Constraint::Range { gt: None, ge: Some(5), lt: Some(10), le: None };
    assert_eq!(kind(&c, &FieldValue::Integer(5)), None);
    assert_eq!(kind(&c, &FieldValue::Integer(10)), Some(ViolationKind::ValueOutOfRange));
  }

  #[test]
  fn enum_membership_is_case_sensitive() {
    let c = Constraint::OneOf(&["white", "black"]);
    assert_eq!(kind(&c, &text("black")), None);
    assert_eq!(kind(&c, &text("Black")), Some(ViolationKind::InvalidEnumValue));
  }

  #[test]
  fn email_requires_dotted_domain() {
    let c = Constraint::Email;
    assert_eq!(kind(&c, &text("mail@salmeron.com")), None);
    assert_eq!(kind(&c, &text("a.b+c@sub.example.org")), None);
    assert_eq!(kind(&c, &text("mail@localhost")), Some(ViolationKind::InvalidFormat));
    assert_eq!(kind(&c, &text("no-at-sign.com")), Some(ViolationKind::InvalidFormat));
    assert_eq!(kind(&c, &text("@example.com")), Some(ViolationKind::InvalidFormat));
  }

  #[test]
  fn email_local_part_dots_and_numeric_tld() {
    let c = Constraint::Email;
    for bad in [".a@x.com", "a..b@x.com", "a.@x.com", "a@example.123", "a@[10.0.0.1]"] {
      assert_eq!(kind(&c, &text(bad)), Some(ViolationKind::InvalidFormat), "{bad}");
    }
    assert_eq!(kind(&c, &text("first.last@x.com")), None);
    assert_eq!(kind(&c, &text("a@x1.io")), None);
  }

  #[test]
  fn url_requires_scheme_and_host() {
    let c = Constraint::Url;
    assert_eq!(kind(&c, &text("https://www.google.com/")), None);
    assert_eq!(kind(&c, &text("www.google.com")), Some(ViolationKind::InvalidFormat));
    assert_eq!(kind(&c, &text("mailto:someone@example.com")), Some(ViolationKind::InvalidFormat));
  }

  #[test]
  fn past_date_is_strict() {
    let c = Constraint::PastDate;
    let yesterday = today().pred_opt().unwrap();
    assert_eq!(kind(&c, &FieldValue::Date(yesterday)), None);
    assert_eq!(kind(&c, &FieldValue::Date(today())), Some(ViolationKind::DateNotInPast));
    let tomorrow = today().succ_opt().unwrap();
    assert_eq!(kind(&c, &FieldValue::Date(tomorrow)), Some(ViolationKind::DateNotInPast));
  }
}
