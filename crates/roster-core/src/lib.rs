//! Typed input validation and request binding for the Roster service.
//!
//! Raw request input (path segments, query strings, bodies, form fields,
//! headers, cookies, uploads) is checked against plain-data [`schema`]
//! descriptors and turned into typed [`model`] values before a handler runs.
//! Outbound values pass through a [`shape::Shaper`] to drop fields such as
//! passwords.
//!
//! This crate has no HTTP dependency; `roster-api` adapts axum requests into
//! a [`bind::RequestInput`].

pub mod bind;
pub mod constraint;
pub mod error;
pub mod model;
pub mod registry;
pub mod schema;
pub mod shape;
pub mod value;

pub use error::{Error, Result, ValidationErrors, Violation, ViolationKind};
