//! JSON/form HTTP API for Roster.
//!
//! Exposes an axum [`Router`] whose handlers receive their inputs through the
//! [`extract::Bound`] extractor: every declared parameter is bound and
//! validated before the handler body runs, and all violations are reported
//! together as a 422.
//!
//! # Mounting
//!
//! ```rust,ignore
//! let app = roster_api::api_router(Arc::new(PersonRegistry::default()));
//! ```

pub mod error;
pub mod extract;
pub mod forms;
pub mod persons;
pub mod uploads;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post, put},
};
use roster_core::registry::Registry;

pub use error::ApiError;
pub use extract::Bound;

/// Build the API router. `registry` answers existence checks for
/// `GET /person/detail/{person_id}`.
pub fn api_router<R>(registry: Arc<R>) -> Router<()>
where
  R: Registry + 'static,
{
  Router::new()
    .route("/", get(persons::home))
    // Person
    .route("/person/new", post(persons::create))
    .route("/person/detail", get(persons::detail))
    .route("/person/detail/{person_id}", get(persons::show::<R>))
    .route("/person/{person_id}", put(persons::update))
    // Forms
    .route("/login", post(forms::login))
    .route("/contact", post(forms::contact))
    // Files
    .route("/post-image", post(uploads::post_image))
    .with_state(registry)
}

// ─── Integration tests ────────────────────────────────────────────────────────
