//! `POST /post-image`: multipart upload of one or more `images` parts.

use std::sync::LazyLock;

use axum::Json;
use roster_core::{
  Result,
  model::Model,
  schema::{Field, Schema},
  value::{Record, UploadedFile},
};

use crate::extract::Bound;

static IMAGE_UPLOAD: LazyLock<Schema> = LazyLock::new(|| {
  Schema::builder("ImageUpload").field(Field::files("images")).build()
});

#[derive(Debug)]
pub struct ImageUpload {
  pub images: Vec<UploadedFile>,
}

impl Model for ImageUpload {
  fn schema() -> &'static Schema { &IMAGE_UPLOAD }

  fn from_record(mut r: Record) -> Result<Self> {
    Ok(Self { images: r.take_files("images")? })
  }
}

/// One `{filename, contentType, sizeKB}` entry per uploaded part.
pub async fn post_image(Bound(upload): Bound<ImageUpload>) -> Json<Vec<UploadedFile>> {
  Json(upload.images)
}
