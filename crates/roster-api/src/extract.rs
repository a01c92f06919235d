//! The [`Bound`] extractor: snapshot a request's channels and run the binder.
//!
//! `Bound<M>` consumes the body, so it must be the last extractor in a
//! handler's argument list.

use axum::{
  Form,
  extract::{
    FromRequest, FromRequestParts, Multipart, Query, RawPathParams, Request,
    rejection::RawPathParamsRejection,
  },
  http::{HeaderMap, header},
};
use axum_extra::extract::CookieJar;
use bytes::Bytes;
use chrono::Local;
use roster_core::{
  bind::RequestInput,
  model::Model,
  schema::Schema,
  value::UploadedFile,
};
use tracing::debug;

use crate::error::ApiError;

/// A model bound and validated from the request.
#[derive(Debug)]
pub struct Bound<M>(pub M);

impl<S, M> FromRequest<S> for Bound<M>
where
  S: Send + Sync,
  M: Model + Send,
{
  type Rejection = ApiError;

  async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
    let input = read_input(req, state, M::schema()).await?;
    // Past-date checks compare against the server's calendar date.
    let today = Local::now().date_naive();
    Ok(Bound(M::bind(&input, today)?))
  }
}

/// Copy every channel `schema` may read into a [`RequestInput`].
///
/// The body is only read when the schema declares a body, form or file
/// field.
pub async fn read_input<S>(
  req: Request,
  state: &S,
  schema: &Schema,
) -> Result<RequestInput, ApiError>
where
  S: Send + Sync,
{
  let (mut parts, body) = req.into_parts();
  let mut input = RequestInput::new();

  match RawPathParams::from_request_parts(&mut parts, state).await {
    Ok(params) => {
      input.path = params
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    }
    // Routes without parameters have nothing to offer here.
    Err(RawPathParamsRejection::MissingPathParams(_)) => {}
    Err(e) => return Err(ApiError::BadRequest(e.body_text())),
  }

  if parts.uri.query().is_some() {
    let Query(query) = Query::<Vec<(String, String)>>::try_from_uri(&parts.uri)
      .map_err(|e| ApiError::BadRequest(e.body_text()))?;
    input.query = query;
  }

  input.headers = header_pairs(&parts.headers);
  input.cookies = CookieJar::from_headers(&parts.headers)
    .iter()
    .map(|c| (c.name().to_string(), c.value().to_string()))
    .collect();

  if schema.reads_body() {
    read_body(Request::from_parts(parts, body), state, &mut input).await?;
  }
  Ok(input)
}

/// Non-ASCII header bytes are decoded as UTF-8, lossily.
fn header_pairs(headers: &HeaderMap) -> Vec<(String, String)> {
  headers
    .iter()
    .map(|(k, v)| {
      (
        k.as_str().to_string(),
        String::from_utf8_lossy(v.as_bytes()).into_owned(),
      )
    })
    .collect()
}

async fn read_body<S>(
  req: Request,
  state: &S,
  input: &mut RequestInput,
) -> Result<(), ApiError>
where
  S: Send + Sync,
{
  let content_type = req
    .headers()
    .get(header::CONTENT_TYPE)
    .and_then(|v| v.to_str().ok())
    .unwrap_or_default()
    .to_ascii_lowercase();

  if content_type.starts_with("multipart/form-data") {
    let multipart = Multipart::from_request(req, state)
      .await
      .map_err(|e| ApiError::BadRequest(e.body_text()))?;
    return read_multipart(multipart, input).await;
  }

  if content_type.starts_with("application/x-www-form-urlencoded") {
    let Form(pairs) = Form::<Vec<(String, String)>>::from_request(req, state)
      .await
      .map_err(|e| ApiError::BadRequest(e.body_text()))?;
    input.form = pairs;
    return Ok(());
  }

  let bytes = Bytes::from_request(req, state)
    .await
    .map_err(|e| ApiError::BadRequest(e.body_text()))?;
  if bytes.is_empty() {
    return Ok(());
  }
  let value = serde_json::from_slice(&bytes)
    .map_err(|e| ApiError::BadRequest(format!("malformed JSON body: {e}")))?;
  input.body = Some(value);
  Ok(())
}

/// Text parts become form fields; parts with a filename are streamed to
/// count their length and then dropped.
async fn read_multipart(
  mut multipart: Multipart,
  input: &mut RequestInput,
) -> Result<(), ApiError> {
  let bad = |e: axum::extract::multipart::MultipartError| {
    ApiError::BadRequest(e.body_text())
  };

  while let Some(mut field) = multipart.next_field().await.map_err(bad)? {
    let name = field.name().unwrap_or_default().to_string();
    match field.file_name().map(str::to_string) {
      Some(filename) => {
        let content_type = field
          .content_type()
          .unwrap_or("application/octet-stream")
          .to_string();
        let mut size = 0u64;
        while let Some(chunk) = field.chunk().await.map_err(bad)? {
          size += chunk.len() as u64;
        }
        debug!(field = %name, %filename, size, "received upload");
        input
          .files
          .push((name, UploadedFile { filename, content_type, size }));
      }
      None => {
        let text = field.text().await.map_err(bad)?;
        input.form.push((name, text));
      }
    }
  }
  Ok(())
}
