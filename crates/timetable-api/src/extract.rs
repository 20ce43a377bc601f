//! Extractors that reject with [`ApiError`] instead of axum's plain-text
//! rejections, so every client error carries the same JSON body.

use axum::extract::{
  FromRequest, FromRequestParts, Json, OptionalFromRequest, Path, Query,
  Request,
  rejection::{JsonRejection, PathRejection, QueryRejection},
};
use axum::http::request::Parts;
use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// A JSON request body. As `Option<ApiJson<T>>` a request without a
/// `Content-Type` header yields `None`.
pub struct ApiJson<T>(pub T);

/// URL query parameters.
pub struct ApiQuery<T>(pub T);

/// Path parameters.
pub struct ApiPath<T>(pub T);

impl From<JsonRejection> for ApiError {
  fn from(rejection: JsonRejection) -> Self {
    ApiError::BadRequest(rejection.body_text())
  }
}

impl From<QueryRejection> for ApiError {
  fn from(rejection: QueryRejection) -> Self {
    ApiError::BadRequest(rejection.body_text())
  }
}

impl From<PathRejection> for ApiError {
  fn from(rejection: PathRejection) -> Self {
    ApiError::BadRequest(rejection.body_text())
  }
}

impl<T, S> FromRequest<S> for ApiJson<T>
where
  T: DeserializeOwned,
  S: Send + Sync,
{
  type Rejection = ApiError;

  async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
    let Json(value) = <Json<T> as FromRequest<S>>::from_request(req, state).await?;
    Ok(Self(value))
  }
}

impl<T, S> OptionalFromRequest<S> for ApiJson<T>
where
  T: DeserializeOwned,
  S: Send + Sync,
{
  type Rejection = ApiError;

  async fn from_request(
    req: Request,
    state: &S,
  ) -> Result<Option<Self>, Self::Rejection> {
    let value =
      <Json<T> as OptionalFromRequest<S>>::from_request(req, state).await?;
    Ok(value.map(|Json(v)| Self(v)))
  }
}

impl<T, S> FromRequestParts<S> for ApiQuery<T>
where
  T: DeserializeOwned,
  S: Send + Sync,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &S,
  ) -> Result<Self, Self::Rejection> {
    let Query(value) = Query::<T>::from_request_parts(parts, state).await?;
    Ok(Self(value))
  }
}

impl<T, S> FromRequestParts<S> for ApiPath<T>
where
  T: DeserializeOwned + Send,
  S: Send + Sync,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &S,
  ) -> Result<Self, Self::Rejection> {
    let Path(value) = Path::<T>::from_request_parts(parts, state).await?;
    Ok(Self(value))
  }
}
