//! Query-string extractor that rejects with [`ApiError`].
//!
//! axum's `Query<T>` answers a malformed query string with a plain-text 400.
//! `ApiQuery<T>` runs the same deserialization but reports failures in the
//! JSON error shape every other endpoint uses.

use axum::{
    async_trait,
    extract::{FromRequestParts, Query},
    http::request::Parts,
};
use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// Extractor for query parameters.
///
/// # Example
///
/// ```rust,ignore
/// async fn get_attached_files(ApiQuery(query): ApiQuery<DidQuery>) -> ApiResult<Json<...>> {
///     // ...
/// }
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiQuery<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for ApiQuery<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::invalid_input(e.body_text()))?;
        Ok(ApiQuery(value))
    }
}
