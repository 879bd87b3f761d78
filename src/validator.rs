//! Request body and query extractors that reject with [`AppError`].
//!
//! Axum's own rejections are plain text. These wrap them so a bad body or
//! query string produces the usual `{"error", "kind": "invalid_operation"}`.

use axum::{
    Json,
    extract::{
        FromRequest, FromRequestParts, Query, Request,
        rejection::{JsonRejection, QueryRejection},
    },
    http::request::Parts,
};
use embryotech_core::AppError;
use serde::de::DeserializeOwned;

fn json_rejection(rejection: JsonRejection) -> AppError {
    let error_msg = rejection.body_text();

    if error_msg.contains("missing field") {
        let field = error_msg
            .split("missing field `")
            .nth(1)
            .and_then(|s| s.split('`').next())
            .unwrap_or("unknown");
        return AppError::invalid_operation(format!("{} is required", field));
    }

    if error_msg.contains("invalid type") {
        return AppError::invalid_operation("Invalid field type in request");
    }

    if matches!(rejection, JsonRejection::MissingJsonContentType(_)) {
        return AppError::invalid_operation("Missing 'Content-Type: application/json' header");
    }

    AppError::invalid_operation("Invalid request body")
}

/// JSON body without validation.
///
/// Handlers that must audit every attempt take `Result<AppJson<T>, AppError>`
/// and validate in the service.
#[derive(Debug, Clone, Copy, Default)]
pub struct AppJson<T>(pub T);

impl<T, S> FromRequest<S> for AppJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(json_rejection)?;
        Ok(AppJson(value))
    }
}

/// Query string with the same error shape as the JSON extractors.
#[derive(Debug, Clone, Copy, Default)]
pub struct AppQuery<T>(pub T);

impl<T, S> FromRequestParts<S> for AppQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection: QueryRejection| {
                AppError::invalid_operation(format!(
                    "Invalid query string: {}",
                    rejection.body_text()
                ))
            })?;
        Ok(AppQuery(value))
    }
}
