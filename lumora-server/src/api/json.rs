//! JSON request bodies with the API error shape
//!
//! axum's own `Json` extractor answers malformed bodies with plain text.
//! [`JsonBody`] turns those rejections into `{"error": {code, message}}`.

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use tracing::debug;

use crate::ApiError;

/// Request body extractor; rejections become 400 `BAD_REQUEST`
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => {
                debug!(status = %rejection.status(), "Rejected request body");
                Err(ApiError::BadRequest(rejection.body_text()))
            }
        }
    }
}
