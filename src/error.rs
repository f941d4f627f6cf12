//! Request-level error handling
//!
//! Handlers reject with a [`GatewayError`]; the recovery filter at the top of
//! the route tree turns every rejection, built-in warp ones included, into
//! the normalized JSON envelope.

use std::convert::Infallible;

use thiserror::Error;
use warp::http::StatusCode;
use warp::{Rejection, Reply};

use crate::extract::ExtractError;
use crate::models::ApiResponse;
use crate::providers::ProviderError;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("{0}")]
    BadRequest(String),
    #[error(transparent)]
    Extraction(#[from] ExtractError),
    #[error(transparent)]
    Upstream(#[from] ProviderError),
}

impl GatewayError {
    fn status(&self) -> StatusCode {
        match self {
            GatewayError::BadRequest(_) => StatusCode::BAD_REQUEST,
            GatewayError::Extraction(_) => StatusCode::BAD_REQUEST,
            GatewayError::Upstream(ProviderError::InvalidRequest(_)) => StatusCode::BAD_REQUEST,
            GatewayError::Upstream(ProviderError::Timeout { .. }) => StatusCode::GATEWAY_TIMEOUT,
            GatewayError::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl warp::reject::Reject for GatewayError {}

/// Wrap a gateway error as a warp rejection.
pub fn reject(err: impl Into<GatewayError>) -> Rejection {
    warp::reject::custom(err.into())
}

/// Convert any rejection into the JSON envelope.
pub async fn handle_rejection(rejection: Rejection) -> Result<impl Reply, Infallible> {
    let (status, message) = if rejection.is_not_found() {
        (StatusCode::NOT_FOUND, "Not found".to_string())
    } else if let Some(err) = rejection.find::<GatewayError>() {
        if err.status().is_server_error() {
            tracing::error!(error = %err, "Request failed");
        } else {
            tracing::debug!(error = %err, "Request rejected");
        }
        (err.status(), err.to_string())
    } else if let Some(err) = rejection.find::<warp::filters::body::BodyDeserializeError>() {
        (StatusCode::BAD_REQUEST, err.to_string())
    } else if rejection
        .find::<warp::reject::PayloadTooLarge>()
        .is_some()
    {
        (StatusCode::PAYLOAD_TOO_LARGE, "Payload too large".to_string())
    } else if rejection
        .find::<warp::reject::MethodNotAllowed>()
        .is_some()
    {
        (
            StatusCode::METHOD_NOT_ALLOWED,
            "Method not allowed".to_string(),
        )
    } else {
        tracing::error!(?rejection, "Unhandled rejection");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal server error".to_string(),
        )
    };

    let body = ApiResponse::error(status.as_u16(), message);
    Ok(warp::reply::with_status(
        warp::reply::json(&body),
        status,
    ))
}
