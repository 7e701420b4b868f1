//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server-side errors to
//! Sentry before responding to the client. All route handlers should return
//! `Result<T, AppError>`. Every failure is translated into a short
//! human-readable notification; none propagates as an uncaught fault.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::cart::CartError;
use crate::catalog::CatalogError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Cart operation failed.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// Catalog API operation failed outside of a cart operation.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// JSON body carried by every error response.
#[derive(Debug, Serialize)]
struct ErrorBody {
    message: String,
}

impl AppError {
    /// Whether this failure is server-side (worth capturing) rather than a
    /// client mistake like an unknown id or an invalid amount.
    fn is_server_error(&self) -> bool {
        match self {
            Self::Internal(_) => true,
            Self::Cart(err) => matches!(err, CartError::Catalog(_) | CartError::Snapshot(_)),
            Self::Catalog(err) => !matches!(err, CatalogError::NotFound(_)),
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::Cart(err) => match err {
                CartError::NotFound(_) => StatusCode::NOT_FOUND,
                CartError::OutOfStock(_) => StatusCode::CONFLICT,
                CartError::InvalidAmount(_) => StatusCode::UNPROCESSABLE_ENTITY,
                CartError::Catalog(_) => StatusCode::BAD_GATEWAY,
                CartError::Snapshot(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Catalog(err) => match err {
                CatalogError::NotFound(_) => StatusCode::NOT_FOUND,
                _ => StatusCode::BAD_GATEWAY,
            },
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The notification shown to the shopper. Internal details stay out of
    /// responses.
    fn message(&self) -> String {
        match self {
            Self::Cart(err) => match err {
                CartError::NotFound(_) => "Product not found".to_string(),
                CartError::OutOfStock(_) => "Requested amount is out of stock".to_string(),
                CartError::InvalidAmount(_) => "Requested amount is invalid".to_string(),
                CartError::Catalog(_) => {
                    "Store is temporarily unavailable, please try again".to_string()
                }
                CartError::Snapshot(_) => "Internal server error".to_string(),
            },
            Self::Catalog(CatalogError::NotFound(_)) => "Product not found".to_string(),
            Self::Catalog(_) => "Store is temporarily unavailable, please try again".to_string(),
            Self::Internal(_) => "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let body = ErrorBody {
            message: self.message(),
        };

        (self.status(), Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
