// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

use crate::{providers::plaid::PlaidError, storage::ClientDbError};

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            error: self.message,
        });
        (self.status, body).into_response()
    }
}

impl From<PlaidError> for ApiError {
    fn from(err: PlaidError) -> Self {
        match err {
            PlaidError::InvalidPhoneNumber(raw) => {
                ApiError::bad_request(format!("Invalid phone number: {raw}"))
            }
            PlaidError::MissingConfig(message) => {
                ApiError::service_unavailable(format!("Plaid configuration error: {message}"))
            }
            PlaidError::Request(message) | PlaidError::InvalidResponse(message) => {
                ApiError::service_unavailable(format!("Plaid request failed: {message}"))
            }
            PlaidError::Api(failure) => ApiError::new(
                StatusCode::BAD_GATEWAY,
                format!(
                    "Plaid rejected the request: {} ({})",
                    failure.error_message, failure.error_code
                ),
            ),
        }
    }
}

impl From<ClientDbError> for ApiError {
    fn from(err: ClientDbError) -> Self {
        match err {
            ClientDbError::NotFound(what) => ApiError::not_found(format!("{what} not found")),
            other => {
                error!(error = %other, "Client database failure");
                ApiError::internal("Failed to access storage")
            }
        }
    }
}
