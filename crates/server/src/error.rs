use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::error;
use velonet::{router, stations, store};

use crate::dto::ErrorDto;

#[derive(Debug)]
pub enum ApiError {
    Store(store::Error),
    Stations(stations::Error),
    Unauthorized,
    Internal(String),
}

impl From<store::Error> for ApiError {
    fn from(value: store::Error) -> Self {
        Self::Store(value)
    }
}

impl From<stations::Error> for ApiError {
    fn from(value: stations::Error) -> Self {
        Self::Stations(value)
    }
}

impl ApiError {
    fn status_and_kind(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::Store(store::Error::UnknownMode(_)) => (StatusCode::BAD_REQUEST, "unknown_mode"),
            ApiError::Store(store::Error::Unavailable(_)) => {
                (StatusCode::SERVICE_UNAVAILABLE, "mode_unavailable")
            }
            ApiError::Store(store::Error::InvalidCoordinate(_)) => {
                (StatusCode::BAD_REQUEST, "invalid_coordinate")
            }
            ApiError::Store(store::Error::Routing(router::Error::NoPath { .. })) => {
                (StatusCode::BAD_REQUEST, "no_path")
            }
            ApiError::Store(store::Error::Routing(router::Error::InvalidNode(_))) => {
                (StatusCode::BAD_REQUEST, "invalid_node")
            }
            ApiError::Store(store::Error::Load { .. }) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "graph_load")
            }
            ApiError::Stations(stations::Error::NoDataAvailable(_)) => {
                (StatusCode::SERVICE_UNAVAILABLE, "not_ready")
            }
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal"),
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::Store(err) => err.to_string(),
            ApiError::Stations(err) => err.to_string(),
            ApiError::Unauthorized => "Missing or invalid access token".to_string(),
            ApiError::Internal(message) => message.clone(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, kind) = self.status_and_kind();
        let error = self.message();
        if status.is_server_error() {
            error!("{kind}: {error}");
        }
        (status, Json(ErrorDto { error, kind })).into_response()
    }
}
