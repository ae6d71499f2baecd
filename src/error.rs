use axum::extract::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use std::fmt::Debug;

use crate::pricing::EstimationError;

#[derive(Debug)]
pub struct Error {
    pub code: i32,
    pub message: String,
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        database_error(err)
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        reqwest_error(err)
    }
}

impl From<oso::OsoError> for Error {
    fn from(err: oso::OsoError) -> Self {
        authorizor_error(err)
    }
}

impl From<EstimationError> for Error {
    fn from(err: EstimationError) -> Self {
        match err {
            EstimationError::InvalidCoordinates => invalid_input_error(),
            EstimationError::NoRoute => no_route_error(),
            EstimationError::TransientProviderFailure(reason) => {
                tracing::warn!("routing provider failure: {}", reason);
                routing_unavailable_error()
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, error_message) = match self.code {
            6 => (StatusCode::SERVICE_UNAVAILABLE, self.message.as_str()),
            1..=99 => (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error"),
            102 => (StatusCode::UNPROCESSABLE_ENTITY, self.message.as_str()),
            103 => (StatusCode::FORBIDDEN, self.message.as_str()),
            104 => (StatusCode::NOT_FOUND, self.message.as_str()),
            _ => (StatusCode::BAD_REQUEST, self.message.as_str()),
        };

        let body = Json(json!({
            "code": self.code,
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

pub fn invalid_state_error() -> Error {
    Error {
        code: 100,
        message: "invalid state".into(),
    }
}

pub fn invalid_input_error() -> Error {
    Error {
        code: 101,
        message: "invalid input".into(),
    }
}

pub fn no_route_error() -> Error {
    Error {
        code: 102,
        message: "no route between the given locations".into(),
    }
}

pub fn unauthorized_error() -> Error {
    Error {
        code: 103,
        message: "unauthorized".into(),
    }
}

pub fn not_found_error() -> Error {
    Error {
        code: 104,
        message: "not found".into(),
    }
}

pub fn database_error<T: Debug>(err: T) -> Error {
    tracing::error!("database error: {:?}", err);

    Error {
        code: 2,
        message: "database error".into(),
    }
}

pub fn reqwest_error(err: reqwest::Error) -> Error {
    tracing::error!("reqwest error: {:?}", err);

    Error {
        code: 3,
        message: "reqwest error".into(),
    }
}

pub fn invalid_config_error(name: &str) -> Error {
    Error {
        code: 4,
        message: format!("invalid configuration value for {}", name),
    }
}

pub fn authorizor_error(err: oso::OsoError) -> Error {
    tracing::error!("authorizor error: {:?}", err);

    Error {
        code: 5,
        message: "authorizor error".into(),
    }
}

pub fn routing_unavailable_error() -> Error {
    Error {
        code: 6,
        message: "routing provider unavailable".into(),
    }
}

pub fn server_error<T: Debug>(err: T) -> Error {
    tracing::error!("server error: {:?}", err);

    Error {
        code: 7,
        message: "server error".into(),
    }
}

pub fn catalog_error<T: Debug>(locale: &str, err: T) -> Error {
    tracing::error!("malformed translation catalog {}: {:?}", locale, err);

    Error {
        code: 8,
        message: "translation catalog error".into(),
    }
}
