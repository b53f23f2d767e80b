use axum::{http::StatusCode, response::IntoResponse};
use engine::EngineError;

use serde::Serialize;
pub use auth::{AuthError, AuthSettings, Claims, TokenType};
pub use server::{ServerState, app, run_with_listener};

use extract::Json;

mod account;
mod activities;
mod auth;
mod budget;
mod catalog;
mod collaborators;
mod community;
mod extract;
mod server;
mod sharing;
mod stops;
mod templates;
mod trips;
mod users;

pub enum ServerError {
    Engine(EngineError),
    Auth(AuthError),
    Generic(String),
    /// The request could not be extracted: malformed JSON, a missing field,
    /// a bad path or query parameter.
    Rejected {
        status: StatusCode,
        message: String,
        field: Option<String>,
    },
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    field: Option<String>,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::Forbidden(_) => StatusCode::FORBIDDEN,
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::ExistingKey(_) | EngineError::Conflict(_) => StatusCode::CONFLICT,
        EngineError::InvalidCredentials => StatusCode::UNAUTHORIZED,
        EngineError::InvalidField { .. }
        | EngineError::InvalidAmount(_)
        | EngineError::InvalidId(_) => StatusCode::UNPROCESSABLE_ENTITY,
        EngineError::MissingRelation(_) | EngineError::Crypto(_) | EngineError::Database(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn body_for_engine_error(err: EngineError) -> ErrorBody {
    let field = match &err {
        EngineError::InvalidField { field, .. } => Some(field.clone()),
        _ => None,
    };
    let message = match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        EngineError::MissingRelation(what) => {
            tracing::error!("missing relation: {what}");
            "internal server error".to_string()
        }
        EngineError::Crypto(reason) => {
            tracing::error!("crypto failure: {reason}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    };
    ErrorBody {
        message,
        success: false,
        field,
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, body) = match self {
            ServerError::Engine(err) => (status_for_engine_error(&err), body_for_engine_error(err)),
            ServerError::Auth(err) => {
                let status = err.status();
                if status == StatusCode::INTERNAL_SERVER_ERROR {
                    tracing::error!("token failure: {err}");
                }
                (
                    status,
                    ErrorBody {
                        message: err.to_string(),
                        success: false,
                        field: None,
                    },
                )
            }
            ServerError::Generic(message) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    message,
                    success: false,
                    field: None,
                },
            ),
            ServerError::Rejected {
                status,
                message,
                field,
            } => (
                status,
                ErrorBody {
                    message,
                    success: false,
                    field,
                },
            ),
        };

        (status, Json(body)).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

impl From<AuthError> for ServerError {
    fn from(value: AuthError) -> Self {
        Self::Auth(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_forbidden_maps_to_403() {
        let res = ServerError::from(EngineError::Forbidden("forbidden".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn engine_not_found_maps_to_404() {
        let res = ServerError::from(EngineError::KeyNotFound("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn engine_duplicates_and_conflicts_map_to_409() {
        let res = ServerError::from(EngineError::ExistingKey("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::CONFLICT);
        let res = ServerError::from(EngineError::Conflict("stale".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn engine_validation_maps_to_422() {
        let res = ServerError::from(EngineError::InvalidField {
            field: "name".to_string(),
            reason: "must not be empty".to_string(),
        })
        .into_response();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn bad_credentials_map_to_401() {
        let res = ServerError::from(EngineError::InvalidCredentials).into_response();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        let res = ServerError::from(AuthError::MissingToken).into_response();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn missing_budget_maps_to_500() {
        let res =
            ServerError::from(EngineError::MissingRelation("budget".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn generic_maps_to_400() {
        let res = ServerError::Generic("bad".to_string()).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn rejections_keep_their_status() {
        let res = ServerError::Rejected {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            message: "missing field `name`".to_string(),
            field: Some("name".to_string()),
        }
        .into_response();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn validation_body_names_the_field() {
        let body = body_for_engine_error(EngineError::InvalidField {
            field: "end_date".to_string(),
            reason: "must not be before start_date".to_string(),
        });
        assert_eq!(body.field.as_deref(), Some("end_date"));
        assert!(!body.success);
    }
}
