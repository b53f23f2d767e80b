//! `Json`, `Path` and `Query` extractors whose rejections are reported as
//! [`ServerError`] bodies instead of axum's plain text.

use axum::{
    extract::{
        FromRequest, FromRequestParts, OptionalFromRequest, Request,
        path::ErrorKind,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    response::{IntoResponse, Response},
};
use serde::{Serialize, de::DeserializeOwned};

use crate::ServerError;

#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ServerError))]
pub struct Json<T>(pub T);

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}

/// A missing body or content type yields `None`, a malformed one is rejected.
impl<T, S> OptionalFromRequest<S> for Json<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request(req: Request, state: &S) -> Result<Option<Self>, Self::Rejection> {
        let value = <axum::Json<T> as OptionalFromRequest<S>>::from_request(req, state).await?;
        Ok(value.map(|axum::Json(inner)| Json(inner)))
    }
}

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ServerError))]
pub struct Path<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ServerError))]
pub struct Query<T>(pub T);

/// Name of the offending field in a deserialization message, if it has one.
///
/// Understands serde's "missing field `x`", axum's "Cannot parse `x`" and
/// the `path.to.field: reason` prefix of path-aware JSON errors.
pub(crate) fn rejected_field(text: &str) -> Option<String> {
    let detail = text.split_once(": ").map_or(text, |(_, rest)| rest);
    for marker in ["missing field `", "unknown field `", "Cannot parse `"] {
        if let Some(start) = detail.find(marker) {
            let rest = &detail[start + marker.len()..];
            if let Some(end) = rest.find('`') {
                return Some(rest[..end].to_string());
            }
        }
    }
    let (path, _) = detail.split_once(": ")?;
    let is_path = !path.is_empty()
        && path
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '_' | '.' | '[' | ']'));
    is_path.then(|| path.to_string())
}

impl From<JsonRejection> for ServerError {
    fn from(rejection: JsonRejection) -> Self {
        let message = rejection.body_text();
        Self::Rejected {
            status: rejection.status(),
            field: rejected_field(&message),
            message,
        }
    }
}

impl From<PathRejection> for ServerError {
    fn from(rejection: PathRejection) -> Self {
        let key = match &rejection {
            PathRejection::FailedToDeserializePathParams(err) => match err.kind() {
                ErrorKind::ParseErrorAtKey { key, .. }
                | ErrorKind::DeserializeError { key, .. }
                | ErrorKind::InvalidUtf8InPathParam { key } => Some(key.clone()),
                _ => None,
            },
            _ => None,
        };
        let message = rejection.body_text();
        Self::Rejected {
            status: rejection.status(),
            field: key.or_else(|| rejected_field(&message)),
            message,
        }
    }
}

impl From<QueryRejection> for ServerError {
    fn from(rejection: QueryRejection) -> Self {
        let message = rejection.body_text();
        Self::Rejected {
            status: rejection.status(),
            field: rejected_field(&message),
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_of_missing_json_field() {
        assert_eq!(
            rejected_field(
                "Failed to deserialize the JSON body into the target type: missing field `name` at line 1 column 52"
            )
            .as_deref(),
            Some("name")
        );
    }

    #[test]
    fn field_of_path_aware_json_error() {
        assert_eq!(
            rejected_field(
                "Failed to deserialize the JSON body into the target type: start_date: input contains invalid characters at line 1 column 30"
            )
            .as_deref(),
            Some("start_date")
        );
    }

    #[test]
    fn field_of_path_param() {
        assert_eq!(
            rejected_field("Invalid URL: Cannot parse `id` with value `abc` to a `Uuid`").as_deref(),
            Some("id")
        );
    }

    #[test]
    fn syntax_errors_have_no_field() {
        assert_eq!(
            rejected_field("Failed to parse the request body as JSON: key must be a string at line 1 column 2"),
            None
        );
        assert_eq!(
            rejected_field(
                "Failed to deserialize the JSON body into the target type: invalid type: string \"x\", expected u8 at line 1 column 9"
            ),
            None
        );
    }
}
