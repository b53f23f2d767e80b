//! Trip templates API endpoints.

use api_types::{
    MessageResponse,
    template::{TemplateFromTrip, TemplateNew, TemplateUse, TemplateView},
    trip::TripView,
    user::UserView,
};
use axum::{Extension, extract::State, http::StatusCode};
use uuid::Uuid;

use crate::{
    ServerError,
    extract::{Json, Path},
    server::ServerState,
};

pub async fn list(
    Extension(user): Extension<UserView>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<TemplateView>>, ServerError> {
    let templates = state.engine.list_templates(&user.id.to_string()).await?;
    Ok(Json(templates))
}

pub async fn template_new(
    Extension(user): Extension<UserView>,
    State(state): State<ServerState>,
    Json(payload): Json<TemplateNew>,
) -> Result<(StatusCode, Json<TemplateView>), ServerError> {
    let template = state
        .engine
        .new_template(&user.id.to_string(), payload)
        .await?;
    Ok((StatusCode::CREATED, Json(template)))
}

pub async fn from_trip(
    Extension(user): Extension<UserView>,
    State(state): State<ServerState>,
    Path(trip_id): Path<Uuid>,
    payload: Option<Json<TemplateFromTrip>>,
) -> Result<(StatusCode, Json<TemplateView>), ServerError> {
    let request = payload.map(|Json(r)| r).unwrap_or_default();
    let template = state
        .engine
        .template_from_trip(trip_id, &user.id.to_string(), request)
        .await?;
    Ok((StatusCode::CREATED, Json(template)))
}

pub async fn get(
    Extension(user): Extension<UserView>,
    State(state): State<ServerState>,
    Path(template_id): Path<Uuid>,
) -> Result<Json<TemplateView>, ServerError> {
    let template = state
        .engine
        .template(template_id, &user.id.to_string())
        .await?;
    Ok(Json(template))
}

pub async fn delete(
    Extension(user): Extension<UserView>,
    State(state): State<ServerState>,
    Path(template_id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ServerError> {
    state
        .engine
        .delete_template(template_id, &user.id.to_string())
        .await?;
    Ok(Json(MessageResponse::ok("Template deleted successfully")))
}

pub async fn use_template(
    Extension(user): Extension<UserView>,
    State(state): State<ServerState>,
    Path(template_id): Path<Uuid>,
    Json(payload): Json<TemplateUse>,
) -> Result<(StatusCode, Json<TripView>), ServerError> {
    let trip = state
        .engine
        .use_template(template_id, &user.id.to_string(), payload)
        .await?;
    Ok((StatusCode::CREATED, Json(trip)))
}
