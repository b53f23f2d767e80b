//! Stops API endpoints.

use api_types::{
    MessageResponse,
    stop::{StopDetail, StopNew, StopUpdate, StopView, StopsBulkNew, StopsReorder},
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
    Path(trip_id): Path<Uuid>,
) -> Result<Json<Vec<StopView>>, ServerError> {
    let stops = state
        .engine
        .list_stops(trip_id, &user.id.to_string())
        .await?;
    Ok(Json(stops))
}

pub async fn stop_new(
    Extension(user): Extension<UserView>,
    State(state): State<ServerState>,
    Path(trip_id): Path<Uuid>,
    Json(payload): Json<StopNew>,
) -> Result<(StatusCode, Json<StopView>), ServerError> {
    let stop = state
        .engine
        .new_stop(trip_id, &user.id.to_string(), payload)
        .await?;
    Ok((StatusCode::CREATED, Json(stop)))
}

pub async fn bulk_new(
    Extension(user): Extension<UserView>,
    State(state): State<ServerState>,
    Path(trip_id): Path<Uuid>,
    Json(payload): Json<StopsBulkNew>,
) -> Result<(StatusCode, Json<Vec<StopView>>), ServerError> {
    if payload.stops.is_empty() {
        return Err(ServerError::Generic("stops must not be empty".to_string()));
    }
    let stops = state
        .engine
        .new_stops(trip_id, &user.id.to_string(), payload.stops)
        .await?;
    Ok((StatusCode::CREATED, Json(stops)))
}

pub async fn reorder(
    Extension(user): Extension<UserView>,
    State(state): State<ServerState>,
    Path(trip_id): Path<Uuid>,
    Json(payload): Json<StopsReorder>,
) -> Result<Json<Vec<StopView>>, ServerError> {
    let stops = state
        .engine
        .reorder_stops(trip_id, &user.id.to_string(), payload.stops)
        .await?;
    Ok(Json(stops))
}

pub async fn get(
    Extension(user): Extension<UserView>,
    State(state): State<ServerState>,
    Path(stop_id): Path<Uuid>,
) -> Result<Json<StopDetail>, ServerError> {
    let stop = state.engine.stop(stop_id, &user.id.to_string()).await?;
    Ok(Json(stop))
}

pub async fn update(
    Extension(user): Extension<UserView>,
    State(state): State<ServerState>,
    Path(stop_id): Path<Uuid>,
    Json(payload): Json<StopUpdate>,
) -> Result<Json<StopView>, ServerError> {
    let stop = state
        .engine
        .update_stop(stop_id, &user.id.to_string(), payload)
        .await?;
    Ok(Json(stop))
}

pub async fn delete(
    Extension(user): Extension<UserView>,
    State(state): State<ServerState>,
    Path(stop_id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ServerError> {
    state
        .engine
        .delete_stop(stop_id, &user.id.to_string())
        .await?;
    Ok(Json(MessageResponse::ok("Stop deleted successfully")))
}
