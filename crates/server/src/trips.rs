//! Trips API endpoints.

use api_types::{
    MessageResponse,
    stats::TripStats,
    trip::{TripDetail, TripListQuery, TripNew, TripSummary, TripUpdate, TripView},
    user::UserView,
};
use axum::{Extension, extract::State, http::StatusCode};
use uuid::Uuid;

use crate::{
    ServerError,
    extract::{Json, Path, Query},
    server::ServerState,
};

pub async fn list(
    Extension(user): Extension<UserView>,
    State(state): State<ServerState>,
    Query(query): Query<TripListQuery>,
) -> Result<Json<Vec<TripSummary>>, ServerError> {
    let trips = state
        .engine
        .list_trips(&user.id.to_string(), query)
        .await?;
    Ok(Json(trips))
}

pub async fn shared(
    Extension(user): Extension<UserView>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<TripSummary>>, ServerError> {
    let trips = state.engine.shared_trips(&user.id.to_string()).await?;
    Ok(Json(trips))
}

/// No authentication: trips their owners marked public.
pub async fn public(
    State(state): State<ServerState>,
) -> Result<Json<Vec<TripSummary>>, ServerError> {
    let trips = state.engine.public_trips().await?;
    Ok(Json(trips))
}

pub async fn trip_new(
    Extension(user): Extension<UserView>,
    State(state): State<ServerState>,
    Json(payload): Json<TripNew>,
) -> Result<(StatusCode, Json<TripView>), ServerError> {
    let trip = state
        .engine
        .new_trip(&user.id.to_string(), payload)
        .await?;
    Ok((StatusCode::CREATED, Json(trip)))
}

pub async fn get(
    Extension(user): Extension<UserView>,
    State(state): State<ServerState>,
    Path(trip_id): Path<Uuid>,
) -> Result<Json<TripView>, ServerError> {
    let trip = state.engine.trip(trip_id, &user.id.to_string()).await?;
    Ok(Json(trip))
}

pub async fn detail(
    Extension(user): Extension<UserView>,
    State(state): State<ServerState>,
    Path(trip_id): Path<Uuid>,
) -> Result<Json<TripDetail>, ServerError> {
    let trip = state
        .engine
        .trip_detail(trip_id, &user.id.to_string())
        .await?;
    Ok(Json(trip))
}

pub async fn update(
    Extension(user): Extension<UserView>,
    State(state): State<ServerState>,
    Path(trip_id): Path<Uuid>,
    Json(payload): Json<TripUpdate>,
) -> Result<Json<TripView>, ServerError> {
    let trip = state
        .engine
        .update_trip(trip_id, &user.id.to_string(), payload)
        .await?;
    Ok(Json(trip))
}

pub async fn delete(
    Extension(user): Extension<UserView>,
    State(state): State<ServerState>,
    Path(trip_id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ServerError> {
    state
        .engine
        .delete_trip(trip_id, &user.id.to_string())
        .await?;
    Ok(Json(MessageResponse::ok("Trip deleted successfully")))
}

pub async fn stats(
    Extension(user): Extension<UserView>,
    State(state): State<ServerState>,
    Path(trip_id): Path<Uuid>,
) -> Result<Json<TripStats>, ServerError> {
    let stats = state
        .engine
        .trip_stats(trip_id, &user.id.to_string())
        .await?;
    Ok(Json(stats))
}
