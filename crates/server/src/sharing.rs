//! Public sharing: publish a trip, read it by slug and copy it.

use api_types::{
    MessageResponse,
    share::{CopyTrip, PublicTrip, PublicTripQuery, ShareSettings, ShareView},
    trip::TripView,
    user::UserView,
};
use axum::{Extension, extract::State, http::StatusCode};
use uuid::Uuid;

use crate::{
    ServerError,
    extract::{Json, Path, Query},
    server::ServerState,
};

pub async fn share(
    Extension(user): Extension<UserView>,
    State(state): State<ServerState>,
    Path(trip_id): Path<Uuid>,
    payload: Option<Json<ShareSettings>>,
) -> Result<Json<ShareView>, ServerError> {
    let settings = payload.map(|Json(s)| s).unwrap_or_default();
    let share = state
        .engine
        .share_trip(trip_id, &user.id.to_string(), settings)
        .await?;
    Ok(Json(share))
}

pub async fn unshare(
    Extension(user): Extension<UserView>,
    State(state): State<ServerState>,
    Path(trip_id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ServerError> {
    state
        .engine
        .unshare_trip(trip_id, &user.id.to_string())
        .await?;
    Ok(Json(MessageResponse::ok("Trip is no longer shared")))
}

/// No authentication: anyone holding the slug (and the password, when set)
/// can read the trip.
pub async fn public_trip(
    State(state): State<ServerState>,
    Path(slug): Path<String>,
    Query(query): Query<PublicTripQuery>,
) -> Result<Json<PublicTrip>, ServerError> {
    let trip = state
        .engine
        .public_trip(&slug, query.password.as_deref())
        .await?;
    Ok(Json(trip))
}

pub async fn copy(
    Extension(user): Extension<UserView>,
    State(state): State<ServerState>,
    Path(slug): Path<String>,
    payload: Option<Json<CopyTrip>>,
) -> Result<(StatusCode, Json<TripView>), ServerError> {
    let request = payload.map(|Json(c)| c).unwrap_or_default();
    let trip = state
        .engine
        .copy_public_trip(&slug, &user.id.to_string(), request.password.as_deref())
        .await?;
    tracing::info!("trip {} copied from /public/{slug}", trip.id);
    Ok((StatusCode::CREATED, Json(trip)))
}
