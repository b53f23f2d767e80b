//! Profile, preferences, saved destinations and travel statistics of the
//! authenticated user.

use api_types::{
    MessageResponse,
    stats::UserStats,
    user::{
        CompleteProfile, PreferencesUpdate, PreferencesView, ProfileUpdate, ProfileView,
        SavedDestinationNew, SavedDestinationUpdate, SavedDestinationView, UserView,
    },
};
use axum::{Extension, extract::State, http::StatusCode};
use uuid::Uuid;

use crate::{
    ServerError,
    extract::{Json, Path},
    server::ServerState,
};

pub async fn profile(
    Extension(user): Extension<UserView>,
    State(state): State<ServerState>,
) -> Result<Json<ProfileView>, ServerError> {
    let profile = state.engine.profile(&user.id.to_string()).await?;
    Ok(Json(profile))
}

pub async fn update_profile(
    Extension(user): Extension<UserView>,
    State(state): State<ServerState>,
    Json(payload): Json<ProfileUpdate>,
) -> Result<Json<ProfileView>, ServerError> {
    let profile = state
        .engine
        .update_profile(&user.id.to_string(), payload)
        .await?;
    Ok(Json(profile))
}

pub async fn preferences(
    Extension(user): Extension<UserView>,
    State(state): State<ServerState>,
) -> Result<Json<PreferencesView>, ServerError> {
    let preferences = state.engine.preferences(&user.id.to_string()).await?;
    Ok(Json(preferences))
}

pub async fn update_preferences(
    Extension(user): Extension<UserView>,
    State(state): State<ServerState>,
    Json(payload): Json<PreferencesUpdate>,
) -> Result<Json<PreferencesView>, ServerError> {
    let preferences = state
        .engine
        .update_preferences(&user.id.to_string(), payload)
        .await?;
    Ok(Json(preferences))
}

pub async fn complete_profile(
    Extension(user): Extension<UserView>,
    State(state): State<ServerState>,
) -> Result<Json<CompleteProfile>, ServerError> {
    let profile = state.engine.complete_profile(&user.id.to_string()).await?;
    Ok(Json(profile))
}

pub async fn stats(
    Extension(user): Extension<UserView>,
    State(state): State<ServerState>,
) -> Result<Json<UserStats>, ServerError> {
    let stats = state.engine.user_stats(&user.id.to_string()).await?;
    Ok(Json(stats))
}

pub async fn list_destinations(
    Extension(user): Extension<UserView>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<SavedDestinationView>>, ServerError> {
    let destinations = state
        .engine
        .list_saved_destinations(&user.id.to_string())
        .await?;
    Ok(Json(destinations))
}

pub async fn destination_new(
    Extension(user): Extension<UserView>,
    State(state): State<ServerState>,
    Json(payload): Json<SavedDestinationNew>,
) -> Result<(StatusCode, Json<SavedDestinationView>), ServerError> {
    let destination = state
        .engine
        .new_saved_destination(&user.id.to_string(), payload)
        .await?;
    Ok((StatusCode::CREATED, Json(destination)))
}

pub async fn destination(
    Extension(user): Extension<UserView>,
    State(state): State<ServerState>,
    Path(destination_id): Path<Uuid>,
) -> Result<Json<SavedDestinationView>, ServerError> {
    let destination = state
        .engine
        .saved_destination(destination_id, &user.id.to_string())
        .await?;
    Ok(Json(destination))
}

pub async fn destination_update(
    Extension(user): Extension<UserView>,
    State(state): State<ServerState>,
    Path(destination_id): Path<Uuid>,
    Json(payload): Json<SavedDestinationUpdate>,
) -> Result<Json<SavedDestinationView>, ServerError> {
    let destination = state
        .engine
        .update_saved_destination(destination_id, &user.id.to_string(), payload)
        .await?;
    Ok(Json(destination))
}

pub async fn destination_delete(
    Extension(user): Extension<UserView>,
    State(state): State<ServerState>,
    Path(destination_id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ServerError> {
    state
        .engine
        .delete_saved_destination(destination_id, &user.id.to_string())
        .await?;
    Ok(Json(MessageResponse::ok("Destination removed successfully")))
}
