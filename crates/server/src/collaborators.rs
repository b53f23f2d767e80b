//! Collaborators API endpoints.

use api_types::{
    MessageResponse,
    collaborator::{CollaboratorInvite, CollaboratorUpdate, CollaboratorView, InvitationResponse},
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
) -> Result<Json<Vec<CollaboratorView>>, ServerError> {
    let collaborators = state
        .engine
        .list_collaborators(trip_id, &user.id.to_string())
        .await?;
    Ok(Json(collaborators))
}

pub async fn invite(
    Extension(user): Extension<UserView>,
    State(state): State<ServerState>,
    Path(trip_id): Path<Uuid>,
    Json(payload): Json<CollaboratorInvite>,
) -> Result<(StatusCode, Json<CollaboratorView>), ServerError> {
    let collaborator = state
        .engine
        .invite_collaborator(trip_id, &user.id.to_string(), payload)
        .await?;
    Ok((StatusCode::CREATED, Json(collaborator)))
}

pub async fn update(
    Extension(user): Extension<UserView>,
    State(state): State<ServerState>,
    Path(collaborator_id): Path<Uuid>,
    Json(payload): Json<CollaboratorUpdate>,
) -> Result<Json<CollaboratorView>, ServerError> {
    if payload.permission_level.is_none() && payload.status.is_none() {
        return Err(ServerError::Generic(
            "provide at least one of permission_level or status".to_string(),
        ));
    }
    let collaborator = state
        .engine
        .update_collaborator(collaborator_id, &user.id.to_string(), payload)
        .await?;
    Ok(Json(collaborator))
}

pub async fn remove(
    Extension(user): Extension<UserView>,
    State(state): State<ServerState>,
    Path(collaborator_id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ServerError> {
    state
        .engine
        .remove_collaborator(collaborator_id, &user.id.to_string())
        .await?;
    Ok(Json(MessageResponse::ok("Collaborator removed successfully")))
}

pub async fn invitations(
    Extension(user): Extension<UserView>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<CollaboratorView>>, ServerError> {
    let invitations = state.engine.my_invitations(&user.id.to_string()).await?;
    Ok(Json(invitations))
}

pub async fn respond(
    Extension(user): Extension<UserView>,
    State(state): State<ServerState>,
    Path(collaborator_id): Path<Uuid>,
    Json(payload): Json<InvitationResponse>,
) -> Result<Json<CollaboratorView>, ServerError> {
    let collaborator = state
        .engine
        .respond_invitation(collaborator_id, &user.id.to_string(), payload)
        .await?;
    Ok(Json(collaborator))
}
