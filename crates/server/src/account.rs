//! Signup, login, token refresh and the authenticated user's account.

use api_types::{
    MessageResponse,
    auth::{AccessToken, AuthResponse, ChangePassword, Login, Signup, TokenRefresh},
    user::{UserUpdate, UserView},
};
use axum::{Extension, extract::State, http::StatusCode};

use crate::{ServerError, TokenType, extract::Json, server::ServerState};

pub async fn signup(
    State(state): State<ServerState>,
    Json(payload): Json<Signup>,
) -> Result<(StatusCode, Json<AuthResponse>), ServerError> {
    let user = state.engine.signup(payload).await?;
    let tokens = state.auth.issue_pair(&user.id.to_string())?;
    tracing::info!("new user {}", user.id);

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            user,
            tokens,
            message: "User registered successfully".to_string(),
        }),
    ))
}

pub async fn login(
    State(state): State<ServerState>,
    Json(payload): Json<Login>,
) -> Result<Json<AuthResponse>, ServerError> {
    let user = state.engine.login(&payload.email, &payload.password).await?;
    let tokens = state.auth.issue_pair(&user.id.to_string())?;

    Ok(Json(AuthResponse {
        user,
        tokens,
        message: "Login successful".to_string(),
    }))
}

pub async fn refresh(
    State(state): State<ServerState>,
    Json(payload): Json<TokenRefresh>,
) -> Result<Json<AccessToken>, ServerError> {
    let claims = state.auth.decode(&payload.refresh, TokenType::Refresh)?;
    let user = state.engine.active_user(&claims.sub).await?;
    let access = state
        .auth
        .issue(&user.id.to_string(), TokenType::Access)?;

    Ok(Json(AccessToken { access }))
}

pub async fn me(Extension(user): Extension<UserView>) -> Json<UserView> {
    Json(user)
}

pub async fn update_me(
    Extension(user): Extension<UserView>,
    State(state): State<ServerState>,
    Json(payload): Json<UserUpdate>,
) -> Result<Json<UserView>, ServerError> {
    let updated = state
        .engine
        .update_user(&user.id.to_string(), payload)
        .await?;
    Ok(Json(updated))
}

pub async fn change_password(
    Extension(user): Extension<UserView>,
    State(state): State<ServerState>,
    Json(payload): Json<ChangePassword>,
) -> Result<Json<MessageResponse>, ServerError> {
    state
        .engine
        .change_password(&user.id.to_string(), payload)
        .await?;
    Ok(Json(MessageResponse::ok("Password changed successfully")))
}
