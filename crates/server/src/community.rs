//! Community board endpoints. Reading is public, writing needs a login.

use api_types::{
    MessageResponse,
    community::{
        CommentAdded, CommentNew, LikeToggle, PageQuery, PostListQuery, PostNew, PostPage,
        PostUpdate, PostView,
    },
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
    State(state): State<ServerState>,
    Query(query): Query<PostListQuery>,
) -> Result<Json<PostPage>, ServerError> {
    let page = state.engine.list_posts(query).await?;
    Ok(Json(page))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(post_id): Path<Uuid>,
) -> Result<Json<PostView>, ServerError> {
    let post = state.engine.post(post_id).await?;
    Ok(Json(post))
}

pub async fn my_posts(
    Extension(user): Extension<UserView>,
    State(state): State<ServerState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<PostPage>, ServerError> {
    let page = state
        .engine
        .my_posts(&user.id.to_string(), query)
        .await?;
    Ok(Json(page))
}

pub async fn post_new(
    Extension(user): Extension<UserView>,
    State(state): State<ServerState>,
    Json(payload): Json<PostNew>,
) -> Result<(StatusCode, Json<PostView>), ServerError> {
    let post = state
        .engine
        .new_post(&user.id.to_string(), payload)
        .await?;
    tracing::info!("community post {} published", post.id);
    Ok((StatusCode::CREATED, Json(post)))
}

pub async fn update(
    Extension(user): Extension<UserView>,
    State(state): State<ServerState>,
    Path(post_id): Path<Uuid>,
    Json(payload): Json<PostUpdate>,
) -> Result<Json<PostView>, ServerError> {
    let post = state
        .engine
        .update_post(post_id, &user.id.to_string(), payload)
        .await?;
    Ok(Json(post))
}

pub async fn delete(
    Extension(user): Extension<UserView>,
    State(state): State<ServerState>,
    Path(post_id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ServerError> {
    state
        .engine
        .delete_post(post_id, &user.id.to_string())
        .await?;
    Ok(Json(MessageResponse::ok("Community post deleted")))
}

pub async fn toggle_like(
    Extension(user): Extension<UserView>,
    State(state): State<ServerState>,
    Path(post_id): Path<Uuid>,
) -> Result<Json<LikeToggle>, ServerError> {
    let likes = state
        .engine
        .toggle_like(post_id, &user.id.to_string())
        .await?;
    Ok(Json(likes))
}

pub async fn comment(
    Extension(user): Extension<UserView>,
    State(state): State<ServerState>,
    Path(post_id): Path<Uuid>,
    Json(payload): Json<CommentNew>,
) -> Result<(StatusCode, Json<CommentAdded>), ServerError> {
    let added = state
        .engine
        .add_comment(post_id, &user.id.to_string(), payload)
        .await?;
    Ok((StatusCode::CREATED, Json(added)))
}
