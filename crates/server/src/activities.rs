//! Activities API endpoints.

use api_types::{
    MessageResponse,
    activity::{
        ActivitiesBulkNew, ActivityBook, ActivityDay, ActivityListQuery, ActivityNew,
        ActivityUpdate, ActivityView, CategoryView,
    },
    user::UserView,
};
use axum::{Extension, extract::State, http::StatusCode};
use engine::Engine;
use uuid::Uuid;

use crate::{
    ServerError,
    extract::{Json, Path, Query},
    server::ServerState,
};

pub async fn categories() -> Json<Vec<CategoryView>> {
    Json(Engine::activity_categories())
}

pub async fn trip_list(
    Extension(user): Extension<UserView>,
    State(state): State<ServerState>,
    Path(trip_id): Path<Uuid>,
    Query(query): Query<ActivityListQuery>,
) -> Result<Json<Vec<ActivityView>>, ServerError> {
    let activities = state
        .engine
        .trip_activities(trip_id, &user.id.to_string(), query)
        .await?;
    Ok(Json(activities))
}

pub async fn by_date(
    Extension(user): Extension<UserView>,
    State(state): State<ServerState>,
    Path(trip_id): Path<Uuid>,
) -> Result<Json<Vec<ActivityDay>>, ServerError> {
    let days = state
        .engine
        .activities_by_date(trip_id, &user.id.to_string())
        .await?;
    Ok(Json(days))
}

pub async fn stop_list(
    Extension(user): Extension<UserView>,
    State(state): State<ServerState>,
    Path(stop_id): Path<Uuid>,
) -> Result<Json<Vec<ActivityView>>, ServerError> {
    let activities = state
        .engine
        .list_stop_activities(stop_id, &user.id.to_string())
        .await?;
    Ok(Json(activities))
}

pub async fn activity_new(
    Extension(user): Extension<UserView>,
    State(state): State<ServerState>,
    Path(stop_id): Path<Uuid>,
    Json(payload): Json<ActivityNew>,
) -> Result<(StatusCode, Json<ActivityView>), ServerError> {
    let activity = state
        .engine
        .new_activity(stop_id, &user.id.to_string(), payload)
        .await?;
    Ok((StatusCode::CREATED, Json(activity)))
}

pub async fn bulk_new(
    Extension(user): Extension<UserView>,
    State(state): State<ServerState>,
    Path(stop_id): Path<Uuid>,
    Json(payload): Json<ActivitiesBulkNew>,
) -> Result<(StatusCode, Json<Vec<ActivityView>>), ServerError> {
    if payload.activities.is_empty() {
        return Err(ServerError::Generic(
            "activities must not be empty".to_string(),
        ));
    }
    let activities = state
        .engine
        .new_activities(stop_id, &user.id.to_string(), payload.activities)
        .await?;
    Ok((StatusCode::CREATED, Json(activities)))
}

pub async fn get(
    Extension(user): Extension<UserView>,
    State(state): State<ServerState>,
    Path(activity_id): Path<Uuid>,
) -> Result<Json<ActivityView>, ServerError> {
    let activity = state
        .engine
        .activity(activity_id, &user.id.to_string())
        .await?;
    Ok(Json(activity))
}

pub async fn update(
    Extension(user): Extension<UserView>,
    State(state): State<ServerState>,
    Path(activity_id): Path<Uuid>,
    Json(payload): Json<ActivityUpdate>,
) -> Result<Json<ActivityView>, ServerError> {
    let activity = state
        .engine
        .update_activity(activity_id, &user.id.to_string(), payload)
        .await?;
    Ok(Json(activity))
}

pub async fn book(
    Extension(user): Extension<UserView>,
    State(state): State<ServerState>,
    Path(activity_id): Path<Uuid>,
    payload: Option<Json<ActivityBook>>,
) -> Result<Json<ActivityView>, ServerError> {
    let book = payload.map(|Json(b)| b).unwrap_or_default();
    let activity = state
        .engine
        .book_activity(activity_id, &user.id.to_string(), book)
        .await?;
    Ok(Json(activity))
}

pub async fn pay(
    Extension(user): Extension<UserView>,
    State(state): State<ServerState>,
    Path(activity_id): Path<Uuid>,
) -> Result<Json<ActivityView>, ServerError> {
    let activity = state
        .engine
        .pay_activity(activity_id, &user.id.to_string())
        .await?;
    Ok(Json(activity))
}

pub async fn delete(
    Extension(user): Extension<UserView>,
    State(state): State<ServerState>,
    Path(activity_id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ServerError> {
    state
        .engine
        .delete_activity(activity_id, &user.id.to_string())
        .await?;
    Ok(Json(MessageResponse::ok("Activity deleted successfully")))
}
