//! Trip budget API endpoints.

use api_types::{
    budget::{BudgetSummary, BudgetUpdate, BudgetView},
    user::UserView,
};
use axum::{Extension, extract::State};
use uuid::Uuid;

use crate::{
    ServerError,
    extract::{Json, Path},
    server::ServerState,
};

pub async fn get(
    Extension(user): Extension<UserView>,
    State(state): State<ServerState>,
    Path(trip_id): Path<Uuid>,
) -> Result<Json<BudgetView>, ServerError> {
    let budget = state
        .engine
        .trip_budget(trip_id, &user.id.to_string())
        .await?;
    Ok(Json(budget))
}

/// Costs and limits are written as sent; a `version` that no longer matches
/// the stored one is answered with 409.
pub async fn update(
    Extension(user): Extension<UserView>,
    State(state): State<ServerState>,
    Path(trip_id): Path<Uuid>,
    Json(payload): Json<BudgetUpdate>,
) -> Result<Json<BudgetView>, ServerError> {
    let budget = state
        .engine
        .update_budget(trip_id, &user.id.to_string(), payload)
        .await?;
    Ok(Json(budget))
}

pub async fn summary(
    Extension(user): Extension<UserView>,
    State(state): State<ServerState>,
    Path(trip_id): Path<Uuid>,
) -> Result<Json<BudgetSummary>, ServerError> {
    let summary = state
        .engine
        .budget_summary(trip_id, &user.id.to_string())
        .await?;
    Ok(Json(summary))
}

pub async fn recalculate(
    Extension(user): Extension<UserView>,
    State(state): State<ServerState>,
    Path(trip_id): Path<Uuid>,
) -> Result<Json<BudgetView>, ServerError> {
    let budget = state
        .engine
        .recalculate_budget(trip_id, &user.id.to_string())
        .await?;
    Ok(Json(budget))
}
