//! Public catalog search.

use api_types::catalog::{ActivitySearch, CatalogActivityView, CitySearch, CityView};
use axum::extract::State;

use crate::{
    ServerError,
    extract::{Json, Query},
    server::ServerState,
};

pub async fn search_cities(
    State(state): State<ServerState>,
    Query(search): Query<CitySearch>,
) -> Result<Json<Vec<CityView>>, ServerError> {
    let cities = state.engine.search_cities(search).await?;
    Ok(Json(cities))
}

pub async fn search_activities(
    State(state): State<ServerState>,
    Query(search): Query<ActivitySearch>,
) -> Result<Json<Vec<CatalogActivityView>>, ServerError> {
    let activities = state.engine.search_activities(search).await?;
    Ok(Json(activities))
}
