use std::sync::Arc;

use axum::{Json, extract::State};
use velonet::feed::StationFeed;

use crate::{dto::StationsDto, error::ApiError, state::AppState};

pub async fn stations<F: StationFeed>(
    State(state): State<Arc<AppState<F>>>,
) -> Result<Json<StationsDto>, ApiError> {
    let snapshot = state.stations.get_or_refresh().await?;
    Ok(Json(StationsDto::from(&snapshot)))
}
