use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
};
use tracing::debug;
use velonet::{feed::StationFeed, shared::geo::Coordinate, store};

use crate::{
    dto::{RouteDto, RouteRequestDto},
    error::ApiError,
    state::AppState,
};

pub async fn route<F: StationFeed>(
    State(state): State<Arc<AppState<F>>>,
    Path((lat1, lon1, lat2, lon2)): Path<(f64, f64, f64, f64)>,
    Json(request): Json<RouteRequestDto>,
) -> Result<Json<RouteDto>, ApiError> {
    let from = Coordinate::from((lat1, lon1));
    let to = Coordinate::from((lat2, lon2));
    if let Some(invalid) = [from, to].into_iter().find(|coordinate| !coordinate.is_valid()) {
        return Err(store::Error::InvalidCoordinate(invalid).into());
    }

    let network = state.store.network(&request.mode)?;
    let route = tokio::task::spawn_blocking(move || network.route(&from, &to))
        .await
        .map_err(|err| ApiError::Internal(format!("Routing task failed: {err}")))??;
    debug!(
        "Routed {} from node {} to node {} over {} nodes, {}",
        route.mode,
        route.from,
        route.to,
        route.path.nodes.len(),
        route.path.distance
    );
    Ok(Json(RouteDto::from(route)))
}
