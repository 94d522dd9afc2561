use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
};
use tracing::info;
use velonet::feed::StationFeed;

use crate::{dto::NetworkDto, error::ApiError, state::AppState};

pub async fn modes<F: StationFeed>(State(state): State<Arc<AppState<F>>>) -> Json<Vec<NetworkDto>> {
    let networks = state
        .store
        .networks()
        .iter()
        .map(|network| NetworkDto::from(network))
        .collect();
    Json(networks)
}

pub async fn reload<F: StationFeed>(
    State(state): State<Arc<AppState<F>>>,
    Path(mode): Path<String>,
) -> Result<Json<NetworkDto>, ApiError> {
    info!("Reloading {mode} graph");
    let network = tokio::task::spawn_blocking(move || state.store.reload(&mode))
        .await
        .map_err(|err| ApiError::Internal(format!("Reload task failed: {err}")))??;
    Ok(Json(NetworkDto::from(&network)))
}
