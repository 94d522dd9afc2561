mod graphs;
mod routing;
mod stations;

pub use graphs::*;
pub use routing::*;
pub use stations::*;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;
use velonet::feed::StationFeed;

use crate::{auth, state::AppState};

pub fn router<F: StationFeed>(state: Arc<AppState<F>>) -> axum::Router {
    let api = axum::Router::new()
        .route("/stations", get(stations::<F>))
        .route("/route/{lat1}/{lon1}/{lat2}/{lon2}", post(route::<F>))
        .route("/modes", get(modes::<F>))
        .route("/graphs/{mode}/reload", post(reload::<F>))
        .route_layer(middleware::from_fn_with_state(
            state.access_token.clone(),
            auth::require_token,
        ))
        .with_state(state);
    axum::Router::new()
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
}
