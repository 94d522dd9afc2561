use serde::{Deserialize, Serialize};
use velonet::store::Route;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteRequestDto {
    pub mode: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteDto {
    /// `[latitude, longitude]` pairs in path order.
    pub path: Vec<[f64; 2]>,
    /// Metres.
    pub distance: f64,
    pub instructions: Vec<String>,
}

impl RouteDto {
    pub fn from(route: Route) -> Self {
        let path = route
            .path
            .nodes
            .iter()
            .map(|node| [node.coordinate.latitude, node.coordinate.longitude])
            .collect();
        Self {
            path,
            distance: route.path.distance.as_meters(),
            instructions: route
                .path
                .instructions
                .into_iter()
                .map(|instruction| instruction.text)
                .collect(),
        }
    }
}
