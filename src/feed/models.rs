use serde::{Deserialize, Serialize};

use crate::shared::geo::Coordinate;

/// One station exactly as reported by the feed. Replaced wholesale on every
/// fetch, never patched field by field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    pub id: u64,
    pub name: String,
    pub coordinate: Coordinate,
    pub available_bikes: u32,
    pub available_stands: u32,
    pub total_stands: u32,
}

#[derive(Deserialize, Debug, Clone)]
pub struct JcdPosition {
    pub lat: f64,
    pub lng: f64,
}

/// Station record of the JCDecaux `stations` endpoint.
/// Only the fields the service needs are declared, the rest are ignored.
#[derive(Deserialize, Debug, Clone)]
pub struct JcdStation {
    pub number: u64,
    pub name: String,
    pub position: JcdPosition,
    pub available_bikes: u32,
    pub available_bike_stands: u32,
    pub bike_stands: u32,
}

impl From<JcdStation> for Station {
    fn from(value: JcdStation) -> Self {
        Self {
            id: value.number,
            name: value.name,
            coordinate: Coordinate {
                latitude: value.position.lat,
                longitude: value.position.lng,
            },
            available_bikes: value.available_bikes,
            available_stands: value.available_bike_stands,
            total_stands: value.bike_stands,
        }
    }
}
