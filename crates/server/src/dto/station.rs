use serde::{Deserialize, Serialize};
use velonet::{feed::Station, stations::Snapshot};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StationDto {
    pub id: u64,
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    pub available_bikes: u32,
    pub available_stands: u32,
}

impl StationDto {
    pub fn from(station: &Station) -> Self {
        Self {
            id: station.id,
            name: station.name.clone(),
            lat: station.coordinate.latitude,
            lon: station.coordinate.longitude,
            available_bikes: station.available_bikes,
            available_stands: station.available_stands,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StationsDto {
    pub overloaded: Vec<StationDto>,
    pub underloaded: Vec<StationDto>,
    pub normal: Vec<StationDto>,
    pub fetched_at: String,
}

impl StationsDto {
    pub fn from(snapshot: &Snapshot) -> Self {
        let convert = |stations: &[Station]| -> Vec<StationDto> {
            stations.iter().map(StationDto::from).collect()
        };
        Self {
            overloaded: convert(&snapshot.overloaded),
            underloaded: convert(&snapshot.underloaded),
            normal: convert(&snapshot.normal),
            fetched_at: snapshot.fetched_at.to_rfc3339(),
        }
    }
}
