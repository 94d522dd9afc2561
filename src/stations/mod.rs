use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

mod cache;
pub use cache::*;

use crate::feed::Station;

pub const DEFAULT_OVERLOAD_THRESHOLD: f64 = 0.35;
pub const DEFAULT_UNDERSUPPLY_THRESHOLD: f64 = 0.35;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    /// Below this share of free stands a station is overloaded.
    pub overload: f64,
    /// Below this share of bikes a station is underloaded.
    pub undersupply: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            overload: DEFAULT_OVERLOAD_THRESHOLD,
            undersupply: DEFAULT_UNDERSUPPLY_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    Overloaded,
    Underloaded,
    Normal,
}

impl Thresholds {
    /// Rules are checked in order and the first match wins, so the three
    /// classes never overlap. A station without stands carries no signal.
    pub fn classify(&self, station: &Station) -> Classification {
        if station.total_stands == 0 {
            return Classification::Normal;
        }
        let total = station.total_stands as f64;
        if (station.available_stands as f64) / total < self.overload {
            Classification::Overloaded
        } else if (station.available_bikes as f64) / total < self.undersupply {
            Classification::Underloaded
        } else {
            Classification::Normal
        }
    }
}

/// Classified view of every station as of one fetch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub overloaded: Vec<Station>,
    pub underloaded: Vec<Station>,
    pub normal: Vec<Station>,
    pub fetched_at: DateTime<Utc>,
}

impl Snapshot {
    /// Stable partition: each class keeps the feed's ordering.
    pub fn classify(stations: Vec<Station>, thresholds: &Thresholds, fetched_at: DateTime<Utc>) -> Self {
        let mut snapshot = Self {
            overloaded: Vec::new(),
            underloaded: Vec::new(),
            normal: Vec::new(),
            fetched_at,
        };
        stations
            .into_iter()
            .for_each(|station| match thresholds.classify(&station) {
                Classification::Overloaded => snapshot.overloaded.push(station),
                Classification::Underloaded => snapshot.underloaded.push(station),
                Classification::Normal => snapshot.normal.push(station),
            });
        snapshot
    }

    pub fn len(&self) -> usize {
        self.overloaded.len() + self.underloaded.len() + self.normal.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
