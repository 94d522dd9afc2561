use serde::{Deserialize, Serialize};

use crate::graph::{EdgeRecord, NodeId, NodeRecord};

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CsvNode {
    pub id: u64,
    pub lat: f64,
    pub lon: f64,
}

impl From<CsvNode> for NodeRecord {
    fn from(value: CsvNode) -> Self {
        NodeRecord::new(NodeId(value.id), value.lat, value.lon)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CsvEdge {
    pub from: u64,
    pub to: u64,
    pub length: f64,
}

impl From<CsvEdge> for EdgeRecord {
    fn from(value: CsvEdge) -> Self {
        EdgeRecord::new(NodeId(value.from), NodeId(value.to), value.length)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CsvGraphInfo {
    pub directed: bool,
}
