mod network;
mod route;
mod station;

pub use network::*;
pub use route::*;
pub use station::*;

use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct ErrorDto {
    pub error: String,
    pub kind: &'static str,
}
