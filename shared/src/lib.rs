use serde::{Deserialize, Serialize};

/// Upper bound on the number of stops accepted by a single optimization request.
pub const MAX_ADDRESSES: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Body of `POST /api/route/optimize`.
///
/// `start` is the mandatory origin of the tour, `addresses` the stops to visit
/// (between 1 and [`MAX_ADDRESSES`]).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizeRouteRequest {
    pub start: String,
    pub addresses: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizeRouteResponse {
    /// Addresses in visiting order, starting with the start address.
    pub route: Vec<String>,
    /// Sum of the consecutive legs, in meters.
    pub total_distance: f64,
    /// Estimated travel time, in seconds.
    pub total_duration: f64,
    /// Stops that could not be geocoded and were left out of `route`.
    #[serde(default)]
    pub unresolved: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
}

impl ApiError {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
