pub use optimizer_shared::{
    ApiError, Coordinate, OptimizeRouteRequest, OptimizeRouteResponse, MAX_ADDRESSES,
};

/// Flat travel speed used for duration estimates: 1000 m per 60 s (~60 km/h).
pub const ASSUMED_SPEED_M_PER_S: f64 = 1000.0 / 60.0;

/// Outcome of one optimization, expressed in original input indices
/// (0 = start address, 1..=N = stops in caller order).
#[derive(Debug, Clone, PartialEq)]
pub struct RouteResult {
    pub route: Vec<usize>,
    pub total_distance_m: f64,
    pub total_duration_s: f64,
    /// Inputs that failed to geocode and are absent from `route`.
    pub unresolved: Vec<usize>,
}

impl RouteResult {
    /// Resolves indices against the address list the optimizer was called with.
    pub fn into_response(self, addresses: &[String]) -> OptimizeRouteResponse {
        let lookup = |indices: Vec<usize>| -> Vec<String> {
            indices
                .into_iter()
                .filter_map(|idx| addresses.get(idx).cloned())
                .collect()
        };

        OptimizeRouteResponse {
            route: lookup(self.route),
            total_distance: self.total_distance_m,
            total_duration: self.total_duration_s,
            unresolved: lookup(self.unresolved),
        }
    }
}
