use std::sync::Arc;

use futures::future::join_all;

use crate::{
    error::OptimizeError,
    geocoder::{GeocodeOutcome, Geocoder},
    models::{Coordinate, RouteResult},
    routing::{estimate_duration_s, haversine_m},
};

/// All-pairs great-circle distances, in meters, stored row-major.
#[derive(Debug, Clone)]
pub struct DistanceMatrix {
    size: usize,
    distances: Vec<f64>,
}

impl DistanceMatrix {
    pub fn from_points(points: &[Coordinate]) -> Self {
        let size = points.len();
        let mut distances = vec![0.0; size * size];

        for (i, &from) in points.iter().enumerate() {
            for (j, &to) in points.iter().enumerate() {
                if i != j {
                    distances[i * size + j] = haversine_m(from, to);
                }
            }
        }

        Self { size, distances }
    }

    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Distance from `from` to `to`; `None` when either index is out of range.
    pub fn get(&self, from: usize, to: usize) -> Option<f64> {
        if from >= self.size || to >= self.size {
            return None;
        }
        self.distances.get(from * self.size + to).copied()
    }
}

/// Visiting order over matrix indices and its accumulated length.
#[derive(Debug, Clone, PartialEq)]
pub struct Tour {
    pub order: Vec<usize>,
    pub distance_m: f64,
}

/// Build a tour with the nearest-neighbor construction heuristic.
///
/// # Algorithm
///
/// Starting from `origin`, repeatedly move to the closest unvisited point
/// until every point has been visited. O(n²) over the matrix size.
///
/// - Ties go to the lowest index: the scan only replaces the current best on
///   a strictly smaller distance.
/// - Non-finite distances are treated as unreachable. If nothing unvisited is
///   reachable the tour stops early instead of looping.
///
/// No improvement pass (2-opt or similar) runs afterwards; for the handful of
/// stops a delivery run has, the greedy order is accepted as is.
pub fn nearest_neighbor_tour(matrix: &DistanceMatrix, origin: usize) -> Tour {
    let n = matrix.len();
    if origin >= n {
        return Tour {
            order: Vec::new(),
            distance_m: 0.0,
        };
    }

    let mut visited = vec![false; n];
    visited[origin] = true;

    let mut order = Vec::with_capacity(n);
    order.push(origin);
    let mut current = origin;
    let mut distance_m = 0.0;

    while order.len() < n {
        let mut best: Option<(usize, f64)> = None;
        for (candidate, &seen) in visited.iter().enumerate() {
            if seen {
                continue;
            }
            let Some(d) = matrix.get(current, candidate).filter(|d| d.is_finite()) else {
                continue;
            };
            if best.map_or(true, |(_, best_d)| d < best_d) {
                best = Some((candidate, d));
            }
        }

        let Some((next, leg)) = best else {
            tracing::warn!(
                "no reachable point left from {current}, stopping after {} of {n}",
                order.len()
            );
            break;
        };

        visited[next] = true;
        order.push(next);
        distance_m += leg;
        current = next;
    }

    Tour { order, distance_m }
}

/// Turn per-address geocode outcomes into a route.
///
/// `outcomes[i]` belongs to input address `i`; index 0 is the start. Stops
/// that did not resolve are left out of the tour and listed in
/// [`RouteResult::unresolved`]. The tour always begins at the start address,
/// so an unresolvable start fails the whole request.
pub fn plan_route(outcomes: &[GeocodeOutcome]) -> Result<RouteResult, OptimizeError> {
    if outcomes.is_empty() {
        return Err(OptimizeError::EmptyInput);
    }

    let mut points = Vec::with_capacity(outcomes.len());
    let mut original_indices = Vec::with_capacity(outcomes.len());
    let mut unresolved = Vec::new();

    for (index, outcome) in outcomes.iter().enumerate() {
        match outcome.coordinate() {
            Some(coord) => {
                points.push(coord);
                original_indices.push(index);
            }
            None => unresolved.push(index),
        }
    }

    if points.is_empty() {
        return Err(OptimizeError::NoResolvedAddresses);
    }
    if original_indices.first() != Some(&0) {
        return Err(OptimizeError::StartUnresolved);
    }

    let matrix = DistanceMatrix::from_points(&points);
    let tour = nearest_neighbor_tour(&matrix, 0);
    tracing::debug!(
        "nearest-neighbor tour over {} points: {:?} ({:.0} m)",
        matrix.len(),
        tour.order,
        tour.distance_m
    );

    let route = tour
        .order
        .iter()
        .filter_map(|&idx| original_indices.get(idx).copied())
        .collect();

    Ok(RouteResult {
        route,
        total_distance_m: tour.distance_m,
        total_duration_s: estimate_duration_s(tour.distance_m),
        unresolved,
    })
}

/// Geocodes a request's addresses and orders them into a route.
pub struct RouteOptimizer {
    geocoder: Arc<dyn Geocoder>,
}

impl RouteOptimizer {
    pub fn new(geocoder: Arc<dyn Geocoder>) -> Self {
        Self { geocoder }
    }

    /// `addresses[0]` is the start, the rest are stops in caller order.
    ///
    /// All lookups are issued at once and awaited together, so latency is
    /// bounded by the slowest single geocode rather than their sum.
    pub async fn optimize(&self, addresses: &[String]) -> Result<RouteResult, OptimizeError> {
        if addresses.is_empty() {
            return Err(OptimizeError::EmptyInput);
        }
        tracing::info!("optimizing route over {} addresses", addresses.len());

        let outcomes = join_all(
            addresses
                .iter()
                .map(|address| self.geocoder.geocode(address)),
        )
        .await;

        for (address, outcome) in addresses.iter().zip(&outcomes) {
            if *outcome == GeocodeOutcome::Unresolved {
                tracing::warn!(address = address.as_str(), "dropping unresolved address");
            }
        }

        plan_route(&outcomes)
    }
}
