pub mod config;
pub mod engine;
pub mod error;
pub mod geocoder;
pub mod models;
pub mod routing;
pub mod validation;

use std::{any::Any, sync::Arc};

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde_json::Value;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{self, CorsLayer},
};

use crate::engine::RouteOptimizer;
use crate::error::OptimizeError;
use crate::geocoder::Geocoder;
use crate::models::{ApiError, OptimizeRouteResponse};
use crate::validation::{validate_request, ValidationError};

#[derive(Clone)]
pub struct AppState {
    pub optimizer: Arc<RouteOptimizer>,
}

impl AppState {
    pub fn new(geocoder: Arc<dyn Geocoder>) -> Self {
        Self {
            optimizer: Arc::new(RouteOptimizer::new(geocoder)),
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    let cors_layer = CorsLayer::new()
        .allow_origin(cors::Any)
        .allow_methods(cors::Any)
        .allow_headers(cors::Any);

    Router::new()
        .route("/api/route/optimize", post(optimize_route_handler))
        .layer(cors_layer)
        .layer(CatchPanicLayer::custom(panic_response))
        .with_state(state)
}

async fn optimize_route_handler(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<OptimizeRouteResponse>, (StatusCode, Json<ApiError>)> {
    let Json(body) = payload.map_err(|rejection| {
        tracing::warn!("rejected optimize request body: {rejection}");
        validation_error(ValidationError::InvalidBody)
    })?;
    let request = validate_request(&body).map_err(validation_error)?;

    let addresses = request.into_addresses();
    let result = state
        .optimizer
        .optimize(&addresses)
        .await
        .map_err(optimize_error)?;

    tracing::info!(
        "optimized route: {} of {} addresses, {:.0} m, {:.0} s",
        result.route.len(),
        addresses.len(),
        result.total_distance_m,
        result.total_duration_s
    );

    Ok(Json(result.into_response(&addresses)))
}

fn validation_error(err: ValidationError) -> (StatusCode, Json<ApiError>) {
    (StatusCode::BAD_REQUEST, Json(ApiError::new(err.to_string())))
}

fn optimize_error(err: OptimizeError) -> (StatusCode, Json<ApiError>) {
    tracing::warn!("route optimization failed: {err}");
    let status = match err {
        OptimizeError::EmptyInput => StatusCode::BAD_REQUEST,
        OptimizeError::NoResolvedAddresses | OptimizeError::StartUnresolved => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
    };
    (status, Json(ApiError::new(err.to_string())))
}

fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied());

    let message = match detail {
        Some(detail) => format!("Failed to optimize route: {detail}"),
        None => "Failed to optimize route".to_string(),
    };
    tracing::error!("{message}");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiError::new(message)),
    )
        .into_response()
}
