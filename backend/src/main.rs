use std::sync::Arc;

use clap::Parser;
use optimizer_backend::{
    config::ServerArgs,
    create_router,
    geocoder::GoogleGeocoder,
    AppState,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A missing .env file is normal outside local development.
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "optimizer_backend=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = ServerArgs::parse();
    if args.geocoding_api_key.is_none() {
        tracing::warn!("GOOGLE_MAPS_API_KEY is not set, every address will fail to geocode");
    }

    let geocoder = GoogleGeocoder::new(args.geocoder_config())?;
    tracing::info!("geocoding through {}", geocoder.config().base_url);

    let app = create_router(AppState::new(Arc::new(geocoder)));

    let listener = tokio::net::TcpListener::bind(args.bind).await?;
    tracing::info!("starting route optimizer on http://{}", args.bind);
    axum::serve(listener, app).await?;

    Ok(())
}
