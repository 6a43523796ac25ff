use std::{net::SocketAddr, time::Duration};

use clap::Parser;

use crate::geocoder::{GeocoderConfig, DEFAULT_GEOCODING_URL, DEFAULT_TIMEOUT_SECS};

#[derive(Debug, Clone, Parser)]
#[command(author, version, about = "Delivery route optimization service")]
pub struct ServerArgs {
    /// Address the HTTP server listens on
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0:8080")]
    pub bind: SocketAddr,

    /// Google Geocoding API key. Without it every address fails to geocode.
    #[arg(long, env = "GOOGLE_MAPS_API_KEY", hide_env_values = true)]
    pub geocoding_api_key: Option<String>,

    /// Geocoding endpoint speaking the Google Geocoding JSON format
    #[arg(long, env = "GEOCODING_URL", default_value = DEFAULT_GEOCODING_URL)]
    pub geocoding_url: String,

    /// Timeout applied to every geocoding request
    #[arg(long, env = "GEOCODING_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub geocoding_timeout_secs: u64,
}

impl ServerArgs {
    pub fn geocoder_config(&self) -> GeocoderConfig {
        let config = GeocoderConfig::default()
            .with_base_url(self.geocoding_url.clone())
            .with_timeout(Duration::from_secs(self.geocoding_timeout_secs));
        match &self.geocoding_api_key {
            Some(key) => config.with_api_key(key.clone()),
            None => config,
        }
    }
}
