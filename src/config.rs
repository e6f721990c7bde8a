//! Process configuration, read once from the environment at startup.

use std::env;
use std::path::PathBuf;

use thiserror::Error;

pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default listen port when `PORT` is unset.
pub const DEFAULT_PORT: u16 = 5000;

/// Default public base URL used to build shareable report links.
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";

/// Reverse-geocoding provider (area names).
pub const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";

/// POI provider (nearby medical facilities).
pub const OVERPASS_URL: &str = "http://overpass-api.de/api/interpreter";

/// Messaging provider API root.
pub const TWILIO_URL: &str = "https://api.twilio.com";

/// Identifying header sent on every outbound geo request.
pub const USER_AGENT: &str = "SmartSkinHealthApp/1.0";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid PORT value: {0}")]
    InvalidPort(String),
}

/// Messaging provider credentials. Present only when all three
/// environment variables are set; otherwise delivery is disabled.
#[derive(Debug, Clone)]
pub struct TwilioConfig {
    pub account_sid: String,
    pub auth_token: String,
    /// Sender handle, without the `whatsapp:` prefix.
    pub from_number: String,
}

/// Runtime configuration, constructed once in `main` and shared by reference.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub base_url: String,
    pub model_path: PathBuf,
    pub database_path: PathBuf,
    pub reports_dir: PathBuf,
    pub twilio: Option<TwilioConfig>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = match env::var("PORT") {
            Ok(v) => v.parse().map_err(|_| ConfigError::InvalidPort(v))?,
            Err(_) => DEFAULT_PORT,
        };

        let base_url = env::var("BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let model_path = env::var("MODEL_PATH").unwrap_or_else(|_| "model.onnx".to_string());
        let database_path = env::var("DATABASE_PATH").unwrap_or_else(|_| "smartskin.db".to_string());
        let reports_dir = env::var("REPORTS_DIR").unwrap_or_else(|_| "reports".to_string());

        let twilio = match (
            env::var("TWILIO_ACCOUNT_SID"),
            env::var("TWILIO_AUTH_TOKEN"),
            env::var("TWILIO_WHATSAPP_NUMBER"),
        ) {
            (Ok(account_sid), Ok(auth_token), Ok(from_number)) => Some(TwilioConfig {
                account_sid,
                auth_token,
                from_number,
            }),
            _ => None,
        };

        Ok(Self {
            port,
            base_url,
            model_path: model_path.into(),
            database_path: database_path.into(),
            reports_dir: reports_dir.into(),
            twilio,
        })
    }

    /// Public URL under which a stored report file is served.
    pub fn report_url(&self, filename: &str) -> String {
        format!("{}/reports/{}", self.base_url.trim_end_matches('/'), filename)
    }
}
