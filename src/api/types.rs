//! Shared state for the API layer.

use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::classifier::Classifier;
use crate::config::Config;
use crate::geo::GeoClient;
use crate::notify::TwilioClient;

/// Shared context for all routes.
///
/// The database connection sits behind a mutex: requests are handled
/// inline and SQLite calls are short, so one connection serializing
/// writes matches the single-request-per-call model.
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<Config>,
    pub classifier: Arc<Classifier>,
    pub db: Arc<Mutex<Connection>>,
    pub geo: GeoClient,
    pub twilio: Option<Arc<TwilioClient>>,
}

impl AppContext {
    /// Wire the context from a loaded config and an opened database.
    pub fn new(config: Arc<Config>, db: Connection) -> Self {
        let twilio = config
            .twilio
            .as_ref()
            .map(|t| Arc::new(TwilioClient::new(t)));

        Self {
            classifier: Arc::new(Classifier::new(config.model_path.clone())),
            geo: GeoClient::new(),
            db: Arc::new(Mutex::new(db)),
            twilio,
            config,
        }
    }
}
