pub mod api;
pub mod classifier;
pub mod config;
pub mod db;
pub mod disease;
pub mod geo;
pub mod models;
pub mod notify;
pub mod report;
