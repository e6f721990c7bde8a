pub mod doctors;
pub mod download;
pub mod health;
pub mod predict;
pub mod prescription;
