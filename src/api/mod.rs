//! HTTP surface: router, server lifecycle, shared context, and the
//! request-boundary error type.

pub mod endpoints;
pub mod error;
pub mod router;
pub mod server;
pub mod types;
