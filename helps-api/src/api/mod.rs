//! HTTP API for the translation-helps gateway

pub mod format;
pub mod handler;
pub mod health;

pub use format::{negotiate, ResponseFormat};
pub use health::health_routes;
