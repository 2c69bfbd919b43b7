//! # Helps Common Library
//!
//! Shared code for the translation-helps gateway:
//! - Error types
//! - Gateway configuration loading
//! - Canonical book table (names, codes, abbreviations)
//! - Scripture reference parsing

pub mod books;
pub mod config;
pub mod error;
pub mod reference;

pub use config::GatewayConfig;
pub use error::{Error, Result};
pub use reference::ParsedReference;
