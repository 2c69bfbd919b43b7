//! Service modules for the fetch-dispatch-cache-transform pipeline

pub mod cache;
pub mod dcs_client;
pub mod fetch_adapter;
pub mod resolver;
pub mod transform;
pub mod tsv;
pub mod usfm;

pub use cache::{MemoryTierCache, TierCache};
pub use dcs_client::{ContentClient, DcsClient};
pub use resolver::{CatalogRepo, Ingredient, ScriptureText};
