//! hound-lib — Houndify CLI engine.
//!
//! Config store, geolocation lookups, provider client, and the query
//! pipeline that ties them together. Depends on hound-core for pure types
//! and request/response shaping.

pub mod client;
pub mod config;
pub mod error;
pub mod geolocate;
pub mod pipeline;

pub use client::{HoundifyClient, QueryClient};
pub use config::{ConfigStore, Credentials};
pub use error::{HoundError, Result};
pub use geolocate::{IpGeolocator, Locator};
pub use pipeline::{Dispatcher, QueryOptions};

// Re-export hound-core for convenience
pub use hound_core;
