//! hound-core — Pure types and request/response shaping.
//!
//! No async runtime, no I/O, no platform dependencies.

pub mod identity;
pub mod request;
pub mod response;
pub mod types;
