//! Google provider implementation
//!
//! Adapters for the Routes API (point-to-point) and the Route Optimization
//! API (fleet tours), translating between the canonical model and Google's
//! JSON mapping.

mod client;
pub mod converter;
pub mod types;

pub use client::{GoogleFleetProvider, GoogleRoutesProvider};
