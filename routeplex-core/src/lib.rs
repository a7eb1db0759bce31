//! Routeplex Core Library
//!
//! Aggregates route optimisation vendors behind one canonical request and
//! response model. Point-to-point routes and fleet itineraries are sent to
//! every registered provider; the [`CompositeRouter`] picks the best answer,
//! returns them all for comparison, or forwards to a named provider.
//!
//! ```no_run
//! use routeplex_core::protocol::{Coordinate, SimpleRouteRequest};
//! use routeplex_core::providers::CompositeRouter;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = routeplex_core::config::load_from_yaml("routeplex.yaml")?;
//! let router = CompositeRouter::from_config(&config)?;
//!
//! let request = SimpleRouteRequest::new(vec![
//!     Coordinate::new(-23.5505, -46.6333),
//!     Coordinate::new(-23.5614, -46.6559),
//! ]);
//! let best = router.select_best(&request.into()).await?;
//! println!("{} wins with {}s", best.provider(), best.duration_secs());
//! # Ok(())
//! # }
//! ```
//!
//! [`CompositeRouter`]: providers::CompositeRouter

pub mod config;
pub mod http;
pub mod polyline;
pub mod protocol;
pub mod providers;

/// Returns the version of the Routeplex Core library.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
