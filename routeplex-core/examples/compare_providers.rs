//! Compare route providers
//!
//! Loads a provider configuration, sends one point-to-point request to every
//! provider and prints each answer next to the winner.
//!
//! Run with: cargo run --example compare_providers -- routeplex.yaml

use anyhow::Context;
use routeplex_core::config::load_from_yaml;
use routeplex_core::protocol::{Coordinate, RouteRequest, SimpleRouteRequest};
use routeplex_core::providers::CompositeRouter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "routeplex.yaml".to_string());
    let config = load_from_yaml(&path).with_context(|| format!("loading {path}"))?;
    let router = CompositeRouter::from_config(&config)?;

    println!("Registered providers: {}", router.providers().join(", "));

    // Sé, Paulista, Ibirapuera
    let request: RouteRequest = SimpleRouteRequest::new(vec![
        Coordinate::new(-23.5505, -46.6333),
        Coordinate::new(-23.5614, -46.6559),
        Coordinate::new(-23.5874, -46.6576),
    ])
    .with_optimized_order(true)
    .into();

    for response in router.compare_all(&request).await {
        println!(
            "  {:<12} {:>9.0} m {:>6} s",
            response.provider(),
            response.distance_meters(),
            response.duration_secs()
        );
    }

    let best = router.select_best(&request).await?;
    println!("Best by {}: {}", router.metric(), best.provider());

    Ok(())
}
