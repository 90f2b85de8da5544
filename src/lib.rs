//! flixdeck - catalog browsing client for a streaming front end.
//!
//! This library crate exposes the catalog layer for the binary and for
//! integration testing.

pub mod catalog;

pub use catalog::{Catalog, Row};
pub use flixdeck_core::config::Config;
pub use flixdeck_fetch::CatalogClient;

/// Build a [`Catalog`] from configuration, reading the API key from the
/// environment when the configuration does not carry one.
pub fn catalog_from_config(config: &Config) -> flixdeck_core::Result<Catalog> {
    let config = config.clone().with_env();
    let client = CatalogClient::new(&config)?;
    Ok(Catalog::new(client, &config.catalog))
}
