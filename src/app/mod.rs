// Application wiring: builds the aggregator from configuration.

use crate::adapters::{
    ConfiguredEnrichment, HttpEnrichmentProvider, InMemoryRepository, SimulatedEnrichmentProvider,
};
use crate::core::aggregator::ProductAggregator;
use crate::core::ConfigProvider;
use crate::utils::error::Result;
use std::time::Duration;

pub type CatalogService = ProductAggregator<InMemoryRepository, ConfiguredEnrichment>;

pub fn build_repository<C: ConfigProvider>(config: &C) -> Result<InMemoryRepository> {
    match config.seed_file() {
        Some(seed_file) => InMemoryRepository::from_seed_file(seed_file),
        None => {
            tracing::warn!("No seed file configured, starting with an empty product store");
            Ok(InMemoryRepository::new())
        }
    }
}

pub fn build_enrichment<C: ConfigProvider>(config: &C) -> Result<ConfiguredEnrichment> {
    match config.enrichment_endpoint() {
        Some(endpoint) => {
            tracing::debug!("Using HTTP enrichment at {}", endpoint);
            let timeout = Duration::from_secs(config.enrichment_timeout_seconds());
            Ok(ConfiguredEnrichment::Http(HttpEnrichmentProvider::new(
                endpoint, timeout,
            )?))
        }
        None => {
            let delay = Duration::from_millis(config.simulated_delay_ms());
            tracing::debug!("Using simulated enrichment with {:?} delay", delay);
            Ok(ConfiguredEnrichment::Simulated(
                SimulatedEnrichmentProvider::new(delay),
            ))
        }
    }
}

pub fn build_catalog<C: ConfigProvider>(config: &C) -> Result<CatalogService> {
    let repository = build_repository(config)?;
    let enrichment = build_enrichment(config)?;
    Ok(ProductAggregator::new(repository, enrichment))
}
