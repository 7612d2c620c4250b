pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{CatalogCommand, CliConfig};

pub use adapters::{ConfiguredEnrichment, HttpEnrichmentProvider, InMemoryRepository, SimulatedEnrichmentProvider};
pub use app::{build_catalog, CatalogService};
pub use config::TomlConfig;
pub use crate::core::aggregator::{convert_to_model, ProductAggregator};
pub use domain::model::{InventoryRecord, ProductModel, ProductRecord, PromotionRecord, RatingRecord};
pub use domain::ports::{EnrichmentProvider, ProductCatalog, ProductRepository};
pub use utils::error::{CatalogError, Result};
