// Adapters layer: concrete implementations of the repository and enrichment ports.

pub mod enrichment;
pub mod storage;

pub use enrichment::{ConfiguredEnrichment, HttpEnrichmentProvider, SimulatedEnrichmentProvider};
pub use storage::InMemoryRepository;
