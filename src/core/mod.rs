pub mod aggregator;

pub use crate::domain::model::{
    InventoryRecord, ProductModel, ProductRecord, PromotionRecord, RatingRecord,
};
pub use crate::domain::ports::{
    ConfigProvider, EnrichmentProvider, ProductCatalog, ProductRepository,
};
pub use crate::utils::error::Result;
