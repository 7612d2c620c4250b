use crate::domain::model::{InventoryRecord, ProductModel, ProductRecord, PromotionRecord};
use crate::utils::error::Result;
use async_trait::async_trait;

/// 商品資料存取
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn get_products(&self, category: &str) -> Result<Vec<ProductRecord>>;
    async fn get_product_by_id(&self, id: i32) -> Result<Option<ProductRecord>>;
    async fn add_new_product(
        &self,
        product: ProductRecord,
        invalidate_cache: bool,
    ) -> Result<ProductRecord>;

    fn get_products_blocking(&self, category: &str) -> Result<Vec<ProductRecord>>;
    fn get_product_by_id_blocking(&self, id: i32) -> Result<Option<ProductRecord>>;
}

/// 庫存與促銷資料來源
#[async_trait]
pub trait EnrichmentProvider: Send + Sync {
    async fn get_inventory_for_products(&self, product_ids: &[i32])
        -> Result<Vec<InventoryRecord>>;
    async fn get_promotion_for_products(&self, product_ids: &[i32])
        -> Result<Option<PromotionRecord>>;
}

/// 提供給外層 (HTTP、CLI) 的商品查詢介面
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    async fn get_products_for_category(&self, category: &str) -> Result<Vec<ProductModel>>;
    async fn get_product_by_id(&self, id: i32) -> Result<Option<ProductModel>>;
    async fn add_new_product(
        &self,
        product: ProductModel,
        invalidate_cache: bool,
    ) -> Result<ProductModel>;

    fn get_products_for_category_blocking(&self, category: &str) -> Result<Vec<ProductModel>>;
    fn get_product_by_id_blocking(&self, id: i32) -> Result<Option<ProductModel>>;
}

pub trait ConfigProvider: Send + Sync {
    fn seed_file(&self) -> Option<&str>;
    fn enrichment_endpoint(&self) -> Option<&str>;
    fn enrichment_timeout_seconds(&self) -> u64;
    fn simulated_delay_ms(&self) -> u64;
}
