use crate::core::{
    EnrichmentProvider, ProductCatalog, ProductModel, ProductRecord, ProductRepository,
};
use crate::utils::error::Result;
use async_trait::async_trait;

/// 商品聚合：從 repository 取資料、向 enrichment 取庫存與促銷，再轉成輸出模型。
///
/// 每次呼叫彼此獨立，不保留任何狀態。
pub struct ProductAggregator<R: ProductRepository, E: EnrichmentProvider> {
    repository: R,
    enrichment: E,
}

impl<R: ProductRepository, E: EnrichmentProvider> ProductAggregator<R, E> {
    pub fn new(repository: R, enrichment: E) -> Self {
        Self {
            repository,
            enrichment,
        }
    }

    pub async fn get_products_for_category(&self, category: &str) -> Result<Vec<ProductModel>> {
        tracing::info!("Getting products for category {}", category);

        let products = self.repository.get_products(category).await?;
        let product_ids: Vec<i32> = products.iter().map(|p| p.id).collect();

        // 兩次呼叫依序進行：庫存完成後才開始查促銷
        let inventory = self
            .enrichment
            .get_inventory_for_products(&product_ids)
            .await?;
        tracing::info!("Finished getting {} inventory records", inventory.len());

        let promotion = self
            .enrichment
            .get_promotion_for_products(&product_ids)
            .await?;
        tracing::info!(
            "Got promotion for product id {:?}",
            promotion.as_ref().map(|p| p.product_id)
        );

        // TODO: merge inventory and promotion into ProductModel once the output fields are agreed on
        let results: Vec<ProductModel> = products.iter().map(convert_to_model).collect();

        tracing::debug!("Converted {} products for {}", results.len(), category);
        Ok(results)
    }

    pub fn get_products_for_category_blocking(&self, category: &str) -> Result<Vec<ProductModel>> {
        let products = self.repository.get_products_blocking(category)?;
        Ok(products.iter().map(convert_to_model).collect())
    }

    pub async fn get_product_by_id(&self, id: i32) -> Result<Option<ProductModel>> {
        let product = self.repository.get_product_by_id(id).await?;
        Ok(product.as_ref().map(convert_to_model))
    }

    pub fn get_product_by_id_blocking(&self, id: i32) -> Result<Option<ProductModel>> {
        let product = self.repository.get_product_by_id_blocking(id)?;
        Ok(product.as_ref().map(convert_to_model))
    }

    pub async fn add_new_product(
        &self,
        product_to_add: ProductModel,
        invalidate_cache: bool,
    ) -> Result<ProductModel> {
        let product = ProductRecord {
            id: 0,
            category: product_to_add.category,
            description: product_to_add.description,
            img_url: product_to_add.img_url,
            name: product_to_add.name,
            price: product_to_add.price,
            rating: None,
        };

        let added = self
            .repository
            .add_new_product(product, invalidate_cache)
            .await?;
        Ok(convert_to_model(&added))
    }
}

#[async_trait]
impl<R: ProductRepository, E: EnrichmentProvider> ProductCatalog for ProductAggregator<R, E> {
    async fn get_products_for_category(&self, category: &str) -> Result<Vec<ProductModel>> {
        ProductAggregator::get_products_for_category(self, category).await
    }

    async fn get_product_by_id(&self, id: i32) -> Result<Option<ProductModel>> {
        ProductAggregator::get_product_by_id(self, id).await
    }

    async fn add_new_product(
        &self,
        product: ProductModel,
        invalidate_cache: bool,
    ) -> Result<ProductModel> {
        ProductAggregator::add_new_product(self, product, invalidate_cache).await
    }

    fn get_products_for_category_blocking(&self, category: &str) -> Result<Vec<ProductModel>> {
        ProductAggregator::get_products_for_category_blocking(self, category)
    }

    fn get_product_by_id_blocking(&self, id: i32) -> Result<Option<ProductModel>> {
        ProductAggregator::get_product_by_id_blocking(self, id)
    }
}

/// 記錄轉輸出模型；有評分時攤平到模型上
pub fn convert_to_model(product: &ProductRecord) -> ProductModel {
    let mut model = ProductModel {
        id: product.id,
        category: product.category.clone(),
        description: product.description.clone(),
        img_url: product.img_url.clone(),
        name: product.name.clone(),
        price: product.price,
        rating: None,
        number_of_ratings: None,
    };

    if let Some(rating) = &product.rating {
        model.rating = Some(rating.aggregate_rating);
        model.number_of_ratings = Some(rating.number_of_ratings);
    }

    model
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{InventoryRecord, PromotionRecord, RatingRecord};
    use crate::utils::error::CatalogError;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct MockRepository {
        products: Vec<ProductRecord>,
        fail: bool,
        added: Arc<Mutex<Vec<(ProductRecord, bool)>>>,
    }

    impl MockRepository {
        fn with_products(products: Vec<ProductRecord>) -> Self {
            Self {
                products,
                ..Default::default()
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                ..Default::default()
            }
        }

        fn check(&self) -> Result<()> {
            if self.fail {
                return Err(CatalogError::storage("database is locked"));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl ProductRepository for MockRepository {
        async fn get_products(&self, category: &str) -> Result<Vec<ProductRecord>> {
            self.get_products_blocking(category)
        }

        async fn get_product_by_id(&self, id: i32) -> Result<Option<ProductRecord>> {
            self.get_product_by_id_blocking(id)
        }

        async fn add_new_product(
            &self,
            product: ProductRecord,
            invalidate_cache: bool,
        ) -> Result<ProductRecord> {
            self.check()?;
            self.added
                .lock()
                .unwrap()
                .push((product.clone(), invalidate_cache));
            Ok(ProductRecord { id: 42, ..product })
        }

        fn get_products_blocking(&self, category: &str) -> Result<Vec<ProductRecord>> {
            self.check()?;
            Ok(self
                .products
                .iter()
                .filter(|p| p.category == category)
                .cloned()
                .collect())
        }

        fn get_product_by_id_blocking(&self, id: i32) -> Result<Option<ProductRecord>> {
            self.check()?;
            Ok(self.products.iter().find(|p| p.id == id).cloned())
        }
    }

    /// 記錄呼叫順序的 enrichment 替身
    #[derive(Clone, Default)]
    struct RecordingEnrichment {
        calls: Arc<Mutex<Vec<String>>>,
        fail_inventory: bool,
    }

    impl RecordingEnrichment {
        fn log(&self, event: &str) {
            self.calls.lock().unwrap().push(event.to_string());
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl EnrichmentProvider for RecordingEnrichment {
        async fn get_inventory_for_products(
            &self,
            product_ids: &[i32],
        ) -> Result<Vec<InventoryRecord>> {
            self.log("inventory:start");
            tokio::task::yield_now().await;
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
            if self.fail_inventory {
                self.log("inventory:failed");
                return Err(CatalogError::EnrichmentStatus {
                    endpoint: "inventory".to_string(),
                    status: 500,
                });
            }
            self.log("inventory:end");
            Ok(product_ids
                .iter()
                .map(|&id| InventoryRecord {
                    product_id: id,
                    on_hand: 99,
                    on_order: 1,
                })
                .collect())
        }

        async fn get_promotion_for_products(
            &self,
            product_ids: &[i32],
        ) -> Result<Option<PromotionRecord>> {
            self.log("promotion:start");
            tokio::task::yield_now().await;
            self.log("promotion:end");
            Ok(product_ids.first().map(|&id| PromotionRecord {
                product_id: id,
                description: "half price".to_string(),
                discount: 0.5,
            }))
        }
    }

    fn record(id: i32, category: &str, rating: Option<(f64, i32)>) -> ProductRecord {
        ProductRecord {
            id,
            category: category.to_string(),
            description: format!("description {}", id),
            img_url: format!("https://img.example.com/{}.jpg", id),
            name: format!("Product {}", id),
            price: 10.0 * id as f64,
            rating: rating.map(|(aggregate_rating, number_of_ratings)| RatingRecord {
                id,
                aggregate_rating,
                number_of_ratings,
            }),
        }
    }

    fn catalog() -> Vec<ProductRecord> {
        vec![
            record(3, "boots", Some((4.5, 10))),
            record(1, "boots", None),
            record(2, "kayak", Some((3.0, 2))),
            record(7, "boots", None),
        ]
    }

    #[tokio::test]
    async fn test_category_returns_all_records_in_repository_order() {
        let aggregator =
            ProductAggregator::new(MockRepository::with_products(catalog()), RecordingEnrichment::default());

        let result = aggregator.get_products_for_category("boots").await.unwrap();

        let ids: Vec<i32> = result.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![3, 1, 7]);
    }

    #[tokio::test]
    async fn test_empty_category_is_empty_not_error() {
        let enrichment = RecordingEnrichment::default();
        let aggregator =
            ProductAggregator::new(MockRepository::with_products(catalog()), enrichment.clone());

        let result = aggregator.get_products_for_category("tents").await.unwrap();

        assert!(result.is_empty());
        // 空集合仍會依序呼叫兩次
        assert_eq!(
            enrichment.calls(),
            vec!["inventory:start", "inventory:end", "promotion:start", "promotion:end"]
        );
    }

    #[tokio::test]
    async fn test_inventory_completes_before_promotion_starts() {
        let enrichment = RecordingEnrichment::default();
        let aggregator =
            ProductAggregator::new(MockRepository::with_products(catalog()), enrichment.clone());

        aggregator.get_products_for_category("boots").await.unwrap();

        assert_eq!(
            enrichment.calls(),
            vec!["inventory:start", "inventory:end", "promotion:start", "promotion:end"]
        );
    }

    #[tokio::test]
    async fn test_enrichment_does_not_alter_models() {
        let products = catalog();
        let aggregator = ProductAggregator::new(
            MockRepository::with_products(products.clone()),
            RecordingEnrichment::default(),
        );

        let result = aggregator.get_products_for_category("boots").await.unwrap();

        let expected: Vec<ProductModel> = products
            .iter()
            .filter(|p| p.category == "boots")
            .map(convert_to_model)
            .collect();
        assert_eq!(result, expected);
    }

    #[tokio::test]
    async fn test_inventory_failure_propagates_and_skips_promotion() {
        let enrichment = RecordingEnrichment {
            fail_inventory: true,
            ..Default::default()
        };
        let aggregator =
            ProductAggregator::new(MockRepository::with_products(catalog()), enrichment.clone());

        let err = aggregator
            .get_products_for_category("boots")
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            CatalogError::EnrichmentStatus { status: 500, .. }
        ));
        assert_eq!(enrichment.calls(), vec!["inventory:start", "inventory:failed"]);
    }

    #[tokio::test]
    async fn test_repository_failure_propagates_without_enrichment() {
        let enrichment = RecordingEnrichment::default();
        let aggregator = ProductAggregator::new(MockRepository::failing(), enrichment.clone());

        let err = aggregator
            .get_products_for_category("boots")
            .await
            .unwrap_err();

        match err {
            CatalogError::Storage { message } => assert_eq!(message, "database is locked"),
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(enrichment.calls().is_empty());
    }

    #[test]
    fn test_blocking_category_makes_no_enrichment_calls() {
        let enrichment = RecordingEnrichment::default();
        let aggregator =
            ProductAggregator::new(MockRepository::with_products(catalog()), enrichment.clone());

        let result = aggregator.get_products_for_category_blocking("boots").unwrap();

        assert_eq!(result.len(), 3);
        assert!(enrichment.calls().is_empty());
    }

    #[tokio::test]
    async fn test_get_product_by_id() {
        let enrichment = RecordingEnrichment::default();
        let aggregator =
            ProductAggregator::new(MockRepository::with_products(catalog()), enrichment.clone());

        let found = aggregator.get_product_by_id(2).await.unwrap();
        assert_eq!(found.map(|p| p.id), Some(2));

        let missing = aggregator.get_product_by_id(999).await.unwrap();
        assert!(missing.is_none());

        assert!(enrichment.calls().is_empty());
    }

    #[test]
    fn test_get_product_by_id_blocking() {
        let aggregator =
            ProductAggregator::new(MockRepository::with_products(catalog()), RecordingEnrichment::default());

        assert_eq!(
            aggregator.get_product_by_id_blocking(7).unwrap().map(|p| p.id),
            Some(7)
        );
        assert!(aggregator.get_product_by_id_blocking(8).unwrap().is_none());
        assert!(
            ProductAggregator::new(MockRepository::failing(), RecordingEnrichment::default())
                .get_product_by_id_blocking(7)
                .is_err()
        );
    }

    #[tokio::test]
    async fn test_add_new_product_passes_fields_and_flag_through() {
        let repository = MockRepository::default();
        let aggregator = ProductAggregator::new(repository.clone(), RecordingEnrichment::default());

        let input = ProductModel {
            id: 1234,
            category: "boots".to_string(),
            description: "d".to_string(),
            img_url: "u".to_string(),
            name: "n".to_string(),
            price: 19.99,
            rating: Some(5.0),
            number_of_ratings: Some(1),
        };

        let added = aggregator.add_new_product(input, true).await.unwrap();

        let calls = repository.added.lock().unwrap().clone();
        assert_eq!(calls.len(), 1);
        let (sent, invalidate_cache) = &calls[0];
        assert!(*invalidate_cache);
        assert_eq!(
            sent,
            &ProductRecord {
                id: 0,
                category: "boots".to_string(),
                description: "d".to_string(),
                img_url: "u".to_string(),
                name: "n".to_string(),
                price: 19.99,
                rating: None,
            }
        );

        assert_eq!(added.id, 42);
        assert_eq!(added.category, "boots");
        assert_eq!(added.price, 19.99);
        assert_eq!(added.rating, None);
    }

    #[tokio::test]
    async fn test_add_new_product_failure_propagates() {
        let aggregator = ProductAggregator::new(MockRepository::failing(), RecordingEnrichment::default());

        let result = aggregator.add_new_product(ProductModel::default(), false).await;

        assert!(matches!(result, Err(CatalogError::Storage { .. })));
    }

    #[test]
    fn test_convert_to_model_flattens_rating() {
        let model = convert_to_model(&record(5, "boots", Some((4.5, 10))));

        assert_eq!(model.id, 5);
        assert_eq!(model.name, "Product 5");
        assert_eq!(model.img_url, "https://img.example.com/5.jpg");
        assert_eq!(model.rating, Some(4.5));
        assert_eq!(model.number_of_ratings, Some(10));
    }

    #[test]
    fn test_convert_to_model_without_rating_leaves_fields_unset() {
        let model = convert_to_model(&record(6, "boots", None));

        assert_eq!(model.rating, None);
        assert_eq!(model.number_of_ratings, None);
        assert_eq!(model.price, 60.0);
    }

    #[tokio::test]
    async fn test_catalog_trait_object_dispatch() {
        let aggregator: Arc<dyn ProductCatalog> = Arc::new(ProductAggregator::new(
            MockRepository::with_products(catalog()),
            RecordingEnrichment::default(),
        ));

        assert_eq!(aggregator.get_products_for_category("kayak").await.unwrap().len(), 1);
        assert_eq!(aggregator.get_products_for_category_blocking("kayak").unwrap().len(), 1);
    }
}
