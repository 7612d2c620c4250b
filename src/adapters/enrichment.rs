use crate::core::{EnrichmentProvider, InventoryRecord, PromotionRecord};
use crate::utils::error::{CatalogError, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;

fn ids_param(product_ids: &[i32]) -> String {
    product_ids
        .iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

/// 透過 HTTP 取得庫存與促銷
#[derive(Debug, Clone)]
pub struct HttpEnrichmentProvider {
    client: Client,
    endpoint: String,
}

impl HttpEnrichmentProvider {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        let endpoint = endpoint.into().trim_end_matches('/').to_string();
        Ok(Self { client, endpoint })
    }

    fn url(&self, resource: &str) -> String {
        format!("{}/{}", self.endpoint, resource)
    }
}

#[async_trait]
impl EnrichmentProvider for HttpEnrichmentProvider {
    async fn get_inventory_for_products(
        &self,
        product_ids: &[i32],
    ) -> Result<Vec<InventoryRecord>> {
        let url = self.url("inventory");
        tracing::debug!("Requesting inventory for {} products from {}", product_ids.len(), url);

        let response = self
            .client
            .get(format!("{}?productIds={}", url, ids_param(product_ids)))
            .send()
            .await?;

        tracing::debug!("Inventory response status: {}", response.status());
        if !response.status().is_success() {
            return Err(CatalogError::EnrichmentStatus {
                endpoint: url,
                status: response.status().as_u16(),
            });
        }

        Ok(response.json().await?)
    }

    async fn get_promotion_for_products(
        &self,
        product_ids: &[i32],
    ) -> Result<Option<PromotionRecord>> {
        let url = self.url("promotion");
        tracing::debug!("Requesting promotion for {} products from {}", product_ids.len(), url);

        let response = self
            .client
            .get(format!("{}?productIds={}", url, ids_param(product_ids)))
            .send()
            .await?;

        let status = response.status();
        tracing::debug!("Promotion response status: {}", status);
        match status {
            // 沒有適用的促銷
            StatusCode::NOT_FOUND | StatusCode::NO_CONTENT => Ok(None),
            status if status.is_success() => Ok(Some(response.json().await?)),
            status => Err(CatalogError::EnrichmentStatus {
                endpoint: url,
                status: status.as_u16(),
            }),
        }
    }
}

/// 本機開發用，以固定延遲模擬遠端呼叫
#[derive(Debug, Clone)]
pub struct SimulatedEnrichmentProvider {
    delay: Duration,
}

impl SimulatedEnrichmentProvider {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl EnrichmentProvider for SimulatedEnrichmentProvider {
    async fn get_inventory_for_products(
        &self,
        product_ids: &[i32],
    ) -> Result<Vec<InventoryRecord>> {
        tokio::time::sleep(self.delay).await;
        Ok(product_ids
            .iter()
            .map(|&id| InventoryRecord {
                product_id: id,
                // 以 i64 計算，避免大 id 溢位
                on_hand: (i64::from(id) * 10).rem_euclid(47) as i32,
                on_order: id.rem_euclid(5),
            })
            .collect())
    }

    async fn get_promotion_for_products(
        &self,
        product_ids: &[i32],
    ) -> Result<Option<PromotionRecord>> {
        tokio::time::sleep(self.delay).await;
        Ok(product_ids.first().map(|&id| PromotionRecord {
            product_id: id,
            description: "10% off".to_string(),
            discount: 0.10,
        }))
    }
}

/// 依設定選擇的 enrichment 實作
#[derive(Debug, Clone)]
pub enum ConfiguredEnrichment {
    Http(HttpEnrichmentProvider),
    Simulated(SimulatedEnrichmentProvider),
}

#[async_trait]
impl EnrichmentProvider for ConfiguredEnrichment {
    async fn get_inventory_for_products(
        &self,
        product_ids: &[i32],
    ) -> Result<Vec<InventoryRecord>> {
        match self {
            ConfiguredEnrichment::Http(provider) => {
                provider.get_inventory_for_products(product_ids).await
            }
            ConfiguredEnrichment::Simulated(provider) => {
                provider.get_inventory_for_products(product_ids).await
            }
        }
    }

    async fn get_promotion_for_products(
        &self,
        product_ids: &[i32],
    ) -> Result<Option<PromotionRecord>> {
        match self {
            ConfiguredEnrichment::Http(provider) => {
                provider.get_promotion_for_products(product_ids).await
            }
            ConfiguredEnrichment::Simulated(provider) => {
                provider.get_promotion_for_products(product_ids).await
            }
        }
    }
}
