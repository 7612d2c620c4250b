use crate::core::{ProductRecord, ProductRepository, RatingRecord};
use crate::utils::error::{CatalogError, Result};
use crate::utils::validation::validate_file_extension;
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Products 表的一列；rating_id 為指向 ProductRatings 的可空外鍵
#[derive(Debug, Clone)]
struct ProductRow {
    id: i32,
    category: String,
    description: String,
    img_url: String,
    name: String,
    price: f64,
    rating_id: Option<i32>,
}

#[derive(Debug, Default)]
struct Tables {
    products: Vec<ProductRow>,
    ratings: HashMap<i32, RatingRecord>,
}

impl Tables {
    fn next_product_id(&self) -> Result<i32> {
        self.products
            .iter()
            .map(|p| p.id)
            .max()
            .unwrap_or(0)
            .checked_add(1)
            .ok_or_else(|| CatalogError::storage("product id space exhausted"))
    }

    fn next_rating_id(&self) -> Result<i32> {
        self.ratings
            .keys()
            .copied()
            .max()
            .unwrap_or(0)
            .checked_add(1)
            .ok_or_else(|| CatalogError::storage("rating id space exhausted"))
    }

    fn insert(&mut self, mut record: ProductRecord) -> Result<ProductRecord> {
        if record.id == 0 {
            record.id = self.next_product_id()?;
        } else if self.products.iter().any(|p| p.id == record.id) {
            return Err(CatalogError::DuplicateProduct { id: record.id });
        }

        let rating_id = match record.rating.as_mut() {
            Some(rating) => {
                if rating.id == 0 || self.ratings.contains_key(&rating.id) {
                    rating.id = self.next_rating_id()?;
                }
                self.ratings.insert(rating.id, rating.clone());
                Some(rating.id)
            }
            None => None,
        };

        self.products.push(ProductRow {
            id: record.id,
            category: record.category.clone(),
            description: record.description.clone(),
            img_url: record.img_url.clone(),
            name: record.name.clone(),
            price: record.price,
            rating_id,
        });

        Ok(record)
    }

    fn join(&self, row: &ProductRow) -> ProductRecord {
        ProductRecord {
            id: row.id,
            category: row.category.clone(),
            description: row.description.clone(),
            img_url: row.img_url.clone(),
            name: row.name.clone(),
            price: row.price,
            rating: row
                .rating_id
                .and_then(|rating_id| self.ratings.get(&rating_id).cloned()),
        }
    }
}

/// CSV 種子檔的一列，未評分商品的 rating 與 numberOfRatings 皆留空
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CsvProductRow {
    id: i32,
    category: String,
    name: String,
    description: String,
    img_url: String,
    price: f64,
    rating: Option<f64>,
    number_of_ratings: Option<i32>,
}

impl TryFrom<CsvProductRow> for ProductRecord {
    type Error = CatalogError;

    fn try_from(row: CsvProductRow) -> Result<Self> {
        let rating = match (row.rating, row.number_of_ratings) {
            (Some(aggregate_rating), Some(number_of_ratings)) => Some(RatingRecord {
                id: 0,
                aggregate_rating,
                number_of_ratings,
            }),
            (None, None) => None,
            _ => {
                return Err(CatalogError::ValidationError {
                    message: format!(
                        "product {}: rating and numberOfRatings must both be set or both be empty",
                        row.id
                    ),
                })
            }
        };

        Ok(ProductRecord {
            id: row.id,
            category: row.category,
            description: row.description,
            img_url: row.img_url,
            name: row.name,
            price: row.price,
            rating,
        })
    }
}

/// 記憶體內的商品庫，附帶以分類為鍵的讀取快取
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    tables: RwLock<Tables>,
    cache: RwLock<HashMap<String, Vec<ProductRecord>>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: Vec<ProductRecord>) -> Result<Self> {
        let mut tables = Tables::default();
        for record in records {
            tables.insert(record)?;
        }

        Ok(Self {
            tables: RwLock::new(tables),
            cache: RwLock::new(HashMap::new()),
        })
    }

    /// 從 JSON 或 CSV 種子檔載入
    pub fn from_seed_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let path_str = path.to_string_lossy();
        validate_file_extension("store.seed_file", &path_str, &["json", "csv"])?;

        let records: Vec<ProductRecord> = if path_str.ends_with(".csv") {
            let mut reader = csv::Reader::from_path(path)?;
            reader
                .deserialize::<CsvProductRow>()
                .map(|row| ProductRecord::try_from(row?))
                .collect::<Result<_>>()?
        } else {
            let content = std::fs::read_to_string(path)?;
            serde_json::from_str(&content)?
        };

        tracing::info!("Loaded {} products from {}", records.len(), path_str);
        Self::from_records(records)
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.read_tables()?.products.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    pub fn clear_cache(&self) -> Result<()> {
        self.write_cache()?.clear();
        Ok(())
    }

    fn read_tables(&self) -> Result<RwLockReadGuard<'_, Tables>> {
        self.tables
            .read()
            .map_err(|_| CatalogError::storage("product tables lock poisoned"))
    }

    fn write_tables(&self) -> Result<RwLockWriteGuard<'_, Tables>> {
        self.tables
            .write()
            .map_err(|_| CatalogError::storage("product tables lock poisoned"))
    }

    fn write_cache(&self) -> Result<RwLockWriteGuard<'_, HashMap<String, Vec<ProductRecord>>>> {
        self.cache
            .write()
            .map_err(|_| CatalogError::storage("category cache lock poisoned"))
    }

    /// 鎖順序固定為 cache → tables
    fn insert_product(&self, product: ProductRecord, invalidate_cache: bool) -> Result<ProductRecord> {
        let added = if invalidate_cache {
            let mut cache = self.write_cache()?;
            let added = self.write_tables()?.insert(product)?;
            cache.remove(&added.category);
            tracing::debug!("Invalidated cache for category {}", added.category);
            added
        } else {
            self.write_tables()?.insert(product)?
        };

        tracing::info!("Added product {} to {}", added.id, added.category);
        Ok(added)
    }
}

#[async_trait]
impl ProductRepository for InMemoryRepository {
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
        self.insert_product(product, invalidate_cache)
    }

    fn get_products_blocking(&self, category: &str) -> Result<Vec<ProductRecord>> {
        {
            let cache = self
                .cache
                .read()
                .map_err(|_| CatalogError::storage("category cache lock poisoned"))?;
            if let Some(cached) = cache.get(category) {
                tracing::debug!("Cache hit for category {}", category);
                return Ok(cached.clone());
            }
        }

        // 快照與寫回快取都在 cache 寫鎖內完成，不會蓋掉並行新增的失效
        let mut cache = self.write_cache()?;
        if let Some(cached) = cache.get(category) {
            return Ok(cached.clone());
        }

        tracing::debug!("Cache miss for category {}", category);
        let products: Vec<ProductRecord> = {
            let tables = self.read_tables()?;
            tables
                .products
                .iter()
                .filter(|row| row.category == category)
                .map(|row| tables.join(row))
                .collect()
        };

        cache.insert(category.to_string(), products.clone());
        Ok(products)
    }

    fn get_product_by_id_blocking(&self, id: i32) -> Result<Option<ProductRecord>> {
        let tables = self.read_tables()?;
        Ok(tables
            .products
            .iter()
            .find(|row| row.id == id)
            .map(|row| tables.join(row)))
    }
}
