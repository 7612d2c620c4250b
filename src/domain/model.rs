use serde::{Deserialize, Serialize};

/// 持久化的商品記錄 (Products 表)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
    /// 由儲存層指派，尚未寫入時為 0
    #[serde(default)]
    pub id: i32,
    pub category: String,
    pub description: String,
    pub img_url: String,
    pub name: String,
    pub price: f64,
    #[serde(default)]
    pub rating: Option<RatingRecord>,
}

/// 商品評分 (ProductRatings 表)，隸屬於單一商品
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingRecord {
    #[serde(default)]
    pub id: i32,
    pub aggregate_rating: f64,
    pub number_of_ratings: i32,
}

/// 對外輸出的商品視圖，每次請求重新建立
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductModel {
    #[serde(default)]
    pub id: i32,
    pub category: String,
    pub description: String,
    pub img_url: String,
    pub name: String,
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_of_ratings: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryRecord {
    pub product_id: i32,
    pub on_hand: i32,
    pub on_order: i32,
}

/// 一組商品 id 最多對應一筆促銷
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromotionRecord {
    pub product_id: i32,
    pub description: String,
    pub discount: f64,
}
