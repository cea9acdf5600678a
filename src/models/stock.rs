use serde::{Deserialize, Serialize};

/// Result of `GET /api/inventory/check/:product_id/:quantity`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockCheck {
    pub product_id: String,
    pub available: bool,
}

/// One row of the inventory listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockLevel {
    pub product_id: String,
    pub quantity: i64,
}
