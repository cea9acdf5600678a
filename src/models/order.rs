use serde::{Deserialize, Deserializer, Serialize};

pub const ORDER_CREATED: &str = "Order created.";

/// Body of `POST /api/inventory/order`.
///
/// A missing or `null` `productId` decodes as an empty string so it is
/// reported as a validation failure rather than a decoding error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub product_id: String,
    #[serde(default)]
    pub quantity: i64,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Option::unwrap_or_default)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderResponse {
    pub success: bool,
    pub message: String,
}

impl OrderResponse {
    pub fn created() -> Self {
        Self {
            success: true,
            message: ORDER_CREATED.to_string(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}
