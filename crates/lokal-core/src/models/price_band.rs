//! Price bands ("$", "$$", ...) a site uses to classify places.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{LokalError, LokalResult};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PriceBand {
    pub id: Uuid,
    pub site_id: Uuid,
    /// Stable identifier, unique per site (e.g. `budget`).
    pub key: String,
    pub label: String,
    pub min_price: u32,
    /// `None` means open-ended.
    pub max_price: Option<u32>,
    pub currency: String,
    pub sort_order: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePriceBand {
    pub site_id: Uuid,
    pub key: String,
    pub label: String,
    pub min_price: u32,
    pub max_price: Option<u32>,
    pub currency: Option<String>,
    pub sort_order: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdatePriceBand {
    pub label: Option<String>,
    pub min_price: Option<u32>,
    /// `Some(Some(val))` = set, `Some(None)` = clear, `None` = no change.
    #[serde(default, deserialize_with = "crate::models::double_option")]
    pub max_price: Option<Option<u32>>,
    pub currency: Option<String>,
    pub sort_order: Option<i64>,
    pub is_active: Option<bool>,
}

pub const DEFAULT_CURRENCY: &str = "HUF";

pub fn validate_range(min_price: u32, max_price: Option<u32>) -> LokalResult<()> {
    match max_price {
        Some(max) if max < min_price => Err(LokalError::validation(format!(
            "max_price ({max}) must not be below min_price ({min_price})"
        ))),
        _ => Ok(()),
    }
}
