//! Place (listed business) domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Place {
    pub id: Uuid,
    pub site_id: Uuid,
    pub name: String,
    pub is_featured: bool,
    pub is_active: bool,
    /// Per-place override of the plan's gallery image limit.
    pub gallery_image_limit: Option<u32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePlace {
    pub site_id: Uuid,
    pub name: String,
    #[serde(default)]
    pub is_featured: bool,
    pub gallery_image_limit: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdatePlace {
    pub name: Option<String>,
    pub is_featured: Option<bool>,
    pub is_active: Option<bool>,
    /// `Some(Some(val))` = set, `Some(None)` = clear, `None` = no change.
    #[serde(default, deserialize_with = "crate::models::double_option")]
    pub gallery_image_limit: Option<Option<u32>>,
}
