//! Site (tenant) domain model.
//!
//! A site is one directory instance: a town, a region or a themed
//! guide. All places, keys, slugs and subscriptions hang off a site.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Site {
    pub id: Uuid,
    /// Internal URL-safe identifier, unique across the platform.
    pub slug: String,
    pub name: String,
    /// Primary public domain (e.g. `szentendre.lokal.hu`).
    pub primary_domain: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSite {
    pub slug: String,
    pub name: String,
    pub primary_domain: Option<String>,
    /// Defaults to `true`.
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateSite {
    pub slug: Option<String>,
    pub name: Option<String>,
    /// `Some(Some(val))` = set, `Some(None)` = clear, `None` = no change.
    #[serde(default, deserialize_with = "crate::models::double_option")]
    pub primary_domain: Option<Option<String>>,
    pub is_active: Option<bool>,
}
