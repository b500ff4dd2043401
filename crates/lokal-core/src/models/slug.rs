//! Per-language entity slugs.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::LokalError;
use crate::lang::Lang;
use crate::redirect::RedirectNode;

/// What kind of entity a slug points at.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SlugEntityType {
    Place,
    Event,
    Town,
    Category,
    StaticPage,
}

impl SlugEntityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SlugEntityType::Place => "place",
            SlugEntityType::Event => "event",
            SlugEntityType::Town => "town",
            SlugEntityType::Category => "category",
            SlugEntityType::StaticPage => "static_page",
        }
    }
}

impl FromStr for SlugEntityType {
    type Err = LokalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "place" => Ok(SlugEntityType::Place),
            "event" => Ok(SlugEntityType::Event),
            "town" => Ok(SlugEntityType::Town),
            "category" => Ok(SlugEntityType::Category),
            "static_page" => Ok(SlugEntityType::StaticPage),
            other => Err(LokalError::validation(format!("unknown entity type: {other}"))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Slug {
    pub id: Uuid,
    pub site_id: Uuid,
    pub lang: Lang,
    pub slug: String,
    pub entity_type: SlugEntityType,
    pub entity_id: Uuid,
    pub is_primary: bool,
    pub is_active: bool,
    pub redirect_to_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RedirectNode for Slug {
    fn node_id(&self) -> Uuid {
        self.id
    }

    fn is_primary(&self) -> bool {
        self.is_primary
    }

    fn is_active(&self) -> bool {
        self.is_active
    }

    fn redirect_to_id(&self) -> Option<Uuid> {
        self.redirect_to_id
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSlug {
    pub site_id: Uuid,
    pub lang: Lang,
    pub slug: String,
    pub entity_type: SlugEntityType,
    pub entity_id: Uuid,
    #[serde(default)]
    pub is_primary: bool,
    pub redirect_to_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateSlug {
    pub slug: Option<String>,
    pub is_primary: Option<bool>,
    pub is_active: Option<bool>,
    /// `Some(Some(val))` = set, `Some(None)` = clear, `None` = no change.
    #[serde(default, deserialize_with = "crate::models::double_option")]
    pub redirect_to_id: Option<Option<Uuid>>,
}
