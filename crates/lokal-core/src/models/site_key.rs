//! Public per-language site keys.
//!
//! A site key is the URL segment visitors use to reach a site
//! (`/hu/szentendre/...`). Keys can be renamed: the old key keeps
//! existing with `redirect_to_id` pointing at the new one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::lang::Lang;
use crate::redirect::RedirectNode;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SiteKey {
    pub id: Uuid,
    pub site_id: Uuid,
    pub lang: Lang,
    pub slug: String,
    pub is_primary: bool,
    pub is_active: bool,
    pub redirect_to_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RedirectNode for SiteKey {
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
pub struct CreateSiteKey {
    pub site_id: Uuid,
    pub lang: Lang,
    pub slug: String,
    #[serde(default)]
    pub is_primary: bool,
    pub redirect_to_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateSiteKey {
    pub slug: Option<String>,
    pub is_primary: Option<bool>,
    pub is_active: Option<bool>,
    /// `Some(Some(val))` = set, `Some(None)` = clear, `None` = no change.
    #[serde(default, deserialize_with = "crate::models::double_option")]
    pub redirect_to_id: Option<Option<Uuid>>,
}
