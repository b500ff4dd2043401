//! Per-site legal pages (imprint, terms, privacy policy).

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::LokalError;
use crate::lang::Lang;

/// The fixed set of legal pages every site can publish.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum LegalPageKey {
    Imprint,
    Terms,
    Privacy,
}

impl LegalPageKey {
    pub const ALL: [LegalPageKey; 3] = [
        LegalPageKey::Imprint,
        LegalPageKey::Terms,
        LegalPageKey::Privacy,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LegalPageKey::Imprint => "imprint",
            LegalPageKey::Terms => "terms",
            LegalPageKey::Privacy => "privacy",
        }
    }
}

impl fmt::Display for LegalPageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LegalPageKey {
    type Err = LokalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "imprint" => Ok(LegalPageKey::Imprint),
            "terms" => Ok(LegalPageKey::Terms),
            "privacy" => Ok(LegalPageKey::Privacy),
            other => Err(LokalError::validation(format!(
                "unknown legal page: {other} (expected imprint, terms or privacy)"
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LegalPage {
    pub id: Uuid,
    pub site_id: Uuid,
    pub page_key: LegalPageKey,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One language version of a legal page. Unique per (site, lang, key).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LegalPageTranslation {
    pub id: Uuid,
    pub site_id: Uuid,
    pub page_key: LegalPageKey,
    pub lang: Lang,
    pub title: String,
    /// Sanitized HTML from the admin editor.
    pub content: String,
    pub seo_title: Option<String>,
    pub seo_description: Option<String>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpsertLegalTranslation {
    pub title: String,
    pub content: String,
    pub seo_title: Option<String>,
    pub seo_description: Option<String>,
}
