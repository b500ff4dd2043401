//! Curated collections of sites ("Best lakeside towns", ...).
//!
//! Collections are global; items reference sites and may override the
//! displayed title and description per language.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::lang::Lang;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CollectionTranslation {
    pub lang: Lang,
    pub title: String,
    pub description: Option<String>,
}

/// Pick the translation for `lang`, falling back to Hungarian.
pub fn pick_translation(
    translations: &[CollectionTranslation],
    lang: Lang,
) -> Option<&CollectionTranslation> {
    translations
        .iter()
        .find(|t| t.lang == lang)
        .or_else(|| translations.iter().find(|t| t.lang == Lang::FALLBACK))
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Collection {
    pub id: Uuid,
    pub slug: String,
    pub is_active: bool,
    pub sort_order: i64,
    pub translations: Vec<CollectionTranslation>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCollection {
    pub slug: String,
    pub sort_order: Option<i64>,
    #[serde(default)]
    pub translations: Vec<CollectionTranslation>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateCollection {
    pub slug: Option<String>,
    pub is_active: Option<bool>,
    pub sort_order: Option<i64>,
    /// Replaces the whole translation set when present.
    pub translations: Option<Vec<CollectionTranslation>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CollectionItem {
    pub id: Uuid,
    pub collection_id: Uuid,
    pub site_id: Uuid,
    pub sort_order: i64,
    pub overrides: Vec<CollectionTranslation>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCollectionItem {
    pub site_id: Uuid,
    pub sort_order: Option<i64>,
    #[serde(default)]
    pub overrides: Vec<CollectionTranslation>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateCollectionItem {
    pub sort_order: Option<i64>,
    pub overrides: Option<Vec<CollectionTranslation>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tr(lang: Lang, title: &str) -> CollectionTranslation {
        CollectionTranslation {
            lang,
            title: title.into(),
            description: None,
        }
    }

    #[test]
    fn picks_requested_language_first() {
        let all = vec![tr(Lang::Hu, "Balaton"), tr(Lang::De, "Plattensee")];
        assert_eq!(pick_translation(&all, Lang::De).unwrap().title, "Plattensee");
    }

    #[test]
    fn falls_back_to_hungarian() {
        let all = vec![tr(Lang::Hu, "Balaton")];
        assert_eq!(pick_translation(&all, Lang::En).unwrap().title, "Balaton");
        assert!(pick_translation(&[tr(Lang::De, "x")], Lang::En).is_none());
    }
}
