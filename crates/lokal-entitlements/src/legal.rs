//! Legal pages: public lookup with Hungarian fallback, and admin
//! management.

use lokal_core::error::{LokalError, LokalResult};
use lokal_core::lang::Lang;
use lokal_core::models::legal_page::{
    LegalPage, LegalPageKey, LegalPageTranslation, UpsertLegalTranslation,
};
use lokal_core::repository::{LegalPageRepository, SiteKeyRepository, SiteRepository};
use lokal_core::text::seo_description_from_html;
use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::EntitlementError;
use crate::site_resolver::SiteResolver;

/// A legal page as served to visitors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublicLegalPage {
    pub site_id: Uuid,
    pub page_key: LegalPageKey,
    /// Requested language.
    pub lang: Lang,
    /// Language of the translation actually served.
    pub content_lang: Lang,
    pub title: String,
    pub content: String,
    pub seo_title: String,
    pub seo_description: Option<String>,
    /// Canonical site key, for building the canonical URL.
    pub canonical_site_key: String,
}

/// A page with all its translations, for the admin screens.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegalPageDetail {
    pub page_key: LegalPageKey,
    /// `false` when the page row does not exist yet.
    pub is_active: bool,
    pub translations: Vec<LegalPageTranslation>,
}

fn public_page(
    translation: LegalPageTranslation,
    lang: Lang,
    canonical_site_key: String,
) -> PublicLegalPage {
    let seo_description = translation
        .seo_description
        .filter(|d| !d.trim().is_empty())
        .or_else(|| seo_description_from_html(&translation.content));
    let seo_title = translation
        .seo_title
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| translation.title.clone());

    PublicLegalPage {
        site_id: translation.site_id,
        page_key: translation.page_key,
        lang,
        content_lang: translation.lang,
        title: translation.title,
        content: translation.content,
        seo_title,
        seo_description,
        canonical_site_key,
    }
}

pub struct LegalPageService<S, K, L>
where
    S: SiteRepository,
    K: SiteKeyRepository,
    L: LegalPageRepository,
{
    sites: SiteResolver<S, K>,
    legal_repo: L,
}

impl<S, K, L> LegalPageService<S, K, L>
where
    S: SiteRepository,
    K: SiteKeyRepository,
    L: LegalPageRepository,
{
    pub fn new(sites: SiteResolver<S, K>, legal_repo: L) -> Self {
        Self { sites, legal_repo }
    }

    /// Public lookup. Serves the Hungarian translation when `lang` has
    /// none; a missing or inactive page is `NotFound`.
    pub async fn get_public(
        &self,
        lang: Lang,
        site_key: Option<&str>,
        page_key: LegalPageKey,
    ) -> LokalResult<PublicLegalPage> {
        let site = self.sites.resolve(lang, site_key).await?;

        match self.legal_repo.find_page(site.site_id, page_key).await? {
            Some(page) if page.is_active => {}
            _ => return Err(EntitlementError::LegalPageNotFound(page_key).into()),
        }

        let mut translation = self
            .legal_repo
            .find_translation(site.site_id, page_key, lang)
            .await?;
        if translation.is_none() && lang != Lang::FALLBACK {
            debug!(%page_key, %lang, "No translation, falling back to Hungarian");
            translation = self
                .legal_repo
                .find_translation(site.site_id, page_key, Lang::FALLBACK)
                .await?;
        }

        let translation = translation.ok_or(EntitlementError::LegalPageNotFound(page_key))?;
        Ok(public_page(translation, lang, site.canonical_key))
    }

    pub async fn list(&self, site_id: Uuid) -> LokalResult<Vec<LegalPage>> {
        self.legal_repo.list_pages(site_id).await
    }

    pub async fn get(&self, site_id: Uuid, page_key: LegalPageKey) -> LokalResult<LegalPageDetail> {
        let page = self.legal_repo.find_page(site_id, page_key).await?;
        let translations = self.legal_repo.list_translations(site_id, page_key).await?;
        if page.is_none() && translations.is_empty() {
            return Err(LokalError::not_found("legal page", page_key));
        }
        Ok(LegalPageDetail {
            page_key,
            is_active: page.is_some_and(|p| p.is_active),
            translations,
        })
    }

    /// Save one translation. The page row is created, active, on first
    /// save.
    pub async fn upsert_translation(
        &self,
        site_id: Uuid,
        page_key: LegalPageKey,
        lang: Lang,
        input: UpsertLegalTranslation,
    ) -> LokalResult<LegalPageTranslation> {
        if input.title.trim().is_empty() {
            return Err(LokalError::validation("title must not be empty"));
        }
        if self.legal_repo.find_page(site_id, page_key).await?.is_none() {
            self.legal_repo.upsert_page(site_id, page_key, true).await?;
        }

        let translation = self
            .legal_repo
            .upsert_translation(site_id, page_key, lang, input)
            .await?;
        info!(%site_id, %page_key, %lang, "Legal page translation saved");
        Ok(translation)
    }

    pub async fn set_active(
        &self,
        site_id: Uuid,
        page_key: LegalPageKey,
        is_active: bool,
    ) -> LokalResult<LegalPage> {
        let page = self
            .legal_repo
            .upsert_page(site_id, page_key, is_active)
            .await?;
        info!(%site_id, %page_key, is_active, "Legal page visibility changed");
        Ok(page)
    }

    pub async fn delete(&self, site_id: Uuid, page_key: LegalPageKey) -> LokalResult<()> {
        if self.legal_repo.find_page(site_id, page_key).await?.is_none() {
            return Err(LokalError::not_found("legal page", page_key));
        }
        self.legal_repo.delete_page(site_id, page_key).await
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn translation(seo_title: Option<&str>, seo_description: Option<&str>) -> LegalPageTranslation {
        LegalPageTranslation {
            id: Uuid::new_v4(),
            site_id: Uuid::new_v4(),
            page_key: LegalPageKey::Privacy,
            lang: Lang::Hu,
            title: "Adatvédelem".into(),
            content: "<h1>Adatvédelem</h1><p>Első mondat. Második mondat! Harmadik.</p>".into(),
            seo_title: seo_title.map(Into::into),
            seo_description: seo_description.map(Into::into),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn seo_fields_fall_back_to_title_and_content() {
        let page = public_page(translation(None, Some("  ")), Lang::En, "szentendre".into());
        assert_eq!(page.seo_title, "Adatvédelem");
        assert_eq!(
            page.seo_description.as_deref(),
            Some("Adatvédelem Első mondat. Második mondat!")
        );
        assert_eq!(page.lang, Lang::En);
        assert_eq!(page.content_lang, Lang::Hu);
    }

    #[test]
    fn explicit_seo_fields_win() {
        let page = public_page(
            translation(Some("Privacy"), Some("Custom")),
            Lang::Hu,
            "x".into(),
        );
        assert_eq!(page.seo_title, "Privacy");
        assert_eq!(page.seo_description.as_deref(), Some("Custom"));
    }
}
