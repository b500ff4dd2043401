//! SurrealDB implementation of [`LegalPageRepository`].

use chrono::{DateTime, Utc};
use lokal_core::error::LokalResult;
use lokal_core::lang::Lang;
use lokal_core::models::legal_page::{
    LegalPage, LegalPageKey, LegalPageTranslation, UpsertLegalTranslation,
};
use lokal_core::repository::LegalPageRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::{parse_enum, parse_uuid};
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct LegalPageRow {
    record_id: String,
    site_id: String,
    page_key: String,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl LegalPageRow {
    fn try_into_page(self) -> Result<LegalPage, DbError> {
        Ok(LegalPage {
            id: parse_uuid(&self.record_id, "legal_page")?,
            site_id: parse_uuid(&self.site_id, "site")?,
            page_key: parse_enum(&self.page_key)?,
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, SurrealValue)]
struct TranslationRow {
    record_id: String,
    site_id: String,
    page_key: String,
    lang: String,
    title: String,
    content: String,
    seo_title: Option<String>,
    seo_description: Option<String>,
    updated_at: DateTime<Utc>,
}

impl TranslationRow {
    fn try_into_translation(self) -> Result<LegalPageTranslation, DbError> {
        Ok(LegalPageTranslation {
            id: parse_uuid(&self.record_id, "legal_page_translation")?,
            site_id: parse_uuid(&self.site_id, "site")?,
            page_key: parse_enum(&self.page_key)?,
            lang: parse_enum(&self.lang)?,
            title: self.title,
            content: self.content,
            seo_title: self.seo_title,
            seo_description: self.seo_description,
            updated_at: self.updated_at,
        })
    }
}

/// SurrealDB implementation of the LegalPage repository.
#[derive(Clone)]
pub struct SurrealLegalPageRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealLegalPageRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> LegalPageRepository for SurrealLegalPageRepository<C> {
    async fn find_page(
        &self,
        site_id: Uuid,
        page_key: LegalPageKey,
    ) -> LokalResult<Option<LegalPage>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM legal_page \
                 WHERE site_id = $site_id AND page_key = $page_key",
            )
            .bind(("site_id", site_id.to_string()))
            .bind(("page_key", page_key.as_str()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<LegalPageRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows
            .into_iter()
            .next()
            .map(LegalPageRow::try_into_page)
            .transpose()?)
    }

    async fn upsert_page(
        &self,
        site_id: Uuid,
        page_key: LegalPageKey,
        is_active: bool,
    ) -> LokalResult<LegalPage> {
        match self.find_page(site_id, page_key).await? {
            Some(page) => {
                self.db
                    .query(
                        "UPDATE type::record('legal_page', $id) SET \
                         is_active = $is_active, updated_at = time::now()",
                    )
                    .bind(("id", page.id.to_string()))
                    .bind(("is_active", is_active))
                    .await
                    .map_err(DbError::from)?
                    .check()
                    .map_err(DbError::from_statement)?;
            }
            None => {
                self.db
                    .query(
                        "CREATE type::record('legal_page', $id) SET \
                         site_id = $site_id, page_key = $page_key, \
                         is_active = $is_active",
                    )
                    .bind(("id", Uuid::new_v4().to_string()))
                    .bind(("site_id", site_id.to_string()))
                    .bind(("page_key", page_key.as_str()))
                    .bind(("is_active", is_active))
                    .await
                    .map_err(DbError::from)?
                    .check()
                    .map_err(DbError::from_statement)?;
            }
        }

        self.find_page(site_id, page_key)
            .await?
            .ok_or_else(|| DbError::not_found("legal_page", page_key).into())
    }

    async fn list_pages(&self, site_id: Uuid) -> LokalResult<Vec<LegalPage>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM legal_page \
                 WHERE site_id = $site_id ORDER BY page_key ASC",
            )
            .bind(("site_id", site_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<LegalPageRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows
            .into_iter()
            .map(LegalPageRow::try_into_page)
            .collect::<Result<Vec<_>, DbError>>()?)
    }

    async fn delete_page(&self, site_id: Uuid, page_key: LegalPageKey) -> LokalResult<()> {
        self.db
            .query(
                "BEGIN TRANSACTION; \
                 DELETE legal_page_translation \
                 WHERE site_id = $site_id AND page_key = $page_key; \
                 DELETE legal_page WHERE site_id = $site_id AND page_key = $page_key; \
                 COMMIT TRANSACTION;",
            )
            .bind(("site_id", site_id.to_string()))
            .bind(("page_key", page_key.as_str()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(DbError::from_statement)?;

        Ok(())
    }

    async fn find_translation(
        &self,
        site_id: Uuid,
        page_key: LegalPageKey,
        lang: Lang,
    ) -> LokalResult<Option<LegalPageTranslation>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM legal_page_translation \
                 WHERE site_id = $site_id AND page_key = $page_key AND lang = $lang",
            )
            .bind(("site_id", site_id.to_string()))
            .bind(("page_key", page_key.as_str()))
            .bind(("lang", lang.as_str()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<TranslationRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows
            .into_iter()
            .next()
            .map(TranslationRow::try_into_translation)
            .transpose()?)
    }

    async fn upsert_translation(
        &self,
        site_id: Uuid,
        page_key: LegalPageKey,
        lang: Lang,
        input: UpsertLegalTranslation,
    ) -> LokalResult<LegalPageTranslation> {
        let existing = self.find_translation(site_id, page_key, lang).await?;
        let id_str = existing
            .map(|t| t.id)
            .unwrap_or_else(Uuid::new_v4)
            .to_string();

        self.db
            .query(
                "UPSERT type::record('legal_page_translation', $id) SET \
                 site_id = $site_id, page_key = $page_key, lang = $lang, \
                 title = $title, content = $content, \
                 seo_title = $seo_title, seo_description = $seo_description, \
                 updated_at = time::now()",
            )
            .bind(("id", id_str.clone()))
            .bind(("site_id", site_id.to_string()))
            .bind(("page_key", page_key.as_str()))
            .bind(("lang", lang.as_str()))
            .bind(("title", input.title))
            .bind(("content", input.content))
            .bind(("seo_title", input.seo_title))
            .bind(("seo_description", input.seo_description))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(DbError::from_statement)?;

        self.find_translation(site_id, page_key, lang)
            .await?
            .ok_or_else(|| DbError::not_found("legal_page_translation", id_str).into())
    }

    async fn list_translations(
        &self,
        site_id: Uuid,
        page_key: LegalPageKey,
    ) -> LokalResult<Vec<LegalPageTranslation>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM legal_page_translation \
                 WHERE site_id = $site_id AND page_key = $page_key ORDER BY lang ASC",
            )
            .bind(("site_id", site_id.to_string()))
            .bind(("page_key", page_key.as_str()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<TranslationRow> = result.take(0).map_err(DbError::from)?;
        let translations = rows
            .into_iter()
            .map(TranslationRow::try_into_translation)
            .collect::<Result<Vec<_>, DbError>>()?;
        Ok(translations)
    }
}
