//! SurrealDB implementation of [`SiteKeyRepository`].
//!
//! At most one key per (site, lang) is primary. Promoting a key writes
//! the key and demotes the previous primary inside one transaction; the
//! write comes first so a unique-index failure is the first statement
//! error reported.

use chrono::{DateTime, Utc};
use lokal_core::error::LokalResult;
use lokal_core::lang::Lang;
use lokal_core::models::site_key::{CreateSiteKey, SiteKey, UpdateSiteKey};
use lokal_core::repository::SiteKeyRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::{first_row, parse_enum, parse_opt_uuid, parse_uuid};
use crate::error::DbError;

const DEMOTE_OTHER_PRIMARY: &str = "\
UPDATE site_key SET is_primary = false, updated_at = time::now() \
WHERE site_id = $site_id AND lang = $lang AND is_primary = true \
AND id != type::record('site_key', $id);";

#[derive(Debug, SurrealValue)]
struct SiteKeyRow {
    record_id: String,
    site_id: String,
    lang: String,
    slug: String,
    is_primary: bool,
    is_active: bool,
    redirect_to_id: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl SiteKeyRow {
    fn try_into_site_key(self) -> Result<SiteKey, DbError> {
        Ok(SiteKey {
            id: parse_uuid(&self.record_id, "site_key")?,
            site_id: parse_uuid(&self.site_id, "site")?,
            lang: parse_enum(&self.lang)?,
            slug: self.slug,
            is_primary: self.is_primary,
            is_active: self.is_active,
            redirect_to_id: parse_opt_uuid(self.redirect_to_id, "site_key")?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// SurrealDB implementation of the SiteKey repository.
#[derive(Clone)]
pub struct SurrealSiteKeyRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealSiteKeyRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> SiteKeyRepository for SurrealSiteKeyRepository<C> {
    async fn create(&self, input: CreateSiteKey) -> LokalResult<SiteKey> {
        let id = Uuid::new_v4();

        let create = "CREATE type::record('site_key', $id) SET \
                      site_id = $site_id, lang = $lang, slug = $slug, \
                      is_primary = $is_primary, is_active = true, \
                      redirect_to_id = $redirect_to_id;";
        let query = if input.is_primary {
            format!("BEGIN TRANSACTION; {create} {DEMOTE_OTHER_PRIMARY} COMMIT TRANSACTION;")
        } else {
            create.to_string()
        };

        self.db
            .query(&query)
            .bind(("id", id.to_string()))
            .bind(("site_id", input.site_id.to_string()))
            .bind(("lang", input.lang.as_str()))
            .bind(("slug", input.slug))
            .bind(("is_primary", input.is_primary))
            .bind(("redirect_to_id", input.redirect_to_id.map(|id| id.to_string())))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(DbError::from_statement)?;

        self.get_by_id(id).await
    }

    async fn get_by_id(&self, id: Uuid) -> LokalResult<SiteKey> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT meta::id(id) AS record_id, * FROM type::record('site_key', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<SiteKeyRow> = result.take(0).map_err(DbError::from)?;
        Ok(first_row(rows, "site_key", &id_str)?.try_into_site_key()?)
    }

    async fn find_by_slug(&self, lang: Lang, slug: &str) -> LokalResult<Option<SiteKey>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM site_key \
                 WHERE lang = $lang AND slug = $slug",
            )
            .bind(("lang", lang.as_str()))
            .bind(("slug", slug.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<SiteKeyRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows
            .into_iter()
            .next()
            .map(SiteKeyRow::try_into_site_key)
            .transpose()?)
    }

    async fn find_primary(&self, site_id: Uuid, lang: Lang) -> LokalResult<Option<SiteKey>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM site_key \
                 WHERE site_id = $site_id AND lang = $lang AND is_primary = true \
                 ORDER BY updated_at DESC LIMIT 1",
            )
            .bind(("site_id", site_id.to_string()))
            .bind(("lang", lang.as_str()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<SiteKeyRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows
            .into_iter()
            .next()
            .map(SiteKeyRow::try_into_site_key)
            .transpose()?)
    }

    async fn update(&self, site_id: Uuid, id: Uuid, input: UpdateSiteKey) -> LokalResult<SiteKey> {
        let existing = self.get_by_id(id).await?;
        if existing.site_id != site_id {
            return Err(DbError::not_found("site_key", id).into());
        }

        let mut sets = Vec::new();
        if input.slug.is_some() {
            sets.push("slug = $slug");
        }
        if input.is_primary.is_some() {
            sets.push("is_primary = $is_primary");
        }
        if input.is_active.is_some() {
            sets.push("is_active = $is_active");
        }
        if input.redirect_to_id.is_some() {
            sets.push("redirect_to_id = $redirect_to_id");
        }
        sets.push("updated_at = time::now()");

        let update = format!("UPDATE type::record('site_key', $id) SET {};", sets.join(", "));
        let query = if input.is_primary == Some(true) {
            format!("BEGIN TRANSACTION; {update} {DEMOTE_OTHER_PRIMARY} COMMIT TRANSACTION;")
        } else {
            update
        };

        let mut builder = self
            .db
            .query(&query)
            .bind(("id", id.to_string()))
            .bind(("site_id", site_id.to_string()))
            .bind(("lang", existing.lang.as_str()));
        if let Some(slug) = input.slug {
            builder = builder.bind(("slug", slug));
        }
        if let Some(is_primary) = input.is_primary {
            builder = builder.bind(("is_primary", is_primary));
        }
        if let Some(is_active) = input.is_active {
            builder = builder.bind(("is_active", is_active));
        }
        if let Some(redirect_to_id) = input.redirect_to_id {
            builder = builder.bind(("redirect_to_id", redirect_to_id.map(|id| id.to_string())));
        }

        builder
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(DbError::from_statement)?;

        self.get_by_id(id).await
    }

    async fn delete(&self, site_id: Uuid, id: Uuid) -> LokalResult<()> {
        if self.get_by_id(id).await?.site_id != site_id {
            return Err(DbError::not_found("site_key", id).into());
        }

        self.db
            .query("DELETE type::record('site_key', $id) WHERE site_id = $site_id")
            .bind(("id", id.to_string()))
            .bind(("site_id", site_id.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn list_by_site(&self, site_id: Uuid) -> LokalResult<Vec<SiteKey>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM site_key \
                 WHERE site_id = $site_id ORDER BY lang ASC, slug ASC",
            )
            .bind(("site_id", site_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<SiteKeyRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows
            .into_iter()
            .map(SiteKeyRow::try_into_site_key)
            .collect::<Result<Vec<_>, DbError>>()?)
    }
}
