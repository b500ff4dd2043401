//! SurrealDB implementation of [`SlugRepository`].

use chrono::{DateTime, Utc};
use lokal_core::error::LokalResult;
use lokal_core::lang::Lang;
use lokal_core::models::slug::{CreateSlug, Slug, SlugEntityType, UpdateSlug};
use lokal_core::repository::SlugRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::{first_row, parse_enum, parse_opt_uuid, parse_uuid};
use crate::error::DbError;

// Runs after the write in the same transaction, see site_key.rs.
const DEMOTE_OTHER_PRIMARY: &str = "\
UPDATE slug SET is_primary = false, updated_at = time::now() \
WHERE site_id = $site_id AND lang = $lang \
AND entity_type = $entity_type AND entity_id = $entity_id \
AND is_primary = true AND id != type::record('slug', $id);";

#[derive(Debug, SurrealValue)]
struct SlugRow {
    record_id: String,
    site_id: String,
    lang: String,
    slug: String,
    entity_type: String,
    entity_id: String,
    is_primary: bool,
    is_active: bool,
    redirect_to_id: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl SlugRow {
    fn try_into_slug(self) -> Result<Slug, DbError> {
        Ok(Slug {
            id: parse_uuid(&self.record_id, "slug")?,
            site_id: parse_uuid(&self.site_id, "site")?,
            lang: parse_enum(&self.lang)?,
            slug: self.slug,
            entity_type: parse_enum(&self.entity_type)?,
            entity_id: parse_uuid(&self.entity_id, "entity")?,
            is_primary: self.is_primary,
            is_active: self.is_active,
            redirect_to_id: parse_opt_uuid(self.redirect_to_id, "slug")?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// SurrealDB implementation of the Slug repository.
#[derive(Clone)]
pub struct SurrealSlugRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealSlugRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> SlugRepository for SurrealSlugRepository<C> {
    async fn create(&self, input: CreateSlug) -> LokalResult<Slug> {
        let id = Uuid::new_v4();

        let create = "CREATE type::record('slug', $id) SET \
                      site_id = $site_id, lang = $lang, slug = $slug, \
                      entity_type = $entity_type, entity_id = $entity_id, \
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
            .bind(("entity_type", input.entity_type.as_str()))
            .bind(("entity_id", input.entity_id.to_string()))
            .bind(("is_primary", input.is_primary))
            .bind(("redirect_to_id", input.redirect_to_id.map(|id| id.to_string())))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(DbError::from_statement)?;

        self.get_by_id(id).await
    }

    async fn get_by_id(&self, id: Uuid) -> LokalResult<Slug> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT meta::id(id) AS record_id, * FROM type::record('slug', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<SlugRow> = result.take(0).map_err(DbError::from)?;
        Ok(first_row(rows, "slug", &id_str)?.try_into_slug()?)
    }

    async fn find(&self, site_id: Uuid, lang: Lang, slug: &str) -> LokalResult<Option<Slug>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM slug \
                 WHERE site_id = $site_id AND lang = $lang AND slug = $slug",
            )
            .bind(("site_id", site_id.to_string()))
            .bind(("lang", lang.as_str()))
            .bind(("slug", slug.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<SlugRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows.into_iter().next().map(SlugRow::try_into_slug).transpose()?)
    }

    async fn find_primary(
        &self,
        site_id: Uuid,
        lang: Lang,
        entity_type: SlugEntityType,
        entity_id: Uuid,
    ) -> LokalResult<Option<Slug>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM slug \
                 WHERE site_id = $site_id AND lang = $lang \
                 AND entity_type = $entity_type AND entity_id = $entity_id \
                 AND is_primary = true \
                 ORDER BY updated_at DESC LIMIT 1",
            )
            .bind(("site_id", site_id.to_string()))
            .bind(("lang", lang.as_str()))
            .bind(("entity_type", entity_type.as_str()))
            .bind(("entity_id", entity_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<SlugRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows.into_iter().next().map(SlugRow::try_into_slug).transpose()?)
    }

    async fn update(&self, site_id: Uuid, id: Uuid, input: UpdateSlug) -> LokalResult<Slug> {
        let existing = self.get_by_id(id).await?;
        if existing.site_id != site_id {
            return Err(DbError::not_found("slug", id).into());
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

        let update = format!("UPDATE type::record('slug', $id) SET {};", sets.join(", "));
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
            .bind(("lang", existing.lang.as_str()))
            .bind(("entity_type", existing.entity_type.as_str()))
            .bind(("entity_id", existing.entity_id.to_string()));
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
            return Err(DbError::not_found("slug", id).into());
        }

        self.db
            .query("DELETE type::record('slug', $id) WHERE site_id = $site_id")
            .bind(("id", id.to_string()))
            .bind(("site_id", site_id.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn list_for_entity(
        &self,
        site_id: Uuid,
        entity_type: SlugEntityType,
        entity_id: Uuid,
    ) -> LokalResult<Vec<Slug>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM slug \
                 WHERE site_id = $site_id AND entity_type = $entity_type \
                 AND entity_id = $entity_id ORDER BY lang ASC, created_at ASC",
            )
            .bind(("site_id", site_id.to_string()))
            .bind(("entity_type", entity_type.as_str()))
            .bind(("entity_id", entity_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<SlugRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows
            .into_iter()
            .map(SlugRow::try_into_slug)
            .collect::<Result<Vec<_>, DbError>>()?)
    }
}
