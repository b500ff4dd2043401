//! SurrealDB implementation of [`SiteRepository`].

use chrono::{DateTime, Utc};
use lokal_core::error::LokalResult;
use lokal_core::models::site::{CreateSite, Site, UpdateSite};
use lokal_core::repository::{PaginatedResult, Pagination, SiteRepository};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::{CountRow, first_row, parse_uuid, total};
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct SiteRow {
    record_id: String,
    slug: String,
    name: String,
    primary_domain: Option<String>,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl SiteRow {
    fn try_into_site(self) -> Result<Site, DbError> {
        Ok(Site {
            id: parse_uuid(&self.record_id, "site")?,
            slug: self.slug,
            name: self.name,
            primary_domain: self.primary_domain,
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// SurrealDB implementation of the Site repository.
#[derive(Clone)]
pub struct SurrealSiteRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealSiteRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> SiteRepository for SurrealSiteRepository<C> {
    async fn create(&self, input: CreateSite) -> LokalResult<Site> {
        let id_str = Uuid::new_v4().to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('site', $id) SET \
                 slug = $slug, name = $name, \
                 primary_domain = $primary_domain, \
                 is_active = $is_active; \
                 SELECT meta::id(id) AS record_id, * \
                 FROM type::record('site', $id);",
            )
            .bind(("id", id_str.clone()))
            .bind(("slug", input.slug))
            .bind(("name", input.name))
            .bind(("primary_domain", input.primary_domain))
            .bind(("is_active", input.is_active.unwrap_or(true)))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(DbError::from_statement)?;

        // Statement 0 is the CREATE, statement 1 the read-back.
        let rows: Vec<SiteRow> = result.take(1).map_err(DbError::from)?;
        Ok(first_row(rows, "site", &id_str)?.try_into_site()?)
    }

    async fn get_by_id(&self, id: Uuid) -> LokalResult<Site> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT meta::id(id) AS record_id, * FROM type::record('site', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<SiteRow> = result.take(0).map_err(DbError::from)?;
        Ok(first_row(rows, "site", &id_str)?.try_into_site()?)
    }

    async fn find_by_slug(&self, slug: &str) -> LokalResult<Option<Site>> {
        let mut result = self
            .db
            .query("SELECT meta::id(id) AS record_id, * FROM site WHERE slug = $slug")
            .bind(("slug", slug.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<SiteRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows.into_iter().next().map(SiteRow::try_into_site).transpose()?)
    }

    async fn update(&self, id: Uuid, input: UpdateSite) -> LokalResult<Site> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.slug.is_some() {
            sets.push("slug = $slug");
        }
        if input.name.is_some() {
            sets.push("name = $name");
        }
        if input.primary_domain.is_some() {
            sets.push("primary_domain = $primary_domain");
        }
        if input.is_active.is_some() {
            sets.push("is_active = $is_active");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('site', $id) SET {}; \
             SELECT meta::id(id) AS record_id, * FROM type::record('site', $id);",
            sets.join(", ")
        );

        let mut builder = self.db.query(&query).bind(("id", id_str.clone()));
        if let Some(slug) = input.slug {
            builder = builder.bind(("slug", slug));
        }
        if let Some(name) = input.name {
            builder = builder.bind(("name", name));
        }
        if let Some(primary_domain) = input.primary_domain {
            builder = builder.bind(("primary_domain", primary_domain));
        }
        if let Some(is_active) = input.is_active {
            builder = builder.bind(("is_active", is_active));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result.check().map_err(DbError::from_statement)?;

        let rows: Vec<SiteRow> = result.take(1).map_err(DbError::from)?;
        Ok(first_row(rows, "site", &id_str)?.try_into_site()?)
    }

    async fn delete(&self, id: Uuid) -> LokalResult<()> {
        self.db
            .query("DELETE type::record('site', $id)")
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn list(&self, pagination: Pagination) -> LokalResult<PaginatedResult<Site>> {
        let mut count_result = self
            .db
            .query("SELECT count() AS total FROM site GROUP ALL")
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM site \
                 ORDER BY slug ASC LIMIT $limit START $offset",
            )
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<SiteRow> = result.take(0).map_err(DbError::from)?;
        let items = rows
            .into_iter()
            .map(SiteRow::try_into_site)
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total: total(&count_rows),
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }
}
