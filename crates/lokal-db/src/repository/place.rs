//! SurrealDB implementation of [`PlaceRepository`].

use chrono::{DateTime, Utc};
use lokal_core::error::LokalResult;
use lokal_core::models::place::{CreatePlace, Place, UpdatePlace};
use lokal_core::repository::{PaginatedResult, Pagination, PlaceRepository};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::{CountRow, first_row, parse_uuid, total};
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct PlaceRow {
    record_id: String,
    site_id: String,
    name: String,
    is_featured: bool,
    is_active: bool,
    gallery_image_limit: Option<u32>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl PlaceRow {
    fn try_into_place(self) -> Result<Place, DbError> {
        Ok(Place {
            id: parse_uuid(&self.record_id, "place")?,
            site_id: parse_uuid(&self.site_id, "site")?,
            name: self.name,
            is_featured: self.is_featured,
            is_active: self.is_active,
            gallery_image_limit: self.gallery_image_limit,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// SurrealDB implementation of the Place repository.
#[derive(Clone)]
pub struct SurrealPlaceRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealPlaceRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> PlaceRepository for SurrealPlaceRepository<C> {
    async fn create(&self, input: CreatePlace) -> LokalResult<Place> {
        let id_str = Uuid::new_v4().to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('place', $id) SET \
                 site_id = $site_id, name = $name, \
                 is_featured = $is_featured, \
                 gallery_image_limit = $gallery_image_limit; \
                 SELECT meta::id(id) AS record_id, * \
                 FROM type::record('place', $id);",
            )
            .bind(("id", id_str.clone()))
            .bind(("site_id", input.site_id.to_string()))
            .bind(("name", input.name))
            .bind(("is_featured", input.is_featured))
            .bind(("gallery_image_limit", input.gallery_image_limit))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(DbError::from_statement)?;

        let rows: Vec<PlaceRow> = result.take(1).map_err(DbError::from)?;
        Ok(first_row(rows, "place", &id_str)?.try_into_place()?)
    }

    async fn get_by_id(&self, site_id: Uuid, id: Uuid) -> LokalResult<Place> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM type::record('place', $id) \
                 WHERE site_id = $site_id",
            )
            .bind(("id", id_str.clone()))
            .bind(("site_id", site_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PlaceRow> = result.take(0).map_err(DbError::from)?;
        Ok(first_row(rows, "place", &id_str)?.try_into_place()?)
    }

    async fn update(&self, site_id: Uuid, id: Uuid, input: UpdatePlace) -> LokalResult<Place> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.name.is_some() {
            sets.push("name = $name");
        }
        if input.is_featured.is_some() {
            sets.push("is_featured = $is_featured");
        }
        if input.is_active.is_some() {
            sets.push("is_active = $is_active");
        }
        if input.gallery_image_limit.is_some() {
            sets.push("gallery_image_limit = $gallery_image_limit");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('place', $id) SET {} WHERE site_id = $site_id; \
             SELECT meta::id(id) AS record_id, * FROM type::record('place', $id) \
             WHERE site_id = $site_id;",
            sets.join(", ")
        );

        let mut builder = self
            .db
            .query(&query)
            .bind(("id", id_str.clone()))
            .bind(("site_id", site_id.to_string()));
        if let Some(name) = input.name {
            builder = builder.bind(("name", name));
        }
        if let Some(is_featured) = input.is_featured {
            builder = builder.bind(("is_featured", is_featured));
        }
        if let Some(is_active) = input.is_active {
            builder = builder.bind(("is_active", is_active));
        }
        if let Some(limit) = input.gallery_image_limit {
            builder = builder.bind(("gallery_image_limit", limit));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result.check().map_err(DbError::from_statement)?;

        let rows: Vec<PlaceRow> = result.take(1).map_err(DbError::from)?;
        Ok(first_row(rows, "place", &id_str)?.try_into_place()?)
    }

    async fn delete(&self, site_id: Uuid, id: Uuid) -> LokalResult<()> {
        self.db
            .query("DELETE type::record('place', $id) WHERE site_id = $site_id")
            .bind(("id", id.to_string()))
            .bind(("site_id", site_id.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn list(
        &self,
        site_id: Uuid,
        pagination: Pagination,
    ) -> LokalResult<PaginatedResult<Place>> {
        let site_id_str = site_id.to_string();

        let mut count_result = self
            .db
            .query("SELECT count() AS total FROM place WHERE site_id = $site_id GROUP ALL")
            .bind(("site_id", site_id_str.clone()))
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM place \
                 WHERE site_id = $site_id \
                 ORDER BY name ASC LIMIT $limit START $offset",
            )
            .bind(("site_id", site_id_str))
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PlaceRow> = result.take(0).map_err(DbError::from)?;
        let items = rows
            .into_iter()
            .map(PlaceRow::try_into_place)
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total: total(&count_rows),
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }
}
