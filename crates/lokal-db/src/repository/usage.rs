//! SurrealDB implementation of [`UsageRepository`].
//!
//! Every counter is a live `count()` over the owning table, so usage
//! can never drift from the rows it describes.

use chrono::{DateTime, Utc};
use lokal_core::error::LokalResult;
use lokal_core::repository::UsageRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::{CountRow, total};
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct LangRow {
    #[allow(dead_code)]
    lang: String,
}

/// SurrealDB implementation of the Usage repository.
#[derive(Clone)]
pub struct SurrealUsageRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealUsageRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    /// `count()` over `table` for one site plus an optional extra
    /// condition.
    async fn count_where(
        &self,
        table: &'static str,
        site_id: Uuid,
        condition: Option<&'static str>,
    ) -> Result<u64, DbError> {
        let query = match condition {
            Some(cond) => format!(
                "SELECT count() AS total FROM {table} \
                 WHERE site_id = $site_id AND {cond} GROUP ALL"
            ),
            None => format!(
                "SELECT count() AS total FROM {table} \
                 WHERE site_id = $site_id GROUP ALL"
            ),
        };

        let mut result = self
            .db
            .query(&query)
            .bind(("site_id", site_id.to_string()))
            .await?;
        let rows: Vec<CountRow> = result.take(0)?;
        Ok(total(&rows))
    }
}

impl<C: Connection> UsageRepository for SurrealUsageRepository<C> {
    async fn count_places(&self, site_id: Uuid) -> LokalResult<u64> {
        Ok(self.count_where("place", site_id, None).await?)
    }

    async fn count_featured_places(&self, site_id: Uuid) -> LokalResult<u64> {
        Ok(self
            .count_where("place", site_id, Some("is_featured = true"))
            .await?)
    }

    async fn count_events_between(
        &self,
        site_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> LokalResult<u64> {
        let mut result = self
            .db
            .query(
                "SELECT count() AS total FROM event \
                 WHERE site_id = $site_id AND starts_at >= $from AND starts_at < $to \
                 GROUP ALL",
            )
            .bind(("site_id", site_id.to_string()))
            .bind(("from", from))
            .bind(("to", to))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CountRow> = result.take(0).map_err(DbError::from)?;
        Ok(total(&rows))
    }

    async fn count_members(&self, site_id: Uuid) -> LokalResult<u64> {
        Ok(self.count_where("site_member", site_id, None).await?)
    }

    async fn count_domain_aliases(&self, site_id: Uuid) -> LokalResult<u64> {
        Ok(self
            .count_where("site_domain", site_id, Some("is_primary = false"))
            .await?)
    }

    async fn count_languages(&self, site_id: Uuid) -> LokalResult<u64> {
        let mut result = self
            .db
            .query(
                "SELECT lang FROM site_key \
                 WHERE site_id = $site_id AND is_active = true GROUP BY lang",
            )
            .bind(("site_id", site_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<LangRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows.len() as u64)
    }

    async fn count_galleries(&self, site_id: Uuid) -> LokalResult<u64> {
        Ok(self.count_where("gallery", site_id, None).await?)
    }

    async fn count_place_gallery_images(&self, site_id: Uuid, place_id: Uuid) -> LokalResult<u64> {
        let mut result = self
            .db
            .query(
                "SELECT count() AS total FROM gallery_image \
                 WHERE site_id = $site_id AND place_id = $place_id GROUP ALL",
            )
            .bind(("site_id", site_id.to_string()))
            .bind(("place_id", place_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CountRow> = result.take(0).map_err(DbError::from)?;
        Ok(total(&rows))
    }
}
