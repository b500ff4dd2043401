//! SurrealDB implementation of [`PriceBandRepository`].
//!
//! The band's `key` is stored as `band_key`.

use chrono::{DateTime, Utc};
use lokal_core::error::LokalResult;
use lokal_core::models::price_band::{
    CreatePriceBand, DEFAULT_CURRENCY, PriceBand, UpdatePriceBand,
};
use lokal_core::repository::PriceBandRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::{first_row, next_sort_order, parse_uuid};
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct PriceBandRow {
    record_id: String,
    site_id: String,
    band_key: String,
    label: String,
    min_price: u32,
    max_price: Option<u32>,
    currency: String,
    sort_order: i64,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl PriceBandRow {
    fn try_into_price_band(self) -> Result<PriceBand, DbError> {
        Ok(PriceBand {
            id: parse_uuid(&self.record_id, "price_band")?,
            site_id: parse_uuid(&self.site_id, "site")?,
            key: self.band_key,
            label: self.label,
            min_price: self.min_price,
            max_price: self.max_price,
            currency: self.currency,
            sort_order: self.sort_order,
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// SurrealDB implementation of the PriceBand repository.
#[derive(Clone)]
pub struct SurrealPriceBandRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealPriceBandRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> PriceBandRepository for SurrealPriceBandRepository<C> {
    async fn create(&self, input: CreatePriceBand) -> LokalResult<PriceBand> {
        let id_str = Uuid::new_v4().to_string();
        let sort_order = match input.sort_order {
            Some(order) => order,
            None => next_sort_order(&self.db, "price_band", Some(("site_id", input.site_id))).await?,
        };

        let result = self
            .db
            .query(
                "CREATE type::record('price_band', $id) SET \
                 site_id = $site_id, band_key = $band_key, label = $label, \
                 min_price = $min_price, max_price = $max_price, \
                 currency = $currency, sort_order = $sort_order; \
                 SELECT meta::id(id) AS record_id, * \
                 FROM type::record('price_band', $id);",
            )
            .bind(("id", id_str.clone()))
            .bind(("site_id", input.site_id.to_string()))
            .bind(("band_key", input.key))
            .bind(("label", input.label))
            .bind(("min_price", input.min_price))
            .bind(("max_price", input.max_price))
            .bind((
                "currency",
                input.currency.unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
            ))
            .bind(("sort_order", sort_order))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(DbError::from_statement)?;

        let rows: Vec<PriceBandRow> = result.take(1).map_err(DbError::from)?;
        Ok(first_row(rows, "price_band", &id_str)?.try_into_price_band()?)
    }

    async fn get_by_id(&self, site_id: Uuid, id: Uuid) -> LokalResult<PriceBand> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM type::record('price_band', $id) \
                 WHERE site_id = $site_id",
            )
            .bind(("id", id_str.clone()))
            .bind(("site_id", site_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PriceBandRow> = result.take(0).map_err(DbError::from)?;
        Ok(first_row(rows, "price_band", &id_str)?.try_into_price_band()?)
    }

    async fn update(&self, site_id: Uuid, id: Uuid, input: UpdatePriceBand) -> LokalResult<PriceBand> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.label.is_some() {
            sets.push("label = $label");
        }
        if input.min_price.is_some() {
            sets.push("min_price = $min_price");
        }
        if input.max_price.is_some() {
            sets.push("max_price = $max_price");
        }
        if input.currency.is_some() {
            sets.push("currency = $currency");
        }
        if input.sort_order.is_some() {
            sets.push("sort_order = $sort_order");
        }
        if input.is_active.is_some() {
            sets.push("is_active = $is_active");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('price_band', $id) SET {} WHERE site_id = $site_id; \
             SELECT meta::id(id) AS record_id, * FROM type::record('price_band', $id) \
             WHERE site_id = $site_id;",
            sets.join(", ")
        );

        let mut builder = self
            .db
            .query(&query)
            .bind(("id", id_str.clone()))
            .bind(("site_id", site_id.to_string()));
        if let Some(label) = input.label {
            builder = builder.bind(("label", label));
        }
        if let Some(min_price) = input.min_price {
            builder = builder.bind(("min_price", min_price));
        }
        if let Some(max_price) = input.max_price {
            builder = builder.bind(("max_price", max_price));
        }
        if let Some(currency) = input.currency {
            builder = builder.bind(("currency", currency));
        }
        if let Some(sort_order) = input.sort_order {
            builder = builder.bind(("sort_order", sort_order));
        }
        if let Some(is_active) = input.is_active {
            builder = builder.bind(("is_active", is_active));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result.check().map_err(DbError::from_statement)?;

        let rows: Vec<PriceBandRow> = result.take(1).map_err(DbError::from)?;
        Ok(first_row(rows, "price_band", &id_str)?.try_into_price_band()?)
    }

    async fn delete(&self, site_id: Uuid, id: Uuid) -> LokalResult<()> {
        self.db
            .query("DELETE type::record('price_band', $id) WHERE site_id = $site_id")
            .bind(("id", id.to_string()))
            .bind(("site_id", site_id.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn list_by_site(&self, site_id: Uuid) -> LokalResult<Vec<PriceBand>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM price_band \
                 WHERE site_id = $site_id ORDER BY sort_order ASC, min_price ASC",
            )
            .bind(("site_id", site_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PriceBandRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows
            .into_iter()
            .map(PriceBandRow::try_into_price_band)
            .collect::<Result<Vec<_>, DbError>>()?)
    }
}
