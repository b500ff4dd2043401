//! SurrealDB implementation of [`FloorplanRepository`]: floorplans and
//! their pins.
//!
//! Pins belong to a floorplan through `floorplan_id`; deleting a
//! floorplan removes its pins in the same transaction.

use chrono::{DateTime, Utc};
use lokal_core::error::LokalResult;
use lokal_core::models::floorplan::{
    CreateFloorplan, CreatePin, FloorplanPin, PlaceFloorplan, UpdateFloorplan, UpdatePin,
};
use lokal_core::repository::FloorplanRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::{CountRow, first_row, next_sort_order, parse_uuid, total};
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct FloorplanRow {
    record_id: String,
    site_id: String,
    place_id: String,
    title: String,
    image_url: String,
    sort_order: i64,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl FloorplanRow {
    fn try_into_floorplan(self) -> Result<PlaceFloorplan, DbError> {
        Ok(PlaceFloorplan {
            id: parse_uuid(&self.record_id, "place_floorplan")?,
            site_id: parse_uuid(&self.site_id, "site")?,
            place_id: parse_uuid(&self.place_id, "place")?,
            title: self.title,
            image_url: self.image_url,
            sort_order: self.sort_order,
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, SurrealValue)]
struct PinRow {
    record_id: String,
    site_id: String,
    floorplan_id: String,
    x: f64,
    y: f64,
    label: String,
    sort_order: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl PinRow {
    fn try_into_pin(self) -> Result<FloorplanPin, DbError> {
        Ok(FloorplanPin {
            id: parse_uuid(&self.record_id, "floorplan_pin")?,
            site_id: parse_uuid(&self.site_id, "site")?,
            floorplan_id: parse_uuid(&self.floorplan_id, "place_floorplan")?,
            x: self.x,
            y: self.y,
            label: self.label,
            sort_order: self.sort_order,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// SurrealDB implementation of the Floorplan repository.
#[derive(Clone)]
pub struct SurrealFloorplanRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealFloorplanRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> FloorplanRepository for SurrealFloorplanRepository<C> {
    async fn create(&self, input: CreateFloorplan) -> LokalResult<PlaceFloorplan> {
        let id_str = Uuid::new_v4().to_string();
        let sort_order = match input.sort_order {
            Some(order) => order,
            None => {
                next_sort_order(&self.db, "place_floorplan", Some(("place_id", input.place_id))).await?
            }
        };

        let result = self
            .db
            .query(
                "CREATE type::record('place_floorplan', $id) SET \
                 site_id = $site_id, place_id = $place_id, title = $title, \
                 image_url = $image_url, sort_order = $sort_order; \
                 SELECT meta::id(id) AS record_id, * \
                 FROM type::record('place_floorplan', $id);",
            )
            .bind(("id", id_str.clone()))
            .bind(("site_id", input.site_id.to_string()))
            .bind(("place_id", input.place_id.to_string()))
            .bind(("title", input.title))
            .bind(("image_url", input.image_url))
            .bind(("sort_order", sort_order))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(DbError::from_statement)?;

        let rows: Vec<FloorplanRow> = result.take(1).map_err(DbError::from)?;
        Ok(first_row(rows, "place_floorplan", &id_str)?.try_into_floorplan()?)
    }

    async fn get_by_id(&self, site_id: Uuid, id: Uuid) -> LokalResult<PlaceFloorplan> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * \
                 FROM type::record('place_floorplan', $id) WHERE site_id = $site_id",
            )
            .bind(("id", id_str.clone()))
            .bind(("site_id", site_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<FloorplanRow> = result.take(0).map_err(DbError::from)?;
        Ok(first_row(rows, "place_floorplan", &id_str)?.try_into_floorplan()?)
    }

    async fn update(
        &self,
        site_id: Uuid,
        id: Uuid,
        input: UpdateFloorplan,
    ) -> LokalResult<PlaceFloorplan> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.title.is_some() {
            sets.push("title = $title");
        }
        if input.image_url.is_some() {
            sets.push("image_url = $image_url");
        }
        if input.sort_order.is_some() {
            sets.push("sort_order = $sort_order");
        }
        if input.is_active.is_some() {
            sets.push("is_active = $is_active");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('place_floorplan', $id) SET {} \
             WHERE site_id = $site_id; \
             SELECT meta::id(id) AS record_id, * \
             FROM type::record('place_floorplan', $id) WHERE site_id = $site_id;",
            sets.join(", ")
        );

        let mut builder = self
            .db
            .query(&query)
            .bind(("id", id_str.clone()))
            .bind(("site_id", site_id.to_string()));
        if let Some(title) = input.title {
            builder = builder.bind(("title", title));
        }
        if let Some(image_url) = input.image_url {
            builder = builder.bind(("image_url", image_url));
        }
        if let Some(sort_order) = input.sort_order {
            builder = builder.bind(("sort_order", sort_order));
        }
        if let Some(is_active) = input.is_active {
            builder = builder.bind(("is_active", is_active));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result.check().map_err(DbError::from_statement)?;

        let rows: Vec<FloorplanRow> = result.take(1).map_err(DbError::from)?;
        Ok(first_row(rows, "place_floorplan", &id_str)?.try_into_floorplan()?)
    }

    async fn delete(&self, site_id: Uuid, id: Uuid) -> LokalResult<()> {
        self.get_by_id(site_id, id).await?;

        self.db
            .query(
                "BEGIN TRANSACTION; \
                 DELETE floorplan_pin WHERE site_id = $site_id AND floorplan_id = $id; \
                 DELETE type::record('place_floorplan', $id); \
                 COMMIT TRANSACTION;",
            )
            .bind(("id", id.to_string()))
            .bind(("site_id", site_id.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(DbError::from_statement)?;

        Ok(())
    }

    async fn list_by_place(&self, site_id: Uuid, place_id: Uuid) -> LokalResult<Vec<PlaceFloorplan>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM place_floorplan \
                 WHERE site_id = $site_id AND place_id = $place_id \
                 ORDER BY sort_order ASC",
            )
            .bind(("site_id", site_id.to_string()))
            .bind(("place_id", place_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<FloorplanRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows
            .into_iter()
            .map(FloorplanRow::try_into_floorplan)
            .collect::<Result<Vec<_>, DbError>>()?)
    }

    async fn count_by_place(&self, site_id: Uuid, place_id: Uuid) -> LokalResult<u64> {
        let mut result = self
            .db
            .query(
                "SELECT count() AS total FROM place_floorplan \
                 WHERE site_id = $site_id AND place_id = $place_id GROUP ALL",
            )
            .bind(("site_id", site_id.to_string()))
            .bind(("place_id", place_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CountRow> = result.take(0).map_err(DbError::from)?;
        Ok(total(&rows))
    }

    async fn create_pin(&self, input: CreatePin) -> LokalResult<FloorplanPin> {
        let id_str = Uuid::new_v4().to_string();
        let sort_order = match input.sort_order {
            Some(order) => order,
            None => {
                next_sort_order(&self.db, "floorplan_pin", Some(("floorplan_id", input.floorplan_id))).await?
            }
        };

        let result = self
            .db
            .query(
                "CREATE type::record('floorplan_pin', $id) SET \
                 site_id = $site_id, floorplan_id = $floorplan_id, \
                 x = $x, y = $y, label = $label, sort_order = $sort_order; \
                 SELECT meta::id(id) AS record_id, * \
                 FROM type::record('floorplan_pin', $id);",
            )
            .bind(("id", id_str.clone()))
            .bind(("site_id", input.site_id.to_string()))
            .bind(("floorplan_id", input.floorplan_id.to_string()))
            .bind(("x", input.x))
            .bind(("y", input.y))
            .bind(("label", input.label))
            .bind(("sort_order", sort_order))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(DbError::from_statement)?;

        let rows: Vec<PinRow> = result.take(1).map_err(DbError::from)?;
        Ok(first_row(rows, "floorplan_pin", &id_str)?.try_into_pin()?)
    }

    async fn get_pin(&self, site_id: Uuid, id: Uuid) -> LokalResult<FloorplanPin> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * \
                 FROM type::record('floorplan_pin', $id) WHERE site_id = $site_id",
            )
            .bind(("id", id_str.clone()))
            .bind(("site_id", site_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PinRow> = result.take(0).map_err(DbError::from)?;
        Ok(first_row(rows, "floorplan_pin", &id_str)?.try_into_pin()?)
    }

    async fn update_pin(&self, site_id: Uuid, id: Uuid, input: UpdatePin) -> LokalResult<FloorplanPin> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.x.is_some() {
            sets.push("x = $x");
        }
        if input.y.is_some() {
            sets.push("y = $y");
        }
        if input.label.is_some() {
            sets.push("label = $label");
        }
        if input.sort_order.is_some() {
            sets.push("sort_order = $sort_order");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('floorplan_pin', $id) SET {} \
             WHERE site_id = $site_id; \
             SELECT meta::id(id) AS record_id, * \
             FROM type::record('floorplan_pin', $id) WHERE site_id = $site_id;",
            sets.join(", ")
        );

        let mut builder = self
            .db
            .query(&query)
            .bind(("id", id_str.clone()))
            .bind(("site_id", site_id.to_string()));
        if let Some(x) = input.x {
            builder = builder.bind(("x", x));
        }
        if let Some(y) = input.y {
            builder = builder.bind(("y", y));
        }
        if let Some(label) = input.label {
            builder = builder.bind(("label", label));
        }
        if let Some(sort_order) = input.sort_order {
            builder = builder.bind(("sort_order", sort_order));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result.check().map_err(DbError::from_statement)?;

        let rows: Vec<PinRow> = result.take(1).map_err(DbError::from)?;
        Ok(first_row(rows, "floorplan_pin", &id_str)?.try_into_pin()?)
    }

    async fn delete_pin(&self, site_id: Uuid, id: Uuid) -> LokalResult<()> {
        self.get_pin(site_id, id).await?;

        self.db
            .query("DELETE type::record('floorplan_pin', $id) WHERE site_id = $site_id")
            .bind(("id", id.to_string()))
            .bind(("site_id", site_id.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn list_pins(&self, site_id: Uuid, floorplan_id: Uuid) -> LokalResult<Vec<FloorplanPin>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM floorplan_pin \
                 WHERE site_id = $site_id AND floorplan_id = $floorplan_id \
                 ORDER BY sort_order ASC",
            )
            .bind(("site_id", site_id.to_string()))
            .bind(("floorplan_id", floorplan_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PinRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows
            .into_iter()
            .map(PinRow::try_into_pin)
            .collect::<Result<Vec<_>, DbError>>()?)
    }
}
