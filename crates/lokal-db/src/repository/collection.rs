//! SurrealDB implementation of [`CollectionRepository`].
//!
//! Per-language texts are stored as one object keyed by language code,
//! e.g. `{"hu": {"title": "...", "description": null}}`, which keeps
//! "one translation per language" structural.

use chrono::{DateTime, Utc};
use lokal_core::error::LokalResult;
use lokal_core::lang::Lang;
use lokal_core::models::collection::{
    Collection, CollectionItem, CollectionTranslation, CreateCollection, CreateCollectionItem,
    UpdateCollection, UpdateCollectionItem,
};
use lokal_core::repository::{CollectionRepository, PaginatedResult, Pagination};
use serde_json::{Map, Value, json};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::{CountRow, first_row, next_sort_order, parse_uuid, total};
use crate::error::DbError;

fn translations_to_json(translations: Vec<CollectionTranslation>) -> Value {
    let mut map = Map::new();
    for t in translations {
        map.insert(
            t.lang.as_str().to_string(),
            json!({ "title": t.title, "description": t.description }),
        );
    }
    Value::Object(map)
}

fn translations_from_json(value: Value) -> Result<Vec<CollectionTranslation>, DbError> {
    let Value::Object(mut map) = value else {
        return Err(DbError::InvalidRow("translations must be an object".into()));
    };
    let mut out = Vec::new();
    for lang in Lang::ALL {
        let Some(entry) = map.remove(lang.as_str()) else {
            continue;
        };
        let title = entry
            .get("title")
            .and_then(Value::as_str)
            .ok_or_else(|| DbError::InvalidRow(format!("translation '{lang}' has no title")))?
            .to_string();
        let description = entry
            .get("description")
            .and_then(Value::as_str)
            .map(str::to_string);
        out.push(CollectionTranslation {
            lang,
            title,
            description,
        });
    }
    Ok(out)
}

#[derive(Debug, SurrealValue)]
struct CollectionRow {
    record_id: String,
    slug: String,
    is_active: bool,
    sort_order: i64,
    translations: Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl CollectionRow {
    fn try_into_collection(self) -> Result<Collection, DbError> {
        Ok(Collection {
            id: parse_uuid(&self.record_id, "collection")?,
            slug: self.slug,
            is_active: self.is_active,
            sort_order: self.sort_order,
            translations: translations_from_json(self.translations)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, SurrealValue)]
struct ItemRow {
    record_id: String,
    collection_id: String,
    site_id: String,
    sort_order: i64,
    overrides: Value,
    created_at: DateTime<Utc>,
}

impl ItemRow {
    fn try_into_item(self) -> Result<CollectionItem, DbError> {
        Ok(CollectionItem {
            id: parse_uuid(&self.record_id, "collection_item")?,
            collection_id: parse_uuid(&self.collection_id, "collection")?,
            site_id: parse_uuid(&self.site_id, "site")?,
            sort_order: self.sort_order,
            overrides: translations_from_json(self.overrides)?,
            created_at: self.created_at,
        })
    }
}

/// SurrealDB implementation of the Collection repository.
#[derive(Clone)]
pub struct SurrealCollectionRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealCollectionRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    async fn get_item(&self, collection_id: Uuid, item_id: Uuid) -> Result<CollectionItem, DbError> {
        let id_str = item_id.to_string();
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * \
                 FROM type::record('collection_item', $id) \
                 WHERE collection_id = $collection_id",
            )
            .bind(("id", id_str.clone()))
            .bind(("collection_id", collection_id.to_string()))
            .await?;

        let rows: Vec<ItemRow> = result.take(0)?;
        first_row(rows, "collection_item", &id_str)?.try_into_item()
    }
}

impl<C: Connection> CollectionRepository for SurrealCollectionRepository<C> {
    async fn create(&self, input: CreateCollection) -> LokalResult<Collection> {
        let id_str = Uuid::new_v4().to_string();
        let sort_order = match input.sort_order {
            Some(order) => order,
            None => next_sort_order(&self.db, "collection", None).await?,
        };

        let result = self
            .db
            .query(
                "CREATE type::record('collection', $id) SET \
                 slug = $slug, sort_order = $sort_order, \
                 translations = $translations; \
                 SELECT meta::id(id) AS record_id, * \
                 FROM type::record('collection', $id);",
            )
            .bind(("id", id_str.clone()))
            .bind(("slug", input.slug))
            .bind(("sort_order", sort_order))
            .bind(("translations", translations_to_json(input.translations)))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(DbError::from_statement)?;

        let rows: Vec<CollectionRow> = result.take(1).map_err(DbError::from)?;
        Ok(first_row(rows, "collection", &id_str)?.try_into_collection()?)
    }

    async fn get_by_id(&self, id: Uuid) -> LokalResult<Collection> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT meta::id(id) AS record_id, * FROM type::record('collection', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CollectionRow> = result.take(0).map_err(DbError::from)?;
        Ok(first_row(rows, "collection", &id_str)?.try_into_collection()?)
    }

    async fn find_by_slug(&self, slug: &str) -> LokalResult<Option<Collection>> {
        let mut result = self
            .db
            .query("SELECT meta::id(id) AS record_id, * FROM collection WHERE slug = $slug")
            .bind(("slug", slug.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CollectionRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows
            .into_iter()
            .next()
            .map(CollectionRow::try_into_collection)
            .transpose()?)
    }

    async fn update(&self, id: Uuid, input: UpdateCollection) -> LokalResult<Collection> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.slug.is_some() {
            sets.push("slug = $slug");
        }
        if input.is_active.is_some() {
            sets.push("is_active = $is_active");
        }
        if input.sort_order.is_some() {
            sets.push("sort_order = $sort_order");
        }
        if input.translations.is_some() {
            sets.push("translations = $translations");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('collection', $id) SET {}; \
             SELECT meta::id(id) AS record_id, * FROM type::record('collection', $id);",
            sets.join(", ")
        );

        let mut builder = self.db.query(&query).bind(("id", id_str.clone()));
        if let Some(slug) = input.slug {
            builder = builder.bind(("slug", slug));
        }
        if let Some(is_active) = input.is_active {
            builder = builder.bind(("is_active", is_active));
        }
        if let Some(sort_order) = input.sort_order {
            builder = builder.bind(("sort_order", sort_order));
        }
        if let Some(translations) = input.translations {
            builder = builder.bind(("translations", translations_to_json(translations)));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result.check().map_err(DbError::from_statement)?;

        let rows: Vec<CollectionRow> = result.take(1).map_err(DbError::from)?;
        Ok(first_row(rows, "collection", &id_str)?.try_into_collection()?)
    }

    async fn delete(&self, id: Uuid) -> LokalResult<()> {
        self.db
            .query(
                "BEGIN TRANSACTION; \
                 DELETE collection_item WHERE collection_id = $id; \
                 DELETE type::record('collection', $id); \
                 COMMIT TRANSACTION;",
            )
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(DbError::from_statement)?;

        Ok(())
    }

    async fn list(&self, pagination: Pagination) -> LokalResult<PaginatedResult<Collection>> {
        let mut count_result = self
            .db
            .query("SELECT count() AS total FROM collection GROUP ALL")
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM collection \
                 ORDER BY sort_order ASC, slug ASC LIMIT $limit START $offset",
            )
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CollectionRow> = result.take(0).map_err(DbError::from)?;
        let items = rows
            .into_iter()
            .map(CollectionRow::try_into_collection)
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total: total(&count_rows),
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }

    async fn add_item(
        &self,
        collection_id: Uuid,
        input: CreateCollectionItem,
    ) -> LokalResult<CollectionItem> {
        let id_str = Uuid::new_v4().to_string();
        let sort_order = match input.sort_order {
            Some(order) => order,
            None => {
                next_sort_order(&self.db, "collection_item", Some(("collection_id", collection_id)))
                    .await?
            }
        };

        let result = self
            .db
            .query(
                "CREATE type::record('collection_item', $id) SET \
                 collection_id = $collection_id, site_id = $site_id, \
                 sort_order = $sort_order, overrides = $overrides; \
                 SELECT meta::id(id) AS record_id, * \
                 FROM type::record('collection_item', $id);",
            )
            .bind(("id", id_str.clone()))
            .bind(("collection_id", collection_id.to_string()))
            .bind(("site_id", input.site_id.to_string()))
            .bind(("sort_order", sort_order))
            .bind(("overrides", translations_to_json(input.overrides)))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(DbError::from_statement)?;

        let rows: Vec<ItemRow> = result.take(1).map_err(DbError::from)?;
        Ok(first_row(rows, "collection_item", &id_str)?.try_into_item()?)
    }

    async fn update_item(
        &self,
        collection_id: Uuid,
        item_id: Uuid,
        input: UpdateCollectionItem,
    ) -> LokalResult<CollectionItem> {
        self.get_item(collection_id, item_id).await?;

        let mut sets = Vec::new();
        if input.sort_order.is_some() {
            sets.push("sort_order = $sort_order");
        }
        if input.overrides.is_some() {
            sets.push("overrides = $overrides");
        }
        if sets.is_empty() {
            return Ok(self.get_item(collection_id, item_id).await?);
        }

        let query = format!(
            "UPDATE type::record('collection_item', $id) SET {}",
            sets.join(", ")
        );
        let mut builder = self.db.query(&query).bind(("id", item_id.to_string()));
        if let Some(sort_order) = input.sort_order {
            builder = builder.bind(("sort_order", sort_order));
        }
        if let Some(overrides) = input.overrides {
            builder = builder.bind(("overrides", translations_to_json(overrides)));
        }

        builder
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(DbError::from_statement)?;

        Ok(self.get_item(collection_id, item_id).await?)
    }

    async fn remove_item(&self, collection_id: Uuid, item_id: Uuid) -> LokalResult<()> {
        self.get_item(collection_id, item_id).await?;

        self.db
            .query(
                "DELETE type::record('collection_item', $id) \
                 WHERE collection_id = $collection_id",
            )
            .bind(("id", item_id.to_string()))
            .bind(("collection_id", collection_id.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn list_items(&self, collection_id: Uuid) -> LokalResult<Vec<CollectionItem>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM collection_item \
                 WHERE collection_id = $collection_id ORDER BY sort_order ASC",
            )
            .bind(("collection_id", collection_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ItemRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows
            .into_iter()
            .map(ItemRow::try_into_item)
            .collect::<Result<Vec<_>, DbError>>()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translations_are_keyed_by_language() {
        let value = translations_to_json(vec![
            CollectionTranslation {
                lang: Lang::En,
                title: "Lakeside".into(),
                description: None,
            },
            CollectionTranslation {
                lang: Lang::Hu,
                title: "Tóparti".into(),
                description: Some("Balaton".into()),
            },
        ]);
        assert_eq!(value["hu"]["title"], "Tóparti");

        // Read back in canonical language order.
        let parsed = translations_from_json(value).unwrap();
        assert_eq!(parsed[0].lang, Lang::Hu);
        assert_eq!(parsed[0].description.as_deref(), Some("Balaton"));
        assert_eq!(parsed[1].lang, Lang::En);
    }

    #[test]
    fn translation_without_title_is_invalid() {
        let err = translations_from_json(json!({ "de": { "description": "x" } })).unwrap_err();
        assert!(matches!(err, DbError::InvalidRow(_)));
    }
}
