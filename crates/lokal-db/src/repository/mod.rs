//! SurrealDB repository implementations.
//!
//! Every repository reads rows through `SELECT meta::id(id) AS
//! record_id, *` so one row struct per table covers both point lookups
//! and lists. Writes are followed by a read-back in the same query.

mod collection;
mod feature_subscription;
mod floorplan;
mod legal_page;
mod place;
mod price_band;
mod site;
mod site_key;
mod site_subscription;
mod slug;
mod usage;

pub use collection::SurrealCollectionRepository;
pub use feature_subscription::SurrealFeatureSubscriptionRepository;
pub use floorplan::SurrealFloorplanRepository;
pub use legal_page::SurrealLegalPageRepository;
pub use place::SurrealPlaceRepository;
pub use price_band::SurrealPriceBandRepository;
pub use site::SurrealSiteRepository;
pub use site_key::SurrealSiteKeyRepository;
pub use site_subscription::SurrealSiteSubscriptionRepository;
pub use slug::SurrealSlugRepository;
pub use usage::SurrealUsageRepository;

use std::str::FromStr;

use lokal_core::error::LokalError;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

/// Row struct for count queries.
#[derive(Debug, SurrealValue)]
pub(crate) struct CountRow {
    pub(crate) total: u64,
}

/// Row struct for the highest `sort_order` lookup.
#[derive(Debug, SurrealValue)]
struct SortRow {
    sort_order: i64,
}

pub(crate) fn parse_uuid(value: &str, what: &str) -> Result<Uuid, DbError> {
    Uuid::parse_str(value).map_err(|e| DbError::InvalidRow(format!("invalid {what} UUID: {e}")))
}

pub(crate) fn parse_opt_uuid(value: Option<String>, what: &str) -> Result<Option<Uuid>, DbError> {
    value.as_deref().map(|v| parse_uuid(v, what)).transpose()
}

pub(crate) fn parse_enum<T>(value: &str) -> Result<T, DbError>
where
    T: FromStr<Err = LokalError>,
{
    value
        .parse()
        .map_err(|e: LokalError| DbError::InvalidRow(e.to_string()))
}

/// First row of a result set, or `NotFound`.
pub(crate) fn first_row<T>(rows: Vec<T>, entity: &str, id: &str) -> Result<T, DbError> {
    rows.into_iter()
        .next()
        .ok_or_else(|| DbError::not_found(entity, id))
}

pub(crate) fn total(rows: &[CountRow]) -> u64 {
    rows.first().map(|r| r.total).unwrap_or(0)
}

/// Next free `sort_order` in `table`, optionally among rows whose
/// `parent_field` equals the given id. Empty sets start at 0.
pub(crate) async fn next_sort_order<C: Connection>(
    db: &Surreal<C>,
    table: &'static str,
    parent: Option<(&'static str, Uuid)>,
) -> Result<i64, DbError> {
    let filter = match parent {
        Some((field, _)) => format!("WHERE {field} = $parent"),
        None => String::new(),
    };
    let query =
        format!("SELECT sort_order FROM {table} {filter} ORDER BY sort_order DESC LIMIT 1");

    let mut builder = db.query(&query);
    if let Some((_, parent_id)) = parent {
        builder = builder.bind(("parent", parent_id.to_string()));
    }
    let mut result = builder.await?;
    let rows: Vec<SortRow> = result.take(0)?;
    Ok(rows.first().map(|r| r.sort_order + 1).unwrap_or(0))
}
