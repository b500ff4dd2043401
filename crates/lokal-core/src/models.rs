//! Domain models for Lokal.
//!
//! These are the core types shared across all crates. Every
//! site-owned entity carries a `site_id`; repositories take it as a
//! parameter to keep tenants isolated.

pub mod collection;
pub mod feature_subscription;
pub mod floorplan;
pub mod legal_page;
pub mod place;
pub mod price_band;
pub mod site;
pub mod site_key;
pub mod site_subscription;
pub mod slug;

/// Deserializer for `Option<Option<T>>` patch fields: a missing field
/// stays `None`, an explicit `null` becomes `Some(None)`.
///
/// Use together with `#[serde(default)]`.
pub fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: serde::Deserialize<'de>,
{
    <Option<T> as serde::Deserialize>::deserialize(deserializer).map(Some)
}
