//! Schema definitions and migration runner for SurrealDB.
//!
//! All table definitions use SCHEMAFULL mode for data integrity.
//! UUIDs are stored as strings. Enums are stored as strings with
//! ASSERT constraints for validation.

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;

use crate::error::DbError;

// -----------------------------------------------------------------------
// Migration tracking
// -----------------------------------------------------------------------

const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

#[derive(Debug, SurrealValue)]
struct MigrationRecord {
    version: u32,
    #[allow(dead_code)]
    name: String,
}

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "initial_schema",
    sql: SCHEMA_V1,
}];

// -----------------------------------------------------------------------
// Schema v1: initial table definitions
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Sites (global scope)
-- =======================================================================
DEFINE TABLE site SCHEMAFULL;
DEFINE FIELD slug ON TABLE site TYPE string;
DEFINE FIELD name ON TABLE site TYPE string;
DEFINE FIELD primary_domain ON TABLE site TYPE option<string>;
DEFINE FIELD is_active ON TABLE site TYPE bool DEFAULT true;
DEFINE FIELD created_at ON TABLE site TYPE datetime DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE site TYPE datetime DEFAULT time::now();
DEFINE INDEX idx_site_slug ON TABLE site COLUMNS slug UNIQUE;

-- =======================================================================
-- Site subscriptions (one per site)
-- =======================================================================
DEFINE TABLE site_subscription SCHEMAFULL;
DEFINE FIELD site_id ON TABLE site_subscription TYPE string;
DEFINE FIELD plan ON TABLE site_subscription TYPE string \
    ASSERT $value IN ['FREE', 'BASIC', 'PRO', 'BUSINESS'];
DEFINE FIELD status ON TABLE site_subscription TYPE string \
    ASSERT $value IN ['ACTIVE', 'INACTIVE', 'CANCELED', 'EXPIRED'];
DEFINE FIELD valid_until ON TABLE site_subscription TYPE option<datetime>;
DEFINE FIELD plan_overrides ON TABLE site_subscription TYPE object FLEXIBLE \
    DEFAULT {};
DEFINE FIELD created_at ON TABLE site_subscription TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE site_subscription TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_site_subscription_site ON TABLE site_subscription \
    COLUMNS site_id UNIQUE;

-- =======================================================================
-- Feature subscriptions (site or place scope)
-- =======================================================================
DEFINE TABLE feature_subscription SCHEMAFULL;
DEFINE FIELD site_id ON TABLE feature_subscription TYPE string;
DEFINE FIELD scope ON TABLE feature_subscription TYPE string \
    ASSERT $value IN ['site', 'place'];
DEFINE FIELD place_id ON TABLE feature_subscription TYPE option<string>;
DEFINE FIELD feature_key ON TABLE feature_subscription TYPE string \
    ASSERT $value IN ['FLOORPLANS'];
DEFINE FIELD plan_key ON TABLE feature_subscription TYPE string \
    ASSERT $value IN ['FP_STANDARD', 'FP_CUSTOM'];
DEFINE FIELD billing_period ON TABLE feature_subscription TYPE string \
    ASSERT $value IN ['MONTHLY', 'YEARLY'];
DEFINE FIELD status ON TABLE feature_subscription TYPE string \
    ASSERT $value IN ['ACTIVE', 'CANCELED', 'SUSPENDED', 'EXPIRED'];
DEFINE FIELD floorplan_limit ON TABLE feature_subscription TYPE option<int>;
DEFINE FIELD current_period_start ON TABLE feature_subscription \
    TYPE datetime;
DEFINE FIELD current_period_end ON TABLE feature_subscription TYPE datetime;
DEFINE FIELD canceled_at ON TABLE feature_subscription TYPE option<datetime>;
DEFINE FIELD created_at ON TABLE feature_subscription TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE feature_subscription TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_feature_subscription_site_feature \
    ON TABLE feature_subscription COLUMNS site_id, feature_key;

-- =======================================================================
-- Site keys (public per-language URL keys)
-- =======================================================================
DEFINE TABLE site_key SCHEMAFULL;
DEFINE FIELD site_id ON TABLE site_key TYPE string;
DEFINE FIELD lang ON TABLE site_key TYPE string \
    ASSERT $value IN ['hu', 'en', 'de'];
DEFINE FIELD slug ON TABLE site_key TYPE string;
DEFINE FIELD is_primary ON TABLE site_key TYPE bool DEFAULT false;
DEFINE FIELD is_active ON TABLE site_key TYPE bool DEFAULT true;
DEFINE FIELD redirect_to_id ON TABLE site_key TYPE option<string>;
DEFINE FIELD created_at ON TABLE site_key TYPE datetime DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE site_key TYPE datetime DEFAULT time::now();
DEFINE INDEX idx_site_key_lang_slug ON TABLE site_key \
    COLUMNS lang, slug UNIQUE;
DEFINE INDEX idx_site_key_site_lang ON TABLE site_key \
    COLUMNS site_id, lang;

-- =======================================================================
-- Entity slugs (site scope)
-- =======================================================================
DEFINE TABLE slug SCHEMAFULL;
DEFINE FIELD site_id ON TABLE slug TYPE string;
DEFINE FIELD lang ON TABLE slug TYPE string \
    ASSERT $value IN ['hu', 'en', 'de'];
DEFINE FIELD slug ON TABLE slug TYPE string;
DEFINE FIELD entity_type ON TABLE slug TYPE string \
    ASSERT $value IN ['place', 'event', 'town', 'category', 'static_page'];
DEFINE FIELD entity_id ON TABLE slug TYPE string;
DEFINE FIELD is_primary ON TABLE slug TYPE bool DEFAULT false;
DEFINE FIELD is_active ON TABLE slug TYPE bool DEFAULT true;
DEFINE FIELD redirect_to_id ON TABLE slug TYPE option<string>;
DEFINE FIELD created_at ON TABLE slug TYPE datetime DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE slug TYPE datetime DEFAULT time::now();
DEFINE INDEX idx_slug_site_lang_slug ON TABLE slug \
    COLUMNS site_id, lang, slug UNIQUE;
DEFINE INDEX idx_slug_entity ON TABLE slug \
    COLUMNS site_id, entity_type, entity_id;

-- =======================================================================
-- Places (site scope)
-- =======================================================================
DEFINE TABLE place SCHEMAFULL;
DEFINE FIELD site_id ON TABLE place TYPE string;
DEFINE FIELD name ON TABLE place TYPE string;
DEFINE FIELD is_featured ON TABLE place TYPE bool DEFAULT false;
DEFINE FIELD is_active ON TABLE place TYPE bool DEFAULT true;
DEFINE FIELD gallery_image_limit ON TABLE place TYPE option<int>;
DEFINE FIELD created_at ON TABLE place TYPE datetime DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE place TYPE datetime DEFAULT time::now();
DEFINE INDEX idx_place_site ON TABLE place COLUMNS site_id;

-- =======================================================================
-- Floorplans and pins (site scope)
-- =======================================================================
DEFINE TABLE place_floorplan SCHEMAFULL;
DEFINE FIELD site_id ON TABLE place_floorplan TYPE string;
DEFINE FIELD place_id ON TABLE place_floorplan TYPE string;
DEFINE FIELD title ON TABLE place_floorplan TYPE string;
DEFINE FIELD image_url ON TABLE place_floorplan TYPE string;
DEFINE FIELD sort_order ON TABLE place_floorplan TYPE int DEFAULT 0;
DEFINE FIELD is_active ON TABLE place_floorplan TYPE bool DEFAULT true;
DEFINE FIELD created_at ON TABLE place_floorplan TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE place_floorplan TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_floorplan_place ON TABLE place_floorplan \
    COLUMNS site_id, place_id;

DEFINE TABLE floorplan_pin SCHEMAFULL;
DEFINE FIELD site_id ON TABLE floorplan_pin TYPE string;
DEFINE FIELD floorplan_id ON TABLE floorplan_pin TYPE string;
DEFINE FIELD x ON TABLE floorplan_pin TYPE float \
    ASSERT $value >= 0 AND $value <= 1;
DEFINE FIELD y ON TABLE floorplan_pin TYPE float \
    ASSERT $value >= 0 AND $value <= 1;
DEFINE FIELD label ON TABLE floorplan_pin TYPE string;
DEFINE FIELD sort_order ON TABLE floorplan_pin TYPE int DEFAULT 0;
DEFINE FIELD created_at ON TABLE floorplan_pin TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE floorplan_pin TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_pin_floorplan ON TABLE floorplan_pin \
    COLUMNS site_id, floorplan_id;

-- =======================================================================
-- Usage-only tables (counted by entitlements)
-- =======================================================================
DEFINE TABLE event SCHEMAFULL;
DEFINE FIELD site_id ON TABLE event TYPE string;
DEFINE FIELD title ON TABLE event TYPE string;
DEFINE FIELD starts_at ON TABLE event TYPE datetime;
DEFINE FIELD created_at ON TABLE event TYPE datetime DEFAULT time::now();

DEFINE TABLE site_member SCHEMAFULL;
DEFINE FIELD site_id ON TABLE site_member TYPE string;
DEFINE FIELD user_ref ON TABLE site_member TYPE string;
DEFINE FIELD role ON TABLE site_member TYPE string \
    ASSERT $value IN ['owner', 'editor', 'viewer'];
DEFINE FIELD created_at ON TABLE site_member TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_site_member_user ON TABLE site_member \
    COLUMNS site_id, user_ref UNIQUE;

DEFINE TABLE site_domain SCHEMAFULL;
DEFINE FIELD site_id ON TABLE site_domain TYPE string;
DEFINE FIELD domain ON TABLE site_domain TYPE string;
DEFINE FIELD is_primary ON TABLE site_domain TYPE bool DEFAULT false;
DEFINE FIELD created_at ON TABLE site_domain TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_site_domain_domain ON TABLE site_domain \
    COLUMNS domain UNIQUE;

DEFINE TABLE gallery SCHEMAFULL;
DEFINE FIELD site_id ON TABLE gallery TYPE string;
DEFINE FIELD place_id ON TABLE gallery TYPE option<string>;
DEFINE FIELD title ON TABLE gallery TYPE string;
DEFINE FIELD created_at ON TABLE gallery TYPE datetime DEFAULT time::now();

DEFINE TABLE gallery_image SCHEMAFULL;
DEFINE FIELD site_id ON TABLE gallery_image TYPE string;
DEFINE FIELD place_id ON TABLE gallery_image TYPE string;
DEFINE FIELD url ON TABLE gallery_image TYPE string;
DEFINE FIELD created_at ON TABLE gallery_image TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_gallery_image_place ON TABLE gallery_image \
    COLUMNS site_id, place_id;

-- =======================================================================
-- Legal pages (site scope)
-- =======================================================================
DEFINE TABLE legal_page SCHEMAFULL;
DEFINE FIELD site_id ON TABLE legal_page TYPE string;
DEFINE FIELD page_key ON TABLE legal_page TYPE string \
    ASSERT $value IN ['imprint', 'terms', 'privacy'];
DEFINE FIELD is_active ON TABLE legal_page TYPE bool DEFAULT true;
DEFINE FIELD created_at ON TABLE legal_page TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE legal_page TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_legal_page_site_key ON TABLE legal_page \
    COLUMNS site_id, page_key UNIQUE;

DEFINE TABLE legal_page_translation SCHEMAFULL;
DEFINE FIELD site_id ON TABLE legal_page_translation TYPE string;
DEFINE FIELD page_key ON TABLE legal_page_translation TYPE string \
    ASSERT $value IN ['imprint', 'terms', 'privacy'];
DEFINE FIELD lang ON TABLE legal_page_translation TYPE string \
    ASSERT $value IN ['hu', 'en', 'de'];
DEFINE FIELD title ON TABLE legal_page_translation TYPE string;
DEFINE FIELD content ON TABLE legal_page_translation TYPE string;
DEFINE FIELD seo_title ON TABLE legal_page_translation TYPE option<string>;
DEFINE FIELD seo_description ON TABLE legal_page_translation \
    TYPE option<string>;
DEFINE FIELD updated_at ON TABLE legal_page_translation TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_legal_translation_site_lang_key \
    ON TABLE legal_page_translation COLUMNS site_id, lang, page_key UNIQUE;

-- =======================================================================
-- Collections (global scope)
-- =======================================================================
DEFINE TABLE collection SCHEMAFULL;
DEFINE FIELD slug ON TABLE collection TYPE string;
DEFINE FIELD is_active ON TABLE collection TYPE bool DEFAULT true;
DEFINE FIELD sort_order ON TABLE collection TYPE int DEFAULT 0;
DEFINE FIELD translations ON TABLE collection TYPE object FLEXIBLE \
    DEFAULT {};
DEFINE FIELD created_at ON TABLE collection TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE collection TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_collection_slug ON TABLE collection COLUMNS slug UNIQUE;

DEFINE TABLE collection_item SCHEMAFULL;
DEFINE FIELD collection_id ON TABLE collection_item TYPE string;
DEFINE FIELD site_id ON TABLE collection_item TYPE string;
DEFINE FIELD sort_order ON TABLE collection_item TYPE int DEFAULT 0;
DEFINE FIELD overrides ON TABLE collection_item TYPE object FLEXIBLE \
    DEFAULT {};
DEFINE FIELD created_at ON TABLE collection_item TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_collection_item_site ON TABLE collection_item \
    COLUMNS collection_id, site_id UNIQUE;

-- =======================================================================
-- Price bands (site scope)
-- =======================================================================
DEFINE TABLE price_band SCHEMAFULL;
DEFINE FIELD site_id ON TABLE price_band TYPE string;
DEFINE FIELD band_key ON TABLE price_band TYPE string;
DEFINE FIELD label ON TABLE price_band TYPE string;
DEFINE FIELD min_price ON TABLE price_band TYPE int;
DEFINE FIELD max_price ON TABLE price_band TYPE option<int>;
DEFINE FIELD currency ON TABLE price_band TYPE string;
DEFINE FIELD sort_order ON TABLE price_band TYPE int DEFAULT 0;
DEFINE FIELD is_active ON TABLE price_band TYPE bool DEFAULT true;
DEFINE FIELD created_at ON TABLE price_band TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE price_band TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_price_band_site_key ON TABLE price_band \
    COLUMNS site_id, band_key UNIQUE;
";

/// Run all pending migrations against the database.
///
/// Creates a `_migration` tracking table on first run, then applies
/// each migration whose version exceeds the current maximum.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    let mut result = db
        .query("SELECT * FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let records: Vec<MigrationRecord> = result.take(0)?;
    let current_version = records.first().map(|m| m.version).unwrap_or(0);

    for migration in MIGRATIONS {
        if migration.version > current_version {
            info!(
                version = migration.version,
                name = migration.name,
                "Applying migration"
            );
            db.query(migration.sql).await?.check().map_err(|e| {
                DbError::Migration(format!(
                    "Migration v{} '{}' failed: {}",
                    migration.version, migration.name, e,
                ))
            })?;

            db.query(
                "CREATE _migration SET version = $version, \
                 name = $name",
            )
            .bind(("version", migration.version))
            .bind(("name", migration.name))
            .await?
            .check()
            .map_err(|e| {
                DbError::Migration(format!(
                    "Failed to record migration v{}: {}",
                    migration.version, e,
                ))
            })?;

            info!(
                version = migration.version,
                "Migration applied successfully"
            );
        }
    }

    Ok(())
}

/// Returns the raw schema DDL for version 1.
pub fn schema_v1() -> &'static str {
    SCHEMA_V1
}
