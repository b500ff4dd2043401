//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Site-scoped repositories
//! require a `site_id` parameter to enforce tenant isolation.
//!
//! `get_*` methods fail with [`LokalError::NotFound`] when nothing
//! matches; `find_*` methods return `Ok(None)` instead, for lookups
//! where absence is an expected branch.
//!
//! [`LokalError::NotFound`]: crate::error::LokalError::NotFound

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::LokalResult;
use crate::lang::Lang;
use crate::models::{
    collection::{
        Collection, CollectionItem, CreateCollection, CreateCollectionItem, UpdateCollection,
        UpdateCollectionItem,
    },
    feature_subscription::{
        CreateFeatureSubscription, FeatureKey, FeatureSubscription, UpdateFeatureSubscription,
    },
    floorplan::{
        CreateFloorplan, CreatePin, FloorplanPin, PlaceFloorplan, UpdateFloorplan, UpdatePin,
    },
    legal_page::{LegalPage, LegalPageKey, LegalPageTranslation, UpsertLegalTranslation},
    place::{CreatePlace, Place, UpdatePlace},
    price_band::{CreatePriceBand, PriceBand, UpdatePriceBand},
    site::{CreateSite, Site, UpdateSite},
    site_key::{CreateSiteKey, SiteKey, UpdateSiteKey},
    site_subscription::{SiteSubscription, UpsertSiteSubscription},
    slug::{CreateSlug, Slug, SlugEntityType, UpdateSlug},
};

/// Pagination parameters for list queries.
#[derive(Debug, Clone)]
pub struct Pagination {
    pub offset: u64,
    pub limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 50,
        }
    }
}

/// A paginated result set.
#[derive(Debug, Clone, serde::Serialize)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub offset: u64,
    pub limit: u64,
}

// ---------------------------------------------------------------------------
// Sites and site-level configuration
// ---------------------------------------------------------------------------

pub trait SiteRepository: Send + Sync {
    fn create(&self, input: CreateSite) -> impl Future<Output = LokalResult<Site>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = LokalResult<Site>> + Send;
    fn find_by_slug(&self, slug: &str) -> impl Future<Output = LokalResult<Option<Site>>> + Send;
    fn update(&self, id: Uuid, input: UpdateSite)
    -> impl Future<Output = LokalResult<Site>> + Send;
    fn delete(&self, id: Uuid) -> impl Future<Output = LokalResult<()>> + Send;
    fn list(
        &self,
        pagination: Pagination,
    ) -> impl Future<Output = LokalResult<PaginatedResult<Site>>> + Send;
}

pub trait SiteSubscriptionRepository: Send + Sync {
    fn find_by_site(
        &self,
        site_id: Uuid,
    ) -> impl Future<Output = LokalResult<Option<SiteSubscription>>> + Send;
    /// Create the site's subscription or replace the existing one.
    fn upsert(
        &self,
        site_id: Uuid,
        input: UpsertSiteSubscription,
    ) -> impl Future<Output = LokalResult<SiteSubscription>> + Send;
    fn delete(&self, site_id: Uuid) -> impl Future<Output = LokalResult<()>> + Send;
}

pub trait FeatureSubscriptionRepository: Send + Sync {
    fn create(
        &self,
        input: CreateFeatureSubscription,
    ) -> impl Future<Output = LokalResult<FeatureSubscription>> + Send;
    fn get_by_id(
        &self,
        site_id: Uuid,
        id: Uuid,
    ) -> impl Future<Output = LokalResult<FeatureSubscription>> + Send;
    fn update(
        &self,
        site_id: Uuid,
        id: Uuid,
        input: UpdateFeatureSubscription,
    ) -> impl Future<Output = LokalResult<FeatureSubscription>> + Send;
    fn delete(&self, site_id: Uuid, id: Uuid) -> impl Future<Output = LokalResult<()>> + Send;
    fn list_by_site(
        &self,
        site_id: Uuid,
    ) -> impl Future<Output = LokalResult<Vec<FeatureSubscription>>> + Send;
    /// All subscriptions of a site for one feature, newest first.
    fn list_for_feature(
        &self,
        site_id: Uuid,
        feature_key: FeatureKey,
    ) -> impl Future<Output = LokalResult<Vec<FeatureSubscription>>> + Send;
}

// ---------------------------------------------------------------------------
// Keys and slugs
// ---------------------------------------------------------------------------

pub trait SiteKeyRepository: Send + Sync {
    /// Creating a primary key demotes the previous primary for the same
    /// (site, lang) in the same transaction.
    fn create(&self, input: CreateSiteKey) -> impl Future<Output = LokalResult<SiteKey>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = LokalResult<SiteKey>> + Send;
    fn find_by_slug(
        &self,
        lang: Lang,
        slug: &str,
    ) -> impl Future<Output = LokalResult<Option<SiteKey>>> + Send;
    fn find_primary(
        &self,
        site_id: Uuid,
        lang: Lang,
    ) -> impl Future<Output = LokalResult<Option<SiteKey>>> + Send;
    fn update(
        &self,
        site_id: Uuid,
        id: Uuid,
        input: UpdateSiteKey,
    ) -> impl Future<Output = LokalResult<SiteKey>> + Send;
    fn delete(&self, site_id: Uuid, id: Uuid) -> impl Future<Output = LokalResult<()>> + Send;
    fn list_by_site(&self, site_id: Uuid)
    -> impl Future<Output = LokalResult<Vec<SiteKey>>> + Send;
}

pub trait SlugRepository: Send + Sync {
    /// Creating a primary slug demotes the previous primary for the same
    /// (site, lang, entity) in the same transaction.
    fn create(&self, input: CreateSlug) -> impl Future<Output = LokalResult<Slug>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = LokalResult<Slug>> + Send;
    fn find(
        &self,
        site_id: Uuid,
        lang: Lang,
        slug: &str,
    ) -> impl Future<Output = LokalResult<Option<Slug>>> + Send;
    fn find_primary(
        &self,
        site_id: Uuid,
        lang: Lang,
        entity_type: SlugEntityType,
        entity_id: Uuid,
    ) -> impl Future<Output = LokalResult<Option<Slug>>> + Send;
    fn update(
        &self,
        site_id: Uuid,
        id: Uuid,
        input: UpdateSlug,
    ) -> impl Future<Output = LokalResult<Slug>> + Send;
    fn delete(&self, site_id: Uuid, id: Uuid) -> impl Future<Output = LokalResult<()>> + Send;
    fn list_for_entity(
        &self,
        site_id: Uuid,
        entity_type: SlugEntityType,
        entity_id: Uuid,
    ) -> impl Future<Output = LokalResult<Vec<Slug>>> + Send;
}

// ---------------------------------------------------------------------------
// Places, floorplans and usage counters
// ---------------------------------------------------------------------------

pub trait PlaceRepository: Send + Sync {
    fn create(&self, input: CreatePlace) -> impl Future<Output = LokalResult<Place>> + Send;
    fn get_by_id(
        &self,
        site_id: Uuid,
        id: Uuid,
    ) -> impl Future<Output = LokalResult<Place>> + Send;
    fn update(
        &self,
        site_id: Uuid,
        id: Uuid,
        input: UpdatePlace,
    ) -> impl Future<Output = LokalResult<Place>> + Send;
    fn delete(&self, site_id: Uuid, id: Uuid) -> impl Future<Output = LokalResult<()>> + Send;
    fn list(
        &self,
        site_id: Uuid,
        pagination: Pagination,
    ) -> impl Future<Output = LokalResult<PaginatedResult<Place>>> + Send;
}

pub trait FloorplanRepository: Send + Sync {
    fn create(
        &self,
        input: CreateFloorplan,
    ) -> impl Future<Output = LokalResult<PlaceFloorplan>> + Send;
    fn get_by_id(
        &self,
        site_id: Uuid,
        id: Uuid,
    ) -> impl Future<Output = LokalResult<PlaceFloorplan>> + Send;
    fn update(
        &self,
        site_id: Uuid,
        id: Uuid,
        input: UpdateFloorplan,
    ) -> impl Future<Output = LokalResult<PlaceFloorplan>> + Send;
    /// Deletes the floorplan together with its pins.
    fn delete(&self, site_id: Uuid, id: Uuid) -> impl Future<Output = LokalResult<()>> + Send;
    /// Floorplans of a place ordered by `sort_order`.
    fn list_by_place(
        &self,
        site_id: Uuid,
        place_id: Uuid,
    ) -> impl Future<Output = LokalResult<Vec<PlaceFloorplan>>> + Send;
    fn count_by_place(
        &self,
        site_id: Uuid,
        place_id: Uuid,
    ) -> impl Future<Output = LokalResult<u64>> + Send;

    fn create_pin(&self, input: CreatePin)
    -> impl Future<Output = LokalResult<FloorplanPin>> + Send;
    fn get_pin(
        &self,
        site_id: Uuid,
        id: Uuid,
    ) -> impl Future<Output = LokalResult<FloorplanPin>> + Send;
    fn update_pin(
        &self,
        site_id: Uuid,
        id: Uuid,
        input: UpdatePin,
    ) -> impl Future<Output = LokalResult<FloorplanPin>> + Send;
    fn delete_pin(&self, site_id: Uuid, id: Uuid) -> impl Future<Output = LokalResult<()>> + Send;
    /// Pins of a floorplan ordered by `sort_order`.
    fn list_pins(
        &self,
        site_id: Uuid,
        floorplan_id: Uuid,
    ) -> impl Future<Output = LokalResult<Vec<FloorplanPin>>> + Send;
}

/// Live COUNT queries feeding entitlement usage.
pub trait UsageRepository: Send + Sync {
    fn count_places(&self, site_id: Uuid) -> impl Future<Output = LokalResult<u64>> + Send;
    fn count_featured_places(&self, site_id: Uuid)
    -> impl Future<Output = LokalResult<u64>> + Send;
    /// Events starting in `[from, to)`.
    fn count_events_between(
        &self,
        site_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> impl Future<Output = LokalResult<u64>> + Send;
    fn count_members(&self, site_id: Uuid) -> impl Future<Output = LokalResult<u64>> + Send;
    fn count_domain_aliases(&self, site_id: Uuid)
    -> impl Future<Output = LokalResult<u64>> + Send;
    /// Distinct languages with at least one active site key.
    fn count_languages(&self, site_id: Uuid) -> impl Future<Output = LokalResult<u64>> + Send;
    fn count_galleries(&self, site_id: Uuid) -> impl Future<Output = LokalResult<u64>> + Send;
    fn count_place_gallery_images(
        &self,
        site_id: Uuid,
        place_id: Uuid,
    ) -> impl Future<Output = LokalResult<u64>> + Send;
}

// ---------------------------------------------------------------------------
// Content: legal pages, collections, price bands
// ---------------------------------------------------------------------------

pub trait LegalPageRepository: Send + Sync {
    fn find_page(
        &self,
        site_id: Uuid,
        page_key: LegalPageKey,
    ) -> impl Future<Output = LokalResult<Option<LegalPage>>> + Send;
    /// Create the page if missing, otherwise set its active flag.
    fn upsert_page(
        &self,
        site_id: Uuid,
        page_key: LegalPageKey,
        is_active: bool,
    ) -> impl Future<Output = LokalResult<LegalPage>> + Send;
    fn list_pages(&self, site_id: Uuid)
    -> impl Future<Output = LokalResult<Vec<LegalPage>>> + Send;
    /// Deletes the page and all its translations.
    fn delete_page(
        &self,
        site_id: Uuid,
        page_key: LegalPageKey,
    ) -> impl Future<Output = LokalResult<()>> + Send;
    fn find_translation(
        &self,
        site_id: Uuid,
        page_key: LegalPageKey,
        lang: Lang,
    ) -> impl Future<Output = LokalResult<Option<LegalPageTranslation>>> + Send;
    fn upsert_translation(
        &self,
        site_id: Uuid,
        page_key: LegalPageKey,
        lang: Lang,
        input: UpsertLegalTranslation,
    ) -> impl Future<Output = LokalResult<LegalPageTranslation>> + Send;
    fn list_translations(
        &self,
        site_id: Uuid,
        page_key: LegalPageKey,
    ) -> impl Future<Output = LokalResult<Vec<LegalPageTranslation>>> + Send;
}

pub trait CollectionRepository: Send + Sync {
    fn create(
        &self,
        input: CreateCollection,
    ) -> impl Future<Output = LokalResult<Collection>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = LokalResult<Collection>> + Send;
    fn find_by_slug(
        &self,
        slug: &str,
    ) -> impl Future<Output = LokalResult<Option<Collection>>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateCollection,
    ) -> impl Future<Output = LokalResult<Collection>> + Send;
    /// Deletes the collection and its items.
    fn delete(&self, id: Uuid) -> impl Future<Output = LokalResult<()>> + Send;
    fn list(
        &self,
        pagination: Pagination,
    ) -> impl Future<Output = LokalResult<PaginatedResult<Collection>>> + Send;

    fn add_item(
        &self,
        collection_id: Uuid,
        input: CreateCollectionItem,
    ) -> impl Future<Output = LokalResult<CollectionItem>> + Send;
    fn update_item(
        &self,
        collection_id: Uuid,
        item_id: Uuid,
        input: UpdateCollectionItem,
    ) -> impl Future<Output = LokalResult<CollectionItem>> + Send;
    fn remove_item(
        &self,
        collection_id: Uuid,
        item_id: Uuid,
    ) -> impl Future<Output = LokalResult<()>> + Send;
    /// Items ordered by `sort_order`.
    fn list_items(
        &self,
        collection_id: Uuid,
    ) -> impl Future<Output = LokalResult<Vec<CollectionItem>>> + Send;
}

pub trait PriceBandRepository: Send + Sync {
    fn create(&self, input: CreatePriceBand)
    -> impl Future<Output = LokalResult<PriceBand>> + Send;
    fn get_by_id(
        &self,
        site_id: Uuid,
        id: Uuid,
    ) -> impl Future<Output = LokalResult<PriceBand>> + Send;
    fn update(
        &self,
        site_id: Uuid,
        id: Uuid,
        input: UpdatePriceBand,
    ) -> impl Future<Output = LokalResult<PriceBand>> + Send;
    fn delete(&self, site_id: Uuid, id: Uuid) -> impl Future<Output = LokalResult<()>> + Send;
    /// Bands ordered by `sort_order`.
    fn list_by_site(
        &self,
        site_id: Uuid,
    ) -> impl Future<Output = LokalResult<Vec<PriceBand>>> + Send;
}
