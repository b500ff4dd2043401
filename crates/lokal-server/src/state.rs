//! Shared application state and per-request service construction.
//!
//! Services are stateless wrappers around repositories, so handlers
//! build the ones they need from a cloned database handle.

use std::sync::Arc;

use lokal_db::repository::{
    SurrealCollectionRepository, SurrealFeatureSubscriptionRepository, SurrealFloorplanRepository,
    SurrealLegalPageRepository, SurrealPlaceRepository, SurrealPriceBandRepository,
    SurrealSiteKeyRepository, SurrealSiteRepository, SurrealSiteSubscriptionRepository,
    SurrealSlugRepository, SurrealUsageRepository,
};
use lokal_entitlements::{
    CatalogService, EntitlementsConfig, EntitlementsService, FeatureSubscriptionService,
    FloorplanService, LegalPageService, PlaceService, PlaceUpsellService, SiteResolver,
    SiteService, SlugResolver,
};
use surrealdb::{Connection, Surreal};

pub type Entitlements<C> = EntitlementsService<
    SurrealSiteRepository<C>,
    SurrealSiteSubscriptionRepository<C>,
    SurrealUsageRepository<C>,
>;

pub type FeatureSubscriptions<C> = FeatureSubscriptionService<
    SurrealSiteRepository<C>,
    SurrealFeatureSubscriptionRepository<C>,
    SurrealPlaceRepository<C>,
    SurrealFloorplanRepository<C>,
>;

pub type Floorplans<C> = FloorplanService<
    SurrealSiteRepository<C>,
    SurrealSiteSubscriptionRepository<C>,
    SurrealUsageRepository<C>,
    SurrealFeatureSubscriptionRepository<C>,
    SurrealPlaceRepository<C>,
    SurrealFloorplanRepository<C>,
>;

pub type Places<C> = PlaceService<
    SurrealSiteRepository<C>,
    SurrealSiteSubscriptionRepository<C>,
    SurrealUsageRepository<C>,
    SurrealPlaceRepository<C>,
>;

pub type Upsell<C> = PlaceUpsellService<
    SurrealSiteRepository<C>,
    SurrealSiteSubscriptionRepository<C>,
    SurrealUsageRepository<C>,
    SurrealFeatureSubscriptionRepository<C>,
    SurrealPlaceRepository<C>,
    SurrealFloorplanRepository<C>,
>;

pub type Sites<C> =
    SiteService<SurrealSiteRepository<C>, SurrealSiteKeyRepository<C>, SurrealSlugRepository<C>>;

pub type Resolver<C> = SiteResolver<SurrealSiteRepository<C>, SurrealSiteKeyRepository<C>>;

pub type Slugs<C> =
    SlugResolver<SurrealSiteRepository<C>, SurrealSiteKeyRepository<C>, SurrealSlugRepository<C>>;

pub type LegalPages<C> = LegalPageService<
    SurrealSiteRepository<C>,
    SurrealSiteKeyRepository<C>,
    SurrealLegalPageRepository<C>,
>;

pub type Catalog<C> = CatalogService<
    SurrealSiteRepository<C>,
    SurrealCollectionRepository<C>,
    SurrealPriceBandRepository<C>,
>;

pub struct AppState<C: Connection> {
    db: Surreal<C>,
    config: Arc<EntitlementsConfig>,
}

impl<C: Connection> Clone for AppState<C> {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
            config: Arc::clone(&self.config),
        }
    }
}

impl<C: Connection> AppState<C> {
    pub fn new(db: Surreal<C>, config: EntitlementsConfig) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }

    pub fn db(&self) -> &Surreal<C> {
        &self.db
    }

    pub fn entitlements(&self) -> Entitlements<C> {
        EntitlementsService::new(
            SurrealSiteRepository::new(self.db.clone()),
            SurrealSiteSubscriptionRepository::new(self.db.clone()),
            SurrealUsageRepository::new(self.db.clone()),
            self.config.as_ref().clone(),
        )
    }

    pub fn feature_subscriptions(&self) -> FeatureSubscriptions<C> {
        FeatureSubscriptionService::new(
            SurrealSiteRepository::new(self.db.clone()),
            SurrealFeatureSubscriptionRepository::new(self.db.clone()),
            SurrealPlaceRepository::new(self.db.clone()),
            SurrealFloorplanRepository::new(self.db.clone()),
        )
    }

    pub fn floorplans(&self) -> Floorplans<C> {
        FloorplanService::new(
            self.entitlements(),
            self.feature_subscriptions(),
            SurrealPlaceRepository::new(self.db.clone()),
            SurrealFloorplanRepository::new(self.db.clone()),
        )
    }

    pub fn places(&self) -> Places<C> {
        PlaceService::new(
            self.entitlements(),
            SurrealPlaceRepository::new(self.db.clone()),
        )
    }

    pub fn upsell(&self) -> Upsell<C> {
        PlaceUpsellService::new(
            self.entitlements(),
            self.feature_subscriptions(),
            SurrealPlaceRepository::new(self.db.clone()),
            SurrealUsageRepository::new(self.db.clone()),
        )
    }

    pub fn sites(&self) -> Sites<C> {
        SiteService::new(
            SurrealSiteRepository::new(self.db.clone()),
            SurrealSiteKeyRepository::new(self.db.clone()),
            SurrealSlugRepository::new(self.db.clone()),
        )
    }

    pub fn resolver(&self) -> Resolver<C> {
        SiteResolver::new(
            SurrealSiteRepository::new(self.db.clone()),
            SurrealSiteKeyRepository::new(self.db.clone()),
            &self.config,
        )
    }

    pub fn slugs(&self) -> Slugs<C> {
        SlugResolver::new(
            self.resolver(),
            SurrealSlugRepository::new(self.db.clone()),
        )
    }

    pub fn legal_pages(&self) -> LegalPages<C> {
        LegalPageService::new(
            self.resolver(),
            SurrealLegalPageRepository::new(self.db.clone()),
        )
    }

    pub fn catalog(&self) -> Catalog<C> {
        CatalogService::new(
            SurrealSiteRepository::new(self.db.clone()),
            SurrealCollectionRepository::new(self.db.clone()),
            SurrealPriceBandRepository::new(self.db.clone()),
        )
    }
}
