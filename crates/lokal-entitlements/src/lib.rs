//! Lokal Entitlements: plan entitlements, floorplan add-on
//! subscriptions, feature gates, and site key / slug resolution.
//!
//! Every service is generic over the `lokal-core` repository traits and
//! has no dependency on the database crate.

pub mod catalog;
pub mod config;
pub mod entitlements;
pub mod error;
pub mod feature_subscription;
pub mod floorplan;
pub mod gate;
pub mod legal;
pub mod places;
mod redirects;
pub mod site_resolver;
pub mod sites;
pub mod slug_resolver;

pub use catalog::CatalogService;
pub use config::EntitlementsConfig;
pub use entitlements::{Entitlements, EntitlementsService, Usage};
pub use error::EntitlementError;
pub use feature_subscription::{FeatureSubscriptionService, FloorplanEntitlement, FloorplanStatus};
pub use floorplan::FloorplanService;
pub use gate::{FeatureGate, PlaceGates, PlaceUpsellService};
pub use legal::LegalPageService;
pub use places::PlaceService;
pub use site_resolver::{ResolvedSite, SiteResolver};
pub use sites::SiteService;
pub use slug_resolver::{ResolvedSlug, SlugResolver};
