//! Plan definition table and typed plan overrides.
//!
//! Every site runs on one [`Plan`]. The static defaults for each plan
//! live here; a site subscription may carry [`PlanOverrides`] that are
//! merged field-by-field over those defaults.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{LokalError, LokalResult};

/// Sentinel for "no limit".
pub const UNLIMITED: u32 = u32::MAX;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Plan {
    Free,
    Basic,
    Pro,
    Business,
}

impl Plan {
    pub fn as_str(&self) -> &'static str {
        match self {
            Plan::Free => "FREE",
            Plan::Basic => "BASIC",
            Plan::Pro => "PRO",
            Plan::Business => "BUSINESS",
        }
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Plan {
    type Err = LokalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "FREE" => Ok(Plan::Free),
            "BASIC" => Ok(Plan::Basic),
            "PRO" => Ok(Plan::Pro),
            "BUSINESS" => Ok(Plan::Business),
            other => Err(LokalError::validation(format!("unknown plan: {other}"))),
        }
    }
}

/// Countable resources a plan limits.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum LimitKind {
    Places,
    FeaturedPlaces,
    EventsPerMonth,
    Members,
    DomainAliases,
    Languages,
    Galleries,
}

/// Switchable features a plan grants.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    Events,
    FeaturedPlaces,
    Galleries,
    CustomDomain,
    MultiLanguage,
    AdvancedSeo,
    /// Eligibility to buy the floorplan add-on.
    Floorplans,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlanLimits {
    pub places_max: u32,
    pub featured_places_max: u32,
    pub events_per_month_max: u32,
    pub members_max: u32,
    pub domain_aliases_max: u32,
    pub languages_max: u32,
    pub galleries_max: u32,
    /// Images per place gallery.
    pub gallery_images_max: u32,
}

impl PlanLimits {
    pub fn get(&self, kind: LimitKind) -> u32 {
        match kind {
            LimitKind::Places => self.places_max,
            LimitKind::FeaturedPlaces => self.featured_places_max,
            LimitKind::EventsPerMonth => self.events_per_month_max,
            LimitKind::Members => self.members_max,
            LimitKind::DomainAliases => self.domain_aliases_max,
            LimitKind::Languages => self.languages_max,
            LimitKind::Galleries => self.galleries_max,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlanFeatures {
    pub events: bool,
    pub featured_places: bool,
    pub galleries: bool,
    pub custom_domain: bool,
    pub multi_language: bool,
    pub advanced_seo: bool,
    pub floorplans: bool,
}

impl PlanFeatures {
    pub fn is_enabled(&self, feature: Feature) -> bool {
        match feature {
            Feature::Events => self.events,
            Feature::FeaturedPlaces => self.featured_places,
            Feature::Galleries => self.galleries,
            Feature::CustomDomain => self.custom_domain,
            Feature::MultiLanguage => self.multi_language,
            Feature::AdvancedSeo => self.advanced_seo,
            Feature::Floorplans => self.floorplans,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlanDefinition {
    pub plan: Plan,
    pub limits: PlanLimits,
    pub features: PlanFeatures,
}

impl PlanDefinition {
    pub fn for_plan(plan: Plan) -> Self {
        match plan {
            Plan::Free => Self {
                plan,
                limits: PlanLimits {
                    places_max: 1,
                    featured_places_max: 0,
                    events_per_month_max: 0,
                    members_max: 1,
                    domain_aliases_max: 0,
                    languages_max: 1,
                    galleries_max: 0,
                    gallery_images_max: 0,
                },
                features: PlanFeatures {
                    events: false,
                    featured_places: false,
                    galleries: false,
                    custom_domain: false,
                    multi_language: false,
                    advanced_seo: false,
                    floorplans: false,
                },
            },
            Plan::Basic => Self {
                plan,
                limits: PlanLimits {
                    places_max: 25,
                    featured_places_max: 1,
                    events_per_month_max: 10,
                    members_max: 3,
                    domain_aliases_max: 0,
                    languages_max: 1,
                    galleries_max: 5,
                    gallery_images_max: 10,
                },
                features: PlanFeatures {
                    events: true,
                    featured_places: true,
                    galleries: true,
                    custom_domain: false,
                    multi_language: false,
                    advanced_seo: false,
                    floorplans: true,
                },
            },
            Plan::Pro => Self {
                plan,
                limits: PlanLimits {
                    places_max: 100,
                    featured_places_max: 5,
                    events_per_month_max: 50,
                    members_max: 10,
                    domain_aliases_max: 2,
                    languages_max: 3,
                    galleries_max: 25,
                    gallery_images_max: 30,
                },
                features: PlanFeatures {
                    events: true,
                    featured_places: true,
                    galleries: true,
                    custom_domain: true,
                    multi_language: true,
                    advanced_seo: false,
                    floorplans: true,
                },
            },
            Plan::Business => Self {
                plan,
                limits: PlanLimits {
                    places_max: 500,
                    featured_places_max: 20,
                    events_per_month_max: UNLIMITED,
                    members_max: 50,
                    domain_aliases_max: 10,
                    languages_max: 3,
                    galleries_max: 100,
                    gallery_images_max: 100,
                },
                features: PlanFeatures {
                    events: true,
                    featured_places: true,
                    galleries: true,
                    custom_domain: true,
                    multi_language: true,
                    advanced_seo: true,
                    floorplans: true,
                },
            },
        }
    }

    /// Merge `overrides` over the plan defaults. Absent fields keep the
    /// default; present fields replace it.
    pub fn with_overrides(mut self, overrides: &PlanOverrides) -> Self {
        let l = &overrides.limits;
        let limits = &mut self.limits;
        limits.places_max = l.places_max.unwrap_or(limits.places_max);
        limits.featured_places_max = l.featured_places_max.unwrap_or(limits.featured_places_max);
        limits.events_per_month_max = l.events_per_month_max.unwrap_or(limits.events_per_month_max);
        limits.members_max = l.members_max.unwrap_or(limits.members_max);
        limits.domain_aliases_max = l.domain_aliases_max.unwrap_or(limits.domain_aliases_max);
        limits.languages_max = l.languages_max.unwrap_or(limits.languages_max);
        limits.galleries_max = l.galleries_max.unwrap_or(limits.galleries_max);
        limits.gallery_images_max = l.gallery_images_max.unwrap_or(limits.gallery_images_max);

        let f = &overrides.features;
        let features = &mut self.features;
        features.events = f.events.unwrap_or(features.events);
        features.featured_places = f.featured_places.unwrap_or(features.featured_places);
        features.galleries = f.galleries.unwrap_or(features.galleries);
        features.custom_domain = f.custom_domain.unwrap_or(features.custom_domain);
        features.multi_language = f.multi_language.unwrap_or(features.multi_language);
        features.advanced_seo = f.advanced_seo.unwrap_or(features.advanced_seo);
        features.floorplans = f.floorplans.unwrap_or(features.floorplans);

        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LimitOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub places_max: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub featured_places_max: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub events_per_month_max: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub members_max: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain_aliases_max: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub languages_max: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub galleries_max: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gallery_images_max: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FeatureOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub events: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub featured_places: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub galleries: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_domain: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multi_language: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advanced_seo: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub floorplans: Option<bool>,
}

/// Per-site adjustments to a plan's defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlanOverrides {
    pub limits: LimitOverrides,
    pub features: FeatureOverrides,
}

impl PlanOverrides {
    /// Parse overrides from their stored JSON form, rejecting unknown
    /// keys and wrongly typed values.
    pub fn from_json(value: serde_json::Value) -> LokalResult<Self> {
        serde_json::from_value(value)
            .map_err(|e| LokalError::validation(format!("invalid plan overrides: {e}")))
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_else(|_| serde_json::Value::Object(Default::default()))
    }

    pub fn is_empty(&self) -> bool {
        self == &PlanOverrides::default()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn free_plan_has_no_featured_places_or_galleries() {
        let def = PlanDefinition::for_plan(Plan::Free);
        assert_eq!(def.limits.featured_places_max, 0);
        assert!(!def.features.galleries);
        assert!(!def.features.floorplans);
    }

    #[test]
    fn plans_are_monotonic_in_place_limit() {
        let order = [Plan::Free, Plan::Basic, Plan::Pro, Plan::Business];
        for pair in order.windows(2) {
            let lower = PlanDefinition::for_plan(pair[0]).limits.places_max;
            let higher = PlanDefinition::for_plan(pair[1]).limits.places_max;
            assert!(lower < higher, "{} should allow fewer places than {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn overrides_replace_only_present_fields() {
        let overrides = PlanOverrides::from_json(json!({
            "limits": { "places_max": 40 },
            "features": { "custom_domain": true }
        }))
        .unwrap();

        let merged = PlanDefinition::for_plan(Plan::Basic).with_overrides(&overrides);
        let base = PlanDefinition::for_plan(Plan::Basic);

        assert_eq!(merged.limits.places_max, 40);
        assert_eq!(merged.limits.featured_places_max, base.limits.featured_places_max);
        assert!(merged.features.custom_domain);
        assert_eq!(merged.features.galleries, base.features.galleries);
        assert_eq!(merged.plan, Plan::Basic);
    }

    #[test]
    fn overrides_reject_unknown_keys_and_bad_types() {
        assert!(PlanOverrides::from_json(json!({ "limits": { "rockets_max": 1 } })).is_err());
        assert!(PlanOverrides::from_json(json!({ "limits": { "places_max": "many" } })).is_err());
        assert!(PlanOverrides::from_json(json!({ "extras": {} })).is_err());
    }

    #[test]
    fn empty_object_is_empty_overrides() {
        let overrides = PlanOverrides::from_json(json!({})).unwrap();
        assert!(overrides.is_empty());
        assert_eq!(overrides.to_json(), json!({ "limits": {}, "features": {} }));
    }

    #[test]
    fn plan_parses_case_insensitively() {
        assert_eq!("pro".parse::<Plan>().unwrap(), Plan::Pro);
        assert!("gold".parse::<Plan>().is_err());
    }
}
