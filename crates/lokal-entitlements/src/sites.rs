//! Admin management of sites, site keys and entity slugs.
//!
//! Slugs and keys are stored in their normalized form. Redirect targets
//! must belong to the same site (and, for keys, the same language).

use lokal_core::error::{LokalError, LokalResult};
use lokal_core::lang::Lang;
use lokal_core::models::site::{CreateSite, Site, UpdateSite};
use lokal_core::models::site_key::{CreateSiteKey, SiteKey, UpdateSiteKey};
use lokal_core::models::slug::{CreateSlug, Slug, SlugEntityType, UpdateSlug};
use lokal_core::repository::{
    PaginatedResult, Pagination, SiteKeyRepository, SiteRepository, SlugRepository,
};
use lokal_core::text::normalize_slug;
use tracing::info;
use uuid::Uuid;

use crate::error::EntitlementError;

/// Reject slugs that are empty or not in normalized form.
fn validate_slug(what: &str, slug: &str) -> LokalResult<()> {
    let normalized = normalize_slug(slug);
    if normalized.is_empty() {
        return Err(LokalError::validation(format!("{what} must not be empty")));
    }
    if normalized != slug {
        return Err(LokalError::validation(format!(
            "{what} must be lowercase ASCII with dashes (try \"{normalized}\")"
        )));
    }
    Ok(())
}

pub struct SiteService<S, K, L>
where
    S: SiteRepository,
    K: SiteKeyRepository,
    L: SlugRepository,
{
    site_repo: S,
    key_repo: K,
    slug_repo: L,
}

impl<S, K, L> SiteService<S, K, L>
where
    S: SiteRepository,
    K: SiteKeyRepository,
    L: SlugRepository,
{
    pub fn new(site_repo: S, key_repo: K, slug_repo: L) -> Self {
        Self {
            site_repo,
            key_repo,
            slug_repo,
        }
    }

    // -- Sites ---------------------------------------------------------------

    pub async fn create_site(&self, input: CreateSite) -> LokalResult<Site> {
        validate_slug("site slug", &input.slug)?;
        if input.name.trim().is_empty() {
            return Err(LokalError::validation("site name must not be empty"));
        }
        let site = self.site_repo.create(input).await?;
        info!(site_id = %site.id, slug = %site.slug, "Site created");
        Ok(site)
    }

    pub async fn get_site(&self, id: Uuid) -> LokalResult<Site> {
        self.site_repo.get_by_id(id).await
    }

    pub async fn update_site(&self, id: Uuid, input: UpdateSite) -> LokalResult<Site> {
        if let Some(slug) = &input.slug {
            validate_slug("site slug", slug)?;
        }
        self.site_repo.update(id, input).await
    }

    pub async fn delete_site(&self, id: Uuid) -> LokalResult<()> {
        self.site_repo.delete(id).await?;
        info!(site_id = %id, "Site deleted");
        Ok(())
    }

    pub async fn list_sites(&self, pagination: Pagination) -> LokalResult<PaginatedResult<Site>> {
        self.site_repo.list(pagination).await
    }

    // -- Site keys -----------------------------------------------------------

    pub async fn create_site_key(&self, input: CreateSiteKey) -> LokalResult<SiteKey> {
        validate_slug("site key", &input.slug)?;
        self.site_repo.get_by_id(input.site_id).await?;
        if let Some(target) = input.redirect_to_id {
            self.check_key_target(input.site_id, input.lang, None, target)
                .await?;
        }

        let key = self.key_repo.create(input).await?;
        info!(
            site_id = %key.site_id,
            lang = %key.lang,
            slug = %key.slug,
            is_primary = key.is_primary,
            "Site key created"
        );
        Ok(key)
    }

    pub async fn update_site_key(
        &self,
        site_id: Uuid,
        id: Uuid,
        input: UpdateSiteKey,
    ) -> LokalResult<SiteKey> {
        if let Some(slug) = &input.slug {
            validate_slug("site key", slug)?;
        }
        let current = self.key_repo.get_by_id(id).await?;
        if current.site_id != site_id {
            return Err(LokalError::not_found("site key", id));
        }
        if let Some(Some(target)) = input.redirect_to_id {
            self.check_key_target(site_id, current.lang, Some(id), target)
                .await?;
        }
        self.key_repo.update(site_id, id, input).await
    }

    pub async fn delete_site_key(&self, site_id: Uuid, id: Uuid) -> LokalResult<()> {
        self.key_repo.delete(site_id, id).await
    }

    pub async fn list_site_keys(&self, site_id: Uuid) -> LokalResult<Vec<SiteKey>> {
        self.site_repo.get_by_id(site_id).await?;
        self.key_repo.list_by_site(site_id).await
    }

    async fn check_key_target(
        &self,
        site_id: Uuid,
        lang: Lang,
        self_id: Option<Uuid>,
        target_id: Uuid,
    ) -> LokalResult<()> {
        if Some(target_id) == self_id {
            return Err(EntitlementError::InvalidRedirect("a key cannot redirect to itself").into());
        }
        let target = match self.key_repo.get_by_id(target_id).await {
            Ok(target) => target,
            Err(LokalError::NotFound { .. }) => {
                return Err(EntitlementError::InvalidRedirect("target key does not exist").into());
            }
            Err(err) => return Err(err),
        };
        if target.site_id != site_id {
            return Err(EntitlementError::InvalidRedirect("target key belongs to another site").into());
        }
        if target.lang != lang {
            return Err(EntitlementError::InvalidRedirect("target key has another language").into());
        }
        Ok(())
    }

    // -- Slugs ---------------------------------------------------------------

    pub async fn create_slug(&self, input: CreateSlug) -> LokalResult<Slug> {
        validate_slug("slug", &input.slug)?;
        self.site_repo.get_by_id(input.site_id).await?;
        if let Some(target) = input.redirect_to_id {
            self.check_slug_target(input.site_id, None, target).await?;
        }

        let slug = self.slug_repo.create(input).await?;
        info!(
            site_id = %slug.site_id,
            entity_type = slug.entity_type.as_str(),
            slug = %slug.slug,
            "Slug created"
        );
        Ok(slug)
    }

    pub async fn update_slug(&self, site_id: Uuid, id: Uuid, input: UpdateSlug) -> LokalResult<Slug> {
        if let Some(slug) = &input.slug {
            validate_slug("slug", slug)?;
        }
        if let Some(Some(target)) = input.redirect_to_id {
            self.check_slug_target(site_id, Some(id), target).await?;
        }
        self.slug_repo.update(site_id, id, input).await
    }

    pub async fn delete_slug(&self, site_id: Uuid, id: Uuid) -> LokalResult<()> {
        self.slug_repo.delete(site_id, id).await
    }

    pub async fn list_slugs_for_entity(
        &self,
        site_id: Uuid,
        entity_type: SlugEntityType,
        entity_id: Uuid,
    ) -> LokalResult<Vec<Slug>> {
        self.slug_repo
            .list_for_entity(site_id, entity_type, entity_id)
            .await
    }

    async fn check_slug_target(
        &self,
        site_id: Uuid,
        self_id: Option<Uuid>,
        target_id: Uuid,
    ) -> LokalResult<()> {
        if Some(target_id) == self_id {
            return Err(EntitlementError::InvalidRedirect("a slug cannot redirect to itself").into());
        }
        match self.slug_repo.get_by_id(target_id).await {
            Ok(target) if target.site_id == site_id => Ok(()),
            Ok(_) => Err(EntitlementError::InvalidRedirect("target slug belongs to another site").into()),
            Err(LokalError::NotFound { .. }) => {
                Err(EntitlementError::InvalidRedirect("target slug does not exist").into())
            }
            Err(err) => Err(err),
        }
    }
}
