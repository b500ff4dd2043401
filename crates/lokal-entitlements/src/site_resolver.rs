//! Site key resolution.
//!
//! Maps the `{site_key}` segment of a public URL to a site. The key is
//! looked up among the site keys of the request language first, then
//! as an internal `Site.slug`. A request without a key is served by the
//! configured default site.

use lokal_core::error::{LokalError, LokalResult};
use lokal_core::lang::Lang;
use lokal_core::models::site::Site;
use lokal_core::models::site_key::SiteKey;
use lokal_core::repository::{SiteKeyRepository, SiteRepository};
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use crate::config::EntitlementsConfig;
use crate::redirects::{self, RedirectSource};

/// Outcome of resolving a site key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedSite {
    pub site_id: Uuid,
    pub site_slug: String,
    pub lang: Lang,
    /// The key the site should be addressed by in `lang`.
    pub canonical_key: String,
    /// The requested key differs from `canonical_key`.
    pub redirected: bool,
}

struct SiteKeyChain<'a, K> {
    keys: &'a K,
}

impl<K: SiteKeyRepository> RedirectSource<SiteKey> for SiteKeyChain<'_, K> {
    async fn target(&self, id: Uuid) -> LokalResult<Option<SiteKey>> {
        redirects::optional(self.keys.get_by_id(id).await)
    }

    async fn primary(&self, node: &SiteKey) -> LokalResult<Option<SiteKey>> {
        self.keys.find_primary(node.site_id, node.lang).await
    }
}

pub struct SiteResolver<S, K>
where
    S: SiteRepository,
    K: SiteKeyRepository,
{
    site_repo: S,
    key_repo: K,
    default_site_slug: Option<String>,
}

impl<S, K> SiteResolver<S, K>
where
    S: SiteRepository,
    K: SiteKeyRepository,
{
    pub fn new(site_repo: S, key_repo: K, config: &EntitlementsConfig) -> Self {
        Self {
            site_repo,
            key_repo,
            default_site_slug: config.default_site_slug.clone(),
        }
    }

    /// Resolve `site_key` in `lang`, or the default site when `None`.
    pub async fn resolve(&self, lang: Lang, site_key: Option<&str>) -> LokalResult<ResolvedSite> {
        let Some(key) = site_key.map(str::trim).filter(|k| !k.is_empty()) else {
            return self.resolve_default(lang).await;
        };

        if let Some(row) = self.key_repo.find_by_slug(lang, key).await? {
            return self.resolve_key_row(lang, key, row).await;
        }

        debug!(%lang, key, "No site key row, trying internal site slug");
        let site = self.active_site_by_slug(key).await?;
        let canonical_key = self.canonical_key(&site, lang).await?;
        let redirected = canonical_key != key;
        Ok(ResolvedSite {
            site_id: site.id,
            site_slug: site.slug,
            lang,
            canonical_key,
            redirected,
        })
    }

    async fn resolve_key_row(&self, lang: Lang, key: &str, row: SiteKey) -> LokalResult<ResolvedSite> {
        let chain = SiteKeyChain {
            keys: &self.key_repo,
        };
        let end = redirects::follow(&chain, row).await?;

        if !end.node.is_active {
            debug!(%lang, key, "Site key resolves to an inactive key");
            return Err(LokalError::not_found("site", key));
        }

        let site = self.site_repo.get_by_id(end.node.site_id).await?;
        if !site.is_active {
            debug!(site_id = %site.id, "Site is inactive");
            return Err(LokalError::not_found("site", key));
        }

        debug!(
            %lang,
            key,
            canonical = %end.node.slug,
            redirected = end.redirected,
            "Resolved site key"
        );
        Ok(ResolvedSite {
            site_id: site.id,
            site_slug: site.slug,
            lang,
            canonical_key: end.node.slug,
            redirected: end.redirected,
        })
    }

    async fn resolve_default(&self, lang: Lang) -> LokalResult<ResolvedSite> {
        let slug = self
            .default_site_slug
            .as_deref()
            .ok_or_else(|| LokalError::not_found("site", "default"))?;
        let site = self.active_site_by_slug(slug).await?;
        let canonical_key = self.canonical_key(&site, lang).await?;
        debug!(%lang, site_slug = %site.slug, "Resolved default site");
        Ok(ResolvedSite {
            site_id: site.id,
            site_slug: site.slug,
            lang,
            canonical_key,
            redirected: false,
        })
    }

    async fn active_site_by_slug(&self, slug: &str) -> LokalResult<Site> {
        match self.site_repo.find_by_slug(slug).await? {
            Some(site) if site.is_active => Ok(site),
            _ => Err(LokalError::not_found("site", slug)),
        }
    }

    /// The active primary key of `site` in `lang`, else the site slug.
    async fn canonical_key(&self, site: &Site, lang: Lang) -> LokalResult<String> {
        Ok(match self.key_repo.find_primary(site.id, lang).await? {
            Some(key) if key.is_active => key.slug,
            _ => site.slug.clone(),
        })
    }
}
