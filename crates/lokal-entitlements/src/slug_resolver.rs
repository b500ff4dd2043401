//! Entity slug resolution for public URLs
//! (`/{lang}/{site_key}/{slug}`).

use lokal_core::error::{LokalError, LokalResult};
use lokal_core::lang::Lang;
use lokal_core::models::slug::{Slug, SlugEntityType};
use lokal_core::repository::{SiteKeyRepository, SiteRepository, SlugRepository};
use lokal_core::text::normalize_slug;
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use crate::redirects::{self, RedirectSource};
use crate::site_resolver::SiteResolver;

/// Outcome of resolving a slug.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedSlug {
    pub site_id: Uuid,
    pub lang: Lang,
    pub entity_type: SlugEntityType,
    pub entity_id: Uuid,
    pub canonical_site_key: String,
    pub canonical_slug: String,
    /// Only the ASCII-normalized form of the slug matched.
    pub should_redirect_to_normalized: bool,
    /// The site key, the slug or its normalization differs from the
    /// canonical URL.
    pub needs_redirect: bool,
}

struct SlugChain<'a, L> {
    slugs: &'a L,
}

impl<L: SlugRepository> RedirectSource<Slug> for SlugChain<'_, L> {
    async fn target(&self, id: Uuid) -> LokalResult<Option<Slug>> {
        redirects::optional(self.slugs.get_by_id(id).await)
    }

    async fn primary(&self, node: &Slug) -> LokalResult<Option<Slug>> {
        self.slugs
            .find_primary(node.site_id, node.lang, node.entity_type, node.entity_id)
            .await
    }
}

pub struct SlugResolver<S, K, L>
where
    S: SiteRepository,
    K: SiteKeyRepository,
    L: SlugRepository,
{
    sites: SiteResolver<S, K>,
    slug_repo: L,
}

impl<S, K, L> SlugResolver<S, K, L>
where
    S: SiteRepository,
    K: SiteKeyRepository,
    L: SlugRepository,
{
    pub fn new(sites: SiteResolver<S, K>, slug_repo: L) -> Self {
        Self { sites, slug_repo }
    }

    pub async fn resolve(
        &self,
        lang: Lang,
        site_key: Option<&str>,
        slug: &str,
    ) -> LokalResult<ResolvedSlug> {
        let site = self.sites.resolve(lang, site_key).await?;
        let (row, normalized) = self.lookup(site.site_id, lang, slug).await?;

        let chain = SlugChain {
            slugs: &self.slug_repo,
        };
        let end = redirects::follow(&chain, row).await?;
        if !end.node.is_active {
            return Err(LokalError::not_found("slug", slug));
        }

        let needs_redirect = site.redirected || end.redirected || normalized;
        debug!(
            %lang,
            slug,
            canonical = %end.node.slug,
            needs_redirect,
            "Resolved slug"
        );

        Ok(ResolvedSlug {
            site_id: site.site_id,
            lang,
            entity_type: end.node.entity_type,
            entity_id: end.node.entity_id,
            canonical_site_key: site.canonical_key,
            canonical_slug: end.node.slug,
            should_redirect_to_normalized: normalized,
            needs_redirect,
        })
    }

    /// Direct match first, then the normalized form. An inactive direct
    /// match is only used when nothing better exists, so that its
    /// redirect can still be followed.
    async fn lookup(&self, site_id: Uuid, lang: Lang, slug: &str) -> LokalResult<(Slug, bool)> {
        let direct = self.slug_repo.find(site_id, lang, slug).await?;
        if let Some(row) = &direct {
            if row.is_active {
                return Ok((row.clone(), false));
            }
        }

        let normalized = normalize_slug(slug);
        if !normalized.is_empty() && normalized != slug {
            if let Some(row) = self.slug_repo.find(site_id, lang, &normalized).await? {
                if row.is_active {
                    debug!(slug, %normalized, "Slug matched after normalization");
                    return Ok((row, true));
                }
            }
        }

        direct
            .map(|row| (row, false))
            .ok_or_else(|| LokalError::not_found("slug", slug))
    }
}
