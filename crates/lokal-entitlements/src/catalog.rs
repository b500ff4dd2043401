//! Collections of sites and per-site price bands.

use lokal_core::error::{LokalError, LokalResult};
use lokal_core::lang::Lang;
use lokal_core::models::collection::{
    Collection, CollectionItem, CreateCollection, CreateCollectionItem, UpdateCollection,
    UpdateCollectionItem, pick_translation,
};
use lokal_core::models::price_band::{CreatePriceBand, PriceBand, UpdatePriceBand, validate_range};
use lokal_core::repository::{
    CollectionRepository, PaginatedResult, Pagination, PriceBandRepository, SiteRepository,
};
use lokal_core::text::normalize_slug;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

/// One collection item in a visitor's language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublicCollectionItem {
    pub site_id: Uuid,
    pub site_slug: String,
    pub title: String,
    pub description: Option<String>,
}

/// A collection in a visitor's language. Inactive sites are left out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublicCollection {
    pub slug: String,
    pub lang: Lang,
    pub title: String,
    pub description: Option<String>,
    pub items: Vec<PublicCollectionItem>,
}

fn check_currency(currency: &str) -> LokalResult<()> {
    if currency.len() == 3 && currency.chars().all(|c| c.is_ascii_uppercase()) {
        Ok(())
    } else {
        Err(LokalError::validation(format!(
            "currency must be a three-letter ISO code, got {currency:?}"
        )))
    }
}

pub struct CatalogService<S, C, B>
where
    S: SiteRepository,
    C: CollectionRepository,
    B: PriceBandRepository,
{
    site_repo: S,
    collection_repo: C,
    price_band_repo: B,
}

impl<S, C, B> CatalogService<S, C, B>
where
    S: SiteRepository,
    C: CollectionRepository,
    B: PriceBandRepository,
{
    pub fn new(site_repo: S, collection_repo: C, price_band_repo: B) -> Self {
        Self {
            site_repo,
            collection_repo,
            price_band_repo,
        }
    }

    // -- Collections ---------------------------------------------------------

    pub async fn create_collection(&self, input: CreateCollection) -> LokalResult<Collection> {
        if normalize_slug(&input.slug) != input.slug || input.slug.is_empty() {
            return Err(LokalError::validation("collection slug must be normalized"));
        }
        let collection = self.collection_repo.create(input).await?;
        info!(id = %collection.id, slug = %collection.slug, "Collection created");
        Ok(collection)
    }

    pub async fn get_collection(&self, id: Uuid) -> LokalResult<Collection> {
        self.collection_repo.get_by_id(id).await
    }

    pub async fn update_collection(&self, id: Uuid, input: UpdateCollection) -> LokalResult<Collection> {
        if let Some(slug) = &input.slug {
            if normalize_slug(slug) != *slug || slug.is_empty() {
                return Err(LokalError::validation("collection slug must be normalized"));
            }
        }
        self.collection_repo.update(id, input).await
    }

    pub async fn delete_collection(&self, id: Uuid) -> LokalResult<()> {
        self.collection_repo.delete(id).await
    }

    pub async fn list_collections(
        &self,
        pagination: Pagination,
    ) -> LokalResult<PaginatedResult<Collection>> {
        self.collection_repo.list(pagination).await
    }

    pub async fn add_item(
        &self,
        collection_id: Uuid,
        input: CreateCollectionItem,
    ) -> LokalResult<CollectionItem> {
        self.collection_repo.get_by_id(collection_id).await?;
        self.site_repo.get_by_id(input.site_id).await?;
        self.collection_repo.add_item(collection_id, input).await
    }

    pub async fn update_item(
        &self,
        collection_id: Uuid,
        item_id: Uuid,
        input: UpdateCollectionItem,
    ) -> LokalResult<CollectionItem> {
        self.collection_repo
            .update_item(collection_id, item_id, input)
            .await
    }

    pub async fn remove_item(&self, collection_id: Uuid, item_id: Uuid) -> LokalResult<()> {
        self.collection_repo.remove_item(collection_id, item_id).await
    }

    pub async fn list_items(&self, collection_id: Uuid) -> LokalResult<Vec<CollectionItem>> {
        self.collection_repo.get_by_id(collection_id).await?;
        self.collection_repo.list_items(collection_id).await
    }

    /// An active collection rendered in `lang`, with Hungarian fallback
    /// for titles and descriptions.
    pub async fn public_collection(&self, slug: &str, lang: Lang) -> LokalResult<PublicCollection> {
        let collection = match self.collection_repo.find_by_slug(slug).await? {
            Some(c) if c.is_active => c,
            _ => return Err(LokalError::not_found("collection", slug)),
        };
        let heading = pick_translation(&collection.translations, lang)
            .ok_or_else(|| LokalError::not_found("collection translation", slug))?;

        let mut items = Vec::new();
        for item in self.collection_repo.list_items(collection.id).await? {
            let site = match self.site_repo.get_by_id(item.site_id).await {
                Ok(site) if site.is_active => site,
                Ok(_) | Err(LokalError::NotFound { .. }) => continue,
                Err(err) => return Err(err),
            };
            let (title, description) = match pick_translation(&item.overrides, lang) {
                Some(o) => (o.title.clone(), o.description.clone()),
                None => (site.name.clone(), None),
            };
            items.push(PublicCollectionItem {
                site_id: site.id,
                site_slug: site.slug,
                title,
                description,
            });
        }

        Ok(PublicCollection {
            slug: collection.slug,
            lang,
            title: heading.title.clone(),
            description: heading.description.clone(),
            items,
        })
    }

    // -- Price bands ---------------------------------------------------------

    pub async fn create_price_band(&self, input: CreatePriceBand) -> LokalResult<PriceBand> {
        validate_range(input.min_price, input.max_price)?;
        if let Some(currency) = &input.currency {
            check_currency(currency)?;
        }
        self.site_repo.get_by_id(input.site_id).await?;
        self.price_band_repo.create(input).await
    }

    pub async fn update_price_band(
        &self,
        site_id: Uuid,
        id: Uuid,
        input: UpdatePriceBand,
    ) -> LokalResult<PriceBand> {
        let current = self.price_band_repo.get_by_id(site_id, id).await?;
        validate_range(
            input.min_price.unwrap_or(current.min_price),
            input.max_price.unwrap_or(current.max_price),
        )?;
        if let Some(currency) = &input.currency {
            check_currency(currency)?;
        }
        self.price_band_repo.update(site_id, id, input).await
    }

    pub async fn delete_price_band(&self, site_id: Uuid, id: Uuid) -> LokalResult<()> {
        self.price_band_repo.delete(site_id, id).await
    }

    pub async fn list_price_bands(&self, site_id: Uuid) -> LokalResult<Vec<PriceBand>> {
        self.price_band_repo.list_by_site(site_id).await
    }
}
