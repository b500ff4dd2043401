//! Extractors whose rejections use the API error body.

use axum::extract::{FromRequest, FromRequestParts};
use lokal_core::error::LokalError;
use lokal_core::lang::Lang;
use lokal_core::repository::Pagination;
use serde::Deserialize;

use crate::error::ApiError;

#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

/// Parse a `{lang}` path segment. Unsupported languages are a 400.
pub fn parse_lang(raw: &str) -> Result<Lang, LokalError> {
    raw.parse()
}

/// `?siteKey=` on public endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct SiteKeyQuery {
    #[serde(rename = "siteKey")]
    pub site_key: Option<String>,
}

impl SiteKeyQuery {
    pub fn site_key(&self) -> Option<&str> {
        self.site_key.as_deref().filter(|k| !k.is_empty())
    }
}

/// `?offset=&limit=` on paginated lists.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub offset: Option<u64>,
    pub limit: Option<u64>,
}

impl PageQuery {
    pub fn pagination(&self) -> Pagination {
        let defaults = Pagination::default();
        Pagination {
            offset: self.offset.unwrap_or(defaults.offset),
            limit: self.limit.unwrap_or(defaults.limit).min(200),
        }
    }
}
