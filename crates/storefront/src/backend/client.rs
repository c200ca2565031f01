//! Hosted data API client implementation.
//!
//! Plain REST/JSON over `reqwest`. Catalog reads (products, categories,
//! artisans) are cached with `moka` for 5 minutes; order reads are always
//! fresh.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use hearthside_core::{ArtisanId, CategoryId, ProductId};

use crate::backend::BackendError;
use crate::backend::types::{Artisan, Category, Order, Product};
use crate::config::BackendConfig;

/// Cached catalog responses.
///
/// Boxed where a single entity is stored so cache entries stay small.
#[derive(Clone)]
enum CacheValue {
    Product(Box<Product>),
    Products(Vec<Product>),
    Category(Box<Category>),
    Categories(Vec<Category>),
    Artisan(Box<Artisan>),
    Artisans(Vec<Artisan>),
}

/// Filters for product listings, passed through to the hosted API as query
/// parameters. The API does the filtering; nothing is filtered locally.
#[derive(Debug, Clone, Default)]
pub struct ProductQuery {
    pub category: Option<CategoryId>,
    pub artisan: Option<ArtisanId>,
    pub featured: Option<bool>,
    pub search: Option<String>,
    pub limit: Option<i64>,
}

impl ProductQuery {
    /// Restrict to a category.
    #[must_use]
    pub const fn category(mut self, id: CategoryId) -> Self {
        self.category = Some(id);
        self
    }

    /// Restrict to an artisan.
    #[must_use]
    pub const fn artisan(mut self, id: ArtisanId) -> Self {
        self.artisan = Some(id);
        self
    }

    /// Restrict to featured products.
    #[must_use]
    pub const fn featured(mut self) -> Self {
        self.featured = Some(true);
        self
    }

    /// Free-text search term, passed through verbatim.
    #[must_use]
    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    /// Cap the number of results.
    #[must_use]
    pub const fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(category) = self.category {
            params.push(("category_id", category.to_string()));
        }
        if let Some(artisan) = self.artisan {
            params.push(("artisan_id", artisan.to_string()));
        }
        if let Some(featured) = self.featured {
            params.push(("featured", featured.to_string()));
        }
        if let Some(search) = &self.search {
            params.push(("q", search.clone()));
        }
        if let Some(limit) = self.limit {
            params.push(("limit", limit.to_string()));
        }
        params
    }

    fn cache_key(&self) -> String {
        format!(
            "products:{}:{}:{}:{}",
            self.category.map_or_else(String::new, |c| c.to_string()),
            self.artisan.map_or_else(String::new, |a| a.to_string()),
            self.featured.map_or_else(String::new, |f| f.to_string()),
            self.limit.map_or_else(String::new, |l| l.to_string()),
        )
    }
}

// =============================================================================
// BackendClient
// =============================================================================

/// Client for the hosted data API.
///
/// Provides typed access to products, categories, artisans, and orders.
/// Catalog responses are cached for 5 minutes.
#[derive(Clone)]
pub struct BackendClient {
    inner: Arc<BackendClientInner>,
}

struct BackendClientInner {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    cache: Cache<String, CacheValue>,
}

impl BackendClient {
    /// Create a new hosted data API client.
    #[must_use]
    pub fn new(config: &BackendConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        Self {
            inner: Arc::new(BackendClientInner {
                client: reqwest::Client::new(),
                base_url: config.api_url.clone(),
                api_key: config.api_key.expose_secret().to_string(),
                cache,
            }),
        }
    }

    /// Execute a GET request and deserialize the JSON response.
    ///
    /// `bearer` carries a shopper's access token for endpoints scoped to the
    /// signed-in user.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
        bearer: Option<&str>,
    ) -> Result<T, BackendError> {
        let url = format!("{}/{path}", self.inner.base_url);

        let mut request = self
            .inner
            .client
            .get(&url)
            .header("apikey", &self.inner.api_key)
            .query(params);

        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(BackendError::NotFound(path.to_string()));
        }

        // Check for rate limiting
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(BackendError::RateLimited(retry_after));
        }

        // Get response body as text first for better error diagnostics
        let response_text = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %response_text.chars().take(500).collect::<String>(),
                "hosted API returned non-success status"
            );
            return Err(BackendError::Api(format!(
                "HTTP {status}: {}",
                response_text.chars().take(200).collect::<String>()
            )));
        }

        match serde_json::from_str(&response_text) {
            Ok(value) => Ok(value),
            Err(e) => {
                tracing::error!(
                    error = %e,
                    body = %response_text.chars().take(500).collect::<String>(),
                    "failed to parse hosted API response"
                );
                Err(BackendError::Parse(e))
            }
        }
    }

    // =========================================================================
    // Product Methods
    // =========================================================================

    /// Get a product by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not found or the API request fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_product(&self, id: ProductId) -> Result<Product, BackendError> {
        let cache_key = format!("product:{id}");

        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let product: Product = self.get_json(&format!("products/{id}"), &[], None).await?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(product)
    }

    /// List products matching a [`ProductQuery`].
    ///
    /// Results are cached unless the query has a search term.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_products(&self, query: ProductQuery) -> Result<Vec<Product>, BackendError> {
        let cache_key = query.cache_key();

        // Check cache (only for queries without a search term)
        if query.search.is_none()
            && let Some(CacheValue::Products(products)) = self.inner.cache.get(&cache_key).await
        {
            debug!("Cache hit for products");
            return Ok(products);
        }

        let products: Vec<Product> = self.get_json("products", &query.to_params(), None).await?;

        if query.search.is_none() {
            self.inner
                .cache
                .insert(cache_key, CacheValue::Products(products.clone()))
                .await;
        }

        Ok(products)
    }

    // =========================================================================
    // Category Methods
    // =========================================================================

    /// Get a category by its slug.
    ///
    /// # Errors
    ///
    /// Returns an error if the category is not found or the API request fails.
    #[instrument(skip(self), fields(slug = %slug))]
    pub async fn get_category_by_slug(&self, slug: &str) -> Result<Category, BackendError> {
        let cache_key = format!("category:{slug}");

        if let Some(CacheValue::Category(category)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for category");
            return Ok(*category);
        }

        let category: Category = self.get_json(&format!("categories/{slug}"), &[], None).await?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Category(Box::new(category.clone())))
            .await;

        Ok(category)
    }

    /// List all categories.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_categories(&self) -> Result<Vec<Category>, BackendError> {
        let cache_key = "categories".to_string();

        if let Some(CacheValue::Categories(categories)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for categories");
            return Ok(categories);
        }

        let categories: Vec<Category> = self.get_json("categories", &[], None).await?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Categories(categories.clone()))
            .await;

        Ok(categories)
    }

    // =========================================================================
    // Artisan Methods
    // =========================================================================

    /// Get an artisan by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the artisan is not found or the API request fails.
    #[instrument(skip(self), fields(artisan_id = %id))]
    pub async fn get_artisan(&self, id: ArtisanId) -> Result<Artisan, BackendError> {
        let cache_key = format!("artisan:{id}");

        if let Some(CacheValue::Artisan(artisan)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for artisan");
            return Ok(*artisan);
        }

        let artisan: Artisan = self.get_json(&format!("artisans/{id}"), &[], None).await?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Artisan(Box::new(artisan.clone())))
            .await;

        Ok(artisan)
    }

    /// List all artisans.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_artisans(&self) -> Result<Vec<Artisan>, BackendError> {
        let cache_key = "artisans".to_string();

        if let Some(CacheValue::Artisans(artisans)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for artisans");
            return Ok(artisans);
        }

        let artisans: Vec<Artisan> = self.get_json("artisans", &[], None).await?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Artisans(artisans.clone()))
            .await;

        Ok(artisans)
    }

    // =========================================================================
    // Order Methods (not cached - scoped to the signed-in shopper)
    // =========================================================================

    /// List the signed-in shopper's orders, newest first.
    ///
    /// The hosted API scopes results to the bearer token's user.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or the token is rejected.
    #[instrument(skip(self, access_token))]
    pub async fn get_orders(&self, access_token: &str) -> Result<Vec<Order>, BackendError> {
        self.get_json("orders", &[("order", "created_at.desc".to_string())], Some(access_token))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_query_params() {
        let query = ProductQuery::default()
            .category(CategoryId::new(3))
            .featured()
            .limit(8);

        let params = query.to_params();
        assert!(params.contains(&("category_id", "3".to_string())));
        assert!(params.contains(&("featured", "true".to_string())));
        assert!(params.contains(&("limit", "8".to_string())));
        assert!(!params.iter().any(|(k, _)| *k == "q"));
    }

    #[test]
    fn test_product_query_search_not_cached() {
        let plain = ProductQuery::default().category(CategoryId::new(3));
        let searched = plain.clone().search("walnut");

        // Search queries bypass the cache entirely; the key only covers the
        // cacheable dimensions.
        assert!(searched.search.is_some());
        assert_eq!(plain.cache_key(), searched.cache_key());
    }
}
