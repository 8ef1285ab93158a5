//! Backend catalog/orders API client.
//!
//! # Architecture
//!
//! - The backend (a document-database-backed REST API) is the source of
//!   truth - no local sync, direct API calls
//! - Read responses cached in-memory via `moka` (5 minute TTL)
//! - Cart state is NOT fetched from here; the cart is a local store that
//!   only resolves authoritative variant data at add time
//!
//! # Example
//!
//! ```rust,ignore
//! use marigold_storefront::catalog::CatalogClient;
//!
//! let client = CatalogClient::new(&config.catalog);
//!
//! let product = client.get_product_by_slug("linen-shirt").await?;
//! let page = client.get_products(Some(24), None, None, None, None).await?;
//! ```

mod cache;
pub mod types;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use marigold_core::VariantId;
use moka::future::Cache;
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::config::CatalogApiConfig;

use cache::CacheValue;
use types::{
    Collection, CollectionPage, OrderStatusDoc, Product, ProductPage, ProductSortKey,
    ResolvedVariant,
};

/// Errors that can occur when talking to the backend API.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend returned a non-success status.
    #[error("Backend returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by the backend.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),
}

/// Source of authoritative variant data for cart operations.
///
/// The cart store resolves product/variant data through this seam so its
/// merge logic can be exercised without a live backend.
pub trait VariantSource {
    /// Resolve a variant of a product, failing with [`CatalogError::NotFound`]
    /// when either the product or the variant is absent.
    fn resolve_variant(
        &self,
        product_slug: &str,
        variant_id: &VariantId,
    ) -> impl Future<Output = Result<ResolvedVariant, CatalogError>> + Send;
}

// =============================================================================
// CatalogClient
// =============================================================================

/// Client for the backend catalog/orders REST API.
///
/// Provides typed access to products, collections, and order status.
/// Products and collections are cached for 5 minutes.
#[derive(Clone)]
pub struct CatalogClient {
    inner: Arc<CatalogClientInner>,
}

struct CatalogClientInner {
    client: reqwest::Client,
    base_url: String,
    api_token: String,
    cache: Cache<String, CacheValue>,
}

impl CatalogClient {
    /// Create a new catalog API client.
    #[must_use]
    pub fn new(config: &CatalogApiConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        Self {
            inner: Arc::new(CatalogClientInner {
                client: reqwest::Client::new(),
                base_url: config.base_url.trim_end_matches('/').to_string(),
                api_token: config.api_token.expose_secret().to_string(),
                cache,
            }),
        }
    }

    /// Execute a GET request against an API path and decode the JSON body.
    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, CatalogError> {
        let url = format!("{}{path}", self.inner.base_url);

        let response = self
            .inner
            .client
            .get(&url)
            .bearer_auth(&self.inner.api_token)
            .query(query)
            .send()
            .await?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(CatalogError::RateLimited(retry_after));
        }

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(CatalogError::NotFound(path.to_string()));
        }

        // Read the body as text first for better error diagnostics
        let body = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %body.chars().take(500).collect::<String>(),
                "Backend API returned non-success status"
            );
            return Err(CatalogError::Status {
                status,
                body: body.chars().take(200).collect(),
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %body.chars().take(500).collect::<String>(),
                "Failed to parse backend API response"
            );
            CatalogError::Parse(e)
        })
    }

    /// Liveness probe against the backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is unreachable or unhealthy.
    pub async fn ping(&self) -> Result<(), CatalogError> {
        let url = format!("{}/health", self.inner.base_url);
        let response = self.inner.client.get(&url).send().await?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(CatalogError::Status {
                status,
                body: String::new(),
            })
        }
    }

    // =========================================================================
    // Product Methods
    // =========================================================================

    /// Get a product by its slug.
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not found or the API request fails.
    #[instrument(skip(self), fields(slug = %slug))]
    pub async fn get_product_by_slug(&self, slug: &str) -> Result<Product, CatalogError> {
        let cache_key = format!("product:{slug}");

        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let product: Product = self.get(&format!("/products/{slug}"), &[]).await?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(product)
    }

    /// Get a paginated list of products.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_products(
        &self,
        first: Option<u32>,
        after: Option<String>,
        query: Option<String>,
        sort_key: Option<ProductSortKey>,
        reverse: Option<bool>,
    ) -> Result<ProductPage, CatalogError> {
        let cache_key = products_cache_key(first, after.as_deref(), sort_key, reverse);

        // Check cache (only for default queries without search)
        if query.is_none()
            && let Some(CacheValue::Products(page)) = self.inner.cache.get(&cache_key).await
        {
            debug!("Cache hit for products");
            return Ok(page);
        }

        let mut params: Vec<(&str, String)> = Vec::new();
        if let Some(first) = first {
            params.push(("first", first.to_string()));
        }
        if let Some(after) = &after {
            params.push(("after", after.clone()));
        }
        if let Some(q) = &query {
            params.push(("q", q.clone()));
        }
        if let Some(sort) = sort_key {
            params.push(("sort", sort.as_query_value().to_string()));
        }
        if let Some(reverse) = reverse {
            params.push(("reverse", reverse.to_string()));
        }

        let page: ProductPage = self.get("/products", &params).await?;

        // Cache if not a search query
        if query.is_none() {
            self.inner
                .cache
                .insert(cache_key, CacheValue::Products(page.clone()))
                .await;
        }

        Ok(page)
    }

    // =========================================================================
    // Collection Methods
    // =========================================================================

    /// Get a collection by its slug.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection is not found or the API request fails.
    #[instrument(skip(self), fields(slug = %slug))]
    pub async fn get_collection_by_slug(&self, slug: &str) -> Result<Collection, CatalogError> {
        let cache_key = format!("collection:{slug}");

        if let Some(CacheValue::Collection(collection)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for collection");
            return Ok(*collection);
        }

        let collection: Collection = self.get(&format!("/collections/{slug}"), &[]).await?;

        self.inner
            .cache
            .insert(
                cache_key,
                CacheValue::Collection(Box::new(collection.clone())),
            )
            .await;

        Ok(collection)
    }

    /// Get a paginated list of collections.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_collections(
        &self,
        first: Option<u32>,
        after: Option<String>,
    ) -> Result<CollectionPage, CatalogError> {
        let cache_key = format!("collections:{}", after.as_deref().unwrap_or(""));

        if let Some(CacheValue::Collections(page)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for collections");
            return Ok(page);
        }

        let mut params: Vec<(&str, String)> = Vec::new();
        if let Some(first) = first {
            params.push(("first", first.to_string()));
        }
        if let Some(after) = &after {
            params.push(("after", after.clone()));
        }

        let page: CollectionPage = self.get("/collections", &params).await?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Collections(page.clone()))
            .await;

        Ok(page)
    }

    // =========================================================================
    // Order Methods (not cached - mutable state)
    // =========================================================================

    /// Get the current status of an order, for the checkout status pages.
    ///
    /// # Errors
    ///
    /// Returns an error if the order is not found or the API request fails.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn get_order_status(&self, order_id: &str) -> Result<OrderStatusDoc, CatalogError> {
        self.get(&format!("/orders/{order_id}/status"), &[]).await
    }

    // =========================================================================
    // Cache Management
    // =========================================================================

    /// Invalidate a cached product.
    pub async fn invalidate_product(&self, slug: &str) {
        self.inner.cache.invalidate(&format!("product:{slug}")).await;
    }

    /// Invalidate a cached collection.
    pub async fn invalidate_collection(&self, slug: &str) {
        self.inner
            .cache
            .invalidate(&format!("collection:{slug}"))
            .await;
    }

    /// Invalidate all cached data.
    pub async fn invalidate_all(&self) {
        self.inner.cache.invalidate_all();
        self.inner.cache.run_pending_tasks().await;
    }
}

impl VariantSource for CatalogClient {
    fn resolve_variant(
        &self,
        product_slug: &str,
        variant_id: &VariantId,
    ) -> impl Future<Output = Result<ResolvedVariant, CatalogError>> + Send {
        async move {
            let product = self.get_product_by_slug(product_slug).await?;
            let variant = product.variant(variant_id).ok_or_else(|| {
                CatalogError::NotFound(format!("variant {variant_id} of {product_slug}"))
            })?;
            Ok(ResolvedVariant::from_product(&product, variant))
        }
    }
}

/// Cache key for a product listing. Every parameter that changes the page
/// contents participates, so differently sorted or sized listings never
/// serve each other's cached page.
fn products_cache_key(
    first: Option<u32>,
    after: Option<&str>,
    sort_key: Option<ProductSortKey>,
    reverse: Option<bool>,
) -> String {
    format!(
        "products:{}:{}:{}:{}",
        first.unwrap_or(0),
        after.unwrap_or(""),
        sort_key.map_or("", ProductSortKey::as_query_value),
        reverse.unwrap_or(false),
    )
}
