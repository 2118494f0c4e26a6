//! Catalog endpoints: products and categories.
//!
//! Reads are cached for five minutes. Free-text searches bypass the cache.

use tracing::{debug, instrument};

use juicequ_core::ProductId;

use super::cache::{CacheKey, CacheValue};
use super::types::{Category, Product, ProductPage, ProductQuery};
use super::{ApiError, BackendClient};

impl BackendClient {
    /// List products matching `query`.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_products(&self, query: &ProductQuery) -> Result<ProductPage, ApiError> {
        let cache_key = CacheKey::Products(query.clone());

        if !query.is_search()
            && let Some(CacheValue::Products(page)) = self.cache().get(&cache_key).await
        {
            debug!("Cache hit for products");
            return Ok(page);
        }

        let page: ProductPage = self.get_with_query("products", query, None).await?;

        if !query.is_search() {
            self.cache()
                .insert(cache_key, CacheValue::Products(page.clone()))
                .await;
        }

        Ok(page)
    }

    /// Get a single product.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` if the product does not exist.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_product(&self, id: ProductId) -> Result<Product, ApiError> {
        let cache_key = CacheKey::Product(id);

        if let Some(CacheValue::Product(product)) = self.cache().get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let product: Product = self.get(&format!("products/{id}"), None).await?;

        self.cache()
            .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(product)
    }

    /// List menu categories.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_categories(&self) -> Result<Vec<Category>, ApiError> {
        if let Some(CacheValue::Categories(categories)) =
            self.cache().get(&CacheKey::Categories).await
        {
            debug!("Cache hit for categories");
            return Ok(categories);
        }

        let categories: Vec<Category> = self.get("categories", None).await?;

        self.cache()
            .insert(
                CacheKey::Categories,
                CacheValue::Categories(categories.clone()),
            )
            .await;

        Ok(categories)
    }

    /// Find a category by (case-insensitive) name, for voice filtering.
    ///
    /// # Errors
    ///
    /// Returns an error if the categories cannot be listed.
    pub async fn find_category(&self, name: &str) -> Result<Option<Category>, ApiError> {
        let needle = name.trim().to_lowercase();
        let categories = self.list_categories().await?;
        Ok(categories.into_iter().find(|c| {
            let candidate = c.name.to_lowercase();
            candidate == needle || candidate.contains(&needle) || needle.contains(&candidate)
        }))
    }
}
