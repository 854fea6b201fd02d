use async_trait::async_trait;

use crate::error::CatalogResult;
use crate::models::{Product, UpdateProduct};
use crate::query::QueryPlan;

/// Document-store seam for the catalog
///
/// Implementations translate the validated `QueryPlan` into the store's
/// native query language. Like-set mutations must use the store's atomic
/// set-add/set-remove primitives, never a full read-modify-write of the
/// array, so concurrent togglers cannot lose updates.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Insert a new product; the store assigns the identity
    async fn insert(&self, product: Product) -> CatalogResult<Product>;

    /// Get a product by its store-assigned id
    async fn get_by_id(&self, id: &str) -> CatalogResult<Option<Product>>;

    /// Execute a query plan
    async fn find(&self, plan: QueryPlan) -> CatalogResult<Vec<Product>>;

    /// Apply an update, appending any newly uploaded image URLs
    async fn update(
        &self,
        id: &str,
        input: UpdateProduct,
        new_images: Vec<String>,
    ) -> CatalogResult<Product>;

    /// Delete a product record; returns false when nothing matched
    async fn delete(&self, id: &str) -> CatalogResult<bool>;

    /// Atomically add a user to the like-set, returning the post-write state
    async fn like_add(&self, id: &str, user_id: &str) -> CatalogResult<Product>;

    /// Atomically remove a user from the like-set, returning the post-write state
    async fn like_remove(&self, id: &str, user_id: &str) -> CatalogResult<Product>;

    /// Atomically bump the view counter by one
    async fn increment_views(&self, id: &str) -> CatalogResult<()>;
}
