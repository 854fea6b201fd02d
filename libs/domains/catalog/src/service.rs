//! Catalog service: query orchestration and interaction coordination

use std::sync::Arc;

use tracing::{info, instrument, warn};
use validator::Validate;

use crate::assets::{remove_best_effort, upload_all, AssetStore, AssetUpload};
use crate::auth::AuthContext;
use crate::error::{CatalogError, CatalogResult};
use crate::models::{
    CreateProduct, Product, ProductFilter, ProductPage, SortKey, StatusFilter, UpdateProduct,
};
use crate::query::build_plan;
use crate::reconcile::assemble_page;
use crate::repository::CatalogRepository;

/// Coordinates the repository, the blob store and the caller identity
///
/// Reads are open; every mutation resolves the caller first and checks
/// ownership where the operation targets an existing record.
pub struct CatalogService<R, S, A>
where
    R: CatalogRepository,
    S: AssetStore,
    A: AuthContext,
{
    repository: Arc<R>,
    assets: Arc<S>,
    auth: Arc<A>,
}

impl<R, S, A> Clone for CatalogService<R, S, A>
where
    R: CatalogRepository,
    S: AssetStore,
    A: AuthContext,
{
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            assets: Arc::clone(&self.assets),
            auth: Arc::clone(&self.auth),
        }
    }
}

impl<R, S, A> CatalogService<R, S, A>
where
    R: CatalogRepository + 'static,
    S: AssetStore,
    A: AuthContext,
{
    pub fn new(repository: Arc<R>, assets: Arc<S>, auth: Arc<A>) -> Self {
        Self {
            repository,
            assets,
            auth,
        }
    }

    fn require_user(&self) -> CatalogResult<String> {
        self.auth
            .current_user()
            .ok_or(CatalogError::Unauthenticated)
    }

    async fn require_owned(&self, id: &str, user_id: &str) -> CatalogResult<Product> {
        let product = self
            .repository
            .get_by_id(id)
            .await?
            .ok_or_else(|| CatalogError::NotFound(id.to_string()))?;

        if product.owner_id != user_id {
            return Err(CatalogError::Unauthorized { id: id.to_string() });
        }
        Ok(product)
    }

    /// List products matching the filter criteria
    #[instrument(skip(self, filter), fields(sort = %filter.sort))]
    pub async fn list_products(&self, filter: ProductFilter) -> CatalogResult<ProductPage> {
        let plan = build_plan(&filter)?;
        let items = self.repository.find(plan).await?;
        Ok(assemble_page(items, &filter))
    }

    /// All listings of one owner, every status, newest first
    #[instrument(skip(self))]
    pub async fn list_products_by_owner(&self, owner_id: &str) -> CatalogResult<Vec<Product>> {
        let filter = ProductFilter {
            owner_id: Some(owner_id.to_string()),
            status: StatusFilter::All,
            sort: SortKey::Newest,
            ..Default::default()
        };
        let plan = build_plan(&filter)?;
        self.repository.find(plan).await
    }

    /// Fetch a single product and record the view
    ///
    /// The view increment runs detached from the response path; a failed
    /// bump is logged and the read still succeeds.
    #[instrument(skip(self))]
    pub async fn get_product(&self, id: &str) -> CatalogResult<Product> {
        let product = self
            .repository
            .get_by_id(id)
            .await?
            .ok_or_else(|| CatalogError::NotFound(id.to_string()))?;

        let repository = Arc::clone(&self.repository);
        let product_id = id.to_string();
        tokio::spawn(async move {
            if let Err(e) = repository.increment_views(&product_id).await {
                warn!(product_id = %product_id, error = %e, "view count increment failed");
            }
        });

        Ok(product)
    }

    /// Create a listing, uploading its images first
    ///
    /// Images are uploaded before the record is written so a stored product
    /// never references a missing blob. If the insert itself fails the
    /// uploaded blobs are orphaned; that leak is accepted.
    #[instrument(skip(self, input, uploads), fields(title = %input.title, images = uploads.len()))]
    pub async fn create_product(
        &self,
        input: CreateProduct,
        uploads: Vec<AssetUpload>,
    ) -> CatalogResult<Product> {
        let user_id = self.require_user()?;
        input
            .validate()
            .map_err(|e| CatalogError::Validation(e.to_string()))?;

        let images = upload_all(self.assets.as_ref(), &uploads).await?;
        let product = self
            .repository
            .insert(Product::new(input, user_id, images))
            .await?;

        info!(product_id = %product.id, "product created");
        Ok(product)
    }

    /// Update an owned listing, appending any newly uploaded images
    #[instrument(skip(self, input, uploads))]
    pub async fn update_product(
        &self,
        id: &str,
        input: UpdateProduct,
        uploads: Vec<AssetUpload>,
    ) -> CatalogResult<Product> {
        let user_id = self.require_user()?;
        input
            .validate()
            .map_err(|e| CatalogError::Validation(e.to_string()))?;
        self.require_owned(id, &user_id).await?;

        let new_images = upload_all(self.assets.as_ref(), &uploads).await?;
        let product = self.repository.update(id, input, new_images).await?;

        info!(product_id = %id, "product updated");
        Ok(product)
    }

    /// Delete an owned listing, releasing its blobs first
    ///
    /// Blob removal is best-effort; a blob that will not go away never
    /// blocks the record removal.
    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: &str) -> CatalogResult<()> {
        let user_id = self.require_user()?;
        let product = self.require_owned(id, &user_id).await?;

        for url in &product.images {
            remove_best_effort(self.assets.as_ref(), url).await;
        }

        if !self.repository.delete(id).await? {
            return Err(CatalogError::NotFound(id.to_string()));
        }

        info!(product_id = %id, "product deleted");
        Ok(())
    }

    /// Toggle the caller's like on a product, returning the confirmed
    /// post-write like-set
    ///
    /// The membership check and the mutation are separate steps, but the
    /// store-side set primitives make the toggle converge: repeating either
    /// half is a no-op.
    #[instrument(skip(self))]
    pub async fn toggle_like(&self, id: &str) -> CatalogResult<Vec<String>> {
        let user_id = self.require_user()?;

        let product = self
            .repository
            .get_by_id(id)
            .await?
            .ok_or_else(|| CatalogError::NotFound(id.to_string()))?;

        let updated = if product.liked_by(&user_id) {
            self.repository.like_remove(id, &user_id).await?
        } else {
            self.repository.like_add(id, &user_id).await?
        };

        Ok(updated.likes)
    }
}
