//! Catalog Domain
//!
//! Query and interaction engine for a second-hand marketplace catalog backed
//! by a document store.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │   Service   │  ← Auth checks, asset lifecycle, orchestration
//! └──────┬──────┘
//!        │
//! ┌──────▼──────────────┐
//! │ Query / Reconcile   │  ← Plan building, client-side search and paging
//! └──────┬──────────────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← Data access (trait + MongoDB implementation)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← Entities, DTOs
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use domain_catalog::{
//!     assets::HttpAssetStore,
//!     auth::StaticAuth,
//!     mongodb::MongoCatalogRepository,
//!     service::CatalogService,
//! };
//! use mongodb::Client;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Client::with_uri_str("mongodb://localhost:27017").await?;
//! let db = client.database("marketplace");
//!
//! let repository = Arc::new(MongoCatalogRepository::new(&db));
//! let assets = Arc::new(HttpAssetStore::new(&core_config::assets::AssetStoreConfig {
//!     endpoint: "http://localhost:9000/images".to_string(),
//!     public_base: "https://cdn.example.com/images".to_string(),
//!     request_timeout_secs: 30,
//! })?);
//! let auth = Arc::new(StaticAuth::user("user-1"));
//!
//! let service = CatalogService::new(repository, assets, auth);
//! let page = service.list_products(Default::default()).await?;
//! # Ok(())
//! # }
//! ```

pub mod assets;
pub mod auth;
pub mod error;
pub mod models;
pub mod mongodb;
pub mod query;
pub mod reconcile;
pub mod repository;
pub mod service;

// Re-export commonly used types
pub use assets::{AssetStore, AssetUpload, HttpAssetStore};
pub use auth::{AuthContext, StaticAuth};
pub use error::{CatalogError, CatalogResult};
pub use models::{
    CreateProduct, Product, ProductCondition, ProductFilter, ProductPage, ProductStatus, SortKey,
    StatusFilter, UpdateProduct,
};
pub use mongodb::MongoCatalogRepository;
pub use repository::CatalogRepository;
pub use service::CatalogService;
