use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use validator::Validate;

use crate::reconcile;

/// Product availability status
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, Default,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ProductStatus {
    /// Product is listed and purchasable
    #[default]
    Available,
    /// Product is reserved by a buyer
    Reserved,
    /// Product has been sold
    Sold,
    /// Product is hidden by its owner
    Hidden,
}

/// Physical condition of a second-hand item
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, Default,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ProductCondition {
    NewWithTags,
    New,
    #[default]
    VeryGood,
    Good,
    Fair,
}

/// Sort key for product listings
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, Default,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SortKey {
    PriceAsc,
    PriceDesc,
    #[default]
    Newest,
    Oldest,
    Popular,
    Rating,
}

impl SortKey {
    /// Parse a sort key, falling back to the default for absent or
    /// unrecognized input.
    pub fn parse(input: Option<&str>) -> Self {
        input
            .and_then(|s| s.parse().ok())
            .unwrap_or_default()
    }
}

/// Status constraint for a listing query
///
/// The store has no implicit visibility filtering, so the default constrains
/// results to `available`. `All` suppresses the status predicate entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    Default,
    All,
    Only(ProductStatus),
}

/// Product entity - a listing stored in the document store
///
/// `id` is store-assigned and immutable; `likes`, `views` and the timestamps
/// are server-managed and never writable through the input DTOs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    /// Unique identifier (stored as _id)
    #[serde(rename = "_id", alias = "id", with = "reconcile::id_repr", default)]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Price in cents (for precision)
    pub price: i64,
    /// Prior price in cents, kept only for discount display
    #[serde(default)]
    pub old_price: Option<i64>,
    pub category: String,
    #[serde(default)]
    pub subcategory: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub condition: ProductCondition,
    /// Ordered size labels
    #[serde(default)]
    pub sizes: Vec<String>,
    /// Ordered color tokens
    #[serde(default)]
    pub colors: Vec<String>,
    /// Ordered image URLs, first element is the primary image
    #[serde(default)]
    pub images: Vec<String>,
    pub owner_id: String,
    pub status: ProductStatus,
    #[serde(default)]
    pub featured: bool,
    /// User identities who liked this product (set semantics)
    #[serde(default)]
    pub likes: Vec<String>,
    /// Monotonic view counter
    #[serde(default)]
    pub views: i64,
    /// Creation timestamp (canonically RFC 3339; reads tolerate native
    /// store datetimes from partially-migrated records)
    #[serde(with = "reconcile::timestamp_repr")]
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    #[serde(with = "reconcile::timestamp_repr")]
    pub updated_at: DateTime<Utc>,
}

/// DTO for creating a new product
///
/// Image files are carried separately and uploaded before the record is
/// written; their URLs are injected by the service.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateProduct {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Price in cents
    #[validate(range(min = 0))]
    pub price: i64,
    #[validate(range(min = 0))]
    #[serde(default)]
    pub old_price: Option<i64>,
    #[validate(length(min = 1, max = 100))]
    pub category: String,
    #[serde(default)]
    pub subcategory: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub condition: ProductCondition,
    #[serde(default)]
    pub sizes: Vec<String>,
    #[serde(default)]
    pub colors: Vec<String>,
    #[serde(default)]
    pub featured: bool,
}

/// DTO for updating an existing product
///
/// Provided fields overwrite prior values verbatim. Newly uploaded images are
/// appended by the service and are deliberately absent here, so callers can
/// never truncate or reorder the existing image list.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateProduct {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    pub description: Option<String>,
    #[validate(range(min = 0))]
    pub price: Option<i64>,
    #[validate(range(min = 0))]
    pub old_price: Option<i64>,
    #[validate(length(min = 1, max = 100))]
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub brand: Option<String>,
    pub condition: Option<ProductCondition>,
    pub sizes: Option<Vec<String>>,
    pub colors: Option<Vec<String>>,
    pub featured: Option<bool>,
    pub status: Option<ProductStatus>,
}

/// Query criteria for listing products
///
/// Caller-constructed and ephemeral; absence of a field means no constraint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductFilter {
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub owner_id: Option<String>,
    pub brand: Option<String>,
    /// Selects products whose size list contains this label
    pub size: Option<String>,
    /// Selects products whose color list contains this token
    pub color: Option<String>,
    pub condition: Option<ProductCondition>,
    /// Featured-only flag
    #[serde(default)]
    pub featured: bool,
    #[serde(skip)]
    pub status: StatusFilter,
    /// Minimum price in cents (inclusive)
    pub min_price: Option<i64>,
    /// Maximum price in cents (inclusive)
    pub max_price: Option<i64>,
    /// Free-text search over title, description and brand
    pub search: Option<String>,
    #[serde(default)]
    pub sort: SortKey,
    pub page_size: Option<usize>,
    /// 1-based page number (layered over an unbounded fetch)
    pub page: Option<usize>,
    /// Opaque continuation token from a prior result set
    pub cursor: Option<String>,
}

/// One page of listing results
#[derive(Debug, Clone, Serialize)]
pub struct ProductPage {
    pub items: Vec<Product>,
    /// Count after client-side filtering; exact only when no store-side
    /// limit was reached
    pub total: usize,
    pub total_pages: usize,
}

impl Product {
    /// Create a new product from a CreateProduct DTO
    ///
    /// The id stays empty until the store assigns one on insert.
    pub fn new(input: CreateProduct, owner_id: String, images: Vec<String>) -> Self {
        let now = Utc::now();
        Self {
            id: String::new(),
            title: input.title,
            description: input.description,
            price: input.price,
            old_price: input.old_price,
            category: input.category,
            subcategory: input.subcategory,
            brand: input.brand,
            condition: input.condition,
            sizes: input.sizes,
            colors: input.colors,
            images,
            owner_id,
            status: ProductStatus::Available,
            featured: input.featured,
            likes: Vec::new(),
            views: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply updates from an UpdateProduct DTO, appending any newly uploaded
    /// image URLs after the existing list
    pub fn apply_update(&mut self, update: UpdateProduct, new_images: Vec<String>) {
        if let Some(title) = update.title {
            self.title = title;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(price) = update.price {
            self.price = price;
        }
        if let Some(old_price) = update.old_price {
            self.old_price = Some(old_price);
        }
        if let Some(category) = update.category {
            self.category = category;
        }
        if let Some(subcategory) = update.subcategory {
            self.subcategory = Some(subcategory);
        }
        if let Some(brand) = update.brand {
            self.brand = Some(brand);
        }
        if let Some(condition) = update.condition {
            self.condition = condition;
        }
        if let Some(sizes) = update.sizes {
            self.sizes = sizes;
        }
        if let Some(colors) = update.colors {
            self.colors = colors;
        }
        if let Some(featured) = update.featured {
            self.featured = featured;
        }
        if let Some(status) = update.status {
            self.status = status;
        }
        self.images.extend(new_images);
        self.updated_at = Utc::now();
    }

    /// Whether the given user has liked this product
    pub fn liked_by(&self, user_id: &str) -> bool {
        self.likes.iter().any(|u| u == user_id)
    }
}
