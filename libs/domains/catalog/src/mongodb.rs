//! MongoDB implementation of CatalogRepository

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId, to_document, Bson, Document},
    options::{FindOneAndUpdateOptions, FindOptions, IndexOptions, ReturnDocument},
    Collection, Database, IndexModel,
};
use tracing::instrument;

use crate::error::{CatalogError, CatalogResult};
use crate::models::{Product, UpdateProduct};
use crate::query::{Op, QueryPlan, Scalar, SortDirection, SortSpec};
use crate::repository::CatalogRepository;

/// MongoDB-backed catalog repository
pub struct MongoCatalogRepository {
    collection: Collection<Product>,
}

impl MongoCatalogRepository {
    /// Create a repository over the default "products" collection
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection::<Product>("products"),
        }
    }

    /// Create a repository over a custom collection name
    pub fn with_collection(db: &Database, collection_name: &str) -> Self {
        Self {
            collection: db.collection::<Product>(collection_name),
        }
    }

    /// Connect using a MongoConfig and return a ready repository
    pub async fn connect(config: &database::mongodb::MongoConfig) -> CatalogResult<Self> {
        let client = database::mongodb::connect_from_config(config)
            .await
            .map_err(|e| CatalogError::Remote(e.to_string()))?;
        Ok(Self::new(&client.database(config.database())))
    }

    /// Initialize indexes for the listing query shapes
    pub async fn init_indexes(&self) -> CatalogResult<()> {
        let indexes = vec![
            IndexModel::builder()
                .keys(doc! { "category": 1, "status": 1, "created_at": -1 })
                .options(
                    IndexOptions::builder()
                        .name("idx_category_status".to_string())
                        .build(),
                )
                .build(),
            IndexModel::builder()
                .keys(doc! { "price": 1 })
                .options(
                    IndexOptions::builder()
                        .name("idx_price".to_string())
                        .build(),
                )
                .build(),
            IndexModel::builder()
                .keys(doc! { "owner_id": 1, "created_at": -1 })
                .options(
                    IndexOptions::builder()
                        .name("idx_owner".to_string())
                        .build(),
                )
                .build(),
            IndexModel::builder()
                .keys(doc! { "brand": 1 })
                .options(
                    IndexOptions::builder()
                        .name("idx_brand".to_string())
                        .build(),
                )
                .build(),
        ];

        self.collection.create_indexes(indexes).await?;
        tracing::info!("Catalog indexes created successfully");
        Ok(())
    }

    fn raw(&self) -> Collection<Document> {
        self.collection.clone_with_type::<Document>()
    }

    fn object_id(id: &str) -> CatalogResult<ObjectId> {
        // An id that cannot be an ObjectId cannot resolve to a record
        ObjectId::parse_str(id).map_err(|_| CatalogError::NotFound(id.to_string()))
    }

    /// Translate a query plan into a BSON filter and find options
    ///
    /// Array-contains maps to plain field equality: matching a scalar against
    /// an array field is native membership selection in MongoDB.
    fn build_find(plan: &QueryPlan) -> (Document, FindOptions) {
        let mut filter = doc! {};

        for predicate in &plan.predicates {
            let value = scalar_to_bson(&predicate.value);
            match predicate.op {
                Op::Eq | Op::Contains => {
                    filter.insert(predicate.field, value);
                }
                Op::Gte => range_entry(&mut filter, predicate.field, "$gte", value),
                Op::Lte => range_entry(&mut filter, predicate.field, "$lte", value),
            }
        }

        let direction = match plan.sort.direction {
            SortDirection::Asc => 1,
            SortDirection::Desc => -1,
        };
        let mut sort = Document::new();
        sort.insert(plan.sort.field, direction);

        let options = FindOptions::builder()
            .sort(sort)
            .limit(plan.limit)
            .build();

        (filter, options)
    }

    /// Turn a continuation marker document into a range bound on the primary
    /// sort field, honoring the sort direction
    fn cursor_bound(sort: &SortSpec, marker: &Document) -> (&'static str, Bson) {
        let operator = match sort.direction {
            SortDirection::Asc => "$gt",
            SortDirection::Desc => "$lt",
        };
        let value = marker.get(sort.field).cloned().unwrap_or(Bson::Null);
        (operator, value)
    }
}

fn scalar_to_bson(value: &Scalar) -> Bson {
    match value {
        Scalar::Str(s) => Bson::String(s.clone()),
        Scalar::Int(i) => Bson::Int64(*i),
        Scalar::Bool(b) => Bson::Boolean(*b),
    }
}

fn range_entry(filter: &mut Document, field: &str, operator: &str, value: Bson) {
    match filter.get_mut(field) {
        Some(Bson::Document(range)) => {
            range.insert(operator, value);
        }
        _ => {
            filter.insert(field, doc! { operator: value });
        }
    }
}

#[async_trait]
impl CatalogRepository for MongoCatalogRepository {
    #[instrument(skip(self, product), fields(title = %product.title))]
    async fn insert(&self, mut product: Product) -> CatalogResult<Product> {
        let mut document = to_document(&product)?;
        // The store assigns the identity
        document.remove("_id");

        let result = self.raw().insert_one(document).await?;
        product.id = result
            .inserted_id
            .as_object_id()
            .map(|oid| oid.to_hex())
            .ok_or_else(|| CatalogError::Remote("store did not assign an id".to_string()))?;

        tracing::info!(product_id = %product.id, "Product created successfully");
        Ok(product)
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, id: &str) -> CatalogResult<Option<Product>> {
        let oid = match ObjectId::parse_str(id) {
            Ok(oid) => oid,
            Err(_) => return Ok(None),
        };
        let product = self.collection.find_one(doc! { "_id": oid }).await?;
        Ok(product)
    }

    #[instrument(skip(self, plan))]
    async fn find(&self, plan: QueryPlan) -> CatalogResult<Vec<Product>> {
        let (mut filter, options) = Self::build_find(&plan);

        if let Some(ref cursor) = plan.start_after {
            let oid = ObjectId::parse_str(cursor).map_err(|_| {
                CatalogError::QueryShape("malformed continuation cursor".to_string())
            })?;
            let marker = self
                .raw()
                .find_one(doc! { "_id": oid })
                .await?
                .ok_or_else(|| CatalogError::NotFound(cursor.clone()))?;

            let (operator, value) = Self::cursor_bound(&plan.sort, &marker);
            range_entry(&mut filter, plan.sort.field, operator, value);
        }

        let cursor = self.collection.find(filter).with_options(options).await?;
        let products: Vec<Product> = cursor.try_collect().await?;

        Ok(products)
    }

    #[instrument(skip(self, input, new_images))]
    async fn update(
        &self,
        id: &str,
        input: UpdateProduct,
        new_images: Vec<String>,
    ) -> CatalogResult<Product> {
        let oid = Self::object_id(id)?;
        let filter = doc! { "_id": oid };

        let mut updated = self
            .collection
            .find_one(filter.clone())
            .await?
            .ok_or_else(|| CatalogError::NotFound(id.to_string()))?;
        updated.apply_update(input, new_images);

        let mut replacement = to_document(&updated)?;
        // _id is immutable; the replacement keeps the stored one
        replacement.remove("_id");
        self.raw().replace_one(filter, replacement).await?;

        tracing::info!(product_id = %id, "Product updated successfully");
        Ok(updated)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: &str) -> CatalogResult<bool> {
        let oid = match ObjectId::parse_str(id) {
            Ok(oid) => oid,
            Err(_) => return Ok(false),
        };
        let result = self.collection.delete_one(doc! { "_id": oid }).await?;

        if result.deleted_count > 0 {
            tracing::info!(product_id = %id, "Product deleted successfully");
        }
        Ok(result.deleted_count > 0)
    }

    #[instrument(skip(self))]
    async fn like_add(&self, id: &str, user_id: &str) -> CatalogResult<Product> {
        let oid = Self::object_id(id)?;
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        self.collection
            .find_one_and_update(doc! { "_id": oid }, doc! { "$addToSet": { "likes": user_id } })
            .with_options(options)
            .await?
            .ok_or_else(|| CatalogError::NotFound(id.to_string()))
    }

    #[instrument(skip(self))]
    async fn like_remove(&self, id: &str, user_id: &str) -> CatalogResult<Product> {
        let oid = Self::object_id(id)?;
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        self.collection
            .find_one_and_update(doc! { "_id": oid }, doc! { "$pull": { "likes": user_id } })
            .with_options(options)
            .await?
            .ok_or_else(|| CatalogError::NotFound(id.to_string()))
    }

    #[instrument(skip(self))]
    async fn increment_views(&self, id: &str) -> CatalogResult<()> {
        let oid = Self::object_id(id)?;
        self.raw()
            .update_one(doc! { "_id": oid }, doc! { "$inc": { "views": 1 } })
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ProductFilter, SortKey, StatusFilter};
    use crate::query::build_plan;

    fn plan_for(filter: ProductFilter) -> QueryPlan {
        build_plan(&filter).unwrap()
    }

    #[test]
    fn test_build_find_default_status() {
        let plan = plan_for(ProductFilter::default());
        let (filter, _) = MongoCatalogRepository::build_find(&plan);
        assert_eq!(filter.get_str("status").unwrap(), "available");
    }

    #[test]
    fn test_build_find_status_all_is_empty() {
        let plan = plan_for(ProductFilter {
            status: StatusFilter::All,
            ..Default::default()
        });
        let (filter, _) = MongoCatalogRepository::build_find(&plan);
        assert!(filter.is_empty());
    }

    #[test]
    fn test_build_find_price_range_merges_into_one_document() {
        let plan = plan_for(ProductFilter {
            min_price: Some(2000),
            max_price: Some(5000),
            sort: SortKey::PriceAsc,
            ..Default::default()
        });
        let (filter, _) = MongoCatalogRepository::build_find(&plan);

        let price = filter.get_document("price").unwrap();
        assert_eq!(price.get_i64("$gte").unwrap(), 2000);
        assert_eq!(price.get_i64("$lte").unwrap(), 5000);
    }

    #[test]
    fn test_build_find_contains_maps_to_field_equality() {
        let plan = plan_for(ProductFilter {
            size: Some("M".to_string()),
            ..Default::default()
        });
        let (filter, _) = MongoCatalogRepository::build_find(&plan);
        assert_eq!(filter.get_str("sizes").unwrap(), "M");
    }

    #[test]
    fn test_build_find_sort_and_limit() {
        let plan = plan_for(ProductFilter {
            sort: SortKey::Popular,
            page_size: Some(24),
            ..Default::default()
        });
        let (_, options) = MongoCatalogRepository::build_find(&plan);

        assert_eq!(options.sort.unwrap(), doc! { "views": -1 });
        assert_eq!(options.limit, Some(24));
    }

    #[test]
    fn test_build_find_unbounded_has_no_limit() {
        let plan = plan_for(ProductFilter {
            search: Some("denim".to_string()),
            page_size: Some(24),
            ..Default::default()
        });
        let (_, options) = MongoCatalogRepository::build_find(&plan);
        assert_eq!(options.limit, None);
    }

    #[test]
    fn test_cursor_bound_desc_sorts_use_lt() {
        let plan = plan_for(ProductFilter::default());
        let marker = doc! { "created_at": "2024-03-01T10:00:00+00:00" };

        let (operator, value) = MongoCatalogRepository::cursor_bound(&plan.sort, &marker);
        assert_eq!(operator, "$lt");
        assert_eq!(value, Bson::String("2024-03-01T10:00:00+00:00".to_string()));
    }

    #[test]
    fn test_cursor_bound_asc_sorts_use_gt() {
        let plan = plan_for(ProductFilter {
            sort: SortKey::Oldest,
            status: StatusFilter::All,
            ..Default::default()
        });
        let marker = doc! { "created_at": "2024-03-01T10:00:00+00:00" };

        let (operator, _) = MongoCatalogRepository::cursor_bound(&plan.sort, &marker);
        assert_eq!(operator, "$gt");
    }
}
