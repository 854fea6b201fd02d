//! Query plan construction and shape validation
//!
//! The target store supports equality and array-contains predicates freely,
//! but only one inequality *field* per query, and requires the sort key to be
//! that field whenever an inequality predicate is present. The builder
//! enforces this up front so an unsatisfiable criteria combination surfaces
//! as a `QueryShape` error instead of an opaque remote failure.

use crate::error::{CatalogError, CatalogResult};
use crate::models::{ProductFilter, SortKey, StatusFilter};

/// Field names as stored in product records
pub mod fields {
    pub const CATEGORY: &str = "category";
    pub const SUBCATEGORY: &str = "subcategory";
    pub const OWNER_ID: &str = "owner_id";
    pub const BRAND: &str = "brand";
    pub const CONDITION: &str = "condition";
    pub const FEATURED: &str = "featured";
    pub const STATUS: &str = "status";
    pub const SIZES: &str = "sizes";
    pub const COLORS: &str = "colors";
    pub const PRICE: &str = "price";
    pub const CREATED_AT: &str = "created_at";
    pub const VIEWS: &str = "views";
    pub const RATING: &str = "rating";
}

/// A single predicate value
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Str(String),
    Int(i64),
    Bool(bool),
}

/// Predicate operator
///
/// `Contains` selects records whose list field contains the given token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Eq,
    Gte,
    Lte,
    Contains,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub field: &'static str,
    pub op: Op,
    pub value: Scalar,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub field: &'static str,
    pub direction: SortDirection,
}

/// The fully resolved query sent to the store for one listing request
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPlan {
    pub predicates: Vec<Predicate>,
    pub sort: SortSpec,
    /// Result-size bound; `None` means a full scan
    pub limit: Option<i64>,
    /// Opaque continuation marker, applied before the size bound
    pub start_after: Option<String>,
}

impl QueryPlan {
    pub fn has_inequality_on(&self, field: &str) -> bool {
        self.predicates
            .iter()
            .any(|p| p.field == field && matches!(p.op, Op::Gte | Op::Lte))
    }
}

fn sort_spec(key: SortKey) -> SortSpec {
    let (field, direction) = match key {
        SortKey::PriceAsc => (fields::PRICE, SortDirection::Asc),
        SortKey::PriceDesc => (fields::PRICE, SortDirection::Desc),
        SortKey::Newest => (fields::CREATED_AT, SortDirection::Desc),
        SortKey::Oldest => (fields::CREATED_AT, SortDirection::Asc),
        SortKey::Popular => (fields::VIEWS, SortDirection::Desc),
        SortKey::Rating => (fields::RATING, SortDirection::Desc),
    };
    SortSpec { field, direction }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.trim().is_empty())
}

/// Build a validated query plan from filter criteria
///
/// A search term or a page number forces the plan unbounded: the text match
/// and page slicing both happen client-side over the complete result set.
pub fn build_plan(filter: &ProductFilter) -> CatalogResult<QueryPlan> {
    let mut predicates = Vec::new();

    let mut eq = |field: &'static str, value: Scalar| {
        predicates.push(Predicate {
            field,
            op: Op::Eq,
            value,
        });
    };

    if let Some(category) = non_empty(&filter.category) {
        eq(fields::CATEGORY, Scalar::Str(category.to_string()));
    }
    if let Some(subcategory) = non_empty(&filter.subcategory) {
        eq(fields::SUBCATEGORY, Scalar::Str(subcategory.to_string()));
    }
    if let Some(owner_id) = non_empty(&filter.owner_id) {
        eq(fields::OWNER_ID, Scalar::Str(owner_id.to_string()));
    }
    if let Some(brand) = non_empty(&filter.brand) {
        eq(fields::BRAND, Scalar::Str(brand.to_string()));
    }
    if let Some(condition) = filter.condition {
        eq(fields::CONDITION, Scalar::Str(condition.to_string()));
    }
    if filter.featured {
        eq(fields::FEATURED, Scalar::Bool(true));
    }

    // The store has no implicit visibility filtering, so the status
    // predicate defaults to `available` unless explicitly overridden or
    // suppressed.
    match filter.status {
        StatusFilter::Default => eq(fields::STATUS, Scalar::Str("available".to_string())),
        StatusFilter::Only(status) => eq(fields::STATUS, Scalar::Str(status.to_string())),
        StatusFilter::All => {}
    }

    if let Some(size) = non_empty(&filter.size) {
        predicates.push(Predicate {
            field: fields::SIZES,
            op: Op::Contains,
            value: Scalar::Str(size.to_string()),
        });
    }
    if let Some(color) = non_empty(&filter.color) {
        predicates.push(Predicate {
            field: fields::COLORS,
            op: Op::Contains,
            value: Scalar::Str(color.to_string()),
        });
    }

    if let Some(min) = filter.min_price {
        predicates.push(Predicate {
            field: fields::PRICE,
            op: Op::Gte,
            value: Scalar::Int(min),
        });
    }
    if let Some(max) = filter.max_price {
        predicates.push(Predicate {
            field: fields::PRICE,
            op: Op::Lte,
            value: Scalar::Int(max),
        });
    }

    let sort = sort_spec(filter.sort);

    // Two inequalities on price are compatible with each other, but the sort
    // key must then ride the same field.
    let has_price_range = filter.min_price.is_some() || filter.max_price.is_some();
    if has_price_range && sort.field != fields::PRICE {
        return Err(CatalogError::QueryShape(format!(
            "a price range filter requires a price sort, got '{}'",
            filter.sort
        )));
    }

    let search_requested = non_empty(&filter.search).is_some();
    let limit = if search_requested || filter.page.is_some() {
        None
    } else {
        filter.page_size.map(|n| n as i64)
    };

    Ok(QueryPlan {
        predicates,
        sort,
        limit,
        start_after: filter.cursor.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ProductCondition, ProductStatus};

    fn pred<'a>(plan: &'a QueryPlan, field: &str) -> Option<&'a Predicate> {
        plan.predicates.iter().find(|p| p.field == field)
    }

    #[test]
    fn test_empty_filter_defaults() {
        let plan = build_plan(&ProductFilter::default()).unwrap();

        // Only the implicit status predicate
        assert_eq!(plan.predicates.len(), 1);
        assert_eq!(
            pred(&plan, "status").unwrap().value,
            Scalar::Str("available".to_string())
        );
        assert_eq!(plan.sort.field, "created_at");
        assert_eq!(plan.sort.direction, SortDirection::Desc);
        assert_eq!(plan.limit, None);
        assert_eq!(plan.start_after, None);
    }

    #[test]
    fn test_scalar_equality_predicates() {
        let filter = ProductFilter {
            category: Some("femme".to_string()),
            brand: Some("Levi's".to_string()),
            condition: Some(ProductCondition::Good),
            featured: true,
            ..Default::default()
        };
        let plan = build_plan(&filter).unwrap();

        assert_eq!(
            pred(&plan, "category").unwrap().value,
            Scalar::Str("femme".to_string())
        );
        assert_eq!(
            pred(&plan, "condition").unwrap().value,
            Scalar::Str("good".to_string())
        );
        assert_eq!(pred(&plan, "featured").unwrap().value, Scalar::Bool(true));
    }

    #[test]
    fn test_blank_fields_emit_no_predicate() {
        let filter = ProductFilter {
            category: Some("  ".to_string()),
            brand: Some(String::new()),
            ..Default::default()
        };
        let plan = build_plan(&filter).unwrap();

        assert!(pred(&plan, "category").is_none());
        assert!(pred(&plan, "brand").is_none());
    }

    #[test]
    fn test_status_all_suppresses_predicate() {
        let filter = ProductFilter {
            status: StatusFilter::All,
            ..Default::default()
        };
        let plan = build_plan(&filter).unwrap();
        assert!(pred(&plan, "status").is_none());
    }

    #[test]
    fn test_status_explicit_override() {
        let filter = ProductFilter {
            status: StatusFilter::Only(ProductStatus::Sold),
            ..Default::default()
        };
        let plan = build_plan(&filter).unwrap();
        assert_eq!(
            pred(&plan, "status").unwrap().value,
            Scalar::Str("sold".to_string())
        );
    }

    #[test]
    fn test_size_and_color_are_contains_predicates() {
        let filter = ProductFilter {
            size: Some("M".to_string()),
            color: Some("navy".to_string()),
            ..Default::default()
        };
        let plan = build_plan(&filter).unwrap();

        assert_eq!(pred(&plan, "sizes").unwrap().op, Op::Contains);
        assert_eq!(pred(&plan, "colors").unwrap().op, Op::Contains);
    }

    #[test]
    fn test_price_range_with_price_sort() {
        let filter = ProductFilter {
            min_price: Some(2000),
            max_price: Some(5000),
            sort: SortKey::PriceAsc,
            ..Default::default()
        };
        let plan = build_plan(&filter).unwrap();

        assert!(plan.has_inequality_on("price"));
        assert_eq!(plan.sort.field, "price");
        assert_eq!(plan.sort.direction, SortDirection::Asc);
    }

    #[test]
    fn test_price_range_with_incompatible_sort_is_rejected() {
        let filter = ProductFilter {
            min_price: Some(2000),
            sort: SortKey::Newest,
            ..Default::default()
        };
        let err = build_plan(&filter).unwrap_err();
        assert!(matches!(err, CatalogError::QueryShape(_)));
    }

    #[test]
    fn test_page_size_bounds_the_plan() {
        let filter = ProductFilter {
            page_size: Some(24),
            ..Default::default()
        };
        let plan = build_plan(&filter).unwrap();
        assert_eq!(plan.limit, Some(24));
    }

    #[test]
    fn test_search_forces_unbounded_plan() {
        let filter = ProductFilter {
            search: Some("denim".to_string()),
            page_size: Some(24),
            ..Default::default()
        };
        let plan = build_plan(&filter).unwrap();
        assert_eq!(plan.limit, None);
    }

    #[test]
    fn test_page_number_forces_unbounded_plan() {
        let filter = ProductFilter {
            page: Some(2),
            page_size: Some(24),
            ..Default::default()
        };
        let plan = build_plan(&filter).unwrap();
        assert_eq!(plan.limit, None);
    }

    #[test]
    fn test_cursor_passes_through() {
        let filter = ProductFilter {
            cursor: Some("665f1e0c2ab79c6d8e000001".to_string()),
            page_size: Some(24),
            ..Default::default()
        };
        let plan = build_plan(&filter).unwrap();
        assert_eq!(
            plan.start_after.as_deref(),
            Some("665f1e0c2ab79c6d8e000001")
        );
        assert_eq!(plan.limit, Some(24));
    }

    #[test]
    fn test_sort_table() {
        let cases = [
            (SortKey::PriceAsc, "price", SortDirection::Asc),
            (SortKey::PriceDesc, "price", SortDirection::Desc),
            (SortKey::Newest, "created_at", SortDirection::Desc),
            (SortKey::Oldest, "created_at", SortDirection::Asc),
            (SortKey::Popular, "views", SortDirection::Desc),
            (SortKey::Rating, "rating", SortDirection::Desc),
        ];
        for (key, field, direction) in cases {
            let plan = build_plan(&ProductFilter {
                sort: key,
                ..Default::default()
            })
            .unwrap();
            assert_eq!(plan.sort.field, field);
            assert_eq!(plan.sort.direction, direction);
        }
    }
}
