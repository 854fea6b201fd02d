//! Result reconciliation
//!
//! Normalizes what comes back from the store (identity injection, timestamp
//! coercion) and applies the filtering the store cannot express natively:
//! free-text substring search and page-number pagination, both computed over
//! an unbounded fetch.

use crate::models::{Product, ProductFilter, ProductPage};

/// Page size applied when the caller did not request one
pub const DEFAULT_PAGE_SIZE: usize = 24;

/// Serde representation for the store-assigned identity
///
/// Reads accept either a native ObjectId or a plain string; the in-memory
/// form is always the hex string.
pub mod id_repr {
    use mongodb::bson::Bson;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(id: &str, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(id)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        match Bson::deserialize(deserializer)? {
            Bson::ObjectId(oid) => Ok(oid.to_hex()),
            Bson::String(s) => Ok(s),
            other => Err(serde::de::Error::custom(format!(
                "unsupported id representation: {}",
                other
            ))),
        }
    }
}

/// Serde representation for timestamps
///
/// Canonical storage form is an RFC 3339 string; reads also accept a native
/// store datetime so partially-migrated records keep deserializing.
pub mod timestamp_repr {
    use chrono::{DateTime, Utc};
    use mongodb::bson::Bson;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        timestamp: &DateTime<Utc>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&timestamp.to_rfc3339())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<DateTime<Utc>, D::Error> {
        match Bson::deserialize(deserializer)? {
            Bson::DateTime(dt) => DateTime::from_timestamp_millis(dt.timestamp_millis())
                .ok_or_else(|| serde::de::Error::custom("timestamp out of range")),
            Bson::String(s) => DateTime::parse_from_rfc3339(&s)
                .map(|t| t.with_timezone(&Utc))
                .map_err(serde::de::Error::custom),
            other => Err(serde::de::Error::custom(format!(
                "unsupported timestamp representation: {}",
                other
            ))),
        }
    }
}

/// Case-insensitive substring match over title, description and brand
pub fn matches_search(product: &Product, term: &str) -> bool {
    let needle = term.to_lowercase();
    product.title.to_lowercase().contains(&needle)
        || product.description.to_lowercase().contains(&needle)
        || product
            .brand
            .as_deref()
            .is_some_and(|b| b.to_lowercase().contains(&needle))
}

/// Assemble the final page from a fetched result set
///
/// With a search term the fetch was unbounded: filter first, compute totals
/// from the filtered size, then slice the requested page. Without one, totals
/// come from the fetched set directly, which is exact only when no store-side
/// limit was reached.
pub fn assemble_page(items: Vec<Product>, filter: &ProductFilter) -> ProductPage {
    let page_size = filter.page_size.unwrap_or(DEFAULT_PAGE_SIZE).max(1);

    let term = filter
        .search
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty());

    let filtered = match term {
        Some(term) => items
            .into_iter()
            .filter(|p| matches_search(p, term))
            .collect(),
        None => items,
    };

    let total = filtered.len();
    let total_pages = total.div_ceil(page_size);

    let items = match filter.page {
        Some(page) => {
            let start = page.max(1) - 1;
            filtered
                .into_iter()
                .skip(start * page_size)
                .take(page_size)
                .collect()
        }
        None if term.is_some() => filtered.into_iter().take(page_size).collect(),
        None => filtered,
    };

    ProductPage {
        items,
        total,
        total_pages,
    }
}
