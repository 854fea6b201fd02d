//! Database library providing the MongoDB connector used by the catalog engine
//!
//! # Example
//!
//! ```ignore
//! use database::mongodb;
//!
//! let client = mongodb::connect("mongodb://localhost:27017").await?;
//! let db = client.database("marketplace");
//! let collection = db.collection::<Document>("products");
//! ```

pub mod common;
pub mod mongodb;

pub use common::{DatabaseError, DatabaseResult};
