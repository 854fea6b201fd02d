use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("caller is not authenticated")]
    Unauthenticated,

    #[error("caller does not own product {id}")]
    Unauthorized { id: String },

    #[error("Product not found: {0}")]
    NotFound(String),

    #[error("unsupported filter combination: {0}")]
    QueryShape(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("remote store error: {0}")]
    Remote(String),
}

pub type CatalogResult<T> = Result<T, CatalogError>;

impl From<mongodb::error::Error> for CatalogError {
    fn from(err: mongodb::error::Error) -> Self {
        CatalogError::Remote(err.to_string())
    }
}

impl From<mongodb::bson::ser::Error> for CatalogError {
    fn from(err: mongodb::bson::ser::Error) -> Self {
        CatalogError::Remote(err.to_string())
    }
}

impl From<reqwest::Error> for CatalogError {
    fn from(err: reqwest::Error) -> Self {
        CatalogError::Remote(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_the_resource() {
        let err = CatalogError::NotFound("abc123".to_string());
        assert!(err.to_string().contains("abc123"));

        let err = CatalogError::Unauthorized {
            id: "abc123".to_string(),
        };
        assert!(err.to_string().contains("abc123"));
    }
}
