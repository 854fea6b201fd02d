use crate::{env_or_default, env_required, ConfigError, FromEnv};

/// Blob store configuration
///
/// The asset store is addressed through two base URLs: the endpoint uploads
/// and deletes are issued against, and the public base under which uploaded
/// blobs become retrievable. They are often the same host, so the public base
/// defaults to the endpoint when not set.
#[derive(Clone, Debug)]
pub struct AssetStoreConfig {
    /// Upload/delete endpoint, e.g. "https://assets.internal/v1/blobs"
    pub endpoint: String,

    /// Public base URL returned to callers, e.g. "https://cdn.example.com"
    pub public_base: String,

    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
}

impl AssetStoreConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        let endpoint = endpoint.into();
        Self {
            public_base: endpoint.clone(),
            endpoint,
            request_timeout_secs: 30,
        }
    }

    pub fn with_public_base(mut self, public_base: impl Into<String>) -> Self {
        self.public_base = public_base.into();
        self
    }
}

/// Load AssetStoreConfig from environment variables
///
/// Environment variables:
/// - `ASSET_STORE_URL` (required) - upload/delete endpoint
/// - `ASSET_PUBLIC_URL` (optional, default: ASSET_STORE_URL) - public base URL
/// - `ASSET_REQUEST_TIMEOUT_SECS` (optional, default: 30)
impl FromEnv for AssetStoreConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let endpoint = env_required("ASSET_STORE_URL")?;
        let public_base = env_or_default("ASSET_PUBLIC_URL", &endpoint);

        let request_timeout_secs = env_or_default("ASSET_REQUEST_TIMEOUT_SECS", "30")
            .parse()
            .map_err(|e| ConfigError::ParseError {
                key: "ASSET_REQUEST_TIMEOUT_SECS".to_string(),
                details: format!("{}", e),
            })?;

        Ok(Self {
            endpoint,
            public_base,
            request_timeout_secs,
        })
    }
}
