use std::fmt;

use url::Url;

use crate::ServiceError;

pub const DEFAULT_BASE_URL: &str = "https://code-smash.com";

/// Connection settings for the review API.
///
/// Both values must be supplied by the caller; there is no built-in token.
#[derive(Clone)]
pub struct ApiConfig {
    base_url: String,
    token: String,
}

impl ApiConfig {
    pub fn new(base_url: &str, token: impl Into<String>) -> Result<Self, ServiceError> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(ServiceError::Config("API token must not be empty".into()));
        }

        let url = Url::parse(base_url)
            .map_err(|e| ServiceError::Config(format!("base URL {base_url:?}: {e}")))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ServiceError::Config(format!(
                "base URL {base_url:?} must use http or https"
            )));
        }

        Ok(Self {
            base_url: url.as_str().trim_end_matches('/').to_string(),
            token,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn token(&self) -> &str {
        &self.token
    }
}

impl fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiConfig")
            .field("base_url", &self.base_url)
            .field("token", &"<redacted>")
            .finish()
    }
}
