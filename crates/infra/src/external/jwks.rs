//! Identity provider key set client.

use thiserror::Error;

use coffeeshop_auth::JwkSet;

#[derive(Debug, Error)]
pub enum JwksError {
    #[error("failed to fetch JWKS from {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("JWKS at {url} contains no keys")]
    Empty { url: String },
}

/// Fetches the provider's published signing keys.
#[derive(Debug, Clone)]
pub struct JwksClient {
    http: reqwest::Client,
    url: String,
}

impl JwksClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub async fn fetch(&self) -> Result<JwkSet, JwksError> {
        let fetch_err = |source| JwksError::Fetch {
            url: self.url.clone(),
            source,
        };

        let set = self
            .http
            .get(&self.url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(fetch_err)?
            .json::<JwkSet>()
            .await
            .map_err(fetch_err)?;

        if set.keys.is_empty() {
            return Err(JwksError::Empty {
                url: self.url.clone(),
            });
        }

        tracing::info!(url = %self.url, keys = set.keys.len(), "fetched JWKS");
        Ok(set)
    }
}
