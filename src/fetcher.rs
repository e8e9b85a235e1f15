use std::sync::Arc;

use anyhow::Context as _;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tokio::sync::Semaphore;
use url::Url;

use crate::progress::Progress;

pub const DEFAULT_API_BASE_URL: &str = "https://api-colombia.com/api/v1/";

/// Every way a section request can fail. Sections log it and show their
/// fixed message; it never reaches the caller of `run`.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid endpoint path {path:?}")]
    Endpoint {
        path: String,
        #[source]
        source: url::ParseError,
    },

    #[error("GET {url} failed")]
    Network {
        url: Url,
        #[source]
        source: reqwest::Error,
    },

    #[error("GET {url} failed with status {status}")]
    Status { url: Url, status: StatusCode },

    #[error("GET {url} returned a body that is not the expected JSON")]
    Decode {
        url: Url,
        #[source]
        source: serde_json::Error,
    },

    #[error("request limiter closed")]
    Closed,
}

#[derive(Clone)]
pub struct Fetcher {
    client: reqwest::Client,
    base_url: Url,
    semaphore: Arc<Semaphore>,
    progress: Option<Arc<Progress>>,
}

impl Fetcher {
    pub fn new(
        base_url: &Url,
        user_agent: &str,
        max_concurrency: usize,
        progress: Option<Arc<Progress>>,
    ) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .context("build reqwest client")?;
        Ok(Self {
            client,
            base_url: directory_url(base_url),
            semaphore: Arc::new(Semaphore::new(max_concurrency.max(1))),
            progress,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn endpoint(&self, path: &str) -> Result<Url, FetchError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|source| FetchError::Endpoint {
                path: path.to_string(),
                source,
            })
    }

    /// One GET, no retries. Any non-2xx status is an error.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, FetchError> {
        let url = self.endpoint(path)?;
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| FetchError::Closed)?;

        if let Some(p) = &self.progress {
            p.http_start(&url);
        }
        let res = self.get_bytes(&url).await;
        if let Some(p) = &self.progress {
            match &res {
                Ok(bytes) => p.http_ok(&url, bytes.len()),
                Err(_) => p.http_err(&url),
            }
        }

        let bytes = res?;
        serde_json::from_slice(&bytes).map_err(|source| FetchError::Decode { url, source })
    }

    async fn get_bytes(&self, url: &Url) -> Result<Vec<u8>, FetchError> {
        let network = |source| FetchError::Network {
            url: url.clone(),
            source,
        };

        let resp = self.client.get(url.clone()).send().await.map_err(network)?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.clone(),
                status,
            });
        }

        let bytes = resp.bytes().await.map_err(network)?;
        tracing::debug!(%url, bytes = bytes.len(), "fetched");
        Ok(bytes.to_vec())
    }
}

/// `Url::join` drops the last path segment unless the base ends with `/`.
fn directory_url(base_url: &Url) -> Url {
    let mut url = base_url.clone();
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_join_under_the_base_path() {
        let base = Url::parse("https://api-colombia.com/api/v1").unwrap();
        let fetcher = Fetcher::new(&base, "test", 1, None).unwrap();
        assert_eq!(fetcher.base_url().as_str(), DEFAULT_API_BASE_URL);
        assert_eq!(
            fetcher.endpoint("Country/Colombia").unwrap().as_str(),
            "https://api-colombia.com/api/v1/Country/Colombia"
        );
        assert_eq!(
            fetcher.endpoint("/Department").unwrap().as_str(),
            "https://api-colombia.com/api/v1/Department"
        );
    }
}
