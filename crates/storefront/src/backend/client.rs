//! Backend client core: request building, response decoding and caching.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, RETRY_AFTER};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::config::BackendConfig;

use super::cache::{CacheKey, CacheValue};
use super::types::AccessToken;
use super::{ApiError, error_for_status};

const CACHE_CAPACITY: u64 = 1000;
const CACHE_TTL: Duration = Duration::from_secs(300);
const HEALTH_TIMEOUT: Duration = Duration::from_secs(3);

/// Client for the JuiceQu REST backend.
///
/// Cheaply cloneable; all clones share one connection pool and one cache.
#[derive(Clone)]
pub struct BackendClient {
    inner: Arc<BackendClientInner>,
}

struct BackendClientInner {
    client: reqwest::Client,
    origin: Url,
    api_root: Url,
    cache: Cache<CacheKey, CacheValue>,
}

impl BackendClient {
    /// Create a new backend client.
    ///
    /// # Errors
    ///
    /// Returns an error if the API root URL cannot be derived or the HTTP
    /// client cannot be built.
    pub fn new(config: &BackendConfig) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .user_agent(concat!("juicequ-storefront/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let cache = Cache::builder()
            .max_capacity(CACHE_CAPACITY)
            .time_to_live(CACHE_TTL)
            .build();

        Ok(Self {
            inner: Arc::new(BackendClientInner {
                client,
                origin: config.base_url.clone(),
                api_root: config.api_root()?,
                cache,
            }),
        })
    }

    /// Resolve an endpoint path (relative to `/api/v1/`).
    pub(crate) fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.inner.api_root.join(path.trim_start_matches('/'))?)
    }

    /// Start a request, attaching the bearer token when present.
    pub(crate) fn request(
        &self,
        method: Method,
        path: &str,
        token: Option<&AccessToken>,
    ) -> Result<RequestBuilder, ApiError> {
        let url = self.endpoint(path)?;
        let builder = self.inner.client.request(method, url);
        Ok(match token {
            Some(token) => builder.bearer_auth(token.expose()),
            None => builder,
        })
    }

    /// Send a request and decode the JSON body.
    pub(crate) async fn send<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<T, ApiError> {
        let body = self.send_raw(builder).await?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %body.chars().take(500).collect::<String>(),
                "Failed to parse backend response"
            );
            ApiError::Parse(e)
        })
    }

    /// Send a request whose success body is irrelevant (e.g. 204 No Content).
    pub(crate) async fn send_empty(&self, builder: RequestBuilder) -> Result<(), ApiError> {
        self.send_raw(builder).await.map(|_| ())
    }

    async fn send_raw(&self, builder: RequestBuilder) -> Result<String, ApiError> {
        let response = builder.send().await?;
        let status = response.status();
        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.trim().parse::<u64>().ok());
        let url = response.url().path().to_string();

        let body = response.text().await?;

        if status.is_success() {
            debug!(%status, path = %url, "Backend request succeeded");
            return Ok(body);
        }

        if status.is_server_error() {
            tracing::error!(
                %status,
                path = %url,
                body = %body.chars().take(500).collect::<String>(),
                "Backend returned server error"
            );
        } else {
            debug!(%status, path = %url, "Backend rejected request");
        }

        Err(error_for_status(status, retry_after, &body))
    }

    /// GET and decode.
    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        token: Option<&AccessToken>,
    ) -> Result<T, ApiError> {
        let builder = self.request(Method::GET, path, token)?;
        self.send(builder).await
    }

    /// GET with query parameters and decode.
    pub(crate) async fn get_with_query<Q: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        query: &Q,
        token: Option<&AccessToken>,
    ) -> Result<T, ApiError> {
        let builder = self.request(Method::GET, path, token)?.query(query);
        self.send(builder).await
    }

    /// Send a JSON body with `method` and decode the response.
    pub(crate) async fn send_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &B,
        token: Option<&AccessToken>,
    ) -> Result<T, ApiError> {
        let builder = self.request(method, path, token)?.json(body);
        self.send(builder).await
    }

    /// DELETE, ignoring the response body.
    pub(crate) async fn delete(
        &self,
        path: &str,
        token: Option<&AccessToken>,
    ) -> Result<(), ApiError> {
        let builder = self.request(Method::DELETE, path, token)?;
        self.send_empty(builder).await
    }

    pub(crate) fn cache(&self) -> &Cache<CacheKey, CacheValue> {
        &self.inner.cache
    }

    /// Drop every cached catalog entry.
    pub async fn invalidate_catalog(&self) {
        self.inner.cache.invalidate_all();
        self.inner.cache.run_pending_tasks().await;
        debug!("Catalog cache invalidated");
    }

    /// Check whether the backend answers its health endpoint.
    pub async fn is_healthy(&self) -> bool {
        let Ok(url) = self.inner.origin.join("health") else {
            return false;
        };
        match self
            .inner
            .client
            .get(url)
            .timeout(HEALTH_TIMEOUT)
            .send()
            .await
        {
            Ok(response) => response.status() == StatusCode::OK,
            Err(e) => {
                tracing::warn!(error = %e, "Backend health check failed");
                false
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client(url: &str) -> BackendClient {
        BackendClient::new(&BackendConfig {
            base_url: Url::parse(url).unwrap(),
            timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    #[test]
    fn test_endpoint_joins_under_api_root() {
        let client = client("http://localhost:8000");
        assert_eq!(
            client.endpoint("products/7").unwrap().as_str(),
            "http://localhost:8000/api/v1/products/7"
        );
        assert_eq!(
            client.endpoint("/customer/orders").unwrap().as_str(),
            "http://localhost:8000/api/v1/customer/orders"
        );
    }

    #[test]
    fn test_endpoint_keeps_path_prefix() {
        let client = client("https://juicequ.id/backend");
        assert_eq!(
            client.endpoint("auth/login").unwrap().as_str(),
            "https://juicequ.id/backend/api/v1/auth/login"
        );
    }
}
