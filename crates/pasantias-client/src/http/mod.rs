//! REST implementation of the backend traits.

pub mod applications;
pub mod catalogs;
pub mod notifications;
pub mod offers;

use std::sync::Arc;

use reqwest::{Method, StatusCode, Url};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use pasantias_core::AppError;
use pasantias_core::config::api::ApiConfig;
use pasantias_core::error::ErrorKind;
use pasantias_core::result::AppResult;

use crate::token::TokenStore;

pub use applications::ApplicationsApi;
pub use catalogs::CatalogsApi;
pub use notifications::NotificationsApi;
pub use offers::OffersApi;

/// Shared HTTP plumbing: base URL, bearer token, timeouts, error mapping.
///
/// Cloning is cheap; every clone shares the connection pool and the
/// token store.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    tokens: Arc<TokenStore>,
}

impl ApiClient {
    /// Build a client from the `[api]` configuration section.
    pub fn new(config: &ApiConfig, tokens: Arc<TokenStore>) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .connect_timeout(config.connect_timeout())
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Configuration,
                    format!("Failed to build HTTP client: {e}"),
                    e,
                )
            })?;

        let base_url = config.base_url.trim_end_matches('/').to_string();
        Url::parse(&base_url).map_err(|e| {
            AppError::configuration(format!("Invalid api.base_url '{}': {e}", config.base_url))
        })?;

        Ok(Self {
            http,
            base_url,
            tokens,
        })
    }

    /// The token store shared by every request of this client.
    pub fn tokens(&self) -> &Arc<TokenStore> {
        &self.tokens
    }

    /// `GET path?query`.
    pub async fn get(&self, path: &str, query: &[(&str, String)]) -> AppResult<Value> {
        let url = self.url(path, query)?;
        self.execute(Method::GET, url, None).await
    }

    /// `POST path` with a JSON body.
    pub async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> AppResult<Value> {
        let url = self.url(path, &[])?;
        self.execute(Method::POST, url, Some(serde_json::to_value(body)?))
            .await
    }

    /// `PUT path` without a body.
    pub async fn put(&self, path: &str) -> AppResult<Value> {
        let url = self.url(path, &[])?;
        self.execute(Method::PUT, url, None).await
    }

    /// `PUT path` with a JSON body.
    pub async fn put_json<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> AppResult<Value> {
        let url = self.url(path, &[])?;
        self.execute(Method::PUT, url, Some(serde_json::to_value(body)?))
            .await
    }

    /// `DELETE path`.
    pub async fn delete(&self, path: &str) -> AppResult<()> {
        let url = self.url(path, &[])?;
        self.execute(Method::DELETE, url, None).await.map(|_| ())
    }

    fn url(&self, path: &str, query: &[(&str, String)]) -> AppResult<Url> {
        let mut url = Url::parse(&format!("{}/{}", self.base_url, path.trim_start_matches('/')))
            .map_err(|e| AppError::internal(format!("Invalid request path '{path}': {e}")))?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    async fn execute(&self, method: Method, url: Url, body: Option<Value>) -> AppResult<Value> {
        debug!(method = %method, path = %url.path(), query = url.query().unwrap_or(""), "Sending request");

        let mut request = self.http.request(method.clone(), url.clone());
        if let Some(token) = self.tokens.get() {
            request = request.bearer_auth(token);
        }
        if let Some(body) = &body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            warn!(method = %method, path = %url.path(), error = %e, "Request failed");
            AppError::from(e)
        })?;

        let status = response.status();
        let text = response.text().await?;

        if status.is_success() {
            if text.trim().is_empty() {
                return Ok(Value::Null);
            }
            return Ok(serde_json::from_str(&text)?);
        }

        let message = error_message(status, &text);
        if status == StatusCode::UNAUTHORIZED {
            warn!(path = %url.path(), "Backend rejected the session token");
            self.tokens.clear();
        } else {
            warn!(
                method = %method,
                path = %url.path(),
                status = status.as_u16(),
                message = %message,
                "Backend returned an error"
            );
        }
        Err(AppError::from_status(status.as_u16(), message))
    }
}

/// Extract the server's message from an error body, verbatim.
fn error_message(status: StatusCode, body: &str) -> String {
    let from_json = serde_json::from_str::<Value>(body).ok().and_then(|value| {
        ["message", "error"].iter().find_map(|key| match value.get(*key) {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Object(inner)) => inner
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string),
            _ => None,
        })
    });

    from_json
        .or_else(|| {
            let trimmed = body.trim();
            (!trimmed.is_empty() && !trimmed.starts_with('{')).then(|| trimmed.to_string())
        })
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Request failed")
                .to_string()
        })
}
