//! HTTP wrapper shared by every console screen.
//!
//! Every request carries an `x-request-id` and, once signed in, a bearer
//! token. Non-2xx responses become [`ApiError::Api`] with the server's
//! message and field errors already parsed.

use std::sync::Arc;
use std::time::Duration;

use clubdesk_core::form::ServerErrorBody;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::cache::QueryCache;
use crate::config::ClientConfig;
use crate::error::{ApiError, ApiResult};

/// Header carrying the per-request correlation id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// HTTP client bound to one API base URL.
///
/// Cloning is cheap; clones share the connection pool and the query cache.
#[derive(Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
    cache: Arc<QueryCache>,
}

impl ApiClient {
    /// Build a client from configuration, applying the request timeout.
    pub fn new(config: &ClientConfig) -> ApiResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self::with_client(client, config.base_url.clone()))
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, base_url: String) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
            cache: Arc::new(QueryCache::new()),
        }
    }

    /// Attach (or clear) the bearer token sent with every request.
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Query cache shared by all clones of this client.
    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    // ---- verbs ----

    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(String, String)],
    ) -> ApiResult<T> {
        let builder = self.request(Method::GET, path).query(params);
        let response = self.send(Method::GET, path, builder).await?;
        Self::parse_response(response).await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send_json(Method::POST, path, body).await
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send_json(Method::PUT, path, body).await
    }

    pub async fn patch<B, T>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send_json(Method::PATCH, path, body).await
    }

    /// `DELETE`, discarding whatever body the server sends back.
    pub async fn delete(&self, path: &str) -> ApiResult<()> {
        let builder = self.request(Method::DELETE, path);
        self.send(Method::DELETE, path, builder).await?;
        Ok(())
    }

    /// `POST` with no body, discarding the response body.
    pub async fn post_empty(&self, path: &str) -> ApiResult<()> {
        let builder = self.request(Method::POST, path);
        self.send(Method::POST, path, builder).await?;
        Ok(())
    }

    /// `GET` a binary document such as an export file.
    pub async fn download(&self, path: &str, params: &[(String, String)]) -> ApiResult<Vec<u8>> {
        let builder = self.request(Method::GET, path).query(params);
        let response = self.send(Method::GET, path, builder).await?;
        Ok(response.bytes().await?.to_vec())
    }

    /// `POST` a single file as `multipart/form-data`.
    pub async fn upload<T: DeserializeOwned>(
        &self,
        path: &str,
        field: &str,
        file_name: &str,
        bytes: Vec<u8>,
        mime: &str,
    ) -> ApiResult<T> {
        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(mime)?;
        let form = reqwest::multipart::Form::new().part(field.to_string(), part);
        let builder = self.request(Method::POST, path).multipart(form);
        let response = self.send(Method::POST, path, builder).await?;
        Self::parse_response(response).await
    }

    // ---- private helpers ----

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let builder = self.client.request(method, self.url(path));
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send_json<B, T>(&self, method: Method, path: &str, body: &B) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let builder = self.request(method.clone(), path).json(body);
        let response = self.send(method, path, builder).await?;
        Self::parse_response(response).await
    }

    /// Stamp a request id, send, and fail on non-2xx.
    async fn send(
        &self,
        method: Method,
        path: &str,
        builder: reqwest::RequestBuilder,
    ) -> ApiResult<reqwest::Response> {
        let request_id = Uuid::new_v4().to_string();
        tracing::debug!(%method, path, %request_id, "Sending API request");

        let response = builder
            .header(REQUEST_ID_HEADER, &request_id)
            .send()
            .await
            .inspect_err(|e| {
                tracing::warn!(%method, path, %request_id, error = %e, "API request failed");
            })?;

        let status = response.status();
        tracing::debug!(%method, path, %request_id, status = status.as_u16(), "API response");
        Self::ensure_success(response).await
    }

    /// Return the response unchanged on success, or an [`ApiError::Api`]
    /// carrying the parsed error body.
    async fn ensure_success(response: reqwest::Response) -> ApiResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let text = response.text().await.unwrap_or_default();
        let body = serde_json::from_str::<Value>(&text)
            .map(|value| ServerErrorBody::parse(&value))
            .unwrap_or_default();
        let trimmed = text.trim();
        let message = body.message.unwrap_or_else(|| {
            if trimmed.is_empty() || trimmed.starts_with('{') {
                status
                    .canonical_reason()
                    .unwrap_or("Request failed")
                    .to_string()
            } else {
                trimmed.to_string()
            }
        });
        tracing::warn!(
            status = status.as_u16(),
            %message,
            field_errors = body.field_errors.len(),
            "API rejected request",
        );
        Err(ApiError::Api {
            status: status.as_u16(),
            message,
            field_errors: body.field_errors,
        })
    }

    /// Decode a 2xx JSON body, unwrapping a `{ "data": ... }` envelope
    /// when the payload itself does not match.
    async fn parse_response<T: DeserializeOwned>(response: reqwest::Response) -> ApiResult<T> {
        let bytes = response.bytes().await?;
        let value: Value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)?
        };
        decode_payload(value)
    }
}

/// Decode a JSON payload, falling back to its `data` member.
pub(crate) fn decode_payload<T: DeserializeOwned>(value: Value) -> ApiResult<T> {
    match serde_json::from_value::<T>(value.clone()) {
        Ok(decoded) => Ok(decoded),
        Err(err) => match value {
            Value::Object(mut map) if map.contains_key("data") => {
                let inner = map.remove("data").unwrap_or(Value::Null);
                Ok(serde_json::from_value(inner)?)
            }
            _ => Err(ApiError::Decode(err)),
        },
    }
}
