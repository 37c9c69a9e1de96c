//! HTTP client facade for the bookstore backend with request ids, tracing
//! and response normalization.

use std::time::Duration;

use anyhow::Context;
use reqwest::Method;
use serde::{de::DeserializeOwned, Serialize};
use uuid::{Timestamp, Uuid};

pub mod envelope;
pub mod error;

pub use envelope::normalize_collection;
pub use error::ApiError;

/// Header carrying the per-request correlation id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Connection parameters for [`ApiClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Scheme, host and port of the backend, without a trailing slash.
    pub base_url: String,
    /// `None` leaves requests unbounded.
    pub request_timeout: Option<Duration>,
}

/// Thin JSON client over `reqwest`. Cloning is cheap and shares the
/// connection pool.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    client: reqwest::Client,
}

impl ApiClient {
    /// Build a client for the given backend
    pub fn new(config: &ClientConfig) -> anyhow::Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for an API path such as `/api/v1/books/`.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// GET a single JSON document.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.send(Method::GET, path, None::<&()>).await?;
        decode(path, response).await
    }

    /// GET a collection, accepting both bare and enveloped arrays.
    pub async fn get_collection<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<Vec<T>, ApiError> {
        let (request_id, response) = self.send(Method::GET, path, None::<&()>).await?;
        let body = response
            .bytes()
            .await
            .map_err(|source| ApiError::Transport {
                request_id,
                path: path.to_string(),
                source,
            })?;
        normalize_collection(path, &body)
    }

    /// POST a JSON body and decode the JSON answer.
    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.send(Method::POST, path, Some(body)).await?;
        decode(path, response).await
    }

    /// PUT a JSON body. Any body in the answer is ignored.
    pub async fn put<B>(&self, path: &str, body: &B) -> Result<(), ApiError>
    where
        B: Serialize + ?Sized,
    {
        self.send(Method::PUT, path, Some(body)).await?;
        Ok(())
    }

    /// DELETE a resource. Any body in the answer is ignored.
    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.send(Method::DELETE, path, None::<&()>).await?;
        Ok(())
    }

    async fn send<B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<(Uuid, reqwest::Response), ApiError>
    where
        B: Serialize + ?Sized,
    {
        let request_id = new_request_id();
        let url = self.url(path);

        let mut request = self
            .client
            .request(method.clone(), &url)
            .header(REQUEST_ID_HEADER, request_id.to_string());
        if let Some(body) = body {
            request = request.json(body);
        }

        tracing::debug!(%method, %url, %request_id, "sending request");

        let response = request.send().await.map_err(|source| {
            tracing::error!(%method, %url, %request_id, error = %source, "request failed");
            ApiError::Transport {
                request_id,
                path: path.to_string(),
                source,
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!(
                %method,
                %url,
                %request_id,
                status_code = status.as_u16(),
                "request returned non-success status"
            );
            return Err(ApiError::Status {
                request_id,
                method: method.to_string(),
                path: path.to_string(),
                status: status.as_u16(),
            });
        }

        tracing::info!(
            %method,
            %url,
            %request_id,
            status_code = status.as_u16(),
            "request completed"
        );
        Ok((request_id, response))
    }
}

async fn decode<T: DeserializeOwned>(
    path: &str,
    (request_id, response): (Uuid, reqwest::Response),
) -> Result<T, ApiError> {
    let body = response
        .bytes()
        .await
        .map_err(|source| ApiError::Transport {
            request_id,
            path: path.to_string(),
            source,
        })?;
    serde_json::from_slice(&body).map_err(|source| ApiError::Decode {
        path: path.to_string(),
        source,
    })
}

/// Time-ordered request id so log lines sort with the requests they describe.
fn new_request_id() -> Uuid {
    Uuid::new_v7(Timestamp::now(uuid::NoContext))
}
