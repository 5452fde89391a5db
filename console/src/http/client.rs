//! HTTP client implementation

use std::time::Duration;

use openapi_client::models::ErrorResponse;
use reqwest::{header, Client, RequestBuilder};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, error};

use crate::errors::ConsoleError;

/// HTTP client for backend communication
pub struct HttpClient {
    client: Client,
    base_url: String,
}

impl HttpClient {
    /// Create a new HTTP client
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ConsoleError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Make a GET request
    pub async fn get<T: DeserializeOwned>(&self, path: &str, token: &str) -> Result<T, ConsoleError> {
        let url = self.url(path);
        debug!("GET {}", url);
        self.send("GET", self.client.get(&url), token).await
    }

    /// Make a POST request with a JSON body
    pub async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        token: &str,
        body: &B,
    ) -> Result<T, ConsoleError> {
        let url = self.url(path);
        debug!("POST {}", url);
        self.send("POST", self.client.post(&url).json(body), token).await
    }

    /// Make a POST request without a body
    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str, token: &str) -> Result<T, ConsoleError> {
        let url = self.url(path);
        debug!("POST {}", url);
        self.send("POST", self.client.post(&url), token).await
    }

    /// Make a DELETE request
    pub async fn delete<T: DeserializeOwned>(&self, path: &str, token: &str) -> Result<T, ConsoleError> {
        let url = self.url(path);
        debug!("DELETE {}", url);
        self.send("DELETE", self.client.delete(&url), token).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: &str,
        request: RequestBuilder,
        token: &str,
    ) -> Result<T, ConsoleError> {
        let response = request
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .header(header::CONTENT_TYPE, "application/json")
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = rejection_message(&body);
            error!("HTTP {} failed: {} - {}", method, status, message);
            return Err(ConsoleError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        // acknowledgements may come back without a payload
        if body.trim().is_empty() {
            return Ok(serde_json::from_value(serde_json::Value::Null)?);
        }
        Ok(serde_json::from_str(&body)?)
    }
}

/// Message of a non-success response body
pub fn rejection_message(body: &str) -> String {
    serde_json::from_str::<ErrorResponse>(body)
        .map(|e| e.message())
        .unwrap_or_else(|_| "An error occurred".to_string())
}
