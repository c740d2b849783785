//! Common utilities for the DigitalOcean API client
//!
//! Authenticated request helpers and pagination shared by all API calls.

use crate::error::DigitalOceanError;
use crate::models::DropletListResponse;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

/// A list response that may point at a further page
pub trait Paginated {
    /// Item type carried by a page
    type Item;

    /// Split a page into its items and the URL of the next page
    fn into_page(self) -> (Vec<Self::Item>, Option<String>);
}

impl Paginated for DropletListResponse {
    type Item = crate::models::Droplet;

    fn into_page(self) -> (Vec<Self::Item>, Option<String>) {
        let next = self.links.and_then(|links| links.pages).and_then(|pages| pages.next);
        (self.droplets, next)
    }
}

/// HTTP client wrapper with bearer authentication
#[derive(Debug)]
pub struct HttpClient {
    client: Client,
    base_url: String,
    token: String,
}

impl HttpClient {
    /// Create a new HTTP client wrapper
    pub fn new(client: Client, base_url: String, token: String) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build a full URL from a path
    pub fn build_url(&self, path: &str) -> String {
        if path.starts_with("http") {
            path.to_string()
        } else {
            format!("{}{}", self.base_url, path)
        }
    }

    /// Get authorization header value
    fn auth_header(&self) -> String {
        format!("Bearer {}", self.token)
    }

    /// Fetch every page of a paginated list
    pub async fn fetch_all_pages<P>(&self, path: &str) -> Result<Vec<P::Item>, DigitalOceanError>
    where
        P: Paginated + DeserializeOwned,
    {
        let mut all_results = Vec::new();
        let mut url = self.build_url(path);

        loop {
            debug!("Fetching page: {}", url);
            let page: P = self.get(&url).await?;
            let (items, next) = page.into_page();
            all_results.extend(items);

            match next {
                Some(next_url) => url = self.build_url(&next_url),
                None => break,
            }
        }

        Ok(all_results)
    }

    /// Make a GET request
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, DigitalOceanError> {
        let url = self.build_url(path);
        debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .header("Authorization", self.auth_header())
            .header("Accept", "application/json")
            .send()
            .await?;

        Self::handle_response(path, response).await
    }

    /// Make a POST request
    pub async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, DigitalOceanError> {
        let url = self.build_url(path);
        debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .header("Authorization", self.auth_header())
            .header("Accept", "application/json")
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await?;

        Self::handle_response(path, response).await
    }

    /// Make a DELETE request
    pub async fn delete(&self, path: &str) -> Result<(), DigitalOceanError> {
        let url = self.build_url(path);
        debug!("DELETE {}", url);

        let response = self
            .client
            .delete(&url)
            .header("Authorization", self.auth_header())
            .send()
            .await?;

        let status = response.status();
        if status.is_success() || status == StatusCode::NO_CONTENT {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(Self::status_error(path, status, body))
    }

    /// Turn a response into a parsed body or a typed error
    async fn handle_response<T: DeserializeOwned>(
        path: &str,
        response: reqwest::Response,
    ) -> Result<T, DigitalOceanError> {
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(Self::status_error(path, status, text));
        }

        serde_json::from_str(&text).map_err(|e| {
            warn!(
                error = %e,
                body = %text.chars().take(500).collect::<String>(),
                "Failed to parse response"
            );
            DigitalOceanError::Serialization(e)
        })
    }

    fn status_error(path: &str, status: StatusCode, body: String) -> DigitalOceanError {
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                DigitalOceanError::Authentication(format!("{status} - {body}"))
            }
            StatusCode::NOT_FOUND => {
                DigitalOceanError::NotFound(format!("Resource not found: {path} - {body}"))
            }
            _ => DigitalOceanError::Api {
                status: status.as_u16(),
                message: body,
            },
        }
    }

    /// Build query string from filters
    pub fn build_query_string(filters: &[(&str, &str)]) -> String {
        filters
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }
}
