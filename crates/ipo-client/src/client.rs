//! HTTP client for the IPO Tracker API.

use crate::error::Error;
use crate::types::*;
use reqwest::{Client, Method, RequestBuilder};
use serde::Serialize;
use std::time::Duration;
use url::Url;

#[cfg(test)]
mod tests;

/// Header carrying the API key.
pub const API_KEY_HEADER: &str = "X-API-Key";

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the API (e.g., "http://localhost:8080").
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
    /// API key sent with every request, if any.
    pub api_key: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            timeout: Duration::from_secs(30),
            api_key: None,
        }
    }
}

/// HTTP client for the IPO Tracker API.
#[derive(Debug, Clone)]
pub struct IpoClient {
    client: Client,
    base_url: Url,
    api_key: Option<String>,
}

impl IpoClient {
    /// Creates a new client with the given configuration.
    ///
    /// # Errors
    /// Returns error if the base URL is invalid or the HTTP client cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self, Error> {
        let client = Client::builder().timeout(config.timeout).build()?;
        let base_url = Url::parse(&format!("{}/", config.base_url.trim_end_matches('/')))?;

        Ok(Self {
            client,
            base_url,
            api_key: config.api_key,
        })
    }

    /// Creates a new anonymous client with default configuration.
    ///
    /// # Errors
    /// Returns error if the base URL is invalid or the HTTP client cannot be built.
    pub fn with_base_url(base_url: &str) -> Result<Self, Error> {
        Self::new(ClientConfig {
            base_url: base_url.to_string(),
            ..Default::default()
        })
    }

    /// Returns a copy of this client that sends `api_key`.
    #[must_use]
    pub fn with_api_key(&self, api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            ..self.clone()
        }
    }

    /// Resolves an API path against the base URL.
    ///
    /// # Errors
    /// Returns error if the path cannot be joined.
    pub fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, Error> {
        let mut builder = self.client.request(method, self.url(path)?);
        if let Some(key) = &self.api_key {
            builder = builder.header(API_KEY_HEADER, key);
        }
        Ok(builder)
    }

    fn with_query<Q: Serialize>(path: &str, query: &Q) -> Result<String, Error> {
        let params = serde_urlencoded::to_string(query)
            .map_err(|e| Error::InvalidRequest(e.to_string()))?;
        Ok(if params.is_empty() {
            path.to_string()
        } else {
            format!("{path}?{params}")
        })
    }

    // ========================================================================
    // Health
    // ========================================================================

    /// Performs a health check.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn health_check(&self) -> Result<HealthResponse, Error> {
        let resp = self.request(Method::GET, "health")?.send().await?;
        self.handle_response(resp).await
    }

    // ========================================================================
    // Companies
    // ========================================================================

    /// Lists companies.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn list_companies(&self, filter: &CompanyFilter) -> Result<Vec<Company>, Error> {
        let path = Self::with_query("companies/", filter)?;
        let resp = self.request(Method::GET, &path)?.send().await?;
        self.handle_response(resp).await
    }

    /// Gets a company by id.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn get_company(&self, id: i64) -> Result<Company, Error> {
        let resp = self
            .request(Method::GET, &format!("companies/{id}/"))?
            .send()
            .await?;
        self.handle_response(resp).await
    }

    /// Creates a company.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn create_company(&self, request: &CompanyRequest) -> Result<Company, Error> {
        let resp = self
            .request(Method::POST, "companies/")?
            .json(request)
            .send()
            .await?;
        self.handle_response(resp).await
    }

    /// Replaces a company.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn update_company(
        &self,
        id: i64,
        request: &CompanyRequest,
    ) -> Result<Company, Error> {
        let resp = self
            .request(Method::PUT, &format!("companies/{id}/"))?
            .json(request)
            .send()
            .await?;
        self.handle_response(resp).await
    }

    /// Partially updates a company.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn patch_company(&self, id: i64, request: &CompanyRequest) -> Result<Company, Error> {
        let resp = self
            .request(Method::PATCH, &format!("companies/{id}/"))?
            .json(request)
            .send()
            .await?;
        self.handle_response(resp).await
    }

    /// Deletes a company and its IPOs.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn delete_company(&self, id: i64) -> Result<(), Error> {
        let resp = self
            .request(Method::DELETE, &format!("companies/{id}/"))?
            .send()
            .await?;
        self.handle_empty_response(resp).await
    }

    // ========================================================================
    // IPOs
    // ========================================================================

    /// Lists IPOs matching the filter.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn list_ipos(&self, filter: &IpoFilter) -> Result<Vec<Ipo>, Error> {
        let path = Self::with_query("ipos/", filter)?;
        let resp = self.request(Method::GET, &path)?.send().await?;
        self.handle_response(resp).await
    }

    /// Gets an IPO by id.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn get_ipo(&self, id: i64) -> Result<Ipo, Error> {
        let resp = self
            .request(Method::GET, &format!("ipos/{id}/"))?
            .send()
            .await?;
        self.handle_response(resp).await
    }

    /// Creates an IPO.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn create_ipo(&self, request: &IpoRequest) -> Result<Ipo, Error> {
        let resp = self
            .request(Method::POST, "ipos/")?
            .json(request)
            .send()
            .await?;
        self.handle_response(resp).await
    }

    /// Replaces an IPO.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn update_ipo(&self, id: i64, request: &IpoRequest) -> Result<Ipo, Error> {
        let resp = self
            .request(Method::PUT, &format!("ipos/{id}/"))?
            .json(request)
            .send()
            .await?;
        self.handle_response(resp).await
    }

    /// Partially updates an IPO.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn patch_ipo(&self, id: i64, request: &IpoRequest) -> Result<Ipo, Error> {
        let resp = self
            .request(Method::PATCH, &format!("ipos/{id}/"))?
            .json(request)
            .send()
            .await?;
        self.handle_response(resp).await
    }

    /// Deletes an IPO.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn delete_ipo(&self, id: i64) -> Result<(), Error> {
        let resp = self
            .request(Method::DELETE, &format!("ipos/{id}/"))?
            .send()
            .await?;
        self.handle_empty_response(resp).await
    }

    // ========================================================================
    // Profiles
    // ========================================================================

    /// Lists the profiles visible to this client's key.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn list_profiles(&self) -> Result<Vec<Profile>, Error> {
        let resp = self.request(Method::GET, "profiles/")?.send().await?;
        self.handle_response(resp).await
    }

    /// Gets a visible profile.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn get_profile(&self, id: i64) -> Result<Profile, Error> {
        let resp = self
            .request(Method::GET, &format!("profiles/{id}/"))?
            .send()
            .await?;
        self.handle_response(resp).await
    }

    // ========================================================================
    // Helper Methods
    // ========================================================================

    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, Error> {
        if resp.status().is_success() {
            Ok(resp.json().await?)
        } else {
            Err(Self::error_from(resp).await)
        }
    }

    async fn handle_empty_response(&self, resp: reqwest::Response) -> Result<(), Error> {
        if resp.status().is_success() {
            Ok(())
        } else {
            Err(Self::error_from(resp).await)
        }
    }

    async fn error_from(resp: reqwest::Response) -> Error {
        let status = resp.status().as_u16();
        let text = resp.text().await.unwrap_or_default();
        Self::api_error(status, &text)
    }

    fn api_error(status: u16, text: &str) -> Error {
        let (code, message) = match serde_json::from_str::<ErrorBody>(text) {
            Ok(body) => (body.code, body.error),
            Err(_) => (String::new(), text.to_string()),
        };
        if status == 404 {
            Error::NotFound(message)
        } else {
            Error::Api {
                status,
                code,
                message,
            }
        }
    }
}
