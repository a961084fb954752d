//! Bearer-authenticated JSON client shared by the REST providers.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::CloudProviderError;

/// Default timeout for API requests.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// HTTP client carrying one bearer token.
#[derive(Clone)]
pub struct ApiClient {
    /// HTTP client.
    client: Client,
    /// Access token.
    access_token: String,
}

impl ApiClient {
    /// Create a client authenticating with `access_token`.
    ///
    /// # Errors
    /// Returns error if HTTP client cannot be created.
    pub fn new(access_token: impl Into<String>) -> Result<Self, CloudProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(CloudProviderError::Http)?;

        Ok(Self {
            client,
            access_token: access_token.into(),
        })
    }

    /// Make an authenticated GET request and parse the JSON body.
    pub async fn get<T: DeserializeOwned>(&self, url: &str) -> Result<T, CloudProviderError> {
        self.get_with_query(url, &[]).await
    }

    /// GET with encoded query parameters, parsing the JSON body.
    pub async fn get_with_query<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T, CloudProviderError> {
        let text = self.send_get(url, query).await?;
        parse(&text)
    }

    /// Make an authenticated GET request and return the raw body.
    pub async fn get_text(&self, url: &str) -> Result<String, CloudProviderError> {
        self.send_get(url, &[]).await
    }

    async fn send_get(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<String, CloudProviderError> {
        debug!(url = %url, "GET request");

        let mut request = self.client.get(url).bearer_auth(&self.access_token);
        if !query.is_empty() {
            request = request.query(query);
        }
        let response = request.send().await?;

        Self::handle_response(response).await
    }

    /// Make an authenticated POST request with an empty body.
    pub async fn post<T: DeserializeOwned>(&self, url: &str) -> Result<T, CloudProviderError> {
        debug!(url = %url, "POST request");

        let response = self
            .client
            .post(url)
            .bearer_auth(&self.access_token)
            .header("Content-Length", "0")
            .send()
            .await?;

        let text = Self::handle_response(response).await?;
        parse(&text)
    }

    /// Map non-success statuses to errors.
    async fn handle_response(response: reqwest::Response) -> Result<String, CloudProviderError> {
        let status = response.status();
        let text = response.text().await?;

        if status.is_success() {
            Ok(text)
        } else if status == StatusCode::NOT_FOUND {
            Err(CloudProviderError::NotFound(text))
        } else if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            Err(CloudProviderError::Auth(text))
        } else {
            Err(CloudProviderError::Api {
                status: status.as_u16(),
                message: text,
            })
        }
    }
}

fn parse<T: DeserializeOwned>(text: &str) -> Result<T, CloudProviderError> {
    serde_json::from_str(text).map_err(|e| {
        warn!(error = %e, "Failed to parse response");
        CloudProviderError::Serialization(e)
    })
}
