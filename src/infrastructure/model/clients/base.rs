//! Base HTTP client with shared logic

use crate::infrastructure::model::types::ProviderError;
use reqwest::{Client, RequestBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Base HTTP client with shared functionality.
///
/// The API key is guaranteed non-empty by the adapter constructors.
#[derive(Clone)]
pub struct HttpClientBase {
    pub id: &'static str,
    pub endpoint: String,
    pub api_key: String,
    pub http: Client,
}

impl HttpClientBase {
    pub fn new(id: &'static str, endpoint: String, api_key: String) -> Self {
        Self {
            id,
            endpoint,
            api_key,
            http: Client::new(),
        }
    }

    /// Build URL from endpoint and path
    pub fn build_url(&self, path: &str) -> String {
        let base = self.endpoint.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{base}/{path}")
    }

    /// GET JSON with bearer auth
    pub async fn get_with_bearer<Res>(&self, url: &str) -> Result<Res, ProviderError>
    where
        Res: DeserializeOwned,
    {
        let request = self
            .http
            .get(url)
            .header("Authorization", format!("Bearer {}", self.api_key));
        self.execute(request).await
    }

    /// Post JSON with bearer auth
    pub async fn post_with_bearer<Req, Res>(&self, url: &str, body: &Req) -> Result<Res, ProviderError>
    where
        Req: Serialize,
        Res: DeserializeOwned,
    {
        let request = self
            .http
            .post(url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(body);
        self.execute(request).await
    }

    /// GET JSON with query param auth (for Gemini)
    pub async fn get_with_query_key<Res>(&self, url: &str) -> Result<Res, ProviderError>
    where
        Res: DeserializeOwned,
    {
        let request = self.http.get(url).query(&[("key", self.api_key.as_str())]);
        self.execute(request).await
    }

    /// Post JSON with query param auth (for Gemini)
    pub async fn post_with_query_key<Req, Res>(
        &self,
        url: &str,
        body: &Req,
    ) -> Result<Res, ProviderError>
    where
        Req: Serialize,
        Res: DeserializeOwned,
    {
        let request = self
            .http
            .post(url)
            .query(&[("key", self.api_key.as_str())])
            .json(body);
        self.execute(request).await
    }

    /// Run a prepared request and decode its JSON body, mapping transport
    /// and status failures onto the provider error taxonomy.
    pub async fn execute<Res>(&self, request: RequestBuilder) -> Result<Res, ProviderError>
    where
        Res: DeserializeOwned,
    {
        request
            .send()
            .await
            .map_err(|e| ProviderError::network(self.id, e))?
            .error_for_status()
            .map_err(|e| ProviderError::network(self.id, e))?
            .json()
            .await
            .map_err(|e| ProviderError::network(self.id, e))
    }
}
