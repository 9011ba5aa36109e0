use async_trait::async_trait;

use super::{CategoryFetcher, FetchError};
use crate::models::CategoryListResponse;
use crate::query::ListParams;

/// Fetches the category list from a running service over HTTP.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    base_url: String,
}

impl HttpFetcher {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        HttpFetcher {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn list_url(&self) -> String {
        format!("{}/categories", self.base_url)
    }

    /// `GET /categories` carrying the full query as a querystring.
    pub fn list_request(&self, params: &ListParams) -> reqwest::RequestBuilder {
        self.client.get(self.list_url()).query(params)
    }
}

#[async_trait]
impl CategoryFetcher for HttpFetcher {
    async fn fetch(&self, params: &ListParams) -> Result<CategoryListResponse, FetchError> {
        let response = self.list_request(params).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        Ok(response.json::<CategoryListResponse>().await?)
    }
}
