//! reqwest implementation of `NewsBackend`.

use async_trait::async_trait;
use reqwest::{Client as HttpClient, Response};
use url::Url;

use crate::client::{NewsBackend, ViewedMutation};
use crate::dashboard::BindingEntry;
use crate::error::{ClientError, ClientResult};
use crate::models::Repository;

#[derive(Debug, Clone)]
pub struct HttpBackend {
    http_client: HttpClient,
    base_url: Url,
}

impl HttpBackend {
    /// Endpoints resolve below `base_url`, so a path prefix such as
    /// `http://host/news` is kept.
    pub fn new(http_client: HttpClient, mut base_url: Url) -> Self {
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Self {
            http_client,
            base_url,
        }
    }

    /// Create a backend from a base URL string such as `http://127.0.0.1:3002`
    pub fn from_url(base_url: &str) -> ClientResult<Self> {
        let http_client = HttpClient::builder()
            .user_agent(concat!("commit-news/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::new(http_client, Url::parse(base_url)?))
    }

    fn endpoint(&self, path: &str) -> ClientResult<Url> {
        Ok(self.base_url.join(path)?)
    }

    async fn ensure_ok(response: Response) -> ClientResult<Response> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(ClientError::Status { status, body })
        }
    }
}

#[async_trait]
impl NewsBackend for HttpBackend {
    async fn fetch_news(&self) -> ClientResult<Vec<Repository>> {
        let url = self.endpoint("api/news")?;
        let response = self.http_client.get(url).send().await?;
        let text = Self::ensure_ok(response).await?.text().await?;
        serde_json::from_str(&text).map_err(ClientError::from)
    }

    async fn send_viewed(&self, mutation: ViewedMutation, target: &BindingEntry) -> ClientResult<()> {
        let url = self.endpoint("api/viewed")?;
        let response = self
            .http_client
            .request(mutation.method(), url)
            .query(target)
            .send()
            .await?;
        Self::ensure_ok(response).await?;
        Ok(())
    }
}
