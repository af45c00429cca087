use crate::fetch::client::HttpClient;
use async_trait::async_trait;

/// An [`HttpClient`] wrapper that appends an API key as a URL query parameter.
///
/// NeoWs expects the key as `api_key`; see [`UrlParam::api_key`].
pub struct UrlParam<C> {
    pub inner: C,
    pub param_name: String,
    pub key: String,
}

impl<C> UrlParam<C> {
    pub fn api_key(inner: C, key: String) -> Self {
        Self {
            inner,
            param_name: "api_key".to_string(),
            key,
        }
    }
}

#[async_trait]
impl<C: HttpClient> HttpClient for UrlParam<C> {
    async fn execute(&self, mut req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        req.url_mut()
            .query_pairs_mut()
            .append_pair(&self.param_name, &self.key);
        self.inner.execute(req).await
    }
}
