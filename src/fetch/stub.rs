//! Canned [`HttpClient`] for tests.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use super::client::HttpClient;

pub const WORKED_EXAMPLE: &str = include_str!("../../tests/fixtures/worked_example.json");

pub struct StubClient {
    status: u16,
    body: String,
    delay: Option<Duration>,
    requested: Mutex<Vec<String>>,
}

impl StubClient {
    pub fn new(status: u16, body: &str) -> Self {
        Self {
            status,
            body: body.to_string(),
            delay: None,
            requested: Mutex::new(Vec::new()),
        }
    }

    pub fn ok(body: &str) -> Self {
        Self::new(200, body)
    }

    /// Holds the first response back by `delay`.
    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpClient for StubClient {
    async fn execute(&self, req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        let count = {
            let mut requested = self.requested.lock().unwrap();
            requested.push(req.url().to_string());
            requested.len()
        };
        // Only the first request is slow, so a later one can overtake it.
        if let (Some(delay), 1) = (self.delay, count) {
            tokio::time::sleep(delay).await;
        }
        let resp = http::Response::builder()
            .status(self.status)
            .body(self.body.clone())
            .unwrap();
        Ok(resp.into())
    }
}
