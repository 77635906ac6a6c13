use serde_json::Value;
use std::time::Duration;

use super::error::Result;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Sends one JSON body to an endpoint and returns the decoded JSON reply.
pub trait Transport: Send + Sync {
    fn post(&self, url: &str, body: &Value) -> Result<Value>;
}

/// Blocking HTTP POST transport.
pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    fn post(&self, url: &str, body: &Value) -> Result<Value> {
        let response = self
            .client
            .post(url)
            .json(body)
            .send()?
            .error_for_status()?;
        Ok(response.json::<Value>()?)
    }
}
