use std::time::Duration;

use reqwest::Client;
use tracing::debug;

use super::document::parse_status_document;
use super::error::WpsError;
use super::request::{Input, RequestedOutput, build_execute_request};
use super::types::Execution;

/// Something that can retrieve the raw bytes behind a status-location URL.
#[allow(async_fn_in_trait)]
pub trait Fetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, WpsError>;
}

impl<T: Fetcher> Fetcher for &T {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, WpsError> {
        (**self).fetch(url).await
    }
}

/// Transport settings for a [`WpsClient`].
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Verify the server's TLS certificate. Status locations on test servers
    /// are commonly self-signed, so polling runs with this off.
    pub verify_tls: bool,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            verify_tls: false,
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(60),
        }
    }
}

pub struct WpsClient {
    endpoint: String,
    client: Client,
}

impl WpsClient {
    pub fn new(endpoint: impl Into<String>, options: &ClientOptions) -> Result<Self, WpsError> {
        let client = Client::builder()
            .connect_timeout(options.connect_timeout)
            .timeout(options.request_timeout)
            .danger_accept_invalid_certs(!options.verify_tls)
            .build()?;
        Ok(Self {
            endpoint: endpoint.into(),
            client,
        })
    }

    /// Submit an asynchronous process execution.
    ///
    /// Returns the execution as described by the server's first response. A
    /// non-terminal response must carry a `statusLocation`.
    pub async fn execute(
        &self,
        identifier: &str,
        inputs: &[Input],
        outputs: &[RequestedOutput],
    ) -> Result<Execution, WpsError> {
        let body = build_execute_request(identifier, inputs, outputs);
        debug!(endpoint = %self.endpoint, identifier, "posting Execute request");

        let response = self
            .client
            .post(&self.endpoint)
            .header("content-type", "text/xml; charset=utf-8")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(WpsError::HttpStatus {
                status: status.as_u16(),
                url: self.endpoint.clone(),
            });
        }

        let bytes = response.bytes().await?;
        let document = parse_status_document(&String::from_utf8_lossy(&bytes))?;
        let status_location = match (&document.status_location, document.status.is_terminal()) {
            (Some(location), _) => location.clone(),
            (None, true) => String::new(),
            (None, false) => return Err(WpsError::MissingStatusLocation),
        };
        Ok(Execution::new(status_location, document))
    }
}

impl Fetcher for WpsClient {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, WpsError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(WpsError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(response.bytes().await?.to_vec())
    }
}
