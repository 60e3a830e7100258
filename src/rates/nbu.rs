//! HTTP client for the National Bank of Ukraine exchange rate service.

use async_trait::async_trait;
use http_body_util::{BodyExt, Empty};
use hyper::body::Bytes;
use tracing::debug;

use crate::core::Currency;

use super::{quote_day, RateError, RateQuote, RateSource};

/// Connector type used by the rate client.
pub type HyperConnector =
    hyper_rustls::HttpsConnector<hyper_util::client::legacy::connect::HttpConnector>;
/// Client type used by the rate client.
pub type HyperClient = hyper_util::client::legacy::Client<HyperConnector, Empty<Bytes>>;

const DEFAULT_BASE_URL: &str = "https://bank.gov.ua";

/// Rate source backed by the NBU statistics endpoint.
///
/// Issues `GET {base}/NBUStatService/v1/statdirectory/exchange` with a
/// three-letter uppercase currency code and the quote day, and expects a
/// JSON array of quotes. An empty array maps to [`RateError::NotFound`], a
/// non-2xx status to [`RateError::Unavailable`].
pub struct NbuClient {
    client: HyperClient,
    base_url: String,
}

impl NbuClient {
    /// Creates a client against the production NBU endpoint.
    pub fn new() -> Result<Self, RateError> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Creates a client against a custom base URL, e.g. a test server.
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, RateError> {
        let connector: HyperConnector = hyper_rustls::HttpsConnectorBuilder::new()
            .with_native_roots()
            .map_err(|e| RateError::Unavailable(e.to_string()))?
            .https_or_http()
            .enable_http1()
            .build();
        let client: HyperClient =
            hyper_util::client::legacy::Client::builder(hyper_util::rt::TokioExecutor::new())
                .build(connector);
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Ok(Self { client, base_url })
    }
}

#[async_trait]
impl RateSource for NbuClient {
    async fn quote(&self, currency: Currency) -> Result<RateQuote, RateError> {
        let url = format!(
            "{}/NBUStatService/v1/statdirectory/exchange?valcode={}&date={}&json",
            self.base_url,
            currency.code(),
            quote_day().format("%Y%m%d"),
        );
        debug!(url = %url, "requesting exchange rate");
        let uri: hyper::Uri = url
            .parse()
            .map_err(|e: hyper::http::uri::InvalidUri| RateError::InvalidResponse(e.to_string()))?;
        let response = self
            .client
            .get(uri)
            .await
            .map_err(|e| RateError::Unavailable(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(RateError::Unavailable(format!("status {status}")));
        }
        let body = response
            .into_body()
            .collect()
            .await
            .map_err(|e| RateError::Unavailable(e.to_string()))?
            .to_bytes();
        let quotes: Vec<RateQuote> = serde_json::from_slice(&body)
            .map_err(|e| RateError::InvalidResponse(e.to_string()))?;
        quotes.into_iter().next().ok_or(RateError::NotFound)
    }
}
