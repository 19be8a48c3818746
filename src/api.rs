use async_trait::async_trait;
use bytes::Bytes;
use prost::Message;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, USER_AGENT};
use tokio::sync::Mutex;

use crate::config::{FeedConfig, CLIENT_HEADER_NAME};
use crate::error::{ConfigError, FeedError};
use crate::gtfs_realtime::FeedMessage;
use crate::models::{CaptureLabel, CaptureStatus};
use crate::normalize::RawVehicleRecord;
use crate::rate_limit::RateLimiter;

const PROTOBUF_CONTENT_TYPE: &str = "application/x-protobuf";

/// Something that yields one batch of raw vehicle records per call.
///
/// Implementations never fail: errors are reported through the label.
#[async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch(&self) -> (Vec<RawVehicleRecord>, CaptureLabel);
}

/// GTFS-RT vehicle positions client for the Digitraffic train feed
pub struct FeedClient {
    client: reqwest::Client,
    url: String,
    limiter: Mutex<RateLimiter>,
}

impl FeedClient {
    /// Create a new GTFS-RT client with the fixed Digitraffic headers
    pub fn new(config: &FeedConfig) -> Result<Self, ConfigError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(PROTOBUF_CONTENT_TYPE));
        headers.insert(USER_AGENT, header_value(USER_AGENT.as_str(), &config.user_agent)?);
        headers.insert(
            HeaderName::from_static("digitraffic-user"),
            header_value(CLIENT_HEADER_NAME, &config.client_header_value)?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .connect_timeout(config.timeout)
            .build()
            .map_err(ConfigError::Client)?;

        Ok(Self {
            client,
            url: config.url.clone(),
            limiter: Mutex::new(RateLimiter::new(config.min_interval)),
        })
    }

    /// Fetch the raw feed body
    async fn fetch_body(&self) -> Result<Bytes, FeedError> {
        tracing::debug!(url = %self.url, "Fetching train locations");

        let response = self.client.get(&self.url).send().await?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(FeedError::HttpStatus {
                code: status.as_u16(),
            });
        }

        let bytes = response.bytes().await?;
        tracing::debug!(bytes = bytes.len(), "Received data from API");
        Ok(bytes)
    }

    /// Issue one rate-limited request and decode the vehicle records.
    ///
    /// Only a 200 response counts as a success for rate limiting, even if
    /// its body then fails to decode.
    pub async fn try_fetch(&self) -> Result<Vec<RawVehicleRecord>, FeedError> {
        let mut limiter = self.limiter.lock().await;
        limiter.wait().await;

        let body = self.fetch_body().await?;
        limiter.mark_success();
        drop(limiter);

        tokio::task::spawn_blocking(move || parse_feed(&body)).await?
    }
}

#[async_trait]
impl FeedSource for FeedClient {
    async fn fetch(&self) -> (Vec<RawVehicleRecord>, CaptureLabel) {
        match self.try_fetch().await {
            Ok(records) => (records, CaptureLabel::now(CaptureStatus::Ok)),
            Err(e) => {
                tracing::warn!(error = %e, "Fetch failed");
                if let FeedError::HttpStatus { code: 403 | 429 } = e {
                    tracing::warn!("Possible rate limiting or authentication issue");
                }
                (Vec::new(), CaptureLabel::now(e.capture_status()))
            }
        }
    }
}

/// Decode a feed body and extract the vehicle position of every entity
/// that carries one.
pub fn parse_feed(data: &[u8]) -> Result<Vec<RawVehicleRecord>, FeedError> {
    let feed = FeedMessage::decode(data)?;

    tracing::debug!(
        entities = feed.entity.len(),
        version = %feed.header.gtfs_realtime_version,
        "Decoded protobuf feed"
    );

    let records: Vec<RawVehicleRecord> = feed
        .entity
        .into_iter()
        .filter_map(|entity| entity.vehicle)
        .collect();

    tracing::info!(count = records.len(), "Parsed vehicle positions");
    Ok(records)
}

fn header_value(name: &str, value: &str) -> Result<HeaderValue, ConfigError> {
    HeaderValue::from_str(value).map_err(|e| ConfigError::InvalidHeader {
        name: name.to_string(),
        message: e.to_string(),
    })
}
