// src/source/airbnb.rs
use crate::config::{Credentials, Settings};
use crate::errors::SyncError;
use crate::source::{FetchError, ReservationSource, SnapshotWindow};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, COOKIE};
use std::time::Duration;

const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/128.0.0.0 Safari/537.36";

const DOWNLOAD_URL: &str = "https://www.airbnb.com/api/v2/download_reservations";

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8";

/// Pulls the host's reservation export from Airbnb, one page per run.
pub struct AirbnbSource {
    client: Client,
    credentials: Credentials,
    currency: String,
    locale: String,
}

impl AirbnbSource {
    pub fn new(credentials: Credentials, currency: &str, locale: &str) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| FetchError::Network(e.to_string()))?;

        Ok(Self {
            client,
            credentials,
            currency: currency.to_string(),
            locale: locale.to_string(),
        })
    }

    /// Fails with a config error when the cookie or key is missing, before
    /// anything goes over the network.
    pub fn from_settings(settings: &Settings) -> Result<Self, SyncError> {
        let credentials = settings.credentials()?;
        Ok(Self::new(credentials, &settings.currency, &settings.locale)?)
    }

    fn query(&self, window: &SnapshotWindow) -> Vec<(&'static str, String)> {
        vec![
            ("_format", "for_remy".to_string()),
            ("_limit", window.page_size.to_string()),
            ("_offset", "0".to_string()),
            ("collection_strategy", "for_reservations_list".to_string()),
            ("date_min", window.date_min.format("%Y-%m-%d").to_string()),
            ("status", "accepted,request".to_string()),
            ("page", "1".to_string()),
            ("key", self.credentials.api_key.clone()),
            ("currency", self.currency.clone()),
            ("locale", self.locale.clone()),
        ]
    }
}

impl ReservationSource for AirbnbSource {
    fn fetch_snapshot(&self, window: &SnapshotWindow) -> Result<String, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HTML));
        let cookie = HeaderValue::from_str(&format!("_aaj={}", self.credentials.cookie))
            .map_err(|e| FetchError::Network(format!("invalid cookie value: {e}")))?;
        headers.insert(COOKIE, cookie);

        let start = std::time::Instant::now();
        let resp = self
            .client
            .get(DOWNLOAD_URL)
            .headers(headers)
            .query(&self.query(window))
            .send()
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let status = resp.status();
        let text = resp
            .text()
            .map_err(|e| FetchError::Network(e.to_string()))?;

        if !status.is_success() {
            tracing::warn!(%status, elapsed = ?start.elapsed(), "reservation download rejected");
            return Err(FetchError::Status {
                status: status.as_u16(),
                body: text.chars().take(200).collect(),
            });
        }

        tracing::info!(bytes = text.len(), elapsed = ?start.elapsed(), "downloaded reservations");
        Ok(text)
    }

    fn describe(&self) -> String {
        "airbnb".to_string()
    }
}
