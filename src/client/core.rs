// File: ./src/client/core.rs
// HTTP access to the calendar and scripture providers
use crate::cache::DayCache;
use crate::calendar::CalendarSystem;
use crate::client::cert;
use crate::config::Config;
use crate::model::LiturgicalDay;
use crate::model::scripture::{
    display_reference, encode_component, loaded_passage, normalise_reference, unavailable_passage,
};
use crate::presenter::DayView;

use chrono::{Datelike, NaiveDate};
use futures::stream::{self, StreamExt};
use http::Request;
use http::header::ACCEPT;
use http_body_util::BodyExt;
use hyper_rustls::HttpsConnectorBuilder;
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::TokioExecutor;
use tracing::{debug, info, warn};

type HttpsClient = Client<hyper_rustls::HttpsConnector<HttpConnector>, String>;

pub const OFFLINE_WARNING: &str = "Offline Mode";

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("invalid request for {0}")]
    InvalidUri(String),
    #[error("TLS setup failed: {0}")]
    Tls(String),
    #[error("request failed: {0}")]
    Request(#[from] hyper_util::client::legacy::Error),
    #[error("reading response failed: {0}")]
    Body(String),
    #[error("server answered HTTP {0}")]
    Status(u16),
    #[error("unexpected response: {0}")]
    Decode(String),
}

/// A day ready for display, with a warning when it came from the cache.
#[derive(Debug, Clone)]
pub struct LoadedDay {
    pub view: DayView,
    pub warning: Option<String>,
}

#[derive(Clone)]
pub struct OrthoClient {
    http: HttpsClient,
    calendar_api: String,
    bible_api: String,
    translation: String,
    concurrency: usize,
    cache: Option<DayCache>,
}

impl OrthoClient {
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let tls_config = cert::client_config(config.allow_insecure_certs).map_err(ApiError::Tls)?;

        let https_connector = HttpsConnectorBuilder::new()
            .with_tls_config(tls_config)
            .https_or_http()
            .enable_http1()
            .build();

        let http = Client::builder(TokioExecutor::new()).build(https_connector);

        Ok(Self {
            http,
            calendar_api: config.calendar_api_url.trim_end_matches('/').to_string(),
            bible_api: config.bible_api_url.trim_end_matches('/').to_string(),
            translation: config.translation.clone(),
            concurrency: config.prefetch_concurrency.max(1),
            cache: None,
        })
    }

    pub fn with_cache(mut self, cache: Option<DayCache>) -> Self {
        self.cache = cache;
        self
    }

    async fn get(&self, url: &str) -> Result<String, ApiError> {
        debug!("GET {}", url);
        let req = Request::builder()
            .method("GET")
            .uri(url)
            .header(ACCEPT, "application/json")
            .body(String::new())
            .map_err(|_| ApiError::InvalidUri(url.to_string()))?;

        let resp = self.http.request(req).await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ApiError::Status(status.as_u16()));
        }

        let bytes = resp
            .into_body()
            .collect()
            .await
            .map_err(|e| ApiError::Body(e.to_string()))?
            .to_bytes();
        String::from_utf8(bytes.to_vec()).map_err(|e| ApiError::Decode(e.to_string()))
    }

    pub fn day_url(&self, calendar: CalendarSystem, date: NaiveDate) -> String {
        format!(
            "{}/{}/{}/{}/{}/",
            self.calendar_api,
            calendar.as_path(),
            date.year(),
            date.month(),
            date.day()
        )
    }

    pub async fn fetch_day_json(
        &self,
        calendar: CalendarSystem,
        date: NaiveDate,
    ) -> Result<String, ApiError> {
        self.get(&self.day_url(calendar, date)).await
    }

    pub async fn fetch_day(
        &self,
        calendar: CalendarSystem,
        date: NaiveDate,
    ) -> Result<LiturgicalDay, ApiError> {
        let json = self.fetch_day_json(calendar, date).await?;
        LiturgicalDay::from_json(&json).map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// Text of `normalised` from the Bible API, `None` when the answer has no text.
    pub async fn try_fetch_passage(&self, normalised: &str) -> Result<Option<String>, ApiError> {
        let url = format!(
            "{}/{}?translation={}",
            self.bible_api,
            encode_component(normalised),
            encode_component(&self.translation)
        );
        let body = self.get(&url).await?;
        let data: serde_json::Value =
            serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))?;
        Ok(data
            .get("text")
            .and_then(|t| t.as_str())
            .filter(|t| !t.is_empty())
            .map(str::to_string))
    }

    /// Display text for a reading. Never fails: errors yield a notice instead of the passage.
    pub async fn fetch_passage(&self, reference: &str) -> String {
        if reference.is_empty() {
            return String::new();
        }
        let display = display_reference(reference);
        let normalised = normalise_reference(display);
        if normalised.is_empty() {
            return display.to_string();
        }

        match self.try_fetch_passage(&normalised).await {
            Ok(Some(text)) => loaded_passage(display, &self.translation, &text),
            Ok(None) => {
                warn!("Bible API returned no text for {}", normalised);
                unavailable_passage(display)
            }
            Err(e) => {
                warn!("Bible API error for {}: {}", normalised, e);
                unavailable_passage(display)
            }
        }
    }

    /// Fetches all passages concurrently, keeping the order of `references`.
    pub async fn fetch_passages(&self, references: &[String]) -> Vec<String> {
        stream::iter(references.to_vec())
            .map(|reference| {
                let client = self.clone();
                async move { client.fetch_passage(&reference).await }
            })
            .buffered(self.concurrency)
            .collect()
            .await
    }

    async fn fetch_and_parse(
        &self,
        calendar: CalendarSystem,
        date: NaiveDate,
    ) -> Result<(String, LiturgicalDay), ApiError> {
        let json = self.fetch_day_json(calendar, date).await?;
        let day = LiturgicalDay::from_json(&json).map_err(|e| ApiError::Decode(e.to_string()))?;
        Ok((json, day))
    }

    /// Fetches a day and its readings, falling back to the cache when offline.
    /// Only payloads that parse are cached.
    pub async fn load_day(
        &self,
        calendar: CalendarSystem,
        date: NaiveDate,
    ) -> Result<LoadedDay, ApiError> {
        let (day, warning) = match self.fetch_and_parse(calendar, date).await {
            Ok((json, day)) => {
                if let Some(cache) = &self.cache
                    && let Err(e) = cache.save(calendar, date, &json)
                {
                    warn!("Could not cache {} {}: {}", calendar, date, e);
                }
                (day, None)
            }
            Err(e) => {
                let cached = self
                    .cache
                    .as_ref()
                    .and_then(|c| c.load(calendar, date).ok().flatten())
                    .and_then(|json| LiturgicalDay::from_json(&json).ok());
                match cached {
                    Some(day) => {
                        warn!("Calendar API unavailable ({}), using cached {} {}", e, calendar, date);
                        (day, Some(OFFLINE_WARNING.to_string()))
                    }
                    None => return Err(e),
                }
            }
        };

        // Offline, the references themselves are shown instead of passages.
        let passages = if warning.is_none() {
            self.fetch_passages(&day.references()).await
        } else {
            vec![]
        };
        info!(
            "Loaded {} {} with {} readings",
            calendar,
            date,
            day.record.readings.len()
        );

        Ok(LoadedDay {
            view: DayView::build(calendar, date, &day, &passages),
            warning,
        })
    }
}
