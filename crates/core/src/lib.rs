use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub mod config;

pub use config::{CapturePattern, Credentials, SiteConfig};

/// A single scrape run against the load board.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SearchRequest {
    /// Single-location load search on the members search page.
    LoadSearch { location: String },
    /// Pickup/dropoff lane on the market-rates tool.
    RateCheck { pickup: String, dropoff: String },
}

impl SearchRequest {
    /// The string the output file is keyed by, before sanitization.
    pub fn location_key(&self) -> String {
        match self {
            SearchRequest::LoadSearch { location } => location.clone(),
            SearchRequest::RateCheck { pickup, dropoff } => format!("{}-{}", pickup, dropoff),
        }
    }
}

/// One intercepted API response, persisted verbatim once per run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureRecord {
    pub url: String,
    pub status: i64,
    pub data: serde_json::Value,
    pub timestamp: DateTime<Utc>,
    pub location: String,
}

/// Outcome of a successful run: where the capture landed and what it held.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub filename: String,
    pub path: PathBuf,
    pub record: CaptureRecord,
}

/// Error categories for programmatic handling
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Browser process failed to launch
    Launch,
    /// Navigation or page load errors
    Navigation,
    /// Element not found or selector issues
    ElementNotFound,
    /// JavaScript execution errors
    Script,
    /// No matching response arrived inside the capture window
    CaptureTimeout,
    /// Response body was not valid JSON (or could not be fetched)
    Parsing,
    /// Writing the capture to disk failed
    Storage,
    /// Login failed
    Auth,
}

/// Structured error with context for debugging and HTTP surfacing
#[derive(Debug, Clone, Serialize, Deserialize, thiserror::Error)]
#[error("[{category:?}] {message}")]
pub struct ScrapeError {
    pub category: ErrorCategory,
    pub message: String,
    /// Optional context (URL, selector, timeout, etc.)
    pub context: serde_json::Value,
}

impl ScrapeError {
    pub fn new(category: ErrorCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
            context: serde_json::json!({}),
        }
    }

    pub fn with_context(mut self, context: serde_json::Value) -> Self {
        self.context = context;
        self
    }

    // Convenience constructors
    pub fn launch_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Launch, message)
    }

    pub fn navigation_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Navigation, message)
    }

    pub fn element_not_found(selector: impl Into<String>) -> Self {
        let selector = selector.into();
        Self::new(
            ErrorCategory::ElementNotFound,
            format!("Element not found: {}", selector),
        )
        .with_context(serde_json::json!({ "selector": selector }))
    }

    pub fn script_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Script, message)
    }

    pub fn capture_timeout(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::CaptureTimeout, message)
    }

    pub fn parsing_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Parsing, message)
    }

    pub fn storage_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Storage, message)
    }

    pub fn auth_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Auth, message)
    }
}

/// One complete run: login, search, capture, persist.
#[async_trait]
pub trait ScrapeRunner: Send + Sync {
    async fn run(&self, request: &SearchRequest) -> Result<RunReport, ScrapeError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_search_key_is_the_location() {
        let req = SearchRequest::LoadSearch {
            location: "Los Angeles, CA".into(),
        };
        assert_eq!(req.location_key(), "Los Angeles, CA");
    }

    #[test]
    fn rate_check_key_joins_the_lane() {
        let req = SearchRequest::RateCheck {
            pickup: "Baltimore, MD".into(),
            dropoff: "Los Angeles, CA".into(),
        };
        assert_eq!(req.location_key(), "Baltimore, MD-Los Angeles, CA");
    }

    #[test]
    fn error_display_includes_category() {
        let err = ScrapeError::capture_timeout("no matching response within 45s");
        assert_eq!(
            err.to_string(),
            "[CaptureTimeout] no matching response within 45s"
        );
    }

    #[test]
    fn element_not_found_carries_selector_context() {
        let err = ScrapeError::element_not_found("#sign-in-button");
        assert_eq!(err.category, ErrorCategory::ElementNotFound);
        assert_eq!(err.context["selector"], "#sign-in-button");
    }

    #[test]
    fn error_round_trips_through_json() {
        let err = ScrapeError::auth_error("login failed")
            .with_context(serde_json::json!({ "url": "https://login.example.com/" }));
        let json = serde_json::to_string(&err).unwrap();
        let back: ScrapeError = serde_json::from_str(&json).unwrap();
        assert_eq!(back.category, ErrorCategory::Auth);
        assert_eq!(back.message, "login failed");
    }
}
