//! Site configuration: URLs, selectors, credentials, capture patterns.
//!
//! These are values, not behavior. Defaults match the load board's current
//! markup; everything can be overridden by deserializing a custom config or
//! through the environment (`SiteConfig::from_env`).

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Login form credentials. Never logged.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginSelectors {
    pub email: String,
    pub password: String,
    pub submit: String,
}

impl Default for LoginSelectors {
    fn default() -> Self {
        Self {
            email: "#email".into(),
            password: "#password".into(),
            submit: "#sign-in-button".into(),
        }
    }
}

/// Selector sequence for the saved-search UI on the loads page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadSearchSelectors {
    pub clear: String,
    pub remove_all: String,
    pub create_search: String,
    pub pickup_opener: String,
    pub picker_input: String,
    pub picker_first_item: String,
    pub submit_search: String,
}

impl Default for LoadSearchSelectors {
    fn default() -> Self {
        Self {
            clear: "#clear".into(),
            remove_all: "#remove_all".into(),
            create_search: "#create_new_search_btn".into(),
            pickup_opener: "#pickup_picker".into(),
            picker_input: "#lc_picker".into(),
            picker_first_item: "#lc_picker-item-0".into(),
            submit_search: "#see_exact_loads".into(),
        }
    }
}

/// Selector pair for the market-rates pickup/dropoff pickers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateCheckSelectors {
    pub pickup_input: String,
    pub pickup_first_item: String,
    pub dropoff_input: String,
    pub dropoff_first_item: String,
}

impl Default for RateCheckSelectors {
    fn default() -> Self {
        Self {
            pickup_input: "#pickup_location_picker".into(),
            pickup_first_item: "#pickup_location_picker-item-0".into(),
            dropoff_input: "#dropoff_location_picker".into(),
            dropoff_first_item: "#dropoff_location_picker-item-0".into(),
        }
    }
}

/// Which network responses count as the run's capture.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapturePattern {
    pub url_contains: String,
    pub url_ends_with: Option<String>,
    /// Require HTTP 200 before the response is considered at all.
    pub require_ok: bool,
}

impl CapturePattern {
    pub fn matches(&self, url: &str, status: i64) -> bool {
        if !url.contains(&self.url_contains) {
            return false;
        }
        if let Some(suffix) = &self.url_ends_with {
            if !url.ends_with(suffix.as_str()) {
                return false;
            }
        }
        if self.require_ok && status != 200 {
            return false;
        }
        true
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    pub login_url: String,
    pub load_search_url: String,
    pub rate_check_url: String,
    pub login: LoginSelectors,
    pub load_search: LoadSearchSelectors,
    pub rate_check: RateCheckSelectors,
    pub load_capture: CapturePattern,
    pub rate_capture: CapturePattern,
    pub credentials: Credentials,
    /// Override for the Chrome executable; `None` lets the launcher decide.
    pub chrome_executable: Option<String>,
    pub headless: bool,
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub user_agent: String,
    /// URL patterns blocked at the network layer (static assets, trackers).
    pub blocked_url_patterns: Vec<String>,
    pub data_dir: PathBuf,
    pub port: u16,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            login_url: "https://login.123loadboard.com/".into(),
            load_search_url: "https://members.123loadboard.com/loads/search/".into(),
            rate_check_url: "https://members.123loadboard.com/tools/market-rates-carrier".into(),
            login: LoginSelectors::default(),
            load_search: LoadSearchSelectors::default(),
            rate_check: RateCheckSelectors::default(),
            load_capture: CapturePattern {
                url_contains: "/api/loads/named-searches/".into(),
                url_ends_with: Some("/search".into()),
                require_ok: true,
            },
            rate_capture: CapturePattern {
                url_contains: "api/ratechecks".into(),
                url_ends_with: None,
                require_ok: false,
            },
            credentials: Credentials::default(),
            chrome_executable: None,
            headless: true,
            viewport_width: 1280,
            viewport_height: 720,
            user_agent: "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
                .into(),
            blocked_url_patterns: vec![
                "*.png".into(),
                "*.jpg".into(),
                "*.jpeg".into(),
                "*.gif".into(),
                "*.svg".into(),
                "*.css".into(),
                "*.woff".into(),
                "*.woff2".into(),
                "*.ttf".into(),
                "*.mp4".into(),
                "*google-analytics*".into(),
                "*doubleclick*".into(),
                "*facebook.com*".into(),
                "*twitter.com*".into(),
            ],
            data_dir: PathBuf::from("data"),
            port: 9000,
        }
    }
}

impl SiteConfig {
    /// Defaults with environment overrides applied.
    ///
    /// `CHROME_BIN`, `LOGIN_EMAIL`, `LOGIN_PASSWORD`, `LOADSCOUT_DATA_DIR`,
    /// `LOADSCOUT_PORT`.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(path) = env::var("CHROME_BIN") {
            config.chrome_executable = Some(path);
        }
        if let Ok(email) = env::var("LOGIN_EMAIL") {
            config.credentials.email = email;
        }
        if let Ok(password) = env::var("LOGIN_PASSWORD") {
            config.credentials.password = password;
        }
        if let Ok(dir) = env::var("LOADSCOUT_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }
        if let Ok(port) = env::var("LOADSCOUT_PORT") {
            if let Ok(port) = port.parse() {
                config.port = port;
            }
        }
        config
    }
}
