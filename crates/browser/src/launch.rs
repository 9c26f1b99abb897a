//! Browser process lifecycle: launch with a fixed retry budget, guaranteed
//! shutdown on every exit path.

use chromiumoxide::browser::{Browser, BrowserConfig as ChromeConfig, HeadlessMode};
use futures::StreamExt;
use loadscout_core::{ScrapeError, SiteConfig};
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::shared::TimeoutConfig;

/// Flags carried over from the hosted deployment: sandboxing off for
/// containers, GPU and background throttling off, one renderer process.
pub const CHROME_ARGS: &[&str] = &[
    "--no-sandbox",
    "--disable-setuid-sandbox",
    "--disable-dev-shm-usage",
    "--disable-accelerated-2d-canvas",
    "--no-first-run",
    "--no-zygote",
    "--disable-gpu",
    "--disable-background-timer-throttling",
    "--disable-backgrounding-occluded-windows",
    "--disable-renderer-backgrounding",
    "--disable-features=TranslateUI,VizDisplayCompositor",
    "--disable-ipc-flooding-protection",
    "--disable-hang-monitor",
    "--disable-popup-blocking",
    "--disable-prompt-on-repost",
    "--disable-sync",
    "--disable-extensions",
    "--disable-default-apps",
    "--disable-background-networking",
    "--disable-client-side-phishing-detection",
    "--no-default-browser-check",
    "--memory-pressure-off",
    "--single-process",
];

/// Owns the browser process and its CDP event loop. Must be closed
/// explicitly; the run always awaits [`BrowserGuard::close`] after the inner
/// flow finishes, whatever the outcome.
pub struct BrowserGuard {
    browser: Browser,
    handler: JoinHandle<()>,
}

impl BrowserGuard {
    pub fn browser(&self) -> &Browser {
        &self.browser
    }

    pub async fn close(mut self) {
        if let Err(e) = self.browser.close().await {
            warn!("browser close failed: {e}");
        }
        if let Err(e) = self.browser.wait().await {
            warn!("browser did not exit cleanly: {e}");
        }
        self.handler.abort();
    }
}

async fn launch_once(config: &SiteConfig) -> Result<BrowserGuard, ScrapeError> {
    // Unique user data dir per instance, avoids SingletonLock conflicts.
    let temp_dir = std::env::temp_dir().join(format!("loadscout-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&temp_dir)
        .map_err(|e| ScrapeError::launch_error(format!("Failed to create temp dir: {}", e)))?;

    let mut builder = ChromeConfig::builder()
        .headless_mode(if config.headless {
            HeadlessMode::True
        } else {
            HeadlessMode::False
        })
        .user_data_dir(temp_dir)
        .window_size(config.viewport_width, config.viewport_height)
        .args(CHROME_ARGS.iter().copied());

    if let Some(path) = &config.chrome_executable {
        builder = builder.chrome_executable(path);
    }

    let chrome_cfg = builder
        .build()
        .map_err(|e| ScrapeError::launch_error(format!("Config failed: {}", e)))?;

    let (browser, mut handler) = Browser::launch(chrome_cfg)
        .await
        .map_err(|e| ScrapeError::launch_error(format!("Launch failed: {}", e)))?;

    let handler = tokio::spawn(async move { while handler.next().await.is_some() {} });
    Ok(BrowserGuard { browser, handler })
}

/// Launch the browser, retrying a fixed number of times with a fixed delay.
pub async fn launch_with_retry(
    config: &SiteConfig,
    timeouts: &TimeoutConfig,
) -> Result<BrowserGuard, ScrapeError> {
    let mut last_error = None;
    for attempt in 1..=timeouts.launch_attempts {
        info!(attempt, total = timeouts.launch_attempts, "launching browser");
        match launch_once(config).await {
            Ok(guard) => {
                info!("browser launched");
                return Ok(guard);
            }
            Err(e) => {
                warn!(attempt, "browser launch failed: {e}");
                last_error = Some(e);
                if attempt < timeouts.launch_attempts {
                    sleep(timeouts.launch_retry_delay).await;
                }
            }
        }
    }
    Err(last_error.unwrap_or_else(|| {
        ScrapeError::launch_error(format!(
            "Failed to launch browser after {} attempts",
            timeouts.launch_attempts
        ))
    }))
}
