//! The run orchestrator: one browser, one page, one capture, one file.

use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::network::{EnableParams, SetBlockedUrLsParams};
use chromiumoxide::page::Page;
use loadscout_core::{
    CaptureRecord, RunReport, ScrapeError, ScrapeRunner, SearchRequest, SiteConfig,
};
use loadscout_storage::{Storage, location_filename};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{info, warn};

use crate::capture::{CaptureSlot, spawn_response_listener};
use crate::launch::{BrowserGuard, launch_with_retry};
use crate::shared::TimeoutConfig;
use crate::{flows, wait::WaitStrategy};

pub struct Scraper {
    config: SiteConfig,
    timeouts: TimeoutConfig,
    storage: Arc<dyn Storage>,
    /// One in-flight run at a time; the portal session does not tolerate
    /// parallel logins from the same account.
    gate: Semaphore,
}

impl Scraper {
    pub fn new(config: SiteConfig, timeouts: TimeoutConfig, storage: Arc<dyn Storage>) -> Self {
        Self {
            config,
            timeouts,
            storage,
            gate: Semaphore::new(1),
        }
    }

    async fn setup_page(&self, page: &Page) -> Result<(), ScrapeError> {
        page.set_user_agent(self.config.user_agent.as_str())
            .await
            .map_err(|e| ScrapeError::script_error(format!("Set user agent failed: {}", e)))?;

        page.execute(EnableParams::default())
            .await
            .map_err(|e| ScrapeError::script_error(format!("Network enable failed: {}", e)))?;

        if !self.config.blocked_url_patterns.is_empty() {
            page.execute(SetBlockedUrLsParams::new(
                self.config.blocked_url_patterns.clone(),
            ))
            .await
            .map_err(|e| ScrapeError::script_error(format!("URL blocking failed: {}", e)))?;
        }
        Ok(())
    }

    /// Everything between launch and teardown. Failures here still go
    /// through the guard's close in `run`.
    async fn drive(
        &self,
        request: &SearchRequest,
        guard: &BrowserGuard,
        slot: &CaptureSlot,
    ) -> Result<CaptureRecord, ScrapeError> {
        let page = guard
            .browser()
            .new_page("about:blank")
            .await
            .map_err(|e| ScrapeError::launch_error(format!("New page failed: {}", e)))?;

        self.setup_page(&page).await?;

        let pattern = match request {
            SearchRequest::LoadSearch { .. } => self.config.load_capture.clone(),
            SearchRequest::RateCheck { .. } => self.config.rate_capture.clone(),
        };
        let listener = spawn_response_listener(
            page.clone(),
            pattern,
            request.location_key(),
            self.timeouts.body_fetch,
            slot.clone(),
        );

        let wait = WaitStrategy::new(self.timeouts.clone());
        let result = async {
            flows::login::login(&page, &self.config, &wait).await?;

            match request {
                SearchRequest::LoadSearch { location } => {
                    flows::load_search::search(&page, &self.config, &self.timeouts, &wait, location)
                        .await?
                }
                SearchRequest::RateCheck { pickup, dropoff } => {
                    flows::rate_check::search(
                        &page,
                        &self.config,
                        &self.timeouts,
                        &wait,
                        pickup,
                        dropoff,
                    )
                    .await?
                }
            }

            info!(
                window_ms = self.timeouts.capture_window.as_millis() as u64,
                "waiting for capture"
            );
            slot.wait(self.timeouts.capture_window).await.ok_or_else(|| {
                ScrapeError::capture_timeout(format!(
                    "No matching response within {}ms",
                    self.timeouts.capture_window.as_millis()
                ))
            })
        }
        .await;

        listener.abort();
        result
    }
}

#[async_trait]
impl ScrapeRunner for Scraper {
    async fn run(&self, request: &SearchRequest) -> Result<RunReport, ScrapeError> {
        let _permit = self
            .gate
            .acquire()
            .await
            .map_err(|_| ScrapeError::launch_error("Scraper is shutting down"))?;

        let location = request.location_key();
        info!(%location, "starting scrape run");

        let guard = launch_with_retry(&self.config, &self.timeouts).await?;
        let slot = CaptureSlot::new();
        let outcome = self.drive(request, &guard, &slot).await;

        // The browser is released on every exit path, capture or not.
        guard.close().await;

        let record = outcome.inspect_err(|e| warn!(%location, "run failed: {e}"))?;
        let path = self
            .storage
            .save_capture(&record)
            .await
            .map_err(|e| ScrapeError::storage_error(format!("Failed to save capture: {}", e)))?;
        let filename = location_filename(&record.location);
        info!(%location, path = %path.display(), "capture saved");

        Ok(RunReport {
            filename,
            path,
            record,
        })
    }
}
