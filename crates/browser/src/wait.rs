use chromiumoxide::page::Page;
use loadscout_core::ScrapeError;
use serde_json::json;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::shared::{TimeoutConfig, js, to_scrape_error};

pub struct WaitStrategy {
    config: TimeoutConfig,
}

impl WaitStrategy {
    pub fn new(config: TimeoutConfig) -> Self {
        Self { config }
    }

    /// Poll until the selector exists, is visible and (optionally) enabled.
    pub async fn wait_for_element(
        &self,
        page: &Page,
        selector: &str,
        check_clickable: bool,
    ) -> Result<(), ScrapeError> {
        let timeout = self.config.element_wait;
        let start = Instant::now();
        let selector_json = json!(selector);
        let mut last_state = String::new();

        loop {
            let js = js::build_js_call(js::element::CHECK_ELEMENT_STATE, &[selector_json.clone()]);

            let result = match page.evaluate(js).await {
                Ok(r) => r,
                Err(e) => {
                    let err_str = e.to_string();
                    if err_str.contains("Cannot find context")
                        || err_str.contains("Execution context was destroyed")
                    {
                        // Page is navigating, wait a bit and retry
                        sleep(Duration::from_millis(500)).await;
                        continue;
                    }
                    return Err(to_scrape_error(e, "WaitFor"));
                }
            };

            if let Some(state) = result.value() {
                if let Some(obj) = state.as_object() {
                    let exists = obj.get("exists").and_then(|v| v.as_bool()).unwrap_or(false);
                    let visible = obj.get("visible").and_then(|v| v.as_bool()).unwrap_or(false);
                    let disabled = obj
                        .get("disabled")
                        .and_then(|v| v.as_bool())
                        .unwrap_or(false);

                    let current_state =
                        format!("exists:{} visible:{} disabled:{}", exists, visible, disabled);
                    if current_state != last_state {
                        debug!(selector, state = %current_state, "element state");
                        last_state = current_state;
                    }

                    if exists && visible && !(check_clickable && disabled) {
                        debug!(selector, "element ready");
                        return Ok(());
                    }
                }
            }

            if start.elapsed() > timeout {
                return Err(ScrapeError::element_not_found(format!(
                    "Element '{}' not ready after {}ms",
                    selector,
                    timeout.as_millis()
                ))
                .with_context(json!({
                    "selector": selector,
                    "timeout_ms": timeout.as_millis() as u64,
                    "last_state": last_state,
                })));
            }

            sleep(self.config.check_interval).await;
        }
    }

    /// Wait for the document to finish loading and network activity to go
    /// quiet. Never fails the run; on timeout it logs and continues.
    pub async fn wait_for_stable(&self, page: &Page) -> Result<(), ScrapeError> {
        let timeout = self.config.page_stable;
        let start = Instant::now();
        let mut stable_checks = 0;
        let required_stable_checks = 5;

        debug!("waiting for page to stabilize");
        sleep(Duration::from_millis(500)).await;

        loop {
            let js = js::build_js_call(js::wait::CHECK_LOADING, &[]);

            let result = match page.evaluate(js).await {
                Ok(r) => r,
                Err(e) => {
                    let err_str = e.to_string();
                    if err_str.contains("Cannot find context")
                        || err_str.contains("Execution context was destroyed")
                    {
                        debug!("page context changed (navigating), waiting");
                        stable_checks = 0;
                        sleep(Duration::from_millis(1000)).await;
                        continue;
                    }
                    return Err(to_scrape_error(e, "WaitForStable"));
                }
            };

            if let Some(state) = result.value() {
                if let Some(obj) = state.as_object() {
                    let ready = obj.get("readyState").and_then(|v| v.as_str()) == Some("complete");
                    let active = obj
                        .get("activeRequests")
                        .and_then(|v| v.as_u64())
                        .unwrap_or(0);

                    if ready && active == 0 {
                        stable_checks += 1;
                        if stable_checks >= required_stable_checks {
                            debug!(elapsed_ms = start.elapsed().as_millis() as u64, "page stabilized");
                            sleep(self.config.settle_delay).await;
                            return Ok(());
                        }
                    } else {
                        stable_checks = 0;
                    }
                }
            }

            if start.elapsed() > timeout {
                warn!("page stabilization timeout, continuing anyway");
                return Ok(());
            }

            sleep(self.config.check_interval).await;
        }
    }

    /// Give a fresh navigation a moment to start, then wait for stability.
    pub async fn wait_for_navigation(&self, page: &Page) -> Result<(), ScrapeError> {
        debug!("waiting for navigation");
        sleep(Duration::from_millis(1000)).await;
        self.wait_for_stable(page).await
    }
}
