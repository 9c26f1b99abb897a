use chromiumoxide::page::Page;
use loadscout_core::{ScrapeError, SiteConfig};
use std::time::Duration;
use tokio::time::sleep;
use tracing::info;

use crate::flows::{click, type_text};
use crate::shared::TimeoutConfig;
use crate::wait::WaitStrategy;

/// Drive the saved-search UI on the loads page for one pickup location and
/// submit the search. The matching API response is picked up by the
/// response listener, not here.
pub async fn search(
    page: &Page,
    config: &SiteConfig,
    timeouts: &TimeoutConfig,
    wait: &WaitStrategy,
    location: &str,
) -> Result<(), ScrapeError> {
    info!(location, "navigating to load search");
    page.goto(config.load_search_url.as_str())
        .await
        .map_err(|e| ScrapeError::navigation_error(format!("Navigation failed: {}", e)))?;
    wait.wait_for_stable(page).await?;

    let selectors = &config.load_search;

    // Clear any previous search and filters before building a new one.
    wait.wait_for_element(page, &selectors.clear, true).await?;
    click(page, &selectors.clear).await?;
    sleep(timeouts.settle_delay).await;

    wait.wait_for_element(page, &selectors.remove_all, true).await?;
    click(page, &selectors.remove_all).await?;
    sleep(timeouts.settle_delay).await;

    wait.wait_for_element(page, &selectors.create_search, true).await?;
    click(page, &selectors.create_search).await?;
    sleep(timeouts.settle_delay).await;

    // Open the pickup location picker and feed the autocomplete.
    wait.wait_for_element(page, &selectors.pickup_opener, true).await?;
    click(page, &selectors.pickup_opener).await?;
    sleep(Duration::from_millis(500)).await;

    wait.wait_for_element(page, &selectors.picker_input, false).await?;
    type_text(page, &selectors.picker_input, location).await?;
    sleep(timeouts.settle_delay).await;

    wait.wait_for_element(page, &selectors.picker_first_item, true).await?;
    click(page, &selectors.picker_first_item).await?;
    sleep(timeouts.settle_delay * 2).await;

    info!("executing search");
    wait.wait_for_element(page, &selectors.submit_search, true).await?;
    click(page, &selectors.submit_search).await?;

    info!("search initiated");
    Ok(())
}
