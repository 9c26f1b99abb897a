use chromiumoxide::page::Page;
use loadscout_core::{ScrapeError, SiteConfig};
use tokio::time::sleep;
use tracing::info;

use crate::flows::{click, type_text};
use crate::shared::TimeoutConfig;
use crate::wait::WaitStrategy;

/// Fill the market-rates pickup/dropoff pickers for one lane. Selecting the
/// dropoff suggestion triggers the rate lookup; no explicit submit exists.
pub async fn search(
    page: &Page,
    config: &SiteConfig,
    timeouts: &TimeoutConfig,
    wait: &WaitStrategy,
    pickup: &str,
    dropoff: &str,
) -> Result<(), ScrapeError> {
    info!(pickup, dropoff, "navigating to market rates");
    page.goto(config.rate_check_url.as_str())
        .await
        .map_err(|e| ScrapeError::navigation_error(format!("Navigation failed: {}", e)))?;
    wait.wait_for_stable(page).await?;

    let selectors = &config.rate_check;

    wait.wait_for_element(page, &selectors.pickup_input, false).await?;
    type_text(page, &selectors.pickup_input, pickup).await?;
    wait.wait_for_element(page, &selectors.pickup_first_item, true).await?;
    click(page, &selectors.pickup_first_item).await?;
    sleep(timeouts.settle_delay).await;

    wait.wait_for_element(page, &selectors.dropoff_input, false).await?;
    type_text(page, &selectors.dropoff_input, dropoff).await?;
    wait.wait_for_element(page, &selectors.dropoff_first_item, true).await?;
    click(page, &selectors.dropoff_first_item).await?;

    info!("lane submitted");
    Ok(())
}
