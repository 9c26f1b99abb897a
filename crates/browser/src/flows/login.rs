use chromiumoxide::page::Page;
use loadscout_core::{ScrapeError, SiteConfig};
use serde_json::json;
use tracing::info;

use crate::flows::{click, type_text};
use crate::wait::WaitStrategy;

/// Authenticate on the login portal and wait for the post-login navigation.
pub async fn login(
    page: &Page,
    config: &SiteConfig,
    wait: &WaitStrategy,
) -> Result<(), ScrapeError> {
    info!("logging in");
    let result = run_login(page, config, wait).await;
    result.map_err(|e| {
        ScrapeError::auth_error(format!("Login failed: {}", e.message))
            .with_context(json!({ "url": config.login_url, "cause": e.context }))
    })?;
    info!("login successful");
    Ok(())
}

async fn run_login(
    page: &Page,
    config: &SiteConfig,
    wait: &WaitStrategy,
) -> Result<(), ScrapeError> {
    page.goto(config.login_url.as_str())
        .await
        .map_err(|e| ScrapeError::navigation_error(format!("Navigation failed: {}", e)))?;
    wait.wait_for_stable(page).await?;

    let selectors = &config.login;
    wait.wait_for_element(page, &selectors.email, false).await?;
    type_text(page, &selectors.email, &config.credentials.email).await?;

    wait.wait_for_element(page, &selectors.password, false).await?;
    type_text(page, &selectors.password, &config.credentials.password).await?;

    wait.wait_for_element(page, &selectors.submit, true).await?;
    click(page, &selectors.submit).await?;

    wait.wait_for_navigation(page).await
}
