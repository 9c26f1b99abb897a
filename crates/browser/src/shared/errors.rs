use loadscout_core::ScrapeError;

pub fn to_scrape_error(e: impl std::fmt::Display, action: &str) -> ScrapeError {
    let s = e.to_string();
    if s.contains("timeout") || s.contains("Timeout") {
        ScrapeError::navigation_error(format!("{} timed out: {}", action, s))
    } else if s.contains("navigation") || s.contains("Navigation") {
        ScrapeError::navigation_error(format!("{} navigation failed: {}", action, s))
    } else if s.contains("not found") || s.contains("null") {
        ScrapeError::element_not_found(format!("{}: {}", action, s))
    } else {
        ScrapeError::script_error(format!("{} failed: {}", action, s))
    }
}
