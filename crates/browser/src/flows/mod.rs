//! Page interaction flows: login and the two search forms.

pub mod load_search;
pub mod login;
pub mod rate_check;

use chromiumoxide::page::Page;
use loadscout_core::ScrapeError;
use serde_json::json;

use crate::shared::{js, to_scrape_error};

/// Click a selector via the page's own DOM, surfacing a missing element as
/// an element-not-found error.
pub(crate) async fn click(page: &Page, selector: &str) -> Result<(), ScrapeError> {
    let call = js::build_js_call(js::element::SAFE_CLICK, &[json!(selector)]);
    let result = page
        .evaluate(call)
        .await
        .map_err(|e| to_scrape_error(e, "Click"))?;
    expect_success(result.value(), selector)
}

/// Set an input's value and fire input/change events.
pub(crate) async fn type_text(page: &Page, selector: &str, text: &str) -> Result<(), ScrapeError> {
    let call = js::build_js_call(
        js::element::TYPE_TEXT,
        &[json!(selector), json!(text), json!(true)],
    );
    let result = page
        .evaluate(call)
        .await
        .map_err(|e| to_scrape_error(e, "Type"))?;
    expect_success(result.value(), selector)
}

fn expect_success(
    value: Option<&serde_json::Value>,
    selector: &str,
) -> Result<(), ScrapeError> {
    let ok = value
        .and_then(|v| v.get("success"))
        .and_then(|v| v.as_bool())
        .unwrap_or(false);
    if ok {
        Ok(())
    } else {
        Err(ScrapeError::element_not_found(selector))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_flag_gates_the_interaction() {
        let ok = json!({ "success": true });
        assert!(expect_success(Some(&ok), "#email").is_ok());

        let missing = json!({ "success": false, "error": "Element not found" });
        let err = expect_success(Some(&missing), "#email").unwrap_err();
        assert_eq!(err.category, loadscout_core::ErrorCategory::ElementNotFound);

        assert!(expect_success(None, "#email").is_err());
    }
}
