//! Single-shot capture of one intercepted API response.
//!
//! A [`CaptureSlot`] is per-run state: the response listener offers every
//! matching, parseable response body into it, the first offer wins, and the
//! run waits on the slot with one deadline instead of racing ad hoc polls.
//! Concurrent runs each get their own slot, so they never interfere.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;
use chromiumoxide::cdp::browser_protocol::network::{
    EventResponseReceived, GetResponseBodyParams, RequestId,
};
use chromiumoxide::page::Page;
use chrono::Utc;
use futures::StreamExt;
use loadscout_core::{CaptureRecord, CapturePattern, ScrapeError};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::{Mutex, Notify};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

struct SlotInner {
    claimed: AtomicBool,
    record: Mutex<Option<CaptureRecord>>,
    notify: Notify,
}

/// First-success-wins latch holding at most one capture per run.
#[derive(Clone)]
pub struct CaptureSlot {
    inner: Arc<SlotInner>,
}

impl CaptureSlot {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(SlotInner {
                claimed: AtomicBool::new(false),
                record: Mutex::new(None),
                notify: Notify::new(),
            }),
        }
    }

    /// Offer a capture. Returns `true` only for the first offer of the run;
    /// every later offer is ignored.
    pub async fn offer(&self, record: CaptureRecord) -> bool {
        let mut guard = self.inner.record.lock().await;
        if self.inner.claimed.load(Ordering::Acquire) {
            return false;
        }
        *guard = Some(record);
        self.inner.claimed.store(true, Ordering::Release);
        drop(guard);
        self.inner.notify.notify_waiters();
        true
    }

    pub fn is_claimed(&self) -> bool {
        self.inner.claimed.load(Ordering::Acquire)
    }

    pub async fn take(&self) -> Option<CaptureRecord> {
        self.inner.record.lock().await.take()
    }

    /// Wait until the slot is claimed or the window elapses, whichever comes
    /// first, then hand out whatever was captured.
    pub async fn wait(&self, window: Duration) -> Option<CaptureRecord> {
        let deadline = tokio::time::Instant::now() + window;
        loop {
            // Register interest before checking the latch so a claim between
            // the check and the await cannot be missed.
            let notified = self.inner.notify.notified();
            if self.is_claimed() {
                return self.take().await;
            }
            tokio::select! {
                _ = notified => {}
                _ = tokio::time::sleep_until(deadline) => return self.take().await,
            }
        }
    }
}

impl Default for CaptureSlot {
    fn default() -> Self {
        Self::new()
    }
}

/// Watch `Network.responseReceived` events on the page and offer the first
/// matching JSON body into the slot.
///
/// A body-fetch or parse failure is logged and the listener keeps waiting
/// for a later matching response. The task ends once the slot is claimed or
/// the event stream closes; the run aborts it on teardown either way.
pub fn spawn_response_listener(
    page: Page,
    pattern: CapturePattern,
    location: String,
    body_fetch_timeout: Duration,
    slot: CaptureSlot,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut events = match page.event_listener::<EventResponseReceived>().await {
            Ok(stream) => stream,
            Err(e) => {
                warn!("failed to attach response listener: {e}");
                return;
            }
        };

        while let Some(event) = events.next().await {
            if slot.is_claimed() {
                break;
            }
            let url = event.response.url.clone();
            let status = event.response.status;
            if !pattern.matches(&url, status) {
                continue;
            }
            debug!(%url, status, "matching response");

            match fetch_json_body(&page, &event.request_id, body_fetch_timeout).await {
                Ok(data) => {
                    let record = CaptureRecord {
                        url: url.clone(),
                        status,
                        data,
                        timestamp: Utc::now(),
                        location: location.clone(),
                    };
                    if slot.offer(record).await {
                        info!(%url, "captured API response");
                        break;
                    }
                }
                Err(e) => {
                    // Keep waiting; a later matching response may parse.
                    warn!(%url, "discarding response: {e}");
                }
            }
        }
    })
}

async fn fetch_json_body(
    page: &Page,
    request_id: &RequestId,
    timeout: Duration,
) -> Result<serde_json::Value, ScrapeError> {
    let returns = tokio::time::timeout(
        timeout,
        page.execute(GetResponseBodyParams::new(request_id.clone())),
    )
    .await
    .map_err(|_| ScrapeError::parsing_error("response body fetch timed out"))?
    .map_err(|e| ScrapeError::parsing_error(format!("response body fetch failed: {e}")))?;

    let raw = if returns.base64_encoded {
        B64.decode(returns.body.as_bytes())
            .map_err(|e| ScrapeError::parsing_error(format!("base64 decode failed: {e}")))?
    } else {
        returns.body.clone().into_bytes()
    };
    parse_body(&raw)
}

pub(crate) fn parse_body(raw: &[u8]) -> Result<serde_json::Value, ScrapeError> {
    serde_json::from_slice(raw)
        .map_err(|e| ScrapeError::parsing_error(format!("invalid JSON body: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(tag: u64) -> CaptureRecord {
        CaptureRecord {
            url: "https://members.123loadboard.com/api/loads/named-searches/x/search".into(),
            status: 200,
            data: json!({ "tag": tag }),
            timestamp: Utc::now(),
            location: "Dallas, TX".into(),
        }
    }

    #[tokio::test]
    async fn first_offer_wins_and_later_offers_are_ignored() {
        let slot = CaptureSlot::new();
        assert!(slot.offer(record(1)).await);
        assert!(!slot.offer(record(2)).await);

        let captured = slot.wait(Duration::from_millis(10)).await.unwrap();
        assert_eq!(captured.data["tag"], 1);
    }

    #[tokio::test]
    async fn concurrent_offers_produce_exactly_one_claim() {
        let slot = CaptureSlot::new();
        let mut handles = Vec::new();
        for tag in 0..16 {
            let slot = slot.clone();
            handles.push(tokio::spawn(async move { slot.offer(record(tag)).await }));
        }
        let mut claims = 0;
        for handle in handles {
            if handle.await.unwrap() {
                claims += 1;
            }
        }
        assert_eq!(claims, 1);
        assert!(slot.take().await.is_some());
    }

    #[tokio::test]
    async fn wait_returns_none_when_nothing_arrives() {
        let slot = CaptureSlot::new();
        let start = tokio::time::Instant::now();
        assert!(slot.wait(Duration::from_millis(50)).await.is_none());
        assert!(start.elapsed() >= Duration::from_millis(50));
    }

    #[tokio::test]
    async fn wait_wakes_on_a_late_offer() {
        let slot = CaptureSlot::new();
        let writer = slot.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            writer.offer(record(7)).await;
        });
        let captured = slot.wait(Duration::from_secs(5)).await.unwrap();
        assert_eq!(captured.data["tag"], 7);
    }

    #[test]
    fn malformed_body_is_a_parsing_error() {
        let err = parse_body(b"<html>not json</html>").unwrap_err();
        assert_eq!(err.category, loadscout_core::ErrorCategory::Parsing);
        assert!(parse_body(br#"{"loads": []}"#).is_ok());
    }
}
