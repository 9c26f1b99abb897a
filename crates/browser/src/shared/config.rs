use std::time::Duration;

#[derive(Debug, Clone)]
pub struct TimeoutConfig {
    pub element_wait: Duration,
    pub navigation: Duration,
    pub page_stable: Duration,
    /// How long the run waits for a matching API response after the search
    /// is submitted.
    pub capture_window: Duration,
    /// Budget for fetching one response body over CDP.
    pub body_fetch: Duration,
    pub check_interval: Duration,
    pub settle_delay: Duration,
    pub launch_attempts: u32,
    pub launch_retry_delay: Duration,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            element_wait: Duration::from_millis(15000),
            navigation: Duration::from_millis(30000),
            page_stable: Duration::from_millis(30000),
            capture_window: Duration::from_millis(45000),
            body_fetch: Duration::from_millis(5000),
            check_interval: Duration::from_millis(300),
            settle_delay: Duration::from_millis(1000),
            launch_attempts: 3,
            launch_retry_delay: Duration::from_millis(2000),
        }
    }
}

impl TimeoutConfig {
    pub fn with_element_wait(mut self, ms: u64) -> Self {
        self.element_wait = Duration::from_millis(ms);
        self
    }

    pub fn with_capture_window(mut self, ms: u64) -> Self {
        self.capture_window = Duration::from_millis(ms);
        self
    }

    pub fn patient() -> Self {
        Self {
            element_wait: Duration::from_millis(30000),
            navigation: Duration::from_millis(60000),
            page_stable: Duration::from_millis(60000),
            capture_window: Duration::from_millis(60000),
            body_fetch: Duration::from_millis(10000),
            check_interval: Duration::from_millis(500),
            settle_delay: Duration::from_millis(2000),
            launch_attempts: 3,
            launch_retry_delay: Duration::from_millis(3000),
        }
    }
}
