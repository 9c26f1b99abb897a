pub mod capture;
pub mod flows;
pub mod launch;
pub mod scraper;
pub mod shared;
pub mod wait;

pub use capture::CaptureSlot;
pub use launch::BrowserGuard;
pub use scraper::Scraper;
pub use shared::TimeoutConfig;
