pub mod config;
pub mod errors;
pub mod js;

pub use config::TimeoutConfig;
pub use errors::to_scrape_error;
