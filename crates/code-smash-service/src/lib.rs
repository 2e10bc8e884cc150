mod blocking;
mod config;
mod http;
mod traits;

pub use blocking::BlockingHttpService;
pub use config::{ApiConfig, DEFAULT_BASE_URL};
pub use http::HttpService;
pub use traits::{FeedbackApi, ServiceError};
