pub mod settings;

pub use settings::{AppConfig, CorsConfig, DatabaseConfig, RateLimitConfig, ServerConfig, SubmissionConfig};
