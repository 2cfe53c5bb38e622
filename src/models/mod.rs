pub mod config;
pub mod output;

pub use config::AppConfig;
pub use output::OutputFormat;
