//! Process-level plumbing for the listing server: layered configuration,
//! home directory resolution and logging setup.

pub mod config;
pub mod logging;
pub mod paths;

pub use config::{AppConfig, CliArgs, DatabaseConfig, LinksConfig, LoggingConfig, Section, ServerConfig};
pub use logging::init_logging_from_config;
