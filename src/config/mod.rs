//! Configuration management: runtime settings and endpoint resolution

pub mod document;
pub mod env;
pub mod parser;
pub mod presets;
pub mod resolver;

// Re-export main functionality
pub use document::parse_document;
pub use env::EnvManager;
pub use parser::{display_config_summary, load_config, ConfigParser};
pub use resolver::ConfigResolver;

// Re-export from models for convenience
pub use crate::models::Config;
