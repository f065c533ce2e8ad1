//! Application glue module
//!
//! Configuration and output rendering for the `plt-dump` tool.

mod config;
mod dump;

pub use config::{Config, ConfigError, OutputConfig, ParserConfig};
pub use dump::{Dump, OutputFormat};
