//! Parse result rendering
//!
//! Collects everything a parse produced so the `plt-dump` tool can print it
//! as plain HPGL-like text or as JSON.

use std::fmt::Write as _;
use std::io::Read;

use serde::{Deserialize, Serialize};

use super::config::ParserConfig;
use crate::parser::{
    Command, Diagnostics, ParseError, ParseSummary, PltParser, TracingDiagnostics, Warning,
};

/// Output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One command per line
    #[default]
    Text,
    /// A single JSON document
    Json,
}

/// Commands, warnings and counters of one parse
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dump {
    pub summary: ParseSummary,
    pub commands: Vec<Command>,
    pub warnings: Vec<Warning>,
}

/// Keeps warnings and still logs them
#[derive(Default)]
struct Collect {
    warnings: Vec<Warning>,
}

impl Diagnostics for Collect {
    fn unsupported_operation(&mut self, warning: &Warning) {
        TracingDiagnostics.unsupported_operation(warning);
        self.warnings.push(warning.clone());
    }

    fn finished(&mut self, summary: &ParseSummary) {
        TracingDiagnostics.finished(summary);
    }
}

impl Dump {
    /// Parse `reader` and collect the result
    pub fn from_reader<R: Read>(reader: R, config: &ParserConfig) -> Result<Self, ParseError> {
        let mut parser = PltParser::with_diagnostics(Vec::<Command>::new(), Collect::default())
            .with_buffer_size(config.buffer_size);
        let summary = parser.parse_reader(reader)?;
        let (commands, diagnostics) = parser.into_parts();
        Ok(Self {
            summary,
            commands,
            warnings: diagnostics.warnings,
        })
    }

    /// Render in the requested format
    pub fn render(&self, format: OutputFormat) -> Result<String, serde_json::Error> {
        match format {
            OutputFormat::Text => Ok(self.to_text()),
            OutputFormat::Json => self.to_json(),
        }
    }

    /// Commands in HPGL syntax, one per line
    pub fn to_text(&self) -> String {
        let mut text = String::new();
        for command in &self.commands {
            let _ = writeln!(text, "{command}");
        }
        text
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
