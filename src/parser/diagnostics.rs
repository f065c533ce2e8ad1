//! Diagnostics sink
//!
//! Non-fatal conditions found while parsing are reported to a [`Diagnostics`]
//! implementation owned by the parser instead of a process-wide logger.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::location::Location;
use super::operation::Operation;
use super::state::ParseSummary;

/// An opcode that was read and skipped because the parser has no grammar for it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warning {
    pub operation: Operation,
    /// The two characters as they appeared in the input
    pub code: String,
    /// Location of the first opcode character
    pub location: Location,
}

/// Receiver of non-fatal parse diagnostics
pub trait Diagnostics {
    /// An unsupported command was skipped up to and including its `;`
    fn unsupported_operation(&mut self, warning: &Warning);

    /// The parse reached end of input
    fn finished(&mut self, _summary: &ParseSummary) {}
}

/// Forwards diagnostics to `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn unsupported_operation(&mut self, warning: &Warning) {
        warn!(
            "unsupported operation: {} ({:?}) at {}",
            warning.operation, warning.code, warning.location
        );
    }

    fn finished(&mut self, summary: &ParseSummary) {
        info!("Parsed {} commands", summary.commands);
    }
}

/// Collects warnings in order
impl Diagnostics for Vec<Warning> {
    fn unsupported_operation(&mut self, warning: &Warning) {
        self.push(warning.clone());
    }
}

impl<D: Diagnostics + ?Sized> Diagnostics for &mut D {
    fn unsupported_operation(&mut self, warning: &Warning) {
        (**self).unsupported_operation(warning);
    }

    fn finished(&mut self, summary: &ParseSummary) {
        (**self).finished(summary);
    }
}
