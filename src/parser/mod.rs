//! HPGL plotter file parser
//!
//! A single-pass parser that converts a plotter command stream into handler
//! events. Vendor preamble bytes in front of the first `IN;` are skipped,
//! unsupported opcodes are reported and skipped up to their terminator.

mod command;
mod diagnostics;
mod error;
mod location;
mod operation;
mod source;
mod state;

pub use command::{Command, HandlerError, PltHandler};
pub use diagnostics::{Diagnostics, TracingDiagnostics, Warning};
pub use error::ParseError;
pub use location::Location;
pub use operation::Operation;
pub use source::{CharSource, DEFAULT_BUFFER_SIZE, MIN_BUFFER_SIZE};
pub use state::{ParseSummary, PltParser};
