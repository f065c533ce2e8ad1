//! HPGL opcodes
//!
//! The closed set of two-character opcodes the parser distinguishes.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A plotter operation identified by its two-character opcode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    /// `PA` - plot absolute
    PlotAbsolute,
    /// `PR` - plot relative
    PlotRelative,
    /// `PD` - pen down
    PenDown,
    /// `PU` - pen up
    PenUp,
    /// `IN` - initialize
    Initialize,
    /// `SP` - select pen
    SelectPen,
    /// `LT` - line type
    LineType,
    /// `SC` - scale
    Scale,
    /// `IP` - input P1 and P2
    Input,
    /// `PG` - advance full page
    Page,
    /// Any other two-character sequence
    Unknown,
}

impl Operation {
    /// Every recognized operation, in table order
    pub const RECOGNIZED: [Operation; 10] = [
        Operation::PlotAbsolute,
        Operation::PlotRelative,
        Operation::PenDown,
        Operation::PenUp,
        Operation::Initialize,
        Operation::SelectPen,
        Operation::LineType,
        Operation::Scale,
        Operation::Input,
        Operation::Page,
    ];

    /// Map an opcode to its operation. Anything outside the table is `Unknown`.
    pub fn from_code(code: &str) -> Self {
        match code {
            "PA" => Operation::PlotAbsolute,
            "PR" => Operation::PlotRelative,
            "PD" => Operation::PenDown,
            "PU" => Operation::PenUp,
            "IN" => Operation::Initialize,
            "SP" => Operation::SelectPen,
            "LT" => Operation::LineType,
            "SC" => Operation::Scale,
            "IP" => Operation::Input,
            "PG" => Operation::Page,
            _ => Operation::Unknown,
        }
    }

    /// The opcode, or `**` for `Unknown`
    pub fn code(self) -> &'static str {
        match self {
            Operation::PlotAbsolute => "PA",
            Operation::PlotRelative => "PR",
            Operation::PenDown => "PD",
            Operation::PenUp => "PU",
            Operation::Initialize => "IN",
            Operation::SelectPen => "SP",
            Operation::LineType => "LT",
            Operation::Scale => "SC",
            Operation::Input => "IP",
            Operation::Page => "PG",
            Operation::Unknown => "**",
        }
    }

    /// Whether the parser has a grammar for this operation and emits an event for it
    pub fn has_grammar(self) -> bool {
        matches!(
            self,
            Operation::Initialize
                | Operation::PenDown
                | Operation::PenUp
                | Operation::SelectPen
                | Operation::PlotAbsolute
        )
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
