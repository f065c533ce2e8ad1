//! Handler interface and recorded commands
//!
//! The parser reports each decoded command to a [`PltHandler`]. All methods
//! have no-op defaults so a consumer only overrides what it needs. An error
//! returned from a callback aborts the parse.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::trace;

/// Error type consumers may return from handler callbacks
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Receiver of decoded plotter commands.
///
/// Callbacks run synchronously, in stream order, after the terminating `;`
/// of the command has been read.
pub trait PltHandler {
    /// `IN;`
    fn initialize(&mut self) -> Result<(), HandlerError> {
        trace!("init");
        Ok(())
    }

    /// `PD;`
    fn pen_down(&mut self) -> Result<(), HandlerError> {
        trace!("pen down");
        Ok(())
    }

    /// `PU;`
    fn pen_up(&mut self) -> Result<(), HandlerError> {
        trace!("pen up");
        Ok(())
    }

    /// `SP<pen>;`
    fn select_pen(&mut self, pen: i32) -> Result<(), HandlerError> {
        trace!(pen, "select pen");
        Ok(())
    }

    /// `SP;` without a pen number, usually found at the end of a file
    fn reset_pen(&mut self) -> Result<(), HandlerError> {
        Ok(())
    }

    /// `PA<x>,<y>;`
    fn plot_absolute(&mut self, x: i32, y: i32) -> Result<(), HandlerError> {
        trace!(x, y, "plot absolute");
        Ok(())
    }
}

impl<H: PltHandler + ?Sized> PltHandler for &mut H {
    fn initialize(&mut self) -> Result<(), HandlerError> {
        (**self).initialize()
    }

    fn pen_down(&mut self) -> Result<(), HandlerError> {
        (**self).pen_down()
    }

    fn pen_up(&mut self) -> Result<(), HandlerError> {
        (**self).pen_up()
    }

    fn select_pen(&mut self, pen: i32) -> Result<(), HandlerError> {
        (**self).select_pen(pen)
    }

    fn reset_pen(&mut self) -> Result<(), HandlerError> {
        (**self).reset_pen()
    }

    fn plot_absolute(&mut self, x: i32, y: i32) -> Result<(), HandlerError> {
        (**self).plot_absolute(x, y)
    }
}

/// A decoded command, as delivered to a [`PltHandler`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    Initialize,
    PenDown,
    PenUp,
    SelectPen(i32),
    ResetPen,
    PlotAbsolute { x: i32, y: i32 },
}

impl Command {
    /// Deliver this command to `handler`
    pub fn replay<H: PltHandler + ?Sized>(&self, handler: &mut H) -> Result<(), HandlerError> {
        match *self {
            Command::Initialize => handler.initialize(),
            Command::PenDown => handler.pen_down(),
            Command::PenUp => handler.pen_up(),
            Command::SelectPen(pen) => handler.select_pen(pen),
            Command::ResetPen => handler.reset_pen(),
            Command::PlotAbsolute { x, y } => handler.plot_absolute(x, y),
        }
    }
}

/// Renders the command in HPGL syntax
impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Initialize => f.write_str("IN;"),
            Command::PenDown => f.write_str("PD;"),
            Command::PenUp => f.write_str("PU;"),
            Command::SelectPen(pen) => write!(f, "SP{pen};"),
            Command::ResetPen => f.write_str("SP;"),
            Command::PlotAbsolute { x, y } => write!(f, "PA{x},{y};"),
        }
    }
}

/// Records every command in order
impl PltHandler for Vec<Command> {
    fn initialize(&mut self) -> Result<(), HandlerError> {
        self.push(Command::Initialize);
        Ok(())
    }

    fn pen_down(&mut self) -> Result<(), HandlerError> {
        self.push(Command::PenDown);
        Ok(())
    }

    fn pen_up(&mut self) -> Result<(), HandlerError> {
        self.push(Command::PenUp);
        Ok(())
    }

    fn select_pen(&mut self, pen: i32) -> Result<(), HandlerError> {
        self.push(Command::SelectPen(pen));
        Ok(())
    }

    fn reset_pen(&mut self) -> Result<(), HandlerError> {
        self.push(Command::ResetPen);
        Ok(())
    }

    fn plot_absolute(&mut self, x: i32, y: i32) -> Result<(), HandlerError> {
        self.push(Command::PlotAbsolute { x, y });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Handler that only cares about plotted points
    #[derive(Default)]
    struct Points(Vec<(i32, i32)>);

    impl PltHandler for Points {
        fn plot_absolute(&mut self, x: i32, y: i32) -> Result<(), HandlerError> {
            self.0.push((x, y));
            Ok(())
        }
    }

    #[test]
    fn test_replay_into_recorder() {
        let commands = vec![
            Command::Initialize,
            Command::SelectPen(2),
            Command::PlotAbsolute { x: -5, y: 7 },
            Command::ResetPen,
        ];
        let mut recorded: Vec<Command> = Vec::new();
        for command in &commands {
            command.replay(&mut recorded).unwrap();
        }
        assert_eq!(recorded, commands);
    }

    #[test]
    fn test_default_methods_are_no_ops() {
        let mut points = Points::default();
        Command::PenDown.replay(&mut points).unwrap();
        Command::PlotAbsolute { x: 1, y: 2 }.replay(&mut points).unwrap();
        Command::SelectPen(3).replay(&mut points).unwrap();
        assert_eq!(points.0, vec![(1, 2)]);
    }

    #[test]
    fn test_command_display() {
        assert_eq!(Command::SelectPen(4).to_string(), "SP4;");
        assert_eq!(Command::ResetPen.to_string(), "SP;");
        assert_eq!(Command::PlotAbsolute { x: -1, y: 0 }.to_string(), "PA-1,0;");
    }

    #[test]
    fn test_command_serialization() {
        let command = Command::PlotAbsolute { x: 10, y: 20 };
        let json = serde_json::to_string(&command).unwrap();
        assert_eq!(json, r#"{"PlotAbsolute":{"x":10,"y":20}}"#);
        let restored: Command = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, command);
    }
}
