//! PLT Parser Library
//!
//! A streaming parser for plotter files written in the AutoCAD dialect of HPGL.
//! This crate provides:
//!
//! - `parser`: buffered character source, opcode scanner, grammar readers and
//!   the event handler interface
//! - `app`: configuration and output rendering used by the `plt-dump` tool
//!
//! # Example
//!
//! ```
//! use plt_parser::parser::{Command, PltParser};
//!
//! let mut parser = PltParser::new(Vec::<Command>::new());
//! parser.parse_str("IN;SP1;PA10,20;PD;PU;").unwrap();
//!
//! assert_eq!(
//!     parser.handler(),
//!     &vec![
//!         Command::Initialize,
//!         Command::SelectPen(1),
//!         Command::PlotAbsolute { x: 10, y: 20 },
//!         Command::PenDown,
//!         Command::PenUp,
//!     ]
//! );
//! ```

pub mod app;
pub mod parser;
