//! Parser state machine
//!
//! Drives a [`CharSource`] through the plotter grammar:
//!
//! - Preamble: discard bytes until `IN` is seen, then require `;`
//! - ReadOpcode: capture exactly two characters and map them to an [`Operation`]
//! - Dispatch: run the grammar reader for the opcode shape
//!   (no argument, optional integer, two integers) or skip to `;`
//! - EndOfText: reached when the source is exhausted between commands
//!
//! Whitespace is skipped between commands and around arguments, never inside
//! an integer literal. Grammar violations abort the whole parse.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::command::{HandlerError, PltHandler};
use super::diagnostics::{Diagnostics, TracingDiagnostics, Warning};
use super::error::ParseError;
use super::operation::Operation;
use super::source::{CharSource, DEFAULT_BUFFER_SIZE};

/// Lower bound for the buffer used with in-memory input
const SMALL_INPUT_BUFFER_SIZE: usize = 10;

/// Counters reported at the end of a successful parse
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseSummary {
    /// Commands read by the main loop, skipped ones included.
    /// The `IN;` consumed by the preamble skipper is not counted.
    pub commands: usize,
    /// Commands skipped because the parser has no grammar for them
    pub unsupported: usize,
    /// Whether the preamble skipper found `IN;`
    pub initialized: bool,
}

/// Plotter file parser.
///
/// Holds the consumer and the diagnostics sink. Every `parse_*` call reads
/// its input through a fresh buffer, so one parser can be reused for several
/// inputs one after another.
#[derive(Debug)]
pub struct PltParser<H, D = TracingDiagnostics> {
    handler: H,
    diagnostics: D,
    buffer_size: Option<usize>,
}

impl<H: PltHandler> PltParser<H> {
    /// Create a parser that reports diagnostics through `tracing`
    pub fn new(handler: H) -> Self {
        Self::with_diagnostics(handler, TracingDiagnostics)
    }
}

impl<H: PltHandler, D: Diagnostics> PltParser<H, D> {
    pub fn with_diagnostics(handler: H, diagnostics: D) -> Self {
        Self {
            handler,
            diagnostics,
            buffer_size: None,
        }
    }

    /// Use a fixed buffer capacity for every input.
    ///
    /// Without it, reader input uses [`DEFAULT_BUFFER_SIZE`] and in-memory
    /// input a buffer sized to the input, between 10 and 1024 bytes.
    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = Some(size);
        self
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }

    pub fn diagnostics(&self) -> &D {
        &self.diagnostics
    }

    pub fn into_parts(self) -> (H, D) {
        (self.handler, self.diagnostics)
    }

    pub fn parse_str(&mut self, input: &str) -> Result<ParseSummary, ParseError> {
        self.parse_bytes(input.as_bytes())
    }

    pub fn parse_bytes(&mut self, input: &[u8]) -> Result<ParseSummary, ParseError> {
        let capacity = self.buffer_size.unwrap_or_else(|| {
            input
                .len()
                .clamp(SMALL_INPUT_BUFFER_SIZE, DEFAULT_BUFFER_SIZE)
        });
        self.run(input, capacity)
    }

    /// Parse a stream. The only blocking happens inside `reader.read`.
    pub fn parse_reader<R: Read>(&mut self, reader: R) -> Result<ParseSummary, ParseError> {
        let capacity = self.buffer_size.unwrap_or(DEFAULT_BUFFER_SIZE);
        self.run(reader, capacity)
    }

    pub fn parse_file<P: AsRef<Path>>(&mut self, path: P) -> Result<ParseSummary, ParseError> {
        let file = File::open(path)?;
        self.parse_reader(file)
    }

    fn run<R: Read>(&mut self, reader: R, capacity: usize) -> Result<ParseSummary, ParseError> {
        let cursor = ParseCursor {
            source: CharSource::new(reader, capacity)?,
            handler: &mut self.handler,
            diagnostics: &mut self.diagnostics,
            summary: ParseSummary::default(),
        };
        let summary = cursor.parse()?;
        self.diagnostics.finished(&summary);
        Ok(summary)
    }
}

/// State of a single parse call
struct ParseCursor<'a, R, H, D> {
    source: CharSource<R>,
    handler: &'a mut H,
    diagnostics: &'a mut D,
    summary: ParseSummary,
}

impl<R: Read, H: PltHandler, D: Diagnostics> ParseCursor<'_, R, H, D> {
    fn parse(mut self) -> Result<ParseSummary, ParseError> {
        self.read()?;
        self.skip_to_initialize()?;
        self.skip_whitespace()?;

        while !self.source.is_end_of_text() {
            self.read_command()?;
            self.summary.commands += 1;
            self.skip_whitespace()?;
        }

        Ok(self.summary)
    }

    /// Discard vendor prologue bytes up to and including `IN;`
    fn skip_to_initialize(&mut self) -> Result<(), ParseError> {
        let mut previous = None;
        loop {
            let Some(byte) = self.source.current() else {
                debug!("end of input reached before initialize");
                return Ok(());
            };
            self.read()?;
            if previous == Some(b'I') && byte == b'N' {
                break;
            }
            previous = Some(byte);
        }
        self.read_required(b';')?;
        self.summary.initialized = true;
        self.emit(H::initialize)
    }

    fn read_command(&mut self) -> Result<(), ParseError> {
        let location = self.source.location();
        let (operation, code) = self.read_operation()?;
        match operation {
            Operation::Initialize => self.read_no_argument(H::initialize),
            Operation::PenDown => self.read_no_argument(H::pen_down),
            Operation::PenUp => self.read_no_argument(H::pen_up),
            Operation::SelectPen => self.read_optional_int_argument(H::select_pen, H::reset_pen),
            Operation::PlotAbsolute => self.read_two_int_arguments(H::plot_absolute),
            _ => self.skip_unsupported(Warning {
                operation,
                code,
                location,
            }),
        }
    }

    fn read_operation(&mut self) -> Result<(Operation, String), ParseError> {
        self.source.start_capture();
        self.read()?;
        self.read()?;
        let code = self.source.end_capture();
        Ok((Operation::from_code(&code), code))
    }

    /// `<opcode>;`
    fn read_no_argument(
        &mut self,
        event: impl FnOnce(&mut H) -> Result<(), HandlerError>,
    ) -> Result<(), ParseError> {
        self.skip_whitespace()?;
        self.read_required(b';')?;
        self.emit(event)
    }

    /// `<opcode>[<int>];`
    fn read_optional_int_argument(
        &mut self,
        with_argument: impl FnOnce(&mut H, i32) -> Result<(), HandlerError>,
        without_argument: impl FnOnce(&mut H) -> Result<(), HandlerError>,
    ) -> Result<(), ParseError> {
        self.skip_whitespace()?;
        let argument = match self.source.current() {
            Some(byte) if byte == b'-' || byte.is_ascii_digit() => Some(self.read_int()?),
            _ => None,
        };
        self.skip_whitespace()?;
        self.read_required(b';')?;
        match argument {
            Some(value) => self.emit(|handler| with_argument(handler, value)),
            None => self.emit(without_argument),
        }
    }

    /// `<opcode><int>,<int>;`
    fn read_two_int_arguments(
        &mut self,
        event: impl FnOnce(&mut H, i32, i32) -> Result<(), HandlerError>,
    ) -> Result<(), ParseError> {
        self.skip_whitespace()?;
        let first = self.read_int()?;
        self.skip_whitespace()?;
        self.read_required(b',')?;
        self.skip_whitespace()?;
        let second = self.read_int()?;
        self.skip_whitespace()?;
        self.read_required(b';')?;
        self.emit(|handler| event(handler, first, second))
    }

    fn skip_unsupported(&mut self, warning: Warning) -> Result<(), ParseError> {
        while let Some(byte) = self.source.current() {
            if byte == b';' {
                break;
            }
            self.read()?;
        }
        self.read_required(b';')?;
        self.summary.unsupported += 1;
        self.diagnostics.unsupported_operation(&warning);
        Ok(())
    }

    /// `-?(0|[1-9][0-9]*)` as an `i32`
    fn read_int(&mut self) -> Result<i32, ParseError> {
        self.source.start_capture();
        self.read_char(b'-')?;
        let first_digit = self.source.current();
        if !self.read_digit()? {
            return Err(self.expected("digit"));
        }
        if first_digit != Some(b'0') {
            while self.read_digit()? {}
        }
        let literal = self.source.end_capture();
        literal
            .parse()
            .map_err(|_| self.expected("integer within 32-bit range"))
    }

    fn read_required(&mut self, expected: u8) -> Result<(), ParseError> {
        if self.read_char(expected)? {
            Ok(())
        } else {
            Err(self.expected(format!("'{}'", char::from(expected))))
        }
    }

    fn read_char(&mut self, expected: u8) -> Result<bool, ParseError> {
        if self.source.current() != Some(expected) {
            return Ok(false);
        }
        self.read()?;
        Ok(true)
    }

    fn read_digit(&mut self) -> Result<bool, ParseError> {
        match self.source.current() {
            Some(byte) if byte.is_ascii_digit() => {
                self.read()?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn skip_whitespace(&mut self) -> Result<(), ParseError> {
        while self.source.current().is_some_and(is_whitespace) {
            self.read()?;
        }
        Ok(())
    }

    fn read(&mut self) -> Result<(), ParseError> {
        self.source.advance()?;
        Ok(())
    }

    fn emit(
        &mut self,
        event: impl FnOnce(&mut H) -> Result<(), HandlerError>,
    ) -> Result<(), ParseError> {
        event(&mut *self.handler).map_err(|source| ParseError::Handler {
            source,
            location: self.source.location(),
        })
    }

    fn expected(&self, expected: impl Into<String>) -> ParseError {
        ParseError::expected(expected, self.source.location())
    }
}

/// ASCII whitespace plus vertical tab and the file/group/record/unit separators
fn is_whitespace(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\n' | 0x0B | 0x0C | b'\r' | 0x1C..=0x1F)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{Command, Location};

    fn recorder() -> PltParser<Vec<Command>, Vec<Warning>> {
        PltParser::with_diagnostics(Vec::new(), Vec::new())
    }

    fn parse(input: &str) -> Result<Vec<Command>, ParseError> {
        let mut parser = recorder();
        parser.parse_str(input)?;
        Ok(parser.into_parts().0)
    }

    fn parse_err(input: &str) -> ParseError {
        parse(input).expect_err("parse should fail")
    }

    #[test]
    fn test_parser_no_argument_commands() {
        assert_eq!(
            parse("IN;PD;PU;").unwrap(),
            vec![Command::Initialize, Command::PenDown, Command::PenUp]
        );
    }

    #[test]
    fn test_parser_select_pen_and_plot() {
        assert_eq!(
            parse("IN;SP3;PA10,20;").unwrap(),
            vec![
                Command::Initialize,
                Command::SelectPen(3),
                Command::PlotAbsolute { x: 10, y: 20 }
            ]
        );
    }

    #[test]
    fn test_parser_reset_pen() {
        assert_eq!(
            parse("IN;SP;").unwrap(),
            vec![Command::Initialize, Command::ResetPen]
        );
        assert_eq!(
            parse("IN;SP ;").unwrap(),
            vec![Command::Initialize, Command::ResetPen]
        );
    }

    #[test]
    fn test_parser_negative_arguments() {
        assert_eq!(
            parse("IN;SP-2;PA-10,-0;").unwrap(),
            vec![
                Command::Initialize,
                Command::SelectPen(-2),
                Command::PlotAbsolute { x: -10, y: 0 }
            ]
        );
    }

    #[test]
    fn test_parser_whitespace_between_tokens() {
        assert_eq!(
            parse("IN;\n  PA 10 ,\t20 ;\r\nPD ;\n").unwrap(),
            vec![
                Command::Initialize,
                Command::PlotAbsolute { x: 10, y: 20 },
                Command::PenDown
            ]
        );
    }

    #[test]
    fn test_parser_integer_bounds() {
        assert_eq!(
            parse("IN;PA2147483647,-2147483648;").unwrap()[1],
            Command::PlotAbsolute {
                x: i32::MAX,
                y: i32::MIN
            }
        );

        let err = parse_err("IN;PA2147483648,0;");
        assert!(err.is_syntax());
        assert_eq!(err.location().unwrap().offset, 15);
        assert!(err.to_string().contains("integer within 32-bit range"));
    }

    #[test]
    fn test_parser_extra_argument_is_an_error() {
        let err = parse_err("IN;PA1,2,3;");
        match err {
            ParseError::Syntax { expected, location } => {
                assert_eq!(expected, "';'");
                assert_eq!(location, Location::new(8, 1, 9));
            }
            other => panic!("Expected syntax error, got {other:?}"),
        }
    }

    #[test]
    fn test_parser_missing_digit() {
        let err = parse_err("IN;PA,5;");
        assert_eq!(err.to_string(), "Expected digit at 1:6 (offset 5)");

        let err = parse_err("IN;PA-;");
        assert_eq!(err.location().unwrap().offset, 6);
    }

    #[test]
    fn test_parser_leading_zero_ends_literal() {
        let err = parse_err("IN;PA01,2;");
        assert_eq!(err.to_string(), "Expected ',' at 1:7 (offset 6)");
    }

    #[test]
    fn test_parser_digit_inside_literal_not_split_by_whitespace() {
        let err = parse_err("IN;PA1 2,3;");
        assert_eq!(err.to_string(), "Expected ',' at 1:8 (offset 7)");
    }

    #[test]
    fn test_parser_truncated_command() {
        let err = parse_err("IN;PA10,");
        assert_eq!(err.to_string(), "Expected digit at 1:9 (offset 8)");

        let err = parse_err("IN;PD");
        assert_eq!(err.to_string(), "Expected ';' at 1:6 (offset 5)");

        let err = parse_err("IN;P");
        assert_eq!(err.to_string(), "Expected ';' at 1:5 (offset 4)");
    }

    #[test]
    fn test_parser_unknown_opcode_is_skipped() {
        let mut parser = recorder();
        let summary = parser.parse_str("IN;ZZxyz;PD;").unwrap();
        let (commands, warnings) = parser.into_parts();

        assert_eq!(commands, vec![Command::Initialize, Command::PenDown]);
        assert_eq!(
            warnings,
            vec![Warning {
                operation: Operation::Unknown,
                code: "ZZ".to_string(),
                location: Location::new(3, 1, 4),
            }]
        );
        assert_eq!(
            summary,
            ParseSummary {
                commands: 2,
                unsupported: 1,
                initialized: true,
            }
        );
    }

    #[test]
    fn test_parser_recognized_but_unsupported() {
        let mut parser = recorder();
        parser
            .parse_str("IN;SC0,100,0,100;IP 0,0,4000,4000;LT;PR5,5;PG;PU;")
            .unwrap();
        let (commands, warnings) = parser.into_parts();

        assert_eq!(commands, vec![Command::Initialize, Command::PenUp]);
        let skipped: Vec<Operation> = warnings.iter().map(|w| w.operation).collect();
        assert_eq!(
            skipped,
            vec![
                Operation::Scale,
                Operation::Input,
                Operation::LineType,
                Operation::PlotRelative,
                Operation::Page
            ]
        );
    }

    #[test]
    fn test_parser_unsupported_without_terminator() {
        let err = parse_err("IN;LT1");
        assert_eq!(err.to_string(), "Expected ';' at 1:7 (offset 6)");
    }

    #[test]
    fn test_parser_skips_preamble() {
        assert_eq!(
            parse("garbage123IN;PU;").unwrap(),
            vec![Command::Initialize, Command::PenUp]
        );
        assert_eq!(
            parse("\x1b%-12345X@PJL ENTER LANGUAGE=HPGL2\r\nIIN;PD;").unwrap(),
            vec![Command::Initialize, Command::PenDown]
        );
    }

    #[test]
    fn test_parser_preamble_requires_terminator() {
        let err = parse_err("xxIN PD;");
        assert_eq!(err.to_string(), "Expected ';' at 1:5 (offset 4)");
    }

    #[test]
    fn test_parser_no_initialize_is_not_an_error() {
        let mut parser = recorder();
        let summary = parser.parse_str("PD;PU;PA1,2;").unwrap();
        assert_eq!(summary, ParseSummary::default());
        assert!(parser.handler().is_empty());

        assert_eq!(parse("").unwrap(), vec![]);
        assert_eq!(parse("I").unwrap(), vec![]);
    }

    #[test]
    fn test_parser_second_initialize_is_a_command() {
        assert_eq!(
            parse("IN;IN;").unwrap(),
            vec![Command::Initialize, Command::Initialize]
        );
    }

    #[test]
    fn test_parser_error_location_on_later_line() {
        let err = parse_err("IN;\nPD;\n  PA1;");
        assert_eq!(err.location(), Some(Location::new(13, 3, 6)));
    }

    #[test]
    fn test_parser_handler_error_aborts() {
        struct StopAtPenDown(Vec<Command>);

        impl PltHandler for StopAtPenDown {
            fn pen_up(&mut self) -> Result<(), HandlerError> {
                self.0.push(Command::PenUp);
                Ok(())
            }

            fn pen_down(&mut self) -> Result<(), HandlerError> {
                Err("pen jammed".into())
            }
        }

        let mut parser = PltParser::new(StopAtPenDown(Vec::new()));
        let err = parser.parse_str("IN;PU;PD;PU;").unwrap_err();
        assert!(matches!(err, ParseError::Handler { .. }));
        assert_eq!(err.location().unwrap().offset, 9);
        assert_eq!(parser.handler().0, vec![Command::PenUp]);
    }

    #[test]
    fn test_parser_small_buffers_match_large() {
        let input = "PJL header\nIN;SP12;PA -123456 , 7890123 ;\nPD;ZZ something long;PU;SP;";
        let expected = parse(input).unwrap();
        for size in [1, 2, 3, 5, 7, 10, 1024] {
            let mut parser = recorder().with_buffer_size(size);
            parser.parse_str(input).unwrap();
            assert_eq!(parser.handler(), &expected, "buffer size {size}");
            assert_eq!(parser.diagnostics()[0].code, "ZZ");
        }
    }

    #[test]
    fn test_parser_reused_for_several_inputs() {
        let mut parser = recorder();
        parser.parse_str("IN;PD;").unwrap();
        parser.parse_str("IN;PU;").unwrap();
        assert_eq!(
            parser.handler(),
            &vec![
                Command::Initialize,
                Command::PenDown,
                Command::Initialize,
                Command::PenUp
            ]
        );
    }

    #[test]
    fn test_parser_invalid_buffer_size() {
        let mut parser = PltParser::new(Vec::<Command>::new()).with_buffer_size(0);
        let err = parser.parse_str("IN;").unwrap_err();
        assert!(matches!(err, ParseError::InvalidBufferSize { size: 0 }));
    }
}
