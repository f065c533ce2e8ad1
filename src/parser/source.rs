//! Buffered character source
//!
//! Wraps any [`Read`] behind a fixed-size buffer that is refilled on demand.
//! The source keeps a single byte of lookahead (`current`) and can capture
//! the token being scanned even when the token straddles one or more refills.
//!
//! # Capture
//!
//! A capture is split in two parts: bytes still present in the buffer
//! (`buffer[capture_start..]`) and bytes that were flushed into `overflow`
//! before a refill overwrote them. Every refill during an active capture
//! appends the pending buffer tail to `overflow` and rebases `capture_start`
//! to 0, so `end_capture` only has to concatenate the two parts.

use std::io::{self, ErrorKind, Read};

use super::error::ParseError;
use super::location::Location;

/// Smallest accepted buffer capacity
pub const MIN_BUFFER_SIZE: usize = 1;
/// Buffer capacity used for reader input unless configured otherwise
pub const DEFAULT_BUFFER_SIZE: usize = 1024;

/// Refillable byte buffer with lookahead, capture and location tracking
#[derive(Debug)]
pub struct CharSource<R> {
    reader: R,
    buffer: Box<[u8]>,
    /// Index of the next unread byte in `buffer`
    next: usize,
    /// Number of valid bytes in `buffer`
    fill: usize,
    /// Absolute offset of `buffer[0]` within the stream
    buffer_offset: usize,
    /// Current line, 1-based
    line: usize,
    /// Absolute offset at which the current line starts
    line_offset: usize,
    /// Lookahead byte, `None` before the first advance and at end of input
    current: Option<u8>,
    exhausted: bool,
    /// Buffer index of the first byte of the active capture
    capture_start: Option<usize>,
    /// Captured bytes flushed out of the buffer by refills
    overflow: Vec<u8>,
}

impl<R: Read> CharSource<R> {
    /// Create a source reading from `reader` through a buffer of `capacity` bytes.
    ///
    /// No bytes are read until the first call to [`advance`](Self::advance).
    pub fn new(reader: R, capacity: usize) -> Result<Self, ParseError> {
        if capacity < MIN_BUFFER_SIZE {
            return Err(ParseError::InvalidBufferSize { size: capacity });
        }
        Ok(Self {
            reader,
            buffer: vec![0; capacity].into_boxed_slice(),
            next: 0,
            fill: 0,
            buffer_offset: 0,
            line: 1,
            line_offset: 0,
            current: None,
            exhausted: false,
            capture_start: None,
            overflow: Vec::new(),
        })
    }

    /// The lookahead byte, or `None` at end of input
    pub fn current(&self) -> Option<u8> {
        self.current
    }

    /// Whether the source has been exhausted
    pub fn is_end_of_text(&self) -> bool {
        self.exhausted
    }

    /// Buffer capacity in bytes
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Consume the lookahead byte and load the next one.
    ///
    /// Once the underlying reader is exhausted the lookahead stays `None` and
    /// further calls do nothing.
    pub fn advance(&mut self) -> io::Result<Option<u8>> {
        if self.exhausted {
            return Ok(None);
        }
        if self.next == self.fill {
            self.refill()?;
        }
        if self.current == Some(b'\n') {
            self.line += 1;
            self.line_offset = self.buffer_offset + self.next;
        }
        if self.next == self.fill {
            self.current = None;
            self.exhausted = true;
            return Ok(None);
        }
        let byte = self.buffer[self.next];
        self.next += 1;
        self.current = Some(byte);
        Ok(self.current)
    }

    /// Start capturing at the lookahead byte.
    ///
    /// Any capture already in progress is discarded.
    pub fn start_capture(&mut self) {
        self.overflow.clear();
        self.capture_start = Some(self.cursor());
    }

    /// Finish the active capture and return everything from its start up to,
    /// but excluding, the lookahead byte.
    pub fn end_capture(&mut self) -> String {
        let end = self.cursor();
        let Some(start) = self.capture_start.take() else {
            return String::new();
        };
        self.overflow.extend_from_slice(&self.buffer[start..end]);
        let token = String::from_utf8_lossy(&self.overflow).into_owned();
        self.overflow.clear();
        token
    }

    /// Location of the lookahead byte (or of the end of input)
    pub fn location(&self) -> Location {
        let offset = self.buffer_offset + self.cursor();
        Location::new(offset, self.line, offset - self.line_offset + 1)
    }

    /// Buffer index of the lookahead byte
    fn cursor(&self) -> usize {
        if self.current.is_some() {
            self.next - 1
        } else {
            self.next
        }
    }

    fn refill(&mut self) -> io::Result<()> {
        if let Some(start) = self.capture_start {
            self.overflow.extend_from_slice(&self.buffer[start..self.fill]);
            self.capture_start = Some(0);
        }
        self.buffer_offset += self.fill;
        self.next = 0;
        self.fill = 0;
        self.fill = loop {
            match self.reader.read(&mut self.buffer) {
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                result => break result?,
            }
        };
        Ok(())
    }
}
