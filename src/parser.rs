//! Streaming INI parser
//!
//! This module joins physical lines into logical lines, classifies them,
//! and hands the resulting events to a consumer one logical line at a time.
//! The name of the current section is the only state carried from one
//! logical line to the next.

use crate::error::{IniError, LineError};
use crate::lexer::{self, LineToken};
use crate::reader::{LINE_LENGTH, LineBuffer, LineReader, LineResult};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::io::{self, BufRead};
use std::ops::ControlFlow;

/// Configuration options for the parser
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Maximum logical line size in bytes, including the terminating marker
    pub line_capacity: usize,
    /// Join physical lines ending in a backslash with the following line
    pub line_continuation: bool,
}

impl ParserConfig {
    /// Creates a new parser configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the line capacity (clamped to at least 2)
    pub fn with_line_capacity(mut self, capacity: usize) -> Self {
        self.line_capacity = capacity.max(2);
        self
    }

    /// Enables or disables backslash line continuation
    pub fn with_line_continuation(mut self, enabled: bool) -> Self {
        self.line_continuation = enabled;
        self
    }
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            line_capacity: LINE_LENGTH,
            line_continuation: !cfg!(feature = "no-line-continuation"),
        }
    }
}

/// One parse outcome, tagged with the 1-based line number it ends on
///
/// The strings borrow the parser's internal buffers; copy anything that
/// must outlive the event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseEvent<'a> {
    /// A `[name]` header; subsequent entries belong to `name`
    SectionHeader { line: usize, name: Cow<'a, str> },
    /// A `key=value` entry. `section` is empty before the first header.
    Entry {
        line: usize,
        section: Cow<'a, str>,
        key: Cow<'a, str>,
        value: Cow<'a, str>,
    },
    /// A logical line that could not be parsed
    Error { line: usize, kind: LineError },
}

impl<'a> ParseEvent<'a> {
    /// Returns the line number the event was produced on
    pub fn line(&self) -> usize {
        match self {
            ParseEvent::SectionHeader { line, .. }
            | ParseEvent::Entry { line, .. }
            | ParseEvent::Error { line, .. } => *line,
        }
    }

    /// Returns the error kind for error events
    pub fn error(&self) -> Option<LineError> {
        match self {
            ParseEvent::Error { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ParseEvent::Error { .. })
    }

    /// Copies the borrowed strings, detaching the event from the parser
    pub fn into_owned(self) -> ParseEvent<'static> {
        match self {
            ParseEvent::SectionHeader { line, name } => ParseEvent::SectionHeader {
                line,
                name: Cow::Owned(name.into_owned()),
            },
            ParseEvent::Entry {
                line,
                section,
                key,
                value,
            } => ParseEvent::Entry {
                line,
                section: Cow::Owned(section.into_owned()),
                key: Cow::Owned(key.into_owned()),
                value: Cow::Owned(value.into_owned()),
            },
            ParseEvent::Error { line, kind } => ParseEvent::Error { line, kind },
        }
    }
}

/// Receives parse events synchronously, one per logical line
///
/// Returning [`ControlFlow::Break`] stops the parse; the value is handed
/// back to the caller inside [`IniError::Aborted`].
pub trait EventConsumer {
    /// Value returned when the consumer stops the parse
    type Abort;

    fn consume(&mut self, event: &ParseEvent<'_>) -> ControlFlow<Self::Abort>;
}

impl<F, B> EventConsumer for F
where
    F: FnMut(&ParseEvent<'_>) -> ControlFlow<B>,
{
    type Abort = B;

    fn consume(&mut self, event: &ParseEvent<'_>) -> ControlFlow<B> {
        self(event)
    }
}

/// What happened to a physical line handed to the assembler
enum Assembly {
    /// Blank or comment line; nothing was appended
    Skipped,
    /// Appended, more physical lines follow
    Continued,
    /// Appended, the logical line is complete
    Complete,
    /// The logical line no longer fits the capacity
    Overflow { continued: bool },
}

/// Streaming parser over a buffered byte source
pub struct IniParser<R: BufRead> {
    reader: LineReader<R>,
    config: ParserConfig,
    /// Current physical line
    physical: LineBuffer,
    /// Logical line being assembled
    logical: LineBuffer,
    /// Name of the most recent valid section header
    section: String,
}

impl<R: BufRead> IniParser<R> {
    /// Creates a new parser with default configuration
    pub fn new(reader: R) -> Self {
        Self::with_config(reader, ParserConfig::default())
    }

    /// Creates a new parser with custom configuration
    pub fn with_config(reader: R, config: ParserConfig) -> Self {
        let capacity = config.line_capacity.max(2);
        Self {
            reader: LineReader::new(reader),
            physical: LineBuffer::new(capacity),
            logical: LineBuffer::new(capacity),
            section: String::new(),
            config,
        }
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Returns the name of the current section (empty before any header)
    pub fn current_section(&self) -> &str {
        &self.section
    }

    /// Returns the number of physical lines consumed so far
    pub fn line_number(&self) -> usize {
        self.reader.lines_read()
    }

    /// Consumes the parser, returning the underlying source
    pub fn into_inner(self) -> R {
        self.reader.into_inner()
    }

    /// Reads up to the end of the next logical line and classifies it
    ///
    /// Blank and comment lines are skipped without producing an event.
    /// Returns `Ok(None)` once the source is exhausted.
    pub fn next_event(&mut self) -> io::Result<Option<ParseEvent<'_>>> {
        self.logical.clear();

        loop {
            let result = self.reader.read_physical_line(&mut self.physical)?;
            let line = self.reader.lines_read();

            match result {
                LineResult::EndOfStream => {
                    // A continuation may still be pending when the stream ends
                    if lexer::is_empty_line(self.logical.as_bytes()) {
                        return Ok(None);
                    }
                    return Ok(Some(self.dispatch(line)));
                }
                LineResult::Overflow => {
                    let continued = self.last_line_continues();
                    return self.overflow(line, continued).map(Some);
                }
                LineResult::Line => match self.assemble() {
                    Assembly::Skipped | Assembly::Continued => {}
                    Assembly::Complete => return Ok(Some(self.dispatch(line))),
                    Assembly::Overflow { continued } => {
                        return self.overflow(line, continued).map(Some);
                    }
                },
            }
        }
    }

    /// Parses the whole source, pushing every event into `consumer`
    ///
    /// Stops early only when the consumer breaks or reading fails.
    pub fn parse<C>(&mut self, consumer: &mut C) -> Result<(), IniError<C::Abort>>
    where
        C: EventConsumer + ?Sized,
    {
        while let Some(event) = self.next_event()? {
            if let ControlFlow::Break(abort) = consumer.consume(&event) {
                tracing::debug!(line = event.line(), "parsing aborted by consumer");
                return Err(IniError::Aborted(abort));
            }
        }
        tracing::debug!(lines = self.line_number(), "parsing finished");
        Ok(())
    }

    /// Appends the current physical line to the logical line
    fn assemble(&mut self) -> Assembly {
        let content = lexer::skip_whitespace(self.physical.as_bytes());
        if lexer::is_empty_line(content) {
            return Assembly::Skipped;
        }

        let continued =
            self.config.line_continuation && self.physical.as_bytes().last() == Some(&b'\\');

        if !self.logical.try_extend(content) {
            tracing::debug!(
                line = self.reader.lines_read(),
                capacity = self.logical.capacity(),
                "logical line exceeds capacity"
            );
            return Assembly::Overflow { continued };
        }

        if continued {
            self.logical.replace_last(b' ');
            Assembly::Continued
        } else {
            Assembly::Complete
        }
    }

    /// Whether the physical line just read ends in a continuation backslash
    fn last_line_continues(&self) -> bool {
        self.config.line_continuation && self.reader.last_byte() == Some(b'\\')
    }

    /// Reports an overflow on `line`, dropping the rest of its logical line
    ///
    /// When the offending physical line was continued, the physical lines
    /// joined to it are read and discarded up to the first one that ends
    /// the logical line. Blank and comment lines in between are skipped as
    /// usual and do not end it.
    fn overflow(&mut self, line: usize, mut continued: bool) -> io::Result<ParseEvent<'static>> {
        self.logical.clear();

        while continued {
            continued = match self.reader.read_physical_line(&mut self.physical)? {
                LineResult::EndOfStream => false,
                LineResult::Overflow => self.last_line_continues(),
                LineResult::Line => {
                    let content = lexer::skip_whitespace(self.physical.as_bytes());
                    lexer::is_empty_line(content) || self.last_line_continues()
                }
            };
        }

        if self.reader.lines_read() > line {
            tracing::trace!(
                line,
                skipped = self.reader.lines_read() - line,
                "discarded continuation of overlong line"
            );
        }
        Ok(line_too_long(line))
    }

    /// Classifies the assembled logical line into an event
    fn dispatch(&mut self, line: usize) -> ParseEvent<'_> {
        match lexer::classify(self.logical.as_bytes()) {
            Ok(LineToken::Section(name)) => {
                self.section.clear();
                self.section.push_str(&String::from_utf8_lossy(name));
                tracing::trace!(line, section = %self.section, "section header");
                ParseEvent::SectionHeader {
                    line,
                    name: Cow::Borrowed(self.section.as_str()),
                }
            }
            Ok(LineToken::Entry { key, value }) => {
                tracing::trace!(line, "entry");
                ParseEvent::Entry {
                    line,
                    section: Cow::Borrowed(self.section.as_str()),
                    key: String::from_utf8_lossy(key),
                    value: String::from_utf8_lossy(value),
                }
            }
            Err(kind) => {
                tracing::debug!(line, kind = kind.as_str(), "malformed line");
                ParseEvent::Error { line, kind }
            }
        }
    }
}

fn line_too_long(line: usize) -> ParseEvent<'static> {
    tracing::debug!(line, "line too long");
    ParseEvent::Error {
        line,
        kind: LineError::LineTooLong,
    }
}
