//! Physical line reader
//!
//! Pulls one physical line at a time from a buffered byte source into a
//! capacity-bounded [`LineBuffer`]. Every line-ending variant (`\n`, `\r`,
//! `\r\n`, `\n\r` and end of stream) is collapsed into a single terminator,
//! and lines that do not fit are skipped up to the next terminator so the
//! following read starts on a clean line boundary.

use memchr::memchr2;
use smallvec::SmallVec;
use std::io::{self, BufRead};

/// Default line capacity, including the terminating marker
///
/// The capacity applies to the raw physical line, so leading whitespace
/// counts against it even though it is stripped before classification.
pub const LINE_LENGTH: usize = 1024;

/// Most configuration lines are short enough to stay on the stack
const INLINE_LINE_BYTES: usize = 128;

/// Capacity-checked byte buffer holding one physical or logical line
///
/// The capacity counts a terminating marker, so at most `capacity - 1`
/// bytes of content are accepted. Appends that would exceed it fail as a
/// whole and leave the buffer untouched. Physical lines are stored
/// unstripped: an indented line overflows once its indentation and content
/// together exceed the capacity.
#[derive(Debug, Clone)]
pub struct LineBuffer {
    bytes: SmallVec<[u8; INLINE_LINE_BYTES]>,
    capacity: usize,
}

impl LineBuffer {
    /// Creates an empty buffer with the given capacity (at least 2)
    pub fn new(capacity: usize) -> Self {
        Self {
            bytes: SmallVec::new(),
            capacity: capacity.max(2),
        }
    }

    /// Returns the capacity, including the terminating marker
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the number of content bytes the buffer can still accept
    pub fn remaining(&self) -> usize {
        self.capacity - 1 - self.bytes.len()
    }

    /// Appends `bytes` if they fit, returning false otherwise
    pub fn try_extend(&mut self, bytes: &[u8]) -> bool {
        if bytes.len() > self.remaining() {
            return false;
        }
        self.bytes.extend_from_slice(bytes);
        true
    }

    /// Appends a single byte if it fits
    pub fn try_push(&mut self, byte: u8) -> bool {
        if self.remaining() == 0 {
            return false;
        }
        self.bytes.push(byte);
        true
    }

    /// Replaces the last byte, if any
    pub fn replace_last(&mut self, byte: u8) {
        if let Some(last) = self.bytes.last_mut() {
            *last = byte;
        }
    }

    /// Empties the buffer, keeping its capacity
    pub fn clear(&mut self) {
        self.bytes.clear();
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Outcome of reading one physical line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineResult {
    /// The source was exhausted before any byte of a new line was read
    EndOfStream,
    /// The line did not fit; the source was advanced past its terminator
    Overflow,
    /// A complete line is in the buffer (terminator stripped)
    Line,
}

/// Reads physical lines from a buffered byte source
pub struct LineReader<R: BufRead> {
    /// Underlying byte source
    inner: R,
    /// Number of physical lines consumed so far
    lines_read: usize,
    /// Last content byte of the most recent physical line, kept on overflow
    last_byte: Option<u8>,
}

impl<R: BufRead> LineReader<R> {
    /// Wraps a buffered byte source
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            lines_read: 0,
            last_byte: None,
        }
    }

    /// Returns the number of physical lines consumed so far
    pub fn lines_read(&self) -> usize {
        self.lines_read
    }

    /// Returns the last content byte of the most recent physical line
    ///
    /// Unlike the buffer contents this survives an overflow, so callers can
    /// still tell whether an overlong line ended in a backslash.
    pub fn last_byte(&self) -> Option<u8> {
        self.last_byte
    }

    /// Returns a reference to the underlying source
    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    /// Consumes the reader, returning the underlying source
    pub fn into_inner(self) -> R {
        self.inner
    }

    /// Reads the next physical line into `line`, replacing its contents
    ///
    /// On [`LineResult::Overflow`] the buffer holds an unspecified prefix of
    /// the line and must not be interpreted.
    pub fn read_physical_line(&mut self, line: &mut LineBuffer) -> io::Result<LineResult> {
        line.clear();
        self.last_byte = None;
        let mut started = false;
        let mut overflowed = false;

        loop {
            let available = match self.inner.fill_buf() {
                Ok(available) => available,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };

            if available.is_empty() {
                if !started {
                    return Ok(LineResult::EndOfStream);
                }
                self.lines_read += 1;
                return Ok(if overflowed {
                    LineResult::Overflow
                } else {
                    LineResult::Line
                });
            }
            started = true;

            match memchr2(b'\r', b'\n', available) {
                Some(end) => {
                    let terminator = available[end];
                    if end > 0 {
                        self.last_byte = Some(available[end - 1]);
                    }
                    if !overflowed && !line.try_extend(&available[..end]) {
                        overflowed = true;
                    }
                    self.inner.consume(end + 1);
                    self.accept_byte(opposite_terminator(terminator))?;
                    self.lines_read += 1;
                    return Ok(if overflowed {
                        LineResult::Overflow
                    } else {
                        LineResult::Line
                    });
                }
                None => {
                    let consumed = available.len();
                    self.last_byte = available.last().copied();
                    if !overflowed && !line.try_extend(available) {
                        overflowed = true;
                    }
                    self.inner.consume(consumed);
                }
            }
        }
    }

    /// Consumes `expected` if it is the next byte of the source
    fn accept_byte(&mut self, expected: u8) -> io::Result<()> {
        loop {
            match self.inner.fill_buf() {
                Ok(available) => {
                    if available.first() == Some(&expected) {
                        self.inner.consume(1);
                    }
                    return Ok(());
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }
}

/// CR pairs with a following LF and LF with a following CR
fn opposite_terminator(terminator: u8) -> u8 {
    if terminator == b'\r' { b'\n' } else { b'\r' }
}
