//! Error types for INI parsing
//!
//! Per-line problems are reported as [`LineError`] values inside parse
//! events and never stop the parser on their own. [`IniError`] covers the
//! conditions that end a parse call early.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Recoverable problems detected on a single logical line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error, serde::Serialize)]
pub enum LineError {
    /// The logical line does not fit the configured line capacity
    #[error("line too long")]
    LineTooLong,

    /// Malformed `[section]` header
    #[error("bad section name")]
    BadSectionName,

    /// Malformed `key=value` entry
    #[error("bad entry name")]
    BadEntryName,
}

impl LineError {
    /// Returns a stable, machine-friendly name for the error kind
    pub fn as_str(&self) -> &'static str {
        match self {
            LineError::LineTooLong => "line_too_long",
            LineError::BadSectionName => "bad_section_name",
            LineError::BadEntryName => "bad_entry_name",
        }
    }
}

/// Conditions that end a parse call before the end of the stream
///
/// `B` is the value an [`EventConsumer`](crate::EventConsumer) hands back
/// when it asks the parser to stop.
#[derive(Debug, Error)]
pub enum IniError<B = ()> {
    /// The source could not be opened; no events were produced
    #[error("cannot open {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Reading from the source failed mid-stream
    #[error("IO error: {0}")]
    Read(#[from] io::Error),

    /// The consumer asked the parser to stop
    #[error("parsing aborted by consumer")]
    Aborted(B),
}

impl<B> IniError<B> {
    /// Returns the negated platform error code for open failures
    ///
    /// Matches the classic `-errno` return convention of C configuration
    /// readers. Other variants, and open failures that did not originate
    /// from the OS, yield `None`.
    pub fn os_error_code(&self) -> Option<i32> {
        match self {
            IniError::Open { source, .. } => source.raw_os_error().map(|code| -code),
            _ => None,
        }
    }

    /// Returns the consumer's abort value, if that is why parsing stopped
    pub fn abort_value(&self) -> Option<&B> {
        match self {
            IniError::Aborted(value) => Some(value),
            _ => None,
        }
    }

    /// Consumes the error, returning the consumer's abort value if any
    pub fn into_abort_value(self) -> Option<B> {
        match self {
            IniError::Aborted(value) => Some(value),
            _ => None,
        }
    }

    /// Returns true when the consumer stopped the parse
    pub fn is_aborted(&self) -> bool {
        matches!(self, IniError::Aborted(_))
    }
}
