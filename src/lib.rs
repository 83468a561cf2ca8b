//! # INI Rust Lexer
//!
//! A streaming, line-oriented parser for INI-style files as used by XDG
//! desktop entries and systemd units.
//!
//! ## Overview
//!
//! Input is organized into `[section]` headers and `key=value` entries.
//! Blank lines and lines starting with `#` or `;` are ignored, and a line
//! ending in a backslash continues on the next line (the backslash becomes
//! a single space). The parser reads one logical line at a time and hands
//! each result to a consumer, which decides whether parsing goes on.
//!
//! ## Key Features
//!
//! - **Streaming**: constant memory, bounded by a fixed line capacity
//! - **Line endings**: LF, CR, CRLF and LFCR are all accepted, even mixed
//! - **Recoverable errors**: overlong and malformed lines are reported with
//!   their line number and parsing resumes on the next line
//! - **Consumer control**: any consumer can stop the parse mid-file
//!
//! ## Basic Usage
//!
//! ```rust
//! use std::ops::ControlFlow;
//! use ini_lexer::{ParseEvent, ParserConfig, parse_str};
//!
//! let text = "[Desktop Entry]\nName=Text Editor\nExec=editor %U\n";
//! let mut names = Vec::new();
//!
//! parse_str(text, ParserConfig::default(), &mut |event: &ParseEvent<'_>| -> ControlFlow<()> {
//!     if let ParseEvent::Entry { key, value, .. } = event {
//!         names.push(format!("{key}={value}"));
//!     }
//!     ControlFlow::Continue(())
//! })?;
//!
//! assert_eq!(names, ["Name=Text Editor", "Exec=editor %U"]);
//! # Ok::<(), ini_lexer::IniError>(())
//! ```
//!
//! ## Stopping Early
//!
//! ```rust
//! use std::ops::ControlFlow;
//! use ini_lexer::{IniError, ParseEvent, ParserConfig, parse_str};
//!
//! let result = parse_str("oops\nk=v\n", ParserConfig::default(), &mut |event: &ParseEvent<'_>| {
//!     match event.error() {
//!         Some(kind) => ControlFlow::Break(kind),
//!         None => ControlFlow::Continue(()),
//!     }
//! });
//!
//! assert!(matches!(result, Err(IniError::Aborted(_))));
//! ```
//!
//! ## Collecting a Document
//!
//! ```rust
//! use ini_lexer::IniDocument;
//!
//! let document = IniDocument::from_str("[Unit]\nDescription=Demo service\n");
//! assert_eq!(document.get("Unit", "Description"), Some("Demo service"));
//! ```

pub mod document;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod reader;


pub use document::{Diagnostic, IniDocument, IniSection};
pub use error::{IniError, LineError};
pub use lexer::{CharacterTable, LineToken, classify};
pub use parser::{EventConsumer, IniParser, ParseEvent, ParserConfig};
pub use reader::{LINE_LENGTH, LineBuffer, LineReader, LineResult};

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Parses the file at `path`, pushing every event into `consumer`
///
/// Open failures are reported as [`IniError::Open`] without invoking the
/// consumer; [`IniError::os_error_code`] recovers the negated OS error.
pub fn parse_file<P, C>(path: P, config: ParserConfig, consumer: &mut C) -> Result<(), IniError<C::Abort>>
where
    P: AsRef<Path>,
    C: EventConsumer + ?Sized,
{
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| IniError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), "parsing file");
    parse_reader(file, config, consumer)
}

/// Parses INI data from any reader
pub fn parse_reader<R, C>(reader: R, config: ParserConfig, consumer: &mut C) -> Result<(), IniError<C::Abort>>
where
    R: Read,
    C: EventConsumer + ?Sized,
{
    IniParser::with_config(BufReader::new(reader), config).parse(consumer)
}

/// Parses INI text held in memory
pub fn parse_str<C>(input: &str, config: ParserConfig, consumer: &mut C) -> Result<(), IniError<C::Abort>>
where
    C: EventConsumer + ?Sized,
{
    IniParser::with_config(input.as_bytes(), config).parse(consumer)
}
