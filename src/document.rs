//! In-memory INI document
//!
//! [`IniDocument`] is an [`EventConsumer`] that copies every event into an
//! insertion-ordered map of sections, keeping malformed lines as
//! diagnostics instead of stopping.

use crate::error::{IniError, LineError};
use crate::parser::{EventConsumer, IniParser, ParseEvent, ParserConfig};
use indexmap::IndexMap;
use serde::Serialize;
use std::convert::Infallible;
use std::fs::File;
use std::io::{BufReader, Read};
use std::ops::ControlFlow;
use std::path::Path;

/// Entries of one section, in file order
pub type IniSection = IndexMap<String, String>;

/// A malformed line recorded while building a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Line number (1-based)
    pub line: usize,
    pub kind: LineError,
}

/// Sections and entries collected from one INI source
///
/// Entries that appear before any section header are stored under the
/// empty section name. A repeated key keeps its last value.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IniDocument {
    sections: IndexMap<String, IniSection>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    diagnostics: Vec<Diagnostic>,
}

impl IniDocument {
    /// Creates an empty document
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses INI text with the given configuration
    pub fn from_str_with_config(input: &str, config: ParserConfig) -> Self {
        let mut document = Self::new();
        let mut parser = IniParser::with_config(input.as_bytes(), config);
        // Reading from a byte slice cannot fail and the document never aborts
        let _ = parser.parse(&mut document);
        document
    }

    /// Parses INI text with the default configuration
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(input: &str) -> Self {
        Self::from_str_with_config(input, ParserConfig::default())
    }

    /// Parses INI data from any reader
    pub fn from_reader<R: Read>(reader: R, config: ParserConfig) -> Result<Self, IniError<Infallible>> {
        let mut document = Self::new();
        IniParser::with_config(BufReader::new(reader), config).parse(&mut document)?;
        Ok(document)
    }

    /// Parses an INI file
    pub fn from_file<P: AsRef<Path>>(path: P, config: ParserConfig) -> Result<Self, IniError<Infallible>> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| IniError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(file, config)
    }

    /// Returns the entries of a section
    pub fn section(&self, name: &str) -> Option<&IniSection> {
        self.sections.get(name)
    }

    /// Looks up a value by section and key
    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.sections
            .get(section)
            .and_then(|entries| entries.get(key))
            .map(String::as_str)
    }

    /// Iterates over sections in file order
    pub fn sections(&self) -> impl Iterator<Item = (&str, &IniSection)> {
        self.sections
            .iter()
            .map(|(name, entries)| (name.as_str(), entries))
    }

    /// Returns the malformed lines seen while parsing
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

impl EventConsumer for IniDocument {
    type Abort = Infallible;

    fn consume(&mut self, event: &ParseEvent<'_>) -> ControlFlow<Infallible> {
        match event {
            ParseEvent::SectionHeader { name, .. } => {
                self.sections.entry(name.to_string()).or_default();
            }
            ParseEvent::Entry {
                section,
                key,
                value,
                ..
            } => {
                self.sections
                    .entry(section.to_string())
                    .or_default()
                    .insert(key.to_string(), value.to_string());
            }
            ParseEvent::Error { line, kind } => {
                self.diagnostics.push(Diagnostic {
                    line: *line,
                    kind: *kind,
                });
            }
        }
        ControlFlow::Continue(())
    }
}
