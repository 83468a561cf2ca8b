//! INI line classifier
//!
//! This module turns one logical line into a [`LineToken`]: a section
//! header, a `key=value` entry, or a rejection. Classification is byte
//! based and ASCII only.
//!
//! Key names accept ASCII alphanumerics and `-`. The desktop entry grammar
//! also lists `.` as a key character; it is deliberately not accepted here,
//! so `a.b=c` is rejected as a bad entry name.

use crate::error::LineError;

/// Bitfield flags for character classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharacterFlags(u8);

impl CharacterFlags {
    /// Whitespace as understood by C `isspace` (space, \t, \n, \v, \f, \r)
    pub const WHITESPACE: Self = Self(1 << 0);
    /// Comment introducers (`#`, `;`)
    pub const COMMENT: Self = Self(1 << 1);
    /// Characters allowed inside `[...]`
    pub const SECTION: Self = Self(1 << 2);
    /// Characters allowed in key names
    pub const KEY: Self = Self(1 << 3);

    /// Creates empty flags
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Returns the union of two flag sets
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Checks if any of the given flags are set
    pub const fn intersects(self, other: Self) -> bool {
        (self.0 & other.0) != 0
    }

    /// Returns true if no flags are set
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl std::ops::BitOr for CharacterFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.union(rhs)
    }
}

/// Character lookup table for O(1) character classification
#[derive(Debug, Clone)]
pub struct CharacterTable([CharacterFlags; 256]);

impl CharacterTable {
    /// Creates a new character table with compile-time initialization
    pub const fn new() -> Self {
        let mut table = [CharacterFlags::empty(); 256];
        let mut i = 0;

        while i < 256 {
            let ch = i as u8;
            let mut flags = CharacterFlags::empty();

            match ch {
                b' ' | b'\t' | b'\n' | 0x0b | 0x0c | b'\r' => {
                    flags = flags.union(CharacterFlags::WHITESPACE)
                }
                _ => {}
            }

            // '#' from the desktop entry grammar, ';' from systemd
            match ch {
                b'#' | b';' => flags = flags.union(CharacterFlags::COMMENT),
                _ => {}
            }

            // Everything except brackets and control characters
            match ch {
                b'[' | b']' | 0..=0x1f | 0x7f => {}
                _ => flags = flags.union(CharacterFlags::SECTION),
            }

            match ch {
                b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'-' => {
                    flags = flags.union(CharacterFlags::KEY)
                }
                _ => {}
            }

            table[i] = flags;
            i += 1;
        }

        Self(table)
    }

    /// Tests if a character has any of the given flags
    #[inline(always)]
    pub const fn test_character(&self, ch: u8, flags: CharacterFlags) -> bool {
        self.0[ch as usize].intersects(flags)
    }

    #[inline(always)]
    pub const fn is_whitespace(&self, ch: u8) -> bool {
        self.test_character(ch, CharacterFlags::WHITESPACE)
    }

    #[inline(always)]
    pub const fn is_comment(&self, ch: u8) -> bool {
        self.test_character(ch, CharacterFlags::COMMENT)
    }

    #[inline(always)]
    pub const fn is_section_char(&self, ch: u8) -> bool {
        self.test_character(ch, CharacterFlags::SECTION)
    }

    #[inline(always)]
    pub const fn is_key_char(&self, ch: u8) -> bool {
        self.test_character(ch, CharacterFlags::KEY)
    }
}

impl Default for CharacterTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Global character table instance
pub static CHARACTER_TABLE: CharacterTable = CharacterTable::new();

/// Result of classifying a logical line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineToken<'a> {
    /// `[name]`, with `name` taken verbatim from between the brackets
    Section(&'a [u8]),
    /// `key=value`; the value keeps any trailing whitespace
    Entry { key: &'a [u8], value: &'a [u8] },
}

/// Returns `line` without its leading whitespace
pub fn skip_whitespace(line: &[u8]) -> &[u8] {
    let start = line
        .iter()
        .position(|&ch| !CHARACTER_TABLE.is_whitespace(ch))
        .unwrap_or(line.len());
    &line[start..]
}

/// Determines if a line is empty, blank, or a comment
///
/// Only whitespace may precede a comment character; anything after it is
/// ignored.
pub fn is_empty_line(line: &[u8]) -> bool {
    for &ch in line {
        if CHARACTER_TABLE.is_comment(ch) {
            return true;
        }
        if !CHARACTER_TABLE.is_whitespace(ch) {
            return false;
        }
    }
    true
}

/// Classifies a logical line that is already known not to be empty
///
/// Leading whitespace must have been stripped by the caller.
pub fn classify(line: &[u8]) -> Result<LineToken<'_>, LineError> {
    match line.first() {
        Some(b'[') => classify_section(line),
        _ => classify_entry(line),
    }
}

fn classify_section(line: &[u8]) -> Result<LineToken<'_>, LineError> {
    let body = &line[1..];
    let end = body
        .iter()
        .position(|&ch| !CHARACTER_TABLE.is_section_char(ch))
        .ok_or(LineError::BadSectionName)?;

    if body[end] != b']' || end == 0 || !is_empty_line(&body[end + 1..]) {
        return Err(LineError::BadSectionName);
    }

    Ok(LineToken::Section(&body[..end]))
}

fn classify_entry(line: &[u8]) -> Result<LineToken<'_>, LineError> {
    let key_end = line
        .iter()
        .position(|&ch| !CHARACTER_TABLE.is_key_char(ch))
        .unwrap_or(line.len());
    let key = &line[..key_end];

    // Whitespace is allowed between the key and '='
    let rest = skip_whitespace(&line[key_end..]);

    match rest.first() {
        Some(b'=') if !key.is_empty() => Ok(LineToken::Entry {
            key,
            value: skip_whitespace(&rest[1..]),
        }),
        _ => Err(LineError::BadEntryName),
    }
}
