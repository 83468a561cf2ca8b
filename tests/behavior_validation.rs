//! Reference behavior validation tests
//!
//! These scenarios pin down how the parser treats each line shape: blank
//! and comment lines, section headers, entries, continuation, overlong
//! lines and consumer-driven aborts.

use std::io::Write;
use std::ops::ControlFlow;
use ini_lexer::{IniError, LineError, ParseEvent, ParserConfig, parse_file, parse_str};

/// A flattened event that is easy to compare
#[derive(Debug, Clone, PartialEq, Eq)]
enum Seen {
    Section(usize, String),
    Entry(usize, String, String, String),
    Error(usize, LineError),
}

fn record(event: &ParseEvent<'_>) -> Seen {
    match event {
        ParseEvent::SectionHeader { line, name } => Seen::Section(*line, name.to_string()),
        ParseEvent::Entry {
            line,
            section,
            key,
            value,
        } => Seen::Entry(*line, section.to_string(), key.to_string(), value.to_string()),
        ParseEvent::Error { line, kind } => Seen::Error(*line, *kind),
    }
}

fn entry(line: usize, section: &str, key: &str, value: &str) -> Seen {
    Seen::Entry(line, section.into(), key.into(), value.into())
}

fn section(line: usize, name: &str) -> Seen {
    Seen::Section(line, name.into())
}

/// Parses with continuation enabled and a consumer that always continues
fn parse_all(input: &str) -> Vec<Seen> {
    parse_with(input, ParserConfig::new().with_line_continuation(true))
}

fn parse_with(input: &str, config: ParserConfig) -> Vec<Seen> {
    let mut seen = Vec::new();
    parse_str(input, config, &mut |event: &ParseEvent<'_>| -> ControlFlow<()> {
        seen.push(record(event));
        ControlFlow::Continue(())
    })
    .expect("parsing should succeed");
    seen
}

/// Long enough to push a `123=5678...` line past the default capacity
fn long_value() -> String {
    "1234567890".repeat(102)
}

#[cfg(test)]
mod behavior_validation_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_blank_and_comment_only_input() {
        assert_eq!(parse_all("\n\t\t\n \t#\n# \t;\n;"), vec![]);
        assert_eq!(parse_all(""), vec![]);
        assert_eq!(parse_all("   \\\n# \\\n"), vec![]);
    }

    #[test]
    fn test_bad_entries_abort_after_first() {
        let mut seen = Vec::new();
        let result = parse_str(
            "a\n=b\n",
            ParserConfig::default(),
            &mut |event: &ParseEvent<'_>| -> ControlFlow<i32> {
                seen.push(record(event));
                ControlFlow::Break(1)
            },
        );

        assert!(matches!(result, Err(IniError::Aborted(1))));
        assert_eq!(seen, vec![Seen::Error(1, LineError::BadEntryName)]);
    }

    #[test]
    fn test_bad_entries_continue() {
        assert_eq!(
            parse_all("a\n=b\n"),
            vec![
                Seen::Error(1, LineError::BadEntryName),
                Seen::Error(2, LineError::BadEntryName),
            ]
        );
    }

    #[test]
    fn test_section_header_errors() {
        assert_eq!(
            parse_all(
                "[]\n\
                 [[\n\
                 [Group names may contain all ASCII characters except for [ and ] & ctrl chars.\n\
                 [Missing section terminator\n\
                 [Trailing stuff]?\n"
            ),
            vec![
                Seen::Error(1, LineError::BadSectionName),
                Seen::Error(2, LineError::BadSectionName),
                Seen::Error(3, LineError::BadSectionName),
                Seen::Error(4, LineError::BadSectionName),
                Seen::Error(5, LineError::BadSectionName),
            ]
        );
    }

    #[test]
    fn test_empty_section_leaves_section_unset() {
        assert_eq!(
            parse_all("[]\nk=v\n"),
            vec![Seen::Error(1, LineError::BadSectionName), entry(2, "", "k", "v")]
        );
    }

    #[test]
    fn test_key_character_rules() {
        assert_eq!(
            parse_all(
                "[Missing key separator '=']\n\
                 something\n\
                 [Key names may contain characters A-Za-z0-9-.]\n\
                 $huh=$bar\n\
                 [Trailing commented] #comment\n\
                 42=0x2a\n\
                 [Trailing] \t\n\
                 k=v"
            ),
            vec![
                section(1, "Missing key separator '='"),
                Seen::Error(2, LineError::BadEntryName),
                section(3, "Key names may contain characters A-Za-z0-9-."),
                Seen::Error(4, LineError::BadEntryName),
                section(5, "Trailing commented"),
                entry(6, "Trailing commented", "42", "0x2a"),
                section(7, "Trailing"),
                entry(8, "Trailing", "k", "v"),
            ]
        );
    }

    #[test]
    fn test_dot_is_not_a_key_character() {
        assert_eq!(
            parse_all("[S]\nX-Vendor.Option=1\n"),
            vec![section(1, "S"), Seen::Error(2, LineError::BadEntryName)]
        );
    }

    #[test]
    fn test_empty_key() {
        assert_eq!(
            parse_all("[Empty key]\n=value"),
            vec![section(1, "Empty key"), Seen::Error(2, LineError::BadEntryName)]
        );
    }

    #[test]
    fn test_too_long_aborts() {
        let input = format!("[Too long #1]\n123=5678{}\nLong=unrecovered\n", long_value());
        let mut seen = Vec::new();
        let result = parse_str(
            &input,
            ParserConfig::default(),
            &mut |event: &ParseEvent<'_>| -> ControlFlow<i32> {
                seen.push(record(event));
                if event.is_error() {
                    ControlFlow::Break(1)
                } else {
                    ControlFlow::Continue(())
                }
            },
        );

        assert_eq!(result.unwrap_err().into_abort_value(), Some(1));
        assert_eq!(
            seen,
            vec![section(1, "Too long #1"), Seen::Error(2, LineError::LineTooLong)]
        );
    }

    #[test]
    fn test_too_long_recovers() {
        let input = format!("[Too long #2]\n123=5678{}\nLong=recovered\n", long_value());
        assert_eq!(
            parse_all(&input),
            vec![
                section(1, "Too long #2"),
                Seen::Error(2, LineError::LineTooLong),
                entry(3, "Too long #2", "Long", "recovered"),
            ]
        );
    }

    #[test]
    fn test_too_long_continued_line_drops_its_continuation() {
        let config = ParserConfig::new()
            .with_line_capacity(16)
            .with_line_continuation(true);
        assert_eq!(
            parse_with("Exec=abc\\\ndefghijk\\\n--flag=1\nnext=ok\n", config),
            vec![Seen::Error(2, LineError::LineTooLong), entry(4, "", "next", "ok")]
        );
    }

    #[test]
    fn test_too_long_physical_line_inside_continuation() {
        let input = format!(
            "[Too long #3]\nExec=run \\\n  --data={} \\\n  --flag=1\nLong=recovered\n",
            long_value()
        );
        assert_eq!(
            parse_all(&input),
            vec![
                section(1, "Too long #3"),
                Seen::Error(3, LineError::LineTooLong),
                entry(5, "Too long #3", "Long", "recovered"),
            ]
        );
    }

    #[test]
    fn test_indentation_counts_against_capacity() {
        let config = ParserConfig::new().with_line_capacity(8);
        assert_eq!(
            parse_with("k=value\n   k=value\n", config),
            vec![entry(1, "", "k", "value"), Seen::Error(2, LineError::LineTooLong)]
        );
    }

    #[test]
    fn test_longest_line_that_fits() {
        let config = ParserConfig::default();
        let fits = format!("k={}", "v".repeat(config.line_capacity - 3));
        let too_long = format!("k={}", "v".repeat(config.line_capacity - 2));
        let input = format!("{fits}\n{too_long}\n");

        let seen = parse_with(&input, config);
        assert_eq!(seen.len(), 2);
        assert!(matches!(&seen[0], Seen::Entry(1, _, key, _) if key == "k"));
        assert_eq!(seen[1], Seen::Error(2, LineError::LineTooLong));
    }

    #[test]
    fn test_section_without_trailing_newline() {
        assert_eq!(parse_all("[Empty Section]"), vec![section(1, "Empty Section")]);
    }

    #[test]
    fn test_continuation_and_whitespace() {
        assert_eq!(
            parse_all(
                "[Section]\n\
                 key\t =\t\\\n\
                 long\\\n\
                 value\n  \
                 [ Section 2 ]\n  \
                 key  =  value1  \n\
                 key=value2  \n\
                 key=value3\n"
            ),
            vec![
                section(1, "Section"),
                entry(4, "Section", "key", "long value"),
                section(5, " Section 2 "),
                entry(6, " Section 2 ", "key", "value1  "),
                entry(7, " Section 2 ", "key", "value2  "),
                entry(8, " Section 2 ", "key", "value3"),
            ]
        );
    }

    #[test]
    fn test_single_continued_entry() {
        let seen = parse_all("[Section]\nkey = \\\nlong\\\nvalue\n");
        let entries: Vec<&Seen> = seen
            .iter()
            .filter(|seen| matches!(seen, Seen::Entry(..)))
            .collect();
        assert_eq!(entries, vec![&entry(4, "Section", "key", "long value")]);
    }

    #[test]
    fn test_carriage_return_file() {
        assert_eq!(
            parse_all(
                "[Section C]\r\
                 Key=Value\\\r\
                 # this line is ignored\r\
                 ; this line is ignored too\r\
                 ...continued\r\
                 syntax\r"
            ),
            vec![
                section(1, "Section C"),
                entry(5, "Section C", "Key", "Value ...continued"),
                Seen::Error(6, LineError::BadEntryName),
            ]
        );
    }

    #[test]
    fn test_continuation_disabled_by_config() {
        let config = ParserConfig::new().with_line_continuation(false);
        assert_eq!(
            parse_with("[S]\nExec=run \\\n--flag\n", config),
            vec![
                section(1, "S"),
                entry(2, "S", "Exec", "run \\"),
                Seen::Error(3, LineError::BadEntryName),
            ]
        );
    }

    #[test]
    fn test_independent_parses_are_identical() {
        let input = "[A]\nx=1\n[B]\ny = 2 \\\n  3\nz=\n";
        let first = parse_all(input);
        let second = parse_all(input);
        assert_eq!(first, second);
        assert_eq!(first.len(), 5);
    }

    #[test]
    fn test_parse_file_round_trip() {
        let path = std::env::temp_dir().join(format!("ini-lexer-{}.ini", std::process::id()));
        {
            let mut file = std::fs::File::create(&path).unwrap();
            file.write_all(b"[Unit]\r\nDescription=From disk\r\n").unwrap();
        }

        let mut seen = Vec::new();
        parse_file(&path, ParserConfig::default(), &mut |event: &ParseEvent<'_>| -> ControlFlow<()> {
            seen.push(record(event));
            ControlFlow::Continue(())
        })
        .unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(
            seen,
            vec![section(1, "Unit"), entry(2, "Unit", "Description", "From disk")]
        );
    }
}
