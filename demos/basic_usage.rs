//! Basic usage example for the INI parser
//!
//! Streams the events of an INI file to stdout. Pass a path as the first
//! argument, or run without one to parse a small bundled unit file.
//!
//! ```text
//! cargo run --example basic_usage -- /usr/share/applications/firefox.desktop
//! ```

use ini_lexer::{IniError, ParseEvent, ParserConfig, parse_file};
use std::ops::ControlFlow;
use std::path::PathBuf;

const SAMPLE: &str = "\
# Sample systemd unit
[Unit]
Description=Example service

[Service]
ExecStart=/usr/bin/server \\
    --port 8080 \\
    --verbose
Restart = on-failure
not a valid line
";

fn main() -> Result<(), IniError> {
    let (path, bundled) = match std::env::args_os().nth(1) {
        Some(path) => (PathBuf::from(path), false),
        None => {
            let path = std::env::temp_dir().join(format!("basic-usage-{}.service", std::process::id()));
            std::fs::write(&path, SAMPLE)?;
            (path, true)
        }
    };

    println!("Parsing {}", path.display());
    let mut errors = 0usize;
    let result = parse_file(&path, ParserConfig::default(), &mut |event: &ParseEvent<'_>| -> ControlFlow<()> {
        match event {
            ParseEvent::SectionHeader { line, name } => println!("{line:>4}  [{name}]"),
            ParseEvent::Entry {
                line, key, value, ..
            } => println!("{line:>4}    {key} = {value:?}"),
            ParseEvent::Error { line, kind } => {
                errors += 1;
                println!("{line:>4}  error: {kind}");
            }
        }
        ControlFlow::Continue(())
    });

    if bundled {
        std::fs::remove_file(&path)?;
    }
    if let Some(code) = result.as_ref().err().and_then(IniError::os_error_code) {
        eprintln!("open failed with code {code}");
    }
    result?;

    println!("Done, {errors} malformed line(s)");
    Ok(())
}
