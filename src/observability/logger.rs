//! Structured JSON logger
//!
//! - One log line = one event
//! - `ts`, `event`, `severity` first, then fields sorted by key
//! - INFO and WARN go to stdout, ERROR and FATAL to stderr
//! - Synchronous, no buffering
//!
//! Callers must never pass key material, tags, or payloads as field values.

use std::fmt;
use std::io::{self, Write};

use chrono::{SecondsFormat, Utc};

/// Log severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Normal operations
    Info = 1,
    /// Recoverable issues, including detected corruption
    Warn = 2,
    /// Operation failures
    Error = 3,
    /// Startup cannot continue
    Fatal = 4,
}

impl Severity {
    /// Returns the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "INFO",
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
            Severity::Fatal => "FATAL",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A structured logger that outputs JSON lines
pub struct Logger;

impl Logger {
    /// Log an event with the given severity and fields
    pub fn log(severity: Severity, event: &str, fields: &[(&str, &str)]) {
        let ts = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        let line = Self::render(&ts, severity, event, fields);
        if severity >= Severity::Error {
            Self::emit(&mut io::stderr(), &line);
        } else {
            Self::emit(&mut io::stdout(), &line);
        }
    }

    fn emit<W: Write>(writer: &mut W, line: &str) {
        // Logging must never take the process down.
        let _ = writer.write_all(line.as_bytes());
        let _ = writer.flush();
    }

    /// Render one log line, newline-terminated
    pub fn render(ts: &str, severity: Severity, event: &str, fields: &[(&str, &str)]) -> String {
        let mut output = String::with_capacity(128);

        output.push_str("{\"ts\":\"");
        Self::escape_json_string(&mut output, ts);
        output.push_str("\",\"event\":\"");
        Self::escape_json_string(&mut output, event);
        output.push_str("\",\"severity\":\"");
        output.push_str(severity.as_str());
        output.push('"');

        let mut sorted_fields: Vec<_> = fields.iter().collect();
        sorted_fields.sort_by_key(|(k, _)| *k);

        for (key, value) in sorted_fields {
            output.push_str(",\"");
            Self::escape_json_string(&mut output, key);
            output.push_str("\":\"");
            Self::escape_json_string(&mut output, value);
            output.push('"');
        }

        output.push_str("}\n");
        output
    }

    fn escape_json_string(output: &mut String, s: &str) {
        for c in s.chars() {
            match c {
                '"' => output.push_str("\\\""),
                '\\' => output.push_str("\\\\"),
                '\n' => output.push_str("\\n"),
                '\r' => output.push_str("\\r"),
                '\t' => output.push_str("\\t"),
                c if c.is_control() => {
                    output.push_str(&format!("\\u{:04x}", c as u32));
                }
                c => output.push(c),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TS: &str = "2026-01-01T00:00:00.000Z";

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Info < Severity::Warn);
        assert!(Severity::Warn < Severity::Error);
        assert!(Severity::Error < Severity::Fatal);
    }

    #[test]
    fn test_render_is_valid_json() {
        let line = Logger::render(TS, Severity::Warn, "RECORD_TAG_MISMATCH", &[("sequence", "4")]);
        let parsed: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(parsed["ts"], TS);
        assert_eq!(parsed["event"], "RECORD_TAG_MISMATCH");
        assert_eq!(parsed["severity"], "WARN");
        assert_eq!(parsed["sequence"], "4");
    }

    #[test]
    fn test_fields_sorted() {
        let a = Logger::render(TS, Severity::Info, "E", &[("zebra", "1"), ("apple", "2")]);
        let b = Logger::render(TS, Severity::Info, "E", &[("apple", "2"), ("zebra", "1")]);
        assert_eq!(a, b);
        assert!(a.find("apple").unwrap() < a.find("zebra").unwrap());
    }

    #[test]
    fn test_escapes_special_chars() {
        let line = Logger::render(TS, Severity::Info, "E", &[("path", "a \"b\"\n\u{1}")]);
        let parsed: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(parsed["path"], "a \"b\"\n\u{1}");
    }

    #[test]
    fn test_one_line() {
        let line = Logger::render(TS, Severity::Info, "E", &[("a", "1"), ("b", "2")]);
        assert_eq!(line.matches('\n').count(), 1);
        assert!(line.ends_with('\n'));
    }
}
