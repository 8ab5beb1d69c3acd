//! Environment file loading
//!
//! The designated environment file is never written to disk on pull.
//! Its `KEY=VALUE` lines are parsed into [`EnvVars`] and handed to an
//! [`EnvSink`], which is either the real process environment or a map the
//! caller passes on (e.g. to a spawned workload).

use crate::error::{Result, SyncError};
use std::collections::BTreeMap;
use std::io::BufRead;

/// Parsed environment variables, sorted by name
pub type EnvVars = BTreeMap<String, String>;

/// Destination for loaded environment variables
pub trait EnvSink {
    /// Apply every variable, overwriting existing values
    fn apply(&mut self, vars: &EnvVars);
}

/// Writes into the environment of the current process
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessEnv;

impl EnvSink for ProcessEnv {
    fn apply(&mut self, vars: &EnvVars) {
        for (key, value) in vars {
            std::env::set_var(key, value);
        }
    }
}

impl EnvSink for EnvVars {
    fn apply(&mut self, vars: &EnvVars) {
        self.extend(vars.iter().map(|(k, v)| (k.clone(), v.clone())));
    }
}

/// Parse `KEY=VALUE` lines
///
/// - blank lines and lines starting with `#` or `/` are comments
/// - only the first `=` splits; key and value are trimmed separately
/// - lines without `=`, or with an empty key or value, are skipped
/// - a later duplicate overwrites an earlier one
///
/// Read failures (including invalid UTF-8) abort with the 1-based line number.
pub fn parse_env<R: BufRead>(reader: R) -> Result<EnvVars> {
    let mut vars = EnvVars::new();

    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(|source| SyncError::EnvParse {
            line: idx + 1,
            source,
        })?;

        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with('/') {
            continue;
        }

        let Some((key, value)) = line.split_once('=') else {
            continue;
        };

        let key = key.trim();
        let value = value.trim();
        if key.is_empty() || value.is_empty() {
            continue;
        }

        vars.insert(key.to_string(), value.to_string());
    }

    Ok(vars)
}

/// Parse `text` and apply the result to `sink`
pub fn load_env(text: &[u8], sink: &mut dyn EnvSink) -> Result<EnvVars> {
    let vars = parse_env(text)?;
    sink.apply(&vars);
    Ok(vars)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_parse_env_rules() {
        let input = "# comment\nA=1\n B = two words \n/slash-comment\nBARE\nEMPTY=\n=novkey\n";
        let vars = parse_env(input.as_bytes()).unwrap();

        let expected: EnvVars = [("A", "1"), ("B", "two words")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        assert_eq!(vars, expected);
    }

    #[test]
    fn test_split_on_first_equals() {
        let vars = parse_env("DATABASE_URL=postgres://u:p@db/app?sslmode=require".as_bytes()).unwrap();
        assert_eq!(
            vars.get("DATABASE_URL").map(String::as_str),
            Some("postgres://u:p@db/app?sslmode=require")
        );
    }

    #[test]
    fn test_later_duplicate_wins() {
        let vars = parse_env("KEY=first\nKEY=second".as_bytes()).unwrap();
        assert_eq!(vars.get("KEY").map(String::as_str), Some("second"));
    }

    #[test]
    fn test_crlf_and_missing_trailing_newline() {
        let vars = parse_env("A=1\r\nB=2".as_bytes()).unwrap();
        assert_eq!(vars.len(), 2);
        assert_eq!(vars.get("A").map(String::as_str), Some("1"));
        assert_eq!(vars.get("B").map(String::as_str), Some("2"));
    }

    #[test]
    fn test_empty_input() {
        assert!(parse_env("".as_bytes()).unwrap().is_empty());
    }

    #[test]
    fn test_invalid_utf8_reports_line() {
        let input: &[u8] = b"A=1\n# ok\nB=\xff\xfe\n";
        let err = parse_env(input).unwrap_err();
        assert!(matches!(err, SyncError::EnvParse { line: 3, .. }));
        assert!(err.to_string().contains("line 3"));
    }

    #[test]
    fn test_map_sink_merges() {
        let mut sink = EnvVars::new();
        sink.insert("KEEP".to_string(), "yes".to_string());
        sink.insert("A".to_string(), "old".to_string());

        let loaded = load_env(b"A=new\nB=2\n", &mut sink).unwrap();

        assert_eq!(loaded.len(), 2);
        assert_eq!(sink.get("A").map(String::as_str), Some("new"));
        assert_eq!(sink.get("B").map(String::as_str), Some("2"));
        assert_eq!(sink.get("KEEP").map(String::as_str), Some("yes"));
    }

    #[test]
    #[serial]
    fn test_process_sink_overwrites() {
        std::env::set_var("BOOT_SYNC_TEST_OVERWRITE", "before");

        load_env(b"BOOT_SYNC_TEST_OVERWRITE=after\n", &mut ProcessEnv).unwrap();

        assert_eq!(
            std::env::var("BOOT_SYNC_TEST_OVERWRITE").as_deref(),
            Ok("after")
        );
        std::env::remove_var("BOOT_SYNC_TEST_OVERWRITE");
    }
}
