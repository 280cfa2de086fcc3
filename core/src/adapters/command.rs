//! Shared helpers for driving OS tools as child processes.

use std::process::Stdio;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

use crate::error::{Error, Result};

/// PowerShell host used for cmdlet-backed adapters.
pub const POWERSHELL: &str = "powershell.exe";

/// Captured result of a finished command.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub success: bool,
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// stdout and stderr joined, for matching tool messages.
    pub fn combined(&self) -> String {
        format!("{} {}", self.stdout, self.stderr)
    }
}

/// Run a program to completion and capture its output.
pub async fn run(program: &str, args: &[&str]) -> Result<CommandOutput> {
    debug!(program, ?args, "Executing command");

    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|e| Error::CommandFailed(format!("Failed to run {}: {}", program, e)))?;

    let result = CommandOutput {
        success: output.status.success(),
        code: output.status.code(),
        stdout: decode_output(&output.stdout),
        stderr: decode_output(&output.stderr),
    };
    debug!(program, code = ?result.code, "Command finished");
    Ok(result)
}

/// Like [`run`], but gives up after `limit`.
///
/// Returns `Ok(None)` on timeout; the child is killed when its future drops.
pub async fn run_with_timeout(
    program: &str,
    args: &[&str],
    limit: Duration,
) -> Result<Option<CommandOutput>> {
    match timeout(limit, run(program, args)).await {
        Ok(result) => result.map(Some),
        Err(_) => Ok(None),
    }
}

/// Run a PowerShell script non-interactively.
pub async fn powershell(script: &str) -> Result<CommandOutput> {
    run(
        POWERSHELL,
        &[
            "-NoProfile",
            "-NonInteractive",
            "-ExecutionPolicy",
            "Bypass",
            "-Command",
            script,
        ],
    )
    .await
}

/// Characters PowerShell accepts as a single-quote delimiter.
const SINGLE_QUOTES: &[char] = &['\'', '\u{2018}', '\u{2019}', '\u{201A}', '\u{201B}'];

/// Quote a value as a PowerShell single-quoted string literal.
///
/// Every quote-like character is doubled, since any of them closes the literal.
pub fn ps_quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('\'');
    for c in value.chars() {
        if SINGLE_QUOTES.contains(&c) {
            quoted.push(c);
        }
        quoted.push(c);
    }
    quoted.push('\'');
    quoted
}

/// Decode tool output that may be UTF-8 or UTF-16LE.
///
/// `wsl.exe` writes its own messages as UTF-16LE, while commands it runs
/// inside the distribution write UTF-8.
pub fn decode_output(bytes: &[u8]) -> String {
    let looks_utf16 = bytes.starts_with(&[0xFF, 0xFE])
        || (bytes.len() >= 4 && bytes.len() % 2 == 0 && bytes[1] == 0 && bytes[3] == 0);

    if looks_utf16 {
        let body = bytes.strip_prefix(&[0xFF, 0xFE]).unwrap_or(bytes);
        let units: Vec<u16> = body
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }

    String::from_utf8_lossy(bytes).into_owned()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

/// Parse `ConvertTo-Json` output into a list of records.
///
/// PowerShell emits nothing for an empty pipeline and a bare object (not an
/// array) for a single result; both are normalized here.
pub fn parse_json_records<T: DeserializeOwned>(text: &str) -> Result<Vec<T>> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(Vec::new());
    }

    let parsed: OneOrMany<T> = serde_json::from_str(text)
        .map_err(|e| Error::ParseError(format!("Unexpected PowerShell JSON: {}", e)))?;

    Ok(match parsed {
        OneOrMany::Many(items) => items,
        OneOrMany::One(item) => vec![item],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Row {
        #[serde(rename = "Name")]
        name: String,
    }

    #[test]
    fn test_decode_utf8() {
        assert_eq!(decode_output(b"172.20.3.4 \n"), "172.20.3.4 \n");
    }

    #[test]
    fn test_decode_utf16le() {
        let text = "WSL is not running";
        let mut bytes = Vec::new();
        for unit in text.encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        assert_eq!(decode_output(&bytes), text);

        let mut with_bom = vec![0xFF, 0xFE];
        with_bom.extend_from_slice(&bytes);
        assert_eq!(decode_output(&with_bom), text);
    }

    #[test]
    fn test_ps_quote() {
        assert_eq!(ps_quote("WSL FastAPI 8000"), "'WSL FastAPI 8000'");
        assert_eq!(ps_quote("it's"), "'it''s'");
    }

    #[test]
    fn test_ps_quote_doubles_typographic_quotes() {
        assert_eq!(ps_quote("Bob\u{2019}s API"), "'Bob\u{2019}\u{2019}s API'");
        assert_eq!(
            ps_quote("\u{2018}x\u{201A}y\u{201B}"),
            "'\u{2018}\u{2018}x\u{201A}\u{201A}y\u{201B}\u{201B}'"
        );
        assert_eq!(ps_quote("\u{201C}quoted\u{201D}"), "'\u{201C}quoted\u{201D}'");
    }

    #[test]
    fn test_parse_json_records_shapes() {
        let none: Vec<Row> = parse_json_records("").unwrap();
        assert!(none.is_empty());

        let one: Vec<Row> = parse_json_records(r#"{"Name":"a"}"#).unwrap();
        assert_eq!(one, vec![Row { name: "a".into() }]);

        let many: Vec<Row> = parse_json_records(r#"[{"Name":"a"},{"Name":"b"}]"#).unwrap();
        assert_eq!(many.len(), 2);
    }

    #[test]
    fn test_parse_json_records_rejects_garbage() {
        let result: Result<Vec<Row>> = parse_json_records("Get-NetRoute : not recognized");
        assert!(matches!(result, Err(Error::ParseError(_))));
    }
}
