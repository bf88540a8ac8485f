//! Helpers shared by the resource commands

use crate::cli::OutputFormat;
use crate::error::{CtlError, Result as CliResult};
use crate::output::{self, print_output};
use anyhow::Context;
use dialoguer::Confirm;
use serde::Serialize;
use serde_json::Value;

/// Print a response, choosing `auto_format` when the user asked for `auto`
pub fn print_result<T: Serialize>(
    data: T,
    output_format: OutputFormat,
    auto_format: output::OutputFormat,
    query: Option<&str>,
) -> CliResult<()> {
    let format = output::OutputFormat::resolve(output_format, auto_format);
    print_output(data, format, query).map_err(|e| CtlError::OutputError {
        message: format!("{:#}", e),
    })
}

/// Read JSON from a literal string, `@file`, or `-` for stdin
pub fn read_json_data(data: &str) -> CliResult<Value> {
    let (json_str, source) = if data == "-" {
        use std::io::Read;
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read from stdin")?;
        (buffer, "stdin".to_string())
    } else if let Some(file_path) = data.strip_prefix('@') {
        let content = std::fs::read_to_string(file_path).map_err(|e| CtlError::FileError {
            path: file_path.to_string(),
            message: e.to_string(),
        })?;
        (content, file_path.to_string())
    } else {
        (data.to_string(), "--data".to_string())
    };

    serde_json::from_str(&json_str).map_err(|e| CtlError::InvalidInput {
        message: format!("Invalid JSON in {}: {}", source, e),
    })
}

/// Confirm an action with the user
///
/// Without a terminal on stdin nothing can be asked, so the action is refused.
pub fn confirm_action(message: &str) -> CliResult<bool> {
    use std::io::IsTerminal;
    if std::io::stdin().is_terminal() {
        Ok(Confirm::new()
            .with_prompt(message)
            .default(false)
            .interact()
            .context("Failed to get user confirmation")?)
    } else {
        eprintln!("Warning: {} Use --force to skip confirmation.", message);
        Ok(false)
    }
}

/// Ask for confirmation unless `force` is set
pub fn ensure_confirmed(force: bool, message: &str) -> CliResult<()> {
    if force || confirm_action(message)? {
        Ok(())
    } else {
        Err(CtlError::Cancelled)
    }
}

/// Use the given password or prompt for one without echo
pub fn password_or_prompt(password: Option<&str>, prompt: &str) -> CliResult<String> {
    match password {
        Some(p) => Ok(p.to_string()),
        None => Ok(rpassword::prompt_password(prompt).context("Failed to read password")?),
    }
}

/// Render an RFC 3339 timestamp in the local timezone; other strings pass through
pub fn format_timestamp(value: &str) -> String {
    match chrono::DateTime::parse_from_rfc3339(value) {
        Ok(ts) => ts
            .with_timezone(&chrono::Local)
            .format("%Y-%m-%d %H:%M:%S %Z")
            .to_string(),
        Err(_) => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_read_json_literal() {
        let value = read_json_data(r#"{"max_connections": 200}"#).unwrap();
        assert_eq!(value["max_connections"], 200);
    }

    #[test]
    fn test_read_json_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"[{{"address": "10.0.0.1"}}]"#).unwrap();
        let arg = format!("@{}", file.path().display());
        let value = read_json_data(&arg).unwrap();
        assert_eq!(value[0]["address"], "10.0.0.1");
    }

    #[test]
    fn test_read_json_missing_file() {
        let err = read_json_data("@/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, CtlError::FileError { .. }));
    }

    #[test]
    fn test_read_json_invalid() {
        let err = read_json_data("{not json").unwrap_err();
        assert!(matches!(err, CtlError::InvalidInput { .. }));
    }

    #[test]
    fn test_format_timestamp_passthrough() {
        assert_eq!(format_timestamp("yesterday"), "yesterday");
        assert!(format_timestamp("2018-03-28T10:20:30Z").starts_with("2018-03-2"));
    }

    #[test]
    fn test_password_given() {
        assert_eq!(password_or_prompt(Some("pw"), "Password: ").unwrap(), "pw");
    }
}
