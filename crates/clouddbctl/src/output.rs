use anyhow::{Context, Result};
use comfy_table::Table;
use jpx_core::Runtime;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use std::sync::OnceLock;

/// Global JMESPath runtime with extended functions
static JMESPATH_RUNTIME: OnceLock<Runtime> = OnceLock::new();

pub fn get_jmespath_runtime() -> &'static Runtime {
    JMESPATH_RUNTIME.get_or_init(|| Runtime::builder().with_all_extensions().build())
}

/// Quote bare backtick literals so `` `foo` `` compiles as `` `"foo"` ``.
///
/// Literals that already parse as JSON (numbers, booleans, null, quoted
/// strings, arrays, objects) are left alone.
fn normalize_backtick_literals(query: &str) -> String {
    static BACKTICK_RE: OnceLock<Option<Regex>> = OnceLock::new();
    let Some(re) = BACKTICK_RE
        .get_or_init(|| Regex::new(r"`([^`\\]*(?:\\.[^`\\]*)*)`").ok())
        .as_ref()
    else {
        return query.to_string();
    };

    re.replace_all(query, |caps: &regex::Captures| {
        let content = &caps[1];
        let trimmed = content.trim();

        if serde_json::from_str::<Value>(trimmed).is_ok() {
            format!("`{}`", content)
        } else {
            let escaped = trimmed.replace('\\', "\\\\").replace('"', "\\\"");
            format!("`\"{}\"`", escaped)
        }
    })
    .into_owned()
}

pub fn compile_jmespath(
    query: &str,
) -> std::result::Result<jpx_core::Expression<'static>, jpx_core::JmespathError> {
    let normalized = normalize_backtick_literals(query);
    get_jmespath_runtime().compile(&normalized)
}

/// Apply a JMESPath query to a JSON value
pub fn apply_query(value: &Value, query: &str) -> Result<Value> {
    let expr = compile_jmespath(query)
        .with_context(|| format!("Invalid JMESPath expression: {}", query))?;
    expr.search(value).context("JMESPath query failed")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
    Table,
}

impl OutputFormat {
    /// Map the user's choice, using `auto` for `--output auto`
    pub fn resolve(requested: crate::cli::OutputFormat, auto: OutputFormat) -> Self {
        match requested {
            crate::cli::OutputFormat::Auto => auto,
            crate::cli::OutputFormat::Json => OutputFormat::Json,
            crate::cli::OutputFormat::Yaml => OutputFormat::Yaml,
            crate::cli::OutputFormat::Table => OutputFormat::Table,
        }
    }
}

pub fn print_output<T: Serialize>(
    data: T,
    format: OutputFormat,
    query: Option<&str>,
) -> Result<()> {
    let mut json_value = serde_json::to_value(data)?;

    if let Some(query_str) = query {
        json_value = apply_query(&json_value, query_str)?;
    }

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&json_value)?);
        }
        OutputFormat::Yaml => {
            println!("{}", serde_yaml::to_string(&json_value)?);
        }
        OutputFormat::Table => {
            println!("{}", render_table(&json_value));
        }
    }

    Ok(())
}

/// Render a value as a table
///
/// Arrays of objects get one column per key of the first element; a single
/// object becomes a key/value table.
pub fn render_table(value: &Value) -> String {
    match value {
        Value::Array(arr) if !arr.is_empty() => {
            let mut table = Table::new();

            if let Value::Object(first) = &arr[0] {
                let headers: Vec<String> = first.keys().cloned().collect();
                table.set_header(&headers);

                for item in arr {
                    if let Value::Object(obj) = item {
                        let row: Vec<String> = headers
                            .iter()
                            .map(|h| format_value(obj.get(h).unwrap_or(&Value::Null)))
                            .collect();
                        table.add_row(row);
                    }
                }
            } else {
                table.set_header(vec!["Value"]);
                for item in arr {
                    table.add_row(vec![format_value(item)]);
                }
            }

            table.to_string()
        }
        Value::Object(obj) => {
            let mut table = Table::new();
            table.set_header(vec!["Key", "Value"]);

            for (key, val) in obj {
                table.add_row(vec![key.clone(), format_value(val)]);
            }

            table.to_string()
        }
        Value::Array(_) => "(none)".to_string(),
        _ => format_value(value),
    }
}

pub fn format_value(value: &Value) -> String {
    match value {
        Value::Null => "".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(arr) if arr.iter().all(|v| !v.is_object() && !v.is_array()) => arr
            .iter()
            .map(format_value)
            .collect::<Vec<_>>()
            .join(", "),
        Value::Array(arr) => format!("[{} items]", arr.len()),
        Value::Object(obj) => format!("{{{} fields}}", obj.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalize_backtick_unquoted_string() {
        assert_eq!(
            normalize_backtick_literals(r#"[?status==`completed`]"#),
            r#"[?status==`"completed"`]"#
        );
    }

    #[test]
    fn test_normalize_backtick_keeps_json_literals() {
        assert_eq!(
            normalize_backtick_literals(r#"[?status==`"running"`]"#),
            r#"[?status==`"running"`]"#
        );
        assert_eq!(
            normalize_backtick_literals(r#"[?progress_percent==`100`]"#),
            r#"[?progress_percent==`100`]"#
        );
        assert_eq!(
            normalize_backtick_literals(r#"[?is_downloadable==`true`]"#),
            r#"[?is_downloadable==`true`]"#
        );
        assert_eq!(normalize_backtick_literals(r#"`[1, 2]`"#), r#"`[1, 2]`"#);
    }

    #[test]
    fn test_normalize_multiple_backticks() {
        assert_eq!(
            normalize_backtick_literals(r#"[?type==`scheduled` && status==`completed`]"#),
            r#"[?type==`"scheduled"` && status==`"completed"`]"#
        );
    }

    #[test]
    fn test_apply_query_filters_backups() {
        let data = json!({
            "backups": [
                {"id": "b1", "type": "scheduled"},
                {"id": "b2", "type": "on_demand"}
            ]
        });
        let result = apply_query(&data, "backups[?type==`on_demand`].id").unwrap();
        assert_eq!(result, json!(["b2"]));
    }

    #[test]
    fn test_invalid_query_is_an_error() {
        assert!(apply_query(&json!({}), "[?").is_err());
    }

    #[test]
    fn test_resolve_auto() {
        assert_eq!(
            OutputFormat::resolve(crate::cli::OutputFormat::Auto, OutputFormat::Table),
            OutputFormat::Table
        );
        assert_eq!(
            OutputFormat::resolve(crate::cli::OutputFormat::Yaml, OutputFormat::Table),
            OutputFormat::Yaml
        );
    }

    #[test]
    fn test_render_table_rows() {
        let rendered = render_table(&json!([
            {"address": "172.16.0.0/16", "description": "Dev IP space 3"},
            {"address": "10.0.0.1", "description": ""}
        ]));
        assert!(rendered.contains("address"));
        assert!(rendered.contains("172.16.0.0/16"));
        assert!(rendered.contains("Dev IP space 3"));
    }

    #[test]
    fn test_format_value_scalar_list() {
        assert_eq!(format_value(&json!(["us-south", "eu-de"])), "us-south, eu-de");
        assert_eq!(format_value(&json!([{"a": 1}])), "[1 items]");
        assert_eq!(format_value(&Value::Null), "");
    }
}
