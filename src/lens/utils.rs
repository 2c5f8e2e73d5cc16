//! Common utility functions for lens modules
//!
//! This module provides the output format shared by every command and the
//! helpers that render lens rows in that format.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tabled::settings::Style;
use tabled::{Table, Tabled};

/// Default maximum length for name display in tables
pub const DEFAULT_NAME_MAX_LEN: usize = 24;

/// Unified output format for all commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    /// Pretty table with borders (default)
    #[default]
    Table,
    /// Markdown table format
    Markdown,
    /// Compact JSON (single line)
    Json,
    /// Pretty-printed JSON with indentation
    JsonPretty,
    /// JSON Lines format (one JSON object per line)
    JsonLine,
    /// Pipe-separated values with header
    Psv,
}

impl OutputFormat {
    /// Check if this is a JSON variant
    pub fn is_json(&self) -> bool {
        matches!(self, Self::Json | Self::JsonPretty | Self::JsonLine)
    }

    /// Check if this is a table variant
    pub fn is_table(&self) -> bool {
        matches!(self, Self::Table | Self::Markdown)
    }

    /// Get a list of all format names for help text
    pub fn all_names() -> &'static [&'static str] {
        &[
            "table",
            "markdown",
            "json",
            "json-pretty",
            "json-line",
            "psv",
        ]
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Table => write!(f, "table"),
            Self::Markdown => write!(f, "markdown"),
            Self::Json => write!(f, "json"),
            Self::JsonPretty => write!(f, "json-pretty"),
            Self::JsonLine => write!(f, "json-line"),
            Self::Psv => write!(f, "psv"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" | "pretty" => Ok(Self::Table),
            "markdown" | "md" => Ok(Self::Markdown),
            "json" => Ok(Self::Json),
            "json-pretty" | "jsonpretty" => Ok(Self::JsonPretty),
            "json-line" | "jsonline" | "jsonl" | "ndjson" => Ok(Self::JsonLine),
            "psv" | "pipe" => Ok(Self::Psv),
            _ => Err(format!(
                "Unknown output format '{}'. Valid formats: {}",
                s,
                Self::all_names().join(", ")
            )),
        }
    }
}

/// Truncate a string to the specified length, adding "..." if truncated
///
/// ```
/// use staffdb::lens::utils::truncate_name;
///
/// assert_eq!(truncate_name("Payroll", 20), "Payroll");
/// assert_eq!(truncate_name("Building C, East Wing, Floor 2", 20), "Building C, East ...");
/// ```
pub fn truncate_name(name: &str, max_len: usize) -> String {
    if name.chars().count() <= max_len {
        name.to_string()
    } else {
        let truncated: String = name.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", truncated)
    }
}

/// Render rows in the requested output format
///
/// JSON variants serialize the whole slice (JSON Lines emits one object per
/// line); table variants go through `tabled`.
pub fn format_rows<T: Tabled + Serialize>(rows: &[T], format: OutputFormat) -> Result<String> {
    let rendered = match format {
        OutputFormat::Table => Table::new(rows).with(Style::rounded()).to_string(),
        OutputFormat::Markdown => Table::new(rows).with(Style::markdown()).to_string(),
        OutputFormat::Json => serde_json::to_string(rows)
            .map_err(|e| anyhow!("Failed to serialize to JSON: {}", e))?,
        OutputFormat::JsonPretty => serde_json::to_string_pretty(rows)
            .map_err(|e| anyhow!("Failed to serialize to JSON: {}", e))?,
        OutputFormat::JsonLine => rows
            .iter()
            .map(|row| {
                serde_json::to_string(row)
                    .map_err(|e| anyhow!("Failed to serialize to JSON: {}", e))
            })
            .collect::<Result<Vec<_>>>()?
            .join("\n"),
        OutputFormat::Psv => {
            let mut lines = vec![T::headers().join("|")];
            lines.extend(rows.iter().map(|row| row.fields().join("|")));
            lines.join("\n")
        }
    };
    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize, Tabled)]
    struct Row {
        id: i64,
        name: String,
    }

    fn rows() -> Vec<Row> {
        vec![
            Row {
                id: 1,
                name: "Payroll".to_string(),
            },
            Row {
                id: 2,
                name: "Human Resources".to_string(),
            },
        ]
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!(
            "table".parse::<OutputFormat>().unwrap(),
            OutputFormat::Table
        );
        assert_eq!("md".parse::<OutputFormat>().unwrap(), OutputFormat::Markdown);
        assert_eq!(
            "jsonl".parse::<OutputFormat>().unwrap(),
            OutputFormat::JsonLine
        );
        assert_eq!("PSV".parse::<OutputFormat>().unwrap(), OutputFormat::Psv);
        assert!("xml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_output_format_display_round_trip() {
        for name in OutputFormat::all_names() {
            let format: OutputFormat = name.parse().unwrap();
            assert_eq!(format.to_string(), *name);
        }
    }

    #[test]
    fn test_format_rows_psv() {
        let out = format_rows(&rows(), OutputFormat::Psv).unwrap();
        assert_eq!(out, "id|name\n1|Payroll\n2|Human Resources");
    }

    #[test]
    fn test_format_rows_json_line() {
        let out = format_rows(&rows(), OutputFormat::JsonLine).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], r#"{"id":1,"name":"Payroll"}"#);
    }

    #[test]
    fn test_format_rows_table_contains_values() {
        let out = format_rows(&rows(), OutputFormat::Markdown).unwrap();
        assert!(out.contains("Human Resources"));
        assert!(out.contains("name"));
    }

    #[test]
    fn test_truncate_name() {
        assert_eq!(truncate_name("Short", 20), "Short");
        assert_eq!(
            truncate_name("This is a very long name", 20),
            "This is a very lo..."
        );
    }
}
