use std::fmt;

use serde::{Deserialize, Serialize};

/// How inserted and exported timestamps are rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimestampFormat {
    #[default]
    Datetime,
    Date,
    Time,
}

impl TimestampFormat {
    /// chrono `strftime` pattern for this format
    pub fn pattern(self) -> &'static str {
        match self {
            TimestampFormat::Datetime => "%Y-%m-%d %H:%M:%S",
            TimestampFormat::Date => "%Y-%m-%d",
            TimestampFormat::Time => "%H:%M:%S",
        }
    }

    pub fn parse_format(s: &str) -> Option<TimestampFormat> {
        match s {
            "datetime" => Some(TimestampFormat::Datetime),
            "date" => Some(TimestampFormat::Date),
            "time" => Some(TimestampFormat::Time),
            _ => None,
        }
    }
}

impl fmt::Display for TimestampFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimestampFormat::Datetime => write!(f, "datetime"),
            TimestampFormat::Date => write!(f, "date"),
            TimestampFormat::Time => write!(f, "time"),
        }
    }
}

/// Persisted timestamp preferences
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TimestampSettings {
    /// Whether exports carry a timestamp line
    pub enabled: bool,
    pub format: TimestampFormat,
}

/// Output formats for `export`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Text,
    Html,
    /// Print-oriented HTML (the browser print path)
    Print,
    Markdown,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Text => "txt",
            ExportFormat::Html | ExportFormat::Print => "html",
            ExportFormat::Markdown => "md",
        }
    }

    pub fn parse_format(s: &str) -> Option<ExportFormat> {
        match s {
            "text" | "txt" => Some(ExportFormat::Text),
            "html" => Some(ExportFormat::Html),
            "print" | "pdf" => Some(ExportFormat::Print),
            "markdown" | "md" => Some(ExportFormat::Markdown),
            _ => None,
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportFormat::Text => write!(f, "text"),
            ExportFormat::Html => write!(f, "html"),
            ExportFormat::Print => write!(f, "print"),
            ExportFormat::Markdown => write!(f, "markdown"),
        }
    }
}
