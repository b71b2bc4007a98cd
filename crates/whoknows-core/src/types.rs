use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// How a query string is turned into a match pattern.
///
/// # Examples
///
/// ```
/// use whoknows_core::MatchMode;
///
/// let mode: MatchMode = "regex".parse().unwrap();
/// assert_eq!(mode, MatchMode::Regex);
/// assert_eq!(MatchMode::default(), MatchMode::Literal);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// The query is plain text; pattern metacharacters match themselves.
    #[default]
    Literal,
    /// The query is a regular expression.
    Regex,
}

impl fmt::Display for MatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchMode::Literal => write!(f, "literal"),
            MatchMode::Regex => write!(f, "regex"),
        }
    }
}

impl FromStr for MatchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "literal" | "text" => Ok(MatchMode::Literal),
            "regex" | "regexp" => Ok(MatchMode::Regex),
            other => Err(format!("unknown match mode: {other}")),
        }
    }
}

/// Output format for command results.
///
/// # Examples
///
/// ```
/// use whoknows_core::OutputFormat;
///
/// let fmt: OutputFormat = "json".parse().unwrap();
/// assert_eq!(fmt, OutputFormat::Json);
///
/// let fmt: OutputFormat = "md".parse().unwrap();
/// assert_eq!(fmt, OutputFormat::Markdown);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable labels, one candidate per line.
    #[default]
    Text,
    /// Machine-readable JSON with camelCase keys.
    Json,
    /// Markdown-formatted output.
    Markdown,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Markdown => write!(f, "markdown"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            other => Err(format!("unknown output format: {other}")),
        }
    }
}
