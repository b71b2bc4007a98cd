use std::path::PathBuf;

/// Errors that can occur across who-knows-about.
///
/// Library crates return this type directly; it implements
/// [`miette::Diagnostic`] so the binary can propagate it with `?`.
///
/// # Examples
///
/// ```
/// use whoknows_core::WkaError;
///
/// let err = WkaError::Git("no HEAD".into());
/// assert!(err.to_string().contains("no HEAD"));
/// ```
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum WkaError {
    /// Filesystem I/O failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid or missing configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// Git operation failure.
    #[error("git error: {0}")]
    Git(String),

    /// A query could not be compiled into a match pattern.
    #[error("invalid query pattern: {0}")]
    #[diagnostic(help("drop --regex to search for the text literally"))]
    Pattern(String),

    /// Terminal prompt or selection failure.
    #[error("prompt error: {0}")]
    Prompt(String),

    /// JSON serialization / deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML deserialization failure.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// A required file was not found.
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_converts() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: WkaError = io_err.into();
        assert!(err.to_string().contains("gone"));
    }

    #[test]
    fn pattern_error_displays_message() {
        let err = WkaError::Pattern("unclosed group".into());
        assert_eq!(err.to_string(), "invalid query pattern: unclosed group");
    }

    #[test]
    fn file_not_found_shows_path() {
        let err = WkaError::FileNotFound(PathBuf::from("/tmp/.whoknows.toml"));
        assert!(err.to_string().contains("/tmp/.whoknows.toml"));
    }
}
