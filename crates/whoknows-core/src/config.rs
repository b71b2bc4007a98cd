use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::WkaError;
use crate::Result;
use crate::types::MatchMode;

/// Top-level configuration loaded from `.whoknows.toml`.
///
/// Supports layered resolution: CLI flags > local config > defaults.
///
/// # Examples
///
/// ```
/// use whoknows_core::WkaConfig;
///
/// let config = WkaConfig::default();
/// assert_eq!(config.index.max_commits, 1000);
/// assert_eq!(config.ranking.top_n, 10);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WkaConfig {
    /// History window settings.
    #[serde(default)]
    pub index: IndexConfig,
    /// Query ranking settings.
    #[serde(default)]
    pub ranking: RankingConfig,
}

impl WkaConfig {
    /// Load configuration from a TOML file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`WkaError::FileNotFound`] if the file does not exist,
    /// [`WkaError::Io`] if it cannot be read, or [`WkaError::Toml`] if the
    /// content is not valid TOML.
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(WkaError::FileNotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`WkaError::Toml`] if parsing fails, or [`WkaError::Config`]
    /// if a value is out of range.
    ///
    /// # Examples
    ///
    /// ```
    /// use whoknows_core::{MatchMode, WkaConfig};
    ///
    /// let toml = r#"
    /// [ranking]
    /// top_n = 3
    /// match_mode = "regex"
    /// "#;
    /// let config = WkaConfig::from_toml(toml).unwrap();
    /// assert_eq!(config.ranking.top_n, 3);
    /// assert_eq!(config.ranking.match_mode, MatchMode::Regex);
    /// ```
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.index.max_commits == 0 {
            return Err(WkaError::Config(
                "index.max_commits must be at least 1".into(),
            ));
        }
        if self.ranking.top_n == 0 {
            return Err(WkaError::Config("ranking.top_n must be at least 1".into()));
        }
        Ok(())
    }
}

/// Commit history window used to build the knowledge index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Number of most recent commits to read (default: 1000).
    #[serde(default = "default_max_commits")]
    pub max_commits: usize,
    /// Branch to read history from (default: HEAD).
    pub branch: Option<String>,
}

fn default_max_commits() -> usize {
    1000
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            max_commits: default_max_commits(),
            branch: None,
        }
    }
}

/// Ranking behavior.
///
/// # Examples
///
/// ```
/// use whoknows_core::{MatchMode, RankingConfig};
///
/// let config = RankingConfig::default();
/// assert_eq!(config.top_n, 10);
/// assert_eq!(config.match_mode, MatchMode::Literal);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingConfig {
    /// Maximum number of candidates shown (default: 10).
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    /// How queries are matched against commit text (default: literal).
    #[serde(default)]
    pub match_mode: MatchMode,
}

fn default_top_n() -> usize {
    10
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            top_n: default_top_n(),
            match_mode: MatchMode::default(),
        }
    }
}
