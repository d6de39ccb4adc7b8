//! Configuration files: which boards and columns to collate, and the Trello
//! credentials to do it with.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable overriding the auth file's `appkey`.
pub const APP_KEY_ENV: &str = "TRELLO_APP_KEY";

/// Environment variable overriding the auth file's `token`.
pub const TOKEN_ENV: &str = "TRELLO_TOKEN";

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A configuration file could not be read.
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        /// File that was read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A configuration file is not valid YAML for its schema.
    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        /// File that was parsed.
        path: PathBuf,
        /// Underlying YAML error.
        source: serde_yaml::Error,
    },

    /// Neither the auth file nor the environment provided a credential.
    #[error("missing Trello {field}: set {env} or add `{field}` to {}", .path.display())]
    MissingCredential {
        /// Auth file that was consulted.
        path: PathBuf,
        /// YAML field name.
        field: &'static str,
        /// Environment variable name.
        env: &'static str,
    },
}

/// A board to collate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardConfig {
    /// Trello board identifier.
    pub id: String,
    /// Optional display name, used in logs until the board is fetched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl BoardConfig {
    /// Name to show for this board in logs.
    #[must_use]
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

/// What a pass does after one board fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoardFailurePolicy {
    /// End the pass at the first failing board; later boards wait for the
    /// next pass.
    #[default]
    AbortPass,
    /// Log the failure and carry on with the remaining boards.
    Continue,
}

/// Contents of `config.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CollateConfig {
    /// Boards processed on every pass, in order.
    #[serde(default)]
    pub boards: Vec<BoardConfig>,
    /// Source list names scanned for tagged cards, in order. Matched
    /// case-insensitively against the board's lists.
    #[serde(default)]
    pub columns: Vec<String>,
    /// Policy for a board that fails mid-pass.
    #[serde(default)]
    pub on_board_error: BoardFailurePolicy,
}

impl CollateConfig {
    /// Loads and parses a config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        read_yaml(path)
    }
}

/// Trello API credentials from `auth.yaml` and the environment.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Trello application key.
    #[serde(default)]
    pub appkey: String,
    /// Trello user token.
    #[serde(default)]
    pub token: String,
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("appkey", &self.appkey)
            .field("token", &"<redacted>")
            .finish()
    }
}

impl AuthConfig {
    /// Loads credentials, letting `TRELLO_APP_KEY` and `TRELLO_TOKEN` override
    /// the file. The file is not read at all when both variables are set.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is needed but unreadable or malformed,
    /// or if a credential is missing from both sources.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let env_key = std::env::var(APP_KEY_ENV).ok().filter(|v| !v.is_empty());
        let env_token = std::env::var(TOKEN_ENV).ok().filter(|v| !v.is_empty());
        let file = if env_key.is_some() && env_token.is_some() {
            Self::default()
        } else {
            read_yaml(path)?
        };
        Self::resolve(file, env_key, env_token, path)
    }

    /// Merges file and environment values and checks both are present.
    fn resolve(
        file: Self,
        env_key: Option<String>,
        env_token: Option<String>,
        path: &Path,
    ) -> Result<Self, ConfigError> {
        let auth = Self {
            appkey: env_key.unwrap_or(file.appkey),
            token: env_token.unwrap_or(file.token),
        };
        if auth.appkey.is_empty() {
            return Err(ConfigError::MissingCredential {
                path: path.to_path_buf(),
                field: "appkey",
                env: APP_KEY_ENV,
            });
        }
        if auth.token.is_empty() {
            return Err(ConfigError::MissingCredential {
                path: path.to_path_buf(),
                field: "token",
                env: TOKEN_ENV,
            });
        }
        Ok(auth)
    }
}

fn read_yaml<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let content = std::fs::read_to_string(path)
        .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
    serde_yaml::from_str(&content)
        .map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })
}
