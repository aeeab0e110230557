//! Error types shared by the build pipeline and the installer

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a build or an install run
#[derive(Debug, Error)]
pub enum Error {
    #[error("no components available in {}", .dir.display())]
    EmptyCatalog { dir: PathBuf },

    #[error("failed to launch {tool}: {source}")]
    ToolUnavailable {
        tool: String,
        source: std::io::Error,
    },

    #[error("{tool} exited with {status}{}", format_stderr(.stderr))]
    ExternalTool {
        tool: String,
        status: String,
        stderr: String,
    },

    #[error("failed to {action} {}: {source}", .path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid configuration in {}: {source}", .path.display())]
    Config {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("operation cancelled")]
    Cancelled,

    #[error("prompt failed: {0}")]
    Prompt(#[source] std::io::Error),
}

impl Error {
    /// Wrap an I/O error with the action and the path it concerned
    pub fn io(action: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            action,
            path: path.into(),
            source,
        }
    }

    /// True when the user backed out of an interactive prompt
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

fn format_stderr(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!(":\n{}", trimmed)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
