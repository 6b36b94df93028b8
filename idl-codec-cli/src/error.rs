//! Errors surfaced by the command-line tool.

use std::path::PathBuf;

use idl_codec_core::CodecError;

/// Errors produced while running a command.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to read log lines from stdin: {0}")]
    Stdin(#[source] std::io::Error),

    #[error("invalid IDL in {path}: {source}")]
    Idl {
        path: PathBuf,
        #[source]
        source: CodecError,
    },

    #[error("invalid JSON for {what}: {source}")]
    Json {
        what: String,
        source: serde_json::Error,
    },

    #[error("invalid {what}: {message}")]
    Input { what: String, message: String },

    #[error(transparent)]
    Codec(#[from] CodecError),
}

impl CliError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn input(what: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Input {
            what: what.into(),
            message: message.into(),
        }
    }
}
