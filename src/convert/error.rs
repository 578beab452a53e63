use super::progress::ConversionState;
use std::path::PathBuf;

/// Conversion error types
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error("File extension '{0}' is not supported for conversion")]
    UnsupportedExtension(String),

    #[error("Cannot convert {extension} files to '{format}'")]
    InvalidFormatChoice { extension: String, format: String },

    #[error("Input file not found: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("{backend} was not found. {hint}")]
    BackendUnavailable { backend: String, hint: String },

    #[error("{backend} failed ({}):\n{stderr}", exit_label(.exit_code))]
    BackendFailed {
        backend: String,
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("{backend} exited successfully but did not produce {}", .expected.display())]
    OutputNotProduced { backend: String, expected: PathBuf },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "no exit code".to_string(),
    }
}

impl ConvertError {
    /// Terminal state a request ends in when this error is raised.
    pub fn state(&self) -> ConversionState {
        match self {
            ConvertError::UnsupportedExtension(_) | ConvertError::InvalidFormatChoice { .. } => {
                ConversionState::Rejected
            }
            _ => ConversionState::Failed,
        }
    }
}

pub type ConvertResult<T> = Result<T, ConvertError>;
