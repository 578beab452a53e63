use super::error::{ConvertError, ConvertResult};
use super::formats::{extension_of, is_valid, valid_formats};
use std::path::{Path, PathBuf};

/// A validated, immutable conversion request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionRequest {
    input_path: PathBuf,
    input_extension: String,
    target_format: String,
    output_path: PathBuf,
}

impl ConversionRequest {
    /// Build a request that writes `<stem>_converted.<format>` into `output_dir`.
    pub fn new(input_path: &Path, target_format: &str, output_dir: &Path) -> ConvertResult<Self> {
        let format = target_format.trim().to_lowercase();
        let output_path = output_dir.join(converted_file_name(input_path, &format));
        Self::with_output(input_path, &format, output_path)
    }

    /// Build a request with an explicit output path.
    pub fn with_output(
        input_path: &Path,
        target_format: &str,
        output_path: PathBuf,
    ) -> ConvertResult<Self> {
        let input_extension = extension_of(input_path).unwrap_or_default();
        if valid_formats(&input_extension).is_none() {
            return Err(ConvertError::UnsupportedExtension(input_extension));
        }

        let target_format = target_format.trim().to_lowercase();
        if !is_valid(&input_extension, &target_format) {
            return Err(ConvertError::InvalidFormatChoice {
                extension: input_extension,
                format: target_format,
            });
        }

        Ok(Self {
            input_path: input_path.to_path_buf(),
            input_extension,
            target_format,
            output_path,
        })
    }

    pub fn input_path(&self) -> &Path {
        &self.input_path
    }

    /// Lowercased, with leading dot.
    pub fn input_extension(&self) -> &str {
        &self.input_extension
    }

    pub fn target_format(&self) -> &str {
        &self.target_format
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Same request with both paths made absolute against the working directory.
    pub fn into_absolute(self) -> std::io::Result<Self> {
        Ok(Self {
            input_path: std::path::absolute(&self.input_path)?,
            output_path: std::path::absolute(&self.output_path)?,
            ..self
        })
    }
}

/// `<stem>_converted.<format>` for the given input.
pub fn converted_file_name(input: &Path, format: &str) -> String {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "output".to_string());
    format!("{}_converted.{}", stem, format)
}
