use super::request::{converted_file_name, ConversionRequest};
use std::path::{Path, PathBuf};

/// Which external tool handles a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// FFmpeg, used for `.mp4` to mp3/gif
    AudioVideo,
    /// The `fileconvert` executable, used for everything else
    Generic,
}

impl Backend {
    pub fn name(&self) -> &'static str {
        match self {
            Backend::AudioVideo => "FFmpeg",
            Backend::Generic => "fileconvert",
        }
    }

    pub fn install_hint(&self) -> &'static str {
        match self {
            Backend::AudioVideo => "Install FFmpeg and make sure it is on your PATH.",
            Backend::Generic => {
                "Place the fileconvert executable in the working directory or on your PATH."
            }
        }
    }
}

/// Pick the backend for a request.
pub fn route(input_extension: &str, target_format: &str) -> Backend {
    if matches!(target_format, "mp3" | "gif") && input_extension == ".mp4" {
        Backend::AudioVideo
    } else {
        Backend::Generic
    }
}

/// Build FFmpeg arguments for extracting the best audio stream to mp3
pub fn build_audio_extract_args(input: &Path, output: &Path) -> Vec<String> {
    vec![
        "-y".to_string(),
        "-i".to_string(),
        input.to_string_lossy().to_string(),
        "-q:a".to_string(),
        "0".to_string(),
        "-map".to_string(),
        "a".to_string(),
        output.to_string_lossy().to_string(),
    ]
}

/// Build FFmpeg arguments for a 10 fps, 640px wide gif
pub fn build_gif_args(input: &Path, output: &Path) -> Vec<String> {
    vec![
        "-y".to_string(),
        "-i".to_string(),
        input.to_string_lossy().to_string(),
        "-vf".to_string(),
        "fps=10,scale=640:-1:flags=lanczos".to_string(),
        output.to_string_lossy().to_string(),
    ]
}

/// Build the two positional arguments for the generic converter
pub fn build_generic_args(input: &Path, format: &str) -> Vec<String> {
    vec![input.to_string_lossy().to_string(), format.to_string()]
}

/// Where the generic converter leaves its output: next to the input.
pub fn generic_output_path(input: &Path, format: &str) -> PathBuf {
    let name = converted_file_name(input, format);
    match input.parent() {
        Some(dir) => dir.join(name),
        None => PathBuf::from(name),
    }
}

/// Backend and argument list for a request.
pub fn build_invocation(request: &ConversionRequest) -> (Backend, Vec<String>) {
    let backend = route(request.input_extension(), request.target_format());
    let args = match backend {
        Backend::AudioVideo if request.target_format() == "mp3" => {
            build_audio_extract_args(request.input_path(), request.output_path())
        }
        Backend::AudioVideo => build_gif_args(request.input_path(), request.output_path()),
        Backend::Generic => build_generic_args(request.input_path(), request.target_format()),
    };
    (backend, args)
}

/// Render a command line for the log pane.
pub fn display_command(program: &Path, args: &[String]) -> String {
    let mut parts = vec![program.to_string_lossy().to_string()];
    parts.extend(args.iter().map(|arg| {
        if arg.contains(' ') {
            format!("\"{}\"", arg)
        } else {
            arg.clone()
        }
    }));
    parts.join(" ")
}
