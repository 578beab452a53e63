use super::commands::{build_invocation, display_command, generic_output_path, Backend};
use super::error::{ConvertError, ConvertResult};
use super::formats::is_valid;
use super::progress::{ConversionState, ProgressSink};
use super::request::ConversionRequest;
use crate::settings::Settings;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use std::time::{Duration, Instant};
use tokio::process::Command;

#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

/// Outcome of one successful backend run.
#[derive(Debug, Clone)]
pub struct ConversionResult {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
    pub backend: Backend,
    pub output_path: PathBuf,
    /// Whether the generic backend's product was moved to `output_path`
    pub relocated: bool,
    pub elapsed: Duration,
}

/// Routes conversion requests to the external backends.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    ffmpeg_path: String,
    fileconvert_path: String,
    timeout: Option<Duration>,
    strict_output: bool,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::from_settings(&Settings::default())
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            ffmpeg_path: settings.ffmpeg_path.clone(),
            fileconvert_path: settings.fileconvert_path.clone(),
            timeout: settings.timeout(),
            strict_output: settings.strict_output,
        }
    }

    pub fn with_paths(ffmpeg_path: String, fileconvert_path: String) -> Self {
        Self {
            ffmpeg_path,
            fileconvert_path,
            ..Self::new()
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_strict_output(mut self, strict: bool) -> Self {
        self.strict_output = strict;
        self
    }

    fn program_for(&self, backend: Backend) -> &str {
        match backend {
            Backend::AudioVideo => &self.ffmpeg_path,
            Backend::Generic => &self.fileconvert_path,
        }
    }

    /// Resolve the executable for a backend.
    pub fn locate(&self, backend: Backend) -> ConvertResult<PathBuf> {
        let program = self.program_for(backend);
        locate_executable(program).ok_or_else(|| ConvertError::BackendUnavailable {
            backend: program.to_string(),
            hint: backend.install_hint().to_string(),
        })
    }

    /// Run one conversion to completion, reporting checkpoints to `sink`.
    pub async fn convert(
        &self,
        request: ConversionRequest,
        sink: &dyn ProgressSink,
    ) -> ConvertResult<ConversionResult> {
        sink.report(
            ConversionState::Validating,
            &format!("Starting conversion to {}...", request.target_format()),
        );

        match self.run(request, sink).await {
            Ok(result) => {
                sink.report(ConversionState::Done, "Conversion completed successfully!");
                Ok(result)
            }
            Err(e) => {
                tracing::error!("Conversion failed: {}", e);
                sink.report(e.state(), &format!("Error: {}", e));
                Err(e)
            }
        }
    }

    async fn run(
        &self,
        request: ConversionRequest,
        sink: &dyn ProgressSink,
    ) -> ConvertResult<ConversionResult> {
        let started = Instant::now();

        if !is_valid(request.input_extension(), request.target_format()) {
            return Err(ConvertError::InvalidFormatChoice {
                extension: request.input_extension().to_string(),
                format: request.target_format().to_string(),
            });
        }

        let request = request.into_absolute()?;
        let (backend, args) = build_invocation(&request);
        let program = self.locate(backend)?;

        if !request.input_path().is_file() {
            return Err(ConvertError::InputNotFound(request.input_path().to_path_buf()));
        }
        if let Some(parent) = request.output_path().parent() {
            fs::create_dir_all(parent)?;
        }

        let command_line = display_command(&program, &args);
        tracing::info!(backend = backend.name(), "Running: {}", command_line);
        sink.report(ConversionState::BackendRunning, &format!("Running: {}", command_line));

        let mut cmd = Command::new(&program);
        cmd.args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        // fileconvert writes next to its working directory
        if backend == Backend::Generic {
            if let Some(dir) = request.input_path().parent() {
                cmd.current_dir(dir);
            }
        }

        // Own process group so a timeout can take down helpers the backend spawned
        #[cfg(unix)]
        cmd.process_group(0);

        #[cfg(windows)]
        cmd.creation_flags(CREATE_NO_WINDOW);

        let output = self.wait_for(cmd, backend).await?;
        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        if !output.status.success() {
            return Err(ConvertError::BackendFailed {
                backend: backend.name().to_string(),
                exit_code: output.status.code(),
                stderr,
            });
        }

        let relocated = match backend {
            Backend::AudioVideo => {
                sink.report(ConversionState::Relocating, "Output written by FFmpeg");
                false
            }
            Backend::Generic => {
                sink.report(ConversionState::Relocating, "Moving converted file...");
                self.relocate(&request)?
            }
        };

        Ok(ConversionResult {
            success: true,
            stdout,
            stderr,
            exit_code: output.status.code().unwrap_or(0),
            backend,
            output_path: request.output_path().to_path_buf(),
            relocated,
            elapsed: started.elapsed(),
        })
    }

    async fn wait_for(&self, mut cmd: Command, backend: Backend) -> ConvertResult<Output> {
        let child = cmd.spawn().map_err(|e| match e.kind() {
            ErrorKind::NotFound | ErrorKind::PermissionDenied => ConvertError::BackendUnavailable {
                backend: self.program_for(backend).to_string(),
                hint: backend.install_hint().to_string(),
            },
            _ => ConvertError::Io(e),
        })?;

        let Some(limit) = self.timeout else {
            return Ok(child.wait_with_output().await?);
        };

        let pid = child.id();
        match tokio::time::timeout(limit, child.wait_with_output()).await {
            Ok(output) => Ok(output?),
            Err(_) => {
                #[cfg(unix)]
                if let Some(pid) = pid {
                    kill_process_group(pid);
                }
                #[cfg(not(unix))]
                let _ = pid;

                Err(ConvertError::BackendFailed {
                    backend: backend.name().to_string(),
                    exit_code: None,
                    stderr: format!("timed out after {:.1}s", limit.as_secs_f64()),
                })
            }
        }
    }

    /// Move the generic backend's product to the requested output path.
    fn relocate(&self, request: &ConversionRequest) -> ConvertResult<bool> {
        let produced = generic_output_path(request.input_path(), request.target_format());
        let target = request.output_path();

        if !produced.exists() {
            if self.strict_output {
                return Err(ConvertError::OutputNotProduced {
                    backend: Backend::Generic.name().to_string(),
                    expected: produced,
                });
            }
            tracing::warn!(
                "Expected {} was not produced, nothing to relocate",
                produced.display()
            );
            return Ok(false);
        }

        if produced == target {
            tracing::debug!("Output already at {}", target.display());
            return Ok(false);
        }

        tracing::debug!("Relocating {} -> {}", produced.display(), target.display());
        move_file(&produced, target)?;
        Ok(true)
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Find `program` as a path, on PATH, or in the working directory.
pub fn locate_executable(program: &str) -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    locate_executable_in(program, &cwd)
}

/// Same as [`locate_executable`], resolving relative names against `cwd`.
/// Only files the current user can execute are returned.
pub fn locate_executable_in(program: &str, cwd: &Path) -> Option<PathBuf> {
    let path = Path::new(program);
    if path.components().count() > 1 || path.is_absolute() {
        return which::which_in(program, None::<&str>, cwd).ok();
    }

    which::which(program)
        .or_else(|_| which::which_in(program, Some(cwd), cwd))
        .ok()
}

/// Kill the backend and everything it spawned.
#[cfg(unix)]
fn kill_process_group(pid: u32) {
    let Ok(pgid) = libc::pid_t::try_from(pid) else {
        return;
    };
    // SAFETY: kill(2) only sends a signal, the group was created for this child
    let rc = unsafe { libc::kill(-pgid, libc::SIGKILL) };
    if rc != 0 {
        tracing::debug!(
            "Could not kill process group {}: {}",
            pgid,
            std::io::Error::last_os_error()
        );
    }
}

/// Rename, falling back to copy + remove across filesystems.
fn move_file(from: &Path, to: &Path) -> std::io::Result<()> {
    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(_) => {
            fs::copy(from, to)?;
            fs::remove_file(from)
        }
    }
}
