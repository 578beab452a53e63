use crate::convert::{
    extension_of, valid_formats, ConversionRequest, ConversionResult, ConversionState,
    ConvertError, ConvertResult, Dispatcher, TaskProgress,
};
use crate::settings::Settings;
use crate::utils::{format_elapsed, format_size};
use crate::worker::{ConversionJob, WorkerEvent};
use eframe::egui;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Runtime;

/// Modal dialog currently shown over the main window.
#[derive(Debug, Clone, PartialEq)]
pub enum Dialog {
    UnsupportedFile(String),
    Success(PathBuf),
    Failed(String),
}

pub struct ConverterApp {
    pub settings: Settings,
    pub runtime: Runtime,
    dispatcher: Arc<Dispatcher>,

    // Selection
    pub input_file: Option<PathBuf>,
    pub available_formats: &'static [&'static str],
    pub selected_format: Option<String>,

    // Progress and log
    pub task: TaskProgress,
    pub log: Vec<String>,
    pub dialog: Option<Dialog>,
    job: Option<ConversionJob>,
}

impl ConverterApp {
    pub fn new(settings: Settings, runtime: Runtime) -> Self {
        let dispatcher = Arc::new(Dispatcher::from_settings(&settings));
        Self {
            settings,
            runtime,
            dispatcher,
            input_file: None,
            available_formats: &[],
            selected_format: None,
            task: TaskProgress::default(),
            log: Vec::new(),
            dialog: None,
            job: None,
        }
    }

    pub fn log(&mut self, line: impl Into<String>) {
        let line = line.into();
        tracing::debug!("{}", line);
        self.log.push(line);
    }

    pub fn is_converting(&self) -> bool {
        self.job.is_some()
    }

    /// Select an input file and repopulate the format list for it.
    pub fn select_file(&mut self, path: PathBuf) {
        self.log(format!("Selected file: {}", path.display()));
        let extension = extension_of(&path).unwrap_or_default();
        self.input_file = Some(path);
        self.update_supported_formats(&extension);
    }

    fn update_supported_formats(&mut self, extension: &str) {
        match valid_formats(extension) {
            Some(formats) => {
                self.available_formats = formats;
                let keep = self
                    .selected_format
                    .as_deref()
                    .is_some_and(|current| formats.contains(&current));
                if !keep {
                    self.selected_format = formats.first().map(|f| f.to_string());
                }
            }
            None => {
                self.available_formats = &[];
                self.selected_format = None;
                let label = if extension.is_empty() { "(none)" } else { extension };
                tracing::warn!("Unsupported file extension {}", label);
                self.dialog = Some(Dialog::UnsupportedFile(format!(
                    "File extension '{}' is not supported for conversion.",
                    label
                )));
            }
        }
    }

    pub fn set_output_dir(&mut self, dir: PathBuf) {
        self.log(format!("Output folder: {}", dir.display()));
        self.settings.output_dir = dir;
        if let Err(e) = self.settings.save() {
            tracing::warn!("Failed to save settings: {:#}", e);
        }
    }

    /// Validated request for the current selection.
    pub fn build_request(&self) -> ConvertResult<ConversionRequest> {
        let input = self
            .input_file
            .as_deref()
            .ok_or_else(|| ConvertError::UnsupportedExtension(String::new()))?;
        let format = self.selected_format.as_deref().unwrap_or_default();
        ConversionRequest::new(input, format, &self.settings.output_dir)
    }

    pub fn can_convert(&self) -> bool {
        !self.is_converting() && self.build_request().is_ok()
    }

    /// Where the current selection will be written, if it is convertible.
    pub fn output_preview(&self) -> Option<PathBuf> {
        self.build_request()
            .ok()
            .map(|request| request.output_path().to_path_buf())
    }

    pub fn start_conversion(&mut self) {
        if self.is_converting() || self.input_file.is_none() {
            return;
        }

        let request = match self.build_request() {
            Ok(request) => request,
            Err(e) => {
                self.log(format!("Error: {}", e));
                self.task.update(e.state(), &e.to_string());
                return;
            }
        };

        self.log("");
        self.task.update(ConversionState::Validating, "Starting...");
        let job = ConversionJob::spawn(self.runtime.handle(), self.dispatcher.clone(), request);
        self.job = Some(job);
    }

    /// Called every frame to pick up progress from the worker.
    pub fn poll_job(&mut self) {
        let Some(job) = self.job.as_mut() else {
            return;
        };

        let events = job.poll();
        let finished = job.is_finished();

        for event in events {
            match event {
                WorkerEvent::Progress { state, message } => {
                    self.task.update(state, &message);
                    // Terminal lines are logged with the result
                    if !state.is_terminal() {
                        self.log(message);
                    }
                }
                WorkerEvent::Finished(result) => self.finish(result),
            }
        }

        if finished {
            self.job = None;
        }
    }

    fn finish(&mut self, result: Result<ConversionResult, ConvertError>) {
        match result {
            Ok(result) => {
                for text in [&result.stdout, &result.stderr] {
                    let text = text.trim_end();
                    if !text.is_empty() {
                        self.log(text.to_string());
                    }
                }

                let size = std::fs::metadata(&result.output_path)
                    .map(|m| format!(" ({})", format_size(m.len())))
                    .unwrap_or_default();
                self.task
                    .update(ConversionState::Done, "Conversion completed successfully!");
                self.log("Conversion completed successfully!");
                self.log(format!(
                    "Saved to {}{} in {}",
                    result.output_path.display(),
                    size,
                    format_elapsed(result.elapsed)
                ));
                tracing::info!(
                    backend = result.backend.name(),
                    exit_code = result.exit_code,
                    relocated = result.relocated,
                    "Converted to {}",
                    result.output_path.display()
                );

                if self.settings.offer_open_output && result.output_path.exists() {
                    self.dialog = Some(Dialog::Success(result.output_path));
                }
            }
            Err(e) => {
                self.log(format!("Error: {}", e));
                self.task.reset();
                self.dialog = Some(Dialog::Failed(e.to_string()));
            }
        }
    }

    /// Open a converted file with the system handler.
    pub fn open_output(&mut self, path: &Path) {
        if let Err(e) = open::that(path) {
            self.log(format!("Could not open {}: {}", path.display(), e));
        }
    }

    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        if self.is_converting() {
            return;
        }
        if let Some(path) = dropped.into_iter().filter_map(|f| f.path).next() {
            self.select_file(path);
        }
    }
}

impl eframe::App for ConverterApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_dropped_files(ctx);

        self.poll_job();

        crate::ui::render_main_window(self, ctx);

        if self.is_converting() {
            ctx.request_repaint_after(Duration::from_millis(100));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app() -> ConverterApp {
        let settings = Settings {
            output_dir: PathBuf::from("/tmp/converted"),
            offer_open_output: false,
            ..Settings::default()
        };
        ConverterApp::new(settings, Runtime::new().unwrap())
    }

    #[test]
    fn test_select_supported_file_populates_formats() {
        let mut app = app();
        app.select_file(PathBuf::from("/videos/Clip.MP4"));

        assert_eq!(app.available_formats, &["mp3", "gif"]);
        assert_eq!(app.selected_format.as_deref(), Some("mp3"));
        assert!(app.dialog.is_none());
        assert_eq!(
            app.output_preview(),
            Some(PathBuf::from("/tmp/converted/Clip_converted.mp3"))
        );
        assert!(app.can_convert());
    }

    #[test]
    fn test_previous_choice_is_kept_when_still_valid() {
        let mut app = app();
        app.select_file(PathBuf::from("a.png"));
        app.selected_format = Some("webp".to_string());

        app.select_file(PathBuf::from("b.jpg"));
        assert_eq!(app.selected_format.as_deref(), Some("webp"));

        app.select_file(PathBuf::from("c.pdf"));
        assert_eq!(app.selected_format.as_deref(), Some("docx"));
    }

    #[test]
    fn test_unsupported_file_blocks_conversion() {
        let mut app = app();
        app.select_file(PathBuf::from("movie.mkv"));

        assert!(app.available_formats.is_empty());
        assert!(matches!(app.dialog, Some(Dialog::UnsupportedFile(ref msg)) if msg.contains(".mkv")));
        assert!(!app.can_convert());
        assert!(app.output_preview().is_none());

        app.start_conversion();
        assert!(!app.is_converting());
        assert_eq!(app.task.state, ConversionState::Rejected);
    }

    #[cfg(unix)]
    #[test]
    fn test_failed_conversion_resets_progress() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("photo.png");
        std::fs::write(&input, b"png").unwrap();

        let settings = Settings {
            fileconvert_path: "false".to_string(),
            output_dir: dir.path().join("out"),
            ..Settings::default()
        };
        let mut app = ConverterApp::new(settings, Runtime::new().unwrap());
        app.select_file(input);
        app.start_conversion();
        assert!(app.is_converting());

        let deadline = std::time::Instant::now() + Duration::from_secs(10);
        while app.is_converting() && std::time::Instant::now() < deadline {
            app.poll_job();
            std::thread::sleep(Duration::from_millis(10));
        }

        assert!(!app.is_converting());
        assert_eq!(app.task.progress, 0.0);
        assert!(matches!(app.dialog, Some(Dialog::Failed(_))));
        assert!(app.log.iter().any(|line| line.starts_with("Error:")));
    }
}
