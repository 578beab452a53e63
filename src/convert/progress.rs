/// Lifecycle of a single conversion request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionState {
    Idle,
    Validating,
    BackendRunning,
    Relocating,
    Done,
    Rejected,
    Failed,
}

impl ConversionState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ConversionState::Done | ConversionState::Rejected | ConversionState::Failed
        )
    }

    /// Coarse progress fraction for the progress bar. Failed and rejected
    /// requests reset the bar.
    pub fn progress(&self) -> f32 {
        match self {
            ConversionState::Validating => 0.1,
            ConversionState::BackendRunning => 0.3,
            ConversionState::Relocating => 0.7,
            ConversionState::Done => 1.0,
            ConversionState::Idle | ConversionState::Rejected | ConversionState::Failed => 0.0,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ConversionState::Idle => "Ready",
            ConversionState::Validating => "Validating",
            ConversionState::BackendRunning => "Converting",
            ConversionState::Relocating => "Moving output",
            ConversionState::Done => "Done",
            ConversionState::Rejected => "Rejected",
            ConversionState::Failed => "Failed",
        }
    }
}

/// Receives coarse checkpoints while a conversion runs.
pub trait ProgressSink: Send + Sync {
    fn report(&self, state: ConversionState, message: &str);
}

/// Progress snapshot shown in the status bar.
#[derive(Debug, Clone)]
pub struct TaskProgress {
    pub state: ConversionState,
    pub message: String,
    pub progress: f32,
}

impl Default for TaskProgress {
    fn default() -> Self {
        Self {
            state: ConversionState::Idle,
            message: ConversionState::Idle.name().to_string(),
            progress: 0.0,
        }
    }
}

impl TaskProgress {
    pub fn update(&mut self, state: ConversionState, message: &str) {
        self.state = state;
        self.progress = state.progress().clamp(0.0, 1.0);
        self.message = message.to_string();
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_running(&self) -> bool {
        !self.state.is_terminal() && self.state != ConversionState::Idle
    }
}
