use crate::convert::{
    ConversionRequest, ConversionResult, ConversionState, ConvertError, Dispatcher, ProgressSink,
};
use crossbeam_channel::{unbounded, Receiver, Sender, TryRecvError};
use std::io;
use std::sync::Arc;
use tokio::runtime::Handle;

/// Messages sent from a running conversion back to the UI.
#[derive(Debug)]
pub enum WorkerEvent {
    Progress {
        state: ConversionState,
        message: String,
    },
    Finished(Result<ConversionResult, ConvertError>),
}

struct ChannelSink {
    tx: Sender<WorkerEvent>,
}

impl ProgressSink for ChannelSink {
    fn report(&self, state: ConversionState, message: &str) {
        // Receiver gone means the window closed mid-conversion
        let _ = self.tx.send(WorkerEvent::Progress {
            state,
            message: message.to_string(),
        });
    }
}

/// Handle to the single in-flight conversion.
pub struct ConversionJob {
    rx: Receiver<WorkerEvent>,
    finished: bool,
}

impl ConversionJob {
    /// Start `request` on the runtime and return a handle the UI polls.
    pub fn spawn(runtime: &Handle, dispatcher: Arc<Dispatcher>, request: ConversionRequest) -> Self {
        let (tx, rx) = unbounded();

        runtime.spawn(async move {
            let sink = ChannelSink { tx: tx.clone() };
            let result = dispatcher.convert(request, &sink).await;
            let _ = tx.send(WorkerEvent::Finished(result));
        });

        Self { rx, finished: false }
    }

    /// Drain every event delivered since the last poll.
    pub fn poll(&mut self) -> Vec<WorkerEvent> {
        let mut events = Vec::new();
        loop {
            match self.rx.try_recv() {
                Ok(event) => {
                    if matches!(event, WorkerEvent::Finished(_)) {
                        self.finished = true;
                    }
                    events.push(event);
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    if !self.finished {
                        self.finished = true;
                        tracing::error!("Conversion worker stopped without a result");
                        events.push(WorkerEvent::Finished(Err(ConvertError::Io(
                            io::Error::other("conversion worker stopped unexpectedly"),
                        ))));
                    }
                    break;
                }
            }
        }
        events
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }
}
