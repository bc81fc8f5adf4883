use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use roster_logging::{roster_debug, roster_warn};

use crate::client::{ClientSettings, ReqwestRosterService, RosterService};
use crate::{ClientError, EngineEvent, GenerateParams, RequestId, Upload};

enum EngineCommand {
    Preview { request_id: RequestId, upload: Upload },
    Generate { request_id: RequestId, params: GenerateParams },
}

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("failed to start engine runtime: {0}")]
    Runtime(#[from] std::io::Error),
    #[error("invalid client settings: {0}")]
    Client(#[from] ClientError),
    #[error("engine thread has stopped")]
    Stopped,
}

/// Runs round-trips on a background tokio runtime and hands completions back over a channel.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new(settings: ClientSettings) -> Result<Self, EngineError> {
        let service = ReqwestRosterService::new(settings)?;
        Self::with_service(Arc::new(service))
    }

    pub fn with_service(service: Arc<dyn RosterService>) -> Result<Self, EngineError> {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()?;

        thread::Builder::new()
            .name("roster-engine".to_string())
            .spawn(move || {
                while let Ok(command) = cmd_rx.recv() {
                    let service = service.clone();
                    let event_tx = event_tx.clone();
                    runtime.spawn(async move {
                        handle_command(service.as_ref(), command, event_tx).await;
                    });
                }
                roster_debug!("Engine command channel closed; shutting down");
            })?;

        Ok(Self { cmd_tx, event_rx })
    }

    pub fn submit_preview(&self, request_id: RequestId, upload: Upload) -> Result<(), EngineError> {
        self.cmd_tx
            .send(EngineCommand::Preview { request_id, upload })
            .map_err(|_| EngineError::Stopped)
    }

    pub fn submit_generate(
        &self,
        request_id: RequestId,
        params: GenerateParams,
    ) -> Result<(), EngineError> {
        self.cmd_tx
            .send(EngineCommand::Generate { request_id, params })
            .map_err(|_| EngineError::Stopped)
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }
}

async fn handle_command(
    service: &dyn RosterService,
    command: EngineCommand,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    let event = match command {
        EngineCommand::Preview { request_id, upload } => EngineEvent::PreviewCompleted {
            request_id,
            result: service.preview(&upload).await,
        },
        EngineCommand::Generate { request_id, params } => EngineEvent::GenerateCompleted {
            request_id,
            result: service.generate(&params).await,
        },
    };
    if event_tx.send(event).is_err() {
        roster_warn!("Engine event receiver dropped; completion lost");
    }
}
