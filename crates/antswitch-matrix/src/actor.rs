//! Switch Actor
//!
//! One task owns the [`ControlSurface`] (and through it the controller and the
//! store). Requests arrive on a single channel and each is handled to
//! completion before the next is read, so two clients can never interleave a
//! read-modify-write of the grid. Last write wins.
//!
//! # Example
//!
//! ```rust,ignore
//! use antswitch_matrix::{spawn_switch_actor, ControlRequest, ControlSurface};
//!
//! let (handle, mut events, task) = spawn_switch_actor(surface, 64);
//! let response = handle.request(ControlRequest::GetState).await?;
//! handle.shutdown().await;
//! task.await?;
//! ```

use antswitch_core::{AntennaSlot, ConnectionGrid, RadioPort};
use antswitch_store::KeyValueStore;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::control::{ControlRequest, ControlResponse, ControlSurface};
use crate::controller::Snapshot;
use crate::error::SwitchError;
use crate::events::SwitchEvent;

/// Commands sent to the switch actor
#[derive(Debug)]
pub enum SwitchActorCommand {
    /// Handle a control request
    Request {
        /// The request
        request: ControlRequest,
        /// Channel to send back the response
        response: oneshot::Sender<ControlResponse>,
    },

    /// Read the current state without changing anything
    Snapshot {
        /// Channel to send back the snapshot
        response: oneshot::Sender<Snapshot>,
    },

    /// Persist everything and stop
    Shutdown,
}

/// Cloneable client handle for the switch actor
#[derive(Debug, Clone)]
pub struct SwitchHandle {
    tx: mpsc::Sender<SwitchActorCommand>,
}

impl SwitchHandle {
    /// Wrap a command sender
    pub fn new(tx: mpsc::Sender<SwitchActorCommand>) -> Self {
        Self { tx }
    }

    /// Send a request and wait for its response
    pub async fn request(&self, request: ControlRequest) -> Result<ControlResponse, SwitchError> {
        let (response, rx) = oneshot::channel();
        self.tx
            .send(SwitchActorCommand::Request { request, response })
            .await
            .map_err(|_| SwitchError::ActorStopped)?;
        rx.await.map_err(|_| SwitchError::ActorStopped)
    }

    /// Current state
    pub async fn snapshot(&self) -> Result<Snapshot, SwitchError> {
        let (response, rx) = oneshot::channel();
        self.tx
            .send(SwitchActorCommand::Snapshot { response })
            .await
            .map_err(|_| SwitchError::ActorStopped)?;
        rx.await.map_err(|_| SwitchError::ActorStopped)
    }

    /// Toggle one contact
    pub async fn set_cell(
        &self,
        port: RadioPort,
        slot: AntennaSlot,
        connected: bool,
        confirm: bool,
    ) -> Result<ControlResponse, SwitchError> {
        self.request(ControlRequest::SetCell {
            port,
            slot,
            connected,
            confirm,
        })
        .await
    }

    /// Restore a preset
    pub async fn load_preset(&self, index: usize, confirm: bool) -> Result<ControlResponse, SwitchError> {
        self.request(ControlRequest::LoadPreset { index, confirm }).await
    }

    /// Save a preset (the live grid when `grid` is `None`)
    pub async fn save_preset(
        &self,
        name: &str,
        grid: Option<ConnectionGrid>,
    ) -> Result<ControlResponse, SwitchError> {
        self.request(ControlRequest::SavePreset {
            name: name.to_string(),
            grid,
        })
        .await
    }

    /// Ask the actor to flush and stop
    pub async fn shutdown(&self) {
        let _ = self.tx.send(SwitchActorCommand::Shutdown).await;
    }
}

/// Run the switch actor until shutdown or until every handle is dropped
///
/// Controller events are published on `event_tx` after each command. The
/// full state is written to the store before the task returns.
pub async fn run_switch_actor<S>(
    mut surface: ControlSurface<S>,
    mut cmd_rx: mpsc::Receiver<SwitchActorCommand>,
    event_tx: broadcast::Sender<SwitchEvent>,
) where
    S: KeyValueStore,
{
    info!("Switch actor started");

    while let Some(cmd) = cmd_rx.recv().await {
        match cmd {
            SwitchActorCommand::Request { request, response } => {
                let reply = surface.handle(request);
                publish(&mut surface, &event_tx);
                if response.send(reply).is_err() {
                    debug!("Requester went away before the response");
                }
            }

            SwitchActorCommand::Snapshot { response } => {
                let _ = response.send(surface.controller().snapshot());
            }

            SwitchActorCommand::Shutdown => {
                info!("Switch actor shutting down");
                break;
            }
        }
    }

    if let Err(e) = surface.flush() {
        warn!("Failed to persist switch state on shutdown: {}", e);
    }
    publish(&mut surface, &event_tx);

    info!("Switch actor stopped");
}

/// Start the actor on the current runtime
///
/// Returns a handle for requests, an event receiver and the task handle.
pub fn spawn_switch_actor<S>(
    surface: ControlSurface<S>,
    capacity: usize,
) -> (SwitchHandle, broadcast::Receiver<SwitchEvent>, JoinHandle<()>)
where
    S: KeyValueStore + 'static,
{
    let (cmd_tx, cmd_rx) = mpsc::channel(capacity);
    let (event_tx, event_rx) = broadcast::channel(capacity);
    let task = tokio::spawn(run_switch_actor(surface, cmd_rx, event_tx));
    (SwitchHandle::new(cmd_tx), event_rx, task)
}

fn publish<S: KeyValueStore>(surface: &mut ControlSurface<S>, event_tx: &broadcast::Sender<SwitchEvent>) {
    for event in surface.controller_mut().drain_events() {
        // no subscribers is fine
        let _ = event_tx.send(event);
    }
}
