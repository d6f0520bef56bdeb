//! Antenna Switch Daemon
//!
//! Runs the interlocked switch engine against a relay driver and a JSON file
//! store. Control requests are read one JSON object per line from stdin and
//! each is answered with one JSON line on stdout. Logs go to stderr.
//!
//! `antswitch --write-config` writes the current daemon settings to
//! `$XDG_CONFIG_HOME/antswitch/daemon.json` and exits.

mod error;
mod settings;

use antswitch_matrix::{
    spawn_switch_actor, ControlRequest, ControlResponse, ControlSurface, SwitchController,
    SwitchEvent, SwitchHandle,
};
use antswitch_relay::{LoggingRelays, RelayDriver, RelayMap, SerialRelayBoard, SimulatedRelays};
use antswitch_store::{JsonFileStore, StoreError};
use error::DaemonError;
use settings::{DaemonSettings, RelayDriverKind};
use std::future::Future;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), DaemonError> {
    // stdout carries responses, so logs go to stderr
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "antswitch=info,antswitch_core=info,antswitch_relay=info,antswitch_store=info,antswitch_matrix=info"
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let settings = DaemonSettings::load();

    if std::env::args().skip(1).any(|arg| arg == "--write-config") {
        let path = settings.save().map_err(DaemonError::Config)?;
        info!("Wrote settings to {}", path.display());
        return Ok(());
    }

    info!("Starting antswitch daemon");

    let store_path = settings.resolved_store_path().ok_or(StoreError::NoPath)?;
    let mut store = JsonFileStore::open(store_path)?;
    info!("Using store {}", store.path().display());

    let relays = build_relays(&settings)?;
    info!("Relay driver: {}", relays.describe());

    let controller = SwitchController::load_all(&mut store, relays)?;
    let surface = ControlSurface::new(controller, store);
    let (handle, events, task) = spawn_switch_actor(surface, settings.event_capacity.max(1));
    tokio::spawn(log_events(events));

    let served = serve(
        &handle,
        BufReader::new(tokio::io::stdin()),
        tokio::io::stdout(),
        ctrl_c(),
    )
    .await;

    // flush even when the request loop failed
    handle.shutdown().await;
    task.await?;
    info!("antswitch daemon stopped");

    served
}

fn build_relays(settings: &DaemonSettings) -> Result<Box<dyn RelayDriver>, DaemonError> {
    let map = RelayMap::with_active_low(settings.active_low);

    let relays: Box<dyn RelayDriver> = match settings.relay_driver {
        RelayDriverKind::Simulated => Box::new(SimulatedRelays::with_map(map)),
        RelayDriverKind::Logging => Box::new(LoggingRelays::new(map)),
        RelayDriverKind::Serial => {
            if settings.serial_port.is_empty() {
                return Err(DaemonError::Config(
                    "relay_driver is serial but serial_port is empty".to_string(),
                ));
            }
            Box::new(SerialRelayBoard::open(
                &settings.serial_port,
                settings.baud_rate,
                map,
            )?)
        }
    };
    Ok(relays)
}

/// Answer requests from `input` until EOF or `shutdown` resolves
///
/// `shutdown` is pinned once for the whole loop, so a signal that arrives
/// while a request is being handled still ends the loop afterwards.
async fn serve<R, W, F>(
    handle: &SwitchHandle,
    input: R,
    mut output: W,
    shutdown: F,
) -> Result<(), DaemonError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
    F: Future<Output = ()>,
{
    let mut lines = input.lines();
    tokio::pin!(shutdown);

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = &mut shutdown => {
                info!("Interrupted");
                return Ok(());
            }
        };

        let Some(line) = line else {
            debug!("Input closed");
            return Ok(());
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<ControlRequest>(line) {
            Ok(request) => handle.request(request).await?,
            Err(e) => {
                warn!("Bad control request: {}", e);
                ControlResponse::bad_request(e.to_string(), handle.snapshot().await?)
            }
        };

        let mut out = serde_json::to_vec(&response)?;
        out.push(b'\n');
        output.write_all(&out).await?;
        output.flush().await?;
    }
}

async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Cannot listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}

async fn log_events(mut events: broadcast::Receiver<SwitchEvent>) {
    loop {
        match events.recv().await {
            Ok(event) if event.is_interlock_alert() => warn!("Interlock: {:?}", event),
            Ok(event) => debug!("Switch event: {:?}", event),
            Err(RecvError::Lagged(skipped)) => warn!("Event log lagged, {} events dropped", skipped),
            Err(RecvError::Closed) => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use antswitch_matrix::{ResponseStatus, SwitchActorCommand};
    use antswitch_store::MemoryStore;
    use std::time::Duration;
    use tokio::sync::{mpsc, oneshot};

    fn spawn_actor() -> (SwitchHandle, tokio::task::JoinHandle<()>) {
        let surface = ControlSurface::new(
            SwitchController::new(Box::new(SimulatedRelays::new())),
            MemoryStore::new(),
        );
        let (handle, _events, task) = spawn_switch_actor(surface, 8);
        (handle, task)
    }

    #[tokio::test]
    async fn test_serve_answers_each_line() {
        let (handle, task) = spawn_actor();
        let input = concat!(
            r#"{"op":"set_cell","port":"com1","slot":2,"connected":true}"#,
            "\n\n",
            r#"{"op":"set_cell","port":"com2","slot":2,"connected":true}"#,
            "\n",
            "garbage\n",
        );
        let mut output = Vec::new();

        serve(&handle, input.as_bytes(), &mut output, std::future::pending())
            .await
            .unwrap();

        let responses: Vec<ControlResponse> = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(responses.len(), 3);
        assert_eq!(responses[0].status, ResponseStatus::Ok);
        assert_eq!(responses[1].error_code(), Some("danger_rejected"));
        assert_eq!(responses[2].error_code(), Some("bad_request"));

        handle.shutdown().await;
        task.await.unwrap();
    }

    #[tokio::test]
    async fn test_shutdown_during_request_is_not_lost() {
        // the actor side is driven by hand so the request can be held open
        let (cmd_tx, mut cmd_rx) = mpsc::channel(4);
        let handle = SwitchHandle::new(cmd_tx);
        let (stop_tx, stop_rx) = oneshot::channel::<()>();

        // input stays open, so only the shutdown future can end the loop
        let (mut client, server) = tokio::io::duplex(1024);
        client.write_all(b"{\"op\":\"get_state\"}\n").await.unwrap();

        let fake_actor = tokio::spawn(async move {
            let Some(SwitchActorCommand::Request { response, .. }) = cmd_rx.recv().await else {
                panic!("expected a request");
            };
            // interrupt arrives while the request is still in flight
            stop_tx.send(()).unwrap();
            tokio::task::yield_now().await;
            let state = SwitchController::new(Box::new(SimulatedRelays::new())).snapshot();
            let _ = response.send(ControlResponse {
                status: ResponseStatus::Ok,
                error: None,
                warning: None,
                state,
            });
        });

        let shutdown = async {
            let _ = stop_rx.await;
        };
        let mut output = Vec::new();
        let result = tokio::time::timeout(
            Duration::from_secs(5),
            serve(&handle, BufReader::new(server), &mut output, shutdown),
        )
        .await
        .expect("serve kept running after shutdown");

        assert!(result.is_ok());
        assert_eq!(String::from_utf8(output).unwrap().lines().count(), 1);
        fake_actor.await.unwrap();
        drop(client);
    }
}
