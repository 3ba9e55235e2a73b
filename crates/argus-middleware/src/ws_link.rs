//! [`WsLink`] – WebSocket client for the robot firmware.
//!
//! [`WsLink::connect`] spawns one Tokio task per connection. The task owns
//! the socket and multiplexes three sources with `select!`:
//!
//! * inbound socket frames → [`LinkEventKind::Frame`] events,
//! * outbound commands queued through [`RobotLink::send`],
//! * a heartbeat timer that writes the bare text `ping` every interval
//!   while the socket is open.
//!
//! There is no automatic reconnection: once the task reports
//! [`LinkEventKind::Closed`] the operator must connect again.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use argus_types::{ArgusError, OutboundFrame};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::link::{LinkConfig, LinkEvent, LinkEventKind, RobotLink};

#[derive(Debug)]
enum LinkCommand {
    Send(OutboundFrame),
    Close,
}

/// Handle to one WebSocket connection. Dropping the handle closes the link.
#[derive(Debug)]
pub struct WsLink {
    id: Uuid,
    connected: Arc<AtomicBool>,
    commands: mpsc::UnboundedSender<LinkCommand>,
}

impl WsLink {
    /// Start connecting to `config.url`.
    ///
    /// Returns immediately; progress arrives on `events` as
    /// [`LinkEventKind::Opened`] or [`LinkEventKind::Error`] followed by
    /// [`LinkEventKind::Closed`]. Must be called from within a Tokio runtime.
    pub fn connect(config: LinkConfig, events: mpsc::UnboundedSender<LinkEvent>) -> Self {
        let id = Uuid::new_v4();
        let connected = Arc::new(AtomicBool::new(false));
        let (commands, command_rx) = mpsc::unbounded_channel();
        tokio::spawn(run_connection(
            id,
            config,
            command_rx,
            events,
            Arc::clone(&connected),
        ));

        Self {
            id,
            connected,
            commands,
        }
    }
}

impl RobotLink for WsLink {
    fn id(&self) -> Uuid {
        self.id
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    fn send(&self, frame: OutboundFrame) -> Result<(), ArgusError> {
        if !self.is_connected() {
            return Err(ArgusError::LinkUnavailable);
        }
        self.commands
            .send(LinkCommand::Send(frame))
            .map_err(|_| ArgusError::LinkUnavailable)
    }

    fn close(&self) {
        let _ = self.commands.send(LinkCommand::Close);
    }
}

impl Drop for WsLink {
    fn drop(&mut self) {
        self.close();
    }
}

// ---------------------------------------------------------------------------
// Connection task
// ---------------------------------------------------------------------------

#[instrument(skip_all, fields(link = %id, url = %config.url))]
async fn run_connection(
    id: Uuid,
    config: LinkConfig,
    mut commands: mpsc::UnboundedReceiver<LinkCommand>,
    events: mpsc::UnboundedSender<LinkEvent>,
    connected: Arc<AtomicBool>,
) {
    let emit = |kind: LinkEventKind| {
        // The consumer may already be gone during shutdown.
        let _ = events.send(LinkEvent { link_id: id, kind });
    };

    let ws_stream = match connect_async(config.url.as_str()).await {
        Ok((stream, _response)) => stream,
        Err(e) => {
            warn!(error = %e, "robot link connect failed");
            emit(LinkEventKind::Error(e.to_string()));
            emit(LinkEventKind::Closed);
            return;
        }
    };

    connected.store(true, Ordering::SeqCst);
    info!("robot link open");
    emit(LinkEventKind::Opened);

    let (mut ws_tx, mut ws_rx) = ws_stream.split();
    let mut heartbeat = tokio::time::interval_at(Instant::now() + config.heartbeat, config.heartbeat);
    heartbeat.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            // ── Inbound: robot → ground station ────────────────────────────
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        emit(LinkEventKind::Frame(text.as_str().to_owned()));
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(other)) => {
                        debug!(kind = ?std::mem::discriminant(&other), "ignoring non-text frame");
                    }
                    Some(Err(e)) => {
                        warn!(error = %e, "robot link read error");
                        emit(LinkEventKind::Error(e.to_string()));
                        break;
                    }
                }
            }
            // ── Outbound: operator commands ────────────────────────────────
            cmd = commands.recv() => {
                match cmd {
                    Some(LinkCommand::Send(frame)) => {
                        if let Err(e) = ws_tx.send(Message::Text(frame.to_wire().into())).await {
                            warn!(error = %e, "robot link write error");
                            emit(LinkEventKind::Error(e.to_string()));
                            break;
                        }
                    }
                    Some(LinkCommand::Close) | None => {
                        let _ = ws_tx.send(Message::Close(None)).await;
                        break;
                    }
                }
            }
            // ── Liveness probe ─────────────────────────────────────────────
            _ = heartbeat.tick() => {
                if let Err(e) = ws_tx.send(Message::Text(OutboundFrame::Ping.to_wire().into())).await {
                    warn!(error = %e, "robot link heartbeat failed");
                    emit(LinkEventKind::Error(e.to_string()));
                    break;
                }
                debug!("heartbeat sent");
            }
        }
    }

    connected.store(false, Ordering::SeqCst);
    info!("robot link closed");
    emit(LinkEventKind::Closed);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
