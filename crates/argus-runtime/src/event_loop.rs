//! [`EventLoop`] – the single consumer that drives a [`Session`].
//!
//! Two queues feed the loop: operator intent ([`SessionEvent`], from the
//! shell) and link traffic ([`LinkEvent`], from whichever link is current).
//! `select!` takes one event at a time and runs its reaction to completion
//! before looking at the next, so the session is never touched
//! concurrently.
//!
//! # Example
//!
//! ```rust,no_run
//! use argus_middleware::LinkConfig;
//! use argus_runtime::event_loop::{EventLoop, SessionEvent};
//! use argus_runtime::session::{Session, SessionConfig};
//! use argus_runtime::surfaces::Surfaces;
//!
//! async fn drive<S: Surfaces>(surfaces: S) {
//!     let (tx, rx) = tokio::sync::mpsc::channel(64);
//!     let session = Session::new(SessionConfig::default(), surfaces);
//!     let event_loop = EventLoop::new(session, LinkConfig::default());
//!
//!     tx.send(SessionEvent::Connect(None)).await.unwrap();
//!     tx.send(SessionEvent::Shutdown).await.unwrap();
//!     let _session = event_loop.run(rx).await;
//! }
//! ```

use std::net::SocketAddr;

use argus_middleware::{LinkConfig, LinkEvent, SimHandle, SimulatedRobot, WsLink};
use argus_types::{ActionKind, LatLng};
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::session::Session;
use crate::surfaces::Surfaces;

/// Operator intent, as produced by a shell.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// One console line.
    Input(String),
    /// Open a link to the given URL, or to the configured one.
    Connect(Option<String>),
    Disconnect,
    /// Start the simulated robot (once) and connect to it.
    StartSim,
    /// Map click: route to a point with the chosen action.
    MapAction(LatLng, ActionKind),
    ToggleMode,
    Status,
    Shutdown,
}

/// Where and how to run the simulated robot for [`SessionEvent::StartSim`].
#[derive(Debug, Clone)]
pub struct SimSettings {
    pub robot: SimulatedRobot,
    pub addr: SocketAddr,
}

pub struct EventLoop<S: Surfaces> {
    session: Session<S>,
    link_config: LinkConfig,
    link_tx: mpsc::UnboundedSender<LinkEvent>,
    link_rx: mpsc::UnboundedReceiver<LinkEvent>,
    sim_settings: Option<SimSettings>,
    sim: Option<SimHandle>,
}

impl<S: Surfaces> EventLoop<S> {
    pub fn new(session: Session<S>, link_config: LinkConfig) -> Self {
        let (link_tx, link_rx) = mpsc::unbounded_channel();
        Self {
            session,
            link_config,
            link_tx,
            link_rx,
            sim_settings: None,
            sim: None,
        }
    }

    /// Enable [`SessionEvent::StartSim`] (builder-style).
    pub fn with_sim(mut self, settings: SimSettings) -> Self {
        self.sim_settings = Some(settings);
        self
    }

    pub fn session(&self) -> &Session<S> {
        &self.session
    }

    /// Process events until [`SessionEvent::Shutdown`] or until every
    /// operator sender is dropped, then hand the session back.
    pub async fn run(mut self, mut operator: mpsc::Receiver<SessionEvent>) -> Session<S> {
        loop {
            tokio::select! {
                event = operator.recv() => {
                    match event {
                        Some(SessionEvent::Shutdown) | None => break,
                        Some(event) => self.handle(event).await,
                    }
                }
                Some(event) = self.link_rx.recv() => {
                    self.session.handle_link_event(event);
                }
            }
        }

        info!("event loop stopping");
        self.session.shutdown();
        self.session
    }

    async fn handle(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::Input(line) => self.session.handle_input(&line),
            SessionEvent::Connect(url) => {
                let url = url.unwrap_or_else(|| self.link_config.url.clone());
                self.connect(url);
            }
            SessionEvent::Disconnect => self.session.disconnect(),
            SessionEvent::StartSim => self.start_sim().await,
            SessionEvent::MapAction(at, action) => self.session.start_route(at, action),
            SessionEvent::ToggleMode => {
                self.session.toggle_mode();
            }
            SessionEvent::Status => self.session.status_report(),
            SessionEvent::Shutdown => {}
        }
    }

    fn connect(&mut self, url: String) {
        let config = LinkConfig {
            url: url.clone(),
            heartbeat: self.link_config.heartbeat,
        };
        let link = WsLink::connect(config, self.link_tx.clone());
        self.session.attach_link(Box::new(link), &url);
    }

    async fn start_sim(&mut self) {
        if let Some(sim) = &self.sim {
            let url = sim.url();
            self.connect(url);
            return;
        }
        let Some(settings) = self.sim_settings.clone() else {
            self.session.surfaces_mut().print("Simulator is not configured.");
            return;
        };

        match settings.robot.spawn(settings.addr).await {
            Ok(sim) => {
                let url = sim.url();
                self.session
                    .surfaces_mut()
                    .print(&format!("Simulated robot running at {url}"));
                self.sim = Some(sim);
                self.connect(url);
            }
            Err(e) => {
                warn!(error = %e, "simulator failed to start");
                self.session
                    .surfaces_mut()
                    .print(&format!("Simulator failed: {e}"));
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{LinkState, SessionConfig};
    use crate::testing::RecordingSurfaces;
    use argus_types::GasChannel;
    use std::time::Duration;

    const HOME: LatLng = LatLng::new(7.351136, -2.341782);

    fn event_loop() -> EventLoop<RecordingSurfaces> {
        let session = Session::new(
            SessionConfig {
                route_seed: Some(8),
                ..SessionConfig::default()
            },
            RecordingSurfaces::default(),
        );
        EventLoop::new(session, LinkConfig::default())
    }

    #[tokio::test]
    async fn local_events_run_in_order_and_shutdown_returns_session() {
        let (tx, rx) = mpsc::channel(16);
        tx.send(SessionEvent::Input("mode".into())).await.unwrap();
        tx.send(SessionEvent::ToggleMode).await.unwrap();
        tx.send(SessionEvent::MapAction(LatLng::new(7.352, -2.343), ActionKind::Inspect))
            .await
            .unwrap();
        tx.send(SessionEvent::Status).await.unwrap();
        tx.send(SessionEvent::Shutdown).await.unwrap();

        let session = event_loop().run(rx).await;
        let surfaces = session.surfaces();
        assert!(surfaces.printed("Current control mode: MANUAL"));
        assert!(surfaces.printed("Switched mode to: AUTO"));
        assert!(surfaces.printed("Inspect (7.352000, -2.343000)..."));
        assert_eq!(
            surfaces.destination.as_ref().map(|(_, label)| label.as_str()),
            Some("Destination (Inspect)")
        );
        assert!(surfaces.printed("Mode: AUTO"));
    }

    #[tokio::test]
    async fn dropping_every_sender_stops_the_loop() {
        let (tx, rx) = mpsc::channel(1);
        drop(tx);
        let session = tokio::time::timeout(Duration::from_secs(5), event_loop().run(rx))
            .await
            .unwrap();
        assert_eq!(session.link_state(), LinkState::Disconnected);
    }

    #[tokio::test]
    async fn start_sim_without_settings_reports() {
        let (tx, rx) = mpsc::channel(4);
        tx.send(SessionEvent::StartSim).await.unwrap();
        tx.send(SessionEvent::Shutdown).await.unwrap();
        let session = event_loop().run(rx).await;
        assert!(session.surfaces().printed("Simulator is not configured."));
    }

    #[tokio::test]
    async fn simulated_robot_end_to_end() {
        let sim_settings = SimSettings {
            robot: SimulatedRobot::new(HOME)
                .with_period(Duration::from_millis(20))
                .with_seed(5),
            addr: "127.0.0.1:0".parse().unwrap(),
        };
        let (tx, rx) = mpsc::channel(16);
        let driver = async {
            tx.send(SessionEvent::StartSim).await.unwrap();
            // Let the link open and a few telemetry bursts arrive.
            tokio::time::sleep(Duration::from_millis(500)).await;
            tx.send(SessionEvent::Input("move forward".into())).await.unwrap();
            tokio::time::sleep(Duration::from_millis(200)).await;
            tx.send(SessionEvent::Shutdown).await.unwrap();
        };

        let (session, ()) = tokio::join!(event_loop().with_sim(sim_settings).run(rx), driver);
        let surfaces = session.surfaces();

        assert!(surfaces.printed("Connected to robot."));
        assert!(surfaces.printed("argus-bot: $ move forward"));
        assert!(!surfaces.printed(crate::session::NOT_CONNECTED));
        assert!(surfaces.gauges.contains_key(&GasChannel::AirQuality));
        assert!(surfaces.raster_writes > 0);
        assert!(session.position() != HOME);
        assert_eq!(session.link_state(), LinkState::Disconnected);
    }

    #[tokio::test]
    async fn refused_connect_reports_error_and_disconnect() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let (tx, rx) = mpsc::channel(4);
        let driver = async {
            tx.send(SessionEvent::Connect(Some(format!("ws://{addr}/ws"))))
                .await
                .unwrap();
            tokio::time::sleep(Duration::from_millis(300)).await;
            tx.send(SessionEvent::Input("stop".into())).await.unwrap();
            tx.send(SessionEvent::Shutdown).await.unwrap();
        };
        let (session, ()) = tokio::join!(event_loop().run(rx), driver);
        let surfaces = session.surfaces();

        assert!(surfaces.printed(&format!("Connecting to robot at ws://{addr}/ws...")));
        assert!(surfaces.console.iter().any(|l| l.starts_with("Robot link error: ")));
        assert!(surfaces.printed("Robot link disconnected."));
        assert_eq!(surfaces.last_line(), Some(crate::session::NOT_CONNECTED));
    }
}
