//! [`Session`] – the single owner of ground-station state.
//!
//! One session exists per operator shell. It holds the active link, the
//! perception state (obstacle field, gas windows, active route), the robot's
//! live position and the local control mode, plus the [`Surfaces`] it draws
//! on. Every reaction (inbound frame, link lifecycle change, operator input)
//! is a `&mut self` method that runs to completion, so no state is shared
//! between tasks.
//!
//! Frame dispatch lives in [`router`][crate::router]; operator text handling
//! in [`console`][crate::console]. Both are further `impl` blocks on
//! [`Session`].

use argus_middleware::{LinkEvent, LinkEventKind, RobotLink};
use argus_perception::{ObstacleField, Route, RouteSynthesizer, TelemetryAggregator};
use argus_types::{
    ActionKind, ArgusError, ControlMode, GasChannel, LatLng, OutboundFrame, SensorDescriptor,
    default_sensor_set,
};
use tracing::{debug, info};

use crate::surfaces::Surfaces;

/// Where the bot marker sits before the first GPS fix.
pub const DEFAULT_HOME: LatLng = LatLng::new(7.351136, -2.341782);

pub const NOT_CONNECTED: &str = "Robot not connected, command not sent.";

// ─────────────────────────────────────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Configuration bundle for [`Session`].
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Ranging sensor layout, index-aligned with `ultrasonic` frames.
    pub sensors: Vec<SensorDescriptor>,
    /// Bot position until the first fix arrives.
    pub home: LatLng,
    /// Fixed seed for route jitter. `None` seeds from the OS.
    pub route_seed: Option<u64>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            sensors: default_sensor_set(),
            home: DEFAULT_HOME,
            route_seed: None,
        }
    }
}

/// Link state as shown to the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Disconnected,
    Connecting,
    Connected,
}

// ─────────────────────────────────────────────────────────────────────────────
// Session
// ─────────────────────────────────────────────────────────────────────────────

pub struct Session<S: Surfaces> {
    pub(crate) surfaces: S,
    pub(crate) link: Option<Box<dyn RobotLink>>,
    pub(crate) obstacles: ObstacleField,
    pub(crate) gas: TelemetryAggregator,
    pub(crate) routes: RouteSynthesizer,
    pub(crate) position: LatLng,
    pub(crate) has_fix: bool,
    pub(crate) mode: ControlMode,
    pub(crate) last_motor: Option<String>,
    pub(crate) last_avoidance: Option<String>,
}

impl<S: Surfaces> Session<S> {
    /// Create a session and draw its initial state: the bot marker at
    /// `config.home` and every sensor wedge at full range.
    pub fn new(config: SessionConfig, surfaces: S) -> Self {
        let routes = match config.route_seed {
            Some(seed) => RouteSynthesizer::seeded(seed),
            None => RouteSynthesizer::new(),
        };
        let mut session = Self {
            surfaces,
            link: None,
            obstacles: ObstacleField::new(config.sensors),
            gas: TelemetryAggregator::new(),
            routes,
            position: config.home,
            has_fix: false,
            mode: ControlMode::default(),
            last_motor: None,
            last_avoidance: None,
        };

        session.surfaces.set_bot_position(session.position);
        for wedge in session.obstacles.baseline() {
            session
                .surfaces
                .set_wedge(wedge.index, &wedge.path.to_string(), wedge.level.fill());
        }
        session
    }

    pub fn surfaces(&self) -> &S {
        &self.surfaces
    }

    pub fn surfaces_mut(&mut self) -> &mut S {
        &mut self.surfaces
    }

    /// Live position: the last accepted fix, or home.
    pub fn position(&self) -> LatLng {
        self.position
    }

    pub fn mode(&self) -> ControlMode {
        self.mode
    }

    pub fn aggregator(&self) -> &TelemetryAggregator {
        &self.gas
    }

    pub fn active_route(&self) -> Option<&Route> {
        self.routes.active()
    }

    pub fn last_motor(&self) -> Option<&str> {
        self.last_motor.as_deref()
    }

    pub fn last_avoidance(&self) -> Option<&str> {
        self.last_avoidance.as_deref()
    }

    pub fn link_state(&self) -> LinkState {
        match &self.link {
            None => LinkState::Disconnected,
            Some(link) if link.is_connected() => LinkState::Connected,
            Some(_) => LinkState::Connecting,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.link_state() == LinkState::Connected
    }

    // ── Link lifecycle ──────────────────────────────────────────────────────

    /// Adopt `link` as the session's only link, closing any previous one.
    pub fn attach_link(&mut self, link: Box<dyn RobotLink>, url: &str) {
        if let Some(previous) = self.link.take() {
            debug!(link = %previous.id(), "replacing robot link");
            previous.close();
        }
        info!(link = %link.id(), url, "robot link attached");
        self.surfaces.print(&format!("Connecting to robot at {url}..."));
        self.link = Some(link);
    }

    /// Operator-initiated disconnect. Late events from the closed link are
    /// ignored.
    pub fn disconnect(&mut self) {
        match self.link.take() {
            Some(link) => {
                link.close();
                info!(link = %link.id(), "robot link detached");
                self.surfaces.print("Robot link disconnected.");
            }
            None => self.surfaces.print("Robot link is not open."),
        }
    }

    /// React to one event from a link. Events whose `link_id` is not the
    /// current link's are dropped.
    pub fn handle_link_event(&mut self, event: LinkEvent) {
        let current = self.link.as_ref().map(|link| link.id());
        if current != Some(event.link_id) {
            debug!(link = %event.link_id, "ignoring event from superseded link");
            return;
        }

        match event.kind {
            LinkEventKind::Opened => self.surfaces.print("Connected to robot."),
            LinkEventKind::Frame(text) => {
                // Logged inside; a bad frame never affects the link.
                let _ = self.handle_frame(&text);
            }
            LinkEventKind::Error(reason) => {
                self.surfaces.print(&format!("Robot link error: {reason}"));
            }
            LinkEventKind::Closed => {
                self.link = None;
                self.surfaces.print("Robot link disconnected.");
            }
        }
    }

    /// Forward `text` as a command frame.
    ///
    /// # Errors
    ///
    /// [`ArgusError::LinkUnavailable`] when no open link exists; nothing is
    /// queued.
    pub fn send_command(&mut self, text: &str) -> Result<(), ArgusError> {
        match &self.link {
            Some(link) if link.is_connected() => link.send(OutboundFrame::command(text)),
            _ => Err(ArgusError::LinkUnavailable),
        }
    }

    // ── Navigation ──────────────────────────────────────────────────────────

    /// Synthesize a display route from the live position to `to`, replacing
    /// any active route and its destination marker.
    pub fn start_route(&mut self, to: LatLng, action: ActionKind) {
        self.surfaces.clear_route();
        self.surfaces.clear_destination();

        let route = self.routes.generate(self.position, to, action);
        info!(%to, %action, waypoints = route.waypoints().len(), "route started");

        self.surfaces.print(&format!("{action} {to}..."));
        self.surfaces.show_route(route.waypoints());
        self.surfaces.set_destination(to, &format!("Destination ({action})"));
        self.surfaces.fit_route(route.waypoints());
    }

    // ── Local UI state ──────────────────────────────────────────────────────

    pub fn toggle_mode(&mut self) -> ControlMode {
        self.mode = self.mode.toggled();
        self.surfaces.print(&format!("Switched mode to: {}", self.mode));
        self.mode
    }

    /// Print a read-only summary of the session to the console.
    pub fn status_report(&mut self) {
        let link = match self.link_state() {
            LinkState::Connected => "connected",
            LinkState::Connecting => "connecting",
            LinkState::Disconnected => "disconnected",
        };
        let position = if self.has_fix {
            format!("Position: {} (GPS fix)", self.position)
        } else {
            format!("Position: {} (no fix yet)", self.position)
        };
        let gas = if self.gas.is_empty() {
            "Gas: no samples".to_string()
        } else {
            let readings: Vec<String> = GasChannel::ALL
                .iter()
                .filter_map(|&c| self.gas.latest(c).map(|v| format!("{} {v:.1}%", c.label())))
                .collect();
            format!("Gas: {}", readings.join(", "))
        };
        let route = match self.routes.active() {
            Some(r) => format!(
                "Route: {} to {}, {} waypoints",
                r.action(),
                r.destination(),
                r.waypoints().len()
            ),
            None => "Route: none".to_string(),
        };

        let mut lines = vec![
            format!("Link: {link}"),
            format!("Mode: {}", self.mode),
            position,
            gas,
            route,
        ];
        if let Some(motor) = &self.last_motor {
            lines.push(motor.clone());
        }
        if let Some(decision) = &self.last_avoidance {
            lines.push(decision.clone());
        }
        for line in lines {
            self.surfaces.print(&line);
        }
    }

    /// Close the link, if any, as the shell exits.
    pub fn shutdown(&mut self) {
        if let Some(link) = self.link.take() {
            link.close();
        }
        info!("session shut down");
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
