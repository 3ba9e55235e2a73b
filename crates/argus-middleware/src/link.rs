//! The robot link seam.
//!
//! The runtime never talks to a socket directly. It holds a [`RobotLink`]
//! for outbound frames and drains [`LinkEvent`]s from a channel for inbound
//! traffic and lifecycle changes.
//!
//! - [`RobotLink`] – the trait every transport implements.
//! - [`WsLink`][crate::ws_link::WsLink] – WebSocket client used against the
//!   real firmware and the [`SimulatedRobot`][crate::sim::SimulatedRobot].

use std::time::Duration;

use argus_types::{ArgusError, OutboundFrame};
use uuid::Uuid;

/// Access point of the robot firmware in its default soft-AP mode.
pub const DEFAULT_ROBOT_URL: &str = "ws://192.168.4.1/ws";

/// Interval between liveness probes while a link is open.
pub const DEFAULT_HEARTBEAT: Duration = Duration::from_secs(10);

/// How to reach the robot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkConfig {
    pub url: String,
    pub heartbeat: Duration,
}

impl LinkConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            heartbeat: DEFAULT_HEARTBEAT,
        }
    }

    /// Override the heartbeat interval (builder-style).
    pub fn with_heartbeat(mut self, heartbeat: Duration) -> Self {
        self.heartbeat = heartbeat;
        self
    }
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self::new(DEFAULT_ROBOT_URL)
    }
}

/// Something that happened on a link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkEvent {
    /// Identifies the connection that produced the event, so events from a
    /// replaced link can be told apart from the current one.
    pub link_id: Uuid,
    pub kind: LinkEventKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkEventKind {
    Opened,
    /// One inbound text frame, unparsed.
    Frame(String),
    /// Transport failure. Always followed by [`LinkEventKind::Closed`].
    Error(String),
    /// Terminal for this link; no further events follow.
    Closed,
}

/// Outbound half of a duplex connection to the robot.
///
/// # Contract
///
/// * `send` fails with [`ArgusError::LinkUnavailable`] unless the link is
///   open; frames are never queued for later delivery.
/// * `close` is idempotent. The link reports [`LinkEventKind::Closed`] once
///   the transport has shut down.
pub trait RobotLink: Send {
    fn id(&self) -> Uuid;

    fn is_connected(&self) -> bool;

    fn send(&self, frame: OutboundFrame) -> Result<(), ArgusError>;

    fn close(&self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_targets_firmware_access_point() {
        let cfg = LinkConfig::default();
        assert_eq!(cfg.url, "ws://192.168.4.1/ws");
        assert_eq!(cfg.heartbeat, Duration::from_secs(10));
    }

    #[test]
    fn with_heartbeat_overrides_default() {
        let cfg = LinkConfig::new("ws://127.0.0.1:9091/ws").with_heartbeat(Duration::from_millis(250));
        assert_eq!(cfg.heartbeat, Duration::from_millis(250));
        assert_eq!(cfg.url, "ws://127.0.0.1:9091/ws");
    }
}
