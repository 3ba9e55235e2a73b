//! `argus-middleware` – the duplex link between ground station and robot.
//!
//! Moves text frames in both directions without interpreting them; decoding
//! and dispatch live in `argus-runtime`.
//!
//! # Modules
//!
//! - [`link`] – the [`RobotLink`] transport trait, [`LinkEvent`]s and
//!   [`LinkConfig`].
//! - [`ws_link`] – [`WsLink`], a WebSocket client with a fixed-interval
//!   `ping` heartbeat and no automatic reconnection.
//! - [`sim`] – [`SimulatedRobot`], a WebSocket server that stands in for the
//!   firmware during development and tests.

pub mod link;
pub mod sim;
pub mod ws_link;

pub use link::{DEFAULT_HEARTBEAT, DEFAULT_ROBOT_URL, LinkConfig, LinkEvent, LinkEventKind, RobotLink};
pub use sim::{SimHandle, SimulatedRobot};
pub use ws_link::WsLink;
