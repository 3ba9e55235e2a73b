//! Shared vocabulary for the Argus inspection-robot ground station.
//!
//! Everything that crosses a crate boundary lives here: geographic and
//! robot-local value types, the fixed ranging-sensor layout, gas samples,
//! the inbound/outbound link protocol ([`protocol`]) and the error taxonomy.

pub mod protocol;

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use protocol::{FRAME_KINDS, InboundFrame, OutboundFrame, PING_LITERAL};

/// A WGS-84 coordinate in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

impl fmt::Display for LatLng {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lng)
    }
}

/// Mounting and coverage of one ultrasonic ranging sensor.
///
/// `x`/`y` are robot-local metres (Y points forward / north-up), the
/// boresight is measured counter-clockwise from +X.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorDescriptor {
    pub x: f64,
    pub y: f64,
    pub boresight_deg: f64,
    pub max_range: f64,
    pub fov_deg: f64,
}

impl SensorDescriptor {
    pub const fn new(x: f64, y: f64, boresight_deg: f64, max_range: f64, fov_deg: f64) -> Self {
        Self {
            x,
            y,
            boresight_deg,
            max_range,
            fov_deg,
        }
    }

    /// Left edge of the field of view (degrees).
    pub fn start_angle(&self) -> f64 {
        self.boresight_deg - self.fov_deg / 2.0
    }

    /// Right edge of the field of view (degrees).
    pub fn end_angle(&self) -> f64 {
        self.boresight_deg + self.fov_deg / 2.0
    }
}

/// The five-sensor ring mounted on the Argus chassis: three forward-facing
/// (centre, left, right) and two lateral.
pub fn default_sensor_set() -> Vec<SensorDescriptor> {
    vec![
        SensorDescriptor::new(0.00, 2.5, 90.0, 4.0, 30.0),
        SensorDescriptor::new(-1.75, 2.5, 110.0, 4.0, 30.0),
        SensorDescriptor::new(1.75, 2.5, 70.0, 4.0, 30.0),
        SensorDescriptor::new(-1.75, 0.0, 180.0, 3.0, 30.0),
        SensorDescriptor::new(1.75, 0.0, 0.0, 3.0, 30.0),
    ]
}

/// Scalar gas channels tracked by the telemetry aggregator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GasChannel {
    Co,
    Ch4,
    Lpg,
    AirQuality,
}

impl GasChannel {
    pub const ALL: [GasChannel; 4] = [
        GasChannel::Co,
        GasChannel::Ch4,
        GasChannel::Lpg,
        GasChannel::AirQuality,
    ];

    pub fn label(self) -> &'static str {
        match self {
            GasChannel::Co => "CO",
            GasChannel::Ch4 => "CH4",
            GasChannel::Lpg => "LPG",
            GasChannel::AirQuality => "Air Quality",
        }
    }
}

/// One gas reading, percentages in `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GasSample {
    pub timestamp: DateTime<Utc>,
    pub co: f64,
    pub ch4: f64,
    pub lpg: f64,
    pub air_quality: f64,
}

impl GasSample {
    /// Build a sample from the two raw firmware channels.
    ///
    /// The MQ-9 is the only combustible-gas sensor on board, so CO, CH4 and
    /// LPG all mirror it until the firmware reports separate channels.
    pub fn from_reading(mq9_pct: f64, mq135_pct: f64, timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            co: mq9_pct,
            ch4: mq9_pct,
            lpg: mq9_pct,
            air_quality: mq135_pct,
        }
    }

    pub fn value(&self, channel: GasChannel) -> f64 {
        match channel {
            GasChannel::Co => self.co,
            GasChannel::Ch4 => self.ch4,
            GasChannel::Lpg => self.lpg,
            GasChannel::AirQuality => self.air_quality,
        }
    }
}

/// A GNSS report. Only fixes with `has_fix` move the robot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionFix {
    pub lat: f64,
    pub lng: f64,
    pub has_fix: bool,
}

impl PositionFix {
    pub fn position(&self) -> Option<LatLng> {
        self.has_fix.then(|| LatLng::new(self.lat, self.lng))
    }
}

/// What the robot is asked to do once it reaches a route's destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ActionKind {
    #[default]
    GoTo,
    Inspect,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionKind::GoTo => write!(f, "Go To"),
            ActionKind::Inspect => write!(f, "Inspect"),
        }
    }
}

/// Operator-side control mode. Purely local UI state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlMode {
    #[default]
    Manual,
    Auto,
}

impl ControlMode {
    pub fn toggled(self) -> Self {
        match self {
            ControlMode::Manual => ControlMode::Auto,
            ControlMode::Auto => ControlMode::Manual,
        }
    }
}

impl fmt::Display for ControlMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControlMode::Manual => write!(f, "MANUAL"),
            ControlMode::Auto => write!(f, "AUTO"),
        }
    }
}

/// Why an inbound frame was dropped.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProtocolError {
    #[error("frame is not valid JSON: {0}")]
    Malformed(String),

    #[error("frame has no string `type` field")]
    MissingType,

    #[error("unknown frame type `{0}`")]
    UnknownType(String),

    #[error("invalid `{kind}` payload: {reason}")]
    InvalidPayload { kind: String, reason: String },
}

/// Ground-station error taxonomy.
#[derive(Error, Debug)]
pub enum ArgusError {
    #[error("Protocol Error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("Input Format Error: {0}")]
    InputFormat(String),

    #[error("Robot link unavailable")]
    LinkUnavailable,

    #[error("Degenerate Data: {0}")]
    DegenerateData(String),

    #[error("Transport Error: {0}")]
    Transport(String),

    #[error("Config Error: {0}")]
    Config(String),
}
