//! Link wire protocol.
//!
//! Inbound: one JSON object per text frame, discriminated by a `type` field.
//! Outbound: either `{"cmd": "<text>"}` or the bare text `ping`.
//!
//! | type | payload |
//! |---|---|
//! | `gas` | `mq9_pct`, `mq135_pct` |
//! | `gps` | `fix`, `lat`, `lng` |
//! | `ultrasonic` | `dist: (number \| null)[]` |
//! | `thermal` | `data: number[768]` |
//! | `motor` | `status`, `speed`, `steering_deg` |
//! | `avoidance` | `decision` |

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::{PositionFix, ProtocolError};

/// Every `type` value the ground station understands.
pub const FRAME_KINDS: [&str; 6] = ["gas", "gps", "ultrasonic", "thermal", "motor", "avoidance"];

/// Liveness probe text sent over the link.
pub const PING_LITERAL: &str = "ping";

/// One inbound telemetry/status frame from the robot firmware.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum InboundFrame {
    Gas {
        mq9_pct: f64,
        mq135_pct: f64,
    },
    Gps {
        #[serde(default)]
        fix: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        lat: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        lng: Option<f64>,
    },
    Ultrasonic {
        /// `null` marks a lost reading for that sensor.
        dist: Vec<Option<f64>>,
    },
    Thermal {
        data: Vec<f64>,
    },
    Motor {
        status: String,
        speed: f64,
        steering_deg: f64,
    },
    Avoidance {
        decision: String,
    },
}

impl InboundFrame {
    /// Parse one text frame.
    ///
    /// Distinguishes unparseable text, a missing discriminator, an unknown
    /// discriminator and a known kind with a bad payload, so the caller can
    /// log each precisely before dropping the frame.
    pub fn parse(text: &str) -> Result<Self, ProtocolError> {
        let value: Value =
            serde_json::from_str(text).map_err(|e| ProtocolError::Malformed(e.to_string()))?;

        let kind = value
            .get("type")
            .and_then(Value::as_str)
            .ok_or(ProtocolError::MissingType)?
            .to_string();

        if !FRAME_KINDS.contains(&kind.as_str()) {
            return Err(ProtocolError::UnknownType(kind));
        }

        let frame: InboundFrame =
            serde_json::from_value(value).map_err(|e| ProtocolError::InvalidPayload {
                kind: kind.clone(),
                reason: e.to_string(),
            })?;
        frame.validate()?;
        Ok(frame)
    }

    /// The `type` discriminator of this frame.
    pub fn kind(&self) -> &'static str {
        match self {
            InboundFrame::Gas { .. } => "gas",
            InboundFrame::Gps { .. } => "gps",
            InboundFrame::Ultrasonic { .. } => "ultrasonic",
            InboundFrame::Thermal { .. } => "thermal",
            InboundFrame::Motor { .. } => "motor",
            InboundFrame::Avoidance { .. } => "avoidance",
        }
    }

    /// Serialise back to the firmware's wire form.
    pub fn to_wire(&self) -> String {
        // Every field is a plain number, bool, string or array.
        serde_json::to_string(self).unwrap_or_default()
    }

    fn validate(&self) -> Result<(), ProtocolError> {
        if let InboundFrame::Gps {
            fix: true,
            lat,
            lng,
        } = self
            && (lat.is_none() || lng.is_none())
        {
            return Err(ProtocolError::InvalidPayload {
                kind: "gps".to_string(),
                reason: "fix reported without lat/lng".to_string(),
            });
        }
        Ok(())
    }

    /// The GNSS report carried by a `gps` frame.
    pub fn position_fix(&self) -> Option<PositionFix> {
        match self {
            InboundFrame::Gps { fix, lat, lng } => Some(PositionFix {
                lat: lat.unwrap_or_default(),
                lng: lng.unwrap_or_default(),
                has_fix: *fix && lat.is_some() && lng.is_some(),
            }),
            _ => None,
        }
    }
}

/// One outbound frame towards the robot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundFrame {
    /// An operator console command, forwarded verbatim.
    Command(String),
    /// Liveness probe; carries no payload and expects no reply.
    Ping,
}

impl OutboundFrame {
    pub fn command(text: impl Into<String>) -> Self {
        OutboundFrame::Command(text.into())
    }

    pub fn to_wire(&self) -> String {
        match self {
            OutboundFrame::Command(cmd) => json!({ "cmd": cmd }).to_string(),
            OutboundFrame::Ping => PING_LITERAL.to_string(),
        }
    }
}
