//! Obstacle field renderer.
//!
//! Maps one ultrasonic range reading per sensor onto that sensor's angular
//! wedge. The wedge radius is the measured distance capped at the sensor's
//! maximum range; the fill colour is chosen from the raw distance.

use argus_types::SensorDescriptor;
use tracing::debug;

use crate::geometry::{Point2, WedgePath, wedge_path};

/// Proximity band of a single range reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObstacleLevel {
    /// Closer than 1 m.
    Alarm,
    /// 1 m up to (not including) 2 m.
    Caution,
    /// 2 m or further.
    Clear,
}

impl ObstacleLevel {
    pub fn classify(distance: f64) -> Self {
        if distance < 1.0 {
            ObstacleLevel::Alarm
        } else if distance < 2.0 {
            ObstacleLevel::Caution
        } else {
            ObstacleLevel::Clear
        }
    }

    /// Translucent fill used on the obstacle surface.
    pub fn fill(self) -> &'static str {
        match self {
            ObstacleLevel::Alarm => "rgba(255,0,0,0.5)",
            ObstacleLevel::Caution => "rgba(255,255,0,0.3)",
            ObstacleLevel::Clear => "rgba(0,0,255,0.3)",
        }
    }
}

/// The redraw instruction for one sensor slot.
#[derive(Debug, Clone, PartialEq)]
pub struct WedgeUpdate {
    pub index: usize,
    pub path: WedgePath,
    pub level: ObstacleLevel,
}

impl WedgeUpdate {
    pub fn radius(&self) -> f64 {
        self.path.radius
    }
}

/// Renders range readings against a fixed sensor layout.
#[derive(Debug, Clone)]
pub struct ObstacleField {
    sensors: Vec<SensorDescriptor>,
}

impl ObstacleField {
    pub fn new(sensors: Vec<SensorDescriptor>) -> Self {
        Self { sensors }
    }

    /// Full-range wedges for every sensor, drawn before any reading arrives.
    pub fn baseline(&self) -> Vec<WedgeUpdate> {
        self.sensors
            .iter()
            .enumerate()
            .map(|(index, sensor)| Self::wedge(index, sensor, sensor.max_range, ObstacleLevel::Clear))
            .collect()
    }

    /// Wedges for one reading.
    ///
    /// Indices without a matching sensor, lost readings (`None`) and
    /// non-finite or negative distances are skipped; the remaining sensors
    /// still update.
    pub fn render(&self, distances: &[Option<f64>]) -> Vec<WedgeUpdate> {
        distances
            .iter()
            .enumerate()
            .filter_map(|(index, &distance)| {
                let Some(sensor) = self.sensors.get(index) else {
                    debug!(index, "range reading without sensor descriptor");
                    return None;
                };
                let Some(distance) = distance else {
                    debug!(index, "lost range reading");
                    return None;
                };
                if !distance.is_finite() || distance < 0.0 {
                    debug!(index, distance, "unusable range reading");
                    return None;
                }
                let radius = sensor.max_range.min(distance);
                Some(Self::wedge(index, sensor, radius, ObstacleLevel::classify(distance)))
            })
            .collect()
    }

    fn wedge(index: usize, sensor: &SensorDescriptor, radius: f64, level: ObstacleLevel) -> WedgeUpdate {
        WedgeUpdate {
            index,
            path: wedge_path(
                Point2::new(sensor.x, sensor.y),
                radius,
                sensor.start_angle(),
                sensor.end_angle(),
            ),
            level,
        }
    }
}
