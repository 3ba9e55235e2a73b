//! `argus-perception` – turning raw robot telemetry into drawable state.
//!
//! Pure, allocation-light algorithms with no I/O; the runtime feeds them
//! decoded frames and pushes their output to display surfaces.
//!
//! # Modules
//!
//! - [`geometry`] – polar ↔ screen transforms and SVG-style pie-slice
//!   [`WedgePath`][geometry::WedgePath]s.
//! - [`thermal`] – bilinear 32×24 → 256×192 upsampling with a per-frame
//!   normalised heat ramp.
//! - [`obstacle`] – [`ObstacleField`][obstacle::ObstacleField]: ultrasonic
//!   ranges → colour-coded sensor wedges.
//! - [`aggregator`] – [`TelemetryAggregator`][aggregator::TelemetryAggregator]:
//!   20-sample rolling windows per gas channel.
//! - [`route`] – [`RouteSynthesizer`][route::RouteSynthesizer]: jittered
//!   display routes and the live GPS trace.

pub mod aggregator;
pub mod geometry;
pub mod obstacle;
pub mod route;
pub mod thermal;

pub use aggregator::{GasPoint, RollingWindow, TelemetryAggregator, WINDOW_CAPACITY};
pub use geometry::{Point2, WedgePath, wedge_path};
pub use obstacle::{ObstacleField, ObstacleLevel, WedgeUpdate};
pub use route::{Route, RouteSynthesizer};
pub use thermal::ThermalRaster;
