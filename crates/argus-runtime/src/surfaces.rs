//! Display sinks.
//!
//! The session never renders anything itself. Each visual surface of the
//! operator shell is a small write-only trait; a frontend implements all of
//! them and is handed to [`Session`][crate::session::Session] as one value
//! through the [`Surfaces`] umbrella trait.
//!
//! | Sink | Receives |
//! |---|---|
//! | [`ConsoleSink`] | append-only console lines, clear |
//! | [`GaugeSink`] | one 0–100 value per gas channel |
//! | [`ChartSink`] | up to 20 labelled points per gas channel |
//! | [`RasterSink`] | 256×192 RGBA thermal image |
//! | [`PathSink`] | one wedge path string plus fill per sensor index |
//! | [`MapSink`] | bot marker, route polyline, destination marker |

use argus_perception::ThermalRaster;
use argus_types::{GasChannel, LatLng};

pub trait ConsoleSink {
    fn print(&mut self, line: &str);

    fn clear(&mut self);
}

pub trait GaugeSink {
    /// `value` is already clamped to `[0, 100]`.
    fn set_gauge(&mut self, channel: GasChannel, value: f64);
}

/// One chart line.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSeries {
    pub channel: GasChannel,
    pub values: Vec<f64>,
}

pub trait ChartSink {
    /// Replace the chart contents. `labels` and every series' `values` have
    /// the same length, oldest first.
    fn render_chart(&mut self, labels: &[String], series: &[ChartSeries]);
}

pub trait RasterSink {
    fn put_raster(&mut self, raster: &ThermalRaster);
}

pub trait PathSink {
    /// Redraw the wedge of sensor `index`.
    fn set_wedge(&mut self, index: usize, path: &str, fill: &str);
}

pub trait MapSink {
    fn set_bot_position(&mut self, position: LatLng);

    fn show_route(&mut self, waypoints: &[LatLng]);

    /// Frame the view around `waypoints`.
    fn fit_route(&mut self, waypoints: &[LatLng]);

    fn clear_route(&mut self);

    fn set_destination(&mut self, at: LatLng, label: &str);

    fn clear_destination(&mut self);
}

/// Every surface a session drives.
pub trait Surfaces: ConsoleSink + GaugeSink + ChartSink + RasterSink + PathSink + MapSink {}

impl<T> Surfaces for T where T: ConsoleSink + GaugeSink + ChartSink + RasterSink + PathSink + MapSink {}
