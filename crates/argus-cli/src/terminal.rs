//! Terminal frontend for the session's display sinks.
//!
//! Console lines and map events are printed as they happen. High-rate
//! telemetry (gauges, chart, thermal raster, obstacle wedges) is folded into a
//! shared [`Dashboard`] snapshot that the REPL renders on request, so the
//! prompt is not flooded once per frame. An obstacle entering the alarm band
//! is the one telemetry event printed immediately.

use std::collections::{BTreeMap, HashMap};
use std::io::Write;
use std::sync::{Arc, Mutex, MutexGuard};

use argus_perception::{ObstacleLevel, ThermalRaster};
use argus_runtime::{ChartSeries, ChartSink, ConsoleSink, GaugeSink, MapSink, PathSink, RasterSink};
use argus_types::{GasChannel, LatLng};
use colored::Colorize;

/// Latest state of every telemetry surface.
#[derive(Debug, Default)]
pub struct Dashboard {
    pub gauges: HashMap<GasChannel, f64>,
    pub chart_points: usize,
    /// First and last chart label (oldest, newest).
    pub chart_span: Option<(String, String)>,
    pub raster: Option<ThermalRaster>,
    pub wedges: BTreeMap<usize, ObstacleLevel>,
    pub bot: Option<LatLng>,
    pub route: Vec<LatLng>,
    pub destination: Option<(LatLng, String)>,
}

pub type SharedDashboard = Arc<Mutex<Dashboard>>;

/// Lock the dashboard, recovering the data if a holder panicked.
pub fn lock(dashboard: &SharedDashboard) -> MutexGuard<'_, Dashboard> {
    dashboard.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[derive(Debug, Default)]
pub struct TerminalSurfaces {
    dashboard: SharedDashboard,
}

impl TerminalSurfaces {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dashboard(&self) -> SharedDashboard {
        Arc::clone(&self.dashboard)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Sink implementations
// ─────────────────────────────────────────────────────────────────────────────

impl ConsoleSink for TerminalSurfaces {
    fn print(&mut self, line: &str) {
        println!("  {} {}", "│".dimmed(), line);
    }

    fn clear(&mut self) {
        print!("\x1B[2J\x1B[H");
        std::io::stdout().flush().ok();
    }
}

impl GaugeSink for TerminalSurfaces {
    fn set_gauge(&mut self, channel: GasChannel, value: f64) {
        lock(&self.dashboard).gauges.insert(channel, value);
    }
}

impl ChartSink for TerminalSurfaces {
    fn render_chart(&mut self, labels: &[String], _series: &[ChartSeries]) {
        let mut dashboard = lock(&self.dashboard);
        dashboard.chart_points = labels.len();
        dashboard.chart_span = labels.first().zip(labels.last()).map(|(a, b)| (a.clone(), b.clone()));
    }
}

impl RasterSink for TerminalSurfaces {
    fn put_raster(&mut self, raster: &ThermalRaster) {
        lock(&self.dashboard).raster = Some(raster.clone());
    }
}

impl PathSink for TerminalSurfaces {
    fn set_wedge(&mut self, index: usize, _path: &str, fill: &str) {
        let Some(level) = level_for_fill(fill) else {
            return;
        };
        let previous = lock(&self.dashboard).wedges.insert(index, level);
        if level == ObstacleLevel::Alarm && previous != Some(ObstacleLevel::Alarm) {
            println!(
                "  {} obstacle inside alarm range on sensor {}",
                "⚠".red().bold(),
                index
            );
        }
    }
}

impl MapSink for TerminalSurfaces {
    fn set_bot_position(&mut self, position: LatLng) {
        lock(&self.dashboard).bot = Some(position);
    }

    fn show_route(&mut self, waypoints: &[LatLng]) {
        lock(&self.dashboard).route = waypoints.to_vec();
    }

    fn fit_route(&mut self, waypoints: &[LatLng]) {
        println!(
            "  {} route of {} waypoints",
            "map:".cyan(),
            waypoints.len()
        );
    }

    fn clear_route(&mut self) {
        lock(&self.dashboard).route.clear();
    }

    fn set_destination(&mut self, at: LatLng, label: &str) {
        println!("  {} {} at {}", "map:".cyan(), label.bold(), at);
        lock(&self.dashboard).destination = Some((at, label.to_string()));
    }

    fn clear_destination(&mut self) {
        lock(&self.dashboard).destination = None;
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Views
// ─────────────────────────────────────────────────────────────────────────────

const GAUGE_WIDTH: usize = 20;

/// Thermal preview size in terminal cells.
pub const THERMAL_COLS: usize = 32;
pub const THERMAL_ROWS: usize = 12;

fn level_for_fill(fill: &str) -> Option<ObstacleLevel> {
    [ObstacleLevel::Alarm, ObstacleLevel::Caution, ObstacleLevel::Clear]
        .into_iter()
        .find(|level| level.fill() == fill)
}

/// `value` in `[0, 100]` as a fixed-width bar.
pub fn gauge_bar(value: f64) -> String {
    let filled = ((value.clamp(0.0, 100.0) / 100.0) * GAUGE_WIDTH as f64).round() as usize;
    format!("{}{}", "█".repeat(filled), "░".repeat(GAUGE_WIDTH - filled))
}

pub fn gauge_lines(dashboard: &Dashboard) -> Vec<String> {
    let mut lines: Vec<String> = GasChannel::ALL
        .iter()
        .map(|channel| match dashboard.gauges.get(channel) {
            Some(value) => format!("{:<12} {} {:5.1}%", channel.label(), gauge_bar(*value), value),
            None => format!("{:<12} {}   --", channel.label(), "░".repeat(GAUGE_WIDTH)),
        })
        .collect();
    if let Some((first, last)) = &dashboard.chart_span {
        lines.push(format!("chart: {} points, {first} .. {last}", dashboard.chart_points));
    }
    lines
}

/// Downsample the raster to `cols`×`rows` colours, sampling each cell centre.
pub fn thermal_cells(raster: &ThermalRaster, cols: usize, rows: usize) -> Vec<Vec<[u8; 3]>> {
    (0..rows)
        .map(|row| {
            let y = (row * raster.height() + raster.height() / 2) / rows;
            (0..cols)
                .map(|col| {
                    let x = (col * raster.width() + raster.width() / 2) / cols;
                    let [r, g, b, _] = raster.pixel(x, y);
                    [r, g, b]
                })
                .collect()
        })
        .collect()
}

pub fn thermal_lines(raster: &ThermalRaster) -> Vec<String> {
    thermal_cells(raster, THERMAL_COLS, THERMAL_ROWS)
        .into_iter()
        .map(|row| {
            row.into_iter()
                .map(|[r, g, b]| "█".truecolor(r, g, b).to_string())
                .collect()
        })
        .collect()
}

pub fn obstacle_lines(dashboard: &Dashboard) -> Vec<String> {
    dashboard
        .wedges
        .iter()
        .map(|(index, level)| {
            let name = match level {
                ObstacleLevel::Alarm => "ALARM".red().bold(),
                ObstacleLevel::Caution => "caution".yellow(),
                ObstacleLevel::Clear => "clear".blue(),
            };
            format!("sensor {index}: {name}")
        })
        .collect()
}

pub fn map_lines(dashboard: &Dashboard) -> Vec<String> {
    let mut lines = Vec::new();
    match dashboard.bot {
        Some(bot) => lines.push(format!("bot: {bot}")),
        None => lines.push("bot: unknown".to_string()),
    }
    if dashboard.route.is_empty() {
        lines.push("route: none".to_string());
    } else {
        lines.push(format!("route: {} waypoints", dashboard.route.len()));
        for (i, point) in dashboard.route.iter().enumerate() {
            lines.push(format!("  {i:>2}. {point}"));
        }
    }
    if let Some((at, label)) = &dashboard.destination {
        lines.push(format!("{label}: {at}"));
    }
    lines
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
