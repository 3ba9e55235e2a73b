//! Recording surfaces and an in-memory link for session tests.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use argus_middleware::RobotLink;
use argus_perception::ThermalRaster;
use argus_types::{ArgusError, GasChannel, LatLng, OutboundFrame};
use uuid::Uuid;

use crate::surfaces::{ChartSeries, ChartSink, ConsoleSink, GaugeSink, MapSink, PathSink, RasterSink};

#[derive(Debug, Default)]
pub struct RecordingSurfaces {
    pub console: Vec<String>,
    pub clears: usize,
    pub gauges: HashMap<GasChannel, f64>,
    pub chart_labels: Vec<String>,
    pub chart_series: Vec<ChartSeries>,
    pub raster: Option<ThermalRaster>,
    pub raster_writes: usize,
    pub wedges: BTreeMap<usize, (String, String)>,
    pub wedge_writes: usize,
    pub bot: Option<LatLng>,
    pub route: Option<Vec<LatLng>>,
    pub fitted: Option<Vec<LatLng>>,
    pub destination: Option<(LatLng, String)>,
    /// Every map call, in order.
    pub map_calls: Vec<&'static str>,
}

impl RecordingSurfaces {
    pub fn last_line(&self) -> Option<&str> {
        self.console.last().map(String::as_str)
    }

    pub fn printed(&self, line: &str) -> bool {
        self.console.iter().any(|l| l == line)
    }
}

impl ConsoleSink for RecordingSurfaces {
    fn print(&mut self, line: &str) {
        self.console.push(line.to_string());
    }

    fn clear(&mut self) {
        self.console.clear();
        self.clears += 1;
    }
}

impl GaugeSink for RecordingSurfaces {
    fn set_gauge(&mut self, channel: GasChannel, value: f64) {
        self.gauges.insert(channel, value);
    }
}

impl ChartSink for RecordingSurfaces {
    fn render_chart(&mut self, labels: &[String], series: &[ChartSeries]) {
        self.chart_labels = labels.to_vec();
        self.chart_series = series.to_vec();
    }
}

impl RasterSink for RecordingSurfaces {
    fn put_raster(&mut self, raster: &ThermalRaster) {
        self.raster = Some(raster.clone());
        self.raster_writes += 1;
    }
}

impl PathSink for RecordingSurfaces {
    fn set_wedge(&mut self, index: usize, path: &str, fill: &str) {
        self.wedges.insert(index, (path.to_string(), fill.to_string()));
        self.wedge_writes += 1;
    }
}

impl MapSink for RecordingSurfaces {
    fn set_bot_position(&mut self, position: LatLng) {
        self.bot = Some(position);
    }

    fn show_route(&mut self, waypoints: &[LatLng]) {
        self.route = Some(waypoints.to_vec());
        self.map_calls.push("show_route");
    }

    fn fit_route(&mut self, waypoints: &[LatLng]) {
        self.fitted = Some(waypoints.to_vec());
        self.map_calls.push("fit_route");
    }

    fn clear_route(&mut self) {
        self.route = None;
        self.map_calls.push("clear_route");
    }

    fn set_destination(&mut self, at: LatLng, label: &str) {
        self.destination = Some((at, label.to_string()));
        self.map_calls.push("set_destination");
    }

    fn clear_destination(&mut self) {
        self.destination = None;
        self.map_calls.push("clear_destination");
    }
}

/// A link that records outbound frames instead of sending them. Clones share
/// state, so a test can keep one clone while the session owns another.
#[derive(Debug, Clone)]
pub struct FakeLink {
    id: Uuid,
    connected: Arc<AtomicBool>,
    closed: Arc<AtomicBool>,
    sent: Arc<Mutex<Vec<OutboundFrame>>>,
}

impl FakeLink {
    pub fn open() -> Self {
        Self {
            id: Uuid::new_v4(),
            connected: Arc::new(AtomicBool::new(true)),
            closed: Arc::new(AtomicBool::new(false)),
            sent: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn pending() -> Self {
        let link = Self::open();
        link.connected.store(false, Ordering::SeqCst);
        link
    }

    pub fn sent(&self) -> Vec<OutboundFrame> {
        self.sent.lock().unwrap().clone()
    }

    pub fn was_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

impl RobotLink for FakeLink {
    fn id(&self) -> Uuid {
        self.id
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    fn send(&self, frame: OutboundFrame) -> Result<(), ArgusError> {
        if !self.is_connected() {
            return Err(ArgusError::LinkUnavailable);
        }
        self.sent.lock().unwrap().push(frame);
        Ok(())
    }

    fn close(&self) {
        self.connected.store(false, Ordering::SeqCst);
        self.closed.store(true, Ordering::SeqCst);
    }
}
