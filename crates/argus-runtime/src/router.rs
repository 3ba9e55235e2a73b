//! Message router: inbound frames → perception state → surfaces.
//!
//! | type | action |
//! |---|---|
//! | `gas` | push into the rolling windows, refresh gauges and chart |
//! | `gps` | move the bot and extend the active route, or report no fix |
//! | `ultrasonic` | redraw the sensor wedges |
//! | `thermal` | reconstruct and publish the raster |
//! | `motor` | console line |
//! | `avoidance` | console line |
//!
//! A frame that fails to parse is logged and dropped before any state is
//! touched.

use argus_perception::thermal;
use argus_types::{GasChannel, GasSample, InboundFrame, PositionFix, ProtocolError};
use chrono::{Local, Utc};
use tracing::{debug, instrument, warn};

use crate::session::Session;
use crate::surfaces::{ChartSeries, Surfaces};

impl<S: Surfaces> Session<S> {
    /// Parse one inbound text frame and apply it.
    ///
    /// # Errors
    ///
    /// Returns the [`ProtocolError`] that caused the frame to be dropped; the
    /// session is unchanged in that case.
    #[instrument(skip_all, fields(len = text.len()))]
    pub fn handle_frame(&mut self, text: &str) -> Result<(), ProtocolError> {
        let frame = InboundFrame::parse(text).inspect_err(|e| {
            warn!(error = %e, "dropping inbound frame");
        })?;
        self.dispatch(frame);
        Ok(())
    }

    /// Apply an already-decoded frame.
    pub fn dispatch(&mut self, frame: InboundFrame) {
        debug!(kind = frame.kind(), "dispatching frame");
        let fix = frame.position_fix();
        match frame {
            InboundFrame::Gas { mq9_pct, mq135_pct } => {
                self.apply_gas(GasSample::from_reading(mq9_pct, mq135_pct, Utc::now()));
            }
            InboundFrame::Gps { .. } => {
                if let Some(fix) = fix {
                    self.apply_fix(fix);
                }
            }
            InboundFrame::Ultrasonic { dist } => self.apply_ranges(&dist),
            InboundFrame::Thermal { data } => {
                if let Some(raster) = thermal::reconstruct(&data) {
                    self.surfaces.put_raster(&raster);
                }
            }
            InboundFrame::Motor {
                status,
                speed,
                steering_deg,
            } => {
                let line = format!("Motor: {status}, speed={speed}, steering={steering_deg}");
                self.surfaces.print(&line);
                self.last_motor = Some(line);
            }
            InboundFrame::Avoidance { decision } => {
                let line = format!("Avoidance decision: {decision}");
                self.surfaces.print(&line);
                self.last_avoidance = Some(line);
            }
        }
    }

    fn apply_gas(&mut self, sample: GasSample) {
        self.gas.push(&sample);

        for channel in GasChannel::ALL {
            if let Some(value) = self.gas.latest(channel) {
                self.surfaces.set_gauge(channel, value.clamp(0.0, 100.0));
            }
        }

        let labels: Vec<String> = self
            .gas
            .timestamps()
            .iter()
            .map(|ts| ts.with_timezone(&Local).format("%H:%M:%S").to_string())
            .collect();
        let series: Vec<ChartSeries> = GasChannel::ALL
            .iter()
            .map(|&channel| ChartSeries {
                channel,
                values: self.gas.values(channel),
            })
            .collect();
        self.surfaces.render_chart(&labels, &series);
    }

    fn apply_fix(&mut self, fix: PositionFix) {
        let Some(position) = fix.position() else {
            self.surfaces.print("GPS: no fix");
            return;
        };

        self.position = position;
        self.has_fix = true;
        self.surfaces.set_bot_position(position);
        self.surfaces.print(&format!(
            "GPS fix: Lat {:.6}, Lng {:.6}",
            position.lat, position.lng
        ));

        if let Some(route) = self.routes.extend(position) {
            self.surfaces.show_route(route.waypoints());
        }
    }

    fn apply_ranges(&mut self, distances: &[Option<f64>]) {
        let listed: Vec<String> = distances
            .iter()
            .map(|d| d.map_or_else(|| "null".to_string(), |d| d.to_string()))
            .collect();
        self.surfaces
            .print(&format!("Ultrasonic distances (m): {}", listed.join(", ")));

        for wedge in self.obstacles.render(distances) {
            self.surfaces
                .set_wedge(wedge.index, &wedge.path.to_string(), wedge.level.fill());
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
