//! In-process stand-in for the robot firmware.
//!
//! [`SimulatedRobot`] is a WebSocket server that speaks the same protocol as
//! the real firmware, so the whole ground station can run on a laptop or in
//! CI without hardware. Every connected client receives, once per period, a
//! `gas`, `thermal`, `ultrasonic`, `gps` and `motor` frame. The most recent
//! [`RECEIVED_CAPACITY`] text frames clients sent (commands and `ping`) are
//! kept for inspection.
//!
//! # Example
//!
//! ```rust,no_run
//! use argus_middleware::sim::SimulatedRobot;
//! use argus_types::LatLng;
//!
//! # async fn demo() -> Result<(), argus_types::ArgusError> {
//! let sim = SimulatedRobot::new(LatLng::new(7.351136, -2.341782))
//!     .spawn("127.0.0.1:9091".parse().unwrap())
//!     .await?;
//! println!("firmware stand-in at {}", sim.url());
//! # Ok(())
//! # }
//! ```

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use argus_types::{ArgusError, InboundFrame, LatLng};
use futures_util::{SinkExt, StreamExt};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tokio_tungstenite::{accept_async, tungstenite::Message};
use tracing::{debug, info, warn};

/// Default interval between telemetry bursts.
pub const DEFAULT_PERIOD: Duration = Duration::from_millis(1000);

/// Inbound frames retained by [`SimHandle::received`]; older ones are dropped.
pub const RECEIVED_CAPACITY: usize = 256;

/// Pause before accepting again after a failed `accept`.
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

type ReceivedLog = Arc<Mutex<VecDeque<String>>>;

const THERMAL_LEN: usize = 32 * 24;
const SENSOR_COUNT: usize = 5;
const MOTOR_STATES: [&str; 3] = ["idle", "forward", "turning"];

// ────────────────────────────────────────────────────────────────────────────
// SimulatedRobot
// ────────────────────────────────────────────────────────────────────────────

/// Builder for a simulated firmware endpoint.
#[derive(Debug, Clone)]
pub struct SimulatedRobot {
    home: LatLng,
    period: Duration,
    seed: Option<u64>,
}

impl SimulatedRobot {
    pub fn new(home: LatLng) -> Self {
        Self {
            home,
            period: DEFAULT_PERIOD,
            seed: None,
        }
    }

    /// Override the telemetry period (builder-style).
    pub fn with_period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }

    /// Make the generated telemetry deterministic.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Bind `addr` and start accepting clients in a background task.
    ///
    /// # Errors
    ///
    /// Returns [`ArgusError::Transport`] if the listener cannot bind.
    pub async fn spawn(self, addr: SocketAddr) -> Result<SimHandle, ArgusError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ArgusError::Transport(format!("sim bind error on {addr}: {e}")))?;
        let addr = listener
            .local_addr()
            .map_err(|e| ArgusError::Transport(format!("sim local addr: {e}")))?;

        info!(%addr, "simulated robot listening");

        let received = Arc::new(Mutex::new(VecDeque::with_capacity(RECEIVED_CAPACITY)));
        let task = tokio::spawn(accept_loop(listener, self, Arc::clone(&received)));

        Ok(SimHandle {
            addr,
            received,
            task,
        })
    }
}

/// A running [`SimulatedRobot`]. Dropping the handle stops the server.
#[derive(Debug)]
pub struct SimHandle {
    addr: SocketAddr,
    received: ReceivedLog,
    task: JoinHandle<()>,
}

impl SimHandle {
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// WebSocket URL a link should connect to.
    pub fn url(&self) -> String {
        format!("ws://{}/ws", self.addr)
    }

    /// The most recent text frames received, across all clients, oldest
    /// first.
    pub fn received(&self) -> Vec<String> {
        self.received
            .lock()
            .map(|log| log.iter().cloned().collect())
            .unwrap_or_default()
    }
}

impl Drop for SimHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

// ---------------------------------------------------------------------------
// Server tasks
// ---------------------------------------------------------------------------

async fn accept_loop(listener: TcpListener, robot: SimulatedRobot, received: ReceivedLog) {
    let mut clients = tokio::task::JoinSet::new();
    loop {
        match listener.accept().await {
            Ok((stream, peer)) => {
                while clients.try_join_next().is_some() {}
                let robot = robot.clone();
                let received = Arc::clone(&received);
                clients.spawn(async move {
                    if let Err(e) = serve_client(stream, peer, robot, received).await {
                        warn!(%peer, error = %e, "sim client error");
                    }
                });
            }
            Err(e) => accept_failed(&e).await,
        }
    }
}

/// Errors such as EMFILE persist until a descriptor frees up.
async fn accept_failed(e: &std::io::Error) {
    warn!(error = %e, "sim accept error");
    tokio::time::sleep(ACCEPT_BACKOFF).await;
}

fn record(log: &Mutex<VecDeque<String>>, frame: &str) {
    if let Ok(mut log) = log.lock() {
        if log.len() == RECEIVED_CAPACITY {
            log.pop_front();
        }
        log.push_back(frame.to_owned());
    }
}

async fn serve_client(
    stream: TcpStream,
    peer: SocketAddr,
    robot: SimulatedRobot,
    received: ReceivedLog,
) -> Result<(), ArgusError> {
    let ws_stream = accept_async(stream)
        .await
        .map_err(|e| ArgusError::Transport(format!("ws handshake from {peer}: {e}")))?;
    debug!(%peer, "sim client connected");

    let (mut ws_tx, mut ws_rx) = ws_stream.split();
    let mut telemetry = match robot.seed {
        Some(seed) => TelemetryGenerator::new(robot.home, StdRng::seed_from_u64(seed)),
        None => TelemetryGenerator::new(robot.home, StdRng::from_os_rng()),
    };
    let mut ticker = tokio::time::interval(robot.period);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                for frame in telemetry.next_burst() {
                    if ws_tx.send(Message::Text(frame.to_wire().into())).await.is_err() {
                        return Ok(());
                    }
                }
            }
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        debug!(%peer, frame = text.as_str(), "sim received");
                        record(&received, text.as_str());
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        return Err(ArgusError::Transport(format!("sim read from {peer}: {e}")));
                    }
                    _ => {}
                }
            }
        }
    }

    debug!(%peer, "sim client disconnected");
    Ok(())
}

// ---------------------------------------------------------------------------
// Telemetry generator
// ---------------------------------------------------------------------------

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Produces plausible, slowly varying firmware frames.
struct TelemetryGenerator<R> {
    rng: R,
    home: LatLng,
    tick: u64,
}

impl<R: Rng> TelemetryGenerator<R> {
    fn new(home: LatLng, rng: R) -> Self {
        Self { rng, home, tick: 0 }
    }

    fn next_burst(&mut self) -> Vec<InboundFrame> {
        let burst = vec![
            self.gas(),
            self.thermal(),
            self.ultrasonic(),
            self.gps(),
            self.motor(),
        ];
        self.tick += 1;
        burst
    }

    fn gas(&mut self) -> InboundFrame {
        InboundFrame::Gas {
            mq9_pct: round1(self.rng.random_range(0.0..=100.0)),
            mq135_pct: round1(self.rng.random_range(0.0..=100.0)),
        }
    }

    /// Ambient 22–26 °C with one hot spot circling the frame.
    fn thermal(&mut self) -> InboundFrame {
        let phase = self.tick as f64 * 0.3;
        let hx = 16.0 + 10.0 * phase.cos();
        let hy = 12.0 + 7.0 * phase.sin();
        let data = (0..THERMAL_LEN)
            .map(|i| {
                let x = (i % 32) as f64;
                let y = (i / 32) as f64;
                let d2 = (x - hx).powi(2) + (y - hy).powi(2);
                let ambient = 22.0 + self.rng.random_range(0.0..4.0);
                round1(ambient + 14.0 * (-d2 / 18.0).exp())
            })
            .collect();
        InboundFrame::Thermal { data }
    }

    fn ultrasonic(&mut self) -> InboundFrame {
        let dist = (0..SENSOR_COUNT)
            .map(|_| Some(round1(self.rng.random_range(0.2..4.5))))
            .collect();
        InboundFrame::Ultrasonic { dist }
    }

    fn gps(&mut self) -> InboundFrame {
        InboundFrame::Gps {
            fix: true,
            lat: Some(self.home.lat + self.rng.random_range(-0.00005..0.00005)),
            lng: Some(self.home.lng + self.rng.random_range(-0.00005..0.00005)),
        }
    }

    fn motor(&mut self) -> InboundFrame {
        let status = MOTOR_STATES[self.rng.random_range(0..MOTOR_STATES.len())];
        let (speed, steering_deg) = match status {
            "idle" => (0.0, 0.0),
            "forward" => (round1(self.rng.random_range(0.2..1.0)), 0.0),
            _ => (
                round1(self.rng.random_range(0.1..0.5)),
                round1(self.rng.random_range(-30.0..30.0)),
            ),
        };
        InboundFrame::Motor {
            status: status.to_string(),
            speed,
            steering_deg,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_tungstenite::connect_async;

    const HOME: LatLng = LatLng::new(7.351136, -2.341782);
    const WAIT: Duration = Duration::from_secs(5);

    fn generator() -> TelemetryGenerator<StdRng> {
        TelemetryGenerator::new(HOME, StdRng::seed_from_u64(11))
    }

    #[test]
    fn burst_covers_every_streamed_kind() {
        let kinds: Vec<_> = generator().next_burst().iter().map(|f| f.kind()).collect();
        assert_eq!(kinds, vec!["gas", "thermal", "ultrasonic", "gps", "motor"]);
    }

    #[test]
    fn generated_frames_satisfy_the_protocol() {
        let mut telemetry = generator();
        for _ in 0..20 {
            for frame in telemetry.next_burst() {
                let reparsed = InboundFrame::parse(&frame.to_wire()).unwrap();
                match reparsed {
                    InboundFrame::Gas { mq9_pct, mq135_pct } => {
                        assert!((0.0..=100.0).contains(&mq9_pct));
                        assert!((0.0..=100.0).contains(&mq135_pct));
                    }
                    InboundFrame::Thermal { data } => assert_eq!(data.len(), THERMAL_LEN),
                    InboundFrame::Ultrasonic { dist } => assert_eq!(dist.len(), SENSOR_COUNT),
                    InboundFrame::Gps { fix, lat, lng } => {
                        assert!(fix);
                        assert!((lat.unwrap() - HOME.lat).abs() < 0.0001);
                        assert!((lng.unwrap() - HOME.lng).abs() < 0.0001);
                    }
                    InboundFrame::Motor { status, .. } => {
                        assert!(MOTOR_STATES.contains(&status.as_str()));
                    }
                    other => panic!("unexpected frame {other:?}"),
                }
            }
        }
    }

    #[test]
    fn gas_values_have_one_decimal() {
        let mut telemetry = generator();
        for _ in 0..10 {
            if let InboundFrame::Gas { mq9_pct, .. } = telemetry.gas() {
                assert!((mq9_pct * 10.0 - (mq9_pct * 10.0).round()).abs() < 1e-9);
            }
        }
    }

    #[tokio::test]
    async fn streams_telemetry_and_records_commands() {
        let sim = SimulatedRobot::new(HOME)
            .with_period(Duration::from_millis(20))
            .with_seed(3)
            .spawn("127.0.0.1:0".parse().unwrap())
            .await
            .unwrap();

        let (ws, _) = connect_async(sim.url()).await.unwrap();
        let (mut tx, mut rx) = ws.split();

        let first = tokio::time::timeout(WAIT, rx.next()).await.unwrap().unwrap().unwrap();
        let Message::Text(text) = first else {
            panic!("expected text frame");
        };
        assert_eq!(InboundFrame::parse(text.as_str()).unwrap().kind(), "gas");

        tx.send(Message::Text(r#"{"cmd":"status"}"#.into())).await.unwrap();
        tx.send(Message::Text("ping".into())).await.unwrap();

        let deadline = tokio::time::Instant::now() + WAIT;
        while sim.received().len() < 2 {
            assert!(tokio::time::Instant::now() < deadline, "sim never recorded commands");
            // Keep draining telemetry so the server never blocks on send.
            let _ = tokio::time::timeout(Duration::from_millis(20), rx.next()).await;
        }
        assert_eq!(sim.received(), vec![r#"{"cmd":"status"}"#.to_string(), "ping".to_string()]);
    }

    #[test]
    fn received_log_keeps_only_the_newest_frames() {
        let log = Mutex::new(VecDeque::new());
        for i in 0..RECEIVED_CAPACITY + 10 {
            record(&log, &format!("cmd {i}"));
        }
        let log = log.into_inner().unwrap();
        assert_eq!(log.len(), RECEIVED_CAPACITY);
        assert_eq!(log.front().map(String::as_str), Some("cmd 10"));
        assert_eq!(
            log.back().cloned(),
            Some(format!("cmd {}", RECEIVED_CAPACITY + 9))
        );
    }

    #[tokio::test]
    async fn accept_error_waits_before_retrying() {
        let started = tokio::time::Instant::now();
        accept_failed(&std::io::Error::other("too many open files")).await;
        assert!(started.elapsed() >= ACCEPT_BACKOFF);
    }

    #[tokio::test]
    async fn url_points_at_bound_port() {
        let sim = SimulatedRobot::new(HOME)
            .spawn("127.0.0.1:0".parse().unwrap())
            .await
            .unwrap();
        assert_ne!(sim.addr().port(), 0);
        assert_eq!(sim.url(), format!("ws://127.0.0.1:{}/ws", sim.addr().port()));
    }
}
