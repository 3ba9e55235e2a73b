//! Route synthesizer.
//!
//! The robot does not report intermediate positions while it travels, so the
//! ground station draws a plausible, slightly crooked path between the
//! current position and the target: three interior waypoints on the straight
//! line at ¼, ½ and ¾, each jittered independently in latitude and longitude.
//! The jitter scales with trip length and is capped absolutely so long trips
//! do not produce absurd detours.
//!
//! This is a display placeholder, **not** a path planner: the waypoints carry
//! no obstacle or traversability information.
//!
//! Only one route is active at a time. Generating a new one discards the
//! previous route; accepted GPS fixes are appended to the active route as a
//! live trace.
//!
//! # Example
//!
//! ```rust
//! use argus_perception::route::RouteSynthesizer;
//! use argus_types::{ActionKind, LatLng};
//!
//! let mut routes = RouteSynthesizer::seeded(7);
//! let route = routes.generate(
//!     LatLng::new(7.351136, -2.341782),
//!     LatLng::new(7.35, -2.34),
//!     ActionKind::GoTo,
//! );
//! assert_eq!(route.waypoints().len(), 5);
//! ```

use argus_types::{ActionKind, LatLng};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

/// Jittered waypoints between origin and destination.
pub const INTERIOR_POINTS: usize = 3;

/// Upper bound on the jitter span, in degrees.
pub const JITTER_CAP_DEG: f64 = 0.0003;

/// Jitter span `j` for a trip: half the larger coordinate delta, capped at
/// [`JITTER_CAP_DEG`]. Offsets are drawn from `[-j/2, j/2)`.
pub fn max_jitter(from: LatLng, to: LatLng) -> f64 {
    let span = (to.lat - from.lat).abs().max((to.lng - from.lng).abs());
    (span * 0.5).min(JITTER_CAP_DEG)
}

/// Straight-line point at fraction `t` of the way from `from` to `to`.
pub fn interpolate(from: LatLng, to: LatLng, t: f64) -> LatLng {
    LatLng::new(
        from.lat + (to.lat - from.lat) * t,
        from.lng + (to.lng - from.lng) * t,
    )
}

// ────────────────────────────────────────────────────────────────────────────
// Route
// ────────────────────────────────────────────────────────────────────────────

/// An ordered waypoint list plus the action requested at its destination.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    waypoints: Vec<LatLng>,
    destination: LatLng,
    action: ActionKind,
    max_jitter: f64,
}

impl Route {
    /// Every waypoint, including origin, destination and any live-trace
    /// points appended since.
    pub fn waypoints(&self) -> &[LatLng] {
        &self.waypoints
    }

    pub fn destination(&self) -> LatLng {
        self.destination
    }

    pub fn action(&self) -> ActionKind {
        self.action
    }

    /// Jitter span used when the route was synthesised.
    pub fn max_jitter(&self) -> f64 {
        self.max_jitter
    }

    fn extend(&mut self, position: LatLng) {
        self.waypoints.push(position);
    }
}

/// Synthesise `[from, p1, p2, p3, to]` using `rng` for the jitter.
pub fn synthesize<R: Rng + ?Sized>(
    from: LatLng,
    to: LatLng,
    action: ActionKind,
    rng: &mut R,
) -> Route {
    let jitter = max_jitter(from, to);
    let mut waypoints = Vec::with_capacity(INTERIOR_POINTS + 2);
    waypoints.push(from);
    for i in 1..=INTERIOR_POINTS {
        let t = i as f64 / (INTERIOR_POINTS + 1) as f64;
        let on_line = interpolate(from, to, t);
        waypoints.push(LatLng::new(
            on_line.lat + (rng.random::<f64>() - 0.5) * jitter,
            on_line.lng + (rng.random::<f64>() - 0.5) * jitter,
        ));
    }
    waypoints.push(to);

    Route {
        waypoints,
        destination: to,
        action,
        max_jitter: jitter,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// RouteSynthesizer
// ────────────────────────────────────────────────────────────────────────────

/// Owner of the single active [`Route`].
#[derive(Debug)]
pub struct RouteSynthesizer<R = StdRng> {
    rng: R,
    active: Option<Route>,
}

impl RouteSynthesizer<StdRng> {
    /// Synthesizer seeded from the operating system.
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_os_rng())
    }

    /// Deterministic synthesizer, for tests and replays.
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }
}

impl Default for RouteSynthesizer<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> RouteSynthesizer<R> {
    pub fn with_rng(rng: R) -> Self {
        Self { rng, active: None }
    }

    /// Replace the active route with a fresh one from `from` to `to`.
    pub fn generate(&mut self, from: LatLng, to: LatLng, action: ActionKind) -> &Route {
        if let Some(previous) = self.active.take() {
            debug!(destination = %previous.destination, "discarding active route");
        }
        self.active.insert(synthesize(from, to, action, &mut self.rng))
    }

    /// Append a live position to the active route, if there is one.
    pub fn extend(&mut self, position: LatLng) -> Option<&Route> {
        let route = self.active.as_mut()?;
        route.extend(position);
        Some(&*route)
    }

    pub fn active(&self) -> Option<&Route> {
        self.active.as_ref()
    }

    pub fn clear(&mut self) -> Option<Route> {
        self.active.take()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
