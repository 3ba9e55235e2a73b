//! `argus-runtime` – the ground-station session.
//!
//! Owns all mutable state of one operator shell and reacts to inbound link
//! traffic and operator intent, drawing on display sinks it does not own.
//!
//! # Modules
//!
//! - [`surfaces`] – write-only sink traits for console, gauges, chart,
//!   thermal raster, obstacle wedges and map.
//! - [`session`] – [`Session`][session::Session]: the explicit context
//!   object holding the link, perception state, position and control mode.
//! - [`router`] – inbound frame parsing and dispatch onto the session.
//! - [`console`] – operator command handling: local commands, forwarding,
//!   `goto`.
//! - [`event_loop`] – [`EventLoop`][event_loop::EventLoop]: the single
//!   consumer draining operator and link queues in order.
//! - [`telemetry`] – [`init_tracing`][telemetry::init_tracing]: `tracing`
//!   subscriber with optional OTLP export.

pub mod console;
pub mod event_loop;
pub mod router;
pub mod session;
pub mod surfaces;
pub mod telemetry;

#[cfg(test)]
pub(crate) mod testing;

pub use console::ConsoleCommand;
pub use event_loop::{EventLoop, SessionEvent, SimSettings};
pub use session::{DEFAULT_HOME, LinkState, Session, SessionConfig};
pub use surfaces::{ChartSeries, ChartSink, ConsoleSink, GaugeSink, MapSink, PathSink, RasterSink, Surfaces};
pub use telemetry::{TracerProviderGuard, init_tracing};
