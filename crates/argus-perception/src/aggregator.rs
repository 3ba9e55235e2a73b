//! Telemetry aggregator for the gas channels.
//!
//! Each channel keeps the [`WINDOW_CAPACITY`] most recent `(timestamp, value)`
//! points in a strict FIFO [`RollingWindow`]. Values pass through untouched:
//! the chart gets the window, the gauges get the newest value.

use std::collections::VecDeque;

use argus_types::{GasChannel, GasSample};
use chrono::{DateTime, Utc};

/// Points retained per gas channel.
pub const WINDOW_CAPACITY: usize = 20;

/// Fixed-capacity FIFO buffer; appending to a full window evicts the oldest
/// entry.
#[derive(Debug, Clone)]
pub struct RollingWindow<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T> RollingWindow<T> {
    /// Create an empty window. A zero capacity is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            items: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    /// Append `item`, returning the entry evicted to make room, if any.
    pub fn push(&mut self, item: T) -> Option<T> {
        self.items.push_back(item);
        if self.items.len() > self.capacity {
            self.items.pop_front()
        } else {
            None
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Oldest first.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> + ExactSizeIterator {
        self.items.iter()
    }

    pub fn latest(&self) -> Option<&T> {
        self.items.back()
    }
}

/// One charted value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GasPoint {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

/// Rolling history of every [`GasChannel`].
#[derive(Debug, Clone)]
pub struct TelemetryAggregator {
    channels: [RollingWindow<GasPoint>; 4],
}

impl TelemetryAggregator {
    pub fn new() -> Self {
        Self::with_capacity(WINDOW_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            channels: std::array::from_fn(|_| RollingWindow::new(capacity)),
        }
    }

    /// Append one sample to every channel.
    pub fn push(&mut self, sample: &GasSample) {
        for channel in GasChannel::ALL {
            self.channels[slot(channel)].push(GasPoint {
                timestamp: sample.timestamp,
                value: sample.value(channel),
            });
        }
    }

    pub fn series(&self, channel: GasChannel) -> &RollingWindow<GasPoint> {
        &self.channels[slot(channel)]
    }

    /// Window values of `channel`, oldest first.
    pub fn values(&self, channel: GasChannel) -> Vec<f64> {
        self.series(channel).iter().map(|p| p.value).collect()
    }

    /// Sample timestamps, oldest first.
    pub fn timestamps(&self) -> Vec<DateTime<Utc>> {
        self.series(GasChannel::Co).iter().map(|p| p.timestamp).collect()
    }

    /// Newest value of `channel`, for gauge display.
    pub fn latest(&self, channel: GasChannel) -> Option<f64> {
        self.series(channel).latest().map(|p| p.value)
    }

    pub fn len(&self) -> usize {
        self.series(GasChannel::Co).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for TelemetryAggregator {
    fn default() -> Self {
        Self::new()
    }
}

fn slot(channel: GasChannel) -> usize {
    match channel {
        GasChannel::Co => 0,
        GasChannel::Ch4 => 1,
        GasChannel::Lpg => 2,
        GasChannel::AirQuality => 3,
    }
}
