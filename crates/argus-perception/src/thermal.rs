//! Thermal reconstructor.
//!
//! Turns one 32×24 MLX90640 frame into a 256×192 RGBA raster by bilinear
//! upsampling (8× per axis) followed by a blue → green → red heat ramp that
//! is normalised against the frame's own min/max.
//!
//! Frames of the wrong length are rejected without touching any raster. A
//! flat frame (`max == min`) maps every pixel to the cold end of the ramp.
//!
//! # Example
//!
//! ```rust
//! use argus_perception::thermal::{reconstruct, FRAME_LEN, RASTER_WIDTH};
//!
//! let frame: Vec<f64> = (0..FRAME_LEN).map(|i| 20.0 + (i % 32) as f64 * 0.25).collect();
//! let raster = reconstruct(&frame).expect("full frame");
//! assert_eq!(raster.width(), RASTER_WIDTH);
//!
//! assert!(reconstruct(&frame[..100]).is_none());
//! ```

use std::ops::Range;

use argus_types::ArgusError;
use tracing::debug;

pub const GRID_WIDTH: usize = 32;
pub const GRID_HEIGHT: usize = 24;
pub const FRAME_LEN: usize = GRID_WIDTH * GRID_HEIGHT;

pub const RASTER_WIDTH: usize = 256;
pub const RASTER_HEIGHT: usize = 192;

const SCALE_X: f64 = RASTER_WIDTH as f64 / GRID_WIDTH as f64;
const SCALE_Y: f64 = RASTER_HEIGHT as f64 / GRID_HEIGHT as f64;

// ────────────────────────────────────────────────────────────────────────────
// Raster
// ────────────────────────────────────────────────────────────────────────────

/// A fixed-size 256×192 RGBA image, row-major, 4 bytes per pixel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThermalRaster {
    rgba: Vec<u8>,
}

impl ThermalRaster {
    /// A fully transparent raster, ready for [`reconstruct_rows`].
    pub fn blank() -> Self {
        Self {
            rgba: vec![0; RASTER_WIDTH * RASTER_HEIGHT * 4],
        }
    }

    pub fn width(&self) -> usize {
        RASTER_WIDTH
    }

    pub fn height(&self) -> usize {
        RASTER_HEIGHT
    }

    /// RGBA bytes of pixel `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinate lies outside the raster.
    pub fn pixel(&self, x: usize, y: usize) -> [u8; 4] {
        let idx = (y * RASTER_WIDTH + x) * 4;
        [
            self.rgba[idx],
            self.rgba[idx + 1],
            self.rgba[idx + 2],
            self.rgba[idx + 3],
        ]
    }

    pub fn as_rgba(&self) -> &[u8] {
        &self.rgba
    }

    fn put(&mut self, x: usize, y: usize, [r, g, b]: [u8; 3]) {
        let idx = (y * RASTER_WIDTH + x) * 4;
        self.rgba[idx..idx + 4].copy_from_slice(&[r, g, b, 255]);
    }
}

impl Default for ThermalRaster {
    fn default() -> Self {
        Self::blank()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Colour ramp
// ────────────────────────────────────────────────────────────────────────────

/// Normalised position of `value` within `[min, max]`, clamped to `[0, 1]`.
/// Returns `0` when the range is empty.
pub fn heat_ratio(value: f64, min: f64, max: f64) -> f64 {
    if max > min {
        ((value - min) / (max - min)).clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Map a temperature onto the blue → green → red ramp.
pub fn heat_color(value: f64, min: f64, max: f64) -> [u8; 3] {
    let rho = heat_ratio(value, min, max);
    let channel = |v: f64| (255.0 * v).floor() as u8;
    [
        channel(rho),
        channel(1.0 - 2.0 * (rho - 0.5).abs()),
        channel(1.0 - rho),
    ]
}

// ────────────────────────────────────────────────────────────────────────────
// Interpolation
// ────────────────────────────────────────────────────────────────────────────

/// Bilinear sample of a full frame at fractional grid position `(gx, gy)`.
///
/// The high neighbour index is clamped at the last column/row, so positions
/// in the final cell blend with themselves.
pub fn sample_bilinear(frame: &[f64], gx: f64, gy: f64) -> f64 {
    let x0 = (gx.floor() as usize).min(GRID_WIDTH - 1);
    let y0 = (gy.floor() as usize).min(GRID_HEIGHT - 1);
    let x1 = (x0 + 1).min(GRID_WIDTH - 1);
    let y1 = (y0 + 1).min(GRID_HEIGHT - 1);

    let dx = gx - x0 as f64;
    let dy = gy - y0 as f64;

    let f00 = frame[y0 * GRID_WIDTH + x0];
    let f10 = frame[y0 * GRID_WIDTH + x1];
    let f01 = frame[y1 * GRID_WIDTH + x0];
    let f11 = frame[y1 * GRID_WIDTH + x1];

    let top = f00 * (1.0 - dx) + f10 * dx;
    let bottom = f01 * (1.0 - dx) + f11 * dx;
    top * (1.0 - dy) + bottom * dy
}

fn frame_bounds(frame: &[f64]) -> (f64, f64) {
    frame
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        })
}

// ────────────────────────────────────────────────────────────────────────────
// Reconstruction
// ────────────────────────────────────────────────────────────────────────────

/// Fill output rows `rows` of `raster` from `frame`.
///
/// Lets a host split one frame across several reactions; rows outside the
/// raster are ignored. Colour normalisation always uses the whole frame, so
/// any split produces the same pixels as [`reconstruct`].
///
/// # Errors
///
/// [`ArgusError::DegenerateData`] if `frame` is not exactly
/// [`FRAME_LEN`] samples; `raster` is left untouched.
pub fn reconstruct_rows(
    frame: &[f64],
    rows: Range<usize>,
    raster: &mut ThermalRaster,
) -> Result<(), ArgusError> {
    if frame.len() != FRAME_LEN {
        return Err(ArgusError::DegenerateData(format!(
            "thermal frame has {} samples, expected {FRAME_LEN}",
            frame.len()
        )));
    }

    let (min, max) = frame_bounds(frame);
    let rows = rows.start.min(RASTER_HEIGHT)..rows.end.min(RASTER_HEIGHT);

    for y in rows {
        let gy = y as f64 / SCALE_Y;
        for x in 0..RASTER_WIDTH {
            let gx = x as f64 / SCALE_X;
            let value = sample_bilinear(frame, gx, gy);
            raster.put(x, y, heat_color(value, min, max));
        }
    }
    Ok(())
}

/// Reconstruct a whole frame. Returns `None` for frames of the wrong length.
pub fn reconstruct(frame: &[f64]) -> Option<ThermalRaster> {
    let mut raster = ThermalRaster::blank();
    match reconstruct_rows(frame, 0..RASTER_HEIGHT, &mut raster) {
        Ok(()) => Some(raster),
        Err(e) => {
            debug!(error = %e, "thermal frame rejected");
            None
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    /// A frame with a distinct value in every cell.
    fn ramp_frame() -> Vec<f64> {
        (0..FRAME_LEN)
            .map(|i| {
                let (gx, gy) = (i % GRID_WIDTH, i / GRID_WIDTH);
                18.0 + gx as f64 * 0.3 + gy as f64 * 0.7 + ((gx * gy) % 5) as f64 * 0.11
            })
            .collect()
    }

    #[test]
    fn heat_ramp_endpoints() {
        assert_eq!(heat_color(10.0, 10.0, 30.0), [0, 0, 255]);
        assert_eq!(heat_color(30.0, 10.0, 30.0), [255, 0, 0]);
        assert_eq!(heat_color(20.0, 10.0, 30.0), [127, 255, 127]);
    }

    #[test]
    fn heat_ratio_clamps_out_of_range_values() {
        assert_eq!(heat_ratio(-5.0, 0.0, 10.0), 0.0);
        assert_eq!(heat_ratio(50.0, 0.0, 10.0), 1.0);
    }

    #[test]
    fn heat_ratio_of_empty_range_is_zero() {
        assert_eq!(heat_ratio(22.0, 22.0, 22.0), 0.0);
        assert_eq!(heat_color(22.0, 22.0, 22.0), [0, 0, 255]);
    }

    #[test]
    fn bilinear_is_exact_on_grid_points() {
        let frame = ramp_frame();
        for gy in 0..GRID_HEIGHT {
            for gx in 0..GRID_WIDTH {
                let v = sample_bilinear(&frame, gx as f64, gy as f64);
                assert!((v - frame[gy * GRID_WIDTH + gx]).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn bilinear_midpoint_averages_neighbours() {
        let frame = ramp_frame();
        let v = sample_bilinear(&frame, 3.5, 7.5);
        let expected = (frame[7 * 32 + 3] + frame[7 * 32 + 4] + frame[8 * 32 + 3] + frame[8 * 32 + 4]) / 4.0;
        assert!((v - expected).abs() < 1e-12);
    }

    #[test]
    fn bilinear_clamps_at_far_border() {
        let frame = ramp_frame();
        let corner = frame[FRAME_LEN - 1];
        assert!((sample_bilinear(&frame, 31.875, 23.875) - corner).abs() < 1e-12);
    }

    #[test]
    fn grid_aligned_pixels_carry_source_colour() {
        let frame = ramp_frame();
        let raster = reconstruct(&frame).unwrap();
        let (min, max) = frame_bounds(&frame);
        for gy in 0..GRID_HEIGHT {
            for gx in 0..GRID_WIDTH {
                let [r, g, b] = heat_color(frame[gy * GRID_WIDTH + gx], min, max);
                assert_eq!(raster.pixel(gx * 8, gy * 8), [r, g, b, 255]);
            }
        }
    }

    #[test]
    fn wrong_length_is_rejected_without_writing() {
        assert!(reconstruct(&[]).is_none());
        assert!(reconstruct(&vec![20.0; FRAME_LEN - 1]).is_none());
        assert!(reconstruct(&vec![20.0; FRAME_LEN + 1]).is_none());

        let mut raster = ThermalRaster::blank();
        let result = reconstruct_rows(&[1.0; 10], 0..RASTER_HEIGHT, &mut raster);
        assert!(matches!(result, Err(ArgusError::DegenerateData(_))));
        assert_eq!(raster, ThermalRaster::blank());
    }

    #[test]
    fn uniform_frame_is_uniformly_blue() {
        let raster = reconstruct(&vec![24.5; FRAME_LEN]).unwrap();
        assert!(raster.as_rgba().chunks(4).all(|px| px == [0, 0, 255, 255]));
    }

    #[test]
    fn every_pixel_is_opaque() {
        let raster = reconstruct(&ramp_frame()).unwrap();
        assert_eq!(raster.as_rgba().len(), RASTER_WIDTH * RASTER_HEIGHT * 4);
        assert!(raster.as_rgba().chunks(4).all(|px| px[3] == 255));
    }

    #[test]
    fn batched_rows_match_single_shot() {
        let frame = ramp_frame();
        let whole = reconstruct(&frame).unwrap();

        let mut batched = ThermalRaster::blank();
        for start in (0..RASTER_HEIGHT).step_by(50) {
            reconstruct_rows(&frame, start..start + 50, &mut batched).unwrap();
        }
        assert_eq!(batched, whole);
    }

    #[test]
    fn hottest_cell_renders_red() {
        let mut frame = vec![20.0; FRAME_LEN];
        frame[10 * GRID_WIDTH + 12] = 45.0;
        let raster = reconstruct(&frame).unwrap();
        assert_eq!(raster.pixel(12 * 8, 10 * 8), [255, 0, 0, 255]);
        assert_eq!(raster.pixel(0, 0), [0, 0, 255, 255]);
    }
}
