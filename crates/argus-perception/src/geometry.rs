//! Geometry kernel: polar ↔ cartesian transforms and pie-slice wedges.
//!
//! Two planes are involved:
//!
//! * **Logical** – robot-local metres, +Y is north/forward, angles are
//!   measured counter-clockwise from +X.
//! * **Screen** – the drawing plane of the obstacle surface, identical except
//!   that the vertical axis is inverted (`screen_y = -logical_y`).
//!
//! # Example
//!
//! ```rust
//! use argus_perception::geometry::{wedge_path, Point2};
//!
//! let wedge = wedge_path(Point2::new(0.0, 2.5), 4.0, 75.0, 105.0);
//! assert!(!wedge.large_arc);
//! assert!(wedge.to_string().starts_with("M 0 -2.5 L "));
//! ```

use std::fmt;

/// SVG sweep flag used for every wedge. Fixed so that arcs always turn the
/// same way on screen regardless of how the angles were ordered.
pub const SWEEP_FLAG: bool = false;

// ────────────────────────────────────────────────────────────────────────────
// Point2
// ────────────────────────────────────────────────────────────────────────────

/// A 2-D point. Which plane it lives in is up to the caller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

impl Point2 {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Map a logical point into the screen plane.
    pub fn to_screen(self) -> Self {
        Self::new(self.x, flip(self.y))
    }
}

/// Negate a vertical coordinate without producing `-0`.
fn flip(y: f64) -> f64 {
    -y + 0.0
}

/// Project a logical polar offset from `center` into the screen plane.
pub fn polar_to_screen(center: Point2, radius: f64, angle_deg: f64) -> Point2 {
    let rad = angle_deg.to_radians();
    let apex = center.to_screen();
    Point2::new(
        apex.x + radius * rad.cos(),
        apex.y - radius * rad.sin(),
    )
}

/// Angular extent from `start_deg` to `end_deg`, wrapped into `[0, 360)`.
pub fn normalized_span(start_deg: f64, end_deg: f64) -> f64 {
    let span = (end_deg - start_deg).rem_euclid(360.0);
    // rem_euclid rounds tiny negative spans up to exactly 360.0.
    if span >= 360.0 { 0.0 } else { span }
}

// ────────────────────────────────────────────────────────────────────────────
// WedgePath
// ────────────────────────────────────────────────────────────────────────────

/// A closed pie-slice path in screen coordinates.
///
/// Renders (via [`fmt::Display`]) as an SVG path:
/// `M apex L arc_start A r r 0 large sweep arc_end Z`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WedgePath {
    pub apex: Point2,
    pub arc_start: Point2,
    pub arc_end: Point2,
    pub radius: f64,
    pub large_arc: bool,
    pub sweep: bool,
}

impl fmt::Display for WedgePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "M {} {} L {} {} A {} {} 0 {} {} {} {} Z",
            self.apex.x,
            self.apex.y,
            self.arc_start.x,
            self.arc_start.y,
            self.radius,
            self.radius,
            u8::from(self.large_arc),
            u8::from(self.sweep),
            self.arc_end.x,
            self.arc_end.y,
        )
    }
}

/// Build the wedge spanning `start_deg → end_deg` out to `radius` around the
/// logical point `center`.
///
/// The large-arc flag is set iff the normalised span exceeds 180°.
pub fn wedge_path(center: Point2, radius: f64, start_deg: f64, end_deg: f64) -> WedgePath {
    let span = normalized_span(start_deg, end_deg);
    WedgePath {
        apex: center.to_screen(),
        arc_start: polar_to_screen(center, radius, start_deg),
        arc_end: polar_to_screen(center, radius, end_deg),
        radius,
        large_arc: span > 180.0,
        sweep: SWEEP_FLAG,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Point2, b: Point2) -> bool {
        (a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9
    }

    #[test]
    fn screen_plane_inverts_y() {
        assert_eq!(Point2::new(1.0, 2.5).to_screen(), Point2::new(1.0, -2.5));
        // No negative zero leaks into rendered paths.
        assert!(Point2::new(0.0, 0.0).to_screen().y.is_sign_positive());
    }

    #[test]
    fn polar_zero_degrees_points_along_x() {
        let p = polar_to_screen(Point2::new(0.0, 0.0), 2.0, 0.0);
        assert!(close(p, Point2::new(2.0, 0.0)));
    }

    #[test]
    fn polar_ninety_degrees_points_up_on_screen() {
        // Logical +Y (north) is screen -Y.
        let p = polar_to_screen(Point2::new(1.0, 1.0), 2.0, 90.0);
        assert!(close(p, Point2::new(1.0, -3.0)), "got {p:?}");
    }

    #[test]
    fn span_is_always_in_half_open_range() {
        let mut start = -720.0;
        while start <= 720.0 {
            let mut end = -720.0;
            while end <= 720.0 {
                let span = normalized_span(start, end);
                assert!((0.0..360.0).contains(&span), "span({start},{end}) = {span}");
                end += 17.5;
            }
            start += 22.5;
        }
    }

    #[test]
    fn span_wraps_reversed_ordering() {
        assert!((normalized_span(105.0, 75.0) - 330.0).abs() < 1e-9);
        assert!((normalized_span(75.0, 105.0) - 30.0).abs() < 1e-9);
        assert_eq!(normalized_span(40.0, 40.0), 0.0);
        assert_eq!(normalized_span(0.0, 360.0), 0.0);
        assert_eq!(normalized_span(-1e-15, 0.0), 1e-15);
        assert_eq!(normalized_span(1e-15, 0.0), 0.0);
    }

    #[test]
    fn large_arc_iff_span_exceeds_half_turn() {
        let center = Point2::new(0.0, 0.0);
        let mut start = -360.0;
        while start <= 360.0 {
            let mut end = -360.0;
            while end <= 360.0 {
                let wedge = wedge_path(center, 1.0, start, end);
                assert_eq!(wedge.large_arc, normalized_span(start, end) > 180.0);
                end += 15.0;
            }
            start += 45.0;
        }
        assert!(!wedge_path(center, 1.0, 0.0, 180.0).large_arc);
        assert!(wedge_path(center, 1.0, 0.0, 180.5).large_arc);
    }

    #[test]
    fn sweep_direction_is_fixed() {
        let center = Point2::new(0.0, 0.0);
        assert_eq!(wedge_path(center, 1.0, 10.0, 50.0).sweep, SWEEP_FLAG);
        assert_eq!(wedge_path(center, 1.0, 50.0, 10.0).sweep, SWEEP_FLAG);
    }

    #[test]
    fn wedge_renders_as_svg_path() {
        let wedge = wedge_path(Point2::new(1.75, 0.0), 3.0, -15.0, 15.0);
        let s = wedge.to_string();
        assert!(s.starts_with("M 1.75 0 L "), "{s}");
        assert!(s.contains(" A 3 3 0 0 0 "), "{s}");
        assert!(s.ends_with(" Z"), "{s}");
    }

    #[test]
    fn wedge_arc_endpoints_lie_on_radius() {
        let center = Point2::new(-1.75, 2.5);
        let wedge = wedge_path(center, 4.0, 95.0, 125.0);
        let apex = center.to_screen();
        for p in [wedge.arc_start, wedge.arc_end] {
            let r = ((p.x - apex.x).powi(2) + (p.y - apex.y).powi(2)).sqrt();
            assert!((r - 4.0).abs() < 1e-9);
        }
    }

    #[test]
    fn wedge_path_is_deterministic() {
        let a = wedge_path(Point2::new(0.3, -0.7), 2.2, 33.0, 301.0);
        let b = wedge_path(Point2::new(0.3, -0.7), 2.2, 33.0, 301.0);
        assert_eq!(a, b);
        assert_eq!(a.to_string(), b.to_string());
    }
}
