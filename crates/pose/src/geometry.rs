//! Planar geometry on keypoint positions
//!
//! Angles are in degrees. Image coordinates have y growing downwards.

use serde::{Deserialize, Serialize};
use swing_analysis_common::finite;

/// 2D point in pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[must_use]
    #[inline]
    pub fn distance(&self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    #[must_use]
    pub fn midpoint(&self, other: Point) -> Point {
        Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }

    #[must_use]
    pub fn sub(&self, other: Point) -> Point {
        Point::new(self.x - other.x, self.y - other.y)
    }

    /// Mean of a set of points
    #[must_use]
    pub fn centroid(points: &[Point]) -> Option<Point> {
        if points.is_empty() {
            return None;
        }
        let n = points.len() as f64;
        let (sx, sy) = points
            .iter()
            .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
        Some(Point::new(sx / n, sy / n))
    }
}

/// Wrap an angle difference into (-180, 180].
///
/// Inputs are differences of two angles already in (-180, 180], so a single
/// correction step is enough.
#[must_use]
#[inline]
pub fn wrap_degrees(mut degrees: f64) -> f64 {
    if degrees > 180.0 {
        degrees -= 360.0;
    } else if degrees <= -180.0 {
        degrees += 360.0;
    }
    degrees
}

/// Angle at `vertex` between the rays to `a` and `c`, in [0, 180].
///
/// `None` when either ray has zero length.
#[must_use]
pub fn joint_angle(a: Point, vertex: Point, c: Point) -> Option<f64> {
    let ba = a.sub(vertex);
    let bc = c.sub(vertex);
    let norms = ba.x.hypot(ba.y) * bc.x.hypot(bc.y);
    if norms <= f64::EPSILON {
        return None;
    }
    let cos = ((ba.x * bc.x + ba.y * bc.y) / norms).clamp(-1.0, 1.0);
    finite(cos.acos().to_degrees())
}

/// Direction of the segment `from → to` in degrees, (-180, 180]
#[must_use]
pub fn line_angle(from: Point, to: Point) -> Option<f64> {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    if dx == 0.0 && dy == 0.0 {
        return None;
    }
    finite(wrap_degrees(dy.atan2(dx).to_degrees()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_degrees() {
        assert_eq!(wrap_degrees(190.0), -170.0);
        assert_eq!(wrap_degrees(-190.0), 170.0);
        assert_eq!(wrap_degrees(180.0), 180.0);
        assert_eq!(wrap_degrees(-180.0), 180.0);
        assert_eq!(wrap_degrees(45.0), 45.0);
        assert_eq!(wrap_degrees(350.0 - 10.0), -20.0);
    }

    #[test]
    fn test_joint_angle() {
        let right = joint_angle(
            Point::new(0.0, 1.0),
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
        )
        .unwrap();
        assert!((right - 90.0).abs() < 1e-9);

        let straight = joint_angle(
            Point::new(-1.0, 0.0),
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
        )
        .unwrap();
        assert!((straight - 180.0).abs() < 1e-9);

        // Collinear, same direction: cosine drifts above 1.0 without the clamp
        let folded = joint_angle(
            Point::new(0.1, 0.3),
            Point::new(0.0, 0.0),
            Point::new(0.2, 0.6),
        )
        .unwrap();
        assert!(folded.abs() < 1e-5);

        let origin = Point::new(0.0, 0.0);
        assert!(joint_angle(origin, origin, Point::new(1.0, 1.0)).is_none());
    }

    #[test]
    fn test_line_angle() {
        let p = Point::new(0.0, 0.0);
        assert_eq!(line_angle(p, Point::new(1.0, 0.0)), Some(0.0));
        assert!((line_angle(p, Point::new(0.0, 1.0)).unwrap() - 90.0).abs() < 1e-9);
        assert!((line_angle(p, Point::new(-1.0, 0.0)).unwrap() - 180.0).abs() < 1e-9);
        assert!(line_angle(p, p).is_none());
    }

    #[test]
    fn test_centroid() {
        let c = Point::centroid(&[Point::new(0.0, 0.0), Point::new(2.0, 4.0)]).unwrap();
        assert_eq!(c, Point::new(1.0, 2.0));
        assert!(Point::centroid(&[]).is_none());
    }
}
