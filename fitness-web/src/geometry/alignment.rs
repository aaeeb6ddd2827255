//! Line alignment - how far a joint sits off a reference segment
//!
//! Straight-body exercises (plank, push-up) are judged by the perpendicular
//! distance of a middle joint (hip, knee) from the segment joining its
//! neighbours, divided by that segment's length so the measure does not
//! depend on how far the subject stands from the camera.

use nalgebra::Point2;

/// Segments shorter than this cannot normalize a deviation
const MIN_SEGMENT: f32 = 0.0001;

/// Relative deviation of `point` from the segment `start`→`end`
///
/// Distance to the closest point of the segment (the projection is
/// clamped to the endpoints) divided by the segment length.
/// `None` for a zero-length segment.
pub fn line_deviation(point: Point2<f32>, start: Point2<f32>, end: Point2<f32>) -> Option<f32> {
    let segment = end - start;
    let length = segment.norm();
    if length < MIN_SEGMENT {
        return None;
    }

    let t = ((point - start).dot(&segment) / (length * length)).clamp(0.0, 1.0);
    let closest = start + segment * t;
    Some((point - closest).norm() / length)
}

/// Absolute horizontal distance between two points
pub fn horizontal_offset(a: Point2<f32>, b: Point2<f32>) -> f32 {
    (a.x - b.x).abs()
}

/// Absolute vertical distance between two points
pub fn vertical_offset(a: Point2<f32>, b: Point2<f32>) -> f32 {
    (a.y - b.y).abs()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_on_line() {
        let dev = line_deviation(
            Point2::new(0.5, 0.5),
            Point2::new(0.0, 0.5),
            Point2::new(1.0, 0.5),
        );
        assert!(dev.unwrap() < 1e-6);
    }

    #[test]
    fn test_deviation_is_scale_invariant() {
        let near = line_deviation(
            Point2::new(0.5, 0.6),
            Point2::new(0.0, 0.5),
            Point2::new(1.0, 0.5),
        )
        .unwrap();
        let far = line_deviation(
            Point2::new(0.25, 0.3),
            Point2::new(0.0, 0.25),
            Point2::new(0.5, 0.25),
        )
        .unwrap();
        assert!((near - 0.1).abs() < 1e-5);
        assert!((near - far).abs() < 1e-5);
    }

    #[test]
    fn test_projection_clamped_to_endpoints() {
        // Beyond the end: distance to the endpoint, not the infinite line
        let dev = line_deviation(
            Point2::new(1.3, 0.9),
            Point2::new(0.0, 0.5),
            Point2::new(1.0, 0.5),
        )
        .unwrap();
        assert!((dev - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_zero_length_segment() {
        let p = Point2::new(0.4, 0.4);
        assert!(line_deviation(Point2::new(0.1, 0.1), p, p).is_none());
    }

    #[test]
    fn test_offsets() {
        let a = Point2::new(0.2, 0.7);
        let b = Point2::new(0.5, 0.3);
        assert!((horizontal_offset(a, b) - 0.3).abs() < 1e-6);
        assert!((vertical_offset(a, b) - 0.4).abs() < 1e-6);
    }
}
