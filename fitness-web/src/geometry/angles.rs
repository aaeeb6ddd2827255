//! Joint angle calculation
//!
//! The angle at a vertex joint B formed by a proximal joint A and a distal
//! joint C, e.g. hip→knee→ankle for the knee.

use nalgebra::Point2;

/// Segments shorter than this have no usable direction
const MIN_SEGMENT: f32 = 0.0001;

/// Calculate the angle at `b` in degrees, folded into `[0, 180]`
///
/// Difference of the two segment headings (`atan2`), so the result does
/// not depend on which way round the limb is drawn:
/// - 90° = joint bent at a right angle
/// - 180° = limb fully straight
pub fn three_point_angle(a: Point2<f32>, b: Point2<f32>, c: Point2<f32>) -> f32 {
    let proximal = a - b;
    let distal = c - b;

    // Collapsed segment: read as a straight joint
    if proximal.norm() < MIN_SEGMENT || distal.norm() < MIN_SEGMENT {
        return 180.0;
    }

    let radians = distal.y.atan2(distal.x) - proximal.y.atan2(proximal.x);
    let degrees = radians.to_degrees().abs();
    if degrees > 180.0 {
        360.0 - degrees
    } else {
        degrees
    }
}
