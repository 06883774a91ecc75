use bevy::prelude::*;
use constants::measure_settings::AREA_MINIMUM_POINTS;

/// Euclidean distance in meters between two captured world points.
pub fn distance_between(start: Vec3, end: Vec3) -> f32 {
    start.distance(end)
}

/// Shoelace area in square meters of the polygon spanned by `points`.
///
/// The polygon is projected onto the horizontal XZ plane; Y is ignored, so a
/// tilted surface undercounts its true area. Insertion order defines the
/// polygon's edges; winding direction does not affect the result.
pub fn polygon_area_xz(points: &[Vec3]) -> f32 {
    if points.len() < AREA_MINIMUM_POINTS {
        return 0.0;
    }

    let mut signed_sum = 0.0f32;
    for i in 0..points.len() {
        let j = (i + 1) % points.len(); // Wraps back to the first vertex.
        signed_sum += points[i].x * points[j].z;
        signed_sum -= points[j].x * points[i].z;
    }

    signed_sum.abs() / 2.0
}
