use bevy::prelude::*;

/// Project a world-space point to pixel coordinates on the host viewport.
///
/// Runs the full clip-space pipeline: view transform, projection transform,
/// perspective division, then NDC-to-pixel mapping. Returns `None` when the
/// homogeneous `w` component is zero or the projected depth is not finite;
/// such points have no screen position this frame and are simply skipped by
/// the overlay rebuild.
pub fn world_to_screen(
    world_position: Vec3,
    view_from_world: Mat4,
    clip_from_view: Mat4,
    viewport: Vec2,
) -> Option<Vec2> {
    let view_position = view_from_world * world_position.extend(1.0);
    let clip_position = clip_from_view * view_position;

    if clip_position.w == 0.0 {
        return None;
    }

    let ndc = clip_position.truncate() / clip_position.w;
    if !ndc.z.is_finite() {
        return None;
    }

    // NDC has its origin at screen centre with Y up; pixel space has its
    // origin at the top-left with Y down.
    let screen_x = (ndc.x + 1.0) * 0.5 * viewport.x;
    let screen_y = (1.0 - ndc.y) * 0.5 * viewport.y;

    Some(Vec2::new(screen_x, screen_y))
}
