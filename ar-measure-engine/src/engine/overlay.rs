use bevy::prelude::*;

use crate::engine::projection::world_to_screen;
use crate::engine::tracking::ArCameraFrame;
use crate::rpc::web_rpc::WebRpcInterface;
use crate::tools::measure::MeasureSession;

/// Screen-space positions of the captured points, in capture order.
///
/// Derived state only: rebuilt from the session's point store every frame,
/// never mutated independently. The host renderer draws a marker per point
/// and an edge between consecutive points; no closing edge is implied.
#[derive(Resource, Default)]
pub struct OverlayPoints {
    pub points: Vec<Vec2>,
}

/// Project the session's points through the current camera frame.
///
/// Points without a valid screen position this frame are skipped; capture
/// order is preserved for the rest. An unready frame (no viewport yet)
/// projects nothing.
pub fn project_session_points(points: &[Vec3], frame: &ArCameraFrame) -> Vec<Vec2> {
    if !frame.is_ready() {
        return Vec::new();
    }
    points
        .iter()
        .filter_map(|point| {
            world_to_screen(
                *point,
                frame.view_from_world,
                frame.clip_from_view,
                frame.viewport,
            )
        })
        .collect()
}

/// Per-frame overlay rebuild.
///
/// The camera pose changes continuously, so the projection is recomputed on
/// every pass rather than cached. The host is only notified when the rebuilt
/// overlay differs from the previous frame's.
pub fn update_overlay(
    session: Res<MeasureSession>,
    frame: Res<ArCameraFrame>,
    mut overlay: ResMut<OverlayPoints>,
    mut rpc_interface: ResMut<WebRpcInterface>,
) {
    let projected = project_session_points(session.points(), &frame);
    if projected == overlay.points {
        return;
    }
    overlay.points = projected;

    rpc_interface.send_notification(
        "overlay_updated",
        serde_json::json!({
            "points": overlay
                .points
                .iter()
                .map(|point| [point.x, point.y])
                .collect::<Vec<_>>(),
        }),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use constants::tracking_settings::{DEFAULT_FAR_PLANE, DEFAULT_NEAR_PLANE};

    fn frame() -> ArCameraFrame {
        let viewport = Vec2::new(1080.0, 1920.0);
        ArCameraFrame {
            view_from_world: Mat4::IDENTITY,
            clip_from_view: Mat4::perspective_rh(
                std::f32::consts::FRAC_PI_3,
                viewport.x / viewport.y,
                DEFAULT_NEAR_PLANE,
                DEFAULT_FAR_PLANE,
            ),
            viewport,
        }
    }

    #[test]
    fn unprojectable_point_is_skipped_without_error() {
        // The middle point sits at the camera origin, where w == 0.
        let points = [
            Vec3::new(0.0, 0.0, -2.0),
            Vec3::ZERO,
            Vec3::new(0.5, 0.0, -2.0),
        ];
        let projected = project_session_points(&points, &frame());
        assert_eq!(projected.len(), 2);
    }

    #[test]
    fn capture_order_is_preserved() {
        // Left of the view axis must project left of the axis point.
        let points = [Vec3::new(-0.5, 0.0, -2.0), Vec3::new(0.5, 0.0, -2.0)];
        let projected = project_session_points(&points, &frame());
        assert_eq!(projected.len(), 2);
        assert!(projected[0].x < projected[1].x);
    }

    #[test]
    fn unready_frame_projects_nothing() {
        let points = [Vec3::new(0.0, 0.0, -2.0)];
        assert!(project_session_points(&points, &ArCameraFrame::default()).is_empty());
    }
}
