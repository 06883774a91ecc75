use bevy::prelude::*;

/// Latest camera state supplied by the host tracking subsystem.
///
/// Refreshed once per host frame via the `camera_frame` RPC method. The
/// overlay rebuild reads whatever is current at the start of its pass; no
/// history is kept. Matrices are column-major, matching the wire layout.
#[derive(Resource, Clone)]
pub struct ArCameraFrame {
    pub view_from_world: Mat4,
    pub clip_from_view: Mat4,
    /// Viewport size in pixels. Zero until the first frame arrives.
    pub viewport: Vec2,
}

impl Default for ArCameraFrame {
    fn default() -> Self {
        Self {
            view_from_world: Mat4::IDENTITY,
            clip_from_view: Mat4::IDENTITY,
            viewport: Vec2::ZERO,
        }
    }
}

impl ArCameraFrame {
    pub fn is_ready(&self) -> bool {
        self.viewport.x > 0.0 && self.viewport.y > 0.0
    }
}

/// One-shot event: the tracking subsystem found its first trackable surface.
/// Idempotent after the first delivery.
#[derive(Event, Debug, Clone, Copy, Default)]
pub struct SurfaceDetectedEvent;

/// A screen tap already resolved to a world point by the host's hit test.
/// Taps that miss every tracked surface never reach the engine.
#[derive(Event, Debug, Clone, Copy)]
pub struct WorldTapEvent {
    pub position: Vec3,
}

/// Emitted once per captured point when points are dropped, so the host can
/// detach the tracking anchor backing that capture. The engine never keeps a
/// point after its release has been signalled.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnchorReleaseEvent {
    pub index: u32,
}
