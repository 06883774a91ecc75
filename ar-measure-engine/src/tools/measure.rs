use bevy::prelude::*;
use constants::measure_settings::{AREA_MINIMUM_POINTS, DISTANCE_MODE_POINT_LIMIT};
use thiserror::Error;

use crate::engine::tracking::{SurfaceDetectedEvent, WorldTapEvent};
use crate::rpc::web_rpc::{WebRpcInterface, format_distance, send_status};
use crate::tools::geometry;
use crate::tools::mode_manager::MeasureMode;

/// A completed measurement, recomputed from scratch at every trigger.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MeasurementResult {
    /// Length in meters between the two captured points.
    Distance(f32),
    /// Polygon area in square meters over all captured points.
    Area(f32),
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CaptureError {
    #[error("no trackable surface has been detected yet")]
    SurfaceNotReady,
    #[error("distance mode holds at most {DISTANCE_MODE_POINT_LIMIT} points; clear before measuring again")]
    CaptureLimitReached,
}

impl CaptureError {
    /// Stable identifier carried in RPC rejection notifications.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::SurfaceNotReady => "surface_not_ready",
            Self::CaptureLimitReached => "capture_limit_reached",
        }
    }
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AreaError {
    #[error("area needs at least {AREA_MINIMUM_POINTS} points, got {0}")]
    InsufficientPoints(usize),
}

impl AreaError {
    pub fn reason(&self) -> &'static str {
        match self {
            Self::InsufficientPoints(_) => "insufficient_points",
        }
    }
}

/// Status category of the session, total over all reachable states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    SurfaceScanning,
    NeedFirstPoint,
    NeedSecondPoint,
    DistanceReady,
    AreaNeedMore(usize),
    AreaReady(usize),
}

impl SessionStatus {
    /// Stable identifier carried in RPC status notifications.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SurfaceScanning => "surface_scanning",
            Self::NeedFirstPoint => "need_first_point",
            Self::NeedSecondPoint => "need_second_point",
            Self::DistanceReady => "distance_ready",
            Self::AreaNeedMore(_) => "area_need_more",
            Self::AreaReady(_) => "area_ready",
        }
    }
}

/// Measurement session state machine.
///
/// Owns the ordered store of captured world points, the single source of
/// truth the screen overlay is re-derived from. Points are immutable once
/// captured and only ever leave the store in bulk, via [`clear`] or a mode
/// switch. All mutations run on the main schedule, so an overlay pass always
/// observes a fully-formed point list.
///
/// [`clear`]: MeasureSession::clear
#[derive(Resource)]
pub struct MeasureSession {
    mode: MeasureMode,
    points: Vec<Vec3>,
    surface_detected: bool,
    result: Option<MeasurementResult>,
}

impl Default for MeasureSession {
    fn default() -> Self {
        Self {
            mode: MeasureMode::Distance,
            points: Vec::new(),
            surface_detected: false,
            result: None,
        }
    }
}

impl MeasureSession {
    pub fn mode(&self) -> MeasureMode {
        self.mode
    }

    /// Captured points in insertion order. The order is semantically
    /// meaningful: it defines the distance endpoints and the polygon edges.
    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    pub fn result(&self) -> Option<MeasurementResult> {
        self.result
    }

    /// Record the one-shot surface detection. Returns `true` on the first
    /// call only; the flag never reverts.
    pub fn notify_surface_detected(&mut self) -> bool {
        if self.surface_detected {
            return false;
        }
        self.surface_detected = true;
        true
    }

    /// Switch measurement mode.
    ///
    /// Returns `None` when `mode` is already active (points are retained).
    /// Otherwise switches and drops every captured point, returning the
    /// released anchor indices.
    pub fn set_mode(&mut self, mode: MeasureMode) -> Option<Vec<u32>> {
        if self.mode == mode {
            return None;
        }
        self.mode = mode;
        Some(self.clear())
    }

    /// Append a captured world point and return its index.
    ///
    /// In distance mode the second point completes the measurement and the
    /// distance result is published immediately. Area mode never computes
    /// implicitly; see [`request_area`](Self::request_area).
    pub fn add_point(&mut self, position: Vec3) -> Result<usize, CaptureError> {
        if !self.surface_detected {
            return Err(CaptureError::SurfaceNotReady);
        }
        if self.mode == MeasureMode::Distance && self.points.len() >= DISTANCE_MODE_POINT_LIMIT {
            return Err(CaptureError::CaptureLimitReached);
        }

        self.points.push(position);
        let index = self.points.len() - 1;

        if self.mode == MeasureMode::Distance && self.points.len() == DISTANCE_MODE_POINT_LIMIT {
            let meters = geometry::distance_between(self.points[0], self.points[1]);
            self.result = Some(MeasurementResult::Distance(meters));
        }

        Ok(index)
    }

    /// Compute the polygon area over all captured points.
    pub fn request_area(&mut self) -> Result<f32, AreaError> {
        if self.points.len() < AREA_MINIMUM_POINTS {
            return Err(AreaError::InsufficientPoints(self.points.len()));
        }
        let area = geometry::polygon_area_xz(&self.points);
        self.result = Some(MeasurementResult::Area(area));
        Ok(area)
    }

    /// Drop all captured points and the current result, returning the anchor
    /// indices the host must release.
    pub fn clear(&mut self) -> Vec<u32> {
        let released: Vec<u32> = (0..self.points.len() as u32).collect();
        self.points.clear();
        self.result = None;
        released
    }

    pub fn status(&self) -> SessionStatus {
        if !self.surface_detected {
            return SessionStatus::SurfaceScanning;
        }
        match (self.mode, self.points.len()) {
            (MeasureMode::Distance, 0) => SessionStatus::NeedFirstPoint,
            (MeasureMode::Distance, 1) => SessionStatus::NeedSecondPoint,
            (MeasureMode::Distance, _) => SessionStatus::DistanceReady,
            (MeasureMode::Area, n) if n < AREA_MINIMUM_POINTS => SessionStatus::AreaNeedMore(n),
            (MeasureMode::Area, n) => SessionStatus::AreaReady(n),
        }
    }
}

/// System applying the one-shot surface detection event.
pub fn handle_surface_detection(
    mut events: EventReader<SurfaceDetectedEvent>,
    mut session: ResMut<MeasureSession>,
    mut rpc_interface: ResMut<WebRpcInterface>,
) {
    for _ in events.read() {
        if session.notify_surface_detected() {
            info!("Trackable surface detected");
            send_status(&mut rpc_interface, &session);
        }
    }
}

/// System capturing host tap events into the session.
///
/// Each accepted point is announced to the host; in distance mode the second
/// point also publishes the completed measurement. Rejected captures leave
/// the store untouched and surface a distinguishable rejection reason.
pub fn capture_tap_points(
    mut taps: EventReader<WorldTapEvent>,
    mut session: ResMut<MeasureSession>,
    mut rpc_interface: ResMut<WebRpcInterface>,
) {
    for tap in taps.read() {
        match session.add_point(tap.position) {
            Ok(index) => {
                info!(
                    "Point {} captured at ({:.2}, {:.2}, {:.2})",
                    index + 1,
                    tap.position.x,
                    tap.position.y,
                    tap.position.z
                );
                rpc_interface.send_notification(
                    "point_added",
                    serde_json::json!({
                        "index": index,
                        "position": [tap.position.x, tap.position.y, tap.position.z],
                        "point_count": session.point_count(),
                    }),
                );

                if session.mode() == MeasureMode::Distance {
                    if let Some(MeasurementResult::Distance(meters)) = session.result() {
                        info!("Distance measured: {meters} m");
                        rpc_interface.send_notification(
                            "measure_completed",
                            serde_json::json!({
                                "distance_meters": meters,
                                "formatted": format_distance(meters),
                            }),
                        );
                    }
                }

                send_status(&mut rpc_interface, &session);
            }
            Err(err) => {
                warn!("Point capture rejected: {err}");
                rpc_interface.send_notification(
                    "capture_rejected",
                    serde_json::json!({
                        "reason": err.reason(),
                        "message": err.to_string(),
                    }),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn session_with_surface() -> MeasureSession {
        let mut session = MeasureSession::default();
        session.notify_surface_detected();
        session
    }

    #[test]
    fn capture_before_surface_detection_is_rejected() {
        let mut session = MeasureSession::default();
        assert_eq!(
            session.add_point(Vec3::ZERO),
            Err(CaptureError::SurfaceNotReady)
        );
        assert!(session.points().is_empty());
    }

    #[test]
    fn surface_detection_is_one_shot() {
        let mut session = MeasureSession::default();
        assert!(session.notify_surface_detected());
        assert!(!session.notify_surface_detected());
        assert_eq!(session.status(), SessionStatus::NeedFirstPoint);
    }

    #[test]
    fn second_point_completes_distance_measurement() {
        let mut session = session_with_surface();
        session.add_point(Vec3::ZERO).unwrap();
        assert_eq!(session.result(), None);

        session.add_point(Vec3::new(3.0, 0.0, 4.0)).unwrap();
        let Some(MeasurementResult::Distance(meters)) = session.result() else {
            panic!("expected a distance result");
        };
        assert_relative_eq!(meters, 5.0, epsilon = 1e-6);
    }

    #[test]
    fn third_point_in_distance_mode_is_rejected() {
        let mut session = session_with_surface();
        session.add_point(Vec3::ZERO).unwrap();
        session.add_point(Vec3::X).unwrap();

        assert_eq!(
            session.add_point(Vec3::Y),
            Err(CaptureError::CaptureLimitReached)
        );
        assert_eq!(session.point_count(), 2);
    }

    #[test]
    fn area_mode_has_no_capture_limit() {
        let mut session = session_with_surface();
        session.set_mode(MeasureMode::Area);
        for i in 0..12 {
            session.add_point(Vec3::new(i as f32, 0.0, 0.0)).unwrap();
        }
        assert_eq!(session.point_count(), 12);
        assert_eq!(session.result(), None); // Never computed implicitly.
    }

    #[test]
    fn switching_mode_clears_points_and_result() {
        let mut session = session_with_surface();
        session.add_point(Vec3::ZERO).unwrap();
        session.add_point(Vec3::X).unwrap();
        assert!(session.result().is_some());

        let released = session.set_mode(MeasureMode::Area).expect("mode switched");
        assert_eq!(released, vec![0, 1]);
        assert!(session.points().is_empty());
        assert_eq!(session.result(), None);
    }

    #[test]
    fn reselecting_active_mode_keeps_points() {
        let mut session = session_with_surface();
        session.add_point(Vec3::ZERO).unwrap();

        assert_eq!(session.set_mode(MeasureMode::Distance), None);
        assert_eq!(session.point_count(), 1);
    }

    #[test]
    fn area_request_with_two_points_is_rejected() {
        let mut session = session_with_surface();
        session.set_mode(MeasureMode::Area);
        session.add_point(Vec3::ZERO).unwrap();
        session.add_point(Vec3::X).unwrap();

        assert_eq!(
            session.request_area(),
            Err(AreaError::InsufficientPoints(2))
        );
        assert_eq!(session.result(), None);
    }

    #[test]
    fn area_of_collinear_points_is_zero() {
        let mut session = session_with_surface();
        session.set_mode(MeasureMode::Area);
        for i in 0..3 {
            session
                .add_point(Vec3::new(i as f32, 0.0, i as f32))
                .unwrap();
        }

        let area = session.request_area().unwrap();
        assert_relative_eq!(area, 0.0, epsilon = 1e-6);
        assert_eq!(session.result(), Some(MeasurementResult::Area(area)));
    }

    #[test]
    fn area_of_square_is_four() {
        let mut session = session_with_surface();
        session.set_mode(MeasureMode::Area);
        for corner in [
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 2.0),
            Vec3::new(2.0, 0.0, 2.0),
            Vec3::new(2.0, 0.0, 0.0),
        ] {
            session.add_point(corner).unwrap();
        }
        assert_relative_eq!(session.request_area().unwrap(), 4.0, epsilon = 1e-6);
    }

    #[test]
    fn clear_returns_released_anchor_indices() {
        let mut session = session_with_surface();
        session.add_point(Vec3::ZERO).unwrap();
        session.add_point(Vec3::X).unwrap();

        assert_eq!(session.clear(), vec![0, 1]);
        assert!(session.points().is_empty());
        assert_eq!(session.result(), None);
        assert_eq!(session.clear(), Vec::<u32>::new());
    }

    #[test]
    fn status_covers_every_reachable_state() {
        let mut session = MeasureSession::default();
        assert_eq!(session.status(), SessionStatus::SurfaceScanning);

        session.notify_surface_detected();
        assert_eq!(session.status(), SessionStatus::NeedFirstPoint);

        session.add_point(Vec3::ZERO).unwrap();
        assert_eq!(session.status(), SessionStatus::NeedSecondPoint);

        session.add_point(Vec3::X).unwrap();
        assert_eq!(session.status(), SessionStatus::DistanceReady);

        session.set_mode(MeasureMode::Area);
        assert_eq!(session.status(), SessionStatus::AreaNeedMore(0));

        for i in 0..3 {
            session.add_point(Vec3::new(i as f32, 0.0, 0.0)).unwrap();
        }
        assert_eq!(session.status(), SessionStatus::AreaReady(3));
    }
}
