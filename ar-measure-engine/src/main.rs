use bevy::app::ScheduleRunnerPlugin;
use bevy::log::LogPlugin;
use bevy::prelude::*;
use std::time::Duration;

mod engine;
mod rpc;
mod tools;

use engine::overlay::{OverlayPoints, update_overlay};
use engine::tracking::{AnchorReleaseEvent, ArCameraFrame, SurfaceDetectedEvent, WorldTapEvent};
use rpc::web_rpc::WebRpcPlugin;
use tools::measure::{MeasureSession, capture_tap_points, handle_surface_detection};
use tools::mode_manager::{
    MeasureActionEvent, ModeSelectionEvent, handle_measure_action_events,
    handle_mode_selection_events,
};

const ENGINE_TICK_HZ: f64 = 60.0;

fn main() {
    let mut app = create_app();

    #[cfg(target_arch = "wasm32")]
    {
        wasm_bindgen_futures::spawn_local(async move {
            app.run();
        });
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        app.run();
    }
}

/// Create the headless measurement engine application.
fn create_app() -> App {
    let mut app = App::new();

    app.add_plugins(MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(
        Duration::from_secs_f64(1.0 / ENGINE_TICK_HZ),
    )))
    .add_plugins(LogPlugin::default())
    .add_plugins(WebRpcPlugin)
    .init_resource::<MeasureSession>()
    .init_resource::<ArCameraFrame>()
    .init_resource::<OverlayPoints>()
    .add_event::<SurfaceDetectedEvent>()
    .add_event::<WorldTapEvent>()
    .add_event::<AnchorReleaseEvent>()
    .add_event::<ModeSelectionEvent>()
    .add_event::<MeasureActionEvent>()
    .add_systems(
        Update,
        (
            handle_surface_detection,
            handle_mode_selection_events,
            capture_tap_points,
            handle_measure_action_events,
            update_overlay,
        )
            .chain(),
    );

    app
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use crate::tools::measure::MeasurementResult;
    use crate::tools::mode_manager::{MeasureAction, MeasureMode, SelectionSource};

    #[test]
    fn tap_events_drive_a_distance_measurement() {
        let mut app = create_app();

        app.world_mut().send_event(SurfaceDetectedEvent);
        app.update();

        app.world_mut().send_event(WorldTapEvent {
            position: Vec3::ZERO,
        });
        app.world_mut().send_event(WorldTapEvent {
            position: Vec3::new(3.0, 0.0, 4.0),
        });
        app.update();

        let session = app.world().resource::<MeasureSession>();
        assert_eq!(session.point_count(), 2);
        let Some(MeasurementResult::Distance(meters)) = session.result() else {
            panic!("expected a distance result");
        };
        assert_relative_eq!(meters, 5.0, epsilon = 1e-6);
    }

    #[test]
    fn taps_before_surface_detection_are_dropped() {
        let mut app = create_app();

        app.world_mut().send_event(WorldTapEvent {
            position: Vec3::ZERO,
        });
        app.update();

        let session = app.world().resource::<MeasureSession>();
        assert_eq!(session.point_count(), 0);
    }

    #[test]
    fn area_flow_releases_anchors_on_clear() {
        let mut app = create_app();

        app.world_mut().send_event(SurfaceDetectedEvent);
        app.world_mut().send_event(ModeSelectionEvent {
            mode: MeasureMode::Area,
            source: SelectionSource::Direct,
        });
        app.update();

        for corner in [
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 2.0),
            Vec3::new(2.0, 0.0, 2.0),
            Vec3::new(2.0, 0.0, 0.0),
        ] {
            app.world_mut().send_event(WorldTapEvent { position: corner });
        }
        app.world_mut().send_event(MeasureActionEvent {
            action: MeasureAction::ComputeArea,
        });
        app.update();

        {
            let session = app.world().resource::<MeasureSession>();
            let Some(MeasurementResult::Area(area)) = session.result() else {
                panic!("expected an area result");
            };
            assert_relative_eq!(area, 4.0, epsilon = 1e-6);
        }

        app.world_mut().send_event(MeasureActionEvent {
            action: MeasureAction::Clear,
        });
        app.update();

        let session = app.world().resource::<MeasureSession>();
        assert_eq!(session.point_count(), 0);
        assert_eq!(session.result(), None);

        let released = app
            .world()
            .resource::<Events<AnchorReleaseEvent>>()
            .iter_current_update_events()
            .map(|event| event.index)
            .collect::<Vec<_>>();
        assert_eq!(released, vec![0, 1, 2, 3]);
    }
}
