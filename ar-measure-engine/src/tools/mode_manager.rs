use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::engine::tracking::AnchorReleaseEvent;
use crate::rpc::web_rpc::{WebRpcInterface, format_area, send_status};
use crate::tools::measure::MeasureSession;

/// Enumeration of the available measurement modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeasureMode {
    Distance,
    Area,
}

impl MeasureMode {
    /// Convert string identifier to mode for RPC compatibility.
    pub fn from_string(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "distance" => Some(Self::Distance),
            "area" => Some(Self::Area),
            _ => None,
        }
    }

    /// Convert mode to string identifier for host communication.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Distance => "distance",
            Self::Area => "area",
        }
    }
}

/// Event fired when the host requests a mode switch.
#[derive(Event)]
pub struct ModeSelectionEvent {
    pub mode: MeasureMode,
    pub source: SelectionSource,
}

/// Source of a mode selection or measure action, for logging.
#[derive(Debug, Clone, Copy)]
pub enum SelectionSource {
    Rpc,
    Direct,
}

/// Event fired when measurement actions are requested by the host.
#[derive(Event)]
pub struct MeasureActionEvent {
    pub action: MeasureAction,
}

/// Actions the host can trigger besides point capture.
#[derive(Debug, Clone, Copy)]
pub enum MeasureAction {
    ComputeArea,
    Clear,
}

/// System applying mode switches to the measurement session.
///
/// Switching to a different mode drops every captured point: a point set is
/// never shared across modes. Re-selecting the active mode is a no-op.
pub fn handle_mode_selection_events(
    mut events: EventReader<ModeSelectionEvent>,
    mut session: ResMut<MeasureSession>,
    mut anchor_events: EventWriter<AnchorReleaseEvent>,
    mut rpc_interface: ResMut<WebRpcInterface>,
) {
    for event in events.read() {
        let Some(released) = session.set_mode(event.mode) else {
            continue; // Mode already active.
        };

        info!(
            "Measurement mode activated: {} via {:?}",
            event.mode.as_str(),
            event.source
        );

        for index in &released {
            anchor_events.write(AnchorReleaseEvent { index: *index });
        }

        rpc_interface.send_notification(
            "mode_changed",
            serde_json::json!({ "mode": event.mode.as_str() }),
        );

        if !released.is_empty() {
            rpc_interface.send_notification(
                "points_cleared",
                serde_json::json!({ "released_anchors": released }),
            );
        }

        send_status(&mut rpc_interface, &session);
    }
}

/// System handling explicit area computation and clear requests.
pub fn handle_measure_action_events(
    mut events: EventReader<MeasureActionEvent>,
    mut session: ResMut<MeasureSession>,
    mut anchor_events: EventWriter<AnchorReleaseEvent>,
    mut rpc_interface: ResMut<WebRpcInterface>,
) {
    for event in events.read() {
        match event.action {
            MeasureAction::ComputeArea => match session.request_area() {
                Ok(area) => {
                    info!("Area measured: {area} m² over {} points", session.point_count());
                    rpc_interface.send_notification(
                        "area_completed",
                        serde_json::json!({
                            "area_square_meters": area,
                            "formatted": format_area(area),
                            "point_count": session.point_count(),
                        }),
                    );
                    send_status(&mut rpc_interface, &session);
                }
                Err(err) => {
                    warn!("Area request rejected: {err}");
                    rpc_interface.send_notification(
                        "area_rejected",
                        serde_json::json!({
                            "reason": err.reason(),
                            "point_count": session.point_count(),
                            "message": err.to_string(),
                        }),
                    );
                }
            },
            MeasureAction::Clear => {
                let released = session.clear();
                info!("Cleared {} measurement points", released.len());

                for index in &released {
                    anchor_events.write(AnchorReleaseEvent { index: *index });
                }

                rpc_interface.send_notification(
                    "points_cleared",
                    serde_json::json!({ "released_anchors": released }),
                );
                send_status(&mut rpc_interface, &session);
            }
        }
    }
}
