use bevy::prelude::*;
use constants::measure_settings::{
    AREA_MINIMUM_POINTS, CENTIMETERS_PER_METER, SQUARE_CENTIMETERS_PER_SQUARE_METER,
    SUBUNIT_AREA_THRESHOLD, SUBUNIT_DISTANCE_THRESHOLD,
};
use constants::tracking_settings::{DEFAULT_FAR_PLANE, DEFAULT_NEAR_PLANE};
use serde::{Deserialize, Serialize};

use crate::engine::tracking::{ArCameraFrame, SurfaceDetectedEvent, WorldTapEvent};
use crate::tools::measure::{MeasureSession, SessionStatus};
use crate::tools::mode_manager::{
    MeasureAction, MeasureActionEvent, MeasureMode, ModeSelectionEvent, SelectionSource,
};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::JsValue;

#[cfg(target_arch = "wasm32")]
use web_sys::{MessageEvent, window};

/// JSON-RPC 2.0 request structure.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcRequest {
    pub jsonrpc: String,
    pub method: String,
    pub params: serde_json::Value,
    pub id: Option<serde_json::Value>,
}

/// JSON-RPC 2.0 response structure.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcResponse {
    pub jsonrpc: String,
    pub result: Option<serde_json::Value>,
    pub error: Option<RpcError>,
    pub id: Option<serde_json::Value>,
}

/// JSON-RPC 2.0 notification structure for one-way communication.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcNotification {
    pub jsonrpc: String,
    pub method: String,
    pub params: serde_json::Value,
}

/// JSON-RPC error structure following specification.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcError {
    pub code: i32,
    pub message: String,
    pub data: Option<serde_json::Value>,
}

/// Resource managing bidirectional RPC communication with the AR host.
/// Handles both request-response patterns and notification broadcasting.
#[derive(Resource, Default)]
pub struct WebRpcInterface {
    outgoing_notifications: Vec<RpcNotification>,
    outgoing_responses: Vec<RpcResponse>,
}

impl WebRpcInterface {
    /// Send notification to the host without expecting a response.
    pub fn send_notification(&mut self, method: &str, params: serde_json::Value) {
        self.outgoing_notifications.push(RpcNotification {
            jsonrpc: "2.0".to_string(),
            method: method.to_string(),
            params,
        });
    }

    /// Queue response for transmission to the host.
    fn queue_response(&mut self, response: RpcResponse) {
        self.outgoing_responses.push(response);
    }
}

/// Plugin establishing the RPC communication layer for iframe deployment.
pub struct WebRpcPlugin;

impl Plugin for WebRpcPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<WebRpcInterface>()
            .add_event::<IncomingRpcMessage>()
            .add_systems(
                Update,
                (
                    process_incoming_messages,
                    handle_rpc_messages,
                    send_outgoing_messages,
                )
                    .chain(),
            );

        #[cfg(target_arch = "wasm32")]
        app.add_systems(Startup, setup_message_listener);
    }
}

#[cfg(target_arch = "wasm32")]
fn setup_message_listener(mut commands: Commands) {
    use std::sync::Arc;
    use std::sync::Mutex;

    // Thread-safe message queue for cross-thread communication.
    let message_queue: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let queue_clone = message_queue.clone();

    let closure = Closure::wrap(Box::new(move |event: MessageEvent| {
        // Filter messages to ensure they contain string data.
        if let Ok(data) = event.data().dyn_into::<js_sys::JsString>() {
            let message_str: String = data.into();

            // Cheap validation of the RPC envelope before queuing.
            if message_str.contains("jsonrpc") {
                if let Ok(mut queue) = queue_clone.lock() {
                    queue.push(message_str);
                }
            }
        }
    }) as Box<dyn FnMut(MessageEvent)>);

    if let Some(window) = window() {
        window
            .add_event_listener_with_callback("message", closure.as_ref().unchecked_ref())
            .expect("Failed to register message listener");
    }

    // Prevent closure from being dropped by transferring ownership to JS.
    closure.forget();
    commands.insert_resource(MessageQueue(message_queue));
}

/// Resource wrapping thread-safe message queue for WASM event handling.
#[derive(Resource)]
struct MessageQueue(std::sync::Arc<std::sync::Mutex<Vec<String>>>);

/// Event representing an incoming RPC message from the host.
#[derive(Event)]
struct IncomingRpcMessage {
    content: String,
}

fn process_incoming_messages(
    message_queue: Option<Res<MessageQueue>>,
    mut message_events: EventWriter<IncomingRpcMessage>,
) {
    let Some(queue_res) = message_queue else {
        return;
    };

    let messages = if let Ok(mut queue) = queue_res.0.lock() {
        std::mem::take(&mut *queue)
    } else {
        Vec::new()
    };

    for message_str in messages {
        message_events.write(IncomingRpcMessage {
            content: message_str,
        });
    }
}

fn handle_rpc_messages(
    mut events: EventReader<IncomingRpcMessage>,
    mut rpc_interface: ResMut<WebRpcInterface>,
    mut camera_frame: ResMut<ArCameraFrame>,
    session: Res<MeasureSession>,
    mut mode_events: EventWriter<ModeSelectionEvent>,
    mut tap_events: EventWriter<WorldTapEvent>,
    mut surface_events: EventWriter<SurfaceDetectedEvent>,
    mut action_events: EventWriter<MeasureActionEvent>,
) {
    for event in events.read() {
        match serde_json::from_str::<RpcRequest>(&event.content) {
            Ok(request) => {
                let result = dispatch_rpc_request(
                    &request,
                    &mut camera_frame,
                    &session,
                    &mut mode_events,
                    &mut tap_events,
                    &mut surface_events,
                    &mut action_events,
                );

                // Only requests carrying an id get a response; id-less
                // requests (the per-frame camera feed) are fire-and-forget.
                match (request.id, result) {
                    (Some(id), Ok(value)) => rpc_interface.queue_response(RpcResponse {
                        jsonrpc: "2.0".to_string(),
                        result: Some(value),
                        error: None,
                        id: Some(id),
                    }),
                    (Some(id), Err(error)) => {
                        rpc_interface.queue_response(create_error_response(id, error));
                    }
                    (None, Ok(_)) => {}
                    (None, Err(error)) => {
                        warn!("RPC notification '{}' failed: {}", request.method, error.message);
                    }
                }
            }
            Err(parse_error) => {
                warn!("Discarding unparseable RPC message: {parse_error}");
            }
        }
    }
}

/// Route a request to its handler based on the method name.
fn dispatch_rpc_request(
    request: &RpcRequest,
    camera_frame: &mut ArCameraFrame,
    session: &MeasureSession,
    mode_events: &mut EventWriter<ModeSelectionEvent>,
    tap_events: &mut EventWriter<WorldTapEvent>,
    surface_events: &mut EventWriter<SurfaceDetectedEvent>,
    action_events: &mut EventWriter<MeasureActionEvent>,
) -> Result<serde_json::Value, RpcError> {
    match request.method.as_str() {
        "mode_selection" => handle_mode_selection(&request.params, mode_events),
        "add_point" => handle_add_point(&request.params, tap_events),
        "camera_frame" => handle_camera_frame(&request.params, camera_frame),
        "surface_detected" => {
            surface_events.write(SurfaceDetectedEvent);
            Ok(serde_json::json!({ "success": true }))
        }
        "compute_area" => {
            action_events.write(MeasureActionEvent {
                action: MeasureAction::ComputeArea,
            });
            Ok(serde_json::json!({ "success": true }))
        }
        "clear_points" => {
            action_events.write(MeasureActionEvent {
                action: MeasureAction::Clear,
            });
            Ok(serde_json::json!({ "success": true }))
        }
        "get_status" => Ok(status_payload(session)),
        "get_tracking_config" => Ok(serde_json::json!({
            "near_plane": DEFAULT_NEAR_PLANE,
            "far_plane": DEFAULT_FAR_PLANE,
        })),
        _ => {
            warn!("Unknown RPC method: {}", request.method);
            Err(RpcError {
                code: -32601,
                message: "Method not found".to_string(),
                data: Some(serde_json::json!({ "method": request.method })),
            })
        }
    }
}

/// Handle mode selection with parameter validation and event dispatch.
fn handle_mode_selection(
    params: &serde_json::Value,
    mode_events: &mut EventWriter<ModeSelectionEvent>,
) -> Result<serde_json::Value, RpcError> {
    #[derive(Deserialize)]
    struct ModeSelectionParams {
        mode: String,
    }

    let mode_params = serde_json::from_value::<ModeSelectionParams>(params.clone())
        .map_err(|_| RpcError::invalid_params("Expected 'mode' parameter"))?;

    let mode = MeasureMode::from_string(&mode_params.mode)
        .ok_or_else(|| RpcError::invalid_params(&format!("Unknown mode: {}", mode_params.mode)))?;

    mode_events.write(ModeSelectionEvent {
        mode,
        source: SelectionSource::Rpc,
    });

    Ok(serde_json::json!({
        "success": true,
        "mode": mode.as_str(),
    }))
}

/// Handle a tap the host has already resolved to a world point.
fn handle_add_point(
    params: &serde_json::Value,
    tap_events: &mut EventWriter<WorldTapEvent>,
) -> Result<serde_json::Value, RpcError> {
    #[derive(Deserialize)]
    struct AddPointParams {
        position: [f32; 3],
    }

    let point_params = serde_json::from_value::<AddPointParams>(params.clone())
        .map_err(|_| RpcError::invalid_params("Expected 'position' as [x, y, z]"))?;

    tap_events.write(WorldTapEvent {
        position: Vec3::from_array(point_params.position),
    });

    Ok(serde_json::json!({ "success": true }))
}

/// Handle the per-frame camera feed: view/projection matrices and viewport.
fn handle_camera_frame(
    params: &serde_json::Value,
    camera_frame: &mut ArCameraFrame,
) -> Result<serde_json::Value, RpcError> {
    #[derive(Deserialize)]
    struct CameraFrameParams {
        view: [f32; 16],
        projection: [f32; 16],
        viewport: [f32; 2],
    }

    let frame_params = serde_json::from_value::<CameraFrameParams>(params.clone()).map_err(|_| {
        RpcError::invalid_params("Expected 'view', 'projection' (column-major) and 'viewport'")
    })?;

    camera_frame.view_from_world = Mat4::from_cols_array(&frame_params.view);
    camera_frame.clip_from_view = Mat4::from_cols_array(&frame_params.projection);
    camera_frame.viewport = Vec2::new(frame_params.viewport[0], frame_params.viewport[1]);

    Ok(serde_json::json!({ "success": true }))
}

/// Create standardized error response.
fn create_error_response(id: serde_json::Value, error: RpcError) -> RpcResponse {
    RpcResponse {
        jsonrpc: "2.0".to_string(),
        result: None,
        error: Some(error),
        id: Some(id),
    }
}

/// Send queued notifications and responses to the host.
fn send_outgoing_messages(mut rpc_interface: ResMut<WebRpcInterface>) {
    // Send notifications first.
    for notification in rpc_interface.outgoing_notifications.drain(..) {
        send_message_to_parent(&notification);
    }

    // Send responses second to maintain order.
    for response in rpc_interface.outgoing_responses.drain(..) {
        send_message_to_parent(&response);
    }
}

/// Send serialized message to the parent window (AR host).
fn send_message_to_parent<T: Serialize>(message: &T) {
    #[cfg(target_arch = "wasm32")]
    {
        match serde_json::to_string(message) {
            Ok(json) => {
                if let Some(window) = window() {
                    if let Some(parent) = window.parent().ok().flatten() {
                        if let Err(e) = parent.post_message(&JsValue::from_str(&json), "*") {
                            error!("Failed to send message to parent: {:?}", e);
                        }
                    } else {
                        warn!("No parent window available for message transmission");
                    }
                } else {
                    error!("Window object not available");
                }
            }
            Err(e) => {
                error!("Failed to serialize message: {}", e);
            }
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        // No-op for non-WASM targets; the engine is driven programmatically.
        let _ = message;
    }
}

/// Standard RPC error codes and constructors.
impl RpcError {
    pub fn invalid_params(message: &str) -> Self {
        Self {
            code: -32602,
            message: message.to_string(),
            data: None,
        }
    }
}

/// Render a distance for display: centimeters below one meter, meters above.
pub fn format_distance(meters: f32) -> String {
    if meters < SUBUNIT_DISTANCE_THRESHOLD {
        format!("{:.1} cm", meters * CENTIMETERS_PER_METER)
    } else {
        format!("{meters:.2} m")
    }
}

/// Render an area for display: square centimeters below one square meter.
pub fn format_area(square_meters: f32) -> String {
    if square_meters < SUBUNIT_AREA_THRESHOLD {
        format!("{:.1} cm²", square_meters * SQUARE_CENTIMETERS_PER_SQUARE_METER)
    } else {
        format!("{square_meters:.2} m²")
    }
}

/// Human-readable prompt for a status category.
pub fn status_message(status: SessionStatus) -> String {
    match status {
        SessionStatus::SurfaceScanning => {
            "Scanning for a surface... move the device slowly.".to_string()
        }
        SessionStatus::NeedFirstPoint => "Distance mode: tap to place the first point.".to_string(),
        SessionStatus::NeedSecondPoint => {
            "Distance mode: tap to place the second point.".to_string()
        }
        SessionStatus::DistanceReady => {
            "Distance measured. Clear to start a new measurement.".to_string()
        }
        SessionStatus::AreaNeedMore(count) => {
            format!("Area mode: {count} points. At least {AREA_MINIMUM_POINTS} needed.")
        }
        SessionStatus::AreaReady(count) => {
            format!("Area mode: {count} points. Request the area to compute.")
        }
    }
}

fn status_payload(session: &MeasureSession) -> serde_json::Value {
    let status = session.status();
    serde_json::json!({
        "state": status.as_str(),
        "message": status_message(status),
        "mode": session.mode().as_str(),
        "point_count": session.point_count(),
    })
}

/// Push a `status_changed` notification reflecting the session's state.
pub fn send_status(rpc_interface: &mut WebRpcInterface, session: &MeasureSession) {
    rpc_interface.send_notification("status_changed", status_payload(session));
}
