//! JSON-RPC 2.0 communication layer for AR host integration.
//!
//! Implements bidirectional messaging between the measurement engine and the
//! embedding AR host via iframe postMessage, supporting both request-response
//! and notification patterns. On native targets the transport is a no-op and
//! the engine is driven through its Bevy events instead.
//!
//! ## Message Flow
//!
//! ```text
//! AR host (parent window)  <──postMessage──>  Engine (iframe)
//!        │                                        │
//!        ├─ Request (with ID) ──────────────────> │
//!        │                                        ├─ Process request
//!        │ <───────────────── Response (with ID) ─┤
//!        │                                        │
//!        ├─ camera_frame (no ID, every frame) ──> │
//!        │ <────────── Notification (no ID) ──────┤
//! ```
//!
//! ## Methods (host → engine)
//!
//! - `mode_selection`: switch between distance and area measurement
//! - `add_point`: capture a tap already resolved to a world point
//! - `surface_detected`: one-shot trackable-surface signal
//! - `camera_frame`: per-frame view/projection matrices and viewport size
//! - `compute_area`: request the polygon area over the captured points
//! - `clear_points`: drop all captured points, releasing their anchors
//! - `get_status`: current status category, prompt text and point count
//! - `get_tracking_config`: near/far planes for the host's projection matrix
//!
//! ## Notifications (engine → host)
//!
//! - `status_changed`, `point_added`, `capture_rejected`
//! - `measure_completed`, `area_completed`, `area_rejected`
//! - `mode_changed`, `points_cleared` (carries released anchor indices)
//! - `overlay_updated` (ordered screen points for marker/edge rendering)

/// JSON-RPC 2.0 bidirectional communication system for host integration.
pub mod web_rpc;
