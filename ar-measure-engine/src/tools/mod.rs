//! Measurement tools: the session state machine and its geometry.
//!
//! ## Session architecture
//!
//! The `MeasureSession` resource owns the ordered store of captured world
//! points and the active mode. Exactly one mode is active at a time:
//!
//! - **Distance**: two points maximum; the second capture completes the
//!   measurement immediately.
//! - **Area**: unbounded points; the polygon area is computed only on
//!   explicit request, over the horizontal XZ plane.
//!
//! Switching modes drops every captured point (and signals anchor release to
//! the host); re-selecting the active mode changes nothing.
//!
//! ### Capture flow
//!
//! ```text
//! Host hit test
//!   └─> WorldTapEvent
//!       └─> capture_tap_points()
//!           ├─> MeasureSession::add_point()
//!           ├─> point_added / capture_rejected notification
//!           ├─> measure_completed notification (2nd distance point)
//!           └─> status_changed notification
//! ```

/// Measurement session state machine, capture systems and error taxonomy.
pub mod measure;

/// Pure distance and shoelace-area functions over captured point sequences.
pub mod geometry;

/// Mode enumeration, mode-switch and measure-action event handling.
pub mod mode_manager;
