//! Spatial plumbing between the host's AR tracking and the measurement tools.
//!
//! The host owns the camera: it feeds fresh view/projection matrices and the
//! viewport size every frame (`tracking`), and the engine re-derives the 2-D
//! overlay from the captured points on every pass (`projection`, `overlay`).
//! The overlay is a computed view of the session's point store, never an
//! independently mutated structure.

/// Host collaborator contract: camera frame resource and tracking events.
pub mod tracking;

/// World-space to screen-space projection through clip space and NDC.
pub mod projection;

/// Per-frame rebuild of the screen-space overlay point set.
pub mod overlay;
