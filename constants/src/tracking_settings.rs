/// Near clip plane the host must use when deriving the camera projection matrix
pub const DEFAULT_NEAR_PLANE: f32 = 0.1;

/// Far clip plane the host must use when deriving the camera projection matrix
pub const DEFAULT_FAR_PLANE: f32 = 100.0;
