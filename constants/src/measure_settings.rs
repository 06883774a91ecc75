/// Maximum number of points a distance measurement may hold
pub const DISTANCE_MODE_POINT_LIMIT: usize = 2;

/// Minimum number of points required before a polygon area can be computed
pub const AREA_MINIMUM_POINTS: usize = 3;

/// Distances below this many meters are displayed in centimeters
pub const SUBUNIT_DISTANCE_THRESHOLD: f32 = 1.0;

/// Areas below this many square meters are displayed in square centimeters
pub const SUBUNIT_AREA_THRESHOLD: f32 = 1.0;

pub const CENTIMETERS_PER_METER: f32 = 100.0;
pub const SQUARE_CENTIMETERS_PER_SQUARE_METER: f32 = 10_000.0;
