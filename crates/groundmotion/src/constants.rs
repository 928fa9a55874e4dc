/// Decades covered by the colorbar ladders, as powers of ten.
pub const LADDER_DECADES: [i32; 5] = [-3, -2, -1, 0, 1];

/// Mantissas of the major ("nice number") ladder within one decade.
pub const MAJOR_MANTISSAS: [u32; 3] = [1, 2, 5];

/// Number of logarithmic color levels per ground-motion panel.
pub const SCALAR_LEVEL_COUNT: usize = 14;

/// Percentiles snapped to the ladder to pick a panel's color range.
pub const LOW_PERCENTILE: f64 = 4.0;
pub const HIGH_PERCENTILE: f64 = 96.0;

/// Elevation caps in metres. Deeper or higher data is clipped to these.
pub const ELEVATION_FLOOR: f64 = -800.0;
pub const ELEVATION_CEILING: f64 = 4500.0;
pub const ELEVATION_ROUNDING: f64 = 100.0;
/// The elevation ladder has this many steps between its rounded endpoints.
pub const ELEVATION_STEPS: f64 = 13.0;

// Terrain palette sub-range picked from the elevation extent. These were tuned
// by eye to keep sea level centred in the palette; keep them as they are.
pub const TERRAIN_INDEX_BASE: f64 = 50.0;
pub const TERRAIN_INDEX_MIN: f64 = 10.0;
pub const TERRAIN_DEPTH_DIVISOR: f64 = 20.0;
pub const TERRAIN_HEIGHT_SPAN: f64 = 180.0;
pub const TERRAIN_HEIGHT_REFERENCE: f64 = 4500.0;
pub const TERRAIN_INDEX_MAX: f64 = 230.0;

/// Number of automatic levels used when the custom terrain palette can't be built.
pub const FALLBACK_ELEVATION_BINS: usize = 8;

/// Number of entries in a sampled colormap lookup table.
pub const COLORMAP_SIZE: usize = 256;

/// Metres to kilometres, applied to horizontal coordinates before plotting.
pub const METRES_TO_KM: f64 = 1e-3;
