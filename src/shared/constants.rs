/// Default page size for pagination
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Maximum page size allowed
pub const MAX_PAGE_SIZE: i64 = 100;

// =============================================================================
// PROXIMITY QUERY DEFAULTS
// =============================================================================

/// Search radius used when a nearest query omits `maxDistance` (10 km)
pub const DEFAULT_NEAREST_MAX_DISTANCE_METERS: f64 = 10_000.0;

/// Result count used when a nearest query omits `limit`
pub const DEFAULT_NEAREST_LIMIT: usize = 10;

/// Largest `limit` the HTTP endpoints accept unless overridden by config
pub const DEFAULT_NEAREST_MAX_LIMIT: usize = 100;
