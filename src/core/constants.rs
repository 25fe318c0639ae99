//! Engine-wide magic numbers for the geofence, geolocation and filter subsystems.
//! Keeping them in a single place makes it easier to tweak behaviour per deployment.

use std::time::Duration;

/// Radius around the user within which points of interest get a distance marker.
pub const DISTANCE_MARKER_RADIUS_M: f64 = 25.0;

/// Camera only follows the user when the fix moved further than this from the
/// current camera center. Filters GPS noise.
pub const CAMERA_FOLLOW_THRESHOLD_M: f64 = 50.0;

/// Segments used for the boundary ring and the search radius rings.
pub const CIRCLE_SEGMENTS: usize = 64;

/// Resting opacity of the boundary fill when shown.
pub const BOUNDARY_FILL_OPACITY: f64 = 0.03;

/// Fill opacity while the boundary prompt highlights the area.
pub const BOUNDARY_HIGHLIGHT_OPACITY: f64 = 0.05;

/// Resting and highlighted width of the boundary outline.
pub const BOUNDARY_LINE_WIDTH: f64 = 2.0;
pub const BOUNDARY_HIGHLIGHT_LINE_WIDTH: f64 = 3.0;

/// Time the fill opacity ramp takes to go between 0 and the resting opacity.
/// Six 0.005 steps at 60 Hz.
pub const BOUNDARY_FADE_DURATION: Duration = Duration::from_millis(100);

/// How long the prompt highlight stays before resetting.
pub const BOUNDARY_HIGHLIGHT_DURATION: Duration = Duration::from_millis(2000);

/// Delay before the boundary hides after the prompt is acknowledged.
pub const PROMPT_HIDE_BOUNDARY_DELAY: Duration = Duration::from_millis(200);

/// Settle delay before a dismissed prompt is removed, matching its exit animation.
pub const PROMPT_SETTLE_DELAY: Duration = Duration::from_millis(600);

/// Lifetime of a geolocation error notification.
pub const NOTIFICATION_LIFETIME: Duration = Duration::from_millis(5000);

/// Source and layer ids owned by the boundary gate.
pub const BOUNDARY_SOURCE_ID: &str = "boundary-circle";
pub const BOUNDARY_FILL_LAYER_ID: &str = "boundary-fill";
pub const BOUNDARY_LINE_LAYER_ID: &str = "boundary-line";
pub const BOUNDARY_LABEL_LAYER_ID: &str = "boundary-label";
pub const BOUNDARY_COLOR: &str = "#4B83F2";

/// Sources showing the rings around the user position.
pub const SEARCH_RADIUS_SOURCE_ID: &str = "search-radius";
pub const SEARCH_RADIUS_OUTER_SOURCE_ID: &str = "search-radius-outer";

/// Layer carrying the georeferenced 3D models.
pub const MODELS_LAYER_ID: &str = "3d-models";

/// Storage keys.
pub const FILTER_STORAGE_KEY: &str = "heerlenActiveFilters";
pub const PERFORMANCE_STORAGE_KEY: &str = "heerlen_map_performance";
pub const LEGACY_3D_ENABLED_KEY: &str = "heerlen_map_3d_enabled";
pub const LEGACY_TOOLTIP_SHOWN_KEY: &str = "performance_tooltip_shown";

/// Feature property holding the marker category.
pub const CATEGORY_PROPERTY: &str = "category";

/// Camera zoom used for the first accepted fix.
pub const FIRST_FIX_ZOOM: f64 = 17.5;

/// Camera zoom when showing the whole boundary.
pub const BOUNDARY_OVERVIEW_ZOOM: f64 = 14.0;
