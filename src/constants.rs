//! Shared application-wide constants.
//! Centralizes tweakable values used by the scheduler, renderer and UI.

// Update scheduling
/// Quiet period after the last edit before a preview request is issued (seconds).
pub const DEBOUNCE_SECS: f64 = 0.010;
/// Delay before re-running a cycle that was requested while one was in flight (seconds).
pub const SETTLE_SECS: f64 = 0.050;
/// Longest a preview request may take before it counts as failed (seconds).
pub const PREVIEW_TIMEOUT_SECS: f64 = 15.0;
/// Longest an STL generation request may take (seconds).
pub const GENERATE_TIMEOUT_SECS: f64 = 300.0;
/// Padding difference below which a dimension lock is considered satisfied (mm).
pub const LOCK_TOLERANCE: f64 = 1e-5;

// Measurement overlay
/// Maximum deviation from the spacing parameter for a pillar pair to be annotated (mm).
pub const SPACING_MATCH_TOLERANCE: f64 = 0.01;
/// Paddings with a smaller magnitude are not annotated (mm).
pub const MIN_ANNOTATED_PADDING: f64 = 0.001;
/// Angle of dimension-line arrowheads relative to the line (degrees).
pub const ARROW_ANGLE_DEG: f64 = 30.0;
/// Direction of the pillar radius indicator (degrees, screen space).
pub const PILLAR_RADIUS_ANGLE_DEG: f64 = -45.0;
/// Direction of the hole radius indicator (degrees, screen space).
pub const HOLE_RADIUS_ANGLE_DEG: f64 = 135.0;

// Preview layers
/// Wall band fill.
pub const WALL_FILL: [u8; 4] = [100, 100, 100, 51];
/// Wall band outline.
pub const WALL_STROKE: [u8; 4] = [102, 102, 102, 255];
/// Inner floor outline.
pub const FLOOR_STROKE: [u8; 4] = [153, 153, 153, 255];
/// Hole disk fill.
pub const HOLE_FILL: [u8; 4] = [255, 100, 100, 128];
/// Pillar disk fill.
pub const PILLAR_FILL: [u8; 4] = [50, 120, 200, 179];
/// Wall outline width (px).
pub const WALL_STROKE_WIDTH: f32 = 1.0;
/// Floor outline width (px).
pub const FLOOR_STROKE_WIDTH: f32 = 2.0;

// Side profile
/// Pillar block fill.
pub const PROFILE_PILLAR_FILL: [u8; 4] = [50, 120, 200, 128];
/// Pillar block outline.
pub const PROFILE_PILLAR_STROKE: [u8; 4] = [53, 122, 189, 255];
/// Floor block outline and hatching.
pub const PROFILE_FLOOR_STROKE: [u8; 4] = [102, 102, 102, 255];
/// Ground line.
pub const PROFILE_GROUND_STROKE: [u8; 4] = [51, 51, 51, 255];
/// Side profile canvas width (px).
pub const PROFILE_WIDTH: f32 = 380.0;
/// Side profile canvas height (px).
pub const PROFILE_HEIGHT: f32 = 360.0;
/// Drawable height the stacked floor and pillar are scaled into (px).
pub const PROFILE_DRAW_HEIGHT: f64 = 300.0;
/// Left edge of the floor block (px).
pub const PROFILE_FLOOR_X: f32 = 60.0;
/// Width of the floor block (px).
pub const PROFILE_FLOOR_WIDTH: f32 = 140.0;
/// Width of the pillar block (px).
pub const PROFILE_PILLAR_WIDTH: f32 = 50.0;
/// Spacing of the floor hatch lines (px).
pub const PROFILE_HATCH_STEP: f32 = 4.0;
/// Floor hatch colour.
pub const PROFILE_HATCH_STROKE: [u8; 4] = [153, 153, 153, 255];
/// Caption colour.
pub const PROFILE_CAPTION: [u8; 4] = [102, 102, 102, 255];
/// Stroke width of the profile dimension lines (px).
pub const PROFILE_DIMENSION_WIDTH: f32 = 2.0;
/// Font size of the profile labels (px).
pub const PROFILE_FONT_SIZE: f32 = 10.0;
/// Backdrop behind the side profile when composed over the preview.
pub const PROFILE_BACKDROP: [u8; 4] = [255, 255, 255, 235];
/// Outline of the side profile backdrop.
pub const PROFILE_BACKDROP_STROKE: [u8; 4] = [200, 200, 200, 255];
/// Gap between the side profile and the preview edges (px).
pub const PROFILE_MARGIN: f32 = 10.0;

// Application shell
/// Initial preview zoom factor.
pub const DEFAULT_ZOOM: f32 = 0.85;
/// How long a success message stays on the status line (seconds).
pub const STATUS_SUCCESS_SECS: f64 = 3.0;
/// How long an error or generation message stays on the status line (seconds).
pub const STATUS_ERROR_SECS: f64 = 5.0;
/// Status text shown while a preview cycle is active.
pub const UPDATING_STATUS: &str = "⟳ Updating preview...";
/// Default base URL of the geometry service.
pub const DEFAULT_SERVICE_URL: &str = "http://localhost:5000";
