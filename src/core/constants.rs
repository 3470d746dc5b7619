//! Engine-wide magic numbers kept in a single place.
//!
//! Interaction delays are deliberately not configurable at runtime.

use std::time::Duration;

/// Lower bound of the projection scale.
pub const MIN_SCALE: f64 = 40.0;

/// Upper bound of the projection scale.
pub const MAX_SCALE: f64 = 2000.0;

/// Default viewport height in pixels.
pub const DEFAULT_VIEWPORT_HEIGHT: f64 = 480.0;

/// The viewport never grows wider than this many pixels.
pub const MAX_VIEWPORT_WIDTH: f64 = 960.0;

/// How long a press must be held before auto-zoom engages.
pub const HOLD_THRESHOLD: Duration = Duration::from_millis(1050);

/// How long a press must be held while zoomed in before the zoom is reset.
pub const RESET_HOLD_THRESHOLD: Duration = Duration::from_millis(750);

/// Interval between auto-zoom steps.
pub const ZOOM_TICK_INTERVAL: Duration = Duration::from_millis(40);

/// Delay between restoring the scale and restoring the center on reset.
pub const RECENTER_DELAY: Duration = Duration::from_millis(500);

/// Multiplier applied to wheel deltas and zoom steps.
pub const ZOOM_UNIT: f64 = 22.0;

/// Scale added by each auto-zoom step.
pub const AUTO_ZOOM_STEP: f64 = 3.0 * ZOOM_UNIT;

/// Scale added by a double activation at the baseline scale.
pub const DOUBLE_ACTIVATION_STEP: f64 = 1000.0;

/// Degrees spanned horizontally by `scale·π` pixels.
pub const HORIZONTAL_GRADE_DIVISOR: f64 = 180.0;

/// Degrees spanned vertically by `scale·π` pixels. Smaller than the horizontal
/// divisor: the vertical axis is compressed on commit.
pub const VERTICAL_GRADE_DIVISOR: f64 = 160.0;

/// Marker sizes indexed by mass bucket.
pub const MARKER_SIZES: [f64; 8] = [2.0, 3.0, 4.0, 5.0, 7.0, 9.0, 11.0, 13.0];

/// Added to a bucket size to obtain the marker radius.
pub const MARKER_RADIUS_OFFSET: f64 = 2.0;

/// Radius used for features without a usable mass.
pub const DEFAULT_MARKER_RADIUS: f64 = 4.5;

/// Half length of the center crosshair arms, in pixels.
pub const CROSSHAIR_ARM: f64 = 10.0;

/// Graticule line spacing in degrees.
pub const GRATICULE_STEP: f64 = 10.0;

/// Sampling step along graticule lines in degrees.
pub const GRATICULE_PRECISION: f64 = 2.5;
