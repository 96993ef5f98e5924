//! Global constants for the annotation engine.

use crate::model::Color;

/// Zoom limits and step factors.
pub mod zoom {
    /// Minimum user zoom (relative to the fit scale)
    pub const MIN: f32 = 0.1;
    /// Maximum user zoom (relative to the fit scale)
    pub const MAX: f32 = 10.0;
    /// Multiplier for a single zoom-in/zoom-out button press
    pub const STEP_FACTOR: f32 = 1.2;
    /// Multiplier for a single mouse wheel notch
    pub const WHEEL_FACTOR: f32 = 1.1;
    /// Scale changes smaller than this are ignored by wheel zoom
    pub const MIN_CHANGE: f32 = 0.0001;
}

/// Fit-to-container padding factor (the image fills 98% of the limiting side).
pub const FIT_PADDING: f32 = 0.98;

/// Maximum number of undo snapshots kept.
pub const DEFAULT_UNDO_DEPTH: usize = 20;

/// Smallest crop rectangle side (in image pixels) accepted from a pointer drag.
pub const CROP_MIN_SIZE: f32 = 5.0;

/// Brightness/contrast slider bounds.
pub mod filter {
    pub const MIN: i32 = -100;
    pub const MAX: i32 = 100;
}

/// Freehand stroke width bounds.
pub mod freehand {
    pub const MIN_WIDTH: f32 = 1.0;
    pub const MAX_WIDTH: f32 = 20.0;
    pub const DEFAULT_WIDTH: f32 = 3.0;
}

/// Text label font size bounds.
pub mod text {
    pub const MIN_FONT_SIZE: f32 = 8.0;
    pub const MAX_FONT_SIZE: f32 = 72.0;
    pub const DEFAULT_FONT_SIZE: f32 = 16.0;
}

/// Fixed highlighter style (semi-transparent yellow marker).
pub const HIGHLIGHT_COLOR: Color = Color::rgba(255, 255, 0, 128);
pub const HIGHLIGHT_WIDTH: f32 = 20.0;

/// Fixed measurement line style.
pub const MEASUREMENT_COLOR: Color = Color::rgb(0, 255, 0);
pub const MEASUREMENT_WIDTH: f32 = 2.0;

/// Vertical offset of a measurement label above the line midpoint.
pub const MEASUREMENT_LABEL_OFFSET: f32 = 10.0;

/// Default freehand pen color.
pub const DEFAULT_FREEHAND_COLOR: Color = Color::rgb(255, 0, 0);

/// Default text label color.
pub const DEFAULT_TEXT_COLOR: Color = Color::rgb(255, 255, 255);
