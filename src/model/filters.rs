//! Non-destructive image filter state (brightness/contrast/invert).

use serde::{Deserialize, Serialize};

use crate::constants::filter;

/// Filter values applied by the renderer on top of the source bitmap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FilterState {
    /// Brightness adjustment in [-100, 100]
    pub brightness: i32,
    /// Contrast adjustment in [-100, 100]
    pub contrast: i32,
    pub invert: bool,
}

/// A single-field filter update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "filter", content = "value", rename_all = "snake_case")]
pub enum FilterChange {
    Brightness(i32),
    Contrast(i32),
    Invert(bool),
}

/// Filter values converted to the units a canvas renderer expects.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RenderFilter {
    /// Brightness as a -1.0..=1.0 offset
    pub brightness: f32,
    /// Contrast passed through unchanged (-100..=100)
    pub contrast: f32,
    pub invert: bool,
    /// False when every filter is neutral and the renderer can skip filtering
    pub needs_filter: bool,
}

impl FilterState {
    /// Return a copy with `change` applied, clamping slider values into range.
    pub fn with_change(&self, change: FilterChange) -> FilterState {
        let mut next = *self;
        match change {
            FilterChange::Brightness(v) => next.brightness = v.clamp(filter::MIN, filter::MAX),
            FilterChange::Contrast(v) => next.contrast = v.clamp(filter::MIN, filter::MAX),
            FilterChange::Invert(v) => next.invert = v,
        }
        next
    }

    /// Whether all filters are at their neutral values.
    pub fn is_neutral(&self) -> bool {
        *self == FilterState::default()
    }

    pub fn render_params(&self) -> RenderFilter {
        RenderFilter {
            brightness: self.brightness as f32 / 100.0,
            contrast: self.contrast as f32,
            invert: self.invert,
            needs_filter: !self.is_neutral(),
        }
    }
}
