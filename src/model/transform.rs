//! Geometric view transform state (zoom, pan, rotation, flip, crop).

use serde::{Deserialize, Serialize};

use super::geometry::{Point, Rect};
use crate::constants::zoom;

/// Image rotation in quarter turns (clockwise on screen).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    pub fn degrees(&self) -> u16 {
        match self {
            Rotation::Deg0 => 0,
            Rotation::Deg90 => 90,
            Rotation::Deg180 => 180,
            Rotation::Deg270 => 270,
        }
    }

    /// The next quarter turn clockwise ((deg + 90) mod 360).
    pub fn rotated_cw(&self) -> Rotation {
        match self {
            Rotation::Deg0 => Rotation::Deg90,
            Rotation::Deg90 => Rotation::Deg180,
            Rotation::Deg180 => Rotation::Deg270,
            Rotation::Deg270 => Rotation::Deg0,
        }
    }

    /// Exact (cos, sin) pair, avoiding trig rounding for right angles.
    pub fn cos_sin(&self) -> (f32, f32) {
        match self {
            Rotation::Deg0 => (1.0, 0.0),
            Rotation::Deg90 => (0.0, 1.0),
            Rotation::Deg180 => (-1.0, 0.0),
            Rotation::Deg270 => (0.0, -1.0),
        }
    }
}

impl From<Rotation> for u16 {
    fn from(rotation: Rotation) -> Self {
        rotation.degrees()
    }
}

impl TryFrom<u16> for Rotation {
    type Error = String;

    fn try_from(degrees: u16) -> Result<Self, Self::Error> {
        match degrees {
            0 => Ok(Rotation::Deg0),
            90 => Ok(Rotation::Deg90),
            180 => Ok(Rotation::Deg180),
            270 => Ok(Rotation::Deg270),
            other => Err(format!("rotation must be 0, 90, 180 or 270, got {other}")),
        }
    }
}

/// User-controlled view transform. `scale` is relative to the fit scale the
/// mapper computes from container and image size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransformState {
    pub scale: f32,
    pub position: Point,
    pub rotation: Rotation,
    pub flip_x: bool,
    pub flip_y: bool,
    /// Sub-rectangle of the original image being displayed
    pub source_crop: Option<Rect>,
}

impl Default for TransformState {
    fn default() -> Self {
        Self {
            scale: 1.0,
            position: Point::ORIGIN,
            rotation: Rotation::Deg0,
            flip_x: false,
            flip_y: false,
            source_crop: None,
        }
    }
}

/// A single-field transform update.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum TransformChange {
    Scale(f32),
    Position(Point),
    Rotation(Rotation),
    FlipX(bool),
    FlipY(bool),
}

/// Replace a non-finite or non-positive zoom with 1.0 and clamp into the zoom range.
pub fn sanitize_scale(scale: f32) -> f32 {
    if !scale.is_finite() || scale <= 0.0 {
        log::warn!("Invalid zoom scale {scale}, falling back to 1.0");
        return 1.0;
    }
    scale.clamp(zoom::MIN, zoom::MAX)
}

impl TransformState {
    /// Return a copy with `change` applied. Scale is sanitized and clamped;
    /// a non-finite position is rejected and the current one kept.
    pub fn with_change(&self, change: TransformChange) -> TransformState {
        let mut next = *self;
        match change {
            TransformChange::Scale(s) => next.scale = sanitize_scale(s),
            TransformChange::Position(p) if p.is_finite() => next.position = p,
            TransformChange::Position(p) => {
                log::warn!("Ignoring non-finite pan position {:?}", p);
            }
            TransformChange::Rotation(r) => next.rotation = r,
            TransformChange::FlipX(v) => next.flip_x = v,
            TransformChange::FlipY(v) => next.flip_y = v,
        }
        next
    }

    /// Zoom/pan back to the fitted view, keeping rotation, flips and crop.
    pub fn zoom_reset(&self) -> TransformState {
        TransformState {
            scale: 1.0,
            position: Point::ORIGIN,
            ..*self
        }
    }
}
