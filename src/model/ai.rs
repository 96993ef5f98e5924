//! Machine-generated detection results shown as a read-only overlay.

use serde::{Deserialize, Serialize};

use super::color::Color;
use super::geometry::{Point, Rect};

/// Identifier assigned to a detection box on receipt.
pub type DetectionId = u64;

/// A detection box as returned by the inference service, in original-image pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionInput {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    pub label: String,
    #[serde(default)]
    pub confidence: Option<f32>,
}

/// Result of an analysis request. Only detection is produced today.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model_type", rename_all = "snake_case")]
pub enum AiAnalysis {
    Detection { boxes: Vec<DetectionInput> },
}

/// A received detection box with its local visibility flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiDetectionBox {
    pub id: DetectionId,
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    pub label: String,
    pub confidence: Option<f32>,
    pub visible: bool,
}

impl AiDetectionBox {
    /// Wrap a service result; new boxes start visible.
    pub fn from_input(id: DetectionId, input: DetectionInput) -> Self {
        Self {
            id,
            x1: input.x1,
            y1: input.y1,
            x2: input.x2,
            y2: input.y2,
            label: input.label,
            confidence: input.confidence,
            visible: true,
        }
    }

    /// Normalized box rectangle.
    pub fn rect(&self) -> Rect {
        Rect::from_corners(Point::new(self.x1, self.y1), Point::new(self.x2, self.y2))
    }

    /// Label with the confidence as a whole percentage, e.g. "cavity (87%)".
    pub fn display_label(&self) -> String {
        match self.confidence {
            Some(c) if c > 0.0 => format!("{} ({:.0}%)", self.label, c * 100.0),
            _ => self.label.clone(),
        }
    }

    /// Overlay stroke color for this box's label.
    pub fn color(&self) -> Color {
        label_color(&self.label)
    }
}

/// Known finding labels get a dedicated color; everything else is green.
pub fn label_color(label: &str) -> Color {
    match label.to_ascii_lowercase().as_str() {
        "cavity" => Color::rgba(245, 158, 11, 230),
        "pa" => Color::rgba(168, 85, 247, 230),
        _ => Color::rgba(0, 255, 0, 230),
    }
}
