//! Annotation tool types and data structures.

use serde::{Deserialize, Serialize};

use super::color::Color;
use super::geometry::Point;
use crate::constants::{self, freehand, text};

/// Unique identifier for an annotation, stable for the session.
pub type AnnotationId = u64;

/// Minimum number of coordinates (two points) for a freehand/highlight stroke.
pub const MIN_PATH_COORDS: usize = 4;

/// Number of coordinates in a measurement line (two endpoints).
pub const MEASUREMENT_COORDS: usize = 4;

/// Annotation tools available in the toolbar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnotationTool {
    /// Freehand pen with user-configurable color and width
    Freehand,
    /// Semi-transparent highlighter
    Highlight,
    /// Distance measurement line
    Measurement,
    /// Text label placed with a click
    Text,
}

impl AnnotationTool {
    /// Get the display name for this tool.
    pub fn name(&self) -> &'static str {
        match self {
            AnnotationTool::Freehand => "Draw Freehand",
            AnnotationTool::Highlight => "Highlight Area",
            AnnotationTool::Measurement => "Measure Distance",
            AnnotationTool::Text => "Add Text",
        }
    }

    /// Get all available annotation tools.
    pub fn all() -> &'static [AnnotationTool] {
        &[
            AnnotationTool::Freehand,
            AnnotationTool::Highlight,
            AnnotationTool::Measurement,
            AnnotationTool::Text,
        ]
    }

    /// The path kind drawn by this tool, `None` for click-placed tools.
    pub fn path_kind(&self) -> Option<PathKind> {
        match self {
            AnnotationTool::Freehand => Some(PathKind::Freehand),
            AnnotationTool::Highlight => Some(PathKind::Highlight),
            AnnotationTool::Measurement => Some(PathKind::Measurement),
            AnnotationTool::Text => None,
        }
    }
}

/// Annotation types built from a pointer drag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathKind {
    Freehand,
    Highlight,
    Measurement,
}

/// A stroked polyline. `points` is a flat `[x0, y0, x1, y1, ...]` list in model space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathStroke {
    pub points: Vec<f32>,
    pub color: Color,
    pub stroke_width: f32,
}

/// A two-point distance measurement with its precomputed label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub points: [f32; MEASUREMENT_COORDS],
    pub color: Color,
    pub stroke_width: f32,
    /// Formatted distance, e.g. "12.4 mm"
    pub text: String,
    pub text_position: Point,
}

/// A free text label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextLabel {
    pub text: String,
    pub position: Point,
    pub color: Color,
    pub font_size: f32,
}

/// Shape and style of an annotation, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnnotationBody {
    Freehand(PathStroke),
    Highlight(PathStroke),
    Measurement(Measurement),
    Text(TextLabel),
}

impl AnnotationBody {
    /// The `type` tag as it appears in serialized form.
    pub fn kind(&self) -> &'static str {
        match self {
            AnnotationBody::Freehand(_) => "freehand",
            AnnotationBody::Highlight(_) => "highlight",
            AnnotationBody::Measurement(_) => "measurement",
            AnnotationBody::Text(_) => "text",
        }
    }
}

/// A user-drawn annotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub id: AnnotationId,
    #[serde(flatten)]
    pub body: AnnotationBody,
}

impl Annotation {
    pub fn new(id: AnnotationId, body: AnnotationBody) -> Self {
        Self { id, body }
    }
}

/// Errors from applying an [`AnnotationPatch`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PatchError {
    /// The patch sets a field the annotation type does not have
    #[error("Field '{field}' does not exist on {kind} annotations")]
    FieldNotApplicable {
        field: &'static str,
        kind: &'static str,
    },

    /// Point list has the wrong shape for the annotation type
    #[error("Invalid point list for {kind} annotation: {len} coordinates")]
    InvalidPoints { kind: &'static str, len: usize },

    /// Width or font size that is not a finite positive number
    #[error("Invalid {field} for {kind} annotation: {value}")]
    InvalidSize {
        field: &'static str,
        kind: &'static str,
        value: f32,
    },

    /// Anchor position with a non-finite coordinate
    #[error("Invalid {field} for {kind} annotation")]
    InvalidPosition {
        field: &'static str,
        kind: &'static str,
    },

    /// Text labels must contain something other than whitespace
    #[error("Annotation text cannot be empty")]
    EmptyText,
}

/// Partial update of an annotation. The `id` and `type` cannot be patched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnotationPatch {
    pub points: Option<Vec<f32>>,
    pub color: Option<Color>,
    pub stroke_width: Option<f32>,
    pub text: Option<String>,
    pub position: Option<Point>,
    pub text_position: Option<Point>,
    pub font_size: Option<f32>,
}

impl AnnotationPatch {
    /// Apply to a body, producing the updated body of the same type.
    pub fn apply(&self, body: &AnnotationBody) -> Result<AnnotationBody, PatchError> {
        let kind = body.kind();

        match body {
            AnnotationBody::Freehand(stroke) | AnnotationBody::Highlight(stroke) => {
                self.ensure_only(&["points", "color", "stroke_width"], kind)?;
                let mut stroke = stroke.clone();
                if let Some(points) = &self.points {
                    if points.len() < MIN_PATH_COORDS || points.len() % 2 != 0 {
                        return Err(invalid_points(kind, points));
                    }
                    stroke.points = finite_points(kind, points)?.to_vec();
                }
                if let Some(color) = self.color {
                    stroke.color = color;
                }
                if let Some(width) = self.stroke_width {
                    stroke.stroke_width = positive_size("stroke_width", kind, width)?;
                }
                Ok(match body {
                    AnnotationBody::Highlight(_) => AnnotationBody::Highlight(stroke),
                    _ => AnnotationBody::Freehand(stroke),
                })
            }
            AnnotationBody::Measurement(m) => {
                self.ensure_only(
                    &["points", "color", "stroke_width", "text", "text_position"],
                    kind,
                )?;
                let mut m = m.clone();
                if let Some(points) = &self.points {
                    let endpoints: [f32; MEASUREMENT_COORDS] = finite_points(kind, points)?
                        .try_into()
                        .map_err(|_| invalid_points(kind, points))?;
                    if endpoints[..2] == endpoints[2..] {
                        return Err(invalid_points(kind, points));
                    }
                    m.points = endpoints;
                }
                if let Some(color) = self.color {
                    m.color = color;
                }
                if let Some(width) = self.stroke_width {
                    m.stroke_width = positive_size("stroke_width", kind, width)?;
                }
                if let Some(text) = &self.text {
                    m.text = text.clone();
                }
                if let Some(pos) = self.text_position {
                    m.text_position = finite_position("text_position", kind, pos)?;
                }
                Ok(AnnotationBody::Measurement(m))
            }
            AnnotationBody::Text(label) => {
                self.ensure_only(&["text", "position", "color", "font_size"], kind)?;
                let mut label = label.clone();
                if let Some(text) = &self.text {
                    if text.trim().is_empty() {
                        return Err(PatchError::EmptyText);
                    }
                    label.text = text.clone();
                }
                if let Some(pos) = self.position {
                    label.position = finite_position("position", kind, pos)?;
                }
                if let Some(color) = self.color {
                    label.color = color;
                }
                if let Some(size) = self.font_size {
                    label.font_size = positive_size("font_size", kind, size)?;
                }
                Ok(AnnotationBody::Text(label))
            }
        }
    }

    /// Names of the fields this patch sets.
    fn set_fields(&self) -> impl Iterator<Item = &'static str> {
        [
            ("points", self.points.is_some()),
            ("color", self.color.is_some()),
            ("stroke_width", self.stroke_width.is_some()),
            ("text", self.text.is_some()),
            ("position", self.position.is_some()),
            ("text_position", self.text_position.is_some()),
            ("font_size", self.font_size.is_some()),
        ]
        .into_iter()
        .filter_map(|(field, set)| set.then_some(field))
    }

    fn ensure_only(&self, allowed: &[&str], kind: &'static str) -> Result<(), PatchError> {
        match self.set_fields().find(|field| !allowed.contains(field)) {
            Some(field) => Err(PatchError::FieldNotApplicable { field, kind }),
            None => Ok(()),
        }
    }
}

fn invalid_points(kind: &'static str, points: &[f32]) -> PatchError {
    PatchError::InvalidPoints {
        kind,
        len: points.len(),
    }
}

fn finite_points<'a>(kind: &'static str, points: &'a [f32]) -> Result<&'a [f32], PatchError> {
    if points.iter().all(|v| v.is_finite()) {
        Ok(points)
    } else {
        Err(invalid_points(kind, points))
    }
}

fn positive_size(field: &'static str, kind: &'static str, value: f32) -> Result<f32, PatchError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(PatchError::InvalidSize { field, kind, value })
    }
}

fn finite_position(
    field: &'static str,
    kind: &'static str,
    position: Point,
) -> Result<Point, PatchError> {
    if position.is_finite() {
        Ok(position)
    } else {
        Err(PatchError::InvalidPosition { field, kind })
    }
}

/// Per-tool style state used when finishing annotations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ToolStyles {
    pub freehand_color: Color,
    pub freehand_width: f32,
    pub text_color: Color,
    pub text_font_size: f32,
}

impl Default for ToolStyles {
    fn default() -> Self {
        Self {
            freehand_color: constants::DEFAULT_FREEHAND_COLOR,
            freehand_width: freehand::DEFAULT_WIDTH,
            text_color: constants::DEFAULT_TEXT_COLOR,
            text_font_size: text::DEFAULT_FONT_SIZE,
        }
    }
}

impl ToolStyles {
    pub fn set_freehand_width(&mut self, width: f32) {
        if width.is_finite() {
            self.freehand_width = width.clamp(freehand::MIN_WIDTH, freehand::MAX_WIDTH);
        }
    }

    pub fn set_text_font_size(&mut self, size: f32) {
        if size.is_finite() {
            self.text_font_size = size.clamp(text::MIN_FONT_SIZE, text::MAX_FONT_SIZE);
        }
    }

    /// Stroke color and width for a path kind. Highlight and measurement
    /// styles are fixed; freehand follows the user's pen settings.
    pub fn stroke_for(&self, kind: PathKind) -> (Color, f32) {
        match kind {
            PathKind::Freehand => (self.freehand_color, self.freehand_width),
            PathKind::Highlight => (constants::HIGHLIGHT_COLOR, constants::HIGHLIGHT_WIDTH),
            PathKind::Measurement => (constants::MEASUREMENT_COLOR, constants::MEASUREMENT_WIDTH),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stroke() -> AnnotationBody {
        AnnotationBody::Freehand(PathStroke {
            points: vec![0.0, 0.0, 10.0, 10.0],
            color: Color::rgb(255, 0, 0),
            stroke_width: 3.0,
        })
    }

    fn label() -> AnnotationBody {
        AnnotationBody::Text(TextLabel {
            text: "Fracture".to_string(),
            position: Point::new(5.0, 5.0),
            color: Color::rgb(255, 255, 255),
            font_size: 16.0,
        })
    }

    #[test]
    fn test_patch_keeps_type() {
        let patch = AnnotationPatch {
            color: Some(Color::rgb(0, 0, 255)),
            ..Default::default()
        };
        let updated = patch.apply(&stroke()).unwrap();
        assert_eq!(updated.kind(), "freehand");
        match updated {
            AnnotationBody::Freehand(s) => assert_eq!(s.color, Color::rgb(0, 0, 255)),
            other => panic!("unexpected body {other:?}"),
        }
    }

    #[test]
    fn test_patch_rejects_foreign_fields() {
        let patch = AnnotationPatch {
            font_size: Some(20.0),
            ..Default::default()
        };
        assert_eq!(
            patch.apply(&stroke()),
            Err(PatchError::FieldNotApplicable {
                field: "font_size",
                kind: "freehand"
            })
        );

        let patch = AnnotationPatch {
            points: Some(vec![1.0, 2.0, 3.0, 4.0]),
            ..Default::default()
        };
        assert!(patch.apply(&label()).is_err());
    }

    #[test]
    fn test_patch_validates_points_and_text() {
        let odd = AnnotationPatch {
            points: Some(vec![1.0, 2.0, 3.0]),
            ..Default::default()
        };
        assert!(matches!(
            odd.apply(&stroke()),
            Err(PatchError::InvalidPoints { len: 3, .. })
        ));

        let blank = AnnotationPatch {
            text: Some("   ".to_string()),
            ..Default::default()
        };
        assert_eq!(blank.apply(&label()), Err(PatchError::EmptyText));
    }

    #[test]
    fn test_patch_rejects_non_finite_values() {
        let nan_points = AnnotationPatch {
            points: Some(vec![f32::NAN, 0.0, 1.0, 1.0]),
            ..Default::default()
        };
        assert!(matches!(
            nan_points.apply(&stroke()),
            Err(PatchError::InvalidPoints { len: 4, .. })
        ));

        let negative_width = AnnotationPatch {
            stroke_width: Some(-7.0),
            ..Default::default()
        };
        assert!(matches!(
            negative_width.apply(&stroke()),
            Err(PatchError::InvalidSize {
                field: "stroke_width",
                ..
            })
        ));

        let nan_font = AnnotationPatch {
            font_size: Some(f32::NAN),
            ..Default::default()
        };
        assert!(matches!(
            nan_font.apply(&label()),
            Err(PatchError::InvalidSize {
                field: "font_size",
                ..
            })
        ));

        let moved_to_infinity = AnnotationPatch {
            position: Some(Point::new(f32::INFINITY, 0.0)),
            ..Default::default()
        };
        assert_eq!(
            moved_to_infinity.apply(&label()),
            Err(PatchError::InvalidPosition {
                field: "position",
                kind: "text"
            })
        );
    }

    #[test]
    fn test_annotation_json_is_tagged_by_type() {
        let ann = Annotation::new(7, label());
        let json = serde_json::to_value(&ann).unwrap();
        assert_eq!(json["type"], "text");
        assert_eq!(json["id"], 7);
        assert_eq!(json["text"], "Fracture");

        let back: Annotation = serde_json::from_value(json).unwrap();
        assert_eq!(back, ann);
    }

    #[test]
    fn test_tool_styles_clamp() {
        let mut styles = ToolStyles::default();
        styles.set_freehand_width(50.0);
        styles.set_text_font_size(2.0);
        assert_eq!(styles.freehand_width, freehand::MAX_WIDTH);
        assert_eq!(styles.text_font_size, text::MIN_FONT_SIZE);
        assert_eq!(
            styles.stroke_for(PathKind::Highlight),
            (constants::HIGHLIGHT_COLOR, constants::HIGHLIGHT_WIDTH)
        );
    }
}
