//! Annotation storage and the in-progress drawing session.
//!
//! This module provides:
//! - `AnnotationStore`: the ordered collection of user-drawn annotations
//! - `DrawingSession`: the transient point buffer of a path gesture
//! - Conversion of a finished gesture into an annotation body, including the
//!   measurement distance formula

use crate::constants::MEASUREMENT_LABEL_OFFSET;
use crate::model::{
    Annotation, AnnotationBody, AnnotationId, MEASUREMENT_COORDS, MIN_PATH_COORDS, Measurement,
    PathKind, PathStroke, Point, ToolStyles,
};

// ============================================================================
// Annotation Store
// ============================================================================

/// Storage for annotations on the loaded image, in drawing order.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationStore {
    annotations: Vec<Annotation>,
    /// Counter for generating unique annotation IDs.
    next_id: AnnotationId,
}

impl Default for AnnotationStore {
    fn default() -> Self {
        Self {
            annotations: Vec::new(),
            next_id: 1,
        }
    }
}

impl AnnotationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an annotation and return its ID.
    pub fn add(&mut self, body: AnnotationBody) -> AnnotationId {
        let id = self.next_id;
        self.next_id += 1;
        self.annotations.push(Annotation::new(id, body));
        id
    }

    /// Get an annotation by ID.
    pub fn get(&self, id: AnnotationId) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.id == id)
    }

    pub fn contains(&self, id: AnnotationId) -> bool {
        self.get(id).is_some()
    }

    /// Swap in a new body for an existing annotation. Returns false if the ID is unknown.
    pub fn replace_body(&mut self, id: AnnotationId, body: AnnotationBody) -> bool {
        match self.annotations.iter_mut().find(|a| a.id == id) {
            Some(ann) => {
                ann.body = body;
                true
            }
            None => false,
        }
    }

    /// Remove an annotation by ID.
    pub fn remove(&mut self, id: AnnotationId) -> Option<Annotation> {
        let index = self.annotations.iter().position(|a| a.id == id)?;
        Some(self.annotations.remove(index))
    }

    /// Get all annotations.
    pub fn iter(&self) -> impl Iterator<Item = &Annotation> {
        self.annotations.iter()
    }

    pub fn as_slice(&self) -> &[Annotation] {
        &self.annotations
    }

    pub fn to_vec(&self) -> Vec<Annotation> {
        self.annotations.clone()
    }

    /// Replace the whole collection (used by undo). The ID counter is kept.
    pub fn replace_all(&mut self, annotations: Vec<Annotation>) {
        self.annotations = annotations;
    }

    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    /// Clear all annotations.
    pub fn clear(&mut self) {
        self.annotations.clear();
    }
}

// ============================================================================
// Drawing Session
// ============================================================================

/// Points collected during the current path gesture. Never part of undo.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrawingSession {
    is_drawing: bool,
    /// Flat `[x0, y0, x1, y1, ...]` model-space coordinates
    points: Vec<f32>,
}

impl DrawingSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new gesture at a single point, discarding any previous one.
    pub fn start(&mut self, point: Point) {
        self.points.clear();
        self.points.extend([point.x, point.y]);
        self.is_drawing = true;
    }

    /// Append a point while drawing. Returns false (and ignores the point)
    /// when no gesture is active or the point is not finite.
    pub fn add_point(&mut self, point: Point) -> bool {
        if !self.is_drawing || !point.is_finite() {
            return false;
        }
        self.points.extend([point.x, point.y]);
        true
    }

    /// End the gesture and hand back its points.
    pub fn finish(&mut self) -> Vec<f32> {
        self.is_drawing = false;
        std::mem::take(&mut self.points)
    }

    /// Cancel the current drawing.
    pub fn cancel(&mut self) {
        self.points.clear();
        self.is_drawing = false;
    }

    pub fn is_drawing(&self) -> bool {
        self.is_drawing
    }

    pub fn points(&self) -> &[f32] {
        &self.points
    }
}

// ============================================================================
// Gesture -> Annotation
// ============================================================================

/// Distance between two model points, in millimetres when pixel spacing
/// `[row, column]` is known, otherwise in pixels.
///
/// Row spacing scales the vertical component, column spacing the horizontal one.
/// Spacing that is not finite and positive is ignored.
pub fn measure_distance(
    start: Point,
    end: Point,
    pixel_spacing: Option<[f32; 2]>,
) -> (f32, &'static str) {
    let dx = end.x - start.x;
    let dy = end.y - start.y;
    let pixel_spacing =
        pixel_spacing.filter(|spacing| spacing.iter().all(|v| v.is_finite() && *v > 0.0));
    match pixel_spacing {
        Some([row, column]) => {
            let (dx, dy) = (dx * column, dy * row);
            ((dx * dx + dy * dy).sqrt(), "mm")
        }
        None => ((dx * dx + dy * dy).sqrt(), "px"),
    }
}

/// Format a distance to one decimal with its unit, e.g. "5.0 px".
pub fn format_distance(distance: f32, unit: &str) -> String {
    format!("{distance:.1} {unit}")
}

/// Distance label and its anchor (above the midpoint) for a measurement line.
pub fn measurement_label(
    endpoints: &[f32; MEASUREMENT_COORDS],
    pixel_spacing: Option<[f32; 2]>,
) -> (String, Point) {
    let [x1, y1, x2, y2] = *endpoints;
    let (distance, unit) = measure_distance(Point::new(x1, y1), Point::new(x2, y2), pixel_spacing);
    let position = Point::new((x1 + x2) / 2.0, (y1 + y2) / 2.0 - MEASUREMENT_LABEL_OFFSET);
    (format_distance(distance, unit), position)
}

/// Build the annotation body for a finished path gesture.
///
/// Returns `None` for degenerate gestures: fewer than two points, or a
/// zero-length measurement.
pub fn build_path_body(
    kind: PathKind,
    points: Vec<f32>,
    styles: &ToolStyles,
    pixel_spacing: Option<[f32; 2]>,
) -> Option<AnnotationBody> {
    if points.len() < MIN_PATH_COORDS || points.len() % 2 != 0 {
        return None;
    }
    let (color, stroke_width) = styles.stroke_for(kind);

    match kind {
        PathKind::Freehand | PathKind::Highlight => {
            let stroke = PathStroke {
                points,
                color,
                stroke_width,
            };
            Some(match kind {
                PathKind::Highlight => AnnotationBody::Highlight(stroke),
                _ => AnnotationBody::Freehand(stroke),
            })
        }
        PathKind::Measurement => {
            let n = points.len();
            let start = Point::new(points[0], points[1]);
            let end = Point::new(points[n - 2], points[n - 1]);
            if start.distance_to(&end) <= 0.0 {
                return None;
            }
            let endpoints: [f32; MEASUREMENT_COORDS] = [start.x, start.y, end.x, end.y];
            let (text, text_position) = measurement_label(&endpoints, pixel_spacing);
            Some(AnnotationBody::Measurement(Measurement {
                points: endpoints,
                color,
                stroke_width,
                text,
                text_position,
            }))
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants;

    fn line(points: &[f32]) -> AnnotationBody {
        build_path_body(
            PathKind::Freehand,
            points.to_vec(),
            &ToolStyles::default(),
            None,
        )
        .unwrap()
    }

    #[test]
    fn test_store_ids_are_unique_and_ordered() {
        let mut store = AnnotationStore::new();
        let a = store.add(line(&[0.0, 0.0, 1.0, 1.0]));
        let b = store.add(line(&[2.0, 2.0, 3.0, 3.0]));
        assert_ne!(a, b);
        assert_eq!(store.iter().map(|x| x.id).collect::<Vec<_>>(), vec![a, b]);

        store.remove(a);
        let c = store.add(line(&[4.0, 4.0, 5.0, 5.0]));
        assert!(c > b);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_replace_all_keeps_id_counter() {
        let mut store = AnnotationStore::new();
        let a = store.add(line(&[0.0, 0.0, 1.0, 1.0]));
        store.replace_all(Vec::new());
        let b = store.add(line(&[0.0, 0.0, 1.0, 1.0]));
        assert_ne!(a, b);
    }

    #[test]
    fn test_session_ignores_points_when_idle() {
        let mut session = DrawingSession::new();
        assert!(!session.add_point(Point::new(1.0, 1.0)));
        assert!(session.points().is_empty());

        session.start(Point::new(0.0, 0.0));
        assert!(session.add_point(Point::new(1.0, 2.0)));
        assert!(!session.add_point(Point::new(f32::NAN, 2.0)));
        assert_eq!(session.points(), &[0.0, 0.0, 1.0, 2.0]);

        session.cancel();
        assert!(!session.is_drawing());
        assert!(!session.add_point(Point::new(3.0, 3.0)));
    }

    #[test]
    fn test_single_point_stroke_is_discarded() {
        let body = build_path_body(
            PathKind::Freehand,
            vec![5.0, 5.0],
            &ToolStyles::default(),
            None,
        );
        assert!(body.is_none());
    }

    #[test]
    fn test_highlight_uses_fixed_style() {
        let mut styles = ToolStyles::default();
        styles.freehand_width = 9.0;
        let body = build_path_body(PathKind::Highlight, vec![0.0, 0.0, 5.0, 5.0], &styles, None);
        match body {
            Some(AnnotationBody::Highlight(s)) => {
                assert_eq!(s.color, constants::HIGHLIGHT_COLOR);
                assert_eq!(s.stroke_width, constants::HIGHLIGHT_WIDTH);
            }
            other => panic!("expected highlight, got {other:?}"),
        }
    }

    #[test]
    fn test_measurement_formula() {
        let (d, unit) = measure_distance(Point::new(0.0, 0.0), Point::new(3.0, 4.0), None);
        assert_eq!(format_distance(d, unit), "5.0 px");

        let (d, unit) =
            measure_distance(Point::new(0.0, 0.0), Point::new(3.0, 4.0), Some([2.0, 2.0]));
        assert_eq!(format_distance(d, unit), "10.0 mm");
    }

    #[test]
    fn test_measurement_spacing_axes() {
        // Column spacing scales dx, row spacing scales dy
        let (d, _) = measure_distance(Point::new(0.0, 0.0), Point::new(10.0, 0.0), Some([1.0, 0.5]));
        assert!((d - 5.0).abs() < 1e-5);
    }

    #[test]
    fn test_unusable_spacing_falls_back_to_pixels() {
        let (a, b) = (Point::new(0.0, 0.0), Point::new(3.0, 4.0));
        for spacing in [[f32::NAN, 1.0], [0.0, 0.0], [1.0, -2.0], [f32::INFINITY, 1.0]] {
            let (d, unit) = measure_distance(a, b, Some(spacing));
            assert_eq!(format_distance(d, unit), "5.0 px");
        }
    }

    #[test]
    fn test_measurement_uses_endpoints() {
        let body = build_path_body(
            PathKind::Measurement,
            vec![0.0, 0.0, 50.0, 80.0, 3.0, 4.0],
            &ToolStyles::default(),
            None,
        );
        match body {
            Some(AnnotationBody::Measurement(m)) => {
                assert_eq!(m.points, [0.0, 0.0, 3.0, 4.0]);
                assert_eq!(m.text, "5.0 px");
                assert_eq!(m.text_position, Point::new(1.5, 2.0 - 10.0));
                assert_eq!(m.color, constants::MEASUREMENT_COLOR);
            }
            other => panic!("expected measurement, got {other:?}"),
        }
    }

    #[test]
    fn test_zero_length_measurement_is_discarded() {
        let body = build_path_body(
            PathKind::Measurement,
            vec![7.0, 7.0, 20.0, 20.0, 7.0, 7.0],
            &ToolStyles::default(),
            None,
        );
        assert!(body.is_none());
    }
}
