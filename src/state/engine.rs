//! The engine facade: owned editing state plus every public operation.
//!
//! All undoable mutations go through `Engine::with_undo`, which captures a
//! snapshot of filters, transform and annotations before running the change.
//! Transient state (drawing session, active tool, panel, AI overlay, styles)
//! lives alongside but is never snapshotted.

use std::fmt;

use crate::ai_overlay::{AiOverlayState, DetectionService};
use crate::annotation::{DrawingSession, build_path_body, measurement_label};
use crate::config::{EngineConfig, ZoomConfig};
use crate::error::{EngineError, InferenceError};
use crate::mapper::CoordinateMapper;
use crate::model::{
    AiAnalysis, Annotation, AnnotationBody, AnnotationId, AnnotationPatch, AnnotationTool, Color,
    DetectionId, FilterChange, FilterState, ImageInfo, PathKind, Point, Rect, Size, TextLabel,
    ToolStyles, TransformChange, TransformState,
};
use crate::panel::ActivePanel;
use crate::undo::{EditState, Snapshot, UndoConfig, UndoHistory};

use super::pointer::CropDrag;

/// Renderer callback producing a data-URL snapshot of the composited view.
pub type CanvasExporter = Box<dyn Fn() -> Option<String>>;

/// Single owner of all annotation, transform and undo state for one image.
pub struct Engine {
    pub(crate) edit: EditState,
    pub(crate) history: UndoHistory,
    pub(crate) session: DrawingSession,
    pub(crate) active_tool: Option<AnnotationTool>,
    pub(crate) active_panel: Option<ActivePanel>,
    pub(crate) show_annotations: bool,
    pub(crate) styles: ToolStyles,
    pub(crate) image: Option<ImageInfo>,
    pub(crate) container: Option<Size>,
    pub(crate) ai: AiOverlayState,
    pub(crate) crop_drag: Option<CropDrag>,
    exporter: Option<CanvasExporter>,
    zoom: ZoomConfig,
    default_styles: ToolStyles,
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("edit", &self.edit)
            .field("undo_depth", &self.history.len())
            .field("session", &self.session)
            .field("active_tool", &self.active_tool)
            .field("active_panel", &self.active_panel)
            .field("image", &self.image)
            .field("container", &self.container)
            .field("has_exporter", &self.exporter.is_some())
            .finish_non_exhaustive()
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    pub fn new() -> Self {
        Self::with_config(&EngineConfig::default())
    }

    /// Create an engine using tool defaults, zoom factors and history depth from `config`.
    pub fn with_config(config: &EngineConfig) -> Self {
        let default_styles = config.tools.to_styles();
        Self {
            edit: EditState::default(),
            history: UndoHistory::with_config(UndoConfig {
                max_depth: config.history.max_depth.max(1),
            }),
            session: DrawingSession::new(),
            active_tool: None,
            active_panel: None,
            show_annotations: true,
            styles: default_styles,
            image: None,
            container: None,
            ai: AiOverlayState::new(),
            crop_drag: None,
            exporter: None,
            zoom: config.zoom.sanitized(),
            default_styles,
        }
    }

    // ========================================================================
    // Undo
    // ========================================================================

    /// Snapshot the editable state, then run `mutate` on it.
    fn with_undo<R>(&mut self, label: &'static str, mutate: impl FnOnce(&mut EditState) -> R) -> R {
        self.history.push(Snapshot::capture(label, &self.edit));
        mutate(&mut self.edit)
    }

    /// Restore the state before the most recent mutation. Also drops any
    /// in-progress gesture and deactivates the tool. Returns false when
    /// there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        let Some(snapshot) = self.history.pop() else {
            log::debug!("Nothing to undo");
            return false;
        };
        snapshot.restore_into(&mut self.edit);
        self.session.cancel();
        self.crop_drag = None;
        self.active_tool = None;
        true
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    /// Label of the action that `undo` would revert.
    pub fn undo_description(&self) -> Option<&'static str> {
        self.history.undo_description()
    }

    pub fn undo_depth(&self) -> usize {
        self.history.len()
    }

    // ========================================================================
    // Session lifecycle
    // ========================================================================

    /// Load a new image and reset every piece of per-image state, including history.
    pub fn load_image(&mut self, image: ImageInfo) -> Result<(), EngineError> {
        if image.width == 0 || image.height == 0 {
            return Err(EngineError::InvalidImage {
                width: image.width,
                height: image.height,
            });
        }
        log::info!(
            "Loaded image '{}' ({}x{})",
            image.id,
            image.width,
            image.height
        );
        self.reset_session();
        self.image = Some(image);
        Ok(())
    }

    /// Unload the image and reset all per-image state.
    pub fn clear_session(&mut self) {
        self.reset_session();
        self.image = None;
        log::info!("Session cleared");
    }

    fn reset_session(&mut self) {
        self.edit = EditState::default();
        self.history.clear();
        self.session.cancel();
        self.crop_drag = None;
        self.active_tool = None;
        self.active_panel = None;
        self.show_annotations = true;
        self.styles = self.default_styles;
        self.ai.clear();
    }

    pub fn image(&self) -> Option<&ImageInfo> {
        self.image.as_ref()
    }

    /// Report the renderer's container size. Not undoable.
    pub fn set_container_size(&mut self, size: Size) {
        if size.is_valid() {
            self.container = Some(size);
        } else {
            log::debug!("Ignoring unusable container size {:?}", size);
            self.container = None;
        }
    }

    pub fn container_size(&self) -> Option<Size> {
        self.container
    }

    // ========================================================================
    // Coordinate mapping
    // ========================================================================

    /// Mapper for the current container, image and transform, if all are usable.
    pub fn mapper(&self) -> Option<CoordinateMapper> {
        let image = self.image.as_ref()?;
        let container = self.container?;
        CoordinateMapper::new(container, image.size(), &self.edit.transform)
    }

    /// Screen position to model space.
    pub fn to_model(&self, screen: Point) -> Option<Point> {
        self.mapper().map(|m| m.to_model(screen))
    }

    /// Model-space position to screen.
    pub fn to_screen(&self, model: Point) -> Option<Point> {
        self.mapper().map(|m| m.to_screen(model))
    }

    // ========================================================================
    // Filters
    // ========================================================================

    pub fn filters(&self) -> &FilterState {
        &self.edit.filters
    }

    /// Apply a filter change. Returns false (and records nothing) when the
    /// clamped value equals the current one.
    pub fn set_filter(&mut self, change: FilterChange) -> bool {
        let next = self.edit.filters.with_change(change);
        if next == self.edit.filters {
            return false;
        }
        self.with_undo("Adjust filters", |s| s.filters = next);
        true
    }

    pub fn toggle_invert(&mut self) {
        self.with_undo("Toggle invert", |s| s.filters.invert = !s.filters.invert);
    }

    pub fn reset_filters(&mut self) {
        self.with_undo("Reset filters", |s| s.filters = FilterState::default());
    }

    // ========================================================================
    // Transform
    // ========================================================================

    pub fn transform(&self) -> &TransformState {
        &self.edit.transform
    }

    /// Replace the transform if it differs, recording one snapshot.
    fn update_transform(&mut self, label: &'static str, next: TransformState) -> bool {
        if next == self.edit.transform {
            return false;
        }
        self.with_undo(label, |s| s.transform = next);
        true
    }

    /// Apply a single-field transform change. Returns false if nothing changed.
    pub fn set_transform(&mut self, change: TransformChange) -> bool {
        let next = self.edit.transform.with_change(change);
        self.update_transform("Change view", next)
    }

    pub fn toggle_flip_x(&mut self) {
        self.with_undo("Flip horizontal", |s| {
            s.transform.flip_x = !s.transform.flip_x
        });
    }

    pub fn toggle_flip_y(&mut self) {
        self.with_undo("Flip vertical", |s| {
            s.transform.flip_y = !s.transform.flip_y
        });
    }

    /// Rotate clockwise by a quarter turn.
    pub fn rotate90(&mut self) {
        self.with_undo("Rotate", |s| {
            s.transform.rotation = s.transform.rotation.rotated_cw()
        });
        log::debug!("Rotation: {}°", self.edit.transform.rotation.degrees());
    }

    /// Zoom in by the button step factor. Returns false at the upper limit.
    pub fn zoom_in(&mut self) -> bool {
        let scale = self.edit.transform.scale * self.zoom.step_factor;
        self.set_transform(TransformChange::Scale(scale))
    }

    /// Zoom out by the button step factor. Returns false at the lower limit.
    pub fn zoom_out(&mut self) -> bool {
        let scale = self.edit.transform.scale / self.zoom.step_factor;
        self.set_transform(TransformChange::Scale(scale))
    }

    /// Set zoom and pan together with a single snapshot.
    pub fn set_zoom_and_position(&mut self, scale: f32, position: Point) -> bool {
        let next = self
            .edit
            .transform
            .with_change(TransformChange::Scale(scale))
            .with_change(TransformChange::Position(position));
        self.update_transform("Zoom", next)
    }

    /// Wheel zoom keeping the image point under `screen` fixed.
    pub fn zoom_at_pointer(&mut self, screen: Point, zoom_in: bool) -> bool {
        let Some(mapper) = self.mapper() else {
            log::debug!("Wheel zoom ignored: no coordinate mapping");
            return false;
        };
        if !screen.is_finite() {
            return false;
        }
        match mapper.zoom_at_pointer(&self.edit.transform, screen, zoom_in, self.zoom.wheel_factor)
        {
            Some((scale, position)) => self.set_zoom_and_position(scale, position),
            None => false,
        }
    }

    /// Pan by a screen-space delta (end of a drag).
    pub fn pan_by(&mut self, dx: f32, dy: f32) -> bool {
        if !dx.is_finite() || !dy.is_finite() || (dx == 0.0 && dy == 0.0) {
            return false;
        }
        let p = self.edit.transform.position;
        self.set_transform(TransformChange::Position(Point::new(p.x + dx, p.y + dy)))
    }

    /// Fit to screen: reset zoom and pan, keep rotation, flips and crop.
    pub fn reset_zoom_only(&mut self) {
        self.with_undo("Fit to screen", |s| {
            s.transform = s.transform.zoom_reset()
        });
    }

    /// Reset the whole transform, including rotation, flips and crop.
    pub fn reset_transform(&mut self) {
        self.with_undo("Reset transform", |s| {
            s.transform = TransformState::default()
        });
    }

    /// Reset filters and transform in a single undo step.
    pub fn reset_view(&mut self) {
        self.with_undo("Reset view", |s| {
            s.filters = FilterState::default();
            s.transform = TransformState::default();
        });
    }

    // ========================================================================
    // Crop
    // ========================================================================

    pub fn crop_bounds(&self) -> Option<Rect> {
        self.edit.transform.source_crop
    }

    /// Set or clear the source crop. A rectangle is clamped into the image
    /// and snapped to whole pixels; one that ends up empty is discarded.
    /// Returns true if the crop changed.
    pub fn set_crop_bounds(&mut self, bounds: Option<Rect>) -> bool {
        let next = match bounds {
            None => None,
            Some(rect) => {
                let Some(image) = &self.image else {
                    log::debug!("Crop ignored: no image loaded");
                    return false;
                };
                match rect.rounded_within(&image.bounds()) {
                    Some(r) => Some(r),
                    None => {
                        log::debug!("Discarding empty crop {:?}", rect);
                        return false;
                    }
                }
            }
        };
        if next == self.edit.transform.source_crop {
            return false;
        }
        self.with_undo("Crop", |s| s.transform.source_crop = next);
        log::debug!("Crop set to {:?}", next);
        true
    }

    // ========================================================================
    // Tools & panels
    // ========================================================================

    pub fn active_tool(&self) -> Option<AnnotationTool> {
        self.active_tool
    }

    /// Select a tool. Reselecting the active tool turns it off. Any drawing
    /// in progress is discarded, and selecting a tool closes the open panel.
    pub fn set_active_tool(&mut self, tool: Option<AnnotationTool>) {
        self.session.cancel();
        self.active_tool = match tool {
            Some(t) if self.active_tool == Some(t) => None,
            other => other,
        };
        if self.active_tool.is_some() {
            self.close_panel();
        }
        log::debug!(
            "Active tool: {}",
            self.active_tool.map_or("none", |t| t.name())
        );
    }

    pub fn active_panel(&self) -> Option<ActivePanel> {
        self.active_panel
    }

    /// Open `panel`, closing any other, or close it if already open.
    pub fn toggle_panel(&mut self, panel: ActivePanel) {
        self.crop_drag = None;
        self.active_panel = ActivePanel::toggle(self.active_panel, panel);
        if self.active_panel == Some(ActivePanel::Crop) {
            self.session.cancel();
            self.active_tool = None;
        }
        log::debug!(
            "Active panel: {}",
            self.active_panel.map_or("none", |p| p.name())
        );
    }

    pub fn close_panel(&mut self) {
        self.crop_drag = None;
        self.active_panel = None;
    }

    // ========================================================================
    // Tool styles (not undoable)
    // ========================================================================

    pub fn styles(&self) -> &ToolStyles {
        &self.styles
    }

    pub fn set_freehand_color(&mut self, color: Color) {
        self.styles.freehand_color = color;
    }

    pub fn set_freehand_stroke_width(&mut self, width: f32) {
        self.styles.set_freehand_width(width);
    }

    pub fn set_text_color(&mut self, color: Color) {
        self.styles.text_color = color;
    }

    pub fn set_text_font_size(&mut self, size: f32) {
        self.styles.set_text_font_size(size);
    }

    // ========================================================================
    // Drawing session
    // ========================================================================

    pub fn drawing_session(&self) -> &DrawingSession {
        &self.session
    }

    pub fn is_drawing(&self) -> bool {
        self.session.is_drawing()
    }

    /// Begin a path gesture at a model-space point. Only path tools draw.
    pub fn start_drawing(&mut self, point: Point) -> bool {
        if self.active_tool.and_then(|t| t.path_kind()).is_none() {
            log::debug!("start_drawing ignored: no path tool active");
            return false;
        }
        if !point.is_finite() {
            log::debug!("start_drawing ignored: non-finite point");
            return false;
        }
        self.session.start(point);
        true
    }

    /// Extend the current gesture. No-op when not drawing.
    pub fn add_point(&mut self, point: Point) -> bool {
        self.session.add_point(point)
    }

    pub fn cancel_drawing(&mut self) {
        self.session.cancel();
    }

    /// Finish the current gesture as an annotation of `kind`. Degenerate
    /// gestures are discarded and leave the annotations unchanged.
    pub fn finish_path(&mut self, kind: PathKind) -> Option<AnnotationId> {
        if !self.session.is_drawing() {
            return None;
        }
        let points = self.session.finish();
        let spacing = self.image.as_ref().and_then(|i| i.pixel_spacing);
        let Some(body) = build_path_body(kind, points, &self.styles, spacing) else {
            log::debug!("Discarded degenerate {:?} gesture", kind);
            return None;
        };
        let label = match kind {
            PathKind::Freehand => "Draw freehand",
            PathKind::Highlight => "Draw highlight",
            PathKind::Measurement => "Add measurement",
        };
        let id = self.with_undo(label, |s| s.annotations.add(body));
        log::debug!("✏️ Added {:?} annotation {}", kind, id);
        Some(id)
    }

    /// Place a text label. Blank text creates nothing.
    pub fn finish_text(&mut self, text: &str, position: Point) -> Option<AnnotationId> {
        let text = text.trim();
        if text.is_empty() || !position.is_finite() {
            log::debug!("Discarded empty text label");
            return None;
        }
        let body = AnnotationBody::Text(TextLabel {
            text: text.to_string(),
            position,
            color: self.styles.text_color,
            font_size: self.styles.text_font_size,
        });
        let id = self.with_undo("Add text", |s| s.annotations.add(body));
        log::debug!("✏️ Added text annotation {}", id);
        Some(id)
    }

    // ========================================================================
    // Annotation CRUD
    // ========================================================================

    pub fn annotations(&self) -> &[Annotation] {
        self.edit.annotations.as_slice()
    }

    pub fn annotation(&self, id: AnnotationId) -> Option<&Annotation> {
        self.edit.annotations.get(id)
    }

    /// Patch an annotation. Its type never changes.
    pub fn update_annotation(
        &mut self,
        id: AnnotationId,
        patch: &AnnotationPatch,
    ) -> Result<(), EngineError> {
        let current = self
            .edit
            .annotations
            .get(id)
            .ok_or(EngineError::AnnotationNotFound(id))?;
        let mut body = patch.apply(&current.body)?;
        if let AnnotationBody::Measurement(m) = &mut body {
            if patch.points.is_some() {
                let spacing = self.image.as_ref().and_then(|i| i.pixel_spacing);
                let (text, position) = measurement_label(&m.points, spacing);
                if patch.text.is_none() {
                    m.text = text;
                }
                if patch.text_position.is_none() {
                    m.text_position = position;
                }
            }
        }
        if body == current.body {
            log::debug!("Annotation {} unchanged by patch", id);
            return Ok(());
        }
        self.with_undo("Edit annotation", |s| s.annotations.replace_body(id, body));
        Ok(())
    }

    pub fn remove_annotation(&mut self, id: AnnotationId) -> Result<(), EngineError> {
        if !self.edit.annotations.contains(id) {
            return Err(EngineError::AnnotationNotFound(id));
        }
        self.with_undo("Delete annotation", |s| s.annotations.remove(id));
        log::debug!("🗑️ Removed annotation {}", id);
        Ok(())
    }

    /// Remove every annotation. Returns false (no snapshot) if there were none.
    pub fn clear_annotations(&mut self) -> bool {
        if self.edit.annotations.is_empty() {
            return false;
        }
        self.with_undo("Clear annotations", |s| s.annotations.clear());
        true
    }

    pub fn show_annotations(&self) -> bool {
        self.show_annotations
    }

    /// Display toggle only; not undoable.
    pub fn set_show_annotations(&mut self, visible: bool) {
        self.show_annotations = visible;
    }

    // ========================================================================
    // AI overlay (not undoable)
    // ========================================================================

    pub fn ai(&self) -> &AiOverlayState {
        &self.ai
    }

    /// Mark a detection request as started. Returns false without an image.
    pub fn begin_detection(&mut self) -> bool {
        self.ai.begin(self.image.as_ref())
    }

    /// Deliver a detection result. Returns false if no request was in flight.
    pub fn receive_detection(&mut self, result: Result<AiAnalysis, InferenceError>) -> bool {
        self.ai.receive(result)
    }

    /// Run detection synchronously through `service`. Service failures end up
    /// in the overlay's error string; only a missing image is reported here.
    pub fn run_detection(&mut self, service: &dyn DetectionService) -> Result<(), EngineError> {
        if !self.begin_detection() {
            return Err(EngineError::NoImageLoaded);
        }
        let image = self.image.as_ref().ok_or(EngineError::NoImageLoaded)?;
        let result = service.analyze(image);
        self.ai.receive(result);
        Ok(())
    }

    pub fn set_box_visibility(&mut self, id: DetectionId, visible: bool) -> bool {
        self.ai.set_box_visibility(id, visible)
    }

    pub fn set_label_visibility(&mut self, label: &str, visible: bool) -> usize {
        self.ai.set_label_visibility(label, visible)
    }

    pub fn set_all_visibility(&mut self, visible: bool) {
        self.ai.set_all_visibility(visible);
    }

    pub fn clear_detections(&mut self) {
        self.ai.clear();
    }

    // ========================================================================
    // Canvas export
    // ========================================================================

    /// Register (or remove) the renderer's export callback.
    pub fn set_canvas_exporter(&mut self, exporter: Option<CanvasExporter>) {
        self.exporter = exporter;
    }

    pub fn has_canvas_exporter(&self) -> bool {
        self.exporter.is_some()
    }

    /// Data URL of the current view, if an exporter is registered and succeeds.
    pub fn export_canvas(&self) -> Option<String> {
        let exporter = self.exporter.as_ref()?;
        let url = exporter();
        if url.is_none() {
            log::warn!("Canvas export produced no image");
        }
        url
    }
}
