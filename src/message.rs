//! Reducer-style actions.
//!
//! Every mutating engine operation has an [`Action`] counterpart so a host
//! can drive the engine from serialized events (replay scripts, a UI event
//! bus) through the single [`Engine::dispatch`] entry point.

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, InferenceError};
use crate::model::{
    AiAnalysis, AnnotationId, AnnotationPatch, AnnotationTool, Color, DetectionId, FilterChange,
    ImageInfo, PathKind, Point, Rect, Size, TransformChange,
};
use crate::panel::ActivePanel;
use crate::state::{Engine, PointerOutcome};

/// Actions that can be sent to update engine state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    // Session
    /// Load a new image (resets everything)
    LoadImage { image: ImageInfo },
    /// Unload the image
    ClearSession,
    /// Renderer container was resized
    SetContainerSize { width: f32, height: f32 },

    // Filters
    SetFilter { change: FilterChange },
    ToggleInvert,
    ResetFilters,

    // Transform
    SetTransform { change: TransformChange },
    ToggleFlipX,
    ToggleFlipY,
    Rotate90,
    ZoomIn,
    ZoomOut,
    /// Mouse wheel at a screen position
    ZoomAtPointer { x: f32, y: f32, zoom_in: bool },
    SetZoomAndPosition { scale: f32, position: Point },
    PanBy { dx: f32, dy: f32 },
    /// Fit to screen, keeping rotation, flips and crop
    ResetZoom,
    ResetTransform,
    ResetView,
    SetCropBounds { bounds: Option<Rect> },

    // Tools & panels
    SelectTool { tool: Option<AnnotationTool> },
    TogglePanel { panel: ActivePanel },
    ClosePanel,
    SetFreehandColor { color: Color },
    SetFreehandWidth { width: f32 },
    SetTextColor { color: Color },
    SetTextFontSize { size: f32 },

    // Drawing (model-space points)
    StartDrawing { point: Point },
    AddPoint { point: Point },
    FinishPath { kind: PathKind },
    CancelDrawing,
    FinishText { text: String, position: Point },

    // Pointer (screen-space positions)
    PointerDown { x: f32, y: f32 },
    PointerMove { x: f32, y: f32 },
    PointerUp { x: f32, y: f32 },
    PointerLeave,

    // Annotations
    UpdateAnnotation { id: AnnotationId, patch: AnnotationPatch },
    RemoveAnnotation { id: AnnotationId },
    ClearAnnotations,
    SetShowAnnotations { visible: bool },

    // History
    Undo,

    // AI overlay
    BeginDetection,
    ReceiveDetection { analysis: AiAnalysis },
    /// Detection request failed with this message
    DetectionFailed { message: String },
    SetBoxVisibility { id: DetectionId, visible: bool },
    SetLabelVisibility { label: String, visible: bool },
    SetAllVisibility { visible: bool },
    ClearDetections,
}

impl Engine {
    /// Apply one action. Only host errors are returned; discarded gestures
    /// and no-op changes succeed silently.
    pub fn dispatch(&mut self, action: Action) -> Result<(), EngineError> {
        log::trace!("Dispatch: {:?}", action);
        match action {
            Action::LoadImage { image } => self.load_image(image)?,
            Action::ClearSession => self.clear_session(),
            Action::SetContainerSize { width, height } => {
                self.set_container_size(Size::new(width, height))
            }

            Action::SetFilter { change } => {
                self.set_filter(change);
            }
            Action::ToggleInvert => self.toggle_invert(),
            Action::ResetFilters => self.reset_filters(),

            Action::SetTransform { change } => {
                self.set_transform(change);
            }
            Action::ToggleFlipX => self.toggle_flip_x(),
            Action::ToggleFlipY => self.toggle_flip_y(),
            Action::Rotate90 => self.rotate90(),
            Action::ZoomIn => {
                self.zoom_in();
            }
            Action::ZoomOut => {
                self.zoom_out();
            }
            Action::ZoomAtPointer { x, y, zoom_in } => {
                self.zoom_at_pointer(Point::new(x, y), zoom_in);
            }
            Action::SetZoomAndPosition { scale, position } => {
                self.set_zoom_and_position(scale, position);
            }
            Action::PanBy { dx, dy } => {
                self.pan_by(dx, dy);
            }
            Action::ResetZoom => self.reset_zoom_only(),
            Action::ResetTransform => self.reset_transform(),
            Action::ResetView => self.reset_view(),
            Action::SetCropBounds { bounds } => {
                self.set_crop_bounds(bounds);
            }

            Action::SelectTool { tool } => self.set_active_tool(tool),
            Action::TogglePanel { panel } => self.toggle_panel(panel),
            Action::ClosePanel => self.close_panel(),
            Action::SetFreehandColor { color } => self.set_freehand_color(color),
            Action::SetFreehandWidth { width } => self.set_freehand_stroke_width(width),
            Action::SetTextColor { color } => self.set_text_color(color),
            Action::SetTextFontSize { size } => self.set_text_font_size(size),

            Action::StartDrawing { point } => {
                self.start_drawing(point);
            }
            Action::AddPoint { point } => {
                self.add_point(point);
            }
            Action::FinishPath { kind } => {
                self.finish_path(kind);
            }
            Action::CancelDrawing => self.cancel_drawing(),
            Action::FinishText { text, position } => {
                self.finish_text(&text, position);
            }

            Action::PointerDown { x, y } => {
                if let PointerOutcome::TextRequested(p) = self.pointer_down(Point::new(x, y)) {
                    log::debug!("Text requested at ({:.1}, {:.1})", p.x, p.y);
                }
            }
            Action::PointerMove { x, y } => {
                self.pointer_move(Point::new(x, y));
            }
            Action::PointerUp { x, y } => {
                self.pointer_up(Point::new(x, y));
            }
            Action::PointerLeave => {
                self.pointer_leave();
            }

            Action::UpdateAnnotation { id, patch } => self.update_annotation(id, &patch)?,
            Action::RemoveAnnotation { id } => self.remove_annotation(id)?,
            Action::ClearAnnotations => {
                self.clear_annotations();
            }
            Action::SetShowAnnotations { visible } => self.set_show_annotations(visible),

            Action::Undo => {
                self.undo();
            }

            Action::BeginDetection => {
                self.begin_detection();
            }
            Action::ReceiveDetection { analysis } => {
                self.receive_detection(Ok(analysis));
            }
            Action::DetectionFailed { message } => {
                self.receive_detection(Err(InferenceError::Service(message)));
            }
            Action::SetBoxVisibility { id, visible } => {
                self.set_box_visibility(id, visible);
            }
            Action::SetLabelVisibility { label, visible } => {
                self.set_label_visibility(&label, visible);
            }
            Action::SetAllVisibility { visible } => self.set_all_visibility(visible),
            Action::ClearDetections => self.clear_detections(),
        }
        Ok(())
    }
}
