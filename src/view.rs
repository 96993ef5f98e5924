//! Serializable read model handed to renderers.

use serde::Serialize;

use crate::ai_overlay::AiOverlayState;
use crate::model::{
    Annotation, AnnotationTool, FilterState, ImageInfo, Rect, RenderFilter, ToolStyles,
    TransformState,
};
use crate::panel::ActivePanel;
use crate::state::Engine;

/// Snapshot of everything a renderer or toolbar needs to draw one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewState {
    pub image: Option<ImageInfo>,
    pub filters: FilterState,
    pub render_filter: RenderFilter,
    pub transform: TransformState,
    pub annotations: Vec<Annotation>,
    pub show_annotations: bool,
    pub active_tool: Option<AnnotationTool>,
    pub active_panel: Option<ActivePanel>,
    pub styles: ToolStyles,
    pub drawing: DrawingView,
    /// Crop rectangle being dragged, if any
    pub crop_preview: Option<Rect>,
    pub ai: AiOverlayState,
    pub can_undo: bool,
    pub undo_depth: usize,
    pub undo_description: Option<String>,
    /// Stroke multiplier for constant on-screen width, when the view is mapped
    pub item_scale: Option<f32>,
}

/// The in-progress path gesture.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrawingView {
    pub is_drawing: bool,
    pub points: Vec<f32>,
}

impl Engine {
    pub fn view_state(&self) -> ViewState {
        ViewState {
            image: self.image().cloned(),
            filters: *self.filters(),
            render_filter: self.filters().render_params(),
            transform: *self.transform(),
            annotations: self.annotations().to_vec(),
            show_annotations: self.show_annotations(),
            active_tool: self.active_tool(),
            active_panel: self.active_panel(),
            styles: *self.styles(),
            drawing: DrawingView {
                is_drawing: self.is_drawing(),
                points: self.drawing_session().points().to_vec(),
            },
            crop_preview: self.crop_preview(),
            ai: self.ai().clone(),
            can_undo: self.can_undo(),
            undo_depth: self.undo_depth(),
            undo_description: self.undo_description().map(str::to_string),
            item_scale: self.mapper().map(|m| m.item_scale()),
        }
    }
}
