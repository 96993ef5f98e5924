//! Pointer gesture routing.
//!
//! Screen positions are mapped into model space with the current
//! [`CoordinateMapper`](crate::mapper::CoordinateMapper) and dispatched to
//! either the active drawing tool or, while the crop panel is open, a crop
//! rectangle drag. Without a usable mapping every event is ignored.

use crate::constants::CROP_MIN_SIZE;
use crate::model::{AnnotationId, AnnotationTool, Point, Rect};
use crate::panel::ActivePanel;

use super::Engine;

/// In-progress crop rectangle drag, corners in model space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropDrag {
    /// Region the corners are clamped to (the currently displayed region)
    bounds: Rect,
    start: Point,
    current: Point,
}

impl CropDrag {
    fn new(bounds: Rect, start: Point) -> Self {
        let start = bounds.clamp_point(start);
        Self {
            bounds,
            start,
            current: start,
        }
    }

    fn update(&mut self, point: Point) {
        if point.is_finite() {
            self.current = self.bounds.clamp_point(point);
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::from_corners(self.start, self.current)
    }

    /// Large enough to become a crop.
    fn is_usable(&self) -> bool {
        let r = self.rect();
        r.width > CROP_MIN_SIZE && r.height > CROP_MIN_SIZE
    }
}

/// What a pointer event did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerOutcome {
    /// No tool, no mapping, or nothing in progress
    Ignored,
    /// A path gesture started or grew
    Drawing,
    /// A path gesture ended; carries the new annotation, if one was created
    PathFinished(Option<AnnotationId>),
    /// The text tool was clicked here; prompt for text, then call `finish_text`
    TextRequested(Point),
    /// Crop drag in progress with the current rectangle
    CropDragging(Rect),
    /// Crop drag released; true if the crop changed
    CropFinished(bool),
    /// A path gesture was abandoned
    Cancelled,
}

impl Engine {
    fn model_point(&self, screen: Point) -> Option<(Point, Rect)> {
        let Some(mapper) = self.mapper() else {
            log::debug!("Pointer event ignored: no coordinate mapping");
            return None;
        };
        let model = mapper.to_model(screen);
        model
            .is_finite()
            .then_some((model, mapper.display_region()))
    }

    pub fn pointer_down(&mut self, screen: Point) -> PointerOutcome {
        let Some((point, region)) = self.model_point(screen) else {
            return PointerOutcome::Ignored;
        };

        if self.active_panel == Some(ActivePanel::Crop) {
            let drag = CropDrag::new(region, point);
            self.crop_drag = Some(drag);
            return PointerOutcome::CropDragging(drag.rect());
        }

        match self.active_tool {
            None => PointerOutcome::Ignored,
            Some(AnnotationTool::Text) => PointerOutcome::TextRequested(point),
            Some(_) => {
                if self.start_drawing(point) {
                    PointerOutcome::Drawing
                } else {
                    PointerOutcome::Ignored
                }
            }
        }
    }

    pub fn pointer_move(&mut self, screen: Point) -> PointerOutcome {
        if self.crop_drag.is_none() && !self.session.is_drawing() {
            return PointerOutcome::Ignored;
        }
        let Some((point, _)) = self.model_point(screen) else {
            return PointerOutcome::Ignored;
        };

        if let Some(drag) = &mut self.crop_drag {
            drag.update(point);
            return PointerOutcome::CropDragging(drag.rect());
        }
        if self.add_point(point) {
            PointerOutcome::Drawing
        } else {
            PointerOutcome::Ignored
        }
    }

    /// Release. Crop drags are applied even when `screen` is off-canvas.
    pub fn pointer_up(&mut self, screen: Point) -> PointerOutcome {
        if let Some(mut drag) = self.crop_drag.take() {
            if let Some((point, _)) = self.model_point(screen) {
                drag.update(point);
            }
            if !drag.is_usable() {
                log::debug!("Crop drag too small: {:?}", drag.rect());
                return PointerOutcome::CropFinished(false);
            }
            return PointerOutcome::CropFinished(self.set_crop_bounds(Some(drag.rect())));
        }

        if !self.session.is_drawing() {
            return PointerOutcome::Ignored;
        }
        match self.active_tool.and_then(|t| t.path_kind()) {
            Some(kind) => PointerOutcome::PathFinished(self.finish_path(kind)),
            None => {
                self.session.cancel();
                PointerOutcome::Cancelled
            }
        }
    }

    /// Pointer left the canvas: abandons a path gesture, keeps a crop drag alive.
    pub fn pointer_leave(&mut self) -> PointerOutcome {
        if self.session.is_drawing() {
            self.session.cancel();
            log::debug!("Drawing cancelled: pointer left canvas");
            return PointerOutcome::Cancelled;
        }
        PointerOutcome::Ignored
    }

    /// Rectangle of the crop drag in progress, for preview rendering.
    pub fn crop_preview(&self) -> Option<Rect> {
        self.crop_drag.map(|d| d.rect())
    }
}
