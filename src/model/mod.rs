//! Data models for the annotation engine.

mod ai;
mod annotation;
mod color;
mod filters;
mod geometry;
mod image;
mod transform;

pub use ai::{AiAnalysis, AiDetectionBox, DetectionId, DetectionInput, label_color};
pub use annotation::{
    Annotation, AnnotationBody, AnnotationId, AnnotationPatch, AnnotationTool, MEASUREMENT_COORDS,
    MIN_PATH_COORDS, Measurement, PatchError, PathKind, PathStroke, TextLabel, ToolStyles,
};
pub use color::{Color, ColorParseError};
pub use filters::{FilterChange, FilterState, RenderFilter};
pub use geometry::{Point, Rect, Size};
pub use image::ImageInfo;
pub use transform::{Rotation, TransformChange, TransformState, sanitize_scale};
