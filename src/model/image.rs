//! Descriptor of the currently loaded image.

use serde::{Deserialize, Serialize};

use super::geometry::{Rect, Size};

/// Intrinsic properties of a loaded study image. The bitmap itself is owned
/// by the renderer; the engine only needs its identity and dimensions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageInfo {
    /// Identity of the study (changes when a different image is loaded)
    pub id: String,
    pub width: u32,
    pub height: u32,
    /// Physical pixel spacing `[row, column]` in millimetres, if known
    #[serde(default)]
    pub pixel_spacing: Option<[f32; 2]>,
}

impl ImageInfo {
    pub fn new(id: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            id: id.into(),
            width,
            height,
            pixel_spacing: None,
        }
    }

    pub fn with_pixel_spacing(mut self, row: f32, column: f32) -> Self {
        self.pixel_spacing = Some([row, column]);
        self
    }

    pub fn size(&self) -> Size {
        Size::new(self.width as f32, self.height as f32)
    }

    /// Full-image rectangle `[0, width] x [0, height]`.
    pub fn bounds(&self) -> Rect {
        Rect::from_size(self.size())
    }
}
