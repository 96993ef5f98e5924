//! Mutually exclusive tool panels.

use serde::{Deserialize, Serialize};

/// A tool panel. At most one is open at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivePanel {
    BrightnessContrast,
    Zoom,
    Crop,
    MetadataEditor,
}

impl ActivePanel {
    pub fn name(&self) -> &'static str {
        match self {
            ActivePanel::BrightnessContrast => "Brightness/Contrast",
            ActivePanel::Zoom => "Zoom",
            ActivePanel::Crop => "Crop",
            ActivePanel::MetadataEditor => "Metadata",
        }
    }

    /// Next panel state after the user clicks `panel`: opens it, or closes it
    /// if it is already the open one.
    pub fn toggle(current: Option<ActivePanel>, panel: ActivePanel) -> Option<ActivePanel> {
        if current == Some(panel) {
            None
        } else {
            Some(panel)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle() {
        let open = ActivePanel::toggle(None, ActivePanel::Crop);
        assert_eq!(open, Some(ActivePanel::Crop));
        assert_eq!(ActivePanel::toggle(open, ActivePanel::Zoom), Some(ActivePanel::Zoom));
        assert_eq!(ActivePanel::toggle(open, ActivePanel::Crop), None);
    }
}
