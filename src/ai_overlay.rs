//! Read-only overlay of machine-generated detection boxes.
//!
//! Boxes are supplied wholesale by an external inference service. The only
//! local mutation is per-box visibility. None of this state is undoable.

use serde::Serialize;

use crate::error::InferenceError;
use crate::model::{AiAnalysis, AiDetectionBox, DetectionId, ImageInfo};

/// External detection inference, e.g. an HTTP client for the analysis endpoint.
pub trait DetectionService {
    /// Run detection on the given image.
    fn analyze(&self, image: &ImageInfo) -> Result<AiAnalysis, InferenceError>;
}

/// Detection overlay state with loading and error tracking.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AiOverlayState {
    detections: Vec<AiDetectionBox>,
    loading: bool,
    /// Last failure as a human-readable message
    error: Option<String>,
    #[serde(skip)]
    next_id: DetectionId,
}

impl AiOverlayState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a request as in flight. Without an image, records an error and returns false.
    pub fn begin(&mut self, image: Option<&ImageInfo>) -> bool {
        if image.is_none() {
            self.error = Some("No image loaded to analyze.".to_string());
            return false;
        }
        self.loading = true;
        self.error = None;
        true
    }

    /// Store the outcome of a request. Failures become an error string and
    /// leave previously received boxes untouched. Results arriving with no
    /// request in flight (e.g. after the image changed) are dropped; returns
    /// false in that case.
    pub fn receive(&mut self, result: Result<AiAnalysis, InferenceError>) -> bool {
        if !self.loading {
            log::debug!("Dropping detection result: no request in flight");
            return false;
        }
        self.loading = false;
        match result {
            Ok(AiAnalysis::Detection { boxes }) => {
                self.detections = boxes
                    .into_iter()
                    .map(|input| {
                        self.next_id += 1;
                        AiDetectionBox::from_input(self.next_id, input)
                    })
                    .collect();
                self.error = None;
                log::info!("Received {} detection boxes", self.detections.len());
            }
            Err(e) => {
                log::warn!("Detection request failed: {e}");
                self.error = Some(format!("AI for detection is unavailable. Details: {e}"));
            }
        }
        true
    }

    /// Set visibility of one box. Returns false if the ID is unknown.
    pub fn set_box_visibility(&mut self, id: DetectionId, visible: bool) -> bool {
        match self.detections.iter_mut().find(|b| b.id == id) {
            Some(b) => {
                b.visible = visible;
                true
            }
            None => false,
        }
    }

    /// Set visibility of every box with this label. Returns how many matched.
    pub fn set_label_visibility(&mut self, label: &str, visible: bool) -> usize {
        let mut count = 0;
        for b in self.detections.iter_mut().filter(|b| b.label == label) {
            b.visible = visible;
            count += 1;
        }
        count
    }

    pub fn set_all_visibility(&mut self, visible: bool) {
        for b in &mut self.detections {
            b.visible = visible;
        }
    }

    /// Drop all boxes and reset loading/error state.
    pub fn clear(&mut self) {
        self.detections.clear();
        self.loading = false;
        self.error = None;
    }

    pub fn detections(&self) -> &[AiDetectionBox] {
        &self.detections
    }

    pub fn visible(&self) -> impl Iterator<Item = &AiDetectionBox> {
        self.detections.iter().filter(|b| b.visible)
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DetectionInput;

    fn detection(label: &str) -> DetectionInput {
        DetectionInput {
            x1: 0.0,
            y1: 0.0,
            x2: 10.0,
            y2: 10.0,
            label: label.to_string(),
            confidence: Some(0.9),
        }
    }

    fn loaded() -> AiOverlayState {
        let mut state = AiOverlayState::new();
        let image = ImageInfo::new("study", 100, 100);
        assert!(state.begin(Some(&image)));
        state.receive(Ok(AiAnalysis::Detection {
            boxes: vec![detection("cavity"), detection("pa"), detection("cavity")],
        }));
        state
    }

    #[test]
    fn test_receive_wraps_boxes_visible_with_unique_ids() {
        let state = loaded();
        assert!(!state.is_loading());
        assert_eq!(state.detections().len(), 3);
        assert!(state.detections().iter().all(|b| b.visible));
        let mut ids: Vec<_> = state.detections().iter().map(|b| b.id).collect();
        ids.dedup();
        assert_eq!(ids.len(), 3);
    }

    #[test]
    fn test_visibility_toggles() {
        let mut state = loaded();
        let first = state.detections()[0].id;
        assert!(state.set_box_visibility(first, false));
        assert!(!state.set_box_visibility(9999, false));
        assert_eq!(state.visible().count(), 2);

        assert_eq!(state.set_label_visibility("cavity", false), 2);
        assert_eq!(state.visible().count(), 1);

        state.set_all_visibility(true);
        assert_eq!(state.visible().count(), 3);
    }

    #[test]
    fn test_failure_becomes_error_string() {
        let mut state = loaded();
        state.begin(Some(&ImageInfo::new("study", 100, 100)));
        assert!(state.is_loading());
        state.receive(Err(InferenceError::Transport("connection refused".into())));
        assert!(!state.is_loading());
        assert_eq!(
            state.error(),
            Some("AI for detection is unavailable. Details: Request failed: connection refused")
        );
        // Previous results are kept
        assert_eq!(state.detections().len(), 3);
    }

    #[test]
    fn test_result_without_request_is_dropped() {
        let mut state = AiOverlayState::new();
        assert!(!state.receive(Ok(AiAnalysis::Detection {
            boxes: vec![detection("cavity")],
        })));
        assert!(state.detections().is_empty());

        let mut state = loaded();
        state.clear();
        assert!(!state.receive(Err(InferenceError::Service("late".into()))));
        assert_eq!(state.error(), None);
    }

    #[test]
    fn test_begin_without_image() {
        let mut state = AiOverlayState::new();
        assert!(!state.begin(None));
        assert!(!state.is_loading());
        assert_eq!(state.error(), Some("No image loaded to analyze."));
    }
}
