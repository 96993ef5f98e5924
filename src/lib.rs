//! xray-annotate - annotation, transform and undo state engine for an X-ray viewer.
//!
//! The crate owns everything a viewer needs to keep consistent while a user
//! edits one image: non-destructive filters, the view transform (zoom, pan,
//! rotation, flips, crop), user annotations with linear undo, and a read-only
//! overlay of detection boxes. Rendering, image decoding and network calls
//! stay with the host; the engine talks to them through [`CoordinateMapper`],
//! [`DetectionService`] and a canvas export callback.
//!
//! Annotations and crop rectangles are stored in model space: original-image
//! pixel coordinates before any rotation, flip, pan or zoom.

pub mod ai_overlay;
pub mod annotation;
pub mod config;
pub mod constants;
pub mod error;
pub mod mapper;
pub mod message;
pub mod model;
pub mod panel;
pub mod state;
pub mod undo;
pub mod view;

pub use ai_overlay::{AiOverlayState, DetectionService};
pub use config::EngineConfig;
pub use error::{EngineError, InferenceError};
pub use mapper::CoordinateMapper;
pub use message::Action;
pub use panel::ActivePanel;
pub use state::{Engine, PointerOutcome};
pub use view::ViewState;
