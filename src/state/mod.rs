//! Engine state and its operations.

mod engine;
mod pointer;

pub use engine::{CanvasExporter, Engine};
pub use pointer::{CropDrag, PointerOutcome};
