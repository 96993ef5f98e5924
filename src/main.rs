//! Session replay entry point.
//!
//! Usage: `xray-annotate <session.json>`
//!
//! The session file holds the image descriptor, the container size and a
//! list of actions. They are applied in order and the final view state is
//! printed as JSON.

#[cfg(not(target_arch = "wasm32"))]
fn main() -> std::process::ExitCode {
    use std::process::ExitCode;

    let config = xray_annotate::EngineConfig::load_from_default_path().unwrap_or_default();
    env_logger::Builder::new()
        .filter_level(config.preferences.log_level.to_level_filter())
        .parse_default_env()
        .init();

    let Some(path) = std::env::args().nth(1) else {
        eprintln!("Usage: xray-annotate <session.json>");
        return ExitCode::from(2);
    };

    match replay::run(&path, &config) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Replay error: {e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod replay {
    use serde::Deserialize;
    use xray_annotate::model::{ImageInfo, Size};
    use xray_annotate::{Action, Engine, EngineConfig};

    /// A recorded editing session.
    #[derive(Debug, Deserialize)]
    pub struct Session {
        #[serde(default)]
        pub image: Option<ImageInfo>,
        #[serde(default)]
        pub container: Option<Size>,
        #[serde(default)]
        pub actions: Vec<Action>,
    }

    #[derive(Debug, thiserror::Error)]
    pub enum ReplayError {
        #[error("Failed to read session file: {0}")]
        Io(#[from] std::io::Error),

        #[error("Invalid session JSON: {0}")]
        Json(#[from] serde_json::Error),

        #[error(transparent)]
        Engine(#[from] xray_annotate::EngineError),
    }

    /// Replay the session at `path` and return the final view state as pretty JSON.
    pub fn run(path: &str, config: &EngineConfig) -> Result<String, ReplayError> {
        let json = std::fs::read_to_string(path)?;
        let session: Session = serde_json::from_str(&json)?;
        log::info!("Replaying {} actions from {}", session.actions.len(), path);

        let mut engine = Engine::with_config(config);
        if let Some(size) = session.container {
            engine.set_container_size(size);
        }
        if let Some(image) = session.image {
            engine.load_image(image)?;
        }

        for (index, action) in session.actions.into_iter().enumerate() {
            if let Err(e) = engine.dispatch(action) {
                log::warn!("Action {} failed: {}", index, e);
            }
        }

        Ok(serde_json::to_string_pretty(&engine.view_state())?)
    }
}

// WASM builds use the library directly
#[cfg(target_arch = "wasm32")]
fn main() {}
