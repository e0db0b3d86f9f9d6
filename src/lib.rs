pub mod app;
pub mod assets;
pub mod canvas;
mod config;
pub mod error;
pub mod geometry;
pub mod history;
pub mod logging;
pub mod render;
pub mod scene;
pub mod session;

pub use error::{AppError, AppResult};

/// Entrypoint used by the CLI binary and higher-level integrations.
pub fn run() -> AppResult<()> {
    app::run()
}
