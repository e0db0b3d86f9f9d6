//! Edit plans: the headless stand-in for UI event wiring.
//!
//! A plan is a JSON document listing the operations a user would otherwise
//! trigger through buttons and gestures. The binary loads one plan, replays
//! it against a fresh [`EditorSession`] and exits.

use std::path::{Path, PathBuf};

use crate::assets::OverlayCatalog;
use crate::config;
use crate::error::{AppError, AppResult};
use crate::session::EditorSession;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlanError {
    #[error("failed to read edit plan {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("edit plan {path} is not valid JSON: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("no overlay pack directory configured; cannot resolve overlay {name}")]
    NoCatalog { name: String },
}

/// One replayable user action.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum PlanStep {
    LoadBase {
        path: PathBuf,
    },
    /// Overlay by catalog name, resolved against the configured pack.
    AddOverlay {
        name: String,
    },
    /// Overlay by direct file path, bypassing the catalog.
    AddOverlayFile {
        path: PathBuf,
    },
    FlipHorizontal,
    FlipVertical,
    RotateQuarterTurn,
    Move {
        dx: f64,
        dy: f64,
    },
    Scale {
        factor: f64,
    },
    DeleteTarget,
    Crop {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },
    ClearCrop,
    Undo,
    Redo,
    Export {
        path: PathBuf,
    },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EditPlan {
    pub steps: Vec<PlanStep>,
}

impl EditPlan {
    pub fn load(path: &Path) -> Result<Self, PlanError> {
        let contents = std::fs::read_to_string(path).map_err(|source| PlanError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&contents).map_err(|source| PlanError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[derive(Debug, Default)]
pub struct PlanReport {
    pub steps_applied: usize,
    pub exports: Vec<PathBuf>,
}

/// Replays every step in order, stopping at the first failure.
pub fn execute_plan(
    session: &mut EditorSession,
    catalog: Option<&OverlayCatalog>,
    plan: &EditPlan,
) -> AppResult<PlanReport> {
    let mut report = PlanReport::default();

    for step in &plan.steps {
        tracing::debug!(step = ?step, "executing plan step");
        match step {
            PlanStep::LoadBase { path } => {
                session.load_base_image(path)?;
            }
            PlanStep::AddOverlay { name } => {
                let catalog =
                    catalog.ok_or_else(|| PlanError::NoCatalog { name: name.clone() })?;
                let path = catalog.resolve(name)?;
                session.load_overlay(&path)?;
            }
            PlanStep::AddOverlayFile { path } => {
                session.load_overlay(path)?;
            }
            PlanStep::FlipHorizontal => session.flip_horizontal()?,
            PlanStep::FlipVertical => session.flip_vertical()?,
            PlanStep::RotateQuarterTurn => session.rotate_quarter_turn()?,
            PlanStep::Move { dx, dy } => session.move_target(*dx, *dy)?,
            PlanStep::Scale { factor } => session.scale_target(*factor)?,
            PlanStep::DeleteTarget => session.delete_target()?,
            PlanStep::Crop {
                x,
                y,
                width,
                height,
            } => session.crop(crate::geometry::CropRect::new(*x, *y, *width, *height))?,
            PlanStep::ClearCrop => session.clear_crop()?,
            PlanStep::Undo => {
                if !session.undo()? {
                    tracing::debug!("undo requested with empty history; skipped");
                }
            }
            PlanStep::Redo => {
                if !session.redo()? {
                    tracing::debug!("redo requested with empty redo history; skipped");
                }
            }
            PlanStep::Export { path } => {
                let written = session.export_png(path)?;
                report.exports.push(written);
            }
        }
        report.steps_applied += 1;
    }

    Ok(report)
}

/// Entrypoint used by the CLI binary.
pub fn run() -> AppResult<()> {
    crate::logging::init();
    tracing::info!("starting memepress");

    let plan_path = std::env::args_os()
        .nth(1)
        .ok_or(AppError::MissingPlanArgument)?;
    let plan = EditPlan::load(Path::new(&plan_path))?;

    let app_config = config::load_app_config();
    let catalog = app_config
        .overlay_pack_dir
        .as_deref()
        .map(OverlayCatalog::load)
        .transpose()?;

    let mut session = EditorSession::new(app_config.session_options());
    let report = execute_plan(&mut session, catalog.as_ref(), &plan)?;

    tracing::info!(
        steps = report.steps_applied,
        exports = report.exports.len(),
        "edit plan complete"
    );
    Ok(())
}
