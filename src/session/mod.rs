//! The editing session: one owned context in place of ambient globals.
//!
//! `EditorSession` holds the scene canvas, the undo/redo history, the shared
//! asset store and the currently targeted editable object. Every mutating
//! operation funnels through [`EditorSession::apply`], which records a
//! history snapshot after the edit, so snapshotting cannot be forgotten at a
//! call site.

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::assets::{AssetError, AssetStore};
use crate::canvas::SceneCanvas;
use crate::geometry::{
    centered_offset, fit_canvas_to_image, fit_scale, CanvasSize, Color, CropRect, CROP_MIN_SIZE,
};
use crate::history::{EditHistory, HistoryError};
use crate::render::{self, RenderError};
use crate::scene::{ObjectId, ObjectRole, Placement, Scene};
use image::RgbaImage;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no editable object is targeted")]
    NoTargetSelected,

    #[error("object {id} does not exist")]
    UnknownObject { id: ObjectId },

    #[error("object {id} cannot be targeted for editing")]
    NotSelectable { id: ObjectId },

    #[error("invalid crop region: {reason}")]
    InvalidCrop { reason: &'static str },

    #[error(transparent)]
    Asset(#[from] AssetError),

    #[error(transparent)]
    History(#[from] HistoryError),

    #[error(transparent)]
    Render(#[from] RenderError),
}

pub type SessionResult<T> = std::result::Result<T, SessionError>;

/// Session construction knobs, usually derived from the application config.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Bounding box the canvas is fitted into when a base image loads, and
    /// the starting canvas size before one does.
    pub max_canvas: CanvasSize,
    pub background: Color,
    /// Where a freshly added overlay lands on the canvas.
    pub overlay_offset: (f64, f64),
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            max_canvas: CanvasSize::new(1280, 720),
            background: Color::WHITE,
            overlay_offset: (100.0, 100.0),
        }
    }
}

pub struct EditorSession {
    canvas: SceneCanvas,
    history: EditHistory,
    assets: Rc<RefCell<AssetStore>>,
    max_canvas: CanvasSize,
    overlay_offset: (f64, f64),
    target: Option<ObjectId>,
}

impl EditorSession {
    pub fn new(options: SessionOptions) -> Self {
        let assets = Rc::new(RefCell::new(AssetStore::new()));
        let scene = Scene::new(options.max_canvas, options.background);
        Self {
            canvas: SceneCanvas::new(scene, Rc::clone(&assets)),
            history: EditHistory::new(),
            assets,
            max_canvas: options.max_canvas,
            overlay_offset: options.overlay_offset,
            target: None,
        }
    }

    pub fn scene(&self) -> &Scene {
        self.canvas.scene()
    }

    pub fn target(&self) -> Option<ObjectId> {
        self.target
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Runs one edit and records the resulting canvas state, so undo always
    /// has the post-edit snapshot to return to.
    fn apply<T>(
        &mut self,
        label: &'static str,
        edit: impl FnOnce(&mut Self) -> SessionResult<T>,
    ) -> SessionResult<T> {
        let value = edit(self)?;
        self.history.record_state(&self.canvas)?;
        tracing::debug!(edit = label, "edit applied");
        Ok(value)
    }

    /// Loads a base image from disk and starts a fresh composition around it:
    /// the canvas is resized to the image's aspect ratio within the
    /// configured bounds and the image is scaled to fit, then centered.
    pub fn load_base_image(&mut self, path: &Path) -> SessionResult<ObjectId> {
        let asset = self.assets.borrow_mut().load_from_path(path)?;
        tracing::info!(path = ?path, asset, "base image loaded");
        self.place_base(asset)
    }

    /// In-memory variant of [`Self::load_base_image`].
    pub fn set_base_image(&mut self, image: RgbaImage) -> SessionResult<ObjectId> {
        let asset = self.assets.borrow_mut().insert(image);
        self.place_base(asset)
    }

    fn place_base(&mut self, asset: crate::assets::AssetId) -> SessionResult<ObjectId> {
        let (width, height) = self.asset_dimensions(asset);
        let max_canvas = self.max_canvas;
        self.apply("load base image", move |session| {
            let size = fit_canvas_to_image(width, height, max_canvas);
            let scene = session.canvas.scene_mut();
            scene.set_size(size);
            scene.clear();

            let scale = fit_scale(size, width, height);
            let placement = Placement::at(0.0, 0.0).with_uniform_scale(scale);
            let left = centered_offset(size.width, placement.scaled_width(width));
            let top = centered_offset(size.height, placement.scaled_height(height));
            let mut placement = placement;
            placement.left = left;
            placement.top = top;

            let id = scene.insert(ObjectRole::Base, asset, placement);
            session.target = None;
            Ok(id)
        })
    }

    /// Loads an overlay from disk and places it. Any existing overlay is
    /// replaced; the new one becomes the edit target.
    pub fn load_overlay(&mut self, path: &Path) -> SessionResult<ObjectId> {
        let asset = self.assets.borrow_mut().load_from_path(path)?;
        tracing::info!(path = ?path, asset, "overlay image loaded");
        self.place_overlay(asset)
    }

    /// In-memory variant of [`Self::load_overlay`].
    pub fn add_overlay_image(&mut self, image: RgbaImage) -> SessionResult<ObjectId> {
        let asset = self.assets.borrow_mut().insert(image);
        self.place_overlay(asset)
    }

    fn place_overlay(&mut self, asset: crate::assets::AssetId) -> SessionResult<ObjectId> {
        let (width, height) = self.asset_dimensions(asset);
        let offset = self.overlay_offset;
        self.apply("add overlay", move |session| {
            let scene = session.canvas.scene_mut();
            if let Some(existing) = scene.first_with_role(ObjectRole::Overlay).map(|o| o.id) {
                scene.remove(existing);
            }

            let scale = fit_scale(scene.size(), width, height);
            let placement = Placement::at(offset.0, offset.1).with_uniform_scale(scale);
            let id = scene.insert(ObjectRole::Overlay, asset, placement);
            session.target = Some(id);
            Ok(id)
        })
    }

    fn asset_dimensions(&self, asset: crate::assets::AssetId) -> (u32, u32) {
        self.assets
            .borrow()
            .get(asset)
            .map(|record| (record.width(), record.height()))
            .unwrap_or((0, 0))
    }

    /// Retargets editing to `id`. Base images cannot be targeted.
    pub fn select_object(&mut self, id: ObjectId) -> SessionResult<()> {
        let object = self
            .scene()
            .object(id)
            .ok_or(SessionError::UnknownObject { id })?;
        if !object.is_selectable() {
            return Err(SessionError::NotSelectable { id });
        }
        self.target = Some(id);
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.target = None;
    }

    pub fn flip_horizontal(&mut self) -> SessionResult<()> {
        self.edit_target("flip horizontal", |placement| placement.toggle_flip_x())
    }

    pub fn flip_vertical(&mut self) -> SessionResult<()> {
        self.edit_target("flip vertical", |placement| placement.toggle_flip_y())
    }

    pub fn rotate_quarter_turn(&mut self) -> SessionResult<()> {
        self.edit_target("rotate quarter turn", Placement::rotate_quarter_turn)
    }

    /// Drag analog: moves the target by a canvas-space delta.
    pub fn move_target(&mut self, dx: f64, dy: f64) -> SessionResult<()> {
        self.edit_target("move", move |placement| placement.translate(dx, dy))
    }

    /// Pinch-zoom analog: multiplies the target's scale.
    pub fn scale_target(&mut self, factor: f64) -> SessionResult<()> {
        self.edit_target("scale", move |placement| placement.scale_by(factor))
    }

    fn edit_target(
        &mut self,
        label: &'static str,
        mutate: impl FnOnce(&mut Placement),
    ) -> SessionResult<()> {
        let id = self.target.ok_or(SessionError::NoTargetSelected)?;
        self.apply(label, move |session| {
            let object = session
                .canvas
                .scene_mut()
                .object_mut(id)
                .ok_or(SessionError::UnknownObject { id })?;
            mutate(&mut object.placement);
            Ok(())
        })
    }

    /// Removes the targeted overlay from the composition.
    pub fn delete_target(&mut self) -> SessionResult<()> {
        let id = self.target.ok_or(SessionError::NoTargetSelected)?;
        self.apply("delete overlay", move |session| {
            session
                .canvas
                .scene_mut()
                .remove(id)
                .ok_or(SessionError::UnknownObject { id })?;
            session.target = None;
            Ok(())
        })
    }

    /// Sets the crop region, clamped to the canvas. Regions that collapse
    /// below the minimum size are rejected.
    pub fn crop(&mut self, region: CropRect) -> SessionResult<()> {
        let canvas = self.scene().size();
        if region.x >= canvas.width || region.y >= canvas.height {
            return Err(SessionError::InvalidCrop {
                reason: "origin outside the canvas",
            });
        }
        let clamped = region.clamped_to(canvas);
        if clamped.width < CROP_MIN_SIZE || clamped.height < CROP_MIN_SIZE {
            return Err(SessionError::InvalidCrop {
                reason: "smaller than the minimum crop size",
            });
        }

        self.apply("crop", move |session| {
            session.canvas.scene_mut().set_crop(clamped);
            Ok(())
        })
    }

    pub fn clear_crop(&mut self) -> SessionResult<()> {
        self.apply("clear crop", |session| {
            session.canvas.scene_mut().clear_crop();
            Ok(())
        })
    }

    /// Steps the composition back one state. Returns whether an undo
    /// occurred, for driving UI affordances.
    pub fn undo(&mut self) -> SessionResult<bool> {
        let applied = self.history.undo(&mut self.canvas)?;
        if applied {
            self.revalidate_target();
        }
        Ok(applied)
    }

    /// Reapplies the most recently undone state.
    pub fn redo(&mut self) -> SessionResult<bool> {
        let applied = self.history.redo(&mut self.canvas)?;
        if applied {
            self.revalidate_target();
        }
        Ok(applied)
    }

    /// A restored scene may no longer contain the targeted object; drop the
    /// selection rather than let later edits hit a dangling id.
    fn revalidate_target(&mut self) {
        if let Some(id) = self.target {
            let still_selectable = self
                .scene()
                .object(id)
                .is_some_and(|object| object.is_selectable());
            if !still_selectable {
                tracing::debug!(id, "edit target gone after restore; selection cleared");
                self.target = None;
            }
        }
    }

    pub fn export_png(&self, path: &Path) -> SessionResult<PathBuf> {
        render::export_png(self.scene(), &self.assets.borrow(), path)?;
        Ok(path.to_path_buf())
    }

    pub fn export_png_bytes(&self) -> SessionResult<Vec<u8>> {
        Ok(render::export_png_bytes(self.scene(), &self.assets.borrow())?)
    }
}
