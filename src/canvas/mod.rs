//! The canvas surface seam: snapshot capture and asynchronous restore.
//!
//! [`EditHistory`](crate::history::EditHistory) only ever talks to a
//! [`CanvasSurface`]. Restores complete through a [`RestoreSignal`] rather
//! than a return value: an implementation may settle immediately (the
//! in-crate [`SceneCanvas`] does) or hold the signal and resolve it once its
//! rendering has caught up. Until the signal fires, the live state is
//! transiently undefined and the history refuses further operations.

use std::cell::RefCell;
use std::rc::Rc;

use crate::assets::{AssetId, AssetStore};
use crate::scene::Scene;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error("failed to encode scene snapshot: {0}")]
    SnapshotEncode(#[source] serde_json::Error),

    #[error("snapshot is not a valid scene document: {0}")]
    MalformedSnapshot(#[source] serde_json::Error),

    #[error("snapshot references asset {asset} which is not loaded")]
    MissingAsset { asset: AssetId },
}

pub type SurfaceResult<T> = std::result::Result<T, SurfaceError>;

/// Opaque serialized canvas state. Immutable once captured; clones share the
/// underlying text. Equality is byte equality of the serialized document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    json: Rc<str>,
}

impl Snapshot {
    pub(crate) fn from_json(json: String) -> Self {
        Self { json: json.into() }
    }

    pub(crate) fn as_json(&self) -> &str {
        &self.json
    }
}

#[derive(Debug, Default)]
enum RestoreOutcome {
    #[default]
    Pending,
    Done(SurfaceResult<()>),
}

/// Completion handle for one restore request. The surface resolves it exactly
/// once; the history polls it to learn whether the restore settled.
#[derive(Debug, Clone, Default)]
pub struct RestoreSignal {
    outcome: Rc<RefCell<RestoreOutcome>>,
}

impl RestoreSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resolve(&self, result: SurfaceResult<()>) {
        let mut outcome = self.outcome.borrow_mut();
        if matches!(*outcome, RestoreOutcome::Done(_)) {
            tracing::warn!("restore signal resolved twice; keeping the first outcome");
            return;
        }
        *outcome = RestoreOutcome::Done(result);
    }

    /// Consumes a settled outcome, leaving the signal pending-looking so it
    /// cannot be observed twice. `None` while the restore is still in flight.
    pub(crate) fn take_outcome(&self) -> Option<SurfaceResult<()>> {
        let mut outcome = self.outcome.borrow_mut();
        match std::mem::take(&mut *outcome) {
            RestoreOutcome::Pending => None,
            RestoreOutcome::Done(result) => Some(result),
        }
    }
}

/// The external collaborator contract from the edit history's point of view.
pub trait CanvasSurface {
    /// Synchronously serializes the current full canvas state.
    fn capture_snapshot(&self) -> SurfaceResult<Snapshot>;

    /// Replaces all canvas contents with `snapshot`, resolving `done` when
    /// rendering has settled. Resolving with an error means the canvas was
    /// left untouched.
    fn restore_snapshot(&mut self, snapshot: Snapshot, done: RestoreSignal);
}

/// The crate's concrete surface: a [`Scene`] serialized with `serde_json`,
/// validated against the shared asset store on restore. Restores settle
/// synchronously because rasterization is deferred to export time.
#[derive(Debug)]
pub struct SceneCanvas {
    scene: Scene,
    assets: Rc<RefCell<AssetStore>>,
}

impl SceneCanvas {
    pub fn new(scene: Scene, assets: Rc<RefCell<AssetStore>>) -> Self {
        Self { scene, assets }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    fn try_restore(&mut self, snapshot: &Snapshot) -> SurfaceResult<()> {
        let scene: Scene = serde_json::from_str(snapshot.as_json())
            .map_err(SurfaceError::MalformedSnapshot)?;

        let assets = self.assets.borrow();
        for object in scene.objects() {
            if !assets.contains(object.asset) {
                return Err(SurfaceError::MissingAsset {
                    asset: object.asset,
                });
            }
        }
        drop(assets);

        tracing::debug!(objects = scene.objects().len(), "canvas restored from snapshot");
        self.scene = scene;
        Ok(())
    }
}

impl CanvasSurface for SceneCanvas {
    fn capture_snapshot(&self) -> SurfaceResult<Snapshot> {
        serde_json::to_string(&self.scene)
            .map(Snapshot::from_json)
            .map_err(SurfaceError::SnapshotEncode)
    }

    fn restore_snapshot(&mut self, snapshot: Snapshot, done: RestoreSignal) {
        let result = self.try_restore(&snapshot);
        done.resolve(result);
    }
}
