//! Linear undo/redo history over whole-canvas snapshots.
//!
//! `past` holds states strictly older than the live canvas, oldest first;
//! `future` holds undone states with the next redo target on top. The live
//! state itself is owned by the canvas surface and never duplicated into
//! `past`; the history only mirrors the most recently recorded snapshot so
//! it knows what preceded the current one.
//!
//! Undo and redo are two-phase: the stack movement is committed only after
//! the surface's restore signal resolves successfully, so a failed restore
//! leaves both stacks exactly as they were.

use crate::canvas::{CanvasSurface, RestoreSignal, Snapshot, SurfaceError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HistoryError {
    /// A prior undo/redo has not settled yet; the live state is transiently
    /// undefined and no snapshot may be captured from it.
    #[error("a canvas restore is still in flight")]
    RestoreInFlight,

    /// The surface refused the restore. Both stacks are unchanged.
    #[error("canvas restore failed: {0}")]
    RestoreFailed(#[source] SurfaceError),

    #[error(transparent)]
    Capture(#[from] SurfaceError),
}

pub type HistoryResult<T> = std::result::Result<T, HistoryError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HistoryDirection {
    Undo,
    Redo,
}

impl HistoryDirection {
    const fn applied_message(self) -> &'static str {
        match self {
            Self::Undo => "undo applied",
            Self::Redo => "redo applied",
        }
    }

    const fn empty_message(self) -> &'static str {
        match self {
            Self::Undo => "undo stack empty",
            Self::Redo => "redo stack empty",
        }
    }
}

#[derive(Debug)]
struct PendingRestore {
    direction: HistoryDirection,
    /// Snapshot the surface was asked to make live.
    target: Snapshot,
    /// Live snapshot captured immediately before the restore began.
    superseded: Snapshot,
    signal: RestoreSignal,
}

#[derive(Debug, Default)]
pub struct EditHistory {
    past: Vec<Snapshot>,
    future: Vec<Snapshot>,
    /// Mirror of the last snapshot recorded or restored as live.
    recorded: Option<Snapshot>,
    pending: Option<PendingRestore>,
}

impl EditHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    pub fn restore_in_flight(&self) -> bool {
        self.pending.is_some()
    }

    /// Captures the surface's current state as the new live snapshot. The
    /// previously recorded snapshot moves onto `past`; any redo history is
    /// invalidated. Must be called after every mutating edit.
    pub fn record_state<S: CanvasSurface + ?Sized>(
        &mut self,
        surface: &S,
    ) -> HistoryResult<()> {
        self.settle()?;
        if self.pending.is_some() {
            return Err(HistoryError::RestoreInFlight);
        }

        let current = surface.capture_snapshot()?;
        if let Some(previous) = self.recorded.replace(current) {
            self.past.push(previous);
        }
        self.future.clear();
        tracing::debug!(past = self.past.len(), "canvas state recorded");
        Ok(())
    }

    /// Steps back to the previous state. `Ok(false)` when there is nothing
    /// to undo; the surface is not touched in that case.
    pub fn undo<S: CanvasSurface + ?Sized>(&mut self, surface: &mut S) -> HistoryResult<bool> {
        self.step(surface, HistoryDirection::Undo)
    }

    /// Reapplies the most recently undone state. Mirror of [`Self::undo`].
    pub fn redo<S: CanvasSurface + ?Sized>(&mut self, surface: &mut S) -> HistoryResult<bool> {
        self.step(surface, HistoryDirection::Redo)
    }

    fn step<S: CanvasSurface + ?Sized>(
        &mut self,
        surface: &mut S,
        direction: HistoryDirection,
    ) -> HistoryResult<bool> {
        self.settle()?;
        if self.pending.is_some() {
            return Err(HistoryError::RestoreInFlight);
        }

        let source = match direction {
            HistoryDirection::Undo => &self.past,
            HistoryDirection::Redo => &self.future,
        };
        let Some(target) = source.last().cloned() else {
            tracing::debug!("{}", direction.empty_message());
            return Ok(false);
        };

        let superseded = surface.capture_snapshot()?;
        let signal = RestoreSignal::new();
        self.pending = Some(PendingRestore {
            direction,
            target: target.clone(),
            superseded,
            signal: signal.clone(),
        });
        surface.restore_snapshot(target, signal);

        // Synchronously completing surfaces commit right here; asynchronous
        // ones settle on a later call.
        self.settle()?;
        Ok(true)
    }

    /// Drives a pending restore to its conclusion if its signal has resolved.
    /// Commits the stack movement on success, discards it (stacks untouched)
    /// on failure, and does nothing while the restore is still in flight.
    pub fn settle(&mut self) -> HistoryResult<()> {
        let Some(pending) = self.pending.take() else {
            return Ok(());
        };

        match pending.signal.take_outcome() {
            None => {
                self.pending = Some(pending);
                Ok(())
            }
            Some(Ok(())) => {
                self.commit(pending);
                Ok(())
            }
            Some(Err(err)) => {
                tracing::warn!(
                    direction = ?pending.direction,
                    "restore failed; history left unchanged"
                );
                Err(HistoryError::RestoreFailed(err))
            }
        }
    }

    fn commit(&mut self, pending: PendingRestore) {
        match pending.direction {
            HistoryDirection::Undo => {
                self.past.pop();
                self.future.push(pending.superseded);
            }
            HistoryDirection::Redo => {
                self.future.pop();
                self.past.push(pending.superseded);
            }
        }
        self.recorded = Some(pending.target);
        tracing::debug!(
            past = self.past.len(),
            future = self.future.len(),
            "{}",
            pending.direction.applied_message()
        );
    }
}

#[cfg(test)]
impl EditHistory {
    fn depths(&self) -> (usize, usize) {
        (self.past.len(), self.future.len())
    }
}
