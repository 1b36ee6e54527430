use mediastage_core::trim::{TrimDetail, TrimRange};
use mediastage_core::types::MediaId;
use tracing::debug;

use crate::surface::TrimSurfaces;
use crate::trim::TrimRangeController;

/// The active selection and the trim controller that belongs to it.
///
/// Each activation gets a fresh controller; the previous one is disposed
/// first so only one slider ever lives on the page.
pub struct PreviewSession {
    surfaces: TrimSurfaces,
    active: Option<MediaId>,
    trim: Option<TrimRangeController>,
}

impl PreviewSession {
    pub fn new(surfaces: TrimSurfaces) -> Self {
        Self {
            surfaces,
            active: None,
            trim: None,
        }
    }

    /// Make `id` the active item, seeding its range from a stored trim.
    pub fn begin(&mut self, id: MediaId, stored: Option<&TrimDetail>) {
        self.reset();
        let (start, finish) = match stored {
            Some(detail) => (Some(detail.start), Some(detail.end)),
            None => (None, None),
        };
        debug!(%id, ?start, ?finish, "preview session started");
        self.trim = Some(TrimRangeController::start(
            self.surfaces.clone(),
            start,
            finish,
        ));
        self.active = Some(id);
    }

    /// Forget the selection and tear down its trim controller.
    pub fn reset(&mut self) {
        if let Some(trim) = self.trim.take() {
            trim.dispose();
        }
        if let Some(id) = self.active.take() {
            debug!(%id, "preview session ended");
        }
    }

    pub fn active(&self) -> Option<&MediaId> {
        self.active.as_ref()
    }

    pub fn trim(&self) -> Option<&TrimRangeController> {
        self.trim.as_ref()
    }

    pub fn current_range(&self) -> Option<TrimRange> {
        self.trim.as_ref().and_then(|t| t.current_range())
    }
}
