use std::cell::RefCell;
use std::rc::{Rc, Weak};

use mediastage_core::trim::TrimRange;
use mediastage_core::types::{MediaId, StagedMediaItem};
use tokio::sync::watch;
use tracing::{debug, info};

use crate::config::UiConfig;
use crate::engine::Engine;
use crate::session::PreviewSession;
use crate::surface::{Button, ClickTarget, ListContainer, Page};

/// Turns clicks on the staging page into engine commands.
///
/// A list click activates the clicked item through `activate_media`; that
/// is the only entry point the list is wired to. `play_media` is reachable
/// through [`MediaListController::play_active`] for hosts with a separate
/// play control.
pub struct MediaListController<E> {
    engine: Rc<E>,
    page: Page,
    config: UiConfig,
    session: RefCell<PreviewSession>,
    items: watch::Receiver<Vec<StagedMediaItem>>,
}

impl<E: Engine + 'static> MediaListController<E> {
    pub fn new(engine: Rc<E>, page: Page, config: UiConfig) -> Self {
        let items = engine.subscribe();
        let session = RefCell::new(PreviewSession::new(page.trim.clone()));
        Self {
            engine,
            page,
            config,
            session,
            items,
        }
    }

    /// Attach the refresh, clear and list listeners.
    pub(crate) fn wire(self: &Rc<Self>) {
        let this = Rc::downgrade(self);
        self.page.refresh_button.on_click(Box::new(move || {
            if let Some(this) = Weak::upgrade(&this) {
                this.refresh();
            }
        }));

        let this = Rc::downgrade(self);
        self.page.clear_button.on_click(Box::new(move || {
            if let Some(this) = Weak::upgrade(&this) {
                this.clear();
            }
        }));

        // One listener for the whole list; items come and go with every render.
        let this = Rc::downgrade(self);
        self.page.media_list.on_click(Box::new(move |target| {
            if let Some(this) = Weak::upgrade(&this) {
                this.handle_list_click(target);
            }
        }));
        debug!("media list listeners wired");
    }

    pub fn refresh(&self) {
        info!("refreshing staged media");
        self.session.borrow_mut().reset();
        self.engine.load_staged_media();
    }

    pub fn clear(&self) {
        info!("clearing staged media");
        self.session.borrow_mut().reset();
        self.engine.clear_staged_media();
    }

    pub fn handle_list_click(&self, target: &dyn ClickTarget) {
        let attribute = self.config.id_attribute_name();
        let Some(raw) = target.attribute(attribute) else {
            debug!(attribute, "click without an item identifier ignored");
            return;
        };
        self.select(MediaId::from_attribute(raw));
    }

    /// Activate `id` with a fresh trim controller.
    pub fn select(&self, id: MediaId) {
        let stored = self
            .items
            .borrow()
            .iter()
            .find(|item| item.id == id)
            .and_then(|item| item.trim.clone());
        info!(%id, "selecting media");
        // The controller listens for metadata before the engine swaps the source.
        self.session.borrow_mut().begin(id.clone(), stored.as_ref());
        self.engine.activate_media(&id);
    }

    /// Start playback of the active item. Returns false when nothing is
    /// selected.
    pub fn play_active(&self) -> bool {
        let active = self.session.borrow().active().cloned();
        match active {
            Some(id) => {
                self.engine.play_media(&id);
                true
            }
            None => false,
        }
    }

    /// Pass the diagnostic trigger through to the engine. Selection and
    /// trim are left alone.
    pub fn trigger(&self) {
        debug!("engine trigger requested");
        self.engine.trigger();
    }

    pub fn active(&self) -> Option<MediaId> {
        self.session.borrow().active().cloned()
    }

    pub fn current_range(&self) -> Option<TrimRange> {
        self.session.borrow().current_range()
    }

    /// Snapshot of the list the engine last rendered.
    pub fn items(&self) -> Vec<StagedMediaItem> {
        self.items.borrow().clone()
    }

    /// Observe every list the engine renders.
    pub fn subscribe(&self) -> watch::Receiver<Vec<StagedMediaItem>> {
        self.items.clone()
    }

    pub fn rendered_len(&self) -> usize {
        self.page.media_list.len()
    }
}
