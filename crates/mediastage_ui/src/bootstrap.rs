use std::rc::Rc;

use tracing::{error, info};

use crate::config::UiConfig;
use crate::engine::Engine;
use crate::error::Result;
use crate::media_list::MediaListController;
use crate::surface::Page;

/// Page-load sequence: wait for the engine, wire the listeners, load the
/// initial list.
///
/// `run` consumes the sequencer, so one `Bootstrap` wires a page at most
/// once.
pub struct Bootstrap<E> {
    engine: Rc<E>,
    page: Page,
    config: UiConfig,
}

impl<E: Engine + 'static> Bootstrap<E> {
    pub fn new(engine: Rc<E>, page: Page, config: UiConfig) -> Self {
        Self {
            engine,
            page,
            config,
        }
    }

    /// On failure nothing is wired and the page stays inert.
    ///
    /// The returned controller owns the wiring; listeners stop reacting once
    /// it is dropped.
    pub async fn run(self) -> Result<Rc<MediaListController<E>>> {
        info!("waiting for media engine");
        if let Err(e) = self.engine.initialize().await {
            error!("media engine unavailable, page left inert: {}", e);
            return Err(e);
        }

        let controller = Rc::new(MediaListController::new(
            self.engine.clone(),
            self.page,
            self.config,
        ));
        controller.wire();
        self.engine.load_staged_media();
        info!("staging page ready");
        Ok(controller)
    }
}
