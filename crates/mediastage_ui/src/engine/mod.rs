pub mod staging;

use std::future::Future;

use mediastage_core::types::{MediaId, StagedMediaItem};
use tokio::sync::watch;

use crate::error::Result;

/// Entry points of the media engine.
///
/// `initialize` must resolve before anything else is called. The other
/// commands are fire-and-forget: results reach the page by the engine
/// mutating it, and the rendered list is announced through `subscribe`.
pub trait Engine {
    fn initialize(&self) -> impl Future<Output = Result<()>>;

    fn load_staged_media(&self);

    fn clear_staged_media(&self);

    fn activate_media(&self, id: &MediaId);

    fn play_media(&self, id: &MediaId);

    /// Diagnostic hook with no defined effect.
    fn trigger(&self) {}

    /// Receiver that observes every list the engine renders.
    fn subscribe(&self) -> watch::Receiver<Vec<StagedMediaItem>>;
}

#[cfg(test)]
pub(crate) mod testing {
    use std::cell::{Cell, RefCell};

    use super::*;
    use crate::error::UiError;

    #[derive(Debug, Clone, PartialEq)]
    pub enum EngineCall {
        Load,
        Clear,
        Activate(MediaId),
        Play(MediaId),
        Trigger,
    }

    /// Engine double that records every command it receives.
    pub struct RecordingEngine {
        pub calls: RefCell<Vec<EngineCall>>,
        pub initialized: Cell<bool>,
        fail_init: bool,
        list: watch::Sender<Vec<StagedMediaItem>>,
    }

    impl RecordingEngine {
        pub fn new() -> Self {
            Self::with_init_result(false)
        }

        pub fn failing() -> Self {
            Self::with_init_result(true)
        }

        fn with_init_result(fail_init: bool) -> Self {
            let (list, _) = watch::channel(Vec::new());
            Self {
                calls: RefCell::new(Vec::new()),
                initialized: Cell::new(false),
                fail_init,
                list,
            }
        }

        /// Push a rendered list as the engine would after a load.
        pub fn publish(&self, items: Vec<StagedMediaItem>) {
            self.list.send_replace(items);
        }

        pub fn calls(&self) -> Vec<EngineCall> {
            self.calls.borrow().clone()
        }

        pub fn count(&self, call: &EngineCall) -> usize {
            self.calls.borrow().iter().filter(|c| *c == call).count()
        }
    }

    impl Engine for RecordingEngine {
        async fn initialize(&self) -> Result<()> {
            if self.fail_init {
                return Err(UiError::EngineInit("module failed to load".into()));
            }
            self.initialized.set(true);
            Ok(())
        }

        fn load_staged_media(&self) {
            self.calls.borrow_mut().push(EngineCall::Load);
        }

        fn clear_staged_media(&self) {
            self.calls.borrow_mut().push(EngineCall::Clear);
        }

        fn activate_media(&self, id: &MediaId) {
            self.calls.borrow_mut().push(EngineCall::Activate(id.clone()));
        }

        fn play_media(&self, id: &MediaId) {
            self.calls.borrow_mut().push(EngineCall::Play(id.clone()));
        }

        fn trigger(&self) {
            self.calls.borrow_mut().push(EngineCall::Trigger);
        }

        fn subscribe(&self) -> watch::Receiver<Vec<StagedMediaItem>> {
            self.list.subscribe()
        }
    }
}
