use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use mediastage_core::descriptor::{parse_listing, MediaDescriptor};
use mediastage_core::types::{dedup_by_id, MediaId, StagedMediaItem};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::Engine;
use crate::config::UiConfig;
use crate::error::{Result, UiError};
use crate::surface::{ListContainer, ListEntry, VideoElement};

/// Source of the staged media listing.
pub trait MediaCatalog {
    fn staged_media(&self) -> Result<Vec<MediaDescriptor>>;

    /// Drop every staged item.
    fn purge(&self) -> Result<()>;
}

/// Catalog backed by a fixed listing held in memory.
#[derive(Debug, Default)]
pub struct StaticCatalog {
    media: RefCell<Vec<MediaDescriptor>>,
}

impl StaticCatalog {
    pub fn new(media: Vec<MediaDescriptor>) -> Self {
        Self {
            media: RefCell::new(media),
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(Self::new(parse_listing(json)?))
    }

    pub fn replace(&self, media: Vec<MediaDescriptor>) {
        *self.media.borrow_mut() = media;
    }
}

impl MediaCatalog for StaticCatalog {
    fn staged_media(&self) -> Result<Vec<MediaDescriptor>> {
        Ok(self.media.borrow().clone())
    }

    fn purge(&self) -> Result<()> {
        self.media.borrow_mut().clear();
        Ok(())
    }
}

/// Engine that renders a catalog into the page.
///
/// The list container is rebuilt wholesale on every load and clear, and the
/// rendered items are published to subscribers afterwards. Activating an
/// item points the player at its streaming URL. The media server streams by
/// content hash only, so items rendered under their uuid are mapped back to
/// their hash; an id outside the last listing is streamed as given.
pub struct StagingEngine<C> {
    catalog: C,
    list: Rc<dyn ListContainer>,
    player: Rc<dyn VideoElement>,
    config: UiConfig,
    ready: Cell<bool>,
    streams: RefCell<HashMap<MediaId, MediaId>>,
    rendered: watch::Sender<Vec<StagedMediaItem>>,
}

impl<C: MediaCatalog> StagingEngine<C> {
    pub fn new(
        catalog: C,
        list: Rc<dyn ListContainer>,
        player: Rc<dyn VideoElement>,
        config: UiConfig,
    ) -> Self {
        let (rendered, _) = watch::channel(Vec::new());
        Self {
            catalog,
            list,
            player,
            config,
            ready: Cell::new(false),
            streams: RefCell::default(),
            rendered,
        }
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    fn ensure_ready(&self, command: &str) -> bool {
        if !self.ready.get() {
            warn!(command, "engine command before initialization ignored");
        }
        self.ready.get()
    }

    fn render(&self, items: Vec<StagedMediaItem>) {
        self.list.clear();
        let attribute = self.config.id_attribute_name();
        for item in &items {
            self.list.append(ListEntry {
                label: item.display.label.clone(),
                class: self.config.list_item_class.clone(),
                attributes: vec![(attribute.to_string(), item.id.to_string())],
            });
        }
        debug!(count = items.len(), "rendered staged media");
        self.rendered.send_replace(items);
    }

    fn point_player_at(&self, id: &MediaId) {
        let stream = self.streams.borrow().get(id).cloned();
        let url = self.config.media_url(stream.as_ref().unwrap_or(id));
        debug!(%url, "loading media into player");
        self.player.set_source(&url);
    }
}

impl<C: MediaCatalog> Engine for StagingEngine<C> {
    async fn initialize(&self) -> Result<()> {
        // A catalog that cannot list is as good as an engine that failed to load.
        self.catalog
            .staged_media()
            .map_err(|e| UiError::EngineInit(e.to_string()))?;
        self.ready.set(true);
        info!("staging engine ready");
        Ok(())
    }

    fn load_staged_media(&self) {
        if !self.ensure_ready("load") {
            return;
        }
        let items = match self.catalog.staged_media() {
            Ok(media) => {
                let attribute = self.config.id_attribute;
                let mut streams = HashMap::new();
                for d in &media {
                    streams
                        .entry(d.id(attribute))
                        .or_insert_with(|| MediaId::from_content_hash(&d.content_hash));
                }
                *self.streams.borrow_mut() = streams;
                let mut items: Vec<_> = media.iter().map(|d| d.to_item(attribute)).collect();
                let dropped = dedup_by_id(&mut items);
                if dropped > 0 {
                    warn!(dropped, "duplicate staged media ids dropped");
                }
                items
            }
            Err(e) => {
                warn!("failed to list staged media: {}", e);
                Vec::new()
            }
        };
        info!(count = items.len(), "staged media loaded");
        self.render(items);
    }

    fn clear_staged_media(&self) {
        if !self.ensure_ready("clear") {
            return;
        }
        if let Err(e) = self.catalog.purge() {
            warn!("failed to purge staged media: {}", e);
        }
        self.streams.borrow_mut().clear();
        info!("staged media cleared");
        self.render(Vec::new());
    }

    fn activate_media(&self, id: &MediaId) {
        if !self.ensure_ready("activate") {
            return;
        }
        info!(%id, "activating media");
        self.point_player_at(id);
    }

    fn play_media(&self, id: &MediaId) {
        if !self.ensure_ready("play") {
            return;
        }
        info!(%id, "playing media");
        self.point_player_at(id);
        self.player.play();
    }

    fn trigger(&self) {
        debug!(
            ready = self.ready.get(),
            rendered = self.list.len(),
            "engine trigger"
        );
    }

    fn subscribe(&self) -> watch::Receiver<Vec<StagedMediaItem>> {
        self.rendered.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryPage;
    use mediastage_core::trim::TrimDetail;
    use uuid::Uuid;

    fn descriptor(name: &str, first_byte: u8) -> MediaDescriptor {
        let mut content_hash = [0u8; 32];
        content_hash[0] = first_byte;
        MediaDescriptor {
            device_name: name.to_string(),
            content_hash,
            size: 10,
            uuid: Uuid::new_v4(),
            trim: None,
        }
    }

    fn engine(page: &MemoryPage, media: Vec<MediaDescriptor>) -> StagingEngine<StaticCatalog> {
        StagingEngine::new(
            StaticCatalog::new(media),
            page.media_list.clone(),
            page.player.clone(),
            UiConfig::default(),
        )
    }

    struct BrokenCatalog;

    impl MediaCatalog for BrokenCatalog {
        fn staged_media(&self) -> Result<Vec<MediaDescriptor>> {
            Err(UiError::Catalog("offline".into()))
        }

        fn purge(&self) -> Result<()> {
            Err(UiError::Catalog("offline".into()))
        }
    }

    #[tokio::test]
    async fn load_renders_items_with_identifier() {
        let page = MemoryPage::new();
        let engine = engine(&page, vec![descriptor("gopro", 0xaa), descriptor("phone", 0xbb)]);
        let rx = engine.subscribe();
        engine.initialize().await.unwrap();
        engine.load_staged_media();

        let entries = page.media_list.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].label, "gopro");
        assert_eq!(entries[0].class, "pure-menu-item media-list-item");
        let hash = entries[1].attributes[0].clone();
        assert_eq!(hash.0, "data-content-hash");
        assert!(hash.1.starts_with("bb"));
        assert_eq!(rx.borrow().len(), 2);
    }

    #[tokio::test]
    async fn reload_replaces_list_wholesale() {
        let page = MemoryPage::new();
        let engine = engine(&page, vec![descriptor("gopro", 1)]);
        engine.initialize().await.unwrap();
        engine.load_staged_media();
        engine.catalog().replace(vec![descriptor("a", 2), descriptor("b", 3), descriptor("c", 4)]);
        engine.load_staged_media();
        assert_eq!(page.media_list.len(), 3);
    }

    #[tokio::test]
    async fn duplicate_ids_render_once() {
        let page = MemoryPage::new();
        let engine = engine(&page, vec![descriptor("gopro", 7), descriptor("gopro again", 7)]);
        engine.initialize().await.unwrap();
        engine.load_staged_media();
        assert_eq!(page.media_list.len(), 1);
    }

    #[tokio::test]
    async fn clear_purges_and_pushes_empty_list() {
        let page = MemoryPage::new();
        let engine = engine(&page, vec![descriptor("gopro", 1)]);
        let rx = engine.subscribe();
        engine.initialize().await.unwrap();
        engine.load_staged_media();
        engine.clear_staged_media();
        assert!(page.media_list.is_empty());
        assert!(rx.borrow().is_empty());
        engine.load_staged_media();
        assert!(page.media_list.is_empty());
    }

    #[tokio::test]
    async fn commands_before_initialize_are_ignored() {
        let page = MemoryPage::new();
        let engine = engine(&page, vec![descriptor("gopro", 1)]);
        engine.load_staged_media();
        engine.activate_media(&MediaId::new("x").unwrap());
        assert!(page.media_list.is_empty());
        assert!(page.player.source().is_none());
    }

    #[tokio::test]
    async fn activate_and_play_point_player_at_stream() {
        let page = MemoryPage::new();
        let engine = engine(&page, vec![]);
        engine.initialize().await.unwrap();
        let id = MediaId::new("cafe").unwrap();

        engine.activate_media(&id);
        assert_eq!(page.player.source().as_deref(), Some("http://localhost:8000/api/media/cafe"));
        assert!(!page.player.is_playing());

        engine.play_media(&id);
        assert!(page.player.is_playing());
    }

    #[tokio::test]
    async fn uuid_listing_streams_by_content_hash() {
        let page = MemoryPage::new();
        let config = UiConfig::from_json(r#"{ "id_attribute": "uuid" }"#).unwrap();
        let d = descriptor("gopro", 0xab);
        let uuid_id = MediaId::from_uuid(d.uuid);
        let hash = MediaId::from_content_hash(&d.content_hash);
        let engine = StagingEngine::new(
            StaticCatalog::new(vec![d]),
            page.media_list.clone(),
            page.player.clone(),
            config,
        );
        engine.initialize().await.unwrap();
        engine.load_staged_media();

        assert_eq!(page.media_list.entries()[0].attributes[0].1, uuid_id.to_string());
        engine.activate_media(&uuid_id);
        assert_eq!(
            page.player.source(),
            Some(format!("http://localhost:8000/api/media/{hash}"))
        );
    }

    #[tokio::test]
    async fn trigger_leaves_page_untouched() {
        let page = MemoryPage::new();
        let engine = engine(&page, vec![descriptor("gopro", 1)]);
        engine.initialize().await.unwrap();
        engine.load_staged_media();
        engine.trigger();
        assert_eq!(page.media_list.len(), 1);
        assert!(page.player.source().is_none());
    }

    #[tokio::test]
    async fn broken_catalog_fails_initialize() {
        let page = MemoryPage::new();
        let engine = StagingEngine::new(
            BrokenCatalog,
            page.media_list.clone(),
            page.player.clone(),
            UiConfig::default(),
        );
        assert!(matches!(engine.initialize().await, Err(UiError::EngineInit(_))));
    }

    #[tokio::test]
    async fn stored_trim_travels_with_item() {
        let page = MemoryPage::new();
        let mut d = descriptor("gopro", 1);
        d.trim = Some(TrimDetail { start: 4, end: 9 });
        let engine = engine(&page, vec![d]);
        let rx = engine.subscribe();
        engine.initialize().await.unwrap();
        engine.load_staged_media();
        assert_eq!(rx.borrow()[0].trim, Some(TrimDetail { start: 4, end: 9 }));
    }
}
