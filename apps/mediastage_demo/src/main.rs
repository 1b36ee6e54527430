use std::rc::Rc;

use anyhow::{Context, Result};
use mediastage_core::descriptor::MediaDescriptor;
use mediastage_core::trim::TrimDetail;
use mediastage_ui::bootstrap::Bootstrap;
use mediastage_ui::config::UiConfig;
use mediastage_ui::engine::staging::{StagingEngine, StaticCatalog};
use mediastage_ui::memory::MemoryPage;
use mediastage_ui::surface::{Handle, TextField, VideoElement};

fn sample_catalog() -> StaticCatalog {
    let media = ["helmet cam", "chest cam", "phone"]
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let mut content_hash = [0u8; 32];
            content_hash[0] = i as u8 + 1;
            MediaDescriptor {
                device_name: name.to_string(),
                content_hash,
                size: 64 * 1024 * 1024,
                uuid: uuid::Uuid::new_v4(),
                trim: (i == 1).then_some(TrimDetail { start: 10, end: 40 }),
            }
        })
        .collect();
    StaticCatalog::new(media)
}

fn load_catalog(path: Option<&String>) -> Result<StaticCatalog> {
    match path {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("reading catalog {}", path))?;
            StaticCatalog::from_json(&json).with_context(|| format!("parsing catalog {}", path))
        }
        None => Ok(sample_catalog()),
    }
}

fn load_config(path: Option<&String>) -> Result<UiConfig> {
    match path {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path))?;
            UiConfig::from_json(&json).with_context(|| format!("parsing config {}", path))
        }
        None => Ok(UiConfig::default()),
    }
}

// Usage: mediastage-demo [catalog.json] [config.json]
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let catalog = load_catalog(args.first())?;
    let config = load_config(args.get(1))?;

    let page = MemoryPage::new();
    let engine = Rc::new(StagingEngine::new(
        catalog,
        page.media_list.clone(),
        page.player.clone(),
        config.clone(),
    ));
    let controller = Bootstrap::new(engine, page.page(), config)
        .run()
        .await
        .context("bootstrapping staging page")?;

    for (i, entry) in page.media_list.entries().iter().enumerate() {
        tracing::info!("#{} {}", i, entry.label);
    }
    if page.media_list.entries().is_empty() {
        tracing::info!("nothing staged");
        return Ok(());
    }

    // Select every item in turn and pretend each clip is a little longer.
    for index in 0..page.media_list.entries().len() {
        page.media_list.click_entry(index);
        let duration = 60.0 * (index as f64 + 1.0) + 0.5;
        page.player.load_metadata(duration);
        tracing::info!(
            "selected {:?}, source {:?}, range {:?}, max {}",
            controller.active().map(|id| id.to_string()),
            page.player.source(),
            controller.current_range().map(|r| r.to_string()),
            page.max_trim.value(),
        );
    }

    page.trim_slider.drag(Handle::Start, 12.4);
    page.trim_slider.drag(Handle::End, 47.9);
    tracing::info!(
        "dragged: start field {}, end field {}, playhead {}",
        page.trim_start.value(),
        page.trim_end.value(),
        page.player.current_time(),
    );

    if let Some(range) = controller.current_range() {
        let detail = range.to_detail();
        tracing::info!(
            "trim {} -> {} (suffix {})",
            detail.start_as_ffmpeg(),
            detail.end_as_ffmpeg(),
            detail.tweak_name(),
        );
    }

    controller.play_active();
    page.clear_button.click();
    tracing::info!("after clear: {} items rendered", controller.rendered_len());
    Ok(())
}
