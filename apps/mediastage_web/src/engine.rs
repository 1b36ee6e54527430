use js_sys::{Array, Function, Promise, Reflect};
use mediastage_core::types::{IdAttribute, MediaId, StagedMediaItem};
use mediastage_ui::engine::Engine;
use mediastage_ui::error::{Result, UiError};
use tokio::sync::watch;
use tracing::{debug, info, warn};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast as _;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{Element, MutationObserver, MutationObserverInit};

const INITIALIZE: &[&str] = &["default", "init", "initialize"];
const LOAD: &[&str] = &["load_staged_media", "loadStagedMedia"];
const CLEAR: &[&str] = &["clear_staged_media", "clearStagedMedia"];
const ACTIVATE: &[&str] = &["activate_media", "activateMedia"];
const PLAY: &[&str] = &["play_media", "playMedia"];
const TRIGGER: &[&str] = &["trigger", "testing"];

/// The compiled engine, reached through its JS module object. Entry point
/// names drifted between engine builds, so each command tries every known
/// spelling.
pub struct JsEngine {
    module: JsValue,
    rendered: watch::Receiver<Vec<StagedMediaItem>>,
}

impl JsEngine {
    /// Wrap the engine module and watch `list` for the engine's renders.
    pub fn new(module: JsValue, list: &Element, attribute: IdAttribute) -> Result<Self> {
        let (tx, rendered) = watch::channel(Vec::new());
        observe_list(list, attribute, tx)?;
        Ok(Self { module, rendered })
    }

    fn entry_point(&self, names: &[&str]) -> Option<Function> {
        names.iter().find_map(|name| {
            Reflect::get(&self.module, &JsValue::from_str(name))
                .ok()
                .and_then(|f| f.dyn_into::<Function>().ok())
        })
    }

    fn call(&self, names: &[&str], args: &[JsValue]) -> Option<JsValue> {
        let Some(function) = self.entry_point(names) else {
            warn!(entry = names[0], "engine does not export entry point");
            return None;
        };
        let args: Array = args.iter().collect();
        match function.apply(&JsValue::NULL, &args) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(entry = names[0], "engine call threw: {:?}", e);
                None
            }
        }
    }

    /// Fire a command, logging a rejected promise instead of awaiting it.
    fn dispatch(&self, names: &'static [&'static str], args: &[JsValue]) {
        let Some(value) = self.call(names, args) else {
            return;
        };
        if let Ok(promise) = value.dyn_into::<Promise>() {
            spawn_local(async move {
                if let Err(e) = JsFuture::from(promise).await {
                    warn!(entry = names[0], "engine command failed: {:?}", e);
                }
            });
        }
    }
}

impl Engine for JsEngine {
    async fn initialize(&self) -> Result<()> {
        let value = self
            .call(INITIALIZE, &[])
            .ok_or_else(|| UiError::EngineInit("no initializer exported".into()))?;
        let promise = Promise::resolve(&value);
        JsFuture::from(promise)
            .await
            .map_err(|e| UiError::EngineInit(format!("{:?}", e)))?;
        info!("media engine initialized");
        Ok(())
    }

    fn load_staged_media(&self) {
        self.dispatch(LOAD, &[]);
    }

    fn clear_staged_media(&self) {
        self.dispatch(CLEAR, &[]);
    }

    fn activate_media(&self, id: &MediaId) {
        self.dispatch(ACTIVATE, &[JsValue::from_str(id.as_str())]);
    }

    fn play_media(&self, id: &MediaId) {
        self.dispatch(PLAY, &[JsValue::from_str(id.as_str())]);
    }

    fn trigger(&self) {
        self.dispatch(TRIGGER, &[]);
    }

    fn subscribe(&self) -> watch::Receiver<Vec<StagedMediaItem>> {
        self.rendered.clone()
    }
}

/// Read the rendered items back out of the list container.
fn rendered_items(list: &Element, attribute: IdAttribute) -> Vec<StagedMediaItem> {
    let children = list.children();
    (0..children.length())
        .filter_map(|i| children.item(i))
        .filter_map(|child| {
            let id = MediaId::from_attribute(child.get_attribute(attribute.attribute_name())?);
            Some(StagedMediaItem::new(id, child.text_content().unwrap_or_default()))
        })
        .collect()
}

fn observe_list(
    list: &Element,
    attribute: IdAttribute,
    rendered: watch::Sender<Vec<StagedMediaItem>>,
) -> Result<()> {
    let target = list.clone();
    let callback = Closure::wrap(Box::new(move |_records: JsValue, _observer: JsValue| {
        let items = rendered_items(&target, attribute);
        debug!(count = items.len(), "engine re-rendered the list");
        rendered.send_replace(items);
    }) as Box<dyn FnMut(JsValue, JsValue)>);

    let observer = MutationObserver::new(callback.as_ref().unchecked_ref())
        .map_err(|e| UiError::Dom(format!("creating list observer: {:?}", e)))?;
    let init = MutationObserverInit::new();
    init.set_child_list(true);
    observer
        .observe_with_options(list, &init)
        .map_err(|e| UiError::Dom(format!("observing list: {:?}", e)))?;
    // Observer and callback live as long as the page.
    callback.forget();
    Ok(())
}
