#![cfg(target_arch = "wasm32")]

mod dom;
mod engine;

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use mediastage_ui::bootstrap::Bootstrap;
use mediastage_ui::config::UiConfig;
use mediastage_ui::media_list::MediaListController;
use wasm_bindgen::prelude::*;

use crate::engine::JsEngine;

thread_local! {
    static STARTED: Cell<bool> = const { Cell::new(false) };
    static UI: RefCell<Option<Rc<MediaListController<JsEngine>>>> = const { RefCell::new(None) };
}

fn to_js(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Route panics and `tracing` output to the browser console.
fn install_diagnostics() {
    console_error_panic_hook::set_once();
    if tracing_wasm::try_set_as_global_default().is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}

/// Wire the page against `engine_module`. A second call is refused.
///
/// ```js
/// import * as engine from '/wasm/engine.js';
/// import init, { start } from '/wasm/mediastage_web.js';
/// await init();
/// await start(engine);
/// ```
#[wasm_bindgen]
pub async fn start(engine_module: JsValue, config_json: Option<String>) -> Result<(), JsValue> {
    if STARTED.with(|started| started.replace(true)) {
        return Err(JsValue::from_str("staging page already started"));
    }
    install_diagnostics();

    let config = match config_json {
        Some(json) => UiConfig::from_json(&json).map_err(to_js)?,
        None => UiConfig::default(),
    };
    let (page, list) = dom::page(&config).map_err(to_js)?;
    let engine = Rc::new(JsEngine::new(engine_module, list.element(), config.id_attribute).map_err(to_js)?);

    let controller = Bootstrap::new(engine, page, config).run().await.map_err(to_js)?;
    UI.with(|ui| *ui.borrow_mut() = Some(controller));
    Ok(())
}

/// Current trim as `[start, end]` seconds, or `undefined` without an
/// active slider.
#[wasm_bindgen]
pub fn current_trim() -> Option<Vec<u32>> {
    UI.with(|ui| {
        let ui = ui.borrow();
        let range = ui.as_ref()?.current_range()?;
        Some(vec![range.start(), range.end()])
    })
}

/// Forward the engine's diagnostic `trigger`. Does nothing before `start`.
#[wasm_bindgen]
pub fn trigger() {
    UI.with(|ui| {
        if let Some(controller) = ui.borrow().as_ref() {
            controller.trigger();
        }
    });
}

/// Play the selected item. Returns false when nothing is selected.
#[wasm_bindgen]
pub fn play_selection() -> bool {
    UI.with(|ui| ui.borrow().as_ref().is_some_and(|c| c.play_active()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasm_bindgen_test::wasm_bindgen_test;

    #[wasm_bindgen_test]
    fn diagnostics_install_once_and_tolerate_repeats() {
        install_diagnostics();
        assert!(tracing::dispatcher::has_been_set());
        install_diagnostics();
        assert!(tracing::dispatcher::has_been_set());
    }

    #[wasm_bindgen_test]
    fn exports_are_inert_before_start() {
        trigger();
        assert!(current_trim().is_none());
        assert!(!play_selection());
    }
}
