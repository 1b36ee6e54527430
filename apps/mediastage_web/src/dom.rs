use std::cell::{Cell, RefCell};
use std::rc::Rc;

use js_sys::{Array, Function, Object, Reflect};
use mediastage_ui::config::UiConfig;
use mediastage_ui::error::UiError;
use mediastage_ui::surface::*;
use tracing::warn;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast as _;
use web_sys::{Document, Element, Event, HtmlInputElement, HtmlMediaElement};

fn js_error(context: &str, err: JsValue) -> UiError {
    UiError::Dom(format!("{}: {:?}", context, err))
}

pub fn document() -> Result<Document, UiError> {
    web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| UiError::MissingElement("document".into()))
}

fn element(document: &Document, id: &str) -> Result<Element, UiError> {
    document
        .get_element_by_id(id)
        .ok_or_else(|| UiError::MissingElement(id.to_string()))
}

fn listen(target: &Element, event: &str, handler: Box<dyn FnMut(Event)>) {
    let closure = Closure::wrap(handler);
    if let Err(e) = target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref()) {
        warn!("failed to listen for {}: {:?}", event, e);
    }
    // Listeners live as long as the page.
    closure.forget();
}

// ---------------------------------------------------------------------------
// Buttons and list
// ---------------------------------------------------------------------------

pub struct WebButton(Element);

impl Button for WebButton {
    fn on_click(&self, mut handler: ClickHandler) {
        listen(&self.0, "click", Box::new(move |_event| handler()));
    }
}

struct ElementTarget(Element);

impl ClickTarget for ElementTarget {
    fn attribute(&self, name: &str) -> Option<String> {
        self.0.get_attribute(name)
    }
}

pub struct WebList {
    element: Element,
    document: Document,
}

impl WebList {
    pub fn element(&self) -> &Element {
        &self.element
    }
}

impl ListContainer for WebList {
    fn on_click(&self, mut handler: ListClickHandler) {
        listen(
            &self.element,
            "click",
            Box::new(move |event: Event| {
                if let Some(target) = event.target().and_then(|t| t.dyn_into::<Element>().ok()) {
                    handler(&ElementTarget(target));
                }
            }),
        );
    }

    fn clear(&self) {
        while let Some(child) = self.element.first_element_child() {
            child.remove();
        }
    }

    fn append(&self, entry: ListEntry) {
        let result = (|| -> Result<(), JsValue> {
            let li = self.document.create_element("li")?;
            li.set_text_content(Some(&entry.label));
            li.set_class_name(&entry.class);
            for (name, value) in &entry.attributes {
                li.set_attribute(name, value)?;
            }
            self.element.append_child(&li)?;
            Ok(())
        })();
        if let Err(e) = result {
            warn!("failed to render list entry: {:?}", e);
        }
    }

    fn len(&self) -> usize {
        self.element.children().length() as usize
    }
}

// ---------------------------------------------------------------------------
// Video and fields
// ---------------------------------------------------------------------------

pub struct WebVideo {
    element: HtmlMediaElement,
    pending: Rc<RefCell<Vec<Box<dyn FnOnce()>>>>,
}

impl WebVideo {
    fn new(element: HtmlMediaElement) -> Self {
        let pending: Rc<RefCell<Vec<Box<dyn FnOnce()>>>> = Rc::default();
        let queue = pending.clone();
        listen(
            &element,
            "loadedmetadata",
            Box::new(move |_event| {
                let listeners = queue.take();
                for listener in listeners {
                    listener();
                }
            }),
        );
        Self { element, pending }
    }
}

impl VideoElement for WebVideo {
    fn duration(&self) -> f64 {
        self.element.duration()
    }

    fn current_time(&self) -> f64 {
        self.element.current_time()
    }

    fn set_current_time(&self, secs: f64) {
        self.element.set_current_time(secs);
    }

    fn set_source(&self, url: &str) {
        self.element.set_src(url);
    }

    fn play(&self) {
        if let Err(e) = self.element.play() {
            warn!("playback refused: {:?}", e);
        }
    }

    fn on_metadata_loaded_once(&self, handler: Box<dyn FnOnce()>) {
        self.pending.borrow_mut().push(handler);
    }
}

/// An `<input>` or any element whose text stands in for a value.
pub struct WebField(Element);

impl TextField for WebField {
    fn value(&self) -> String {
        match self.0.dyn_ref::<HtmlInputElement>() {
            Some(input) => input.value(),
            None => self.0.text_content().unwrap_or_default(),
        }
    }

    fn set_value(&self, value: &str) {
        match self.0.dyn_ref::<HtmlInputElement>() {
            Some(input) => input.set_value(value),
            None => self.0.set_text_content(Some(value)),
        }
    }
}

// ---------------------------------------------------------------------------
// Slider
// ---------------------------------------------------------------------------

type UpdateClosure = Closure<dyn FnMut(JsValue, JsValue, JsValue)>;

/// Range widget built with the page's global `noUiSlider`.
pub struct WebSlider {
    id: String,
    element: Element,
    on_update: RefCell<Option<UpdateClosure>>,
}

impl WebSlider {
    fn instance(&self) -> Option<JsValue> {
        Reflect::get(&self.element, &JsValue::from_str("noUiSlider"))
            .ok()
            .filter(|v| !v.is_undefined() && !v.is_null())
    }

    fn method(target: &JsValue, name: &str) -> Result<Function, JsValue> {
        Reflect::get(target, &JsValue::from_str(name))?.dyn_into::<Function>()
    }

    fn options(options: &SliderOptions) -> Result<Object, JsValue> {
        let range = Object::new();
        Reflect::set(&range, &"min".into(), &options.min.into())?;
        Reflect::set(&range, &"max".into(), &options.max.into())?;

        let opts = Object::new();
        let start = Array::of2(&options.start[0].into(), &options.start[1].into());
        Reflect::set(&opts, &"start".into(), &start)?;
        Reflect::set(&opts, &"connect".into(), &JsValue::TRUE)?;
        Reflect::set(&opts, &"step".into(), &JsValue::from_f64(1.0))?;
        Reflect::set(&opts, &"range".into(), &range)?;
        Ok(opts)
    }

    fn create(&self, options: &SliderOptions, mut on_update: SliderUpdate) -> Result<(), JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let factory = Reflect::get(&window, &"noUiSlider".into())?;
        Self::method(&factory, "create")?.call2(&factory, &self.element, &Self::options(options)?)?;

        let instance = self.instance().ok_or_else(|| JsValue::from_str("slider missing after create"))?;

        // `update` also fires once per handle while binding; skip that burst.
        let armed = Rc::new(Cell::new(false));
        let gate = armed.clone();
        let closure: UpdateClosure = Closure::wrap(Box::new(
            move |_values: JsValue, handle: JsValue, unencoded: JsValue| {
                if !gate.get() {
                    return;
                }
                let index = handle.as_f64().unwrap_or(-1.0);
                let Some(handle) = Handle::from_index(index as usize).filter(|_| index >= 0.0) else {
                    return;
                };
                if let Some(value) = Array::from(&unencoded).get(handle.index() as u32).as_f64() {
                    on_update(handle, value);
                }
            },
        ) as Box<dyn FnMut(JsValue, JsValue, JsValue)>);
        Self::method(&instance, "on")?.call2(&instance, &"update".into(), closure.as_ref())?;
        armed.set(true);
        *self.on_update.borrow_mut() = Some(closure);
        Ok(())
    }
}

fn number(value: JsValue) -> Option<f64> {
    value
        .as_f64()
        .or_else(|| value.as_string().and_then(|s| s.parse().ok()))
}

impl SliderHost for WebSlider {
    fn build(&self, options: SliderOptions, on_update: SliderUpdate) -> Result<(), UiError> {
        if self.is_built() {
            return Err(UiError::SliderAlreadyBuilt(self.id.clone()));
        }
        self.create(&options, on_update)
            .map_err(|e| js_error("building trim slider", e))
    }

    fn is_built(&self) -> bool {
        self.instance().is_some()
    }

    fn values(&self) -> Option<[f64; 2]> {
        let instance = self.instance()?;
        let values = Self::method(&instance, "get")
            .and_then(|get| get.call1(&instance, &JsValue::TRUE))
            .ok()?;
        let values = Array::from(&values);
        Some([number(values.get(0))?, number(values.get(1))?])
    }

    fn destroy(&self) {
        if let Some(instance) = self.instance() {
            let result = Self::method(&instance, "destroy").and_then(|d| d.call0(&instance));
            if let Err(e) = result {
                warn!("failed to destroy trim slider: {:?}", e);
            }
        }
        self.on_update.borrow_mut().take();
    }
}

// ---------------------------------------------------------------------------
// Page
// ---------------------------------------------------------------------------

/// Look up every element named in `config`. Fails on the first missing one.
pub fn page(config: &UiConfig) -> Result<(Page, Rc<WebList>), UiError> {
    let document = document()?;
    let ids = &config.elements;

    let player = element(&document, &ids.media_player)?
        .dyn_into::<HtmlMediaElement>()
        .map_err(|_| UiError::MissingElement(ids.media_player.clone()))?;
    let video: Rc<WebVideo> = Rc::new(WebVideo::new(player));
    let list = Rc::new(WebList {
        element: element(&document, &ids.media_list)?,
        document: document.clone(),
    });

    let page = Page {
        refresh_button: Rc::new(WebButton(element(&document, &ids.refresh_button)?)),
        clear_button: Rc::new(WebButton(element(&document, &ids.clear_button)?)),
        media_list: list.clone(),
        trim: TrimSurfaces {
            video: video.clone(),
            slider: Rc::new(WebSlider {
                id: ids.trim_slider.clone(),
                element: element(&document, &ids.trim_slider)?,
                on_update: RefCell::new(None),
            }),
            start_field: Rc::new(WebField(element(&document, &ids.trim_start)?)),
            end_field: Rc::new(WebField(element(&document, &ids.trim_end)?)),
            max_field: Rc::new(WebField(element(&document, &ids.max_trim)?)),
        },
    };
    Ok((page, list))
}
