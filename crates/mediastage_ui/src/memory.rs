use std::cell::{Cell, RefCell};
use std::rc::Rc;

use tracing::debug;

use crate::error::{Result, UiError};
use crate::surface::*;

// ---------------------------------------------------------------------------
// Button
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MemoryButton {
    handlers: RefCell<Vec<ClickHandler>>,
}

impl MemoryButton {
    pub fn click(&self) {
        let mut running = self.handlers.take();
        for handler in running.iter_mut() {
            handler();
        }
        // Handlers registered while dispatching go after the existing ones.
        let mut added = self.handlers.take();
        running.append(&mut added);
        *self.handlers.borrow_mut() = running;
    }

    pub fn listener_count(&self) -> usize {
        self.handlers.borrow().len()
    }
}

impl Button for MemoryButton {
    fn on_click(&self, handler: ClickHandler) {
        self.handlers.borrow_mut().push(handler);
    }
}

// ---------------------------------------------------------------------------
// List container
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MemoryList {
    entries: RefCell<Vec<ListEntry>>,
    handlers: RefCell<Vec<ListClickHandler>>,
}

impl MemoryList {
    pub fn entries(&self) -> Vec<ListEntry> {
        self.entries.borrow().clone()
    }

    /// Click the rendered entry at `index`. Returns false if there is none.
    pub fn click_entry(&self, index: usize) -> bool {
        let target = match self.entries.borrow().get(index) {
            Some(entry) => entry.clone(),
            None => return false,
        };
        self.dispatch(&target);
        true
    }

    /// Click a node inside the container that is not a list item.
    pub fn click_padding(&self) {
        self.dispatch(&ListEntry::default());
    }

    pub fn listener_count(&self) -> usize {
        self.handlers.borrow().len()
    }

    fn dispatch(&self, target: &dyn ClickTarget) {
        let mut running = self.handlers.take();
        for handler in running.iter_mut() {
            handler(target);
        }
        let mut added = self.handlers.take();
        running.append(&mut added);
        *self.handlers.borrow_mut() = running;
    }
}

impl ListContainer for MemoryList {
    fn on_click(&self, handler: ListClickHandler) {
        self.handlers.borrow_mut().push(handler);
    }

    fn clear(&self) {
        self.entries.borrow_mut().clear();
    }

    fn append(&self, entry: ListEntry) {
        self.entries.borrow_mut().push(entry);
    }

    fn len(&self) -> usize {
        self.entries.borrow().len()
    }
}

// ---------------------------------------------------------------------------
// Video
// ---------------------------------------------------------------------------

pub struct MemoryVideo {
    duration: Cell<f64>,
    current_time: Cell<f64>,
    source: RefCell<Option<String>>,
    playing: Cell<bool>,
    metadata_listeners: RefCell<Vec<Box<dyn FnOnce()>>>,
}

impl Default for MemoryVideo {
    fn default() -> Self {
        Self {
            duration: Cell::new(f64::NAN),
            current_time: Cell::new(0.0),
            source: RefCell::new(None),
            playing: Cell::new(false),
            metadata_listeners: RefCell::new(Vec::new()),
        }
    }
}

impl MemoryVideo {
    /// Simulate `loadedmetadata` for the current source.
    pub fn load_metadata(&self, duration: f64) {
        self.duration.set(duration);
        let listeners = self.metadata_listeners.take();
        debug!(count = listeners.len(), duration, "metadata loaded");
        for listener in listeners {
            listener();
        }
    }

    pub fn source(&self) -> Option<String> {
        self.source.borrow().clone()
    }

    pub fn is_playing(&self) -> bool {
        self.playing.get()
    }

    pub fn pending_metadata_listeners(&self) -> usize {
        self.metadata_listeners.borrow().len()
    }
}

impl VideoElement for MemoryVideo {
    fn duration(&self) -> f64 {
        self.duration.get()
    }

    fn current_time(&self) -> f64 {
        self.current_time.get()
    }

    fn set_current_time(&self, secs: f64) {
        self.current_time.set(secs);
    }

    fn set_source(&self, url: &str) {
        *self.source.borrow_mut() = Some(url.to_string());
        self.duration.set(f64::NAN);
        self.current_time.set(0.0);
        self.playing.set(false);
    }

    fn play(&self) {
        self.playing.set(true);
    }

    fn on_metadata_loaded_once(&self, handler: Box<dyn FnOnce()>) {
        self.metadata_listeners.borrow_mut().push(handler);
    }
}

// ---------------------------------------------------------------------------
// Text field
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MemoryField {
    value: RefCell<String>,
}

impl TextField for MemoryField {
    fn value(&self) -> String {
        self.value.borrow().clone()
    }

    fn set_value(&self, value: &str) {
        *self.value.borrow_mut() = value.to_string();
    }
}

// ---------------------------------------------------------------------------
// Slider
// ---------------------------------------------------------------------------

struct SliderWidget {
    options: SliderOptions,
    values: [f64; 2],
    on_update: Option<SliderUpdate>,
}

/// Slider host node. Clamps handles to the bounds and keeps them from
/// crossing, like the browser widget.
pub struct MemorySlider {
    id: String,
    widget: RefCell<Option<SliderWidget>>,
    builds: Cell<usize>,
}

impl MemorySlider {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            widget: RefCell::new(None),
            builds: Cell::new(0),
        }
    }

    pub fn options(&self) -> Option<SliderOptions> {
        self.widget.borrow().as_ref().map(|w| w.options)
    }

    /// Total number of widgets ever built on this node.
    pub fn build_count(&self) -> usize {
        self.builds.get()
    }

    /// Move one handle as a user drag would and emit the update event.
    pub fn drag(&self, handle: Handle, value: f64) -> Option<f64> {
        let (placed, mut on_update) = {
            let mut widget = self.widget.borrow_mut();
            let widget = widget.as_mut()?;
            let idx = handle.index();
            let (lo, hi) = match handle {
                Handle::Start => (widget.options.min, widget.values[1]),
                Handle::End => (widget.values[0], widget.options.max),
            };
            let placed = value.clamp(lo, hi);
            widget.values[idx] = placed;
            (placed, widget.on_update.take())
        };

        if let Some(callback) = on_update.as_mut() {
            callback(handle, placed);
        }

        // Put the callback back unless the widget was destroyed meanwhile.
        if let Some(widget) = self.widget.borrow_mut().as_mut() {
            if widget.on_update.is_none() {
                widget.on_update = on_update;
            }
        }
        Some(placed)
    }
}

impl SliderHost for MemorySlider {
    fn build(&self, options: SliderOptions, on_update: SliderUpdate) -> Result<()> {
        let mut widget = self.widget.borrow_mut();
        if widget.is_some() {
            return Err(UiError::SliderAlreadyBuilt(self.id.clone()));
        }
        let start = options.start[0].clamp(options.min, options.max);
        let end = options.start[1].clamp(start, options.max);
        *widget = Some(SliderWidget {
            options,
            values: [start, end],
            on_update: Some(on_update),
        });
        self.builds.set(self.builds.get() + 1);
        Ok(())
    }

    fn is_built(&self) -> bool {
        self.widget.borrow().is_some()
    }

    fn values(&self) -> Option<[f64; 2]> {
        self.widget.borrow().as_ref().map(|w| w.values)
    }

    fn destroy(&self) {
        self.widget.borrow_mut().take();
    }
}

// ---------------------------------------------------------------------------
// MemoryPage
// ---------------------------------------------------------------------------

/// A complete staging page held in memory. Keeps the concrete element types
/// so callers can drive them.
pub struct MemoryPage {
    pub refresh_button: Rc<MemoryButton>,
    pub clear_button: Rc<MemoryButton>,
    pub media_list: Rc<MemoryList>,
    pub player: Rc<MemoryVideo>,
    pub trim_slider: Rc<MemorySlider>,
    pub trim_start: Rc<MemoryField>,
    pub trim_end: Rc<MemoryField>,
    pub max_trim: Rc<MemoryField>,
}

impl MemoryPage {
    pub fn new() -> Self {
        Self {
            refresh_button: Rc::new(MemoryButton::default()),
            clear_button: Rc::new(MemoryButton::default()),
            media_list: Rc::new(MemoryList::default()),
            player: Rc::new(MemoryVideo::default()),
            trim_slider: Rc::new(MemorySlider::new("trim-slider")),
            trim_start: Rc::new(MemoryField::default()),
            trim_end: Rc::new(MemoryField::default()),
            max_trim: Rc::new(MemoryField::default()),
        }
    }

    pub fn page(&self) -> Page {
        Page {
            refresh_button: self.refresh_button.clone(),
            clear_button: self.clear_button.clone(),
            media_list: self.media_list.clone(),
            trim: self.trim_surfaces(),
        }
    }

    pub fn trim_surfaces(&self) -> TrimSurfaces {
        TrimSurfaces {
            video: self.player.clone(),
            slider: self.trim_slider.clone(),
            start_field: self.trim_start.clone(),
            end_field: self.trim_end.clone(),
            max_field: self.max_trim.clone(),
        }
    }
}

impl Default for MemoryPage {
    fn default() -> Self {
        Self::new()
    }
}
