use std::rc::Rc;

use crate::error::Result;

pub type ClickHandler = Box<dyn FnMut()>;
pub type ListClickHandler = Box<dyn FnMut(&dyn ClickTarget)>;
pub type SliderUpdate = Box<dyn FnMut(Handle, f64)>;

pub trait Button {
    fn on_click(&self, handler: ClickHandler);
}

/// The node a click originated from.
pub trait ClickTarget {
    fn attribute(&self, name: &str) -> Option<String>;
}

/// One rendered row of the staged media list.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ListEntry {
    pub label: String,
    pub class: String,
    pub attributes: Vec<(String, String)>,
}

impl ClickTarget for ListEntry {
    fn attribute(&self, name: &str) -> Option<String> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.clone())
    }
}

pub trait ListContainer {
    /// Listen for clicks anywhere inside the container.
    fn on_click(&self, handler: ListClickHandler);
    fn clear(&self);
    fn append(&self, entry: ListEntry);
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub trait VideoElement {
    /// Clip length in seconds, `NaN` until metadata has loaded.
    fn duration(&self) -> f64;
    fn current_time(&self) -> f64;
    fn set_current_time(&self, secs: f64);
    fn set_source(&self, url: &str);
    fn play(&self);
    /// Run `handler` the next time metadata loads, then forget it.
    fn on_metadata_loaded_once(&self, handler: Box<dyn FnOnce()>);
}

pub trait TextField {
    fn value(&self) -> String;
    fn set_value(&self, value: &str);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handle {
    Start,
    End,
}

impl Handle {
    pub fn index(&self) -> usize {
        match self {
            Handle::Start => 0,
            Handle::End => 1,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Handle::Start),
            1 => Some(Handle::End),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SliderOptions {
    pub min: f64,
    pub max: f64,
    pub start: [f64; 2],
}

/// Host node of the dual-handle range widget. At most one widget lives on
/// the node; building a second one without `destroy` fails.
pub trait SliderHost {
    fn build(&self, options: SliderOptions, on_update: SliderUpdate) -> Result<()>;
    fn is_built(&self) -> bool;
    /// Live handle positions, `None` when no widget is built.
    fn values(&self) -> Option<[f64; 2]>;
    fn destroy(&self);
}

/// The surfaces owned by one trim controller.
#[derive(Clone)]
pub struct TrimSurfaces {
    pub video: Rc<dyn VideoElement>,
    pub slider: Rc<dyn SliderHost>,
    pub start_field: Rc<dyn TextField>,
    pub end_field: Rc<dyn TextField>,
    pub max_field: Rc<dyn TextField>,
}

impl TrimSurfaces {
    pub fn field(&self, handle: Handle) -> &Rc<dyn TextField> {
        match handle {
            Handle::Start => &self.start_field,
            Handle::End => &self.end_field,
        }
    }
}

/// Every element of the staging page.
#[derive(Clone)]
pub struct Page {
    pub refresh_button: Rc<dyn Button>,
    pub clear_button: Rc<dyn Button>,
    pub media_list: Rc<dyn ListContainer>,
    pub trim: TrimSurfaces,
}
