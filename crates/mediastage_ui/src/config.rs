use mediastage_core::types::{IdAttribute, MediaId};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// DOM ids of every element the controllers touch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ElementIds {
    pub refresh_button: String,
    pub clear_button: String,
    pub media_list: String,
    pub media_player: String,
    pub trim_slider: String,
    pub trim_start: String,
    pub trim_end: String,
    pub max_trim: String,
}

impl Default for ElementIds {
    fn default() -> Self {
        Self {
            refresh_button: "refresh-button".into(),
            clear_button: "clear-button".into(),
            media_list: "media-list".into(),
            media_player: "media-player".into(),
            trim_slider: "trim-slider".into(),
            trim_start: "trim-start".into(),
            trim_end: "trim-end".into(),
            max_trim: "max-trim".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct UiConfig {
    pub elements: ElementIds,
    /// Identifier rendered on each list item and read back on click.
    pub id_attribute: IdAttribute,
    pub media_base_url: String,
    pub list_item_class: String,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            elements: ElementIds::default(),
            id_attribute: IdAttribute::default(),
            media_base_url: "http://localhost:8000".into(),
            list_item_class: "pure-menu-item media-list-item".into(),
        }
    }
}

impl UiConfig {
    /// Parse a JSON config. Missing fields fall back to the defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Streaming URL for one staged item. The media server streams by hex
    /// content hash, so `id` should be one.
    pub fn media_url(&self, id: &MediaId) -> String {
        format!("{}/api/media/{}", self.media_base_url.trim_end_matches('/'), id)
    }

    pub fn id_attribute_name(&self) -> &'static str {
        self.id_attribute.attribute_name()
    }
}
