use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;
use crate::trim::TrimDetail;
use crate::types::{DisplayMetadata, IdAttribute, MediaId, StagedMediaItem};

/// One entry of the staged media listing served at `/api/media`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MediaDescriptor {
    pub device_name: String,
    pub content_hash: [u8; 32],
    pub size: u64,
    pub uuid: Uuid,
    #[serde(default)]
    pub trim: Option<TrimDetail>,
}

impl MediaDescriptor {
    pub fn id(&self, attribute: IdAttribute) -> MediaId {
        match attribute {
            IdAttribute::Uuid => MediaId::from_uuid(self.uuid),
            IdAttribute::ContentHash => MediaId::from_content_hash(&self.content_hash),
        }
    }

    pub fn to_item(&self, attribute: IdAttribute) -> StagedMediaItem {
        StagedMediaItem {
            id: self.id(attribute),
            display: DisplayMetadata {
                label: self.device_name.clone(),
                size: Some(self.size),
            },
            trim: self.trim.clone(),
        }
    }
}

/// Parse the JSON array returned by the media listing.
pub fn parse_listing(json: &str) -> Result<Vec<MediaDescriptor>> {
    Ok(serde_json::from_str(json)?)
}
