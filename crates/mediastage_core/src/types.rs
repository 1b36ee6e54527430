use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{CoreError, Result};
use crate::trim::TrimDetail;

// ---------------------------------------------------------------------------
// MediaId
// ---------------------------------------------------------------------------

/// Opaque identifier of a staged item. Either a uuid or a hex content hash,
/// depending on which data attribute the deployment renders.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct MediaId(String);

impl MediaId {
    pub fn new(raw: impl Into<String>) -> Result<Self> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(CoreError::InvalidMediaId(raw));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Take an identifier exactly as the page rendered it. Whatever it
    /// holds is the engine's to judge.
    pub fn from_attribute(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid.to_string())
    }

    pub fn from_content_hash(hash: &[u8; 32]) -> Self {
        Self(hex::encode(hash))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MediaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for MediaId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

// ---------------------------------------------------------------------------
// IdAttribute
// ---------------------------------------------------------------------------

/// Which identifier a rendered list item carries, and under which data
/// attribute.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum IdAttribute {
    Uuid,
    #[default]
    ContentHash,
}

impl IdAttribute {
    pub fn attribute_name(&self) -> &'static str {
        match self {
            IdAttribute::Uuid => "data-uuid",
            IdAttribute::ContentHash => "data-content-hash",
        }
    }
}

// ---------------------------------------------------------------------------
// StagedMediaItem
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct DisplayMetadata {
    pub label: String,
    pub size: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StagedMediaItem {
    pub id: MediaId,
    pub display: DisplayMetadata,
    /// Trim previously stored alongside the item, if any.
    pub trim: Option<TrimDetail>,
}

impl StagedMediaItem {
    pub fn new(id: MediaId, label: impl Into<String>) -> Self {
        Self {
            id,
            display: DisplayMetadata {
                label: label.into(),
                size: None,
            },
            trim: None,
        }
    }
}

/// Drop every item whose id was already seen, keeping the first occurrence.
/// Returns the number of dropped duplicates.
pub fn dedup_by_id(items: &mut Vec<StagedMediaItem>) -> usize {
    let before = items.len();
    let mut seen = std::collections::HashSet::new();
    items.retain(|item| seen.insert(item.id.clone()));
    before - items.len()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
