//! Human-readable box names, persisted as a JSON array beside the bank.

use crate::error::CoreResult;
use serde::{Deserialize, Serialize};

/// Name given to a box that has never been renamed.
#[must_use]
pub fn default_name(box_index: u32) -> String {
    format!("Storage {}", box_index + 1)
}

/// Ordered box names, one per box.
///
/// The list may be longer than the bank (names survive a shrink) but is
/// never shorter once [`extend_to`](Self::extend_to) has run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BoxNames(Vec<String>);

impl BoxNames {
    /// Default names for `boxes` boxes.
    #[must_use]
    pub fn with_defaults(boxes: u32) -> Self {
        Self((0..boxes).map(default_name).collect())
    }

    /// Parses the JSON sidecar.
    ///
    /// # Errors
    ///
    /// Returns an error unless the data is a JSON array of strings.
    pub fn from_json(data: &[u8]) -> CoreResult<Self> {
        Ok(serde_json::from_slice(data)?)
    }

    /// Serializes to pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> CoreResult<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(self)?)
    }

    /// Appends default names until there are at least `boxes` entries.
    ///
    /// Returns true if anything was added.
    pub fn extend_to(&mut self, boxes: u32) -> bool {
        let start = u32::try_from(self.0.len()).unwrap_or(u32::MAX);
        if start >= boxes {
            return false;
        }
        self.0.extend((start..boxes).map(default_name));
        true
    }

    /// Returns the name of `box_index`.
    #[must_use]
    pub fn get(&self, box_index: u32) -> Option<&str> {
        self.0.get(box_index as usize).map(String::as_str)
    }

    /// Renames `box_index`. Returns true if the name changed.
    pub fn set(&mut self, box_index: u32, name: impl Into<String>) -> bool {
        let Some(slot) = self.0.get_mut(box_index as usize) else {
            return false;
        };
        let name = name.into();
        if *slot == name {
            return false;
        }
        *slot = name;
        true
    }

    /// Returns the number of names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if there are no names.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns all names in box order.
    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}
