//! Album (media group) output type

use serde::{Deserialize, Serialize};

use super::MediaRef;

pub use gkam_common::config::LeadPlacement;

/// One bounded, ordered batch of media produced at finalization
///
/// Never mutated after the partitioner builds it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Album {
    items: Vec<MediaRef>,
}

impl Album {
    pub(crate) fn new(items: Vec<MediaRef>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[MediaRef] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn first(&self) -> Option<&MediaRef> {
        self.items.first()
    }

    pub fn into_items(self) -> Vec<MediaRef> {
        self.items
    }
}
