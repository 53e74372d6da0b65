use serde::{Deserialize, Serialize};

use super::BlockKey;

/// Anchor and focus of the user's text selection.
///
/// `is_backward` records whether the focus precedes the anchor in document
/// order; `start_*` and `end_*` resolve through it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    pub anchor_key: BlockKey,
    pub anchor_offset: usize,
    pub focus_key: BlockKey,
    pub focus_offset: usize,
    pub is_backward: bool,
}

/// Partial selection update for [`Selection::merge`].
#[derive(Clone, Debug, Default)]
pub struct SelectionPatch {
    pub anchor_key: Option<BlockKey>,
    pub anchor_offset: Option<usize>,
    pub focus_key: Option<BlockKey>,
    pub focus_offset: Option<usize>,
    pub is_backward: Option<bool>,
}

impl Selection {
    /// Forward selection from anchor to focus.
    pub fn new(
        anchor_key: BlockKey,
        anchor_offset: usize,
        focus_key: BlockKey,
        focus_offset: usize,
    ) -> Self {
        Self {
            anchor_key,
            anchor_offset,
            focus_key,
            focus_offset,
            is_backward: false,
        }
    }

    pub fn collapsed(key: BlockKey, offset: usize) -> Self {
        Self::new(key.clone(), offset, key, offset)
    }

    /// Forward selection of `[start, end)` inside one block.
    pub fn within(key: BlockKey, start: usize, end: usize) -> Self {
        Self::new(key.clone(), start, key, end)
    }

    pub fn start_key(&self) -> &BlockKey {
        if self.is_backward {
            &self.focus_key
        } else {
            &self.anchor_key
        }
    }

    pub fn start_offset(&self) -> usize {
        if self.is_backward {
            self.focus_offset
        } else {
            self.anchor_offset
        }
    }

    pub fn end_key(&self) -> &BlockKey {
        if self.is_backward {
            &self.anchor_key
        } else {
            &self.focus_key
        }
    }

    pub fn end_offset(&self) -> usize {
        if self.is_backward {
            self.anchor_offset
        } else {
            self.focus_offset
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor_key == self.focus_key && self.anchor_offset == self.focus_offset
    }

    /// Copy of this selection with the fields present in `patch` replaced.
    pub fn merge(&self, patch: SelectionPatch) -> Self {
        Self {
            anchor_key: patch.anchor_key.unwrap_or_else(|| self.anchor_key.clone()),
            anchor_offset: patch.anchor_offset.unwrap_or(self.anchor_offset),
            focus_key: patch.focus_key.unwrap_or_else(|| self.focus_key.clone()),
            focus_offset: patch.focus_offset.unwrap_or(self.focus_offset),
            is_backward: patch.is_backward.unwrap_or(self.is_backward),
        }
    }
}
