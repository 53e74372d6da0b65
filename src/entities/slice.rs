use std::sync::Arc;

use serde::Serialize;

use crate::document::{Block, BlockKey, Document, Selection};

/// End-exclusive range of character offsets within one block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct TextRange {
    pub start: usize,
    pub end: usize,
}

impl TextRange {
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    pub fn contains(&self, offset: usize) -> bool {
        self.start <= offset && offset < self.end
    }
}

/// The part of one block covered by a selection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockSlice {
    pub block_key: BlockKey,
    pub offset: TextRange,
}

/// Computes which characters of `block` the selection covers.
///
/// Offsets are clamped to the block length, and `start` never exceeds
/// `end`. A collapsed selection yields an empty range.
pub fn slice_selected_block(block: &Block, selection: &Selection) -> BlockSlice {
    let key = block.key();
    let len = block.len();
    let is_start = key == selection.start_key();
    let is_end = key == selection.end_key();

    let (start, end) = match (is_start, is_end) {
        (true, true) => (selection.start_offset(), selection.end_offset()),
        (true, false) => (selection.start_offset(), len),
        (false, true) => (0, selection.end_offset()),
        (false, false) => (0, len),
    };
    let end = end.min(len);
    let start = start.min(end);

    BlockSlice {
        block_key: key.clone(),
        offset: TextRange::new(start, end),
    }
}

/// Blocks from the selection's start block through its end block, in
/// document order. Empty when the start block is unknown.
pub fn selected_blocks<'a>(document: &'a Document, selection: &Selection) -> Vec<&'a Arc<Block>> {
    let Some(start_index) = document.block_index(selection.start_key()) else {
        return Vec::new();
    };
    let end_key = selection.end_key();

    let mut blocks: Vec<&'a Arc<Block>> = document
        .blocks()
        .skip(start_index)
        .take_while(|block| block.key() != end_key)
        .collect();
    if let Some(end_block) = document.block_arc(end_key) {
        blocks.push(end_block);
    }
    blocks
}

/// Selected blocks paired with their selected ranges.
pub fn selected_slices<'a>(
    document: &'a Document,
    selection: &Selection,
) -> Vec<(&'a Arc<Block>, TextRange)> {
    selected_blocks(document, selection)
        .into_iter()
        .map(|block| {
            let slice = slice_selected_block(block, selection);
            (block, slice.offset)
        })
        .collect()
}
