// Caret or range position inside a single block.

use super::structured_document::{BlockKey, Document};
use crate::error::{EditError, Result};

/// Selection within one block, in character offsets of the block text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub block: BlockKey,
    pub start: usize,
    pub end: usize,
}

impl Selection {
    pub fn new(block: BlockKey, start: usize, end: usize) -> Self {
        Selection { block, start, end }
    }

    /// A plain cursor
    pub fn collapsed(block: BlockKey, offset: usize) -> Self {
        Self::new(block, offset, offset)
    }

    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }

    /// Cursor position of a collapsed selection
    pub fn cursor(&self) -> Option<usize> {
        self.is_collapsed().then_some(self.start)
    }

    /// Check that the block exists and `0 <= start <= end <= len`
    pub fn validate(&self, document: &Document) -> Result<()> {
        let (_, block) = document.block_or_err(&self.block)?;
        block.check_range(self.start, self.end)
    }

    pub(crate) fn require_collapsed(&self) -> Result<usize> {
        self.cursor().ok_or(EditError::InvalidSelection)
    }
}
