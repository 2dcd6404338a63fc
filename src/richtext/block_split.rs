// Block-Split Handler

use log::debug;

use super::selection::Selection;
use super::structured_document::{Block, BlockType, Document};
use crate::error::Result;

/// Split the block holding a collapsed cursor into two paragraphs.
///
/// The left block keeps its key; the right block gets a fresh one. Both
/// become paragraphs, so a heading is never continued onto the next line.
/// Returns the new document and the new right block.
pub fn split_block(document: &Document, selection: &Selection) -> Result<(Document, Block)> {
    let offset = selection.require_collapsed()?;
    let (index, block) = document.block_or_err(&selection.block)?;
    block.check_range(offset, offset)?;

    let (left, right) = block.split_runs_at(offset);
    let left_block = Block::from_runs(block.key().clone(), BlockType::Paragraph, left);
    let right_block = Block::from_runs(document.fresh_key(), BlockType::Paragraph, right);

    debug!(
        "split block {} at {} into {}",
        block.key(),
        offset,
        right_block.key()
    );
    let document = document
        .replace_block(index, left_block)
        .insert_block_after(index, right_block.clone());
    Ok((document, right_block))
}
