// Mutation Applier
// Pure editing operations: every function takes a Document by reference and
// returns a new Document, or an error with the input left untouched.

use log::debug;

use super::selection::Selection;
use super::structured_document::{BlockKey, BlockType, Document, InlineStyle, TextRun, TextStyle};
use crate::error::Result;

/// Replace `[start..end)` of a block with `new_text`. The inserted text takes
/// the style of the character before `start` (or of the first character when
/// `start` is 0).
pub fn replace_range(
    document: &Document,
    block: &BlockKey,
    start: usize,
    end: usize,
    new_text: &str,
) -> Result<Document> {
    let (_, target) = document.block_or_err(block)?;
    target.check_range(start, end)?;
    let style = target.style_at(start);
    replace_range_styled(document, block, start, end, new_text, style)
}

/// Replace `[start..end)` of a block with `new_text` carrying `style`
pub fn replace_range_styled(
    document: &Document,
    block: &BlockKey,
    start: usize,
    end: usize,
    new_text: &str,
    style: TextStyle,
) -> Result<Document> {
    let (index, target) = document.block_or_err(block)?;
    target.check_range(start, end)?;

    let (left, _) = target.split_runs_at(start);
    let (_, right) = target.split_runs_at(end);
    let runs = left
        .into_iter()
        .chain([TextRun::new(new_text, style)])
        .chain(right)
        .collect();

    debug!(
        "replace {}..{} in block {} with {} chars",
        start,
        end,
        block,
        new_text.chars().count()
    );
    Ok(document.replace_block(index, target.with_runs(runs)))
}

/// Change the type of one block; its runs are left as they are
pub fn set_block_type(
    document: &Document,
    block: &BlockKey,
    block_type: BlockType,
) -> Result<Document> {
    let (index, target) = document.block_or_err(block)?;
    if target.block_type() == block_type {
        return Ok(document.clone());
    }
    debug!("block {} becomes {:?}", block, block_type);
    Ok(document.replace_block(index, target.with_block_type(block_type)))
}

/// Switch `style` on or off for every character of a range selection
pub fn apply_inline_style(
    document: &Document,
    selection: &Selection,
    style: InlineStyle,
    on: bool,
) -> Result<Document> {
    let (index, target) = document.block_or_err(&selection.block)?;
    target.check_range(selection.start, selection.end)?;
    if selection.is_collapsed() {
        return Ok(document.clone());
    }

    let (before, tail) = target.split_runs_at(selection.start);
    let (middle, after) = target
        .with_runs(tail)
        .split_runs_at(selection.end - selection.start);
    let styled = middle.into_iter().map(|run| TextRun {
        style: run.style.with(style, on),
        ..run
    });
    let runs = before.into_iter().chain(styled).chain(after).collect();

    Ok(document.replace_block(index, target.with_runs(runs)))
}

/// Toggle an inline style at the selection.
///
/// On a collapsed selection only the inline style override changes: the
/// returned document is the input, and the returned override is the style
/// at the cursor (or the previous override) with `style` flipped.
/// On a range the style is removed when every selected character already
/// has it and added otherwise; the override is cleared.
pub fn toggle_inline_style_at_cursor(
    document: &Document,
    selection: &Selection,
    style_override: Option<TextStyle>,
    style: InlineStyle,
) -> Result<(Document, Option<TextStyle>)> {
    selection.validate(document)?;
    let (_, target) = document.block_or_err(&selection.block)?;

    if selection.is_collapsed() {
        let current = style_override.unwrap_or_else(|| target.style_at(selection.start));
        return Ok((document.clone(), Some(current.toggled(style))));
    }

    let all_styled = target
        .styles_in(selection.start, selection.end)
        .iter()
        .all(|s| s.contains(style));
    let document = apply_inline_style(document, selection, style, !all_styled)?;
    Ok((document, None))
}
