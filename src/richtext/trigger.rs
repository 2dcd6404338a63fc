// Trigger Engine
// Recognizes formatting tokens typed at the start of a block and turns them
// into a block type or inline style change when a space follows.

use log::debug;

use super::mutation::{replace_range, set_block_type};
use super::selection::Selection;
use super::structured_document::{BlockKey, BlockType, Document, InlineStyle, TextStyle};
use crate::error::Result;

/// Formatting change requested by a trigger token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerKind {
    Heading,
    ToggleStyle(InlineStyle),
}

const TRIGGERS: [(&str, TriggerKind); 4] = [
    ("#", TriggerKind::Heading),
    ("*", TriggerKind::ToggleStyle(InlineStyle::Bold)),
    ("**", TriggerKind::ToggleStyle(InlineStyle::Red)),
    ("***", TriggerKind::ToggleStyle(InlineStyle::Underline)),
];

/// A recognized trigger: the token occupies `[0..token_len)` of `block`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerAction {
    pub block: BlockKey,
    pub token_len: usize,
    pub kind: TriggerKind,
}

/// Check whether inserting `inserted` at the selection fires a trigger.
///
/// Only a single space at a collapsed cursor qualifies, and the whole block
/// text before the cursor must equal a token: `a#` does not fire.
pub fn detect_trigger(
    document: &Document,
    selection: &Selection,
    inserted: &str,
) -> Result<Option<TriggerAction>> {
    if inserted != " " || !selection.is_collapsed() {
        return Ok(None);
    }
    let (_, block) = document.block_or_err(&selection.block)?;
    block.check_range(selection.start, selection.end)?;

    let prefix = block.text_before(selection.start);
    let action = TRIGGERS
        .iter()
        .find(|(token, _)| *token == prefix)
        .map(|(token, kind)| TriggerAction {
            block: selection.block.clone(),
            token_len: token.chars().count(),
            kind: *kind,
        });

    if let Some(action) = &action {
        debug!("trigger {:?} in block {}", action.kind, action.block);
    }
    Ok(action)
}

impl TriggerAction {
    /// Delete the token and apply the formatting change. Returns the new
    /// document and the inline style override for the cursor, which ends up
    /// at offset 0 of the same block. The triggering space is consumed.
    ///
    /// A style toggle starts from the style active where the token ends, so a
    /// token typed while a style is on switches that style off.
    pub fn apply(
        &self,
        document: &Document,
        style_override: Option<TextStyle>,
    ) -> Result<(Document, Option<TextStyle>)> {
        let (_, block) = document.block_or_err(&self.block)?;
        let current = style_override.unwrap_or_else(|| block.style_at(self.token_len));
        let document = replace_range(document, &self.block, 0, self.token_len, "")?;

        match self.kind {
            TriggerKind::Heading => {
                let document = set_block_type(&document, &self.block, BlockType::Heading)?;
                Ok((document, None))
            }
            TriggerKind::ToggleStyle(style) => Ok((document, Some(current.toggled(style)))),
        }
    }
}
