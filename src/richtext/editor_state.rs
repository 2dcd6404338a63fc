// Editor State
// Immutable editing session: the current document version, the selection,
// and the inline style override for the next typed character. Every input
// event produces a new EditorState; earlier values stay valid.

use log::debug;

use super::block_split::split_block;
use super::mutation::{replace_range_styled, set_block_type, toggle_inline_style_at_cursor};
use super::selection::Selection;
use super::structured_document::{BlockType, Document, InlineStyle, TextStyle};
use super::trigger::detect_trigger;
use crate::error::Result;

/// Answer to the rendering surface after a keystroke
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputOutcome {
    /// The core consumed the input; the surface must not insert it
    Handled,
    /// The surface performs its default insertion
    NotHandled,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EditorState {
    document: Document,
    selection: Selection,
    style_override: Option<TextStyle>,
}

impl EditorState {
    /// Session over a document holding one empty paragraph
    pub fn new() -> Self {
        Self::with_document(Document::new())
    }

    /// Session over an existing document, cursor at its start. A document
    /// without blocks gets an empty paragraph so the cursor has a home.
    pub fn with_document(document: Document) -> Self {
        let document = if document.is_empty() {
            document.with_empty_paragraph()
        } else {
            document
        };
        let first = match document.block_at(0) {
            Some(block) => block.key().clone(),
            None => document.fresh_key(),
        };
        EditorState {
            selection: Selection::collapsed(first, 0),
            document,
            style_override: None,
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn style_override(&self) -> Option<TextStyle> {
        self.style_override
    }

    /// Move the selection; the override does not survive a cursor move
    pub fn with_selection(&self, selection: Selection) -> Result<Self> {
        selection.validate(&self.document)?;
        Ok(EditorState {
            document: self.document.clone(),
            selection,
            style_override: None,
        })
    }

    /// Style the next typed character gets
    pub fn current_inline_style(&self) -> TextStyle {
        if let Some(style) = self.style_override {
            return style;
        }
        let Some(block) = self.document.find_block(&self.selection.block) else {
            return TextStyle::plain();
        };
        if self.selection.is_collapsed() {
            block.style_at(self.selection.start)
        } else {
            block.style_at(self.selection.start + 1)
        }
    }

    /// Offer a keystroke to the trigger engine before the surface inserts it
    pub fn handle_before_input(&self, chars: &str) -> Result<(Self, InputOutcome)> {
        let Some(action) = detect_trigger(&self.document, &self.selection, chars)? else {
            return Ok((self.clone(), InputOutcome::NotHandled));
        };

        let (document, style_override) = action.apply(&self.document, self.style_override)?;
        let next = EditorState {
            document,
            selection: Selection::collapsed(action.block, 0),
            style_override,
        };
        Ok((next, InputOutcome::Handled))
    }

    /// Default insertion: replace the selection with `chars` in the current
    /// inline style and put the cursor after them
    pub fn insert_characters(&self, chars: &str) -> Result<Self> {
        let style = self.current_inline_style();
        let Selection { block, start, end } = &self.selection;
        let document = replace_range_styled(&self.document, block, *start, *end, chars, style)?;
        let cursor = start + chars.chars().count();
        Ok(EditorState {
            document,
            selection: Selection::collapsed(block.clone(), cursor),
            style_override: None,
        })
    }

    /// Feed text through the editor one keystroke at a time, the way the
    /// surface does; `\n` presses return
    pub fn type_text(&self, text: &str) -> Result<Self> {
        let mut state = self.clone();
        for ch in text.chars() {
            if ch == '\n' {
                state = state.handle_return()?;
                continue;
            }
            let input = ch.to_string();
            let (next, outcome) = state.handle_before_input(&input)?;
            state = match outcome {
                InputOutcome::Handled => next,
                InputOutcome::NotHandled => next.insert_characters(&input)?,
            };
        }
        Ok(state)
    }

    /// Return key: always handled. A range is deleted first, then the block
    /// is split and typing in the new block starts with no inline style.
    pub fn handle_return(&self) -> Result<Self> {
        let state = if self.selection.is_collapsed() {
            self.clone()
        } else {
            self.insert_characters("")?
        };
        let (document, right) = split_block(&state.document, &state.selection)?;
        debug!("return pressed, cursor moves to block {}", right.key());
        Ok(EditorState {
            document,
            selection: Selection::collapsed(right.key().clone(), 0),
            style_override: Some(TextStyle::plain()),
        })
    }

    /// Toggle an inline style at the cursor or over the selected range
    pub fn toggle_inline_style(&self, style: InlineStyle) -> Result<Self> {
        let (document, style_override) = toggle_inline_style_at_cursor(
            &self.document,
            &self.selection,
            self.style_override,
            style,
        )?;
        Ok(EditorState {
            document,
            selection: self.selection.clone(),
            style_override,
        })
    }

    /// Set the type of the block holding the selection
    pub fn set_block_type(&self, block_type: BlockType) -> Result<Self> {
        let document = set_block_type(&self.document, &self.selection.block, block_type)?;
        Ok(EditorState {
            document,
            selection: self.selection.clone(),
            style_override: self.style_override,
        })
    }
}

impl Default for EditorState {
    fn default() -> Self {
        Self::new()
    }
}
