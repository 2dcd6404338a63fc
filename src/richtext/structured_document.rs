// Structured Document Model
// Ordered blocks of styled text runs, independent of any rendering surface.
// A published Document is never mutated: edits build a new Document that
// shares every untouched block with its predecessor.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use crate::error::{EditError, Result};

/// Opaque identifier of a block, stable across edits to the same logical line
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockKey(String);

impl BlockKey {
    pub fn new(key: impl Into<String>) -> Self {
        BlockKey(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlockKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Inline styles a run of text can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InlineStyle {
    Bold,
    Red,
    Underline,
}

impl InlineStyle {
    pub const ALL: [InlineStyle; 3] = [InlineStyle::Bold, InlineStyle::Red, InlineStyle::Underline];

    /// Name used in the persisted format and the style map
    pub fn name(self) -> &'static str {
        match self {
            InlineStyle::Bold => "BOLD",
            InlineStyle::Red => "RED",
            InlineStyle::Underline => "UNDERLINE",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|style| style.name() == name)
    }
}

impl fmt::Display for InlineStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Set of inline styles. Each style is either present or absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TextStyle {
    pub bold: bool,
    pub red: bool,
    pub underline: bool,
}

impl TextStyle {
    pub fn plain() -> Self {
        Self::default()
    }

    pub fn of(style: InlineStyle) -> Self {
        Self::plain().with(style, true)
    }

    pub fn contains(&self, style: InlineStyle) -> bool {
        match style {
            InlineStyle::Bold => self.bold,
            InlineStyle::Red => self.red,
            InlineStyle::Underline => self.underline,
        }
    }

    pub fn with(mut self, style: InlineStyle, on: bool) -> Self {
        match style {
            InlineStyle::Bold => self.bold = on,
            InlineStyle::Red => self.red = on,
            InlineStyle::Underline => self.underline = on,
        }
        self
    }

    pub fn toggled(self, style: InlineStyle) -> Self {
        let on = !self.contains(style);
        self.with(style, on)
    }

    pub fn is_plain(&self) -> bool {
        *self == Self::plain()
    }

    /// Active styles in canonical order
    pub fn styles(self) -> impl Iterator<Item = InlineStyle> {
        InlineStyle::ALL
            .into_iter()
            .filter(move |style| self.contains(*style))
    }
}

/// A run of styled text (a contiguous piece of text with uniform styling)
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub text: String,
    pub style: TextStyle,
}

impl TextRun {
    pub fn new(text: impl Into<String>, style: TextStyle) -> Self {
        TextRun {
            text: text.into(),
            style,
        }
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(text, TextStyle::plain())
    }

    /// Length in characters
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Split this text run at the given character offset
    /// Returns (left_run, right_run)
    pub fn split_at(&self, offset: usize) -> (TextRun, TextRun) {
        let (left, right) = self.text.split_at(char_to_byte_idx(&self.text, offset));
        (
            TextRun::new(left, self.style),
            TextRun::new(right, self.style),
        )
    }
}

pub fn char_to_byte_idx(text: &str, char_idx: usize) -> usize {
    text.char_indices()
        .nth(char_idx)
        .map(|(byte_idx, _)| byte_idx)
        .unwrap_or(text.len())
}

/// Drop empty runs and merge neighbours that carry the same style, so every
/// run is a maximal span.
pub(crate) fn normalize_runs(runs: impl IntoIterator<Item = TextRun>) -> Vec<TextRun> {
    let mut out: Vec<TextRun> = Vec::new();
    for run in runs {
        if run.is_empty() {
            continue;
        }
        match out.last_mut() {
            Some(last) if last.style == run.style => last.text.push_str(&run.text),
            _ => out.push(run),
        }
    }
    out
}

/// Block-level content types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlockType {
    #[default]
    Paragraph,
    Heading,
}

/// A block of content. Its runs always partition the block text.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    key: BlockKey,
    block_type: BlockType,
    runs: Vec<TextRun>,
}

impl Block {
    pub fn new(key: BlockKey, block_type: BlockType) -> Self {
        Block {
            key,
            block_type,
            runs: Vec::new(),
        }
    }

    pub fn paragraph(key: BlockKey) -> Self {
        Self::new(key, BlockType::Paragraph)
    }

    pub fn heading(key: BlockKey) -> Self {
        Self::new(key, BlockType::Heading)
    }

    pub fn from_runs(key: BlockKey, block_type: BlockType, runs: Vec<TextRun>) -> Self {
        Block {
            key,
            block_type,
            runs: normalize_runs(runs),
        }
    }

    pub fn with_text(mut self, text: impl Into<String>, style: TextStyle) -> Self {
        let runs = std::mem::take(&mut self.runs);
        self.runs = normalize_runs(runs.into_iter().chain([TextRun::new(text, style)]));
        self
    }

    pub fn with_plain_text(self, text: impl Into<String>) -> Self {
        self.with_text(text, TextStyle::plain())
    }

    pub fn key(&self) -> &BlockKey {
        &self.key
    }

    pub fn block_type(&self) -> BlockType {
        self.block_type
    }

    pub fn runs(&self) -> &[TextRun] {
        &self.runs
    }

    /// Get the total text length of this block, in characters
    pub fn text_len(&self) -> usize {
        self.runs.iter().map(TextRun::len).sum()
    }

    pub fn to_plain_text(&self) -> String {
        self.runs.iter().map(|run| run.text.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// Text from the block start up to `offset`
    pub fn text_before(&self, offset: usize) -> String {
        self.to_plain_text().chars().take(offset).collect()
    }

    /// Style a character typed at `offset` would inherit: the character
    /// before it, or the first character at offset 0.
    pub fn style_at(&self, offset: usize) -> TextStyle {
        let lookup = offset.saturating_sub(1);
        let mut pos = 0;
        for run in &self.runs {
            let len = run.len();
            if lookup < pos + len {
                return run.style;
            }
            pos += len;
        }
        self.runs
            .last()
            .map(|run| run.style)
            .unwrap_or_default()
    }

    /// Style of every character in `[start..end)`
    pub(crate) fn styles_in(&self, start: usize, end: usize) -> Vec<TextStyle> {
        self.runs
            .iter()
            .flat_map(|run| std::iter::repeat_n(run.style, run.len()))
            .skip(start)
            .take(end.saturating_sub(start))
            .collect()
    }

    /// Split the runs at a character offset. A run straddling the cut is
    /// divided into two runs with the same style.
    pub(crate) fn split_runs_at(&self, offset: usize) -> (Vec<TextRun>, Vec<TextRun>) {
        let mut left = Vec::new();
        let mut right = Vec::new();
        let mut pos = 0usize;

        for run in &self.runs {
            let len = run.len();
            if pos + len <= offset {
                left.push(run.clone());
            } else if pos >= offset {
                right.push(run.clone());
            } else {
                let (l, r) = run.split_at(offset - pos);
                left.push(l);
                right.push(r);
            }
            pos += len;
        }

        (left, right)
    }

    pub(crate) fn with_runs(&self, runs: Vec<TextRun>) -> Block {
        Block::from_runs(self.key.clone(), self.block_type, runs)
    }

    pub(crate) fn with_block_type(&self, block_type: BlockType) -> Block {
        Block {
            block_type,
            ..self.clone()
        }
    }

    /// Fail with a range error unless `start <= end <= text_len`
    pub(crate) fn check_range(&self, start: usize, end: usize) -> Result<()> {
        let len = self.text_len();
        if start > end || end > len {
            return Err(EditError::Range {
                block: self.key.clone(),
                start,
                end,
                len,
            });
        }
        Ok(())
    }
}

/// The structured document
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    blocks: Vec<Arc<Block>>,
}

impl Document {
    pub fn new() -> Self {
        Document { blocks: Vec::new() }
    }

    /// Build a document from blocks, rejecting duplicate keys
    pub fn from_blocks(blocks: Vec<Block>) -> Result<Self> {
        let mut seen = HashSet::new();
        for block in &blocks {
            if !seen.insert(block.key.clone()) {
                return Err(EditError::format(format!(
                    "duplicate block key {}",
                    block.key
                )));
            }
        }
        Ok(Document {
            blocks: blocks.into_iter().map(Arc::new).collect(),
        })
    }

    /// Create a document with a single paragraph
    pub fn with_paragraph(text: impl Into<String>) -> Self {
        let empty = Self::new();
        let block = Block::paragraph(empty.fresh_key()).with_plain_text(text);
        Document {
            blocks: vec![Arc::new(block)],
        }
    }

    pub fn blocks(&self) -> impl ExactSizeIterator<Item = &Block> {
        self.blocks.iter().map(|block| block.as_ref())
    }

    pub fn block_at(&self, index: usize) -> Option<&Block> {
        self.blocks.get(index).map(|block| block.as_ref())
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn find_block(&self, key: &BlockKey) -> Option<&Block> {
        self.blocks().find(|block| block.key() == key)
    }

    pub fn find_block_index(&self, key: &BlockKey) -> Option<usize> {
        self.blocks.iter().position(|block| block.key() == key)
    }

    pub(crate) fn block_or_err(&self, key: &BlockKey) -> Result<(usize, &Block)> {
        self.find_block_index(key)
            .map(|index| (index, self.blocks[index].as_ref()))
            .ok_or_else(|| EditError::UnknownBlock(key.clone()))
    }

    /// New version with the block at `index` replaced
    pub(crate) fn replace_block(&self, index: usize, block: Block) -> Document {
        let mut blocks = self.blocks.clone();
        blocks[index] = Arc::new(block);
        Document { blocks }
    }

    /// New version with `block` inserted right after `index`
    pub(crate) fn insert_block_after(&self, index: usize, block: Block) -> Document {
        let mut blocks = self.blocks.clone();
        blocks.insert(index + 1, Arc::new(block));
        Document { blocks }
    }

    /// New version with an empty paragraph appended
    pub fn with_empty_paragraph(&self) -> Document {
        let mut blocks = self.blocks.clone();
        blocks.push(Arc::new(Block::paragraph(self.fresh_key())));
        Document { blocks }
    }

    /// Allocate a key that no block in this document uses
    pub fn fresh_key(&self) -> BlockKey {
        let used: HashSet<&str> = self.blocks().map(|block| block.key().as_str()).collect();
        let mut n = self.blocks.len() as u64;
        loop {
            let candidate = to_base36(n);
            if !used.contains(candidate.as_str()) {
                return BlockKey(candidate);
            }
            n += 1;
        }
    }

    /// Whether two versions hold the very same block allocation at `index`
    pub fn shares_block_with(&self, other: &Document, index: usize) -> bool {
        match (self.blocks.get(index), other.blocks.get(index)) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Convert to plain text, one line per block
    pub fn to_plain_text(&self) -> String {
        self.blocks()
            .map(Block::to_plain_text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn to_base36(mut n: u64) -> String {
    const DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let mut out = Vec::new();
    loop {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
        if n == 0 {
            break;
        }
    }
    out.reverse();
    String::from_utf8_lossy(&out).into_owned()
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Document ({} blocks):", self.blocks.len())?;
        for (i, block) in self.blocks().enumerate() {
            write!(f, "  [{}] {:?} {}:", i, block.block_type(), block.key())?;
            if block.is_empty() {
                write!(f, " \"\"")?;
            }
            for run in block.runs() {
                if run.style.is_plain() {
                    write!(f, " {:?}", run.text)?;
                } else {
                    let names: Vec<&str> = run.style.styles().map(InlineStyle::name).collect();
                    write!(f, " {}:{:?}", names.join("+"), run.text)?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(k: &str) -> BlockKey {
        BlockKey::new(k)
    }

    #[test]
    fn test_text_run() {
        let run = TextRun::plain("hello world");
        assert_eq!(run.len(), 11);

        let (left, right) = run.split_at(5);
        assert_eq!(left.text, "hello");
        assert_eq!(right.text, " world");
    }

    #[test]
    fn test_text_run_split_counts_chars() {
        let run = TextRun::plain("größe");
        let (left, right) = run.split_at(3);
        assert_eq!(left.text, "grö");
        assert_eq!(right.text, "ße");
    }

    #[test]
    fn test_block_text_len() {
        let block = Block::paragraph(key("a"))
            .with_plain_text("hello")
            .with_text(" world", TextStyle::of(InlineStyle::Bold));

        assert_eq!(block.text_len(), 11);
        assert_eq!(block.to_plain_text(), "hello world");
        assert_eq!(block.runs().len(), 2);
    }

    #[test]
    fn test_runs_are_normalized() {
        let bold = TextStyle::of(InlineStyle::Bold);
        let block = Block::from_runs(
            key("a"),
            BlockType::Paragraph,
            vec![
                TextRun::new("ab", bold),
                TextRun::plain(""),
                TextRun::new("cd", bold),
                TextRun::plain("e"),
            ],
        );
        assert_eq!(
            block.runs(),
            &[TextRun::new("abcd", bold), TextRun::plain("e")]
        );
    }

    #[test]
    fn test_style_toggle() {
        let style = TextStyle::plain().toggled(InlineStyle::Red);
        assert!(style.contains(InlineStyle::Red));
        assert!(style.toggled(InlineStyle::Red).is_plain());
        assert_eq!(InlineStyle::from_name("UNDERLINE"), Some(InlineStyle::Underline));
        assert_eq!(InlineStyle::from_name("ITALIC"), None);
    }

    #[test]
    fn test_style_at() {
        let bold = TextStyle::of(InlineStyle::Bold);
        let block = Block::paragraph(key("a"))
            .with_text("ab", bold)
            .with_plain_text("cd");

        assert_eq!(block.style_at(0), bold);
        assert_eq!(block.style_at(2), bold);
        assert_eq!(block.style_at(3), TextStyle::plain());
        assert_eq!(block.style_at(4), TextStyle::plain());
        assert_eq!(Block::paragraph(key("b")).style_at(0), TextStyle::plain());
    }

    #[test]
    fn test_split_runs_at_straddling_run() {
        let red = TextStyle::of(InlineStyle::Red);
        let block = Block::paragraph(key("a"))
            .with_plain_text("one ")
            .with_text("two", red);

        let (left, right) = block.split_runs_at(5);
        assert_eq!(left, vec![TextRun::plain("one "), TextRun::new("t", red)]);
        assert_eq!(right, vec![TextRun::new("wo", red)]);
    }

    #[test]
    fn test_check_range() {
        let block = Block::paragraph(key("a")).with_plain_text("abc");
        assert!(block.check_range(0, 3).is_ok());
        assert!(block.check_range(2, 1).is_err());
        assert!(block.check_range(0, 4).is_err());
    }

    #[test]
    fn test_document_creation_rejects_duplicate_keys() {
        let doc = Document::from_blocks(vec![
            Block::paragraph(key("a")).with_plain_text("First paragraph"),
            Block::heading(key("b")).with_plain_text("A heading"),
        ])
        .unwrap();
        assert_eq!(doc.block_count(), 2);

        let dup = Document::from_blocks(vec![
            Block::paragraph(key("a")),
            Block::paragraph(key("a")),
        ]);
        assert!(matches!(dup, Err(EditError::Format(_))));
    }

    #[test]
    fn test_fresh_key_skips_used_keys() {
        let doc = Document::from_blocks(vec![
            Block::paragraph(key("2")),
            Block::paragraph(key("3")),
        ])
        .unwrap();
        assert_eq!(doc.fresh_key(), key("4"));
        assert_eq!(Document::new().fresh_key(), key("0"));
        assert_eq!(to_base36(36), "10");
    }

    #[test]
    fn test_replace_block_shares_untouched_blocks() {
        let doc = Document::from_blocks(vec![
            Block::paragraph(key("a")).with_plain_text("keep"),
            Block::paragraph(key("b")).with_plain_text("old"),
        ])
        .unwrap();
        let next = doc.replace_block(1, Block::paragraph(key("b")).with_plain_text("new"));

        assert!(next.shares_block_with(&doc, 0));
        assert!(!next.shares_block_with(&doc, 1));
        assert_eq!(doc.block_at(1).unwrap().to_plain_text(), "old");
        assert_eq!(next.block_at(1).unwrap().to_plain_text(), "new");
    }
}
