// Serializer / Deserializer
// Converts documents to and from the raw JSON structure used for persistence:
//
// {"blocks": [{"key": "0", "text": "Hi", "type": "header-one", "depth": 0,
//              "inlineStyleRanges": [{"offset": 0, "length": 2, "style": "BOLD"}],
//              "entityRanges": [], "data": {}}],
//  "entityMap": {}}
//
// Offsets and lengths count characters.

use serde::Deserialize;
use serde_json::{Value, json};

use super::structured_document::{
    Block, BlockKey, BlockType, Document, InlineStyle, TextRun, TextStyle,
};
use crate::error::{EditError, Result};

const PARAGRAPH_TYPE: &str = "unstyled";
const HEADING_TYPE: &str = "header-one";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDocument {
    blocks: Vec<RawBlock>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawBlock {
    key: String,
    text: String,
    #[serde(rename = "type")]
    block_type: String,
    inline_style_ranges: Vec<RawStyleRange>,
    #[serde(default)]
    entity_ranges: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct RawStyleRange {
    offset: usize,
    length: usize,
    style: String,
}

fn block_type_name(block_type: BlockType) -> &'static str {
    match block_type {
        BlockType::Paragraph => PARAGRAPH_TYPE,
        BlockType::Heading => HEADING_TYPE,
    }
}

fn block_type_from_name(name: &str) -> Option<BlockType> {
    match name {
        PARAGRAPH_TYPE => Some(BlockType::Paragraph),
        HEADING_TYPE => Some(BlockType::Heading),
        _ => None,
    }
}

/// One range per maximal span of each style, in canonical style order
fn encode_style_ranges(block: &Block) -> Vec<Value> {
    let mut ranges = Vec::new();
    for style in InlineStyle::ALL {
        let mut open: Option<usize> = None;
        let mut pos = 0usize;
        for run in block.runs() {
            match (run.style.contains(style), open) {
                (true, None) => open = Some(pos),
                (false, Some(start)) => {
                    ranges.push(style_range(start, pos, style));
                    open = None;
                }
                _ => {}
            }
            pos += run.len();
        }
        if let Some(start) = open {
            ranges.push(style_range(start, pos, style));
        }
    }
    ranges
}

fn style_range(start: usize, end: usize, style: InlineStyle) -> Value {
    json!({
        "offset": start,
        "length": end - start,
        "style": style.name(),
    })
}

/// Convert a document into its persisted structure
pub fn serialize(document: &Document) -> Value {
    let blocks: Vec<Value> = document
        .blocks()
        .map(|block| {
            json!({
                "key": block.key().as_str(),
                "text": block.to_plain_text(),
                "type": block_type_name(block.block_type()),
                "depth": 0,
                "inlineStyleRanges": encode_style_ranges(block),
                "entityRanges": [],
                "data": {},
            })
        })
        .collect();

    json!({
        "blocks": blocks,
        "entityMap": {},
    })
}

fn decode_block(raw: RawBlock) -> Result<Block> {
    let block_type = block_type_from_name(&raw.block_type).ok_or_else(|| {
        EditError::format(format!(
            "block {} has unknown type {:?}",
            raw.key, raw.block_type
        ))
    })?;
    if !raw.entity_ranges.is_empty() {
        return Err(EditError::format(format!(
            "block {} carries entity ranges, which are not supported",
            raw.key
        )));
    }

    let chars: Vec<char> = raw.text.chars().collect();
    let mut styles = vec![TextStyle::plain(); chars.len()];

    for range in &raw.inline_style_ranges {
        let style = InlineStyle::from_name(&range.style).ok_or_else(|| {
            EditError::format(format!(
                "block {} uses unknown style {:?}",
                raw.key, range.style
            ))
        })?;
        let end = range
            .offset
            .checked_add(range.length)
            .filter(|end| range.length > 0 && *end <= chars.len())
            .ok_or_else(|| {
                EditError::format(format!(
                    "block {} has style range {}+{} outside text of length {}",
                    raw.key,
                    range.offset,
                    range.length,
                    chars.len()
                ))
            })?;
        for slot in &mut styles[range.offset..end] {
            *slot = slot.with(style, true);
        }
    }

    let runs = chars
        .iter()
        .zip(&styles)
        .map(|(ch, style)| TextRun::new(ch.to_string(), *style))
        .collect();
    Ok(Block::from_runs(BlockKey::new(raw.key), block_type, runs))
}

/// Rebuild a document from its persisted structure, rejecting anything
/// structurally invalid
pub fn deserialize(value: &Value) -> Result<Document> {
    let raw = RawDocument::deserialize(value)?;
    let blocks = raw
        .blocks
        .into_iter()
        .map(decode_block)
        .collect::<Result<Vec<_>>>()?;
    Document::from_blocks(blocks)
}

/// Serialize straight to JSON text
pub fn to_json_string(document: &Document) -> String {
    serialize(document).to_string()
}

/// Parse JSON text and deserialize it
pub fn from_json_str(json: &str) -> Result<Document> {
    let value: Value = serde_json::from_str(json)?;
    deserialize(&value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;

    fn key(k: &str) -> BlockKey {
        BlockKey::new(k)
    }

    fn sample() -> Document {
        let bold = TextStyle::of(InlineStyle::Bold);
        Document::from_blocks(vec![
            Block::heading(key("h")).with_plain_text("Notes"),
            Block::paragraph(key("p"))
                .with_plain_text("a ")
                .with_text("bo", bold)
                .with_text("th", bold.with(InlineStyle::Red, true))
                .with_plain_text(" z"),
            Block::paragraph(key("e")),
        ])
        .unwrap()
    }

    #[test]
    fn test_serialized_shape() {
        assert_snapshot!(
            to_json_string(&sample()),
            @r#"{"blocks":[{"data":{},"depth":0,"entityRanges":[],"inlineStyleRanges":[],"key":"h","text":"Notes","type":"header-one"},{"data":{},"depth":0,"entityRanges":[],"inlineStyleRanges":[{"length":4,"offset":2,"style":"BOLD"},{"length":2,"offset":4,"style":"RED"}],"key":"p","text":"a both z","type":"unstyled"},{"data":{},"depth":0,"entityRanges":[],"inlineStyleRanges":[],"key":"e","text":"","type":"unstyled"}],"entityMap":{}}"#
        );
    }

    #[test]
    fn test_round_trip() {
        let doc = sample();
        assert_eq!(deserialize(&serialize(&doc)).unwrap(), doc);

        let empty = Document::new();
        assert_eq!(deserialize(&serialize(&empty)).unwrap(), empty);

        let unicode = Document::with_paragraph("naïve ✓");
        assert_eq!(from_json_str(&to_json_string(&unicode)).unwrap(), unicode);
    }

    #[test]
    fn test_overlapping_ranges_merge() {
        let value = json!({
            "blocks": [{
                "key": "x",
                "text": "abcd",
                "type": "unstyled",
                "inlineStyleRanges": [
                    {"offset": 0, "length": 2, "style": "BOLD"},
                    {"offset": 1, "length": 3, "style": "BOLD"},
                ],
            }],
        });
        let doc = deserialize(&value).unwrap();
        assert_eq!(
            doc.block_at(0).unwrap().runs(),
            &[TextRun::new("abcd", TextStyle::of(InlineStyle::Bold))]
        );
    }

    #[test]
    fn test_rejects_invalid_input() {
        let cases = [
            json!({}),
            json!({"blocks": [{"text": "a", "type": "unstyled", "inlineStyleRanges": []}]}),
            json!({"blocks": [{"key": "a", "text": "a", "type": "code-block", "inlineStyleRanges": []}]}),
            json!({"blocks": [{"key": "a", "text": "a", "type": "unstyled",
                "inlineStyleRanges": [{"offset": 0, "length": 1, "style": "ITALIC"}]}]}),
            json!({"blocks": [{"key": "a", "text": "a", "type": "unstyled",
                "inlineStyleRanges": [{"offset": 0, "length": 2, "style": "BOLD"}]}]}),
            json!({"blocks": [{"key": "a", "text": "a", "type": "unstyled",
                "inlineStyleRanges": [{"offset": 1, "length": 0, "style": "BOLD"}]}]}),
            json!({"blocks": [
                {"key": "a", "text": "", "type": "unstyled", "inlineStyleRanges": []},
                {"key": "a", "text": "", "type": "unstyled", "inlineStyleRanges": []},
            ]}),
        ];

        for case in cases {
            assert!(
                matches!(deserialize(&case), Err(EditError::Format(_))),
                "accepted {}",
                case
            );
        }
    }

    #[test]
    fn test_accepts_original_editor_output() {
        let saved = r#"{"blocks":[{"key":"8ahs3","text":"Hello","type":"header-one","depth":0,"inlineStyleRanges":[],"entityRanges":[],"data":{}},{"key":"c1v0r","text":"red","type":"unstyled","depth":0,"inlineStyleRanges":[{"offset":0,"length":3,"style":"RED"}],"entityRanges":[],"data":{}}],"entityMap":{}}"#;
        let doc = from_json_str(saved).unwrap();

        assert_eq!(doc.block_count(), 2);
        assert_eq!(doc.block_at(0).unwrap().block_type(), BlockType::Heading);
        assert_eq!(
            doc.block_at(1).unwrap().runs(),
            &[TextRun::new("red", TextStyle::of(InlineStyle::Red))]
        );
    }
}
