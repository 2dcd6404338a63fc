// Declarative mapping from style names to visual presentation, handed to the
// rendering surface. Nothing in the editing core reads it.

use serde::{Deserialize, Serialize};

use crate::richtext::structured_document::{BlockType, InlineStyle, TextStyle};

/// Visual attributes one style contributes. Colors are RGBA.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Presentation {
    pub font_size: Option<u8>,
    pub bold: bool,
    pub color: Option<u32>,
    pub underline: bool,
}

impl Presentation {
    /// Layer `other` on top of `self`
    pub fn merge(self, other: Presentation) -> Presentation {
        Presentation {
            font_size: other.font_size.or(self.font_size),
            bold: self.bold || other.bold,
            color: other.color.or(self.color),
            underline: self.underline || other.underline,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleMap {
    #[serde(rename = "HEADING")]
    pub heading: Presentation,
    #[serde(rename = "BOLD")]
    pub bold: Presentation,
    #[serde(rename = "RED")]
    pub red: Presentation,
    #[serde(rename = "UNDERLINE")]
    pub underline: Presentation,
}

impl Default for StyleMap {
    fn default() -> Self {
        Self {
            heading: Presentation {
                font_size: Some(24),
                bold: true,
                ..Default::default()
            },
            bold: Presentation {
                bold: true,
                ..Default::default()
            },
            red: Presentation {
                color: Some(0xFF0000FF),
                ..Default::default()
            },
            underline: Presentation {
                underline: true,
                ..Default::default()
            },
        }
    }
}

impl StyleMap {
    /// Entry for a recognized key (`HEADING`, `BOLD`, `RED`, `UNDERLINE`)
    pub fn entry(&self, name: &str) -> Option<&Presentation> {
        match name {
            "HEADING" => Some(&self.heading),
            _ => InlineStyle::from_name(name).map(|style| self.inline(style)),
        }
    }

    pub fn inline(&self, style: InlineStyle) -> &Presentation {
        match style {
            InlineStyle::Bold => &self.bold,
            InlineStyle::Red => &self.red,
            InlineStyle::Underline => &self.underline,
        }
    }

    /// Combined presentation of a run with `style` inside a block of `block_type`
    pub fn presentation(&self, block_type: BlockType, style: TextStyle) -> Presentation {
        let base = match block_type {
            BlockType::Heading => self.heading,
            BlockType::Paragraph => Presentation::default(),
        };
        style
            .styles()
            .fold(base, |acc, inline| acc.merge(*self.inline(inline)))
    }
}
