// Library exports for richpad

pub mod error;
pub mod persistence;
pub mod richtext;
pub mod save_state;
pub mod settings;
pub mod store;
pub mod style_map;

pub use error::{EditError, Result};
pub use richtext::editor_state::{EditorState, InputOutcome};
pub use richtext::selection::Selection;
pub use richtext::structured_document::{
    Block, BlockKey, BlockType, Document, InlineStyle, TextRun, TextStyle,
};
