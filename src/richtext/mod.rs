// Rich text core: document model, editing operations and persistence format.

pub mod block_split;
pub mod editor_state;
pub mod mutation;
pub mod raw;
pub mod selection;
pub mod structured_document;
pub mod trigger;
