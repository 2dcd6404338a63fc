// Loading and saving the single persisted document through a store.

use log::{info, warn};

use crate::error::{Result, ResultExt};
use crate::richtext::raw::{deserialize, serialize};
use crate::richtext::structured_document::Document;
use crate::store::PersistenceStore;

/// Key the document is stored under unless configured otherwise
pub const DEFAULT_STORAGE_KEY: &str = "draftEditorContent";

/// Load the document stored under `key`. `Ok(None)` when nothing is stored;
/// malformed content is a `Format` error.
pub fn load_document<S: PersistenceStore + ?Sized>(store: &S, key: &str) -> Result<Option<Document>> {
    let Some(value) = store.get(key)? else {
        return Ok(None);
    };
    let document = deserialize(&value)?;
    info!(
        "loaded document {} with {} blocks",
        key,
        document.block_count()
    );
    Ok(Some(document))
}

/// Load the stored document, falling back to an empty one when nothing is
/// stored or the stored value cannot be read
pub fn load_or_empty<S: PersistenceStore + ?Sized>(store: &S, key: &str) -> Document {
    load_document(store, key)
        .map(Option::unwrap_or_default)
        .unwrap_or_warn_default(Document::new(), "Failed to load saved document")
}

/// Write a snapshot of `document` under `key`
pub fn save_document<S: PersistenceStore + ?Sized>(
    store: &mut S,
    key: &str,
    document: &Document,
) -> Result<()> {
    let value = serialize(document);
    if let Err(err) = store.set(key, &value) {
        warn!("saving document {} failed: {}", key, err);
        return Err(err);
    }
    info!(
        "saved document {} with {} blocks",
        key,
        document.block_count()
    );
    Ok(())
}
