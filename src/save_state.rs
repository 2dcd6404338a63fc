use chrono::{DateTime, Duration, Local};

use crate::error::Result;
use crate::persistence::save_document;
use crate::richtext::editor_state::EditorState;
use crate::richtext::structured_document::Document;
use crate::store::PersistenceStore;

/// Bookkeeping for explicit saves of the current document
pub struct SaveState {
    /// When the content was last changed
    pub last_change_time: Option<DateTime<Local>>,
    /// When the content was last successfully saved
    pub last_save_time: Option<DateTime<Local>>,
    /// Key the document is saved under
    pub storage_key: String,
    /// Document version known to be in the store
    saved_document: Option<Document>,
}

impl SaveState {
    pub fn new(storage_key: impl Into<String>) -> Self {
        SaveState {
            last_change_time: None,
            last_save_time: None,
            storage_key: storage_key.into(),
            saved_document: None,
        }
    }

    /// Mark that content has changed
    pub fn mark_changed(&mut self) {
        self.last_change_time = Some(Local::now());
    }

    /// Reset after loading `document` from the store
    pub fn reset_for_document(&mut self, document: &Document) {
        self.saved_document = Some(document.clone());
        self.last_change_time = None;
        self.last_save_time = None;
    }

    /// Whether `document` differs from the last saved version
    pub fn is_dirty(&self, document: &Document) -> bool {
        self.saved_document.as_ref() != Some(document)
    }

    /// Get the status text for display
    pub fn status_text(&self) -> String {
        if let Some(save_time) = self.last_save_time {
            format_time_since(save_time, Local::now())
        } else if self.last_change_time.is_some() {
            "not saved".to_string()
        } else {
            String::new()
        }
    }

    /// Save the document held by `editor`. Unchanged content is not written
    /// again. On failure the error is returned and nothing here changes.
    pub fn trigger_save<S: PersistenceStore + ?Sized>(
        &mut self,
        editor: &EditorState,
        store: &mut S,
    ) -> Result<()> {
        let document = editor.document();
        if !self.is_dirty(document) {
            return Ok(());
        }

        save_document(store, &self.storage_key, document)?;
        self.saved_document = Some(document.clone());
        self.last_save_time = Some(Local::now());
        Ok(())
    }
}

/// Format the age of a save as a human-readable string
pub fn format_time_since(time: DateTime<Local>, now: DateTime<Local>) -> String {
    let elapsed = now.signed_duration_since(time);
    if elapsed < Duration::zero() {
        return "saved (time error)".to_string();
    }

    let secs = elapsed.num_seconds();
    if secs < 60 {
        "saved just now".to_string()
    } else if secs < 3600 {
        plural("min", secs / 60)
    } else if secs < 86400 {
        plural("hour", secs / 3600)
    } else if secs < 604800 {
        plural("day", secs / 86400)
    } else {
        format!("saved {}", time.format("%Y-%m-%d"))
    }
}

fn plural(unit: &str, n: i64) -> String {
    if n == 1 || unit == "min" {
        format!("saved {} {} ago", n, unit)
    } else {
        format!("saved {} {}s ago", n, unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EditError;
    use crate::store::MemoryStore;
    use chrono::TimeZone;
    use serde_json::Value;

    struct BrokenStore;

    impl PersistenceStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<Value>> {
            Ok(None)
        }

        fn set(&mut self, _key: &str, _value: &Value) -> Result<()> {
            Err(EditError::store("quota exceeded"))
        }
    }

    #[test]
    fn test_save_state_new() {
        let state = SaveState::new("doc");
        assert!(state.last_change_time.is_none());
        assert!(state.last_save_time.is_none());
        assert_eq!(state.status_text(), "");
    }

    #[test]
    fn test_mark_changed() {
        let mut state = SaveState::new("doc");
        state.mark_changed();
        assert!(state.last_change_time.is_some());
        assert_eq!(state.status_text(), "not saved");
    }

    #[test]
    fn test_trigger_save_writes_once() {
        let mut state = SaveState::new("doc");
        let mut store = MemoryStore::new();
        let editor = EditorState::new().type_text("hi").unwrap();

        assert!(state.is_dirty(editor.document()));
        state.trigger_save(&editor, &mut store).unwrap();
        assert!(!state.is_dirty(editor.document()));
        assert!(store.raw("doc").is_some());
        assert_eq!(state.status_text(), "saved just now");

        store.insert_raw("doc", "untouched");
        state.trigger_save(&editor, &mut store).unwrap();
        assert_eq!(store.raw("doc"), Some("untouched"));
    }

    #[test]
    fn test_failed_save_keeps_state() {
        let mut state = SaveState::new("doc");
        let editor = EditorState::new().type_text("hi").unwrap();
        let before = editor.clone();

        let result = state.trigger_save(&editor, &mut BrokenStore);
        assert!(matches!(result, Err(EditError::Store(_))));
        assert!(state.is_dirty(editor.document()));
        assert!(state.last_save_time.is_none());
        assert_eq!(editor, before);
    }

    #[test]
    fn test_format_time_since() {
        let now = Local.with_ymd_and_hms(2024, 3, 20, 12, 0, 0).unwrap();
        let ago = |secs| now - Duration::seconds(secs);

        assert_eq!(format_time_since(ago(10), now), "saved just now");
        assert_eq!(format_time_since(ago(150), now), "saved 2 min ago");
        assert_eq!(format_time_since(ago(3600), now), "saved 1 hour ago");
        assert_eq!(format_time_since(ago(7200), now), "saved 2 hours ago");
        assert_eq!(format_time_since(ago(3 * 86400), now), "saved 3 days ago");
        assert_eq!(format_time_since(ago(30 * 86400), now), "saved 2024-02-19");
        assert_eq!(
            format_time_since(now + Duration::seconds(5), now),
            "saved (time error)"
        );
    }
}
