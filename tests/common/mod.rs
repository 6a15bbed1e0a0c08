use bedtime_stories::config::{FirestoreConfig, GeminiConfig};
use bedtime_stories::storage::SqliteStore;
use serde_json::{json, Value};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

#[allow(dead_code)]
pub fn create_temp_store() -> (SqliteStore, TempDir) {
    let tmp = TempDir::new().expect("failed to create tempdir");
    let store = SqliteStore::new_with_path(tmp.path().join("stories.db"))
        .expect("failed to create sqlite store with path");
    (store, tmp)
}

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}

/// Story text written to a temporary markdown file
#[allow(dead_code)]
pub fn temp_content_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let content_path = temp_dir.path().join("story.md");
    fs::write(&content_path, contents).expect("failed to write content file");
    (temp_dir, content_path)
}

/// Firestore settings pointing at a mock server
#[allow(dead_code)]
pub fn firestore_config(api_base: &str) -> FirestoreConfig {
    FirestoreConfig {
        api_base: api_base.to_string(),
        project_id: "bedtime-test".to_string(),
        api_key: Some("test-key".to_string()),
        ..Default::default()
    }
}

/// Gemini settings pointing at a mock server
#[allow(dead_code)]
pub fn gemini_config(api_base: &str) -> GeminiConfig {
    GeminiConfig {
        api_base: api_base.to_string(),
        api_key: Some("gemini-test-key".to_string()),
        ..Default::default()
    }
}

/// A `runQuery` result entry holding one story document
#[allow(dead_code)]
pub fn story_document(id: &str, fields: Value) -> Value {
    json!({
        "document": {
            "name": format!("projects/bedtime-test/databases/(default)/documents/stories/{}", id),
            "fields": fields,
            "createTime": "2025-01-01T00:00:00Z",
            "updateTime": "2025-01-01T00:00:00Z"
        },
        "readTime": "2025-06-01T00:00:00Z"
    })
}

/// A Gemini reply whose only candidate carries `text`
#[allow(dead_code)]
pub fn gemini_reply(text: &str) -> Value {
    json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": text }] },
            "finishReason": "STOP"
        }],
        "modelVersion": "gemini-2.0-flash"
    })
}
