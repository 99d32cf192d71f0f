use super::*;
use dropin_protocols::keys;
use serde_json::json;

#[tokio::test]
async fn test_open_missing_file_is_empty() {
    let temp_dir = tempfile::tempdir().unwrap();
    let store = JsonFilePreferenceStore::open(temp_dir.path().join("prefs.json"))
        .await
        .unwrap();

    let entries = store.get(&keys::ALL).await.unwrap();
    assert!(entries.is_empty());
    assert!(!store.path().exists());
}

#[tokio::test]
async fn test_open_creates_parent_dir() {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = temp_dir.path().join("nested").join("dir").join("prefs.json");
    let _store = JsonFilePreferenceStore::open(&path).await.unwrap();

    assert!(path.parent().unwrap().is_dir());
}

#[tokio::test]
async fn test_set_writes_file() {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = temp_dir.path().join("prefs.json");
    let store = JsonFilePreferenceStore::open(&path).await.unwrap();

    store
        .set(vec![(keys::VISIBLE.to_string(), json!(true))])
        .await
        .unwrap();

    let on_disk: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(on_disk, json!({ "dropinInspector_visible": true }));
}

#[tokio::test]
async fn test_values_survive_reopen() {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = temp_dir.path().join("prefs.json");

    {
        let store = JsonFilePreferenceStore::open(&path).await.unwrap();
        store
            .set(vec![
                (keys::SHOW_EMPTY.to_string(), json!(true)),
                (
                    keys::POSITION.to_string(),
                    json!({ "top": "10px", "left": "20px", "right": "auto" }),
                ),
            ])
            .await
            .unwrap();
    }

    let store = JsonFilePreferenceStore::open(&path).await.unwrap();
    let entries = store.get(&[keys::SHOW_EMPTY, keys::POSITION]).await.unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0], (keys::SHOW_EMPTY.to_string(), json!(true)));
    assert_eq!(entries[1].1["left"], json!("20px"));
}

#[tokio::test]
async fn test_set_merges_with_existing_keys() {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = temp_dir.path().join("prefs.json");
    std::fs::write(&path, r#"{"other": 1, "dropinInspector_visible": false}"#).unwrap();

    let store = JsonFilePreferenceStore::open(&path).await.unwrap();
    store
        .set(vec![(keys::VISIBLE.to_string(), json!(true))])
        .await
        .unwrap();

    let on_disk: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(on_disk["other"], json!(1));
    assert_eq!(on_disk[keys::VISIBLE], json!(true));
}

#[tokio::test]
async fn test_empty_file_is_empty_store() {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = temp_dir.path().join("prefs.json");
    std::fs::write(&path, "  \n").unwrap();

    let store = JsonFilePreferenceStore::open(&path).await.unwrap();
    assert!(store.get(&keys::ALL).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_invalid_json_fails() {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = temp_dir.path().join("prefs.json");
    std::fs::write(&path, "{ not json").unwrap();

    let result = JsonFilePreferenceStore::open(&path).await;
    assert!(matches!(result, Err(PrefsError::Parse(_))));
}

#[tokio::test]
async fn test_non_object_fails() {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = temp_dir.path().join("prefs.json");
    std::fs::write(&path, "[1, 2]").unwrap();

    let result = JsonFilePreferenceStore::open(&path).await;
    assert!(matches!(result, Err(PrefsError::NotAnObject { .. })));
}

#[tokio::test]
async fn test_write_failure_keeps_cache() {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = temp_dir.path().join("prefs.json");
    let store = JsonFilePreferenceStore::open(&path).await.unwrap();

    // A directory where the file should be makes the write fail.
    std::fs::create_dir(&path).unwrap();
    let result = store
        .set(vec![(keys::VISIBLE.to_string(), json!(true))])
        .await;

    assert!(matches!(result, Err(StorageError::WriteFailed(_))));
    assert!(store.get(&[keys::VISIBLE]).await.unwrap().is_empty());
}
