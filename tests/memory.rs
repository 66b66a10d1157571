//! Persistence tests for the JSON conversation log.

use std::sync::Arc;
use tempfile::TempDir;

use research_harness::memory_store::MemoryStore;

#[tokio::test]
async fn append_then_reload_yields_equal_entries() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("memory_store.json");

    let store = MemoryStore::load(&path).await;
    store
        .add_entry(
            "What is WAL mode?",
            "Write-ahead logging lets readers proceed during writes.",
            vec!["https://sqlite.org/wal.html".to_string()],
        )
        .await;
    store
        .add_entry("Who wrote Dune?", "Frank Herbert.", Vec::new())
        .await;
    let before = store.entries().await;

    let reloaded = MemoryStore::load(&path).await;
    assert_eq!(reloaded.entries().await, before);
    assert!(!tmp.path().join("memory_store.json.tmp").exists());
}

#[tokio::test]
async fn concurrent_appends_are_all_persisted() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("memory.json");
    let store = Arc::new(MemoryStore::load(&path).await);

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let store = store.clone();
            tokio::spawn(async move {
                store
                    .add_entry(&format!("question {i}"), "answer", Vec::new())
                    .await;
            })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap();
    }

    let reloaded = MemoryStore::load(&path).await;
    assert_eq!(reloaded.len().await, 16);
}

#[tokio::test]
async fn search_ranks_question_hits_above_answer_hits() {
    let tmp = TempDir::new().unwrap();
    let store = MemoryStore::load(tmp.path().join("memory.json")).await;
    store
        .add_entry("deploying axum", "use tokio and tower", Vec::new())
        .await;
    store
        .add_entry("tokio runtime flavors", "current_thread or multi_thread", Vec::new())
        .await;
    store.add_entry("baking bread", "use flour", Vec::new()).await;

    let hits = store.search("tokio tips", 3).await;
    let questions: Vec<&str> = hits.iter().map(|e| e.question.as_str()).collect();
    assert_eq!(questions, vec!["tokio runtime flavors", "deploying axum"]);
}

#[tokio::test]
async fn log_with_naive_timestamps_survives_an_append() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("memory_store.json");
    std::fs::write(
        &path,
        r#"[
  {"question": "What is RAG?", "answer": "Retrieval then generation.", "citations": [], "timestamp": "2024-05-01T10:20:30.123456"},
  {"question": "Who wrote Dune?", "answer": "Frank Herbert.", "citations": ["https://example.com"], "timestamp": "2024-05-02T08:00:00"}
]"#,
    )
    .unwrap();

    let store = MemoryStore::load(&path).await;
    assert_eq!(store.len().await, 2);
    store.add_entry("What is WAL?", "A journal mode.", Vec::new()).await;

    let reloaded = MemoryStore::load(&path).await;
    let questions: Vec<String> = reloaded
        .entries()
        .await
        .into_iter()
        .map(|e| e.question)
        .collect();
    assert_eq!(questions, vec!["What is RAG?", "Who wrote Dune?", "What is WAL?"]);
}

#[tokio::test]
async fn unparseable_log_is_kept_aside_before_first_append() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("memory_store.json");
    let original = r#"[{"question": "q", "answer": "a", "timestamp": "not a time"}]"#;
    std::fs::write(&path, original).unwrap();

    let store = MemoryStore::load(&path).await;
    assert!(store.is_empty().await);
    store.add_entry("fresh", "start", Vec::new()).await;

    let kept = std::fs::read_to_string(tmp.path().join("memory_store.json.corrupt")).unwrap();
    assert_eq!(kept, original);
    assert_eq!(MemoryStore::load(&path).await.len().await, 1);
}
