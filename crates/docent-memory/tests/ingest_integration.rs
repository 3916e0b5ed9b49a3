use docent_llm::LlmProvider;
use docent_llm::mock::MockProvider;
use docent_memory::document::{concat_documents, load_folder};
use docent_memory::{
    DocumentError, IndexManifest, SplitterConfig, TextLoader, TextSplitter, VectorIndex,
};

fn keyword_provider() -> MockProvider {
    MockProvider::default().with_keywords(["tokio", "serde", "axum"])
}

#[tokio::test]
async fn folder_to_index_and_back() {
    let data = tempfile::tempdir().unwrap();
    std::fs::write(
        data.path().join("a.txt"),
        "Tokio is an async runtime. Tokio schedules tasks.\n\n",
    )
    .unwrap();
    std::fs::write(
        data.path().join("b.txt"),
        "Serde serializes data. Serde derives impls.\n\nAxum routes HTTP requests.",
    )
    .unwrap();

    let docs = load_folder(data.path(), &TextLoader::default())
        .await
        .unwrap();
    assert_eq!(docs.len(), 2);

    let text = concat_documents(&docs);
    let splitter = TextSplitter::new(SplitterConfig {
        chunk_size: 60,
        chunk_overlap: 0,
        ..SplitterConfig::default()
    });
    let chunks = splitter.split_text(&text);
    assert!(chunks.len() >= 3, "expected several chunks, got {chunks:?}");

    let provider = keyword_provider();
    let vectors = provider.embed_batch(&chunks).await.unwrap();
    let dimension = vectors[0].len();
    let index = VectorIndex::build(
        IndexManifest::new("mock", dimension, vec!["a.txt".into(), "b.txt".into()]),
        chunks,
        vectors,
    )
    .unwrap();

    let db = tempfile::tempdir().unwrap();
    let index_dir = db.path().join("vector-index");
    index.save(&index_dir).await.unwrap();
    let loaded = VectorIndex::load(&index_dir).await.unwrap();
    assert_eq!(loaded.len(), index.len());

    let query = provider.embed("how does axum route?").await.unwrap();
    let hits = loaded.search(&query, 3).unwrap();
    assert!(hits[0].text.contains("Axum"), "top hit: {:?}", hits[0]);
}

#[tokio::test]
async fn empty_upload_dir_surfaces_not_found() {
    let data = tempfile::tempdir().unwrap();
    let err = load_folder(data.path(), &TextLoader::default())
        .await
        .unwrap_err();
    assert!(matches!(err, DocumentError::NotFound(_)));
    assert!(err.to_string().contains("no documents found"));
}
