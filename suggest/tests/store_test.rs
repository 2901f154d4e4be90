use embed::HashEncoder;
use network::snapshot::CachePolicy;
use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};
use suggest::store::{CorpusId, EmbeddingStore};
use tempfile::tempdir;
use topcats_core::error::{ErrorCode, TopcatsError};

const DIMS: usize = 32;

fn corpus() -> Vec<String> {
    (0..30).map(|i| format!("Category_{i}")).collect()
}

#[tokio::test]
async fn miss_shuffles_once_and_hit_keeps_the_frozen_order() {
    let dir = tempdir().unwrap();
    let encoder = HashEncoder::new("category-suggest", DIMS);

    let store = EmbeddingStore::new(dir.path(), CachePolicy::TrustExisting);
    let first = store
        .get_or_compute(CorpusId::Categories, "fp-1", corpus, &encoder)
        .await
        .unwrap();

    assert_eq!(first.sentences.len(), 30);
    assert_eq!(first.vectors.len(), 30);
    assert!(first.vectors.iter().all(|v| v.len() == DIMS));
    let mut sorted = first.sentences.clone();
    sorted.sort();
    let mut expected = corpus();
    expected.sort();
    assert_eq!(sorted, expected);

    // A fresh store over the same directory must restore the frozen
    // order from disc, never invoke the provider again.
    let reopened = EmbeddingStore::new(dir.path(), CachePolicy::TrustExisting);
    let second = reopened
        .get_or_compute(
            CorpusId::Categories,
            "fp-1",
            || panic!("provider must not run on a cache hit"),
            &encoder,
        )
        .await
        .unwrap();

    assert_eq!(second.sentences, first.sentences);
    assert_eq!(second.vectors, first.vectors);
}

#[tokio::test]
async fn concurrent_lookups_coalesce_to_one_build() {
    let dir = tempdir().unwrap();
    let encoder = HashEncoder::new("category-suggest", DIMS);
    let store = EmbeddingStore::new(dir.path(), CachePolicy::TrustExisting);
    let calls = AtomicUsize::new(0);

    let provider = || {
        calls.fetch_add(1, Ordering::SeqCst);
        corpus()
    };
    let provider2 = || {
        calls.fetch_add(1, Ordering::SeqCst);
        corpus()
    };

    let (a, b) = tokio::join!(
        store.get_or_compute(CorpusId::Categories, "fp-1", provider, &encoder),
        store.get_or_compute(CorpusId::Categories, "fp-1", provider2, &encoder),
    );

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(a.unwrap().sentences, b.unwrap().sentences);
}

#[tokio::test]
async fn category_and_article_entries_are_independent() {
    let dir = tempdir().unwrap();
    let encoder = HashEncoder::new("category-suggest", DIMS);
    let store = EmbeddingStore::new(dir.path(), CachePolicy::TrustExisting);

    store
        .get_or_compute(CorpusId::Categories, "fp-1", corpus, &encoder)
        .await
        .unwrap();
    store
        .get_or_compute(
            CorpusId::Articles,
            "fp-1",
            || vec!["A".to_string(), "B".to_string()],
            &encoder,
        )
        .await
        .unwrap();

    assert!(store.blob_path(CorpusId::Categories).exists());
    assert!(store.blob_path(CorpusId::Articles).exists());
    assert_ne!(
        store.blob_path(CorpusId::Categories),
        store.blob_path(CorpusId::Articles)
    );
}

#[tokio::test]
async fn corrupt_blob_is_reported_not_recomputed() {
    let dir = tempdir().unwrap();
    let encoder = HashEncoder::new("category-suggest", DIMS);

    {
        let store = EmbeddingStore::new(dir.path(), CachePolicy::TrustExisting);
        store
            .get_or_compute(CorpusId::Categories, "fp-1", corpus, &encoder)
            .await
            .unwrap();
    }

    let path = dir.path().join("category-embeddings.bin");
    let mut bytes = fs::read(&path).unwrap();
    let last = bytes.len() - 1;
    bytes[last] ^= 0xFF;
    fs::write(&path, &bytes).unwrap();

    let store = EmbeddingStore::new(dir.path(), CachePolicy::TrustExisting);
    let err = store
        .get_or_compute(
            CorpusId::Categories,
            "fp-1",
            || panic!("corruption must not fall back to a rebuild"),
            &encoder,
        )
        .await
        .unwrap_err();

    assert_eq!(err.error_code(), ErrorCode::CacheCorruption);
}

#[tokio::test]
async fn verify_fingerprint_recomputes_stale_entries() {
    let dir = tempdir().unwrap();
    let encoder = HashEncoder::new("category-suggest", DIMS);

    {
        let store = EmbeddingStore::new(dir.path(), CachePolicy::VerifyFingerprint);
        store
            .get_or_compute(CorpusId::Categories, "fp-1", corpus, &encoder)
            .await
            .unwrap();
    }

    let calls = AtomicUsize::new(0);
    let store = EmbeddingStore::new(dir.path(), CachePolicy::VerifyFingerprint);
    store
        .get_or_compute(
            CorpusId::Categories,
            "fp-2",
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                corpus()
            },
            &encoder,
        )
        .await
        .unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn trust_existing_serves_stale_entries() {
    let dir = tempdir().unwrap();
    let encoder = HashEncoder::new("category-suggest", DIMS);

    {
        let store = EmbeddingStore::new(dir.path(), CachePolicy::TrustExisting);
        store
            .get_or_compute(CorpusId::Categories, "fp-1", corpus, &encoder)
            .await
            .unwrap();
    }

    let store = EmbeddingStore::new(dir.path(), CachePolicy::TrustExisting);
    store
        .get_or_compute(
            CorpusId::Categories,
            "fp-2",
            || panic!("trust-the-cache must not recompute"),
            &encoder,
        )
        .await
        .unwrap();
}
