//! Persistent embedding cache, one entry per corpus identity.
//!
//! A miss shuffles the provided corpus once, encodes it, and persists
//! the (sentences, vectors) pair; the shuffled order is frozen from
//! then on and is never re-randomized by a hit. Blobs share the framed
//! format of the graph snapshot, so an existing-but-undecodable file is
//! a corruption error rather than a silent miss.

use dashmap::DashMap;
use embed::SentenceEncoder;
use network::snapshot::{read_blob, write_blob, CachePolicy, SnapshotError};
use rand::seq::SliceRandom;
use rand::thread_rng;
use rkyv::ser::{serializers::AllocSerializer, Serializer};
use rkyv::{Archive, Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use topcats_core::error::{ErrorCode, TopcatsError};
use tracing::info;

const EMBEDDING_MAGIC: [u8; 4] = *b"TCEM";

/// Which named text collection a cache entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CorpusId {
    Categories,
    Articles,
}

impl CorpusId {
    pub fn as_str(self) -> &'static str {
        match self {
            CorpusId::Categories => "categories",
            CorpusId::Articles => "articles",
        }
    }

    fn file_name(self) -> &'static str {
        match self {
            CorpusId::Categories => "category-embeddings.bin",
            CorpusId::Articles => "article-embeddings.bin",
        }
    }
}

#[derive(Archive, Deserialize, Serialize)]
#[archive(check_bytes)]
struct EmbeddingBlob {
    sentences: Vec<String>,
    vectors: Vec<Vec<f32>>,
}

/// A frozen corpus: sentences and their vectors, row-aligned.
#[derive(Debug, Clone, PartialEq)]
pub struct CorpusEmbeddings {
    pub sentences: Vec<String>,
    pub vectors: Vec<Vec<f32>>,
}

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("cache blob error: {0}")]
    Blob(#[from] SnapshotError),
    #[error("encoder failure: {0}")]
    Encoder(#[source] anyhow::Error),
    #[error("cached embeddings are misaligned: {sentences} sentences, {vectors} vectors")]
    Misaligned { sentences: usize, vectors: usize },
}

impl TopcatsError for CacheError {
    fn error_code(&self) -> ErrorCode {
        match self {
            CacheError::Blob(err) => err.error_code(),
            CacheError::Encoder(_) => ErrorCode::Internal,
            CacheError::Misaligned { .. } => ErrorCode::CacheCorruption,
        }
    }
}

/// Lazily populated embedding cache. Safe to share across readers once
/// an entry is built; concurrent populate attempts for the same
/// identity coalesce to a single build.
pub struct EmbeddingStore {
    dir: PathBuf,
    policy: CachePolicy,
    loaded: DashMap<CorpusId, Arc<CorpusEmbeddings>>,
    build_lock: Mutex<()>,
}

impl EmbeddingStore {
    pub fn new(dir: impl Into<PathBuf>, policy: CachePolicy) -> Self {
        Self {
            dir: dir.into(),
            policy,
            loaded: DashMap::new(),
            build_lock: Mutex::new(()),
        }
    }

    pub fn blob_path(&self, id: CorpusId) -> PathBuf {
        self.dir.join(id.file_name())
    }

    /// Return the frozen corpus for `id`, computing and persisting it on
    /// first use. The provider is only invoked on a real miss.
    pub async fn get_or_compute<F>(
        &self,
        id: CorpusId,
        fingerprint: &str,
        provider: F,
        encoder: &dyn SentenceEncoder,
    ) -> Result<Arc<CorpusEmbeddings>, CacheError>
    where
        F: FnOnce() -> Vec<String>,
    {
        if let Some(hit) = self.loaded.get(&id) {
            return Ok(hit.clone());
        }

        // One build at a time; losers of the race see the winner's entry.
        let _guard = self.build_lock.lock().await;
        if let Some(hit) = self.loaded.get(&id) {
            return Ok(hit.clone());
        }

        let path = self.blob_path(id);
        if let Some(blob) = read_blob(&path, EMBEDDING_MAGIC).await? {
            if self.policy == CachePolicy::VerifyFingerprint && blob.fingerprint != fingerprint {
                info!("{} embeddings are stale, recomputing", id.as_str());
            } else {
                info!("Loaded pre-computed {} embeddings from disc", id.as_str());
                let corpus = Arc::new(decode(&blob.payload)?);
                self.loaded.insert(id, corpus.clone());
                return Ok(corpus);
            }
        }

        let mut sentences = provider();
        sentences.shuffle(&mut thread_rng());

        info!(
            "Encoding the {} corpus ({} sentences). This might take a while",
            id.as_str(),
            sentences.len()
        );
        let vectors = encoder
            .encode_batch(&sentences)
            .await
            .map_err(CacheError::Encoder)?;
        if vectors.len() != sentences.len() {
            return Err(CacheError::Misaligned {
                sentences: sentences.len(),
                vectors: vectors.len(),
            });
        }

        let blob = EmbeddingBlob { sentences, vectors };
        let mut serializer = AllocSerializer::<4096>::default();
        serializer
            .serialize_value(&blob)
            .map_err(|_| CacheError::Blob(SnapshotError::Serialization))?;
        let payload = serializer.into_serializer().into_inner();
        write_blob(&path, EMBEDDING_MAGIC, fingerprint, &payload).await?;
        info!("Stored {} embeddings on disc", id.as_str());

        let corpus = Arc::new(CorpusEmbeddings {
            sentences: blob.sentences,
            vectors: blob.vectors,
        });
        self.loaded.insert(id, corpus.clone());
        Ok(corpus)
    }
}

fn decode(payload: &[u8]) -> Result<CorpusEmbeddings, CacheError> {
    // Validation needs the archive's alignment; the payload was cut out
    // of the framed file at an arbitrary offset.
    let mut aligned = rkyv::AlignedVec::with_capacity(payload.len());
    aligned.extend_from_slice(payload);
    let archived = rkyv::check_archived_root::<EmbeddingBlob>(&aligned)
        .map_err(|_| CacheError::Blob(SnapshotError::Corrupt("payload validation failed")))?;
    let blob: EmbeddingBlob = archived
        .deserialize(&mut rkyv::Infallible)
        .map_err(|_| CacheError::Blob(SnapshotError::Corrupt("payload deserialization failed")))?;

    if blob.sentences.len() != blob.vectors.len() {
        return Err(CacheError::Misaligned {
            sentences: blob.sentences.len(),
            vectors: blob.vectors.len(),
        });
    }
    Ok(CorpusEmbeddings {
        sentences: blob.sentences,
        vectors: blob.vectors,
    })
}
