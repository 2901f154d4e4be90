//! Whole-object caching of the attributed graph.
//!
//! Blobs carry a small header (magic, format version, CRC32 of the
//! payload, source fingerprint) and are written to a temp file then
//! atomically renamed. A blob that exists but fails any header or
//! payload check is a corruption error, surfaced distinctly from a
//! plain cache miss.

use crate::graph::{ArticleGraph, GraphError};
use corpus::CorpusError;
use rkyv::ser::{serializers::AllocSerializer, Serializer};
use rkyv::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use topcats_core::error::{ErrorCode, TopcatsError};
use topcats_core::model::{ArticleMap, CategoryMap};
use tracing::info;

const GRAPH_MAGIC: [u8; 4] = *b"TCGR";
const FORMAT_VERSION: u8 = 1;

#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("cache blob is corrupt: {0}")]
    Corrupt(&'static str),
    #[error("serialization failed")]
    Serialization,
}

impl TopcatsError for SnapshotError {
    fn error_code(&self) -> ErrorCode {
        match self {
            SnapshotError::Io(_) | SnapshotError::Serialization => ErrorCode::Internal,
            SnapshotError::Corrupt(_) => ErrorCode::CacheCorruption,
        }
    }
}

/// What a cache hit is allowed to trust.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CachePolicy {
    /// Use any blob that exists; the caller guarantees freshness.
    #[default]
    TrustExisting,
    /// Rebuild when the stored source fingerprint no longer matches.
    VerifyFingerprint,
}

/// A decoded blob: the fingerprint it was built from plus the payload.
pub struct Blob {
    pub fingerprint: String,
    pub payload: Vec<u8>,
}

/// Write a framed blob to `path` via temp-file-and-rename.
pub async fn write_blob(
    path: &Path,
    magic: [u8; 4],
    fingerprint: &str,
    payload: &[u8],
) -> Result<(), SnapshotError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).await?;
        }
    }

    let mut hasher = crc32fast::Hasher::new();
    hasher.update(payload);
    let crc = hasher.finalize();

    let fp = fingerprint.as_bytes();
    let mut framed = Vec::with_capacity(13 + fp.len() + payload.len());
    framed.extend_from_slice(&magic);
    framed.push(FORMAT_VERSION);
    framed.extend_from_slice(&crc.to_le_bytes());
    framed.extend_from_slice(&(fp.len() as u32).to_le_bytes());
    framed.extend_from_slice(fp);
    framed.extend_from_slice(payload);

    let tmp_path = path.with_extension("tmp");
    fs::write(&tmp_path, &framed).await?;
    fs::rename(&tmp_path, path).await?;
    Ok(())
}

/// Read a framed blob. `Ok(None)` means the file does not exist; every
/// structural failure of an existing file is `Corrupt`.
pub async fn read_blob(path: &Path, magic: [u8; 4]) -> Result<Option<Blob>, SnapshotError> {
    let bytes = match fs::read(path).await {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(SnapshotError::Io(err)),
    };

    if bytes.len() < 13 {
        return Err(SnapshotError::Corrupt("truncated header"));
    }
    if bytes[..4] != magic {
        return Err(SnapshotError::Corrupt("magic mismatch"));
    }
    if bytes[4] != FORMAT_VERSION {
        return Err(SnapshotError::Corrupt("unsupported format version"));
    }

    let mut crc_bytes = [0u8; 4];
    crc_bytes.copy_from_slice(&bytes[5..9]);
    let expected_crc = u32::from_le_bytes(crc_bytes);

    let mut len_bytes = [0u8; 4];
    len_bytes.copy_from_slice(&bytes[9..13]);
    let fp_len = u32::from_le_bytes(len_bytes) as usize;

    if bytes.len() < 13 + fp_len {
        return Err(SnapshotError::Corrupt("truncated fingerprint"));
    }
    let fingerprint = std::str::from_utf8(&bytes[13..13 + fp_len])
        .map_err(|_| SnapshotError::Corrupt("fingerprint is not UTF-8"))?
        .to_string();
    let payload = bytes[13 + fp_len..].to_vec();

    let mut hasher = crc32fast::Hasher::new();
    hasher.update(&payload);
    if hasher.finalize() != expected_crc {
        return Err(SnapshotError::Corrupt("CRC mismatch"));
    }

    Ok(Some(Blob {
        fingerprint,
        payload,
    }))
}

#[derive(Error, Debug)]
pub enum GraphStoreError {
    #[error("snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),
    #[error("corpus error: {0}")]
    Corpus(#[from] CorpusError),
    #[error("graph error: {0}")]
    Graph(#[from] GraphError),
}

impl TopcatsError for GraphStoreError {
    fn error_code(&self) -> ErrorCode {
        match self {
            GraphStoreError::Snapshot(err) => err.error_code(),
            GraphStoreError::Corpus(err) => err.error_code(),
            GraphStoreError::Graph(err) => err.error_code(),
        }
    }
}

/// Builds the attributed graph once and caches it on disk.
pub struct GraphStore {
    path: PathBuf,
    policy: CachePolicy,
}

impl GraphStore {
    pub fn new(path: impl Into<PathBuf>, policy: CachePolicy) -> Self {
        Self {
            path: path.into(),
            policy,
        }
    }

    pub async fn load(&self, fingerprint: &str) -> Result<Option<ArticleGraph>, SnapshotError> {
        let Some(blob) = read_blob(&self.path, GRAPH_MAGIC).await? else {
            return Ok(None);
        };

        if self.policy == CachePolicy::VerifyFingerprint && blob.fingerprint != fingerprint {
            info!("Graph snapshot is stale, rebuilding");
            return Ok(None);
        }

        // Validation needs the archive's alignment; the payload was cut
        // out of the framed file at an arbitrary offset.
        let mut aligned = rkyv::AlignedVec::with_capacity(blob.payload.len());
        aligned.extend_from_slice(&blob.payload);
        let archived = rkyv::check_archived_root::<ArticleGraph>(&aligned)
            .map_err(|_| SnapshotError::Corrupt("payload validation failed"))?;
        let graph: ArticleGraph = archived
            .deserialize(&mut rkyv::Infallible)
            .map_err(|_| SnapshotError::Corrupt("payload deserialization failed"))?;
        Ok(Some(graph))
    }

    pub async fn save(&self, graph: &ArticleGraph, fingerprint: &str) -> Result<(), SnapshotError> {
        let mut serializer = AllocSerializer::<4096>::default();
        serializer
            .serialize_value(graph)
            .map_err(|_| SnapshotError::Serialization)?;
        let payload = serializer.into_serializer().into_inner();

        write_blob(&self.path, GRAPH_MAGIC, fingerprint, &payload).await
    }

    /// Load the cached graph, or build it from the edge list and cache
    /// it for the next run.
    pub async fn build_or_load(
        &self,
        edge_list: &Path,
        articles: &ArticleMap,
        categories: &CategoryMap,
        fingerprint: &str,
    ) -> Result<ArticleGraph, GraphStoreError> {
        if let Some(graph) = self.load(fingerprint).await? {
            info!(
                "Loaded graph snapshot: {} nodes, {} edges",
                graph.node_count(),
                graph.edge_count()
            );
            return Ok(graph);
        }

        info!("Creating the network...");
        let edges = corpus::read_edge_list(edge_list)?;
        let graph = ArticleGraph::from_edges(&edges, articles, categories)?;

        info!("Storing graph snapshot on disc...");
        self.save(&graph, fingerprint).await?;
        Ok(graph)
    }
}
