//! Line-oriented loaders for the three flat-file corpus formats.
//!
//! - page-name file: `"<node_id> <article_name>"`, split on the first
//!   space only (names may contain spaces)
//! - category file: `"Category:<name>;<id_1> <id_2> ... <id_n>"`
//! - edge-list file: `"<from_id> <to_id>"`, one directed edge per line
//!
//! Malformed lines are reported with their path and line number, never
//! skipped.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use thiserror::Error;
use topcats_core::error::{ErrorCode, TopcatsError};
use topcats_core::model::{ArticleMap, CategoryMap};
use tracing::info;

#[derive(Error, Debug)]
pub enum CorpusError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed line {line} in {path}: {reason}")]
    Malformed {
        path: PathBuf,
        line: usize,
        reason: &'static str,
    },
    #[error("unknown node reference: {id}")]
    MissingReference { id: String },
}

impl TopcatsError for CorpusError {
    fn error_code(&self) -> ErrorCode {
        match self {
            CorpusError::Io { .. } => ErrorCode::Internal,
            CorpusError::Malformed { .. } => ErrorCode::InvalidInput,
            CorpusError::MissingReference { .. } => ErrorCode::MissingReference,
        }
    }
}

fn open(path: &Path) -> Result<BufReader<File>, CorpusError> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|source| CorpusError::Io {
            path: path.to_path_buf(),
            source,
        })
}

fn lines(path: &Path) -> Result<impl Iterator<Item = Result<(usize, String), CorpusError>>, CorpusError> {
    let path_buf = path.to_path_buf();
    let reader = open(path)?;
    Ok(reader.lines().enumerate().map(move |(idx, line)| {
        line.map(|text| (idx + 1, text)).map_err(|source| CorpusError::Io {
            path: path_buf.clone(),
            source,
        })
    }))
}

/// Read the page-name file into a bidirectional id <-> name map.
pub fn read_article_map(path: &Path) -> Result<ArticleMap, CorpusError> {
    info!("Mapping articles from {}", path.display());
    let mut map = ArticleMap::new();

    for entry in lines(path)? {
        let (line_no, line) = entry?;
        if line.trim().is_empty() {
            continue;
        }
        let (id, name) = line.split_once(' ').ok_or(CorpusError::Malformed {
            path: path.to_path_buf(),
            line: line_no,
            reason: "expected \"<id> <article name>\"",
        })?;
        map.insert(id, name.trim());
    }

    info!("Mapped {} articles", map.len());
    Ok(map)
}

/// Read the category file into an insertion-ordered category -> members map.
pub fn read_category_map(path: &Path) -> Result<CategoryMap, CorpusError> {
    info!("Mapping categories from {}", path.display());
    let mut map = CategoryMap::new();

    for entry in lines(path)? {
        let (line_no, line) = entry?;
        if line.trim().is_empty() {
            continue;
        }
        let (head, tail) = line.split_once(';').ok_or(CorpusError::Malformed {
            path: path.to_path_buf(),
            line: line_no,
            reason: "expected \"Category:<name>;<members>\"",
        })?;
        // The label sits between the first and second colon of the head.
        let name = head.split(':').nth(1).filter(|s| !s.is_empty()).ok_or(
            CorpusError::Malformed {
                path: path.to_path_buf(),
                line: line_no,
                reason: "missing category label after colon",
            },
        )?;
        let members: Vec<String> = tail.split_whitespace().map(str::to_string).collect();
        map.insert(name, members);
    }

    info!("Mapped {} categories", map.len());
    Ok(map)
}

/// Read the edge-list file. Duplicate lines stay duplicated — the graph
/// keeps multigraph semantics.
pub fn read_edge_list(path: &Path) -> Result<Vec<(String, String)>, CorpusError> {
    info!("Reading edge list from {}", path.display());
    let mut edges = Vec::new();

    for entry in lines(path)? {
        let (line_no, line) = entry?;
        if line.trim().is_empty() {
            continue;
        }
        let mut parts = line.split_whitespace();
        let from = parts.next();
        let to = parts.next();
        match (from, to, parts.next()) {
            (Some(from), Some(to), None) => edges.push((from.to_string(), to.to_string())),
            _ => {
                return Err(CorpusError::Malformed {
                    path: path.to_path_buf(),
                    line: line_no,
                    reason: "expected \"<from_id> <to_id>\"",
                })
            }
        }
    }

    info!("Read {} edges", edges.len());
    Ok(edges)
}
