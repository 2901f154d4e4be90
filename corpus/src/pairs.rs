//! Training-pair derivation for the similarity models.
//!
//! The models themselves are trained by an external collaborator; this
//! module only produces the graph-derived pairs it consumes: article
//! name pairs from the edge list, and (category, joined member names)
//! documents from the category map. The held-out remainder of a split is
//! persisted so later runs can reuse it.

use crate::loader::CorpusError;
use rand::seq::SliceRandom;
use rand::thread_rng;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use topcats_core::model::{ArticleMap, CategoryMap};
use tracing::info;

/// A (left, right) sentence pair fed to the training collaborator.
pub type TrainingPair = (String, String);

/// How much of the shuffled pair list goes into the training half.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SplitSize {
    Count(usize),
    Fraction(f64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SplitPairs {
    pub training: Vec<TrainingPair>,
    pub held_out: Vec<TrainingPair>,
}

/// Resolve every edge to an (article name, article name) pair. An
/// endpoint with no page-name entry is a fatal missing reference.
pub fn article_pairs(
    edges: &[(String, String)],
    articles: &ArticleMap,
) -> Result<Vec<TrainingPair>, CorpusError> {
    let name_of = |id: &String| {
        articles
            .name_of(id)
            .map(str::to_string)
            .ok_or_else(|| CorpusError::MissingReference { id: id.clone() })
    };

    edges
        .iter()
        .map(|(from, to)| Ok((name_of(from)?, name_of(to)?)))
        .collect()
}

/// One (category name, comma-joined member names) document per category.
pub fn category_documents(
    categories: &CategoryMap,
    articles: &ArticleMap,
) -> Result<Vec<TrainingPair>, CorpusError> {
    categories
        .iter()
        .map(|entry| {
            let names = entry
                .members
                .iter()
                .map(|id| {
                    articles
                        .name_of(id)
                        .ok_or_else(|| CorpusError::MissingReference { id: id.clone() })
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok((entry.name.clone(), names.join(",")))
        })
        .collect()
}

/// Shuffle once, then split off the training share; the rest is held out.
pub fn shuffle_and_split(mut pairs: Vec<TrainingPair>, size: SplitSize) -> SplitPairs {
    pairs.shuffle(&mut thread_rng());

    let take = match size {
        SplitSize::Count(n) => n.min(pairs.len()),
        SplitSize::Fraction(f) => ((pairs.len() as f64) * f.clamp(0.0, 1.0)) as usize,
    };

    let held_out = pairs.split_off(take);
    info!(
        "Split {} training pairs, {} held out",
        pairs.len(),
        held_out.len()
    );
    SplitPairs {
        training: pairs,
        held_out,
    }
}

/// Persist held-out pairs, one tab-separated pair per line.
pub fn write_held_out(path: &Path, pairs: &[TrainingPair]) -> Result<(), CorpusError> {
    let io_err = |source| CorpusError::Io {
        path: path.to_path_buf(),
        source,
    };

    let mut out = BufWriter::new(File::create(path).map_err(io_err)?);
    for (left, right) in pairs {
        writeln!(out, "{}\t{}", left, right).map_err(io_err)?;
    }
    out.flush().map_err(io_err)
}
