//! Ego-network extraction for visualization.
//!
//! An ego network is a center plus its immediate spokes, flattened to
//! the labels a renderer needs. Lookups here are the recoverable kind:
//! an unknown article or category name comes back as a typed error the
//! caller may report and move past, while a member id with no page-name
//! entry is still a fatal missing reference.

use crate::graph::{ArticleGraph, GraphError};
use std::collections::HashSet;
use topcats_core::model::{ArticleMap, CategoryMap};

#[derive(Debug, Clone, PartialEq)]
pub struct EgoNetwork {
    pub center: String,
    pub neighbors: Vec<String>,
    pub annotation: String,
}

/// The article's out-neighbors, labeled by article name and annotated
/// with the center's category memberships.
pub fn article_ego(
    graph: &ArticleGraph,
    articles: &ArticleMap,
    article_name: &str,
) -> Result<EgoNetwork, GraphError> {
    let unknown = || GraphError::UnknownArticle {
        name: article_name.to_string(),
    };

    let id = articles.id_of(article_name).ok_or_else(unknown)?;
    let center = graph.node(id).ok_or_else(unknown)?;

    let mut seen = HashSet::new();
    let mut neighbors = Vec::new();
    for neighbor in graph.out_neighbors(id).ok_or_else(unknown)? {
        if seen.insert(neighbor.id.as_str()) {
            neighbors.push(neighbor.article_name.clone());
        }
    }

    Ok(EgoNetwork {
        center: center.article_name.clone(),
        neighbors,
        annotation: center.categories.join(", "),
    })
}

/// The category as center with its member articles as spokes.
pub fn category_ego(
    categories: &CategoryMap,
    articles: &ArticleMap,
    category_name: &str,
) -> Result<EgoNetwork, GraphError> {
    let members = categories
        .members(category_name)
        .ok_or_else(|| GraphError::UnknownCategory {
            name: category_name.to_string(),
        })?;

    let neighbors = members
        .iter()
        .map(|id| {
            articles
                .name_of(id)
                .map(str::to_string)
                .ok_or_else(|| GraphError::MissingReference { id: id.clone() })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(EgoNetwork {
        center: category_name.to_string(),
        neighbors,
        annotation: category_name.to_string(),
    })
}
