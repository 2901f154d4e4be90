//! Read-only structural metrics over a built graph and its category map.

use crate::graph::ArticleGraph;
use std::collections::BTreeSet;
use thiserror::Error;
use topcats_core::error::{ErrorCode, TopcatsError};
use topcats_core::model::CategoryMap;

// TODO: the requested category is ignored by network_report; overlap is
// always computed for this label. Pending a product decision on whether
// the argument should be honored.
pub const OVERLAP_CATEGORY: &str = "Living_people";

#[derive(Error, Debug)]
pub enum MetricsError {
    #[error("metrics requested on an empty graph")]
    EmptyGraph,
    #[error("unknown category: {name}")]
    UnknownCategory { name: String },
}

impl TopcatsError for MetricsError {
    fn error_code(&self) -> ErrorCode {
        match self {
            MetricsError::EmptyGraph => ErrorCode::EmptyGraph,
            MetricsError::UnknownCategory { .. } => ErrorCode::NotFound,
        }
    }
}

/// Every node with its total degree, highest first. The sort is stable,
/// so ties keep the graph's iteration order.
pub fn article_hubs(graph: &ArticleGraph) -> Vec<(String, usize)> {
    let mut degrees: Vec<(String, usize)> = graph
        .degrees()
        .map(|(node, degree)| (node.id.clone(), degree))
        .collect();
    degrees.sort_by(|a, b| b.1.cmp(&a.1));
    degrees
}

/// Same computation as [`article_hubs`], ascending.
pub fn smallest_degree(graph: &ArticleGraph) -> Vec<(String, usize)> {
    let mut degrees: Vec<(String, usize)> = graph
        .degrees()
        .map(|(node, degree)| (node.id.clone(), degree))
        .collect();
    degrees.sort_by(|a, b| a.1.cmp(&b.1));
    degrees
}

/// Categories ranked by member count, largest first, stable on ties.
pub fn category_hubs(categories: &CategoryMap) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = categories
        .iter()
        .map(|entry| (entry.name.clone(), entry.members.len()))
        .collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

/// Every category label that contains one of `category`'s member ids as
/// a substring of the label text. This is a byte-level test on the
/// label, not a shared-member relation; with numeric ids and English
/// labels it rarely matches anything.
pub fn category_overlap(
    categories: &CategoryMap,
    category: &str,
) -> Result<BTreeSet<String>, MetricsError> {
    let members = categories
        .members(category)
        .ok_or_else(|| MetricsError::UnknownCategory {
            name: category.to_string(),
        })?;

    let mut overlap = BTreeSet::new();
    for member in members {
        for name in categories.names() {
            if name.contains(member.as_str()) {
                overlap.insert(name.to_string());
            }
        }
    }
    Ok(overlap)
}

/// Sum of total degrees divided by node count. An empty graph is a
/// caller error, reported instead of dividing by zero.
pub fn average_degree(graph: &ArticleGraph) -> Result<f64, MetricsError> {
    if graph.node_count() == 0 {
        return Err(MetricsError::EmptyGraph);
    }
    let degree_sum: usize = graph.degrees().map(|(_, degree)| degree).sum();
    Ok(degree_sum as f64 / graph.node_count() as f64)
}

#[derive(Debug, Clone, PartialEq)]
pub struct NetworkReport {
    pub overlap: Option<BTreeSet<String>>,
    pub average_degree: f64,
    /// Top five nodes by total degree.
    pub article_hubs: Vec<(String, usize)>,
    /// Every node, ascending by degree; handy for picking small
    /// subgraphs to visualize.
    pub smallest_degree: Vec<(String, usize)>,
    /// Top three categories by member count.
    pub category_hubs: Vec<(String, usize)>,
}

/// Aggregate report over the whole network. When `category` is given,
/// the overlap set is included — computed for [`OVERLAP_CATEGORY`]
/// whatever the argument says.
pub fn network_report(
    graph: &ArticleGraph,
    categories: &CategoryMap,
    category: Option<&str>,
) -> Result<NetworkReport, MetricsError> {
    let average_degree = average_degree(graph)?;

    let mut hubs = article_hubs(graph);
    hubs.truncate(5);

    let smallest = smallest_degree(graph);

    let mut cat_hubs = category_hubs(categories);
    cat_hubs.truncate(3);

    let overlap = match category {
        Some(_) => Some(category_overlap(categories, OVERLAP_CATEGORY)?),
        None => None,
    };

    Ok(NetworkReport {
        overlap,
        average_degree,
        article_hubs: hubs,
        smallest_degree: smallest,
        category_hubs: cat_hubs,
    })
}
