use rkyv::{Archive, Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use topcats_core::error::{ErrorCode, TopcatsError};
use topcats_core::model::{ArticleMap, CategoryMap, NodeRecord};

#[derive(Error, Debug)]
pub enum GraphError {
    #[error("unknown node reference: {id}")]
    MissingReference { id: String },
    #[error("unknown article: {name}")]
    UnknownArticle { name: String },
    #[error("unknown category: {name}")]
    UnknownCategory { name: String },
}

impl TopcatsError for GraphError {
    fn error_code(&self) -> ErrorCode {
        match self {
            GraphError::MissingReference { .. } => ErrorCode::MissingReference,
            GraphError::UnknownArticle { .. } | GraphError::UnknownCategory { .. } => {
                ErrorCode::NotFound
            }
        }
    }
}

/// Directed multigraph of articles.
///
/// Nodes are stored in first-appearance order from the edge list, which
/// fixes the iteration order every degree sort ties against. Duplicate
/// edges in the source stay duplicated. Once built (or loaded from a
/// snapshot) the graph is never mutated again.
#[derive(Archive, Deserialize, Serialize, Debug, Default, Clone)]
#[archive(check_bytes)]
pub struct ArticleGraph {
    nodes: Vec<NodeRecord>,
    index: HashMap<String, u32>,
    out: Vec<Vec<u32>>,
    ins: Vec<Vec<u32>>,
}

impl ArticleGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the structure from an edge list, then attach article names
    /// (fatal if an endpoint has no page-name entry) and category
    /// memberships (nodes in no category keep an empty list).
    pub fn from_edges(
        edges: &[(String, String)],
        articles: &ArticleMap,
        categories: &CategoryMap,
    ) -> Result<Self, GraphError> {
        let mut graph = Self::new();
        for (from, to) in edges {
            graph.add_edge(from, to);
        }
        graph.attach_article_names(articles)?;
        graph.attach_categories(categories);
        Ok(graph)
    }

    fn intern(&mut self, id: &str) -> u32 {
        if let Some(&idx) = self.index.get(id) {
            return idx;
        }
        let idx = self.nodes.len() as u32;
        self.nodes.push(NodeRecord::new(id));
        self.out.push(Vec::new());
        self.ins.push(Vec::new());
        self.index.insert(id.to_string(), idx);
        idx
    }

    pub fn add_edge(&mut self, from: &str, to: &str) {
        let from = self.intern(from);
        let to = self.intern(to);
        self.out[from as usize].push(to);
        self.ins[to as usize].push(from);
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.out.iter().map(Vec::len).sum()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn node(&self, id: &str) -> Option<&NodeRecord> {
        self.index.get(id).map(|&idx| &self.nodes[idx as usize])
    }

    /// Nodes in first-appearance order.
    pub fn nodes(&self) -> impl Iterator<Item = &NodeRecord> {
        self.nodes.iter()
    }

    /// Total degree (in + out) per node, in iteration order.
    pub fn degrees(&self) -> impl Iterator<Item = (&NodeRecord, usize)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(idx, node)| (node, self.out[idx].len() + self.ins[idx].len()))
    }

    pub fn degree(&self, id: &str) -> Option<usize> {
        self.index
            .get(id)
            .map(|&idx| self.out[idx as usize].len() + self.ins[idx as usize].len())
    }

    /// Successors of a node, duplicates included (multigraph semantics).
    pub fn out_neighbors<'a>(
        &'a self,
        id: &str,
    ) -> Option<impl Iterator<Item = &'a NodeRecord> + 'a> {
        self.index.get(id).map(|&idx| {
            self.out[idx as usize]
                .iter()
                .map(move |&target| &self.nodes[target as usize])
        })
    }

    fn attach_article_names(&mut self, articles: &ArticleMap) -> Result<(), GraphError> {
        for node in &mut self.nodes {
            let name = articles
                .name_of(&node.id)
                .ok_or_else(|| GraphError::MissingReference {
                    id: node.id.clone(),
                })?;
            node.article_name = name.to_string();
        }
        Ok(())
    }

    fn attach_categories(&mut self, categories: &CategoryMap) {
        let mut by_node = categories.invert();
        for node in &mut self.nodes {
            if let Some(memberships) = by_node.remove(&node.id) {
                node.categories = memberships;
            }
        }
        // Category members that never appear in the edge list have no
        // node to annotate and are ignored here; resolving their names
        // is still enforced wherever they are actually used.
    }
}
