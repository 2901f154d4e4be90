use rkyv::{Archive, Deserialize, Serialize};
use std::collections::HashMap;

/// A fully attributed article vertex as stored in the graph snapshot.
///
/// Ids come from the source data as strings. They look numeric but are
/// opaque map keys and are never parsed.
#[derive(Archive, Deserialize, Serialize, Debug, PartialEq, Clone)]
#[archive(check_bytes)]
pub struct NodeRecord {
    pub id: String,
    pub article_name: String,
    /// Category memberships in category-file order, without duplicates.
    pub categories: Vec<String>,
}

impl NodeRecord {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            article_name: String::new(),
            categories: Vec::new(),
        }
    }
}

/// Bidirectional id <-> article-name mapping from the page-name file.
#[derive(Debug, Default, Clone)]
pub struct ArticleMap {
    id_to_name: HashMap<String, String>,
    name_to_id: HashMap<String, String>,
}

impl ArticleMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: impl Into<String>, name: impl Into<String>) {
        let id = id.into();
        let name = name.into();
        self.name_to_id.insert(name.clone(), id.clone());
        self.id_to_name.insert(id, name);
    }

    pub fn name_of(&self, id: &str) -> Option<&str> {
        self.id_to_name.get(id).map(String::as_str)
    }

    pub fn id_of(&self, name: &str) -> Option<&str> {
        self.name_to_id.get(name).map(String::as_str)
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.id_to_name.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.id_to_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.id_to_name.is_empty()
    }
}

/// One category with its member article ids, in file order.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryRecord {
    pub name: String,
    pub members: Vec<String>,
}

/// Insertion-ordered category -> members mapping.
///
/// Iteration order is the category-file order, which makes every
/// sort over categories stable and reproducible across runs.
#[derive(Debug, Default, Clone)]
pub struct CategoryMap {
    entries: Vec<CategoryRecord>,
    index: HashMap<String, usize>,
}

impl CategoryMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a category. A repeated name replaces the members of the
    /// earlier entry but keeps its original position.
    pub fn insert(&mut self, name: impl Into<String>, members: Vec<String>) {
        let name = name.into();
        match self.index.get(&name) {
            Some(&pos) => self.entries[pos].members = members,
            None => {
                self.index.insert(name.clone(), self.entries.len());
                self.entries.push(CategoryRecord { name, members });
            }
        }
    }

    pub fn members(&self, name: &str) -> Option<&[String]> {
        self.index
            .get(name)
            .map(|&pos| self.entries[pos].members.as_slice())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CategoryRecord> {
        self.entries.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Invert to node-id -> categories, preserving file order and
    /// dropping duplicate memberships.
    pub fn invert(&self) -> HashMap<String, Vec<String>> {
        let mut by_node: HashMap<String, Vec<String>> = HashMap::new();
        for entry in &self.entries {
            for member in &entry.members {
                let categories = by_node.entry(member.clone()).or_default();
                if !categories.contains(&entry.name) {
                    categories.push(entry.name.clone());
                }
            }
        }
        by_node
    }
}
