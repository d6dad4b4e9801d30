//! Input data model: queries and the documents clicked from them.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::error::{Error, Result};

/// A clicked document, usually a URL.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Document(String);

impl Document {
    /// Wrap a document name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The document name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Document {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Document {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// A search query with aggregated click counts per document.
///
/// Equality, hashing and ordering only look at the query text.
#[derive(Clone, Debug)]
pub struct Query {
    text: String,
    clicks: HashMap<Document, u64>,
}

impl Query {
    /// A query with no clicks.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            clicks: HashMap::new(),
        }
    }

    /// Builder form of [`Query::add_clicks`].
    pub fn with_clicks(mut self, document: impl Into<Document>, count: u64) -> Result<Self> {
        self.add_clicks(document.into(), count)?;
        Ok(self)
    }

    /// The query text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Record one click on `document`.
    pub fn add_click(&mut self, document: Document) -> Result<()> {
        self.add_clicks(document, 1)
    }

    /// Add `count` clicks on `document` to any already recorded.
    pub fn add_clicks(&mut self, document: Document, count: u64) -> Result<()> {
        let slot = self.clicks.entry(document).or_insert(0);
        *slot = slot.checked_add(count).ok_or(Error::WeightOverflow {
            context: "aggregating click counts",
        })?;
        Ok(())
    }

    /// Clicks recorded for `document`.
    pub fn clicks(&self, document: &Document) -> u64 {
        self.clicks.get(document).copied().unwrap_or(0)
    }

    /// Clicked documents with their counts, in arbitrary order.
    pub fn documents(&self) -> impl Iterator<Item = (&Document, u64)> + '_ {
        self.clicks.iter().map(|(d, &c)| (d, c))
    }

    /// Number of distinct clicked documents.
    pub fn num_documents(&self) -> usize {
        self.clicks.len()
    }
}

impl PartialEq for Query {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text
    }
}

impl Eq for Query {}

impl Hash for Query {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.text.hash(state);
    }
}

impl PartialOrd for Query {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Query {
    fn cmp(&self, other: &Self) -> Ordering {
        self.text.cmp(&other.text)
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
