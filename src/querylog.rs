//! Readers that turn text logs into [`Query`] values.
//!
//! Two tab-separated formats are supported:
//!
//! - click logs (`id  query  time  rank  url`), one line per click, read by
//!   [`ClickLogReader`];
//! - weighted logs (`query  document  count` or a bare `query`), read by
//!   [`read_weighted`].

use std::collections::HashMap;
use std::io::BufRead;

use tracing::{debug, trace, warn};

use crate::error::{Error, Result};
use crate::query::{Document, Query};

/// Marker used in click logs for "same query as the previous line".
const REPEAT_QUERY: &str = "-";

const QUERY_FIELD: usize = 1;
const URL_FIELD: usize = 4;

/// Queries in first-seen order, deduplicated by text.
#[derive(Default)]
struct QueryLog {
    positions: HashMap<String, usize>,
    queries: Vec<Query>,
}

impl QueryLog {
    fn entry(&mut self, text: &str) -> &mut Query {
        let idx = match self.positions.get(text) {
            Some(&idx) => idx,
            None => {
                self.queries.push(Query::new(text));
                self.positions.insert(text.to_string(), self.queries.len() - 1);
                self.queries.len() - 1
            }
        };
        &mut self.queries[idx]
    }

    fn into_queries(self) -> Vec<Query> {
        self.queries
    }
}

/// Reader for search-engine click logs.
///
/// Each line is `id \t query \t time \t rank \t url`. Lines starting with `#`
/// are comments. A query of `-` repeats the previous line's query. Lines with
/// no url are searches without a click: they still set the previous query but
/// add nothing. Queries and urls are trimmed and lower-cased.
#[derive(Debug, Clone, Default)]
pub struct ClickLogReader {
    line_limit: Option<usize>,
}

impl ClickLogReader {
    /// Reader without a line limit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stop after `limit` lines (comments included).
    pub fn with_line_limit(mut self, limit: usize) -> Self {
        self.line_limit = Some(limit);
        self
    }

    /// The configured line limit.
    pub fn line_limit(&self) -> Option<usize> {
        self.line_limit
    }

    /// Read every click from `input`, aggregating counts per (query, url).
    pub fn read<R: BufRead>(&self, input: R) -> Result<Vec<Query>> {
        let limit = self.line_limit.unwrap_or(usize::MAX);
        let mut log = QueryLog::default();
        let mut last_query = String::new();
        let mut clicks = 0usize;
        let mut malformed = 0usize;

        for (idx, line) in input.lines().take(limit).enumerate() {
            let line = line?;
            if line.starts_with('#') || line.trim().is_empty() {
                continue;
            }

            let fields: Vec<&str> = line.split('\t').collect();
            let Some(raw) = fields.get(QUERY_FIELD).map(|q| q.trim()) else {
                trace!(line = idx + 1, "skipping line without query field");
                malformed += 1;
                continue;
            };
            if raw != REPEAT_QUERY {
                last_query = raw.to_lowercase();
            }

            let Some(url) = fields.get(URL_FIELD).map(|u| u.trim().to_lowercase()) else {
                continue;
            };
            if last_query.is_empty() || url.is_empty() {
                continue;
            }

            log.entry(&last_query).add_click(Document::new(url))?;
            clicks += 1;
        }

        if malformed > 0 {
            warn!(malformed, "skipped click log lines without a query field");
        }
        let queries = log.into_queries();
        debug!(queries = queries.len(), clicks, malformed, "read click log");
        Ok(queries)
    }
}

/// Read a weighted log: `query \t document \t count`, or just `query`.
///
/// Counts for a repeated (query, document) pair are added together. Blank
/// lines are ignored.
pub fn read_weighted<R: BufRead>(input: R) -> Result<Vec<Query>> {
    let mut log = QueryLog::default();

    for (idx, line) in input.lines().enumerate() {
        let line = line?;
        let fields: Vec<&str> = line.split('\t').collect();
        let text = fields[0].trim();
        if text.is_empty() {
            continue;
        }

        let query = log.entry(text);
        if fields.len() < 3 {
            continue;
        }

        let raw_count = fields[2].trim();
        let count: u64 = raw_count.parse().map_err(|e| Error::Parse {
            line: idx + 1,
            message: format!("invalid link count {raw_count:?}: {e}"),
        })?;
        query.add_clicks(Document::new(fields[1].trim()), count)?;
    }

    Ok(log.into_queries())
}
