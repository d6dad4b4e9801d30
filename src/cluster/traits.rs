use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::query::Query;

/// Common interface for hard query clustering (every query in exactly one cluster).
pub trait Clustering {
    /// Partition the distinct input queries into disjoint, non-empty clusters.
    fn cluster_queries<'a>(&self, queries: &'a [Query]) -> Result<Vec<Vec<&'a Query>>>;

    /// Return one cluster label per input query.
    ///
    /// Labels index into the output of [`Clustering::cluster_queries`]; repeated
    /// queries get the same label.
    fn fit_predict(&self, queries: &[Query]) -> Result<Vec<usize>> {
        let clusters = self.cluster_queries(queries)?;
        let labels: HashMap<&str, usize> = clusters
            .iter()
            .enumerate()
            .flat_map(|(label, members)| members.iter().map(move |q| (q.text(), label)))
            .collect();
        queries
            .iter()
            .map(|q| {
                labels
                    .get(q.text())
                    .copied()
                    .ok_or_else(|| Error::Other(format!("query {:?} left unclustered", q.text())))
            })
            .collect()
    }
}
