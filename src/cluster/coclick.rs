//! Co-click query clustering.
//!
//! # The Algorithm (Beeferman & Berger, 2000)
//!
//! Queries and clicked documents form a bipartite graph whose edge weights are
//! click counts. Agglomerative clustering runs on both sides at once:
//!
//! - two query clusters are close when most of their clicks land on the same
//!   document clusters;
//! - two document clusters are close when most of their clicks come from the
//!   same query clusters.
//!
//! Merges alternate between the sides, so each merge sharpens the evidence
//! used by the other side. The process is content-ignorant: it never looks at
//! query text or document content, only at click structure.
//!
//! ## Parameters
//!
//! - **threshold** in `[0, 1]`: pairs merge while their distance is strictly
//!   below it. `0` never merges; `1` merges every connected pair with any
//!   shared click weight.
//!
//! ## Complexity
//!
//! Only sibling pairs (sharing a neighbor) are stored, so memory follows the
//! graph's two-hop connectivity rather than `n²`. Each merge recomputes the
//! distances of the merged cluster to its siblings plus pairs among its former
//! neighbors.
//!
//! ## References
//!
//! Beeferman, D., Berger, A. (2000). "Agglomerative clustering of a search
//! engine query log." KDD 2000.

use super::engine::Engine;
use super::traits::Clustering;
use crate::config::Threshold;
use crate::error::Result;
use crate::query::{Document, Query};

/// Co-click agglomerative clusterer.
#[derive(Debug, Clone, Default)]
pub struct QueryClusterer {
    threshold: Threshold,
}

impl QueryClusterer {
    /// Create a clusterer. Fails if `threshold` is outside `[0, 1]`.
    ///
    /// # Typical Values
    ///
    /// Click logs are sparse and noisy; values around `0.001`–`0.1` keep only
    /// strongly co-clicked queries together.
    pub fn new(threshold: f64) -> Result<Self> {
        Ok(Self::from_threshold(Threshold::new(threshold)?))
    }

    /// Create a clusterer from an already validated threshold.
    pub fn from_threshold(threshold: Threshold) -> Self {
        Self { threshold }
    }

    /// Set the merge threshold.
    pub fn with_threshold(mut self, threshold: f64) -> Result<Self> {
        self.set_threshold(threshold)?;
        Ok(self)
    }

    /// Set the merge threshold in place. The old value is kept on error.
    pub fn set_threshold(&mut self, threshold: f64) -> Result<()> {
        self.threshold = Threshold::new(threshold)?;
        Ok(())
    }

    /// The merge threshold.
    pub fn threshold(&self) -> f64 {
        self.threshold.value()
    }

    /// Run the engine to convergence over `queries`.
    pub fn engine<'a>(&self, queries: &'a [Query]) -> Result<Engine<&'a Query, &'a Document>> {
        let mut engine = Engine::new(self.threshold);
        engine.initialize(queries.iter().map(|q| (q, q.documents())))?;
        engine.run()?;
        Ok(engine)
    }
}

impl Clustering for QueryClusterer {
    /// Members are sorted by query text; clusters by their first member.
    fn cluster_queries<'a>(&self, queries: &'a [Query]) -> Result<Vec<Vec<&'a Query>>> {
        let engine = self.engine(queries)?;
        let mut clusters = engine.final_clusters();
        for cluster in &mut clusters {
            cluster.sort_unstable();
        }
        clusters.sort_unstable();
        Ok(clusters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(text: &str, clicks: &[(&str, u64)]) -> Query {
        clicks
            .iter()
            .fold(Query::new(text), |q, &(d, n)| q.with_clicks(d, n).unwrap())
    }

    fn texts(clusters: &[Vec<&Query>]) -> Vec<Vec<String>> {
        clusters
            .iter()
            .map(|c| c.iter().map(|q| q.text().to_string()).collect())
            .collect()
    }

    #[test]
    fn test_shared_document_merges() {
        let queries = vec![query("q1", &[("d1", 5)]), query("q2", &[("d1", 5)])];
        let clusters = QueryClusterer::new(0.5).unwrap().cluster_queries(&queries).unwrap();
        assert_eq!(texts(&clusters), vec![vec!["q1", "q2"]]);
    }

    #[test]
    fn test_disjoint_documents_stay_apart() {
        let queries = vec![query("q1", &[("d1", 3)]), query("q2", &[("d2", 3)])];
        let clusters = QueryClusterer::new(0.999).unwrap().cluster_queries(&queries).unwrap();
        assert_eq!(texts(&clusters), vec![vec!["q1"], vec!["q2"]]);
    }

    #[test]
    fn test_empty_input() {
        let clusters = QueryClusterer::default().cluster_queries(&[]).unwrap();
        assert!(clusters.is_empty());
    }

    #[test]
    fn test_single_query_without_documents() {
        let queries = vec![Query::new("alone")];
        let clusters = QueryClusterer::default().cluster_queries(&queries).unwrap();
        assert_eq!(texts(&clusters), vec![vec!["alone"]]);
    }

    #[test]
    fn test_queries_on_one_document() {
        let queries: Vec<Query> = (0..6)
            .map(|i| query(&format!("q{i}"), &[("only", 1 + i)]))
            .collect();
        let clusters = QueryClusterer::default().cluster_queries(&queries).unwrap();
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].len(), 6);
    }

    #[test]
    fn test_only_queries() {
        let queries: Vec<Query> = (0..5).map(|i| Query::new(format!("q{i}"))).collect();
        let clusters = QueryClusterer::default().cluster_queries(&queries).unwrap();
        assert_eq!(clusters.len(), queries.len());
    }

    #[test]
    fn test_two_topics() {
        let queries = vec![
            query("rust book", &[("doc.rust-lang.org", 8), ("rust-lang.org", 2)]),
            query("learn rust", &[("doc.rust-lang.org", 7), ("rust-lang.org", 3)]),
            query("cheap flights", &[("kayak.com", 9)]),
            query("flight deals", &[("kayak.com", 6), ("skyscanner.net", 1)]),
        ];
        let clusters = QueryClusterer::new(0.2).unwrap().cluster_queries(&queries).unwrap();
        assert_eq!(
            texts(&clusters),
            vec![vec!["cheap flights", "flight deals"], vec!["learn rust", "rust book"]]
        );
    }

    #[test]
    fn test_fit_predict_labels() {
        let queries = vec![
            query("a", &[("x", 4)]),
            query("b", &[("y", 4)]),
            query("c", &[("x", 4)]),
        ];
        let labels = QueryClusterer::new(0.5).unwrap().fit_predict(&queries).unwrap();
        assert_eq!(labels.len(), 3);
        assert_eq!(labels[0], labels[2]);
        assert_ne!(labels[0], labels[1]);
    }

    #[test]
    fn test_invalid_threshold() {
        assert!(QueryClusterer::new(-0.1).is_err());
        assert!(QueryClusterer::new(1.5).is_err());
        assert!(QueryClusterer::new(f64::NAN).is_err());

        let mut c = QueryClusterer::new(0.3).unwrap();
        assert!(c.set_threshold(2.0).is_err());
        assert_eq!(c.threshold(), 0.3);
        assert!(c.clone().with_threshold(1.0).is_ok());
    }

    #[test]
    fn test_engine_is_fresh_per_call() {
        let clusterer = QueryClusterer::new(0.5).unwrap();
        let first = vec![query("q1", &[("d1", 5)]), query("q2", &[("d1", 5)])];
        let second = vec![query("q3", &[("d2", 1)])];
        assert_eq!(clusterer.cluster_queries(&first).unwrap().len(), 1);
        assert_eq!(texts(&clusterer.cluster_queries(&second).unwrap()), vec![vec!["q3"]]);
    }
}
