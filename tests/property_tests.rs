use std::collections::{BTreeMap, HashSet};

use coclump::cluster::{
    distance, siblings, BipartiteGraph, Clustering, DistanceIndex, Engine, Partition,
    QueryClusterer,
};
use coclump::{Query, Threshold};
use proptest::prelude::*;
use proptest::test_runner::TestCaseError;

/// (query index, document index, clicks)
fn click_triples() -> impl Strategy<Value = Vec<(u8, u8, u64)>> {
    prop::collection::vec((0u8..12, 0u8..10, 0u64..20), 0..40)
}

fn build_queries(triples: &[(u8, u8, u64)]) -> Vec<Query> {
    let mut by_text: BTreeMap<String, Query> = BTreeMap::new();
    for &(q, d, n) in triples {
        let text = format!("q{q}");
        let query = by_text.entry(text.clone()).or_insert_with(|| Query::new(text));
        query.add_clicks(format!("d{d}").into(), n).unwrap();
    }
    by_text.into_values().collect()
}

/// `index` holds exactly the sibling pairs of `own`, each with a fresh distance.
fn assert_index_fresh<A, B>(
    own: &Partition<A>,
    other: &Partition<B>,
    index: &DistanceIndex,
) -> Result<(), TestCaseError> {
    let mut pairs = 0;
    for id in own.ids() {
        for s in siblings(own, other, id).unwrap() {
            if s > id {
                pairs += 1;
                let fresh = distance(own.cluster(id).unwrap(), own.cluster(s).unwrap()).unwrap();
                let stored = index.distance(id, s);
                prop_assert!(stored.is_some(), "missing pair {}-{}", id, s);
                prop_assert!((stored.unwrap() - fresh).abs() < 1e-12);
            }
        }
    }
    prop_assert_eq!(pairs, index.len());
    Ok(())
}

proptest! {
    #[test]
    fn prop_distance_symmetric_and_bounded(
        left in prop::collection::vec((0usize..6, 0u64..50), 0..6),
        right in prop::collection::vec((0usize..6, 0u64..50), 0..6),
    ) {
        let mut g: BipartiteGraph<&str, usize> = BipartiteGraph::new();
        let a = g.add_query("a");
        let b = g.add_query("b");
        let docs: Vec<_> = (0..6).map(|i| g.add_document(i)).collect();
        for &(d, w) in &left {
            g.link(a, docs[d], w).unwrap();
        }
        for &(d, w) in &right {
            g.link(b, docs[d], w).unwrap();
        }

        let ca = g.queries().cluster(a).unwrap();
        let cb = g.queries().cluster(b).unwrap();
        let ab = distance(ca, cb).unwrap();
        let ba = distance(cb, ca).unwrap();
        prop_assert_eq!(ab, ba);
        prop_assert!((0.0..=1.0).contains(&ab));
        if ca.total_weight() + cb.total_weight() == 0 {
            prop_assert_eq!(ab, 1.0);
        }
        if g.query_siblings(a).unwrap().is_empty() {
            prop_assert_eq!(ab, 1.0);
        }
    }

    #[test]
    fn prop_output_is_a_partition(triples in click_triples(), threshold in 0.0f64..=1.0) {
        let queries = build_queries(&triples);
        let clusters = QueryClusterer::new(threshold).unwrap().cluster_queries(&queries).unwrap();

        let mut seen = HashSet::new();
        for cluster in &clusters {
            prop_assert!(!cluster.is_empty());
            for q in cluster {
                prop_assert!(seen.insert(q.text().to_string()), "{} in two clusters", q.text());
            }
        }
        let expected: HashSet<String> = queries.iter().map(|q| q.text().to_string()).collect();
        prop_assert_eq!(seen, expected);
    }

    #[test]
    fn prop_converged_engine_is_consistent(triples in click_triples(), threshold in 0.0f64..=1.0) {
        let queries = build_queries(&triples);
        let clicks: u64 = queries.iter().flat_map(|q| q.documents().map(|(_, n)| n)).sum();

        let mut engine = Engine::new(Threshold::new(threshold).unwrap());
        engine.initialize(queries.iter().map(|q| (q, q.documents()))).unwrap();
        engine.run().unwrap();

        let graph = engine.graph();
        prop_assert_eq!(graph.queries().total_weight().unwrap(), clicks);
        prop_assert_eq!(graph.documents().total_weight().unwrap(), clicks);

        // Links are mirrored on both sides.
        for (qid, q) in graph.queries().iter() {
            for (&did, &w) in q.links() {
                prop_assert_eq!(graph.documents().cluster(did).unwrap().weight_to(qid), w);
            }
        }

        // Each index holds exactly the sibling pairs, with fresh distances.
        assert_index_fresh(graph.queries(), graph.documents(), engine.query_distances())?;
        assert_index_fresh(graph.documents(), graph.queries(), engine.document_distances())?;

        // Converged: nothing left below the threshold on either side.
        if let Some((_, d)) = engine.query_distances().min_pair() {
            prop_assert!(d >= threshold);
        }
        if let Some((_, d)) = engine.document_distances().min_pair() {
            prop_assert!(d >= threshold);
        }
    }

    #[test]
    fn prop_rerun_is_idempotent(triples in click_triples(), threshold in 0.0f64..=1.0) {
        let queries = build_queries(&triples);
        let mut engine = Engine::new(Threshold::new(threshold).unwrap());
        engine.initialize(queries.iter().map(|q| (q, q.documents()))).unwrap();
        engine.run().unwrap();

        let before = engine.final_clusters().len();
        prop_assert_eq!(engine.run().unwrap(), 0);
        prop_assert_eq!(engine.final_clusters().len(), before);
    }

    #[test]
    fn prop_zero_threshold_never_merges(triples in click_triples()) {
        let queries = build_queries(&triples);
        let clusters = QueryClusterer::new(0.0).unwrap().cluster_queries(&queries).unwrap();
        prop_assert_eq!(clusters.len(), queries.len());
    }
}
