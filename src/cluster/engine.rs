//! Agglomerative merge loop over the bipartite graph.
//!
//! # Algorithm
//!
//! 1. Build one singleton cluster per distinct query and document, linked by
//!    click counts.
//! 2. For each partition, compute the distance of every sibling pair (clusters
//!    sharing at least one neighbor). Non-sibling pairs are never stored; their
//!    distance is `1` by definition.
//! 3. Alternate between the query side and the document side. On each side,
//!    take the closest pair; if it is below the threshold, merge it.
//! 4. Stop after a full pass (one attempt per side) that merges nothing.
//!
//! Merging on one side changes the neighborhoods seen by the other side, which
//! is why the sides alternate: documents clicked from the same query cluster
//! become closer, which in turn pulls more queries together.
//!
//! # Incremental repair
//!
//! After `c1, c2 -> new` in partition P:
//!
//! - every P-distance touching `c1` or `c2` is dropped, and `new` is compared
//!   against its siblings;
//! - in the opposite partition, with `A = N(c1) \ N(c2)`, `B = N(c2) \ N(c1)`
//!   and `S = N(c1) ∩ N(c2)`, only pairs within `A ∪ B` and pairs
//!   `(A ∪ B) × S` are recomputed. Pairs inside `S` keep their distance: both
//!   members already shared `c1` and `c2`, and the merged link carries the
//!   same combined weight.

use std::collections::HashMap;
use std::hash::Hash;

use tracing::{debug, info, trace};

use super::graph::{apply_merge, siblings, BipartiteGraph, Cluster, ClusterId, Partition};
use super::index::DistanceIndex;
use super::metric;
use super::pair::UnorderedPair;
use crate::config::Threshold;
use crate::error::Result;

/// Lifecycle of an [`Engine`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngineState {
    /// Nothing loaded.
    Idle,
    /// Graph and indices built, no merge yet.
    Initialized,
    /// At least one merge performed, not yet converged.
    Merging,
    /// A full pass merged nothing.
    Converged,
}

/// One side of the bipartite graph.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    /// Query clusters.
    Queries,
    /// Document clusters.
    Documents,
}

/// Clustering state for one run: the graph plus one distance index per side.
#[derive(Clone, Debug)]
pub struct Engine<Q, D> {
    threshold: Threshold,
    graph: BipartiteGraph<Q, D>,
    query_distances: DistanceIndex,
    document_distances: DistanceIndex,
    state: EngineState,
    merges: usize,
}

impl<Q, D> Engine<Q, D>
where
    Q: Eq + Hash + Clone,
    D: Eq + Hash + Clone,
{
    /// Create an idle engine.
    pub fn new(threshold: Threshold) -> Self {
        Self {
            threshold,
            graph: BipartiteGraph::new(),
            query_distances: DistanceIndex::new(),
            document_distances: DistanceIndex::new(),
            state: EngineState::Idle,
            merges: 0,
        }
    }

    /// Current threshold.
    pub fn threshold(&self) -> Threshold {
        self.threshold
    }

    /// Change the threshold. A converged engine becomes runnable again.
    pub fn set_threshold(&mut self, threshold: Threshold) {
        self.threshold = threshold;
        if self.state == EngineState::Converged {
            self.state = EngineState::Merging;
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> EngineState {
        self.state
    }

    /// The graph in its current shape.
    pub fn graph(&self) -> &BipartiteGraph<Q, D> {
        &self.graph
    }

    /// Distances between query clusters.
    pub fn query_distances(&self) -> &DistanceIndex {
        &self.query_distances
    }

    /// Distances between document clusters.
    pub fn document_distances(&self) -> &DistanceIndex {
        &self.document_distances
    }

    /// Merges performed since the last [`Engine::initialize`].
    pub fn merge_count(&self) -> usize {
        self.merges
    }

    /// Load `queries` into a fresh graph and build both distance indices.
    ///
    /// Each item is a query with its `(document, count)` pairs. Repeated
    /// queries or documents reuse their singleton; a repeated
    /// `(query, document)` pair replaces the earlier count, so counts must be
    /// aggregated beforehand.
    pub fn initialize<I, L>(&mut self, queries: I) -> Result<()>
    where
        I: IntoIterator<Item = (Q, L)>,
        L: IntoIterator<Item = (D, u64)>,
    {
        self.reset();

        let graph = &mut self.graph;
        let mut query_ids: HashMap<Q, ClusterId> = HashMap::new();
        let mut document_ids: HashMap<D, ClusterId> = HashMap::new();
        for (query, documents) in queries {
            let q = *query_ids
                .entry(query)
                .or_insert_with_key(|query| graph.add_query(query.clone()));
            for (document, count) in documents {
                let d = *document_ids
                    .entry(document)
                    .or_insert_with_key(|document| graph.add_document(document.clone()));
                graph.link(q, d, count)?;
            }
        }

        self.query_distances = build_index(self.graph.queries(), self.graph.documents())?;
        self.document_distances = build_index(self.graph.documents(), self.graph.queries())?;
        self.state = EngineState::Initialized;

        info!(
            queries = self.graph.queries().len(),
            documents = self.graph.documents().len(),
            query_pairs = self.query_distances.len(),
            document_pairs = self.document_distances.len(),
            "built co-click graph"
        );
        Ok(())
    }

    /// Try one merge on `side`. Returns whether a merge happened.
    pub fn step(&mut self, side: Side) -> Result<bool> {
        let threshold = self.threshold.value();
        let (queries, documents) = self.graph.parts_mut();
        let merged = match side {
            Side::Queries => merge_closest(
                threshold,
                queries,
                documents,
                &mut self.query_distances,
                &mut self.document_distances,
            )?,
            Side::Documents => merge_closest(
                threshold,
                documents,
                queries,
                &mut self.document_distances,
                &mut self.query_distances,
            )?,
        };

        let Some(merged) = merged else {
            return Ok(false);
        };
        self.merges += 1;
        self.state = EngineState::Merging;
        debug!(
            ?side,
            first = %merged.first,
            second = %merged.second,
            into = %merged.id,
            distance = merged.distance,
            "merged clusters"
        );
        Ok(true)
    }

    /// Alternate merges between the two sides until a full pass merges nothing.
    ///
    /// Returns the number of merges performed by this call; `0` on an engine
    /// that has already converged.
    pub fn run(&mut self) -> Result<usize> {
        let mut merged = 0;
        loop {
            let mut progressed = false;
            for side in [Side::Queries, Side::Documents] {
                if self.step(side)? {
                    merged += 1;
                    progressed = true;
                }
            }
            if !progressed {
                break;
            }
        }
        self.state = EngineState::Converged;

        info!(
            merges = merged,
            query_clusters = self.graph.queries().len(),
            document_clusters = self.graph.documents().len(),
            "clustering converged"
        );
        Ok(merged)
    }

    /// Element sets of the surviving query clusters, in cluster-id order.
    pub fn final_clusters(&self) -> Vec<Vec<Q>> {
        project(self.graph.queries())
    }

    /// Element sets of the surviving document clusters, in cluster-id order.
    pub fn document_clusters(&self) -> Vec<Vec<D>> {
        project(self.graph.documents())
    }

    fn reset(&mut self) {
        self.graph = BipartiteGraph::new();
        self.query_distances = DistanceIndex::new();
        self.document_distances = DistanceIndex::new();
        self.state = EngineState::Idle;
        self.merges = 0;
    }
}

/// What a single merge did.
struct Merged {
    first: ClusterId,
    second: ClusterId,
    id: ClusterId,
    distance: f64,
}

fn project<E: Clone>(partition: &Partition<E>) -> Vec<Vec<E>> {
    partition
        .ids()
        .into_iter()
        .filter_map(|id| partition.get(id))
        .map(|c| c.elements().iter().cloned().collect())
        .collect()
}

/// Distances of all sibling pairs of `own`, each unordered pair computed once.
fn build_index<A, B>(own: &Partition<A>, other: &Partition<B>) -> Result<DistanceIndex> {
    let mut index = DistanceIndex::new();
    for id in own.ids() {
        let cluster = own.cluster(id)?;
        // Lower ids were already paired with every sibling when visited.
        for sibling in siblings(own, other, id)?.range(id..) {
            let d = metric::distance(cluster, own.cluster(*sibling)?)?;
            index.insert(UnorderedPair::new(id, *sibling), d)?;
        }
    }
    Ok(index)
}

fn merge_closest<A, B>(
    threshold: f64,
    own: &mut Partition<A>,
    other: &mut Partition<B>,
    own_index: &mut DistanceIndex,
    other_index: &mut DistanceIndex,
) -> Result<Option<Merged>>
where
    A: Eq + Hash + Clone,
{
    let Some((pair, distance)) = own_index.min_pair() else {
        return Ok(None);
    };
    if distance >= threshold {
        return Ok(None);
    }

    let (first, second) = pair.members();
    let (a, b) = (own.cluster(first)?, own.cluster(second)?);
    let merged = Cluster::merge(a, b)?;
    let groups = NeighborGroups::of(a, b);

    let id = apply_merge(own, other, first, second, merged)?;

    own_index.remove_touching(first);
    own_index.remove_touching(second);
    let new = own.cluster(id)?;
    for sibling in siblings(own, other, id)? {
        let d = metric::distance(new, own.cluster(sibling)?)?;
        own_index.insert(UnorderedPair::new(id, sibling), d)?;
    }

    let refreshed = groups.refresh(other, other_index)?;
    trace!(refreshed, "updated neighbor distances");

    Ok(Some(Merged {
        first,
        second,
        id,
        distance,
    }))
}

/// Neighbors of two merged clusters, split by which of them they linked to.
struct NeighborGroups {
    exclusive: Vec<ClusterId>,
    shared: Vec<ClusterId>,
}

impl NeighborGroups {
    fn of<E>(a: &Cluster<E>, b: &Cluster<E>) -> Self {
        let mut exclusive = Vec::new();
        let mut shared = Vec::new();
        for n in a.neighbors() {
            if b.has_neighbor(n) {
                shared.push(n);
            } else {
                exclusive.push(n);
            }
        }
        exclusive.extend(b.neighbors().filter(|&n| !a.has_neighbor(n)));
        exclusive.sort_unstable();
        shared.sort_unstable();
        Self { exclusive, shared }
    }

    /// Recompute the opposite-side distances the merge can have changed.
    ///
    /// Covers every pair within `exclusive` and every `exclusive × shared` pair.
    fn refresh<B>(&self, other: &Partition<B>, index: &mut DistanceIndex) -> Result<usize> {
        let mut count = 0;
        for (i, &x) in self.exclusive.iter().enumerate() {
            let cx = other.cluster(x)?;
            for &y in self.exclusive[i + 1..].iter().chain(&self.shared) {
                let d = metric::distance(cx, other.cluster(y)?)?;
                index.insert(UnorderedPair::new(x, y), d)?;
                count += 1;
            }
        }
        Ok(count)
    }
}
