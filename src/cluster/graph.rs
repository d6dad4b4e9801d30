//! Bipartite cluster graph.
//!
//! Each side of the graph is a [`Partition`]: an arena mapping a stable
//! [`ClusterId`] to a [`Cluster`] record. Cross-partition links are stored on
//! both endpoints as `neighbor id -> weight`, so every relation is an id lookup
//! and merges never have to chase aliased references.
//!
//! Ids are only meaningful inside the partition that issued them. A query
//! cluster and a document cluster may carry the same numeric id.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;
use std::hash::Hash;

use crate::error::{Error, Result};

/// Stable identifier of a cluster inside one partition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClusterId(usize);

impl ClusterId {
    pub(crate) const fn new(index: usize) -> Self {
        Self(index)
    }

    /// The raw arena index.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ClusterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A node of the bipartite graph: a set of merged elements plus weighted links
/// to clusters of the opposite partition.
///
/// `total_weight` always equals the sum of all link weights.
#[derive(Clone, Debug)]
pub struct Cluster<E> {
    elements: HashSet<E>,
    links: HashMap<ClusterId, u64>,
    total: u64,
}

impl<E: Eq + Hash> Cluster<E> {
    /// A cluster holding one element and no links.
    pub fn singleton(element: E) -> Self {
        let mut elements = HashSet::with_capacity(1);
        elements.insert(element);
        Self {
            elements,
            links: HashMap::new(),
            total: 0,
        }
    }
}

impl<E: Eq + Hash + Clone> Cluster<E> {
    /// Combine two clusters into a new one.
    ///
    /// Elements are unioned, link weights to shared neighbors are summed and
    /// the aggregate is `a.total + b.total`. Neither input is modified.
    pub fn merge(a: &Self, b: &Self) -> Result<Self> {
        let total = a
            .total
            .checked_add(b.total)
            .ok_or(Error::WeightOverflow {
                context: "merging clusters",
            })?;

        let mut elements = a.elements.clone();
        elements.extend(b.elements.iter().cloned());

        // Every entry is bounded by `total`, so the per-neighbor sums cannot overflow.
        let mut links = a.links.clone();
        for (&neighbor, &weight) in &b.links {
            *links.entry(neighbor).or_insert(0) += weight;
        }

        Ok(Self {
            elements,
            links,
            total,
        })
    }
}

impl<E> Cluster<E> {
    /// Elements merged into this cluster.
    pub fn elements(&self) -> &HashSet<E> {
        &self.elements
    }

    /// Consume the cluster, returning its elements.
    pub fn into_elements(self) -> HashSet<E> {
        self.elements
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Whether the cluster holds no elements.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Neighbor id -> link weight.
    pub fn links(&self) -> &HashMap<ClusterId, u64> {
        &self.links
    }

    /// Ids of linked clusters in the opposite partition.
    pub fn neighbors(&self) -> impl Iterator<Item = ClusterId> + '_ {
        self.links.keys().copied()
    }

    /// Number of neighbors.
    pub fn degree(&self) -> usize {
        self.links.len()
    }

    /// Whether `neighbor` is linked.
    pub fn has_neighbor(&self, neighbor: ClusterId) -> bool {
        self.links.contains_key(&neighbor)
    }

    /// Link weight to `neighbor`, `0` if absent.
    pub fn weight_to(&self, neighbor: ClusterId) -> u64 {
        self.links.get(&neighbor).copied().unwrap_or(0)
    }

    /// Sum of all link weights.
    pub fn total_weight(&self) -> u64 {
        self.total
    }

    /// Set (not add) the weight of the link to `neighbor`.
    ///
    /// Returns the previous weight. On overflow the cluster is left unchanged.
    pub fn set_link(&mut self, neighbor: ClusterId, weight: u64) -> Result<Option<u64>> {
        let total = self.total_after_set(neighbor, weight)?;
        let previous = self.links.insert(neighbor, weight);
        self.total = total;
        Ok(previous)
    }

    /// Remove the link to `neighbor`, returning its weight (`0` if absent).
    pub fn remove_link(&mut self, neighbor: ClusterId) -> u64 {
        match self.links.remove(&neighbor) {
            Some(weight) => {
                // total >= every stored weight
                self.total -= weight;
                weight
            }
            None => 0,
        }
    }

    fn total_after_set(&self, neighbor: ClusterId, weight: u64) -> Result<u64> {
        self.total
            .checked_sub(self.weight_to(neighbor))
            .and_then(|rest| rest.checked_add(weight))
            .ok_or(Error::WeightOverflow {
                context: "setting a link weight",
            })
    }
}

/// One side of the bipartite graph.
#[derive(Clone, Debug)]
pub struct Partition<E> {
    clusters: HashMap<ClusterId, Cluster<E>>,
    next_id: usize,
}

impl<E> Default for Partition<E> {
    fn default() -> Self {
        Self {
            clusters: HashMap::new(),
            next_id: 0,
        }
    }
}

impl<E: Eq + Hash> Partition<E> {
    /// Create an empty partition.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a new singleton cluster for `element`.
    pub fn insert_singleton(&mut self, element: E) -> ClusterId {
        self.insert(Cluster::singleton(element))
    }
}

impl<E> Partition<E> {
    pub(crate) fn insert(&mut self, cluster: Cluster<E>) -> ClusterId {
        let id = ClusterId::new(self.next_id);
        self.next_id += 1;
        self.clusters.insert(id, cluster);
        id
    }

    pub(crate) fn remove(&mut self, id: ClusterId) -> Result<Cluster<E>> {
        self.clusters
            .remove(&id)
            .ok_or(Error::UnknownCluster { id })
    }

    /// Look up a live cluster.
    pub fn get(&self, id: ClusterId) -> Option<&Cluster<E>> {
        self.clusters.get(&id)
    }

    /// Look up a live cluster, failing with [`Error::UnknownCluster`].
    pub fn cluster(&self, id: ClusterId) -> Result<&Cluster<E>> {
        self.clusters.get(&id).ok_or(Error::UnknownCluster { id })
    }

    pub(crate) fn cluster_mut(&mut self, id: ClusterId) -> Result<&mut Cluster<E>> {
        self.clusters
            .get_mut(&id)
            .ok_or(Error::UnknownCluster { id })
    }

    /// Whether `id` is a live cluster.
    pub fn contains(&self, id: ClusterId) -> bool {
        self.clusters.contains_key(&id)
    }

    /// Number of live clusters.
    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    /// Whether the partition has no clusters.
    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    /// Live ids in ascending order.
    pub fn ids(&self) -> Vec<ClusterId> {
        let mut ids: Vec<ClusterId> = self.clusters.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Iterate live clusters in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (ClusterId, &Cluster<E>)> {
        self.clusters.iter().map(|(&id, c)| (id, c))
    }

    /// Sum of `total_weight` over all live clusters.
    pub fn total_weight(&self) -> Result<u64> {
        self.clusters.values().try_fold(0u64, |acc, c| {
            acc.checked_add(c.total).ok_or(Error::WeightOverflow {
                context: "summing partition weight",
            })
        })
    }
}

/// Clusters of `own` that share at least one neighbor with `id`, excluding `id`.
pub fn siblings<A, B>(
    own: &Partition<A>,
    other: &Partition<B>,
    id: ClusterId,
) -> Result<BTreeSet<ClusterId>> {
    let mut out = BTreeSet::new();
    for neighbor in own.cluster(id)?.neighbors() {
        out.extend(other.cluster(neighbor)?.neighbors());
    }
    out.remove(&id);
    Ok(out)
}

/// Install `merged` (the result of [`Cluster::merge`] on `first` and `second`)
/// in place of the two retired clusters.
///
/// Every former neighbor drops its links to `first` and `second` and links to
/// the new id with the weight recorded in `merged` (replacing, not summing).
/// Both retired clusters are removed from `own`. Returns the new id.
pub fn apply_merge<A, B>(
    own: &mut Partition<A>,
    other: &mut Partition<B>,
    first: ClusterId,
    second: ClusterId,
    merged: Cluster<A>,
) -> Result<ClusterId> {
    if first == second {
        return Err(Error::InvalidParameter {
            name: "second",
            message: "cannot merge a cluster with itself",
        });
    }

    let mut former: BTreeSet<ClusterId> = own.cluster(first)?.neighbors().collect();
    former.extend(own.cluster(second)?.neighbors());
    if let Some(&missing) = former.iter().find(|&&n| !other.contains(n)) {
        return Err(Error::UnknownCluster { id: missing });
    }

    let weights: Vec<(ClusterId, u64)> = former
        .iter()
        .map(|&n| (n, merged.weight_to(n)))
        .collect();
    let id = own.insert(merged);

    for (neighbor, weight) in weights {
        let cluster = other.cluster_mut(neighbor)?;
        // Retire the old links first; the new weight equals their sum, so the
        // aggregate never exceeds its final value.
        cluster.remove_link(first);
        cluster.remove_link(second);
        cluster.set_link(id, weight)?;
    }

    own.remove(first)?;
    own.remove(second)?;
    Ok(id)
}

/// The query/document graph.
#[derive(Clone, Debug)]
pub struct BipartiteGraph<Q, D> {
    queries: Partition<Q>,
    documents: Partition<D>,
}

impl<Q, D> Default for BipartiteGraph<Q, D> {
    fn default() -> Self {
        Self {
            queries: Partition::default(),
            documents: Partition::default(),
        }
    }
}

impl<Q: Eq + Hash, D: Eq + Hash> BipartiteGraph<Q, D> {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a singleton query cluster.
    pub fn add_query(&mut self, query: Q) -> ClusterId {
        self.queries.insert_singleton(query)
    }

    /// Add a singleton document cluster.
    pub fn add_document(&mut self, document: D) -> ClusterId {
        self.documents.insert_singleton(document)
    }
}

impl<Q, D> BipartiteGraph<Q, D> {
    /// Query side.
    pub fn queries(&self) -> &Partition<Q> {
        &self.queries
    }

    /// Document side.
    pub fn documents(&self) -> &Partition<D> {
        &self.documents
    }

    pub(crate) fn parts_mut(&mut self) -> (&mut Partition<Q>, &mut Partition<D>) {
        (&mut self.queries, &mut self.documents)
    }

    /// Set the weight of the link between `query` and `document` on both ends.
    ///
    /// Nothing is modified if either end is unknown or would overflow.
    pub fn link(&mut self, query: ClusterId, document: ClusterId, weight: u64) -> Result<()> {
        let q_total = self
            .queries
            .cluster(query)?
            .total_after_set(document, weight)?;
        let d_total = self
            .documents
            .cluster(document)?
            .total_after_set(query, weight)?;

        let q = self.queries.cluster_mut(query)?;
        q.links.insert(document, weight);
        q.total = q_total;
        let d = self.documents.cluster_mut(document)?;
        d.links.insert(query, weight);
        d.total = d_total;
        Ok(())
    }

    /// Remove the link between `query` and `document`, returning its weight.
    pub fn unlink(&mut self, query: ClusterId, document: ClusterId) -> Result<u64> {
        self.documents.cluster(document)?;
        let weight = self.queries.cluster_mut(query)?.remove_link(document);
        self.documents.cluster_mut(document)?.remove_link(query);
        Ok(weight)
    }

    /// Siblings of a query cluster.
    pub fn query_siblings(&self, id: ClusterId) -> Result<BTreeSet<ClusterId>> {
        siblings(&self.queries, &self.documents, id)
    }

    /// Siblings of a document cluster.
    pub fn document_siblings(&self, id: ClusterId) -> Result<BTreeSet<ClusterId>> {
        siblings(&self.documents, &self.queries, id)
    }
}
