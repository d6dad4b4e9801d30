//! Agglomerative co-click clustering over a bipartite query/document graph.
//!
//! ## The Graph
//!
//! Every distinct query and every distinct clicked document starts as its own
//! cluster. A query cluster and a document cluster are linked with a weight
//! equal to the number of clicks between them. Clusters of the same side that
//! share at least one neighbor are *siblings*: only siblings can ever be
//! closer than the maximal distance `1`, so only siblings are compared.
//!
//! ## Distance
//!
//! ```text
//! d(a, b) = 1 - Σ_{n shared} (w(a, n) + w(b, n)) / (total(a) + total(b))
//! ```
//!
//! `0` when all click weight of both clusters goes to shared neighbors, `1`
//! when none does.
//!
//! ## Merge Loop
//!
//! The engine alternates between the query side and the document side, merging
//! the closest sibling pair on each side while its distance is below the
//! threshold. After a merge only distances that can have changed are
//! recomputed. The loop stops when a full pass merges nothing; the surviving
//! query clusters are the result.
//!
//! ## Usage
//!
//! ```rust
//! use coclump::cluster::{Clustering, QueryClusterer};
//! use coclump::Query;
//!
//! let queries = vec![
//!     Query::new("rust book").with_clicks("doc.rust-lang.org", 5).unwrap(),
//!     Query::new("learn rust").with_clicks("doc.rust-lang.org", 5).unwrap(),
//!     Query::new("cheap flights").with_clicks("kayak.com", 3).unwrap(),
//! ];
//!
//! let clusters = QueryClusterer::new(0.5).unwrap().cluster_queries(&queries).unwrap();
//! assert_eq!(clusters.len(), 2);
//!
//! let labels = QueryClusterer::new(0.5).unwrap().fit_predict(&queries).unwrap();
//! assert_eq!(labels[0], labels[1]);
//! assert_ne!(labels[0], labels[2]);
//! ```

mod coclick;
mod engine;
mod graph;
mod index;
mod metric;
mod pair;
mod traits;

pub use coclick::QueryClusterer;
pub use engine::{Engine, EngineState, Side};
pub use graph::{apply_merge, siblings, BipartiteGraph, Cluster, ClusterId, Partition};
pub use index::DistanceIndex;
pub use metric::distance;
pub use pair::UnorderedPair;
pub use traits::Clustering;
