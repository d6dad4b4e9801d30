//! Co-click query clustering.
//!
//! `coclump` groups search-engine queries by the documents users clicked for
//! them: queries satisfied by the same documents end up in the same cluster.
//!
//! The primary public API is under [`cluster`], which provides:
//! - the bipartite query/document cluster graph
//! - the co-click distance and an incrementally maintained distance index
//! - the alternating agglomerative engine and its [`QueryClusterer`] facade
//!
//! Around it sit thin collaborators: [`querylog`] readers, [`report`] writers
//! and a serde-backed [`config`].

#![forbid(unsafe_code)]

pub mod cluster;
pub mod config;
pub mod error;
pub mod query;
pub mod querylog;
pub mod report;

pub use cluster::{Clustering, DistanceIndex, Engine, EngineState, QueryClusterer, UnorderedPair};
pub use config::{ClusteringConfig, Threshold};
pub use error::{Error, Result};
pub use query::{Document, Query};
pub use querylog::{read_weighted, ClickLogReader};
