use thiserror::Error;

use crate::cluster::ClusterId;

/// Errors returned by the clustering engine and its collaborators.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid parameter value.
    #[error("invalid parameter {name}: {message}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Human-readable explanation.
        message: &'static str,
    },

    /// A distance outside the accepted domain was stored.
    #[error("invalid distance {distance}: must be a non-negative number")]
    InvalidDistance {
        /// The rejected value.
        distance: f64,
    },

    /// An aggregate link weight no longer fits in 64 bits.
    ///
    /// This aborts the run: a clamped or wrapped total would silently corrupt
    /// every distance computed from it.
    #[error("link weight overflow while {context}")]
    WeightOverflow {
        /// What was being accumulated.
        context: &'static str,
    },

    /// An operation referenced a cluster that is not (or no longer) in its partition.
    #[error("unknown cluster {id}")]
    UnknownCluster {
        /// The missing id.
        id: ClusterId,
    },

    /// A log line could not be parsed.
    #[error("line {line}: {message}")]
    Parse {
        /// 1-based line number.
        line: usize,
        /// Human-readable explanation.
        message: String,
    },

    /// Reading input or writing a report failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Other error.
    #[error("{0}")]
    Other(String),
}

/// Result type used by this crate.
pub type Result<T> = std::result::Result<T, Error>;
