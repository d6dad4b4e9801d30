//! Run configuration.

use serde::{Deserialize, Serialize};

use crate::cluster::QueryClusterer;
use crate::error::{Error, Result};
use crate::querylog::ClickLogReader;

/// Merge threshold in `[0, 1]`.
///
/// Two clusters merge while their distance is strictly below the threshold.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Threshold(f64);

impl Threshold {
    /// Default threshold.
    pub const DEFAULT: Self = Self(0.1);

    /// Validate `value`. NaN and values outside `[0, 1]` are rejected.
    pub fn new(value: f64) -> Result<Self> {
        if (0.0..=1.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(Error::InvalidParameter {
                name: "threshold",
                message: "must be within [0, 1]",
            })
        }
    }

    /// The raw value.
    pub fn value(self) -> f64 {
        self.0
    }
}

impl Default for Threshold {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<f64> for Threshold {
    type Error = Error;

    fn try_from(value: f64) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Threshold> for f64 {
    fn from(t: Threshold) -> Self {
        t.0
    }
}

/// Settings for one clustering run over a click log.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusteringConfig {
    /// Merge threshold.
    pub threshold: Threshold,
    /// Clusters smaller than this are left out of reports.
    pub min_cluster_size: usize,
    /// Maximum number of log lines to read (`None` reads everything).
    pub line_limit: Option<usize>,
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            threshold: Threshold::DEFAULT,
            min_cluster_size: 4,
            line_limit: Some(10_000),
        }
    }
}

impl ClusteringConfig {
    /// Check values that the field types do not already enforce.
    pub fn validate(&self) -> Result<()> {
        if self.min_cluster_size == 0 {
            return Err(Error::InvalidParameter {
                name: "min_cluster_size",
                message: "must be at least 1",
            });
        }
        Ok(())
    }

    /// A clusterer using the configured threshold.
    pub fn clusterer(&self) -> Result<QueryClusterer> {
        self.validate()?;
        Ok(QueryClusterer::from_threshold(self.threshold))
    }

    /// A click-log reader honoring the configured line limit.
    pub fn reader(&self) -> ClickLogReader {
        match self.line_limit {
            Some(limit) => ClickLogReader::new().with_line_limit(limit),
            None => ClickLogReader::new(),
        }
    }
}
