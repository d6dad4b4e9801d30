//! Writing clustering results.

use std::fmt::Display;
use std::io::Write;

use crate::error::Result;

const SEPARATOR: &str = "----------------------------";

/// Keep only clusters with at least `min_size` members.
pub fn filter_min_size<T>(clusters: Vec<Vec<T>>, min_size: usize) -> Vec<Vec<T>> {
    clusters
        .into_iter()
        .filter(|c| c.len() >= min_size)
        .collect()
}

/// Run parameters printed above the clusters.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportHeader {
    /// Number of log lines read, `None` if the whole log was read.
    pub lines: Option<usize>,
    /// Merge threshold used.
    pub threshold: f64,
    /// Clusters smaller than this were left out.
    pub min_cluster_size: usize,
}

/// Write `header` and then every cluster as `[a, b, c]`, each followed by a
/// separator line.
pub fn write_report<W, T>(out: &mut W, header: &ReportHeader, clusters: &[Vec<T>]) -> Result<()>
where
    W: Write,
    T: Display,
{
    match header.lines {
        Some(n) => writeln!(out, "First {n} lines clustered")?,
        None => writeln!(out, "All lines clustered")?,
    }
    writeln!(out, "Threshold {}", header.threshold)?;
    writeln!(out, "Minimal size of cluster {}", header.min_cluster_size)?;
    writeln!(out)?;

    for cluster in clusters {
        let members: Vec<String> = cluster.iter().map(ToString::to_string).collect();
        writeln!(out, "[{}]", members.join(", "))?;
        writeln!(out, "{SEPARATOR}")?;
    }
    out.flush()?;
    Ok(())
}
