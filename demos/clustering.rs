//! Cluster a small click log and print the report.
//!
//! Run with `RUST_LOG=coclump=debug` to see individual merges.

use coclump::cluster::Clustering;
use coclump::report::{filter_min_size, write_report, ReportHeader};
use coclump::{ClusteringConfig, Threshold};
use tracing_subscriber::EnvFilter;

const LOG: &str = "\
# AnonID\tQuery\tQueryTime\tItemRank\tClickURL
1\trust book\t2006-03-01 10:00:00\t1\thttp://doc.rust-lang.org/book
1\t-\t2006-03-01 10:00:30\t2\thttp://rust-lang.org
2\tlearn rust\t2006-03-01 10:05:00\t1\thttp://doc.rust-lang.org/book
3\trust tutorial\t2006-03-01 10:07:00\t1\thttp://rust-lang.org
3\t-\t2006-03-01 10:07:20\t2\thttp://doc.rust-lang.org/book
4\tcheap flights\t2006-03-01 11:00:00\t1\thttp://kayak.com
5\tflight deals\t2006-03-01 11:10:00\t2\thttp://kayak.com
5\t-\t2006-03-01 11:10:40\t1\thttp://skyscanner.net
6\tlast minute flights\t2006-03-01 11:20:00\t1\thttp://skyscanner.net
7\tweather tomorrow\t2006-03-01 12:00:00\t1\thttp://weather.com
8\tweather forecast\t2006-03-01 12:02:00
";

fn main() -> coclump::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = ClusteringConfig {
        threshold: Threshold::new(0.5)?,
        min_cluster_size: 2,
        line_limit: None,
    };

    let queries = config.reader().read(LOG.as_bytes())?;
    let clusters = config.clusterer()?.cluster_queries(&queries)?;
    println!("=== {} queries -> {} clusters ===\n", queries.len(), clusters.len());

    let kept = filter_min_size(clusters, config.min_cluster_size);
    let header = ReportHeader {
        lines: config.line_limit,
        threshold: config.threshold.value(),
        min_cluster_size: config.min_cluster_size,
    };
    write_report(&mut std::io::stdout().lock(), &header, &kept)
}
