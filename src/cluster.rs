/*!
 * Types and functions for working with clusters.
 *
 * A cluster is a spatial group of records from both sources that are believed to describe the
 * same physical flaring site. The [ClusterList] builds them with a greedy, single pass linkage.
 */

pub use cluster::Cluster;
pub use cluster_list::{ClusterList, LinkageConfig, SecondaryAssignment};

mod cluster;
mod cluster_list;
