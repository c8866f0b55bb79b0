/*!
 * Reconcile a gas flaring site inventory with a satellite flare survey.
 *
 * Records from the inventory (the primary source) are greedily grouped into clusters of sites
 * within a fixed distance of each other. Records from the survey (the secondary source) are then
 * attached to the nearest cluster, or left dangling if none is close enough. Each cluster with
 * data from both sources becomes one row of a joined data set, and a straight line is fit to
 * explain the primary volume with the secondary volume.
 */
pub use aggregate::{aggregate, Aggregation, CombinedRow};
pub use analysis::{Analysis, AnalysisConfig, Exploration};
pub use cluster::{Cluster, ClusterList, LinkageConfig, SecondaryAssignment};
pub use error::{FlareJoinError, FlareJoinResult};
pub use geo::{great_circle_distance, Coord, Geo};
pub use output::{write_combined, write_combined_file, write_dangling, write_dangling_file};
pub use record::{filter_country, CountryTagged, PrimaryRecord, SecondaryRecord, Source};
pub use regression::{Regression, RegressionResult};
pub use report::Report;
pub use source::{
    read_primary, read_primary_file, read_secondary, read_secondary_file, SourceSummary,
    ValuePolicy,
};
pub use stats::{Histogram, SummaryStats};

/**************************************************************************************************
 * Private Implementation
 *************************************************************************************************/
mod aggregate;
mod analysis;
mod cluster;
mod error;
mod geo;
mod output;
mod record;
mod regression;
mod report;
mod source;
mod stats;
