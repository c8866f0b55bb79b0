/*!
 * Sequence the steps of a run: explore, filter, link, aggregate, and regress.
 */
use crate::{
    aggregate::{aggregate, Aggregation, CombinedRow},
    cluster::{ClusterList, LinkageConfig},
    record::{filter_country, PrimaryRecord, SecondaryRecord},
    regression::Regression,
    stats::{Histogram, SummaryStats},
    FlareJoinResult,
};
use log::info;

/// Parameters for a run.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    /// Only records from this country take part in the linkage.
    pub country: String,
    /// Primary records tagged with this year are averaged for the regression.
    pub target_year: String,
    pub linkage: LinkageConfig,
    /// Number of bins in the exploratory histograms.
    pub histogram_bins: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        AnalysisConfig {
            country: "Algeria".to_owned(),
            target_year: "2019".to_owned(),
            linkage: LinkageConfig::default(),
            histogram_bins: 10,
        }
    }
}

/// Exploratory description of one source's measurement values.
#[derive(Debug, Clone)]
pub struct Exploration {
    pub stats: SummaryStats,
    /// `None` when there were no values.
    pub histogram: Option<Histogram>,
}

impl Exploration {
    fn new(values: &[f64], bins: usize) -> Self {
        Exploration {
            stats: SummaryStats::from_values(values),
            histogram: Histogram::new(values, bins),
        }
    }
}

/// Everything produced by a run.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub config: AnalysisConfig,
    pub primary_count: usize,
    pub secondary_count: usize,
    pub primary_exploration: Exploration,
    pub secondary_exploration: Exploration,
    pub filtered_primary_count: usize,
    pub filtered_secondary_count: usize,
    pub clusters: ClusterList,
    pub aggregation: Aggregation,
    pub regression: Regression,
}

impl Analysis {
    /// Run every step on records that have already been read and validated.
    pub fn run(
        primary: &[PrimaryRecord],
        secondary: &[SecondaryRecord],
        config: AnalysisConfig,
    ) -> FlareJoinResult<Self> {
        // Re-validate, the fields are public.
        let linkage = LinkageConfig::new(config.linkage.threshold_km)?;

        let primary_volumes: Vec<f64> = primary.iter().map(|rec| rec.volume).collect();
        let secondary_volumes: Vec<f64> = secondary.iter().map(|rec| rec.volume).collect();
        let primary_exploration = Exploration::new(&primary_volumes, config.histogram_bins);
        let secondary_exploration = Exploration::new(&secondary_volumes, config.histogram_bins);

        let primary_filtered = filter_country(primary, &config.country);
        let secondary_filtered = filter_country(secondary, &config.country);
        info!(
            "{} primary and {} secondary records from {}",
            primary_filtered.len(),
            secondary_filtered.len(),
            config.country
        );

        let clusters = ClusterList::link(&primary_filtered, &secondary_filtered, linkage);

        let aggregation = aggregate(clusters.clusters(), &config.target_year);
        info!(
            "{} clusters have {} primary data and secondary data",
            aggregation.rows.len(),
            config.target_year
        );

        let regression = Regression::from_rows(&aggregation.rows);

        Ok(Analysis {
            primary_count: primary.len(),
            secondary_count: secondary.len(),
            primary_exploration,
            secondary_exploration,
            filtered_primary_count: primary_filtered.len(),
            filtered_secondary_count: secondary_filtered.len(),
            clusters,
            aggregation,
            regression,
            config,
        })
    }

    /// Number of clusters formed.
    pub fn cluster_count(&self) -> usize {
        self.clusters.len()
    }

    /// Number of secondary records not linked to a cluster.
    pub fn dangling_count(&self) -> usize {
        self.clusters.dangling().len()
    }

    /// The secondary records not linked to a cluster.
    pub fn dangling(&self) -> &[SecondaryRecord] {
        self.clusters.dangling()
    }

    /// One row per cluster with both target year primary data and secondary data.
    pub fn combined_rows(&self) -> &[CombinedRow] {
        &self.aggregation.rows
    }
}
