/*!
 * Reduce each cluster to a single row suitable for regression.
 */
use crate::{
    cluster::Cluster,
    geo::{Coord, Geo},
};
use log::debug;

/// One row per retained cluster.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CombinedRow {
    /// Sequential id, starting at 1, in the order clusters survived aggregation.
    pub cluster_id: usize,
    /// The cluster centroid.
    pub centroid: Coord,
    /// Mean primary volume over the members tagged with the target year.
    pub primary_volume: f64,
    /// Mean volume of all secondary members.
    pub secondary_volume: f64,
}

/// The combined rows along with a tally of why clusters were left out.
#[derive(Debug, Clone, Default)]
pub struct Aggregation {
    pub rows: Vec<CombinedRow>,
    /// Clusters with no primary member tagged with the target year.
    pub missing_target_year: usize,
    /// Clusters that had target year data but no secondary members.
    pub missing_secondary: usize,
}

fn mean(mut values: impl Iterator<Item = f64>) -> Option<f64> {
    let first = values.next()?;
    let (sum, count) = values.fold((first, 1usize), |(sum, count), v| (sum + v, count + 1));
    Some(sum / count as f64)
}

/**
 * Combine the members of each cluster.
 *
 * A cluster is kept only if it has at least one primary member from `target_year` and at least
 * one secondary member. The clusters themselves are not modified.
 */
pub fn aggregate(clusters: &[Cluster], target_year: &str) -> Aggregation {
    let mut agg = Aggregation::default();

    for (idx, clust) in clusters.iter().enumerate() {
        let primary_volume = match mean(
            clust
                .primary()
                .iter()
                .filter(|rec| rec.is_year(target_year))
                .map(|rec| rec.volume),
        ) {
            Some(v) => v,
            None => {
                debug!("cluster {} has no {} primary records", idx, target_year);
                agg.missing_target_year += 1;
                continue;
            }
        };

        let secondary_volume = match mean(clust.secondary().iter().map(|rec| rec.volume)) {
            Some(v) => v,
            None => {
                debug!("cluster {} has no secondary records", idx);
                agg.missing_secondary += 1;
                continue;
            }
        };

        agg.rows.push(CombinedRow {
            cluster_id: agg.rows.len() + 1,
            centroid: clust.centroid(),
            primary_volume,
            secondary_volume,
        });
    }

    agg
}
