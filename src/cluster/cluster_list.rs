use crate::{
    cluster::Cluster,
    error::{FlareJoinError, FlareJoinResult},
    geo::Geo,
    record::{PrimaryRecord, SecondaryRecord},
};
use log::{debug, info};

/// Default maximum distance between a record and a cluster centroid for them to be linked.
pub const DEFAULT_THRESHOLD_KM: f64 = 3.0;

/// Parameters for the linkage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinkageConfig {
    /// A record links to a cluster only if it is strictly closer than this to the centroid.
    pub threshold_km: f64,
}

impl LinkageConfig {
    /// Create a configuration, rejecting thresholds that are not finite and positive.
    pub fn new(threshold_km: f64) -> FlareJoinResult<Self> {
        if !threshold_km.is_finite() || threshold_km <= 0.0 {
            return Err(Box::new(FlareJoinError {
                msg: "linkage threshold must be a finite, positive distance",
            }));
        }

        Ok(LinkageConfig { threshold_km })
    }
}

impl Default for LinkageConfig {
    fn default() -> Self {
        LinkageConfig {
            threshold_km: DEFAULT_THRESHOLD_KM,
        }
    }
}

/// What happened to a primary record during clustering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PrimaryAssignment {
    /// Joined the existing cluster at this index.
    Joined(usize),
    /// Opened a new cluster at this index.
    Opened(usize),
}

/// What happened to a secondary record during linkage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SecondaryAssignment {
    /// Linked to the cluster at index `cluster`, whose centroid was `distance_km` away.
    Matched { cluster: usize, distance_km: f64 },
    /// No cluster was close enough, the record is in the dangling list at index `dangling`.
    Dangling { dangling: usize },
}

/**
 * The result of linking the two sources.
 *
 * Built in two phases, in order, exactly once:
 *
 * 1. Every primary record, in input order, joins the *first* cluster (in creation order) whose
 *    centroid is closer than the threshold, or opens a new cluster. The centroid moves after
 *    every addition, so the result depends on input order.
 * 2. Every secondary record, in input order, joins the *nearest* cluster if that cluster is closer
 *    than the threshold. Otherwise it is dangling.
 *
 * Nothing is ever reassigned.
 */
#[derive(Debug, Clone)]
pub struct ClusterList {
    config: LinkageConfig,
    /// Clusters in creation order.
    clusters: Vec<Cluster>,
    /// Secondary records that did not link to any cluster, in input order.
    dangling: Vec<SecondaryRecord>,
    /// The outcome for each secondary record, parallel to the secondary input.
    secondary_assignments: Vec<SecondaryAssignment>,
}

impl ClusterList {
    /**
     * Run the linkage.
     *
     * #Arguments
     * primary - records that anchor the clusters.
     * secondary - records that are attached to the clusters, or left dangling.
     * config - the linkage parameters.
     */
    pub fn link(
        primary: &[PrimaryRecord],
        secondary: &[SecondaryRecord],
        config: LinkageConfig,
    ) -> Self {
        let mut list = ClusterList {
            config,
            clusters: vec![],
            dangling: vec![],
            secondary_assignments: Vec::with_capacity(secondary.len()),
        };

        for rec in primary {
            match list.cluster_primary(rec.clone()) {
                PrimaryAssignment::Joined(idx) => debug!("primary record joined cluster {}", idx),
                PrimaryAssignment::Opened(idx) => debug!("primary record opened cluster {}", idx),
            }
        }
        info!(
            "clustered {} primary records into {} clusters",
            primary.len(),
            list.clusters.len()
        );

        for rec in secondary {
            let assignment = list.link_secondary(rec.clone());
            list.secondary_assignments.push(assignment);
        }
        info!(
            "linked {} of {} secondary records, {} dangling",
            secondary.len() - list.dangling.len(),
            secondary.len(),
            list.dangling.len()
        );

        list
    }

    /// First fit. Only valid while no secondary records have been linked.
    fn cluster_primary(&mut self, rec: PrimaryRecord) -> PrimaryAssignment {
        let coord = rec.centroid();
        let threshold = self.config.threshold_km;

        for (idx, clust) in self.clusters.iter_mut().enumerate() {
            if clust.distance_to(coord) < threshold {
                clust.add_primary(rec);
                return PrimaryAssignment::Joined(idx);
            }
        }

        self.clusters.push(Cluster::from_primary(rec));
        PrimaryAssignment::Opened(self.clusters.len() - 1)
    }

    /// Best fit against every cluster.
    fn link_secondary(&mut self, rec: SecondaryRecord) -> SecondaryAssignment {
        let coord = rec.centroid();

        // Ties go to the cluster created first.
        let mut nearest: Option<(usize, f64)> = None;
        for (idx, clust) in self.clusters.iter().enumerate() {
            let dist = clust.distance_to(coord);
            if dist < nearest.map_or(f64::INFINITY, |(_, min_dist)| min_dist) {
                nearest = Some((idx, dist));
            }
        }

        match nearest {
            Some((idx, dist)) if dist < self.config.threshold_km => {
                self.clusters[idx].add_secondary(rec);
                SecondaryAssignment::Matched {
                    cluster: idx,
                    distance_km: dist,
                }
            }
            _ => {
                debug!(
                    "dangling secondary record {} at ({:.6}, {:.6})",
                    rec.catalog_id, rec.lat, rec.lon
                );
                self.dangling.push(rec);
                SecondaryAssignment::Dangling {
                    dangling: self.dangling.len() - 1,
                }
            }
        }
    }

    /// The configuration this list was built with.
    pub fn config(&self) -> LinkageConfig {
        self.config
    }

    /// The clusters in creation order.
    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    /// The secondary records that were not linked, in input order.
    pub fn dangling(&self) -> &[SecondaryRecord] {
        &self.dangling
    }

    /// The outcome for each secondary record, in input order.
    pub fn secondary_assignments(&self) -> &[SecondaryAssignment] {
        &self.secondary_assignments
    }

    /// Number of clusters.
    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    /// Are there no clusters?
    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::record::test::{primary, secondary};

    fn config() -> LinkageConfig {
        LinkageConfig::default()
    }

    #[test]
    fn test_threshold_validation() {
        assert!(LinkageConfig::new(3.0).is_ok());
        assert!(LinkageConfig::new(0.0).is_err());
        assert!(LinkageConfig::new(-1.0).is_err());
        assert!(LinkageConfig::new(f64::NAN).is_err());
        assert!(LinkageConfig::new(f64::INFINITY).is_err());
    }

    #[test]
    fn test_close_primaries_merge_and_far_ones_do_not() {
        let prims = vec![
            primary("Algeria", 0.0, 0.0, "2019", 1.0),
            primary("Algeria", 0.0, 0.001, "2019", 2.0),
            primary("Algeria", 0.0, 1.0, "2019", 3.0),
        ];

        let list = ClusterList::link(&prims, &[], config());
        assert_eq!(list.len(), 2);
        assert_eq!(list.clusters()[0].primary().len(), 2);
        assert_eq!(list.clusters()[1].primary().len(), 1);
        assert_eq!(list.clusters()[1].primary()[0].volume, 3.0);
    }

    #[test]
    fn test_primary_is_first_fit() {
        // Two clusters about 4 km apart, then a record 2.5 km from the first and 1.5 km from the
        // second. It must join the first one.
        let deg_per_km = 1.0 / 111.195;
        let prims = vec![
            primary("Algeria", 0.0, 0.0, "2019", 1.0),
            primary("Algeria", 0.0, 4.0 * deg_per_km, "2019", 1.0),
            primary("Algeria", 0.0, 2.5 * deg_per_km, "2019", 1.0),
        ];

        let list = ClusterList::link(&prims, &[], config());
        assert_eq!(list.len(), 2);
        assert_eq!(list.clusters()[0].primary().len(), 2);
        assert_eq!(list.clusters()[1].primary().len(), 1);
    }

    #[test]
    fn test_secondary_is_best_fit() {
        let deg_per_km = 1.0 / 111.195;
        let prims = vec![
            primary("Algeria", 0.0, 0.0, "2019", 1.0),
            primary("Algeria", 0.0, 4.0 * deg_per_km, "2019", 1.0),
        ];
        let sats = vec![secondary("Algeria", 0.0, 2.5 * deg_per_km, 1.0)];

        let list = ClusterList::link(&prims, &sats, config());
        assert!(list.clusters()[0].secondary().is_empty());
        assert_eq!(list.clusters()[1].secondary().len(), 1);
        match list.secondary_assignments()[0] {
            SecondaryAssignment::Matched {
                cluster,
                distance_km,
            } => {
                assert_eq!(cluster, 1);
                assert!((distance_km - 1.5).abs() < 0.01);
            }
            other => panic!("unexpected assignment {:?}", other),
        }
    }

    #[test]
    fn test_threshold_is_strict() {
        let prims = vec![primary("Algeria", 0.0, 0.0, "2019", 1.0)];
        let sats = vec![secondary("Algeria", 0.0, 0.01, 1.0)];

        // The secondary record is ~1.11 km away.
        let dist = crate::geo::great_circle_distance(0.0, 0.0, 0.0, 0.01);

        let exact = LinkageConfig::new(dist).unwrap();
        let list = ClusterList::link(&prims, &sats, exact);
        assert_eq!(list.dangling().len(), 1);

        let wider = LinkageConfig::new(dist * 1.001).unwrap();
        let list = ClusterList::link(&prims, &sats, wider);
        assert!(list.dangling().is_empty());
    }

    #[test]
    fn test_no_clusters_means_all_dangling() {
        let sats = vec![
            secondary("Algeria", 0.0, 0.0, 1.0),
            secondary("Algeria", 1.0, 0.0, 1.0),
        ];

        let list = ClusterList::link(&[], &sats, config());
        assert!(list.is_empty());
        assert_eq!(list.dangling(), &sats[..]);
    }

    #[test]
    fn test_every_secondary_accounted_for_once() {
        let prims: Vec<_> = (0..20)
            .map(|i| primary("Algeria", 30.0 + 0.013 * i as f64, 5.0, "2019", 1.0))
            .collect();
        let sats: Vec<_> = (0..40)
            .map(|i| secondary("Algeria", 29.9 + 0.011 * i as f64, 5.0 + 0.002 * i as f64, 1.0))
            .collect();

        let list = ClusterList::link(&prims, &sats, config());

        let linked: usize = list.clusters().iter().map(|c| c.secondary().len()).sum();
        assert_eq!(linked + list.dangling().len(), sats.len());
        assert_eq!(list.secondary_assignments().len(), sats.len());

        let primaries: usize = list.clusters().iter().map(|c| c.primary().len()).sum();
        assert_eq!(primaries, prims.len());

        for (rec, assignment) in sats.iter().zip(list.secondary_assignments()) {
            match *assignment {
                SecondaryAssignment::Matched { cluster, .. } => {
                    assert!(list.clusters()[cluster].secondary().contains(rec));
                    assert!(!list.dangling().contains(rec));
                }
                SecondaryAssignment::Dangling { dangling } => {
                    assert_eq!(&list.dangling()[dangling], rec);
                }
            }
        }
    }

    #[test]
    fn test_linkage_is_deterministic() {
        let prims: Vec<_> = (0..15)
            .map(|i| primary("Algeria", 28.0 + 0.017 * i as f64, 6.0, "2019", i as f64))
            .collect();
        let sats: Vec<_> = (0..15)
            .map(|i| secondary("Algeria", 28.0 + 0.019 * i as f64, 6.001, i as f64))
            .collect();

        let first = ClusterList::link(&prims, &sats, config());
        let second = ClusterList::link(&prims, &sats, config());

        assert_eq!(first.secondary_assignments(), second.secondary_assignments());
        assert_eq!(first.dangling(), second.dangling());
        assert_eq!(first.len(), second.len());
        for (a, b) in first.clusters().iter().zip(second.clusters()) {
            assert_eq!(a.primary(), b.primary());
            assert_eq!(a.secondary(), b.secondary());
        }
    }
}
