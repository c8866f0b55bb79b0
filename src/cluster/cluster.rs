use crate::{
    geo::{Coord, Geo},
    record::{PrimaryRecord, SecondaryRecord},
};

/**
 * The aggregate properties of a group of records believed to be the same flaring site.
 *
 * The centroid is the running mean of the coordinates of every member added so far, from both
 * sources pooled together. Members are never removed.
 */
#[derive(Clone, Debug)]
pub struct Cluster {
    /// Site inventory records in the order they were added.
    primary: Vec<PrimaryRecord>,
    /// Satellite survey records in the order they were added.
    secondary: Vec<SecondaryRecord>,
    /// Running sum of member latitudes.
    sum_lat: f64,
    /// Running sum of member longitudes.
    sum_lon: f64,
    /// The number of members from both sources.
    count: usize,
    /// Cached mean of the member coordinates, updated after every addition.
    centroid: Coord,
}

impl Cluster {
    /// Start a new cluster around a single primary record.
    pub fn from_primary(rec: PrimaryRecord) -> Self {
        let mut clust = Cluster {
            primary: Vec::with_capacity(1),
            secondary: vec![],
            sum_lat: 0.0,
            sum_lon: 0.0,
            count: 0,
            centroid: rec.centroid(),
        };

        clust.add_primary(rec);
        clust
    }

    /// Add a primary record and update the centroid.
    pub fn add_primary(&mut self, rec: PrimaryRecord) {
        self.update_centroid(rec.centroid());
        self.primary.push(rec);
    }

    /// Add a secondary record and update the centroid.
    pub fn add_secondary(&mut self, rec: SecondaryRecord) {
        self.update_centroid(rec.centroid());
        self.secondary.push(rec);
    }

    /// The primary members.
    pub fn primary(&self) -> &[PrimaryRecord] {
        &self.primary
    }

    /// The secondary members.
    pub fn secondary(&self) -> &[SecondaryRecord] {
        &self.secondary
    }

    /// Total number of members from both sources.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Great circle distance from the centroid of the cluster to `coord` in kilometers.
    pub fn distance_to(&self, coord: Coord) -> f64 {
        self.centroid.distance_to(coord)
    }

    fn update_centroid(&mut self, coord: Coord) {
        self.sum_lat += coord.lat;
        self.sum_lon += coord.lon;
        self.count += 1;

        self.centroid = Coord {
            lat: self.sum_lat / self.count as f64,
            lon: self.sum_lon / self.count as f64,
        };
    }
}

impl Geo for Cluster {
    fn centroid(&self) -> Coord {
        self.centroid
    }
}
