/*!
 * Geographic calculations.
 *
 * Only what the linkage needs lives here: a coordinate type, a trait for anything that has a
 * location on the Earth, and the great circle distance between two points.
 */

/// The mean radius of the Earth in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A geographic coordinate, latitude and longitude in degrees.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Coord {
    pub lat: f64,
    pub lon: f64,
}

impl Coord {
    /// Check if two coordinates are within `eps` degrees of each other in both latitude and
    /// longitude.
    pub fn is_close(&self, other: Coord, eps: f64) -> bool {
        (self.lat - other.lat).abs() < eps && (self.lon - other.lon).abs() < eps
    }

    /// The great circle distance to another coordinate in kilometers.
    pub fn distance_to(&self, other: Coord) -> f64 {
        great_circle_distance(self.lat, self.lon, other.lat, other.lon)
    }
}

/// Anything with a single representative location on the Earth.
pub trait Geo {
    /// The representative location, for a record that is where it was observed, for a group of
    /// records it is their centroid.
    fn centroid(&self) -> Coord;
}

impl Geo for Coord {
    fn centroid(&self) -> Coord {
        *self
    }
}

/**
 * The great circle distance calculation using the haversine formula.
 *
 * NaN inputs propagate to the output.
 *
 * #Arguments
 * * lat1 - the latitude of the first point in degrees.
 * * lon1 - the longitude of the first point in degrees.
 * * lat2 - the latitude of the second point in degrees.
 * * lon2 - the longitude of the second point in degrees.
 *
 * #Returns
 * The distance between the points in kilometers.
 */
pub fn great_circle_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_r = lat1.to_radians();
    let lat2_r = lat2.to_radians();

    let dlat2 = (lat2 - lat1).to_radians() / 2.0;
    let dlon2 = (lon2 - lon1).to_radians() / 2.0;

    let sin2_dlat = f64::powi(f64::sin(dlat2), 2);
    let sin2_dlon = f64::powi(f64::sin(dlon2), 2);

    let a = sin2_dlat + sin2_dlon * f64::cos(lat1_r) * f64::cos(lat2_r);
    let arc = 2.0 * f64::atan2(f64::sqrt(a), f64::sqrt(1.0 - a));

    arc * EARTH_RADIUS_KM
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_distance_to_self_is_zero() {
        let pnts = [(0.0, 0.0), (45.5, -120.0), (-33.9, 151.2), (89.9, 179.9)];

        for (lat, lon) in pnts {
            assert_eq!(great_circle_distance(lat, lon, lat, lon), 0.0);
        }
    }

    #[test]
    fn test_distance_is_symmetric() {
        let a = Coord {
            lat: 31.65,
            lon: 5.93,
        };
        let b = Coord {
            lat: 28.02,
            lon: 9.41,
        };

        let ab = a.distance_to(b);
        let ba = b.distance_to(a);
        assert!((ab - ba).abs() < 1.0e-9);
    }

    #[test]
    fn test_one_degree_on_equator() {
        let dist = great_circle_distance(0.0, 0.0, 0.0, 1.0);
        assert!((dist - 111.19).abs() < 0.5, "dist = {}", dist);

        // A degree of latitude is the same length anywhere on a sphere.
        let dist = great_circle_distance(45.0, -100.0, 46.0, -100.0);
        assert!((dist - 111.19).abs() < 0.5, "dist = {}", dist);
    }

    #[test]
    fn test_antipodes() {
        let dist = great_circle_distance(0.0, 0.0, 0.0, 180.0);
        let half_circumference = std::f64::consts::PI * EARTH_RADIUS_KM;
        assert!((dist - half_circumference).abs() < 1.0e-6);
    }

    #[test]
    fn test_nan_propagates() {
        assert!(great_circle_distance(f64::NAN, 0.0, 0.0, 0.0).is_nan());
    }

    #[test]
    fn test_coord_is_close() {
        let left = Coord {
            lat: 45.5,
            lon: -120.0,
        };
        let right = Coord {
            lat: 45.5000002,
            lon: -120.0000002,
        };

        assert!(left.is_close(left, 1.0e-6));
        assert!(left.is_close(right, 1.0e-6));
        assert!(!left.is_close(right, 1.0e-8));
    }
}
