/*!
 * The typed rows supplied by the two data sources.
 *
 * Records are immutable once parsed. The same physical site can show up many times in the
 * primary source, once for every year it was reported. The secondary source is a single survey,
 * so it has no year dimension at all.
 */
use crate::geo::{Coord, Geo};

/// The two data sources being reconciled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum Source {
    /// The site inventory, treated as the definitive location and current year volume.
    Primary,
    /// The satellite flare survey, a single epoch snapshot.
    Secondary,
}

/// A single site-year observation from the site inventory.
#[derive(Debug, Clone, PartialEq)]
pub struct PrimaryRecord {
    pub country: String,
    pub lat: f64,
    pub lon: f64,
    /// Billion cubic meters, kept as text.
    pub bcm: String,
    /// Million standard cubic feet per day, kept as text.
    pub mmscfd: String,
    /// Year tag of the observation, e.g. "2019".
    pub year: String,
    pub field_type: String,
    pub location: String,
    pub flare_level: String,
    /// Flaring volume in million cubic meters.
    pub volume: f64,
}

impl PrimaryRecord {
    /// Is this observation tagged with the given year? Surrounding whitespace is ignored.
    pub fn is_year(&self, year: &str) -> bool {
        self.year.trim() == year.trim()
    }
}

impl Geo for PrimaryRecord {
    fn centroid(&self) -> Coord {
        Coord {
            lat: self.lat,
            lon: self.lon,
        }
    }
}

/// A single flare detected by the satellite survey.
#[derive(Debug, Clone, PartialEq)]
pub struct SecondaryRecord {
    pub country_name: String,
    pub country_iso: String,
    pub catalog_id: String,
    pub id_number: String,
    pub lat: f64,
    pub lon: f64,
    /// Estimated flare volume.
    pub volume: f64,
    /// Average temperature, Kelvin, kept as text.
    pub avg_temp: String,
    pub ellipticity: String,
    /// Detection frequency.
    pub detection_freq: String,
    /// Number of cloud free observations.
    pub clear_obs: String,
    pub flare_type: String,
}

impl Geo for SecondaryRecord {
    fn centroid(&self) -> Coord {
        Coord {
            lat: self.lat,
            lon: self.lon,
        }
    }
}

/// Anything that can be attributed to a country.
pub trait CountryTagged {
    fn country(&self) -> &str;
}

impl CountryTagged for PrimaryRecord {
    fn country(&self) -> &str {
        &self.country
    }
}

impl CountryTagged for SecondaryRecord {
    fn country(&self) -> &str {
        &self.country_name
    }
}

/// Keep only the records from `country`, compared without regard to case. Order is preserved.
pub fn filter_country<T: CountryTagged + Clone>(records: &[T], country: &str) -> Vec<T> {
    let country = country.trim();
    records
        .iter()
        .filter(|rec| rec.country().trim().eq_ignore_ascii_case(country))
        .cloned()
        .collect()
}
