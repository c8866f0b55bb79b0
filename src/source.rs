/*!
 * Read the two data sources from CSV.
 *
 * Rows that are too short or that have coordinates which are not finite numbers are skipped, they
 * never reach the linkage. What happens to a row with a bad measurement value depends on the
 * [ValuePolicy]. The files are not required to be UTF-8, text fields that aren't are decoded
 * lossily.
 */
use crate::{
    record::{PrimaryRecord, SecondaryRecord, Source},
    FlareJoinResult,
};
use log::warn;
use std::{
    fmt::{self, Display},
    fs::File,
    io::Read,
    path::Path,
};
use strum::{EnumString, IntoStaticStr};

const PRIMARY_FIELDS: usize = 10;
const SECONDARY_FIELDS: usize = 12;

/// What to do with a row whose measurement value can't be parsed as a number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumString, IntoStaticStr)]
#[strum(ascii_case_insensitive)]
pub enum ValuePolicy {
    /// Keep the row with a value of zero. This can bias averages low.
    #[default]
    #[strum(serialize = "zero")]
    DefaultToZero,
    /// Drop the row.
    #[strum(serialize = "skip")]
    SkipRow,
}

impl Display for ValuePolicy {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        write!(f, "{}", Into::<&'static str>::into(*self))
    }
}

/// Tally of what happened to the rows of a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SourceSummary {
    /// Data rows read, not counting the header.
    pub rows_read: usize,
    /// Rows turned into records.
    pub rows_kept: usize,
    /// Rows with too few fields.
    pub short_rows: usize,
    /// Rows with a latitude or longitude that is not a finite number.
    pub bad_coordinates: usize,
    /// Rows whose measurement value was replaced with zero.
    pub defaulted_values: usize,
    /// Rows dropped because of their measurement value.
    pub skipped_values: usize,
}

impl SourceSummary {
    fn log_problems(&self, source: Source) {
        let skipped = self.short_rows + self.bad_coordinates + self.skipped_values;
        if skipped > 0 {
            warn!(
                "{} source: skipped {} of {} rows ({} short, {} bad coordinates, {} bad values)",
                source,
                skipped,
                self.rows_read,
                self.short_rows,
                self.bad_coordinates,
                self.skipped_values
            );
        }

        if self.defaulted_values > 0 {
            warn!(
                "{} source: {} unparsable values replaced with zero",
                source, self.defaulted_values
            );
        }
    }
}

/// Parse a numeric field. NaN and infinities are treated as unparsable.
fn number(row: &csv::ByteRecord, col: usize) -> Option<f64> {
    std::str::from_utf8(&row[col])
        .ok()
        .and_then(|txt| txt.trim().parse::<f64>().ok())
        .filter(|val| val.is_finite())
}

/// Split a row into its coordinates and measurement, or record why it can't be used.
fn parse_numbers(
    row: &csv::ByteRecord,
    lat_col: usize,
    lon_col: usize,
    value_col: usize,
    policy: ValuePolicy,
    summary: &mut SourceSummary,
) -> Option<(f64, f64, f64)> {
    let (lat, lon) = match (number(row, lat_col), number(row, lon_col)) {
        (Some(lat), Some(lon)) => (lat, lon),
        _ => {
            summary.bad_coordinates += 1;
            return None;
        }
    };

    let value = match (number(row, value_col), policy) {
        (Some(v), _) => v,
        (None, ValuePolicy::DefaultToZero) => {
            summary.defaulted_values += 1;
            0.0
        }
        (None, ValuePolicy::SkipRow) => {
            summary.skipped_values += 1;
            return None;
        }
    };

    Some((lat, lon, value))
}

fn csv_reader<R: Read>(rdr: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(rdr)
}

/// Trim leading whitespace from every field, the way the files were written.
fn field(row: &csv::ByteRecord, col: usize) -> String {
    String::from_utf8_lossy(&row[col]).trim_start().to_owned()
}

/**
 * Read the site inventory.
 *
 * Columns: country, latitude, longitude, bcm, MMscfd, year, field type, location, flare level,
 * flaring volume.
 */
pub fn read_primary<R: Read>(
    rdr: R,
    policy: ValuePolicy,
) -> FlareJoinResult<(Vec<PrimaryRecord>, SourceSummary)> {
    let mut summary = SourceSummary::default();
    let mut records = vec![];

    for row in csv_reader(rdr).byte_records() {
        let row = row?;
        summary.rows_read += 1;

        if row.len() < PRIMARY_FIELDS {
            summary.short_rows += 1;
            continue;
        }

        let (lat, lon, volume) = match parse_numbers(&row, 1, 2, 9, policy, &mut summary) {
            Some(nums) => nums,
            None => continue,
        };

        records.push(PrimaryRecord {
            country: field(&row, 0),
            lat,
            lon,
            bcm: field(&row, 3),
            mmscfd: field(&row, 4),
            year: field(&row, 5),
            field_type: field(&row, 6),
            location: field(&row, 7),
            flare_level: field(&row, 8),
            volume,
        });
        summary.rows_kept += 1;
    }

    summary.log_problems(Source::Primary);
    Ok((records, summary))
}

/// Read the site inventory from a file.
pub fn read_primary_file<P: AsRef<Path>>(
    path: P,
    policy: ValuePolicy,
) -> FlareJoinResult<(Vec<PrimaryRecord>, SourceSummary)> {
    let f = File::open(path.as_ref())?;
    read_primary(f, policy)
}

/**
 * Read the satellite flare survey.
 *
 * Columns: country name, country ISO code, catalog id, id number, latitude, longitude, flare
 * volume, average temperature, ellipticity, detection frequency, clear observations, flare type.
 */
pub fn read_secondary<R: Read>(
    rdr: R,
    policy: ValuePolicy,
) -> FlareJoinResult<(Vec<SecondaryRecord>, SourceSummary)> {
    let mut summary = SourceSummary::default();
    let mut records = vec![];

    for row in csv_reader(rdr).byte_records() {
        let row = row?;
        summary.rows_read += 1;

        if row.len() < SECONDARY_FIELDS {
            summary.short_rows += 1;
            continue;
        }

        let (lat, lon, volume) = match parse_numbers(&row, 4, 5, 6, policy, &mut summary) {
            Some(nums) => nums,
            None => continue,
        };

        records.push(SecondaryRecord {
            country_name: field(&row, 0),
            country_iso: field(&row, 1),
            catalog_id: field(&row, 2),
            id_number: field(&row, 3),
            lat,
            lon,
            volume,
            avg_temp: field(&row, 7),
            ellipticity: field(&row, 8),
            detection_freq: field(&row, 9),
            clear_obs: field(&row, 10),
            flare_type: field(&row, 11),
        });
        summary.rows_kept += 1;
    }

    summary.log_problems(Source::Secondary);
    Ok((records, summary))
}

/// Read the satellite flare survey from a file.
pub fn read_secondary_file<P: AsRef<Path>>(
    path: P,
    policy: ValuePolicy,
) -> FlareJoinResult<(Vec<SecondaryRecord>, SourceSummary)> {
    let f = File::open(path.as_ref())?;
    read_secondary(f, policy)
}

#[cfg(test)]
mod test {
    use super::*;

    const PRIMARY_CSV: &str = "\
COUNTRY,Latitude,Longitude,bcm,MMscfd,Year,Field Type,Location,Flare Level,Flaring Vol (million m3)
Algeria, 31.6536, 6.0739,0.05,4.8,2019,OIL,ONSHORE,UPSTREAM,50.1
Algeria,31.6540,6.0741,0.04,3.9,2018,OIL,ONSHORE,UPSTREAM,40.3
Algeria,not-a-lat,6.0741,0.04,3.9,2018,OIL,ONSHORE,UPSTREAM,40.3
Algeria,31.0,6.0,0.04,3.9,2019,GAS,ONSHORE,UPSTREAM,n/a
Algeria,31.0,6.0
";

    const SECONDARY_CSV: &str = "\
cntry_name,cntry_iso,catalog_id,id_number,latitude,longitude,flr_volume,avg_temp,ellip,dtc_freq,clr_obs,flr_type
Algeria,DZA,VNF_e2015_DZA_1,1,31.6538,6.0740,0.045,1800,1.3,0.9,120,upstream
Algeria,DZA,VNF_e2015_DZA_2,2,31.0,6.0,,1700,1.1,0.5,100,upstream
Algeria,DZA,VNF_e2015_DZA_3,3,31.0,,0.01,1700,1.1,0.5,100,upstream
";

    #[test]
    fn test_read_primary_default_to_zero() {
        let (recs, summary) =
            read_primary(PRIMARY_CSV.as_bytes(), ValuePolicy::DefaultToZero).unwrap();

        assert_eq!(summary.rows_read, 5);
        assert_eq!(summary.rows_kept, 3);
        assert_eq!(summary.short_rows, 1);
        assert_eq!(summary.bad_coordinates, 1);
        assert_eq!(summary.defaulted_values, 1);

        assert_eq!(recs[0].country, "Algeria");
        assert!((recs[0].lat - 31.6536).abs() < 1.0e-12);
        assert!((recs[0].lon - 6.0739).abs() < 1.0e-12);
        assert_eq!(recs[0].year, "2019");
        assert_eq!(recs[0].field_type, "OIL");
        assert!((recs[0].volume - 50.1).abs() < 1.0e-12);

        assert_eq!(recs[2].volume, 0.0);
        assert_eq!(recs[2].field_type, "GAS");
    }

    #[test]
    fn test_read_primary_skip_bad_values() {
        let (recs, summary) = read_primary(PRIMARY_CSV.as_bytes(), ValuePolicy::SkipRow).unwrap();

        assert_eq!(recs.len(), 2);
        assert_eq!(summary.skipped_values, 1);
        assert_eq!(summary.defaulted_values, 0);
    }

    #[test]
    fn test_read_secondary() {
        let (recs, summary) =
            read_secondary(SECONDARY_CSV.as_bytes(), ValuePolicy::DefaultToZero).unwrap();

        assert_eq!(summary.rows_read, 3);
        assert_eq!(recs.len(), 2);
        assert_eq!(summary.bad_coordinates, 1);

        assert_eq!(recs[0].catalog_id, "VNF_e2015_DZA_1");
        assert_eq!(recs[0].country_iso, "DZA");
        assert!((recs[0].volume - 0.045).abs() < 1.0e-12);
        assert_eq!(recs[0].flare_type, "upstream");
        assert_eq!(recs[1].volume, 0.0);
    }

    #[test]
    fn test_read_primary_non_utf8_row() {
        let mut csv: Vec<u8> = vec![];
        csv.extend_from_slice(PRIMARY_CSV.lines().next().unwrap().as_bytes());
        csv.extend_from_slice(b"\nAlgeria,31.0,6.0,0.01,1.0,2019,OIL,ONSHORE,UPSTREAM,1.0\n");
        csv.extend_from_slice(b"C\xf4te d'Ivoire,5.0,-4.0,0.01,1.0,2019,OIL,OFFSHORE,UPSTREAM,2.0\n");
        csv.extend_from_slice(b"Algeria,28.0,9.0,0.01,1.0,2019,GAS,ONSHORE,UPSTREAM,3.0\n");

        let (recs, summary) = read_primary(csv.as_slice(), ValuePolicy::DefaultToZero).unwrap();

        assert_eq!(summary.rows_read, 3);
        assert_eq!(recs.len(), 3);
        assert_eq!(recs[0].country, "Algeria");
        assert_eq!(recs[1].country, "C\u{FFFD}te d'Ivoire");
        assert_eq!(recs[1].location, "OFFSHORE");
        assert!((recs[1].volume - 2.0).abs() < 1.0e-12);
        assert_eq!(recs[2].country, "Algeria");
    }

    #[test]
    fn test_read_secondary_non_utf8_number() {
        let mut csv: Vec<u8> = SECONDARY_CSV.lines().next().unwrap().as_bytes().to_vec();
        csv.extend_from_slice(b"\nAlgeria,DZA,A,1,31.0,6.0,0.5,1800,1.0,0.5,100,upstream\n");
        csv.extend_from_slice(b"Algeria,DZA,B,2,3\xff.0,6.0,0.5,1800,1.0,0.5,100,upstream\n");
        csv.extend_from_slice(b"Algeria,DZA,C,3,29.0,6.0,1\xff,1800,1.0,0.5,100,upstream\n");

        let (recs, summary) = read_secondary(csv.as_slice(), ValuePolicy::SkipRow).unwrap();

        assert_eq!(summary.rows_read, 3);
        assert_eq!(summary.bad_coordinates, 1);
        assert_eq!(summary.skipped_values, 1);
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].catalog_id, "A");
    }

    #[test]
    fn test_non_finite_numbers_rejected() {
        let csv = "\
COUNTRY,Latitude,Longitude,bcm,MMscfd,Year,Field Type,Location,Flare Level,Flaring Vol (million m3)
Algeria,NaN,inf,0.01,1.0,2019,OIL,ONSHORE,UPSTREAM,1.0
Algeria,31.0,-infinity,0.01,1.0,2019,OIL,ONSHORE,UPSTREAM,1.0
Algeria,31.0,6.0,0.01,1.0,2019,OIL,ONSHORE,UPSTREAM,nan
Algeria,31.0,6.0,0.01,1.0,2019,OIL,ONSHORE,UPSTREAM,4.0
";

        let (recs, summary) = read_primary(csv.as_bytes(), ValuePolicy::DefaultToZero).unwrap();

        assert_eq!(summary.bad_coordinates, 2);
        assert_eq!(summary.defaulted_values, 1);
        assert_eq!(recs.len(), 2);
        assert!(recs.iter().all(|rec| rec.lat.is_finite() && rec.lon.is_finite()));
        assert_eq!(recs[0].volume, 0.0);
        assert!((recs[1].volume - 4.0).abs() < 1.0e-12);
    }

    #[test]
    fn test_value_policy_parsing() {
        assert_eq!("zero".parse::<ValuePolicy>().unwrap(), ValuePolicy::DefaultToZero);
        assert_eq!("SKIP".parse::<ValuePolicy>().unwrap(), ValuePolicy::SkipRow);
        assert!("drop".parse::<ValuePolicy>().is_err());
        assert_eq!(ValuePolicy::SkipRow.to_string(), "skip");
        assert_eq!(ValuePolicy::default(), ValuePolicy::DefaultToZero);
    }
}
