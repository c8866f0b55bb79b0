/*!
 * Write the joined data set and the dangling records as CSV.
 *
 * Floating point columns are written with 6 decimal places.
 */
use crate::{aggregate::CombinedRow, record::SecondaryRecord, FlareJoinResult};
use std::{fs::File, io::Write, path::Path};

/// Write one row per retained cluster.
pub fn write_combined<W: Write>(
    wtr: W,
    rows: &[CombinedRow],
    target_year: &str,
) -> FlareJoinResult<()> {
    let mut wtr = csv::Writer::from_writer(wtr);

    wtr.write_record(&[
        "ClusterID".to_owned(),
        "AvgLat".to_owned(),
        "AvgLon".to_owned(),
        format!("PrimaryVolume{}", target_year.trim()),
        "SecondaryVolume".to_owned(),
    ])?;

    for row in rows {
        wtr.write_record(&[
            row.cluster_id.to_string(),
            format!("{:.6}", row.centroid.lat),
            format!("{:.6}", row.centroid.lon),
            format!("{:.6}", row.primary_volume),
            format!("{:.6}", row.secondary_volume),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Write the combined rows to a file at `path`, replacing it if it exists.
pub fn write_combined_file<P: AsRef<Path>>(
    path: P,
    rows: &[CombinedRow],
    target_year: &str,
) -> FlareJoinResult<()> {
    let f = File::create(path.as_ref())?;
    write_combined(f, rows, target_year)
}

/// Write the secondary records that could not be linked with all of their attributes.
pub fn write_dangling<W: Write>(wtr: W, dangling: &[SecondaryRecord]) -> FlareJoinResult<()> {
    let mut wtr = csv::Writer::from_writer(wtr);

    wtr.write_record(&[
        "CntryName",
        "CntryIso",
        "CatalogID",
        "IDNumber",
        "Latitude",
        "Longitude",
        "FlrVolume",
        "AvgTemp",
        "Ellip",
        "DtcFreq",
        "ClrObs",
        "FlrType",
    ])?;

    for rec in dangling {
        wtr.write_record(&[
            rec.country_name.as_str(),
            rec.country_iso.as_str(),
            rec.catalog_id.as_str(),
            rec.id_number.as_str(),
            format!("{:.6}", rec.lat).as_str(),
            format!("{:.6}", rec.lon).as_str(),
            format!("{:.6}", rec.volume).as_str(),
            rec.avg_temp.as_str(),
            rec.ellipticity.as_str(),
            rec.detection_freq.as_str(),
            rec.clear_obs.as_str(),
            rec.flare_type.as_str(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Write the dangling records to a file at `path`, replacing it if it exists.
pub fn write_dangling_file<P: AsRef<Path>>(
    path: P,
    dangling: &[SecondaryRecord],
) -> FlareJoinResult<()> {
    let f = File::create(path.as_ref())?;
    write_dangling(f, dangling)
}
