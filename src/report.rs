/*!
 * The narrative text report of a run.
 */
use crate::{
    analysis::{Analysis, Exploration},
    record::{PrimaryRecord, SecondaryRecord, Source},
    regression::Regression,
};
use chrono::{DateTime, Utc};
use std::fmt::{self, Display};

/// Number of example records shown for each source.
const SAMPLE_SIZE: usize = 3;

const RULE: &str = "-------------------------------------------------";

/// A rendering of an [Analysis] along with the context it was run in.
pub struct Report<'a> {
    analysis: &'a Analysis,
    primary_name: &'a str,
    secondary_name: &'a str,
    primary_sample: &'a [PrimaryRecord],
    secondary_sample: &'a [SecondaryRecord],
    generated: DateTime<Utc>,
}

impl<'a> Report<'a> {
    /**
     * Prepare a report.
     *
     * #Arguments
     * analysis - the results of the run.
     * primary_name, secondary_name - how to refer to the inputs, usually the file names.
     * primary, secondary - the full inputs, the first few records are shown as a sample.
     * generated - the time stamp for the report header.
     */
    pub fn new(
        analysis: &'a Analysis,
        primary_name: &'a str,
        secondary_name: &'a str,
        primary: &'a [PrimaryRecord],
        secondary: &'a [SecondaryRecord],
        generated: DateTime<Utc>,
    ) -> Self {
        Report {
            analysis,
            primary_name,
            secondary_name,
            primary_sample: &primary[..primary.len().min(SAMPLE_SIZE)],
            secondary_sample: &secondary[..secondary.len().min(SAMPLE_SIZE)],
            generated,
        }
    }
}

fn fmt_exploration(
    f: &mut fmt::Formatter,
    source: Source,
    exploration: &Exploration,
) -> Result<(), fmt::Error> {
    writeln!(f, "{} Flaring Volume Summary:", source)?;
    writeln!(f, "  {}", exploration.stats)?;
    writeln!(f)?;
    writeln!(f, "{} Flaring Volume Histogram:", source)?;
    match exploration.histogram {
        Some(ref hist) => write!(f, "{}", hist),
        None => writeln!(f, "No data to display histogram."),
    }
}

fn fmt_primary(f: &mut fmt::Formatter, rec: &PrimaryRecord) -> Result<(), fmt::Error> {
    writeln!(
        f,
        "  {} ({:.6}, {:.6}) year={} type={} location={} level={} volume={:.3}",
        rec.country,
        rec.lat,
        rec.lon,
        rec.year,
        rec.field_type,
        rec.location,
        rec.flare_level,
        rec.volume
    )
}

fn fmt_secondary(f: &mut fmt::Formatter, rec: &SecondaryRecord) -> Result<(), fmt::Error> {
    writeln!(
        f,
        "  {} [{}] {} ({:.6}, {:.6}) volume={:.3} temp={} type={}",
        rec.country_name,
        rec.country_iso,
        rec.catalog_id,
        rec.lat,
        rec.lon,
        rec.volume,
        rec.avg_temp,
        rec.flare_type
    )
}

impl<'a> Display for Report<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        let an = self.analysis;
        let cfg = &an.config;
        let threshold_km = an.clusters.config().threshold_km;

        writeln!(
            f,
            "Flaring site join, generated {}",
            self.generated.format("%Y-%m-%d %H:%M:%S UTC")
        )?;
        writeln!(f)?;

        writeln!(f, "Step 1: Data Exploration")?;
        writeln!(f, "{}", RULE)?;
        writeln!(
            f,
            "Primary file ({}) loaded with {} records.",
            self.primary_name, an.primary_count
        )?;
        writeln!(f, "Sample primary records:")?;
        for rec in self.primary_sample {
            fmt_primary(f, rec)?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "Secondary file ({}) loaded with {} records.",
            self.secondary_name, an.secondary_count
        )?;
        writeln!(f, "Sample secondary records:")?;
        for rec in self.secondary_sample {
            fmt_secondary(f, rec)?;
        }

        writeln!(f)?;
        writeln!(f, "Step 1.1: Summary Statistics and Visualisations")?;
        writeln!(f, "{}", RULE)?;
        fmt_exploration(f, Source::Primary, &an.primary_exploration)?;
        writeln!(f)?;
        fmt_exploration(f, Source::Secondary, &an.secondary_exploration)?;

        writeln!(f)?;
        writeln!(f, "Step 2: Filtering for {}", cfg.country)?;
        writeln!(
            f,
            "Filtered primary records: {} records from {}.",
            an.filtered_primary_count, cfg.country
        )?;
        writeln!(
            f,
            "Filtered secondary records: {} records from {}.",
            an.filtered_secondary_count, cfg.country
        )?;

        writeln!(f)?;
        writeln!(
            f,
            "Step 3: Clustering and Joining Data ({:.1} km threshold)",
            threshold_km
        )?;
        writeln!(f, "Number of clusters formed: {}", an.cluster_count())?;
        writeln!(
            f,
            "Number of dangling secondary records (no matching primary cluster): {}",
            an.dangling_count()
        )?;

        writeln!(f)?;
        writeln!(f, "Step 4: Exploring and Handling Dangling Rows")?;
        writeln!(
            f,
            "Number of clusters with {} primary and secondary data: {}",
            cfg.target_year,
            an.combined_rows().len()
        )?;
        writeln!(
            f,
            "Clusters without {} primary data: {}, without secondary data: {}",
            cfg.target_year, an.aggregation.missing_target_year, an.aggregation.missing_secondary
        )?;
        writeln!(
            f,
            concat!(
                "Strategy for dangling rows: the primary source is definitive. Any secondary ",
                "record not within {:.1} km of a primary cluster is flagged as dangling and ",
                "omitted from the regression."
            ),
            threshold_km
        )?;

        writeln!(f)?;
        writeln!(f, "Step 5: Regression Model")?;
        if let Regression::Fit(_) = an.regression {
            writeln!(
                f,
                "Regression Model (Predicting primary {} Flaring Volume):",
                cfg.target_year
            )?;
        }
        write!(f, "{}", an.regression)?;

        writeln!(f)?;
        writeln!(f, "Step 6: Observations")?;
        match an.regression {
            Regression::Fit(res) => {
                if res.slope == 0.0 {
                    writeln!(
                        f,
                        "  - Across {} clusters, the primary {} volume shows no change with the secondary volume.",
                        res.points, cfg.target_year
                    )?;
                } else {
                    let direction = if res.slope > 0.0 { "higher" } else { "lower" };
                    writeln!(
                        f,
                        "  - Across {} clusters, sites with a larger secondary volume tend to have a {} primary {} volume.",
                        res.points, direction, cfg.target_year
                    )?;
                }
                if let Some(r2) = res.r_squared {
                    writeln!(
                        f,
                        "  - The secondary volume explains {:.1}% of the variance in the primary volume.",
                        r2 * 100.0
                    )?;
                }
                writeln!(
                    f,
                    "  - Clustering and measurement error leave some variation that may be due to unobserved factors or changes in reporting."
                )
            }
            _ => writeln!(
                f,
                "  - No relationship between the sources can be estimated from this data."
            ),
        }
    }
}
