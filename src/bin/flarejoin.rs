use clap::Parser;
use flarejoin::{
    read_primary_file, read_secondary_file, write_combined_file, write_dangling_file, Analysis,
    AnalysisConfig, FlareJoinError, FlareJoinResult, LinkageConfig, Regression, Report,
    ValuePolicy,
};
use log::{info, warn, LevelFilter};
use simple_logger::SimpleLogger;
use std::{
    fmt::{self, Display},
    path::PathBuf,
};

const COMBINED_FILE: &str = "combined_dataset.csv";
const DANGLING_FILE: &str = "dangling_secondary.csv";
const REPORT_FILE: &str = "analysis_results.txt";

/*-------------------------------------------------------------------------------------------------
 *                                     Command Line Options
 *-----------------------------------------------------------------------------------------------*/

///
/// Join a flaring site inventory with a satellite flare survey.
///
/// Sites from the inventory within a few kilometers of each other are grouped into clusters,
/// survey detections are attached to the nearest cluster, and a regression is fit between the
/// survey volume and the inventory volume for the target year.
///
#[derive(Debug, Parser)]
#[clap(bin_name = "flarejoin")]
#[clap(author, version, about)]
struct FlareJoinOptionsInit {
    /// The path to the site inventory CSV file.
    ///
    /// If this is not specified, then the program will check for it in the "FLARE_PRIMARY_CSV"
    /// environment variable.
    #[clap(short, long)]
    #[clap(env = "FLARE_PRIMARY_CSV")]
    primary_file: PathBuf,

    /// The path to the satellite flare survey CSV file.
    ///
    /// If this is not specified, then the program will check for it in the
    /// "FLARE_SECONDARY_CSV" environment variable.
    #[clap(short, long)]
    #[clap(env = "FLARE_SECONDARY_CSV")]
    secondary_file: PathBuf,

    /// Only records from this country are joined. Case is ignored.
    #[clap(short, long)]
    #[clap(default_value = "Algeria")]
    country: String,

    /// Inventory records from this year are averaged for the regression.
    #[clap(short, long)]
    #[clap(default_value = "2019")]
    year: String,

    /// Records closer than this many kilometers to a cluster centroid join the cluster.
    #[clap(short, long)]
    #[clap(default_value_t = 3.0)]
    threshold_km: f64,

    /// Number of bins in the histograms of the report.
    #[clap(short, long)]
    #[clap(default_value_t = 10)]
    bins: usize,

    /// What to do with rows whose volume is not a number, "zero" keeps them with a volume of
    /// zero and "skip" drops them.
    #[clap(long)]
    #[clap(default_value = "zero")]
    value_policy: ValuePolicy,

    /// Directory to write the joined data set, dangling records, and report to.
    ///
    /// If this is not specified, the current directory is used.
    #[clap(short, long)]
    output_dir: Option<PathBuf>,

    /// Verbose output
    #[clap(short, long)]
    verbose: bool,
}

#[derive(Debug)]
struct FlareJoinOptionsChecked {
    /// The path to the site inventory.
    primary_file: PathBuf,

    /// The path to the flare survey.
    secondary_file: PathBuf,

    /// Where output files go.
    output_dir: PathBuf,

    /// Parameters for the analysis.
    config: AnalysisConfig,

    /// Handling of bad volume values.
    value_policy: ValuePolicy,

    /// Verbose output
    verbose: bool,
}

impl Display for FlareJoinOptionsChecked {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        writeln!(f, "\n")?; // yes, two blank lines.
        writeln!(f, "    Primary: {}", self.primary_file.display())?;
        writeln!(f, "  Secondary: {}", self.secondary_file.display())?;
        writeln!(f, " Output Dir: {}", self.output_dir.display())?;
        writeln!(f, "    Country: {}", self.config.country)?;
        writeln!(f, "       Year: {}", self.config.target_year)?;
        writeln!(f, "  Threshold: {:.3} km", self.config.linkage.threshold_km)?;
        writeln!(f, "       Bins: {}", self.config.histogram_bins)?;
        writeln!(f, "Bad Volumes: {}", self.value_policy)?;
        writeln!(f, "\n")?; // yes, two blank lines.

        Ok(())
    }
}

/// Get the command line arguments and check them.
///
/// If there is missing data, try to fill it in with environment variables.
fn parse_args() -> FlareJoinResult<FlareJoinOptionsChecked> {
    let FlareJoinOptionsInit {
        primary_file,
        secondary_file,
        country,
        year,
        threshold_km,
        bins,
        value_policy,
        output_dir,
        verbose,
    } = FlareJoinOptionsInit::parse();

    let linkage = LinkageConfig::new(threshold_km)?;

    if bins == 0 {
        return Err(Box::new(FlareJoinError {
            msg: "the number of histogram bins must be at least 1",
        }));
    }

    let output_dir = output_dir.unwrap_or_else(|| PathBuf::from("."));
    std::fs::create_dir_all(&output_dir)?;

    let config = AnalysisConfig {
        country,
        target_year: year,
        linkage,
        histogram_bins: bins,
    };

    Ok(FlareJoinOptionsChecked {
        primary_file,
        secondary_file,
        output_dir,
        config,
        value_policy,
        verbose,
    })
}

/*-------------------------------------------------------------------------------------------------
 *                                             MAIN
 *-----------------------------------------------------------------------------------------------*/
fn main() -> FlareJoinResult<()> {
    let opts = parse_args()?;

    let crate_level = if opts.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    SimpleLogger::new()
        .with_level(LevelFilter::Info)
        .with_module_level("flarejoin", crate_level)
        .init()?;

    if opts.verbose {
        info!("{}", opts);
    }

    //
    // Load the data.
    //
    let (primary, primary_summary) = read_primary_file(&opts.primary_file, opts.value_policy)?;
    info!(
        "loaded {} of {} primary rows from {}",
        primary_summary.rows_kept,
        primary_summary.rows_read,
        opts.primary_file.display()
    );

    let (secondary, secondary_summary) =
        read_secondary_file(&opts.secondary_file, opts.value_policy)?;
    info!(
        "loaded {} of {} secondary rows from {}",
        secondary_summary.rows_kept,
        secondary_summary.rows_read,
        opts.secondary_file.display()
    );

    //
    // Join and fit.
    //
    let analysis = Analysis::run(&primary, &secondary, opts.config.clone())?;

    match analysis.regression {
        Regression::Fit(res) => info!(
            "fit {} clusters, slope {:.6} intercept {:.6}",
            res.points, res.slope, res.intercept
        ),
        Regression::InsufficientData { points } => {
            warn!("only {} clusters with data from both sources, no regression", points)
        }
        Regression::Degenerate { points } => {
            warn!("{} clusters, but no variance in the secondary volume", points)
        }
    }

    //
    // Output
    //
    let combined_path = opts.output_dir.join(COMBINED_FILE);
    write_combined_file(
        &combined_path,
        analysis.combined_rows(),
        &opts.config.target_year,
    )?;
    info!("combined data set saved as {}", combined_path.display());

    let dangling_path = opts.output_dir.join(DANGLING_FILE);
    write_dangling_file(&dangling_path, analysis.dangling())?;
    info!("dangling secondary records saved as {}", dangling_path.display());

    let primary_name = opts.primary_file.display().to_string();
    let secondary_name = opts.secondary_file.display().to_string();
    let report = Report::new(
        &analysis,
        &primary_name,
        &secondary_name,
        &primary,
        &secondary,
        chrono::Utc::now(),
    )
    .to_string();

    println!("{}", report);

    let report_path = opts.output_dir.join(REPORT_FILE);
    std::fs::write(&report_path, &report)?;
    info!("report saved as {}", report_path.display());

    Ok(())
}
