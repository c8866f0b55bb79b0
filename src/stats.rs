/*!
 * Descriptive statistics for exploring the measurement values of each source.
 */
use std::fmt::{self, Display};

/// Longest bar drawn by [Histogram]'s `Display` implementation.
const MAX_BAR_WIDTH: usize = 50;

/**
 * Count, extremes, and central tendency of a sequence of values.
 *
 * An empty sequence yields all zeros. That is "no data", not an error, check
 * [SummaryStats::is_empty].
 */
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SummaryStats {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    /// Population standard deviation, the squared deviations are divided by `count`.
    pub std_dev: f64,
}

impl SummaryStats {
    /// Calculate the statistics. The input is not reordered.
    pub fn from_values(values: &[f64]) -> Self {
        let count = values.len();
        if count == 0 {
            return Self::default();
        }

        let (min, max, sum) = values.iter().fold(
            (values[0], values[0], 0.0),
            |(min, max, sum), &v| (min.min(v), max.max(v), sum + v),
        );
        let mean = sum / count as f64;

        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);
        let median = if count % 2 == 1 {
            sorted[count / 2]
        } else {
            (sorted[count / 2 - 1] + sorted[count / 2]) / 2.0
        };

        let variance = values
            .iter()
            .map(|v| (v - mean) * (v - mean))
            .sum::<f64>()
            / count as f64;

        SummaryStats {
            count,
            min,
            max,
            mean,
            median,
            std_dev: variance.sqrt(),
        }
    }

    /// Was there any data?
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

impl Display for SummaryStats {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        write!(
            f,
            "Count: {}, Min: {:.2}, Max: {:.2}, Mean: {:.2}, Median: {:.2}, StdDev: {:.2}",
            self.count, self.min, self.max, self.mean, self.median, self.std_dev
        )
    }
}

/// Counts of values in equal width bins spanning the observed range.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    min: f64,
    bin_width: f64,
    counts: Vec<usize>,
}

impl Histogram {
    /**
     * Bin the values.
     *
     * Returns `None` if there are no values or no bins. A value equal to the maximum goes in the
     * last bin. If every value is the same, they all go in the first bin.
     */
    pub fn new(values: &[f64], num_bins: usize) -> Option<Self> {
        if values.is_empty() || num_bins == 0 {
            return None;
        }

        let (min, max) = values
            .iter()
            .fold((values[0], values[0]), |(min, max), &v| (min.min(v), max.max(v)));
        let bin_width = (max - min) / num_bins as f64;

        let mut counts = vec![0; num_bins];
        for &v in values {
            let bin = if bin_width > 0.0 {
                ((v - min) / bin_width) as usize
            } else {
                0
            };
            counts[bin.min(num_bins - 1)] += 1;
        }

        Some(Histogram {
            min,
            bin_width,
            counts,
        })
    }

    /// The number of values in each bin, lowest bin first.
    pub fn counts(&self) -> &[usize] {
        &self.counts
    }

    /// The lower and upper edge of a bin.
    pub fn bin_edges(&self, bin: usize) -> (f64, f64) {
        let lower = self.min + bin as f64 * self.bin_width;
        (lower, lower + self.bin_width)
    }

    /// Length of the bar for each bin, scaled so the fullest bin gets `max_width`.
    pub fn bar_lengths(&self, max_width: usize) -> Vec<usize> {
        let max_count = self.counts.iter().copied().max().unwrap_or(0);
        self.counts
            .iter()
            .map(|&c| if max_count > 0 { c * max_width / max_count } else { 0 })
            .collect()
    }
}

impl Display for Histogram {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        for (bin, (count, bar)) in self
            .counts
            .iter()
            .zip(self.bar_lengths(MAX_BAR_WIDTH))
            .enumerate()
        {
            let (lower, upper) = self.bin_edges(bin);
            writeln!(
                f,
                "[{:6.2} - {:6.2}]: {:3} | {}",
                lower,
                upper,
                count,
                "*".repeat(bar)
            )?;
        }

        Ok(())
    }
}
