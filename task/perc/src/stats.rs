use std::fmt::{self, Display};

use rand::{rngs::StdRng, Rng, SeedableRng};
use rayon::prelude::*;

use crate::{Error, Percolation, Result};

////////////////////////////////////////////////////////////////////////////////

/// Two-sided 95% quantile of the standard normal distribution.
const CONFIDENCE_95: f64 = 1.96;

/// Parameters of a Monte Carlo run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EstimatorConfig {
    pub grid_size: usize,
    pub trials: usize,
    /// Makes the run reproducible. Without it every run draws fresh samples.
    pub seed: Option<u64>,
    /// Spread trials over the rayon thread pool.
    pub parallel: bool,
}

impl EstimatorConfig {
    pub fn new(grid_size: usize, trials: usize) -> Self {
        Self {
            grid_size,
            trials,
            seed: None,
            parallel: true,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    fn validate(&self) -> Result<()> {
        validate(self.grid_size, self.trials)
    }
}

fn validate(grid_size: usize, trials: usize) -> Result<()> {
    if grid_size == 0 {
        return Err(Error::InvalidArgument(
            "grid size must be positive".to_string(),
        ));
    }
    if trials == 0 {
        return Err(Error::InvalidArgument(
            "number of trials must be positive".to_string(),
        ));
    }
    Ok(())
}

////////////////////////////////////////////////////////////////////////////////

/// Opens uniformly random sites of a fresh `n`-by-`n` grid until it
/// percolates and returns the fraction of open sites.
///
/// Picking an already open site is allowed and costs one extra draw.
pub fn run_trial<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Result<f64> {
    let mut grid = Percolation::new(n)?;
    while !grid.percolates() {
        let row = rng.gen_range(1..=n);
        let col = rng.gen_range(1..=n);
        grid.open(row, col)?;
    }

    log::debug!(
        "{n}x{n} grid percolated after {} open sites",
        grid.open_site_count()
    );

    Ok(grid.open_site_count() as f64 / (n * n) as f64)
}

////////////////////////////////////////////////////////////////////////////////

/// Estimate of the percolation threshold over a number of independent trials.
#[derive(Debug, Clone, PartialEq)]
pub struct PercolationStats {
    samples: Vec<f64>,
    mean: f64,
    stddev: f64,
    confidence_lo: f64,
    confidence_hi: f64,
}

impl PercolationStats {
    /// Runs `trials` independent experiments on `n`-by-`n` grids using the
    /// thread-local random generator.
    pub fn new(n: usize, trials: usize) -> Result<Self> {
        Self::with_rng(n, trials, &mut rand::thread_rng())
    }

    /// Runs all trials one after another, drawing sites from `rng`.
    pub fn with_rng<R: Rng + ?Sized>(n: usize, trials: usize, rng: &mut R) -> Result<Self> {
        validate(n, trials)?;

        let samples = (0..trials)
            .map(|_| run_trial(n, &mut *rng))
            .collect::<Result<Vec<_>>>()?;

        Self::from_samples(samples)
    }

    /// Runs trials on the rayon thread pool.
    ///
    /// One seed per trial is drawn up front from `seed`, so the result does
    /// not depend on the number of threads or on scheduling.
    pub fn par_with_seed(n: usize, trials: usize, seed: u64) -> Result<Self> {
        validate(n, trials)?;

        let mut seeder = StdRng::seed_from_u64(seed);
        let seeds = (0..trials).map(|_| seeder.gen()).collect::<Vec<u64>>();

        let samples = seeds
            .into_par_iter()
            .map(|seed| run_trial(n, &mut StdRng::seed_from_u64(seed)))
            .collect::<Result<Vec<_>>>()?;

        Self::from_samples(samples)
    }

    pub fn from_config(config: &EstimatorConfig) -> Result<Self> {
        config.validate()?;

        let EstimatorConfig {
            grid_size,
            trials,
            seed,
            parallel,
        } = *config;

        match (parallel, seed) {
            (true, Some(seed)) => Self::par_with_seed(grid_size, trials, seed),
            (true, None) => Self::par_with_seed(grid_size, trials, rand::thread_rng().gen()),
            (false, Some(seed)) => {
                Self::with_rng(grid_size, trials, &mut StdRng::seed_from_u64(seed))
            }
            (false, None) => Self::new(grid_size, trials),
        }
    }

    /// Computes the statistics over already collected open-site fractions.
    ///
    /// With a single sample the standard deviation, and with it both
    /// confidence bounds, is `NaN`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] if `samples` is empty.
    pub fn from_samples(samples: Vec<f64>) -> Result<Self> {
        if samples.is_empty() {
            return Err(Error::InvalidArgument(
                "at least one sample is required".to_string(),
            ));
        }

        let count = samples.len() as f64;
        let mean = samples.iter().sum::<f64>() / count;
        let variance = samples
            .iter()
            .map(|sample| (sample - mean).powi(2))
            .sum::<f64>()
            / (count - 1.0);
        let stddev = variance.sqrt();

        let margin = CONFIDENCE_95 * stddev / count.sqrt();

        log::info!(
            "percolation threshold {mean:.6} (stddev {stddev:.6}) over {} trials",
            samples.len()
        );

        Ok(Self {
            samples,
            mean,
            stddev,
            confidence_lo: mean - margin,
            confidence_hi: mean + margin,
        })
    }

    pub fn trials(&self) -> usize {
        self.samples.len()
    }

    /// Open-site fraction of every trial, in trial order.
    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    /// Sample mean of the percolation threshold.
    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Sample standard deviation of the percolation threshold.
    pub fn stddev(&self) -> f64 {
        self.stddev
    }

    /// Low endpoint of the 95% confidence interval.
    pub fn confidence_lo(&self) -> f64 {
        self.confidence_lo
    }

    /// High endpoint of the 95% confidence interval.
    pub fn confidence_hi(&self) -> f64 {
        self.confidence_hi
    }
}

impl Display for PercolationStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "mean                    = {}", self.mean)?;
        writeln!(f, "stddev                  = {}", self.stddev)?;
        writeln!(
            f,
            "95% confidence interval = [{}, {}]",
            self.confidence_lo, self.confidence_hi
        )
    }
}

////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "{actual} is not close to {expected}"
        );
    }

    #[test]
    fn statistics_over_samples() {
        let stats = PercolationStats::from_samples(vec![0.5, 0.6, 0.7]).unwrap();
        assert_eq!(stats.trials(), 3);
        assert_close(stats.mean(), 0.6);
        assert_close(stats.stddev(), 0.1);

        let margin = 1.96 * 0.1 / 3f64.sqrt();
        assert_close(stats.confidence_lo(), 0.6 - margin);
        assert_close(stats.confidence_hi(), 0.6 + margin);
    }

    #[test]
    fn single_sample_has_nan_stddev() {
        let stats = PercolationStats::from_samples(vec![0.6]).unwrap();
        assert_eq!(stats.mean(), 0.6);
        assert!(stats.stddev().is_nan());
        assert!(stats.confidence_lo().is_nan());
        assert!(stats.confidence_hi().is_nan());
    }

    #[test]
    fn no_samples() {
        assert!(matches!(
            PercolationStats::from_samples(Vec::new()),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn trial_fraction_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            let fraction = run_trial(2, &mut rng).unwrap();
            assert!((0.5..=0.75).contains(&fraction), "{fraction}");
        }
        assert_eq!(run_trial(1, &mut rng), Ok(1.0));
    }

    #[test]
    fn invalid_config() {
        for (grid_size, trials) in [(0, 10), (10, 0), (0, 0)] {
            let config = EstimatorConfig::new(grid_size, trials);
            assert!(matches!(
                PercolationStats::from_config(&config),
                Err(Error::InvalidArgument(_))
            ));
            assert!(matches!(
                PercolationStats::from_config(&config.sequential()),
                Err(Error::InvalidArgument(_))
            ));
        }
    }

    #[test]
    fn display() {
        let stats = PercolationStats::from_samples(vec![0.5, 0.5]).unwrap();
        assert_eq!(
            stats.to_string(),
            "mean                    = 0.5\n\
             stddev                  = 0\n\
             95% confidence interval = [0.5, 0.5]\n"
        );
    }
}
