//! # Distribution reporting
//!
//! Descriptive statistics over an empirical distribution: the trial totals of a
//! simulation, or any other list of values such as card prices.
use crate::simulation::SimulationResult;
use std::io::{self, Write};
use thiserror::Error;

/// Descriptive statistics of a list of values
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Summary {
  pub count: usize,
  pub mean: f64,
  /// Sample standard deviation (n - 1 divisor), None with fewer than two values
  pub std_dev: Option<f64>,
  pub min: f64,
  pub p25: f64,
  pub median: f64,
  pub p75: f64,
  pub max: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistogramBin {
  pub lower: f64,
  pub upper: f64,
  pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ReportError {
  #[error("no values to report on")]
  Empty,
  #[error("quantile {0} is outside [0, 1]")]
  InvalidQuantile(f64),
  #[error("a histogram needs at least one bin")]
  InvalidBins,
}

/// An empirical distribution, kept sorted
#[derive(Debug, Clone)]
pub struct Distribution {
  sorted: Vec<f64>,
}

impl Distribution {
  pub fn from_values(values: &[f64]) -> Result<Self, ReportError> {
    if values.is_empty() {
      return Err(ReportError::Empty);
    }
    let mut sorted = values.to_vec();
    sorted.sort_unstable_by(|a, b| a.total_cmp(b));
    Ok(Self { sorted })
  }

  pub fn new(result: &SimulationResult) -> Result<Self, ReportError> {
    Self::from_values(&result.totals)
  }

  pub fn len(&self) -> usize {
    self.sorted.len()
  }

  pub fn is_empty(&self) -> bool {
    self.sorted.is_empty()
  }

  /// The values in ascending order
  pub fn values(&self) -> &[f64] {
    &self.sorted
  }

  pub fn min(&self) -> f64 {
    self.sorted[0]
  }

  pub fn max(&self) -> f64 {
    self.sorted[self.sorted.len() - 1]
  }

  pub fn mean(&self) -> f64 {
    self.sorted.iter().sum::<f64>() / self.sorted.len() as f64
  }

  pub fn std_dev(&self) -> Option<f64> {
    let n = self.sorted.len();
    if n < 2 {
      return None;
    }
    let mean = self.mean();
    let sum_sq = self
      .sorted
      .iter()
      .map(|v| (v - mean) * (v - mean))
      .sum::<f64>();
    Some((sum_sq / (n - 1) as f64).sqrt())
  }

  /// Returns the `q` quantile, interpolating linearly between the two closest ranks
  pub fn quantile(&self, q: f64) -> Result<f64, ReportError> {
    if !(0.0..=1.0).contains(&q) {
      return Err(ReportError::InvalidQuantile(q));
    }
    let pos = q * (self.sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    Ok(self.sorted[lo] + (self.sorted[hi] - self.sorted[lo]) * frac)
  }

  pub fn summary(&self) -> Summary {
    // Quantiles in [0, 1] cannot fail
    let at = |q| self.quantile(q).unwrap_or(f64::NAN);
    Summary {
      count: self.len(),
      mean: self.mean(),
      std_dev: self.std_dev(),
      min: self.min(),
      p25: at(0.25),
      median: at(0.5),
      p75: at(0.75),
      max: self.max(),
    }
  }

  /// Counts values into `bins` equal-width bins spanning [min, max].
  /// The max value is counted in the last bin.
  pub fn histogram(&self, bins: usize) -> Result<Vec<HistogramBin>, ReportError> {
    if bins == 0 {
      return Err(ReportError::InvalidBins);
    }
    let min = self.min();
    let max = self.max();
    let width = (max - min) / bins as f64;
    let mut result: Vec<_> = (0..bins)
      .map(|i| HistogramBin {
        lower: min + width * i as f64,
        upper: if i + 1 == bins {
          max
        } else {
          min + width * (i + 1) as f64
        },
        count: 0,
      })
      .collect();
    for v in &self.sorted {
      let idx = if width > 0.0 {
        std::cmp::min(((v - min) / width) as usize, bins - 1)
      } else {
        0
      };
      result[idx].count += 1;
    }
    Ok(result)
  }
}

impl Summary {
  pub fn from_values(values: &[f64]) -> Result<Self, ReportError> {
    Distribution::from_values(values).map(|d| d.summary())
  }
}

/// Writes one `trial,value` row per trial total, with a header row
pub fn write_csv<W: Write>(result: &SimulationResult, w: W) -> io::Result<()> {
  let mut w = io::BufWriter::new(w);
  writeln!(w, "trial,value")?;
  for (trial, value) in result.totals.iter().enumerate() {
    writeln!(w, "{},{}", trial, value)?;
  }
  w.flush()
}
