//! # Monte Carlo pack opening simulation
//!
//! Every trial opens `n_packs` packs, each drawn uniformly at random with
//! replacement from the pack values, and records the summed value.
use rand::distributions::{Distribution, Uniform};
use rand::prelude::*;
use rand::rngs::SmallRng;
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;

pub const DEFAULT_PACK_COUNT: usize = 24;
pub const DEFAULT_SIMULATION_COUNT: usize = 1_000_000;

// Trials per independently seeded chunk in simulate_parallel. Changing this
// changes the totals produced for a given seed.
const CHUNK_SIZE: usize = 4096;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationConfig {
  /// Packs opened per trial
  pub n_packs: usize,
  /// Number of independent trials
  pub x_sims: usize,
  /// Base seed for `simulate_parallel`, drawn from entropy when None
  pub seed: Option<u64>,
}

/// The empirical distribution of trial totals. Trial order carries no meaning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
  pub n_packs: usize,
  /// The base seed, when the run was seeded by `simulate_parallel`
  pub seed: Option<u64>,
  pub totals: Vec<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InvalidInput {
  #[error("no pack values to draw from")]
  NoPackValues,
  #[error("packs per trial must be positive")]
  ZeroPacks,
  #[error("simulation count must be positive")]
  ZeroSimulations,
  #[error("pack value at index {index} is not finite")]
  NonFiniteValue { index: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SimulationError {
  #[error("invalid simulation input: {0}")]
  InvalidInput(#[from] InvalidInput),
  #[error("simulation cancelled")]
  Cancelled,
}

impl Default for SimulationConfig {
  fn default() -> Self {
    Self {
      n_packs: DEFAULT_PACK_COUNT,
      x_sims: DEFAULT_SIMULATION_COUNT,
      seed: None,
    }
  }
}

impl SimulationResult {
  pub fn len(&self) -> usize {
    self.totals.len()
  }

  pub fn is_empty(&self) -> bool {
    self.totals.is_empty()
  }
}

fn validate(
  pack_values: &[f64],
  n_packs: usize,
  x_sims: usize,
) -> Result<Uniform<usize>, InvalidInput> {
  if pack_values.is_empty() {
    return Err(InvalidInput::NoPackValues);
  }
  if n_packs == 0 {
    return Err(InvalidInput::ZeroPacks);
  }
  if x_sims == 0 {
    return Err(InvalidInput::ZeroSimulations);
  }
  if let Some(index) = pack_values.iter().position(|v| !v.is_finite()) {
    return Err(InvalidInput::NonFiniteValue { index });
  }
  Ok(Uniform::new(0, pack_values.len()))
}

/// Sums `n_packs` drawn values with Neumaier compensation, so `n_packs` copies
/// of one value total exactly `n_packs as f64 * value`.
#[inline]
fn open_packs<R: Rng + ?Sized>(
  pack_values: &[f64],
  picker: &Uniform<usize>,
  n_packs: usize,
  rng: &mut R,
) -> f64 {
  let mut total = 0.0;
  let mut compensation = 0.0;
  for _ in 0..n_packs {
    let value = pack_values[picker.sample(rng)];
    let sum = total + value;
    if f64::abs(total) >= f64::abs(value) {
      compensation += (total - sum) + value;
    } else {
      compensation += (value - sum) + total;
    }
    total = sum;
  }
  total + compensation
}

/// Runs `x_sims` trials of opening `n_packs` packs drawn from `pack_values`.
/// The caller owns `rng`, so a seeded generator reproduces the same totals.
pub fn simulate<R: Rng + ?Sized>(
  pack_values: &[f64],
  n_packs: usize,
  x_sims: usize,
  rng: &mut R,
) -> Result<SimulationResult, SimulationError> {
  let picker = validate(pack_values, n_packs, x_sims)?;
  let mut totals = Vec::with_capacity(x_sims);
  for _ in 0..x_sims {
    totals.push(open_packs(pack_values, &picker, n_packs, &mut *rng));
  }
  Ok(SimulationResult {
    n_packs,
    seed: None,
    totals,
  })
}

/// Runs the trials of `config` on the rayon thread pool.
///
/// Trials are split into fixed-size chunks and chunk `i` draws from its own
/// `SmallRng` seeded with `seed + i`, so for a given seed the totals are the same
/// regardless of the number of threads. `cancel` is checked before each chunk;
/// a cancelled run returns `SimulationError::Cancelled` and no totals.
pub fn simulate_parallel(
  pack_values: &[f64],
  config: &SimulationConfig,
  cancel: Option<&AtomicBool>,
) -> Result<SimulationResult, SimulationError> {
  let n_packs = config.n_packs;
  let x_sims = config.x_sims;
  let picker = validate(pack_values, n_packs, x_sims)?;
  let seed = match config.seed {
    Some(seed) => seed,
    None => {
      let seed = thread_rng().gen::<u64>();
      info!("No seed given, using {}", seed);
      seed
    }
  };
  let chunk_count = (x_sims + CHUNK_SIZE - 1) / CHUNK_SIZE;
  debug!(
    "Simulating {} trials of {} packs in {} chunks",
    x_sims, n_packs, chunk_count
  );
  let chunks: Option<Vec<Vec<f64>>> = (0..chunk_count)
    .into_par_iter()
    .map(|chunk| {
      if cancel.map_or(false, |c| c.load(Ordering::Relaxed)) {
        return None;
      }
      let start = chunk * CHUNK_SIZE;
      let len = std::cmp::min(CHUNK_SIZE, x_sims - start);
      let mut rng = SmallRng::seed_from_u64(seed.wrapping_add(chunk as u64));
      Some(
        (0..len)
          .map(|_| open_packs(pack_values, &picker, n_packs, &mut rng))
          .collect::<Vec<f64>>(),
      )
    })
    .collect();
  let chunks = chunks.ok_or(SimulationError::Cancelled)?;
  let mut totals = Vec::with_capacity(x_sims);
  for chunk in chunks {
    totals.extend(chunk);
  }
  Ok(SimulationResult {
    n_packs,
    seed: Some(seed),
    totals,
  })
}

#[cfg(test)]
mod tests {
  use crate::report::Distribution;
  use crate::simulation::*;
  use rand_chacha::ChaCha8Rng;

  #[test]
  fn fixed_seed_is_reproducible() {
    let values = [1.0, 2.0, 3.0];
    let a = simulate(&values, 2, 5, &mut ChaCha8Rng::seed_from_u64(42)).unwrap();
    let b = simulate(&values, 2, 5, &mut ChaCha8Rng::seed_from_u64(42)).unwrap();
    assert_eq!(a.len(), 5);
    let bits = |r: &SimulationResult| r.totals.iter().map(|t| t.to_bits()).collect::<Vec<_>>();
    assert_eq!(bits(&a), bits(&b));
  }

  #[test]
  fn totals_within_bounds() {
    let values = [1.0, 2.0, 3.0];
    let n_packs = 2;
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let result = simulate(&values, n_packs, 1000, &mut rng).unwrap();
    assert_eq!(result.n_packs, n_packs);
    assert!(result
      .totals
      .iter()
      .all(|&t| t >= 2.0 && t <= 6.0 && t.fract() == 0.0));
  }

  #[test]
  fn single_value_is_exact() {
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    for &x_sims in &[1, 17, 500] {
      let result = simulate(&[2.25], 24, x_sims, &mut rng).unwrap();
      assert_eq!(result.len(), x_sims);
      assert!(result.totals.iter().all(|&t| t == 24.0 * 2.25));
    }
  }

  #[test]
  fn single_value_is_exact_without_binary_fraction() {
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    for &v in &[0.1, 0.3, 0.7, 1.1, 3.99] {
      for &n_packs in &[2, 24, 100] {
        let result = simulate(&[v], n_packs, 3, &mut rng).unwrap();
        let expected = n_packs as f64 * v;
        assert!(
          result.totals.iter().all(|&t| t == expected),
          "{} packs of {} gave {:?}, expected {}",
          n_packs,
          v,
          result.totals,
          expected
        );
      }
    }
  }

  #[test]
  fn invalid_input_is_rejected() {
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    assert_eq!(
      simulate(&[], 1, 10, &mut rng),
      Err(SimulationError::InvalidInput(InvalidInput::NoPackValues))
    );
    assert_eq!(
      simulate(&[1.0], 0, 10, &mut rng),
      Err(SimulationError::InvalidInput(InvalidInput::ZeroPacks))
    );
    assert_eq!(
      simulate(&[1.0], 1, 0, &mut rng),
      Err(SimulationError::InvalidInput(InvalidInput::ZeroSimulations))
    );
    assert_eq!(
      simulate(&[1.0, f64::NAN], 1, 1, &mut rng),
      Err(SimulationError::InvalidInput(InvalidInput::NonFiniteValue {
        index: 1
      }))
    );
    let config = SimulationConfig {
      n_packs: 2,
      x_sims: 10,
      seed: Some(3),
    };
    assert_eq!(
      simulate_parallel(&[], &config, None),
      Err(SimulationError::InvalidInput(InvalidInput::NoPackValues))
    );
  }

  #[test]
  fn mean_converges_to_expected_value() {
    let values = [1.0, 2.0, 3.0];
    let mut rng = ChaCha8Rng::seed_from_u64(2024);
    let result = simulate(&values, 2, 100_000, &mut rng).unwrap();
    let d = Distribution::new(&result).unwrap();
    assert!((d.mean() - 4.0).abs() < 0.05);
    // Per-trial sd is sqrt(2 * 2/3)
    assert!((d.std_dev().unwrap() - 1.1547).abs() < 0.05);
  }

  #[test]
  fn every_pack_is_drawn() {
    let values = [1.0, 10.0, 100.0, 1000.0];
    let mut rng = ChaCha8Rng::seed_from_u64(9);
    let result = simulate(&values, 1, 1000, &mut rng).unwrap();
    for v in &values {
      assert!(result.totals.contains(v), "{} never drawn", v);
    }
  }

  #[test]
  fn parallel_is_deterministic_across_thread_counts() {
    let values = [0.5, 1.25, 3.0, 12.75];
    let config = SimulationConfig {
      n_packs: 24,
      x_sims: 3 * CHUNK_SIZE + 100,
      seed: Some(11),
    };
    let run = |threads| {
      rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .unwrap()
        .install(|| simulate_parallel(&values, &config, None))
        .unwrap()
    };
    let one = run(1);
    let four = run(4);
    assert_eq!(one.len(), config.x_sims);
    assert_eq!(one.seed, Some(11));
    assert_eq!(one, four);
    assert!(one.totals.iter().all(|&t| t >= 12.0 && t <= 306.0));
  }

  #[test]
  fn parallel_seeds_differ() {
    let values = [1.0, 2.0, 3.0];
    let mut config = SimulationConfig {
      n_packs: 2,
      x_sims: 1000,
      seed: Some(1),
    };
    let a = simulate_parallel(&values, &config, None).unwrap();
    config.seed = Some(2);
    let b = simulate_parallel(&values, &config, None).unwrap();
    assert_ne!(a.totals, b.totals);
  }

  #[test]
  fn unseeded_parallel_reports_its_seed() {
    let config = SimulationConfig {
      n_packs: 3,
      x_sims: 10,
      seed: None,
    };
    let result = simulate_parallel(&[1.0, 2.0], &config, None).unwrap();
    let replay = simulate_parallel(
      &[1.0, 2.0],
      &SimulationConfig {
        seed: result.seed,
        ..config
      },
      None,
    )
    .unwrap();
    assert_eq!(result, replay);
  }

  #[test]
  fn cancelled_run_returns_no_totals() {
    let cancel = AtomicBool::new(true);
    let config = SimulationConfig {
      n_packs: 24,
      x_sims: 100_000,
      seed: Some(5),
    };
    assert_eq!(
      simulate_parallel(&[1.0, 2.0], &config, Some(&cancel)),
      Err(SimulationError::Cancelled)
    );
  }
}
