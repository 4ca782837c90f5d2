#[macro_use]
extern crate log;
extern crate packvalue;

use clap::{Parser, Subcommand};
use packvalue::report::{self, Distribution, HistogramBin, ReportError, Summary};
use packvalue::simulation::{self, SimulationConfig};
use packvalue::{value, Decklist, JumpstartSet, PriceCatalog, Valuation};
use std::error::Error;
use std::fs::File;
use std::path::PathBuf;
use std::time::Instant;

const HISTOGRAM_WIDTH: usize = 50;

#[derive(Debug, Parser)]
#[command(
  name = "packsim",
  about = "Estimates the value of Jumpstart packs by simulating pack openings",
  version
)]
struct Args {
  /// Jumpstart product line: jmp, j22 or j25
  #[arg(long, global = true, default_value = "j25")]
  set: JumpstartSet,

  /// Directory holding separate_<set>_cards.txt decklists
  #[arg(long, global = true, default_value = "decklists")]
  decklists: PathBuf,

  /// Directory holding <code>.json price catalogs
  #[arg(long, global = true, default_value = "prices")]
  prices: PathBuf,

  #[command(subcommand)]
  command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
  /// Print the total value of every pack variant
  Values {
    /// Only print the N most valuable packs
    #[arg(long)]
    top: Option<usize>,
  },
  /// Print card price statistics for the set
  Prices,
  /// Simulate opening packs and report the value distribution
  Simulate {
    /// Packs opened per trial
    #[arg(long, default_value_t = simulation::DEFAULT_PACK_COUNT)]
    packs: usize,

    /// Number of trials
    #[arg(long, default_value_t = simulation::DEFAULT_SIMULATION_COUNT)]
    sims: usize,

    /// Base seed, random when omitted
    #[arg(long)]
    seed: Option<u64>,

    /// Worker threads, all cores when omitted
    #[arg(long)]
    threads: Option<usize>,

    /// Comma separated quantiles to report, each in [0, 1]
    #[arg(
      long,
      value_delimiter = ',',
      value_parser = parse_quantile,
      default_values_t = vec![0.25, 0.5, 0.75]
    )]
    quantiles: Vec<f64>,

    /// Histogram bins, 0 to skip the histogram
    #[arg(long, default_value_t = 20)]
    bins: usize,

    /// Write every trial total to a CSV file
    #[arg(long)]
    csv: Option<PathBuf>,
  },
}

fn parse_quantile(s: &str) -> Result<f64, String> {
  let q: f64 = s.trim().parse().map_err(|e| format!("{}: {:?}", e, s))?;
  if (0.0..=1.0).contains(&q) {
    Ok(q)
  } else {
    Err(ReportError::InvalidQuantile(q).to_string())
  }
}

fn load_valuation(args: &Args) -> Result<Valuation, Box<dyn Error>> {
  let parsed = Decklist::from_path(args.set.decklist_path(&args.decklists))?;
  if !parsed.warnings.is_empty() {
    warn!("Skipped {} decklist lines", parsed.warnings.len());
  }
  let catalog = PriceCatalog::from_path(args.set.catalog_path(&args.prices))?;
  Ok(value(&parsed.decklist, &catalog))
}

fn print_summary(title: &str, s: &Summary) {
  println!("{}", title);
  println!("  count  {:>10}", s.count);
  println!("  mean   {:>10.2}", s.mean);
  match s.std_dev {
    Some(std_dev) => println!("  std    {:>10.2}", std_dev),
    None => println!("  std    {:>10}", "n/a"),
  }
  println!("  min    {:>10.2}", s.min);
  println!("  25%    {:>10.2}", s.p25);
  println!("  50%    {:>10.2}", s.median);
  println!("  75%    {:>10.2}", s.p75);
  println!("  max    {:>10.2}", s.max);
}

fn print_histogram(bins: &[HistogramBin]) {
  let most = bins.iter().map(|b| b.count).max().unwrap_or(0);
  for bin in bins {
    let bar = if most == 0 {
      0
    } else {
      bin.count * HISTOGRAM_WIDTH / most
    };
    println!(
      "  {:>9.2} - {:>9.2} {:>9} {}",
      bin.lower,
      bin.upper,
      bin.count,
      "#".repeat(bar)
    );
  }
}

fn values(args: &Args, top: Option<usize>) -> Result<(), Box<dyn Error>> {
  let valuation = load_valuation(args)?;
  let table = &valuation.table;
  println!("{} pack variants in {}", table.len(), args.set);
  if let Some(ev) = table.expected_value() {
    println!("Expected value of one pack: ${:.2}", ev);
  }
  println!(
    "{} cards ({} copies) had no price and count as $0",
    valuation.missing_cards.len(),
    valuation.missing_copies
  );
  let ranked = table.ranked();
  let shown = top.unwrap_or(ranked.len());
  for pack in ranked.iter().take(shown) {
    println!("  {:>8.2}  {}", pack.value, pack.name);
  }
  Ok(())
}

fn prices(args: &Args) -> Result<(), Box<dyn Error>> {
  let catalog = PriceCatalog::from_path(args.set.catalog_path(&args.prices))?;
  if let Some(fetched_at) = catalog.fetched_at {
    println!("Prices for {} fetched at {}", catalog.set, fetched_at);
  }
  print_summary("All cards (USD)", &catalog.summary()?);
  for (rarity, summary) in catalog.summary_by_rarity() {
    print_summary(&format!("{} cards (USD)", rarity), &summary);
  }
  if let Some((name, entry)) = catalog.most_expensive() {
    println!("Most expensive: {} ({}) ${:.2}", name, entry.rarity, entry.price);
  }
  Ok(())
}

fn simulate(
  args: &Args,
  config: SimulationConfig,
  threads: Option<usize>,
  quantiles: &[f64],
  bins: usize,
  csv: Option<&PathBuf>,
) -> Result<(), Box<dyn Error>> {
  if let Some(threads) = threads {
    rayon::ThreadPoolBuilder::new()
      .num_threads(threads)
      .build_global()?;
  }
  let valuation = load_valuation(args)?;
  info!(
    "Simulating {} trials of {} packs over {} pack variants",
    config.x_sims,
    config.n_packs,
    valuation.table.len()
  );
  let start = Instant::now();
  let result = simulation::simulate_parallel(&valuation.table.values(), &config, None)?;
  info!("Simulation finished in {:.2?}", start.elapsed());
  let dist = Distribution::new(&result)?;
  print_summary(
    &format!(
      "Value of {} {} packs (USD), seed {}",
      config.n_packs,
      args.set,
      result.seed.unwrap_or_default()
    ),
    &dist.summary(),
  );
  println!("Quantiles");
  for &q in quantiles {
    println!("  {:>5.1}% {:>10.2}", q * 100.0, dist.quantile(q)?);
  }
  if bins > 0 {
    println!("Histogram");
    print_histogram(&dist.histogram(bins)?);
  }
  if let Some(path) = csv {
    info!("Writing {} trial totals to {}", result.len(), path.display());
    report::write_csv(&result, File::create(path)?)?;
  }
  Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
  env_logger::init();
  let args = Args::parse();
  match &args.command {
    Command::Values { top } => values(&args, *top),
    Command::Prices => prices(&args),
    Command::Simulate {
      packs,
      sims,
      seed,
      threads,
      quantiles,
      bins,
      csv,
    } => {
      let config = SimulationConfig {
        n_packs: *packs,
        x_sims: *sims,
        seed: *seed,
      };
      simulate(&args, config, *threads, quantiles, *bins, csv.as_ref())
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn simulate_defaults() {
    let args = Args::try_parse_from(["packsim", "simulate"]).unwrap();
    assert_eq!(args.set, JumpstartSet::FoundationsJumpstart);
    assert_eq!(args.decklists, PathBuf::from("decklists"));
    match args.command {
      Command::Simulate {
        packs,
        sims,
        seed,
        quantiles,
        bins,
        ..
      } => {
        assert_eq!(packs, 24);
        assert_eq!(sims, 1_000_000);
        assert_eq!(seed, None);
        assert_eq!(quantiles, vec![0.25, 0.5, 0.75]);
        assert_eq!(bins, 20);
      }
      other => panic!("unexpected command {:?}", other),
    }
  }

  #[test]
  fn simulate_flags() {
    let args = Args::try_parse_from([
      "packsim",
      "simulate",
      "--set",
      "jmp",
      "--packs",
      "2",
      "--sims",
      "100000",
      "--seed",
      "7",
      "--quantiles",
      "0.1,0.9",
    ])
    .unwrap();
    assert_eq!(args.set, JumpstartSet::Jumpstart);
    match args.command {
      Command::Simulate {
        packs,
        sims,
        seed,
        quantiles,
        ..
      } => {
        assert_eq!((packs, sims, seed), (2, 100_000, Some(7)));
        assert_eq!(quantiles, vec![0.1, 0.9]);
      }
      other => panic!("unexpected command {:?}", other),
    }
  }

  #[test]
  fn out_of_range_quantile_is_rejected() {
    for bad in ["25", "0.5,1.5", "-0.1", "half"] {
      assert!(
        Args::try_parse_from(["packsim", "simulate", "--quantiles", bad]).is_err(),
        "{}",
        bad
      );
    }
    assert_eq!(parse_quantile("0"), Ok(0.0));
    assert_eq!(parse_quantile(" 1 "), Ok(1.0));
  }

  #[test]
  fn unknown_set_is_rejected() {
    assert!(Args::try_parse_from(["packsim", "--set", "m21", "prices"]).is_err());
  }
}
