//! # Magic: The Gathering Jumpstart pack value estimation
//!
//! packvalue estimates what a Jumpstart booster pack is worth. It parses the
//! decklists of every pack variant of a product line, prices them against
//! Scryfall market prices, and simulates opening many random packs to build an
//! empirical distribution of the value of opening `n` packs.
//!
//! ```no_run
//! use packvalue::{simulate, value, Decklist, Distribution, PriceCatalog};
//! use rand::SeedableRng;
//!
//! let decklist = Decklist::from_path("decklists/separate_jumpstart_cards.txt")?.decklist;
//! let catalog = PriceCatalog::from_path("prices/jmp.json")?;
//! let valuation = value(&decklist, &catalog);
//! let mut rng = rand::rngs::SmallRng::seed_from_u64(42);
//! let result = simulate(&valuation.table.values(), 24, 100_000, &mut rng)?;
//! let summary = Distribution::new(&result)?.summary();
//! println!("mean ${:.2}", summary.mean);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#[macro_use]
extern crate serde_derive;
extern crate serde;
#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate log;
extern crate rand;
extern crate rayon;
extern crate regex;

pub mod decklist;
pub mod price;
pub mod report;
pub mod scryfall;
pub mod set;
pub mod simulation;
pub mod valuation;

pub use crate::decklist::{Decklist, DecklistEntry, PackVariant, ParseWarning};
pub use crate::price::PriceCatalog;
pub use crate::report::{Distribution, Summary};
pub use crate::set::JumpstartSet;
pub use crate::simulation::{simulate, simulate_parallel, SimulationConfig, SimulationResult};
pub use crate::valuation::{value, PackValueTable, Valuation};
