//! # Pack valuation
//!
//! Joins pack variant decklists against a price catalog. A card missing from the
//! catalog is valued at 0; the most common misses are basic lands, which the
//! Scryfall search leaves out.
use crate::decklist::Decklist;
use crate::price::PriceCatalog;
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackValue {
  pub name: String,
  pub value: f64,
}

/// The total value of every pack variant, in decklist order
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackValueTable {
  pub packs: Vec<PackValue>,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Valuation {
  pub table: PackValueTable,
  /// Distinct card names that had no catalog price
  pub missing_cards: BTreeSet<String>,
  /// Copies of missing cards across all packs
  pub missing_copies: usize,
}

impl PackValueTable {
  pub fn len(&self) -> usize {
    self.packs.len()
  }

  pub fn is_empty(&self) -> bool {
    self.packs.is_empty()
  }

  pub fn iter(&self) -> std::slice::Iter<'_, PackValue> {
    self.packs.iter()
  }

  pub fn get(&self, name: &str) -> Option<f64> {
    self.packs.iter().find(|p| p.name == name).map(|p| p.value)
  }

  /// Pack values in table order, the sample space of the simulation
  pub fn values(&self) -> Vec<f64> {
    self.packs.iter().map(|p| p.value).collect()
  }

  /// Expected value of a single uniformly drawn pack
  pub fn expected_value(&self) -> Option<f64> {
    if self.packs.is_empty() {
      None
    } else {
      Some(self.packs.iter().map(|p| p.value).sum::<f64>() / self.packs.len() as f64)
    }
  }

  /// Packs ordered from most to least valuable, ties in table order
  pub fn ranked(&self) -> Vec<&PackValue> {
    let mut ranked: Vec<_> = self.packs.iter().collect();
    ranked.sort_by(|a, b| b.value.total_cmp(&a.value));
    ranked
  }
}

/// Values every pack variant of `decklist` as the sum of count times unit price
pub fn value(decklist: &Decklist, catalog: &PriceCatalog) -> Valuation {
  let mut valuation = Valuation::default();
  for pack in decklist {
    let mut total = 0.0;
    for entry in &pack.entries {
      match catalog.price(&entry.name) {
        Some(price) => total += entry.count as f64 * price,
        None => {
          if valuation.missing_cards.insert(entry.name.clone()) {
            debug!("No price for {}, valuing it at 0", entry.name);
          }
          valuation.missing_copies += entry.count;
        }
      }
    }
    valuation.table.packs.push(PackValue {
      name: pack.name.clone(),
      value: total,
    });
  }
  if !valuation.missing_cards.is_empty() {
    info!(
      "{} cards ({} copies) had no price and were valued at 0",
      valuation.missing_cards.len(),
      valuation.missing_copies
    );
  }
  valuation
}
