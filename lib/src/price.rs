//! # Card price catalog
//!
//! A read-only lookup table from exact card name to unit market price, built from
//! a Scryfall search and stored as a JSON file.
use crate::report::{ReportError, Summary};
use crate::scryfall::{Rarity, ScryfallCard};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
  /// Unit price in USD
  pub price: f64,
  #[serde(default)]
  pub rarity: Rarity,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceCatalog {
  /// Set code the prices were fetched for
  #[serde(default)]
  pub set: String,
  #[serde(default)]
  pub fetched_at: Option<DateTime<Utc>>,
  cards: BTreeMap<String, CatalogEntry>,
}

#[derive(Debug, Error)]
pub enum CatalogError {
  #[error("cannot access price catalog {}: {source}", .path.display())]
  Io {
    path: PathBuf,
    #[source]
    source: io::Error,
  },
  #[error("malformed price catalog {}: {source}", .path.display())]
  Json {
    path: PathBuf,
    #[source]
    source: serde_json::Error,
  },
  #[error("invalid price {price} for {name}")]
  InvalidPrice { name: String, price: f64 },
}

impl PriceCatalog {
  pub fn new(set: &str) -> Self {
    Self {
      set: set.to_string(),
      fetched_at: None,
      cards: BTreeMap::new(),
    }
  }

  /// Builds a catalog from Scryfall search results. When a name appears more than
  /// once the first card wins.
  pub fn from_cards<I>(set: &str, cards: I) -> Self
  where
    I: IntoIterator<Item = ScryfallCard>,
  {
    let mut catalog = Self::new(set);
    catalog.fetched_at = Some(Utc::now());
    for card in cards {
      if catalog.cards.contains_key(&card.name) {
        warn!("Duplicate card {} in {} prices, keeping the first", card.name, set);
        continue;
      }
      let entry = CatalogEntry {
        price: card.usd(),
        rarity: card.rarity,
      };
      catalog.cards.insert(card.name, entry);
    }
    catalog
  }

  /// Inserts or replaces a card price. Prices must be finite and non-negative.
  pub fn insert(&mut self, name: &str, price: f64, rarity: Rarity) -> Result<(), CatalogError> {
    if !price.is_finite() || price < 0.0 {
      return Err(CatalogError::InvalidPrice {
        name: name.to_string(),
        price,
      });
    }
    self
      .cards
      .insert(name.to_string(), CatalogEntry { price, rarity });
    Ok(())
  }

  pub fn get(&self, name: &str) -> Option<&CatalogEntry> {
    self.cards.get(name)
  }

  pub fn price(&self, name: &str) -> Option<f64> {
    self.get(name).map(|e| e.price)
  }

  /// Returns the card price, or 0 for a card missing from the catalog
  pub fn price_or_zero(&self, name: &str) -> f64 {
    self.price(name).unwrap_or(0.0)
  }

  pub fn len(&self) -> usize {
    self.cards.len()
  }

  pub fn is_empty(&self) -> bool {
    self.cards.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = (&str, &CatalogEntry)> {
    self.cards.iter().map(|(name, entry)| (name.as_str(), entry))
  }

  fn validate(&self) -> Result<(), CatalogError> {
    for (name, entry) in &self.cards {
      if !entry.price.is_finite() || entry.price < 0.0 {
        return Err(CatalogError::InvalidPrice {
          name: name.clone(),
          price: entry.price,
        });
      }
    }
    Ok(())
  }

  pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| CatalogError::Io {
      path: path.to_path_buf(),
      source,
    })?;
    let catalog: Self =
      serde_json::from_reader(BufReader::new(file)).map_err(|source| CatalogError::Json {
        path: path.to_path_buf(),
        source,
      })?;
    catalog.validate()?;
    info!(
      "Loaded {} {} card prices from {}",
      catalog.len(),
      catalog.set,
      path.display()
    );
    Ok(catalog)
  }

  pub fn to_path<P: AsRef<Path>>(&self, path: P) -> Result<(), CatalogError> {
    let path = path.as_ref();
    let io_err = |source| CatalogError::Io {
      path: path.to_path_buf(),
      source,
    };
    let file = File::create(path).map_err(io_err)?;
    let mut w = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut w, self).map_err(|source| CatalogError::Json {
      path: path.to_path_buf(),
      source,
    })?;
    w.write_all(b"\n").and_then(|_| w.flush()).map_err(io_err)?;
    info!("Wrote {} card prices to {}", self.len(), path.display());
    Ok(())
  }

  /// Statistics over the price of every card in the catalog
  pub fn summary(&self) -> Result<Summary, ReportError> {
    let prices: Vec<_> = self.cards.values().map(|e| e.price).collect();
    Summary::from_values(&prices)
  }

  pub fn summary_by_rarity(&self) -> BTreeMap<Rarity, Summary> {
    let mut by_rarity: BTreeMap<Rarity, Vec<f64>> = BTreeMap::new();
    for entry in self.cards.values() {
      by_rarity.entry(entry.rarity).or_default().push(entry.price);
    }
    by_rarity
      .into_iter()
      .filter_map(|(rarity, prices)| Summary::from_values(&prices).ok().map(|s| (rarity, s)))
      .collect()
  }

  /// The highest priced card. Ties go to the first name in alphabetical order.
  pub fn most_expensive(&self) -> Option<(&str, &CatalogEntry)> {
    self.iter().fold(None, |best, (name, entry)| match best {
      Some((_, b)) if b.price >= entry.price => best,
      _ => Some((name, entry)),
    })
  }
}
