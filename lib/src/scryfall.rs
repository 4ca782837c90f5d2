//! # Scryfall card search
//!
//! Types for the paginated `cards/search` endpoint. The HTTP transport lives with
//! the caller; `fetch_all` only drives the pagination.
use std::fmt;
use thiserror::Error;

pub const SCRYFALL_SEARCH_URL: &str = "https://api.scryfall.com/cards/search";
pub const USER_AGENT: &str = "SetValueEstimator/1.0";
pub const ACCEPT: &str = "*/*";

/// A single page of a Scryfall list object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScryfallList {
  #[serde(default)]
  pub data: Vec<ScryfallCard>,
  #[serde(default)]
  pub has_more: bool,
  #[serde(default)]
  pub next_page: Option<String>,
  #[serde(default)]
  pub total_cards: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScryfallCard {
  pub name: String,
  #[serde(default)]
  pub set: String,
  #[serde(default)]
  pub rarity: Rarity,
  #[serde(default)]
  pub prices: ScryfallPrices,
}

/// Scryfall reports prices as decimal strings, or null when there is no listing
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct ScryfallPrices {
  #[serde(default)]
  pub usd: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialOrd, PartialEq, Eq, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
  Common,
  Uncommon,
  Rare,
  Mythic,
  Special,
  Bonus,
  #[serde(other)]
  Unknown,
}

#[derive(Debug, Error)]
pub enum ScryfallError<E>
where
  E: std::error::Error + 'static,
{
  #[error("scryfall request for {uri} failed: {source}")]
  Transport {
    uri: String,
    #[source]
    source: E,
  },
  #[error("scryfall page {page} reports more cards but has no next_page")]
  MissingNextPage { page: usize },
}

impl Default for Rarity {
  fn default() -> Self {
    Self::Unknown
  }
}

impl fmt::Display for Rarity {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let s = match self {
      Self::Common => "common",
      Self::Uncommon => "uncommon",
      Self::Rare => "rare",
      Self::Mythic => "mythic",
      Self::Special => "special",
      Self::Bonus => "bonus",
      Self::Unknown => "unknown",
    };
    f.write_str(s)
  }
}

impl ScryfallCard {
  /// Returns the USD market price. A card with no listed price is worth 0.
  pub fn usd(&self) -> f64 {
    let usd = match self.prices.usd.as_deref() {
      None => return 0.0,
      Some(usd) => usd,
    };
    match usd.trim().parse::<f64>() {
      Ok(price) if price.is_finite() && price >= 0.0 => price,
      _ => {
        warn!("Ignoring unparsable usd price {:?} for {}", usd, self.name);
        0.0
      }
    }
  }
}

/// Fetches every page of a search starting at `first_uri`, following `next_page`
/// while the page reports `has_more`. `fetch` performs a single request.
/// The first failed request aborts the whole search.
pub fn fetch_all<F, E>(first_uri: &str, mut fetch: F) -> Result<Vec<ScryfallCard>, ScryfallError<E>>
where
  F: FnMut(&str) -> Result<ScryfallList, E>,
  E: std::error::Error + 'static,
{
  let mut cards = Vec::new();
  let mut uri = first_uri.to_string();
  let mut page = 1;
  loop {
    info!("Fetching page {} {}", page, uri);
    let list = fetch(&uri).map_err(|source| ScryfallError::Transport {
      uri: uri.clone(),
      source,
    })?;
    cards.extend(list.data);
    if !list.has_more {
      break;
    }
    uri = match list.next_page {
      Some(next) => next,
      None => return Err(ScryfallError::MissingNextPage { page }),
    };
    page += 1;
  }
  info!("Fetched {} cards over {} pages", cards.len(), page);
  Ok(cards)
}
