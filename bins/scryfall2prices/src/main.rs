#[macro_use]
extern crate log;
extern crate packvalue;
extern crate reqwest;

use packvalue::scryfall::{self, ScryfallList};
use packvalue::{JumpstartSet, PriceCatalog};
use reqwest::header::{self, HeaderMap, HeaderValue};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

// Scryfall asks for 50-100ms between requests
const REQUEST_DELAY: Duration = Duration::from_millis(100);

fn main() -> Result<(), Box<dyn std::error::Error>> {
  env_logger::init();
  let args: Vec<String> = env::args().collect();
  let set: JumpstartSet = args.get(1).map(String::as_str).unwrap_or("j25").parse()?;
  let out_path = match args.get(2) {
    Some(path) => PathBuf::from(path),
    None => set.catalog_path(Path::new("prices")),
  };

  let mut headers = HeaderMap::new();
  headers.insert(header::USER_AGENT, HeaderValue::from_static(scryfall::USER_AGENT));
  headers.insert(header::ACCEPT, HeaderValue::from_static(scryfall::ACCEPT));
  let client = reqwest::blocking::Client::builder()
    .default_headers(headers)
    .build()?;

  let first_uri = reqwest::Url::parse_with_params(
    scryfall::SCRYFALL_SEARCH_URL,
    &[("q", set.scryfall_query())],
  )?;
  let cards = scryfall::fetch_all(first_uri.as_str(), |uri| -> Result<ScryfallList, reqwest::Error> {
    std::thread::sleep(REQUEST_DELAY);
    client.get(uri).send()?.error_for_status()?.json()
  })?;

  let catalog = PriceCatalog::from_cards(set.code(), cards);
  if let Some(parent) = out_path.parent() {
    std::fs::create_dir_all(parent)?;
  }
  info!("Writing {} prices to {}", catalog.len(), out_path.display());
  catalog.to_path(&out_path)?;
  if let Ok(summary) = catalog.summary() {
    info!(
      "Mean card price ${:.2}, median ${:.2}, max ${:.2}",
      summary.mean, summary.median, summary.max
    );
  }
  Ok(())
}
