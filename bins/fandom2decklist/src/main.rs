#[macro_use]
extern crate log;
extern crate packvalue;
extern crate reqwest;
extern crate select;

use packvalue::{Decklist, JumpstartSet};
use select::document::Document;
use select::predicate::{Class, Predicate};
use std::env;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

macro_rules! fetch {
  ($client:expr, $url:expr) => {{
    std::thread::sleep(std::time::Duration::from_secs(1));
    info!("Fetching {}", $url);
    $client.get($url).send()?.error_for_status()?.text()?
  }};
}

/// Pack headings and card entries of a decklist page, in document order.
/// Headings that name no pack (page sections) end up as empty packs and are
/// dropped by the decklist parser.
fn decklist_lines(html: &str) -> Vec<String> {
  let doc = Document::from(html);
  doc
    .find(Class("mw-headline").or(Class("ext-scryfall-deckentry")))
    .map(|node| node.text().trim().to_string())
    .filter(|line| !line.is_empty())
    .collect()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
  env_logger::init();
  let args: Vec<String> = env::args().collect();
  let set: JumpstartSet = args.get(1).map(String::as_str).unwrap_or("j25").parse()?;
  let out_dir = PathBuf::from(args.get(2).map(String::as_str).unwrap_or("decklists"));

  let client = reqwest::blocking::Client::builder()
    .user_agent(packvalue::scryfall::USER_AGENT)
    .build()?;
  let mut lines = Vec::new();
  for url in set.decklist_page_urls() {
    let html = fetch!(client, &url);
    let page_lines = decklist_lines(&html);
    info!("Found {} lines on {}", page_lines.len(), url);
    lines.extend(page_lines);
  }

  let parsed = Decklist::parse(lines);
  if !parsed.warnings.is_empty() {
    warn!("Skipped {} malformed lines", parsed.warnings.len());
  }
  let decklist = parsed.decklist;
  std::fs::create_dir_all(&out_dir)?;

  let decklist_path = set.decklist_path(&out_dir);
  info!(
    "Writing {} pack variants to {}",
    decklist.len(),
    decklist_path.display()
  );
  let mut f = BufWriter::new(File::create(&decklist_path)?);
  write!(f, "{}", decklist)?;
  f.flush()?;

  let totals_path = set.card_totals_path(&out_dir);
  info!("Writing card totals to {}", totals_path.display());
  let mut f = BufWriter::new(File::create(&totals_path)?);
  decklist.write_card_totals(&mut f)?;
  f.flush()?;
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  const PAGE: &str = r#"
    <html><body>
      <h2><span class="mw-headline" id="Cats">Cats (1)</span></h2>
      <div class="ext-scryfall-deck">
        <span class="ext-scryfall-deckentry">1 Ajani, Caller of the Pride</span>
        <span class="ext-scryfall-deckentry">7 Plains</span>
      </div>
      <h2><span class="mw-headline" id="Navigation">Navigation</span></h2>
      <h2><span class="mw-headline" id="Wizards">Wizards (4)</span></h2>
      <ul>
        <li><span class="ext-scryfall-deckentry"> 2 Opt </span></li>
        <li><span class="ext-scryfall-deckentry">8 Island</span></li>
      </ul>
    </body></html>
  "#;

  #[test]
  fn lines_in_document_order() {
    assert_eq!(
      decklist_lines(PAGE),
      vec![
        "Cats (1)",
        "1 Ajani, Caller of the Pride",
        "7 Plains",
        "Navigation",
        "Wizards (4)",
        "2 Opt",
        "8 Island",
      ]
    );
  }

  #[test]
  fn page_parses_into_packs() {
    let parsed = Decklist::parse(decklist_lines(PAGE));
    let deck = parsed.decklist;
    assert_eq!(deck.len(), 2);
    assert_eq!(deck.pack("Cats (1)").map(|p| p.card_count()), Some(8));
    assert_eq!(deck.pack("Wizards (4)").map(|p| p.card_count()), Some(10));
    assert!(deck.pack("Navigation").is_none());
    assert_eq!(parsed.warnings.len(), 1);
  }
}
