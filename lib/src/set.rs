//! # Jumpstart product lines
//!
//! Each product line has its own decklists on the MTG fandom wiki and its own
//! Scryfall set code.
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

const FANDOM_WIKI_URL: &str = "https://mtg.fandom.com/wiki";

/// Decklist page suffixes, one page per color
const DECKLIST_PAGES: [&str; 6] = ["White", "Blue", "Black", "Red", "Green", "Other"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum JumpstartSet {
  #[serde(rename = "jmp")]
  Jumpstart,
  #[serde(rename = "j22")]
  Jumpstart2022,
  #[serde(rename = "j25")]
  FoundationsJumpstart,
}

pub const ALL_SETS: [JumpstartSet; 3] = [
  JumpstartSet::Jumpstart,
  JumpstartSet::Jumpstart2022,
  JumpstartSet::FoundationsJumpstart,
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown Jumpstart set {0:?}, expected one of jmp, j22, j25")]
pub struct UnknownSet(pub String);

impl JumpstartSet {
  /// Scryfall set code
  pub fn code(self) -> &'static str {
    match self {
      Self::Jumpstart => "jmp",
      Self::Jumpstart2022 => "j22",
      Self::FoundationsJumpstart => "j25",
    }
  }

  pub fn wiki_name(self) -> &'static str {
    match self {
      Self::Jumpstart => "Jumpstart",
      Self::Jumpstart2022 => "Jumpstart_2022",
      Self::FoundationsJumpstart => "Foundations_Jumpstart",
    }
  }

  pub fn file_stem(self) -> &'static str {
    match self {
      Self::Jumpstart => "jumpstart",
      Self::Jumpstart2022 => "jumpstart_2022",
      Self::FoundationsJumpstart => "foundations_jumpstart",
    }
  }

  /// Scryfall search query for the priced cards of the set. Basic lands are left out.
  pub fn scryfall_query(self) -> String {
    format!("set:{} -type:land", self.code())
  }

  pub fn decklist_page_urls(self) -> Vec<String> {
    DECKLIST_PAGES
      .iter()
      .map(|page| format!("{}/{}/Decklists_-_{}", FANDOM_WIKI_URL, self.wiki_name(), page))
      .collect()
  }

  /// Pack variant decklist file
  pub fn decklist_path(self, dir: &Path) -> PathBuf {
    dir.join(format!("separate_{}_cards.txt", self.file_stem()))
  }

  /// Aggregated card counts file
  pub fn card_totals_path(self, dir: &Path) -> PathBuf {
    dir.join(format!("{}_cards.txt", self.file_stem()))
  }

  pub fn catalog_path(self, dir: &Path) -> PathBuf {
    dir.join(format!("{}.json", self.code()))
  }
}

impl FromStr for JumpstartSet {
  type Err = UnknownSet;

  fn from_str(s: &str) -> Result<Self, UnknownSet> {
    let needle = s.trim().to_lowercase();
    ALL_SETS
      .iter()
      .copied()
      .find(|set| {
        set.code() == needle || set.file_stem() == needle || set.wiki_name().to_lowercase() == needle
      })
      .ok_or_else(|| UnknownSet(s.to_string()))
  }
}

impl fmt::Display for JumpstartSet {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.code())
  }
}

#[cfg(test)]
mod tests {
  use crate::set::*;

  #[test]
  fn parse_code_and_name() {
    assert_eq!("j25".parse::<JumpstartSet>(), Ok(JumpstartSet::FoundationsJumpstart));
    assert_eq!("JMP".parse::<JumpstartSet>(), Ok(JumpstartSet::Jumpstart));
    assert_eq!("Jumpstart_2022".parse::<JumpstartSet>(), Ok(JumpstartSet::Jumpstart2022));
    assert_eq!(
      "foundations_jumpstart".parse::<JumpstartSet>(),
      Ok(JumpstartSet::FoundationsJumpstart)
    );
    assert_eq!(
      "m21".parse::<JumpstartSet>(),
      Err(UnknownSet("m21".to_string()))
    );
  }

  #[test]
  fn paths() {
    let dir = Path::new("decklists");
    let set = JumpstartSet::FoundationsJumpstart;
    assert_eq!(
      set.decklist_path(dir),
      Path::new("decklists/separate_foundations_jumpstart_cards.txt")
    );
    assert_eq!(
      set.card_totals_path(dir),
      Path::new("decklists/foundations_jumpstart_cards.txt")
    );
    assert_eq!(
      JumpstartSet::Jumpstart.catalog_path(Path::new("prices")),
      Path::new("prices/jmp.json")
    );
  }

  #[test]
  fn wiki_urls() {
    let urls = JumpstartSet::Jumpstart2022.decklist_page_urls();
    assert_eq!(urls.len(), 6);
    assert_eq!(
      urls[0],
      "https://mtg.fandom.com/wiki/Jumpstart_2022/Decklists_-_White"
    );
    assert!(urls[5].ends_with("Decklists_-_Other"));
  }

  #[test]
  fn scryfall_query_skips_lands() {
    assert_eq!(JumpstartSet::Jumpstart.scryfall_query(), "set:jmp -type:land");
  }

  #[test]
  fn serde_uses_codes() {
    let json = serde_json::to_string(&JumpstartSet::Jumpstart2022).unwrap();
    assert_eq!(json, "\"j22\"");
  }
}
