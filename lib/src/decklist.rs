//! # Pack variant decklists
//!
//! A decklist file enumerates every pack variant of a Jumpstart product line.
//! A line whose first character is not a digit names a pack variant, and the
//! lines below it are `"<count> <card name>"` entries of that variant.
use regex::Regex;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// One line of a pack variant: `count` copies of the card `name`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecklistEntry {
  pub count: usize,
  pub name: String,
}

/// A named, fixed composition of cards that a physical pack may contain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackVariant {
  pub name: String,
  pub entries: Vec<DecklistEntry>,
}

/// All pack variants of a product line, in the order they first appear
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decklist {
  pub packs: Vec<PackVariant>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
  /// An entry line appeared before any pack variant header
  EntryBeforeHeader,
  /// A count with no card name after it
  MissingName,
  /// The count is not a non-negative integer
  BadCount,
  ZeroCount,
  /// A header that was never followed by an entry
  EmptyPack,
  /// A header naming a pack variant that was already parsed
  DuplicatePack,
}

/// A recoverable problem found while parsing a decklist. The offending line is skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseWarning {
  /// 1-based line number
  pub line_number: usize,
  pub line: String,
  pub kind: WarningKind,
}

/// The outcome of parsing a decklist
#[derive(Debug, Default, Clone)]
pub struct ParsedDecklist {
  pub decklist: Decklist,
  pub warnings: Vec<ParseWarning>,
}

#[derive(Debug, Error)]
pub enum DecklistError {
  #[error("cannot read decklist {}: {source}", .path.display())]
  Io {
    path: PathBuf,
    #[source]
    source: io::Error,
  },
}

impl fmt::Display for WarningKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let s = match self {
      Self::EntryBeforeHeader => "entry before any pack header",
      Self::MissingName => "missing card name",
      Self::BadCount => "cannot parse card count",
      Self::ZeroCount => "card count is zero",
      Self::EmptyPack => "pack has no entries",
      Self::DuplicatePack => "duplicate pack name, replacing earlier entries",
    };
    f.write_str(s)
  }
}

impl fmt::Display for ParseWarning {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "line {}: {}: {:?}", self.line_number, self.kind, self.line)
  }
}

/// Accumulates pack variants line by line
#[derive(Debug, Default)]
struct DecklistBuilder {
  packs: Vec<PackVariant>,
  index: HashMap<String, usize>,
  current: Option<(usize, PackVariant)>,
  warnings: Vec<ParseWarning>,
}

impl DecklistBuilder {
  fn warn(&mut self, line_number: usize, line: &str, kind: WarningKind) {
    let warning = ParseWarning {
      line_number,
      line: line.to_string(),
      kind,
    };
    warn!("{}", warning);
    self.warnings.push(warning);
  }

  fn header(&mut self, line_number: usize, name: &str) {
    self.finish_pack();
    self.current = Some((
      line_number,
      PackVariant {
        name: name.to_string(),
        entries: Vec::new(),
      },
    ));
  }

  fn entry(&mut self, line_number: usize, line: &str) {
    lazy_static! {
      static ref ENTRY_LINE_REGEX: Regex =
        Regex::new(r"^(?P<count>\S+)\s+(?P<name>.+)$").expect("Failed to compile ENTRY_LINE_REGEX regex");
    }
    if self.current.is_none() {
      self.warn(line_number, line, WarningKind::EntryBeforeHeader);
      return;
    }
    let caps = match ENTRY_LINE_REGEX.captures(line) {
      Some(caps) => caps,
      None => {
        self.warn(line_number, line, WarningKind::MissingName);
        return;
      }
    };
    let count = match caps["count"].parse::<usize>() {
      Ok(0) => {
        self.warn(line_number, line, WarningKind::ZeroCount);
        return;
      }
      Ok(count) => count,
      Err(_) => {
        self.warn(line_number, line, WarningKind::BadCount);
        return;
      }
    };
    let name = caps["name"].trim().to_string();
    if let Some((_, pack)) = self.current.as_mut() {
      pack.entries.push(DecklistEntry { count, name });
    }
  }

  fn finish_pack(&mut self) {
    let (line_number, pack) = match self.current.take() {
      Some(current) => current,
      None => return,
    };
    if pack.entries.is_empty() {
      self.warn(line_number, &pack.name, WarningKind::EmptyPack);
      return;
    }
    match self.index.get(&pack.name) {
      Some(&idx) => {
        self.warn(line_number, &pack.name, WarningKind::DuplicatePack);
        self.packs[idx].entries = pack.entries;
      }
      None => {
        self.index.insert(pack.name.clone(), self.packs.len());
        self.packs.push(pack);
      }
    }
  }

  fn build(mut self) -> ParsedDecklist {
    self.finish_pack();
    ParsedDecklist {
      decklist: Decklist { packs: self.packs },
      warnings: self.warnings,
    }
  }
}

impl Decklist {
  pub fn new() -> Self {
    Self::default()
  }

  /// Parses decklist lines. Malformed lines are skipped and reported as warnings,
  /// parsing itself never fails.
  pub fn parse<I, S>(lines: I) -> ParsedDecklist
  where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
  {
    let mut builder = DecklistBuilder::default();
    for (idx, line) in lines.into_iter().enumerate() {
      let line_number = idx + 1;
      let trimmed = line.as_ref().trim();
      let first = match trimmed.chars().next() {
        Some(c) => c,
        None => continue,
      };
      if first.is_ascii_digit() {
        builder.entry(line_number, trimmed);
      } else {
        builder.header(line_number, trimmed);
      }
    }
    builder.build()
  }

  pub fn from_list(list: &str) -> ParsedDecklist {
    Self::parse(list.lines())
  }

  pub fn from_path<P: AsRef<Path>>(path: P) -> Result<ParsedDecklist, DecklistError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| DecklistError::Io {
      path: path.to_path_buf(),
      source,
    })?;
    let parsed = Self::from_list(&text);
    info!(
      "Parsed {} packs from {} with {} warnings",
      parsed.decklist.len(),
      path.display(),
      parsed.warnings.len()
    );
    Ok(parsed)
  }

  pub fn len(&self) -> usize {
    self.packs.len()
  }

  pub fn is_empty(&self) -> bool {
    self.packs.is_empty()
  }

  pub fn iter(&self) -> std::slice::Iter<'_, PackVariant> {
    self.packs.iter()
  }

  pub fn pack(&self, name: &str) -> Option<&PackVariant> {
    self.packs.iter().find(|p| p.name == name)
  }

  /// Total copies of each card across every pack variant, sorted by
  /// descending count and then by name
  pub fn card_totals(&self) -> Vec<DecklistEntry> {
    let mut totals: BTreeMap<&str, usize> = BTreeMap::new();
    for entry in self.packs.iter().flat_map(|p| p.entries.iter()) {
      *totals.entry(&entry.name).or_insert(0) += entry.count;
    }
    let mut result: Vec<_> = totals
      .into_iter()
      .map(|(name, count)| DecklistEntry {
        count,
        name: name.to_string(),
      })
      .collect();
    result.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
    result
  }

  pub fn write_card_totals<W: Write>(&self, mut w: W) -> io::Result<()> {
    for entry in self.card_totals() {
      writeln!(w, "{} {}", entry.count, entry.name)?;
    }
    Ok(())
  }
}

impl PackVariant {
  pub fn card_count(&self) -> usize {
    self.entries.iter().map(|e| e.count).sum()
  }
}

/// Writes the decklist in the same flat text format `Decklist::parse` reads
impl fmt::Display for Decklist {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for pack in &self.packs {
      writeln!(f, "{}", pack.name)?;
      for entry in &pack.entries {
        writeln!(f, "{} {}", entry.count, entry.name)?;
      }
    }
    Ok(())
  }
}

impl<'a> IntoIterator for &'a Decklist {
  type Item = &'a PackVariant;
  type IntoIter = std::slice::Iter<'a, PackVariant>;

  fn into_iter(self) -> Self::IntoIter {
    self.packs.iter()
  }
}
