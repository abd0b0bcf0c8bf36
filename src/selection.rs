//! Parsing the download directive typed after the listing.
//!
//! Accepted input: `a`/`all`, `n`/`none` (or an empty line), or a
//! comma-separated list of the 1-based indices printed in the listing.

use std::fmt;

use crate::models::Track;

/// A token that did not select anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejected {
    /// Not a number.
    NotANumber(String),
    /// A number outside `1..=len`.
    OutOfRange(usize),
}

impl fmt::Display for Rejected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejected::NotANumber(token) => write!(f, "'{}' is not a track number", token),
            Rejected::OutOfRange(index) => write!(f, "{} is not in the list", index),
        }
    }
}

/// Resolved 0-based positions into the listed tracks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    positions: Vec<usize>,
}

impl Selection {
    /// Every position of a list of `len` tracks, in order.
    pub fn all(len: usize) -> Self {
        Self {
            positions: (0..len).collect(),
        }
    }

    /// Nothing.
    pub fn none() -> Self {
        Self::default()
    }

    /// Selected positions, in selection order.
    pub fn positions(&self) -> &[usize] {
        &self.positions
    }

    /// Number of selected tracks.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Whether nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// The selected tracks, in selection order.
    pub fn resolve<'a>(&self, tracks: &'a [Track]) -> Vec<&'a Track> {
        self.positions
            .iter()
            .filter_map(|&position| tracks.get(position))
            .collect()
    }
}

/// Outcome of parsing a directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedSelection {
    /// What was selected.
    pub selection: Selection,
    /// Tokens that were ignored.
    pub rejected: Vec<Rejected>,
}

/// Parse a directive against a list of `len` tracks.
pub fn parse_selection(input: &str, len: usize) -> ParsedSelection {
    let input = input.trim();

    if input.eq_ignore_ascii_case("a") || input.eq_ignore_ascii_case("all") {
        return ParsedSelection {
            selection: Selection::all(len),
            rejected: Vec::new(),
        };
    }
    if input.is_empty() || input.eq_ignore_ascii_case("n") || input.eq_ignore_ascii_case("none") {
        return ParsedSelection {
            selection: Selection::none(),
            rejected: Vec::new(),
        };
    }

    let mut positions = Vec::new();
    let mut rejected = Vec::new();

    for token in input.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        match token.parse::<usize>() {
            Ok(index) if (1..=len).contains(&index) => {
                let position = index - 1;
                if !positions.contains(&position) {
                    positions.push(position);
                }
            }
            Ok(index) => rejected.push(Rejected::OutOfRange(index)),
            Err(_) => rejected.push(Rejected::NotANumber(token.to_string())),
        }
    }

    ParsedSelection {
        selection: Selection { positions },
        rejected,
    }
}
