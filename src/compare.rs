//! Two-slot compare selector and the side-by-side stat comparison.

use serde::{Deserialize, Serialize};

use crate::error::{DexError, DexResult};
use crate::state::{ComparePair, RecordSummary};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompareSelection {
    #[default]
    Empty,
    One(RecordSummary),
    Two(RecordSummary, RecordSummary),
}

/// What a successful `select` did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SelectOutcome {
    /// First slot filled.
    Started,
    /// Second slot filled; the pair should be loaded and shown.
    Completed,
    /// A full selection was replaced by a fresh single pick.
    Restarted,
}

impl CompareSelection {
    pub fn select(&mut self, record: RecordSummary) -> DexResult<SelectOutcome> {
        let current = std::mem::take(self);
        let (next, outcome) = match current {
            CompareSelection::Empty => (CompareSelection::One(record), SelectOutcome::Started),
            CompareSelection::One(first) => {
                if same_record(&first, &record) {
                    *self = CompareSelection::One(first);
                    return Err(DexError::DuplicateSelection(record.name));
                }
                (
                    CompareSelection::Two(first, record),
                    SelectOutcome::Completed,
                )
            }
            CompareSelection::Two(..) => (CompareSelection::One(record), SelectOutcome::Restarted),
        };
        *self = next;
        Ok(outcome)
    }

    pub fn close(&mut self) {
        *self = CompareSelection::Empty;
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CompareSelection::Empty)
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, CompareSelection::Two(..))
    }

    pub fn contains(&self, record: &RecordSummary) -> bool {
        match self {
            CompareSelection::Empty => false,
            CompareSelection::One(first) => same_record(first, record),
            CompareSelection::Two(first, second) => {
                same_record(first, record) || same_record(second, record)
            }
        }
    }

    pub fn pair(&self) -> Option<(&RecordSummary, &RecordSummary)> {
        match self {
            CompareSelection::Two(first, second) => Some((first, second)),
            _ => None,
        }
    }

    pub fn names(&self) -> Vec<String> {
        match self {
            CompareSelection::Empty => Vec::new(),
            CompareSelection::One(first) => vec![first.name.clone()],
            CompareSelection::Two(first, second) => {
                vec![first.name.clone(), second.name.clone()]
            }
        }
    }
}

// Identity is the identifier when both locators carry one, otherwise the
// case-folded name.
fn same_record(a: &RecordSummary, b: &RecordSummary) -> bool {
    match (a.id(), b.id()) {
        (Some(left), Some(right)) => left == right,
        _ => a.name.eq_ignore_ascii_case(&b.name),
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Edge {
    Left,
    Right,
    Tie,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatLine {
    pub name: String,
    pub left: Option<u16>,
    pub right: Option<u16>,
    pub edge: Edge,
}

/// Stats of both records in the left record's order, followed by any stat
/// only the right one has.
pub fn stat_lines(pair: &ComparePair) -> Vec<StatLine> {
    let mut names: Vec<&str> = pair.left.stats.iter().map(|stat| stat.name.as_str()).collect();
    for stat in &pair.right.stats {
        if !names.contains(&stat.name.as_str()) {
            names.push(&stat.name);
        }
    }

    names
        .into_iter()
        .map(|name| {
            let left = pair.left.stat(name);
            let right = pair.right.stat(name);
            let edge = match (left, right) {
                (Some(l), Some(r)) if l > r => Edge::Left,
                (Some(l), Some(r)) if r > l => Edge::Right,
                (Some(_), None) => Edge::Left,
                (None, Some(_)) => Edge::Right,
                _ => Edge::Tie,
            };
            StatLine {
                name: name.to_string(),
                left,
                right,
                edge,
            }
        })
        .collect()
}

pub fn stat_total(stats: &[StatLine], side: Edge) -> u32 {
    stats
        .iter()
        .filter_map(|line| match side {
            Edge::Left => line.left,
            Edge::Right => line.right,
            Edge::Tie => None,
        })
        .map(u32::from)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{RecordDetail, RecordStat};

    fn record(name: &str, id: u32) -> RecordSummary {
        RecordSummary::new(name, format!("https://pokeapi.co/api/v2/pokemon/{id}/"))
    }

    fn detail(name: &str, stats: &[(&str, u16)]) -> RecordDetail {
        RecordDetail {
            id: 1,
            name: name.into(),
            url: String::new(),
            height: 1,
            weight: 1,
            base_experience: None,
            types: vec![],
            abilities: vec![],
            stats: stats
                .iter()
                .map(|(name, value)| RecordStat {
                    name: name.to_string(),
                    value: *value,
                })
                .collect(),
            moves: vec![],
            species_url: None,
        }
    }

    #[test]
    fn empty_to_one_to_two_then_restart() {
        let mut selection = CompareSelection::Empty;
        assert_eq!(selection.select(record("bulbasaur", 1)), Ok(SelectOutcome::Started));
        assert_eq!(selection.select(record("charmander", 4)), Ok(SelectOutcome::Completed));
        assert!(selection.is_complete());
        assert_eq!(
            selection.pair().map(|(a, b)| (a.name.as_str(), b.name.as_str())),
            Some(("bulbasaur", "charmander"))
        );

        assert_eq!(selection.select(record("squirtle", 7)), Ok(SelectOutcome::Restarted));
        assert_eq!(selection, CompareSelection::One(record("squirtle", 7)));
    }

    #[test]
    fn duplicate_pick_is_rejected_without_change() {
        let mut selection = CompareSelection::Empty;
        selection.select(record("pikachu", 25)).unwrap();
        let err = selection.select(record("pikachu", 25)).unwrap_err();
        assert_eq!(err, DexError::DuplicateSelection("pikachu".into()));
        assert_eq!(selection, CompareSelection::One(record("pikachu", 25)));
    }

    #[test]
    fn identity_falls_back_to_name() {
        let mut selection = CompareSelection::One(RecordSummary::new("Eevee", "local"));
        assert!(selection.contains(&RecordSummary::new("eevee", "elsewhere")));
        assert!(selection
            .select(RecordSummary::new("eevee", "elsewhere"))
            .is_err());
    }

    #[test]
    fn close_clears_both_slots() {
        let mut selection = CompareSelection::Two(record("a", 1), record("b", 2));
        selection.close();
        assert!(selection.is_empty());
        assert!(selection.names().is_empty());
    }

    #[test]
    fn stat_lines_mark_the_higher_side() {
        let pair = ComparePair {
            left: detail("a", &[("hp", 45), ("attack", 49), ("speed", 45)]),
            right: detail("b", &[("hp", 39), ("attack", 52), ("speed", 45)]),
        };
        let lines = stat_lines(&pair);
        let edges: Vec<_> = lines.iter().map(|line| line.edge).collect();
        assert_eq!(edges, vec![Edge::Left, Edge::Right, Edge::Tie]);
        assert_eq!(stat_total(&lines, Edge::Left), 139);
        assert_eq!(stat_total(&lines, Edge::Right), 136);
    }
}
