//! Filter/sort engine: a pure function from records and a filter spec to an
//! ordered view.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::region::IdRange;
use crate::state::{RecordFacts, RecordSummary};

pub const TYPE_NAMES: [&str; 18] = [
    "normal", "fire", "water", "electric", "grass", "ice", "fighting", "poison", "ground",
    "flying", "psychic", "bug", "rock", "ghost", "dragon", "dark", "steel", "fairy",
];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortKey {
    #[default]
    Id,
    Name,
    Height,
    Weight,
    BaseExperience,
}

impl SortKey {
    pub const ALL: [SortKey; 5] = [
        SortKey::Id,
        SortKey::Name,
        SortKey::Height,
        SortKey::Weight,
        SortKey::BaseExperience,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SortKey::Id => "Dex Number",
            SortKey::Name => "Name",
            SortKey::Height => "Height",
            SortKey::Weight => "Weight",
            SortKey::BaseExperience => "Base Experience",
        }
    }

    pub fn next(self) -> SortKey {
        let index = SortKey::ALL.iter().position(|key| *key == self).unwrap_or(0);
        SortKey::ALL[(index + 1) % SortKey::ALL.len()]
    }

    /// Whether ordering by this key needs per-record facts.
    pub fn uses_facts(self) -> bool {
        matches!(
            self,
            SortKey::Height | SortKey::Weight | SortKey::BaseExperience
        )
    }

    fn attribute(self, facts: &RecordFacts) -> Option<u32> {
        match self {
            SortKey::Height => Some(u32::from(facts.height)),
            SortKey::Weight => Some(u32::from(facts.weight)),
            SortKey::BaseExperience => facts.base_experience.map(u32::from),
            SortKey::Id | SortKey::Name => None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSpec {
    pub selected_types: BTreeSet<String>,
    pub selected_range: Option<IdRange>,
    pub sort_key: SortKey,
}

impl FilterSpec {
    /// A default spec leaves the base collection untouched.
    pub fn is_active(&self) -> bool {
        !self.selected_types.is_empty()
            || self.selected_range.is_some()
            || self.sort_key != SortKey::Id
    }

    pub fn needs_facts(&self) -> bool {
        !self.selected_types.is_empty() || self.sort_key.uses_facts()
    }

    /// Returns true when the type is now selected.
    pub fn toggle_type(&mut self, name: &str) -> bool {
        if self.selected_types.remove(name) {
            false
        } else {
            self.selected_types.insert(name.to_string());
            true
        }
    }
}

/// Read access to whatever per-record facts the session has gathered.
pub trait FactsLookup {
    fn facts(&self, id: u32) -> Option<&RecordFacts>;
}

impl FactsLookup for HashMap<u32, RecordFacts> {
    fn facts(&self, id: u32) -> Option<&RecordFacts> {
        self.get(&id)
    }
}

/// Filter and order `records`. Deterministic and side-effect free; ties keep
/// their original relative order.
pub fn apply(
    records: &[RecordSummary],
    spec: &FilterSpec,
    facts: &impl FactsLookup,
) -> Vec<RecordSummary> {
    let mut view: Vec<&RecordSummary> = records
        .iter()
        .filter(|record| in_range(record, spec))
        .filter(|record| has_selected_type(record, spec, facts))
        .collect();

    match spec.sort_key {
        SortKey::Id => view.sort_by_key(|record| id_key(record)),
        SortKey::Name => view.sort_by_key(|record| record.name.to_lowercase()),
        key => view.sort_by_key(|record| attribute_key(record, key, facts)),
    }

    view.into_iter().cloned().collect()
}

/// Records inside the range whose facts the spec needs but the lookup lacks.
pub fn missing_facts(
    records: &[RecordSummary],
    spec: &FilterSpec,
    facts: &impl FactsLookup,
) -> Vec<RecordSummary> {
    if !spec.needs_facts() {
        return Vec::new();
    }
    records
        .iter()
        .filter(|record| in_range(record, spec))
        .filter(|record| match record.id() {
            Some(id) => facts.facts(id).is_none(),
            None => false,
        })
        .cloned()
        .collect()
}

fn in_range(record: &RecordSummary, spec: &FilterSpec) -> bool {
    match spec.selected_range {
        Some(range) => record.id().is_some_and(|id| range.contains(id)),
        None => true,
    }
}

fn has_selected_type(
    record: &RecordSummary,
    spec: &FilterSpec,
    facts: &impl FactsLookup,
) -> bool {
    if spec.selected_types.is_empty() {
        return true;
    }
    record
        .id()
        .and_then(|id| facts.facts(id))
        .is_some_and(|facts| {
            facts
                .types
                .iter()
                .any(|tag| spec.selected_types.contains(tag))
        })
}

fn id_key(record: &RecordSummary) -> (bool, u32) {
    match record.id() {
        Some(id) => (false, id),
        None => (true, u32::MAX),
    }
}

// Records with a known attribute come first; the rest follow in id order.
fn attribute_key(record: &RecordSummary, key: SortKey, facts: &impl FactsLookup) -> (bool, u32) {
    let id = record.id();
    let value = id
        .and_then(|id| facts.facts(id))
        .and_then(|facts| key.attribute(facts));
    match value {
        Some(value) => (false, value),
        None => (true, id.unwrap_or(u32::MAX)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn record(name: &str, id: u32) -> RecordSummary {
        RecordSummary::new(name, format!("https://pokeapi.co/api/v2/pokemon/{id}/"))
    }

    fn facts(id: u32, types: &[&str], height: u16, weight: u16) -> RecordFacts {
        RecordFacts {
            id,
            types: types.iter().map(|t| t.to_string()).collect(),
            height,
            weight,
            base_experience: None,
        }
    }

    fn names(view: &[RecordSummary]) -> Vec<&str> {
        view.iter().map(|record| record.name.as_str()).collect()
    }

    #[test]
    fn range_filter_keeps_inclusive_bounds() {
        let records: Vec<_> = (1..=10).map(|id| record(&format!("mon{id}"), id)).collect();
        let spec = FilterSpec {
            selected_range: Some(IdRange::new(3, 5)),
            ..Default::default()
        };
        let view = apply(&records, &spec, &HashMap::new());
        let ids: Vec<_> = view.iter().filter_map(RecordSummary::id).collect();
        assert_eq!(ids, vec![3, 4, 5]);
    }

    #[test]
    fn name_sort_is_case_insensitive_and_stable() {
        let records = vec![
            record("Bulbasaur", 1),
            record("abra", 63),
            record("bulbasaur", 2),
            record("Abra", 64),
        ];
        let spec = FilterSpec {
            sort_key: SortKey::Name,
            ..Default::default()
        };
        let view = apply(&records, &spec, &HashMap::new());
        assert_eq!(names(&view), vec!["abra", "Abra", "Bulbasaur", "bulbasaur"]);
    }

    #[test]
    fn id_sort_is_numeric_not_lexicographic() {
        let records = vec![record("c", 100), record("a", 9), record("b", 25)];
        let view = apply(&records, &FilterSpec::default(), &HashMap::new());
        assert_eq!(names(&view), vec!["a", "b", "c"]);
    }

    #[test]
    fn type_filter_uses_known_facts_only() {
        let records = vec![record("charmander", 4), record("squirtle", 7), record("vulpix", 37)];
        let mut lookup = HashMap::new();
        lookup.insert(4, facts(4, &["fire"], 6, 85));
        lookup.insert(7, facts(7, &["water"], 5, 90));
        let mut spec = FilterSpec::default();
        spec.toggle_type("fire");

        let view = apply(&records, &spec, &lookup);
        assert_eq!(names(&view), vec!["charmander"]);

        let missing = missing_facts(&records, &spec, &lookup);
        assert_eq!(names(&missing), vec!["vulpix"]);
    }

    #[test]
    fn attribute_sort_puts_unknown_last_by_id() {
        let records = vec![record("d", 40), record("a", 10), record("b", 20), record("c", 30)];
        let mut lookup = HashMap::new();
        lookup.insert(20, facts(20, &["normal"], 12, 1));
        lookup.insert(30, facts(30, &["normal"], 3, 1));
        let spec = FilterSpec {
            sort_key: SortKey::Height,
            ..Default::default()
        };
        let view = apply(&records, &spec, &lookup);
        assert_eq!(names(&view), vec!["c", "b", "a", "d"]);
    }

    #[test]
    fn equal_attributes_keep_original_order() {
        let records = vec![record("x", 3), record("y", 1), record("z", 2)];
        let mut lookup = HashMap::new();
        for id in 1..=3 {
            lookup.insert(id, facts(id, &["rock"], 10, 100));
        }
        let spec = FilterSpec {
            sort_key: SortKey::Weight,
            ..Default::default()
        };
        let view = apply(&records, &spec, &lookup);
        assert_eq!(names(&view), vec!["x", "y", "z"]);
    }

    #[test]
    fn apply_is_deterministic() {
        let records: Vec<_> = (1..=30)
            .rev()
            .map(|id| record(&format!("n{}", id % 7), id))
            .collect();
        let spec = FilterSpec {
            sort_key: SortKey::Name,
            selected_range: Some(IdRange::new(5, 25)),
            ..Default::default()
        };
        let first = apply(&records, &spec, &HashMap::new());
        let second = apply(&records, &spec, &HashMap::new());
        assert_eq!(first, second);
        assert!(first
            .iter()
            .all(|record| record.id().is_some_and(|id| (5..=25).contains(&id))));
    }

    #[test]
    fn spec_activity() {
        let mut spec = FilterSpec::default();
        assert!(!spec.is_active());
        assert!(spec.toggle_type("ghost"));
        assert!(spec.is_active() && spec.needs_facts());
        assert!(!spec.toggle_type("ghost"));
        spec.sort_key = SortKey::Name;
        assert!(spec.is_active());
        assert!(!spec.needs_facts());
    }
}
