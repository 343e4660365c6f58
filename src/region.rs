//! Fixed identifier ranges for regions and generations.

use serde::{Deserialize, Serialize};

/// Inclusive identifier interval.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IdRange {
    pub start: u32,
    pub end: u32,
}

impl IdRange {
    pub const fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, id: u32) -> bool {
        self.start <= id && id <= self.end
    }

    pub fn len(&self) -> usize {
        if self.end < self.start {
            0
        } else {
            (self.end - self.start + 1) as usize
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn ids(&self) -> impl Iterator<Item = u32> {
        self.start..=self.end
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Region {
    Kanto,
    Johto,
    Hoenn,
    Sinnoh,
    Unova,
    Kalos,
    Alola,
    Galar,
}

impl Region {
    pub const ALL: [Region; 8] = [
        Region::Kanto,
        Region::Johto,
        Region::Hoenn,
        Region::Sinnoh,
        Region::Unova,
        Region::Kalos,
        Region::Alola,
        Region::Galar,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Region::Kanto => "kanto",
            Region::Johto => "johto",
            Region::Hoenn => "hoenn",
            Region::Sinnoh => "sinnoh",
            Region::Unova => "unova",
            Region::Kalos => "kalos",
            Region::Alola => "alola",
            Region::Galar => "galar",
        }
    }

    pub fn generation(self) -> u8 {
        Region::ALL
            .iter()
            .position(|region| *region == self)
            .map(|idx| idx as u8 + 1)
            .unwrap_or(0)
    }

    pub fn range(self) -> IdRange {
        match self {
            Region::Kanto => IdRange::new(1, 151),
            Region::Johto => IdRange::new(152, 251),
            Region::Hoenn => IdRange::new(252, 386),
            Region::Sinnoh => IdRange::new(387, 493),
            Region::Unova => IdRange::new(494, 649),
            Region::Kalos => IdRange::new(650, 721),
            Region::Alola => IdRange::new(722, 809),
            Region::Galar => IdRange::new(810, 905),
        }
    }

    pub fn label(self) -> String {
        let range = self.range();
        let name = self.name();
        let mut chars = name.chars();
        let title = match chars.next() {
            Some(first) => format!("{}{}", first.to_ascii_uppercase(), chars.as_str()),
            None => String::new(),
        };
        format!("{title} ({}-{})", range.start, range.end)
    }

    pub fn from_name(name: &str) -> Option<Region> {
        let name = name.trim().to_ascii_lowercase();
        Region::ALL.into_iter().find(|region| region.name() == name)
    }

    /// Generations are numbered from 1 (Kanto).
    pub fn from_generation(generation: u8) -> Option<Region> {
        Region::ALL.into_iter().find(|region| region.generation() == generation)
    }

    /// Step through `None` (all regions) followed by every region, wrapping.
    pub fn cycle(current: Option<Region>, step: i16) -> Option<Region> {
        let len = Region::ALL.len() as i16 + 1;
        let index = current
            .and_then(|region| Region::ALL.iter().position(|item| *item == region))
            .map(|idx| idx as i16 + 1)
            .unwrap_or(0);
        let next = (index + step).rem_euclid(len);
        if next == 0 {
            None
        } else {
            Some(Region::ALL[(next - 1) as usize])
        }
    }
}
