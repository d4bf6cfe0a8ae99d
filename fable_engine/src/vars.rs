//! Variable, switch and self-switch stores, plus the random value seam.
//!
//! Variables and switches are sparse arrays that grow on write; reads past
//! the end return the zero value. Self-switches are booleans scoped to a
//! `(map, room, event, switch)` 4-tuple so two events never alias.

use std::collections::BTreeMap;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Sparse integer array indexed by variable id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Variables {
    values: Vec<i64>,
}

impl Variables {
    pub fn get(&self, id: u32) -> i64 {
        self.values.get(id as usize).copied().unwrap_or(0)
    }

    pub fn set(&mut self, id: u32, value: i64) {
        let idx = id as usize;
        if idx >= self.values.len() {
            self.values.resize(idx + 1, 0);
        }
        self.values[idx] = value;
    }

    pub fn reset(&mut self) {
        self.values.clear();
    }
}

/// Sparse boolean array indexed by switch id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Switches {
    values: Vec<bool>,
}

impl Switches {
    pub fn get(&self, id: u32) -> bool {
        self.values.get(id as usize).copied().unwrap_or(false)
    }

    pub fn set(&mut self, id: u32, value: bool) {
        let idx = id as usize;
        if idx >= self.values.len() {
            self.values.resize(idx + 1, false);
        }
        self.values[idx] = value;
    }

    pub fn reset(&mut self) {
        self.values.clear();
    }
}

/// Per-event booleans keyed by `(map, room, event, switch)`.
///
/// A `BTreeMap` keeps encode order deterministic across saves.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SelfSwitches {
    values: BTreeMap<(i64, i64, i64, u32), bool>,
}

impl SelfSwitches {
    pub fn get(&self, map_id: i64, room_id: i64, event_id: i64, switch_id: u32) -> bool {
        self.values
            .get(&(map_id, room_id, event_id, switch_id))
            .copied()
            .unwrap_or(false)
    }

    pub fn set(&mut self, map_id: i64, room_id: i64, event_id: i64, switch_id: u32, value: bool) {
        self.values.insert((map_id, room_id, event_id, switch_id), value);
    }

    pub fn reset(&mut self) {
        self.values.clear();
    }
}

/// Host-supplied randomness seam so scripted randomness is testable.
pub trait RandomSource {
    /// Raw sample; negative and overflowing values are legal.
    fn next_int(&mut self) -> i64;
}

/// Default source backed by the thread RNG.
#[derive(Debug, Default)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn next_int(&mut self) -> i64 {
        rand::rng().random()
    }
}

/// Resolve a scripted `random [begin, end)` value.
///
/// The raw sample is reinterpreted as unsigned before the modulo so
/// negative or overflowing samples can never escape the range.
pub fn random_value(source: &mut dyn RandomSource, begin: i64, end: i64) -> i64 {
    if end <= begin {
        return begin;
    }
    let span = (end - begin) as u64;
    begin + (source.next_int() as u64 % span) as i64
}

#[cfg(test)]
pub(crate) struct FixedRandom {
    pub samples: Vec<i64>,
    pub at: usize,
}

#[cfg(test)]
impl FixedRandom {
    pub fn new(samples: Vec<i64>) -> Self {
        Self { samples, at: 0 }
    }
}

#[cfg(test)]
impl RandomSource for FixedRandom {
    fn next_int(&mut self) -> i64 {
        let sample = self.samples[self.at % self.samples.len()];
        self.at += 1;
        sample
    }
}
