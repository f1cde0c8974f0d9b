use crate::balls::{Ball, BallMap, ColourId};
use serde::{Deserialize, Serialize};

/// Per-colour ball census at one point in time.
///
/// Assigning into a snapshot copies the balls, so two snapshots never share
/// ball state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    colours: BallMap,
}

impl Snapshot {
    /// Snapshot with an empty entry for each of `colours`.
    pub fn new<I: IntoIterator<Item = ColourId>>(colours: I) -> Self {
        Self {
            colours: crate::balls::empty_ball_map(colours),
        }
    }

    pub fn from_balls(balls: &BallMap) -> Self {
        Self {
            colours: balls.clone(),
        }
    }

    pub fn colours(&self) -> impl Iterator<Item = ColourId> + '_ {
        self.colours.keys().copied()
    }

    pub fn balls(&self, colour: ColourId) -> &[Ball] {
        self.colours.get(&colour).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn count(&self, colour: ColourId) -> usize {
        self.balls(colour).len()
    }

    /// Counts for every colour held by this snapshot.
    pub fn counts(&self) -> Vec<(ColourId, usize)> {
        self.colours
            .iter()
            .map(|(colour, balls)| (*colour, balls.len()))
            .collect()
    }

    /// The first white ball, if any.
    pub fn white(&self) -> Option<&Ball> {
        self.balls(ColourId::White).first()
    }

    pub fn white_mut(&mut self) -> Option<&mut Ball> {
        self.colours
            .get_mut(&ColourId::White)
            .and_then(|balls| balls.first_mut())
    }

    /// Replace the balls of every colour present in `balls`.
    ///
    /// Colours absent from `balls` keep their current entry.
    pub fn assign_balls(&mut self, balls: &BallMap) {
        for (colour, list) in balls {
            self.colours.insert(*colour, list.clone());
        }
    }

    pub fn assign_from_snapshot(&mut self, other: &Snapshot) {
        self.assign_balls(&other.colours);
    }

    /// Ball count of `colour` here minus its count in `other`.
    pub fn compare_ball_diff(&self, colour: ColourId, other: &Snapshot) -> i64 {
        self.count(colour) as i64 - other.count(colour) as i64
    }

    pub fn is_empty(&self) -> bool {
        self.colours.values().all(Vec::is_empty)
    }
}
