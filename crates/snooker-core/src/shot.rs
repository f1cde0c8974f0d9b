//! Shot detection over the three live snapshots
//!
//! A shot starts when the white ball is seen to move between two sampling
//! passes and finishes when it is seen at rest again. On finish, per-colour
//! count drops since the previous shot are reported as potted balls.

use crate::balls::{BallMap, ColourId};
use crate::snapshot::Snapshot;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// White displacement, in millimetres, above which the ball is moving.
pub const MOVED_THRESHOLD_MM: f64 = 0.1;
/// White displacement, in millimetres, at or below which the ball has stopped.
pub const STOPPED_THRESHOLD_MM: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ShotState {
    #[default]
    Idle,
    InProgress,
}

/// Balls of one colour that left the table during a shot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PottedBalls {
    pub colour: ColourId,
    pub count: u32,
}

impl std::fmt::Display for PottedBalls {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Potted {} {}/s", self.count, self.colour.name().to_lowercase())
    }
}

/// Outcome of a finished shot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShotOutcome {
    /// Every colour with a positive count drop, in scan order.
    pub potted: Vec<PottedBalls>,
}

impl ShotOutcome {
    /// The last colour found with a positive drop.
    ///
    /// A shot potting several colours reports only this one through the
    /// single-event API; use [`ShotOutcome::potted`] for all of them.
    pub fn last_potted(&self) -> Option<PottedBalls> {
        self.potted.last().copied()
    }
}

/// What a sampling pass changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassReport {
    pub shot_started: bool,
    pub shot_finished: Option<ShotOutcome>,
}

impl PassReport {
    pub fn white_status_changed(&self) -> Option<bool> {
        if self.shot_started {
            Some(true)
        } else if self.shot_finished.is_some() {
            Some(false)
        } else {
            None
        }
    }
}

/// True when the white has moved between `reference` and `new`.
///
/// Requires exactly matching, non-zero white counts and a reference white
/// that is not already flagged as moving.
pub fn has_shot_started(new: &Snapshot, reference: &Snapshot) -> bool {
    let count = new.count(ColourId::White);
    if count == 0 || count != reference.count(ColourId::White) {
        return false;
    }
    match (new.white(), reference.white()) {
        (Some(a), Some(b)) => !b.is_moving && a.distance_mm(b) > MOVED_THRESHOLD_MM,
        _ => false,
    }
}

/// True when the moving white has come to rest, or has vanished from exactly
/// one of the two snapshots.
pub fn has_shot_finished(new: &Snapshot, reference: &Snapshot) -> bool {
    match (new.white(), reference.white()) {
        (Some(a), Some(b)) => {
            new.count(ColourId::White) == reference.count(ColourId::White)
                && b.is_moving
                && a.distance_mm(b) <= STOPPED_THRESHOLD_MM
        }
        (None, None) => false,
        _ => true,
    }
}

/// Colours whose count dropped from `before` to `after`, white excluded.
pub fn potted_between(before: &Snapshot, after: &Snapshot) -> ShotOutcome {
    let potted = before
        .colours()
        .filter(|colour| *colour != ColourId::White)
        .filter_map(|colour| {
            let diff = before.compare_ball_diff(colour, after);
            (diff > 0).then_some(PottedBalls {
                colour,
                count: diff as u32,
            })
        })
        .collect();
    ShotOutcome { potted }
}

/// Owner of the three live snapshots and the shot state.
#[derive(Debug, Clone, Default)]
pub struct ShotStateMachine {
    state: ShotState,
    seeded: bool,
    last_shot: Snapshot,
    cur_shot: Snapshot,
    temp: Snapshot,
}

impl ShotStateMachine {
    /// Machine whose snapshots start with an empty entry per colour.
    pub fn new<I: IntoIterator<Item = ColourId> + Clone>(colours: I) -> Self {
        Self {
            state: ShotState::Idle,
            seeded: false,
            last_shot: Snapshot::new(colours.clone()),
            cur_shot: Snapshot::new(colours.clone()),
            temp: Snapshot::new(colours),
        }
    }

    pub fn state(&self) -> ShotState {
        self.state
    }

    pub fn last_shot_snapshot(&self) -> &Snapshot {
        &self.last_shot
    }

    pub fn cur_shot_snapshot(&self) -> &Snapshot {
        &self.cur_shot
    }

    pub fn temp_snapshot(&self) -> &Snapshot {
        &self.temp
    }

    pub fn white_is_moving(&self) -> bool {
        self.cur_shot.white().is_some_and(|w| w.is_moving)
    }

    /// Seed the previous and current shot snapshots from the first roster.
    pub fn seed(&mut self, balls: &BallMap) {
        self.last_shot.assign_balls(balls);
        self.cur_shot.assign_balls(balls);
        self.seeded = true;
    }

    /// Run one sampling pass with a freshly classified roster.
    pub fn sample(&mut self, balls: &BallMap) -> PassReport {
        if !self.seeded {
            self.seed(balls);
        }

        let mut report = PassReport::default();
        self.temp.assign_balls(balls);

        let carried = self.cur_shot.white().map(|w| w.is_moving);
        if let (Some(moving), Some(white)) = (carried, self.temp.white_mut()) {
            white.is_moving = moving;
        }

        match self.state {
            ShotState::Idle => {
                if has_shot_started(&self.temp, &self.cur_shot) {
                    info!("WHITE STATUS: moving...");
                    self.set_white_moving(true);
                    self.state = ShotState::InProgress;
                    report.shot_started = true;
                }
            }
            ShotState::InProgress => {
                if has_shot_finished(&self.temp, &self.cur_shot) {
                    info!("WHITE STATUS: stopped...");
                    self.set_white_moving(false);
                    self.state = ShotState::Idle;

                    let outcome = potted_between(&self.last_shot, &self.temp);
                    for potted in &outcome.potted {
                        debug!(colour = %potted.colour, count = potted.count, "count dropped");
                    }
                    if let Some(last) = outcome.last_potted() {
                        info!("{}", last);
                    }
                    report.shot_finished = Some(outcome);
                }
            }
        }

        self.cur_shot.assign_from_snapshot(&self.temp);
        if report.shot_finished.is_some() {
            self.last_shot.assign_from_snapshot(&self.cur_shot);
        }

        report
    }

    fn set_white_moving(&mut self, moving: bool) {
        if let Some(white) = self.cur_shot.white_mut() {
            white.is_moving = moving;
        }
        if let Some(white) = self.temp.white_mut() {
            white.is_moving = moving;
        }
    }
}
