use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Colour of a snooker ball, plus the table cloth pseudo-colour.
///
/// The declaration order is the scan order used wherever colours are
/// iterated (snapshots, matching, potted-ball scans).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ColourId {
    White,
    Red,
    Yellow,
    Green,
    Brown,
    Blue,
    Pink,
    Black,
    /// Cloth colour. Used for the table mask, never assigned to a ball.
    Table,
}

impl ColourId {
    /// Every colour a ball can be attributed to.
    pub const BALLS: [ColourId; 8] = [
        ColourId::White,
        ColourId::Red,
        ColourId::Yellow,
        ColourId::Green,
        ColourId::Brown,
        ColourId::Blue,
        ColourId::Pink,
        ColourId::Black,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ColourId::White => "WHITE",
            ColourId::Red => "RED",
            ColourId::Yellow => "YELLOW",
            ColourId::Green => "GREEN",
            ColourId::Brown => "BROWN",
            ColourId::Blue => "BLUE",
            ColourId::Pink => "PINK",
            ColourId::Black => "BLACK",
            ColourId::Table => "TABLE",
        }
    }

    pub fn is_ball(&self) -> bool {
        !matches!(self, ColourId::Table)
    }
}

impl fmt::Display for ColourId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a colour name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownColour(pub String);

impl fmt::Display for UnknownColour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown colour '{}'", self.0)
    }
}

impl std::error::Error for UnknownColour {}

impl FromStr for ColourId {
    type Err = UnknownColour;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_uppercase();
        ColourId::BALLS
            .iter()
            .chain(std::iter::once(&ColourId::Table))
            .find(|colour| colour.name() == upper)
            .copied()
            .ok_or_else(|| UnknownColour(s.to_string()))
    }
}
