//! Tool compensation record - a numeric offset adjustment on a machine tool

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::identity::RecordId;

/// Axis or geometry the compensation is applied along
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    X,
    Y,
    Z,
    /// Radius
    R,
    /// Length
    L,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::X => "X",
            Direction::Y => "Y",
            Direction::Z => "Z",
            Direction::R => "R",
            Direction::L => "L",
        }
    }

    /// All directions in display order
    pub fn all() -> &'static [Direction] {
        &[
            Direction::X,
            Direction::Y,
            Direction::Z,
            Direction::R,
            Direction::L,
        ]
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "X" => Ok(Direction::X),
            "Y" => Ok(Direction::Y),
            "Z" => Ok(Direction::Z),
            "R" => Ok(Direction::R),
            "L" => Ok(Direction::L),
            _ => Err(format!(
                "Invalid direction: {}. Use X, Y, Z, R, or L",
                s
            )),
        }
    }
}

/// A submitted tool compensation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCompensation {
    pub id: RecordId,

    /// Machine number the compensation was applied on
    pub machine: u32,

    pub manufacturing_order: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinate_system: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,

    pub direction: Direction,

    /// Signed decimal offset, kept as entered (e.g. "+0.15")
    pub value: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,

    pub signature: String,

    pub created: DateTime<Utc>,
}
