use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::AppError;

pub const MIN_MARKS: u8 = 0;
pub const MAX_MARKS: u8 = 100;

/// Message shown when a mark cannot be accepted.
pub const MARKS_RANGE_MESSAGE: &str = "Please enter valid marks (0-100)";

/// A mark known to lie in `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Marks(u8);

impl Marks {
    pub fn new(value: i64) -> Result<Self, AppError> {
        if (MIN_MARKS as i64..=MAX_MARKS as i64).contains(&value) {
            Ok(Marks(value as u8))
        } else {
            Err(AppError::invalid_field("marks", MARKS_RANGE_MESSAGE))
        }
    }

    /// Parse user input. Blank and non-integer input is rejected the same
    /// way as out-of-range input.
    pub fn parse(input: &str) -> Result<Self, AppError> {
        input
            .trim()
            .parse::<i64>()
            .map_err(|_| AppError::invalid_field("marks", MARKS_RANGE_MESSAGE))
            .and_then(Marks::new)
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn grade(self) -> Grade {
        grade(self)
    }
}

impl TryFrom<i64> for Marks {
    type Error = AppError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Marks::new(value)
    }
}

impl From<Marks> for u8 {
    fn from(m: Marks) -> u8 {
        m.0
    }
}

impl fmt::Display for Marks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Letter grades, best first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Grade {
    #[serde(rename = "A+")]
    APlus,
    A,
    B,
    C,
    D,
    F,
}

/// Canonical threshold table: inclusive lower bounds, highest first.
/// Anything below the last bound is an `F`.
pub const GRADE_TABLE: [(u8, Grade); 5] = [
    (90, Grade::APlus),
    (80, Grade::A),
    (70, Grade::B),
    (60, Grade::C),
    (50, Grade::D),
];

/// Letter grade for a mark under [`GRADE_TABLE`].
pub fn grade(marks: Marks) -> Grade {
    GRADE_TABLE
        .iter()
        .find(|(floor, _)| marks.value() >= *floor)
        .map(|(_, g)| *g)
        .unwrap_or(Grade::F)
}

impl Grade {
    pub const ALL: [Grade; 6] = [
        Grade::APlus,
        Grade::A,
        Grade::B,
        Grade::C,
        Grade::D,
        Grade::F,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Grade::APlus => "A+",
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        }
    }

    /// Visual tone used to colour grade badges.
    pub fn tone(&self) -> &'static str {
        match self {
            Grade::APlus => "excellent",
            Grade::A => "good",
            Grade::B => "fair",
            Grade::C => "warning",
            Grade::D => "poor",
            Grade::F => "failing",
        }
    }

    pub fn is_passing(&self) -> bool {
        *self != Grade::F
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
