//! User-selected parameters, validated before the provider is called

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::error::{ParamError, Result};

/// Sentinel team-filter value meaning "no filter"
pub const ALL_TEAMS: &str = "All Teams";

/// A selectable season
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct Season(u16);

impl Season {
    pub const MIN: u16 = 2015;
    pub const MAX: u16 = 2025;

    pub fn new(year: u16) -> Result<Self> {
        if (Self::MIN..=Self::MAX).contains(&year) {
            Ok(Self(year))
        } else {
            Err(ParamError::SeasonOutOfRange { year, min: Self::MIN, max: Self::MAX })
        }
    }

    pub fn year(self) -> u16 {
        self.0
    }
}

impl TryFrom<u16> for Season {
    type Error = ParamError;

    fn try_from(year: u16) -> Result<Self> {
        Self::new(year)
    }
}

impl From<Season> for u16 {
    fn from(season: Season) -> Self {
        season.0
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A regular-season or playoff week, 1-18
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Week(u8);

impl Week {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 18;

    pub fn new(week: u8) -> Result<Self> {
        if (Self::MIN..=Self::MAX).contains(&week) {
            Ok(Self(week))
        } else {
            Err(ParamError::WeekOutOfRange { week, min: Self::MIN, max: Self::MAX })
        }
    }

    pub fn number(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Week {
    type Error = ParamError;

    fn try_from(week: u8) -> Result<Self> {
        Self::new(week)
    }
}

impl From<Week> for u8 {
    fn from(week: Week) -> Self {
        week.0
    }
}

impl fmt::Display for Week {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Inclusive week range with `start <= end`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct WeekRange {
    start: Week,
    end: Week,
}

impl WeekRange {
    pub fn new(start: u8, end: u8) -> Result<Self> {
        let start = Week::new(start)?;
        let end = Week::new(end)?;
        if end < start {
            return Err(ParamError::InvertedRange { start: start.number(), end: end.number() });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> Week {
        self.start
    }

    pub fn end(&self) -> Week {
        self.end
    }

    pub fn contains(&self, week: Week) -> bool {
        self.start <= week && week <= self.end
    }

    /// Weeks in ascending order
    pub fn weeks(&self) -> impl Iterator<Item = Week> {
        (self.start.0..=self.end.0).map(Week)
    }

    pub fn len(&self) -> usize {
        (self.end.0 - self.start.0) as usize + 1
    }

    pub fn is_empty(&self) -> bool {
        false
    }
}

impl fmt::Display for WeekRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// Team filter: every team, or one team by exact display name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TeamFilter {
    #[default]
    All,
    Team(String),
}

impl TeamFilter {
    pub fn matches(&self, team_name: &str) -> bool {
        match self {
            TeamFilter::All => true,
            TeamFilter::Team(name) => name == team_name,
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, TeamFilter::All)
    }
}

impl From<&str> for TeamFilter {
    fn from(value: &str) -> Self {
        let value = value.trim();
        if value.is_empty() || value == ALL_TEAMS {
            TeamFilter::All
        } else {
            TeamFilter::Team(value.to_string())
        }
    }
}

impl From<String> for TeamFilter {
    fn from(value: String) -> Self {
        TeamFilter::from(value.as_str())
    }
}

impl From<TeamFilter> for String {
    fn from(filter: TeamFilter) -> Self {
        filter.to_string()
    }
}

impl FromStr for TeamFilter {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(TeamFilter::from(s))
    }
}

impl fmt::Display for TeamFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TeamFilter::All => f.write_str(ALL_TEAMS),
            TeamFilter::Team(name) => f.write_str(name),
        }
    }
}

/// Set of positions to show; empty means every position.
///
/// Positions are trimmed and upper-cased on the way in, including when deserialized, and
/// matched case-insensitively so typed `qb` selects the `QB` rows.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct PositionFilter(BTreeSet<String>);

impl From<Vec<String>> for PositionFilter {
    fn from(positions: Vec<String>) -> Self {
        Self::new(positions)
    }
}

impl From<PositionFilter> for Vec<String> {
    fn from(filter: PositionFilter) -> Self {
        filter.0.into_iter().collect()
    }
}

impl PositionFilter {
    pub fn new<I, S>(positions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(
            positions
                .into_iter()
                .map(|p| p.as_ref().trim().to_ascii_uppercase())
                .filter(|p| !p.is_empty())
                .collect(),
        )
    }

    pub fn matches(&self, position: &str) -> bool {
        self.0.is_empty() || self.0.contains(&position.to_ascii_uppercase())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn positions(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

/// Inclusive lower bound on points for the detail table
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct MinPoints(f64);

impl MinPoints {
    pub fn new(points: f64) -> Result<Self> {
        if points.is_finite() && points >= 0.0 {
            Ok(Self(points))
        } else {
            Err(ParamError::InvalidMinPoints(points))
        }
    }

    pub fn value(self) -> f64 {
        self.0
    }

    pub fn admits(self, points: f64) -> bool {
        points >= self.0
    }
}

impl TryFrom<f64> for MinPoints {
    type Error = ParamError;

    fn try_from(points: f64) -> Result<Self> {
        Self::new(points)
    }
}

impl From<MinPoints> for f64 {
    fn from(min: MinPoints) -> Self {
        min.0
    }
}
