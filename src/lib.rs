pub mod client;
pub mod wire;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ---------------------------------------------------------------------------
// Domain types — clean model, independent of the srcomp wire format
// ---------------------------------------------------------------------------

/// A point in time reported by the API.
///
/// The server sends ISO-8601 strings with a UTC offset. Parsing preserves the
/// absolute instant (offsets are folded into UTC). A string the server sends
/// that does not parse is kept verbatim as `Invalid` rather than failing the
/// whole request; this looseness is inherited from upstream, which performs no
/// timestamp validation at all.
#[derive(Debug, Clone, PartialEq)]
pub enum Timestamp {
    At(DateTime<Utc>),
    Invalid(String),
}

impl Timestamp {
    /// Parse an ISO-8601 string with offset. Never fails; garbage input
    /// becomes `Invalid` carrying the original string.
    pub fn parse(raw: &str) -> Self {
        match DateTime::parse_from_rfc3339(raw) {
            Ok(dt) => Timestamp::At(dt.with_timezone(&Utc)),
            Err(_) => Timestamp::Invalid(raw.to_owned()),
        }
    }

    pub fn datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            Timestamp::At(dt) => Some(*dt),
            Timestamp::Invalid(_) => None,
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Timestamp::At(_))
    }
}

/// A competition arena. `name` is the canonical identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Arena {
    pub name: String,
    pub display_name: String,
    /// CSS-compatible colour string.
    pub colour: String,
    /// Url path to fetch this information.
    pub get: String,
}

/// A starting zone within an arena. The number is only unique within an
/// arena; all arenas are assumed to share the same design.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Corner {
    pub number: u32,
    pub colour: String,
    pub get: String,
}

/// An area within the venue assigned to a shepherd.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub display_name: String,
    /// TLAs of the teams currently in this location.
    pub teams: Vec<String>,
    pub shepherds: Shepherd,
    pub get: String,
}

/// The shepherd's name is usually a role name rather than a person's name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shepherd {
    pub name: String,
    pub colour: String,
}

/// A team of competitors. The TLA is the canonical identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    /// Team name, not including the TLA. Clients often render "TLA: Name".
    pub name: String,
    pub tla: String,
    /// League position; tied teams share a value.
    pub league_pos: u32,
    pub location: LocationRef,
    pub scores: TeamScores,
    pub get: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationRef {
    pub name: String,
    pub get: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamScores {
    /// Game points earned across the team's league matches.
    pub game: i64,
    /// League points earned across the team's league matches.
    pub league: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchType {
    League,
    Knockout,
    Tiebreaker,
}

/// A match between teams. `arena` and `num` together form the canonical
/// identity.
#[derive(Debug, Clone, PartialEq)]
pub struct Match {
    pub arena: String,
    pub num: u32,
    /// Usually "Match 42", but accounts for "Quarter 3", "Final", etc.
    pub display_name: String,
    /// One entry per corner in the arena; `None` marks an empty corner.
    pub teams: Vec<Option<String>>,
    pub match_type: MatchType,
    pub times: MatchTimes,
    /// Present once the match has been played and scored.
    pub scores: Option<Scores>,
}

/// Timing information for a match. Delays and other schedule adjustments are
/// already applied by the server.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchTimes {
    /// When the game itself is underway.
    pub game: TimeWindow,
    /// When the match occupies the arena; a superset of the game window.
    pub slot: TimeWindow,
    pub staging: StagingTimes,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimeWindow {
    pub start: Timestamp,
    pub end: Timestamp,
}

/// Timing for preparing teams ahead of their match.
#[derive(Debug, Clone, PartialEq)]
pub struct StagingTimes {
    /// Earliest time a team can present themselves for the match.
    pub opens: Timestamp,
    /// Latest time a team can present themselves for the match.
    pub closes: Timestamp,
    /// When teams should be signalled to move to the staging area.
    pub signal_teams: Timestamp,
    /// When each shepherd should be signalled to start looking for teams.
    /// Keyed by shepherd name; the key set is data-dependent.
    pub signal_shepherds: HashMap<String, Timestamp>,
}

/// Scores for a played match. League and knockout matches carry differently
/// shaped blocks, told apart by the `league` vs `normalised` field. The TLA
/// key sets within one block's mappings are guaranteed identical by the
/// server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scores {
    League(LeagueScores),
    Knockout(KnockoutScores),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeagueScores {
    /// Points earned per team under the rules of the game.
    pub game: HashMap<String, f64>,
    /// Normalised points contributing to league position.
    pub league: HashMap<String, u32>,
    /// Ranking of teams within this match; ties share a value.
    pub ranking: HashMap<String, u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnockoutScores {
    pub game: HashMap<String, f64>,
    pub normalised: HashMap<String, u32>,
    pub ranking: HashMap<String, u32>,
}

/// A single session of matches.
#[derive(Debug, Clone, PartialEq)]
pub struct Period {
    pub period_type: MatchType,
    pub description: String,
    /// Earliest that a match slot within the period can start.
    pub start_time: Timestamp,
    /// Latest that a match slot would be scheduled to start, before delays.
    pub end_time: Timestamp,
    /// Latest that a match slot within the period can start.
    pub max_end_time: Timestamp,
    pub matches: MatchNumberRange,
}

/// Bounds on the match numbers contained in a period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchNumberRange {
    pub first_num: u32,
    pub last_num: u32,
}

/// The current state of the competition.
#[derive(Debug, Clone, PartialEq)]
pub struct Current {
    /// Delay relative to the original schedule, in seconds. Informational
    /// only; never use it for computation.
    pub delay: i64,
    /// Matches whose slot window contains the current time.
    pub matches: Vec<Match>,
    /// Matches whose staging open/close window contains the current time.
    pub staging_matches: Vec<Match>,
    /// Matches between their earliest shepherding signal and staging close.
    pub shepherding_matches: Vec<Match>,
    /// The canonical current time.
    pub time: Timestamp,
}
