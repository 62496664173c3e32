//! Wire types for the srcomp HTTP API — serde shapes for deserializing the
//! per-resource response envelopes. Time-bearing payloads arrive with every
//! date field as an ISO-8601 string; the map functions in `client` convert
//! them to the clean domain types.

use crate::{Arena, Corner, Location, MatchNumberRange, MatchType, Scores, Team};
use serde::Deserialize;
use std::collections::HashMap;

// ---------------------------------------------------------------------------
// Response envelopes — one per resource, keyed by the resource name
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct ArenasResponse {
    pub arenas: HashMap<String, Arena>,
}

#[derive(Debug, Deserialize)]
pub struct CornersResponse {
    pub corners: HashMap<u32, Corner>,
}

#[derive(Debug, Deserialize)]
pub struct CurrentResponse {
    pub current: RawCurrent,
}

#[derive(Debug, Deserialize)]
pub struct LocationsResponse {
    pub locations: HashMap<String, Location>,
}

#[derive(Debug, Deserialize)]
pub struct KnockoutResponse {
    pub rounds: Vec<Vec<RawMatch>>,
}

#[derive(Debug, Deserialize)]
pub struct LastScoredResponse {
    pub last_scored_match: u32,
}

/// The `/matches` envelope also carries a `last_scored` sibling key, which
/// this client ignores (serde drops unknown fields).
#[derive(Debug, Deserialize)]
pub struct MatchesResponse {
    pub matches: Vec<RawMatch>,
}

#[derive(Debug, Deserialize)]
pub struct PeriodsResponse {
    pub periods: Vec<RawPeriod>,
}

#[derive(Debug, Deserialize)]
pub struct StateResponse {
    pub state: String,
}

#[derive(Debug, Deserialize)]
pub struct TeamsResponse {
    pub teams: HashMap<String, Team>,
}

#[derive(Debug, Deserialize)]
pub struct TiebreakerResponse {
    pub tiebreaker: RawMatch,
}

// ---------------------------------------------------------------------------
// Raw time-bearing payloads — dates still as strings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct RawMatch {
    pub arena: String,
    pub num: u32,
    pub display_name: String,
    pub teams: Vec<Option<String>>,
    #[serde(rename = "type")]
    pub match_type: MatchType,
    pub times: RawMatchTimes,
    #[serde(default)]
    pub scores: Option<Scores>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawMatchTimes {
    pub game: RawTimeWindow,
    pub slot: RawTimeWindow,
    pub staging: RawStagingTimes,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawTimeWindow {
    pub start: String,
    pub end: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawStagingTimes {
    pub opens: String,
    pub closes: String,
    pub signal_teams: String,
    /// Keyed by shepherd name; the key set varies per competition.
    pub signal_shepherds: HashMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawPeriod {
    #[serde(rename = "type")]
    pub period_type: MatchType,
    pub description: String,
    pub start_time: String,
    pub end_time: String,
    pub max_end_time: String,
    pub matches: MatchNumberRange,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawCurrent {
    pub delay: i64,
    pub matches: Vec<RawMatch>,
    pub staging_matches: Vec<RawMatch>,
    pub shepherding_matches: Vec<RawMatch>,
    pub time: String,
}
