use crate::wire::{
    ArenasResponse, CornersResponse, CurrentResponse, KnockoutResponse, LastScoredResponse,
    LocationsResponse, MatchesResponse, PeriodsResponse, RawCurrent, RawMatch, RawPeriod,
    RawStagingTimes, RawTimeWindow, StateResponse, TeamsResponse, TiebreakerResponse,
};
use crate::{
    Arena, Corner, Current, Location, Match, MatchTimes, Period, StagingTimes, Team, TimeWindow,
    Timestamp,
};
use log::debug;
use reqwest::Client;
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

pub type ApiResult<T> = Result<T, ApiError>;

/// srcomp HTTP API client, configured with the root URL of a competition
/// API deployment (e.g. `https://srcomp.example.org/comp-api`).
///
/// The root is used verbatim: paths are appended directly, so pass it
/// without a trailing slash. The client holds no mutable state; independent
/// calls are fully independent and may run concurrently.
#[derive(Debug, Clone)]
pub struct SrCompApi {
    client: Client,
    api_root: String,
    timeout: Duration,
}

#[derive(Debug)]
pub enum ApiError {
    /// The request never produced a response (DNS, refused connection, ...).
    Network(reqwest::Error, String),
    /// The server answered with a non-2xx status.
    Api(reqwest::Error, String),
    /// The body was not valid JSON, or the expected envelope key was absent.
    Parsing(reqwest::Error, String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Network(e, url) => write!(f, "Network error for {url}: {e}"),
            ApiError::Api(e, url) => write!(f, "API error for {url}: {e}"),
            ApiError::Parsing(e, url) => write!(f, "Parse error for {url}: {e}"),
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApiError::Network(e, _) | ApiError::Api(e, _) | ApiError::Parsing(e, _) => Some(e),
        }
    }
}

impl SrCompApi {
    pub fn new(api_root: impl Into<String>) -> Self {
        Self {
            client: Client::builder()
                .user_agent("srcomp-api/0.1 (competition data client)")
                .build()
                .unwrap_or_default(),
            api_root: api_root.into(),
            timeout: Duration::from_secs(10),
        }
    }

    /// All arenas, keyed by arena name.
    pub async fn arenas(&self) -> ApiResult<HashMap<String, Arena>> {
        let raw: ArenasResponse = self.get("/arenas").await?;
        Ok(raw.arenas)
    }

    /// All corners, keyed by corner number.
    pub async fn corners(&self) -> ApiResult<HashMap<u32, Corner>> {
        let raw: CornersResponse = self.get("/corners").await?;
        Ok(raw.corners)
    }

    /// The live state of the competition: matches in their slot, matches
    /// staging, matches being shepherded, and the canonical server time.
    pub async fn current(&self) -> ApiResult<Current> {
        let raw: CurrentResponse = self.get("/current").await?;
        Ok(map_current(raw.current))
    }

    /// Venue locations, keyed by location name.
    pub async fn locations(&self) -> ApiResult<HashMap<String, Location>> {
        let raw: LocationsResponse = self.get("/locations").await?;
        Ok(raw.locations)
    }

    /// The knockout rounds, outermost first; each round is a list of matches.
    pub async fn knockouts(&self) -> ApiResult<Vec<Vec<Match>>> {
        let raw: KnockoutResponse = self.get("/knockout").await?;
        Ok(raw
            .rounds
            .into_iter()
            .map(|round| round.into_iter().map(map_match).collect())
            .collect())
    }

    /// The number of the most recently scored match.
    pub async fn last_scored_match(&self) -> ApiResult<u32> {
        let raw: LastScoredResponse = self.get("/matches/last_scored_match").await?;
        Ok(raw.last_scored_match)
    }

    /// All matches, in schedule order.
    pub async fn matches(&self) -> ApiResult<Vec<Match>> {
        // TODO: support filtering the returned list of matches once the
        // server-side query parameters stabilise.
        let raw: MatchesResponse = self.get("/matches").await?;
        Ok(raw.matches.into_iter().map(map_match).collect())
    }

    /// The sessions making up the competition schedule.
    pub async fn periods(&self) -> ApiResult<Vec<Period>> {
        let raw: PeriodsResponse = self.get("/periods").await?;
        Ok(raw.periods.into_iter().map(map_period).collect())
    }

    /// The overall competition state token.
    pub async fn state(&self) -> ApiResult<String> {
        let raw: StateResponse = self.get("/state").await?;
        Ok(raw.state)
    }

    /// All teams, keyed by TLA.
    pub async fn teams(&self) -> ApiResult<HashMap<String, Team>> {
        let raw: TeamsResponse = self.get("/teams").await?;
        Ok(raw.teams)
    }

    /// The tiebreaker match, if the competition has one.
    pub async fn tiebreaker(&self) -> ApiResult<Match> {
        let raw: TiebreakerResponse = self.get("/tiebreaker").await?;
        Ok(map_match(raw.tiebreaker))
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let url = format!("{}{}", self.api_root, path);
        debug!("GET {url}");
        let response = self
            .client
            .get(&url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ApiError::Network(e, url.clone()))?;

        let response = response
            .error_for_status()
            .map_err(|e| ApiError::Api(e, url.clone()))?;

        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Parsing(e, url))
    }
}

// ---------------------------------------------------------------------------
// Mapping: wire types → clean domain types
// ---------------------------------------------------------------------------

/// Convert every date string in a match's `times` block to a `Timestamp`,
/// passing all other fields through untouched. `signal_shepherds` is
/// converted entry by entry; its key set is data-dependent.
fn map_match(raw: RawMatch) -> Match {
    Match {
        arena: raw.arena,
        num: raw.num,
        display_name: raw.display_name,
        teams: raw.teams,
        match_type: raw.match_type,
        times: MatchTimes {
            game: map_window(raw.times.game),
            slot: map_window(raw.times.slot),
            staging: map_staging(raw.times.staging),
        },
        scores: raw.scores,
    }
}

fn map_window(raw: RawTimeWindow) -> TimeWindow {
    TimeWindow {
        start: Timestamp::parse(&raw.start),
        end: Timestamp::parse(&raw.end),
    }
}

fn map_staging(raw: RawStagingTimes) -> StagingTimes {
    StagingTimes {
        opens: Timestamp::parse(&raw.opens),
        closes: Timestamp::parse(&raw.closes),
        signal_teams: Timestamp::parse(&raw.signal_teams),
        signal_shepherds: raw
            .signal_shepherds
            .into_iter()
            .map(|(shepherd, time)| (shepherd, Timestamp::parse(&time)))
            .collect(),
    }
}

fn map_period(raw: RawPeriod) -> Period {
    Period {
        period_type: raw.period_type,
        description: raw.description,
        start_time: Timestamp::parse(&raw.start_time),
        end_time: Timestamp::parse(&raw.end_time),
        max_end_time: Timestamp::parse(&raw.max_end_time),
        matches: raw.matches,
    }
}

fn map_current(raw: RawCurrent) -> Current {
    Current {
        delay: raw.delay,
        matches: raw.matches.into_iter().map(map_match).collect(),
        staging_matches: raw.staging_matches.into_iter().map(map_match).collect(),
        shepherding_matches: raw
            .shepherding_matches
            .into_iter()
            .map(map_match)
            .collect(),
        time: Timestamp::parse(&raw.time),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MatchType, Scores};
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn raw_match_fixture() -> RawMatch {
        serde_json::from_value(json!({
            "arena": "Simulator",
            "num": 160,
            "display_name": "Final (#160)",
            "teams": ["SPA", "HRS3", null, null],
            "type": "knockout",
            "scores": {
                "game": {"SPA": 4.0, "HRS3": 2.0},
                "normalised": {"SPA": 8, "HRS3": 6},
                "ranking": {"SPA": 1, "HRS3": 2}
            },
            "times": {
                "game": {
                    "start": "2021-05-01T13:31:00+01:00",
                    "end": "2021-05-01T13:33:00+01:00"
                },
                "slot": {
                    "start": "2021-05-01T13:30:00+01:00",
                    "end": "2021-05-01T13:35:00+01:00"
                },
                "staging": {
                    "opens": "2021-05-01T13:26:00+01:00",
                    "closes": "2021-05-01T13:29:00+01:00",
                    "signal_teams": "2021-05-01T13:28:00+01:00",
                    "signal_shepherds": {
                        "Blue": "2021-05-01T13:27:00+01:00",
                        "Pink": "2021-05-01T13:26:30+01:00"
                    }
                }
            }
        }))
        .expect("fixture should deserialize")
    }

    #[test]
    fn timestamp_parse_folds_offset_into_utc() {
        let ts = Timestamp::parse("2021-05-01T13:31:00+01:00");
        let expected = Utc.with_ymd_and_hms(2021, 5, 1, 12, 31, 0).unwrap();
        assert_eq!(ts, Timestamp::At(expected));
    }

    #[test]
    fn timestamp_parse_accepts_utc_suffix() {
        let ts = Timestamp::parse("2021-05-01T12:31:00Z");
        let expected = Utc.with_ymd_and_hms(2021, 5, 1, 12, 31, 0).unwrap();
        assert_eq!(ts.datetime(), Some(expected));
    }

    #[test]
    fn timestamp_parse_keeps_garbage_verbatim() {
        let ts = Timestamp::parse("not a time");
        assert_eq!(ts, Timestamp::Invalid("not a time".into()));
        assert!(!ts.is_valid());
        assert_eq!(ts.datetime(), None);
    }

    #[test]
    fn map_match_converts_every_time_leaf() {
        let m = map_match(raw_match_fixture());

        let at = |h: u32, min: u32, s: u32| {
            Timestamp::At(Utc.with_ymd_and_hms(2021, 5, 1, h, min, s).unwrap())
        };
        assert_eq!(m.times.game.start, at(12, 31, 0));
        assert_eq!(m.times.game.end, at(12, 33, 0));
        assert_eq!(m.times.slot.start, at(12, 30, 0));
        assert_eq!(m.times.slot.end, at(12, 35, 0));
        assert_eq!(m.times.staging.opens, at(12, 26, 0));
        assert_eq!(m.times.staging.closes, at(12, 29, 0));
        assert_eq!(m.times.staging.signal_teams, at(12, 28, 0));

        let shepherds = &m.times.staging.signal_shepherds;
        assert_eq!(shepherds.len(), 2);
        assert_eq!(shepherds["Blue"], at(12, 27, 0));
        assert_eq!(shepherds["Pink"], at(12, 26, 30));
    }

    #[test]
    fn map_match_passes_non_time_fields_through() {
        let raw = raw_match_fixture();
        let (arena, num, display_name, teams, match_type, scores) = (
            raw.arena.clone(),
            raw.num,
            raw.display_name.clone(),
            raw.teams.clone(),
            raw.match_type,
            raw.scores.clone(),
        );

        let m = map_match(raw);
        assert_eq!(m.arena, arena);
        assert_eq!(m.num, num);
        assert_eq!(m.display_name, display_name);
        assert_eq!(m.teams, teams);
        assert_eq!(m.match_type, match_type);
        assert_eq!(m.scores, scores);
        assert!(matches!(m.scores, Some(Scores::Knockout(_))));
    }

    #[test]
    fn map_match_keeps_malformed_timestamps_without_failing() {
        let mut raw = raw_match_fixture();
        raw.times.game.start = "yesterday-ish".into();
        raw.times
            .staging
            .signal_shepherds
            .insert("Yellow".into(), "??".into());

        let m = map_match(raw);
        assert_eq!(
            m.times.game.start,
            Timestamp::Invalid("yesterday-ish".into())
        );
        assert_eq!(
            m.times.staging.signal_shepherds["Yellow"],
            Timestamp::Invalid("??".into())
        );
        // The rest of the match is unaffected.
        assert!(m.times.game.end.is_valid());
        assert!(m.times.staging.signal_shepherds["Blue"].is_valid());
    }

    #[test]
    fn map_period_preserves_time_ordering() {
        let raw: RawPeriod = serde_json::from_value(json!({
            "type": "league",
            "description": "Saturday league, afternoon",
            "start_time": "2021-05-01T13:00:00+01:00",
            "end_time": "2021-05-01T17:00:00+01:00",
            "max_end_time": "2021-05-01T17:30:00+01:00",
            "matches": {"first_num": 20, "last_num": 60}
        }))
        .expect("fixture should deserialize");

        let p = map_period(raw);
        assert_eq!(p.period_type, MatchType::League);
        assert_eq!(p.description, "Saturday league, afternoon");
        assert_eq!(p.matches.first_num, 20);
        assert_eq!(p.matches.last_num, 60);

        let start = p.start_time.datetime().unwrap();
        let end = p.end_time.datetime().unwrap();
        let max_end = p.max_end_time.datetime().unwrap();
        assert!(start <= end && end <= max_end);
    }

    #[test]
    fn map_current_normalizes_all_three_lists_like_map_match() {
        let raw_match = raw_match_fixture();
        let raw = RawCurrent {
            delay: 120,
            matches: vec![raw_match.clone()],
            staging_matches: vec![raw_match.clone()],
            shepherding_matches: vec![raw_match.clone()],
            time: "2021-05-01T13:32:10+01:00".into(),
        };

        let current = map_current(raw);
        let standalone = map_match(raw_match);
        assert_eq!(current.delay, 120);
        assert_eq!(current.matches, vec![standalone.clone()]);
        assert_eq!(current.staging_matches, vec![standalone.clone()]);
        assert_eq!(current.shepherding_matches, vec![standalone]);
        assert_eq!(
            current.time,
            Timestamp::At(Utc.with_ymd_and_hms(2021, 5, 1, 12, 32, 10).unwrap())
        );
    }

    #[test]
    fn scores_discriminate_league_from_knockout_by_field_name() {
        let league: Scores = serde_json::from_value(json!({
            "game": {"ABC": 3.0},
            "league": {"ABC": 8},
            "ranking": {"ABC": 1}
        }))
        .unwrap();
        assert!(matches!(league, Scores::League(_)));

        let knockout: Scores = serde_json::from_value(json!({
            "game": {"ABC": 3.0},
            "normalised": {"ABC": 8},
            "ranking": {"ABC": 1}
        }))
        .unwrap();
        assert!(matches!(knockout, Scores::Knockout(_)));
    }
}
