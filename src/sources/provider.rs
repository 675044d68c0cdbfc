use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

use crate::db::models::{
    InjuryReport, ParkFactor, PitcherStats, SeasonKey, TeamStatistics, WeatherSnapshot,
};

/// Season statistics for every team in a league.
#[async_trait]
pub trait StatsSource: Send + Sync {
    /// `Ok(None)` when the team played no counted games in that season.
    async fn team_statistics(&self, team: &str, season: &SeasonKey)
        -> Result<Option<TeamStatistics>>;

    /// Every team name known for the season, sorted.
    async fn team_names(&self, season: &SeasonKey) -> Result<Vec<String>>;

    /// Human-readable name for logging.
    fn name(&self) -> &str;
}

/// Current injury report for one team.
#[async_trait]
pub trait InjurySource: Send + Sync {
    /// A team with nobody listed gets an empty report, not an error.
    async fn injury_report(&self, team: &str) -> Result<InjuryReport>;

    fn name(&self) -> &str;
}

/// League-wide injury feed, one request for every team.
#[async_trait]
pub trait InjuryFeed: Send + Sync {
    /// Reports keyed by team display name.
    async fn fetch_league(&self) -> Result<HashMap<String, InjuryReport>>;

    fn name(&self) -> &str;
}

/// Season lines for starting pitchers.
#[async_trait]
pub trait PitcherSource: Send + Sync {
    async fn pitcher_stats(&self, name: &str) -> Result<Option<PitcherStats>>;
}

/// Conditions at a ballpark around a start time.
#[async_trait]
pub trait WeatherSource: Send + Sync {
    async fn weather(&self, park: &ParkFactor, at: DateTime<Utc>) -> Result<WeatherSnapshot>;

    fn name(&self) -> &str;
}
