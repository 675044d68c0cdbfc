//! Game logs → per-team season statistics.
//!
//! A season file is a flat list of final scores with optional box scores.
//! [`build_league`] turns it into one [`TeamStatistics`] per team, including
//! the strength-of-schedule context that needs the whole league at once.

pub mod league;
pub mod weighting;

pub use league::build_league;

use serde::Deserialize;
use std::collections::HashMap;

use crate::db::models::TeamStatistics;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Preseason,
    #[default]
    Regular,
    Postseason,
}

/// One team's box score. Fields a sport does not track stay at zero.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct BoxScore {
    // Football
    pub total_yards: f64,
    pub yards_per_play: f64,
    pub rushing_yards: f64,
    pub passing_yards: f64,
    /// Giveaways
    pub turnovers: f64,
    /// Sacks recorded by this team's defense
    pub sacks: f64,
    pub third_down_rate: f64,
    pub penalties: f64,
    /// Completions over attempts (0.0–1.0)
    pub completion_rate: f64,
    /// Yards per carry
    pub rushing_avg: f64,
    /// Interceptions thrown
    pub interceptions: f64,
    // Baseball
    pub hits: f64,
    pub errors: f64,
    pub obp: f64,
    pub slg: f64,
    pub home_runs: f64,
}

/// A completed game as listed in a season file
#[derive(Debug, Clone, Deserialize)]
pub struct GameEntry {
    #[serde(default)]
    pub week: Option<u32>,
    #[serde(default)]
    pub phase: Phase,
    pub home: String,
    pub away: String,
    pub home_score: u32,
    pub away_score: u32,
    #[serde(default)]
    pub neutral: bool,
    #[serde(default)]
    pub home_box: BoxScore,
    #[serde(default)]
    pub away_box: BoxScore,
}

/// `<data_dir>/<sport>/<year>.json`, games in chronological order
#[derive(Debug, Clone, Deserialize)]
pub struct SeasonFile {
    #[serde(default)]
    pub season: Option<u16>,
    pub games: Vec<GameEntry>,
}

/// Every team's statistics for one season window
#[derive(Debug, Clone, Default)]
pub struct LeagueTable {
    /// Keyed by lowercase team name
    teams: HashMap<String, TeamStatistics>,
}

impl LeagueTable {
    pub fn new(teams: impl IntoIterator<Item = TeamStatistics>) -> Self {
        LeagueTable {
            teams: teams
                .into_iter()
                .map(|t| (t.team.to_lowercase(), t))
                .collect(),
        }
    }

    /// Exact name (any case), or a unique nickname match ("Chiefs")
    pub fn resolve(&self, query: &str) -> Option<&TeamStatistics> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return None;
        }
        if let Some(team) = self.teams.get(&query) {
            return Some(team);
        }
        let suffix = format!(" {}", query);
        let mut matches = self.teams.iter().filter(|(key, _)| key.ends_with(&suffix));
        match (matches.next(), matches.next()) {
            (Some((_, team)), None) => Some(team),
            _ => None,
        }
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.teams.values().map(|t| t.team.clone()).collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.teams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::fixtures::team;

    #[test]
    fn resolves_exact_and_nickname() {
        let table = LeagueTable::new([
            team("Kansas City Chiefs"),
            team("Buffalo Bills"),
            team("Chicago Bears"),
        ]);
        assert_eq!(table.resolve("buffalo bills").unwrap().team, "Buffalo Bills");
        assert_eq!(table.resolve("Chiefs").unwrap().team, "Kansas City Chiefs");
        assert!(table.resolve("Packers").is_none());
        assert!(table.resolve("").is_none());
    }

    #[test]
    fn ambiguous_nickname_is_not_resolved() {
        let table = LeagueTable::new([team("Chicago Sox"), team("Boston Sox")]);
        assert!(table.resolve("Sox").is_none());
    }

    #[test]
    fn parses_season_file() {
        let raw = r#"{
            "season": 2024,
            "games": [
                {"week": 1, "home": "A", "away": "B", "home_score": 21, "away_score": 17,
                 "home_box": {"total_yards": 350, "yards_per_play": 5.6}},
                {"phase": "preseason", "home": "B", "away": "A", "home_score": 3, "away_score": 0}
            ]
        }"#;
        let file: SeasonFile = serde_json::from_str(raw).unwrap();
        assert_eq!(file.games.len(), 2);
        assert_eq!(file.games[0].home_box.total_yards, 350.0);
        assert_eq!(file.games[0].away_box, BoxScore::default());
        assert_eq!(file.games[1].phase, Phase::Preseason);
    }
}
