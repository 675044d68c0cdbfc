use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

use crate::db::models::{SeasonKey, Sport};
use crate::engine::SportProfile;

/// Heuristic multi-factor matchup predictor for football and baseball
#[derive(Parser, Debug, Clone)]
#[command(name = "matchup-predictor", version, about)]
pub struct Config {
    /// Sport whose profile scores the games
    #[arg(long, env = "SPORT", value_enum, default_value = "football", global = true)]
    pub sport: Sport,

    /// Season year the statistics come from
    #[arg(long, env = "SEASON", default_value = "2024", global = true)]
    pub season: u16,

    /// Only count games up to and including this week
    #[arg(long, env = "THROUGH_WEEK", global = true)]
    pub week: Option<u32>,

    /// Directory holding <sport>/<year>.json game logs
    #[arg(long, env = "DATA_DIR", default_value = "data", global = true)]
    pub data_dir: PathBuf,

    /// SQLite database path (injury cache and prediction history)
    #[arg(long, env = "DATABASE_PATH", default_value = "predictions.db", global = true)]
    pub database_path: String,

    /// Skip the injury factor entirely
    #[arg(long, env = "NO_INJURIES", default_value = "false", global = true)]
    pub no_injuries: bool,

    /// Injury feed base URL (ESPN site API)
    #[arg(
        long,
        env = "INJURY_API_URL",
        default_value = "https://site.api.espn.com/apis/site/v2/sports",
        global = true
    )]
    pub injury_api_url: String,

    /// Minutes a stored injury snapshot stays fresh
    #[arg(long, env = "INJURY_CACHE_MINUTES", default_value = "60", global = true)]
    pub injury_cache_minutes: i64,

    /// Skip weather lookups for baseball
    #[arg(long, env = "NO_WEATHER", default_value = "false", global = true)]
    pub no_weather: bool,

    /// Weather service base URL (wttr.in JSON format)
    #[arg(long, env = "WEATHER_API_URL", default_value = "https://wttr.in", global = true)]
    pub weather_api_url: String,

    /// Timeout for each collaborator lookup in seconds
    #[arg(long, env = "LOOKUP_TIMEOUT_SECS", default_value = "10", global = true)]
    pub lookup_timeout_secs: u64,

    /// Override the points lost when a quarterback / starting pitcher is out
    #[arg(long, env = "KEY_INJURY_PENALTY", global = true)]
    pub key_injury_penalty: Option<f64>,

    /// Starting pitcher stats; defaults to <data_dir>/baseball/pitchers.json
    #[arg(long, env = "PITCHERS_FILE", global = true)]
    pub pitchers_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Predict a single game
    Predict {
        /// Home team (full name or nickname)
        home: String,
        /// Away team (full name or nickname)
        away: String,
        /// Played at a neutral site
        #[arg(long)]
        neutral: bool,
        /// Home starting pitcher (baseball)
        #[arg(long)]
        home_pitcher: Option<String>,
        /// Away starting pitcher (baseball)
        #[arg(long)]
        away_pitcher: Option<String>,
        /// Ballpark or team whose park hosts the game (baseball)
        #[arg(long)]
        venue: Option<String>,
        /// Print the full result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Predict every game in a JSON file of matchups
    Batch {
        file: PathBuf,
        /// Print the outcome as JSON
        #[arg(long)]
        json: bool,
    },
    /// List teams with statistics for the season
    Teams,
    /// List the ballpark table
    Parks,
    /// Fetch the injury feed and store a fresh snapshot
    RefreshInjuries,
    /// Show recorded predictions
    History {
        #[arg(long, default_value = "20")]
        limit: i64,
    },
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        if !(1900..=2100).contains(&self.season) {
            anyhow::bail!("season must be between 1900 and 2100, got {}", self.season);
        }
        if self.week == Some(0) {
            anyhow::bail!("week must be at least 1");
        }
        if let Some(penalty) = self.key_injury_penalty {
            if !penalty.is_finite() || penalty < 0.0 {
                anyhow::bail!("key_injury_penalty must be a non-negative number");
            }
        }
        if self.lookup_timeout_secs == 0 {
            anyhow::bail!("lookup_timeout_secs must be positive");
        }
        if self.injury_cache_minutes < 0 {
            anyhow::bail!("injury_cache_minutes must not be negative");
        }
        if let Command::History { limit } = self.command {
            if limit <= 0 {
                anyhow::bail!("history limit must be positive");
            }
        }
        Ok(())
    }

    pub fn season_key(&self) -> SeasonKey {
        match self.week {
            Some(week) => SeasonKey::through(self.season, week),
            None => SeasonKey::full(self.season),
        }
    }

    /// Sport profile with the configured overrides applied
    pub fn profile(&self) -> SportProfile {
        let profile = SportProfile::for_sport(self.sport);
        match self.key_injury_penalty {
            Some(penalty) => profile.with_key_injury_penalty(penalty),
            None => profile,
        }
    }

    pub fn lookup_timeout(&self) -> Duration {
        Duration::from_secs(self.lookup_timeout_secs)
    }

    pub fn injury_max_age(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.injury_cache_minutes)
    }

    pub fn pitchers_path(&self) -> PathBuf {
        self.pitchers_file
            .clone()
            .unwrap_or_else(|| self.data_dir.join("baseball").join("pitchers.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Config {
        Config::try_parse_from(std::iter::once("matchup-predictor").chain(args.iter().copied()))
            .unwrap()
    }

    #[test]
    fn defaults_validate() {
        let config = parse(&["teams"]);
        config.validate().unwrap();
        assert_eq!(config.sport, Sport::Football);
        assert_eq!(config.season_key(), SeasonKey::full(2024));
        assert_eq!(config.pitchers_path(), PathBuf::from("data/baseball/pitchers.json"));
    }

    #[test]
    fn predict_with_global_flags_after_subcommand() {
        let config = parse(&[
            "predict", "Yankees", "Red Sox", "--home-pitcher", "Gerrit Cole",
            "--sport", "baseball", "--week", "12",
        ]);
        assert_eq!(config.sport, Sport::Baseball);
        assert_eq!(config.season_key(), SeasonKey::through(2024, 12));
        match config.command {
            Command::Predict { home, home_pitcher, neutral, .. } => {
                assert_eq!(home, "Yankees");
                assert_eq!(home_pitcher.as_deref(), Some("Gerrit Cole"));
                assert!(!neutral);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn penalty_override_reaches_the_profile() {
        let config = parse(&["--key-injury-penalty", "7.5", "teams"]);
        assert_eq!(config.profile().injuries.key_injury_penalty, 7.5);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(parse(&["--key-injury-penalty=-1", "teams"]).validate().is_err());
        assert!(parse(&["--lookup-timeout-secs", "0", "teams"]).validate().is_err());
        assert!(parse(&["--season", "1850", "teams"]).validate().is_err());
        assert!(parse(&["history", "--limit", "0"]).validate().is_err());
    }
}
