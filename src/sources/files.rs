use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{Mutex, OnceCell};
use tracing::{info, warn};

use super::provider::{PitcherSource, StatsSource};
use crate::db::models::{PitcherStats, SeasonKey, TeamStatistics};
use crate::engine::SportProfile;
use crate::stats::{build_league, LeagueTable, SeasonFile};

/// Team statistics computed from game logs on disk.
///
/// Reads `<data_dir>/<sport>/<year>.json`. Each season window is parsed
/// once and kept in memory.
pub struct JsonGameLogSource {
    data_dir: PathBuf,
    profile: SportProfile,
    cache: Mutex<HashMap<SeasonKey, Arc<LeagueTable>>>,
}

impl JsonGameLogSource {
    pub fn new(data_dir: impl Into<PathBuf>, profile: SportProfile) -> Self {
        JsonGameLogSource {
            data_dir: data_dir.into(),
            profile,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn season_path(&self, year: u16) -> PathBuf {
        self.data_dir
            .join(self.profile.sport.as_str())
            .join(format!("{}.json", year))
    }

    async fn league(&self, season: &SeasonKey) -> Result<Arc<LeagueTable>> {
        let mut cache = self.cache.lock().await;
        if let Some(table) = cache.get(season) {
            return Ok(Arc::clone(table));
        }

        let path = self.season_path(season.year);
        let raw = tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read season file {}", path.display()))?;
        let file: SeasonFile = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse season file {}", path.display()))?;
        if let Some(year) = file.season {
            if year != season.year {
                warn!("{} says season {}, expected {}", path.display(), year, season.year);
            }
        }

        let table = Arc::new(build_league(&file.games, season, &self.profile));
        info!(
            "Loaded {} {} teams from {} games ({})",
            table.len(),
            self.profile.sport,
            file.games.len(),
            season
        );
        cache.insert(season.clone(), Arc::clone(&table));
        Ok(table)
    }
}

#[async_trait]
impl StatsSource for JsonGameLogSource {
    fn name(&self) -> &str {
        "game logs"
    }

    async fn team_statistics(
        &self,
        team: &str,
        season: &SeasonKey,
    ) -> Result<Option<TeamStatistics>> {
        Ok(self.league(season).await?.resolve(team).cloned())
    }

    async fn team_names(&self, season: &SeasonKey) -> Result<Vec<String>> {
        Ok(self.league(season).await?.names())
    }
}

/// One line of the pitcher file; the name is the map key
#[derive(Debug, Deserialize)]
struct PitcherLine {
    era: f64,
    whip: f64,
    #[serde(default)]
    wins: u32,
    #[serde(default)]
    losses: u32,
    #[serde(default)]
    strikeouts_per_nine: f64,
}

/// Parse `{"Gerrit Cole": {"era": 3.41, ...}, ...}` keyed by lowercase name
pub fn parse_pitcher_file(raw: &str) -> Result<HashMap<String, PitcherStats>> {
    let lines: HashMap<String, PitcherLine> =
        serde_json::from_str(raw).context("Failed to parse pitcher file")?;
    Ok(lines
        .into_iter()
        .map(|(name, line)| {
            (
                name.trim().to_lowercase(),
                PitcherStats {
                    name: name.trim().to_string(),
                    era: line.era,
                    whip: line.whip,
                    wins: line.wins,
                    losses: line.losses,
                    strikeouts_per_nine: line.strikeouts_per_nine,
                },
            )
        })
        .collect())
}

/// Starting pitchers from a JSON file, loaded on first lookup
pub struct JsonPitcherSource {
    path: PathBuf,
    pitchers: OnceCell<HashMap<String, PitcherStats>>,
}

impl JsonPitcherSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        JsonPitcherSource {
            path: path.as_ref().to_path_buf(),
            pitchers: OnceCell::new(),
        }
    }

    async fn pitchers(&self) -> Result<&HashMap<String, PitcherStats>> {
        self.pitchers
            .get_or_try_init(|| async {
                let raw = tokio::fs::read_to_string(&self.path)
                    .await
                    .with_context(|| format!("Failed to read {}", self.path.display()))?;
                let pitchers = parse_pitcher_file(&raw)?;
                info!("Loaded {} pitchers from {}", pitchers.len(), self.path.display());
                Ok::<_, anyhow::Error>(pitchers)
            })
            .await
    }
}

#[async_trait]
impl PitcherSource for JsonPitcherSource {
    async fn pitcher_stats(&self, name: &str) -> Result<Option<PitcherStats>> {
        let key = name.trim().to_lowercase();
        Ok(self.pitchers().await?.get(&key).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::Sport;

    fn scratch_dir(label: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "matchup-predictor-{}-{}",
            label,
            std::process::id()
        ));
        std::fs::create_dir_all(dir.join("football")).unwrap();
        dir
    }

    #[tokio::test]
    async fn reads_and_caches_a_season() {
        let dir = scratch_dir("season");
        std::fs::write(
            dir.join("football").join("2024.json"),
            r#"{"season": 2024, "games": [
                {"week": 1, "home": "Kansas City Chiefs", "away": "Baltimore Ravens",
                 "home_score": 27, "away_score": 20},
                {"week": 2, "home": "Baltimore Ravens", "away": "Kansas City Chiefs",
                 "home_score": 24, "away_score": 17}
            ]}"#,
        )
        .unwrap();

        let source = JsonGameLogSource::new(&dir, SportProfile::for_sport(Sport::Football));
        let season = SeasonKey::full(2024);
        let chiefs = source.team_statistics("Chiefs", &season).await.unwrap().unwrap();
        assert_eq!(chiefs.team, "Kansas City Chiefs");
        assert_eq!(chiefs.games_played, 2);

        let through_one = source
            .team_statistics("Baltimore Ravens", &SeasonKey::through(2024, 1))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(through_one.record.wins, 0);

        std::fs::remove_file(dir.join("football").join("2024.json")).unwrap();
        // Served from the cache once loaded
        let names = source.team_names(&season).await.unwrap();
        assert_eq!(names, vec!["Baltimore Ravens", "Kansas City Chiefs"]);
        assert!(source.team_statistics("Packers", &season).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn missing_season_is_an_error() {
        let dir = scratch_dir("missing");
        let source = JsonGameLogSource::new(&dir, SportProfile::for_sport(Sport::Football));
        let err = source.team_names(&SeasonKey::full(1999)).await.unwrap_err();
        assert!(err.to_string().contains("1999.json"));
    }

    #[test]
    fn pitcher_names_are_case_insensitive() {
        let pitchers = parse_pitcher_file(
            r#"{"Gerrit Cole": {"era": 3.41, "whip": 1.13, "wins": 15, "losses": 4,
                 "strikeouts_per_nine": 9.6}}"#,
        )
        .unwrap();
        let cole = &pitchers["gerrit cole"];
        assert_eq!(cole.name, "Gerrit Cole");
        assert_eq!(cole.wins, 15);
    }

    #[tokio::test]
    async fn pitcher_lookup_misses_are_none() {
        let dir = scratch_dir("pitchers");
        let path = dir.join("pitchers.json");
        std::fs::write(&path, r#"{"Zack Wheeler": {"era": 2.57, "whip": 0.96}}"#).unwrap();
        let source = JsonPitcherSource::new(&path);
        assert!(source.pitcher_stats("zack wheeler").await.unwrap().is_some());
        assert!(source.pitcher_stats("Nobody").await.unwrap().is_none());
    }
}
