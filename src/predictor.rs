//! Resolves a requested game into a [`Matchup`] and scores it.
//!
//! All I/O happens here, before the engine runs. Only the team statistics
//! are mandatory: injury, pitcher, park and weather lookups degrade to a
//! neutral factor with a warning when they fail or time out.

use chrono::{DateTime, Utc};
use futures_util::future::join_all;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::db::models::{
    InjuryReport, ParkFactor, PredictionResult, RoofType, SeasonKey, Sport, TeamStatistics,
};
use crate::engine::{Matchup, PitcherLookup, ScoringEngine, SportProfile, WeatherReading};
use crate::error::{PredictError, PredictResult};
use crate::sources::{InjurySource, ParkFactorTable, PitcherSource, StatsSource, WeatherSource};

pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PitcherNames {
    pub home: String,
    pub away: String,
}

/// One game to predict, as given on the command line or in a batch file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchupRequest {
    pub home: String,
    pub away: String,
    #[serde(default)]
    pub neutral_site: bool,
    #[serde(default)]
    pub pitchers: Option<PitcherNames>,
    /// Ballpark or team whose park hosts the game; defaults to the home team
    #[serde(default)]
    pub venue: Option<String>,
    /// Used for weather; defaults to now
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
}

impl MatchupRequest {
    pub fn new(home: impl Into<String>, away: impl Into<String>) -> Self {
        MatchupRequest {
            home: home.into(),
            away: away.into(),
            neutral_site: false,
            pitchers: None,
            venue: None,
            start_time: None,
        }
    }

    pub fn label(&self) -> String {
        let sep = if self.neutral_site { "vs" } else { "@" };
        format!("{} {} {}", self.away, sep, self.home)
    }

    fn validate(&self) -> PredictResult<()> {
        if self.home.trim().is_empty() {
            return Err(PredictError::invalid("home", "team name is empty"));
        }
        if self.away.trim().is_empty() {
            return Err(PredictError::invalid("away", "team name is empty"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FailedMatchup {
    pub matchup: String,
    pub error: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchOutcome {
    pub predictions: Vec<PredictionResult>,
    pub failed: Vec<FailedMatchup>,
}

pub struct Predictor {
    engine: ScoringEngine,
    season: SeasonKey,
    stats: Arc<dyn StatsSource>,
    injuries: Option<Arc<dyn InjurySource>>,
    pitchers: Option<Arc<dyn PitcherSource>>,
    weather: Option<Arc<dyn WeatherSource>>,
    parks: ParkFactorTable,
    lookup_timeout: Duration,
}

impl Predictor {
    pub fn new(profile: SportProfile, season: SeasonKey, stats: Arc<dyn StatsSource>) -> Self {
        Predictor {
            engine: ScoringEngine::new(profile),
            season,
            stats,
            injuries: None,
            pitchers: None,
            weather: None,
            parks: ParkFactorTable::builtin(),
            lookup_timeout: DEFAULT_LOOKUP_TIMEOUT,
        }
    }

    pub fn with_injuries(mut self, source: Arc<dyn InjurySource>) -> Self {
        self.injuries = Some(source);
        self
    }

    pub fn with_pitchers(mut self, source: Arc<dyn PitcherSource>) -> Self {
        self.pitchers = Some(source);
        self
    }

    pub fn with_weather(mut self, source: Arc<dyn WeatherSource>) -> Self {
        self.weather = Some(source);
        self
    }

    pub fn with_parks(mut self, parks: ParkFactorTable) -> Self {
        self.parks = parks;
        self
    }

    pub fn with_lookup_timeout(mut self, timeout: Duration) -> Self {
        self.lookup_timeout = timeout;
        self
    }

    pub fn sport(&self) -> Sport {
        self.engine.profile().sport
    }

    pub fn season(&self) -> &SeasonKey {
        &self.season
    }

    async fn within<T>(
        &self,
        what: &str,
        lookup: impl Future<Output = anyhow::Result<T>>,
    ) -> anyhow::Result<T> {
        match tokio::time::timeout(self.lookup_timeout, lookup).await {
            Ok(result) => result,
            Err(_) => Err(anyhow::anyhow!("{} timed out after {:?}", what, self.lookup_timeout)),
        }
    }

    async fn team(&self, name: &str) -> PredictResult<TeamStatistics> {
        let lookup = self.stats.team_statistics(name, &self.season);
        match tokio::time::timeout(self.lookup_timeout, lookup).await {
            Ok(Ok(Some(team))) => Ok(team),
            Ok(Ok(None)) => Err(PredictError::TeamNotFound {
                team: name.to_string(),
                season: self.season.to_string(),
            }),
            Ok(Err(e)) => Err(PredictError::Source(e)),
            Err(_) => Err(PredictError::DataUnavailable(format!(
                "{} statistics for {} timed out after {:?}",
                self.stats.name(),
                name,
                self.lookup_timeout
            ))),
        }
    }

    async fn injury_reports(
        &self,
        home: &str,
        away: &str,
    ) -> Option<(InjuryReport, InjuryReport)> {
        let source = self.injuries.as_ref()?;
        let (h, a) = tokio::join!(
            self.within("injury report", source.injury_report(home)),
            self.within("injury report", source.injury_report(away)),
        );
        match (h, a) {
            (Ok(h), Ok(a)) => Some((h, a)),
            (Err(e), _) | (_, Err(e)) => {
                warn!("{} injuries unavailable, factor skipped: {:#}", source.name(), e);
                None
            }
        }
    }

    async fn pitcher(&self, name: &str) -> PitcherLookup {
        let Some(source) = &self.pitchers else {
            return PitcherLookup::Unknown(name.to_string());
        };
        let found = match self.within("pitcher lookup", source.pitcher_stats(name)).await {
            Ok(Some(stats)) => Ok(stats),
            Ok(None) => Err(PredictError::UnknownPitcher(name.to_string())),
            Err(e) => Err(PredictError::Source(e)),
        };
        match found {
            Ok(stats) => PitcherLookup::Known(stats),
            Err(e) => {
                warn!("{}; scoring as league average", e);
                PitcherLookup::Unknown(name.to_string())
            }
        }
    }

    async fn weather_at(&self, park: &ParkFactor, at: DateTime<Utc>) -> WeatherReading {
        let Some(source) = &self.weather else {
            return WeatherReading::NotRequested;
        };
        if park.roof == RoofType::Dome {
            debug!("{} has a dome, skipping weather", park.stadium);
            return WeatherReading::NotRequested;
        }
        match self.within("weather lookup", source.weather(park, at)).await {
            Ok(snapshot) => WeatherReading::Observed(snapshot),
            Err(e) => {
                warn!("{} weather for {} unavailable: {:#}", source.name(), park.stadium, e);
                WeatherReading::Unavailable(e.to_string())
            }
        }
    }

    /// Resolve and score one game
    pub async fn predict_matchup(&self, req: &MatchupRequest) -> PredictResult<PredictionResult> {
        req.validate()?;
        let (home, away) = tokio::join!(self.team(&req.home), self.team(&req.away));
        let (home, away) = (home?, away?);

        let injuries = self.injury_reports(&home.team, &away.team).await;
        let mut matchup = Matchup::new(home, away).at_neutral_site(req.neutral_site);
        if let Some((h, a)) = injuries {
            matchup = matchup.with_injuries(h, a);
        }

        if self.sport() == Sport::Baseball {
            matchup = self.with_ballpark_context(matchup, req).await;
        }

        let result = self.engine.predict(&matchup)?;
        info!(
            "{}: {} ({:.1} - {:.1}, {:.0}% confidence)",
            req.label(),
            result.winner,
            result.home_points,
            result.away_points,
            result.confidence
        );
        Ok(result)
    }

    async fn with_ballpark_context(&self, mut matchup: Matchup, req: &MatchupRequest) -> Matchup {
        if let Some(names) = &req.pitchers {
            let (h, a) = tokio::join!(self.pitcher(&names.home), self.pitcher(&names.away));
            matchup = matchup.with_pitchers(h, a);
        }

        let venue = req.venue.as_deref().unwrap_or(&matchup.home.team);
        let Some(park) = self.parks.get(venue).cloned() else {
            warn!("No park data for {}, park and weather skipped", venue);
            return matchup;
        };
        let at = req.start_time.unwrap_or_else(Utc::now);
        let weather = self.weather_at(&park, at).await;
        matchup.with_park(park).with_weather(weather)
    }

    /// Score every request concurrently. One failure never aborts the rest.
    pub async fn predict_batch(&self, requests: &[MatchupRequest]) -> BatchOutcome {
        let results = join_all(requests.iter().map(|r| self.predict_matchup(r))).await;
        let mut outcome = BatchOutcome::default();
        for (req, result) in requests.iter().zip(results) {
            match result {
                Ok(prediction) => outcome.predictions.push(prediction),
                Err(e) => {
                    warn!("{} failed: {}", req.label(), e);
                    outcome.failed.push(FailedMatchup {
                        matchup: req.label(),
                        error: e.to_string(),
                    });
                }
            }
        }
        info!(
            "Batch finished: {} predicted, {} failed",
            outcome.predictions.len(),
            outcome.failed.len()
        );
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::{Injury, PitcherStats, WeatherSnapshot, WindDirection, Winner};
    use crate::engine::fixtures::{contender, team};
    use crate::stats::LeagueTable;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeStats {
        table: LeagueTable,
        delay: Option<Duration>,
    }

    #[async_trait]
    impl StatsSource for FakeStats {
        fn name(&self) -> &str {
            "fake stats"
        }

        async fn team_statistics(
            &self,
            team: &str,
            _: &SeasonKey,
        ) -> anyhow::Result<Option<TeamStatistics>> {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            Ok(self.table.resolve(team).cloned())
        }

        async fn team_names(&self, _: &SeasonKey) -> anyhow::Result<Vec<String>> {
            Ok(self.table.names())
        }
    }

    /// Quarterback out for the listed team, or a failing feed
    struct FakeInjuries {
        qb_out: Option<&'static str>,
        broken: bool,
    }

    #[async_trait]
    impl InjurySource for FakeInjuries {
        fn name(&self) -> &str {
            "fake injuries"
        }

        async fn injury_report(&self, team: &str) -> anyhow::Result<InjuryReport> {
            if self.broken {
                anyhow::bail!("injury feed down");
            }
            let mut report = InjuryReport::empty(team, Utc::now());
            if self.qb_out == Some(team) {
                report.injuries.push(Injury {
                    player: "Starter".into(),
                    position: "QB".into(),
                    status: "Out".into(),
                    detail: String::new(),
                });
            }
            Ok(report)
        }
    }

    struct FakePitchers(HashMap<String, PitcherStats>);

    #[async_trait]
    impl PitcherSource for FakePitchers {
        async fn pitcher_stats(&self, name: &str) -> anyhow::Result<Option<PitcherStats>> {
            Ok(self.0.get(name).cloned())
        }
    }

    struct FakeWeather {
        calls: Arc<AtomicUsize>,
        broken: bool,
    }

    #[async_trait]
    impl WeatherSource for FakeWeather {
        fn name(&self) -> &str {
            "fake weather"
        }

        async fn weather(
            &self,
            _: &ParkFactor,
            _: DateTime<Utc>,
        ) -> anyhow::Result<WeatherSnapshot> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.broken {
                anyhow::bail!("weather service down");
            }
            Ok(WeatherSnapshot {
                temperature_f: 88.0,
                wind_speed_mph: 21.0,
                wind_direction: WindDirection::Out,
                humidity_pct: 40.0,
                precipitation: false,
                condition: "Sunny".into(),
            })
        }
    }

    fn stats(teams: Vec<TeamStatistics>) -> Arc<dyn StatsSource> {
        Arc::new(FakeStats {
            table: LeagueTable::new(teams),
            delay: None,
        })
    }

    fn football() -> Predictor {
        Predictor::new(
            SportProfile::for_sport(Sport::Football),
            SeasonKey::full(2024),
            stats(vec![contender("Kansas City Chiefs"), team("Denver Broncos")]),
        )
    }

    fn baseball(weather_broken: bool) -> (Predictor, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut pitchers = HashMap::new();
        pitchers.insert(
            "Ace".to_string(),
            PitcherStats {
                name: "Ace".into(),
                era: 2.50,
                whip: 1.00,
                wins: 14,
                losses: 4,
                strikeouts_per_nine: 10.5,
            },
        );
        let predictor = Predictor::new(
            SportProfile::for_sport(Sport::Baseball),
            SeasonKey::full(2024),
            stats(vec![
                team("Tampa Bay Rays"),
                team("Chicago Cubs"),
                team("New York Yankees"),
            ]),
        )
        .with_pitchers(Arc::new(FakePitchers(pitchers)))
        .with_weather(Arc::new(FakeWeather {
            calls: Arc::clone(&calls),
            broken: weather_broken,
        }));
        (predictor, calls)
    }

    fn factor<'a>(result: &'a PredictionResult, name: &str) -> &'a crate::db::models::FactorResult {
        result
            .factors
            .iter()
            .find(|f| f.factor == name)
            .unwrap_or_else(|| panic!("no factor {}", name))
    }

    #[tokio::test]
    async fn stronger_team_is_picked() {
        let result = football()
            .predict_matchup(&MatchupRequest::new("Chiefs", "Broncos"))
            .await
            .unwrap();
        assert_eq!(result.home_team, "Kansas City Chiefs");
        assert_eq!(result.winner, Winner::Team("Kansas City Chiefs".into()));
        assert!(result.confidence > 0.0 && result.confidence <= 95.0);
        assert_eq!(result.factors.len(), 23);
        assert!(factor(&result, "injuries").is_neutral());
    }

    #[tokio::test]
    async fn unknown_team_is_reported() {
        let err = football()
            .predict_matchup(&MatchupRequest::new("Chiefs", "Packers"))
            .await
            .unwrap_err();
        assert!(matches!(err, PredictError::TeamNotFound { ref team, .. } if team == "Packers"));
    }

    #[tokio::test]
    async fn empty_name_is_invalid() {
        let err = football()
            .predict_matchup(&MatchupRequest::new("  ", "Broncos"))
            .await
            .unwrap_err();
        assert!(err.is_input_error());
    }

    #[tokio::test]
    async fn missing_quarterback_costs_the_penalty() {
        let predictor = football().with_injuries(Arc::new(FakeInjuries {
            qb_out: Some("Kansas City Chiefs"),
            broken: false,
        }));
        let result = predictor
            .predict_matchup(&MatchupRequest::new("Chiefs", "Broncos"))
            .await
            .unwrap();
        assert!(factor(&result, "injuries").home_delta <= -5.0);
    }

    #[tokio::test]
    async fn broken_injury_feed_degrades() {
        let predictor = football().with_injuries(Arc::new(FakeInjuries {
            qb_out: None,
            broken: true,
        }));
        let result = predictor
            .predict_matchup(&MatchupRequest::new("Chiefs", "Broncos"))
            .await
            .unwrap();
        assert!(factor(&result, "injuries").is_neutral());
    }

    #[tokio::test]
    async fn slow_stats_time_out() {
        let predictor = Predictor::new(
            SportProfile::for_sport(Sport::Football),
            SeasonKey::full(2024),
            Arc::new(FakeStats {
                table: LeagueTable::new([team("A Team"), team("B Team")]),
                delay: Some(Duration::from_secs(5)),
            }),
        )
        .with_lookup_timeout(Duration::from_millis(20));
        let err = predictor
            .predict_matchup(&MatchupRequest::new("A Team", "B Team"))
            .await
            .unwrap_err();
        assert!(matches!(err, PredictError::DataUnavailable(_)));
    }

    #[tokio::test]
    async fn dome_skips_weather_and_unknown_pitcher_is_flagged() {
        let (predictor, calls) = baseball(false);
        let mut req = MatchupRequest::new("Rays", "Yankees");
        req.pitchers = Some(PitcherNames {
            home: "Ace".into(),
            away: "Mystery Arm".into(),
        });
        let result = predictor.predict_matchup(&req).await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(factor(&result, "weather").is_neutral());
        let sp = factor(&result, "starting_pitcher");
        assert!(sp.home_delta > 0.0);
        assert!(sp.rationale.contains("unknown pitcher Mystery Arm"));
        // Tropicana Field plays at 96: a pitcher's park pays only the home staff
        let park = factor(&result, "park");
        assert!(park.home_delta > 0.0);
        assert_eq!(park.away_delta, 0.0);
    }

    #[tokio::test]
    async fn outdoor_park_reads_weather() {
        let (predictor, calls) = baseball(false);
        let result = predictor
            .predict_matchup(&MatchupRequest::new("Cubs", "Yankees"))
            .await
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(factor(&result, "weather").home_delta > 0.0);
        assert_eq!(result.factors.len(), 13);
    }

    #[tokio::test]
    async fn failed_weather_is_neutral() {
        let (predictor, _) = baseball(true);
        let result = predictor
            .predict_matchup(&MatchupRequest::new("Cubs", "Yankees"))
            .await
            .unwrap();
        let weather = factor(&result, "weather");
        assert!(weather.is_neutral());
        assert!(weather.rationale.contains("unavailable"));
    }

    #[tokio::test]
    async fn batch_isolates_failures() {
        let requests = vec![
            MatchupRequest::new("Chiefs", "Broncos"),
            MatchupRequest::new("Chiefs", "Packers"),
            MatchupRequest::new("Broncos", "Broncos"),
        ];
        let outcome = football().predict_batch(&requests).await;
        assert_eq!(outcome.predictions.len(), 1);
        assert_eq!(outcome.failed.len(), 2);
        assert_eq!(outcome.failed[0].matchup, "Packers @ Chiefs");
        assert!(outcome.failed[1].error.contains("cannot play itself"));
    }

    #[test]
    fn batch_file_defaults() {
        let reqs: Vec<MatchupRequest> = serde_json::from_str(
            r#"[{"home": "Cubs", "away": "Cardinals"},
                {"home": "Cubs", "away": "Cardinals", "neutral_site": true,
                 "pitchers": {"home": "A", "away": "B"}, "venue": "Wrigley Field"}]"#,
        )
        .unwrap();
        assert!(!reqs[0].neutral_site);
        assert!(reqs[0].pitchers.is_none());
        assert_eq!(reqs[1].label(), "Cardinals vs Cubs");
        assert_eq!(reqs[1].venue.as_deref(), Some("Wrigley Field"));
    }
}
