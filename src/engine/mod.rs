//! Multi-factor weighted scoring engine.
//!
//! Every factor is an independent calculator that reads the matchup and
//! awards points to one or both sides. The engine sums the awards into a
//! total per team and maps the gap between totals to a confidence.
//!
//! One engine serves every sport. What differs between football and
//! baseball lives in a [`SportProfile`]: the list of calculators, their
//! ladders, the injury tables and the confidence divisor.

pub mod baseball;
pub mod confidence;
pub mod football;
pub mod form;
pub mod injuries;
pub mod ladder;
pub mod offense;
pub mod pitching;
pub mod venue;

pub use confidence::{confidence, verdict, CONFIDENCE_CEILING};
pub use injuries::{InjuryImpact, InjuryWeights};
pub use ladder::Ladder;

use tracing::debug;

use crate::db::models::{
    FactorResult, InjuryReport, ParkFactor, PitcherStats, PredictionResult, Sport,
    TeamStatistics, WeatherSnapshot,
};
use crate::error::{PredictError, PredictResult};

// ── Matchup inputs ────────────────────────────────────────────────────────────

/// A starting pitcher as resolved by the pitcher source
#[derive(Debug, Clone, PartialEq)]
pub enum PitcherLookup {
    Known(PitcherStats),
    /// Name the source did not recognise; scored as league average
    Unknown(String),
}

impl PitcherLookup {
    pub fn name(&self) -> &str {
        match self {
            PitcherLookup::Known(p) => &p.name,
            PitcherLookup::Unknown(name) => name,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PitcherPair {
    pub home: PitcherLookup,
    pub away: PitcherLookup,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InjuryPair {
    pub home: InjuryReport,
    pub away: InjuryReport,
}

#[derive(Debug, Clone, PartialEq)]
pub enum WeatherReading {
    NotRequested,
    Observed(WeatherSnapshot),
    /// Lookup failed; the reason ends up in the rationale
    Unavailable(String),
}

/// Everything the calculators may read about one game
#[derive(Debug, Clone, PartialEq)]
pub struct Matchup {
    pub home: TeamStatistics,
    pub away: TeamStatistics,
    pub neutral_site: bool,
    pub injuries: Option<InjuryPair>,
    pub pitchers: Option<PitcherPair>,
    pub park: Option<ParkFactor>,
    pub weather: WeatherReading,
}

impl Matchup {
    pub fn new(home: TeamStatistics, away: TeamStatistics) -> Self {
        Matchup {
            home,
            away,
            neutral_site: false,
            injuries: None,
            pitchers: None,
            park: None,
            weather: WeatherReading::NotRequested,
        }
    }

    pub fn at_neutral_site(mut self, neutral: bool) -> Self {
        self.neutral_site = neutral;
        self
    }

    pub fn with_injuries(mut self, home: InjuryReport, away: InjuryReport) -> Self {
        self.injuries = Some(InjuryPair { home, away });
        self
    }

    pub fn with_pitchers(mut self, home: PitcherLookup, away: PitcherLookup) -> Self {
        self.pitchers = Some(PitcherPair { home, away });
        self
    }

    pub fn with_park(mut self, park: ParkFactor) -> Self {
        self.park = Some(park);
        self
    }

    pub fn with_weather(mut self, weather: WeatherReading) -> Self {
        self.weather = weather;
        self
    }

    /// The same game with the two sides exchanged. Venue data stays put.
    pub fn swapped(&self) -> Self {
        Matchup {
            home: self.away.clone(),
            away: self.home.clone(),
            neutral_site: self.neutral_site,
            injuries: self.injuries.as_ref().map(|i| InjuryPair {
                home: i.away.clone(),
                away: i.home.clone(),
            }),
            pitchers: self.pitchers.as_ref().map(|p| PitcherPair {
                home: p.away.clone(),
                away: p.home.clone(),
            }),
            park: self.park.clone(),
            weather: self.weather.clone(),
        }
    }

    pub fn validate(&self) -> PredictResult<()> {
        self.home.validate()?;
        self.away.validate()?;
        if self.home.team.eq_ignore_ascii_case(&self.away.team) {
            return Err(PredictError::invalid(
                "matchup",
                format!("{} cannot play itself", self.home.team),
            ));
        }
        if let Some(pitchers) = &self.pitchers {
            for lookup in [&pitchers.home, &pitchers.away] {
                if let PitcherLookup::Known(p) = lookup {
                    p.validate()?;
                }
            }
        }
        if let Some(park) = &self.park {
            park.validate()?;
        }
        if let WeatherReading::Observed(w) = &self.weather {
            w.validate()?;
        }
        Ok(())
    }
}

// ── Sport profiles ────────────────────────────────────────────────────────────

/// Points one calculator awards, before it is labelled with the factor name
#[derive(Debug, Clone, PartialEq)]
pub struct Award {
    pub home: f64,
    pub away: f64,
    pub rationale: String,
}

impl Award {
    pub fn new(home: f64, away: f64, rationale: impl Into<String>) -> Self {
        Award {
            home,
            away,
            rationale: rationale.into(),
        }
    }

    pub fn none(rationale: impl Into<String>) -> Self {
        Award::new(0.0, 0.0, rationale)
    }
}

pub type Calculator = fn(&Matchup, &SportProfile) -> Award;

#[derive(Debug, Clone, Copy)]
pub struct Factor {
    pub name: &'static str,
    pub calculate: Calculator,
}

/// Sport-specific configuration bundle for the engine
#[derive(Debug, Clone)]
pub struct SportProfile {
    pub sport: Sport,
    /// Points of gap that equal 100% confidence
    pub confidence_divisor: f64,
    pub pythagorean_exponent: f64,
    /// Games in the recent-form window
    pub recent_window: usize,
    /// Largest margin that still counts as a close game
    pub close_margin: u32,
    /// Smallest margin that counts as a blowout loss
    pub blowout_margin: u32,
    /// Recency weighting base: the latest game weighs `base` times the first
    pub recency_base: f64,
    pub injuries: InjuryWeights,
    pub factors: Vec<Factor>,
}

impl SportProfile {
    pub fn for_sport(sport: Sport) -> Self {
        match sport {
            Sport::Football => football::profile(),
            Sport::Baseball => baseball::profile(),
        }
    }

    /// Override the penalty for a missing quarterback / starting pitcher
    pub fn with_key_injury_penalty(mut self, penalty: f64) -> Self {
        self.injuries.key_injury_penalty = penalty;
        self
    }

    pub fn factor_names(&self) -> Vec<&'static str> {
        self.factors.iter().map(|f| f.name).collect()
    }
}

// ── Engine ────────────────────────────────────────────────────────────────────

pub struct ScoringEngine {
    profile: SportProfile,
}

impl ScoringEngine {
    pub fn new(profile: SportProfile) -> Self {
        ScoringEngine { profile }
    }

    pub fn profile(&self) -> &SportProfile {
        &self.profile
    }

    /// Run every calculator in profile order
    pub fn evaluate(&self, matchup: &Matchup) -> PredictResult<Vec<FactorResult>> {
        matchup.validate()?;
        let results = self
            .profile
            .factors
            .iter()
            .map(|factor| {
                let award = (factor.calculate)(matchup, &self.profile);
                debug!(
                    "{}: home {:+.2} away {:+.2} ({})",
                    factor.name, award.home, award.away, award.rationale
                );
                FactorResult::new(factor.name, award.home, award.away, award.rationale)
            })
            .collect();
        Ok(results)
    }

    pub fn predict(&self, matchup: &Matchup) -> PredictResult<PredictionResult> {
        let factors = self.evaluate(matchup)?;
        let (home_points, away_points) = aggregate(&factors);
        if !home_points.is_finite() || !away_points.is_finite() {
            return Err(PredictError::invalid(
                "totals",
                format!("non-finite totals {home_points} / {away_points}"),
            ));
        }

        let home_team = matchup.home.team.clone();
        let away_team = matchup.away.team.clone();
        Ok(PredictionResult {
            sport: self.profile.sport,
            winner: verdict(&home_team, &away_team, home_points, away_points),
            confidence: confidence(home_points, away_points, self.profile.confidence_divisor),
            home_team,
            away_team,
            neutral_site: matchup.neutral_site,
            home_points,
            away_points,
            factors,
        })
    }
}

/// Sum every factor's deltas, starting from zero
pub fn aggregate(factors: &[FactorResult]) -> (f64, f64) {
    factors.iter().fold((0.0, 0.0), |(home, away), f| {
        (home + f.home_delta, away + f.away_delta)
    })
}

/// Numerator / (denominator + 0.1), so a zero denominator stays finite.
pub(crate) fn guarded_ratio(numerator: f64, denominator: f64) -> f64 {
    numerator / (denominator + 0.1)
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::db::models::{
        DefenseRates, OffenseRates, OffensiveStyle, Record, ScheduleContext, TeamStatistics,
    };

    /// A perfectly average 5-5 football team
    pub fn team(name: &str) -> TeamStatistics {
        TeamStatistics {
            team: name.into(),
            games_played: 10,
            record: Record {
                wins: 5,
                losses: 5,
                home_wins: 3,
                home_games: 5,
                away_wins: 2,
                away_games: 5,
                recent_wins: 1,
                recent_games: 3,
                close_wins: 1,
                close_games: 2,
            },
            offense: OffenseRates {
                efficiency: 5.5,
                scoring: 22.0,
                rushing: 115.0,
                passing: 220.0,
                total_yards: 335.0,
                power: 1.0,
                conversion_rate: 0.40,
                penalties: 6.0,
                completion_rate: 0.63,
                rushing_avg: 4.3,
                interceptions: 0.8,
            },
            defense: DefenseRates {
                efficiency_allowed: 5.5,
                scoring_allowed: 22.0,
                rushing_allowed: 115.0,
                passing_allowed: 220.0,
                completion_allowed: 0.63,
                rushing_avg_allowed: 4.3,
                interceptions_forced: 0.8,
            },
            points_for_total: 220.0,
            points_against_total: 220.0,
            turnover_margin: 0.0,
            pressure_margin: 0.0,
            schedule: ScheduleContext {
                opponent_quality: 0.5,
                opponent_defense_rank: 0.5,
                league_scoring_rate: 22.0,
            },
            signals: Default::default(),
            style: OffensiveStyle::PassHeavy,
            defense_by_style: Default::default(),
        }
    }

    /// A strong 9-1 team
    pub fn contender(name: &str) -> TeamStatistics {
        let mut t = team(name);
        t.record.wins = 9;
        t.record.losses = 1;
        t.record.home_wins = 5;
        t.record.away_wins = 4;
        t.record.recent_wins = 3;
        t.record.close_wins = 2;
        t.offense.efficiency = 6.6;
        t.offense.scoring = 30.0;
        t.offense.rushing = 150.0;
        t.offense.passing = 270.0;
        t.offense.total_yards = 420.0;
        t.offense.conversion_rate = 0.48;
        t.defense.efficiency_allowed = 4.6;
        t.defense.scoring_allowed = 16.0;
        t.points_for_total = 300.0;
        t.points_against_total = 160.0;
        t.turnover_margin = 1.0;
        t.pressure_margin = 1.5;
        t.schedule.opponent_quality = 0.55;
        t
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::{contender, team};
    use super::*;
    use crate::db::models::Winner;
    use approx::assert_relative_eq;

    fn football() -> ScoringEngine {
        ScoringEngine::new(SportProfile::for_sport(Sport::Football))
    }

    #[test]
    fn identical_teams_at_neutral_site_are_too_close_to_call() {
        let m = Matchup::new(team("Lions"), team("Bears")).at_neutral_site(true);
        let result = football().predict(&m).unwrap();
        assert_relative_eq!(result.home_points, result.away_points);
        assert_eq!(result.winner, Winner::TooCloseToCall);
        assert_relative_eq!(result.confidence, 0.0);
    }

    #[test]
    fn stronger_team_wins() {
        let m = Matchup::new(team("Lions"), contender("Bears"));
        let result = football().predict(&m).unwrap();
        assert_eq!(result.winner, Winner::Team("Bears".into()));
        assert!(result.confidence > 50.0, "got {:.1}", result.confidence);
    }

    #[test]
    fn totals_equal_sum_of_factors() {
        let m = Matchup::new(contender("Lions"), team("Bears"));
        let result = football().predict(&m).unwrap();
        let home: f64 = result.factors.iter().map(|f| f.home_delta).sum();
        let away: f64 = result.factors.iter().map(|f| f.away_delta).sum();
        assert_relative_eq!(result.home_points, home, epsilon = 1e-9);
        assert_relative_eq!(result.away_points, away, epsilon = 1e-9);
    }

    #[test]
    fn neutral_site_swap_is_symmetric() {
        for engine in [football(), ScoringEngine::new(SportProfile::for_sport(Sport::Baseball))] {
            let m = Matchup::new(contender("Lions"), team("Bears")).at_neutral_site(true);
            let a = engine.predict(&m).unwrap();
            let b = engine.predict(&m.swapped()).unwrap();
            assert_relative_eq!(a.home_points, b.away_points, epsilon = 1e-9);
            assert_relative_eq!(a.away_points, b.home_points, epsilon = 1e-9);
            assert_eq!(a.winner, b.winner);
        }
    }

    #[test]
    fn neutral_site_zeroes_home_factors() {
        let m = Matchup::new(contender("Lions"), team("Bears")).at_neutral_site(true);
        let result = football().predict(&m).unwrap();
        for name in ["home_field", "road_matchup"] {
            let f = result.factors.iter().find(|f| f.factor == name).unwrap();
            assert!(f.is_neutral(), "{} should be zero at a neutral site", name);
        }
    }

    #[test]
    fn prediction_is_idempotent() {
        let m = Matchup::new(contender("Lions"), team("Bears"));
        let engine = football();
        let a = serde_json::to_string(&engine.predict(&m).unwrap()).unwrap();
        let b = serde_json::to_string(&engine.predict(&m).unwrap()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn extreme_stats_stay_finite() {
        let mut strong = contender("Lions");
        strong.offense.efficiency = 1e6;
        strong.offense.scoring = 1e6;
        strong.points_for_total = 1e6;
        let mut weak = team("Bears");
        weak.defense.efficiency_allowed = 0.0;
        weak.defense.scoring_allowed = 0.0;
        weak.defense.rushing_allowed = 0.0;
        weak.defense.passing_allowed = 0.0;
        weak.offense = Default::default();
        weak.points_for_total = 0.0;
        weak.points_against_total = 0.0;
        for engine in [football(), ScoringEngine::new(SportProfile::for_sport(Sport::Baseball))] {
            let result = engine.predict(&Matchup::new(strong.clone(), weak.clone())).unwrap();
            assert!(result.home_points.is_finite() && result.away_points.is_finite());
            assert!((0.0..=CONFIDENCE_CEILING).contains(&result.confidence));
        }
    }

    #[test]
    fn invalid_stats_are_rejected_not_clamped() {
        let mut bad = team("Lions");
        bad.defense.scoring_allowed = -3.0;
        let err = football().predict(&Matchup::new(bad, team("Bears"))).unwrap_err();
        assert!(matches!(err, PredictError::InvalidInput { .. }), "{}", err);
    }

    #[test]
    fn team_cannot_play_itself() {
        let err = football()
            .predict(&Matchup::new(team("Lions"), team("lions")))
            .unwrap_err();
        assert!(err.is_input_error());
    }

    #[test]
    fn profile_overrides_key_injury_penalty() {
        let profile = SportProfile::for_sport(Sport::Football).with_key_injury_penalty(7.5);
        assert_relative_eq!(profile.injuries.key_injury_penalty, 7.5);
    }

    #[test]
    fn guarded_ratio_survives_zero_denominator() {
        assert_relative_eq!(guarded_ratio(1.0, 0.0), 10.0);
    }
}
