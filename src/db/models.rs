use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{ensure_finite, ensure_rate, PredictError, PredictResult};

/// Sports the engine has a profile for
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Sport {
    Football,
    Baseball,
}

impl Sport {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sport::Football => "football",
            Sport::Baseball => "baseball",
        }
    }
}

impl fmt::Display for Sport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which season (and optionally which week cut-off) statistics come from
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SeasonKey {
    pub year: u16,
    /// Only games up to and including this week count
    pub through_week: Option<u32>,
}

impl SeasonKey {
    pub fn full(year: u16) -> Self {
        SeasonKey {
            year,
            through_week: None,
        }
    }

    pub fn through(year: u16, week: u32) -> Self {
        SeasonKey {
            year,
            through_week: Some(week),
        }
    }
}

impl fmt::Display for SeasonKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.through_week {
            Some(week) => write!(f, "{} through week {}", self.year, week),
            None => write!(f, "{}", self.year),
        }
    }
}

// ── Team statistics ───────────────────────────────────────────────────────────

/// Win/loss splits for one team
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub wins: u32,
    pub losses: u32,
    pub home_wins: u32,
    pub home_games: u32,
    pub away_wins: u32,
    pub away_games: u32,
    /// Results inside the sport's recent-form window
    pub recent_wins: u32,
    pub recent_games: u32,
    /// Results in games decided by the sport's close-game margin or less
    pub close_wins: u32,
    pub close_games: u32,
}

impl Record {
    pub fn games(&self) -> u32 {
        self.wins + self.losses
    }

    pub fn win_rate(&self) -> f64 {
        rate(self.wins, self.games(), 0.0)
    }

    /// Home win rate, 0.5 with no home games
    pub fn home_win_rate(&self) -> f64 {
        rate(self.home_wins, self.home_games, 0.5)
    }

    /// Away win rate, 0.5 with no away games
    pub fn away_win_rate(&self) -> f64 {
        rate(self.away_wins, self.away_games, 0.5)
    }

    pub fn recent_win_rate(&self) -> f64 {
        rate(self.recent_wins, self.recent_games, 0.5)
    }

    pub fn close_win_rate(&self) -> f64 {
        rate(self.close_wins, self.close_games, 0.0)
    }
}

fn rate(wins: u32, games: u32, empty: f64) -> f64 {
    if games == 0 {
        empty
    } else {
        wins as f64 / games as f64
    }
}

/// Per-game offensive rates. Football uses yards per play for `efficiency`,
/// baseball uses OPS.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OffenseRates {
    pub efficiency: f64,
    /// Points (runs) scored per game
    pub scoring: f64,
    pub rushing: f64,
    pub passing: f64,
    pub total_yards: f64,
    /// Home runs per game
    pub power: f64,
    /// Third-down conversion rate (0.0–1.0)
    pub conversion_rate: f64,
    pub penalties: f64,
    /// Pass completion rate (0.0–1.0), 0.0 when not tracked
    pub completion_rate: f64,
    /// Yards per carry, 0.0 when not tracked
    pub rushing_avg: f64,
    /// Interceptions thrown per game
    pub interceptions: f64,
}

/// Per-game defensive rates. Baseball stores runs allowed relative to a
/// 4.5 run league baseline in `efficiency_allowed`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DefenseRates {
    pub efficiency_allowed: f64,
    pub scoring_allowed: f64,
    pub rushing_allowed: f64,
    pub passing_allowed: f64,
    pub completion_allowed: f64,
    pub rushing_avg_allowed: f64,
    /// Interceptions made per game
    pub interceptions_forced: f64,
}

/// Strength-of-schedule context, computed against the whole league
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScheduleContext {
    /// Mean win rate of opponents faced
    pub opponent_quality: f64,
    /// Mean rank of opponent defenses faced: 0.0 = best, 1.0 = worst
    pub opponent_defense_rank: f64,
    /// League mean points per game
    pub league_scoring_rate: f64,
}

/// Run/pass balance of an offense
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OffensiveStyle {
    RunHeavy,
    #[default]
    Balanced,
    PassHeavy,
}

impl OffensiveStyle {
    /// Rushing share of yardage above 55% is run-heavy, below 45% pass-heavy
    pub fn classify(rushing: f64, passing: f64) -> Self {
        let total = rushing + passing;
        if total <= 0.0 {
            return OffensiveStyle::Balanced;
        }
        let rush_share = rushing / total;
        if rush_share > 0.55 {
            OffensiveStyle::RunHeavy
        } else if rush_share < 0.45 {
            OffensiveStyle::PassHeavy
        } else {
            OffensiveStyle::Balanced
        }
    }
}

impl fmt::Display for OffensiveStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OffensiveStyle::RunHeavy => write!(f, "run-heavy"),
            OffensiveStyle::Balanced => write!(f, "balanced"),
            OffensiveStyle::PassHeavy => write!(f, "pass-heavy"),
        }
    }
}

/// Points a defense allowed against one style of offense
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StyleSplit {
    pub games: u32,
    pub points_allowed: f64,
}

impl StyleSplit {
    pub fn points_allowed_per_game(&self) -> Option<f64> {
        if self.games == 0 {
            None
        } else {
            Some(self.points_allowed / self.games as f64)
        }
    }
}

/// A defense's results split by the offensive style it faced
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DefenseByStyle {
    pub run_heavy: StyleSplit,
    pub balanced: StyleSplit,
    pub pass_heavy: StyleSplit,
}

impl DefenseByStyle {
    pub fn get(&self, style: OffensiveStyle) -> &StyleSplit {
        match style {
            OffensiveStyle::RunHeavy => &self.run_heavy,
            OffensiveStyle::Balanced => &self.balanced,
            OffensiveStyle::PassHeavy => &self.pass_heavy,
        }
    }

    pub fn record(&mut self, style: OffensiveStyle, points_allowed: f64) {
        let split = match style {
            OffensiveStyle::RunHeavy => &mut self.run_heavy,
            OffensiveStyle::Balanced => &mut self.balanced,
            OffensiveStyle::PassHeavy => &mut self.pass_heavy,
        };
        split.games += 1;
        split.points_allowed += points_allowed;
    }
}

/// How the team played in its most telling recent loss
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LossProfile {
    #[default]
    None,
    /// Better yards per play than the opponent
    MoreEfficient,
    /// More total yards than the opponent by a wide margin
    Outgained,
}

/// Recent-window inputs for the bounce-back rule
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecentSignals {
    pub recent_losses: u32,
    pub last_game_lost: bool,
    pub last_game_turnover_margin: f64,
    pub last_two_turnover_margin: f64,
    pub recent_conversion_rate: f64,
    pub loss_profile: LossProfile,
    pub blowout_loss: bool,
}

/// Season aggregate for one team, ready for the scoring engine
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamStatistics {
    pub team: String,
    pub games_played: u32,
    pub record: Record,
    pub offense: OffenseRates,
    pub defense: DefenseRates,
    pub points_for_total: f64,
    pub points_against_total: f64,
    /// Takeaways minus giveaways per game (errors for baseball)
    pub turnover_margin: f64,
    /// Sacks made minus sacks allowed per game
    pub pressure_margin: f64,
    pub schedule: ScheduleContext,
    pub signals: RecentSignals,
    pub style: OffensiveStyle,
    pub defense_by_style: DefenseByStyle,
}

impl TeamStatistics {
    pub fn win_rate(&self) -> f64 {
        self.record.win_rate()
    }

    /// Pythagorean expectation PF^e / (PF^e + PA^e), 0.5 with no scoring at all
    pub fn pythagorean(&self, exponent: f64) -> f64 {
        let (pf, pa) = (self.points_for_total, self.points_against_total);
        if pf <= 0.0 {
            return if pa <= 0.0 { 0.5 } else { 0.0 };
        }
        // Written as 1 / (1 + (PA/PF)^e) so huge totals cannot overflow to inf/inf
        1.0 / (1.0 + (pa / pf).powf(exponent))
    }

    pub fn scoring_margin(&self) -> f64 {
        self.offense.scoring - self.defense.scoring_allowed
    }

    pub fn validate(&self) -> PredictResult<()> {
        let team = &self.team;
        if team.trim().is_empty() {
            return Err(PredictError::invalid("team", "name is empty"));
        }
        if self.games_played == 0 {
            return Err(PredictError::invalid(format!("{team}.games_played"), "no games played"));
        }
        let r = &self.record;
        if r.wins + r.losses != self.games_played {
            return Err(PredictError::invalid(
                format!("{team}.record"),
                format!("{} wins + {} losses != {} games", r.wins, r.losses, self.games_played),
            ));
        }
        if r.home_games + r.away_games > self.games_played {
            return Err(PredictError::invalid(
                format!("{team}.record"),
                "home and away games exceed games played",
            ));
        }
        let splits = [
            ("home", r.home_wins, r.home_games),
            ("away", r.away_wins, r.away_games),
            ("recent", r.recent_wins, r.recent_games),
            ("close", r.close_wins, r.close_games),
        ];
        for (split, wins, games) in splits {
            if wins > games || games > self.games_played {
                return Err(PredictError::invalid(
                    format!("{team}.record.{split}"),
                    format!("{wins} wins in {games} games of {}", self.games_played),
                ));
            }
        }

        let rates = [
            ("offense.efficiency", self.offense.efficiency),
            ("offense.scoring", self.offense.scoring),
            ("offense.rushing", self.offense.rushing),
            ("offense.passing", self.offense.passing),
            ("offense.total_yards", self.offense.total_yards),
            ("offense.power", self.offense.power),
            ("offense.conversion_rate", self.offense.conversion_rate),
            ("offense.penalties", self.offense.penalties),
            ("offense.completion_rate", self.offense.completion_rate),
            ("offense.rushing_avg", self.offense.rushing_avg),
            ("offense.interceptions", self.offense.interceptions),
            ("defense.efficiency_allowed", self.defense.efficiency_allowed),
            ("defense.scoring_allowed", self.defense.scoring_allowed),
            ("defense.rushing_allowed", self.defense.rushing_allowed),
            ("defense.passing_allowed", self.defense.passing_allowed),
            ("defense.completion_allowed", self.defense.completion_allowed),
            ("defense.rushing_avg_allowed", self.defense.rushing_avg_allowed),
            ("defense.interceptions_forced", self.defense.interceptions_forced),
            ("points_for_total", self.points_for_total),
            ("points_against_total", self.points_against_total),
            ("schedule.opponent_quality", self.schedule.opponent_quality),
            ("schedule.opponent_defense_rank", self.schedule.opponent_defense_rank),
            ("schedule.league_scoring_rate", self.schedule.league_scoring_rate),
            ("signals.recent_conversion_rate", self.signals.recent_conversion_rate),
        ];
        for (field, value) in rates {
            ensure_rate(&format!("{team}.{field}"), value)?;
        }
        ensure_finite(&format!("{team}.turnover_margin"), self.turnover_margin)?;
        ensure_finite(&format!("{team}.pressure_margin"), self.pressure_margin)?;
        ensure_finite(
            &format!("{team}.signals.last_game_turnover_margin"),
            self.signals.last_game_turnover_margin,
        )?;
        ensure_finite(
            &format!("{team}.signals.last_two_turnover_margin"),
            self.signals.last_two_turnover_margin,
        )?;
        Ok(())
    }
}

// ── Injuries ──────────────────────────────────────────────────────────────────

/// One listed player on an injury report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Injury {
    pub player: String,
    /// Position abbreviation ("QB", "SP", ...), "UNKNOWN" when not listed
    pub position: String,
    /// Free-form status ("Out", "Questionable", "15-Day IL", ...)
    pub status: String,
    #[serde(default)]
    pub detail: String,
}

/// Injury snapshot for one team
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InjuryReport {
    pub team: String,
    pub injuries: Vec<Injury>,
    pub fetched_at: DateTime<Utc>,
}

impl InjuryReport {
    pub fn empty(team: &str, fetched_at: DateTime<Utc>) -> Self {
        InjuryReport {
            team: team.to_string(),
            injuries: Vec::new(),
            fetched_at,
        }
    }
}

// ── Pitching, parks, weather ──────────────────────────────────────────────────

/// Season line for a starting pitcher
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PitcherStats {
    pub name: String,
    pub era: f64,
    pub whip: f64,
    pub wins: u32,
    pub losses: u32,
    pub strikeouts_per_nine: f64,
}

impl PitcherStats {
    pub fn validate(&self) -> PredictResult<()> {
        ensure_rate(&format!("{}.era", self.name), self.era)?;
        ensure_rate(&format!("{}.whip", self.name), self.whip)?;
        ensure_rate(&format!("{}.strikeouts_per_nine", self.name), self.strikeouts_per_nine)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoofType {
    Open,
    Retractable,
    Dome,
}

/// Static ballpark characteristics. 100 is a neutral factor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParkFactor {
    pub team: String,
    pub stadium: String,
    /// City and state used for weather lookups
    pub city: String,
    pub run_factor: f64,
    pub hr_factor: f64,
    pub altitude_ft: u32,
    pub roof: RoofType,
}

impl ParkFactor {
    pub fn validate(&self) -> PredictResult<()> {
        ensure_rate(&format!("{}.run_factor", self.stadium), self.run_factor)?;
        ensure_rate(&format!("{}.hr_factor", self.stadium), self.hr_factor)?;
        Ok(())
    }
}

/// Wind relative to the outfield
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindDirection {
    Out,
    In,
    Cross,
}

impl WindDirection {
    /// Map a 16-point compass heading. Southerly winds blow out at most parks.
    pub fn from_compass(heading: &str) -> Self {
        let heading = heading.trim().to_uppercase();
        if heading.is_empty() {
            WindDirection::Cross
        } else if heading.contains("OUT") || heading.contains('S') {
            WindDirection::Out
        } else {
            WindDirection::In
        }
    }
}

/// Game-time conditions at a ballpark
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub temperature_f: f64,
    pub wind_speed_mph: f64,
    pub wind_direction: WindDirection,
    pub humidity_pct: f64,
    pub precipitation: bool,
    pub condition: String,
}

impl WeatherSnapshot {
    pub fn validate(&self) -> PredictResult<()> {
        ensure_finite("weather.temperature_f", self.temperature_f)?;
        ensure_rate("weather.wind_speed_mph", self.wind_speed_mph)?;
        ensure_rate("weather.humidity_pct", self.humidity_pct)?;
        if self.humidity_pct > 100.0 {
            return Err(PredictError::invalid(
                "weather.humidity_pct",
                format!("must be at most 100, got {}", self.humidity_pct),
            ));
        }
        Ok(())
    }
}

// ── Results ───────────────────────────────────────────────────────────────────

/// Points one factor awards to each side
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FactorResult {
    pub factor: &'static str,
    pub home_delta: f64,
    pub away_delta: f64,
    pub rationale: String,
}

impl FactorResult {
    pub fn new(factor: &'static str, home_delta: f64, away_delta: f64, rationale: String) -> Self {
        FactorResult {
            factor,
            home_delta,
            away_delta,
            rationale,
        }
    }

    /// A factor that contributes nothing, with the reason why
    pub fn neutral(factor: &'static str, rationale: impl Into<String>) -> Self {
        FactorResult::new(factor, 0.0, 0.0, rationale.into())
    }

    pub fn is_neutral(&self) -> bool {
        self.home_delta == 0.0 && self.away_delta == 0.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Winner {
    Team(String),
    TooCloseToCall,
}

impl fmt::Display for Winner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Winner::Team(team) => f.write_str(team),
            Winner::TooCloseToCall => f.write_str("too close to call"),
        }
    }
}

/// Final output of one prediction
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResult {
    pub sport: Sport,
    pub home_team: String,
    pub away_team: String,
    pub neutral_site: bool,
    pub home_points: f64,
    pub away_points: f64,
    pub winner: Winner,
    /// 0–95 percent
    pub confidence: f64,
    pub factors: Vec<FactorResult>,
}

/// A persisted prediction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionRecord {
    pub id: Option<i64>,
    pub sport: String,
    pub season: String,
    pub home_team: String,
    pub away_team: String,
    pub neutral_site: bool,
    pub home_points: f64,
    pub away_points: f64,
    /// Winning team name or "too close to call"
    pub winner: String,
    pub confidence: f64,
    pub predicted_at: DateTime<Utc>,
}

impl PredictionRecord {
    pub fn from_result(result: &PredictionResult, season: &SeasonKey) -> Self {
        PredictionRecord {
            id: None,
            sport: result.sport.to_string(),
            season: season.to_string(),
            home_team: result.home_team.clone(),
            away_team: result.away_team.clone(),
            neutral_site: result.neutral_site,
            home_points: result.home_points,
            away_points: result.away_points,
            winner: result.winner.to_string(),
            confidence: result.confidence,
            predicted_at: Utc::now(),
        }
    }
}
