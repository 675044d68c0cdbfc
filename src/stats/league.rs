use std::collections::{BTreeMap, HashMap};
use tracing::debug;

use super::weighting::{mean, recency_weighted};
use super::{BoxScore, GameEntry, LeagueTable, Phase};
use crate::db::models::{
    DefenseRates, LossProfile, OffenseRates, OffensiveStyle, RecentSignals, Record,
    ScheduleContext, SeasonKey, Sport, TeamStatistics,
};
use crate::engine::baseball::LEAGUE_RUNS_PER_GAME;
use crate::engine::SportProfile;

/// Total-yards edge that makes a loss look undeserved
const OUTGAINED_BY: f64 = 50.0;
/// Yards-per-play edge that makes a loss look undeserved
const OUT_EFFICIENT_BY: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Venue {
    Home,
    Away,
    Neutral,
}

/// One game from one team's point of view
#[derive(Debug, Clone)]
struct TeamGame<'a> {
    opponent: &'a str,
    venue: Venue,
    points_for: f64,
    points_against: f64,
    own: &'a BoxScore,
    opp: &'a BoxScore,
}

impl<'a> TeamGame<'a> {
    fn home_side(g: &'a GameEntry) -> Self {
        TeamGame {
            opponent: &g.away,
            venue: if g.neutral { Venue::Neutral } else { Venue::Home },
            points_for: g.home_score as f64,
            points_against: g.away_score as f64,
            own: &g.home_box,
            opp: &g.away_box,
        }
    }

    fn away_side(g: &'a GameEntry) -> Self {
        TeamGame {
            opponent: &g.home,
            venue: if g.neutral { Venue::Neutral } else { Venue::Away },
            points_for: g.away_score as f64,
            points_against: g.home_score as f64,
            own: &g.away_box,
            opp: &g.home_box,
        }
    }

    fn won(&self) -> bool {
        self.points_for > self.points_against
    }

    fn turnover_margin(&self) -> f64 {
        self.opp.turnovers - self.own.turnovers
    }
}

fn counts_toward(g: &GameEntry, season: &SeasonKey) -> bool {
    if g.phase == Phase::Preseason {
        return false;
    }
    match (season.through_week, g.week) {
        (Some(limit), Some(week)) => week <= limit,
        _ => true,
    }
}

/// Normalize a season's game logs into per-team statistics.
///
/// Preseason games, ties and games past `season.through_week` are left out.
pub fn build_league(games: &[GameEntry], season: &SeasonKey, profile: &SportProfile) -> LeagueTable {
    let mut logs: BTreeMap<&str, Vec<TeamGame>> = BTreeMap::new();
    for g in games.iter().filter(|g| counts_toward(g, season)) {
        if g.home_score == g.away_score {
            debug!("Skipping tie {} {} - {} {}", g.home, g.home_score, g.away_score, g.away);
            continue;
        }
        logs.entry(g.home.as_str()).or_default().push(TeamGame::home_side(g));
        logs.entry(g.away.as_str()).or_default().push(TeamGame::away_side(g));
    }

    let mut teams: BTreeMap<&str, TeamStatistics> = logs
        .iter()
        .map(|(name, log)| (*name, summarize(name, log, profile)))
        .collect();

    let styles: HashMap<&str, OffensiveStyle> =
        teams.iter().map(|(n, t)| (*n, t.style)).collect();
    let win_rates: HashMap<&str, f64> = teams.iter().map(|(n, t)| (*n, t.win_rate())).collect();
    let defense_ranks = rank_defenses(&teams);
    let league_scoring = mean(teams.values().map(|t| t.offense.scoring)).unwrap_or(0.0);

    for (name, stats) in teams.iter_mut() {
        let log = &logs[name];
        stats.schedule = ScheduleContext {
            opponent_quality: mean(log.iter().filter_map(|g| win_rates.get(g.opponent).copied()))
                .unwrap_or(0.5),
            opponent_defense_rank: mean(
                log.iter().filter_map(|g| defense_ranks.get(g.opponent).copied()),
            )
            .unwrap_or(0.5),
            league_scoring_rate: league_scoring,
        };
        if profile.sport == Sport::Football {
            for g in log {
                if let Some(style) = styles.get(g.opponent) {
                    stats.defense_by_style.record(*style, g.points_against);
                }
            }
        }
    }

    debug!("Built {} {} team tables for {}", teams.len(), profile.sport, season);
    LeagueTable::new(teams.into_values())
}

/// Defenses ordered by efficiency allowed: best gets 1/n, worst gets 1.0
fn rank_defenses<'a>(teams: &BTreeMap<&'a str, TeamStatistics>) -> HashMap<&'a str, f64> {
    let mut order: Vec<(&str, f64)> = teams
        .iter()
        .map(|(n, t)| (*n, t.defense.efficiency_allowed))
        .collect();
    order.sort_by(|a, b| a.1.total_cmp(&b.1));
    let n = order.len() as f64;
    order
        .into_iter()
        .enumerate()
        .map(|(i, (name, _))| (name, (i + 1) as f64 / n))
        .collect()
}

fn weighted<'a>(log: &[TeamGame<'a>], base: f64, f: impl Fn(&TeamGame<'a>) -> f64) -> f64 {
    let values: Vec<f64> = log.iter().map(f).collect();
    recency_weighted(&values, base)
}

/// Like [`weighted`] over the games where the stat was recorded (non-zero)
fn weighted_tracked<'a>(log: &[TeamGame<'a>], base: f64, f: impl Fn(&TeamGame<'a>) -> f64) -> f64 {
    let values: Vec<f64> = log.iter().map(f).filter(|v| *v > 0.0).collect();
    recency_weighted(&values, base)
}

fn summarize(name: &str, log: &[TeamGame], profile: &SportProfile) -> TeamStatistics {
    let base = profile.recency_base;

    let (offense, defense, turnover_margin, pressure_margin) = match profile.sport {
        Sport::Football => (
            OffenseRates {
                efficiency: weighted(log, base, |g| g.own.yards_per_play),
                scoring: weighted(log, base, |g| g.points_for),
                rushing: weighted(log, base, |g| g.own.rushing_yards),
                passing: weighted(log, base, |g| g.own.passing_yards),
                total_yards: weighted(log, base, |g| g.own.total_yards),
                power: 0.0,
                conversion_rate: weighted(log, base, |g| g.own.third_down_rate),
                penalties: weighted(log, base, |g| g.own.penalties),
                completion_rate: weighted_tracked(log, base, |g| g.own.completion_rate),
                rushing_avg: weighted_tracked(log, base, |g| g.own.rushing_avg),
                interceptions: weighted(log, base, |g| g.own.interceptions),
            },
            DefenseRates {
                efficiency_allowed: weighted(log, base, |g| g.opp.yards_per_play),
                scoring_allowed: weighted(log, base, |g| g.points_against),
                rushing_allowed: weighted(log, base, |g| g.opp.rushing_yards),
                passing_allowed: weighted(log, base, |g| g.opp.passing_yards),
                completion_allowed: weighted_tracked(log, base, |g| g.opp.completion_rate),
                rushing_avg_allowed: weighted_tracked(log, base, |g| g.opp.rushing_avg),
                interceptions_forced: weighted(log, base, |g| g.opp.interceptions),
            },
            weighted(log, base, |g| g.turnover_margin()),
            weighted(log, base, |g| g.own.sacks - g.opp.sacks),
        ),
        Sport::Baseball => {
            let runs_allowed = weighted(log, base, |g| g.points_against);
            (
                OffenseRates {
                    efficiency: weighted(log, base, |g| g.own.obp + g.own.slg),
                    scoring: weighted(log, base, |g| g.points_for),
                    power: weighted(log, base, |g| g.own.home_runs),
                    ..Default::default()
                },
                DefenseRates {
                    efficiency_allowed: runs_allowed / LEAGUE_RUNS_PER_GAME,
                    scoring_allowed: runs_allowed,
                    ..Default::default()
                },
                weighted(log, base, |g| g.opp.errors - g.own.errors),
                0.0,
            )
        }
    };

    let style = match profile.sport {
        Sport::Football => OffensiveStyle::classify(offense.rushing, offense.passing),
        Sport::Baseball => OffensiveStyle::default(),
    };

    TeamStatistics {
        team: name.to_string(),
        games_played: log.len() as u32,
        record: record(log, profile),
        offense,
        defense,
        points_for_total: log.iter().map(|g| g.points_for).sum(),
        points_against_total: log.iter().map(|g| g.points_against).sum(),
        turnover_margin,
        pressure_margin,
        schedule: ScheduleContext::default(),
        signals: recent_signals(log, profile),
        style,
        defense_by_style: Default::default(),
    }
}

/// (wins, games)
fn tally<'a, 'b>(games: impl Iterator<Item = &'b TeamGame<'a>>) -> (u32, u32)
where
    'a: 'b,
{
    games.fold((0, 0), |(wins, n), g| (wins + u32::from(g.won()), n + 1))
}

fn record(log: &[TeamGame], profile: &SportProfile) -> Record {
    let (wins, games) = tally(log.iter());
    let (home_wins, home_games) = tally(log.iter().filter(|g| g.venue == Venue::Home));
    let (away_wins, away_games) = tally(log.iter().filter(|g| g.venue == Venue::Away));
    let recent = &log[log.len().saturating_sub(profile.recent_window)..];
    let (recent_wins, recent_games) = tally(recent.iter());
    let close_margin = profile.close_margin as f64;
    let (close_wins, close_games) = tally(
        log.iter()
            .filter(|g| (g.points_for - g.points_against).abs() <= close_margin),
    );

    Record {
        wins,
        losses: games - wins,
        home_wins,
        home_games,
        away_wins,
        away_games,
        recent_wins,
        recent_games,
        close_wins,
        close_games,
    }
}

fn recent_signals(log: &[TeamGame], profile: &SportProfile) -> RecentSignals {
    let window = &log[log.len().saturating_sub(profile.recent_window)..];
    let losses: Vec<&TeamGame> = window.iter().filter(|g| !g.won()).collect();
    let last = log.last();

    let loss_profile = losses
        .iter()
        .find_map(|g| {
            if g.own.total_yards > g.opp.total_yards + OUTGAINED_BY {
                Some(LossProfile::Outgained)
            } else if g.own.yards_per_play > g.opp.yards_per_play + OUT_EFFICIENT_BY {
                Some(LossProfile::MoreEfficient)
            } else {
                None
            }
        })
        .unwrap_or_default();

    let recent_conversion_rate = if window.len() >= 2 {
        mean(window.iter().map(|g| g.own.third_down_rate)).unwrap_or(0.0)
    } else {
        0.0
    };

    let blowout = profile.blowout_margin as f64;
    RecentSignals {
        recent_losses: losses.len() as u32,
        last_game_lost: last.map(|g| !g.won()).unwrap_or(false),
        last_game_turnover_margin: last.map(|g| g.turnover_margin()).unwrap_or(0.0),
        last_two_turnover_margin: log.iter().rev().take(2).map(|g| g.turnover_margin()).sum(),
        recent_conversion_rate,
        loss_profile,
        blowout_loss: losses.iter().any(|g| g.points_against - g.points_for >= blowout),
    }
}
