//! Football profile: ladders and the calculator lineup.

use super::form::{self, BounceBackRules, DefenseSchedule, PythagoreanRules};
use super::injuries::{injury_factor, InjuryWeights};
use super::offense;
use super::venue::{self, HomeFieldRules};
use super::{Award, Factor, Ladder, Matchup, SportProfile};
use crate::db::models::Sport;

// ── Ladders ───────────────────────────────────────────────────────────────────

/// Yards per play against yards per play allowed
pub const EFFICIENCY_EDGE: Ladder = Ladder::at_least(&[(1.2, 3.5), (1.1, 2.5), (1.0, 1.5)]);
pub const EFFICIENCY_DEFICIT: Ladder = Ladder::at_most(&[(0.85, 2.0), (0.95, 1.0)]);

/// Rushing or passing yards against yards allowed
pub const YARDAGE: Ladder = Ladder::at_least(&[(1.3, 2.5), (1.1, 1.5), (1.0, 0.75)]);

pub const SCORING: Ladder = Ladder::at_least(&[(1.25, 2.5), (1.15, 1.5)]);
pub const THIRD_DOWN: Ladder = Ladder::above(&[(0.08, 1.5), (0.04, 0.75)]);
pub const PASS_RUSH: Ladder = Ladder::above(&[(1.5, 1.5), (0.5, 0.75)]);
pub const HOT: Ladder = Ladder::at_least(&[(0.70, 2.0), (0.60, 1.0)]);
pub const SLUMP: Ladder = Ladder::at_most(&[(0.30, 1.5)]);
pub const SCHEDULE: Ladder = Ladder::at_least(&[(0.15, 2.0), (0.05, 1.0)]);
pub const CLUTCH: Ladder = Ladder::above(&[(0.60, 1.0)]);
pub const RED_ZONE: Ladder = Ladder::at_least(&[(1.15, 1.5), (1.05, 0.75)]);
pub const DISCIPLINE: Ladder = Ladder::above(&[(2.0, 1.5), (1.0, 0.75)]);
pub const TURNOVERS: Ladder = Ladder::above(&[(0.5, 1.5), (0.2, 0.75)]);
pub const POOR_RECORD: Ladder = Ladder::below(&[(0.20, -2.5), (0.40, -1.5)]);

/// Completion rate against completion rate allowed
pub const ACCURACY_EDGE: Ladder = Ladder::above(&[(0.10, 2.0), (0.05, 1.0)]);
pub const ACCURACY_STOP: Ladder = Ladder::below(&[(-0.10, 1.5)]);
/// Yards per carry against yards per carry allowed
pub const RUSHING_EDGE: Ladder = Ladder::above(&[(1.5, 2.0), (0.8, 1.0)]);
pub const NO_STOP: Ladder = Ladder::above(&[]);
/// Interceptions thrown against interceptions forced: low pays the offense
pub const BALL_SECURITY: Ladder = Ladder::below(&[(-0.5, 1.0)]);
pub const TAKEAWAYS: Ladder = Ladder::above(&[(1.0, 2.5), (0.5, 1.0)]);

pub const HOME_FIELD: HomeFieldRules = HomeFieldRules {
    winless_at_home: Some(0.0),
    ladder: Ladder::above(&[(0.25, 3.0), (0.15, 2.5), (0.05, 2.0)]),
    worse_at_home: Some((-0.10, 0.5)),
    baseline: 1.5,
};

pub const PYTHAGOREAN: PythagoreanRules = PythagoreanRules {
    overperformance: 0.15,
    lucky_penalty: -1.0,
    underperformance: None,
    bounce_back: Some(BounceBackRules {
        min_recent_losses: 2,
        turnover_collapse: (-2.0, 1.5),
        two_game_collapse: (-3.0, 1.0),
        conversion_slump: (0.25, 1.0),
        outgained: 1.5,
        more_efficient: 1.0,
        blowout: 0.5,
        qualifying: 2.0,
        cap: 4.0,
    }),
};

pub const DEFENSE_SCHEDULE: DefenseSchedule = DefenseSchedule {
    elite_rank: 0.40,
    elite_scoring: 22.0,
    elite_bonus: 1.5,
    soft_rank: 0.60,
    padding_penalty: -2.0,
};

/// Games against an offensive style before the split counts
pub const MIN_STYLE_GAMES: u32 = 2;
/// Points per game away from the usual allowance that make a split telling
pub const STYLE_MARGIN: f64 = 3.0;
pub const STYLE_BONUS: f64 = 1.5;
pub const MIN_CLOSE_GAMES: u32 = 3;
pub const WINLESS_PENALTY: f64 = -3.0;
pub const WIN_RATE_WEIGHT: f64 = 3.0;

// ── Calculators ───────────────────────────────────────────────────────────────

fn offense_efficiency(m: &Matchup, _: &SportProfile) -> Award {
    offense::efficiency_matchup(m, &EFFICIENCY_EDGE, &EFFICIENCY_DEFICIT)
}

fn run_game(m: &Matchup, _: &SportProfile) -> Award {
    offense::paired_ratio(
        m,
        "rushing",
        |t| t.offense.rushing,
        |t| t.defense.rushing_allowed,
        &YARDAGE,
    )
}

fn pass_game(m: &Matchup, _: &SportProfile) -> Award {
    offense::paired_ratio(
        m,
        "passing",
        |t| t.offense.passing,
        |t| t.defense.passing_allowed,
        &YARDAGE,
    )
}

fn scoring_efficiency(m: &Matchup, _: &SportProfile) -> Award {
    offense::paired_ratio(
        m,
        "scoring",
        |t| t.offense.scoring,
        |t| t.defense.scoring_allowed,
        &SCORING,
    )
}

fn third_down(m: &Matchup, _: &SportProfile) -> Award {
    offense::differential(m, "third-down rate", |t| t.offense.conversion_rate, &THIRD_DOWN)
}

fn pass_rush(m: &Matchup, _: &SportProfile) -> Award {
    offense::differential(m, "sack margin", |t| t.pressure_margin, &PASS_RUSH)
}

fn recent_form(m: &Matchup, _: &SportProfile) -> Award {
    form::recent_form(m, &HOT, &SLUMP)
}

fn schedule_strength(m: &Matchup, _: &SportProfile) -> Award {
    form::schedule_strength(m, &SCHEDULE)
}

fn stat_padding(m: &Matchup, _: &SportProfile) -> Award {
    form::stat_padding(m, &DEFENSE_SCHEDULE)
}

fn similar_matchups(m: &Matchup, _: &SportProfile) -> Award {
    form::similar_matchups(m, MIN_STYLE_GAMES, STYLE_MARGIN, STYLE_BONUS)
}

fn completion_matchup(m: &Matchup, _: &SportProfile) -> Award {
    offense::gap_matchup(
        m,
        "completion rate vs allowed",
        |t| t.offense.completion_rate,
        |t| t.defense.completion_allowed,
        &ACCURACY_EDGE,
        &ACCURACY_STOP,
        true,
    )
}

fn rushing_efficiency(m: &Matchup, _: &SportProfile) -> Award {
    offense::gap_matchup(
        m,
        "yards per carry vs allowed",
        |t| t.offense.rushing_avg,
        |t| t.defense.rushing_avg_allowed,
        &RUSHING_EDGE,
        &NO_STOP,
        true,
    )
}

fn takeaway_battle(m: &Matchup, _: &SportProfile) -> Award {
    offense::gap_matchup(
        m,
        "interceptions thrown vs forced",
        |t| t.offense.interceptions,
        |t| t.defense.interceptions_forced,
        &BALL_SECURITY,
        &TAKEAWAYS,
        false,
    )
}

fn close_games(m: &Matchup, _: &SportProfile) -> Award {
    form::close_games(m, MIN_CLOSE_GAMES, &CLUTCH)
}

fn home_field(m: &Matchup, _: &SportProfile) -> Award {
    venue::home_field(m, &HOME_FIELD)
}

fn road_matchup(m: &Matchup, _: &SportProfile) -> Award {
    venue::road_matchup(m)
}

fn red_zone_proxy(m: &Matchup, _: &SportProfile) -> Award {
    offense::red_zone_proxy(m, &RED_ZONE)
}

fn penalty_discipline(m: &Matchup, _: &SportProfile) -> Award {
    offense::inverse_differential(m, "penalties per game", |t| t.offense.penalties, &DISCIPLINE)
}

fn win_rate(m: &Matchup, _: &SportProfile) -> Award {
    form::win_rate(m, WIN_RATE_WEIGHT)
}

fn pythagorean(m: &Matchup, p: &SportProfile) -> Award {
    form::pythagorean(m, p, &PYTHAGOREAN)
}

fn turnover_margin(m: &Matchup, _: &SportProfile) -> Award {
    offense::differential(m, "turnover margin", |t| t.turnover_margin, &TURNOVERS)
}

fn poor_record(m: &Matchup, _: &SportProfile) -> Award {
    form::poor_record(m, WINLESS_PENALTY, &POOR_RECORD)
}

pub fn profile() -> SportProfile {
    SportProfile {
        sport: Sport::Football,
        confidence_divisor: 6.0,
        pythagorean_exponent: 2.37,
        recent_window: 3,
        close_margin: 7,
        blowout_margin: 20,
        recency_base: 1.5,
        injuries: InjuryWeights::football(),
        factors: vec![
            Factor { name: "similar_matchups", calculate: similar_matchups },
            Factor { name: "offense_efficiency", calculate: offense_efficiency },
            Factor { name: "run_game", calculate: run_game },
            Factor { name: "pass_game", calculate: pass_game },
            Factor { name: "scoring_efficiency", calculate: scoring_efficiency },
            Factor { name: "third_down", calculate: third_down },
            Factor { name: "pass_rush", calculate: pass_rush },
            Factor { name: "recent_form", calculate: recent_form },
            Factor { name: "schedule_strength", calculate: schedule_strength },
            Factor { name: "stat_padding", calculate: stat_padding },
            Factor { name: "close_games", calculate: close_games },
            Factor { name: "home_field", calculate: home_field },
            Factor { name: "road_matchup", calculate: road_matchup },
            Factor { name: "completion_matchup", calculate: completion_matchup },
            Factor { name: "red_zone_proxy", calculate: red_zone_proxy },
            Factor { name: "rushing_efficiency", calculate: rushing_efficiency },
            Factor { name: "takeaway_battle", calculate: takeaway_battle },
            Factor { name: "penalty_discipline", calculate: penalty_discipline },
            Factor { name: "win_rate", calculate: win_rate },
            Factor { name: "pythagorean", calculate: pythagorean },
            Factor { name: "turnover_margin", calculate: turnover_margin },
            Factor { name: "poor_record", calculate: poor_record },
            Factor { name: "injuries", calculate: injury_factor },
        ],
    }
}
