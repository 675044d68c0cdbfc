//! Baseball profile: pitching, park and weather on top of the shared factors.

use super::form::{self, PythagoreanRules};
use super::injuries::{injury_factor, InjuryWeights};
use super::venue::{self, HomeFieldRules};
use super::{offense, pitching};
use super::{Award, Factor, Ladder, Matchup, SportProfile};
use crate::db::models::Sport;

/// Runs per game of an average offense; runs allowed are stored relative to it
pub const LEAGUE_RUNS_PER_GAME: f64 = 4.5;

// ── Ladders ───────────────────────────────────────────────────────────────────

/// QualityScore difference between the starters
pub const STARTING_PITCHER: Ladder =
    Ladder::at_least(&[(30.0, 5.0), (20.0, 3.5), (10.0, 2.0), (5.0, 1.0)]);
pub const BULLPEN: Ladder = Ladder::at_least(&[(20.0, 2.0), (10.0, 1.0)]);

/// OPS against relative runs allowed
pub const EFFICIENCY_EDGE: Ladder = Ladder::at_least(&[(1.15, 3.0), (1.05, 1.5)]);
pub const EFFICIENCY_DEFICIT: Ladder = Ladder::at_most(&[(0.90, 2.0)]);

pub const RUN_PRODUCTION: Ladder = Ladder::at_least(&[(1.0, 2.0)]);
pub const POWER: Ladder = Ladder::at_least(&[(0.5, 1.0)]);
pub const HOT: Ladder = Ladder::at_least(&[(0.70, 2.0), (0.60, 1.0)]);
pub const SLUMP: Ladder = Ladder::at_most(&[(0.30, 1.5)]);
pub const RUN_DIFFERENTIAL: Ladder = Ladder::at_least(&[(1.0, 1.5)]);

pub const HOME_FIELD: HomeFieldRules = HomeFieldRules {
    winless_at_home: None,
    ladder: Ladder::above(&[(0.20, 3.5), (0.10, 2.5)]),
    worse_at_home: None,
    baseline: 2.0,
};

pub const PYTHAGOREAN: PythagoreanRules = PythagoreanRules {
    overperformance: 0.10,
    lucky_penalty: -1.0,
    underperformance: Some((0.10, 1.0)),
    bounce_back: None,
};

pub const WIN_RATE_WEIGHT: f64 = 3.0;

// ── Calculators ───────────────────────────────────────────────────────────────

fn starting_pitcher(m: &Matchup, _: &SportProfile) -> Award {
    pitching::starting_pitcher(m, &STARTING_PITCHER)
}

fn bullpen(m: &Matchup, _: &SportProfile) -> Award {
    pitching::bullpen(m, &BULLPEN)
}

fn park(m: &Matchup, _: &SportProfile) -> Award {
    venue::park(m)
}

fn weather(m: &Matchup, _: &SportProfile) -> Award {
    venue::weather(m)
}

fn offense_efficiency(m: &Matchup, _: &SportProfile) -> Award {
    offense::efficiency_matchup(m, &EFFICIENCY_EDGE, &EFFICIENCY_DEFICIT)
}

fn run_production(m: &Matchup, _: &SportProfile) -> Award {
    offense::differential(m, "runs per game", |t| t.offense.scoring, &RUN_PRODUCTION)
}

fn power(m: &Matchup, _: &SportProfile) -> Award {
    offense::differential(m, "home runs per game", |t| t.offense.power, &POWER)
}

fn recent_form(m: &Matchup, _: &SportProfile) -> Award {
    form::recent_form(m, &HOT, &SLUMP)
}

fn home_field(m: &Matchup, _: &SportProfile) -> Award {
    venue::home_field(m, &HOME_FIELD)
}

fn win_rate(m: &Matchup, _: &SportProfile) -> Award {
    form::win_rate(m, WIN_RATE_WEIGHT)
}

fn pythagorean(m: &Matchup, p: &SportProfile) -> Award {
    form::pythagorean(m, p, &PYTHAGOREAN)
}

fn run_differential(m: &Matchup, _: &SportProfile) -> Award {
    offense::differential(m, "run differential", |t| t.scoring_margin(), &RUN_DIFFERENTIAL)
}

pub fn profile() -> SportProfile {
    SportProfile {
        sport: Sport::Baseball,
        confidence_divisor: 5.0,
        pythagorean_exponent: 1.83,
        recent_window: 10,
        close_margin: 1,
        blowout_margin: 6,
        recency_base: 2.0,
        injuries: InjuryWeights::baseball(),
        factors: vec![
            Factor { name: "starting_pitcher", calculate: starting_pitcher },
            Factor { name: "bullpen", calculate: bullpen },
            Factor { name: "park", calculate: park },
            Factor { name: "weather", calculate: weather },
            Factor { name: "offense_efficiency", calculate: offense_efficiency },
            Factor { name: "run_production", calculate: run_production },
            Factor { name: "power", calculate: power },
            Factor { name: "recent_form", calculate: recent_form },
            Factor { name: "home_field", calculate: home_field },
            Factor { name: "win_rate", calculate: win_rate },
            Factor { name: "pythagorean", calculate: pythagorean },
            Factor { name: "run_differential", calculate: run_differential },
            Factor { name: "injuries", calculate: injury_factor },
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::TeamStatistics;
    use crate::engine::fixtures::team;
    use approx::assert_relative_eq;

    fn ball_club(name: &str, ops: f64, runs: f64, runs_allowed: f64) -> TeamStatistics {
        let mut t = team(name);
        t.offense.efficiency = ops;
        t.offense.scoring = runs;
        t.defense.scoring_allowed = runs_allowed;
        t.defense.efficiency_allowed = runs_allowed / LEAGUE_RUNS_PER_GAME;
        t
    }

    #[test]
    fn ladders_are_ordered() {
        for ladder in [
            STARTING_PITCHER,
            BULLPEN,
            EFFICIENCY_EDGE,
            EFFICIENCY_DEFICIT,
            RUN_PRODUCTION,
            POWER,
            HOT,
            SLUMP,
            RUN_DIFFERENTIAL,
            HOME_FIELD.ladder,
        ] {
            assert!(ladder.is_well_ordered(), "{:?}", ladder);
        }
    }

    #[test]
    fn run_scoring_advantage_earns_its_ladder_rungs() {
        // Identical clubs except the home side scores 5 more runs a game
        let home = ball_club("Home", 0.720, 9.5, 4.5);
        let away = ball_club("Away", 0.720, 4.5, 4.5);
        let m = Matchup::new(home, away);
        let p = profile();

        let award = run_production(&m, &p);
        assert_relative_eq!(award.home, 2.0);
        assert_relative_eq!(award.away, 0.0);

        let award = run_differential(&m, &p);
        assert_relative_eq!(award.home, 1.5);
        assert_relative_eq!(award.away, 0.0);
    }

    #[test]
    fn ops_against_runs_allowed() {
        // 0.800 / (3.6/4.5 + 0.1) = 0.889 → 2.0 to the opponent
        let home = ball_club("Home", 0.800, 4.5, 4.5);
        let away = ball_club("Away", 0.720, 4.5, 3.6);
        let award = offense_efficiency(&Matchup::new(home, away), &profile());
        // Away 0.720 / (4.5/4.5 + 0.1) = 0.655 → 2.0 to home
        assert_relative_eq!(award.away, 2.0);
        assert_relative_eq!(award.home, 2.0);
    }

    #[test]
    fn home_field_has_a_floor() {
        let award = home_field(&Matchup::new(team("Home"), team("Away")), &profile());
        // fixture home .600 vs away .400 = +0.2, not above 0.20
        assert_relative_eq!(award.home, 2.5);
        let mut even = team("Home");
        even.record.home_wins = 2;
        let award = home_field(&Matchup::new(even, team("Away")), &profile());
        assert_relative_eq!(award.home, 2.0);
    }

    #[test]
    fn unlucky_team_gets_bonus() {
        let mut home = team("Home");
        home.record.wins = 3;
        home.record.losses = 7;
        home.points_for_total = 50.0;
        home.points_against_total = 40.0;
        let award = pythagorean(&Matchup::new(home, team("Away")), &profile());
        assert_relative_eq!(award.home, 1.0);
    }
}
