//! Injury impact: position weight × status multiplier, summed per team.

use super::{Award, Ladder, Matchup, SportProfile};
use crate::db::models::InjuryReport;

/// A key player counts as missing above this status multiplier.
const KEY_PLAYER_OUT: f64 = 0.5;

/// Position and status tables for one sport
#[derive(Debug, Clone)]
pub struct InjuryWeights {
    /// Position abbreviation → weight
    pub positions: Vec<(String, f64)>,
    pub default_position_weight: f64,
    /// Status keyword → multiplier, matched as a case-insensitive substring in order
    pub statuses: Vec<(String, f64)>,
    /// "QB" or "SP"
    pub key_position: String,
    /// Points taken from a team whose key player is out when the opponent's is not
    pub key_injury_penalty: f64,
    /// Awarded to the healthier side on the ImpactScore difference
    pub impact_ladder: Ladder,
    /// Skip the ImpactScore comparison when either key player is out
    pub comparison_needs_healthy_keys: bool,
}

fn table(rows: &[(&str, f64)]) -> Vec<(String, f64)> {
    rows.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

impl InjuryWeights {
    pub fn football() -> Self {
        InjuryWeights {
            positions: table(&[
                ("QB", 10.0),
                ("WR", 2.5),
                ("OL", 2.5),
                ("RB", 2.0),
                ("TE", 2.0),
                ("DE", 2.0),
                ("CB", 2.0),
                ("LB", 1.5),
                ("S", 1.5),
                ("DT", 1.5),
            ]),
            default_position_weight: 1.0,
            statuses: table(&[
                ("out", 1.0),
                ("ir", 1.0),
                ("injured reserve", 1.0),
                ("doubtful", 0.6),
                ("questionable", 0.2),
                ("active", 0.0),
            ]),
            key_position: "QB".into(),
            key_injury_penalty: 5.0,
            impact_ladder: Ladder::above(&[(10.0, 3.0), (5.0, 2.0), (3.0, 1.0)]),
            comparison_needs_healthy_keys: false,
        }
    }

    pub fn baseball() -> Self {
        InjuryWeights {
            positions: table(&[
                ("SP", 12.0),
                ("C", 3.5),
                ("RP", 3.0),
                ("SS", 3.0),
                ("1B", 2.5),
                ("2B", 2.5),
                ("3B", 2.5),
                ("OF", 2.0),
                ("LF", 2.0),
                ("CF", 2.0),
                ("RF", 2.0),
                ("DH", 2.0),
            ]),
            default_position_weight: 1.0,
            statuses: table(&[
                ("out", 1.0),
                ("60-day il", 1.0),
                ("15-day il", 0.8),
                ("10-day il", 0.7),
                ("day-to-day", 0.3),
                ("active", 0.0),
            ]),
            key_position: "SP".into(),
            key_injury_penalty: 4.0,
            impact_ladder: Ladder::above(&[(5.0, 2.0)]),
            comparison_needs_healthy_keys: true,
        }
    }

    pub fn position_weight(&self, position: &str) -> f64 {
        let position = position.trim();
        self.positions
            .iter()
            .find(|(p, _)| p.eq_ignore_ascii_case(position))
            .map(|(_, w)| *w)
            .unwrap_or(self.default_position_weight)
    }

    /// Unknown statuses count for nothing
    pub fn status_multiplier(&self, status: &str) -> f64 {
        let status = status.to_lowercase();
        self.statuses
            .iter()
            .find(|(keyword, _)| status.contains(keyword.as_str()))
            .map(|(_, m)| *m)
            .unwrap_or(0.0)
    }

    pub fn assess(&self, report: &InjuryReport) -> InjuryImpact {
        let mut impact = InjuryImpact::default();
        for injury in &report.injuries {
            let multiplier = self.status_multiplier(&injury.status);
            if multiplier <= 0.0 {
                continue;
            }
            impact.score += self.position_weight(&injury.position) * multiplier;
            impact.counted += 1;
            if injury.position.trim().eq_ignore_ascii_case(&self.key_position)
                && multiplier > KEY_PLAYER_OUT
            {
                impact.key_players_out.push(injury.player.clone());
            }
        }
        impact
    }
}

/// Summed injury impact for one team
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InjuryImpact {
    pub score: f64,
    /// Players with a non-zero multiplier
    pub counted: usize,
    pub key_players_out: Vec<String>,
}

impl InjuryImpact {
    pub fn key_player_out(&self) -> bool {
        !self.key_players_out.is_empty()
    }
}

pub fn injury_factor(m: &Matchup, p: &SportProfile) -> Award {
    let Some(pair) = &m.injuries else {
        return Award::none("injury reports not available");
    };
    let weights = &p.injuries;
    let home = weights.assess(&pair.home);
    let away = weights.assess(&pair.away);

    let (mut h, mut a) = (0.0, 0.0);
    let mut notes = Vec::new();
    match (home.key_player_out(), away.key_player_out()) {
        (true, false) => {
            h -= weights.key_injury_penalty;
            notes.push(format!(
                "{} without {} {}",
                m.home.team,
                weights.key_position,
                home.key_players_out.join(", ")
            ));
        }
        (false, true) => {
            a -= weights.key_injury_penalty;
            notes.push(format!(
                "{} without {} {}",
                m.away.team,
                weights.key_position,
                away.key_players_out.join(", ")
            ));
        }
        _ => {}
    }

    let either_key_out = home.key_player_out() || away.key_player_out();
    if !(weights.comparison_needs_healthy_keys && either_key_out) {
        // Positive when the away side is more banged up
        let diff = away.score - home.score;
        let points = weights.impact_ladder.award(diff.abs());
        if points > 0.0 {
            if diff > 0.0 {
                h += points;
                notes.push(format!("{} healthier", m.home.team));
            } else {
                a += points;
                notes.push(format!("{} healthier", m.away.team));
            }
        }
    }

    let summary = format!("impact {:.1} vs {:.1}", home.score, away.score);
    if notes.is_empty() {
        Award::new(h, a, summary)
    } else {
        Award::new(h, a, format!("{}; {}", summary, notes.join("; ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::{Injury, Sport};
    use crate::engine::fixtures::team;
    use approx::assert_relative_eq;
    use chrono::Utc;

    fn report(team: &str, injuries: &[(&str, &str, &str)]) -> InjuryReport {
        InjuryReport {
            team: team.into(),
            injuries: injuries
                .iter()
                .map(|(player, position, status)| Injury {
                    player: player.to_string(),
                    position: position.to_string(),
                    status: status.to_string(),
                    detail: String::new(),
                })
                .collect(),
            fetched_at: Utc::now(),
        }
    }

    fn run(sport: Sport, home: InjuryReport, away: InjuryReport) -> Award {
        let m = Matchup::new(team("Home"), team("Away")).with_injuries(home, away);
        injury_factor(&m, &SportProfile::for_sport(sport))
    }

    #[test]
    fn impact_score_sums_weight_times_multiplier() {
        let w = InjuryWeights::football();
        let r = report(
            "Home",
            &[("A", "WR", "Out"), ("B", "LB", "Questionable"), ("C", "K", "Doubtful")],
        );
        let impact = w.assess(&r);
        // 2.5 × 1.0 + 1.5 × 0.2 + 1.0 × 0.6
        assert_relative_eq!(impact.score, 3.4, epsilon = 1e-9);
        assert_eq!(impact.counted, 3);
        assert!(!impact.key_player_out());
    }

    #[test]
    fn unknown_status_counts_nothing() {
        let w = InjuryWeights::football();
        assert_relative_eq!(w.status_multiplier("Probable"), 0.0);
        assert_relative_eq!(w.status_multiplier("Injured Reserve"), 1.0);
        assert_relative_eq!(InjuryWeights::baseball().status_multiplier("15-Day IL"), 0.8);
    }

    #[test]
    fn lone_quarterback_injury_costs_the_penalty() {
        let award = run(
            Sport::Football,
            report("Home", &[("Starter", "QB", "Out")]),
            report("Away", &[]),
        );
        assert_relative_eq!(award.home, -5.0);
        // QB weight 10 also swings the impact comparison (>5 → 2.0)
        assert_relative_eq!(award.away, 2.0);
    }

    #[test]
    fn questionable_quarterback_is_not_out() {
        let award = run(
            Sport::Football,
            report("Home", &[("Starter", "QB", "Questionable")]),
            report("Away", &[]),
        );
        assert_relative_eq!(award.home, 0.0);
        assert_relative_eq!(award.away, 0.0);
    }

    #[test]
    fn both_quarterbacks_out_cancel() {
        let award = run(
            Sport::Football,
            report("Home", &[("A", "QB", "Out")]),
            report("Away", &[("B", "QB", "IR")]),
        );
        assert_relative_eq!(award.home, 0.0);
        assert_relative_eq!(award.away, 0.0);
    }

    #[test]
    fn small_impact_gap_is_even() {
        let award = run(
            Sport::Football,
            report("Home", &[("A", "RB", "Out")]),
            report("Away", &[]),
        );
        assert_relative_eq!(award.away, 0.0);
    }

    #[test]
    fn starting_pitcher_penalty_skips_comparison() {
        let award = run(
            Sport::Baseball,
            report("Home", &[]),
            report("Away", &[("Ace", "SP", "15-Day IL")]),
        );
        assert_relative_eq!(award.away, -4.0);
        assert_relative_eq!(award.home, 0.0);
    }

    #[test]
    fn baseball_impact_gap_rewards_healthier_team() {
        let award = run(
            Sport::Baseball,
            report("Home", &[("A", "C", "Out"), ("B", "SS", "60-Day IL")]),
            report("Away", &[]),
        );
        // 3.5 + 3.0 = 6.5 > 5
        assert_relative_eq!(award.away, 2.0);
        assert_relative_eq!(award.home, 0.0);
    }

    #[test]
    fn missing_reports_are_neutral() {
        let m = Matchup::new(team("Home"), team("Away"));
        let award = injury_factor(&m, &SportProfile::for_sport(Sport::Football));
        assert_relative_eq!(award.home, 0.0);
        assert_relative_eq!(award.away, 0.0);
    }
}
