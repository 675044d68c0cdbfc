//! Offense-against-defense matchups and head-to-head differentials.

use super::{guarded_ratio, Award, Ladder, Matchup};
use crate::db::models::TeamStatistics;

pub type Metric = fn(&TeamStatistics) -> f64;

/// Each offense against the opposing defense. A ratio reaching `edge` pays
/// the offense; otherwise a ratio reaching `deficit` pays the defense.
pub fn efficiency_matchup(m: &Matchup, edge: &Ladder, deficit: &Ladder) -> Award {
    let home_ratio = guarded_ratio(m.home.offense.efficiency, m.away.defense.efficiency_allowed);
    let away_ratio = guarded_ratio(m.away.offense.efficiency, m.home.defense.efficiency_allowed);

    let (mut h, mut a) = (0.0, 0.0);
    match edge.rung(home_ratio) {
        Some(points) => h += points,
        None => a += deficit.award(home_ratio),
    }
    match edge.rung(away_ratio) {
        Some(points) => a += points,
        None => h += deficit.award(away_ratio),
    }
    Award::new(
        h,
        a,
        format!(
            "{} offense {:.2}x vs defense, {} offense {:.2}x",
            m.home.team, home_ratio, m.away.team, away_ratio
        ),
    )
}

/// Each side's `metric` against the opponent's `allowed`, scored independently
pub fn paired_ratio(
    m: &Matchup,
    label: &str,
    metric: Metric,
    allowed: Metric,
    ladder: &Ladder,
) -> Award {
    let home_ratio = guarded_ratio(metric(&m.home), allowed(&m.away));
    let away_ratio = guarded_ratio(metric(&m.away), allowed(&m.home));
    Award::new(
        ladder.award(home_ratio),
        ladder.award(away_ratio),
        format!(
            "{} {} {:.2}x, {} {:.2}x",
            m.home.team, label, home_ratio, m.away.team, away_ratio
        ),
    )
}

/// Each offense's `metric` minus the opposing defense's `allowed`. A gap on
/// the `edge` ladder pays the offense; otherwise a gap on the `stop` ladder
/// pays the defense. With `zero_is_missing`, a side where either value is
/// zero is not scored.
pub fn gap_matchup(
    m: &Matchup,
    label: &str,
    metric: Metric,
    allowed: Metric,
    edge: &Ladder,
    stop: &Ladder,
    zero_is_missing: bool,
) -> Award {
    let gap = |offense: &TeamStatistics, defense: &TeamStatistics| {
        let (value, against) = (metric(offense), allowed(defense));
        if zero_is_missing && (value == 0.0 || against == 0.0) {
            None
        } else {
            Some(value - against)
        }
    };
    let (mut h, mut a) = (0.0, 0.0);
    let home_gap = gap(&m.home, &m.away);
    let away_gap = gap(&m.away, &m.home);
    if let Some(g) = home_gap {
        match edge.rung(g) {
            Some(points) => h += points,
            None => a += stop.award(g),
        }
    }
    if let Some(g) = away_gap {
        match edge.rung(g) {
            Some(points) => a += points,
            None => h += stop.award(g),
        }
    }
    let shown = |g: Option<f64>| g.map_or_else(|| "n/a".to_string(), |g| format!("{:+.2}", g));
    Award::new(
        h,
        a,
        format!(
            "{} {} {}, {} {}",
            m.home.team,
            label,
            shown(home_gap),
            m.away.team,
            shown(away_gap)
        ),
    )
}

/// Whoever leads on `metric` earns the ladder award for the size of the lead
pub fn differential(m: &Matchup, label: &str, metric: Metric, ladder: &Ladder) -> Award {
    let (home, away) = (metric(&m.home), metric(&m.away));
    let diff = home - away;
    let (h, a) = if diff > 0.0 {
        (ladder.award(diff), 0.0)
    } else if diff < 0.0 {
        (0.0, ladder.award(-diff))
    } else {
        (0.0, 0.0)
    };
    Award::new(h, a, format!("{} {:.2} vs {:.2}", label, home, away))
}

/// Like [`differential`] for stats where less is better
pub fn inverse_differential(m: &Matchup, label: &str, metric: Metric, ladder: &Ladder) -> Award {
    let (home, away) = (metric(&m.home), metric(&m.away));
    let diff = away - home;
    let (h, a) = if diff > 0.0 {
        (ladder.award(diff), 0.0)
    } else if diff < 0.0 {
        (0.0, ladder.award(-diff))
    } else {
        (0.0, 0.0)
    };
    Award::new(h, a, format!("{} {:.2} vs {:.2}", label, home, away))
}

/// Points per 100 yards of offense, 0.0 without yardage
pub fn points_per_100_yards(t: &TeamStatistics) -> f64 {
    if t.offense.total_yards > 0.0 {
        t.offense.scoring / (t.offense.total_yards / 100.0)
    } else {
        0.0
    }
}

/// How many times better `a` is than `b`, without dividing by zero
fn edge_ratio(a: f64, b: f64) -> f64 {
    if b > 0.0 {
        a / b
    } else if a > 0.0 {
        f64::INFINITY
    } else {
        1.0
    }
}

/// Finishing drives: points per 100 yards compared between the offenses
pub fn red_zone_proxy(m: &Matchup, ladder: &Ladder) -> Award {
    let home = points_per_100_yards(&m.home);
    let away = points_per_100_yards(&m.away);
    let home_pts = ladder.award(edge_ratio(home, away));
    let (h, a) = if home_pts > 0.0 {
        (home_pts, 0.0)
    } else {
        (0.0, ladder.award(edge_ratio(away, home)))
    };
    Award::new(
        h,
        a,
        format!("{:.1} vs {:.1} points per 100 yards", home, away),
    )
}
