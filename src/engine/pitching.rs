//! Pitching factors: starter QualityScore and an estimated bullpen score.

use super::{Award, Ladder, Matchup, PitcherLookup};
use crate::db::models::{PitcherStats, TeamStatistics};

/// QualityScore of a pitcher we know nothing about
pub const LEAGUE_AVERAGE_QUALITY: f64 = 50.0;

const ERA_BONUS: Ladder = Ladder::below(&[(2.50, 20.0), (3.50, 10.0), (4.00, 5.0)]);
const ERA_PENALTY: Ladder = Ladder::above(&[(5.50, -15.0), (4.50, -5.0)]);
const WHIP_BONUS: Ladder = Ladder::below(&[(1.00, 15.0), (1.20, 8.0)]);
const WHIP_PENALTY: Ladder = Ladder::above(&[(1.50, -10.0), (1.40, -5.0)]);
const WIN_PCT_BONUS: Ladder = Ladder::above(&[(0.650, 10.0), (0.550, 5.0)]);
const WIN_PCT_PENALTY: Ladder = Ladder::below(&[(0.350, -10.0), (0.450, -5.0)]);
const K9_BONUS: Ladder = Ladder::above(&[(10.0, 8.0), (8.5, 4.0)]);
const K9_PENALTY: Ladder = Ladder::below(&[(6.0, -5.0)]);

/// Bullpen ERA estimate → bullpen score; anything worse scores 30
const BULLPEN_QUALITY: Ladder = Ladder::below(&[
    (3.00, 80.0),
    (3.50, 70.0),
    (4.00, 60.0),
    (4.50, 50.0),
    (5.00, 40.0),
]);
const BULLPEN_FLOOR: f64 = 30.0;
/// Relievers give up about half a run more than the staff average
const BULLPEN_ERA_PREMIUM: f64 = 0.5;

fn bonus_or_penalty(bonus: &Ladder, penalty: &Ladder, metric: f64) -> f64 {
    bonus.rung(metric).unwrap_or_else(|| penalty.award(metric))
}

/// 0–100 starter rating. Lower ERA/WHIP and higher win% and K/9 score higher.
pub fn quality_score(p: &PitcherStats) -> f64 {
    let mut score = LEAGUE_AVERAGE_QUALITY;
    score += bonus_or_penalty(&ERA_BONUS, &ERA_PENALTY, p.era);
    score += bonus_or_penalty(&WHIP_BONUS, &WHIP_PENALTY, p.whip);
    let decisions = p.wins + p.losses;
    if decisions > 0 {
        let win_pct = p.wins as f64 / decisions as f64;
        score += bonus_or_penalty(&WIN_PCT_BONUS, &WIN_PCT_PENALTY, win_pct);
    }
    score += bonus_or_penalty(&K9_BONUS, &K9_PENALTY, p.strikeouts_per_nine);
    score.clamp(0.0, 100.0)
}

pub fn lookup_quality(lookup: &PitcherLookup) -> f64 {
    match lookup {
        PitcherLookup::Known(p) => quality_score(p),
        PitcherLookup::Unknown(_) => LEAGUE_AVERAGE_QUALITY,
    }
}

pub fn starting_pitcher(m: &Matchup, ladder: &Ladder) -> Award {
    let Some(pair) = &m.pitchers else {
        return Award::none("probable pitchers not supplied");
    };
    let home_q = lookup_quality(&pair.home);
    let away_q = lookup_quality(&pair.away);
    let diff = home_q - away_q;
    let points = ladder.award(diff.abs());
    let (h, a) = if diff > 0.0 {
        (points, 0.0)
    } else if diff < 0.0 {
        (0.0, points)
    } else {
        (0.0, 0.0)
    };

    let mut rationale = format!(
        "{} {:.0} vs {} {:.0}",
        pair.home.name(),
        home_q,
        pair.away.name(),
        away_q
    );
    for lookup in [&pair.home, &pair.away] {
        if let PitcherLookup::Unknown(name) = lookup {
            rationale.push_str(&format!("; unknown pitcher {} scored as league average", name));
        }
    }
    Award::new(h, a, rationale)
}

pub fn bullpen_quality(t: &TeamStatistics) -> f64 {
    let era = t.defense.scoring_allowed + BULLPEN_ERA_PREMIUM;
    BULLPEN_QUALITY.rung(era).unwrap_or(BULLPEN_FLOOR)
}

pub fn bullpen(m: &Matchup, ladder: &Ladder) -> Award {
    let home_q = bullpen_quality(&m.home);
    let away_q = bullpen_quality(&m.away);
    let diff = home_q - away_q;
    let points = ladder.award(diff.abs());
    let (h, a) = if diff > 0.0 {
        (points, 0.0)
    } else if diff < 0.0 {
        (0.0, points)
    } else {
        (0.0, 0.0)
    };
    Award::new(h, a, format!("bullpen {:.0} vs {:.0}", home_q, away_q))
}
