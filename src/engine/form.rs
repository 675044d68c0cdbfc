//! Record-based factors: form, schedule, luck.

use super::{Award, Ladder, Matchup, SportProfile};
use crate::db::models::{LossProfile, TeamStatistics};

/// Hot teams earn `hot`; a slumping team hands `slump` to its opponent.
pub fn recent_form(m: &Matchup, hot: &Ladder, slump: &Ladder) -> Award {
    let (mut h, mut a) = (0.0, 0.0);
    for (team, is_home) in [(&m.home, true), (&m.away, false)] {
        if team.record.recent_games == 0 {
            continue;
        }
        let rate = team.record.recent_win_rate();
        let (own, other) = if is_home { (&mut h, &mut a) } else { (&mut a, &mut h) };
        match hot.rung(rate) {
            Some(points) => *own += points,
            None => *other += slump.award(rate),
        }
    }
    Award::new(
        h,
        a,
        format!(
            "recent {}-{} vs {}-{}",
            m.home.record.recent_wins,
            m.home.record.recent_games - m.home.record.recent_wins,
            m.away.record.recent_wins,
            m.away.record.recent_games - m.away.record.recent_wins
        ),
    )
}

pub fn win_rate(m: &Matchup, weight: f64) -> Award {
    let (home, away) = (m.home.win_rate(), m.away.win_rate());
    Award::new(
        home * weight,
        away * weight,
        format!("win rate {:.3} vs {:.3}", home, away),
    )
}

/// Penalty for a losing record; a winless team takes `winless`
pub fn poor_record(m: &Matchup, winless: f64, ladder: &Ladder) -> Award {
    let penalty = |t: &TeamStatistics| {
        if t.record.wins == 0 {
            winless
        } else {
            ladder.award(t.win_rate())
        }
    };
    Award::new(
        penalty(&m.home),
        penalty(&m.away),
        format!(
            "{}-{} vs {}-{}",
            m.home.record.wins, m.home.record.losses, m.away.record.wins, m.away.record.losses
        ),
    )
}

/// Win rate in one-score games, once a team has played `min_games` of them
pub fn close_games(m: &Matchup, min_games: u32, ladder: &Ladder) -> Award {
    let score = |t: &TeamStatistics| {
        if t.record.close_games >= min_games {
            ladder.award(t.record.close_win_rate())
        } else {
            0.0
        }
    };
    Award::new(
        score(&m.home),
        score(&m.away),
        format!(
            "close games {}/{} vs {}/{}",
            m.home.record.close_wins,
            m.home.record.close_games,
            m.away.record.close_wins,
            m.away.record.close_games
        ),
    )
}

/// Tougher schedule pays, but only for a team at or above .500
pub fn schedule_strength(m: &Matchup, ladder: &Ladder) -> Award {
    let (home_q, away_q) = (m.home.schedule.opponent_quality, m.away.schedule.opponent_quality);
    let diff = home_q - away_q;
    let rationale = format!("opponent quality {:.3} vs {:.3}", home_q, away_q);
    if diff > 0.0 && m.home.win_rate() >= 0.5 {
        Award::new(ladder.award(diff), 0.0, rationale)
    } else if diff < 0.0 && m.away.win_rate() >= 0.5 {
        Award::new(0.0, ladder.award(-diff), rationale)
    } else {
        Award::none(rationale)
    }
}

/// How the quality of defenses faced colours a team's scoring
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DefenseSchedule {
    /// Mean opponent defense rank below this is an elite schedule
    pub elite_rank: f64,
    /// Points per game an offense must exceed against an elite schedule
    pub elite_scoring: f64,
    pub elite_bonus: f64,
    /// Mean opponent defense rank above this is a soft schedule
    pub soft_rank: f64,
    pub padding_penalty: f64,
}

/// Scoring well against mostly top-tier defenses
pub fn is_elite_scoring(t: &TeamStatistics, rules: &DefenseSchedule) -> bool {
    t.schedule.opponent_defense_rank < rules.elite_rank && t.offense.scoring > rules.elite_scoring
}

/// Scoring above the league rate while facing mostly bottom-tier defenses
pub fn is_stat_padding(t: &TeamStatistics, rank_threshold: f64) -> bool {
    t.schedule.opponent_defense_rank > rank_threshold
        && t.offense.scoring > t.schedule.league_scoring_rate
}

/// Bonus for scoring through elite defenses, otherwise a penalty for
/// padding stats against soft ones
pub fn stat_padding(m: &Matchup, rules: &DefenseSchedule) -> Award {
    let mut notes = Vec::new();
    let mut adjust = |t: &TeamStatistics| {
        if is_elite_scoring(t, rules) {
            notes.push(format!(
                "{} scoring {:.1} vs elite defenses (rank {:.2})",
                t.team, t.offense.scoring, t.schedule.opponent_defense_rank
            ));
            rules.elite_bonus
        } else if is_stat_padding(t, rules.soft_rank) {
            notes.push(format!(
                "{} scoring inflated by weak defenses (rank {:.2})",
                t.team, t.schedule.opponent_defense_rank
            ));
            rules.padding_penalty
        } else {
            0.0
        }
    };
    let h = adjust(&m.home);
    let a = adjust(&m.away);
    let rationale = if notes.is_empty() {
        "no schedule distortion".to_string()
    } else {
        notes.join("; ")
    };
    Award::new(h, a, rationale)
}

/// Each defense's history against offenses shaped like tonight's opponent.
/// Allowing `margin` fewer points than usual pays the defense; allowing
/// `margin` more pays the opposing offense.
pub fn similar_matchups(m: &Matchup, min_games: u32, margin: f64, bonus: f64) -> Award {
    let mut notes = Vec::new();
    let (mut h, mut a) = (0.0, 0.0);
    for (defense, offense, is_home) in [(&m.home, &m.away, true), (&m.away, &m.home, false)] {
        let split = defense.defense_by_style.get(offense.style);
        let Some(allowed) = split.points_allowed_per_game() else {
            continue;
        };
        if split.games < min_games {
            continue;
        }
        let usual = defense.defense.scoring_allowed;
        let (own, other) = if is_home { (&mut h, &mut a) } else { (&mut a, &mut h) };
        if allowed < usual - margin {
            *own += bonus;
        } else if allowed > usual + margin {
            *other += bonus;
        } else {
            continue;
        }
        notes.push(format!(
            "{} allowed {:.1} vs {} offenses ({} games, usually {:.1})",
            defense.team, allowed, offense.style, split.games, usual
        ));
    }
    let rationale = if notes.is_empty() {
        "no style-specific defensive edge".to_string()
    } else {
        notes.join("; ")
    };
    Award::new(h, a, rationale)
}

// ── Pythagorean / bounce-back ─────────────────────────────────────────────────

/// Signals that a team's recent losses overstate how it played
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BounceBackRules {
    pub min_recent_losses: u32,
    /// (last-game turnover margin at or below, points)
    pub turnover_collapse: (f64, f64),
    /// (two-game turnover margin at or below, points)
    pub two_game_collapse: (f64, f64),
    /// (recent conversion rate at or below, points); zero means no data
    pub conversion_slump: (f64, f64),
    pub outgained: f64,
    pub more_efficient: f64,
    pub blowout: f64,
    pub qualifying: f64,
    pub cap: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PythagoreanRules {
    /// Win rate above expectation by more than this is luck
    pub overperformance: f64,
    pub lucky_penalty: f64,
    /// (shortfall greater than, bonus) for unlucky teams
    pub underperformance: Option<(f64, f64)>,
    pub bounce_back: Option<BounceBackRules>,
}

/// Bounce-back points for a team, 0.0 unless the signal qualifies
pub fn bounce_back_score(t: &TeamStatistics, rules: &BounceBackRules) -> f64 {
    let s = &t.signals;
    if s.recent_losses < rules.min_recent_losses {
        return 0.0;
    }
    let mut score = 0.0;
    if s.last_game_lost && s.last_game_turnover_margin <= rules.turnover_collapse.0 {
        score += rules.turnover_collapse.1;
    }
    if s.last_two_turnover_margin <= rules.two_game_collapse.0 {
        score += rules.two_game_collapse.1;
    }
    if s.recent_conversion_rate > 0.0 && s.recent_conversion_rate <= rules.conversion_slump.0 {
        score += rules.conversion_slump.1;
    }
    score += match s.loss_profile {
        LossProfile::Outgained => rules.outgained,
        LossProfile::MoreEfficient => rules.more_efficient,
        LossProfile::None => 0.0,
    };
    if s.blowout_loss {
        score += rules.blowout;
    }
    if score >= rules.qualifying {
        score.min(rules.cap)
    } else {
        0.0
    }
}

pub fn pythagorean(m: &Matchup, p: &SportProfile, rules: &PythagoreanRules) -> Award {
    let mut notes = Vec::new();
    let mut adjust = |t: &TeamStatistics| {
        let expected = t.pythagorean(p.pythagorean_exponent);
        let luck = t.win_rate() - expected;
        let mut points = 0.0;
        if luck > rules.overperformance {
            points += rules.lucky_penalty;
            notes.push(format!("{} winning {:+.3} above expectation", t.team, luck));
        }
        if let Some((shortfall, bonus)) = rules.underperformance {
            if -luck > shortfall {
                points += bonus;
                notes.push(format!("{} due for regression upward ({:+.3})", t.team, luck));
            }
        }
        if let Some(bb) = &rules.bounce_back {
            let bounce = bounce_back_score(t, bb);
            if bounce > 0.0 {
                points += bounce;
                notes.push(format!("{} bounce-back {:+.1}", t.team, bounce));
            }
        }
        points
    };
    let h = adjust(&m.home);
    let a = adjust(&m.away);
    let rationale = if notes.is_empty() {
        "records match expectation".to_string()
    } else {
        notes.join("; ")
    };
    Award::new(h, a, rationale)
}
