use crate::db::models::Winner;

/// Confidence never goes above this, however lopsided the matchup.
pub const CONFIDENCE_CEILING: f64 = 95.0;

/// Totals closer than this are a dead heat.
pub const TIE_TOLERANCE: f64 = 1e-9;

/// Map the gap between totals to a 0–95 percent confidence.
///
/// `divisor` is the sport's points-per-100%: 6 for football, 5 for baseball.
pub fn confidence(home_points: f64, away_points: f64, divisor: f64) -> f64 {
    let gap = (home_points - away_points).abs();
    if gap < TIE_TOLERANCE || divisor <= 0.0 {
        return 0.0;
    }
    (gap / divisor * 100.0).min(CONFIDENCE_CEILING)
}

pub fn verdict(home_team: &str, away_team: &str, home_points: f64, away_points: f64) -> Winner {
    let gap = home_points - away_points;
    if gap.abs() < TIE_TOLERANCE {
        Winner::TooCloseToCall
    } else if gap > 0.0 {
        Winner::Team(home_team.to_string())
    } else {
        Winner::Team(away_team.to_string())
    }
}
