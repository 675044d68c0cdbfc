//! Where the game is played: home field, road form, ballpark, weather.

use super::{Award, Ladder, Matchup, WeatherReading};
use crate::db::models::{ParkFactor, RoofType, WeatherSnapshot, WindDirection};

/// Home/away share of a hitter-friendly stadium effect at a normal venue
const HOME_SHARE: f64 = 0.6;
const AWAY_SHARE: f64 = 0.4;
/// Share of a pitcher-friendly effect credited to the home staff
const HOME_PITCHING_SHARE: f64 = 0.3;

/// Hitter-friendly conditions lift both lineups, home a little more.
/// Pitcher-friendly conditions only pay the home staff; at a neutral site
/// nobody owns the mound, so they pay nothing.
fn stadium_split(impact: f64, neutral_site: bool) -> (f64, f64) {
    if impact > 0.0 {
        if neutral_site {
            (impact * 0.5, impact * 0.5)
        } else {
            (impact * HOME_SHARE, impact * AWAY_SHARE)
        }
    } else if impact < 0.0 && !neutral_site {
        (impact.abs() * HOME_PITCHING_SHARE, 0.0)
    } else {
        (0.0, 0.0)
    }
}

// ── Home field ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HomeFieldRules {
    /// Award for a team with no home wins at all; `None` skips the check
    pub winless_at_home: Option<f64>,
    /// On home win% minus away win%
    pub ladder: Ladder,
    /// (advantage below, award) for teams that play worse at home
    pub worse_at_home: Option<(f64, f64)>,
    pub baseline: f64,
}

pub fn home_field(m: &Matchup, rules: &HomeFieldRules) -> Award {
    if m.neutral_site {
        return Award::none("neutral site");
    }
    let record = &m.home.record;
    if let Some(points) = rules.winless_at_home {
        if record.home_games > 0 && record.home_wins == 0 {
            return Award::new(points, 0.0, format!("{} winless at home", m.home.team));
        }
    }
    let advantage = record.home_win_rate() - record.away_win_rate();
    let points = match rules.ladder.rung(advantage) {
        Some(points) => points,
        None => match rules.worse_at_home {
            Some((below, points)) if advantage < below => points,
            _ => rules.baseline,
        },
    };
    Award::new(
        points,
        0.0,
        format!(
            "{} home {:.3} vs away {:.3}",
            m.home.team,
            record.home_win_rate(),
            record.away_win_rate()
        ),
    )
}

/// Strong road teams travel well; weak ones hand the home side a little more
pub fn road_matchup(m: &Matchup) -> Award {
    if m.neutral_site {
        return Award::none("neutral site");
    }
    let road = m.away.record.away_win_rate();
    let home = m.home.record.home_win_rate();
    let rationale = format!("{} road {:.3} vs {} home {:.3}", m.away.team, road, m.home.team, home);
    if road >= 0.70 {
        let points = if road > home { 1.5 } else { 1.0 };
        Award::new(0.0, points, rationale)
    } else if road < 0.30 {
        Award::new(0.5, 0.0, rationale)
    } else {
        Award::none(rationale)
    }
}

// ── Ballpark ──────────────────────────────────────────────────────────────────

/// Points per unit of run factor away from neutral (115 → +5.0)
pub const PARK_POINTS_PER_FACTOR: f64 = 1.0 / 3.0;
pub const PARK_CAP: f64 = 5.0;

pub fn park_impact(park: &ParkFactor) -> f64 {
    ((park.run_factor - 100.0) * PARK_POINTS_PER_FACTOR).clamp(-PARK_CAP, PARK_CAP)
}

pub fn park(m: &Matchup) -> Award {
    let Some(park) = &m.park else {
        return Award::none("park data unavailable");
    };
    let impact = park_impact(park);
    let (home, away) = stadium_split(impact, m.neutral_site);
    Award::new(
        home,
        away,
        format!(
            "{} run factor {:.0} ({:+.2})",
            park.stadium, park.run_factor, impact
        ),
    )
}

// ── Weather ───────────────────────────────────────────────────────────────────

const HEAT: Ladder = Ladder::at_least(&[(85.0, 1.5), (75.0, 0.5)]);
const COLD: Ladder = Ladder::at_most(&[(50.0, -1.0)]);
const WIND: Ladder = Ladder::at_least(&[(20.0, 2.0), (12.0, 1.0)]);
const HUMIDITY: Ladder = Ladder::at_least(&[(70.0, 0.5)]);
const PRECIPITATION: f64 = -1.0;

/// Run environment from conditions: positive favours hitters
pub fn weather_impact(w: &WeatherSnapshot) -> f64 {
    let temperature = match HEAT.rung(w.temperature_f) {
        Some(points) => points,
        None => COLD.award(w.temperature_f),
    };
    let wind = WIND.award(w.wind_speed_mph)
        * match w.wind_direction {
            WindDirection::Out => 1.0,
            WindDirection::In => -1.0,
            WindDirection::Cross => 0.0,
        };
    let rain = if w.precipitation { PRECIPITATION } else { 0.0 };
    temperature + wind + HUMIDITY.award(w.humidity_pct) + rain
}

pub fn weather(m: &Matchup) -> Award {
    if matches!(m.park.as_ref().map(|p| p.roof), Some(RoofType::Dome)) {
        return Award::none("dome, weather not a factor");
    }
    match &m.weather {
        WeatherReading::NotRequested => Award::none("weather not requested"),
        WeatherReading::Unavailable(reason) => {
            Award::none(format!("weather unavailable: {}", reason))
        }
        WeatherReading::Observed(w) => {
            let impact = weather_impact(w);
            let (home, away) = stadium_split(impact, m.neutral_site);
            Award::new(
                home,
                away,
                format!(
                    "{:.0}°F, wind {:.0} mph {:?}, humidity {:.0}%{} ({:+.2})",
                    w.temperature_f,
                    w.wind_speed_mph,
                    w.wind_direction,
                    w.humidity_pct,
                    if w.precipitation { ", rain" } else { "" },
                    impact
                ),
            )
        }
    }
}
