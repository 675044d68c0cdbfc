use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use std::collections::HashMap;
use tracing::debug;

use super::provider::InjuryFeed;
use crate::db::models::{Injury, InjuryReport, Sport};

pub const DEFAULT_BASE_URL: &str = "https://site.api.espn.com/apis/site/v2/sports";

/// Phrases in an injury comment that give away the player's position.
/// Checked in order, first match wins.
const FOOTBALL_HINTS: &[(&str, &[&str])] = &[
    ("QB", &["quarterback", " qb ", "passing", "threw for", "completed"]),
    ("RB", &["running back", " rb ", "carried", "rushing", "carries for"]),
    ("WR", &["receiver", " wr ", "caught", "receptions", "targets", "receiving"]),
    ("TE", &["tight end", " te "]),
    ("LB", &["linebacker", " lb ", "tackles"]),
    ("CB", &["cornerback", " cb ", "coverage", "pass defense"]),
    ("S", &["safety", " ss ", " fs "]),
    ("DE", &["defensive end", " de ", "edge rusher", "sacks"]),
    ("DT", &["defensive tackle", " dt "]),
    ("OL", &["offensive line", " ol ", "guard", "left tackle", "right tackle", "center"]),
];

const BASEBALL_HINTS: &[(&str, &[&str])] = &[
    ("SP", &["starting pitcher", " sp ", "starter", "pitched", "innings pitched", "earned runs"]),
    ("RP", &["relief", "reliever", "closer", "bullpen", "save opportunity"]),
    ("C", &["catcher", " c ", "behind the plate", "catching"]),
    ("1B", &["first base", " 1b "]),
    ("2B", &["second base", " 2b "]),
    ("3B", &["third base", " 3b "]),
    ("SS", &["shortstop", " ss "]),
    ("OF", &["outfield", "center field", "left field", "right field", " of ", " cf ", " lf ", " rf "]),
    ("DH", &["designated hitter", " dh "]),
];

/// League injury feed from ESPN's public site API. No key required.
pub struct EspnInjuries {
    http: Client,
    sport: Sport,
    /// Base URL for overriding in tests
    base_url: String,
}

impl EspnInjuries {
    pub fn new(sport: Sport, base_url: Option<&str>) -> Result<Self> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(EspnInjuries {
            http,
            sport,
            base_url: base_url
                .unwrap_or(DEFAULT_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
        })
    }

    fn league_path(sport: Sport) -> &'static str {
        match sport {
            Sport::Football => "football/nfl",
            Sport::Baseball => "baseball/mlb",
        }
    }

    pub fn url(&self) -> String {
        format!("{}/{}/injuries", self.base_url, Self::league_path(self.sport))
    }
}

#[async_trait]
impl InjuryFeed for EspnInjuries {
    fn name(&self) -> &str {
        "ESPN"
    }

    async fn fetch_league(&self) -> Result<HashMap<String, InjuryReport>> {
        let url = self.url();
        debug!("Fetching {} injuries from {}", self.sport, url);

        let resp = self.http.get(&url).send().await
            .context("ESPN injury request failed")?;

        if !resp.status().is_success() {
            anyhow::bail!("ESPN injury feed error: {}", resp.status());
        }

        let raw: serde_json::Value = resp.json().await
            .context("Failed to parse ESPN injury response")?;

        Ok(parse_injury_response(&raw, self.sport, Utc::now()))
    }
}

/// Teams without an `injuries` list are skipped; players without a name too.
pub fn parse_injury_response(
    raw: &serde_json::Value,
    sport: Sport,
    fetched_at: DateTime<Utc>,
) -> HashMap<String, InjuryReport> {
    let teams = match raw["injuries"].as_array() {
        Some(a) => a,
        None => return HashMap::new(),
    };

    teams
        .iter()
        .filter_map(|team| {
            let name = team["displayName"].as_str()?.to_string();
            let injuries = team["injuries"]
                .as_array()?
                .iter()
                .filter_map(|entry| {
                    let athlete = &entry["athlete"];
                    let player = athlete["displayName"].as_str()?.to_string();
                    let detail = entry["shortComment"]
                        .as_str()
                        .or_else(|| entry["longComment"].as_str())
                        .unwrap_or("")
                        .to_string();
                    let position = athlete["position"]["abbreviation"]
                        .as_str()
                        .map(str::to_uppercase)
                        .unwrap_or_else(|| infer_position(sport, &detail).to_string());
                    let status = entry["status"].as_str().unwrap_or("Unknown").to_string();
                    Some(Injury {
                        player,
                        position,
                        status,
                        detail,
                    })
                })
                .collect();
            Some((
                name.clone(),
                InjuryReport {
                    team: name,
                    injuries,
                    fetched_at,
                },
            ))
        })
        .collect()
}

/// Guess a position from the report text, "UNKNOWN" when nothing matches
pub fn infer_position(sport: Sport, comment: &str) -> &'static str {
    let hints = match sport {
        Sport::Football => FOOTBALL_HINTS,
        Sport::Baseball => BASEBALL_HINTS,
    };
    let text = format!(" {} ", comment.to_lowercase().replace([',', '.', '('], " "));
    hints
        .iter()
        .find(|(_, words)| words.iter().any(|w| text.contains(w)))
        .map(|(position, _)| *position)
        .unwrap_or("UNKNOWN")
}
