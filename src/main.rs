use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tracing::{error, info, warn};

use matchup_predictor::config::{Command, Config};
use matchup_predictor::db::models::{PredictionRecord, PredictionResult, Sport};
use matchup_predictor::db::Database;
use matchup_predictor::predictor::{BatchOutcome, MatchupRequest, PitcherNames, Predictor};
use matchup_predictor::sources::{
    CachedInjuries, EspnInjuries, JsonGameLogSource, JsonPitcherSource, ParkFactorTable,
    StatsSource, WttrWeather,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialise tracing / logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::parse();
    config.validate()?;

    match &config.command {
        Command::Parks => {
            print_parks(&ParkFactorTable::builtin());
            Ok(())
        }
        Command::Teams => {
            let source = JsonGameLogSource::new(&config.data_dir, config.profile());
            let season = config.season_key();
            let names = source.team_names(&season).await?;
            println!("{} {} teams ({}):", names.len(), config.sport, season);
            for name in names {
                println!("  {}", name);
            }
            Ok(())
        }
        Command::History { limit } => {
            let db = Database::open(&config.database_path)?;
            print_history(&db, *limit)
        }
        Command::RefreshInjuries => {
            let db = Database::open(&config.database_path)?;
            let cache = injury_cache(&config, db)?;
            let rows = cache.refresh().await?;
            info!("Injury snapshot refreshed: {} players listed", rows);
            Ok(())
        }
        Command::Predict {
            home,
            away,
            neutral,
            home_pitcher,
            away_pitcher,
            venue,
            json,
        } => {
            let db = Database::open(&config.database_path)?;
            let predictor = build_predictor(&config, &db)?;
            let mut req = MatchupRequest::new(home.as_str(), away.as_str());
            req.neutral_site = *neutral;
            req.venue = venue.clone();
            req.pitchers = match (home_pitcher, away_pitcher) {
                (Some(h), Some(a)) => Some(PitcherNames {
                    home: h.clone(),
                    away: a.clone(),
                }),
                (None, None) => None,
                _ => anyhow::bail!("--home-pitcher and --away-pitcher go together"),
            };

            let result = predictor.predict_matchup(&req).await?;
            record(&db, &predictor, &result);
            if *json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print_prediction(&result);
            }
            Ok(())
        }
        Command::Batch { file, json } => {
            let raw = tokio::fs::read_to_string(file)
                .await
                .with_context(|| format!("Failed to read batch file {}", file.display()))?;
            let requests: Vec<MatchupRequest> = serde_json::from_str(&raw)
                .with_context(|| format!("Failed to parse batch file {}", file.display()))?;
            info!("Predicting {} games from {}", requests.len(), file.display());

            let db = Database::open(&config.database_path)?;
            let predictor = build_predictor(&config, &db)?;
            let outcome = predictor.predict_batch(&requests).await;
            for result in &outcome.predictions {
                record(&db, &predictor, result);
            }
            if *json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                print_batch(&outcome);
            }
            Ok(())
        }
    }
}

fn injury_cache(config: &Config, db: Database) -> Result<CachedInjuries<EspnInjuries>> {
    let feed = EspnInjuries::new(config.sport, Some(config.injury_api_url.as_str()))?;
    Ok(CachedInjuries::new(feed, db, config.sport, config.injury_max_age()))
}

fn build_predictor(config: &Config, db: &Database) -> Result<Predictor> {
    let stats = Arc::new(JsonGameLogSource::new(&config.data_dir, config.profile()));
    let mut predictor = Predictor::new(config.profile(), config.season_key(), stats)
        .with_lookup_timeout(config.lookup_timeout());

    if config.no_injuries {
        info!("Injury factor disabled");
    } else {
        predictor = predictor.with_injuries(Arc::new(injury_cache(config, db.clone())?));
    }

    if config.sport == Sport::Baseball {
        let pitchers = config.pitchers_path();
        if pitchers.exists() {
            predictor = predictor.with_pitchers(Arc::new(JsonPitcherSource::new(&pitchers)));
        } else {
            warn!(
                "Pitcher file {} not found; starters will score as league average",
                pitchers.display()
            );
        }
        if !config.no_weather {
            let weather = WttrWeather::new(Some(config.weather_api_url.as_str()))?;
            predictor = predictor.with_weather(Arc::new(weather));
        }
    }

    Ok(predictor)
}

fn record(db: &Database, predictor: &Predictor, result: &PredictionResult) {
    let rec = PredictionRecord::from_result(result, predictor.season());
    if let Err(e) = db.record_prediction(&rec) {
        error!("Failed to record prediction: {:#}", e);
    }
}

// ── Output ────────────────────────────────────────────────────────────────────

fn print_prediction(result: &PredictionResult) {
    let sep = if result.neutral_site { "vs" } else { "@" };
    println!("{} {} {} ({})", result.away_team, sep, result.home_team, result.sport);
    println!();
    println!("  {:<20} {:>8} {:>8}  {}", "factor", "home", "away", "why");
    for f in &result.factors {
        if f.is_neutral() {
            continue;
        }
        println!(
            "  {:<20} {:>+8.2} {:>+8.2}  {}",
            f.factor, f.home_delta, f.away_delta, f.rationale
        );
    }
    println!();
    println!(
        "  {:<20} {:>8.2} {:>8.2}",
        "total", result.home_points, result.away_points
    );
    println!();
    println!("Pick: {} ({:.0}% confidence)", result.winner, result.confidence);
}

fn print_batch(outcome: &BatchOutcome) {
    for result in &outcome.predictions {
        let sep = if result.neutral_site { "vs" } else { "@" };
        println!(
            "{:<45} {:>6.2} - {:<6.2} {} ({:.0}%)",
            format!("{} {} {}", result.away_team, sep, result.home_team),
            result.away_points,
            result.home_points,
            result.winner,
            result.confidence
        );
    }
    for failed in &outcome.failed {
        println!("{:<45} FAILED: {}", failed.matchup, failed.error);
    }
}

fn print_parks(parks: &ParkFactorTable) {
    println!(
        "{:<24} {:<30} {:>5} {:>5} {:>6}  {}",
        "team", "stadium", "runs", "hr", "alt", "roof"
    );
    for p in parks.iter() {
        println!(
            "{:<24} {:<30} {:>5.0} {:>5.0} {:>6}  {:?}",
            p.team, p.stadium, p.run_factor, p.hr_factor, p.altitude_ft, p.roof
        );
    }
}

fn print_history(db: &Database, limit: i64) -> Result<()> {
    let rows = db.list_predictions(limit)?;
    if rows.is_empty() {
        println!("No predictions recorded yet");
        return Ok(());
    }
    for r in rows {
        println!(
            "{}  {:<8} {:<20} {} @ {}: {} ({:.0}%, {:.1}-{:.1})",
            r.predicted_at.format("%Y-%m-%d %H:%M"),
            r.sport,
            r.season,
            r.away_team,
            r.home_team,
            r.winner,
            r.confidence,
            r.away_points,
            r.home_points
        );
    }
    Ok(())
}
