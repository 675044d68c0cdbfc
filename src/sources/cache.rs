use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex;
use tracing::{info, warn};

use super::provider::{InjuryFeed, InjurySource};
use crate::db::models::{InjuryReport, Sport};
use crate::db::Database;

/// League injury feed with a SQLite snapshot in front of it.
///
/// A snapshot younger than `max_age` is served as is. Older snapshots are
/// refreshed from the feed; when the refresh fails the stale snapshot is
/// served with a warning.
pub struct CachedInjuries<F: InjuryFeed> {
    feed: F,
    db: Database,
    sport: Sport,
    max_age: Duration,
    /// Serializes refreshes so a batch triggers one feed request
    refresh_lock: Mutex<()>,
}

impl<F: InjuryFeed> CachedInjuries<F> {
    pub fn new(feed: F, db: Database, sport: Sport, max_age: Duration) -> Self {
        CachedInjuries {
            feed,
            db,
            sport,
            max_age,
            refresh_lock: Mutex::new(()),
        }
    }

    fn is_fresh(&self, fetched_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
        fetched_at.is_some_and(|at| now - at < self.max_age)
    }

    /// Fetch the whole league and replace the stored snapshot
    pub async fn refresh(&self) -> Result<usize> {
        let reports = self.feed.fetch_league().await?;
        let fetched_at = Utc::now();
        let rows = self.db.replace_injury_snapshot(self.sport, &reports, fetched_at)?;
        info!(
            "Stored {} {} injuries for {} teams from {}",
            rows,
            self.sport,
            reports.len(),
            self.feed.name()
        );
        Ok(rows)
    }

    async fn ensure_fresh(&self) -> Result<()> {
        let _guard = self.refresh_lock.lock().await;
        let stored = self.db.injury_snapshot_time(self.sport)?;
        if self.is_fresh(stored, Utc::now()) {
            return Ok(());
        }
        match self.refresh().await {
            Ok(_) => Ok(()),
            Err(e) if stored.is_some() => {
                warn!(
                    "{} injury refresh failed, serving snapshot from {}: {:#}",
                    self.feed.name(),
                    stored.map(|at| at.to_rfc3339()).unwrap_or_default(),
                    e
                );
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}

#[async_trait]
impl<F: InjuryFeed> InjurySource for CachedInjuries<F> {
    fn name(&self) -> &str {
        self.feed.name()
    }

    async fn injury_report(&self, team: &str) -> Result<InjuryReport> {
        self.ensure_fresh().await?;
        let report = self.db.load_injury_report(self.sport, team)?;
        Ok(report.unwrap_or_else(|| InjuryReport::empty(team, Utc::now())))
    }
}
