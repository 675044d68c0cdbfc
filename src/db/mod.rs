use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

pub mod models;
use models::*;

/// Thread-safe SQLite connection pool (single connection with mutex)
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open (or create) the SQLite database at the given path
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
        Self::with_connection(conn)
    }

    /// Private database for tests and one-off runs
    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        let db = Database {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("Database connection mutex poisoned"))
    }

    /// Run schema migrations (idempotent)
    fn run_migrations(&self) -> Result<()> {
        self.conn()?.execute_batch(SCHEMA_SQL)?;
        Ok(())
    }

    // ── Injury snapshots ──────────────────────────────────────────────────────

    /// Replace the whole league snapshot for a sport in one transaction
    pub fn replace_injury_snapshot(
        &self,
        sport: Sport,
        reports: &HashMap<String, InjuryReport>,
        fetched_at: DateTime<Utc>,
    ) -> Result<usize> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM injury_reports WHERE sport=?1", params![sport.as_str()])?;
        let mut rows = 0;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO injury_reports (sport, team, player, position, status, detail)
                 VALUES (?1,?2,?3,?4,?5,?6)",
            )?;
            for report in reports.values() {
                for injury in &report.injuries {
                    stmt.execute(params![
                        sport.as_str(),
                        report.team,
                        injury.player,
                        injury.position,
                        injury.status,
                        injury.detail,
                    ])?;
                    rows += 1;
                }
            }
        }
        tx.execute(
            "INSERT INTO injury_snapshots (sport, fetched_at, team_count) VALUES (?1,?2,?3)
             ON CONFLICT(sport) DO UPDATE SET
                fetched_at=excluded.fetched_at,
                team_count=excluded.team_count",
            params![sport.as_str(), fetched_at, reports.len() as i64],
        )?;
        tx.commit()?;
        Ok(rows)
    }

    /// When the stored snapshot for a sport was fetched, if there is one
    pub fn injury_snapshot_time(&self, sport: Sport) -> Result<Option<DateTime<Utc>>> {
        let conn = self.conn()?;
        let at = conn
            .query_row(
                "SELECT fetched_at FROM injury_snapshots WHERE sport=?1",
                params![sport.as_str()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(at)
    }

    /// One team's report from the stored snapshot. Team match is case-insensitive.
    /// `None` when no snapshot has been stored for the sport yet.
    pub fn load_injury_report(&self, sport: Sport, team: &str) -> Result<Option<InjuryReport>> {
        let Some(fetched_at) = self.injury_snapshot_time(sport)? else {
            return Ok(None);
        };
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT player, position, status, detail
             FROM injury_reports
             WHERE sport=?1 AND team=?2 COLLATE NOCASE
             ORDER BY id",
        )?;
        let injuries = stmt
            .query_map(params![sport.as_str(), team.trim()], map_injury)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(Some(InjuryReport {
            team: team.trim().to_string(),
            injuries,
            fetched_at,
        }))
    }

    // ── Predictions ───────────────────────────────────────────────────────────

    /// Insert a prediction and return its row id
    pub fn record_prediction(&self, rec: &PredictionRecord) -> Result<i64> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO predictions (
                sport, season, home_team, away_team, neutral_site,
                home_points, away_points, winner, confidence, predicted_at
             ) VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10)",
            params![
                rec.sport,
                rec.season,
                rec.home_team,
                rec.away_team,
                rec.neutral_site,
                rec.home_points,
                rec.away_points,
                rec.winner,
                rec.confidence,
                rec.predicted_at,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Most recent predictions first
    pub fn list_predictions(&self, limit: i64) -> Result<Vec<PredictionRecord>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, sport, season, home_team, away_team, neutral_site,
                    home_points, away_points, winner, confidence, predicted_at
             FROM predictions ORDER BY predicted_at DESC, id DESC LIMIT ?1",
        )?;
        let rows = stmt
            .query_map(params![limit], map_prediction)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }
}

// ── SQL helpers ────────────────────────────────────────────────────────────────

fn map_injury(row: &rusqlite::Row) -> rusqlite::Result<Injury> {
    Ok(Injury {
        player: row.get(0)?,
        position: row.get(1)?,
        status: row.get(2)?,
        detail: row.get(3)?,
    })
}

fn map_prediction(row: &rusqlite::Row) -> rusqlite::Result<PredictionRecord> {
    Ok(PredictionRecord {
        id: row.get(0)?,
        sport: row.get(1)?,
        season: row.get(2)?,
        home_team: row.get(3)?,
        away_team: row.get(4)?,
        neutral_site: row.get(5)?,
        home_points: row.get(6)?,
        away_points: row.get(7)?,
        winner: row.get(8)?,
        confidence: row.get(9)?,
        predicted_at: row.get(10)?,
    })
}

/// SQLite schema (idempotent CREATE IF NOT EXISTS)
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS injury_snapshots (
    sport       TEXT    PRIMARY KEY,
    fetched_at  TEXT    NOT NULL,
    team_count  INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS injury_reports (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    sport       TEXT    NOT NULL,
    team        TEXT    NOT NULL,
    player      TEXT    NOT NULL,
    position    TEXT    NOT NULL,
    status      TEXT    NOT NULL,
    detail      TEXT    NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS predictions (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    sport        TEXT    NOT NULL,
    season       TEXT    NOT NULL,
    home_team    TEXT    NOT NULL,
    away_team    TEXT    NOT NULL,
    neutral_site INTEGER NOT NULL DEFAULT 0,
    home_points  REAL    NOT NULL,
    away_points  REAL    NOT NULL,
    winner       TEXT    NOT NULL,
    confidence   REAL    NOT NULL,
    predicted_at TEXT    NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_injury_reports_team ON injury_reports(sport, team);
CREATE INDEX IF NOT EXISTS idx_predictions_time ON predictions(predicted_at);
"#;
