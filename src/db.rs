use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use rusqlite::Connection;

use crate::error::SinkError;
use crate::view::promote::{ApplicationSink, NewApplication, Status};
use crate::view::tracked::TrackedItem;

pub fn connect(path: impl AsRef<Path>) -> Result<Connection> {
    let path = path.as_ref();
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
    }
    let conn = Connection::open(path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS applications (
            id           INTEGER PRIMARY KEY,
            company      TEXT NOT NULL,
            position     TEXT NOT NULL,
            link         TEXT,
            status       TEXT NOT NULL DEFAULT 'applied'
                         CHECK(status IN ('applied','interviewing','offered','rejected')),
            date_applied TEXT NOT NULL,
            created_at   TEXT NOT NULL DEFAULT (datetime('now'))
        );
        CREATE INDEX IF NOT EXISTS idx_applications_identity
            ON applications(lower(trim(company)), lower(trim(position)));
        ",
    )?;
    Ok(())
}

pub struct ApplicationRow {
    pub id: i64,
    pub company: String,
    pub position: String,
    pub link: Option<String>,
    pub status: Status,
    pub date_applied: NaiveDate,
}

pub fn insert_application(conn: &Connection, app: &NewApplication) -> Result<i64> {
    conn.execute(
        "INSERT INTO applications (company, position, link, status, date_applied)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        rusqlite::params![
            app.company,
            app.position,
            app.link,
            app.status.as_str(),
            app.date_applied.format("%Y-%m-%d").to_string(),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Newest first, matching the tracker's default ordering.
pub fn fetch_applications(conn: &Connection) -> Result<Vec<ApplicationRow>> {
    let mut stmt = conn.prepare(
        "SELECT id, company, position, link, status, date_applied
         FROM applications
         ORDER BY date_applied DESC, id DESC",
    )?;
    let rows = stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, Option<String>>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, String>(5)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    rows.into_iter()
        .map(|(id, company, position, link, status, date)| -> Result<ApplicationRow> {
            Ok(ApplicationRow {
                id,
                company,
                position,
                link,
                status: Status::parse(&status).unwrap_or_default(),
                date_applied: NaiveDate::parse_from_str(&date, "%Y-%m-%d")
                    .with_context(|| format!("Bad date_applied on application {}", id))?,
            })
        })
        .collect()
}

pub fn fetch_tracked(conn: &Connection) -> Result<Vec<TrackedItem>> {
    let mut stmt = conn.prepare("SELECT company, position FROM applications")?;
    let rows = stmt
        .query_map([], |row| Ok(TrackedItem::new(row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// SQLite-backed tracker used as the promotion target.
pub struct SqliteTracker {
    conn: Connection,
}

impl SqliteTracker {
    pub fn new(conn: Connection) -> Result<Self> {
        init_schema(&conn)?;
        Ok(Self { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

#[async_trait(?Send)]
impl ApplicationSink for SqliteTracker {
    async fn add_application(&self, app: NewApplication) -> Result<TrackedItem, SinkError> {
        insert_application(&self.conn, &app)?;
        Ok(TrackedItem::new(app.company, app.position))
    }
}
