use std::path::Path;

use anyhow::Result;
use rusqlite::{Connection, OpenFlags};

pub const DB_PATH: &str = "ncaawlax.db";

pub fn open(path: &Path) -> Result<Connection> {
    Ok(Connection::open(path)?)
}

/// Open for the aggregator, which never writes.
pub fn open_read_only(path: &Path) -> Result<Connection> {
    Ok(Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_ONLY,
    )?)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS ncaa_finals (
            id             INTEGER PRIMARY KEY,
            year           INTEGER,
            champion       TEXT,
            runner_up      TEXT,
            champion_goals INTEGER,
            runnerup_goals INTEGER,
            goal_diff      INTEGER,
            total_goals    INTEGER,
            location       TEXT
        );
        ",
    )?;
    Ok(())
}

/// One normalized tournament-final result. Either both goal fields and both
/// derived fields are set, or none of the four are.
#[derive(Debug, Clone, PartialEq)]
pub struct FinalRecord {
    pub year: i32,
    pub champion: Option<String>,
    pub runner_up: Option<String>,
    pub champion_goals: Option<i32>,
    pub runnerup_goals: Option<i32>,
    pub goal_diff: Option<i32>,
    pub total_goals: Option<i32>,
    pub location: String,
}

/// Full-replace load: clear the table, then insert every record in source
/// order so each run fully supersedes prior contents.
pub fn replace_finals(conn: &Connection, records: &[FinalRecord]) -> Result<usize> {
    let tx = conn.unchecked_transaction()?;
    tx.execute("DELETE FROM ncaa_finals", [])?;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO ncaa_finals
             (year, champion, runner_up, champion_goals, runnerup_goals,
              goal_diff, total_goals, location)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )?;
        for r in records {
            stmt.execute(rusqlite::params![
                r.year,
                r.champion,
                r.runner_up,
                r.champion_goals,
                r.runnerup_goals,
                r.goal_diff,
                r.total_goals,
                r.location,
            ])?;
        }
    }
    tx.commit()?;
    Ok(records.len())
}

// ── Stats ──

pub struct StoreStats {
    pub finals: usize,
    pub with_scores: usize,
    pub champions: usize,
    pub first_year: Option<i32>,
    pub last_year: Option<i32>,
}

pub fn get_stats(conn: &Connection) -> Result<StoreStats> {
    let finals: usize = conn.query_row("SELECT COUNT(*) FROM ncaa_finals", [], |r| r.get(0))?;
    let with_scores: usize = conn.query_row(
        "SELECT COUNT(total_goals) FROM ncaa_finals",
        [],
        |r| r.get(0),
    )?;
    let champions: usize = conn.query_row(
        "SELECT COUNT(DISTINCT champion) FROM ncaa_finals",
        [],
        |r| r.get(0),
    )?;
    let (first_year, last_year) = conn.query_row(
        "SELECT MIN(year), MAX(year) FROM ncaa_finals",
        [],
        |r| Ok((r.get(0)?, r.get(1)?)),
    )?;
    Ok(StoreStats {
        finals,
        with_scores,
        champions,
        first_year,
        last_year,
    })
}
