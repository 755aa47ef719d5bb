//! Aggregator: five fixed queries over `ncaa_finals`, exported as one JSON
//! document plus a flattened two-column CSV (`metric,data_json`).
//!
//! Every result set is a cache of query output; the store is opened
//! read-only and any query error aborts the whole run.

use std::fs;
use std::path::Path;

use anyhow::Result;
use rusqlite::Connection;
use serde::Serialize;

use crate::{db, table};

pub const JSON_PATH: &str = "analytics.json";
pub const CSV_PATH: &str = "analytics.csv";

// Champion names may carry a parenthesized appearance count, e.g.
// "Maryland (14)"; aggregation groups on the stripped name.
const CHAMPION_NAME: &str = "
    CASE
        WHEN instr(champion, '(') > 0
        THEN trim(substr(champion, 1, instr(champion, '(') - 1))
        ELSE trim(champion)
    END";

#[derive(Debug, Serialize)]
pub struct TitleRow {
    pub champion_name: Option<String>,
    pub titles: i64,
}

#[derive(Debug, Serialize)]
pub struct MarginRow {
    pub champion_name: Option<String>,
    pub titles: i64,
    pub avg_margin: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct TimelineRow {
    pub year: i32,
    pub champion_goals: Option<i32>,
    pub runnerup_goals: Option<i32>,
    pub goal_diff: Option<i32>,
    pub total_goals: Option<i32>,
    pub location: Option<String>,
    pub champion: Option<String>,
    pub runner_up: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GameRow {
    pub id: i64,
    pub year: i32,
    pub champion: Option<String>,
    pub runner_up: Option<String>,
    pub champion_goals: Option<i32>,
    pub runnerup_goals: Option<i32>,
    pub goal_diff: Option<i32>,
    pub total_goals: Option<i32>,
    pub location: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DecadeRow {
    pub decade: i32,
    pub avg_margin: Option<f64>,
}

/// Field order here is the serialization order of the JSON document.
#[derive(Debug, Serialize)]
pub struct AnalyticsDocument {
    pub titles_per_team: Vec<TitleRow>,
    pub avg_margin_per_champion: Vec<MarginRow>,
    pub margin_over_time: Vec<TimelineRow>,
    pub highest_scoring_games: Vec<GameRow>,
    pub decade_closeness: Vec<DecadeRow>,
}

pub fn run(db_path: &Path, json_path: &Path, csv_path: &Path) -> Result<()> {
    if !db_path.exists() {
        println!("Database not found: {}", db_path.display());
        return Ok(());
    }

    let conn = db::open_read_only(db_path)?;
    let doc = build_document(&conn)?;

    fs::write(json_path, serde_json::to_string_pretty(&doc)?)?;
    table::write_rows(csv_path, &flatten_to_csv_rows(&doc)?)?;

    println!("Wrote {}", csv_path.display());
    println!("Wrote {}", json_path.display());
    Ok(())
}

pub fn build_document(conn: &Connection) -> Result<AnalyticsDocument> {
    Ok(AnalyticsDocument {
        titles_per_team: titles_per_team(conn)?,
        avg_margin_per_champion: avg_margin_per_champion(conn)?,
        margin_over_time: margin_over_time(conn)?,
        highest_scoring_games: highest_scoring_games(conn)?,
        decade_closeness: decade_closeness(conn)?,
    })
}

/// One CSV row per metric: the metric name and its result set as a single
/// JSON value, not spread across columns.
fn flatten_to_csv_rows(doc: &AnalyticsDocument) -> Result<Vec<Vec<String>>> {
    fn entry<T: Serialize>(metric: &str, data: &T) -> Result<Vec<String>> {
        Ok(vec![metric.to_string(), serde_json::to_string(data)?])
    }

    Ok(vec![
        vec!["metric".to_string(), "data_json".to_string()],
        entry("titles_per_team", &doc.titles_per_team)?,
        entry("avg_margin_per_champion", &doc.avg_margin_per_champion)?,
        entry("margin_over_time", &doc.margin_over_time)?,
        entry("highest_scoring_games", &doc.highest_scoring_games)?,
        entry("decade_closeness", &doc.decade_closeness)?,
    ])
}

// ── Queries ──

fn titles_per_team(conn: &Connection) -> Result<Vec<TitleRow>> {
    let sql = format!(
        "SELECT {CHAMPION_NAME} AS champion_name, COUNT(*) AS titles
         FROM ncaa_finals
         GROUP BY champion_name
         ORDER BY titles DESC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([], |row| {
            Ok(TitleRow {
                champion_name: row.get(0)?,
                titles: row.get(1)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

fn avg_margin_per_champion(conn: &Connection) -> Result<Vec<MarginRow>> {
    // AVG skips NULL goal_diff rows within each group.
    let sql = format!(
        "SELECT {CHAMPION_NAME} AS champion_name, COUNT(*) AS titles,
                AVG(goal_diff) AS avg_margin
         FROM ncaa_finals
         GROUP BY champion_name
         ORDER BY avg_margin DESC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([], |row| {
            Ok(MarginRow {
                champion_name: row.get(0)?,
                titles: row.get(1)?,
                avg_margin: row.get(2)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

fn margin_over_time(conn: &Connection) -> Result<Vec<TimelineRow>> {
    let mut stmt = conn.prepare(
        "SELECT year, champion_goals, runnerup_goals, goal_diff, total_goals,
                location, champion, runner_up
         FROM ncaa_finals
         ORDER BY year",
    )?;
    let rows = stmt
        .query_map([], |row| {
            Ok(TimelineRow {
                year: row.get(0)?,
                champion_goals: row.get(1)?,
                runnerup_goals: row.get(2)?,
                goal_diff: row.get(3)?,
                total_goals: row.get(4)?,
                location: row.get(5)?,
                champion: row.get(6)?,
                runner_up: row.get(7)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

fn highest_scoring_games(conn: &Connection) -> Result<Vec<GameRow>> {
    // SQLite sorts NULL lowest, so unscored finals fall out of the top 10.
    let mut stmt = conn.prepare(
        "SELECT id, year, champion, runner_up, champion_goals, runnerup_goals,
                goal_diff, total_goals, location
         FROM ncaa_finals
         ORDER BY total_goals DESC
         LIMIT 10",
    )?;
    let rows = stmt
        .query_map([], |row| {
            Ok(GameRow {
                id: row.get(0)?,
                year: row.get(1)?,
                champion: row.get(2)?,
                runner_up: row.get(3)?,
                champion_goals: row.get(4)?,
                runnerup_goals: row.get(5)?,
                goal_diff: row.get(6)?,
                total_goals: row.get(7)?,
                location: row.get(8)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

fn decade_closeness(conn: &Connection) -> Result<Vec<DecadeRow>> {
    let mut stmt = conn.prepare(
        "SELECT (year / 10) * 10 AS decade, AVG(goal_diff) AS avg_margin
         FROM ncaa_finals
         GROUP BY decade
         ORDER BY decade",
    )?;
    let rows = stmt
        .query_map([], |row| {
            Ok(DecadeRow {
                decade: row.get(0)?,
                avg_margin: row.get(1)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}
