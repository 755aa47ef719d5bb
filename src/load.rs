//! Loader: parse `table.csv` into `ncaa_finals`, full-replace.
//!
//! Rows are gated on a leading 4-digit year in column 0; that one rule drops
//! header rows and malformed rows alike, with no special-cased header
//! detection. Unparseable scores and empty team names become NULLs, not
//! errors.

use std::path::Path;
use std::sync::OnceLock;

use anyhow::Result;
use regex::Regex;
use tracing::info;

use crate::db::{self, FinalRecord};
use crate::table;

pub fn run(csv_path: &Path, db_path: &Path) -> Result<()> {
    if !csv_path.exists() {
        println!("CSV not found: {}", csv_path.display());
        return Ok(());
    }

    let rows = table::read_rows(csv_path)?;
    let records: Vec<FinalRecord> = rows.iter().filter_map(|r| parse_row(r)).collect();
    info!(
        "Parsed {} records from {} source rows",
        records.len(),
        rows.len()
    );

    let conn = db::open(db_path)?;
    db::init_schema(&conn)?;
    let written = db::replace_finals(&conn, &records)?;
    println!("Wrote {} rows to {}", written, db_path.display());
    Ok(())
}

/// Build one record from a raw row, or None if the row fails the year gate.
pub fn parse_row(cells: &[String]) -> Option<FinalRecord> {
    let year = extract_year(cells.first()?)?;

    let site = cells.get(1).map(String::as_str).unwrap_or("");
    let stadium = cells.get(2).map(String::as_str).unwrap_or("");
    let champion = cells.get(3).and_then(|s| clean_team(s));
    let (champion_goals, runnerup_goals) = cells
        .get(4)
        .map(|s| parse_score(s))
        .unwrap_or((None, None));
    let runner_up = cells.get(5).and_then(|s| clean_team(s));

    let location = if stadium.is_empty() {
        site.to_string()
    } else {
        format!("{} | {}", site, stadium)
    };

    let (goal_diff, total_goals) = match (champion_goals, runnerup_goals) {
        (Some(c), Some(r)) => (Some(c - r), Some(c + r)),
        _ => (None, None),
    };

    Some(FinalRecord {
        year,
        champion,
        runner_up,
        champion_goals,
        runnerup_goals,
        goal_diff,
        total_goals,
        location,
    })
}

/// A year cell is a leading 4-digit run not glued to further word characters
/// or a hyphen, so "2019" and "2020[a]" qualify while "2020-ish header junk"
/// does not.
fn extract_year(cell: &str) -> Option<i32> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"^\s*(\d{4})(?:$|[^\w-])").unwrap());
    re.captures(cell)?.get(1)?.as_str().parse().ok()
}

/// Parse "12-8" style scores; the separator may be an ASCII hyphen, en-dash,
/// or em-dash, and trailing text like "(OT)" is allowed. Anything else, e.g.
/// "Canceled" or an empty cell, yields (None, None).
pub fn parse_score(cell: &str) -> (Option<i32>, Option<i32>) {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"(\d+)\s*[–—-]\s*(\d+)").unwrap());

    match re.captures(cell) {
        Some(caps) => {
            let a = caps.get(1).and_then(|m| m.as_str().parse().ok());
            let b = caps.get(2).and_then(|m| m.as_str().parse().ok());
            match (a, b) {
                (Some(a), Some(b)) => (Some(a), Some(b)),
                _ => (None, None),
            }
        }
        None => (None, None),
    }
}

fn clean_team(cell: &str) -> Option<String> {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn score_separator_variants() {
        assert_eq!(parse_score("12-8"), (Some(12), Some(8)));
        assert_eq!(parse_score("12–8"), (Some(12), Some(8)));
        assert_eq!(parse_score("12—8"), (Some(12), Some(8)));
        assert_eq!(parse_score("13 – 12 (OT)"), (Some(13), Some(12)));
    }

    #[test]
    fn score_unparseable_is_none() {
        assert_eq!(parse_score("Canceled"), (None, None));
        assert_eq!(parse_score(""), (None, None));
    }

    #[test]
    fn year_gate_filters_headers_and_junk() {
        assert_eq!(extract_year("2019"), Some(2019));
        assert_eq!(extract_year("  2019 "), Some(2019));
        assert_eq!(extract_year("2020[a]"), Some(2020));
        assert_eq!(extract_year("Year"), None);
        assert_eq!(extract_year("Canceled 2020"), None);
        assert_eq!(extract_year("2020-ish header junk"), None);
        assert_eq!(extract_year("812"), None);
    }

    #[test]
    fn full_row_parses() {
        let r = parse_row(&row(&[
            "2019",
            "Baltimore",
            "Homewood Field",
            "Maryland (14)",
            "12–10",
            "Boston College",
        ]))
        .unwrap();
        assert_eq!(r.year, 2019);
        assert_eq!(r.champion.as_deref(), Some("Maryland (14)"));
        assert_eq!(r.runner_up.as_deref(), Some("Boston College"));
        assert_eq!(r.champion_goals, Some(12));
        assert_eq!(r.runnerup_goals, Some(10));
        assert_eq!(r.goal_diff, Some(2));
        assert_eq!(r.total_goals, Some(22));
        assert_eq!(r.location, "Baltimore | Homewood Field");
    }

    #[test]
    fn location_omits_separator_without_stadium() {
        let r = parse_row(&row(&["2001", "Towson", "", "Maryland", "14-13", "Georgetown"]))
            .unwrap();
        assert_eq!(r.location, "Towson");
    }

    #[test]
    fn short_row_reads_missing_columns_as_absent() {
        let r = parse_row(&row(&["1985", "Philadelphia"])).unwrap();
        assert_eq!(r.year, 1985);
        assert_eq!(r.champion, None);
        assert_eq!(r.runner_up, None);
        assert_eq!(r.champion_goals, None);
        assert_eq!(r.location, "Philadelphia");
    }

    #[test]
    fn empty_team_name_is_absent_not_empty() {
        let r = parse_row(&row(&["2003", "", "", "  ", "7-6", ""])).unwrap();
        assert_eq!(r.champion, None);
        assert_eq!(r.runner_up, None);
    }

    // Derived-fields invariant: both goal fields and both derived fields
    // present, or none of the four.
    #[test]
    fn derived_fields_all_or_nothing() {
        let scored = parse_row(&row(&["2019", "", "", "A", "13-12", "B"])).unwrap();
        assert!(scored.goal_diff.is_some() && scored.total_goals.is_some());
        assert_eq!(scored.goal_diff, Some(1));
        assert_eq!(scored.total_goals, Some(25));

        let unscored = parse_row(&row(&["2020", "", "", "A", "Canceled", "B"])).unwrap();
        assert!(unscored.champion_goals.is_none());
        assert!(unscored.runnerup_goals.is_none());
        assert!(unscored.goal_diff.is_none());
        assert!(unscored.total_goals.is_none());
    }

    #[test]
    fn header_rows_are_dropped() {
        assert!(parse_row(&row(&["Year", "Site", "Stadium"])).is_none());
        assert!(parse_row(&row(&["2020-ish header junk"])).is_none());
        assert!(parse_row(&row(&[])).is_none());
    }
}
