//! Harvester: fetch the tournament page and dump its results table to CSV.
//!
//! The results table is the second `<table>` on the page. That is a contract
//! with the external page's structure, not a semantic lookup; fewer than two
//! tables means the page changed shape and the run aborts.

use std::path::Path;

use anyhow::{bail, Result};
use scraper::{Html, Selector};
use tracing::info;

use crate::table;

pub const SOURCE_URL: &str =
    "https://en.wikipedia.org/wiki/NCAA_Division_I_women%27s_lacrosse_tournament";
const USER_AGENT: &str = "Mozilla/5.0 (compatible; simple-scraper/1.0)";
const TABLE_INDEX: usize = 1;

pub fn run(out_path: &Path) -> Result<()> {
    let html = fetch_page(SOURCE_URL)?;
    let rows = extract_table_rows(&html, TABLE_INDEX)?;
    table::write_rows(out_path, &rows)?;
    println!("Wrote {} rows to {}", rows.len(), out_path.display());
    Ok(())
}

fn fetch_page(url: &str) -> Result<String> {
    info!("Fetching {}", url);
    let client = reqwest::blocking::Client::builder()
        .user_agent(USER_AGENT)
        .build()?;
    let body = client.get(url).send()?.error_for_status()?.text()?;
    Ok(body)
}

/// Pull every row of the table at `index`, header rows included. Each cell is
/// the trimmed text of a `<th>`/`<td>`, in document order. Distinguishing
/// header rows from data rows is the loader's job.
fn extract_table_rows(html: &str, index: usize) -> Result<Vec<Vec<String>>> {
    let document = Html::parse_document(html);
    let table_sel = Selector::parse("table").unwrap();
    let row_sel = Selector::parse("tr").unwrap();
    let cell_sel = Selector::parse("th, td").unwrap();

    let tables: Vec<_> = document.select(&table_sel).collect();
    let Some(results) = tables.get(index) else {
        bail!(
            "expected at least {} tables on page, found {}",
            index + 1,
            tables.len()
        );
    };

    let mut rows = Vec::new();
    for tr in results.select(&row_sel) {
        let cells: Vec<String> = tr
            .select(&cell_sel)
            .map(|cell| cell.text().collect::<String>().trim().to_string())
            .collect();
        rows.push(cells);
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body>
        <table><tr><td>navbox junk</td></tr></table>
        <table>
          <tr><th> Year </th><th>Site</th></tr>
          <tr><td>2019</td><td>
            Baltimore
          </td></tr>
        </table>
        </body></html>
    "#;

    #[test]
    fn picks_second_table_and_trims_cells() {
        let rows = extract_table_rows(PAGE, 1).unwrap();
        assert_eq!(
            rows,
            vec![
                vec!["Year".to_string(), "Site".to_string()],
                vec!["2019".to_string(), "Baltimore".to_string()],
            ]
        );
    }

    #[test]
    fn header_and_data_cells_both_extracted() {
        let rows = extract_table_rows(PAGE, 1).unwrap();
        // First row came from <th> cells, second from <td>.
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn too_few_tables_is_an_error() {
        let err = extract_table_rows("<table><tr><td>x</td></tr></table>", 1)
            .unwrap_err()
            .to_string();
        assert!(err.contains("expected at least 2 tables"));
    }
}
