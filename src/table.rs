//! Row-oriented text table reading and writing.
//!
//! Reading goes through one index-based interface with two implementations:
//! the `csv` crate when the `csv-reader` feature is enabled (default), and a
//! plain quote/CRLF-tolerant reader otherwise. Callers only ever see
//! `Vec<Vec<String>>`; short rows read as missing columns, never errors.

use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::Result;

pub const CSV_PATH: &str = "table.csv";

#[cfg(feature = "csv-reader")]
pub fn read_rows(path: &Path) -> Result<Vec<Vec<String>>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok(rows)
}

#[cfg(not(feature = "csv-reader"))]
pub fn read_rows(path: &Path) -> Result<Vec<Vec<String>>> {
    let text = fs::read_to_string(path)?;
    Ok(parse_rows(&text))
}

/// Minimal CSV parser: double-quote escapes, CRLF tolerant, skips blank lines.
#[cfg_attr(feature = "csv-reader", allow(dead_code))]
fn parse_rows(text: &str) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut field = String::new();
    let mut row: Vec<String> = Vec::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' => {
                if in_quotes {
                    if matches!(chars.peek(), Some('"')) {
                        chars.next();
                        field.push('"');
                    } else {
                        in_quotes = false;
                    }
                } else {
                    in_quotes = true;
                }
            }
            ',' if !in_quotes => {
                row.push(std::mem::take(&mut field));
            }
            '\n' | '\r' if !in_quotes => {
                if ch == '\r' && matches!(chars.peek(), Some('\n')) {
                    chars.next();
                }
                row.push(std::mem::take(&mut field));
                if !(row.len() == 1 && row[0].is_empty()) {
                    rows.push(std::mem::take(&mut row));
                } else {
                    row.clear();
                }
            }
            _ => field.push(ch),
        }
    }

    // Flush a trailing row with no final newline.
    if !field.is_empty() || !row.is_empty() {
        row.push(field);
        rows.push(row);
    }

    rows
}

// ── Writing ──

pub fn write_rows(path: &Path, rows: &[Vec<String>]) -> Result<()> {
    let mut buf: Vec<u8> = Vec::new();
    for row in rows {
        write_row(&mut buf, row)?;
    }
    fs::write(path, buf)?;
    Ok(())
}

fn write_row<W: Write>(mut w: W, row: &[String]) -> std::io::Result<()> {
    let mut first = true;
    for cell in row {
        if !first {
            write!(w, ",")?;
        } else {
            first = false;
        }
        if needs_quotes(cell) {
            write!(w, "\"{}\"", cell.replace('"', "\"\""))?;
        } else {
            write!(w, "{}", cell)?;
        }
    }
    writeln!(w)
}

fn needs_quotes(field: &str) -> bool {
    field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_quotes_and_crlf() {
        let rows = parse_rows("a,\"b, c\",d\r\n\"say \"\"hi\"\"\",2\n");
        assert_eq!(
            rows,
            vec![
                vec!["a".to_string(), "b, c".to_string(), "d".to_string()],
                vec!["say \"hi\"".to_string(), "2".to_string()],
            ]
        );
    }

    #[test]
    fn parse_tolerates_ragged_rows() {
        let rows = parse_rows("2019,Syracuse\nonly-one\n");
        assert_eq!(rows[0].len(), 2);
        assert_eq!(rows[1], vec!["only-one".to_string()]);
    }

    #[test]
    fn write_quotes_fields_that_need_it() {
        let mut buf = Vec::new();
        write_row(
            &mut buf,
            &["plain".to_string(), "a,b".to_string(), "q\"q".to_string()],
        )
        .unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "plain,\"a,b\",\"q\"\"q\"\n");
    }

    #[test]
    fn written_rows_read_back() {
        let dir = std::env::temp_dir().join("lax_scraper_table_test");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("roundtrip.csv");
        let rows = vec![
            vec!["2019".to_string(), "Baltimore, MD".to_string()],
            vec!["Year".to_string(), "Site".to_string()],
        ];
        write_rows(&path, &rows).unwrap();
        assert_eq!(read_rows(&path).unwrap(), rows);
        fs::remove_file(&path).unwrap();
    }
}
