use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use clap::ValueEnum;
use csv::{QuoteStyle, Terminator, WriterBuilder};
use tabled::builder::Builder;
use tabled::settings::{Alignment, Style};
use tracing::info;

use crate::error::Result;
use crate::parser::Mode;
use crate::table::ResultTable;

pub const DATETIME_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputMode {
    /// One row per line, cells separated by spaces
    #[default]
    Plain,
    /// Aligned ASCII grid
    Pretty,
    /// CSV file under results/
    File,
}

pub fn control_output(
    table: &ResultTable,
    output: OutputMode,
    mode: Mode,
    results_dir: &Path,
) -> Result<()> {
    match output {
        OutputMode::Plain => print!("{}", render_plain(table)),
        OutputMode::Pretty => println!("{}", render_pretty(table)),
        OutputMode::File => {
            file_output(table, mode, results_dir)?;
        }
    }
    Ok(())
}

pub fn render_plain(table: &ResultTable) -> String {
    table
        .rows()
        .iter()
        .map(|row| format!("{}\n", row.join(" ")))
        .collect()
}

pub fn render_pretty(table: &ResultTable) -> String {
    let mut builder = Builder::default();
    builder.push_record(table.header().iter().cloned());
    for row in table.records() {
        builder.push_record(row.iter().cloned());
    }
    let mut grid = builder.build();
    grid.with(Style::ascii()).with(Alignment::left());
    grid.to_string()
}

/// Write `table` as CSV to `<results_dir>/<mode>_<timestamp>.csv`.
pub fn file_output(table: &ResultTable, mode: Mode, results_dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(results_dir)?;
    let timestamp = Local::now().format(DATETIME_FORMAT);
    let path = results_dir.join(format!("{}_{}.csv", mode.as_str(), timestamp));

    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::Any(b'\n'))
        .from_path(&path)?;
    for row in table.rows() {
        writer.write_record(row)?;
    }
    writer.flush()?;

    info!(path = %path.display(), "Results saved");
    Ok(path)
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn versions() -> ResultTable {
        let mut t = ResultTable::new(["Documentation link", "Version", "Status"]);
        t.push(vec![
            "https://docs.python.org/3.13/".into(),
            "3.13".into(),
            "stable".into(),
        ])
        .unwrap();
        t.push(vec!["https://www.python.org/doc/versions/".into(), "All versions".into(), String::new()])
            .unwrap();
        t
    }

    #[test]
    fn plain_prints_one_line_per_row() {
        let out = render_plain(&versions());
        assert_eq!(
            out,
            "Documentation link Version Status\n\
             https://docs.python.org/3.13/ 3.13 stable\n\
             https://www.python.org/doc/versions/ All versions \n"
        );
    }

    #[test]
    fn pretty_is_a_left_aligned_grid() {
        let out = render_pretty(&versions());
        let lines: Vec<&str> = out.lines().collect();
        assert!(lines[0].starts_with("+-"));
        assert!(lines[1].starts_with("| Documentation link "));
        assert!(lines[3].contains("| 3.13 "));
        assert!(!lines[3].contains(" 3.13 |"));
        // Every line of the grid has the same width
        let width = lines[0].chars().count();
        assert!(lines.iter().all(|l| l.chars().count() == width));
    }

    #[test]
    fn rendering_is_deterministic() {
        assert_eq!(render_pretty(&versions()), render_pretty(&versions()));
        assert_eq!(render_plain(&versions()), render_plain(&versions()));
    }

    #[test]
    fn file_output_writes_quoted_csv() {
        let dir = tempfile::tempdir().unwrap();
        let results = dir.path().join("results");
        let path = file_output(&versions(), Mode::LatestVersions, &results).unwrap();

        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("latest-versions_"));
        assert!(name.ends_with(".csv"));
        // latest-versions_YYYY-mm-dd_HH-MM-SS.csv
        assert_eq!(name.len(), "latest-versions_".len() + 19 + ".csv".len());

        let body = fs::read_to_string(&path).unwrap();
        assert_eq!(
            body,
            "\"Documentation link\",\"Version\",\"Status\"\n\
             \"https://docs.python.org/3.13/\",\"3.13\",\"stable\"\n\
             \"https://www.python.org/doc/versions/\",\"All versions\",\"\"\n"
        );
    }
}
