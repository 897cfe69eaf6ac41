//! Comma-separated node, edge and run-record tables.
//!
//! A header row is optional: for node and edge tables a first line whose
//! first field is not numeric is skipped, for run records a first line
//! starting with `label` is skipped. Blank lines are ignored and fields are
//! trimmed. Values are only parsed here; integrity checks belong to the graph.

use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use route_planner::{EdgeRow, NodeRow, RunRecord};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TableError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{}:{line}: {message}", path.display())]
    Parse { path: PathBuf, line: usize, message: String },

    #[error("{} has more than {limit} rows", path.display())]
    TooManyRows { path: PathBuf, limit: usize },
}

/// A failed line, before the file path is attached
#[derive(Debug, PartialEq)]
struct LineError {
    line: usize,
    message: String,
}

impl LineError {
    fn new(line: usize, message: impl Into<String>) -> Self {
        Self { line, message: message.into() }
    }

    fn at(self, path: &Path) -> TableError {
        TableError::Parse { path: path.to_path_buf(), line: self.line, message: self.message }
    }
}


pub fn read_nodes(path: &Path, limit: usize) -> Result<Vec<NodeRow>, TableError> {
    let rows = parse_nodes(&read(path)?).map_err(|e| e.at(path))?;
    check_limit(path, rows, limit)
}

pub fn read_edges(path: &Path, limit: usize) -> Result<Vec<EdgeRow>, TableError> {
    let rows = parse_edges(&read(path)?).map_err(|e| e.at(path))?;
    check_limit(path, rows, limit)
}

pub fn read_records(path: &Path) -> Result<Vec<RunRecord>, TableError> {
    parse_records(&read(path)?).map_err(|e| e.at(path))
}

/// Write records in the same layout `read_records` accepts
pub fn write_records(path: &Path, records: &[RunRecord]) -> io::Result<()> {
    let mut out = BufWriter::new(fs::File::create(path)?);
    writeln!(out, "label,distance,nodes_expanded,millis")?;
    for r in records {
        writeln!(out, "{},{},{},{}", r.label, r.distance, r.nodes_expanded, r.elapsed)?;
    }
    out.flush()
}


fn read(path: &Path) -> Result<String, TableError> {
    fs::read_to_string(path).map_err(|source| TableError::Io { path: path.to_path_buf(), source })
}

fn check_limit<T>(path: &Path, rows: Vec<T>, limit: usize) -> Result<Vec<T>, TableError> {
    if rows.len() > limit {
        return Err(TableError::TooManyRows { path: path.to_path_buf(), limit });
    }
    Ok(rows)
}

/// Non-blank lines with 1-based line numbers, header removed
fn data_lines<'a>(text: &'a str, is_header: impl Fn(&str) -> bool) -> impl Iterator<Item = (usize, &'a str)> {
    let mut first = true;
    text.lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty())
        .filter(move |(_, line)| {
            let header = first && is_header(*line);
            first = false;
            !header
        })
}

fn first_field(line: &str) -> &str {
    line.split(',').next().unwrap_or("").trim()
}

fn numeric_header(line: &str) -> bool {
    first_field(line).parse::<f64>().is_err()
}

fn field<T: std::str::FromStr>(line: usize, fields: &[&str], index: usize, name: &str) -> Result<T, LineError> {
    let raw = fields
        .get(index)
        .map(|f| f.trim())
        .ok_or_else(|| LineError::new(line, format!("missing {name}")))?;
    raw.parse()
        .map_err(|_| LineError::new(line, format!("invalid {name} `{raw}`")))
}

fn parse_nodes(text: &str) -> Result<Vec<NodeRow>, LineError> {
    data_lines(text, numeric_header)
        .map(|(line, raw)| -> Result<NodeRow, LineError> {
            // the name is everything after the third comma and may contain commas
            let fields: Vec<&str> = raw.splitn(4, ',').collect();
            let id = field(line, &fields, 0, "id")?;
            let name = fields.get(3).map(|n| n.trim()).unwrap_or("");

            let lat = fields.get(1).map(|f| f.trim()).unwrap_or("");
            let lon = fields.get(2).map(|f| f.trim()).unwrap_or("");
            if lat.is_empty() && lon.is_empty() {
                return Ok(NodeRow::unplaced(id, name));
            }
            Ok(NodeRow::new(id, field(line, &fields, 1, "lat")?, field(line, &fields, 2, "lon")?, name))
        })
        .collect()
}

fn parse_edges(text: &str) -> Result<Vec<EdgeRow>, LineError> {
    data_lines(text, numeric_header)
        .map(|(line, raw)| -> Result<EdgeRow, LineError> {
            let fields: Vec<&str> = raw.split(',').collect();
            Ok(EdgeRow::new(
                field(line, &fields, 0, "src_id")?,
                field(line, &fields, 1, "dst_id")?,
                field(line, &fields, 2, "distance")?,
            ))
        })
        .collect()
}

fn parse_records(text: &str) -> Result<Vec<RunRecord>, LineError> {
    data_lines(text, |line| first_field(line) == "label")
        .map(|(line, raw)| -> Result<RunRecord, LineError> {
            let fields: Vec<&str> = raw.split(',').collect();
            let label: String = field(line, &fields, 0, "label")?;
            Ok(RunRecord::from_millis(
                label,
                field(line, &fields, 1, "distance")?,
                field(line, &fields, 2, "nodes_expanded")?,
                field(line, &fields, 3, "millis")?,
            ))
        })
        .collect()
}
