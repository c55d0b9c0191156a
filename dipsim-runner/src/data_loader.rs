//! Fund data loading from local CSV or JSON files.
//!
//! Accepted inputs:
//! - CSV with a header row. Column names follow the fund data exports this
//!   tool is usually fed: `date`/`净值日期`/`日期`, `daily_growth`/`日增长率`/`涨跌幅`,
//!   `net_value`/`单位净值`/`收盘`.
//! - JSON: either a bare array of `{date, daily_growth, net_value}` or a saved
//!   API response of the shape `{"data": {"list": [...], "fund_code": ...}}`.
//!
//! Missing growth cells load as 0.0. Dates are normalized to `YYYY-MM-DD` and
//! the result is sorted ascending with duplicate dates dropped (first wins).

use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use dipsim_core::FundDay;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

const DATE_COLUMNS: &[&str] = &["date", "净值日期", "日期"];
const GROWTH_COLUMNS: &[&str] = &["daily_growth", "日增长率", "涨跌幅"];
const NET_VALUE_COLUMNS: &[&str] = &["net_value", "单位净值", "收盘"];

/// Errors while reading fund data.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("missing {0} column (accepted: {1})")]
    MissingColumn(&'static str, String),
    #[error("line {line}: {reason}")]
    InvalidRow { line: u64, reason: String },
    #[error("unsupported data file extension: {0}")]
    UnsupportedFormat(String),
}

/// Loaded series plus whatever metadata the file carried.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedData {
    pub days: Vec<FundDay>,
    /// Fund code from a JSON envelope, if present.
    pub fund_code: Option<String>,
}

/// Load a fund series from `path`, dispatching on the file extension.
pub fn load_fund_data(path: &Path) -> Result<LoadedData, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    let io_err = |source| LoadError::Io {
        path: path.display().to_string(),
        source,
    };

    let loaded = match ext.as_str() {
        "csv" => {
            let file = std::fs::File::open(path).map_err(io_err)?;
            LoadedData {
                days: parse_csv(file)?,
                fund_code: None,
            }
        }
        "json" => {
            let text = std::fs::read_to_string(path).map_err(io_err)?;
            parse_json(&text)?
        }
        other => return Err(LoadError::UnsupportedFormat(other.to_string())),
    };

    debug!(path = %path.display(), days = loaded.days.len(), "loaded fund data");
    Ok(loaded)
}

/// Parse CSV fund data from any reader.
pub fn parse_csv<R: Read>(reader: R) -> Result<Vec<FundDay>, LoadError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let find = |names: &[&str]| {
        headers
            .iter()
            .position(|h| names.iter().any(|n| h.trim_start_matches('\u{feff}') == *n))
    };
    let date_idx = find(DATE_COLUMNS)
        .ok_or_else(|| LoadError::MissingColumn("date", DATE_COLUMNS.join(", ")))?;
    let growth_idx = find(GROWTH_COLUMNS)
        .ok_or_else(|| LoadError::MissingColumn("daily growth", GROWTH_COLUMNS.join(", ")))?;
    let nav_idx = find(NET_VALUE_COLUMNS);

    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);

        let raw_date = record.get(date_idx).unwrap_or("");
        let date = parse_date(raw_date).ok_or_else(|| LoadError::InvalidRow {
            line,
            reason: format!("unparseable date '{raw_date}'"),
        })?;

        let daily_growth = parse_number(record.get(growth_idx), line, "daily growth")?;
        let net_value = match nav_idx {
            Some(idx) => parse_number(record.get(idx), line, "net value")?,
            None => 0.0,
        };

        rows.push((date, daily_growth, net_value));
    }

    Ok(normalize(rows))
}

#[derive(Deserialize)]
struct RawDay {
    date: String,
    #[serde(default)]
    daily_growth: Option<f64>,
    #[serde(default)]
    net_value: Option<f64>,
}

#[derive(Deserialize)]
struct Envelope {
    data: EnvelopeData,
}

#[derive(Deserialize)]
struct EnvelopeData {
    list: Vec<RawDay>,
    #[serde(default)]
    fund_code: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum JsonInput {
    Bare(Vec<RawDay>),
    Envelope(Envelope),
}

/// Parse JSON fund data (bare array or API envelope).
pub fn parse_json(text: &str) -> Result<LoadedData, LoadError> {
    let (raw, fund_code) = match serde_json::from_str::<JsonInput>(text)? {
        JsonInput::Bare(list) => (list, None),
        JsonInput::Envelope(env) => (env.data.list, env.data.fund_code),
    };

    let mut rows = Vec::with_capacity(raw.len());
    for (i, day) in raw.into_iter().enumerate() {
        let index = i as u64 + 1;
        let date = parse_date(&day.date).ok_or_else(|| LoadError::InvalidRow {
            line: index,
            reason: format!("unparseable date '{}'", day.date),
        })?;
        let daily_growth = finite(day.daily_growth.unwrap_or(0.0), index, "daily growth")?;
        let net_value = finite(day.net_value.unwrap_or(0.0), index, "net value")?;
        rows.push((date, daily_growth, net_value));
    }

    Ok(LoadedData {
        days: normalize(rows),
        fund_code,
    })
}

/// Parse `YYYY-MM-DD`, `YYYYMMDD` or `YYYY/MM/DD`, ignoring any time part.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    let date_part = raw.split([' ', 'T']).next().unwrap_or(raw);
    ["%Y-%m-%d", "%Y%m%d", "%Y/%m/%d"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(date_part, fmt).ok())
}

/// Keep days whose date falls inside `[start, end]` (either bound optional).
pub fn filter_date_range(
    days: Vec<FundDay>,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Vec<FundDay> {
    if start.is_none() && end.is_none() {
        return days;
    }
    days.into_iter()
        .filter(|day| match parse_date(&day.date) {
            Some(d) => start.map_or(true, |s| d >= s) && end.map_or(true, |e| d <= e),
            None => false,
        })
        .collect()
}

fn parse_number(cell: Option<&str>, line: u64, what: &str) -> Result<f64, LoadError> {
    let cell = cell.unwrap_or("").trim().trim_end_matches('%').trim();
    if cell.is_empty() || cell == "--" {
        return Ok(0.0);
    }
    let value: f64 = cell.parse().map_err(|_| LoadError::InvalidRow {
        line,
        reason: format!("unparseable {what} '{cell}'"),
    })?;
    finite(value, line, what)
}

fn finite(value: f64, line: u64, what: &str) -> Result<f64, LoadError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(LoadError::InvalidRow {
            line,
            reason: format!("non-finite {what} {value}"),
        })
    }
}

/// Sort ascending by date, drop duplicate dates, render dates canonically.
fn normalize(mut rows: Vec<(NaiveDate, f64, f64)>) -> Vec<FundDay> {
    rows.sort_by_key(|(date, _, _)| *date);
    let before = rows.len();
    rows.dedup_by_key(|(date, _, _)| *date);
    if rows.len() < before {
        warn!(dropped = before - rows.len(), "duplicate dates in fund data");
    }
    rows.into_iter()
        .map(|(date, growth, nav)| {
            FundDay::new(date.format("%Y-%m-%d").to_string(), growth).with_net_value(nav)
        })
        .collect()
}
