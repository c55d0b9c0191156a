//! Reporting and export: JSON and CSV artifact generation.
//!
//! - **JSON**: full round-trip serialization of a `SimulationReport`
//! - **CSV**: the daily trajectory and the trade log, for spreadsheets
//!
//! Persisted reports carry a `schema_version`; newer versions are rejected
//! on load.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use tracing::info;

use dipsim_core::{DailySnapshot, FundDay, TradeEvent};

use crate::runner::{SimulationReport, SCHEMA_VERSION};

// ─── JSON export ────────────────────────────────────────────────────

pub fn export_json(report: &SimulationReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("failed to serialize SimulationReport to JSON")
}

/// Deserialize a `SimulationReport`, rejecting unknown schema versions.
pub fn import_json(json: &str) -> Result<SimulationReport> {
    let report: SimulationReport =
        serde_json::from_str(json).context("failed to deserialize SimulationReport from JSON")?;
    if report.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            report.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(report)
}

// ─── CSV export ─────────────────────────────────────────────────────

/// One row per replayed day.
///
/// Columns: date, change_percent, cumulative_change_percent, current_price,
/// current_gain_percent, trade_type, trade_amount, holding_value,
/// remaining_capital, total_assets, trade_info, breakdown
pub fn export_daily_csv(daily: &[DailySnapshot]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "date",
        "change_percent",
        "cumulative_change_percent",
        "current_price",
        "current_gain_percent",
        "trade_type",
        "trade_amount",
        "holding_value",
        "remaining_capital",
        "total_assets",
        "trade_info",
        "breakdown",
    ])?;

    for s in daily {
        let (kind, amount) = match &s.trade {
            Some(t) => (t.kind(), format!("{:.2}", t.amount())),
            None => ("", String::new()),
        };
        let breakdown = if s.holding_breakdown.is_empty() {
            String::new()
        } else {
            s.holding_breakdown.to_string()
        };
        wtr.write_record([
            s.date.as_str(),
            &format!("{:.2}", s.change_percent),
            &format!("{:.2}", s.cumulative_change_percent),
            &format!("{:.6}", s.current_price),
            &format!("{:.2}", s.current_gain_percent),
            kind,
            &amount,
            &format!("{:.2}", s.holding_value),
            &format!("{:.2}", s.remaining_capital),
            &format!("{:.2}", s.total_assets),
            &s.trade_info,
            &breakdown,
        ])?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// One row per trade. Buy-only and sell-only columns are blank for the other
/// side.
///
/// Columns: type, date, price, amount, shares, units, drop_percent,
/// remaining_capital, profit, sell_ratio_percent, avg_buy_price
pub fn export_trades_csv(trades: &[TradeEvent]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "type",
        "date",
        "price",
        "amount",
        "shares",
        "units",
        "drop_percent",
        "remaining_capital",
        "profit",
        "sell_ratio_percent",
        "avg_buy_price",
    ])?;

    for t in trades {
        let row: [String; 11] = match t {
            TradeEvent::Buy {
                date,
                price,
                amount,
                shares,
                units,
                drop_percent,
                remaining_capital,
            } => [
                t.kind().to_string(),
                date.clone(),
                format!("{price:.6}"),
                format!("{amount:.2}"),
                format!("{shares:.4}"),
                units.to_string(),
                format!("{drop_percent:.2}"),
                format!("{remaining_capital:.2}"),
                String::new(),
                String::new(),
                String::new(),
            ],
            TradeEvent::SellPartial {
                date,
                price,
                shares,
                amount,
                profit,
                sell_ratio_percent,
                avg_buy_price,
                ..
            } => [
                t.kind().to_string(),
                date.clone(),
                format!("{price:.6}"),
                format!("{amount:.2}"),
                format!("{shares:.4}"),
                String::new(),
                String::new(),
                String::new(),
                format!("{profit:.2}"),
                format!("{sell_ratio_percent:.2}"),
                format!("{avg_buy_price:.6}"),
            ],
        };
        wtr.write_record(&row)?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Write a series in the loader's own CSV layout (`date,daily_growth,net_value`).
pub fn write_fund_csv(days: &[FundDay], path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    wtr.write_record(["date", "daily_growth", "net_value"])?;
    for day in days {
        wtr.write_record([
            day.date.as_str(),
            &day.daily_growth.to_string(),
            &format!("{:.4}", day.net_value),
        ])?;
    }
    wtr.flush()
        .with_context(|| format!("failed to flush {}", path.display()))?;
    Ok(())
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Save the full artifact set for one run.
///
/// Creates `{fund_code}_{run_id[..12]}/` under `output_dir` containing:
/// - `report.json`: the full `SimulationReport`
/// - `daily.csv`: day-by-day trajectory
/// - `trades.csv`: trade log
///
/// The directory name depends only on the run, so re-saving overwrites.
/// Characters of the fund code outside `[A-Za-z0-9_-]` become `_`, so the
/// directory always lands directly under `output_dir`.
pub fn save_artifacts(report: &SimulationReport, output_dir: &Path) -> Result<PathBuf> {
    let dirname = format!(
        "{}_{}",
        dir_component(&report.fund_code),
        report.run_id.short(12)
    );
    let run_dir = output_dir.join(dirname);
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("failed to create artifact dir: {}", run_dir.display()))?;

    std::fs::write(run_dir.join("report.json"), export_json(report)?)?;
    std::fs::write(
        run_dir.join("daily.csv"),
        export_daily_csv(&report.result.daily_results)?,
    )?;
    std::fs::write(
        run_dir.join("trades.csv"),
        export_trades_csv(&report.result.trade_log)?,
    )?;

    info!(dir = %run_dir.display(), "artifacts saved");
    Ok(run_dir)
}

/// Fund codes come from data files; keep only path-safe characters.
fn dir_component(code: &str) -> String {
    let safe: String = code
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if safe.is_empty() {
        "fund".to_string()
    } else {
        safe
    }
}

/// Load a `SimulationReport` from an artifact directory.
pub fn load_artifacts(dir: &Path) -> Result<SimulationReport> {
    let report_path = dir.join("report.json");
    let json = std::fs::read_to_string(&report_path)
        .with_context(|| format!("failed to read {}", report_path.display()))?;
    import_json(&json)
}
