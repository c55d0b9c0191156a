//! DipSim CLI — replay, sweep and synthetic-data commands.
//!
//! Commands:
//! - `run`: replay one fund series from a TOML config or a data file
//! - `sweep`: replay one series under a grid of take-profit parameters
//! - `synth`: write a seeded synthetic series as CSV

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

use dipsim_core::{DailySnapshot, SimulationConfig};
use dipsim_runner::data_loader::{filter_date_range, load_fund_data, parse_date};
use dipsim_runner::export::{export_json, save_artifacts, write_fund_csv};
use dipsim_runner::sweep::{ParamGrid, ParamSweep};
use dipsim_runner::synthetic::{synthetic_series, SyntheticConfig};
use dipsim_runner::{run_simulation, RunConfig, SimulationReport};

#[derive(Parser)]
#[command(
    name = "dipsim",
    about = "DipSim CLI — buy-the-dip fund strategy simulator"
)]
struct Cli {
    /// Log at debug level (RUST_LOG still wins when set).
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a fund series and print the result.
    Run {
        /// Path to a TOML config file.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Fund data file (.csv or .json). Overrides the config's data path.
        #[arg(long)]
        data: Option<PathBuf>,

        /// Fund code label for the report.
        #[arg(long)]
        fund_code: Option<String>,

        #[command(flatten)]
        window: DateWindow,

        #[command(flatten)]
        params: ParamOverrides,

        /// Save report.json, daily.csv and trades.csv under this directory.
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Print the day-by-day table.
        #[arg(long, default_value_t = false)]
        daily: bool,

        /// Print the full report as JSON instead of the summary.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Replay one series under every combination of the given values.
    Sweep {
        /// Fund data file (.csv or .json).
        #[arg(long)]
        data: PathBuf,

        #[command(flatten)]
        window: DateWindow,

        /// Base parameters; swept axes replace them.
        #[command(flatten)]
        params: ParamOverrides,

        /// Sell thresholds to try, e.g. 3,5,8.
        #[arg(long, value_delimiter = ',', allow_negative_numbers = true)]
        thresholds: Vec<f64>,

        /// Sell ratios to try, e.g. 30,50,100.
        #[arg(long, value_delimiter = ',')]
        ratios: Vec<f64>,

        /// Minimum buy drops to try, e.g. 0.5,1.
        #[arg(long, value_delimiter = ',')]
        drops: Vec<f64>,

        /// Buy amounts per unit to try.
        #[arg(long, value_delimiter = ',')]
        buy_amounts: Vec<f64>,

        /// Rows to print.
        #[arg(long, default_value_t = 10)]
        top: usize,

        /// Run configs one at a time.
        #[arg(long, default_value_t = false)]
        sequential: bool,

        /// Write the full ranking as CSV.
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Write a seeded synthetic fund series as CSV.
    Synth {
        /// Trading days to generate.
        #[arg(long, default_value_t = 250)]
        days: usize,

        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Mean daily growth, percent.
        #[arg(long, default_value_t = 0.02, allow_negative_numbers = true)]
        drift: f64,

        /// Daily growth standard deviation, percent.
        #[arg(long, default_value_t = 1.2)]
        volatility: f64,

        /// First calendar date (YYYY-MM-DD or YYYYMMDD).
        #[arg(long, default_value = "2024-01-02")]
        start: String,

        /// Output CSV path.
        #[arg(long)]
        out: PathBuf,
    },
}

/// Inclusive date window (YYYY-MM-DD or YYYYMMDD).
#[derive(Args)]
struct DateWindow {
    #[arg(long)]
    start: Option<String>,

    #[arg(long)]
    end: Option<String>,
}

/// Simulation parameters that override the config file.
#[derive(Args)]
struct ParamOverrides {
    /// Total capital.
    #[arg(long)]
    capital: Option<f64>,

    /// Amount invested per drop unit.
    #[arg(long)]
    buy_amount: Option<f64>,

    /// Percent drop that makes one unit.
    #[arg(long)]
    min_drop: Option<f64>,

    /// Floor unit counts instead of rounding.
    #[arg(long, default_value_t = false)]
    floor: bool,

    /// Gain over average cost, in percent, that must be exceeded to sell.
    #[arg(long, allow_negative_numbers = true)]
    sell_threshold: Option<f64>,

    /// Percent of the position sold per take-profit.
    #[arg(long)]
    sell_ratio: Option<f64>,
}

impl ParamOverrides {
    fn apply(&self, config: &mut SimulationConfig) {
        if let Some(v) = self.capital {
            config.total_capital = v;
        }
        if let Some(v) = self.buy_amount {
            config.buy_amount_per_unit = v;
        }
        if let Some(v) = self.min_drop {
            config.min_buy_drop_percent = v;
        }
        if self.floor {
            config.use_rounding = false;
        }
        if let Some(v) = self.sell_threshold {
            config.sell_gain_threshold_percent = v;
        }
        if let Some(v) = self.sell_ratio {
            config.sell_ratio_percent = v;
        }
    }
}

impl DateWindow {
    fn parse(&self) -> Result<(Option<NaiveDate>, Option<NaiveDate>)> {
        Ok((parse_flag_date(self.start.as_deref())?, parse_flag_date(self.end.as_deref())?))
    }
}

fn parse_flag_date(raw: Option<&str>) -> Result<Option<NaiveDate>> {
    raw.map(|s| parse_date(s).with_context(|| format!("invalid date '{s}'")))
        .transpose()
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Run {
            config,
            data,
            fund_code,
            window,
            params,
            output_dir,
            daily,
            json,
        } => run_cmd(
            config, data, fund_code, &window, &params, output_dir, daily, json,
        ),
        Commands::Sweep {
            data,
            window,
            params,
            thresholds,
            ratios,
            drops,
            buy_amounts,
            top,
            sequential,
            out,
        } => {
            let grid = ParamGrid {
                buy_amounts_per_unit: buy_amounts,
                min_buy_drop_percents: drops,
                sell_gain_thresholds: thresholds,
                sell_ratios: ratios,
                rounding_modes: Vec::new(),
            };
            sweep_cmd(data, &window, &params, grid, top, sequential, out)
        }
        Commands::Synth {
            days,
            seed,
            drift,
            volatility,
            start,
            out,
        } => synth_cmd(days, seed, drift, volatility, &start, out),
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[allow(clippy::too_many_arguments)]
fn run_cmd(
    config_path: Option<PathBuf>,
    data: Option<PathBuf>,
    fund_code: Option<String>,
    window: &DateWindow,
    params: &ParamOverrides,
    output_dir: Option<PathBuf>,
    daily: bool,
    json: bool,
) -> Result<()> {
    let mut run_config = match (config_path, data) {
        (Some(path), data) => {
            let mut config = RunConfig::from_file(&path)?;
            if let Some(data) = data {
                config.data.path = data;
            }
            config
        }
        (None, Some(data)) => RunConfig::for_data(data),
        (None, None) => bail!("one of --config or --data is required"),
    };

    params.apply(&mut run_config.simulation);
    let (start, end) = window.parse()?;
    if start.is_some() {
        run_config.data.start_date = start;
    }
    if end.is_some() {
        run_config.data.end_date = end;
    }
    if fund_code.is_some() {
        run_config.data.fund_code = fund_code;
    }

    let report = run_simulation(&run_config)?;

    if json {
        println!("{}", export_json(&report)?);
    } else {
        if daily {
            print_daily(&report.result.daily_results);
        }
        print_summary(&report);
    }

    if let Some(dir) = output_dir {
        let run_dir = save_artifacts(&report, &dir)?;
        println!("Artifacts saved to: {}", run_dir.display());
    }

    Ok(())
}

fn sweep_cmd(
    data: PathBuf,
    window: &DateWindow,
    params: &ParamOverrides,
    grid: ParamGrid,
    top: usize,
    sequential: bool,
    out: Option<PathBuf>,
) -> Result<()> {
    let mut base = SimulationConfig::default();
    params.apply(&mut base);
    base.validate()?;

    let (start, end) = window.parse()?;
    let loaded = load_fund_data(&data)?;
    let days = filter_date_range(loaded.days, start, end);
    let fund_code = loaded.fund_code.unwrap_or_else(|| {
        data.file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "fund".to_string())
    });

    let results = ParamSweep::new()
        .with_parallelism(!sequential)
        .sweep(&grid, &base, &days, &fund_code)?;

    if results.is_empty() {
        bail!("no valid parameter combinations in the grid");
    }

    println!();
    println!("=== Sweep: {} ({} days, {} configs) ===", fund_code, days.len(), results.len());
    println!(
        "{:<4} {:>9} {:>8} {:>8} {:>9} {:>6} {:>10} {:>12} {:>5} {:>5}",
        "#", "Threshold", "Ratio", "MinDrop", "PerUnit", "Round", "Return%", "TradeProfit", "Buys", "Sells"
    );
    println!("{}", "-".repeat(86));
    for (i, r) in results.top_n(top).iter().enumerate() {
        let c = &r.config;
        println!(
            "{:<4} {:>9.2} {:>8.2} {:>8.2} {:>9.0} {:>6} {:>10.2} {:>12.2} {:>5} {:>5}",
            i + 1,
            c.sell_gain_threshold_percent,
            c.sell_ratio_percent,
            c.min_buy_drop_percent,
            c.buy_amount_per_unit,
            if c.use_rounding { "round" } else { "floor" },
            r.result.return_percent,
            r.result.total_trade_profit,
            r.result.buy_count,
            r.result.sell_count,
        );
    }
    println!();

    if let Some(path) = out {
        std::fs::write(&path, results.to_csv()?)
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("Ranking saved to: {}", path.display());
    }

    Ok(())
}

fn synth_cmd(
    days: usize,
    seed: u64,
    drift: f64,
    volatility: f64,
    start: &str,
    out: PathBuf,
) -> Result<()> {
    let start_date = parse_date(start).with_context(|| format!("invalid date '{start}'"))?;
    let config = SyntheticConfig {
        days,
        seed,
        drift_percent: drift,
        volatility_percent: volatility,
        start_date,
    };
    let series = synthetic_series(&config);
    write_fund_csv(&series, &out)?;
    println!("Wrote {} days to {}", series.len(), out.display());
    Ok(())
}

fn print_daily(daily: &[DailySnapshot]) {
    println!(
        "{:<10} {:>7} {:>8} {:>7} {:<32} {:>12} {:>12} {:>12}",
        "Date", "Chg%", "Cum%", "Gain%", "Trade", "Holding", "Cash", "Assets"
    );
    println!("{}", "-".repeat(108));
    for s in daily {
        let trade = s.trade.as_ref().map(|t| t.to_string()).unwrap_or_default();
        println!(
            "{:<10} {:>7.2} {:>8.2} {:>7.2} {:<32} {:>12.2} {:>12.2} {:>12.2}",
            s.date,
            s.change_percent,
            s.cumulative_change_percent,
            s.current_gain_percent,
            trade,
            s.holding_value,
            s.remaining_capital,
            s.total_assets,
        );
        if !s.holding_breakdown.is_empty() {
            println!("{:>11}{}", "", s.holding_breakdown);
        }
    }
}

fn print_summary(report: &SimulationReport) {
    let r = &report.result;
    let c = &report.config;
    println!();
    println!("=== Simulation Result ===");
    println!("Fund:           {}", report.fund_code);
    println!(
        "Period:         {} to {}",
        report.start_date, report.end_date
    );
    println!("Days:           {}", report.day_count);
    println!("Run:            {}", report.run_id.short(12));
    println!();
    println!("--- Parameters ---");
    println!("Capital:        {:.2}", c.total_capital);
    println!(
        "Buy:            {:.2} per {}% drop ({})",
        c.buy_amount_per_unit,
        c.min_buy_drop_percent,
        if c.use_rounding { "rounded" } else { "floored" }
    );
    println!(
        "Sell:           {}% when gain > {}%",
        c.sell_ratio_percent, c.sell_gain_threshold_percent
    );
    println!();
    println!("--- Performance ---");
    println!("Price Change:   {:.2}%", r.total_price_change);
    println!("Total Return:   {:.2}", r.total_return);
    println!("Return:         {:.2}%", r.return_percent);
    println!("Trade Profit:   {:.2}", r.total_trade_profit);
    println!("Buys / Sells:   {} / {}", r.buy_count, r.sell_count);
    println!("Peak Holding:   {:.2}", r.max_holding_value);
    println!("Lowest Assets:  {:.2}", r.min_total_assets(c.total_capital));
    println!();
    println!("--- Final Position ---");
    println!("Shares:         {:.4}", r.total_shares);
    println!("Holding Value:  {:.2}", r.holding_value);
    println!("Cash:           {:.2}", r.remaining_capital);
    println!("Invested:       {:.2}", r.total_invested);
    println!("Total Assets:   {:.2}", r.total_assets);
    println!();
}
