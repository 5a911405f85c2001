use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use indicator_engine::data::synthetic::generate_bars_ending;
use indicator_engine::{
    AtrResult, BarProvider, EmaResult, ExtremesResult, FileBarProvider, IndicatorConfig,
    IndicatorService, Interval, MacdResult, MemoryBarProvider, PivotPointsResult, RsiResult,
    SupportResistanceResult, TrendlineResult,
};

#[derive(Parser, Debug)]
#[command(name = "indicator-engine")]
#[command(version = "0.1.0")]
#[command(about = "Technical indicators and structural price levels from OHLCV bars", long_about = None)]
struct Args {
    /// Directory holding <SYMBOL>_<interval>.csv|json files. Synthetic data is used when omitted.
    #[arg(short = 'd', long, global = true)]
    data_dir: Option<PathBuf>,

    /// Symbol to analyse
    #[arg(short, long, default_value = "SPY", global = true)]
    symbol: String,

    /// Bar interval (1m, 5m, 15m, 30m, 1h, 1d, 1wk, 1mo)
    #[arg(short, long, default_value = "1d", global = true)]
    interval: Interval,

    /// TOML file overriding default indicator parameters
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Number of synthetic bars to generate
    #[arg(long, default_value = "400", global = true)]
    synthetic_days: usize,

    /// Seed for synthetic data
    #[arg(long, default_value = "42", global = true)]
    seed: u64,

    /// Initial price for synthetic data
    #[arg(long, default_value = "100.0", global = true)]
    initial_price: f64,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Output::Json, global = true)]
    output: Output,

    /// Pretty print JSON output
    #[arg(long, global = true)]
    pretty: bool,

    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Average True Range
    Atr {
        #[arg(long)]
        period: Option<usize>,
    },
    /// Exponential Moving Average, one or more periods from a single fetch
    Ema {
        #[arg(long, value_delimiter = ',')]
        periods: Vec<usize>,
    },
    /// Relative Strength Index
    Rsi {
        #[arg(long)]
        period: Option<usize>,
    },
    /// MACD line, signal and histogram
    Macd {
        #[arg(long)]
        fast: Option<usize>,
        #[arg(long)]
        slow: Option<usize>,
        #[arg(long)]
        signal: Option<usize>,
    },
    /// Floor-trader pivot points from the last completed bar
    Pivots,
    /// Clustered support/resistance zones
    Levels {
        #[arg(long)]
        lookback_days: Option<i64>,
        #[arg(long)]
        tolerance: Option<f64>,
    },
    /// Two-point support and resistance trendlines
    Trendlines {
        #[arg(long)]
        lookback_days: Option<i64>,
        #[arg(long)]
        max_lines: Option<usize>,
    },
    /// All-time or 52-week high/low
    Extremes {
        /// Restrict to the trailing 52 weeks
        #[arg(long)]
        fifty_two_week: bool,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Output {
    Json,
    Text,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Report {
    Atr(AtrResult),
    Ema(Vec<EmaResult>),
    Rsi(RsiResult),
    Macd(MacdResult),
    Pivots(PivotPointsResult),
    Levels(SupportResistanceResult),
    Trendlines(TrendlineResult),
    Extremes(ExtremesResult),
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(args.log_level.as_str()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = match &args.config {
        Some(path) => IndicatorConfig::from_toml_file(path)?,
        None => IndicatorConfig::default(),
    };

    let provider: Box<dyn BarProvider> = match &args.data_dir {
        Some(dir) => Box::new(FileBarProvider::new(dir)),
        None => {
            let mut provider = MemoryBarProvider::new();
            let bars = generate_bars_ending(
                args.synthetic_days,
                args.initial_price,
                args.seed,
                Utc::now(),
                args.interval,
            );
            provider.insert(&args.symbol, args.interval, bars);
            // Extremes always read daily bars
            if args.interval != Interval::Day1 {
                let daily = generate_bars_ending(
                    args.synthetic_days,
                    args.initial_price,
                    args.seed,
                    Utc::now(),
                    Interval::Day1,
                );
                provider.insert(&args.symbol, Interval::Day1, daily);
            }
            Box::new(provider)
        }
    };

    let service = IndicatorService::with_config(provider, config);
    let report = run(&service, &args)
        .await
        .with_context(|| {
            format!(
                "{} failed for {} {}",
                command_name(&args.command),
                args.symbol,
                args.interval
            )
        })?;

    match args.output {
        Output::Json => {
            let json = if args.pretty {
                serde_json::to_string_pretty(&report)?
            } else {
                serde_json::to_string(&report)?
            };
            println!("{}", json);
        }
        Output::Text => print_text_report(&report),
    }

    Ok(())
}

async fn run(service: &IndicatorService<Box<dyn BarProvider>>, args: &Args) -> Result<Report> {
    let cfg = service.config().clone();
    let symbol = args.symbol.as_str();
    let interval = args.interval;

    let report = match &args.command {
        Command::Atr { period } => Report::Atr(
            service
                .atr(symbol, interval, period.unwrap_or(cfg.atr_period))
                .await?,
        ),
        Command::Ema { periods } => {
            let periods = if periods.is_empty() {
                vec![cfg.ema_period]
            } else {
                periods.clone()
            };
            Report::Ema(service.ema_multi(symbol, interval, &periods).await?)
        }
        Command::Rsi { period } => Report::Rsi(
            service
                .rsi(symbol, interval, period.unwrap_or(cfg.rsi_period))
                .await?,
        ),
        Command::Macd { fast, slow, signal } => Report::Macd(
            service
                .macd(
                    symbol,
                    interval,
                    fast.unwrap_or(cfg.macd_fast),
                    slow.unwrap_or(cfg.macd_slow),
                    signal.unwrap_or(cfg.macd_signal),
                )
                .await?,
        ),
        Command::Pivots => Report::Pivots(service.pivot_points(symbol, interval).await?),
        Command::Levels {
            lookback_days,
            tolerance,
        } => Report::Levels(
            service
                .support_resistance(
                    symbol,
                    interval,
                    lookback_days.unwrap_or(cfg.levels_lookback_days),
                    tolerance.unwrap_or(cfg.zone_tolerance),
                )
                .await?,
        ),
        Command::Trendlines {
            lookback_days,
            max_lines,
        } => Report::Trendlines(
            service
                .trendlines(
                    symbol,
                    interval,
                    lookback_days.unwrap_or(cfg.levels_lookback_days),
                    max_lines.unwrap_or(cfg.max_trendlines),
                )
                .await?,
        ),
        Command::Extremes { fifty_two_week } => Report::Extremes(if *fifty_two_week {
            service.fifty_two_week_extremes(symbol).await?
        } else {
            service.all_time_extremes(symbol).await?
        }),
    };

    Ok(report)
}

fn command_name(command: &Command) -> &'static str {
    match command {
        Command::Atr { .. } => "ATR",
        Command::Ema { .. } => "EMA",
        Command::Rsi { .. } => "RSI",
        Command::Macd { .. } => "MACD",
        Command::Pivots => "pivot points",
        Command::Levels { .. } => "support/resistance",
        Command::Trendlines { .. } => "trendlines",
        Command::Extremes { .. } => "extremes",
    }
}

fn print_text_report(report: &Report) {
    println!();
    match report {
        Report::Atr(r) => {
            println!("  {} {} ATR({})", r.symbol, r.interval, r.period);
            println!("  Value:            {:>14.6}", r.value);
        }
        Report::Ema(results) => {
            for r in results {
                println!("  {} {} EMA({:>3}):  {:>14.6}", r.symbol, r.interval, r.period, r.value);
            }
        }
        Report::Rsi(r) => {
            println!("  {} {} RSI({})", r.symbol, r.interval, r.period);
            println!("  Value:            {:>14.2}", r.value);
            println!("  Signal:           {:>14}", format!("{:?}", r.signal));
        }
        Report::Macd(r) => {
            println!(
                "  {} {} MACD({}, {}, {})",
                r.symbol, r.interval, r.fast_period, r.slow_period, r.signal_period
            );
            println!("  MACD:             {:>14.6}", r.macd);
            println!("  Signal:           {:>14.6}", r.signal);
            println!("  Histogram:        {:>14.6}", r.histogram);
        }
        Report::Pivots(r) => {
            let l = &r.levels;
            println!(
                "  {} {} pivot points from {}",
                r.symbol,
                r.interval,
                r.source_date.format("%Y-%m-%d %H:%M")
            );
            for (name, value) in [
                ("R3", l.r3),
                ("R2", l.r2),
                ("R1", l.r1),
                ("PP", l.pp),
                ("S1", l.s1),
                ("S2", l.s2),
                ("S3", l.s3),
            ] {
                println!("  {}:               {:>14.6}", name, value);
            }
        }
        Report::Levels(r) => {
            println!(
                "  {} {} support/resistance over {} bars (last close {:.4})",
                r.symbol, r.interval, r.bars_analyzed, r.current_price
            );
            println!("----------------------------------------------------------------");
            println!("  {:>12}  {:>7}  {:>10}  {:>8}", "Level", "Touches", "Sup/Res", "Strength");
            for z in &r.zones {
                println!(
                    "  {:>12.4}  {:>7}  {:>4}/{:<5}  {:>8.3}",
                    z.level, z.total_touches, z.support_count, z.resistance_count, z.strength
                );
            }
            if let Some(s) = r.nearest_support {
                println!("  Nearest support:    {:.4}", s);
            }
            if let Some(s) = r.nearest_resistance {
                println!("  Nearest resistance: {:.4}", s);
            }
        }
        Report::Trendlines(r) => {
            println!(
                "  {} {} trendlines over {} bars (last close {:.4})",
                r.symbol, r.interval, r.bars_analyzed, r.current_price
            );
            let last = r.bars_analyzed.saturating_sub(1);
            for (title, lines) in [("SUPPORT", &r.support), ("RESISTANCE", &r.resistance)] {
                println!("----------------------------------------------------------------");
                println!("  {}", title);
                for l in lines {
                    println!(
                        "  {} -> {}  slope {:+.4}  now {:.4}  strength {:.3}",
                        l.point1.timestamp.format("%Y-%m-%d"),
                        l.point2.timestamp.format("%Y-%m-%d"),
                        l.slope,
                        l.price_at(last),
                        l.strength
                    );
                }
            }
        }
        Report::Extremes(r) => {
            println!("  {} {:?} extremes", r.symbol, r.window);
            println!(
                "  High:             {:>14.4}  on {}",
                r.extremes.high,
                r.extremes.high_date.format("%Y-%m-%d")
            );
            println!(
                "  Low:              {:>14.4}  on {}",
                r.extremes.low,
                r.extremes.low_date.format("%Y-%m-%d")
            );
        }
    }
    println!();
}
