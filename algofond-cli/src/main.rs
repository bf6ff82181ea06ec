//! Algofond CLI: index regime, equity scan, dashboard and paper trades.
//!
//! Commands:
//! - `index`: index indicators and the current regime signal
//! - `scan`: equity scanner lists (winners, losers, dividend leaders, value traps)
//! - `dashboard`: one full refresh: index, scan and ledger valuation
//! - `ledger record|show|reset|export|import`: paper-trading ledger in a CSV file

use algofond_core::data::{MarketDataProvider, SyntheticProvider, YahooProvider};
use algofond_core::domain::{AssetLabel, LEVERAGED_PROXY_LABEL};
use algofond_core::ledger::Valuation;
use algofond_core::{AssetSnapshot, Dashboard, DashboardConfig, IndexView, Ledger, ScanReport};
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;

#[derive(Parser)]
#[command(
    name = "algofond",
    about = "Algofond: index regime dashboard with a paper-trading ledger"
)]
struct Cli {
    /// Path to a TOML config file. Defaults to built-in settings.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Use deterministic synthetic data instead of Yahoo Finance.
    #[arg(long, global = true, default_value_t = false)]
    synthetic: bool,

    /// Print JSON instead of tables.
    #[arg(long, global = true, default_value_t = false)]
    json: bool,

    /// Ledger CSV file.
    #[arg(long, global = true, default_value = "algofond-ledger.csv")]
    ledger: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Index indicators and the current regime signal.
    Index {
        /// How many of the most recent indicator rows to print.
        #[arg(long, default_value_t = 10)]
        rows: usize,
    },
    /// Scan the equity universe.
    Scan,
    /// Full refresh: index, scan and ledger valuation.
    Dashboard,
    /// Paper-trading ledger commands.
    Ledger {
        #[command(subcommand)]
        action: LedgerAction,
    },
}

#[derive(Subcommand)]
enum LedgerAction {
    /// Record a simulated purchase at the current price.
    Record {
        /// Equity symbol (e.g. VOLV-B.ST), or `proxy` for the leveraged index certificate.
        #[arg(long)]
        asset: String,

        /// Number of units (minimum 1).
        #[arg(long, default_value_t = 1)]
        quantity: u32,

        /// Purchase price. Defaults to the live price.
        #[arg(long)]
        price: Option<f64>,
    },
    /// Value every entry at live prices.
    Show,
    /// Remove every entry.
    Reset {
        /// Actually clear (without this flag, only previews what would be removed).
        #[arg(long, default_value_t = false)]
        confirm: bool,
    },
    /// Write the ledger as CSV.
    Export {
        /// Output file. Defaults to stdout.
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Replace the ledger with the contents of a CSV file.
    Import {
        #[arg(long)]
        from: PathBuf,
    },
}

const DEFAULT_LOG_FILTER: &str = "algofond=info,algofond_core=info";

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Index { rows } => {
            let mut dash = build_dashboard(config, cli.synthetic)?;
            let view = dash.index_view(Instant::now());
            if cli.json {
                print_json(view)
            } else {
                print_index(view, rows);
                Ok(())
            }
        }
        Commands::Scan => {
            let mut dash = build_dashboard(config, cli.synthetic)?;
            let now = Instant::now();
            let report = dash.report(now);
            if cli.json {
                return print_json(&report);
            }
            print_report(&report);
            print_excluded(
                dash.scan(now)
                    .excluded
                    .iter()
                    .map(|e| (e.symbol.as_str(), e.reason.to_string())),
            );
            Ok(())
        }
        Commands::Dashboard => {
            let mut dash = build_dashboard(config, cli.synthetic)?;
            let ledger = load_ledger(&cli.ledger)?;
            let view = dash.refresh(&ledger, Instant::now());
            if cli.json {
                return print_json(&view);
            }
            println!("Provider: {}", view.provider);
            print_index(&view.index, 0);
            print_report(&view.report);
            print_excluded(
                view.excluded
                    .iter()
                    .map(|e| (e.symbol.as_str(), e.reason.clone())),
            );
            print_valuation(&view.valuation);
            Ok(())
        }
        Commands::Ledger { action } => {
            run_ledger(action, config, &cli.ledger, cli.synthetic, cli.json)
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<DashboardConfig> {
    match path {
        Some(path) => DashboardConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => Ok(DashboardConfig::default()),
    }
}

fn build_dashboard(config: DashboardConfig, synthetic: bool) -> Result<Dashboard> {
    let provider: Box<dyn MarketDataProvider> = if synthetic {
        Box::new(SyntheticProvider::today())
    } else {
        Box::new(YahooProvider::new().context("failed to build Yahoo Finance client")?)
    };
    info!(provider = provider.name(), "data provider ready");
    Ok(Dashboard::new(provider, config)?)
}

fn load_ledger(path: &Path) -> Result<Ledger> {
    Ledger::load_or_default(path)
        .with_context(|| format!("failed to read ledger {}", path.display()))
}

fn save_ledger(ledger: &Ledger, path: &Path) -> Result<()> {
    ledger
        .save(path)
        .with_context(|| format!("failed to write ledger {}", path.display()))
}

fn parse_asset(raw: &str) -> Result<AssetLabel> {
    let raw = raw.trim();
    if raw.is_empty() {
        bail!("--asset must not be empty");
    }
    if raw.eq_ignore_ascii_case("proxy") || raw == LEVERAGED_PROXY_LABEL {
        Ok(AssetLabel::LeveragedIndex)
    } else {
        Ok(AssetLabel::equity(raw))
    }
}

fn run_ledger(
    action: LedgerAction,
    config: DashboardConfig,
    path: &Path,
    synthetic: bool,
    json: bool,
) -> Result<()> {
    let mut ledger = load_ledger(path)?;

    match action {
        LedgerAction::Record {
            asset,
            quantity,
            price,
        } => {
            let asset = parse_asset(&asset)?;
            let price = match price {
                Some(p) if p.is_finite() && p > 0.0 => p,
                Some(p) => bail!("--price must be a positive number, got {p}"),
                None => build_dashboard(config, synthetic)?
                    .quote(&asset, Instant::now())
                    .with_context(|| format!("no live price for {asset}; pass --price"))?,
            };
            let entry = ledger.record(asset, quantity, price).clone();
            save_ledger(&ledger, path)?;
            if json {
                return print_json(&entry);
            }
            println!(
                "Recorded: {} x{} @ {:.2} (invested {:.2})",
                entry.asset, entry.quantity, entry.price, entry.invested
            );
        }
        LedgerAction::Show => {
            let mut dash = build_dashboard(config, synthetic)?;
            let valuation = dash.value_ledger(&ledger, Instant::now());
            if json {
                return print_json(&valuation);
            }
            print_valuation(&valuation);
        }
        LedgerAction::Reset { confirm } => {
            if ledger.is_empty() {
                println!("Ledger is already empty: {}", path.display());
                return Ok(());
            }
            println!("Ledger holds {} entries.", ledger.len());
            if !confirm {
                println!();
                println!("Dry run: pass --confirm to actually clear the ledger.");
                return Ok(());
            }
            ledger.reset();
            save_ledger(&ledger, path)?;
            println!("Ledger cleared.");
        }
        LedgerAction::Export { out } => match out {
            Some(out) => {
                ledger
                    .save(&out)
                    .with_context(|| format!("failed to export ledger to {}", out.display()))?;
                println!("Exported {} entries to {}", ledger.len(), out.display());
            }
            None => print!("{}", ledger.export_csv()?),
        },
        LedgerAction::Import { from } => {
            let data = std::fs::read_to_string(&from)
                .with_context(|| format!("failed to read {}", from.display()))?;
            let count = ledger.import_csv(&data).with_context(|| {
                format!("import from {} rejected; ledger unchanged", from.display())
            })?;
            save_ledger(&ledger, path)?;
            println!("Imported {count} entries; previous ledger replaced.");
        }
    }

    Ok(())
}

// ─── Output ─────────────────────────────────────────────────────────

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).context("failed to serialize output")?
    );
    Ok(())
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "YES"
    } else {
        "no"
    }
}

fn print_index(view: &IndexView, rows: usize) {
    println!();
    println!("=== Index Regime: {} ===", view.symbol);
    let Some(latest) = view.latest() else {
        println!("Signal:         {}", view.signal);
        println!("{}", view.signal.guidance());
        println!();
        return;
    };
    println!("Date:           {}", latest.date);
    println!("Close:          {:.2}", latest.close);
    println!("Volatility:     {:.2}", latest.volatility);
    println!("RSI(2):         {:.1}", latest.rsi);
    println!("Short MA:       {:.2}", latest.short_ma);
    println!("Long MA:        {:.2}", latest.long_ma);
    println!("Exit MA:        {:.2}", latest.exit_ma);
    println!();
    println!("--- Metrics ---");
    println!("Volatility panic: {}", yes_no(view.volatility_panic));
    println!("RSI buy zone:     {}", yes_no(view.rsi_buy_zone));
    println!("Sell signal:      {}", yes_no(view.sell_signal));
    println!();
    println!("Signal:         {}", view.signal);
    println!("{}", view.signal.guidance());

    if rows > 0 {
        println!();
        println!(
            "{:<12} {:>10} {:>8} {:>10} {:>10} {:>10} {:>6} {:>8} {:>6}",
            "Date", "Close", "Vol", "Short MA", "Long MA", "Exit MA", "RSI", "RiskOff", "Entry"
        );
        println!("{}", "-".repeat(88));
        let start = view.rows.len().saturating_sub(rows);
        for r in &view.rows[start..] {
            println!(
                "{:<12} {:>10.2} {:>8.2} {:>10.2} {:>10.2} {:>10.2} {:>6.1} {:>8} {:>6}",
                r.date.to_string(),
                r.close,
                r.volatility,
                r.short_ma,
                r.long_ma,
                r.exit_ma,
                r.rsi,
                yes_no(r.risk_off),
                yes_no(r.entry_signal)
            );
        }
    }
    println!();
}

fn print_snapshots(title: &str, list: &[AssetSnapshot]) {
    println!("--- {title} ---");
    if list.is_empty() {
        println!("(none)");
        println!();
        return;
    }
    println!(
        "{:<10} {:>10} {:>10} {:>9} {:>6} {:>6}",
        "Name", "Price", "3M %", "Yield %", "Trend", "Swing"
    );
    for s in list {
        println!(
            "{:<10} {:>10.2} {:>10.1} {:>9.2} {:>6} {:>6}",
            s.name,
            s.price,
            s.momentum_pct,
            s.dividend_yield_pct,
            format!("{:?}", s.trend),
            yes_no(s.swing_eligible)
        );
    }
    println!();
}

fn print_report(report: &ScanReport) {
    println!("=== Equity Scan ===");
    print_snapshots("Winners (swing-eligible, strongest first)", &report.winners);
    print_snapshots("Losers (weakest first)", &report.losers);
    print_snapshots("Dividend leaders (uptrend)", &report.dividend_leaders);
    print_snapshots("Value traps (downtrend, high yield)", &report.value_traps);
}

fn print_excluded<'a>(excluded: impl Iterator<Item = (&'a str, String)>) {
    for (symbol, reason) in excluded {
        println!("Excluded: {symbol} ({reason})");
    }
}

fn print_valuation(valuation: &Valuation) {
    println!("=== Paper Trades ===");
    if valuation.is_empty() {
        println!("(no entries)");
        println!();
        return;
    }
    println!(
        "{:<20} {:<14} {:>10} {:>6} {:>12} {:>10} {:>9} {:>12}",
        "Datum", "Tillgång", "Köpkurs", "Antal", "Investerat", "Live", "Return", "Profit"
    );
    println!("{}", "-".repeat(100));
    for row in &valuation.rows {
        let e = &row.entry;
        println!(
            "{:<20} {:<14} {:>10.2} {:>6} {:>12.2} {:>10.2} {:>8.2}% {:>12.2}{}",
            e.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            e.asset.to_string(),
            e.price,
            e.quantity,
            e.invested,
            row.live_price,
            row.return_pct(),
            row.profit,
            if row.price_resolved { "" } else { "  (no live price)" }
        );
    }
    println!();
    println!("Total invested: {:.2}", valuation.total_invested);
    println!(
        "Total P/L:      {:.2} ({:.2}%)",
        valuation.total_profit,
        valuation.total_return_ratio() * 100.0
    );
    println!();
}
