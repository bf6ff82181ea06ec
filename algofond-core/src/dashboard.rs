//! Dashboard refresh: wires together provider, engine, scanner and ledger.
//!
//! One [`Dashboard`] owns the data provider, the configuration and two TTL
//! caches (index data and equity batch). Each access recomputes from freshly
//! fetched data once the relevant cache has expired. The ledger is borrowed
//! for valuation only and never mutated here.

use crate::cache::TtlCache;
use crate::config::{ConfigError, DashboardConfig, IndexSettings};
use crate::data::{fetch_or_empty, MarketDataProvider};
use crate::domain::AssetLabel;
use crate::ledger::{Ledger, PriceLookup, Valuation};
use crate::regime::{classify_latest, IndicatorEngine, IndicatorRow, RegimeConfig, Signal};
use crate::scanner::{scan_universe, ScanBatch, ScanReport};
use serde::Serialize;
use std::time::Instant;
use tracing::info;

/// Index regime as of the latest row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexView {
    pub symbol: String,
    /// Every post-warm-up row, oldest first.
    pub rows: Vec<IndicatorRow>,
    pub signal: Signal,
    /// Last raw index close, defined even while the indicators are warming up.
    pub last_close: Option<f64>,
    pub volatility_panic: bool,
    pub rsi_buy_zone: bool,
    pub sell_signal: bool,
}

impl IndexView {
    pub fn build(
        symbol: impl Into<String>,
        rows: Vec<IndicatorRow>,
        last_close: Option<f64>,
        config: &RegimeConfig,
    ) -> Self {
        let signal = classify_latest(&rows, config);
        let latest = rows.last();
        Self {
            symbol: symbol.into(),
            signal,
            last_close,
            volatility_panic: latest.is_some_and(|r| r.volatility_panic(config)),
            rsi_buy_zone: latest.is_some_and(|r| r.rsi_buy_zone(config)),
            sell_signal: latest.is_some_and(IndicatorRow::sell_signal),
            rows,
        }
    }

    pub fn latest(&self) -> Option<&IndicatorRow> {
        self.rows.last()
    }
}

/// Symbol dropped from the scan, with the reason as text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExcludedView {
    pub symbol: String,
    pub reason: String,
}

/// Everything the presentation layer needs for one refresh.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub provider: String,
    pub index: IndexView,
    pub report: ScanReport,
    pub excluded: Vec<ExcludedView>,
    pub valuation: Valuation,
}

/// Live prices for valuation: the proxy follows the index close, equities
/// their latest scanned price.
pub struct LivePrices<'a> {
    pub index_close: Option<f64>,
    pub batch: &'a ScanBatch,
}

impl PriceLookup for LivePrices<'_> {
    fn live_price(&self, asset: &AssetLabel) -> Option<f64> {
        match asset {
            AssetLabel::LeveragedIndex => self.index_close,
            AssetLabel::Equity(symbol) => self.batch.find(symbol).map(|s| s.price),
        }
    }
}

pub struct Dashboard {
    provider: Box<dyn MarketDataProvider>,
    config: DashboardConfig,
    engine: IndicatorEngine,
    index_cache: TtlCache<IndexView>,
    scan_cache: TtlCache<ScanBatch>,
}

impl Dashboard {
    /// Validates the configuration before any engine is built.
    pub fn new(
        provider: Box<dyn MarketDataProvider>,
        config: DashboardConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            engine: IndicatorEngine::new(config.regime.clone()),
            index_cache: TtlCache::new(config.index.cache_ttl()),
            scan_cache: TtlCache::new(config.scanner.cache_ttl()),
            provider,
            config,
        })
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Index regime, refetched once the index cache expires.
    pub fn index_view(&mut self, now: Instant) -> &IndexView {
        let provider = self.provider.as_ref();
        let settings = &self.config.index;
        let engine = &self.engine;
        self.index_cache
            .get_or_refresh(now, || load_index(provider, settings, engine))
    }

    /// Equity scan, refetched once the scan cache expires.
    pub fn scan(&mut self, now: Instant) -> &ScanBatch {
        let provider = self.provider.as_ref();
        let settings = &self.config.scanner;
        self.scan_cache.get_or_refresh(now, || {
            let tickers = settings.universe.all_tickers();
            scan_universe(provider, &tickers, settings.period, &settings.rules)
        })
    }

    /// Partitioned scan using the configured display limits.
    pub fn report(&mut self, now: Instant) -> ScanReport {
        let limits = self.config.scanner.limits.clone();
        ScanReport::from_batch(self.scan(now), &limits)
    }

    /// Current price for a ledger asset, if the data has one.
    pub fn quote(&mut self, asset: &AssetLabel, now: Instant) -> Option<f64> {
        match asset {
            AssetLabel::LeveragedIndex => self.index_view(now).last_close,
            AssetLabel::Equity(symbol) => self.scan(now).find(symbol).map(|s| s.price),
        }
    }

    /// Value the ledger against the current index close and scan prices.
    pub fn value_ledger(&mut self, ledger: &Ledger, now: Instant) -> Valuation {
        let index_close = self.index_view(now).last_close;
        let leverage = self.config.ledger.leverage;
        let prices = LivePrices {
            index_close,
            batch: self.scan(now),
        };
        ledger.value(&prices, leverage)
    }

    /// One full refresh pass.
    pub fn refresh(&mut self, ledger: &Ledger, now: Instant) -> DashboardView {
        let index = self.index_view(now).clone();
        let report = self.report(now);
        let leverage = self.config.ledger.leverage;
        let batch = self.scan(now);
        let excluded = batch
            .excluded
            .iter()
            .map(|e| ExcludedView {
                symbol: e.symbol.clone(),
                reason: e.reason.to_string(),
            })
            .collect();
        let prices = LivePrices {
            index_close: index.last_close,
            batch,
        };
        let valuation = ledger.value(&prices, leverage);

        info!(
            signal = %index.signal,
            rows = index.rows.len(),
            winners = report.winners.len(),
            ledger_entries = ledger.len(),
            total_profit = valuation.total_profit,
            "dashboard refreshed"
        );

        DashboardView {
            provider: self.provider.name().to_string(),
            index,
            report,
            excluded,
            valuation,
        }
    }

    /// Drop both caches so the next access refetches.
    pub fn invalidate(&mut self) {
        self.index_cache.invalidate();
        self.scan_cache.invalidate();
    }
}

fn load_index(
    provider: &dyn MarketDataProvider,
    settings: &IndexSettings,
    engine: &IndicatorEngine,
) -> IndexView {
    let index = fetch_or_empty(provider, &settings.symbol, settings.period);
    let volatility = fetch_or_empty(provider, &settings.volatility_symbol, settings.period);
    let rows = engine.compute(&index, &volatility);
    let view = IndexView::build(
        settings.symbol.clone(),
        rows,
        index.last().map(|p| p.close),
        engine.config(),
    );
    info!(
        symbol = %settings.symbol,
        rows = view.rows.len(),
        signal = %view.signal,
        "index refreshed"
    );
    view
}
