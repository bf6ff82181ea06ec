//! Algofond Core: index regime engine, equity scanner and paper-trading ledger.
//!
//! This crate contains everything the dashboard computes:
//! - Domain types (price series, asset labels)
//! - Market data gateway trait with Yahoo Finance and synthetic providers
//! - Indicator engine (SMA, Wilder-style RSI(2), composite regime flags)
//! - Signal classifier with a strict priority order
//! - Per-asset scanner with explicit per-symbol exclusions
//! - Session-owned paper-trading ledger with CSV round-trip
//! - TTL caching and the dashboard refresh pass that ties it together

pub mod cache;
pub mod config;
pub mod dashboard;
pub mod data;
pub mod domain;
pub mod indicators;
pub mod ledger;
pub mod regime;
pub mod scanner;

pub use config::{ConfigError, DashboardConfig};
pub use dashboard::{Dashboard, DashboardView, IndexView};
pub use ledger::{Ledger, LedgerEntry, LedgerError, Valuation};
pub use regime::{IndicatorEngine, IndicatorRow, RegimeConfig, Signal};
pub use scanner::{AssetSnapshot, ScanBatch, ScanReport};
