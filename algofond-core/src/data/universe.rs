//! Universe configuration: sector-organized ticker lists.
//!
//! The scanner universe lives in the TOML config under
//! `[scanner.universe.sectors]`, one array of Yahoo tickers per sector.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The complete scanner universe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Universe {
    pub sectors: BTreeMap<String, Vec<String>>,
}

impl Universe {
    /// All tickers across all sectors, in sector order, without duplicates.
    pub fn all_tickers(&self) -> Vec<&str> {
        let mut seen = std::collections::HashSet::new();
        self.sectors
            .values()
            .flat_map(|tickers| tickers.iter().map(|t| t.as_str()))
            .filter(|t| seen.insert(*t))
            .collect()
    }

    /// Total number of distinct tickers.
    pub fn ticker_count(&self) -> usize {
        self.all_tickers().len()
    }

    /// The default universe: twenty Stockholm large caps.
    pub fn default_omxs() -> Self {
        fn tickers(list: &[&str]) -> Vec<String> {
            list.iter().map(|t| t.to_string()).collect()
        }

        let mut sectors = BTreeMap::new();
        sectors.insert(
            "Industrials".into(),
            tickers(&[
                "ABB.ST", "ALFA.ST", "ASSA-B.ST", "ATCO-A.ST", "HEXA-B.ST", "NIBE-B.ST",
                "SAAB-B.ST", "SAND.ST", "VOLV-B.ST",
            ]),
        );
        sectors.insert(
            "Financials".into(),
            tickers(&["INVE-B.ST", "SEB-A.ST", "SHB-A.ST", "SWED-A.ST"]),
        );
        sectors.insert("Consumer".into(), tickers(&["EVO.ST", "HM-B.ST"]));
        sectors.insert("Materials".into(), tickers(&["BOL.ST", "SCA-B.ST"]));
        sectors.insert("Healthcare".into(), tickers(&["AZN.ST"]));
        sectors.insert("Technology".into(), tickers(&["ERIC-B.ST"]));
        sectors.insert("Telecom".into(), tickers(&["TELIA.ST"]));

        Self { sectors }
    }
}

impl Default for Universe {
    fn default() -> Self {
        Self::default_omxs()
    }
}
