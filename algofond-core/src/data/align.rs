//! Two-series time alignment.
//!
//! The index and volatility series come from different exchanges with
//! different holidays. The engine works on their inner join: only dates on
//! which both have a close survive. No forward-fill.

use crate::domain::PriceSeries;
use chrono::NaiveDate;
use std::collections::HashMap;

/// Index and volatility closes on a common timeline.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JoinedSeries {
    /// The common date axis (sorted ascending).
    pub dates: Vec<NaiveDate>,
    /// Index closes, same length as `dates`.
    pub index: Vec<f64>,
    /// Volatility closes, same length as `dates`.
    pub volatility: Vec<f64>,
}

impl JoinedSeries {
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

/// Inner-join two series on date.
///
/// Either input being empty yields an empty result.
pub fn inner_join(index: &PriceSeries, volatility: &PriceSeries) -> JoinedSeries {
    let vol_by_date: HashMap<NaiveDate, f64> = volatility
        .points()
        .iter()
        .map(|p| (p.date, p.close))
        .collect();

    let mut joined = JoinedSeries::default();
    for point in index.points() {
        if let Some(&vol) = vol_by_date.get(&point.date) {
            joined.dates.push(point.date);
            joined.index.push(point.close);
            joined.volatility.push(vol);
        }
    }
    joined
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn join_drops_dates_missing_on_either_side() {
        let omx = PriceSeries::from_pairs(
            "^OMX",
            &[
                (date("2024-01-02"), 100.0),
                (date("2024-01-03"), 101.0),
                (date("2024-01-04"), 102.0),
            ],
        );
        let vix = PriceSeries::from_pairs(
            "^VIX",
            &[
                (date("2024-01-02"), 14.0),
                // VIX missing 2024-01-03
                (date("2024-01-04"), 15.0),
                (date("2024-01-05"), 16.0),
            ],
        );

        let joined = inner_join(&omx, &vix);

        assert_eq!(joined.dates, vec![date("2024-01-02"), date("2024-01-04")]);
        assert_eq!(joined.index, vec![100.0, 102.0]);
        assert_eq!(joined.volatility, vec![14.0, 15.0]);
    }

    #[test]
    fn empty_side_yields_empty_join() {
        let omx = PriceSeries::from_pairs("^OMX", &[(date("2024-01-02"), 100.0)]);
        let vix = PriceSeries::empty("^VIX");
        assert!(inner_join(&omx, &vix).is_empty());
        assert!(inner_join(&vix, &omx).is_empty());
    }
}
