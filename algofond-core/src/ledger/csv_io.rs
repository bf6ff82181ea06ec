//! Ledger CSV persistence.
//!
//! Layout: one header row `Datum,Tillgång,Köpkurs,Antal,Investerat`, then one
//! row per entry in ledger order. Floats are written in shortest round-trip
//! form so `import(export(l)) == l`.

use super::{Ledger, LedgerEntry, LedgerError};
use crate::domain::AssetLabel;
use chrono::NaiveDateTime;
use std::io::{Read, Write};
use std::path::Path;
use tracing::info;

/// Column names, in export order.
pub const CSV_HEADER: [&str; 5] = ["Datum", "Tillgång", "Köpkurs", "Antal", "Investerat"];

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const ACCEPTED_TIMESTAMP_FORMATS: [&str; 3] =
    ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

impl Ledger {
    /// Write the ledger as CSV.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), LedgerError> {
        let mut wtr = csv::Writer::from_writer(writer);
        wtr.write_record(CSV_HEADER)?;
        for e in self.entries() {
            wtr.write_record([
                e.timestamp.format(TIMESTAMP_FORMAT).to_string(),
                e.asset.to_string(),
                e.price.to_string(),
                e.quantity.to_string(),
                e.invested.to_string(),
            ])?;
        }
        wtr.flush().map_err(|e| LedgerError::Csv(e.into()))?;
        Ok(())
    }

    /// Render the ledger as a CSV string.
    pub fn export_csv(&self) -> Result<String, LedgerError> {
        let mut buf = Vec::new();
        self.write_csv(&mut buf)?;
        String::from_utf8(buf).map_err(|e| LedgerError::MalformedRow {
            row: 0,
            reason: format!("export is not valid UTF-8: {e}"),
        })
    }

    /// Replace every entry with the contents of a CSV table.
    ///
    /// Columns are matched by header name in any order; extra columns are
    /// ignored. On any error the ledger is left untouched.
    pub fn read_csv<R: Read>(&mut self, reader: R) -> Result<usize, LedgerError> {
        let entries = parse_entries(reader)?;
        let count = entries.len();
        self.entries = entries;
        info!(entries = count, "ledger imported");
        Ok(count)
    }

    pub fn import_csv(&mut self, data: &str) -> Result<usize, LedgerError> {
        self.read_csv(data.as_bytes())
    }

    /// Load a ledger file; a missing file is an empty ledger.
    pub fn load_or_default(path: &Path) -> Result<Self, LedgerError> {
        if !path.exists() {
            return Ok(Self::new());
        }
        let file = std::fs::File::open(path).map_err(|source| LedgerError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut ledger = Self::new();
        ledger.read_csv(file)?;
        Ok(ledger)
    }

    /// Save the ledger, creating parent directories if needed.
    pub fn save(&self, path: &Path) -> Result<(), LedgerError> {
        let io_err = |source| LedgerError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let file = std::fs::File::create(path).map_err(io_err)?;
        self.write_csv(file)
    }
}

fn parse_entries<R: Read>(reader: R) -> Result<Vec<LedgerEntry>, LedgerError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let position = |name: &str| headers.iter().position(|h| h == name);
    let columns: Vec<Option<usize>> = CSV_HEADER.iter().map(|name| position(name)).collect();
    let missing: Vec<String> = CSV_HEADER
        .iter()
        .zip(&columns)
        .filter(|(_, col)| col.is_none())
        .map(|(name, _)| name.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(LedgerError::MissingColumns { missing });
    }
    let columns: Vec<usize> = columns.into_iter().flatten().collect();

    let mut entries = Vec::new();
    for (i, record) in rdr.records().enumerate() {
        let row = i + 1;
        let record = record?;
        let field = |col: usize| record.get(columns[col]).unwrap_or("");
        let malformed = |reason: String| LedgerError::MalformedRow { row, reason };

        let timestamp = parse_timestamp(field(0))
            .ok_or_else(|| malformed(format!("bad timestamp {:?}", field(0))))?;
        let asset = AssetLabel::from(field(1).to_string());
        let price = parse_number(field(2))
            .ok_or_else(|| malformed(format!("bad price {:?}", field(2))))?;
        let quantity = parse_quantity(field(3))
            .ok_or_else(|| malformed(format!("bad quantity {:?}", field(3))))?;
        let invested = parse_number(field(4))
            .ok_or_else(|| malformed(format!("bad invested amount {:?}", field(4))))?;

        entries.push(LedgerEntry {
            timestamp,
            asset,
            price,
            quantity,
            invested,
        });
    }
    Ok(entries)
}

fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    ACCEPTED_TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
}

fn parse_number(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Whole quantities, also when written as `10.0`. Zero is raised to 1, as
/// when recording.
fn parse_quantity(s: &str) -> Option<u32> {
    let quantity = match s.trim().parse::<u32>() {
        Ok(q) => q,
        Err(_) => {
            let v = parse_number(s)?;
            if v < 0.0 || v.fract() != 0.0 || v > u32::MAX as f64 {
                return None;
            }
            v as u32
        }
    };
    Some(quantity.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample() -> Ledger {
        let day = NaiveDate::from_ymd_opt(2024, 5, 2).unwrap();
        let mut ledger = Ledger::new();
        ledger.record_at(
            day.and_hms_opt(9, 30, 0).unwrap(),
            AssetLabel::LeveragedIndex,
            10,
            2_431.37,
        );
        ledger.record_at(
            day.and_hms_opt(9, 31, 12).unwrap(),
            AssetLabel::equity("ERIC-B.ST"),
            7,
            0.1 + 0.2,
        );
        ledger
    }

    #[test]
    fn export_starts_with_fixed_header() {
        let csv = sample().export_csv().unwrap();
        let first = csv.lines().next().unwrap();
        assert_eq!(first, "Datum,Tillgång,Köpkurs,Antal,Investerat");
        assert_eq!(csv.lines().count(), 3);
        assert!(csv.contains("2024-05-02 09:30:00,BULL OMX X3,2431.37,10,"));
    }

    #[test]
    fn round_trip_preserves_entries() {
        let original = sample();
        let csv = original.export_csv().unwrap();
        let mut restored = Ledger::new();
        assert_eq!(restored.import_csv(&csv).unwrap(), 2);
        assert_eq!(restored, original);
    }

    #[test]
    fn import_replaces_rather_than_merges() {
        let csv = sample().export_csv().unwrap();
        let mut ledger = sample();
        ledger.record_at(
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap().and_hms_opt(12, 0, 0).unwrap(),
            AssetLabel::equity("ABB.ST"),
            1,
            500.0,
        );
        ledger.import_csv(&csv).unwrap();
        assert_eq!(ledger, sample());
    }

    #[test]
    fn label_with_comma_is_quoted() {
        let mut ledger = Ledger::new();
        ledger.record_at(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap(),
            AssetLabel::equity("ODD,NAME"),
            1,
            1.0,
        );
        let csv = ledger.export_csv().unwrap();
        assert!(csv.contains("\"ODD,NAME\""));
        let mut back = Ledger::new();
        back.import_csv(&csv).unwrap();
        assert_eq!(back, ledger);
    }

    #[test]
    fn missing_columns_leave_ledger_unchanged() {
        let mut ledger = sample();
        let err = ledger
            .import_csv("Datum,Tillgång,Antal\n2024-01-01 00:00:00,ABB.ST,1\n")
            .unwrap_err();
        match err {
            LedgerError::MissingColumns { missing } => {
                assert_eq!(missing, vec!["Köpkurs".to_string(), "Investerat".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(ledger, sample());
    }

    #[test]
    fn malformed_row_leaves_ledger_unchanged() {
        let mut ledger = sample();
        let data = "Datum,Tillgång,Köpkurs,Antal,Investerat\n\
                    2024-01-01 10:00:00,ABB.ST,100,2,200\n\
                    not-a-date,ABB.ST,100,2,200\n";
        let err = ledger.import_csv(data).unwrap_err();
        assert!(matches!(err, LedgerError::MalformedRow { row: 2, .. }));
        assert_eq!(ledger, sample());
    }

    #[test]
    fn reordered_columns_and_minute_timestamps_are_accepted() {
        let data = "Antal,Investerat,Datum,Köpkurs,Tillgång,Note\n\
                    3.0,300,2024-01-01 10:00,100,BULL OMX X3,first\n";
        let mut ledger = Ledger::new();
        ledger.import_csv(data).unwrap();
        let e = &ledger.entries()[0];
        assert!(e.asset.is_leveraged());
        assert_eq!(e.quantity, 3);
        assert_eq!(e.invested, 300.0);
        assert_eq!(e.timestamp.format(TIMESTAMP_FORMAT).to_string(), "2024-01-01 10:00:00");
    }

    #[test]
    fn header_only_imports_empty_ledger() {
        let mut ledger = sample();
        assert_eq!(ledger.import_csv("Datum,Tillgång,Köpkurs,Antal,Investerat\n").unwrap(), 0);
        assert!(ledger.is_empty());
    }

    #[test]
    fn padded_labels_survive_the_round_trip() {
        let mut ledger = Ledger::new();
        let ts = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap().and_hms_opt(9, 0, 0).unwrap();
        ledger.record_at(ts, AssetLabel::equity(" ABB.ST "), 1, 10.0);
        ledger.record_at(ts, AssetLabel::equity(" BULL OMX X3"), 1, 10.0);

        let mut back = Ledger::new();
        back.import_csv(&ledger.export_csv().unwrap()).unwrap();
        assert_eq!(back.entries()[0].asset, AssetLabel::equity(" ABB.ST "));
        assert!(!back.entries()[1].asset.is_leveraged());
        assert_eq!(back, ledger);
    }

    #[test]
    fn ledger_with_non_finite_price_reloads() {
        let mut ledger = Ledger::new();
        let ts = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap().and_hms_opt(9, 0, 0).unwrap();
        ledger.record_at(ts, AssetLabel::equity("ABB.ST"), 3, f64::NAN);

        let mut back = Ledger::new();
        assert_eq!(back.import_csv(&ledger.export_csv().unwrap()).unwrap(), 1);
        assert_eq!(back, ledger);
    }

    #[test]
    fn sub_second_timestamps_from_entries_round_trip() {
        let ts = NaiveDate::from_ymd_opt(2024, 2, 1)
            .unwrap()
            .and_hms_milli_opt(9, 0, 0, 500)
            .unwrap();
        let ledger = Ledger::from_entries(vec![LedgerEntry {
            timestamp: ts,
            asset: AssetLabel::equity("ABB.ST"),
            price: 10.0,
            quantity: 1,
            invested: 10.0,
        }]);

        let mut back = Ledger::new();
        back.import_csv(&ledger.export_csv().unwrap()).unwrap();
        assert_eq!(back, ledger);
    }

    #[test]
    fn zero_quantity_is_raised_to_one() {
        let data = "Datum,Tillgång,Köpkurs,Antal,Investerat\n\
                    2024-01-01 10:00:00,ABB.ST,100,0,0\n\
                    2024-01-01 10:01:00,ABB.ST,100,0.0,0\n";
        let mut ledger = Ledger::new();
        ledger.import_csv(data).unwrap();
        assert!(ledger.entries().iter().all(|e| e.quantity == 1));
    }

    #[test]
    fn header_names_are_trimmed() {
        let data = " Datum , Tillgång ,Köpkurs,Antal,Investerat\n\
                    2024-01-01 10:00:00,ABB.ST,100,2,200\n";
        let mut ledger = Ledger::new();
        assert_eq!(ledger.import_csv(data).unwrap(), 1);
        assert_eq!(ledger.entries()[0].asset, AssetLabel::equity("ABB.ST"));
    }
}
