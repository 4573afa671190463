//! Bulk-loading a [`MatchingEngine`](crate::engine::MatchingEngine) from a
//! CSV file.
//!
//! Uses the `csv` crate for quoting-safe record splitting, and skips past a
//! malformed row rather than aborting the whole load -- a bulk loader that
//! discards an entire population because of one bad row is poor
//! operational behavior.

use crate::engine::MatchingEngine;
use crate::error::Error;
use crate::person::{GeoPosition, Person, PersonId};
use chrono::NaiveDate;
use std::io::Read;
use uuid::Uuid;

/// How many rows loaded cleanly, and which rows (1-based; the file has no
/// header, so row 1 is the first data row) were skipped and why.
#[derive(Debug, Default)]
pub struct LoadSummary {
    pub loaded: usize,
    pub skipped: Vec<(u64, String)>,
}

/// Read `id,name,date_of_birth,latitude,longitude` rows from `source` (no
/// header row) and insert each into `engine`. A row that fails to parse is
/// recorded in the returned summary and skipped; it does not abort the
/// load.
pub fn load_csv(engine: &mut MatchingEngine, source: impl Read) -> Result<LoadSummary, Error> {
    let mut reader = csv::ReaderBuilder::new().has_headers(false).from_reader(source);
    let mut summary = LoadSummary::default();

    for (line, record) in reader.records().enumerate() {
        let line_number = line as u64 + 1;
        let record = match record {
            Ok(record) => record,
            Err(e) => {
                summary.skipped.push((line_number, format!("malformed CSV row: {e}")));
                continue;
            }
        };
        match parse_row(&record) {
            Ok(person) => {
                engine.add_person(person);
                summary.loaded += 1;
            }
            Err(reason) => summary.skipped.push((line_number, reason)),
        }
    }

    Ok(summary)
}

fn parse_row(record: &csv::StringRecord) -> Result<Person, String> {
    if record.len() != 5 {
        return Err(format!("expected 5 fields, found {}", record.len()));
    }
    let id = record[0].parse::<Uuid>().map_err(|e| format!("invalid id: {e}"))?;
    let name = record[1].to_owned();
    let date_of_birth = NaiveDate::parse_from_str(&record[2], "%Y-%m-%d")
        .map_err(|e| format!("invalid date_of_birth: {e}"))?;
    let latitude: f64 = record[3].parse().map_err(|_| format!("invalid latitude: {}", &record[3]))?;
    let longitude: f64 = record[4].parse().map_err(|_| format!("invalid longitude: {}", &record[4]))?;
    let home = GeoPosition::new(latitude, longitude).map_err(|e| e.to_string())?;

    Ok(Person::new(PersonId::new(id), name, date_of_birth, home))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Config;
    use std::io::Cursor;

    fn engine() -> MatchingEngine {
        MatchingEngine::build(Config {
            resolution: 1,
            max_age_difference: 5,
            result_cap: 100,
            per_find_concurrency: Some(2),
            today_fn: Box::new(|| NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()),
        })
        .unwrap()
    }

    #[test]
    fn loads_well_formed_rows() {
        let mut engine = engine();
        let csv = format!(
            "{},Ada,1990-01-01,51.5,-0.1\n{},Bob,1985-06-15,40.7,-74.0\n",
            Uuid::new_v4(),
            Uuid::new_v4(),
        );
        let summary = load_csv(&mut engine, Cursor::new(csv)).unwrap();
        assert_eq!(summary.loaded, 2);
        assert!(summary.skipped.is_empty());
    }

    #[test]
    fn skips_a_malformed_row_but_keeps_loading() {
        let mut engine = engine();
        let csv = format!(
            "{},Ada,1990-01-01,51.5,-0.1\nnot-a-uuid,Bob,1985-06-15,40.7,-74.0\n{},Cleo,2000-03-03,12.0,12.0\n",
            Uuid::new_v4(),
            Uuid::new_v4(),
        );
        let summary = load_csv(&mut engine, Cursor::new(csv)).unwrap();
        assert_eq!(summary.loaded, 2);
        assert_eq!(summary.skipped.len(), 1);
        assert_eq!(summary.skipped[0].0, 2);
    }

    #[test]
    fn skips_a_row_with_out_of_range_coordinates() {
        let mut engine = engine();
        let csv = format!("{},Ada,1990-01-01,500.0,-0.1\n", Uuid::new_v4());
        let summary = load_csv(&mut engine, Cursor::new(csv)).unwrap();
        assert_eq!(summary.loaded, 0);
        assert_eq!(summary.skipped.len(), 1);
    }
}
