//! The matching engine: configuration, bulk insert, and the find
//! orchestrator that rendezvous a query thread with the worker pool.
//!
//! `find_matching` drives a spiral walk on the calling thread and dispatches
//! each cell's scan onto the worker pool, gating itself on a per-query
//! bound of in-flight scans and stopping once enough results have arrived
//! or the spiral is exhausted, then draining whatever scans were already
//! dispatched before returning.

use crate::cell::{to_cell, CellCoord};
use crate::error::Error;
use crate::grid::Grid;
use crate::person::{GeoPosition, Person};
use crate::pool::WorkerPool;
use crate::spiral;
use chrono::NaiveDate;
use std::collections::HashSet;
use std::sync::{Arc, Condvar, Mutex};

/// Engine configuration, validated once at construction.
pub struct Config {
    pub resolution: u32,
    pub max_age_difference: u32,
    pub result_cap: usize,
    /// Worker count for a single `find_matching` call. `None` defaults to
    /// the platform's available parallelism.
    pub per_find_concurrency: Option<usize>,
    pub today_fn: Box<dyn Fn() -> NaiveDate + Send + Sync>,
}

impl Config {
    fn validate(&self) -> Result<(), Error> {
        if self.resolution == 0 || self.resolution > 100 {
            return Err(Error::Config(format!(
                "resolution must be in 1..=100, got {}",
                self.resolution
            )));
        }
        if self.result_cap == 0 {
            return Err(Error::Config("result_cap must be positive".into()));
        }
        if let Some(0) = self.per_find_concurrency {
            return Err(Error::Config("per_find_concurrency must be positive".into()));
        }
        Ok(())
    }
}

/// Per-query shared state that rendezvouses the orchestrating thread with
/// the worker closures it dispatches to the pool.
struct FindState {
    results: Vec<Person>,
    in_flight: HashSet<CellCoord>,
    done: bool,
}

struct FindContext {
    mutex: Mutex<FindState>,
    condvar: Condvar,
}

/// The matching engine: a resolution-quantized grid plus the worker pool
/// that serves queries against it.
///
/// The grid is behind an `Arc` rather than owned outright so that a worker
/// closure dispatched to the pool can hold its own clone of it without
/// borrowing `self` -- `add_person` recovers exclusive access via
/// `Arc::get_mut`, which succeeds because bulk load never overlaps a query
/// (no worker closure is ever in flight while it runs).
pub struct MatchingEngine {
    config: Config,
    grid: Arc<Grid>,
    pool: WorkerPool,
}

impl MatchingEngine {
    /// Build an engine. Fails only on a configuration fault.
    pub fn build(config: Config) -> Result<Self, Error> {
        config.validate()?;
        let grid = Arc::new(Grid::new(config.resolution)?);
        let concurrency = default_concurrency(config.per_find_concurrency);
        let pool = WorkerPool::new(concurrency);
        Ok(MatchingEngine { config, grid, pool })
    }

    /// Bulk-insert `person` into their home cell. Not safe to call
    /// concurrently with `find_matching` or with itself -- bulk load is a
    /// single-threaded phase that must complete before any query starts.
    pub fn add_person(&mut self, person: Person) {
        let coord = to_cell(person.home(), self.config.resolution);
        let grid = Arc::get_mut(&mut self.grid)
            .expect("add_person called while a query still holds the grid");
        grid.add(coord, person);
    }

    /// Return up to `result_cap` people whose home cell is reachable by the
    /// spiral from `origin`'s cell, and whose date of birth lies in the
    /// window `max_age_difference` years either side of `age_of_user`.
    pub fn find_matching(&self, origin: GeoPosition, age_of_user: i32) -> Vec<Person> {
        let today = (self.config.today_fn)();
        let earliest = shift_years(today, -(age_of_user + self.config.max_age_difference as i32));
        let latest = shift_years(today, -(age_of_user - self.config.max_age_difference as i32));

        let origin_cell = to_cell(origin, self.config.resolution);
        let per_find_concurrency = default_concurrency(self.config.per_find_concurrency);
        let result_cap = self.config.result_cap;

        let context = Arc::new(FindContext {
            mutex: Mutex::new(FindState {
                results: Vec::new(),
                in_flight: HashSet::new(),
                done: false,
            }),
            condvar: Condvar::new(),
        });

        spiral::walk(origin_cell, self.config.resolution, |cell| {
            self.try_dispatch(&context, per_find_concurrency, result_cap, cell, earliest, latest)
        });

        // Even if the spiral ran to exhaustion without ever hitting the
        // cap, scans already in flight must finish before we read results.
        {
            let state = context.mutex.lock().unwrap();
            let _ = context
                .condvar
                .wait_while(state, |s| !s.in_flight.is_empty())
                .unwrap();
        }

        let mut state = context.mutex.lock().unwrap();
        state.results.truncate(result_cap);
        std::mem::take(&mut state.results)
    }

    /// One step of the spiral's visitor callback: wait for a free slot (or
    /// for the query to already be over), then either signal "stop the
    /// spiral" or dispatch `cell`'s scan to the pool and continue.
    fn try_dispatch(
        &self,
        context: &Arc<FindContext>,
        per_find_concurrency: usize,
        result_cap: usize,
        cell: CellCoord,
        earliest: NaiveDate,
        latest: NaiveDate,
    ) -> bool {
        let mut state = context.mutex.lock().unwrap();
        state = context
            .condvar
            .wait_while(state, |s| {
                !s.done && s.results.len() < result_cap && s.in_flight.len() >= per_find_concurrency
            })
            .unwrap();

        if state.done || state.results.len() >= result_cap {
            state.done = true;
            return true;
        }

        let first_visit = state.in_flight.insert(cell);
        debug_assert!(first_visit, "spiral visited cell {:?} twice in one query", cell);
        drop(state);

        let context = Arc::clone(context);
        let grid = Arc::clone(&self.grid);
        self.pool.submit(move || {
            let mut state = context.mutex.lock().unwrap();
            if state.done {
                state.in_flight.remove(&cell);
                context.condvar.notify_all();
                return;
            }
            drop(state);

            let mut found = Vec::new();
            grid.scan(cell, earliest, latest, &mut found);

            let mut state = context.mutex.lock().unwrap();
            if !state.done {
                state.results.extend(found);
            }
            state.in_flight.remove(&cell);
            context.condvar.notify_all();
        });

        false
    }
}

fn default_concurrency(configured: Option<usize>) -> usize {
    configured.unwrap_or_else(|| {
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    })
}

fn shift_years(date: NaiveDate, years: i32) -> NaiveDate {
    use chrono::Datelike;
    let target_year = date.year() + years;
    // Clamp a Feb 29 birthday onto Feb 28 in a non-leap target year rather
    // than treating it as an invalid date -- a birthday still happens.
    NaiveDate::from_ymd_opt(target_year, date.month(), date.day())
        .unwrap_or_else(|| NaiveDate::from_ymd_opt(target_year, date.month(), date.day() - 1).unwrap())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::person::PersonId;
    use uuid::Uuid;

    fn fixed_today(y: i32, m: u32, d: u32) -> Box<dyn Fn() -> NaiveDate + Send + Sync> {
        let date = NaiveDate::from_ymd_opt(y, m, d).unwrap();
        Box::new(move || date)
    }

    fn person(lat: f64, lon: f64, dob: NaiveDate) -> Person {
        let home = GeoPosition::new(lat, lon).unwrap();
        Person::new(PersonId::new(Uuid::new_v4()), "test".into(), dob, home)
    }

    fn build(result_cap: usize, max_age_difference: u32) -> MatchingEngine {
        MatchingEngine::build(Config {
            resolution: 1,
            max_age_difference,
            result_cap,
            per_find_concurrency: Some(2),
            today_fn: fixed_today(2026, 7, 26),
        })
        .unwrap()
    }

    #[test]
    fn find_matching_returns_people_in_the_age_window_near_the_origin() {
        let mut engine = build(10, 2);
        let origin = GeoPosition::new(10.0, 10.0).unwrap();
        // 30 years old today, born 1996-07-26.
        engine.add_person(person(10.0, 10.0, NaiveDate::from_ymd_opt(1996, 7, 26).unwrap()));
        // Outside the +/-2yr window around 30.
        engine.add_person(person(10.0, 10.0, NaiveDate::from_ymd_opt(1980, 7, 26).unwrap()));

        let results = engine.find_matching(origin, 30);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].date_of_birth().to_string(), "1996-07-26");
    }

    #[test]
    fn find_matching_respects_result_cap() {
        let mut engine = build(2, 50);
        let origin = GeoPosition::new(0.0, 0.0).unwrap();
        for day in 1..=5u32 {
            engine.add_person(person(0.0, 0.0, NaiveDate::from_ymd_opt(1990, 1, day).unwrap()));
        }
        let results = engine.find_matching(origin, 36);
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn find_matching_with_no_match_returns_empty() {
        let engine = build(10, 1);
        let origin = GeoPosition::new(0.0, 0.0).unwrap();
        assert!(engine.find_matching(origin, 40).is_empty());
    }

    #[test]
    fn rejects_zero_result_cap() {
        let config = Config {
            resolution: 1,
            max_age_difference: 1,
            result_cap: 0,
            per_find_concurrency: None,
            today_fn: fixed_today(2026, 1, 1),
        };
        assert!(MatchingEngine::build(config).is_err());
    }
}
