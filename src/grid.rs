//! The dense 2-D cell array that owns every [`Person`] in the index.
//!
//! Laid out as `(180·R + 2)` latitude rows by `(361·R)` longitude columns,
//! with one padding row at each pole: the extra rows give the spiral's
//! offset classifier somewhere to land when it walks past 90 degrees
//! latitude, instead of needing a special case for that boundary.

use crate::cell::{lon_width, max_lat_idx, CellCoord};
use crate::error::Error;
use crate::person::Person;
use chrono::NaiveDate;

/// A single grid cell: people whose home quantizes here, kept sorted
/// non-decreasing by date of birth.
#[derive(Debug, Default, Clone)]
pub struct Cell {
    people: Vec<Person>,
}

impl Cell {
    /// Insert `person` at the position that keeps the cell sorted by date
    /// of birth. Duplicate ids are not deduplicated -- last writer appends.
    fn insert(&mut self, person: Person) {
        let pos = self
            .people
            .partition_point(|existing| existing.date_of_birth() <= person.date_of_birth());
        self.people.insert(pos, person);
    }

    /// Append every person whose date of birth lies in `[earliest, latest]`
    /// to `out`. The cell's sorted invariant lets us binary-search the
    /// lower bound and then walk linearly until the upper bound is passed.
    pub fn scan(&self, earliest: NaiveDate, latest: NaiveDate, out: &mut Vec<Person>) {
        let start = self.people.partition_point(|p| p.date_of_birth() < earliest);
        out.extend(
            self.people[start..]
                .iter()
                .take_while(|p| p.date_of_birth() <= latest)
                .cloned(),
        );
    }

    pub fn people(&self) -> &[Person] {
        &self.people
    }

    fn is_sorted(&self) -> bool {
        self.people.windows(2).all(|w| w[0].date_of_birth() <= w[1].date_of_birth())
    }
}

/// The dense grid of cells, indexed by [`CellCoord`].
///
/// Immutable during a query: bulk load must precede querying, so no
/// synchronization is needed here -- the engine that wraps this grid is
/// responsible for not overlapping `add_person` with `find_matching`.
#[derive(Debug)]
pub struct Grid {
    resolution: u32,
    lon_width: i64,
    cells: Vec<Cell>,
}

impl Grid {
    /// `resolution` (cells per degree) must be in `1..=100`.
    pub fn new(resolution: u32) -> Result<Self, Error> {
        if resolution == 0 || resolution > 100 {
            return Err(Error::Config(format!(
                "resolution must be in 1..=100, got {resolution}"
            )));
        }
        let lat_rows = (max_lat_idx(resolution) + 1) as usize;
        let lon_width = lon_width(resolution);
        let cells = vec![Cell::default(); lat_rows * lon_width as usize];
        Ok(Grid { resolution, lon_width, cells })
    }

    pub fn resolution(&self) -> u32 {
        self.resolution
    }

    fn index(&self, coord: CellCoord) -> usize {
        debug_assert!(coord.lat_idx >= 0 && coord.lat_idx <= max_lat_idx(self.resolution));
        debug_assert!(coord.lon_idx >= 0 && coord.lon_idx < self.lon_width);
        (coord.lat_idx * self.lon_width + coord.lon_idx) as usize
    }

    /// Locate `person`'s home cell and insert them, keeping the cell sorted
    /// by date of birth.
    pub fn add(&mut self, coord: CellCoord, person: Person) {
        let idx = self.index(coord);
        self.cells[idx].insert(person);
    }

    /// Borrow a cell's ordered list read-only.
    pub fn cell(&self, coord: CellCoord) -> &Cell {
        let idx = self.index(coord);
        &self.cells[idx]
    }

    /// Append every person in `coord`'s cell whose date of birth lies in
    /// `[earliest, latest]` to `out`.
    pub fn scan(&self, coord: CellCoord, earliest: NaiveDate, latest: NaiveDate, out: &mut Vec<Person>) {
        self.cell(coord).scan(earliest, latest, out);
    }

    /// True iff every cell remains sorted by date of birth -- a bulk-load
    /// invariant exercised directly by property tests.
    #[cfg(test)]
    pub fn all_cells_sorted(&self) -> bool {
        self.cells.iter().all(Cell::is_sorted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::to_cell;
    use crate::person::{GeoPosition, PersonId};
    use chrono::Datelike;
    use uuid::Uuid;

    fn person_at(lat: f64, lon: f64, dob: NaiveDate) -> (CellCoord, Person) {
        let pos = GeoPosition::new(lat, lon).unwrap();
        let id = PersonId::new(Uuid::new_v4());
        (to_cell(pos, 1), Person::new(id, "test".into(), dob, pos))
    }

    #[test]
    fn insertion_keeps_cell_sorted() {
        let mut grid = Grid::new(1).unwrap();
        let dates = [
            NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(1970, 6, 15).unwrap(),
            NaiveDate::from_ymd_opt(2000, 12, 31).unwrap(),
            NaiveDate::from_ymd_opt(1985, 3, 3).unwrap(),
        ];
        for &d in &dates {
            let (coord, p) = person_at(10.0, 10.0, d);
            grid.add(coord, p);
        }
        assert!(grid.all_cells_sorted());
    }

    #[test]
    fn scan_returns_only_people_in_window() {
        let mut grid = Grid::new(1).unwrap();
        let coord = to_cell(GeoPosition::new(0.0, 0.0).unwrap(), 1);
        let dobs = [1970, 1980, 1990, 2000].map(|y| NaiveDate::from_ymd_opt(y, 1, 1).unwrap());
        for d in dobs {
            let (c, p) = person_at(0.0, 0.0, d);
            assert_eq!(c, coord);
            grid.add(c, p);
        }
        let mut out = Vec::new();
        grid.scan(
            coord,
            NaiveDate::from_ymd_opt(1979, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(1995, 1, 1).unwrap(),
            &mut out,
        );
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].date_of_birth().year(), 1980);
        assert_eq!(out[1].date_of_birth().year(), 1990);
    }

    #[test]
    fn rejects_resolution_out_of_range() {
        assert!(Grid::new(0).is_err());
        assert!(Grid::new(101).is_err());
        assert!(Grid::new(100).is_ok());
        assert!(Grid::new(1).is_ok());
    }
}
