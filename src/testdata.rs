//! Synthetic test-data generation for benchmarking and manual testing
//! without a real CSV dump.
//!
//! Used when the daemon is started without a `--ppldata` path: it populates
//! the grid with N synthetic people spread uniformly across the globe and a
//! plausible age range instead.

use crate::person::{GeoPosition, Person, PersonId};
use chrono::NaiveDate;
use rand::{Rng, SeedableRng};
use uuid::Uuid;

/// The earliest and latest birth year synthetic people are drawn from --
/// roughly a 0 to 100 year old population as of `today`.
fn birth_year_range(today: NaiveDate) -> std::ops::RangeInclusive<i32> {
    use chrono::Datelike;
    (today.year() - 100)..=today.year()
}

/// Generate `count` uniformly-random people, seeded explicitly so a caller
/// that wants a reproducible dataset (benchmarks, regression fixtures) can
/// supply a fixed seed.
pub fn generate(count: usize, seed: u64, today: NaiveDate) -> Vec<Person> {
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
    let years = birth_year_range(today);

    (0..count)
        .map(|i| {
            let latitude = rng.gen_range(-90.0..=90.0);
            let longitude = rng.gen_range(-180.0..180.0);
            let home = GeoPosition::new(latitude, longitude)
                .expect("rng ranges are already within GeoPosition's valid bounds");

            let year = rng.gen_range(years.clone());
            let month = rng.gen_range(1..=12);
            let day = rng.gen_range(1..=28); // avoid per-month day-count bookkeeping
            let date_of_birth = NaiveDate::from_ymd_opt(year, month, day)
                .expect("year/month/day are all within NaiveDate's valid ranges");

            Person::new(PersonId::new(Uuid::new_v4()), format!("test-person-{i}"), date_of_birth, home)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generates_the_requested_count() {
        let today = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let people = generate(50, 42, today);
        assert_eq!(people.len(), 50);
    }

    #[test]
    fn same_seed_is_deterministic() {
        let today = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let a = generate(20, 7, today);
        let b = generate(20, 7, today);
        for (x, y) in a.iter().zip(b.iter()) {
            assert_eq!(x.date_of_birth(), y.date_of_birth());
            assert_eq!(x.home(), y.home());
        }
    }

    #[test]
    fn every_generated_person_is_valid() {
        let today = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        for person in generate(200, 99, today) {
            assert!(person.is_valid());
            assert!(person.date_of_birth() <= today);
        }
    }
}
