//! Domain record types: [`PersonId`], [`GeoPosition`] and [`Person`].
//!
//! A person is identified by an opaque id, and is otherwise just a name, a
//! date of birth, and a home position.

use crate::error::Error;
use chrono::NaiveDate;
use uuid::Uuid;

/// A 128-bit opaque identifier. The nil id (`Uuid::nil()`) never identifies
/// a valid person.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PersonId(Uuid);

impl PersonId {
    pub fn new(id: Uuid) -> Self {
        PersonId(id)
    }

    pub fn is_valid(&self) -> bool {
        !self.0.is_nil()
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl std::fmt::Display for PersonId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A WGS84-ish position (latitude and longitude only; no elevation).
///
/// Not particularly accurate by design: pplmatch cares about "lives
/// nearby", not survey-grade positioning.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPosition {
    latitude: f64,
    longitude: f64,
}

impl GeoPosition {
    /// Construct a position, validating `latitude` and `longitude` against
    /// their legal ranges. This is the one place untrusted input (CSV rows,
    /// wire records) is allowed to fail gracefully; once a `GeoPosition`
    /// exists, its fields are known-good and the rest of the crate may rely
    /// on that invariant without re-checking.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, Error> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(Error::Config(format!(
                "latitude {latitude} out of range [-90, 90]"
            )));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(Error::Config(format!(
                "longitude {longitude} out of range [-180, 180]"
            )));
        }
        Ok(GeoPosition { latitude, longitude })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

/// A person known to the matching engine.
#[derive(Debug, Clone, PartialEq)]
pub struct Person {
    id: PersonId,
    name: String,
    date_of_birth: NaiveDate,
    home: GeoPosition,
}

impl Person {
    /// Creates a valid person, assuming `id` is non-nil.
    pub fn new(id: PersonId, name: String, date_of_birth: NaiveDate, home: GeoPosition) -> Self {
        Person { id, name, date_of_birth, home }
    }

    pub fn is_valid(&self) -> bool {
        self.id.is_valid()
    }

    pub fn id(&self) -> PersonId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn date_of_birth(&self) -> NaiveDate {
        self.date_of_birth
    }

    pub fn home(&self) -> GeoPosition {
        self.home
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nil_id_is_invalid() {
        let id = PersonId::new(Uuid::nil());
        assert!(!id.is_valid());
    }

    #[test]
    fn random_id_is_valid() {
        let id = PersonId::new(Uuid::new_v4());
        assert!(id.is_valid());
    }

    #[test]
    fn position_rejects_out_of_range_latitude() {
        assert!(GeoPosition::new(90.1, 0.0).is_err());
        assert!(GeoPosition::new(-90.1, 0.0).is_err());
    }

    #[test]
    fn position_rejects_out_of_range_longitude() {
        assert!(GeoPosition::new(0.0, 180.1).is_err());
        assert!(GeoPosition::new(0.0, -180.1).is_err());
    }

    #[test]
    fn position_accepts_poles_and_antimeridian() {
        assert!(GeoPosition::new(90.0, 180.0).is_ok());
        assert!(GeoPosition::new(-90.0, -180.0).is_ok());
    }
}
