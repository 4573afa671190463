//! Quantization of a [`GeoPosition`](crate::person::GeoPosition) into a grid
//! cell, and the offset classification that the spiral traversal (see
//! [`crate::spiral`]) uses to stay correct at the poles and the
//! antimeridian.
//!
//! `check_offsets` is the one place that decides whether an offset from an
//! origin cell is reachable, wraps around the antimeridian, or lands on a
//! polar-antipodal corner the spiral should stop extending past -- folding
//! that decision into a single classifier keeps every boundary case in one
//! function instead of scattered across separate north/south/east/west
//! checks.

use crate::person::GeoPosition;

/// A quantized grid cell, `(lat_idx, lon_idx)`, at some fixed `resolution`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellCoord {
    pub lat_idx: i64,
    pub lon_idx: i64,
}

impl CellCoord {
    pub fn new(lat_idx: i64, lon_idx: i64) -> Self {
        CellCoord { lat_idx, lon_idx }
    }
}

/// The classification of a candidate cell reached by an offset from an
/// origin cell. See spec §4.1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OffsetClass {
    /// Out of the grid's latitude range, or an impossible longitude span.
    Invalid,
    /// A polar-antipodal corner: visited, but the spiral does not extend
    /// past it.
    Terminal,
    /// An ordinary, fully traversable cell.
    Valid,
}

/// `0 ≤ lat_idx ≤ 180·R + 1` -- the latitude axis has `180·R + 2` rows,
/// padded by one row at each pole.
pub fn max_lat_idx(resolution: u32) -> i64 {
    180 * resolution as i64 + 1
}

/// Longitude arithmetic wraps modulo `361·R`. A narrower `360·R`-wide
/// layout would leave the antimeridian and the spiral's offset classifier
/// without a consistent wrap point; the extra column is what keeps both
/// correct.
pub fn lon_width(resolution: u32) -> i64 {
    361 * resolution as i64
}

fn half_way_around(resolution: u32) -> i64 {
    180 * resolution as i64
}

/// Quantize a validated position into a grid cell at the given resolution.
///
/// `position` is assumed valid (`-90..=90`, `-180..=180`) because
/// [`GeoPosition::new`] is the only way to construct one and already
/// enforces that; this function trusts the invariant and fails fast
/// (`debug_assert!`) rather than re-validating it -- a position reaching
/// here out of range means a bug upstream, not bad input to handle
/// gracefully.
pub fn to_cell(position: GeoPosition, resolution: u32) -> CellCoord {
    let r = resolution as f64;
    debug_assert!(
        (-90.0..=90.0).contains(&position.latitude()),
        "to_cell called with out-of-range latitude {}",
        position.latitude()
    );
    debug_assert!(
        (-180.0..=180.0).contains(&position.longitude()),
        "to_cell called with out-of-range longitude {}",
        position.longitude()
    );
    let lat_idx = ((position.latitude() + 90.0) * r).trunc() as i64;
    let lon_idx = ((position.longitude() + 180.0) * r).trunc() as i64;
    CellCoord::new(lat_idx, lon_idx)
}

/// Longitude wrap: `lon_idx + delta`, modulo `361·R`, always non-negative.
pub fn wrap_lon(lon_idx: i64, delta: i64, resolution: u32) -> i64 {
    let width = lon_width(resolution);
    (lon_idx + delta).rem_euclid(width)
}

/// Classify a candidate cell reached by offset `(dlat, dlon)` from `origin`.
pub fn check_offsets(origin: CellCoord, dlat: i64, dlon: i64, resolution: u32) -> OffsetClass {
    let half = half_way_around(resolution);
    if dlon.abs() > half {
        return OffsetClass::Invalid;
    }
    let candidate_lat = origin.lat_idx + dlat;
    if candidate_lat < 0 || candidate_lat > max_lat_idx(resolution) {
        return OffsetClass::Invalid;
    }
    if dlon.abs() == half && (candidate_lat == 0 || candidate_lat == max_lat_idx(resolution)) {
        return OffsetClass::Terminal;
    }
    OffsetClass::Valid
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equator_prime_meridian_at_unit_resolution() {
        let p = GeoPosition::new(0.0, 0.0).unwrap();
        assert_eq!(to_cell(p, 1), CellCoord::new(90, 180));
    }

    #[test]
    fn north_pole_at_unit_resolution() {
        let p = GeoPosition::new(90.0, 0.0).unwrap();
        let c = to_cell(p, 1);
        assert_eq!(c.lat_idx, 180);
        assert_eq!(c.lat_idx, max_lat_idx(1) - 1);
    }

    #[test]
    fn south_pole_at_unit_resolution() {
        let p = GeoPosition::new(-90.0, 0.0).unwrap();
        assert_eq!(to_cell(p, 1).lat_idx, 0);
    }

    #[test]
    fn antimeridian_wraps() {
        // +179.99 and -179.99 are two adjacent cells apart across the
        // antimeridian (359 -> 360/0 -> 0 under wrap), not the same cell;
        // it's `wrap_lon` that makes them neighbors, which is why the
        // spiral (not cell equality) is what reaches across them.
        let east = GeoPosition::new(0.0, 179.99).unwrap();
        let west = GeoPosition::new(0.0, -179.99).unwrap();
        let east_cell = to_cell(east, 1);
        let west_cell = to_cell(west, 1);
        assert_ne!(east_cell, west_cell);
        assert_eq!(east_cell.lon_idx, lon_width(1) - 1);
        assert_eq!(west_cell.lon_idx, 0);
        assert_eq!(wrap_lon(east_cell.lon_idx, 1, 1), west_cell.lon_idx);
    }

    #[test]
    fn wrap_lon_stays_non_negative() {
        assert_eq!(wrap_lon(0, -1, 1), lon_width(1) - 1);
        assert_eq!(wrap_lon(lon_width(1) - 1, 1, 1), 0);
    }

    #[test]
    fn check_offsets_classifies_invalid_beyond_half_way() {
        let origin = CellCoord::new(90, 180);
        assert_eq!(
            check_offsets(origin, 0, half_way_around(1) + 1, 1),
            OffsetClass::Invalid
        );
    }

    #[test]
    fn check_offsets_classifies_invalid_past_latitude_bounds() {
        let origin = CellCoord::new(180, 0);
        assert_eq!(check_offsets(origin, 5, 0, 1), OffsetClass::Invalid);
    }

    #[test]
    fn check_offsets_classifies_terminal_at_pole_corners() {
        // From the south pole padding row, a half-way-around offset lands
        // back on the same padding row: a terminal corner.
        let origin = CellCoord::new(0, 0);
        let half = half_way_around(1);
        assert_eq!(
            check_offsets(origin, 0, half, 1),
            OffsetClass::Terminal
        );
    }

    #[test]
    fn check_offsets_classifies_valid_ordinary_cell() {
        let origin = CellCoord::new(90, 180);
        assert_eq!(check_offsets(origin, 1, 1, 1), OffsetClass::Valid);
    }
}
