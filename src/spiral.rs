//! Outward, ring-by-ring cell traversal from a query origin.
//!
//! Cells come out in non-decreasing Chebyshev distance from the origin, so
//! a caller that stops the walk early (once it has enough matches) sees the
//! closest cells first. The walk itself never needs to special-case the
//! poles: each candidate offset goes through `check_offsets`, and the four
//! polar-antipodal corners that classifies as terminal are what end the
//! walk, rather than an explicit north/south bound check.

use crate::cell::{check_offsets, wrap_lon, CellCoord, OffsetClass};

/// Visit `center`, then cells in rings of increasing Chebyshev radius,
/// until either `visit` returns `true` ("stop") or all four
/// polar-antipodal terminal corners have been reached.
///
/// Longitude wrap is applied before `visit` is called, so it always sees a
/// normalized coordinate.
pub fn walk(center: CellCoord, resolution: u32, mut visit: impl FnMut(CellCoord) -> bool) {
    if visit(center) {
        return;
    }

    let mut terminal_count = 0u32;
    let mut r: i64 = 1;
    // A ring whose radius exceeds the grid's own extent can still contain
    // valid cells (wrap keeps longitude in range), but once we are well
    // past the point where every offset is out of latitude range, nothing
    // further can be produced; this is a defensive backstop against an
    // infinite loop should the terminal-corner invariant ever fail to hold.
    let r_cap = crate::cell::max_lat_idx(resolution) + crate::cell::lon_width(resolution) + 2;

    while r <= r_cap {
        for &(dlat, dlon) in ring_offsets(r).iter() {
            match check_offsets(center, dlat, dlon, resolution) {
                OffsetClass::Invalid => continue,
                OffsetClass::Terminal => {
                    let lon_idx = wrap_lon(center.lon_idx, dlon, resolution);
                    let coord = CellCoord::new(center.lat_idx + dlat, lon_idx);
                    terminal_count += 1;
                    if visit(coord) || terminal_count >= 4 {
                        return;
                    }
                }
                OffsetClass::Valid => {
                    let lon_idx = wrap_lon(center.lon_idx, dlon, resolution);
                    let coord = CellCoord::new(center.lat_idx + dlat, lon_idx);
                    if visit(coord) {
                        return;
                    }
                }
            }
        }
        r += 1;
    }

    log::warn!(
        "spiral from {:?} exhausted its safety bound ({} rings) without reaching \
         all four terminal corners; this indicates a bug in check_offsets",
        center,
        r_cap
    );
}

/// The offsets of ring `r` (Chebyshev radius `r`, `r >= 1`): due north,
/// through the NE/SE/SW/NW quadrants, closing just short of the starting
/// cell.
fn ring_offsets(r: i64) -> Vec<(i64, i64)> {
    let mut offsets = Vec::with_capacity((8 * r) as usize);

    // NE quadrant: (r, 0) -> (r, r) -> (0, r)
    for dlon in 0..=r {
        offsets.push((r, dlon));
    }
    for dlat in (0..r).rev() {
        offsets.push((dlat, r));
    }
    // SE quadrant: (-1, r) -> (-r, r) -> (-r, 0)
    for dlat in (-r..0).rev() {
        offsets.push((dlat, r));
    }
    for dlon in (0..r).rev() {
        offsets.push((-r, dlon));
    }
    // SW quadrant: (-r, -1) -> (-r, -r) -> (0, -r)
    for dlon in (-r..0).rev() {
        offsets.push((-r, dlon));
    }
    for dlat in -r + 1..=0 {
        offsets.push((dlat, -r));
    }
    // NW quadrant: (1, -r) -> (r, -r) -> (r, -1), excluding (r, 0) which
    // closes the ring back onto its own starting cell.
    for dlat in 1..=r {
        offsets.push((dlat, -r));
    }
    for dlon in -r + 1..0 {
        offsets.push((r, dlon));
    }

    offsets
}
