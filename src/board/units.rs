//! Millimetre / nanometre conversion at the host boundary

use super::types::Coord;

/// Internal units per millimetre
pub const NM_PER_MM: f64 = 1_000_000.0;

/// Convert a user-entered millimetre value to internal units
pub fn mm_to_nm(mm: f64) -> Coord {
    (mm * NM_PER_MM).round() as Coord
}

pub fn nm_to_mm(nm: Coord) -> f64 {
    nm as f64 / NM_PER_MM
}
