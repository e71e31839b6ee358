//! Stitching data types and constants
//!
//! Contains the user parameters, validated settings, via candidates and the
//! operation report.

use crate::board::{mm_to_nm, Coord, LayerKind, NetId, Point};
use serde::{Deserialize, Serialize};

use super::error::{Result, StitchError};

/// Two endpoints closer than this are the same connection point (1 micron)
pub const COORD_TOLERANCE: Coord = 1_000;

/// Minimum annular ring (0.1 mm)
pub const MIN_VIA_RING: Coord = 100_000;

/// Clearance used when neither the object nor the board defines one (0.2 mm)
pub const DEFAULT_CLEARANCE: Coord = 200_000;

/// Clearance floor between a single trace and its own stitching vias (0.2 mm)
pub const MIN_SINGLE_TRACE_CLEARANCE: Coord = 200_000;

/// Clearance to copper on the walked track's own net (0.3 mm)
pub const SAME_NET_MIN_CLEARANCE: Coord = 300_000;

/// Largest accepted distance, drill or diameter parameter (1 m)
pub const MAX_PARAMETER_MM: f64 = 1_000.0;

/// Net names treated as the stitching ground, compared case-insensitively
pub const GROUND_NET_NAMES: &[&str] = &["GND", "GROUND", "VSS"];

/// User-facing stitching parameters, in millimetres
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StitchParams {
    pub stitch_distance_mm: f64,
    pub via_drill_mm: f64,
    pub via_diameter_mm: f64,
    pub remove_existing_vias: bool,
    pub stitch_top: bool,
    pub stitch_inner: bool,
    pub stitch_bottom: bool,
}

impl Default for StitchParams {
    fn default() -> Self {
        Self {
            stitch_distance_mm: 10.0,
            via_drill_mm: 0.3,
            via_diameter_mm: 0.6,
            remove_existing_vias: false,
            stitch_top: true,
            stitch_inner: true,
            stitch_bottom: true,
        }
    }
}

impl StitchParams {
    /// Convert to internal units and validate
    pub fn to_settings(&self) -> Result<StitchSettings> {
        for (name, value) in [
            ("stitch_distance_mm", self.stitch_distance_mm),
            ("via_drill_mm", self.via_drill_mm),
            ("via_diameter_mm", self.via_diameter_mm),
        ] {
            if !value.is_finite() || value <= 0.0 || value > MAX_PARAMETER_MM {
                return Err(StitchError::InvalidParameter { name, value });
            }
        }
        StitchSettings::new(
            mm_to_nm(self.stitch_distance_mm),
            mm_to_nm(self.via_drill_mm),
            mm_to_nm(self.via_diameter_mm),
        )
    }

    /// Whether layers of this kind take part in stitching
    pub fn includes(&self, kind: LayerKind) -> bool {
        match kind {
            LayerKind::Top => self.stitch_top,
            LayerKind::Inner => self.stitch_inner,
            LayerKind::Bottom => self.stitch_bottom,
        }
    }

    pub fn stitches_any_layer(&self) -> bool {
        self.stitch_top || self.stitch_inner || self.stitch_bottom
    }
}

/// Validated stitching parameters in internal units
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StitchSettings {
    pub stitch_distance: Coord,
    pub via_drill: Coord,
    pub via_diameter: Coord,
}

impl StitchSettings {
    pub fn new(stitch_distance: Coord, via_drill: Coord, via_diameter: Coord) -> Result<Self> {
        if stitch_distance <= 0 {
            return Err(StitchError::InvalidParameter {
                name: "stitch_distance",
                value: stitch_distance as f64,
            });
        }
        validate_via_ring(via_diameter, via_drill)?;
        Ok(Self {
            stitch_distance,
            via_drill,
            via_diameter,
        })
    }

    pub fn via_radius(&self) -> Coord {
        self.via_diameter / 2
    }
}

/// Check that `(diameter - drill) / 2` leaves at least `MIN_VIA_RING` of copper
pub fn validate_via_ring(via_diameter: Coord, via_drill: Coord) -> Result<()> {
    let annulus = via_diameter - via_drill;
    if annulus < 2 * MIN_VIA_RING {
        return Err(StitchError::RingTooSmall {
            ring: annulus / 2,
            minimum: MIN_VIA_RING,
        });
    }
    Ok(())
}

/// Proposed through via, not yet committed
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ViaCandidate {
    pub position: Point,
    pub diameter: Coord,
    pub drill: Coord,
    pub target_net: NetId,
}

impl ViaCandidate {
    pub fn radius(&self) -> Coord {
        self.diameter / 2
    }
}

/// Axis-aligned keep-out box for length tuning patterns
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TuningArea {
    pub min: Point,
    pub max: Point,
}

/// Per-layer stitching counts
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct LayerReport {
    pub layer: String,
    pub segment_count: usize,
    pub track_count: usize,
    pub placed: usize,
    pub skipped: usize,
}

/// The longest reconstructed track, surfaced as the board selection
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LongestTrack {
    pub layer: String,
    pub net: String,
    pub length_mm: f64,
    pub segment_count: usize,
}

/// Outcome of one stitching operation
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct StitchReport {
    /// Vias removed from the ground net; `None` when removal was not requested or no ground net exists
    pub removed_vias: Option<usize>,
    pub ground_net: Option<String>,
    pub layers: Vec<LayerReport>,
    pub placed: usize,
    pub skipped: usize,
    pub longest_track: Option<LongestTrack>,
    /// Informational messages (missing ground net, ...)
    pub notes: Vec<String>,
}

impl StitchReport {
    pub fn attempted(&self) -> usize {
        self.placed + self.skipped
    }

    /// Percentage of candidates that were placed
    pub fn success_rate(&self) -> f64 {
        match self.attempted() {
            0 => 0.0,
            n => self.placed as f64 * 100.0 / n as f64,
        }
    }

    /// More candidates skipped than placed: the board is dense around its tracks
    pub fn density_warning(&self) -> bool {
        self.skipped > self.placed
    }

    /// Human-readable summary, one line per entry
    pub fn summary(&self) -> Vec<String> {
        let mut lines = Vec::new();

        if let Some(count) = self.removed_vias {
            lines.push(format!("Removed {} GND vias.", count));
        }
        lines.extend(self.notes.iter().cloned());

        if !self.layers.is_empty() {
            lines.push("Traces (single straight elements):".to_string());
            for layer in &self.layers {
                lines.push(format!("  Layer {}: {} traces found", layer.layer, layer.segment_count));
            }
            lines.push("Tracks:".to_string());
            for layer in &self.layers {
                lines.push(format!("  Layer {}: {} tracks reconstructed", layer.layer, layer.track_count));
            }
        }

        if let Some(longest) = &self.longest_track {
            lines.push(format!(
                "Longest track: {} on {} ({:.3} mm, {} segments)",
                longest.net, longest.layer, longest.length_mm, longest.segment_count
            ));
        }

        if self.placed > 0 {
            lines.push(format!("{} stitching vias placed", self.placed));
            lines.push(format!("{} vias skipped (clearance issues)", self.skipped));
            lines.push(format!("Success rate: {:.1}%", self.success_rate()));
            if self.density_warning() {
                lines.push("Note: Many vias were skipped due to insufficient clearance.".to_string());
                lines.push("This usually means the PCB is very dense in those areas.".to_string());
                lines.push("Consider using smaller vias or increasing trace spacing.".to_string());
            }
        }

        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ring_validation() {
        // 0.3 mm diameter with 0.3 mm drill leaves no ring
        assert_eq!(
            validate_via_ring(300_000, 300_000),
            Err(StitchError::RingTooSmall { ring: 0, minimum: MIN_VIA_RING })
        );
        // 0.6 / 0.3 leaves 0.15 mm
        assert!(validate_via_ring(600_000, 300_000).is_ok());
        // exactly at the minimum
        assert!(validate_via_ring(500_000, 300_000).is_ok());
        assert!(validate_via_ring(499_999, 300_000).is_err());
    }

    #[test]
    fn test_params_defaults_from_empty_json() {
        let params: StitchParams = serde_json::from_str("{}").unwrap();
        assert_eq!(params, StitchParams::default());
        let settings = params.to_settings().unwrap();
        assert_eq!(settings.stitch_distance, 10_000_000);
        assert_eq!(settings.via_drill, 300_000);
        assert_eq!(settings.via_diameter, 600_000);
    }

    #[test]
    fn test_params_reject_non_positive() {
        let params = StitchParams {
            stitch_distance_mm: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            params.to_settings(),
            Err(StitchError::InvalidParameter { name: "stitch_distance_mm", .. })
        ));
    }

    #[test]
    fn test_params_reject_absurd_sizes() {
        let params = StitchParams {
            via_diameter_mm: 1e13,
            ..Default::default()
        };
        assert_eq!(
            params.to_settings(),
            Err(StitchError::InvalidParameter { name: "via_diameter_mm", value: 1e13 })
        );
        let params = StitchParams {
            stitch_distance_mm: MAX_PARAMETER_MM,
            ..Default::default()
        };
        assert!(params.to_settings().is_ok());
    }

    #[test]
    fn test_report_density_warning() {
        let report = StitchReport {
            placed: 2,
            skipped: 6,
            ..Default::default()
        };
        assert!(report.density_warning());
        assert!((report.success_rate() - 25.0).abs() < 1e-9);
        let summary = report.summary();
        assert!(summary.iter().any(|l| l == "2 stitching vias placed"));
        assert!(summary.iter().any(|l| l.starts_with("Note: Many vias were skipped")));
    }
}
