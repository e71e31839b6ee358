//! Clearance and lateral offset calculation
//!
//! Decides how far from a track's centreline a stitching via sits, and which
//! clearance a candidate must keep to each obstacle.

use crate::board::{Board, Coord, NetId};
use std::collections::HashMap;

use super::distance::point_distance;
use super::tracks::Track;
use super::types::{DEFAULT_CLEARANCE, MIN_SINGLE_TRACE_CLEARANCE, SAME_NET_MIN_CLEARANCE};

/// Name of the complementary net of a differential pair (`USB_N` <-> `USB_P`)
pub fn diff_pair_sibling_name(name: &str) -> Option<String> {
    if let Some(base) = name.strip_suffix("_N") {
        Some(format!("{}_P", base))
    } else {
        name.strip_suffix("_P").map(|base| format!("{}_N", base))
    }
}

/// Keep-out a pad adds beyond its radius
///
/// A zero or missing local clearance falls back to `fallback`; the solder mask
/// opening wins when it is wider.
pub fn pad_keepout(local_clearance: Option<Coord>, soldermask_expansion: Option<Coord>, fallback: Coord) -> Coord {
    let clearance = match local_clearance {
        Some(c) if c != 0 => c,
        _ => fallback,
    };
    clearance.max(soldermask_expansion.unwrap_or(0).abs())
}

/// Offsets for one track, fixed before the walk starts
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OffsetPlan {
    /// Widest segment of the track
    pub track_width: Coord,
    pub clearance: Coord,
    pub via_diameter: Coord,
    /// Edge-to-edge gap to the sibling of a differential pair, when positive
    pub diff_pair_gap: Option<Coord>,
}

impl OffsetPlan {
    /// Centreline-to-via-centre distance for the track as a whole
    pub fn lateral_offset(&self) -> Coord {
        self.offset_for(self.track_width, self.clearance)
    }

    /// Offset recomputed for one segment's own width
    pub fn segment_offset(&self, width: Coord) -> Coord {
        let clearance = match self.diff_pair_gap {
            Some(_) => self.clearance,
            None => self.clearance.max(MIN_SINGLE_TRACE_CLEARANCE),
        };
        self.offset_for(width, clearance)
    }

    fn offset_for(&self, width: Coord, clearance: Coord) -> Coord {
        let half_via = self.via_diameter / 2;
        match self.diff_pair_gap {
            // Past our own edge, the gap and the sibling conductor
            Some(gap) => width / 2 + clearance + gap + width + clearance + half_via,
            None => width / 2 + clearance + half_via,
        }
    }
}

/// Clearance lookups over a board's nets and design rules
///
/// Owns the data it needs so the board can be mutated while a calculator is alive.
#[derive(Clone, Debug)]
pub struct ClearanceCalculator {
    net_names: HashMap<NetId, String>,
    default_clearance: Coord,
}

impl ClearanceCalculator {
    pub fn new(board: &Board) -> Self {
        Self {
            net_names: board.nets.iter().map(|n| (n.id, n.name.clone())).collect(),
            default_clearance: board.design_rules.default_clearance.unwrap_or(DEFAULT_CLEARANCE),
        }
    }

    pub fn default_clearance(&self) -> Coord {
        self.default_clearance
    }

    pub fn net_name(&self, net: NetId) -> Option<&str> {
        self.net_names.get(&net).map(String::as_str)
    }

    /// Clearance of a track: the largest own clearance of its segments, else the default
    pub fn track_clearance(&self, track: &Track) -> Coord {
        track
            .segments
            .iter()
            .filter_map(|s| s.clearance)
            .max()
            .unwrap_or(self.default_clearance)
    }

    /// Edge-to-edge gap between `track` and its differential pair sibling on the same layer
    ///
    /// Measured as the closest endpoint pair between the two tracks, minus twice
    /// the track width. `None` for non-pair nets, a missing sibling, or a gap
    /// that is not positive.
    pub fn diff_pair_gap(&self, track: &Track, layer_tracks: &[Track]) -> Option<Coord> {
        let sibling = diff_pair_sibling_name(self.net_name(track.net)?)?;

        let mut closest = f64::INFINITY;
        for other in layer_tracks {
            if other.net == track.net || self.net_name(other.net) != Some(sibling.as_str()) {
                continue;
            }
            for a in &track.segments {
                for b in &other.segments {
                    for (p, q) in [(a.start, b.start), (a.start, b.end), (a.end, b.start), (a.end, b.end)] {
                        closest = closest.min(point_distance(p, q));
                    }
                }
            }
        }

        if !closest.is_finite() {
            return None;
        }
        let gap = (closest - 2.0 * track.width() as f64) as Coord;
        (gap > 0).then_some(gap)
    }

    /// Offsets for walking `track` with vias of `via_diameter`
    pub fn plan(&self, track: &Track, layer_tracks: &[Track], via_diameter: Coord) -> OffsetPlan {
        OffsetPlan {
            track_width: track.width(),
            clearance: self.track_clearance(track),
            via_diameter,
            diff_pair_gap: self.diff_pair_gap(track, layer_tracks),
        }
    }

    pub fn lateral_offset(&self, track: &Track, layer_tracks: &[Track], via_diameter: Coord) -> Coord {
        self.plan(track, layer_tracks, via_diameter).lateral_offset()
    }

    /// Clearance a candidate keeps to an obstacle on `obstacle_net`
    ///
    /// Copper on the walked track's own net gets the fixed same-net clearance.
    pub fn obstacle_clearance(&self, obstacle_net: NetId, track_net: NetId, clearance: Coord) -> Coord {
        if obstacle_net == track_net {
            SAME_NET_MIN_CLEARANCE
        } else {
            clearance
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{DesignRules, Net, Point, Segment};

    fn segment(id: u64, net: NetId, start: (Coord, Coord), end: (Coord, Coord), width: Coord) -> Segment {
        Segment {
            id,
            start: Point::new(start.0, start.1),
            end: Point::new(end.0, end.1),
            net,
            width,
            layer: "F.Cu".into(),
            clearance: None,
        }
    }

    fn track(segments: Vec<Segment>) -> Track {
        Track {
            net: segments[0].net,
            layer: "F.Cu".into(),
            segments,
        }
    }

    fn board(nets: &[(NetId, &str)]) -> Board {
        Board {
            copper_layers: vec!["F.Cu".into(), "B.Cu".into()],
            nets: nets.iter().map(|&(id, name)| Net { id, name: name.into() }).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_worked_example() {
        // 0.2 mm track, 0.2 mm clearance, 0.6 mm via
        let calc = ClearanceCalculator::new(&board(&[(1, "SIG")]));
        let t = track(vec![segment(1, 1, (0, 0), (10_000_000, 0), 200_000)]);
        assert_eq!(calc.lateral_offset(&t, &[t.clone()], 600_000), 600_000);
    }

    #[test]
    fn test_offset_monotonic() {
        let base = OffsetPlan {
            track_width: 200_000,
            clearance: 200_000,
            via_diameter: 600_000,
            diff_pair_gap: None,
        };
        let wider_clearance = OffsetPlan { clearance: 250_000, ..base };
        let bigger_via = OffsetPlan { via_diameter: 800_000, ..base };
        assert!(wider_clearance.lateral_offset() > base.lateral_offset());
        assert!(bigger_via.lateral_offset() > base.lateral_offset());
    }

    #[test]
    fn test_single_trace_clearance_floor() {
        let plan = OffsetPlan {
            track_width: 200_000,
            clearance: 100_000,
            via_diameter: 600_000,
            diff_pair_gap: None,
        };
        assert_eq!(plan.lateral_offset(), 500_000);
        assert_eq!(plan.segment_offset(200_000), 600_000);
        assert_eq!(plan.segment_offset(400_000), 700_000);
    }

    #[test]
    fn test_clearance_falls_back_to_board_rules() {
        let mut b = board(&[(1, "SIG")]);
        b.design_rules = DesignRules {
            default_clearance: Some(150_000),
        };
        let calc = ClearanceCalculator::new(&b);
        let mut t = track(vec![segment(1, 1, (0, 0), (1_000, 0), 200_000)]);
        assert_eq!(calc.track_clearance(&t), 150_000);
        t.segments[0].clearance = Some(250_000);
        assert_eq!(calc.track_clearance(&t), 250_000);
        assert_eq!(ClearanceCalculator::new(&board(&[])).default_clearance(), DEFAULT_CLEARANCE);
    }

    #[test]
    fn test_diff_pair_pushes_past_sibling() {
        let calc = ClearanceCalculator::new(&board(&[(1, "USB_P"), (2, "USB_N"), (3, "USB")]));
        // centres 0.6 mm apart, width 0.2 mm -> 0.2 mm gap
        let p = track(vec![segment(1, 1, (0, 0), (10_000_000, 0), 200_000)]);
        let n = track(vec![segment(2, 2, (0, 600_000), (10_000_000, 600_000), 200_000)]);
        let layer = vec![p.clone(), n.clone()];

        assert_eq!(calc.diff_pair_gap(&p, &layer), Some(200_000));
        let plan = calc.plan(&p, &layer, 600_000);
        // 0.1 + 0.2 + 0.2 + 0.2 + 0.2 + 0.3
        assert_eq!(plan.lateral_offset(), 1_200_000);
        assert!(plan.lateral_offset() > 600_000 + 100_000);

        // no sibling on the layer
        assert_eq!(calc.diff_pair_gap(&p, &[p.clone()]), None);
        // not a pair net
        let plain = track(vec![segment(3, 3, (0, 0), (1_000, 0), 200_000)]);
        assert_eq!(calc.diff_pair_gap(&plain, &layer), None);
    }

    #[test]
    fn test_tight_pair_has_no_gap() {
        let calc = ClearanceCalculator::new(&board(&[(1, "D_P"), (2, "D_N")]));
        let p = track(vec![segment(1, 1, (0, 0), (1_000_000, 0), 200_000)]);
        let n = track(vec![segment(2, 2, (0, 300_000), (1_000_000, 300_000), 200_000)]);
        assert_eq!(calc.diff_pair_gap(&p, &[p.clone(), n]), None);
    }

    #[test]
    fn test_sibling_names_and_keepout() {
        assert_eq!(diff_pair_sibling_name("CLK_N").as_deref(), Some("CLK_P"));
        assert_eq!(diff_pair_sibling_name("CLK_P").as_deref(), Some("CLK_N"));
        assert_eq!(diff_pair_sibling_name("CLK"), None);

        assert_eq!(pad_keepout(None, None, 200_000), 200_000);
        assert_eq!(pad_keepout(Some(0), Some(-50_000), 200_000), 200_000);
        assert_eq!(pad_keepout(Some(100_000), Some(-150_000), 200_000), 150_000);
    }

    #[test]
    fn test_same_net_obstacle_clearance() {
        let calc = ClearanceCalculator::new(&board(&[]));
        assert_eq!(calc.obstacle_clearance(4, 4, 200_000), SAME_NET_MIN_CLEARANCE);
        assert_eq!(calc.obstacle_clearance(5, 4, 200_000), 200_000);
    }
}
