//! Via placement along a track
//!
//! Walks the sorted path of a track at a fixed arc-length cadence and proposes
//! a via on each side of the centreline at every stop. Accepted vias go into
//! the obstacle index straight away, so a track never crowds its own vias.

use crate::board::{Courtyard, NetId, Point};
use log::debug;

use super::checks::{check_candidate, CopperRule};
use super::clearance::ClearanceCalculator;
use super::distance::{direction, perpendicular, point_distance};
use super::obstacles::ObstacleIndex;
use super::tracks::{sort_into_path, Track};
use super::types::{StitchSettings, TuningArea, ViaCandidate};

/// Vias accepted along one track and the number of rejected candidates
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WalkOutcome {
    pub placed: Vec<ViaCandidate>,
    pub skipped: usize,
}

impl WalkOutcome {
    pub fn absorb(&mut self, other: WalkOutcome) {
        self.placed.extend(other.placed);
        self.skipped += other.skipped;
    }
}

pub struct ViaWalker<'a> {
    settings: StitchSettings,
    target_net: NetId,
    calculator: &'a ClearanceCalculator,
    courtyards: &'a [Courtyard],
    /// Always empty for now: no tuning pattern source is wired in
    tuning_areas: Vec<TuningArea>,
}

impl<'a> ViaWalker<'a> {
    pub fn new(
        settings: StitchSettings,
        target_net: NetId,
        calculator: &'a ClearanceCalculator,
        courtyards: &'a [Courtyard],
    ) -> Self {
        Self {
            settings,
            target_net,
            calculator,
            courtyards,
            tuning_areas: Vec::new(),
        }
    }

    /// Place stitching vias along `track`
    ///
    /// `layer_tracks` are all tracks of the layer, used to find a differential
    /// pair sibling. Every accepted via is inserted into `index` before the next
    /// candidate is checked.
    pub fn stitch(&self, track: &Track, layer_tracks: &[Track], index: &mut ObstacleIndex) -> WalkOutcome {
        let path = sort_into_path(track);
        let plan = self.calculator.plan(&path, layer_tracks, self.settings.via_diameter);
        let stride = self.settings.stitch_distance as f64;
        let mut outcome = WalkOutcome::default();

        let mut walked = 0.0_f64;
        let mut next_stop = 0.0_f64;

        for run in path.oriented_runs() {
            let Some(dir) = direction(run.from, run.to) else {
                continue;
            };
            let length = point_distance(run.from, run.to);
            let perp = perpendicular(dir);
            let offset = plan.segment_offset(run.segment.width) as f64;
            let rule = CopperRule {
                track_net: path.net,
                clearance: plan.clearance,
                layer: &path.layer,
                exclude_segment: Some(run.segment.id),
            };

            let segment_end = walked + length;
            while next_stop < segment_end {
                let along = next_stop - walked;
                if along >= 0.0 {
                    let cx = run.from.x as f64 + dir[0] * along;
                    let cy = run.from.y as f64 + dir[1] * along;

                    for side in [-1.0, 1.0] {
                        let candidate = ViaCandidate {
                            position: Point::new(
                                (cx + perp[0] * offset * side).round() as i64,
                                (cy + perp[1] * offset * side).round() as i64,
                            ),
                            diameter: self.settings.via_diameter,
                            drill: self.settings.via_drill,
                            target_net: self.target_net,
                        };

                        match check_candidate(
                            &candidate,
                            self.courtyards,
                            &self.tuning_areas,
                            index,
                            self.calculator,
                            &rule,
                        ) {
                            Ok(()) => {
                                index.insert_via(&candidate);
                                outcome.placed.push(candidate);
                            }
                            Err(_) => outcome.skipped += 1,
                        }
                    }
                }
                next_stop += stride;
            }
            walked = segment_end;
        }

        debug!(
            "[Walker] Track on {} ({} segments, {:.0} nm): offset {} nm, {} placed, {} skipped",
            path.layer,
            path.segments.len(),
            walked,
            plan.lateral_offset(),
            outcome.placed.len(),
            outcome.skipped
        );

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Board, Footprint, Net, Pad, Segment};
    use crate::stitch::tracks::TrackReconstructor;

    const GND: NetId = 9;

    fn seg(id: u64, net: NetId, layer: &str, a: (i64, i64), b: (i64, i64)) -> Segment {
        Segment {
            id,
            start: Point::new(a.0, a.1),
            end: Point::new(b.0, b.1),
            net,
            width: 200_000,
            layer: layer.to_string(),
            clearance: None,
        }
    }

    fn board(segments: Vec<Segment>) -> Board {
        Board {
            copper_layers: vec!["F.Cu".into(), "B.Cu".into()],
            nets: vec![
                Net { id: 1, name: "SIG".into() },
                Net { id: 2, name: "OTHER".into() },
                Net { id: GND, name: "GND".into() },
            ],
            segments,
            ..Default::default()
        }
    }

    fn walk(board: &Board, stitch_distance: i64) -> WalkOutcome {
        let settings = StitchSettings::new(stitch_distance, 300_000, 600_000).unwrap();
        let calculator = ClearanceCalculator::new(board);
        let mut index = ObstacleIndex::build(board);
        let tracks = TrackReconstructor::new(board).reconstruct_layer("F.Cu").unwrap();
        let walker = ViaWalker::new(settings, GND, &calculator, &[]);

        let mut outcome = WalkOutcome::default();
        for track in &tracks {
            outcome.absorb(walker.stitch(track, &tracks, &mut index));
        }
        outcome
    }

    #[test]
    fn test_open_board_places_both_sides() {
        let b = board(vec![seg(1, 1, "F.Cu", (0, 0), (10_000_000, 0))]);
        let outcome = walk(&b, 2_000_000);
        // stops at 0, 2, 4, 6, 8 mm
        assert_eq!(outcome.placed.len(), 10);
        assert_eq!(outcome.skipped, 0);
        assert!(outcome.placed.contains(&ViaCandidate {
            position: Point::new(4_000_000, -600_000),
            diameter: 600_000,
            drill: 300_000,
            target_net: GND,
        }));
        assert!(outcome.placed.iter().all(|v| v.target_net == GND));
    }

    #[test]
    fn test_placed_vias_block_later_candidates() {
        let b = board(vec![seg(1, 1, "F.Cu", (0, 0), (2_000_000, 0))]);
        // stops every 0.5 mm; a placed via blocks the next stop on its side
        let outcome = walk(&b, 500_000);
        assert_eq!(outcome.placed.len(), 4);
        assert_eq!(outcome.skipped, 4);
        let xs: Vec<i64> = outcome.placed.iter().map(|v| v.position.x).collect();
        assert_eq!(xs, vec![0, 0, 1_000_000, 1_000_000]);
    }

    #[test]
    fn test_dense_board_skips_everything() {
        let b = board(vec![
            seg(1, 1, "F.Cu", (0, 0), (10_000_000, 0)),
            seg(2, 2, "B.Cu", (-1_000_000, 600_000), (11_000_000, 600_000)),
            seg(3, 2, "B.Cu", (-1_000_000, -600_000), (11_000_000, -600_000)),
        ]);
        let outcome = walk(&b, 2_000_000);
        assert!(outcome.placed.is_empty());
        assert_eq!(outcome.skipped, 10);
    }

    fn pad(id: u64, layer: &str, x: i64, y: i64) -> Pad {
        Pad {
            id,
            position: Point::new(x, y),
            size: (1_000_000, 1_000_000),
            net: 2,
            local_clearance: None,
            soldermask_expansion: None,
            layers: vec![layer.to_string()],
        }
    }

    fn with_pads(mut b: Board, pads: Vec<Pad>) -> Board {
        b.footprints.push(Footprint {
            reference: "J1".into(),
            pads,
            courtyards: Vec::new(),
        });
        b
    }

    #[test]
    fn test_pad_sharing_segment_id_still_blocks() {
        let track = || vec![seg(1, 1, "F.Cu", (0, 0), (10_000_000, 0))];
        for pad_id in [77, 1] {
            let b = with_pads(board(track()), vec![pad(pad_id, "B.Cu", 4_000_000, 600_000)]);
            let outcome = walk(&b, 2_000_000);
            assert_eq!(outcome.placed.len(), 9, "pad id {}", pad_id);
            assert_eq!(outcome.skipped, 1, "pad id {}", pad_id);
            assert!(outcome.placed.iter().all(|v| v.position != Point::new(4_000_000, 600_000)));
        }
    }

    #[test]
    fn test_boxed_in_by_pads_places_nothing() {
        let pads = (0..5)
            .flat_map(|i| {
                let x = i * 2_000_000;
                [pad(100 + 2 * i as u64, "F.Cu", x, 600_000), pad(101 + 2 * i as u64, "F.Cu", x, -600_000)]
            })
            .collect();
        let b = with_pads(board(vec![seg(1, 1, "F.Cu", (0, 0), (10_000_000, 0))]), pads);
        let outcome = walk(&b, 2_000_000);
        assert!(outcome.placed.is_empty());
        // every stop proposed two candidates, all rejected
        assert_eq!(outcome.skipped, 10);
    }

    #[test]
    fn test_arc_length_carries_over_corners() {
        let b = board(vec![
            seg(1, 1, "F.Cu", (0, 0), (3_000_000, 0)),
            seg(2, 1, "F.Cu", (3_000_000, 0), (3_000_000, 3_000_000)),
        ]);
        let outcome = walk(&b, 2_500_000);
        let positions: Vec<Point> = outcome.placed.iter().map(|v| v.position).collect();

        // third stop lands 2 mm into the vertical segment
        assert!(positions.contains(&Point::new(3_600_000, 2_000_000)));
        assert!(positions.contains(&Point::new(2_400_000, 2_000_000)));
        // the inner via at 2.5 mm sits 0.5 mm from the vertical segment of the same track
        assert!(!positions.contains(&Point::new(2_500_000, 600_000)));
        assert!(positions.contains(&Point::new(2_500_000, -600_000)));
        assert_eq!(outcome.placed.len(), 5);
        assert_eq!(outcome.skipped, 1);
    }
}
