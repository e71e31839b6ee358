//! Track reconstruction from loose trace segments
//!
//! The board stores routing as independent straight segments. This module
//! groups the segments of one layer into tracks (maximal connected, same-net
//! polylines) and orders a track into a walkable path.

use crate::board::{Board, Coord, ItemId, NetId, Point, Segment};
use log::debug;
use std::collections::VecDeque;

use super::distance::{point_distance, points_match};
use super::error::{Result, StitchError};

/// Connected, same-net run of segments on one layer
#[derive(Clone, Debug, PartialEq)]
pub struct Track {
    pub net: NetId,
    pub layer: String,
    pub segments: Vec<Segment>,
}

/// A path segment oriented along the direction of travel
#[derive(Clone, Copy, Debug)]
pub struct Run<'a> {
    pub segment: &'a Segment,
    pub from: Point,
    pub to: Point,
}

impl Track {
    /// Widest segment in the track
    pub fn width(&self) -> Coord {
        self.segments.iter().map(|s| s.width).max().unwrap_or(0)
    }

    /// Total arc length in nanometres
    pub fn length(&self) -> f64 {
        self.segments.iter().map(Segment::length).sum()
    }

    pub fn segment_ids(&self) -> Vec<ItemId> {
        self.segments.iter().map(|s| s.id).collect()
    }

    /// Segments oriented along the path order
    ///
    /// Stored orientation is ignored: each segment is entered at the endpoint
    /// touching the previous segment's exit. Expects a path from `sort_into_path`.
    pub fn oriented_runs(&self) -> Vec<Run<'_>> {
        let mut runs = Vec::with_capacity(self.segments.len());
        let mut exit: Option<Point> = None;

        for (i, segment) in self.segments.iter().enumerate() {
            let forward = match exit {
                Some(p) => points_match(p, segment.start) || !points_match(p, segment.end),
                // First segment: flip it when only its start touches the next one
                None => match self.segments.get(i + 1) {
                    Some(next) => !(touches(next, segment.start) && !touches(next, segment.end)),
                    None => true,
                },
            };
            let (from, to) = if forward {
                (segment.start, segment.end)
            } else {
                (segment.end, segment.start)
            };
            exit = Some(to);
            runs.push(Run { segment, from, to });
        }

        runs
    }
}

/// Segment has an endpoint at `p`
fn touches(segment: &Segment, p: Point) -> bool {
    points_match(segment.start, p) || points_match(segment.end, p)
}

/// The endpoint of `segment` opposite to `from`
pub fn far_end(segment: &Segment, from: Point) -> Point {
    if points_match(from, segment.start) {
        segment.end
    } else {
        segment.start
    }
}

/// Groups the trace segments of a layer into tracks
pub struct TrackReconstructor<'a> {
    board: &'a Board,
}

impl<'a> TrackReconstructor<'a> {
    pub fn new(board: &'a Board) -> Self {
        Self { board }
    }

    /// Reconstruct the tracks of one copper layer from the board
    pub fn reconstruct_layer(&self, layer: &str) -> Result<Vec<Track>> {
        let segments: Vec<Segment> = self.board.segments_on(layer).cloned().collect();
        self.reconstruct(layer, &segments)
    }

    /// Group `segments` (all on `layer`) into maximal connected tracks
    ///
    /// Each unprocessed segment seeds a track that grows from the seed's end,
    /// then from its start. At a junction the first touching segment in input
    /// order wins; the other branches seed their own tracks. Two segments that
    /// share an endpoint but not a net fail the whole layer.
    pub fn reconstruct(&self, layer: &str, segments: &[Segment]) -> Result<Vec<Track>> {
        let mut processed = vec![false; segments.len()];
        let mut tracks = Vec::new();

        for seed in 0..segments.len() {
            if processed[seed] {
                continue;
            }
            processed[seed] = true;
            let mut chain: VecDeque<usize> = VecDeque::from([seed]);

            // Direction 1: from the seed's end
            let mut current = seed;
            let mut frontier = segments[seed].end;
            while let Some(next) = self.find_connected(layer, segments, &processed, current, frontier)? {
                processed[next] = true;
                chain.push_back(next);
                frontier = far_end(&segments[next], frontier);
                current = next;
            }

            // Direction 2: from the seed's start
            current = seed;
            frontier = segments[seed].start;
            while let Some(next) = self.find_connected(layer, segments, &processed, current, frontier)? {
                processed[next] = true;
                chain.push_front(next);
                frontier = far_end(&segments[next], frontier);
                current = next;
            }

            tracks.push(Track {
                net: segments[seed].net,
                layer: layer.to_string(),
                segments: chain.into_iter().map(|i| segments[i].clone()).collect(),
            });
        }

        debug!(
            "[Tracks] Layer {}: {} segments -> {} tracks",
            layer,
            segments.len(),
            tracks.len()
        );

        Ok(tracks)
    }

    /// First unprocessed segment touching `endpoint`, checking every touching segment's net
    fn find_connected(
        &self,
        layer: &str,
        segments: &[Segment],
        processed: &[bool],
        current: usize,
        endpoint: Point,
    ) -> Result<Option<usize>> {
        let net = segments[current].net;
        let mut found = None;

        for (i, other) in segments.iter().enumerate() {
            if i == current || !touches(other, endpoint) {
                continue;
            }
            if other.net != net {
                return Err(StitchError::NetMismatch {
                    layer: layer.to_string(),
                    net_a: self.board.net_name(net),
                    net_b: self.board.net_name(other.net),
                    at: endpoint,
                });
            }
            if found.is_none() && !processed[i] {
                found = Some(i);
            }
        }

        Ok(found)
    }
}

/// Order a track's segments into one start-to-end path
///
/// Segments are appended at the path end or prepended at the path start as
/// they are found; reversed segments keep their stored orientation. Segments
/// that never connect are appended as a trailing remainder.
pub fn sort_into_path(track: &Track) -> Track {
    if track.segments.len() <= 1 {
        return track.clone();
    }

    let first = track.segments[0].clone();
    let mut head = first.start;
    let mut tail = first.end;
    let mut path: VecDeque<Segment> = VecDeque::from([first]);
    let mut remaining: Vec<Segment> = track.segments[1..].to_vec();

    while !remaining.is_empty() {
        if let Some(i) = remaining.iter().position(|s| touches(s, tail)) {
            let segment = remaining.remove(i);
            tail = far_end(&segment, tail);
            path.push_back(segment);
            continue;
        }
        if let Some(i) = remaining.iter().position(|s| touches(s, head)) {
            let segment = remaining.remove(i);
            head = far_end(&segment, head);
            path.push_front(segment);
            continue;
        }

        debug!(
            "[Tracks] {} disconnected segments appended to track on {}",
            remaining.len(),
            track.layer
        );
        path.extend(remaining.drain(..));
    }

    Track {
        net: track.net,
        layer: track.layer.clone(),
        segments: path.into(),
    }
}

/// Largest gap between consecutive segments of a path, in nanometres
pub fn max_path_gap(track: &Track) -> f64 {
    track
        .oriented_runs()
        .windows(2)
        .map(|w| point_distance(w[0].to, w[1].from))
        .fold(0.0, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Net;

    fn seg(id: u64, net: NetId, a: (i64, i64), b: (i64, i64)) -> Segment {
        Segment {
            id,
            start: Point::new(a.0, a.1),
            end: Point::new(b.0, b.1),
            net,
            width: 200_000,
            layer: "F.Cu".to_string(),
            clearance: None,
        }
    }

    fn board() -> Board {
        Board {
            copper_layers: vec!["F.Cu".into(), "B.Cu".into()],
            nets: vec![
                Net { id: 1, name: "SIG_A".into() },
                Net { id: 2, name: "SIG_B".into() },
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_shuffled_chain_is_one_track() {
        let board = board();
        // chain 0 -> 1000 -> 2000 -> 3000 given out of order, one segment reversed
        let segments = vec![
            seg(3, 1, (2_000_000, 0), (3_000_000, 0)),
            seg(1, 1, (0, 0), (1_000_000, 0)),
            seg(2, 1, (2_000_000, 0), (1_000_000, 0)),
        ];
        let tracks = TrackReconstructor::new(&board).reconstruct("F.Cu", &segments).unwrap();
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].segments.len(), 3);

        let path = sort_into_path(&tracks[0]);
        assert!(max_path_gap(&path) <= 1_000.0);
        assert!((path.length() - 3_000_000.0).abs() < 1e-6);
    }

    #[test]
    fn test_seed_in_the_middle_grows_both_ways() {
        let board = board();
        let segments = vec![
            seg(2, 1, (1_000_000, 0), (2_000_000, 0)),
            seg(1, 1, (0, 0), (1_000_000, 0)),
            seg(3, 1, (2_000_000, 0), (3_000_000, 0)),
        ];
        let tracks = TrackReconstructor::new(&board).reconstruct("F.Cu", &segments).unwrap();
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].segment_ids(), vec![1, 2, 3]);
    }

    #[test]
    fn test_endpoints_within_tolerance_connect() {
        let board = board();
        let segments = vec![
            seg(1, 1, (0, 0), (1_000_000, 0)),
            seg(2, 1, (1_000_600, 500), (2_000_000, 0)),
        ];
        let tracks = TrackReconstructor::new(&board).reconstruct("F.Cu", &segments).unwrap();
        assert_eq!(tracks.len(), 1);
    }

    #[test]
    fn test_disjoint_components_partition() {
        let board = board();
        let segments = vec![
            seg(1, 1, (0, 0), (1_000_000, 0)),
            seg(2, 2, (0, 5_000_000), (1_000_000, 5_000_000)),
            seg(3, 1, (1_000_000, 0), (1_000_000, 1_000_000)),
            seg(4, 2, (1_000_000, 5_000_000), (2_000_000, 5_000_000)),
        ];
        let tracks = TrackReconstructor::new(&board).reconstruct("F.Cu", &segments).unwrap();
        assert_eq!(tracks.len(), 2);

        let mut ids: Vec<u64> = tracks.iter().flat_map(|t| t.segment_ids()).collect();
        ids.sort();
        assert_eq!(ids, vec![1, 2, 3, 4]);
        assert!(tracks.iter().all(|t| t.segments.iter().all(|s| s.net == t.net)));
    }

    #[test]
    fn test_net_mismatch_is_an_error() {
        let board = board();
        let segments = vec![
            seg(1, 1, (-1_000_000, 0), (0, 0)),
            seg(2, 2, (0, 0), (1_000_000, 0)),
        ];
        let err = TrackReconstructor::new(&board).reconstruct("F.Cu", &segments).unwrap_err();
        assert_eq!(
            err,
            StitchError::NetMismatch {
                layer: "F.Cu".into(),
                net_a: "SIG_A".into(),
                net_b: "SIG_B".into(),
                at: Point::new(0, 0),
            }
        );
    }

    #[test]
    fn test_net_mismatch_found_behind_a_junction() {
        let board = board();
        // segment 2 joins the junction first; segment 3 (other net) also touches it
        let segments = vec![
            seg(1, 1, (0, 0), (1_000_000, 0)),
            seg(2, 1, (1_000_000, 0), (2_000_000, 0)),
            seg(3, 2, (1_000_000, 0), (1_000_000, 1_000_000)),
        ];
        let result = TrackReconstructor::new(&board).reconstruct("F.Cu", &segments);
        assert!(matches!(result, Err(StitchError::NetMismatch { .. })));
    }

    #[test]
    fn test_branch_takes_first_match() {
        let board = board();
        // Y junction at (1mm, 0)
        let segments = vec![
            seg(1, 1, (0, 0), (1_000_000, 0)),
            seg(2, 1, (1_000_000, 0), (2_000_000, 0)),
            seg(3, 1, (1_000_000, 0), (1_000_000, 1_000_000)),
        ];
        let tracks = TrackReconstructor::new(&board).reconstruct("F.Cu", &segments).unwrap();
        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[0].segment_ids(), vec![1, 2]);
        assert_eq!(tracks[1].segment_ids(), vec![3]);
    }

    #[test]
    fn test_sort_into_path_prepends_and_orients() {
        let track = Track {
            net: 1,
            layer: "F.Cu".into(),
            segments: vec![
                seg(2, 1, (1_000_000, 0), (2_000_000, 0)),
                seg(3, 1, (3_000_000, 0), (2_000_000, 0)),
                seg(1, 1, (1_000_000, 0), (0, 0)),
            ],
        };
        let path = sort_into_path(&track);
        assert_eq!(path.segment_ids(), vec![1, 2, 3]);

        let runs = path.oriented_runs();
        assert_eq!(runs[0].from, Point::new(0, 0));
        assert_eq!(runs[1].from, Point::new(1_000_000, 0));
        assert_eq!(runs[2].from, Point::new(2_000_000, 0));
        assert_eq!(runs[2].to, Point::new(3_000_000, 0));
    }

    #[test]
    fn test_sort_into_path_keeps_disconnected_remainder() {
        let track = Track {
            net: 1,
            layer: "F.Cu".into(),
            segments: vec![
                seg(1, 1, (0, 0), (1_000_000, 0)),
                seg(2, 1, (5_000_000, 0), (6_000_000, 0)),
            ],
        };
        let path = sort_into_path(&track);
        assert_eq!(path.segment_ids(), vec![1, 2]);
    }
}
